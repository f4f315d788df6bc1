//! Tokens of the Aerolisp language.

use std::fmt;

use winnow::stream::Location;

use aerolisp_core::span::Span;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Keywords
    Def,
    Axis,
    Table,
    Row,
    Column,

    // Literals
    StringLiteral(String),
    Number(f64),
    /// Property names, function names, operator spellings and axis titles.
    Symbol(&'src str),

    // Punctuation
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Comma,        // ,

    /// `; text` up to the end of the line, without the semicolon.
    Comment(&'src str),

    Whitespace,
    Newline,
}

impl Token<'_> {
    /// Whitespace and newlines carry no meaning; comments do.
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Whitespace | Token::Newline)
    }
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl Location for PositionedToken<'_> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Def => write!(f, "def"),
            Token::Axis => write!(f, "axis"),
            Token::Table => write!(f, "table"),
            Token::Row => write!(f, "row"),
            Token::Column => write!(f, "column"),
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::Number(n) => write!(f, "{n}"),
            Token::Symbol(s) => write!(f, "{s}"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Comment(text) => write!(f, ";{text}"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => writeln!(f),
        }
    }
}
