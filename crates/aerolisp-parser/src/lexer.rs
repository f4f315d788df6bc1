//! Lexical analyzer for Aerolisp source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! The public entry point is [`tokenize`], which recovers from errors and
//! collects every lexical diagnostic in a single pass.

use winnow::{
    Parser as _,
    ascii::{digit0, digit1},
    combinator::{alt, cut_err, fail, not, opt, peek, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, none_of, one_of, take_while},
};

use aerolisp_core::span::Span;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    tokens::{PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Characters that may continue a symbol.
///
/// Property names are slash-delimited paths that may contain dots, dashes
/// and bracketed indices, e.g. `propulsion/engine[0]/thrust-lbs`.
fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '.' | '-' | '[' | ']')
}

/// Characters that glue onto a number or keyword and make it a symbol.
///
/// Brackets are excluded so that `2]` ends a table row.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '.' | '-')
}

/// Parse an escape sequence in a string starting with backslash.
fn string_escape(input: &mut Input<'_>) -> IResult<char> {
    let escape_start = input.current_token_start();

    '\\'.parse_next(input)?;

    cut_err(one_of(['n', 'r', 't', '\\', '"']))
        .map(|c| match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            other => other,
        })
        .context(LexerDiagnostic {
            code: ErrorCode::E003,
            message: "invalid escape sequence",
            help: Some("valid escapes: `\\n`, `\\r`, `\\t`, `\\\\`, `\\\"`"),
            start: escape_start,
        })
        .parse_next(input)
}

/// Parse a double-quoted string literal.
///
/// Used for docstrings and for the empty table marker `""`. Strings may not
/// span lines.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let string_char = none_of(['"', '\\', '\n', '\r']);
    let string_content = repeat(0.., alt((string_escape, string_char))).fold(
        String::new,
        |mut acc, ch| {
            acc.push(ch);
            acc
        },
    );

    let start_pos = input.current_token_start();

    '"'.parse_next(input)?;

    cut_err(terminated(string_content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"`"),
            start: start_pos,
        })
        .parse_next(input)
        .map(Token::StringLiteral)
}

/// Parse an integer or scientific-notation number.
///
/// Only `-` may prefix a number so that `(+ 1 2)` keeps its operator.
fn number_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    let value = terminated(
        (
            opt('-'),
            alt(((digit1, opt(('.', digit0))).void(), ('.', digit1).void())),
            opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
        )
            .take()
            .try_map(str::parse::<f64>),
        peek(not(one_of(is_word_char))),
    )
    .parse_next(input)?;

    if !value.is_finite() {
        return cut_err(fail)
            .context(LexerDiagnostic {
                code: ErrorCode::E004,
                message: "number literal out of range",
                help: Some("numbers must fit a finite double precision value"),
                start,
            })
            .parse_next(input);
    }

    Ok(Token::Number(value))
}

/// Parse line comment starting with ';'
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded(';', take_while(0.., |c: char| c != '\n'))
        .map(|text: &str| Token::Comment(text.trim_end_matches('\r')))
        .parse_next(input)
}

/// Parse keywords with word boundary checking
fn keyword<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    terminated(
        alt((
            literal("def"),
            literal("axis"),
            literal("table"),
            literal("row"),
            literal("column"),
        )),
        peek(not(one_of(is_symbol_char))),
    )
    .map(|keyword: &str| match keyword {
        "def" => Token::Def,
        "axis" => Token::Axis,
        "table" => Token::Table,
        "row" => Token::Row,
        "column" => Token::Column,
        _ => unreachable!(),
    })
    .parse_next(input)
}

/// Parse property names, function names and named operators.
fn symbol<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (
        one_of(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        take_while(0.., is_symbol_char),
    )
        .take()
        .map(Token::Symbol)
        .parse_next(input)
}

/// Parse the single-character arithmetic operators `+ - * /`.
fn arithmetic_operator<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    terminated(
        one_of(['+', '-', '*', '/']).take(),
        peek(not(one_of(is_symbol_char))),
    )
    .map(Token::Symbol)
    .parse_next(input)
}

/// Parse single character tokens
fn punctuation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        ','.value(Token::Comma),
    ))
    .parse_next(input)
}

/// Parse whitespace (spaces, tabs, etc. but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        line_comment,
        string_literal,
        punctuation,
        number_literal,      // Must come before symbol and operators
        keyword,             // Must come before symbol
        symbol,
        arithmetic_operator,
        newline,             // Must come before whitespace
        whitespace,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();

    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => self.tokens.push(token),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    let diagnostic = Self::convert_err_mode(e, error_pos);
                    let code = diagnostic.code();
                    self.diagnostics.emit(diagnostic);

                    match code {
                        Some(ErrorCode::E001 | ErrorCode::E003) => {
                            Self::skip_string_rest(&mut input);
                        }
                        // The out-of-range literal is already consumed.
                        Some(ErrorCode::E004) => {}
                        _ => {
                            input.next_token();
                        }
                    }
                }
            }
        }
    }

    /// Skip the remainder of a broken string literal.
    ///
    /// Consumes up to and including the closing quote so it does not open
    /// a new string. Stops before a line break.
    fn skip_string_rest(input: &mut Input<'a>) {
        while let Some(c) = input.peek_token() {
            if c == '\n' {
                break;
            }
            input.next_token();
            if c == '"' {
                break;
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E002 (unexpected character) if no diagnostic context
    /// is attached.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos.max(*start + 1));

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Tokenize source text, collecting every lexical error.
///
/// # Errors
///
/// Returns a [`ParseError`] holding one diagnostic per lexical error.
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_single_token(input: &str, expected: Token<'_>) {
        let mut located_input = LocatingSlice::new(input);
        let result = positioned_token(&mut located_input);
        assert!(result.is_ok(), "Failed to parse: {}", input);
        let positioned = result.unwrap();
        assert_eq!(positioned.token, expected);
    }

    fn significant(input: &str) -> Vec<Token<'_>> {
        tokenize(input)
            .expect("input should tokenize")
            .into_iter()
            .filter(|t| !t.token.is_trivia())
            .map(|t| t.token)
            .collect()
    }

    fn first_code(input: &str) -> ErrorCode {
        let err = tokenize(input).expect_err("input should fail");
        err.diagnostics()[0].code().expect("diagnostic has a code")
    }

    #[test]
    fn test_keywords() {
        test_single_token("def", Token::Def);
        test_single_token("axis", Token::Axis);
        test_single_token("table", Token::Table);
        test_single_token("row", Token::Row);
        test_single_token("column", Token::Column);
    }

    #[test]
    fn test_keyword_prefix_is_symbol() {
        test_single_token("default", Token::Symbol("default"));
        test_single_token("rows/count", Token::Symbol("rows/count"));
        test_single_token("table-1", Token::Symbol("table-1"));
    }

    #[test]
    fn test_numbers() {
        test_single_token("42", Token::Number(42.0));
        test_single_token("-0.25", Token::Number(-0.25));
        test_single_token(".5", Token::Number(0.5));
        test_single_token("3.", Token::Number(3.0));
        test_single_token("1e3", Token::Number(1000.0));
        test_single_token("2.5E-2", Token::Number(0.025));
    }

    #[test]
    fn test_property_names() {
        test_single_token("aero/qbar-psf", Token::Symbol("aero/qbar-psf"));
        test_single_token("metrics/Sw-sqft", Token::Symbol("metrics/Sw-sqft"));
        test_single_token(
            "propulsion/engine[0]/thrust-lbs",
            Token::Symbol("propulsion/engine[0]/thrust-lbs"),
        );
        test_single_token("_private", Token::Symbol("_private"));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            significant("(+ - * /)"),
            vec![
                Token::LeftParen,
                Token::Symbol("+"),
                Token::Symbol("-"),
                Token::Symbol("*"),
                Token::Symbol("/"),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_negative_number_vs_minus() {
        assert_eq!(
            significant("(- -1 x)"),
            vec![
                Token::LeftParen,
                Token::Symbol("-"),
                Token::Number(-1.0),
                Token::Symbol("x"),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_table_literal_tokens() {
        assert_eq!(
            significant("[\"\" 0 1.5, -2 3 4]"),
            vec![
                Token::LeftBracket,
                Token::StringLiteral(String::new()),
                Token::Number(0.0),
                Token::Number(1.5),
                Token::Comma,
                Token::Number(-2.0),
                Token::Number(3.0),
                Token::Number(4.0),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        let tokens = significant("; lift due to alpha\n(def x 1)");
        assert_eq!(tokens[0], Token::Comment(" lift due to alpha"));
        assert_eq!(tokens[1], Token::LeftParen);
    }

    #[test]
    fn test_comment_strips_carriage_return() {
        let tokens = significant("; windows\r\n");
        assert_eq!(tokens, vec![Token::Comment(" windows")]);
    }

    #[test]
    fn test_string_literals() {
        test_single_token(r#""""#, Token::StringLiteral(String::new()));
        test_single_token(
            r#""Lift \"due\" to\talpha\\beta\n""#,
            Token::StringLiteral("Lift \"due\" to\talpha\\beta\n".to_string()),
        );
    }

    #[test]
    fn test_spans_cover_source() {
        let tokens = tokenize("(def CLa 5.1)").unwrap();
        let spans: Vec<_> = tokens.iter().map(|t| (t.span.start(), t.span.end())).collect();
        assert_eq!(
            spans,
            vec![(0, 1), (1, 4), (4, 5), (5, 8), (8, 9), (9, 12), (12, 13)]
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(first_code(r#"(def x "open"#), ErrorCode::E001);
        assert_eq!(first_code("\"broken\nline\""), ErrorCode::E001);
    }

    #[test]
    fn test_invalid_escape() {
        let err = tokenize(r#""bad \q escape" 1"#).unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E003));
    }

    #[test]
    fn test_number_out_of_range() {
        let err = tokenize("(def f 1e999)\n(def g -2e400)").unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);

        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E004));
        assert_eq!(diag.primary_span(), Some(Span::new(7..12)));
        assert_eq!(err.diagnostics()[1].code(), Some(ErrorCode::E004));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("(def x 1) @").unwrap_err();
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E002));
        assert_eq!(diag.primary_span(), Some(Span::new(10..11)));
    }

    #[test]
    fn test_collects_every_error() {
        let err = tokenize("@ x # y $").unwrap_err();
        assert_eq!(err.diagnostics().len(), 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").unwrap().is_empty());
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn valid_identifier_strategy() -> impl Strategy<Value = String> {
        "[a-z_][a-zA-Z0-9_/-]{0,24}".prop_filter("avoid keywords", |s| {
            !matches!(s.as_str(), "def" | "axis" | "table" | "row" | "column")
        })
    }

    fn check_identifier_is_single_symbol(id: &str) -> Result<(), TestCaseError> {
        let tokens = tokenize(id).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(&tokens[0].token, &Token::Symbol(id));
        Ok(())
    }

    fn check_number_roundtrips(value: f64) -> Result<(), TestCaseError> {
        let text = format!("{value:e}");
        let tokens = tokenize(&text).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(&tokens[0].token, &Token::Number(value));
        Ok(())
    }

    proptest! {
        #[test]
        fn identifiers_tokenize_as_one_symbol(id in valid_identifier_strategy()) {
            check_identifier_is_single_symbol(&id)?;
        }

        #[test]
        fn finite_numbers_tokenize_exactly(value in -1.0e9f64..1.0e9) {
            check_number_roundtrips(value)?;
        }
    }
}
