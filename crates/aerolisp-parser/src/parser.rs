//! Parser for Aerolisp source tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer)
//! into the parse tree defined in [`parser_types`](super::parser_types).
//! The public entry points are [`build_spec`] and [`build_expression`].
//!
//! Parsing is pure: names are registered later, during elaboration, so that
//! backtracking never records a definition twice.

mod table;

use winnow::{
    Parser as _,
    combinator::{alt, eof, opt, preceded, repeat},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use aerolisp_core::{
    document::{AxisKind, Lookup},
    operator::OpKind,
    span::{Span, Spanned},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    parser_types as types,
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// A fully formed diagnostic raised by a semantic check
    Diagnostic(Box<Diagnostic>),
}

type Input<'src> = AerolispTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
/// Type alias for winnow TokenSlice with our positioned tokens
type AerolispTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

/// Run `f` and commit to its branch: a failure inside is never retried.
fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    f(input).map_err(|e| match e {
        ErrMode::Backtrack(e) => ErrMode::Cut(e),
        other => other,
    })
}

/// Abort parsing with a ready-made diagnostic.
fn fail_with(diagnostic: Diagnostic) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Diagnostic(Box::new(diagnostic)));
    ErrMode::Cut(e)
}

/// Parse a single whitespace or newline token
fn trivia<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| token.is_trivia())
        .void()
        .parse_next(input)
}

/// Parse zero or more whitespace/newline tokens
fn ws0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., trivia).parse_next(input)
}

/// Parse one token matching `pred`, skipping leading whitespace.
fn punct<'src>(
    input: &mut Input<'src>,
    label: &'static str,
    pred: fn(&Token<'_>) -> bool,
) -> IResult<Span> {
    preceded(
        ws0,
        any.verify(move |token: &PositionedToken<'_>| pred(&token.token))
            .map(|token: &PositionedToken<'_>| token.span),
    )
    .context(Context::Label(label))
    .parse_next(input)
}

fn left_paren<'src>(input: &mut Input<'src>) -> IResult<Span> {
    punct(input, "`(`", |t| matches!(t, Token::LeftParen))
}

fn right_paren<'src>(input: &mut Input<'src>) -> IResult<Span> {
    punct(input, "`)`", |t| matches!(t, Token::RightParen))
}

fn left_bracket<'src>(input: &mut Input<'src>) -> IResult<Span> {
    punct(input, "`[`", |t| matches!(t, Token::LeftBracket))
}

fn right_bracket<'src>(input: &mut Input<'src>) -> IResult<Span> {
    punct(input, "`]`", |t| matches!(t, Token::RightBracket))
}

fn comma<'src>(input: &mut Input<'src>) -> IResult<Span> {
    punct(input, "`,`", |t| matches!(t, Token::Comma))
}

fn def_keyword<'src>(input: &mut Input<'src>) -> IResult<Span> {
    punct(input, "`def`", |t| matches!(t, Token::Def))
}

fn axis_keyword<'src>(input: &mut Input<'src>) -> IResult<Span> {
    punct(input, "`axis`", |t| matches!(t, Token::Axis))
}

fn table_keyword<'src>(input: &mut Input<'src>) -> IResult<Span> {
    punct(input, "`table`", |t| matches!(t, Token::Table))
}

/// Parse a `; comment` token
fn comment<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    preceded(
        ws0,
        any.verify_map(|token: &PositionedToken<'src>| match &token.token {
            Token::Comment(text) => Some(Spanned::new(*text, token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("comment"))
    .parse_next(input)
}

/// Parse any bare word, including the arithmetic operator spellings
fn raw_symbol<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    preceded(
        ws0,
        any.verify_map(|token: &PositionedToken<'src>| match &token.token {
            Token::Symbol(name) => Some(Spanned::new(*name, token.span)),
            _ => None,
        }),
    )
    .parse_next(input)
}

/// Parse a property or function name
///
/// `+ - * /` are operator spellings, never names.
fn name<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    raw_symbol
        .verify(|name: &Spanned<&'src str>| !matches!(*name.inner(), "+" | "-" | "*" | "/"))
        .context(Context::Label("name"))
        .parse_next(input)
}

/// Parse a numeric literal
fn number<'src>(input: &mut Input<'src>) -> IResult<Spanned<f64>> {
    preceded(
        ws0,
        any.verify_map(|token: &PositionedToken<'_>| match token.token {
            Token::Number(value) => Some(Spanned::new(value, token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("number"))
    .parse_next(input)
}

/// Parse a docstring
fn docstring<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    preceded(
        ws0,
        any.verify_map(|token: &PositionedToken<'_>| match &token.token {
            Token::StringLiteral(text) => Some(Spanned::new(text.clone(), token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("docstring"))
    .parse_next(input)
}

/// Parse one expression
///
/// `sexp := comment | table | value | property | operation`
fn sexp<'src>(input: &mut Input<'src>) -> IResult<types::Sexp<'src>> {
    alt((
        comment.map(types::Sexp::Comment),
        number.map(types::Sexp::Value),
        name.map(types::Sexp::Property),
        table_form.map(types::Sexp::Table),
        operation.map(types::Sexp::Operation),
    ))
    .context(Context::Label("expression"))
    .parse_next(input)
}

/// Parse an operation: `(op sexp*)`
///
/// Any opening parenthesis that is not a table commits to an operation.
fn operation<'src>(input: &mut Input<'src>) -> IResult<types::OperationForm<'src>> {
    let open = left_paren.parse_next(input)?;

    cut_err(input, |input| {
        let head = raw_symbol
            .context(Context::Label("operator"))
            .parse_next(input)?;
        let Some(kind) = OpKind::from_symbol(head.inner()) else {
            return Err(fail_with(
                Diagnostic::error(format!("unknown operator `{}`", head.inner()))
                    .with_code(ErrorCode::E102)
                    .with_label(head.span(), "not an operator")
                    .with_help(
                        "operators are + - * / pow exp abs sin cos tan asin acos atan \
                         atan2 min max avg fraction mod random integer",
                    ),
            ));
        };

        let operands: Vec<types::Sexp<'src>> = repeat(0.., sexp).parse_next(input)?;
        let close = right_paren.parse_next(input)?;

        let count = operands
            .iter()
            .filter(|operand| !matches!(operand, types::Sexp::Comment(_)))
            .count();
        if !kind.arity().accepts(count) {
            return Err(fail_with(
                Diagnostic::error(format!(
                    "`{}` takes {}, found {count}",
                    kind.symbol(),
                    kind.arity()
                ))
                .with_code(ErrorCode::E103)
                .with_label(open.union(close), "wrong number of operands")
                .with_secondary_label(head.span(), "operator used here"),
            ));
        }

        Ok(types::OperationForm {
            kind: Spanned::new(kind, head.span()),
            operands,
        })
    })
}

/// Parse a table index declaration: `(row prop)` or `(column prop)`
fn index_spec<'src>(input: &mut Input<'src>) -> IResult<types::IndexSpec<'src>> {
    left_paren.parse_next(input)?;
    let lookup = preceded(
        ws0,
        any.verify_map(|token: &PositionedToken<'_>| match token.token {
            Token::Row => Some(Spanned::new(Lookup::Row, token.span)),
            Token::Column => Some(Spanned::new(Lookup::Column, token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("`row` or `column`"))
    .parse_next(input)?;

    cut_err(input, |input| {
        let property = name.parse_next(input)?;
        right_paren.parse_next(input)?;
        Ok(types::IndexSpec { lookup, property })
    })
}

/// Parse a table: `(table name? index-spec{1,2} [rows])`
fn table_form<'src>(input: &mut Input<'src>) -> IResult<types::TableForm<'src>> {
    (left_paren, table_keyword).parse_next(input)?;

    cut_err(input, |input| {
        let name = opt(name).parse_next(input)?;
        let index: Vec<types::IndexSpec<'src>> = repeat(1..=2, index_spec)
            .context(Context::Label("`(row property)` or `(column property)`"))
            .parse_next(input)?;
        let data = table::table_literal.parse_next(input)?;
        right_paren.parse_next(input)?;

        Ok(types::TableForm { name, index, data })
    })
}

/// Parse a function definition: `(def "doc"? name sexp+)`
fn function<'src>(input: &mut Input<'src>) -> IResult<types::FunctionForm<'src>> {
    (left_paren, def_keyword).parse_next(input)?;

    cut_err(input, |input| {
        let doc = opt(docstring).parse_next(input)?;
        let name = name
            .context(Context::Label("function name"))
            .parse_next(input)?;
        let body: Vec<types::Sexp<'src>> = repeat(0.., sexp).parse_next(input)?;
        let close = right_paren.parse_next(input)?;

        if body
            .iter()
            .all(|expr| matches!(expr, types::Sexp::Comment(_)))
        {
            return Err(fail_with(
                Diagnostic::error(format!("function `{}` has no body", name.inner()))
                    .with_code(ErrorCode::E104)
                    .with_label(name.span().union(close), "expected an expression")
                    .with_help("a function needs at least one expression besides comments"),
            ));
        }

        Ok(types::FunctionForm { doc, name, body })
    })
}

/// Parse an axis block: `(axis TITLE (function | comment)*)`
fn axis<'src>(input: &mut Input<'src>) -> IResult<types::AxisForm<'src>> {
    (left_paren, axis_keyword).parse_next(input)?;

    cut_err(input, |input| {
        let title = raw_symbol
            .context(Context::Label("axis title"))
            .parse_next(input)?;
        let Some(kind) = AxisKind::from_title(title.inner()) else {
            return Err(fail_with(
                Diagnostic::error(format!("unknown axis `{}`", title.inner()))
                    .with_code(ErrorCode::E105)
                    .with_label(title.span(), "not an axis")
                    .with_help("axes are X, Y, Z, ROLL, PITCH and YAW"),
            ));
        };

        let entries: Vec<types::AxisEntry<'src>> = repeat(
            0..,
            alt((
                comment.map(types::AxisEntry::Comment),
                function.map(types::AxisEntry::Function),
            )),
        )
        .parse_next(input)?;
        right_paren.parse_next(input)?;

        Ok(types::AxisForm {
            kind: Spanned::new(kind, title.span()),
            entries,
        })
    })
}

/// Parse one top-level form
fn entry<'src>(input: &mut Input<'src>) -> IResult<types::Entry<'src>> {
    alt((
        comment.map(types::Entry::Comment),
        function.map(types::Entry::Function),
        axis.map(types::Entry::Axis),
    ))
    .context(Context::Label("`(def ...)`, `(axis ...)` or a comment"))
    .parse_next(input)
}

/// Parse a complete source unit: `spec := (function | axis | comment)*`
fn spec<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Entry<'src>>> {
    let entries = repeat(0.., entry).parse_next(input)?;
    (ws0, eof)
        .context(Context::Label("`(def ...)`, `(axis ...)` or a comment"))
        .parse_next(input)?;
    Ok(entries)
}

/// Parse exactly one expression followed by the end of input
fn lone_expression<'src>(input: &mut Input<'src>) -> IResult<types::Sexp<'src>> {
    let expr = sexp.parse_next(input)?;
    (ws0, eof)
        .context(Context::Label("end of input"))
        .parse_next(input)?;
    Ok(expr)
}

fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    current_remaining: usize,
) -> Diagnostic {
    let (ErrMode::Backtrack(e) | ErrMode::Cut(e)) = error else {
        // Streaming is never enabled, but report something sensible anyway.
        let error_span = tokens
            .iter()
            .rev()
            .find(|t| !t.is_trivia())
            .map(|t| t.span)
            .unwrap_or_default();
        return Diagnostic::error("incomplete input, more tokens expected")
            .with_code(ErrorCode::E101)
            .with_label(error_span, "incomplete")
            .with_help("ensure input is complete");
    };

    if let Some(diagnostic) = e.context().find_map(|ctx| match ctx {
        Context::Diagnostic(diagnostic) => Some(diagnostic.as_ref().clone()),
        _ => None,
    }) {
        return diagnostic;
    }

    let end_offset = tokens.len() - current_remaining;

    let labels: Vec<String> = e
        .context()
        .filter_map(|ctx| match ctx {
            Context::Label(label) => Some(format!("expected {label}")),
            _ => None,
        })
        .collect();
    let message = if labels.is_empty() {
        "unexpected token".to_string()
    } else {
        labels.join(" → ")
    };

    // The offending token is the first significant one at the failure point.
    let offending = tokens[end_offset..].iter().find(|t| !t.is_trivia());

    match offending {
        Some(token) => Diagnostic::error(format!("unexpected `{}`: {message}", token.token))
            .with_code(ErrorCode::E100)
            .with_label(token.span, "unexpected token")
            .with_help("check that every `(` has a matching `)`"),
        None => {
            let error_span = tokens
                .iter()
                .rev()
                .find(|t| !t.is_trivia())
                .map(|t| t.span)
                .unwrap_or_default();
            Diagnostic::error(format!("unexpected end of input: {message}"))
                .with_code(ErrorCode::E101)
                .with_label(error_span, "input ends here")
                .with_help("a form is missing its closing `)`")
        }
    }
}

/// Build the parse tree of a complete source unit from tokens
pub fn build_spec<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<Vec<types::Entry<'src>>, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    spec.parse_next(&mut token_slice).map_err(|e| {
        let current_remaining = token_slice.eof_offset();
        convert_error(e, tokens, current_remaining)
    })
}

/// Build the parse tree of a single expression from tokens
pub fn build_expression<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<types::Sexp<'src>, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    lone_expression.parse_next(&mut token_slice).map_err(|e| {
        let current_remaining = token_slice.eof_offset();
        convert_error(e, tokens, current_remaining)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_tokens(input: &str) -> Vec<PositionedToken<'_>> {
        tokenize(input).expect("Failed to tokenize input")
    }

    fn parse_error(input: &str) -> Diagnostic {
        let tokens = parse_tokens(input);
        build_spec(&tokens).expect_err("parsing should fail")
    }

    #[test]
    fn test_empty_source() {
        let tokens = parse_tokens("");
        assert!(build_spec(&tokens).unwrap().is_empty());

        let tokens = parse_tokens("  \n\t\n");
        assert!(build_spec(&tokens).unwrap().is_empty());
    }

    #[test]
    fn test_function_with_docstring() {
        let tokens = parse_tokens(r#"(def "Lift slope" aero/CLa 5.163)"#);
        let entries = build_spec(&tokens).unwrap();

        let [types::Entry::Function(function)] = entries.as_slice() else {
            panic!("expected one function, got {entries:?}");
        };
        assert_eq!(function.doc.as_ref().map(|d| d.inner().as_str()), Some("Lift slope"));
        assert_eq!(*function.name.inner(), "aero/CLa");
        assert_eq!(function.name.span(), Span::new(18..26));
        assert!(matches!(function.body.as_slice(), [types::Sexp::Value(v)] if *v.inner() == 5.163));
    }

    #[test]
    fn test_nested_operations() {
        let tokens = parse_tokens("(def f (* aero/qbar-psf (+ a 1) (sin b)))");
        let entries = build_spec(&tokens).unwrap();

        let [types::Entry::Function(function)] = entries.as_slice() else {
            panic!("expected one function");
        };
        let [types::Sexp::Operation(product)] = function.body.as_slice() else {
            panic!("expected an operation body");
        };
        assert_eq!(*product.kind.inner(), OpKind::Product);
        assert_eq!(product.operands.len(), 3);
        assert!(matches!(&product.operands[1], types::Sexp::Operation(op) if *op.kind.inner() == OpKind::Sum));
        assert!(matches!(&product.operands[2], types::Sexp::Operation(op) if *op.kind.inner() == OpKind::Sin));
    }

    #[test]
    fn test_comments_everywhere() {
        let source = "; header\n(axis X ; inside axis\n (def f ; in body\n (+ ; in op\n a b)))";
        let tokens = parse_tokens(source);
        let entries = build_spec(&tokens).unwrap();

        assert_eq!(entries.len(), 2);
        assert!(matches!(&entries[0], types::Entry::Comment(text) if *text.inner() == " header"));
        let types::Entry::Axis(axis) = &entries[1] else {
            panic!("expected an axis");
        };
        assert_eq!(*axis.kind.inner(), AxisKind::X);
        assert_eq!(axis.entries.len(), 2);
    }

    #[test]
    fn test_table_with_two_indices() {
        let source = "(def f (table tbl (row alpha) (column beta) [\"\" 0 1, -1 0.1 0.2, 1 0.3 0.4]))";
        let tokens = parse_tokens(source);
        let entries = build_spec(&tokens).unwrap();

        let types::Entry::Function(function) = &entries[0] else {
            panic!("expected a function");
        };
        let [types::Sexp::Table(table)] = function.body.as_slice() else {
            panic!("expected a table body");
        };
        assert_eq!(table.name.as_ref().map(|n| *n.inner()), Some("tbl"));
        assert_eq!(table.index.len(), 2);
        assert_eq!(*table.index[1].lookup.inner(), Lookup::Column);
        assert_eq!(
            table.data.inner(),
            &vec![
                vec![None, Some(0.0), Some(1.0)],
                vec![Some(-1.0), Some(0.1), Some(0.2)],
                vec![Some(1.0), Some(0.3), Some(0.4)],
            ]
        );
    }

    #[test]
    fn test_unknown_operator() {
        let diag = parse_error("(def f (frobnicate a))");
        assert_eq!(diag.code(), Some(ErrorCode::E102));
        assert_eq!(diag.primary_span(), Some(Span::new(8..18)));
    }

    #[test]
    fn test_wrong_operand_count() {
        let diag = parse_error("(def f (atan2 y))");
        assert_eq!(diag.code(), Some(ErrorCode::E103));
        assert!(diag.message().contains("exactly 2 operands"));

        let diag = parse_error("(def f (random 1))");
        assert_eq!(diag.code(), Some(ErrorCode::E103));

        let diag = parse_error("(def f (- a))");
        assert_eq!(diag.code(), Some(ErrorCode::E103));
    }

    #[test]
    fn test_comments_do_not_count_as_operands() {
        let diag = parse_error("(def f (sin ; angle\n))");
        assert_eq!(diag.code(), Some(ErrorCode::E103));

        let tokens = parse_tokens("(def f (random ; noise\n))");
        assert!(build_spec(&tokens).is_ok());
    }

    #[test]
    fn test_empty_function_body() {
        assert_eq!(parse_error("(def f)").code(), Some(ErrorCode::E104));
        assert_eq!(parse_error("(def f ; nothing\n)").code(), Some(ErrorCode::E104));
    }

    #[test]
    fn test_missing_function_name() {
        let diag = parse_error("(def (+ a b))");
        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert!(diag.message().contains("function name"));
    }

    #[test]
    fn test_unknown_axis() {
        let diag = parse_error("(axis LIFT (def f 1))");
        assert_eq!(diag.code(), Some(ErrorCode::E105));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let diag = parse_error("(def f (+ a b)");
        assert_eq!(diag.code(), Some(ErrorCode::E101));

        let diag = parse_error("(def f 1))");
        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert_eq!(diag.primary_span(), Some(Span::new(9..10)));
    }

    #[test]
    fn test_bare_expression_at_top_level() {
        let diag = parse_error("(+ 1 2)");
        assert_eq!(diag.code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_axis_nested_in_function() {
        let diag = parse_error("(def f (axis X))");
        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert!(diag.message().contains("expected operator"));
    }

    #[test]
    fn test_lone_expression() {
        let tokens = parse_tokens("  (pow a 2) ");
        let expr = build_expression(&tokens).unwrap();
        assert!(matches!(expr, types::Sexp::Operation(op) if *op.kind.inner() == OpKind::Pow));

        let tokens = parse_tokens("(pow a 2) b");
        assert!(build_expression(&tokens).is_err());
    }
}
