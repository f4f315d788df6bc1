//! Table literal sub-grammar.
//!
//! ```text
//! table-literal := "[" row ("," row)* ","? "]"
//! row           := cell+
//! cell          := number | ""
//! ```
//!
//! The width of a table is chosen by its author, so it cannot be part of a
//! fixed grammar. Parsing happens in two phases: the first row is read
//! freely and fixes the width `N`, then every later row is read by a row
//! rule bound to `N`.

use winnow::{
    Parser as _,
    combinator::{opt, preceded, repeat},
    token::any,
};

use aerolisp_core::span::{Span, Spanned};

use super::{Context, IResult, Input, comma, fail_with, left_bracket, right_bracket, ws0};
use crate::{
    error::{Diagnostic, ErrorCode},
    tokens::{PositionedToken, Token},
};

/// Parse one cell: a number, or `""` for an omitted value.
fn cell<'src>(input: &mut Input<'src>) -> IResult<Spanned<Option<f64>>> {
    preceded(
        ws0,
        any.verify_map(|token: &PositionedToken<'_>| match &token.token {
            Token::Number(value) => Some(Spanned::new(Some(*value), token.span)),
            Token::StringLiteral(text) if text.is_empty() => Some(Spanned::new(None, token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("table cell"))
    .parse_next(input)
}

/// Parse the cells of row `row`.
///
/// Only the corner cell of the first row may be empty.
fn cells<'src>(input: &mut Input<'src>, row: usize) -> IResult<Spanned<Vec<Option<f64>>>> {
    let cells: Vec<Spanned<Option<f64>>> = repeat(1.., cell).parse_next(input)?;

    if let Some((column, misplaced)) = cells
        .iter()
        .enumerate()
        .find(|(column, cell)| cell.is_none() && (row, *column) != (0, 0))
    {
        return Err(fail_with(
            Diagnostic::error(format!(
                "empty cell in row {row}, column {column} of a table"
            ))
            .with_code(ErrorCode::E201)
            .with_label(misplaced.span(), "misplaced empty cell")
            .with_help("`\"\"` may only stand in the top-left corner of a two-dimensional table"),
        ));
    }

    let span = match (cells.first(), cells.last()) {
        (Some(first), Some(last)) => first.span().union(last.span()),
        _ => Span::default(),
    };
    Ok(Spanned::new(
        cells.into_iter().map(Spanned::into_inner).collect(),
        span,
    ))
}

/// Phase one: the first row, whose length becomes the table width.
fn header_row<'src>(input: &mut Input<'src>) -> IResult<Spanned<Vec<Option<f64>>>> {
    cells(input, 0)
}

/// Phase two: a row rule bound to the width learned from the header.
fn row_of_width<'src>(
    header: Spanned<usize>,
    index: usize,
) -> impl FnMut(&mut Input<'src>) -> IResult<Vec<Option<f64>>> {
    move |input: &mut Input<'src>| {
        let row = cells(input, index)?;
        let width = *header.inner();
        if row.len() != width {
            return Err(fail_with(
                Diagnostic::error(format!(
                    "table row {index} has {} entries, expected {width}",
                    row.len()
                ))
                .with_code(ErrorCode::E200)
                .with_label(row.span(), format!("{} entries", row.len()))
                .with_secondary_label(header.span(), format!("first row has {width} entries")),
            ));
        }
        Ok(row.into_inner())
    }
}

/// Parse a table literal into a rectangular grid.
pub(super) fn table_literal<'src>(
    input: &mut Input<'src>,
) -> IResult<Spanned<Vec<Vec<Option<f64>>>>> {
    let open = left_bracket.parse_next(input)?;

    let header = header_row.parse_next(input)?;
    let width = header.map(Vec::len);
    let mut rows = vec![header.into_inner()];

    while opt(comma).parse_next(input)?.is_some() {
        // A comma right before `]` is a trailing separator.
        match opt(row_of_width(width.clone(), rows.len())).parse_next(input)? {
            Some(row) => rows.push(row),
            None => break,
        }
    }

    let close = right_bracket.parse_next(input)?;
    Ok(Spanned::new(rows, open.union(close)))
}

#[cfg(test)]
mod tests {
    use winnow::stream::{Stream, TokenSlice};

    use super::*;
    use crate::lexer::tokenize;

    fn parse_table(source: &str) -> Result<Vec<Vec<Option<f64>>>, Diagnostic> {
        let tokens = tokenize(source).expect("Failed to tokenize input");
        let mut slice = TokenSlice::new(&tokens);
        table_literal
            .parse_next(&mut slice)
            .map(Spanned::into_inner)
            .map_err(|e| super::super::convert_error(e, &tokens, slice.eof_offset()))
    }

    #[test]
    fn test_one_dimensional_table() {
        let data = parse_table("[-1.57 0, -0.2 -1.1, 0.2 1.1, 1.57 0]").unwrap();
        assert_eq!(data.len(), 4);
        assert!(data.iter().all(|row| row.len() == 2));
        assert_eq!(data[1], vec![Some(-0.2), Some(-1.1)]);
    }

    #[test]
    fn test_corner_marker() {
        let data = parse_table("[\"\" 0 10,\n 0 1 2,\n 5 3 4,\n]").unwrap();
        assert_eq!(data[0], vec![None, Some(0.0), Some(10.0)]);
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_single_row() {
        assert_eq!(parse_table("[1 2 3]").unwrap(), vec![vec![Some(1.0), Some(2.0), Some(3.0)]]);
        assert_eq!(parse_table("[1 2 3,]").unwrap().len(), 1);
    }

    #[test]
    fn test_short_row() {
        let diag = parse_table("[1 2 3, 4 5 6, 7 8]").unwrap_err();
        assert_eq!(diag.code(), Some(ErrorCode::E200));
        assert_eq!(diag.message(), "table row 2 has 2 entries, expected 3");
        assert_eq!(diag.labels().len(), 2);
    }

    #[test]
    fn test_long_row() {
        let diag = parse_table("[1 2, 3 4 5]").unwrap_err();
        assert_eq!(diag.code(), Some(ErrorCode::E200));
        assert_eq!(diag.message(), "table row 1 has 3 entries, expected 2");
    }

    #[test]
    fn test_misplaced_empty_marker() {
        let diag = parse_table("[1 \"\", 3 4]").unwrap_err();
        assert_eq!(diag.code(), Some(ErrorCode::E201));

        let diag = parse_table("[\"\" 1, \"\" 4]").unwrap_err();
        assert_eq!(diag.code(), Some(ErrorCode::E201));
    }

    #[test]
    fn test_empty_row() {
        let diag = parse_table("[1 2, , 3 4]").unwrap_err();
        assert_eq!(diag.code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_empty_table() {
        assert!(parse_table("[]").is_err());
    }
}
