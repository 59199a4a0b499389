//! Persisted board format.
//!
//! ```text
//! FILE    ::= BOARD LINE+
//! BOARD   ::= X SPACE Y NEWLINE
//! LINE    ::= (VAL SPACE)* VAL NEWLINE
//! VAL     ::= 0 | 1
//! NEWLINE ::= "\n" | "\r" "\n"?
//! ```
//!
//! A final line terminator is optional.

use crate::error::{BoardError, Result};
use crate::types::Cell;

/// Split `text` on `\n`, `\r\n` or a bare `\r`, dropping one trailing
/// terminator.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let body = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .or_else(|| text.strip_suffix('\r'))
        .unwrap_or(text);

    let mut lines = Vec::new();
    let mut rest = body;
    loop {
        match rest.find(['\r', '\n']) {
            Some(pos) => {
                lines.push(&rest[..pos]);
                let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[pos + skip..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }
    lines
}

/// Parse the `WIDTH HEIGHT` header line.
pub(crate) fn parse_header(line: &str) -> Result<(u32, u32)> {
    let malformed = || BoardError::MalformedHeader(line.to_string());

    let mut parts = line.split(' ');
    let (Some(width), Some(height), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };
    let width = parse_dimension(width).ok_or_else(malformed)?;
    let height = parse_dimension(height).ok_or_else(malformed)?;
    if width == 0 || height == 0 {
        return Err(BoardError::EmptyBoard);
    }
    Ok((width, height))
}

fn parse_dimension(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Parse exactly `height` rows of exactly `width` mine tokens into cells,
/// row-major.
pub(crate) fn parse_rows<S: AsRef<str>>(width: usize, height: usize, rows: &[S]) -> Result<Vec<Cell>> {
    if rows.len() != height {
        return Err(BoardError::RowCount {
            expected: height,
            found: rows.len(),
        });
    }

    // Grown row by row: the header alone must not size the allocation.
    let mut cells = Vec::new();
    for (row, line) in rows.iter().enumerate() {
        let tokens: Vec<&str> = line.as_ref().split(' ').collect();
        if tokens.len() != width {
            return Err(BoardError::ColumnCount {
                row,
                expected: width,
                found: tokens.len(),
            });
        }
        cells.reserve(width);
        for (column, token) in tokens.into_iter().enumerate() {
            let cell = match token {
                "0" => Cell::empty(),
                "1" => Cell::mined(),
                other => {
                    return Err(BoardError::InvalidToken {
                        row,
                        column,
                        token: other.to_string(),
                    })
                }
            };
            cells.push(cell);
        }
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_accepts_every_terminator() {
        let lines = split_lines("a\nb\r\nc\rd\n");
        assert_eq!(lines, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn split_lines_without_final_terminator() {
        assert_eq!(split_lines("0 1\n1 0"), vec!["0 1", "1 0"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn split_lines_keeps_inner_blank_lines() {
        assert_eq!(split_lines("0\n\n"), vec!["0", ""]);
    }

    #[test]
    fn header_requires_two_plain_integers() {
        assert_eq!(parse_header("3 2").unwrap(), (3, 2));
        assert!(matches!(parse_header("3"), Err(BoardError::MalformedHeader(_))));
        assert!(matches!(parse_header("3 2 1"), Err(BoardError::MalformedHeader(_))));
        assert!(matches!(parse_header("3  2"), Err(BoardError::MalformedHeader(_))));
        assert!(matches!(parse_header("+3 2"), Err(BoardError::MalformedHeader(_))));
        assert!(matches!(parse_header("x 2"), Err(BoardError::MalformedHeader(_))));
        assert!(matches!(parse_header("0 2"), Err(BoardError::EmptyBoard)));
    }

    #[test]
    fn rows_must_match_dimensions() {
        assert!(matches!(
            parse_rows(2, 2, &["0 0"]),
            Err(BoardError::RowCount { expected: 2, found: 1 })
        ));
        assert!(matches!(
            parse_rows(2, 1, &["0 0 0"]),
            Err(BoardError::ColumnCount { row: 0, expected: 2, found: 3 })
        ));
        assert!(matches!(
            parse_rows(2, 1, &["0  0"]),
            Err(BoardError::ColumnCount { .. })
        ));
    }

    #[test]
    fn huge_width_fails_on_column_count() {
        assert!(matches!(
            parse_rows(4_000_000_000, 1, &["0"]),
            Err(BoardError::ColumnCount { row: 0, expected: 4_000_000_000, found: 1 })
        ));
    }

    #[test]
    fn rows_reject_non_binary_tokens() {
        let err = parse_rows(3, 1, &["0 2 1"]).unwrap_err();
        match err {
            BoardError::InvalidToken { row, column, token } => {
                assert_eq!((row, column), (0, 1));
                assert_eq!(token, "2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rows_map_tokens_to_cells() {
        let cells = parse_rows(2, 2, &["1 0", "0 1"]).unwrap();
        let mines: Vec<bool> = cells.iter().map(|c| c.has_mine).collect();
        assert_eq!(mines, vec![true, false, false, true]);
    }
}
