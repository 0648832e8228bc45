use tracing::warn;

use super::planner::Edit;

/// Apply `edits` to `source` in a single pass.
///
/// Edits must be sorted by start offset. Any edit that is out of bounds,
/// splits a UTF-8 character or overlaps the previous applied edit is skipped
/// with a warning; all other text is copied verbatim.
pub fn apply_edits(source: &str, edits: &[Edit]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0usize;
    for edit in edits {
        let (start, end) = (edit.span.start, edit.span.end);
        let valid = start <= end
            && end <= source.len()
            && source.is_char_boundary(start)
            && source.is_char_boundary(end);
        if !valid || start < cursor {
            warn!(start, end, index = edit.index, "skipping unusable edit");
            continue;
        }
        out.push_str(&source[cursor..start]);
        out.push_str(&edit.replacement);
        cursor = end;
    }
    out.push_str(&source[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Span;

    fn edit(start: usize, end: usize, index: u32) -> Edit {
        Edit {
            span: Span::new(start, end),
            replacement: format!("${index}"),
            index,
            candidate: 0,
        }
    }

    #[test]
    fn splices_placeholders_and_keeps_the_rest() {
        let sql = "SELECT 1, 'two' FROM t";
        let out = apply_edits(sql, &[edit(7, 8, 1), edit(10, 15, 2)]);
        assert_eq!(out, "SELECT $1, $2 FROM t");
    }

    #[test]
    fn no_edits_is_identity() {
        let sql = "SELECT a /* comment */ FROM t";
        assert_eq!(apply_edits(sql, &[]), sql);
    }

    #[test]
    fn bad_edits_are_skipped() {
        let sql = "SELECT 'é', 2";
        // 8..9 splits the two-byte character.
        let out = apply_edits(sql, &[edit(8, 9, 1), edit(13, 14, 2), edit(13, 14, 3), edit(40, 41, 4)]);
        assert_eq!(out, "SELECT 'é', $2");
    }
}
