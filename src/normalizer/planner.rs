use std::collections::HashMap;

use super::rules::Disposition;
use super::walker::{Candidate, PlaceholderRef};
use crate::parser::lexer::Span;

/// One planned substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Byte range to replace.
    pub span: Span,
    /// Placeholder text, `$n`.
    pub replacement: String,
    /// Placeholder index `n`.
    pub index: u32,
    /// Index into the candidate list the edit came from.
    pub candidate: usize,
}

/// Turn the replaceable candidates of one statement into edits.
///
/// Edits come out ordered by start offset and never overlap: when two
/// candidates overlap, the one starting first (the longer one on ties) wins.
/// Fresh indices continue from `*next`, which is advanced past the last one
/// handed out. Candidates carrying a reuse link take the index of their
/// source instead.
pub fn plan(candidates: &[Candidate], next: &mut u32) -> Vec<Edit> {
    let mut order: Vec<usize> = (0..candidates.len())
        .filter(|&idx| candidates[idx].disposition == Disposition::Replace)
        .collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (candidates[a].span, candidates[b].span);
        a.start.cmp(&b.start).then(b.end.cmp(&a.end))
    });

    let mut assigned: HashMap<usize, u32> = HashMap::new();
    let mut edits: Vec<Edit> = Vec::with_capacity(order.len());
    let mut covered_to = 0usize;
    for idx in order {
        let candidate = &candidates[idx];
        if !edits.is_empty() && candidate.span.start < covered_to {
            continue;
        }
        let index = match candidate.reuse {
            Some(PlaceholderRef::Existing(index)) => index,
            Some(PlaceholderRef::Candidate(source)) => match assigned.get(&source) {
                Some(&index) => index,
                None => fresh(next),
            },
            None => fresh(next),
        };
        assigned.insert(idx, index);
        covered_to = candidate.span.end;
        edits.push(Edit {
            span: candidate.span,
            replacement: format!("${index}"),
            index,
            candidate: idx,
        });
    }
    edits
}

fn fresh(next: &mut u32) -> u32 {
    *next += 1;
    *next
}
