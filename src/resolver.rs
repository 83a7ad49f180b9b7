/*!
Conflict resolution: reducing an unordered, possibly overlapping candidate list to a consistent
non-overlapping annotation. The algorithm is greedy longest-match interval scheduling: longer
candidates win, the leftmost wins among equally long ones, and a discarded candidate is never
revisited. This is a heuristic, not an optimal-coverage interval scheduler; a caller that needs
to maximize total coverage or span count must substitute a weighted interval-scheduling
algorithm instead.
*/
use crate::span::{Candidate, Span};

/// Resolves `candidates` into a non-overlapping span list, sorted by start offset. The output is
/// always a subset of the input, labels are preserved, and resolving an already non-overlapping
/// set returns it unchanged.
pub fn resolve(mut candidates: Vec<Candidate>) -> Vec<Span> {
    candidates.sort_by(|a, b| {
        b.match_length()
            .cmp(&a.match_length())
            .then(a.span.start.cmp(&b.span.start))
    });
    let mut accepted: Vec<Span> = Vec::new();
    for candidate in candidates {
        let overlaps = accepted.iter().any(|span| span.overlaps(&candidate.span));
        if !overlaps {
            accepted.push(candidate.span);
        }
    }
    accepted.sort_by_key(|span| span.start);
    accepted
}
