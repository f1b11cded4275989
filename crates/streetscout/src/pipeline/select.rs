//! Best-of-N selection over scored views.

use super::outcome::Candidate;

/// Keep `current` unless `next` scores strictly higher.
///
/// Ties go to the earlier candidate, so the visit order decides.
#[inline]
pub fn pick_better(current: Candidate, next: Candidate) -> Candidate {
    if next.score > current.score {
        next
    } else {
        current
    }
}

/// Highest-scoring candidate of the sequence, first one on ties.
pub fn best_candidate<I>(candidates: I) -> Option<Candidate>
where
    I: IntoIterator<Item = Candidate>,
{
    candidates.into_iter().fold(None, |best, next| {
        Some(match best {
            None => next,
            Some(current) => pick_better(current, next),
        })
    })
}
