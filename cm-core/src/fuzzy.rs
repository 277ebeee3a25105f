//! Ordered-subsequence ranking of candidate names against an abbreviation.
//!
//! Each query character is matched, in order, at the earliest candidate
//! position not before the previous match. The score is the sum of the
//! matched positions, so matches that start early and stay tight rank first.
//! Comparison is literal: case-sensitive, no normalization.

/// A candidate that contains the query as an ordered subsequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedCandidate {
    pub candidate: String,
    pub score: usize,
    /// Position of the candidate in the input slice.
    pub index: usize,
}

/// Matched position for each query character, or `None` when the query is
/// not an ordered subsequence of the candidate.
pub fn positions(query: &str, candidate: &str) -> Option<Vec<usize>> {
    let chars: Vec<char> = candidate.chars().collect();
    // inclusive lower bound for the next match
    let mut last_pos = 0usize;
    let mut out = Vec::new();

    for wanted in query.chars() {
        let pos = chars
            .iter()
            .skip(last_pos)
            .position(|&c| c == wanted)
            .map(|offset| last_pos + offset)?;
        out.push(pos);
        last_pos = pos;
    }

    Some(out)
}

pub fn score(query: &str, candidate: &str) -> Option<usize> {
    positions(query, candidate).map(|pos| pos.iter().sum())
}

/// Ranks candidates best first. Non-matching candidates are dropped and ties
/// keep input order.
pub fn rank<S: AsRef<str>>(query: &str, candidates: &[S]) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| {
            let candidate = candidate.as_ref();
            score(query, candidate).map(|score| RankedCandidate {
                candidate: candidate.to_string(),
                score,
                index,
            })
        })
        .collect();

    // sort_by_key is stable
    ranked.sort_by_key(|r| r.score);
    ranked
}

/// The single best candidate, if any.
pub fn best<S: AsRef<str>>(query: &str, candidates: &[S]) -> Option<RankedCandidate> {
    rank(query, candidates).into_iter().next()
}
