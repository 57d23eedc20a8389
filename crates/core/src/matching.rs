//! Fuzzy title matching for the CSV link pipeline.
//!
//! Rows without a direct key are matched against existing media titles
//! by a normalized longest-common-subsequence ratio. The scan is O(n)
//! across candidate titles per row; fine at catalog scale (hundreds of
//! rows). An indexed approximate-matching structure would be the next
//! step if that ever changes.

/// Minimum similarity for a fuzzy title match to be accepted. Scores
/// must be strictly greater than this value.
pub const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Normalized similarity of two strings in `[0.0, 1.0]`.
///
/// Case-insensitive. Computed as `2 * LCS(a, b) / (|a| + |b|)` over
/// characters, so identical strings score 1.0 and disjoint strings 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let lcs = lcs_len(&a, &b);
    (2 * lcs) as f64 / (a.len() + b.len()) as f64
}

/// Longest-common-subsequence length, single-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Pick the candidate most similar to `target`, if any clears the
/// threshold. Returns the candidate's index and its score; on ties the
/// earlier candidate wins (scores must strictly improve to displace).
pub fn best_match<'a, I>(target: &str, candidates: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.into_iter().enumerate() {
        let score = similarity(target, candidate);
        if score > SIMILARITY_THRESHOLD && best.map_or(true, |(_, s)| score > s) {
            best = Some((idx, score));
        }
    }
    best
}
