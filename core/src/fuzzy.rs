//! Close-match search over candidate strings using the Ratcliff/Obershelp
//! "gestalt" ratio: `2 * M / T`, where `M` is the number of characters in the
//! matching blocks found by recursively taking the longest common substring,
//! and `T` is the combined length of both strings.

use std::collections::HashMap;

/// A candidate that cleared the cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloseMatch {
    /// Position of the candidate in the input sequence.
    pub index: usize,
    pub ratio: f64,
}

/// Similarity ratio in `[0, 1]`. `a` is the candidate and `b` the query; the block search
/// is not symmetric, so argument order matters for rare inputs.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(a, b) as f64 / total as f64
}

/// Upper bound on `ratio` from lengths alone.
fn length_bound(la: usize, lb: usize) -> f64 {
    let total = la + lb;
    if total == 0 { 1.0 } else { 2.0 * la.min(lb) as f64 / total as f64 }
}

/// Total size of the matching blocks between `a` and `b`.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest block `a[i..i+k] == b[j..j+k]` inside the given ranges. Among equally long
/// blocks the one starting earliest in `a`, then earliest in `b`, wins.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // j2len[j] = length of the match ending at a[i-1], b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for i in alo..ahi {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(&a[i]) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                next.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        j2len = next;
    }
    (best_i, best_j, best_k)
}

/// Candidates whose ratio against `query` is at least `cutoff`, best first, at most `limit`.
/// Equal ratios keep input order.
pub fn close_matches<'a, I>(query: &str, candidates: I, limit: usize, cutoff: f64) -> Vec<CloseMatch>
where
    I: IntoIterator<Item = &'a str>,
{
    if limit == 0 {
        return Vec::new();
    }
    let q: Vec<char> = query.chars().collect();
    let mut found: Vec<CloseMatch> = Vec::new();
    for (index, candidate) in candidates.into_iter().enumerate() {
        let c: Vec<char> = candidate.chars().collect();
        if length_bound(c.len(), q.len()) < cutoff {
            continue;
        }
        let ratio = ratio_chars(&c, &q);
        if ratio >= cutoff {
            found.push(CloseMatch { index, ratio });
        }
    }
    // stable: ties stay in input order
    found.sort_by(|x, y| y.ratio.total_cmp(&x.ratio));
    found.truncate(limit);
    found
}
