/// Levenshtein distance between two character slices.
pub fn levenshtein(a: &[char], b: &[char]) -> usize {
    strsim::generic_levenshtein(&a.to_vec(), &b.to_vec())
}

/// Levenshtein distance with an early-exit cap.
///
/// Returns `Some(distance)` when the distance is at most `bound`, otherwise `None`.
/// Only two DP rows are kept; the scan stops as soon as the minimum of a row
/// exceeds `bound`, since no later row can fall back below it.
pub fn bounded_levenshtein(a: &[char], b: &[char], bound: usize) -> Option<usize> {
    if a.len().abs_diff(b.len()) > bound {
        return None;
    }
    if a.is_empty() {
        return Some(b.len());
    }
    if b.is_empty() {
        return Some(a.len());
    }

    let n = b.len();
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];

        for j in 1..=n {
            let cost = usize::from(ca != b[j - 1]);
            let d = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            curr[j] = d;
            row_min = row_min.min(d);
        }

        if row_min > bound {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[n];
    (distance <= bound).then_some(distance)
}

/// Normalized similarity in `[0, 1]`: `1 - distance / max(len(a), len(b))`.
pub fn similarity_from_distance(distance: usize, a_len: usize, b_len: usize) -> f64 {
    let max_len = a_len.max(b_len);
    if max_len == 0 {
        return 1.0;
    }
    1.0 - distance.min(max_len) as f64 / max_len as f64
}
