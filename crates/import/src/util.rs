/// Levenshtein distance over Unicode scalar values, so `ä` counts as one edit.
pub fn edit_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    // Keep the shorter string in the inner loop.
    let (a, b) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if a.is_empty() {
        return b.len();
    }

    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut curr = vec![0usize; a.len() + 1];

    for (i, cb) in b.iter().enumerate() {
        curr[0] = i + 1;
        for (j, ca) in a.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[a.len()]
}

/// Similarity in `0.0..=1.0`, where 1.0 means identical.
pub fn similarity(s1: &str, s2: &str) -> f32 {
    let max_len = s1.chars().count().max(s2.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (edit_distance(s1, s2) as f32 / max_len as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_are_zero() {
        assert_eq!(edit_distance("Mustermann", "Mustermann"), 0);
        assert_eq!(edit_distance("", ""), 0);
    }

    #[test]
    fn empty_string_is_length_of_other() {
        assert_eq!(edit_distance("", "Bar"), 3);
        assert_eq!(edit_distance("Müller", ""), 6);
    }

    #[test]
    fn umlaut_is_one_substitution() {
        assert_eq!(edit_distance("Mueller", "Müller"), 2);
        assert_eq!(edit_distance("Muller", "Müller"), 1);
    }

    #[test]
    fn insertion_and_deletion() {
        assert_eq!(edit_distance("PayPal", "PayPal Europe"), 7);
        assert_eq!(edit_distance("Rewe Markt", "Rewe"), 6);
    }

    #[test]
    fn symmetric() {
        assert_eq!(
            edit_distance("stadtwerke", "stadtwerk münchen"),
            edit_distance("stadtwerk münchen", "stadtwerke")
        );
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert!(similarity("muller", "müller") > 0.8);
    }
}
