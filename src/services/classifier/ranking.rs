use crate::models::diagnosis_types::{DiagnosisClass, RankedEntry};
use std::cmp::Ordering;

/// Parses percentage text such as `"92.5%"` or `" 7 "`.
pub fn parse_percentage(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    number.parse::<f64>().ok().filter(|value| !value.is_nan())
}

/// Orders a probability map for display, highest first.
///
/// Unparseable percentages sink to the bottom instead of failing the whole
/// ranking. The sort is stable, so equal values keep the service's order.
pub fn rank<'a, I>(probabilities: I) -> Vec<RankedEntry>
where
    I: IntoIterator<Item = &'a (String, String)>,
{
    let mut entries: Vec<RankedEntry> = probabilities
        .into_iter()
        .map(|(label, text)| RankedEntry {
            label: label.clone(),
            display_name: DiagnosisClass::from_label(label).display_name().to_string(),
            percentage: parse_percentage(text).unwrap_or(f64::NEG_INFINITY),
            percentage_text: text.clone(),
            is_top: false,
        })
        .collect();

    entries.sort_by(|a, b| b.percentage.partial_cmp(&a.percentage).unwrap_or(Ordering::Equal));

    if let Some(first) = entries.first_mut() {
        first.is_top = true;
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_percentage() {
        assert_eq!(parse_percentage("92.5%"), Some(92.5));
        assert_eq!(parse_percentage(" 7 "), Some(7.0));
        assert_eq!(parse_percentage("0.8 %"), Some(0.8));
        assert_eq!(parse_percentage("n/a"), None);
        assert_eq!(parse_percentage("NaN%"), None);
        assert_eq!(parse_percentage(""), None);
    }

    #[test]
    fn test_rank_sorts_descending_with_single_top() {
        let probabilities = map(&[
            ("Healthy", "10.1%"),
            ("Common_Rust", "87.3%"),
            ("Gray_Leaf_Spot", "0.8%"),
            ("Blight", "1.8%"),
        ]);
        let ranked = rank(&probabilities);

        let labels: Vec<&str> = ranked.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Common_Rust", "Healthy", "Blight", "Gray_Leaf_Spot"]);
        assert_eq!(ranked.iter().filter(|e| e.is_top).count(), 1);
        assert!(ranked[0].is_top);
        assert_eq!(ranked[0].display_name, "Roya Común");
        assert_eq!(ranked[0].percentage_text, "87.3%");
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let probabilities = map(&[("Blight", "50%"), ("Healthy", "50.0"), ("Other", "10%")]);
        let ranked = rank(&probabilities);
        assert_eq!(ranked[0].label, "Blight");
        assert!(ranked[0].is_top);
        assert_eq!(ranked[1].label, "Healthy");
        assert!(!ranked[1].is_top);
    }

    #[test]
    fn test_corrupt_entry_sinks_to_bottom() {
        let probabilities = map(&[("Blight", "garbage"), ("Healthy", "3%"), ("Common_Rust", "1%")]);
        let ranked = rank(&probabilities);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].label, "Healthy");
        assert_eq!(ranked[2].label, "Blight");
        assert_eq!(ranked[2].percentage, f64::NEG_INFINITY);
    }

    #[test]
    fn test_all_corrupt_still_has_top() {
        let probabilities = map(&[("A", "?"), ("B", "??")]);
        let ranked = rank(&probabilities);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "A");
        assert!(ranked[0].is_top);
    }

    #[test]
    fn test_unmapped_label_passes_through() {
        let probabilities = map(&[("Northern_Leaf_Blight", "99%")]);
        let ranked = rank(&probabilities);
        assert_eq!(ranked[0].display_name, "Northern_Leaf_Blight");
    }

    /// Small deterministic generator so failures reproduce.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: u64) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 33) % bound
        }
    }

    #[test]
    fn test_generated_maps_hold_ranking_invariants() {
        let mut rng = Lcg(0x5eed);

        for _ in 0..500 {
            let n = 1 + rng.next(10) as usize;
            // Coarse values so ties are common; some entries unparseable.
            let probabilities: Vec<(String, String)> = (0..n)
                .map(|i| {
                    let text = match rng.next(12) {
                        0 => "n/a".to_string(),
                        v => format!("{}.5%", v * 8),
                    };
                    (format!("C{}", i), text)
                })
                .collect();

            let ranked = rank(&probabilities);

            assert_eq!(ranked.len(), n);
            assert_eq!(ranked.iter().filter(|e| e.is_top).count(), 1);
            assert!(ranked[0].is_top);

            for pair in ranked.windows(2) {
                assert!(pair[0].percentage >= pair[1].percentage, "{:?}", probabilities);
                if pair[0].percentage == pair[1].percentage {
                    let first: usize = pair[0].label[1..].parse().unwrap();
                    let second: usize = pair[1].label[1..].parse().unwrap();
                    assert!(first < second, "tie order broken in {:?}", probabilities);
                }
            }
        }
    }

    #[test]
    fn test_empty_map_yields_empty_ranking() {
        let ranked = rank(&Vec::<(String, String)>::new());
        assert!(ranked.is_empty());
    }
}
