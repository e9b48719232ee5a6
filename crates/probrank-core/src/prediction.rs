//! Ranked label → probability results

use crate::ordered::OrderedMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of decimal digits kept on every reported probability
pub const PROBABILITY_DECIMALS: usize = 6;

/// Round a probability to [`PROBABILITY_DECIMALS`] decimal places.
///
/// Rounds the exact decimal expansion of the stored value, so the result is
/// the nearest 6-digit decimal rather than an artifact of scaling by 1e6.
pub fn round_probability(p: f64) -> f64 {
    if !p.is_finite() {
        return p;
    }
    format!("{:.*}", PROBABILITY_DECIMALS, p)
        .parse()
        .unwrap_or(p)
}

/// Label → probability mapping ordered by descending probability.
///
/// Entries with equal rounded probability keep the order in which they were
/// supplied, which for classifier output is ascending class index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedPrediction {
    entries: OrderedMap<f64>,
}

impl RankedPrediction {
    /// Round and rank `(label, probability)` pairs given in class-index order
    pub fn from_scores<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut scored: Vec<(String, f64)> = scores
            .into_iter()
            .map(|(label, p)| (label.into(), round_probability(p)))
            .collect();

        // `sort_by` is stable: ties stay in class-index order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let mut entries = OrderedMap::with_capacity(scored.len());
        for (label, p) in scored {
            entries.insert(label, p);
        }
        Self { entries }
    }

    /// Probability for a label
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries.get(label).copied()
    }

    /// Highest-ranked label and its probability
    pub fn top(&self) -> Option<(&str, f64)> {
        self.entries.iter().next().map(|(l, p)| (l, *p))
    }

    /// Labels in rank order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys()
    }

    /// `(label, probability)` pairs in rank order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(l, p)| (l, *p))
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the prediction has no labels
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rounding_to_six_places() {
        assert_eq!(round_probability(0.123456789), 0.123457);
        assert_eq!(round_probability(0.1234564), 0.123456);
        assert_eq!(round_probability(1.0), 1.0);
        assert_eq!(round_probability(0.0000004), 0.0);
    }

    #[test]
    fn test_sorted_descending() {
        let ranked = RankedPrediction::from_scores([("X", 0.3), ("Y", 0.7)]);
        let labels: Vec<_> = ranked.labels().collect();
        assert_eq!(labels, vec!["Y", "X"]);
        assert_eq!(ranked.top(), Some(("Y", 0.7)));
    }

    #[test]
    fn test_ties_keep_class_index_order() {
        let ranked = RankedPrediction::from_scores([
            ("A", 0.25),
            ("B", 0.5),
            ("C", 0.25),
            ("D", 0.0),
        ]);
        let labels: Vec<_> = ranked.labels().collect();
        assert_eq!(labels, vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn test_ties_after_rounding_keep_class_index_order() {
        // Distinct raw values that collapse to the same rounded value.
        let ranked = RankedPrediction::from_scores([("first", 0.1000001), ("second", 0.1000004)]);
        let labels: Vec<_> = ranked.labels().collect();
        assert_eq!(labels, vec!["first", "second"]);
        assert_eq!(ranked.get("first"), Some(0.1));
        assert_eq!(ranked.get("second"), Some(0.1));
    }

    #[test]
    fn test_serialized_in_rank_order() {
        let ranked = RankedPrediction::from_scores([("X", 0.3), ("Y", 0.7)]);
        let json = serde_json::to_string(&ranked).unwrap();
        assert_eq!(json, r#"{"Y":0.7,"X":0.3}"#);
    }

    proptest! {
        #[test]
        fn prop_ranking_is_sorted_and_stable(probs in prop::collection::vec(0.0f64..=1.0, 1..12)) {
            let labels: Vec<String> = (0..probs.len()).map(|i| format!("class_{i}")).collect();
            let ranked = RankedPrediction::from_scores(
                labels.iter().cloned().zip(probs.iter().copied()),
            );

            prop_assert_eq!(ranked.len(), probs.len());

            let pairs: Vec<(&str, f64)> = ranked.iter().collect();
            for window in pairs.windows(2) {
                let (la, pa) = window[0];
                let (lb, pb) = window[1];
                prop_assert!(pa >= pb);
                if pa == pb {
                    let ia = labels.iter().position(|l| l == la).unwrap();
                    let ib = labels.iter().position(|l| l == lb).unwrap();
                    prop_assert!(ia < ib);
                }
            }

            for (i, label) in labels.iter().enumerate() {
                prop_assert_eq!(ranked.get(label), Some(round_probability(probs[i])));
            }
        }

        #[test]
        fn prop_rounding_stays_within_half_ulp_of_six_places(p in 0.0f64..=1.0) {
            let rounded = round_probability(p);
            prop_assert!((rounded - p).abs() <= 0.5e-6 + 1e-12);
            let scaled = rounded * 1e6;
            prop_assert!((scaled - scaled.round()).abs() < 1e-6);
        }
    }
}
