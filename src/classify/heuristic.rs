use super::Prediction;
use crate::metrics::MetricsRecord;
use crate::types::project::CategoryLabel;
use std::collections::BTreeMap;

/// Rule-based baseline used before a trained model is available.
///
/// Thresholds on bus factor and normalized entropy, checked from the most
/// concentrated archetype upwards. Confidence is a fixed value per rule.
pub fn classify_heuristic(record: &MetricsRecord) -> Prediction {
    let bus = record.bus_factor;
    let spread = record.normalized_entropy;

    let (label, confidence) = if bus <= 1 && spread < 0.4 {
        (CategoryLabel::Toy, if bus == 1 { 0.9 } else { 0.7 })
    } else if bus <= 5 && spread < 0.5 {
        (CategoryLabel::Stadium, if spread < 0.4 { 0.8 } else { 0.6 })
    } else if bus <= 15 && spread < 0.75 {
        (CategoryLabel::Club, 0.75)
    } else {
        (CategoryLabel::Federation, if bus > 20 { 0.85 } else { 0.7 })
    };

    Prediction {
        label,
        confidence,
        probabilities: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solo_maintainer_is_a_toy() {
        let record = MetricsRecord::from_counts(&[95.0, 3.0, 2.0]).expect("record");
        let prediction = classify_heuristic(&record);
        assert_eq!(prediction.label, CategoryLabel::Toy);
        assert_eq!(prediction.confidence, 0.9);
    }

    #[test]
    fn small_core_with_tail_is_a_stadium() {
        let mut counts = vec![300.0, 250.0, 200.0];
        counts.extend(std::iter::repeat(1.0).take(30));
        let record = MetricsRecord::from_counts(&counts).expect("record");
        assert_eq!(record.bus_factor, 2);
        assert!(record.normalized_entropy < 0.4);
        let prediction = classify_heuristic(&record);
        assert_eq!(prediction.label, CategoryLabel::Stadium);
        assert_eq!(prediction.confidence, 0.8);
    }

    #[test]
    fn core_team_with_long_tail_is_a_club() {
        let record = MetricsRecord::from_counts(&[
            300.0, 200.0, 150.0, 100.0, 20.0, 10.0, 5.0, 5.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
            1.0,
        ])
        .expect("record");
        assert!(record.normalized_entropy < 0.75);
        let prediction = classify_heuristic(&record);
        assert_eq!(prediction.label, CategoryLabel::Club);
        assert_eq!(prediction.confidence, 0.75);
    }

    #[test]
    fn high_spread_overrides_a_small_bus_factor() {
        let record = MetricsRecord::from_counts(&[40.0, 25.0, 20.0, 10.0, 5.0]).expect("record");
        assert_eq!(record.bus_factor, 2);
        let prediction = classify_heuristic(&record);
        assert_eq!(prediction.label, CategoryLabel::Federation);
        assert_eq!(prediction.confidence, 0.7);
    }

    #[test]
    fn wide_even_contribution_is_a_federation() {
        let record = MetricsRecord::from_counts(&[10.0; 60]).expect("record");
        let prediction = classify_heuristic(&record);
        assert_eq!(prediction.label, CategoryLabel::Federation);
        assert_eq!(prediction.confidence, 0.85);
    }
}
