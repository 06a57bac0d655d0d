use std::collections::BTreeSet;

use super::model::{RiskLabel, SensorDataset, SensorRecord};

// ---------------------------------------------------------------------------
// Typed row predicates
// ---------------------------------------------------------------------------

/// Selected risk categories. An empty set selects nothing.
pub type LabelSelection = BTreeSet<RiskLabel>;

/// Initialise a selection with every label present in the dataset.
pub fn init_label_selection(dataset: &SensorDataset) -> LabelSelection {
    dataset.labels().clone()
}

/// Row belongs to one of the selected categories.
pub fn label_selected(record: &SensorRecord, selected: &LabelSelection) -> bool {
    selected.contains(&record.risk_label)
}

/// Row shares the given category.
pub fn same_risk(record: &SensorRecord, label: &RiskLabel) -> bool {
    record.risk_label == *label
}

/// Row is a critical bottleneck: `speed_gap` strictly below `threshold`.
/// A `NaN` gap never counts.
pub fn is_bottleneck(record: &SensorRecord, threshold: f64) -> bool {
    record.speed_gap < threshold
}

/// Return indices of rows that satisfy `pred`, in dataset order.
pub fn matching_indices<P>(dataset: &SensorDataset, pred: P) -> Vec<usize>
where
    P: Fn(&SensorRecord) -> bool,
{
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| pred(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn dataset() -> SensorDataset {
        SensorDataset::from_records(vec![
            record("A", RiskLabel::SAFE, 48.0, -2.0),
            record("B", RiskLabel::LOW, 15.0, -25.0),
            record("C", RiskLabel::HIGH, 70.0, 20.0),
            record("D", RiskLabel::LOW, 20.0, -20.0),
        ])
        .unwrap()
    }

    #[test]
    fn default_selection_contains_every_label() {
        let ds = dataset();
        let sel = init_label_selection(&ds);
        assert_eq!(sel.len(), 3);
        assert_eq!(matching_indices(&ds, |r| label_selected(r, &sel)).len(), 4);
    }

    #[test]
    fn filters_by_membership() {
        let ds = dataset();
        let sel: LabelSelection = [RiskLabel::Low].into_iter().collect();
        assert_eq!(matching_indices(&ds, |r| label_selected(r, &sel)), vec![1, 3]);
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let ds = dataset();
        let sel = LabelSelection::new();
        assert!(matching_indices(&ds, |r| label_selected(r, &sel)).is_empty());
    }

    #[test]
    fn bottleneck_threshold_is_strict() {
        let ds = dataset();
        let hits = matching_indices(&ds, |r| is_bottleneck(r, -20.0));
        assert_eq!(hits, vec![1]);

        let mut nan_gap = record("E", RiskLabel::LOW, 10.0, 0.0);
        nan_gap.speed_gap = f64::NAN;
        assert!(!is_bottleneck(&nan_gap, -20.0));
    }
}
