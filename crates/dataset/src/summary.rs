use detection_core::AMOUNT_COLUMN;
use serde::{Deserialize, Serialize};

use crate::loader::TransactionTable;

/// Headline statistics for a loaded transaction table.
///
/// Label and amount fields are `None` when the corresponding column is
/// absent, so callers can render partial summaries for score-only inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub fraud_count: Option<usize>,
    pub legit_count: Option<usize>,
    pub fraud_ratio_pct: Option<f64>,
    pub amount_min: Option<f64>,
    pub amount_max: Option<f64>,
    pub amount_mean: Option<f64>,
}

impl TransactionTable {
    pub fn summarize(&self) -> DatasetSummary {
        let (fraud_count, legit_count, fraud_ratio_pct) = match self.labels() {
            Some(labels) if !labels.is_empty() => {
                let fraud = labels.iter().filter(|&&l| l == 1).count();
                let legit = labels.len() - fraud;
                let ratio = fraud as f64 / labels.len() as f64 * 100.0;
                (Some(fraud), Some(legit), Some(ratio))
            }
            _ => (None, None, None),
        };

        let amounts = self
            .column(AMOUNT_COLUMN)
            .and_then(|c| c.numeric_values());
        let (amount_min, amount_max, amount_mean) = match amounts {
            Some(values) if !values.is_empty() => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                (Some(min), Some(max), Some(mean))
            }
            _ => (None, None, None),
        };

        DatasetSummary {
            rows: self.n_rows(),
            columns: self.n_columns(),
            fraud_count,
            legit_count,
            fraud_ratio_pct,
            amount_min,
            amount_max,
            amount_mean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_table_summary() {
        let csv = "Time,Amount,Class\n\
                   0,10.0,0\n\
                   1,20.0,0\n\
                   2,30.0,1\n\
                   3,40.0,0\n";
        let table = TransactionTable::parse_str(csv).unwrap();
        let summary = table.summarize();

        assert_eq!(summary.rows, 4);
        assert_eq!(summary.columns, 3);
        assert_eq!(summary.fraud_count, Some(1));
        assert_eq!(summary.legit_count, Some(3));
        assert!((summary.fraud_ratio_pct.unwrap() - 25.0).abs() < 1e-9);
        assert_eq!(summary.amount_min, Some(10.0));
        assert_eq!(summary.amount_max, Some(40.0));
        assert!((summary.amount_mean.unwrap() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn unlabeled_table_has_no_class_stats() {
        let csv = "Time,Amount\n0,5.0\n1,15.0\n";
        let table = TransactionTable::parse_str(csv).unwrap();
        let summary = table.summarize();

        assert_eq!(summary.fraud_count, None);
        assert_eq!(summary.fraud_ratio_pct, None);
        assert_eq!(summary.amount_mean, Some(10.0));
    }
}
