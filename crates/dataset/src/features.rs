use detection_core::{FeatureMatrix, FraudError, FraudResult};

use crate::loader::TransactionTable;

impl TransactionTable {
    /// Numeric feature projection with the label column removed.
    ///
    /// Text columns are dropped and a missing label column is a no-op.
    /// Zero remaining columns is `NoUsableFeatures`, regardless of row count.
    pub fn feature_matrix(&self, label_column: &str) -> FraudResult<FeatureMatrix> {
        let selected: Vec<(&str, &[f64])> = self
            .columns()
            .iter()
            .filter(|c| c.name != label_column)
            .filter_map(|c| c.numeric_values().map(|v| (c.name.as_str(), v)))
            .collect();

        if selected.is_empty() {
            return Err(FraudError::NoUsableFeatures(format!(
                "none of the {} columns is numeric and non-label",
                self.n_columns()
            )));
        }

        let feature_names: Vec<String> = selected.iter().map(|(n, _)| n.to_string()).collect();
        let rows: Vec<Vec<f64>> = (0..self.n_rows())
            .map(|i| selected.iter().map(|(_, v)| v[i]).collect())
            .collect();

        tracing::debug!(
            features = feature_names.len(),
            rows = rows.len(),
            "selected feature matrix"
        );
        Ok(FeatureMatrix::new(feature_names, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detection_core::LABEL_COLUMN;

    #[test]
    fn drops_text_and_label_columns() {
        let csv = "Time,V1,Merchant,Amount,Class\n\
                   0,-1.36,acme,149.62,0\n\
                   1,1.19,globex,2.69,1\n";
        let table = TransactionTable::parse_str(csv).unwrap();
        let matrix = table.feature_matrix(LABEL_COLUMN).unwrap();

        assert_eq!(matrix.feature_names, vec!["Time", "V1", "Amount"]);
        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.rows[0], vec![0.0, -1.36, 149.62]);
    }

    #[test]
    fn missing_label_is_noop() {
        let csv = "Time,Amount\n0,9.99\n";
        let table = TransactionTable::parse_str(csv).unwrap();
        let matrix = table.feature_matrix(LABEL_COLUMN).unwrap();
        assert_eq!(matrix.feature_names, vec!["Time", "Amount"]);
    }

    #[test]
    fn all_text_is_no_usable_features() {
        let csv = "Merchant,Country\nacme,US\nglobex,DE\n";
        let table = TransactionTable::parse_str(csv).unwrap();
        let err = table.feature_matrix(LABEL_COLUMN).unwrap_err();
        assert!(matches!(err, FraudError::NoUsableFeatures(_)));
    }

    #[test]
    fn label_only_numeric_column_is_no_usable_features() {
        let csv = "Merchant,Class\nacme,0\nglobex,1\n";
        let table = TransactionTable::parse_str(csv).unwrap();
        let err = table.feature_matrix(LABEL_COLUMN).unwrap_err();
        assert!(matches!(err, FraudError::NoUsableFeatures(_)));
    }
}
