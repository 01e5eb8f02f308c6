use std::io::Write;
use std::path::Path;

use detection_core::{FraudError, FraudResult, ScoredRecord, PREDICTION_COLUMN, PROBABILITY_COLUMN};

use crate::loader::TransactionTable;

/// Write the scored table as CSV: the original columns in their original
/// order, then `Fraud_Probability` and `Fraud_Prediction`.
///
/// `records` must line up one-to-one with the table's rows.
pub fn write_scored<W: Write>(
    table: &TransactionTable,
    records: &[ScoredRecord],
    writer: W,
) -> FraudResult<()> {
    if records.len() != table.n_rows() {
        return Err(FraudError::MalformedInput(format!(
            "{} scored records for {} table rows",
            records.len(),
            table.n_rows()
        )));
    }

    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = table.column_names();
    header.push(PROBABILITY_COLUMN);
    header.push(PREDICTION_COLUMN);
    wtr.write_record(&header)
        .map_err(|e| FraudError::Io(format!("writing CSV header: {e}")))?;

    for (i, record) in records.iter().enumerate() {
        let mut cells = table.row_cells(i);
        cells.push(format!("{}", record.fraud_probability));
        cells.push(record.fraud_prediction.to_string());
        wtr.write_record(&cells)
            .map_err(|e| FraudError::Io(format!("writing CSV row {}: {e}", i + 1)))?;
    }

    wtr.flush()
        .map_err(|e| FraudError::Io(format!("flushing CSV output: {e}")))?;
    Ok(())
}

pub fn write_scored_to_path<P: AsRef<Path>>(
    table: &TransactionTable,
    records: &[ScoredRecord],
    path: P,
) -> FraudResult<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .map_err(|e| FraudError::Io(format!("{}: {e}", path.display())))?;
    write_scored(table, records, file)?;
    tracing::info!(path = %path.display(), rows = records.len(), "exported scored CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: usize, probability: f64, prediction: u8) -> ScoredRecord {
        ScoredRecord {
            row,
            amount: None,
            fraud_probability: probability,
            fraud_prediction: prediction,
        }
    }

    #[test]
    fn appends_score_columns_after_originals() {
        let csv = "Time,Merchant,Amount\n\
                   0,acme,149.62\n\
                   1,globex,2.69\n";
        let table = TransactionTable::parse_str(csv).unwrap();
        let records = vec![record(1, 0.95, 1), record(2, 0.03, 0)];

        let mut out = Vec::new();
        write_scored(&table, &records, &mut out).unwrap();

        let exported = TransactionTable::parse_str(std::str::from_utf8(&out).unwrap()).unwrap();
        assert_eq!(
            exported.column_names(),
            vec!["Time", "Merchant", "Amount", "Fraud_Probability", "Fraud_Prediction"]
        );
        assert_eq!(
            exported.column("Fraud_Probability").unwrap().numeric_values(),
            Some(&[0.95, 0.03][..])
        );
        assert_eq!(
            exported.column("Fraud_Prediction").unwrap().numeric_values(),
            Some(&[1.0, 0.0][..])
        );
        // Text cells survive untouched.
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("acme"));
        assert!(text.contains("globex"));
    }

    #[test]
    fn record_count_must_match_rows() {
        let table = TransactionTable::parse_str("Amount\n1.0\n2.0\n").unwrap();
        let records = vec![record(1, 0.5, 0)];
        let err = write_scored(&table, &records, Vec::new()).unwrap_err();
        assert!(matches!(err, FraudError::MalformedInput(_)));
    }
}
