use std::io::Read;
use std::path::Path;

use detection_core::{FraudError, FraudResult, AMOUNT_COLUMN, LABEL_COLUMN};

/// Values of one table column, typed at ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    pub fn numeric_values(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }
}

/// Schema-aware, column-major transaction table.
///
/// Columns keep their CSV header order. A column is Numeric only when every
/// cell parses as a finite f64; anything else stays Text and is passed through
/// untouched. Unknown columns are tolerated.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionTable {
    columns: Vec<Column>,
    n_rows: usize,
}

impl TransactionTable {
    /// Parse a CSV byte stream with a header row.
    pub fn from_reader<R: Read>(reader: R) -> FraudResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| FraudError::MalformedInput(format!("cannot read header row: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.is_empty() {
            return Err(FraudError::MalformedInput("header row is empty".into()));
        }
        for (i, name) in headers.iter().enumerate() {
            if headers[..i].contains(name) {
                return Err(FraudError::MalformedInput(format!(
                    "duplicate column name '{name}'"
                )));
            }
        }

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        let mut n_rows = 0usize;
        for result in rdr.records() {
            let record =
                result.map_err(|e| FraudError::MalformedInput(format!("bad CSV record: {e}")))?;
            for (j, cell) in record.iter().enumerate() {
                cells[j].push(cell.to_string());
            }
            n_rows += 1;
        }

        if n_rows == 0 {
            return Err(FraudError::EmptyDataset(
                "CSV contains a header but zero data rows".into(),
            ));
        }

        let columns: Vec<Column> = headers
            .into_iter()
            .zip(cells)
            .map(|(name, raw)| Column {
                data: type_column(&raw),
                name,
            })
            .collect();

        let table = Self { columns, n_rows };
        table.validate()?;

        tracing::debug!(
            rows = table.n_rows,
            columns = table.columns.len(),
            "parsed transaction table"
        );
        Ok(table)
    }

    pub fn parse_str(data: &str) -> FraudResult<Self> {
        Self::from_reader(data.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> FraudResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| FraudError::Io(format!("{}: {e}", path.display())))?;
        Self::from_reader(file)
    }

    /// Schema invariants beyond shape: `Amount` numeric and non-negative,
    /// `Class` binary, when those columns are present.
    fn validate(&self) -> FraudResult<()> {
        if let Some(col) = self.column(AMOUNT_COLUMN) {
            let values = col.numeric_values().ok_or_else(|| {
                FraudError::MalformedInput(format!("'{AMOUNT_COLUMN}' column is not numeric"))
            })?;
            if let Some(i) = values.iter().position(|v| *v < 0.0) {
                return Err(FraudError::MalformedInput(format!(
                    "negative {AMOUNT_COLUMN} at row {}: {}",
                    i + 1,
                    values[i]
                )));
            }
        }

        if let Some(col) = self.column(LABEL_COLUMN) {
            let values = col.numeric_values().ok_or_else(|| {
                FraudError::MalformedInput(format!("'{LABEL_COLUMN}' column is not numeric"))
            })?;
            if let Some(i) = values.iter().position(|v| *v != 0.0 && *v != 1.0) {
                return Err(FraudError::MalformedInput(format!(
                    "{LABEL_COLUMN} must be 0 or 1, got {} at row {}",
                    values[i],
                    i + 1
                )));
            }
        }

        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Ground-truth labels from the `Class` column, when present.
    /// Values are guaranteed binary by ingestion validation.
    pub fn labels(&self) -> Option<Vec<u8>> {
        self.column(LABEL_COLUMN)
            .and_then(Column::numeric_values)
            .map(|v| v.iter().map(|x| *x as u8).collect())
    }

    /// One row rendered back to CSV cells, numeric values via f64 `Display`.
    pub fn row_cells(&self, row: usize) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| match &c.data {
                ColumnData::Numeric(v) => format!("{}", v[row]),
                ColumnData::Text(v) => v[row].clone(),
            })
            .collect()
    }

    /// Rows whose `Amount` lies inside `[min, max]` (inclusive), keeping the
    /// full schema. Tables without an `Amount` column come back unchanged.
    pub fn filter_amount_range(&self, min: f64, max: f64) -> Self {
        let Some(amounts) = self.column(AMOUNT_COLUMN).and_then(Column::numeric_values) else {
            return self.clone();
        };
        let keep: Vec<usize> = amounts
            .iter()
            .enumerate()
            .filter(|(_, a)| **a >= min && **a <= max)
            .map(|(i, _)| i)
            .collect();

        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                data: match &c.data {
                    ColumnData::Numeric(v) => {
                        ColumnData::Numeric(keep.iter().map(|&i| v[i]).collect())
                    }
                    ColumnData::Text(v) => {
                        ColumnData::Text(keep.iter().map(|&i| v[i].clone()).collect())
                    }
                },
            })
            .collect();

        Self {
            columns,
            n_rows: keep.len(),
        }
    }
}

/// A column is Numeric only when every cell parses as a finite f64.
/// Empty cells and non-finite parses (NaN, inf) demote the column to Text.
fn type_column(raw: &[String]) -> ColumnData {
    let mut parsed = Vec::with_capacity(raw.len());
    for cell in raw {
        match cell.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => parsed.push(v),
            _ => return ColumnData::Text(raw.to_vec()),
        }
    }
    ColumnData::Numeric(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_columns() {
        let csv = "Time,V1,Amount,Merchant,Class\n\
                   0,-1.36,149.62,acme,0\n\
                   1,1.19,2.69,globex,0\n\
                   7,0.56,378.66,acme,1\n";
        let table = TransactionTable::parse_str(csv).unwrap();

        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_columns(), 5);
        assert!(table.column("Time").unwrap().is_numeric());
        assert!(table.column("Amount").unwrap().is_numeric());
        assert!(!table.column("Merchant").unwrap().is_numeric());
        assert_eq!(table.labels(), Some(vec![0, 0, 1]));
    }

    #[test]
    fn zero_rows_is_empty_dataset() {
        let err = TransactionTable::parse_str("Time,Amount,Class\n").unwrap_err();
        assert!(matches!(err, FraudError::EmptyDataset(_)));
    }

    #[test]
    fn ragged_row_is_malformed() {
        let csv = "Time,Amount\n0,1.0\n1\n";
        let err = TransactionTable::parse_str(csv).unwrap_err();
        assert!(matches!(err, FraudError::MalformedInput(_)));
    }

    #[test]
    fn negative_amount_rejected() {
        let csv = "Amount,Class\n10.0,0\n-3.5,1\n";
        let err = TransactionTable::parse_str(csv).unwrap_err();
        assert!(matches!(err, FraudError::MalformedInput(_)));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn non_binary_label_rejected() {
        let csv = "Amount,Class\n10.0,2\n";
        let err = TransactionTable::parse_str(csv).unwrap_err();
        assert!(matches!(err, FraudError::MalformedInput(_)));
    }

    #[test]
    fn missing_label_column_is_fine() {
        let csv = "Time,Amount\n0,9.99\n";
        let table = TransactionTable::parse_str(csv).unwrap();
        assert!(table.labels().is_none());
    }

    #[test]
    fn duplicate_header_rejected() {
        let csv = "Amount,Amount\n1.0,2.0\n";
        let err = TransactionTable::parse_str(csv).unwrap_err();
        assert!(matches!(err, FraudError::MalformedInput(_)));
    }

    #[test]
    fn empty_cell_makes_column_text() {
        let csv = "V1,V2\n1.0,2.0\n,3.0\n";
        let table = TransactionTable::parse_str(csv).unwrap();
        assert!(!table.column("V1").unwrap().is_numeric());
        assert!(table.column("V2").unwrap().is_numeric());
    }

    #[test]
    fn amount_filter_keeps_schema() {
        let csv = "Amount,Class\n5.0,0\n50.0,1\n500.0,0\n";
        let table = TransactionTable::parse_str(csv).unwrap();
        let filtered = table.filter_amount_range(10.0, 100.0);
        assert_eq!(filtered.n_rows(), 1);
        assert_eq!(filtered.n_columns(), 2);
        assert_eq!(filtered.labels(), Some(vec![1]));
    }
}
