use detection_core::ScoredRecord;

/// Subject line, always naming the high-risk count.
pub fn render_subject(count: usize) -> String {
    if count == 1 {
        "Fraud alert: 1 high-risk transaction".to_string()
    } else {
        format!("Fraud alert: {count} high-risk transactions")
    }
}

/// Plain-text body: a threshold header plus one line per record.
///
/// Amounts and probabilities render to two decimal places and rows keep
/// their 1-based upload position. No timestamps or ordering surprises: the
/// same records always produce byte-identical output.
pub fn render_body(records: &[ScoredRecord], threshold: f64) -> String {
    let mut body = format!("High-risk transactions (probability above {threshold:.2}):\n");
    for record in records {
        let amount = match record.amount {
            Some(a) => format!("{a:.2}"),
            None => "n/a".to_string(),
        };
        body.push_str(&format!(
            "row {}: amount {}, probability {:.2}\n",
            record.row, amount, record.fraud_probability
        ));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: usize, amount: Option<f64>, probability: f64) -> ScoredRecord {
        ScoredRecord {
            row,
            amount,
            fraud_probability: probability,
            fraud_prediction: 1,
        }
    }

    #[test]
    fn body_is_deterministic_plain_text() {
        let records = [
            record(1, Some(120.0), 0.95),
            record(3, Some(999.5), 0.912),
        ];
        let body = render_body(&records, 0.9);
        assert_eq!(
            body,
            "High-risk transactions (probability above 0.90):\n\
             row 1: amount 120.00, probability 0.95\n\
             row 3: amount 999.50, probability 0.91\n"
        );
    }

    #[test]
    fn missing_amount_renders_as_na() {
        let body = render_body(&[record(7, None, 0.99)], 0.9);
        assert!(body.contains("row 7: amount n/a, probability 0.99"));
    }

    #[test]
    fn subject_pluralizes() {
        assert_eq!(render_subject(1), "Fraud alert: 1 high-risk transaction");
        assert_eq!(render_subject(4), "Fraud alert: 4 high-risk transactions");
    }
}
