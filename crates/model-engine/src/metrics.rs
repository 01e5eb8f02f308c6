use serde::{Deserialize, Serialize};

/// Held-out evaluation of a freshly trained classifier, fraud class positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
    pub held_out_rows: usize,
}

/// Confusion-matrix metrics plus rank-based ROC AUC.
///
/// Degenerate inputs (no rows, single-class truth) yield zeroed ratios and an
/// uninformative AUC of 0.5 rather than an error; training on synthesized
/// labels must still produce a report.
pub fn evaluate(probabilities: &[f64], predictions: &[u8], truth: &[u8]) -> EvalReport {
    let n = truth.len();
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut tn = 0usize;
    let mut fnc = 0usize;
    for (p, t) in predictions.iter().zip(truth) {
        match (p, t) {
            (1, 1) => tp += 1,
            (1, 0) => fp += 1,
            (0, 0) => tn += 1,
            _ => fnc += 1,
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let accuracy = ratio(tp + tn, n);
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fnc);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    EvalReport {
        accuracy,
        precision,
        recall,
        f1,
        roc_auc: roc_auc(probabilities, truth),
        held_out_rows: n,
    }
}

/// Mann-Whitney AUC with average ranks for tied probabilities.
pub fn roc_auc(probabilities: &[f64], truth: &[u8]) -> f64 {
    let n_pos = truth.iter().filter(|&&t| t == 1).count();
    let n_neg = truth.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| {
        probabilities[a]
            .partial_cmp(&probabilities[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; probabilities.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && probabilities[order[j + 1]] == probabilities[order[i]] {
            j += 1;
        }
        let average_rank = (i + j) as f64 / 2.0 + 1.0;
        for &row in &order[i..=j] {
            ranks[row] = average_rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = truth
        .iter()
        .zip(&ranks)
        .filter(|(t, _)| **t == 1)
        .map(|(_, r)| r)
        .sum();
    (positive_rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0) / (n_pos * n_neg) as f64
}
