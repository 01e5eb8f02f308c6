//! fraud-console: provision the fraud model and score transaction batches.
//!
//! Scoring writes a CSV with `Fraud_Probability` and `Fraud_Prediction`
//! appended and, when any record clears the alert threshold, sends one
//! notification over the configured channels. Alert delivery is best-effort;
//! the scored CSV is written before any delivery is attempted.
//!
//! Usage:
//!   cargo run -p fraud-console -- provision
//!   cargo run -p fraud-console -- provision --force-train
//!   cargo run -p fraud-console -- score --input upload.csv --out scored.csv
//!   cargo run -p fraud-console -- score-one --values Time=0 V1=-1.36 Amount=149.62
//!   cargo run -p fraud-console -- summary --input data/creditcard.csv --min-amount 100


use dataset::TransactionTable;
use detection_core::{FeatureMatrix, ScoredRecord, DEFAULT_ALERT_THRESHOLD, LABEL_COLUMN};
use model_engine::{
    ModelSource, Provisioned, Provisioner, DEFAULT_ARTIFACT_PATH, DEFAULT_REFERENCE_DATA_PATH,
};
use notification_service::{AlertDispatcher, AlertOutcome, NotificationConfig};
use risk_scorer::RiskScorer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fraud_console=info,model_engine=info,risk_scorer=info,\
                 notification_service=info,dataset=info"
                    .into()
            }),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("provision") => cmd_provision(&args),
        Some("score") => cmd_score(&args).await,
        Some("score-one") => cmd_score_one(&args).await,
        Some("summary") => cmd_summary(&args),
        _ => {
            usage();
            std::process::exit(1);
        }
    }
}

fn usage() {
    eprintln!("Usage:");
    eprintln!("  fraud-console provision [--force-train]     Load or train the model");
    eprintln!("  fraud-console score --input FILE            Score a transaction batch");
    eprintln!("  fraud-console score-one --values K=V ...    Score one manual entry");
    eprintln!("  fraud-console summary --input FILE          Dataset statistics");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --model PATH         Model artifact (default: {})", DEFAULT_ARTIFACT_PATH);
    eprintln!("  --data PATH          Reference training data (default: {})", DEFAULT_REFERENCE_DATA_PATH);
    eprintln!("  --out PATH           Scored CSV output (default: scored.csv)");
    eprintln!("  --alert-threshold X  High-risk cutoff (default: {})", DEFAULT_ALERT_THRESHOLD);
    eprintln!("  --min-amount X       Summary: drop rows below X");
    eprintln!("  --max-amount X       Summary: drop rows above X");
    eprintln!("  --no-alert           Skip alert delivery");
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn provisioner_from(args: &[String]) -> Provisioner {
    let model_path = flag_value(args, "--model").unwrap_or(DEFAULT_ARTIFACT_PATH);
    let data_path = flag_value(args, "--data").unwrap_or(DEFAULT_REFERENCE_DATA_PATH);
    Provisioner::new(model_path, data_path)
}

fn alert_threshold_from(args: &[String]) -> f64 {
    flag_value(args, "--alert-threshold")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_ALERT_THRESHOLD)
}

fn report_model(provisioned: &Provisioned) {
    match &provisioned.source {
        ModelSource::Loaded { trained_at } => {
            tracing::info!(
                "model ready (cached artifact, trained {})",
                trained_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
        ModelSource::Trained(report) => {
            tracing::info!(
                "model ready (trained on {} of {} rows, accuracy {:.3}, roc_auc {:.3})",
                report.rows_train,
                report.rows_total,
                report.eval.accuracy,
                report.eval.roc_auc
            );
        }
    }
    if provisioned.labels_synthesized {
        tracing::warn!("model was trained on synthesized labels; predictions carry no signal");
    }
}

fn cmd_provision(args: &[String]) -> anyhow::Result<()> {
    let provisioner = provisioner_from(args);
    let provisioned = if has_flag(args, "--force-train") {
        provisioner.train_fresh()?
    } else {
        provisioner.provision()?
    };
    report_model(&provisioned);
    Ok(())
}

async fn cmd_score(args: &[String]) -> anyhow::Result<()> {
    let Some(input) = flag_value(args, "--input") else {
        usage();
        anyhow::bail!("score requires --input FILE");
    };
    let out = flag_value(args, "--out").unwrap_or("scored.csv");
    let threshold = alert_threshold_from(args);

    let provisioned = provisioner_from(args).provision()?;
    report_model(&provisioned);

    let table = TransactionTable::from_path(input)?;
    let features = table.feature_matrix(LABEL_COLUMN)?;
    let scorer = RiskScorer::with_alert_threshold(&provisioned.classifier, threshold);
    let outcome = scorer.score(&features)?;

    dataset::write_scored_to_path(&table, &outcome.records, out)?;
    let flagged = outcome
        .records
        .iter()
        .filter(|r| r.fraud_prediction == 1)
        .count();
    tracing::info!(
        "scored {} rows: {} flagged as fraud, {} above alert threshold {:.2} -> {}",
        outcome.records.len(),
        flagged,
        outcome.alert_candidates.len(),
        threshold,
        out
    );

    if !has_flag(args, "--no-alert") {
        dispatch_alert(&outcome.alert_candidates, threshold).await;
    }
    Ok(())
}

async fn cmd_score_one(args: &[String]) -> anyhow::Result<()> {
    let Some(idx) = args.iter().position(|a| a == "--values") else {
        usage();
        anyhow::bail!("score-one requires --values Name=Value ...");
    };
    let pairs: Vec<&String> = args[idx + 1..]
        .iter()
        .take_while(|a| !a.starts_with("--"))
        .collect();
    if pairs.is_empty() {
        anyhow::bail!("score-one requires at least one Name=Value pair");
    }

    let mut names = Vec::with_capacity(pairs.len());
    let mut values = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let Some((name, raw)) = pair.split_once('=') else {
            anyhow::bail!("bad value '{pair}', expected Name=Value");
        };
        let value: f64 = raw
            .parse()
            .map_err(|_| anyhow::anyhow!("bad numeric value in '{pair}'"))?;
        names.push(name.to_string());
        values.push(value);
    }

    let threshold = alert_threshold_from(args);
    let provisioned = provisioner_from(args).provision()?;
    report_model(&provisioned);

    let features = FeatureMatrix::new(names, vec![values]);
    let scorer = RiskScorer::with_alert_threshold(&provisioned.classifier, threshold);
    let record = scorer.score_record(&features)?;

    let verdict = if record.fraud_prediction == 1 {
        "FRAUD"
    } else {
        "LEGITIMATE"
    };
    println!("fraud probability: {:.4}", record.fraud_probability);
    println!("prediction: {verdict}");

    if record.is_alert_worthy(threshold) && !has_flag(args, "--no-alert") {
        dispatch_alert(&[record], threshold).await;
    }
    Ok(())
}

fn cmd_summary(args: &[String]) -> anyhow::Result<()> {
    let Some(input) = flag_value(args, "--input") else {
        usage();
        anyhow::bail!("summary requires --input FILE");
    };

    let mut table = TransactionTable::from_path(input)?;
    let min = flag_value(args, "--min-amount").and_then(|v| v.parse().ok());
    let max = flag_value(args, "--max-amount").and_then(|v| v.parse().ok());
    if min.is_some() || max.is_some() {
        table = table.filter_amount_range(min.unwrap_or(0.0), max.unwrap_or(f64::MAX));
    }

    let summary = table.summarize();
    println!("rows: {}", summary.rows);
    println!("columns: {}", summary.columns);
    match (summary.fraud_count, summary.legit_count, summary.fraud_ratio_pct) {
        (Some(fraud), Some(legit), Some(ratio)) => {
            println!("fraudulent: {fraud} ({ratio:.2}%)");
            println!("legitimate: {legit}");
        }
        _ => println!("labels: none"),
    }
    match (summary.amount_min, summary.amount_mean, summary.amount_max) {
        (Some(lo), Some(mean), Some(hi)) => {
            println!("amount: min {lo:.2}, mean {mean:.2}, max {hi:.2}");
        }
        _ => println!("amount: none"),
    }
    Ok(())
}

/// Runs after the scored CSV is on disk. Never propagates an error: a dead
/// mail server must not take the predictions with it.
async fn dispatch_alert(candidates: &[ScoredRecord], threshold: f64) {
    let dispatcher = AlertDispatcher::new(&NotificationConfig::from_env());
    match dispatcher.dispatch(candidates, threshold).await {
        AlertOutcome::Skipped => {}
        AlertOutcome::Sent { high_risk } => {
            tracing::info!("alert sent covering {} high-risk transactions", high_risk);
        }
        AlertOutcome::Failed { high_risk, reason } => {
            tracing::warn!(
                "alert for {} high-risk transactions not delivered: {}",
                high_risk,
                reason
            );
        }
    }
}
