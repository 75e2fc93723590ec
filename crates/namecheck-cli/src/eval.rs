//! Offline accuracy evaluation against a running `/predict` endpoint.
//!
//! Every labeled name in a CSV dataset is posted once per model. A reply
//! whose `prediction` is `"Realistic"` scores 1; anything else, including
//! a request that still fails after retries, scores 0.

use backon::{ConstantBuilder, Retryable};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use namecheck_core::REALISTIC;

/// Column holding the name.
pub const NAME_COLUMN: &str = "Name";

/// Column holding the 0/1 label.
pub const LABEL_COLUMN: &str = "Is_Valid";

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("CSV must contain 'Name' and 'Is_Valid' columns, missing {0:?}")]
    MissingColumns(Vec<&'static str>),

    #[error("Row {row}: 'Is_Valid' must be 0 or 1, got {value}")]
    InvalidLabel { row: usize, value: u8 },

    #[error("Dataset has no rows")]
    EmptyDataset,
}

/// Failure of a single prediction request.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// One row of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabeledName {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Is_Valid")]
    pub is_valid: u8,
}

/// Load a dataset from a CSV file.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<LabeledName>, EvalError> {
    let file = std::fs::File::open(path)?;
    load_dataset_from_reader(file)
}

/// Load a dataset from any CSV source.
///
/// Fails before reading rows when a required column is missing.
pub fn load_dataset_from_reader<R: Read>(reader: R) -> Result<Vec<LabeledName>, EvalError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);

    let headers = reader.headers()?.clone();
    let missing: Vec<&'static str> = [NAME_COLUMN, LABEL_COLUMN]
        .into_iter()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(EvalError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize::<LabeledName>().enumerate() {
        let row = record?;
        if row.is_valid > 1 {
            return Err(EvalError::InvalidLabel {
                row: idx + 1,
                value: row.is_valid,
            });
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(EvalError::EmptyDataset);
    }
    Ok(rows)
}

/// How requests are sent.
#[derive(Debug, Clone)]
pub struct EvalSettings {
    /// Full URL of the predict endpoint
    pub endpoint: String,

    /// Maximum requests in flight
    pub workers: usize,

    /// Total attempts per name, including the first
    pub attempts: usize,

    /// Fixed wait between attempts
    pub retry_delay: Duration,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for EvalSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/predict".to_string(),
            workers: 20,
            attempts: 3,
            retry_delay: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Outcome for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowResult {
    pub name: String,
    pub actual: u8,
    pub predicted: u8,
}

/// Outcome for one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelReport {
    pub accuracy: f64,
    pub duration_secs: f64,

    /// Rows that failed after every attempt
    pub errors: usize,

    pub predictions: Vec<RowResult>,
}

/// Written to the `--output` file.
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub generated_at: DateTime<Utc>,
    pub endpoint: String,
    pub models: BTreeMap<String, ModelReport>,
}

impl EvalReport {
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), EvalError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Human-readable comparison, in the order the models were given.
    pub fn comparison_table(&self, order: &[String]) -> String {
        let mut out = String::from("=== Accuracy Comparison ===\n");
        for model in order {
            if let Some(report) = self.models.get(model) {
                out.push_str(&format!(
                    "{}: {:.4} ({:.2}%)\n",
                    model,
                    report.accuracy,
                    report.accuracy * 100.0
                ));
            }
        }
        out
    }
}

#[derive(Debug, Serialize)]
struct PredictBody<'a> {
    name: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictReply {
    #[serde(default)]
    prediction: Option<String>,
}

/// Posts labeled names to a predict endpoint and scores the replies.
pub struct Evaluator {
    client: reqwest::Client,
    settings: EvalSettings,
}

impl Evaluator {
    pub fn new(settings: EvalSettings) -> Result<Self, EvalError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { client, settings })
    }

    /// Evaluate every model in turn.
    pub async fn run(&self, rows: &[LabeledName], models: &[String]) -> EvalReport {
        let mut reports = BTreeMap::new();
        for model in models {
            let report = self.evaluate_model(rows, model).await;
            reports.insert(model.clone(), report);
        }
        EvalReport {
            generated_at: Utc::now(),
            endpoint: self.settings.endpoint.clone(),
            models: reports,
        }
    }

    /// Score one model over the whole dataset.
    pub async fn evaluate_model(&self, rows: &[LabeledName], model: &str) -> ModelReport {
        let start = Instant::now();
        let workers = self.settings.workers.max(1);

        let mut scored: Vec<(usize, Option<u8>)> = stream::iter(rows.iter().enumerate())
            .map(|(idx, row)| async move {
                let predicted = match self.predict_with_retry(&row.name, model).await {
                    Ok(predicted) => Some(predicted),
                    Err(e) => {
                        error!(name = %row.name, model = %model, error = %e, "Prediction failed");
                        None
                    }
                };
                (idx, predicted)
            })
            .buffer_unordered(workers)
            .collect()
            .await;
        scored.sort_by_key(|(idx, _)| *idx);

        let errors = scored.iter().filter(|(_, p)| p.is_none()).count();
        let predictions: Vec<RowResult> = scored
            .into_iter()
            .map(|(idx, predicted)| RowResult {
                name: rows[idx].name.clone(),
                actual: rows[idx].is_valid,
                predicted: predicted.unwrap_or(0),
            })
            .collect();

        let duration = start.elapsed();
        let accuracy = accuracy(&predictions);
        info!(
            model = %model,
            accuracy = accuracy,
            errors = errors,
            "Model completed in {:.2}s with accuracy {:.4}",
            duration.as_secs_f64(),
            accuracy
        );

        ModelReport {
            accuracy,
            duration_secs: duration.as_secs_f64(),
            errors,
            predictions,
        }
    }

    /// One name, retried with a fixed delay.
    ///
    /// Returns 1 for a `"Realistic"` prediction and 0 for any other body.
    async fn predict_with_retry(&self, name: &str, model: &str) -> Result<u8, RequestError> {
        let backoff = ConstantBuilder::default()
            .with_delay(self.settings.retry_delay)
            .with_max_times(self.settings.attempts.saturating_sub(1));

        let reply = (|| async move { self.predict(name, model).await })
            .retry(backoff)
            .notify(|err: &RequestError, wait: Duration| {
                warn!(name = %name, model = %model, error = %err, "Retrying in {:?}", wait);
            })
            .await?;

        debug!(name = %name, model = %model, prediction = ?reply.prediction, "Scored");
        Ok(u8::from(reply.prediction.as_deref() == Some(REALISTIC)))
    }

    async fn predict(&self, name: &str, model: &str) -> Result<PredictReply, RequestError> {
        let response = self
            .client
            .post(&self.settings.endpoint)
            .json(&PredictBody { name, model })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequestError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<PredictReply>().await?)
    }
}

/// Fraction of rows where the prediction matches the label.
pub fn accuracy(predictions: &[RowResult]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let matches = predictions
        .iter()
        .filter(|p| p.actual == p.predicted)
        .count();
    matches as f64 / predictions.len() as f64
}
