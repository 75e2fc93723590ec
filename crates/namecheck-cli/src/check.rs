//! One-shot classification from the command line.

use serde_json::{json, Value};
use tracing::info;

use namecheck_core::{precheck_name, CandidateError, LocalOutcome};
use namecheck_runtime::{ClassifyError, ClassifyRequest, NameClassifier};

/// Result of a `check` run, printed as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub body: Value,
    pub success: bool,
}

impl CheckOutcome {
    fn ok(body: Value) -> Self {
        Self { body, success: true }
    }

    fn failed(message: impl std::fmt::Display) -> Self {
        Self {
            body: json!({ "error": message.to_string() }),
            success: false,
        }
    }
}

/// Run only the local stages.
///
/// A name that passes every rule is reported as needing the model.
pub fn check_local(name: &str) -> CheckOutcome {
    match precheck_name(name) {
        Ok(LocalOutcome::Rejected(classification)) => CheckOutcome::ok(json!(classification)),
        Ok(LocalOutcome::NeedsModel(candidate)) => {
            info!(name = %candidate, "Passed pre-check");
            CheckOutcome::ok(json!({
                "name": candidate.normalized(),
                "precheck": "passed",
            }))
        }
        Err(CandidateError::EmptyName) => CheckOutcome::failed(CandidateError::EmptyName),
    }
}

/// Run the full pipeline.
pub async fn check_remote(classifier: &NameClassifier, name: &str, model: Option<&str>) -> CheckOutcome {
    let request = ClassifyRequest {
        name: name.to_string(),
        model: model.map(str::to_string),
    };
    match classifier.classify(&request).await {
        Ok(classification) => CheckOutcome::ok(json!(classification)),
        Err(e @ ClassifyError::EmptyName) | Err(e @ ClassifyError::InvalidModel { .. }) => {
            CheckOutcome::failed(e)
        }
        Err(e) => CheckOutcome::failed(format!("{} ({})", e, e.kind())),
    }
}
