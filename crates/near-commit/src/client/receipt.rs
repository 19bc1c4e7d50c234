//! Execution outcome interpretation.
//!
//! A committed transaction fans out into receipts. The transaction is a
//! failure if its own status or any receipt's status is `Failure`; a
//! callback that fails after the main call succeeded still fails the whole
//! transaction.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::{EncodingError, Error, ExecutionFailure};
use crate::types::{DecodedValue, ExecutionStatus, FinalExecutionOutcome};

/// Turns a [`FinalExecutionOutcome`] into a value or an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReceiptInterpreter;

impl ReceiptInterpreter {
    /// Interpret a committed outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::ExecutionFailure`] if the transaction or any receipt failed.
    ///   Its `logs` hold every outcome's logs in chain order, each failing
    ///   outcome followed by a description of its failure.
    /// - [`Error::MalformedEncoding`] if the success value is not base64 UTF-8
    ///   JSON, or the status is not a success value.
    pub fn interpret(outcome: &FinalExecutionOutcome) -> Result<DecodedValue, Error> {
        if outcome.is_failure() {
            return Err(Self::collect_failure(outcome).into());
        }

        match &outcome.status {
            Some(ExecutionStatus::SuccessValue(payload)) => Ok(Self::decode_value(payload)?),
            other => Err(EncodingError::UnexpectedOutcome(
                other
                    .as_ref()
                    .map_or_else(|| "missing status".to_string(), |s| format!("{:?}", s)),
            )
            .into()),
        }
    }

    /// Decode a base64 `SuccessValue` payload. Empty means no value.
    pub fn decode_value(payload: &str) -> Result<DecodedValue, EncodingError> {
        if payload.is_empty() {
            return Ok(DecodedValue::Void);
        }
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| EncodingError::Base64(e.to_string()))?;
        let text = std::str::from_utf8(&bytes).map_err(|_| EncodingError::InvalidUtf8)?;
        let value = serde_json::from_str(text).map_err(|e| EncodingError::Json(e.to_string()))?;
        Ok(DecodedValue::Json(value))
    }

    fn collect_failure(outcome: &FinalExecutionOutcome) -> ExecutionFailure {
        let mut logs = Vec::new();
        let mut first_receipt_failure = None;

        for item in outcome.outcomes() {
            logs.extend(item.outcome.logs.iter().cloned());
            if let ExecutionStatus::Failure(error) = &item.outcome.status {
                let description = describe_failure(error);
                logs.push(description.clone());
                first_receipt_failure.get_or_insert(description);
            }
        }

        let message = match &outcome.status {
            Some(ExecutionStatus::Failure(error)) => describe_failure(error),
            _ => first_receipt_failure.unwrap_or_else(|| "unknown failure".to_string()),
        };

        ExecutionFailure { message, logs }
    }
}

/// Flatten NEAR's nested failure JSON into one line.
///
/// `{"ActionError": {"index": 0, "kind": {"FunctionCallError": {"ExecutionError": "boom"}}}}`
/// becomes `ActionError: action #0: FunctionCallError.ExecutionError: boom`.
pub fn describe_failure(error: &serde_json::Value) -> String {
    match error {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) if map.len() == 1 => {
            let Some((key, inner)) = map.iter().next() else {
                return error.to_string();
            };
            match inner {
                serde_json::Value::Object(fields) if fields.contains_key("kind") => {
                    let kind = describe_failure(&fields["kind"]);
                    match fields.get("index").and_then(|i| i.as_u64()) {
                        Some(index) => format!("{}: action #{}: {}", key, index, kind),
                        None => format!("{}: {}", key, kind),
                    }
                }
                serde_json::Value::Object(fields) if fields.len() == 1 => {
                    format!("{}.{}", key, describe_failure(inner))
                }
                serde_json::Value::String(s) => format!("{}: {}", key, s),
                serde_json::Value::Null => key.clone(),
                other => format!("{}: {}", key, other),
            }
        }
        other => other.to_string(),
    }
}
