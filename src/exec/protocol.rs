/// Run protocol: the message boundary between caller and isolated cell
///
/// Requests and responses are correlated by `request_id` alone. The channel
/// may be reused for many sequential requests; nothing in the protocol
/// assumes ordering, so a client must discard responses whose id it is not
/// waiting for (late settlements of previously timed-out requests).
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::config::types::{FailureKind, Outcome, Verdict, TIMEOUT_MESSAGE};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRequest {
    pub request_id: Uuid,
    pub code: String,
    pub timeout_ms: u64,
    /// Content policy descriptor applied by the worker before evaluation.
    pub policy: Option<String>,
}

impl RunRequest {
    pub fn new(code: impl Into<String>, timeout: Duration, policy: Option<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            code: code.into(),
            timeout_ms: timeout.as_millis() as u64,
            policy,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub request_id: Uuid,
    pub succeeded: bool,
    pub elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Tagged failure reason; additive next to the legacy message text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureKind>,
}

impl RunResponse {
    pub fn from_outcome(request_id: Uuid, outcome: &Outcome) -> Self {
        Self {
            request_id,
            succeeded: outcome.succeeded(),
            elapsed_ms: outcome.elapsed_ms(),
            error_message: outcome.error_message().map(str::to_string),
            reason: outcome.verdict.failure_kind(),
        }
    }

    /// Rebuild the outcome on the caller side. Responses lacking the
    /// tagged reason fall back to the legacy message-text contract.
    pub fn into_outcome(self) -> Outcome {
        let elapsed = Duration::from_secs_f64((self.elapsed_ms / 1000.0).max(0.0));
        if self.succeeded {
            return Outcome::completed(elapsed);
        }
        let message = self.error_message.unwrap_or_default();
        let verdict = match self.reason {
            Some(FailureKind::Timeout) => Verdict::TimedOut,
            Some(FailureKind::Aborted) => Verdict::Aborted { reason: message },
            Some(FailureKind::Thrown) => Verdict::Thrown { message },
            None if message == TIMEOUT_MESSAGE => Verdict::TimedOut,
            None => Verdict::Thrown { message },
        };
        Outcome { elapsed, verdict }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_round_trips_through_the_wire_shape() {
        let outcome = Outcome::thrown(Duration::from_millis(12), "boom");
        let request_id = Uuid::new_v4();
        let response = RunResponse::from_outcome(request_id, &outcome);
        assert_eq!(response.request_id, request_id);
        assert!(!response.succeeded);
        let back = response.into_outcome();
        assert_eq!(back.error_message(), Some("boom"));
        assert_eq!(back.verdict.failure_kind(), Some(FailureKind::Thrown));
    }

    #[test]
    fn timeout_response_carries_the_fixed_message() {
        let outcome = Outcome::timed_out(Duration::from_millis(50));
        let response = RunResponse::from_outcome(Uuid::new_v4(), &outcome);
        assert_eq!(response.error_message.as_deref(), Some("Execution timeout"));
        assert_eq!(response.reason, Some(FailureKind::Timeout));
    }

    #[test]
    fn untagged_timeout_message_still_decodes_as_timeout() {
        let response = RunResponse {
            request_id: Uuid::new_v4(),
            succeeded: false,
            elapsed_ms: 50.0,
            error_message: Some(TIMEOUT_MESSAGE.to_string()),
            reason: None,
        };
        assert_eq!(response.into_outcome().verdict, Verdict::TimedOut);
    }

    #[test]
    fn wire_shape_serializes_expected_fields() {
        let request = RunRequest::new("exit 0", Duration::from_millis(250), None);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["timeout_ms"], 250);
        assert_eq!(json["code"], "exit 0");
        assert!(json.get("request_id").is_some());

        let response = RunResponse::from_outcome(
            request.request_id,
            &Outcome::completed(Duration::from_millis(3)),
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["succeeded"], true);
        assert!(json.get("error_message").is_none());
    }
}
