//! Backend client: one read endpoint for aggregate statistics and one write
//! endpoint for completed submissions.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::Config;
use crate::stats::StatsSnapshot;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The flattened submission record sent to `POST /api/submit_test`.
/// Constructed once at submit time and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub full_name: String,
    pub age: u32,
    pub gender: String,
    pub current_medication: String,
    pub recording_environment: String,
    pub language_dialect: String,
    /// Consent clause key -> granted, all ten clauses always present.
    pub consent: BTreeMap<String, bool>,
    pub question1: u8,
    pub question2: u8,
    pub question3: u8,
    pub question4: u8,
    pub question5: u8,
    pub question6: u8,
    pub question7: u8,
    pub question8: u8,
    /// Base64-encoded WAV content, standard alphabet, no data-URL prefix.
    pub audio_data: String,
}

/// Successful response from `POST /api/submit_test`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitReceipt {
    #[serde(rename = "testId")]
    pub test_id: String,
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Base64-encode captured audio for transport.
pub fn encode_audio(wav: &[u8]) -> String {
    BASE64.encode(wav)
}

/// HTTP client for the study backend. Built once at startup; the base URL
/// and request timeout come from [`Config`] and stay fixed for the process
/// lifetime.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the aggregate statistics snapshot.
    pub async fn fetch_stats(&self) -> Result<StatsSnapshot, BoxError> {
        let url = format!("{}/api/stats", self.base_url);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(format!("stats request failed: HTTP {}", resp.status()).into());
        }
        let snapshot = resp.json().await?;
        Ok(snapshot)
    }

    /// Post a completed submission and return the backend's receipt.
    pub async fn submit_test(&self, payload: &SubmissionPayload) -> Result<SubmitReceipt, BoxError> {
        let url = format!("{}/api/submit_test", self.base_url);
        let resp = self.http.post(&url).json(payload).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        decode_submit_response(status, &body)
    }
}

/// Turn a submit response into a receipt or an error message suitable for
/// showing to the user. The backend reports failures as `{"error": "..."}`;
/// when the body doesn't parse, fall back to status + raw body.
fn decode_submit_response(status: StatusCode, body: &str) -> Result<SubmitReceipt, BoxError> {
    if status.is_success() {
        let receipt = serde_json::from_str(body)
            .map_err(|e| format!("unparsable submit response: {e}"))?;
        Ok(receipt)
    } else {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(err) => err.error,
            Err(_) => format!("HTTP {status}: {body}"),
        };
        Err(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> SubmissionPayload {
        use crate::wizard::ConsentClause;
        SubmissionPayload {
            full_name: "Anonymous".into(),
            age: 25,
            gender: "Other".into(),
            current_medication: "No".into(),
            recording_environment: "Home".into(),
            language_dialect: "Standard".into(),
            consent: ConsentClause::ALL
                .iter()
                .map(|c| (c.key().to_string(), true))
                .collect(),
            question1: 0,
            question2: 1,
            question3: 2,
            question4: 3,
            question5: 0,
            question6: 1,
            question7: 2,
            question8: 3,
            audio_data: "UklGRg==".into(),
        }
    }

    #[test]
    fn payload_serializes_with_wire_keys() {
        let json = serde_json::to_value(payload()).unwrap();
        assert_eq!(json["fullName"], "Anonymous");
        assert_eq!(json["age"], 25);
        assert_eq!(json["currentMedication"], "No");
        assert_eq!(json["recordingEnvironment"], "Home");
        assert_eq!(json["languageDialect"], "Standard");
        assert_eq!(json["question1"], 0);
        assert_eq!(json["question8"], 3);
        assert_eq!(json["audioData"], "UklGRg==");
        assert_eq!(json["consent"]["privacyPolicy"], true);
        assert_eq!(json["consent"].as_object().unwrap().len(), 10);
    }

    #[test]
    fn receipt_parses_with_and_without_result() {
        let receipt =
            decode_submit_response(StatusCode::OK, r#"{"testId": "t-1", "result": "queued"}"#)
                .unwrap();
        assert_eq!(receipt.test_id, "t-1");
        assert_eq!(receipt.result.as_deref(), Some("queued"));

        let receipt = decode_submit_response(StatusCode::OK, r#"{"testId": "t-2"}"#).unwrap();
        assert_eq!(receipt.result, None);
    }

    #[test]
    fn error_body_message_is_surfaced() {
        // Scenario E, transport half.
        let err = decode_submit_response(
            StatusCode::BAD_REQUEST,
            r#"{"error": "invalid payload"}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid payload");
    }

    #[test]
    fn unparsable_error_body_falls_back_to_status() {
        let err =
            decode_submit_response(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>")
                .unwrap_err();
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("oops"));
    }

    #[test]
    fn unparsable_success_body_is_an_error() {
        let err = decode_submit_response(StatusCode::OK, "not json").unwrap_err();
        assert!(err.to_string().contains("unparsable"));
    }

    #[test]
    fn audio_encoding_round_trips() {
        let original: Vec<u8> = (0u16..512).map(|i| (i % 251) as u8).collect();
        let encoded = encode_audio(&original);
        let decoded = BASE64.decode(encoded.as_bytes()).unwrap();
        assert_eq!(decoded, original);
    }
}
