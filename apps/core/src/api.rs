use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{
    CardConfirmRequest, CardConfirmResponse, Instructor, Lesson, LessonAdjustmentRequest,
    PixCreateRequest, ScheduleRequest, ScheduleResponse, WalletBalance,
};

/// Thin client over the backend REST API. All business rules live on the
/// server; this only shapes requests and surfaces failures.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let mut req = self.http.get(self.url(path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let mut req = self.http.post(self.url(path)).json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    // ── Endpoints ──

    /// GET instructors/approved — bookable instructors with hourly rates.
    pub async fn approved_instructors(&self) -> anyhow::Result<Vec<Instructor>> {
        self.get_json("instructors/approved").await
    }

    /// GET student/lessons/{id} — the student's lesson history.
    pub async fn student_lessons(&self, student_id: &str) -> anyhow::Result<Vec<Lesson>> {
        self.get_json(&format!("student/lessons/{student_id}")).await
    }

    /// GET wallet/balance — current wallet figures.
    pub async fn wallet_balance(&self) -> anyhow::Result<WalletBalance> {
        self.get_json("wallet/balance").await
    }

    /// POST student/schedule — create a booking.
    pub async fn create_schedule(
        &self,
        req: &ScheduleRequest,
    ) -> anyhow::Result<ScheduleResponse> {
        self.post_json("student/schedule", req).await
    }

    /// POST payments/mercado-pago/pix/create — server-brokered PIX object.
    ///
    /// The result is kept as raw JSON: the checkout surface consumes it
    /// verbatim and the client must not reinterpret it.
    pub async fn create_pix_payment(
        &self,
        req: &PixCreateRequest,
    ) -> anyhow::Result<serde_json::Value> {
        self.post_json("payments/mercado-pago/pix/create", req).await
    }

    /// POST payments/mercado-pago/card/confirm — finalize a tokenized charge.
    pub async fn confirm_card_payment(
        &self,
        req: &CardConfirmRequest,
    ) -> anyhow::Result<CardConfirmResponse> {
        self.post_json("payments/mercado-pago/card/confirm", req).await
    }

    /// POST student/schedule/adjust — propose a new date/time for a lesson.
    pub async fn submit_adjustment(
        &self,
        req: &LessonAdjustmentRequest,
    ) -> anyhow::Result<()> {
        let _: serde_json::Value = self.post_json("student/schedule/adjust", req).await?;
        Ok(())
    }
}

/// Turn a non-success response into an error carrying the best message the
/// body offers. The caller logs and surfaces it; the draft stays intact so
/// the same submission can be retried.
async fn check_status(resp: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    anyhow::bail!("API error {}: {}", status, extract_message(&body))
}

/// Best-effort extraction of a human message from an error body:
/// `message`, then `error`, then the raw text (truncated).
fn extract_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "sem detalhes".into();
    }
    trimmed.chars().take(200).collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_field() {
        assert_eq!(
            extract_message(r#"{"message":"saldo insuficiente"}"#),
            "saldo insuficiente"
        );
    }

    #[test]
    fn test_extract_error_field() {
        assert_eq!(extract_message(r#"{"error":"not found"}"#), "not found");
    }

    #[test]
    fn test_extract_prefers_message_over_error() {
        assert_eq!(
            extract_message(r#"{"error":"x","message":"y"}"#),
            "y"
        );
    }

    #[test]
    fn test_extract_raw_text() {
        assert_eq!(extract_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_extract_empty_body() {
        assert_eq!(extract_message(""), "sem detalhes");
    }

    #[test]
    fn test_extract_truncates_long_bodies() {
        let long = "x".repeat(500);
        assert_eq!(extract_message(&long).len(), 200);
    }

    #[test]
    fn test_url_join_strips_trailing_slash() {
        let client = ApiClient::new("https://api.example.com/", None);
        assert_eq!(
            client.url("wallet/balance"),
            "https://api.example.com/wallet/balance"
        );
    }
}
