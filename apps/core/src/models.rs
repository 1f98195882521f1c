use serde::{Deserialize, Serialize};

// ── Money ──

/// Amounts are handled internally as integer centavos. The backend speaks
/// decimal reais, so wire structs carry `f64` and convert at the edge.
pub type Centavos = i64;

/// Convert a decimal reais value from the wire into centavos.
pub fn centavos(reais: f64) -> Centavos {
    (reais * 100.0).round() as Centavos
}

/// Convert centavos back to the decimal reais the backend expects.
pub fn reais(amount: Centavos) -> f64 {
    amount as f64 / 100.0
}

/// Format centavos for display: `R$ 160,00`.
pub fn format_brl(amount: Centavos) -> String {
    format!("R$ {},{:02}", amount / 100, (amount % 100).abs())
}

// ── Wire models ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonStatus {
    WaitingApproval,
    PendingPayment,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Wallet,
    Card,
    Pix,
}

/// Which way a booking gets paid. Derived at review time, never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPath {
    Wallet,
    Gateway,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: String,
    pub name: String,
    /// Decimal reais per lesson hour. Absent means the instructor is not
    /// priceable and booking must not proceed.
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub vehicle: Option<String>,
}

impl Instructor {
    pub fn hourly_rate_centavos(&self) -> Option<Centavos> {
        self.hourly_rate.map(centavos)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub total_balance: f64,
    pub available_balance: f64,
    pub locked_balance: f64,
    pub used_balance: f64,
}

impl WalletBalance {
    pub fn available_centavos(&self) -> Centavos {
        centavos(self.available_balance)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    /// `YYYY-MM-DD`, possibly with a trailing time component from the
    /// backend's serializer.
    pub date: String,
    /// `HH:MM`, same caveat.
    pub time: String,
    pub status: LessonStatus,
    #[serde(default)]
    pub instructor_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

// ── Schedule request/response ──

/// One lesson inside a schedule request. Every lesson is 50 minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSlot {
    pub date: String,
    pub time: String,
    pub duration: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub student_id: String,
    pub instructor_id: String,
    pub lessons: Vec<LessonSlot>,
    pub total_amount: f64,
    pub status: LessonStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub lesson_ids: Vec<String>,
}

// ── Payments ──

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixCreateRequest {
    pub amount: f64,
    pub external_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardConfirmRequest {
    pub token: String,
    pub payment_method_id: String,
    pub issuer_id: String,
    pub installments: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub amount: f64,
    pub external_reference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardConfirmResponse {
    pub status: String,
}

// ── Adjustment ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonAdjustmentRequest {
    pub lesson_id: String,
    pub proposed_date: String,
    pub proposed_time: String,
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centavos_whole() {
        assert_eq!(centavos(80.0), 8000);
    }

    #[test]
    fn test_centavos_fraction() {
        assert_eq!(centavos(99.99), 9999);
    }

    #[test]
    fn test_centavos_rounds() {
        // 0.1 + 0.2 style float noise must not lose a centavo
        assert_eq!(centavos(0.29999999999999999), 30);
    }

    #[test]
    fn test_reais_roundtrip() {
        assert_eq!(reais(16000), 160.0);
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(16000), "R$ 160,00");
        assert_eq!(format_brl(9999), "R$ 99,99");
        assert_eq!(format_brl(50), "R$ 0,50");
    }

    #[test]
    fn test_lesson_status_wire_format() {
        let json = serde_json::to_string(&LessonStatus::WaitingApproval).unwrap();
        assert_eq!(json, "\"WAITING_APPROVAL\"");
        let back: LessonStatus = serde_json::from_str("\"PENDING_PAYMENT\"").unwrap();
        assert_eq!(back, LessonStatus::PendingPayment);
    }

    #[test]
    fn test_payment_method_wire_format() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Wallet).unwrap(),
            "\"WALLET\""
        );
    }

    #[test]
    fn test_schedule_request_omits_missing_payment_method() {
        let req = ScheduleRequest {
            student_id: "stu-1".into(),
            instructor_id: "ins-1".into(),
            lessons: vec![],
            total_amount: 160.0,
            status: LessonStatus::PendingPayment,
            payment_method: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("paymentMethod"));
        assert!(json.contains("\"status\":\"PENDING_PAYMENT\""));
    }

    #[test]
    fn test_schedule_request_camel_case_fields() {
        let req = ScheduleRequest {
            student_id: "stu-1".into(),
            instructor_id: "ins-1".into(),
            lessons: vec![LessonSlot {
                date: "2026-09-01".into(),
                time: "08:00".into(),
                duration: 50,
                price: 80.0,
            }],
            total_amount: 80.0,
            status: LessonStatus::WaitingApproval,
            payment_method: Some(PaymentMethod::Wallet),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"studentId\":\"stu-1\""));
        assert!(json.contains("\"totalAmount\":80.0"));
        assert!(json.contains("\"paymentMethod\":\"WALLET\""));
    }

    #[test]
    fn test_wallet_balance_parses_backend_shape() {
        let balance: WalletBalance = serde_json::from_str(
            r#"{"totalBalance":250.0,"availableBalance":200.0,"lockedBalance":50.0,"usedBalance":400.0}"#,
        )
        .unwrap();
        assert_eq!(balance.available_centavos(), 20000);
    }

    #[test]
    fn test_instructor_rate_optional() {
        let instructor: Instructor =
            serde_json::from_str(r#"{"id":"ins-1","name":"Carlos"}"#).unwrap();
        assert!(instructor.hourly_rate_centavos().is_none());
    }
}
