//! Bridge between the embedded checkout surface and the host. The surface
//! runs in an isolated context with no trusted network path to the
//! backend, so the host brokers every call: PIX objects are created
//! server-side and injected back, card tokens are forwarded exactly once
//! to the confirm endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::api::ApiClient;
use crate::models::{reais, CardConfirmRequest, PixCreateRequest};
use crate::wizard::review::CheckoutHandoff;

// ── Incoming protocol ──

/// A tokenized card attempt reported by the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardToken {
    pub token: String,
    pub payment_method_id: String,
    pub issuer_id: String,
    pub installments: i64,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Dados do cartão incompletos: falta {0}")]
    MissingField(&'static str),
    #[error("Número de parcelas inválido")]
    BadInstallments,
}

impl CardToken {
    /// All fields present and installments positive, or the attempt halts.
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.token.is_empty() {
            return Err(TokenError::MissingField("token"));
        }
        if self.payment_method_id.is_empty() {
            return Err(TokenError::MissingField("paymentMethodId"));
        }
        if self.issuer_id.is_empty() {
            return Err(TokenError::MissingField("issuerId"));
        }
        if self.installments < 1 {
            return Err(TokenError::BadInstallments);
        }
        Ok(())
    }
}

/// Everything the checkout surface may say to the host. Closed set: an
/// unknown `type` tag fails to parse rather than being ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutMessage {
    #[serde(rename_all = "camelCase")]
    DeviceId { device_id: String },
    Error { message: String },
    Cancel,
    PixCreate,
    Token(CardToken),
}

/// Parse one raw message from the surface.
pub fn parse_message(raw: &str) -> anyhow::Result<CheckoutMessage> {
    serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("mensagem do checkout inválida: {e}"))
}

// ── Relay ──

/// What the host must do in response to a surface message.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayAction {
    /// Nothing visible (e.g. device id stored).
    None,
    /// Fatal gateway error: alert the user and return to the previous
    /// screen. The draft survives.
    Abort { message: String },
    /// User cancelled inside the surface: navigate back, draft preserved.
    NavigateBack,
    /// JSON payload to hand back into the surface's execution context.
    Inject { json: String },
    /// Invalid token fields: alert and halt this attempt.
    Halt { message: String },
    /// Valid token: move to the confirm stage with this payload.
    Confirm(CardConfirmRequest),
}

/// Host-side state for one checkout attempt.
#[derive(Debug, Clone)]
pub struct CheckoutRelay {
    handoff: CheckoutHandoff,
    device_id: Option<String>,
}

impl CheckoutRelay {
    pub fn new(handoff: CheckoutHandoff) -> Self {
        Self {
            handoff,
            device_id: None,
        }
    }

    pub fn handoff(&self) -> &CheckoutHandoff {
        &self.handoff
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    /// Handle one message. Only PIX creation touches the network; errors
    /// there are relayed back through the same injection channel instead
    /// of surfacing host-side.
    pub async fn handle(&mut self, msg: CheckoutMessage, api: &ApiClient) -> RelayAction {
        match msg {
            CheckoutMessage::DeviceId { device_id } => {
                self.device_id = Some(device_id);
                RelayAction::None
            }
            CheckoutMessage::Error { message } => {
                tracing::error!(message = %message, "checkout reportou erro fatal");
                RelayAction::Abort { message }
            }
            CheckoutMessage::Cancel => RelayAction::NavigateBack,
            CheckoutMessage::PixCreate => {
                let request = PixCreateRequest {
                    amount: reais(self.handoff.amount),
                    external_reference: self.handoff.external_reference.clone(),
                    device_id: self.device_id.clone(),
                };
                let json = match api.create_pix_payment(&request).await {
                    Ok(value) => value.to_string(),
                    Err(e) => {
                        tracing::error!(error = %e, "criação de PIX falhou");
                        serde_json::json!({ "error": e.to_string() }).to_string()
                    }
                };
                RelayAction::Inject { json }
            }
            CheckoutMessage::Token(token) => match token.validate() {
                Err(e) => RelayAction::Halt {
                    message: e.to_string(),
                },
                Ok(()) => RelayAction::Confirm(CardConfirmRequest {
                    token: token.token,
                    payment_method_id: token.payment_method_id,
                    issuer_id: token.issuer_id,
                    installments: token.installments,
                    device_id: token.device_id.or_else(|| self.device_id.clone()),
                    amount: reais(self.handoff.amount),
                    external_reference: self.handoff.external_reference.clone(),
                }),
            },
        }
    }
}

// ── Confirm stage ──

/// Terminal screen after a card confirmation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentScreen {
    Success,
    Pending,
    Failure,
}

/// Map the gateway status string onto a terminal screen. Pending states
/// are not errors; the user checks back later (no client-side polling).
pub fn screen_for_status(status: &str) -> PaymentScreen {
    match status {
        "approved" => PaymentScreen::Success,
        "pending" | "in_process" => PaymentScreen::Pending,
        _ => PaymentScreen::Failure,
    }
}

/// Finalize the charge. Transport failure routes to the failure screen,
/// same as a rejected status.
pub async fn confirm_card(api: &ApiClient, request: &CardConfirmRequest) -> PaymentScreen {
    match api.confirm_card_payment(request).await {
        Ok(resp) => screen_for_status(&resp.status),
        Err(e) => {
            tracing::error!(error = %e, "confirmação de cartão falhou");
            PaymentScreen::Failure
        }
    }
}

// ── Checkout URL ──

/// Build the backend-served checkout page URL with its query parameters.
pub fn checkout_url(base: &str, handoff: &CheckoutHandoff) -> anyhow::Result<Url> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut()
        .append_pair("amount", &format!("{:.2}", reais(handoff.amount)))
        .append_pair("externalReference", &handoff.external_reference)
        .append_pair("summaryTitle", &handoff.summary_title)
        .append_pair("summarySubtitle", &handoff.summary_subtitle);
    Ok(url)
}

// ── Tests ──
