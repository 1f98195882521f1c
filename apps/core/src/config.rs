use anyhow::Context;

/// Runtime configuration, read once at startup from the environment
/// (`dotenvy` is loaded by the binary before calling this).
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token.
    pub bot_token: String,
    /// Base URL of the backend REST API.
    pub api_url: String,
    /// Optional bearer token attached to every API call.
    pub api_token: Option<String>,
    /// Backend-served checkout page opened as a WebApp.
    pub checkout_url: String,
    /// Chat that receives ERROR-level alerts. Alerts are off when unset.
    pub ops_chat_id: Option<i64>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bot_token = std::env::var("BOT_TOKEN").context("BOT_TOKEN must be set")?;
        let api_url = std::env::var("API_URL").context("API_URL must be set")?;
        let api_token = std::env::var("API_TOKEN").ok();
        let checkout_url =
            std::env::var("CHECKOUT_URL").context("CHECKOUT_URL must be set")?;
        let ops_chat_id = match std::env::var("OPS_CHAT_ID") {
            Ok(raw) => Some(
                raw.parse::<i64>()
                    .context("OPS_CHAT_ID must be a number")?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            bot_token,
            api_url,
            api_token,
            checkout_url,
            ops_chat_id,
        })
    }
}
