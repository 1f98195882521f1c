//! Tracing layer that forwards ERROR events to the ops chat, throttled and
//! deduplicated so a cascading failure does not flood Telegram.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Minimum gap between two alerts, whatever their content.
const THROTTLE: Duration = Duration::from_secs(15);
/// How long an identical error stays suppressed after being sent.
const DEDUP_TTL: Duration = Duration::from_secs(120);

pub struct OpsAlertLayer {
    bot_token: String,
    chat_id: i64,
    http: reqwest::Client,
    state: Mutex<AlertState>,
}

struct AlertState {
    last_sent: Instant,
    /// message hash → when it was last sent.
    recent: HashMap<u64, Instant>,
}

impl OpsAlertLayer {
    pub fn new(bot_token: String, chat_id: i64) -> Self {
        Self {
            bot_token,
            chat_id,
            http: reqwest::Client::new(),
            state: Mutex::new(AlertState {
                // First alert goes out immediately.
                last_sent: Instant::now() - THROTTLE,
                recent: HashMap::new(),
            }),
        }
    }
}

/// Throttle + dedup decision. Mutates the state when the alert may go out.
fn should_send(state: &mut AlertState, hash: u64, now: Instant) -> bool {
    state.recent.retain(|_, sent| now.duration_since(*sent) < DEDUP_TTL);

    if state.recent.contains_key(&hash) {
        return false;
    }
    if now.duration_since(state.last_sent) < THROTTLE {
        return false;
    }
    state.last_sent = now;
    state.recent.insert(hash, now);
    true
}

impl<S: Subscriber> Layer<S> for OpsAlertLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }

        let mut visitor = TextVisitor::default();
        event.record(&mut visitor);
        let message = visitor.text();

        let hash = {
            let mut h = DefaultHasher::new();
            message.hash(&mut h);
            h.finish()
        };

        let allowed = {
            let mut state = self.state.lock().unwrap();
            should_send(&mut state, hash, Instant::now())
        };
        if !allowed {
            return;
        }

        let text = format!(
            "⚠️ autoaula: {}\n{} ({}:{})",
            message,
            event.metadata().target(),
            event.metadata().file().unwrap_or("?"),
            event
                .metadata()
                .line()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "?".into()),
        );

        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let client = self.http.clone();
        let chat_id = self.chat_id;
        tokio::spawn(async move {
            let _ = client
                .post(&url)
                .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
                .send()
                .await;
        });
    }
}

/// Collects the event's `message` plus any structured fields into one line.
#[derive(Default)]
struct TextVisitor {
    message: String,
    extras: Vec<String>,
}

impl TextVisitor {
    fn text(&self) -> String {
        match (self.message.is_empty(), self.extras.is_empty()) {
            (false, true) => self.message.clone(),
            (false, false) => format!("{} [{}]", self.message, self.extras.join(" ")),
            (true, _) => self.extras.join(" "),
        }
    }
}

impl Visit for TextVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.extras.push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.extras.push(format!("{}={}", field.name(), value));
        }
    }
}

// ── Tests ──
