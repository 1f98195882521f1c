mod alert_layer;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use teloxide::{
    prelude::*,
    types::{ChatId, InlineKeyboardMarkup, MessageId},
    utils::command::BotCommands,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use autoaula_core::adjust::AdjustmentDraft;
use autoaula_core::api::ApiClient;
use autoaula_core::checkout::{self, CheckoutRelay, PaymentScreen, RelayAction};
use autoaula_core::config::Config;
use autoaula_core::inflight::InflightGuard;
use autoaula_core::models::format_brl;
use autoaula_core::session::{Session, SessionRegistry, Stage};
use autoaula_core::wizard::dates::{minimum_required_for, DateSelector};
use autoaula_core::wizard::review::{self, SubmitOutcome};
use autoaula_core::wizard::times::TimeSelector;
use autoaula_core::wizard::BookingDraft;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    #[command(description = "Agendar aulas")]
    Start,
    #[command(description = "Minhas aulas")]
    MyLessons,
    #[command(description = "Ajuda")]
    Help,
}

/// An abandoned submission marker is reclaimed after this long.
const INFLIGHT_MAX_AGE_SECS: u64 = 30;
/// Sweep interval for abandoned markers.
const INFLIGHT_CLEANUP_SECS: u64 = 300;

#[derive(Clone)]
struct AppState {
    api: ApiClient,
    sessions: Arc<SessionRegistry>,
    inflight: Arc<InflightGuard>,
    checkout_base: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    // ── Tracing: console + optional ops chat alerts ──
    let env_filter = EnvFilter::from_default_env().add_directive("info".parse()?);
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());

    if let Some(ops_chat_id) = config.ops_chat_id {
        registry
            .with(alert_layer::OpsAlertLayer::new(
                config.bot_token.clone(),
                ops_chat_id,
            ))
            .init();
    } else {
        registry.init();
    }

    let bot = Bot::new(&config.bot_token);

    let state = AppState {
        api: ApiClient::new(&config.api_url, config.api_token.clone()),
        sessions: Arc::new(SessionRegistry::new()),
        inflight: Arc::new(InflightGuard::new(Duration::from_secs(
            INFLIGHT_MAX_AGE_SECS,
        ))),
        checkout_base: config.checkout_url.clone(),
    };

    // ── Background task: sweep abandoned submission markers ──
    let cleanup_guard = state.inflight.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(INFLIGHT_CLEANUP_SECS));
        loop {
            interval.tick().await;
            cleanup_guard.cleanup();
        }
    });

    tracing::info!("🚗 AutoAula bot starting...");

    let cmd_handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint({
            let state = state.clone();
            move |bot: Bot, msg: Message, cmd: Command| {
                let state = state.clone();
                async move {
                    handle_command(bot, msg, cmd, &state).await?;
                    Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
                }
            }
        });

    let webapp_handler = Update::filter_message()
        .filter(|msg: Message| msg.web_app_data().is_some())
        .endpoint({
            let state = state.clone();
            move |bot: Bot, msg: Message| {
                let state = state.clone();
                async move {
                    handle_web_app_data(bot, msg, &state).await?;
                    Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
                }
            }
        });

    let callback_handler = Update::filter_callback_query().endpoint({
        let state = state.clone();
        move |bot: Bot, q: CallbackQuery| {
            let state = state.clone();
            async move {
                handle_callback(bot, q, &state).await?;
                Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
            }
        }
    });

    let handler = dptree::entry()
        .branch(cmd_handler)
        .branch(webapp_handler)
        .branch(callback_handler);

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

// ── Command handlers ──

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: &AppState,
) -> anyhow::Result<()> {
    match cmd {
        Command::Start => {
            let instructors = match state.api.approved_instructors().await {
                Ok(list) => list,
                Err(e) => {
                    tracing::error!(error = %e, "falha ao listar instrutores");
                    bot.send_message(
                        msg.chat.id,
                        "Não consegui carregar os instrutores agora. Tente novamente. 🙏",
                    )
                    .await?;
                    return Ok(());
                }
            };

            if instructors.is_empty() {
                bot.send_message(msg.chat.id, "Nenhum instrutor disponível no momento 🚗")
                    .await?;
                return Ok(());
            }

            bot.send_message(
                msg.chat.id,
                "🚗 Bem-vindo ao AutoAula!\n\nEscolha seu instrutor para começar:",
            )
            .reply_markup(ui::instructor_keyboard(&instructors))
            .await?;
        }

        Command::MyLessons => {
            let student_id = msg
                .from
                .as_ref()
                .map(|u| u.id.0.to_string())
                .unwrap_or_default();

            match state.api.student_lessons(&student_id).await {
                Ok(lessons) => {
                    let now = chrono::Utc::now().naive_utc();
                    bot.send_message(msg.chat.id, ui::lessons_text(&lessons))
                        .reply_markup(ui::lessons_keyboard(&lessons, now))
                        .await?;
                }
                Err(e) => {
                    tracing::error!(error = %e, "falha ao listar aulas");
                    bot.send_message(
                        msg.chat.id,
                        "Não consegui carregar suas aulas agora. Tente novamente. 🙏",
                    )
                    .await?;
                }
            }
        }

        Command::Help => {
            bot.send_message(
                msg.chat.id,
                "🚗 AutoAula — agendamento de aulas de direção\n\n\
                 /start — agendar aulas com um instrutor\n\
                 /mylessons — ver suas aulas e remarcar\n\
                 /help — esta mensagem",
            )
            .await?;
        }
    }

    Ok(())
}

// ── Callback query handler (inline button clicks) ──

async fn handle_callback(bot: Bot, q: CallbackQuery, state: &AppState) -> anyhow::Result<()> {
    let data = q.data.clone().unwrap_or_default();
    let chat_id = match q.message.as_ref().map(|m| m.chat().id) {
        Some(id) => id,
        None => {
            bot.answer_callback_query(&q.id).await?;
            return Ok(());
        }
    };
    let msg_id = q.message.as_ref().map(|m| m.id());
    let key = chat_id.0;

    if data == "noop" {
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    }

    if data == "flow:cancel" {
        state.sessions.end(key);
        if let Some(id) = msg_id {
            bot.edit_message_text(
                chat_id,
                id,
                "Agendamento cancelado. Use /start para recomeçar.",
            )
            .await?;
        }
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    }

    // ── Wizard entry: instructor picked ──
    if let Some(instructor_id) = data.strip_prefix("instr:") {
        let student_id = q.from.id.0.to_string();

        let instructor = match state.api.approved_instructors().await {
            Ok(list) => list.into_iter().find(|i| i.id == instructor_id),
            Err(e) => {
                tracing::error!(error = %e, "falha ao carregar instrutor");
                answer_alert(
                    &bot,
                    &q.id,
                    "Não consegui carregar o instrutor. Tente novamente.",
                )
                .await?;
                return Ok(());
            }
        };
        let Some(instructor) = instructor else {
            answer_alert(&bot, &q.id, "Este instrutor não está mais disponível.").await?;
            return Ok(());
        };

        // The lesson history decides the minimum-dates rule.
        let history = match state.api.student_lessons(&student_id).await {
            Ok(h) => h,
            Err(e) => {
                tracing::error!(error = %e, "falha ao carregar histórico de aulas");
                answer_alert(
                    &bot,
                    &q.id,
                    "Não consegui carregar seu histórico. Tente novamente.",
                )
                .await?;
                return Ok(());
            }
        };

        let selector = DateSelector::new(
            chrono::Utc::now().date_naive(),
            minimum_required_for(&history),
        );
        let text = ui::calendar_text(&instructor, &selector);
        let keyboard = ui::calendar_keyboard(&selector);
        state.sessions.start(
            key,
            Session::new(Stage::DateSelect {
                instructor,
                selector,
            }),
        );

        edit_or_send(&bot, chat_id, msg_id, text, keyboard).await?;
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    }

    // ── Date selector ──
    if data == "cal:prev" || data == "cal:next" {
        let view = state
            .sessions
            .update(key, |s| {
                if let Stage::DateSelect {
                    instructor,
                    selector,
                } = &mut s.stage
                {
                    if data == "cal:prev" {
                        selector.previous_month();
                    } else {
                        selector.next_month();
                    }
                    Some((instructor.clone(), selector.clone()))
                } else {
                    None
                }
            })
            .flatten();

        if let Some((instructor, selector)) = view {
            let text = ui::calendar_text(&instructor, &selector);
            edit_or_send(&bot, chat_id, msg_id, text, ui::calendar_keyboard(&selector)).await?;
        }
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    }

    if let Some(day) = data.strip_prefix("day:") {
        let day: u32 = day.parse().unwrap_or(0);
        let view = state
            .sessions
            .update(key, |s| {
                if let Stage::DateSelect {
                    instructor,
                    selector,
                } = &mut s.stage
                {
                    let result = selector.select_date(day);
                    Some((result, instructor.clone(), selector.clone()))
                } else {
                    None
                }
            })
            .flatten();

        match view {
            Some((Err(e), _, _)) => {
                answer_alert(&bot, &q.id, &e.to_string()).await?;
            }
            Some((Ok(()), instructor, selector)) => {
                let text = ui::calendar_text(&instructor, &selector);
                edit_or_send(&bot, chat_id, msg_id, text, ui::calendar_keyboard(&selector))
                    .await?;
                bot.answer_callback_query(&q.id).await?;
            }
            None => {
                bot.answer_callback_query(&q.id).await?;
            }
        }
        return Ok(());
    }

    if data == "dates:ok" {
        let Some(Session {
            stage:
                Stage::DateSelect {
                    instructor,
                    selector,
                },
        }) = state.sessions.get(key)
        else {
            bot.answer_callback_query(&q.id).await?;
            return Ok(());
        };

        match selector.proceed() {
            Err(e) => answer_alert(&bot, &q.id, &e.to_string()).await?,
            Ok(dates) => {
                let selector = TimeSelector::new(dates);
                let text = ui::times_text(&instructor, &selector);
                let keyboard = ui::times_keyboard(&selector);
                state.sessions.start(
                    key,
                    Session::new(Stage::TimeSelect {
                        instructor,
                        selector,
                    }),
                );
                edit_or_send(&bot, chat_id, msg_id, text, keyboard).await?;
                bot.answer_callback_query(&q.id).await?;
            }
        }
        return Ok(());
    }

    // ── Time selector ──
    if let Some(index) = data.strip_prefix("tdate:") {
        let index: usize = index.parse().unwrap_or(0);
        let view = state
            .sessions
            .update(key, |s| {
                if let Stage::TimeSelect {
                    instructor,
                    selector,
                } = &mut s.stage
                {
                    selector.switch_active_date(index);
                    Some((instructor.clone(), selector.clone()))
                } else {
                    None
                }
            })
            .flatten();

        if let Some((instructor, selector)) = view {
            let text = ui::times_text(&instructor, &selector);
            edit_or_send(&bot, chat_id, msg_id, text, ui::times_keyboard(&selector)).await?;
        }
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    }

    if let Some(time) = data.strip_prefix("slot:") {
        let time = time.to_string();
        let view = state
            .sessions
            .update(key, |s| {
                if let Stage::TimeSelect {
                    instructor,
                    selector,
                } = &mut s.stage
                {
                    let date = selector.active_date().to_string();
                    let result = selector.select_time(&date, &time);
                    Some((result, instructor.clone(), selector.clone()))
                } else {
                    None
                }
            })
            .flatten();

        match view {
            Some((Err(e), _, _)) => answer_alert(&bot, &q.id, &e.to_string()).await?,
            Some((Ok(()), instructor, selector)) => {
                let text = ui::times_text(&instructor, &selector);
                edit_or_send(&bot, chat_id, msg_id, text, ui::times_keyboard(&selector)).await?;
                bot.answer_callback_query(&q.id).await?;
            }
            None => {
                bot.answer_callback_query(&q.id).await?;
            }
        }
        return Ok(());
    }

    if data == "times:ok" {
        let Some(Session {
            stage:
                Stage::TimeSelect {
                    instructor,
                    selector,
                },
        }) = state.sessions.get(key)
        else {
            bot.answer_callback_query(&q.id).await?;
            return Ok(());
        };

        let dates = selector.dates().to_vec();
        match selector.proceed() {
            Err(e) => answer_alert(&bot, &q.id, &e.to_string()).await?,
            Ok(times) => {
                let draft = BookingDraft {
                    instructor_id: instructor.id.clone(),
                    selected_dates: dates,
                    selected_times: times,
                };

                // Review screen entry: wallet + instructor fetched together,
                // all-or-nothing.
                let ctx = match review::load_review_context(&state.api, &draft.instructor_id)
                    .await
                {
                    Ok(ctx) => ctx,
                    Err(e) => {
                        tracing::error!(error = %e, "falha ao carregar resumo");
                        answer_alert(
                            &bot,
                            &q.id,
                            "Não consegui montar o resumo agora. Tente novamente.",
                        )
                        .await?;
                        return Ok(());
                    }
                };

                let total = match review::total_amount(
                    draft.selected_times.len(),
                    ctx.instructor.hourly_rate_centavos(),
                ) {
                    Ok(total) => total,
                    Err(e) => {
                        // No price, no booking. The flow cannot continue.
                        state.sessions.end(key);
                        edit_or_send_plain(&bot, chat_id, msg_id, e.to_string()).await?;
                        bot.answer_callback_query(&q.id).await?;
                        return Ok(());
                    }
                };

                let path = review::decide_path(ctx.wallet.available_centavos(), total);
                let text = ui::review_text(
                    &ctx.instructor,
                    &ctx.wallet,
                    &draft.selected_times,
                    total,
                    path,
                );
                state
                    .sessions
                    .start(key, Session::new(Stage::Review { draft }));
                edit_or_send(&bot, chat_id, msg_id, text, ui::review_keyboard()).await?;
                bot.answer_callback_query(&q.id).await?;
            }
        }
        return Ok(());
    }

    // ── Review: confirm booking ──
    if data == "book:ok" {
        let Some(Session {
            stage: Stage::Review { draft },
        }) = state.sessions.get(key)
        else {
            bot.answer_callback_query(&q.id).await?;
            return Ok(());
        };

        // One submission at a time per chat.
        if !state.inflight.try_acquire(key) {
            answer_alert(
                &bot,
                &q.id,
                "Aguarde, ainda estou processando seu agendamento...",
            )
            .await?;
            return Ok(());
        }

        let student_id = q.from.id.0.to_string();
        let result = async {
            let ctx = review::load_review_context(&state.api, &draft.instructor_id).await?;
            review::submit(&state.api, &student_id, &draft, &ctx).await
        }
        .await;
        state.inflight.release(key);

        match result {
            Err(e) => {
                tracing::error!(error = %e, "falha ao enviar agendamento");
                // Draft preserved: the same submission can be retried.
                answer_alert(
                    &bot,
                    &q.id,
                    "Não foi possível enviar o agendamento. Tente novamente.",
                )
                .await?;
            }
            Ok(SubmitOutcome::Booked) => {
                state.sessions.end(key);
                edit_or_send_plain(
                    &bot,
                    chat_id,
                    msg_id,
                    "✅ Agendamento enviado!\n\n\
                     O valor foi reservado na sua carteira e as aulas aguardam \
                     aprovação do instrutor. Acompanhe em /mylessons."
                        .to_string(),
                )
                .await?;
                bot.answer_callback_query(&q.id).await?;
            }
            Ok(SubmitOutcome::CheckoutRequired(handoff)) => {
                match checkout::checkout_url(&state.checkout_base, &handoff) {
                    Err(e) => {
                        tracing::error!(error = %e, "URL de checkout inválida");
                        answer_alert(&bot, &q.id, "Erro ao abrir o pagamento. Tente novamente.")
                            .await?;
                    }
                    Ok(url) => {
                        let text = format!(
                            "💳 Pagamento pendente: {}\n\n\
                             Toque abaixo para pagar com cartão ou PIX.",
                            format_brl(handoff.amount),
                        );
                        let keyboard = ui::checkout_keyboard(url);
                        state.sessions.start(
                            key,
                            Session::new(Stage::Checkout {
                                relay: CheckoutRelay::new(handoff),
                                draft,
                            }),
                        );
                        edit_or_send(&bot, chat_id, msg_id, text, keyboard).await?;
                        bot.answer_callback_query(&q.id).await?;
                    }
                }
            }
        }
        return Ok(());
    }

    // ── Adjustment flow ──
    if data == "adjust:ok" {
        let Some(Session {
            stage: Stage::Adjust { draft, .. },
        }) = state.sessions.get(key)
        else {
            bot.answer_callback_query(&q.id).await?;
            return Ok(());
        };

        match draft.build() {
            Err(e) => answer_alert(&bot, &q.id, &e.to_string()).await?,
            Ok(request) => match state.api.submit_adjustment(&request).await {
                Err(e) => {
                    tracing::error!(error = %e, "falha ao enviar proposta de remarcação");
                    answer_alert(
                        &bot,
                        &q.id,
                        "Não foi possível enviar a proposta. Tente novamente.",
                    )
                    .await?;
                }
                Ok(()) => {
                    state.sessions.end(key);
                    edit_or_send_plain(
                        &bot,
                        chat_id,
                        msg_id,
                        "✅ Proposta enviada!\n\n\
                         A aula continua confirmada no horário atual até o \
                         instrutor aprovar a mudança."
                            .to_string(),
                    )
                    .await?;
                    bot.answer_callback_query(&q.id).await?;
                }
            },
        }
        return Ok(());
    }

    if let Some(lesson_id) = data.strip_prefix("adjust:") {
        let calendar = DateSelector::new(chrono::Utc::now().date_naive(), 1);
        let draft = AdjustmentDraft::new(lesson_id);
        let text = ui::adjust_text(&draft);
        let keyboard = ui::adjust_keyboard(&calendar, &draft);
        state
            .sessions
            .start(key, Session::new(Stage::Adjust { draft, calendar }));

        bot.send_message(chat_id, text).reply_markup(keyboard).await?;
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    }

    if data == "acal:prev"
        || data == "acal:next"
        || data.starts_with("aday:")
        || data.starts_with("aslot:")
    {
        let view = state
            .sessions
            .update(key, |s| {
                if let Stage::Adjust { draft, calendar } = &mut s.stage {
                    if data == "acal:prev" {
                        calendar.previous_month();
                    } else if data == "acal:next" {
                        calendar.next_month();
                    } else if let Some(day) = data.strip_prefix("aday:") {
                        let day: u32 = day.parse().unwrap_or(0);
                        // Past days stay unselectable, same as the booking
                        // calendar.
                        if !calendar.is_past(day) {
                            draft.select_date(calendar.date_for(day));
                        }
                    } else if let Some(time) = data.strip_prefix("aslot:") {
                        draft.select_time(time);
                    }
                    Some((draft.clone(), calendar.clone()))
                } else {
                    None
                }
            })
            .flatten();

        if let Some((draft, calendar)) = view {
            let text = ui::adjust_text(&draft);
            edit_or_send(
                &bot,
                chat_id,
                msg_id,
                text,
                ui::adjust_keyboard(&calendar, &draft),
            )
            .await?;
        }
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    }

    bot.answer_callback_query(&q.id).await?;
    Ok(())
}

// ── WebApp checkout relay ──

async fn handle_web_app_data(bot: Bot, msg: Message, state: &AppState) -> anyhow::Result<()> {
    let Some(data) = msg.web_app_data() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let key = chat_id.0;

    let Some(Session {
        stage: Stage::Checkout { mut relay, draft },
    }) = state.sessions.get(key)
    else {
        bot.send_message(chat_id, "Nenhum pagamento em andamento. Use /start.")
            .await?;
        return Ok(());
    };

    let message = match checkout::parse_message(&data.data) {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(error = %e, "mensagem inválida do checkout");
            bot.send_message(
                chat_id,
                "Recebi uma mensagem inválida do checkout. Tente novamente.",
            )
            .await?;
            return Ok(());
        }
    };

    let action = relay.handle(message, &state.api).await;

    // Persist relay state (device id) before acting on the outcome.
    state.sessions.start(
        key,
        Session::new(Stage::Checkout {
            relay,
            draft: draft.clone(),
        }),
    );

    match action {
        RelayAction::None => {}

        RelayAction::Abort { message } => {
            // Back to review; the draft survives for another attempt.
            state
                .sessions
                .start(key, Session::new(Stage::Review { draft }));
            bot.send_message(
                chat_id,
                format!(
                    "❌ O pagamento falhou: {message}\n\n\
                     Seu agendamento continua pendente — você pode tentar de novo."
                ),
            )
            .reply_markup(ui::review_keyboard())
            .await?;
        }

        RelayAction::NavigateBack => {
            state
                .sessions
                .start(key, Session::new(Stage::Review { draft }));
            bot.send_message(
                chat_id,
                "Pagamento cancelado. Seu agendamento continua pendente — \
                 você pode tentar pagar novamente.",
            )
            .reply_markup(ui::review_keyboard())
            .await?;
        }

        RelayAction::Inject { json } => {
            bot.send_message(chat_id, pix_reply(&json)).await?;
        }

        RelayAction::Halt { message } => {
            bot.send_message(chat_id, message).await?;
        }

        RelayAction::Confirm(request) => {
            let screen = checkout::confirm_card(&state.api, &request).await;
            state.sessions.end(key);
            let text = match screen {
                PaymentScreen::Success => {
                    "✅ Pagamento aprovado!\n\nSuas aulas foram agendadas. \
                     Acompanhe em /mylessons."
                }
                PaymentScreen::Pending => {
                    "⏳ Pagamento em processamento.\n\nAssim que for aprovado, \
                     suas aulas aparecem em /mylessons. Verifique mais tarde."
                }
                PaymentScreen::Failure => {
                    "❌ O pagamento não foi aprovado.\n\nUse /start para tentar \
                     novamente."
                }
            };
            bot.send_message(chat_id, text).await?;
        }
    }

    Ok(())
}

/// Render the injected PIX payload for the chat: the copia-e-cola code when
/// the gateway provided one, the error otherwise.
fn pix_reply(json: &str) -> String {
    let value: serde_json::Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(_) => return "Não foi possível gerar o PIX. Tente novamente.".into(),
    };
    if let Some(error) = value.get("error").and_then(|e| e.as_str()) {
        return format!("Não foi possível gerar o PIX: {error}");
    }
    if let Some(code) = value["point_of_interaction"]["transaction_data"]["qr_code"].as_str() {
        return format!("🔑 PIX copia e cola:\n\n{code}");
    }
    "PIX criado. Finalize o pagamento na tela de checkout.".into()
}

// ── Helpers ──

async fn answer_alert(bot: &Bot, query_id: &str, text: &str) -> anyhow::Result<()> {
    bot.answer_callback_query(query_id)
        .text(text)
        .show_alert(true)
        .await?;
    Ok(())
}

async fn edit_or_send(
    bot: &Bot,
    chat_id: ChatId,
    msg_id: Option<MessageId>,
    text: String,
    keyboard: InlineKeyboardMarkup,
) -> anyhow::Result<()> {
    match msg_id {
        Some(id) => {
            bot.edit_message_text(chat_id, id, text)
                .reply_markup(keyboard)
                .await?;
        }
        None => {
            bot.send_message(chat_id, text).reply_markup(keyboard).await?;
        }
    }
    Ok(())
}

async fn edit_or_send_plain(
    bot: &Bot,
    chat_id: ChatId,
    msg_id: Option<MessageId>,
    text: String,
) -> anyhow::Result<()> {
    match msg_id {
        Some(id) => {
            bot.edit_message_text(chat_id, id, text).await?;
        }
        None => {
            bot.send_message(chat_id, text).await?;
        }
    }
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pix_reply_extracts_qr_code() {
        let json = r#"{"id":123,"point_of_interaction":{"transaction_data":{"qr_code":"00020126..."}}}"#;
        let reply = pix_reply(json);
        assert!(reply.contains("00020126..."));
    }

    #[test]
    fn test_pix_reply_surfaces_relayed_error() {
        let reply = pix_reply(r#"{"error":"API error 500: gateway"}"#);
        assert!(reply.contains("gateway"));
    }

    #[test]
    fn test_pix_reply_handles_unexpected_shape() {
        let reply = pix_reply(r#"{"id":123}"#);
        assert!(reply.contains("PIX criado"));
    }
}
