//! Keyboard builders and text formatting for the wizard screens.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};

use autoaula_core::adjust::AdjustmentDraft;
use autoaula_core::models::{
    format_brl, Centavos, Instructor, Lesson, LessonStatus, PaymentPath, WalletBalance,
};
use autoaula_core::wizard::dates::DateSelector;
use autoaula_core::wizard::times::TimeSelector;
use autoaula_core::wizard::TIME_SLOTS;

// ── Formatting ──

pub fn month_name(month: u32) -> &'static str {
    const MONTHS: [&str; 12] = [
        "janeiro",
        "fevereiro",
        "março",
        "abril",
        "maio",
        "junho",
        "julho",
        "agosto",
        "setembro",
        "outubro",
        "novembro",
        "dezembro",
    ];
    MONTHS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("?")
}

/// `2026-09-20` → `20/09`.
pub fn short_date(iso: &str) -> String {
    let parts: Vec<&str> = iso.split('-').collect();
    if parts.len() != 3 {
        return iso.to_string();
    }
    format!("{}/{}", parts[2], parts[1])
}

pub fn status_label(status: LessonStatus) -> &'static str {
    match status {
        LessonStatus::WaitingApproval => "aguardando aprovação",
        LessonStatus::PendingPayment => "aguardando pagamento",
        LessonStatus::Confirmed => "confirmada",
        LessonStatus::Cancelled => "cancelada",
        LessonStatus::Completed => "concluída",
    }
}

// ── Instructor list ──

pub fn instructor_keyboard(instructors: &[Instructor]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = instructors
        .iter()
        .map(|i| {
            let label = match i.hourly_rate_centavos() {
                Some(rate) => format!("{} — {}/h", i.name, format_brl(rate)),
                None => i.name.clone(),
            };
            vec![InlineKeyboardButton::callback(
                label,
                format!("instr:{}", i.id),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

// ── Calendar ──

/// Month navigation plus a 7-wide day grid. `nav_prefix`/`day_prefix`
/// distinguish the booking calendar from the adjustment calendar.
fn calendar_rows(
    selector: &DateSelector,
    nav_prefix: &str,
    day_prefix: &str,
    is_marked: impl Fn(u32) -> bool,
) -> Vec<Vec<InlineKeyboardButton>> {
    let mut rows = vec![vec![
        InlineKeyboardButton::callback("◀", format!("{nav_prefix}:prev")),
        InlineKeyboardButton::callback(
            format!("{} {}", month_name(selector.month()), selector.year()),
            "noop".to_string(),
        ),
        InlineKeyboardButton::callback("▶", format!("{nav_prefix}:next")),
    ]];

    let days: Vec<InlineKeyboardButton> = (1..=selector.days_in_month())
        .map(|day| {
            let label = if is_marked(day) {
                format!("✅{day}")
            } else if selector.is_past(day) {
                format!("·{day}")
            } else {
                day.to_string()
            };
            InlineKeyboardButton::callback(label, format!("{day_prefix}:{day}"))
        })
        .collect();
    rows.extend(days.chunks(7).map(|chunk| chunk.to_vec()));
    rows
}

pub fn calendar_keyboard(selector: &DateSelector) -> InlineKeyboardMarkup {
    let mut rows = calendar_rows(selector, "cal", "day", |day| selector.is_selected(day));
    rows.push(vec![InlineKeyboardButton::callback(
        "Continuar ➡",
        "dates:ok".to_string(),
    )]);
    rows.push(vec![InlineKeyboardButton::callback(
        "✖ Cancelar",
        "flow:cancel".to_string(),
    )]);
    InlineKeyboardMarkup::new(rows)
}

pub fn calendar_text(instructor: &Instructor, selector: &DateSelector) -> String {
    format!(
        "📅 Agenda de {}\n\n\
         Escolha até 10 datas para suas aulas (mínimo {}).\n\
         Selecionadas: {}",
        instructor.name,
        selector.minimum_required(),
        selector.selected().len(),
    )
}

// ── Time slots ──

pub fn times_keyboard(selector: &TimeSelector) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    let tabs: Vec<InlineKeyboardButton> = selector
        .dates()
        .iter()
        .enumerate()
        .map(|(idx, date)| {
            let label = if idx == selector.active_index() {
                format!("▸ {}", short_date(date))
            } else {
                short_date(date)
            };
            InlineKeyboardButton::callback(label, format!("tdate:{idx}"))
        })
        .collect();
    rows.extend(tabs.chunks(5).map(|chunk| chunk.to_vec()));

    let active = selector.active_date().to_string();
    let slots: Vec<InlineKeyboardButton> = TIME_SLOTS
        .iter()
        .map(|time| {
            let label = if selector.is_selected(&active, time) {
                format!("✅{time}")
            } else {
                (*time).to_string()
            };
            InlineKeyboardButton::callback(label, format!("slot:{time}"))
        })
        .collect();
    rows.extend(slots.chunks(4).map(|chunk| chunk.to_vec()));

    rows.push(vec![InlineKeyboardButton::callback(
        "Continuar ➡",
        "times:ok".to_string(),
    )]);
    rows.push(vec![InlineKeyboardButton::callback(
        "✖ Cancelar",
        "flow:cancel".to_string(),
    )]);
    InlineKeyboardMarkup::new(rows)
}

pub fn times_text(instructor: &Instructor, selector: &TimeSelector) -> String {
    format!(
        "🕐 Horários com {}\n\n\
         Escolha um horário para cada data.\n\
         Data em edição: {}\n\
         Horários escolhidos: {} de {}",
        instructor.name,
        short_date(selector.active_date()),
        selector.selected().len(),
        selector.dates().len(),
    )
}

// ── Review ──

pub fn review_text(
    instructor: &Instructor,
    wallet: &WalletBalance,
    times: &[(String, String)],
    total: Centavos,
    path: PaymentPath,
) -> String {
    let mut text = format!("📋 Resumo do agendamento\n\n👨‍🏫 {}\n", instructor.name);
    for (date, time) in times {
        text.push_str(&format!("📅 {} às {}\n", short_date(date), time));
    }
    text.push_str(&format!("\n💰 Total: {}\n", format_brl(total)));
    match path {
        PaymentPath::Wallet => text.push_str(&format!(
            "💳 Pagamento: saldo da carteira ({} disponível)",
            format_brl(wallet.available_centavos()),
        )),
        PaymentPath::Gateway => text.push_str(&format!(
            "💳 Pagamento: cartão ou PIX (saldo disponível: {})",
            format_brl(wallet.available_centavos()),
        )),
    }
    text
}

pub fn review_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "✅ Confirmar agendamento",
            "book:ok".to_string(),
        )],
        vec![InlineKeyboardButton::callback(
            "✖ Cancelar",
            "flow:cancel".to_string(),
        )],
    ])
}

// ── Checkout ──

pub fn checkout_keyboard(url: url::Url) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::web_app(
            "💳 Pagar agora",
            WebAppInfo { url },
        )],
        vec![InlineKeyboardButton::callback(
            "✖ Cancelar",
            "flow:cancel".to_string(),
        )],
    ])
}

// ── Lessons list ──

pub fn lessons_text(lessons: &[Lesson]) -> String {
    if lessons.is_empty() {
        return "Você ainda não tem aulas agendadas 🚗".to_string();
    }
    let mut text = "📋 Suas aulas:\n\n".to_string();
    for lesson in lessons {
        let who = lesson
            .instructor_name
            .as_deref()
            .map(|n| format!(" ({n})"))
            .unwrap_or_default();
        text.push_str(&format!(
            "📅 {} às {} — {}{}\n",
            short_date(&lesson.date),
            lesson.time,
            status_label(lesson.status),
            who,
        ));
    }
    text
}

/// One reschedule button per lesson still inside the adjustment window.
pub fn lessons_keyboard(
    lessons: &[Lesson],
    now: chrono::NaiveDateTime,
) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = lessons
        .iter()
        .filter(|l| autoaula_core::adjust::adjustment_offerable(l, now))
        .map(|l| {
            vec![InlineKeyboardButton::callback(
                format!("🔁 Remarcar {} {}", short_date(&l.date), l.time),
                format!("adjust:{}", l.id),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

// ── Adjustment ──

pub fn adjust_keyboard(
    calendar: &DateSelector,
    draft: &AdjustmentDraft,
) -> InlineKeyboardMarkup {
    let mut rows = calendar_rows(calendar, "acal", "aday", |day| {
        draft.proposed_date.as_deref() == Some(calendar.date_for(day).as_str())
    });

    let slots: Vec<InlineKeyboardButton> = TIME_SLOTS
        .iter()
        .map(|time| {
            let label = if draft.proposed_time.as_deref() == Some(*time) {
                format!("✅{time}")
            } else {
                (*time).to_string()
            };
            InlineKeyboardButton::callback(label, format!("aslot:{time}"))
        })
        .collect();
    rows.extend(slots.chunks(4).map(|chunk| chunk.to_vec()));

    rows.push(vec![InlineKeyboardButton::callback(
        "✅ Propor novo horário",
        "adjust:ok".to_string(),
    )]);
    rows.push(vec![InlineKeyboardButton::callback(
        "✖ Cancelar",
        "flow:cancel".to_string(),
    )]);
    InlineKeyboardMarkup::new(rows)
}

pub fn adjust_text(draft: &AdjustmentDraft) -> String {
    format!(
        "🔁 Remarcar aula\n\n\
         Nova data: {}\n\
         Novo horário: {}\n\n\
         A proposta será enviada ao instrutor para aprovação.",
        draft
            .proposed_date
            .as_deref()
            .map(short_date)
            .unwrap_or_else(|| "—".into()),
        draft.proposed_time.as_deref().unwrap_or("—"),
    )
}

// ── Tests ──
