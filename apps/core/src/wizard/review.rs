use thiserror::Error;

use crate::api::ApiClient;
use crate::models::{
    reais, Centavos, Instructor, LessonSlot, LessonStatus, PaymentMethod, PaymentPath,
    ScheduleRequest, WalletBalance,
};
use crate::wizard::{BookingDraft, LESSON_DURATION_MIN};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Booking cannot proceed without a known price; there is no default.
    #[error("Instrutor sem valor de hora cadastrado — não é possível agendar")]
    MissingHourlyRate,
}

/// Data the review screen needs before it can render.
#[derive(Debug, Clone)]
pub struct ReviewContext {
    pub instructor: Instructor,
    pub wallet: WalletBalance,
}

/// What submission resolved to.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Wallet path: booked, awaiting instructor approval.
    Booked,
    /// Gateway path: a pending booking exists; the checkout surface takes
    /// over with this payload.
    CheckoutRequired(CheckoutHandoff),
}

/// Parameters carried into the embedded checkout surface.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutHandoff {
    pub amount: Centavos,
    /// The created lesson ids, joined with `,`.
    pub external_reference: String,
    pub summary_title: String,
    pub summary_subtitle: String,
}

/// Fetch wallet balance and instructor data concurrently at screen entry.
/// All-or-nothing: either failure aborts rendering with one error. The
/// balance is fetched fresh here every time — no cross-screen cache.
pub async fn load_review_context(
    api: &ApiClient,
    instructor_id: &str,
) -> anyhow::Result<ReviewContext> {
    let (wallet, instructors) = tokio::join!(api.wallet_balance(), api.approved_instructors());
    let wallet = wallet?;
    let instructor = instructors?
        .into_iter()
        .find(|i| i.id == instructor_id)
        .ok_or_else(|| anyhow::anyhow!("instrutor {instructor_id} não está mais disponível"))?;
    Ok(ReviewContext { instructor, wallet })
}

/// The authoritative total: one hourly rate per selected (date, time) pair.
pub fn total_amount(
    lesson_count: usize,
    hourly_rate: Option<Centavos>,
) -> Result<Centavos, PricingError> {
    let rate = hourly_rate.ok_or(PricingError::MissingHourlyRate)?;
    Ok(lesson_count as Centavos * rate)
}

/// Wallet credit covers the total (equal balance qualifies) or the
/// gateway takes over.
pub fn decide_path(available: Centavos, total: Centavos) -> PaymentPath {
    if available >= total {
        PaymentPath::Wallet
    } else {
        PaymentPath::Gateway
    }
}

/// Shape the schedule-request body for the chosen path.
fn schedule_request(
    student_id: &str,
    draft: &BookingDraft,
    rate: Centavos,
    total: Centavos,
    path: PaymentPath,
) -> ScheduleRequest {
    let lessons = draft
        .selected_times
        .iter()
        .map(|(date, time)| LessonSlot {
            date: date.clone(),
            time: time.clone(),
            duration: LESSON_DURATION_MIN,
            price: reais(rate),
        })
        .collect();

    let (status, payment_method) = match path {
        PaymentPath::Wallet => (LessonStatus::WaitingApproval, Some(PaymentMethod::Wallet)),
        PaymentPath::Gateway => (LessonStatus::PendingPayment, None),
    };

    ScheduleRequest {
        student_id: student_id.to_string(),
        instructor_id: draft.instructor_id.clone(),
        lessons,
        total_amount: reais(total),
        status,
        payment_method,
    }
}

/// Compute the total, decide the path, and submit. On API failure the
/// draft is untouched and the caller may retry the identical submission.
pub async fn submit(
    api: &ApiClient,
    student_id: &str,
    draft: &BookingDraft,
    ctx: &ReviewContext,
) -> anyhow::Result<SubmitOutcome> {
    let rate = ctx
        .instructor
        .hourly_rate_centavos()
        .ok_or(PricingError::MissingHourlyRate)?;
    let total = total_amount(draft.selected_times.len(), Some(rate))?;
    let path = decide_path(ctx.wallet.available_centavos(), total);
    let request = schedule_request(student_id, draft, rate, total, path);

    match path {
        PaymentPath::Wallet => {
            api.create_schedule(&request).await?;
            tracing::info!(
                student_id,
                lessons = draft.selected_times.len(),
                "agendamento criado via carteira"
            );
            Ok(SubmitOutcome::Booked)
        }
        PaymentPath::Gateway => {
            let created = api.create_schedule(&request).await?;
            tracing::info!(
                student_id,
                lessons = created.lesson_ids.len(),
                "agendamento pendente criado, abrindo checkout"
            );
            Ok(SubmitOutcome::CheckoutRequired(CheckoutHandoff {
                amount: total,
                external_reference: created.lesson_ids.join(","),
                summary_title: "Aulas de direção".into(),
                summary_subtitle: format!(
                    "{} aula(s) com {}",
                    draft.selected_times.len(),
                    ctx.instructor.name
                ),
            }))
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with(times: &[(&str, &str)]) -> BookingDraft {
        let mut draft = BookingDraft::new("ins-1");
        for (d, t) in times {
            draft.selected_dates.push((*d).to_string());
            draft.selected_times.push(((*d).to_string(), (*t).to_string()));
        }
        draft
    }

    // ── total_amount ──

    #[test]
    fn test_total_two_lessons_at_80() {
        assert_eq!(total_amount(2, Some(8000)).unwrap(), 16000);
    }

    #[test]
    fn test_total_missing_rate_is_fatal() {
        assert_eq!(total_amount(2, None), Err(PricingError::MissingHourlyRate));
    }

    #[test]
    fn test_total_zero_lessons() {
        assert_eq!(total_amount(0, Some(8000)).unwrap(), 0);
    }

    // ── decide_path ──

    #[test]
    fn test_equal_balance_takes_wallet_path() {
        assert_eq!(decide_path(10000, 10000), PaymentPath::Wallet);
    }

    #[test]
    fn test_one_centavo_short_takes_gateway_path() {
        assert_eq!(decide_path(9999, 10000), PaymentPath::Gateway);
    }

    #[test]
    fn test_surplus_takes_wallet_path() {
        assert_eq!(decide_path(20000, 16000), PaymentPath::Wallet);
    }

    // ── schedule_request ──

    #[test]
    fn test_wallet_request_shape() {
        let draft = draft_with(&[("2026-09-20", "08:00"), ("2026-09-21", "14:00")]);
        let req = schedule_request("stu-1", &draft, 8000, 16000, PaymentPath::Wallet);

        assert_eq!(req.status, LessonStatus::WaitingApproval);
        assert_eq!(req.payment_method, Some(PaymentMethod::Wallet));
        assert_eq!(req.total_amount, 160.0);
        assert_eq!(req.lessons.len(), 2);
        assert_eq!(req.lessons[0].duration, 50);
        assert_eq!(req.lessons[0].price, 80.0);
    }

    #[test]
    fn test_gateway_request_shape() {
        let draft = draft_with(&[("2026-09-20", "08:00"), ("2026-09-21", "14:00")]);
        let req = schedule_request("stu-1", &draft, 8000, 16000, PaymentPath::Gateway);

        assert_eq!(req.status, LessonStatus::PendingPayment);
        assert_eq!(req.payment_method, None);
    }

    #[test]
    fn test_end_to_end_path_decision_wallet() {
        // Student with 0 prior lessons, 2 dates × R$80 = R$160, balance R$200.
        let total = total_amount(2, Some(8000)).unwrap();
        assert_eq!(total, 16000);
        assert_eq!(decide_path(20000, total), PaymentPath::Wallet);
    }

    #[test]
    fn test_end_to_end_path_decision_gateway() {
        // Same booking, balance R$50 → gateway.
        let total = total_amount(2, Some(8000)).unwrap();
        assert_eq!(decide_path(5000, total), PaymentPath::Gateway);
    }
}
