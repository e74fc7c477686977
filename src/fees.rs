use log::{debug, info};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::directory::Directory;
use crate::error::{required, DashboardError, DashboardResult};
use crate::models::{
    next_id, parse_amount, parse_date, FeeStatus, MentorId, Payment, PaymentStatus, StudentId,
};
use crate::seed;

pub const DEFAULT_PAYMENT_METHOD: &str = "Online Transfer";

/// Fee discount earned by a CGPA-style score.
///
/// NaN and negative scores earn nothing; the tiers are the only values ever
/// returned, so the rate is monotone in the score.
pub fn discount_rate(score: f64) -> Decimal {
    if score.is_nan() || score < 5.0 {
        Decimal::ZERO
    } else if score >= 8.0 {
        Decimal::new(25, 2)
    } else if score >= 7.0 {
        Decimal::new(15, 2)
    } else if score >= 6.0 {
        Decimal::new(10, 2)
    } else {
        Decimal::new(5, 2)
    }
}

/// Formats an amount as rupees with thousands separators, e.g. `₹42,500`.
pub fn rupees(amount: Decimal) -> String {
    let amount = amount.round_dp(2).normalize();
    let text = amount.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole.to_string(), Some(fraction.to_string())),
        None => (text, None),
    };

    let mut grouped = String::new();
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(&fraction);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{sign}₹{grouped}")
}

pub fn discount_percent(score: f64) -> Decimal {
    (discount_rate(score) * Decimal::ONE_HUNDRED).normalize()
}

pub fn final_fee(base_fee: Decimal, score: f64) -> Decimal {
    base_fee.max(Decimal::ZERO) * (Decimal::ONE - discount_rate(score))
}

/// Buckets a fee record by what is still owed on it.
pub fn payment_status(final_fee: Decimal, paid: Decimal) -> FeeStatus {
    let final_fee = final_fee.max(Decimal::ZERO);
    let remaining = final_fee - paid.max(Decimal::ZERO);

    if remaining <= Decimal::ZERO {
        FeeStatus::Paid
    } else if remaining <= final_fee / Decimal::TWO {
        FeeStatus::PartiallyPaid
    } else {
        FeeStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiscountTier {
    pub label: &'static str,
    pub min_score: f64,
    pub rate: Decimal,
}

pub fn discount_tiers() -> Vec<DiscountTier> {
    [("CGPA 8.0 and above", 8.0), ("CGPA 7.0 - 7.9", 7.0), ("CGPA 6.0 - 6.9", 6.0), ("CGPA 5.0 - 5.9", 5.0)]
        .into_iter()
        .map(|(label, min_score)| DiscountTier {
            label,
            min_score,
            rate: discount_rate(min_score),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeBreakdown {
    pub base_fee: Decimal,
    pub score: f64,
    pub discount_rate: Decimal,
    pub discount_amount: Decimal,
    pub final_fee: Decimal,
}

impl FeeBreakdown {
    pub fn for_score(base_fee: Decimal, score: f64) -> Self {
        let final_fee = final_fee(base_fee, score);
        Self {
            base_fee,
            score,
            discount_rate: discount_rate(score),
            discount_amount: base_fee - final_fee,
            final_fee,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaymentForm {
    pub amount: String,
    pub date: String,
    pub method: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeSummary {
    pub breakdown: FeeBreakdown,
    pub paid: Decimal,
    pub remaining: Decimal,
    pub status: FeeStatus,
}

/// A student's fee record: discount derived from the score at read time,
/// paid amount derived from the completed payments.
#[derive(Debug, Clone)]
pub struct FeeLedger {
    base_fee: Decimal,
    score: f64,
    payments: Vec<Payment>,
}

impl FeeLedger {
    pub fn new(base_fee: Decimal, score: f64, payments: Vec<Payment>) -> Self {
        Self {
            base_fee,
            score,
            payments,
        }
    }

    pub fn seeded(directory: &Directory, student: &StudentId, base_fee: Decimal) -> anyhow::Result<Self> {
        let score = directory
            .student(student)
            .map(|s| s.cgpa)
            .unwrap_or(seed::FALLBACK_SCORE);
        Ok(Self::new(base_fee, score, seed::payments()?))
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn breakdown(&self) -> FeeBreakdown {
        FeeBreakdown::for_score(self.base_fee, self.score)
    }

    pub fn final_fee(&self) -> Decimal {
        final_fee(self.base_fee, self.score)
    }

    pub fn paid(&self) -> Decimal {
        self.payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
            .map(|p| p.amount)
            .sum()
    }

    pub fn remaining(&self) -> Decimal {
        self.final_fee() - self.paid()
    }

    pub fn status(&self) -> FeeStatus {
        payment_status(self.final_fee(), self.paid())
    }

    pub fn summary(&self) -> FeeSummary {
        FeeSummary {
            breakdown: self.breakdown(),
            paid: self.paid(),
            remaining: self.remaining(),
            status: self.status(),
        }
    }

    pub fn add_payment(&mut self, form: &PaymentForm) -> DashboardResult<&Payment> {
        let amount = parse_amount("amount", required("amount", &form.amount)?)?;
        let date = parse_date("date", required("date", &form.date)?)?;
        let method = match form.method.trim() {
            "" => DEFAULT_PAYMENT_METHOD.to_string(),
            method => method.to_string(),
        };
        let status = match form.status.trim() {
            "" => PaymentStatus::Pending,
            status => status.parse()?,
        };

        let payment = Payment {
            id: next_id(self.payments.iter().map(|p| p.id)),
            amount,
            date,
            method,
            status,
        };
        info!("payment {} of {} added as {}", payment.id, payment.amount, payment.status);
        self.payments.push(payment);
        Ok(&self.payments[self.payments.len() - 1])
    }

    pub fn remove_payment(&mut self, id: u32) -> DashboardResult<Payment> {
        let index = self
            .payments
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DashboardError::not_found("payment", id))?;
        debug!("payment {id} removed");
        Ok(self.payments.remove(index))
    }

    /// Any status may follow any other; there is no transition guard.
    pub fn set_payment_status(&mut self, id: u32, status: PaymentStatus) -> DashboardResult<()> {
        let payment = self
            .payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DashboardError::not_found("payment", id))?;
        debug!("payment {id} {} -> {status}", payment.status);
        payment.status = status;
        Ok(())
    }

    pub fn complete_payment(&mut self, id: u32) -> DashboardResult<()> {
        self.set_payment_status(id, PaymentStatus::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OversightRow {
    pub student_id: StudentId,
    pub name: String,
    pub cgpa: f64,
    pub base_fee: Decimal,
    pub paid: Decimal,
}

impl OversightRow {
    pub fn final_fee(&self) -> Decimal {
        final_fee(self.base_fee, self.cgpa)
    }

    pub fn remaining(&self) -> Decimal {
        self.final_fee() - self.paid
    }

    pub fn status(&self) -> FeeStatus {
        payment_status(self.final_fee(), self.paid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OversightTotals {
    pub total_fees: Decimal,
    pub total_paid: Decimal,
    pub total_remaining: Decimal,
    pub paid_count: usize,
    pub partial_count: usize,
    pub pending_count: usize,
}

/// Mentor-side view of every mentee's fee record.
#[derive(Debug, Clone)]
pub struct FeeOversight {
    rows: Vec<OversightRow>,
}

impl FeeOversight {
    pub fn new(rows: Vec<OversightRow>) -> Self {
        Self { rows }
    }

    pub fn for_mentor(directory: &Directory, mentor: &MentorId) -> Self {
        let accounts = seed::fee_accounts();
        let rows = directory
            .mentees_of(mentor)
            .into_iter()
            .map(|student| {
                let (base_fee, paid) = accounts
                    .iter()
                    .find(|(id, _, _)| *id == student.id)
                    .map(|(_, base, paid)| (*base, *paid))
                    .unwrap_or((Decimal::from(seed::DEFAULT_BASE_FEE), Decimal::ZERO));
                OversightRow {
                    student_id: student.id.clone(),
                    name: student.name.clone(),
                    cgpa: student.cgpa,
                    base_fee,
                    paid,
                }
            })
            .collect();
        Self::new(rows)
    }

    pub fn rows(&self) -> &[OversightRow] {
        &self.rows
    }

    pub fn totals(&self) -> OversightTotals {
        let count = |status: FeeStatus| self.rows.iter().filter(|r| r.status() == status).count();
        let total_fees: Decimal = self.rows.iter().map(OversightRow::final_fee).sum();
        let total_paid: Decimal = self.rows.iter().map(|r| r.paid).sum();

        OversightTotals {
            total_fees,
            total_paid,
            total_remaining: total_fees - total_paid,
            paid_count: count(FeeStatus::Paid),
            partial_count: count(FeeStatus::PartiallyPaid),
            pending_count: count(FeeStatus::Pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ledger() -> FeeLedger {
        FeeLedger::new(Decimal::from(50_000), 7.5894, seed::payments().expect("seed payments"))
    }

    #[test]
    fn rates_follow_expected_tiers() {
        assert_eq!(discount_rate(9.1), Decimal::new(25, 2));
        assert_eq!(discount_rate(8.0), Decimal::new(25, 2));
        assert_eq!(discount_rate(7.9999), Decimal::new(15, 2));
        assert_eq!(discount_rate(6.0), Decimal::new(10, 2));
        assert_eq!(discount_rate(5.1519), Decimal::new(5, 2));
        assert_eq!(discount_rate(4.1262), Decimal::ZERO);
    }

    #[test]
    fn degenerate_scores_earn_nothing() {
        assert_eq!(discount_rate(f64::NAN), Decimal::ZERO);
        assert_eq!(discount_rate(-3.0), Decimal::ZERO);
        assert_eq!(discount_rate(f64::NEG_INFINITY), Decimal::ZERO);
        assert_eq!(discount_rate(f64::INFINITY), Decimal::new(25, 2));
    }

    #[test]
    fn rate_is_monotone_and_tiered() {
        let allowed = [
            Decimal::ZERO,
            Decimal::new(5, 2),
            Decimal::new(10, 2),
            Decimal::new(15, 2),
            Decimal::new(25, 2),
        ];
        let mut previous = Decimal::ZERO;
        for step in -100..=1100 {
            let rate = discount_rate(step as f64 / 100.0);
            assert!(allowed.contains(&rate), "unexpected rate {rate}");
            assert!(rate >= previous, "rate fell at score {}", step as f64 / 100.0);
            previous = rate;
        }
    }

    #[test]
    fn final_fee_applies_discount_exactly() {
        assert_eq!(final_fee(Decimal::from(50_000), 7.5894), Decimal::from(42_500));
        assert_eq!(discount_percent(7.5894), Decimal::from(15));
    }

    #[test]
    fn tier_percentages_match_their_rates() {
        let percents: Vec<_> = discount_tiers()
            .iter()
            .map(|tier| {
                assert_eq!(tier.rate * Decimal::ONE_HUNDRED, discount_percent(tier.min_score));
                discount_percent(tier.min_score)
            })
            .collect();
        assert_eq!(percents, vec![Decimal::from(25), Decimal::from(15), Decimal::from(10), Decimal::from(5)]);
    }

    #[test]
    fn rupees_group_thousands() {
        assert_eq!(rupees(Decimal::from(42_500)), "₹42,500");
        assert_eq!(rupees(Decimal::from(500)), "₹500");
        assert_eq!(rupees(Decimal::new(1_234_567_50, 2)), "₹1,234,567.5");
        assert_eq!(rupees(Decimal::from(-7_500)), "-₹7,500");
    }

    #[test]
    fn status_buckets_by_remaining_share() {
        let fee = Decimal::from(42_500);
        assert_eq!(payment_status(fee, Decimal::from(25_000)), FeeStatus::PartiallyPaid);
        assert_eq!(payment_status(fee, Decimal::from(21_250)), FeeStatus::PartiallyPaid);
        assert_eq!(payment_status(fee, Decimal::from(21_249)), FeeStatus::Pending);
        assert_eq!(payment_status(fee, Decimal::from(42_500)), FeeStatus::Paid);
        assert_eq!(payment_status(fee, Decimal::from(60_000)), FeeStatus::Paid);
        assert_eq!(payment_status(fee, Decimal::from(-10)), FeeStatus::Pending);
    }

    #[test]
    fn completing_a_payment_reduces_remaining_by_its_amount() {
        let mut ledger = ledger();
        let before = ledger.remaining();
        let id = ledger
            .add_payment(&PaymentForm {
                amount: "5000".to_string(),
                date: "2025-11-01".to_string(),
                ..PaymentForm::default()
            })
            .expect("add payment")
            .id;
        assert_eq!(ledger.remaining(), before);

        ledger.complete_payment(id).expect("complete");
        assert_eq!(before - ledger.remaining(), Decimal::from(5_000));
    }

    #[test]
    fn new_payments_default_method_and_status() {
        let mut ledger = ledger();
        let payment = ledger
            .add_payment(&PaymentForm {
                amount: "1200".to_string(),
                date: "2025-11-02".to_string(),
                ..PaymentForm::default()
            })
            .expect("add payment");
        assert_eq!(payment.id, 3);
        assert_eq!(payment.method, DEFAULT_PAYMENT_METHOD);
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.date, NaiveDate::from_ymd_opt(2025, 11, 2).expect("date"));
    }

    #[test]
    fn payment_form_requires_amount_and_date() {
        let mut ledger = ledger();
        let err = ledger
            .add_payment(&PaymentForm {
                date: "2025-11-02".to_string(),
                ..PaymentForm::default()
            })
            .expect_err("missing amount");
        assert_eq!(err, DashboardError::MissingField("amount"));
        assert_eq!(ledger.payments().len(), 2);
    }

    #[test]
    fn seeded_ledger_is_partially_paid() {
        let summary = ledger().summary();
        assert_eq!(summary.paid, Decimal::from(25_000));
        assert_eq!(summary.remaining, Decimal::from(17_500));
        assert_eq!(summary.status, FeeStatus::PartiallyPaid);
    }

    #[test]
    fn unknown_payment_ids_are_reported() {
        let mut ledger = ledger();
        assert!(matches!(ledger.remove_payment(42), Err(DashboardError::NotFound { .. })));
        assert!(ledger.set_payment_status(1, PaymentStatus::Overdue).is_ok());
        assert_eq!(ledger.paid(), Decimal::ZERO);
    }

    #[test]
    fn oversight_totals_match_rows() {
        let directory = Directory::seeded();
        let oversight = FeeOversight::for_mentor(&directory, &MentorId::new("M001"));
        let totals = oversight.totals();
        // Ahmed: 47500 paid in full by 50000; Aisha: 42500 with 25000 paid.
        assert_eq!(totals.total_fees, Decimal::from(90_000));
        assert_eq!(totals.total_paid, Decimal::from(75_000));
        assert_eq!(totals.total_remaining, Decimal::from(15_000));
        assert_eq!((totals.paid_count, totals.partial_count, totals.pending_count), (1, 1, 0));
    }
}
