//! Fixed-installment amortization.
//!
//! All arithmetic is `Decimal` at full precision and nothing is rounded in
//! the returned values: stored loan fields keep the exact figures so that
//! repeated repayments do not accumulate rounding error. Use
//! [`AmortizationSchedule::rounded`] for display.

use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::error::{LendingError, LendingResult};
use crate::service::payment_calendar::{add_months_clamped, next_payment_date};

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);
const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub monthly_payment: Decimal,
    pub total_repayment: Decimal,
    pub total_interest: Decimal,
}

impl AmortizationSchedule {
    /// Copy rounded to `dp` decimal places, for presentation only
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            monthly_payment: self.monthly_payment.round_dp(dp),
            total_repayment: self.total_repayment.round_dp(dp),
            total_interest: self.total_interest.round_dp(dp),
        }
    }
}

/// One row of an installment plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub number: u32,
    pub due_date: NaiveDate,
    pub payment: Decimal,
    pub principal: Decimal,
    pub interest: Decimal,
    pub balance_after: Decimal,
}

fn overflow() -> LendingError {
    LendingError::InvalidLoanTerms("loan terms overflow decimal arithmetic".to_string())
}

fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / ONE_HUNDRED / MONTHS_PER_YEAR
}

/// Compute the fixed monthly payment and totals for a loan.
///
/// `monthly_payment = P * r * (1 + r)^n / ((1 + r)^n - 1)` with
/// `r = rate / 100 / 12`, or `P / n` when the rate is zero.
pub fn compute_schedule(
    principal: Decimal,
    annual_rate_percent: Decimal,
    months: u32,
) -> LendingResult<AmortizationSchedule> {
    if principal <= Decimal::ZERO {
        return Err(LendingError::InvalidLoanTerms(format!(
            "principal must be positive, got {principal}"
        )));
    }
    if months == 0 {
        return Err(LendingError::InvalidLoanTerms(
            "duration must be at least one month".to_string(),
        ));
    }
    if annual_rate_percent.is_sign_negative() && !annual_rate_percent.is_zero() {
        return Err(LendingError::InvalidLoanTerms(format!(
            "interest rate must not be negative, got {annual_rate_percent}"
        )));
    }

    let n = Decimal::from(months);
    let rate = monthly_rate(annual_rate_percent);

    let monthly_payment = if rate > Decimal::ZERO {
        let growth = (Decimal::ONE + rate)
            .checked_powi(i64::from(months))
            .ok_or_else(overflow)?;
        principal
            .checked_mul(rate)
            .and_then(|v| v.checked_mul(growth))
            .and_then(|v| v.checked_div(growth - Decimal::ONE))
            .ok_or_else(overflow)?
    } else {
        principal.checked_div(n).ok_or_else(overflow)?
    };

    let total_repayment = monthly_payment.checked_mul(n).ok_or_else(overflow)?;
    let total_interest = total_repayment - principal;

    Ok(AmortizationSchedule {
        monthly_payment,
        total_repayment,
        total_interest,
    })
}

/// Break a schedule into installments with their principal/interest split.
///
/// The first installment falls due on the first due day on or after
/// `start`, later ones on the same day in each following month. The last
/// installment absorbs the residual so the payments sum to
/// `schedule.total_repayment` and the final balance is zero.
pub fn installment_plan(
    principal: Decimal,
    annual_rate_percent: Decimal,
    months: u32,
    start: NaiveDate,
    due_day: u32,
) -> LendingResult<Vec<Installment>> {
    let schedule = compute_schedule(principal, annual_rate_percent, months)?;
    let rate = monthly_rate(annual_rate_percent);
    let first_due = next_payment_date(start, due_day).ok_or_else(|| {
        LendingError::InvalidLoanTerms(format!("payment due day {due_day} is out of range"))
    })?;

    let mut plan = Vec::with_capacity(months as usize);
    let mut balance = principal;
    let mut paid = Decimal::ZERO;

    for number in 1..=months {
        let due_date = add_months_clamped(first_due, number - 1, due_day).ok_or_else(overflow)?;
        let interest = balance.checked_mul(rate).ok_or_else(overflow)?;
        let payment = if number == months {
            schedule.total_repayment - paid
        } else {
            schedule.monthly_payment
        };
        let principal_share = if number == months {
            balance
        } else {
            payment - interest
        };
        let interest_share = payment - principal_share;
        balance -= principal_share;
        paid += payment;

        plan.push(Installment {
            number,
            due_date,
            payment,
            principal: principal_share,
            interest: interest_share,
            balance_after: balance,
        });
    }

    Ok(plan)
}
