//! Due-date arithmetic for monthly installments.
//!
//! A due day past the end of a month (e.g. 31 in April) falls on that
//! month's last day.

use chrono::{Datelike, Months, NaiveDate};

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = first.checked_add_months(Months::new(1))?;
    Some(next_first.pred_opt()?.day())
}

/// The `due_day` of the given month, clamped to the month's length
fn due_date_in_month(year: i32, month: u32, due_day: u32) -> Option<NaiveDate> {
    if due_day == 0 {
        return None;
    }
    let day = due_day.min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Next installment date relative to `reference`.
///
/// Takes `due_day` in the reference month; if that is strictly before the
/// reference date, moves to the following month. Used both at activation
/// (reference = start date) and after each repayment (reference = payment
/// date). Returns `None` for a due day outside 1-31.
pub fn next_payment_date(reference: NaiveDate, due_day: u32) -> Option<NaiveDate> {
    if due_day > 31 {
        return None;
    }
    let candidate = due_date_in_month(reference.year(), reference.month(), due_day)?;
    if candidate < reference {
        let next_month = reference.with_day(1)?.checked_add_months(Months::new(1))?;
        due_date_in_month(next_month.year(), next_month.month(), due_day)
    } else {
        Some(candidate)
    }
}

/// `date` moved forward by `months`, landing on `due_day` (clamped)
pub fn add_months_clamped(date: NaiveDate, months: u32, due_day: u32) -> Option<NaiveDate> {
    let target = date.with_day(1)?.checked_add_months(Months::new(months))?;
    due_date_in_month(target.year(), target.month(), due_day)
}
