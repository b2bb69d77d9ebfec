use chrono::{Datelike, Months, NaiveDate};

/// Whole calendar months from `start_date` to `as_of`.
///
/// A month counts once `start_date` advanced by that many months (clamped to
/// month end, so Jan 31 + 1 month is the last day of February) is on or
/// before `as_of`. A start date in the future yields 0.
///
/// This deliberately differs from flooring on day-of-month: Jan 31 to Feb 29
/// counts as one month here, where a day-based diff reports 0 months 29 days.
pub fn months_elapsed(start_date: NaiveDate, as_of: NaiveDate) -> u32 {
    if start_date >= as_of {
        return 0;
    }

    let mut months = (as_of.year() - start_date.year()) * 12 + as_of.month() as i32
        - start_date.month() as i32;

    // The calendar difference overshoots by one when as_of's day-of-month
    // has not yet reached the anniversary.
    while months > 0 {
        match start_date.checked_add_months(Months::new(months as u32)) {
            Some(anniversary) if anniversary <= as_of => break,
            _ => months -= 1,
        }
    }

    months.max(0) as u32
}
