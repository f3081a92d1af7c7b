//! Schedule arithmetic for recurring definitions.
//!
//! Pure calendar math: stepping a date forward by one period and projecting
//! the next occurrence of a schedule on or after a reference date. Nothing in
//! this module touches the database or a clock; callers supply the reference
//! date, which keeps every function deterministic and directly testable.

use crate::errors::{Error, Result};
use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How often a recurring definition fires.
///
/// This is the single authoritative frequency set, exposed end to end. The
/// stored column is a plain string; parsing happens at the core boundary so
/// a corrupted row surfaces as [`Error::UnsupportedFrequency`] instead of a
/// silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every day
    Daily,
    /// Every 7 days
    Weekly,
    /// Every calendar month, clamped to the last valid day
    Monthly,
    /// Every calendar year (12 calendar months)
    Yearly,
}

impl Frequency {
    /// All supported frequencies, in step-size order.
    pub const ALL: [Self; 4] = [Self::Daily, Self::Weekly, Self::Monthly, Self::Yearly];

    /// The canonical string form, matching the stored column values.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Converts an amount charged at this frequency into its monthly
    /// equivalent, rounded to two decimal places per definition:
    /// daily ×365/12, weekly ×52/12, monthly unchanged, yearly ÷12.
    ///
    /// This is how mixed-frequency definitions are combined into one
    /// additive monthly total instead of summing daily and yearly amounts
    /// as if they were the same unit.
    #[must_use]
    pub fn monthly_equivalent(self, amount: Decimal) -> Decimal {
        let per_year = match self {
            Self::Daily => Decimal::from(365),
            Self::Weekly => Decimal::from(52),
            Self::Monthly => return amount,
            Self::Yearly => Decimal::ONE,
        };
        (amount * per_year / Decimal::from(12)).round_dp(2)
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(Error::UnsupportedFrequency {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advances a date by exactly one period of the given frequency.
///
/// Month and year steps follow chrono's [`Months`] arithmetic, which clamps
/// to the last valid day of the target month: Jan 31 + 1 month = Feb 28 (or
/// Feb 29 in a leap year), Feb 29 + 1 year = Feb 28. The result is always
/// strictly after the input.
#[must_use]
pub fn advance(date: NaiveDate, frequency: Frequency) -> NaiveDate {
    let stepped = match frequency {
        Frequency::Daily => date.checked_add_days(Days::new(1)),
        Frequency::Weekly => date.checked_add_days(Days::new(7)),
        Frequency::Monthly => date.checked_add_months(Months::new(1)),
        Frequency::Yearly => date.checked_add_months(Months::new(12)),
    };
    // Overflow is only possible at chrono's far-future bound (year 262142);
    // saturate rather than panic so the function stays total.
    stepped.unwrap_or(NaiveDate::MAX)
}

/// Computes the earliest occurrence of a schedule on or after `reference`.
///
/// The occurrence set is `anchor + k·step(frequency)` for k ≥ 0:
/// - an anchor on or after `reference` is returned unchanged (due today, or
///   the schedule has not started yet);
/// - daily and weekly schedules are resolved in closed form, so an anchor
///   years in the past costs no iteration;
/// - monthly and yearly schedules step iteratively, because month-end
///   clamping defeats closed-form division (each step is at least 28 days,
///   so the loop is tightly bounded);
/// - `None` when the computed occurrence falls after `end_date`.
#[must_use]
pub fn next_occurrence(
    anchor: NaiveDate,
    frequency: Frequency,
    reference: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Option<NaiveDate> {
    let next = if anchor >= reference {
        anchor
    } else {
        match frequency {
            Frequency::Daily => reference,
            Frequency::Weekly => {
                let gap = (reference - anchor).num_days();
                let steps = (gap + 6).div_euclid(7);
                add_days(anchor, steps * 7)
            }
            Frequency::Monthly | Frequency::Yearly => {
                let mut candidate = anchor;
                while candidate < reference {
                    candidate = advance(candidate, frequency);
                }
                candidate
            }
        }
    };

    match end_date {
        Some(end) if next > end => None,
        _ => Some(next),
    }
}

fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    u64::try_from(days)
        .ok()
        .and_then(|d| date.checked_add_days(Days::new(d)))
        .unwrap_or(NaiveDate::MAX)
}
