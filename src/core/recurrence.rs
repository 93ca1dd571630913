use crate::core::error::ValidationError;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often a cash-flow entry repeats.
///
/// Every occurrence is computed directly from the entry's start date
/// (`start + k * step`), never by chaining from the previous occurrence.
/// The dates produced for a window therefore do not depend on which windows
/// were evaluated before it. Month-based steps clamp to the last day of
/// shorter months, so an entry starting on Jan 31 fires on Feb 28/29.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Weekly,
    Biweekly,
    /// Twice a month: on the start day and fifteen days apart from it.
    Semimonthly,
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
    OneTime,
    /// Every `n` days from the start date.
    CustomDays(u32),
}

impl Recurrence {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Recurrence::CustomDays(0) => Err(ValidationError::ZeroCustomInterval),
            _ => Ok(()),
        }
    }

    fn day_step(&self) -> Option<u64> {
        match self {
            Recurrence::Weekly => Some(7),
            Recurrence::Biweekly => Some(14),
            Recurrence::CustomDays(n) => Some(u64::from(*n)),
            _ => None,
        }
    }

    fn month_step(&self) -> Option<u32> {
        match self {
            Recurrence::Monthly => Some(1),
            Recurrence::Quarterly => Some(3),
            Recurrence::Semiannual => Some(6),
            Recurrence::Annual => Some(12),
            _ => None,
        }
    }

    /// Occurrence dates in `[from, until)` for a series anchored at `start`.
    ///
    /// Dates before `start` are never produced. The caller applies any end
    /// date.
    pub fn occurrences(&self, start: NaiveDate, from: NaiveDate, until: NaiveDate) -> Vec<NaiveDate> {
        if until <= from || until <= start {
            return Vec::new();
        }
        let window_start = from.max(start);

        if let Some(step) = self.day_step() {
            if step == 0 {
                return Vec::new();
            }
            let offset = (window_start - start).num_days() as u64;
            let mut k = offset.div_ceil(step);
            let mut dates = Vec::new();
            while let Some(date) = start.checked_add_days(Days::new(k * step)) {
                if date >= until {
                    break;
                }
                dates.push(date);
                k += 1;
            }
            return dates;
        }

        if let Some(step) = self.month_step() {
            return month_occurrences(start, window_start, until, step, start.day());
        }

        match self {
            Recurrence::OneTime => {
                if start >= window_start && start < until {
                    vec![start]
                } else {
                    Vec::new()
                }
            }
            Recurrence::Semimonthly => {
                let first_day = if start.day() > 15 {
                    start.day() - 15
                } else {
                    start.day()
                };
                let mut dates = month_occurrences(start, window_start, until, 1, first_day);
                dates.extend(month_occurrences(
                    start,
                    window_start,
                    until,
                    1,
                    first_day + 15,
                ));
                dates.retain(|d| *d >= start);
                dates.sort();
                dates.dedup();
                dates
            }
            _ => Vec::new(),
        }
    }
}

/// Dates on `day` (clamped to month length) every `step` months from the
/// month of `anchor`, within `[from, until)`.
fn month_occurrences(
    anchor: NaiveDate,
    from: NaiveDate,
    until: NaiveDate,
    step: u32,
    day: u32,
) -> Vec<NaiveDate> {
    let anchor_month = first_of_month(anchor);
    let months_to_window = months_between(anchor_month, first_of_month(from)).max(0) as u32;
    // Start one step early so a clamped date at a month edge is not skipped.
    let mut k = (months_to_window / step).saturating_sub(1);
    let mut dates = Vec::new();
    loop {
        let Some(month) = anchor_month.checked_add_months(Months::new(k * step)) else {
            break;
        };
        if month >= until {
            break;
        }
        let date = day_in_month(month, day);
        if date >= from && date < until {
            dates.push(date);
        }
        k += 1;
    }
    dates
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Whole calendar months from the month of `a` to the month of `b`.
pub fn months_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (i64::from(b.year()) - i64::from(a.year())) * 12 + i64::from(b.month()) - i64::from(a.month())
}

/// `day` of the month starting at `month_start`, clamped to the month's length.
pub fn day_in_month(month_start: NaiveDate, day: u32) -> NaiveDate {
    let mut d = day.max(1);
    loop {
        if let Some(date) = month_start.with_day(d) {
            return date;
        }
        if d <= 28 {
            return month_start;
        }
        d -= 1;
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::Weekly => write!(f, "weekly"),
            Recurrence::Biweekly => write!(f, "biweekly"),
            Recurrence::Semimonthly => write!(f, "semimonthly"),
            Recurrence::Monthly => write!(f, "monthly"),
            Recurrence::Quarterly => write!(f, "quarterly"),
            Recurrence::Semiannual => write!(f, "semiannual"),
            Recurrence::Annual => write!(f, "annual"),
            Recurrence::OneTime => write!(f, "one-time"),
            Recurrence::CustomDays(n) => write!(f, "every {} days", n),
        }
    }
}

impl FromStr for Recurrence {
    type Err = String;

    /// Parses the frequency labels used in budget sheets, e.g. `bi-weekly`,
    /// `semi-monthly`, `once`, or `every 10 days`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "weekly" => Ok(Recurrence::Weekly),
            "biweekly" => Ok(Recurrence::Biweekly),
            "semimonthly" | "twicemonthly" => Ok(Recurrence::Semimonthly),
            "monthly" => Ok(Recurrence::Monthly),
            "quarterly" => Ok(Recurrence::Quarterly),
            "semiannual" | "semiannually" => Ok(Recurrence::Semiannual),
            "annual" | "annually" | "yearly" => Ok(Recurrence::Annual),
            "onetime" | "once" => Ok(Recurrence::OneTime),
            other => other
                .strip_prefix("every")
                .and_then(|rest| rest.strip_suffix("days"))
                .and_then(|n| n.parse::<u32>().ok())
                .filter(|n| *n > 0)
                .map(Recurrence::CustomDays)
                .ok_or_else(|| format!("unknown recurrence '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_biweekly_in_month() {
        let start = date(2024, 1, 5);
        let jan = Recurrence::Biweekly.occurrences(start, date(2024, 1, 1), date(2024, 2, 1));
        assert_eq!(jan, vec![date(2024, 1, 5), date(2024, 1, 19)]);
        let mar = Recurrence::Biweekly.occurrences(start, date(2024, 3, 1), date(2024, 4, 1));
        assert_eq!(mar, vec![date(2024, 3, 1), date(2024, 3, 15), date(2024, 3, 29)]);
    }

    #[test]
    fn test_monthly_clamps_to_month_end() {
        let start = date(2024, 1, 31);
        let feb = Recurrence::Monthly.occurrences(start, date(2024, 2, 1), date(2024, 3, 1));
        assert_eq!(feb, vec![date(2024, 2, 29)]);
        let apr = Recurrence::Monthly.occurrences(start, date(2024, 4, 1), date(2024, 5, 1));
        assert_eq!(apr, vec![date(2024, 4, 30)]);
    }

    #[test]
    fn test_quarterly_skips_months() {
        let start = date(2024, 1, 10);
        let feb = Recurrence::Quarterly.occurrences(start, date(2024, 2, 1), date(2024, 3, 1));
        assert!(feb.is_empty());
        let apr = Recurrence::Quarterly.occurrences(start, date(2024, 4, 1), date(2024, 5, 1));
        assert_eq!(apr, vec![date(2024, 4, 10)]);
    }

    #[test]
    fn test_semimonthly() {
        let start = date(2024, 1, 1);
        let feb = Recurrence::Semimonthly.occurrences(start, date(2024, 2, 1), date(2024, 3, 1));
        assert_eq!(feb, vec![date(2024, 2, 1), date(2024, 2, 16)]);

        let late = date(2024, 1, 20);
        let jan = Recurrence::Semimonthly.occurrences(late, date(2024, 1, 1), date(2024, 2, 1));
        assert_eq!(jan, vec![date(2024, 1, 20)]);
    }

    #[test]
    fn test_one_time_and_before_start() {
        let start = date(2024, 6, 15);
        assert!(Recurrence::OneTime
            .occurrences(start, date(2024, 5, 1), date(2024, 6, 1))
            .is_empty());
        assert_eq!(
            Recurrence::OneTime.occurrences(start, date(2024, 6, 1), date(2024, 7, 1)),
            vec![start]
        );
        assert!(Recurrence::Monthly
            .occurrences(start, date(2024, 1, 1), date(2024, 2, 1))
            .is_empty());
    }

    #[test]
    fn test_custom_interval_anchored_on_start() {
        let start = date(2024, 1, 3);
        let every_ten = Recurrence::CustomDays(10);
        let feb = every_ten.occurrences(start, date(2024, 2, 1), date(2024, 3, 1));
        assert_eq!(feb, vec![date(2024, 2, 2), date(2024, 2, 12), date(2024, 2, 22)]);
        // Same answer when asked through a window starting mid-month.
        let tail = every_ten.occurrences(start, date(2024, 2, 10), date(2024, 3, 1));
        assert_eq!(tail, vec![date(2024, 2, 12), date(2024, 2, 22)]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("bi-weekly".parse::<Recurrence>().unwrap(), Recurrence::Biweekly);
        assert_eq!("Semi-Monthly".parse::<Recurrence>().unwrap(), Recurrence::Semimonthly);
        assert_eq!("once".parse::<Recurrence>().unwrap(), Recurrence::OneTime);
        assert_eq!(
            "every 10 days".parse::<Recurrence>().unwrap(),
            Recurrence::CustomDays(10)
        );
        assert!("fortnightly-ish".parse::<Recurrence>().is_err());
        assert!(Recurrence::CustomDays(0).validate().is_err());
    }
}
