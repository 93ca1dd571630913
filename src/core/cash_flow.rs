use crate::core::error::ValidationError;
use crate::core::money::MAX_AMOUNT;
use crate::core::recurrence::Recurrence;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A recurring or one-off amount of money flowing in or out.
///
/// The same type models income sources, recurring expenses and future
/// one-time items. Whether it counts as income or expense depends on the
/// list it is placed in.
///
/// # Examples
///
/// ```
/// use debt_optimizer::core::cash_flow::CashFlowEntry;
/// use debt_optimizer::core::recurrence::Recurrence;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let rent = CashFlowEntry::new(
///     "Rent",
///     dec!(1200),
///     Recurrence::Monthly,
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
/// ).unwrap();
///
/// let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
/// assert_eq!(rent.total_between(jan, feb), dec!(1200));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CashFlowRecord")]
pub struct CashFlowEntry {
    name: String,
    amount: Decimal,
    recurrence: Recurrence,
    start_date: NaiveDate,
    /// Last date (inclusive) on which the entry may fire.
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<NaiveDate>,
}

pub type IncomeEntry = CashFlowEntry;
pub type ExpenseEntry = CashFlowEntry;

#[derive(Debug, Clone, Deserialize)]
struct CashFlowRecord {
    name: String,
    amount: Decimal,
    recurrence: Recurrence,
    start_date: NaiveDate,
    #[serde(default)]
    end_date: Option<NaiveDate>,
}

impl TryFrom<CashFlowRecord> for CashFlowEntry {
    type Error = ValidationError;

    fn try_from(r: CashFlowRecord) -> Result<Self, Self::Error> {
        let entry = CashFlowEntry::new(r.name, r.amount, r.recurrence, r.start_date)?;
        match r.end_date {
            Some(end) => entry.with_end_date(end),
            None => Ok(entry),
        }
    }
}

impl CashFlowEntry {
    pub fn new(
        name: impl Into<String>,
        amount: Decimal,
        recurrence: Recurrence,
        start_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyEntryName);
        }
        if amount < Decimal::ZERO {
            return Err(ValidationError::NegativeEntryAmount { name, amount });
        }
        if amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge { name, amount });
        }
        recurrence.validate()?;
        Ok(Self {
            name,
            amount,
            recurrence,
            start_date,
            end_date: None,
        })
    }

    /// Stop the series after `end` (inclusive).
    pub fn with_end_date(mut self, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < self.start_date {
            return Err(ValidationError::EndBeforeStart { name: self.name });
        }
        self.end_date = Some(end);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn recurrence(&self) -> Recurrence {
        self.recurrence
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Dates in `[from, until)` on which this entry fires.
    pub fn occurrences_between(&self, from: NaiveDate, until: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = self.recurrence.occurrences(self.start_date, from, until);
        if let Some(end) = self.end_date {
            dates.retain(|d| *d <= end);
        }
        dates
    }

    /// Total amount firing in `[from, until)`.
    pub fn total_between(&self, from: NaiveDate, until: NaiveDate) -> Decimal {
        let count = self.occurrences_between(from, until).len();
        self.amount * Decimal::from(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekly_total() {
        let groceries =
            CashFlowEntry::new("Groceries", dec!(100), Recurrence::Weekly, date(2024, 1, 1)).unwrap();
        // Jan 2024 Mondays: 1, 8, 15, 22, 29
        assert_eq!(groceries.total_between(date(2024, 1, 1), date(2024, 2, 1)), dec!(500));
    }

    #[test]
    fn test_end_date_inclusive() {
        let bonus = CashFlowEntry::new("Contract", dec!(800), Recurrence::Monthly, date(2024, 1, 15))
            .unwrap()
            .with_end_date(date(2024, 3, 15))
            .unwrap();
        assert_eq!(bonus.total_between(date(2024, 3, 1), date(2024, 4, 1)), dec!(800));
        assert_eq!(bonus.total_between(date(2024, 4, 1), date(2024, 5, 1)), Decimal::ZERO);
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            CashFlowEntry::new("", dec!(1), Recurrence::Monthly, date(2024, 1, 1)),
            Err(ValidationError::EmptyEntryName)
        );
        assert!(matches!(
            CashFlowEntry::new("Pay", dec!(-1), Recurrence::Monthly, date(2024, 1, 1)),
            Err(ValidationError::NegativeEntryAmount { .. })
        ));
        assert!(matches!(
            CashFlowEntry::new("Pay", Decimal::MAX, Recurrence::Weekly, date(2024, 1, 1)),
            Err(ValidationError::AmountTooLarge { .. })
        ));
        assert_eq!(
            CashFlowEntry::new("Pay", dec!(1), Recurrence::CustomDays(0), date(2024, 1, 1)),
            Err(ValidationError::ZeroCustomInterval)
        );
        let entry = CashFlowEntry::new("Pay", dec!(1), Recurrence::Monthly, date(2024, 5, 1)).unwrap();
        assert!(matches!(
            entry.with_end_date(date(2024, 4, 1)),
            Err(ValidationError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn test_deserialize() {
        let entry: CashFlowEntry = serde_json::from_str(
            r#"{"name":"Salary","amount":"3500","recurrence":"biweekly","start_date":"2024-01-05"}"#,
        )
        .unwrap();
        assert_eq!(entry.recurrence(), Recurrence::Biweekly);

        let custom: CashFlowEntry = serde_json::from_str(
            r#"{"name":"Gig","amount":"90","recurrence":{"custom_days":10},"start_date":"2024-01-03"}"#,
        )
        .unwrap();
        assert_eq!(custom.recurrence(), Recurrence::CustomDays(10));
    }
}
