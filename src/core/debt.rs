use crate::core::error::ValidationError;
use crate::core::money::{monthly_interest, MAX_AMOUNT};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A single debt account and its mutable ledger state.
///
/// Debts are validated at construction: the name is non-empty, the balance
/// lies in `[0, MAX_AMOUNT]`, the annual rate lies in `[0, 100]` and the
/// minimum payment is positive and at most [`MAX_AMOUNT`]. Once built, the
/// balance only changes through [`Debt::apply_period_payment`] and never
/// increases.
///
/// # Examples
///
/// ```
/// use debt_optimizer::core::debt::Debt;
/// use rust_decimal_macros::dec;
///
/// let card = Debt::new("Credit Card", dec!(5000), dec!(18.99), dec!(150)).unwrap();
/// assert_eq!(card.balance(), dec!(5000));
/// assert!(Debt::new("", dec!(5000), dec!(18.99), dec!(150)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DebtRecord")]
pub struct Debt {
    /// Unique name within a portfolio.
    name: String,
    /// Outstanding principal.
    balance: Decimal,
    /// Annual percentage rate, e.g. `18.99`.
    annual_rate: Decimal,
    /// Scheduled monthly payment.
    minimum_payment: Decimal,
    /// Day of month the minimum is due.
    #[serde(skip_serializing_if = "Option::is_none")]
    due_day: Option<u32>,
}

/// Unvalidated wire form of a [`Debt`].
#[derive(Debug, Clone, Deserialize)]
struct DebtRecord {
    name: String,
    balance: Decimal,
    annual_rate: Decimal,
    minimum_payment: Decimal,
    #[serde(default)]
    due_day: Option<u32>,
}

impl TryFrom<DebtRecord> for Debt {
    type Error = ValidationError;

    fn try_from(record: DebtRecord) -> Result<Self, Self::Error> {
        let debt = Debt::new(
            record.name,
            record.balance,
            record.annual_rate,
            record.minimum_payment,
        )?;
        match record.due_day {
            Some(day) => debt.with_due_day(day),
            None => Ok(debt),
        }
    }
}

/// Outcome of applying one period's payment to a debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodPayment {
    pub starting_balance: Decimal,
    /// Interest accrued this period.
    pub interest: Decimal,
    /// Amount actually applied to the debt.
    pub payment: Decimal,
    pub principal: Decimal,
    /// Accrued interest the payment did not cover.
    pub unpaid_interest: Decimal,
    pub new_balance: Decimal,
    /// Offered funds the debt did not need.
    pub freed: Decimal,
}

impl PeriodPayment {
    /// Interest actually settled by this payment.
    pub fn interest_paid(&self) -> Decimal {
        self.interest - self.unpaid_interest
    }

    pub fn paid_off(&self) -> bool {
        self.starting_balance > Decimal::ZERO && self.new_balance == Decimal::ZERO
    }
}

impl Debt {
    /// Create a validated debt.
    pub fn new(
        name: impl Into<String>,
        balance: Decimal,
        annual_rate: Decimal,
        minimum_payment: Decimal,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyDebtName);
        }
        if balance < Decimal::ZERO {
            return Err(ValidationError::NegativeBalance { name, balance });
        }
        if balance > MAX_AMOUNT {
            return Err(ValidationError::BalanceTooLarge { name, balance });
        }
        if annual_rate < Decimal::ZERO || annual_rate > dec!(100) {
            return Err(ValidationError::RateOutOfRange {
                name,
                rate: annual_rate,
            });
        }
        if minimum_payment <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveMinimum {
                name,
                minimum: minimum_payment,
            });
        }
        if minimum_payment > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge {
                name,
                amount: minimum_payment,
            });
        }
        Ok(Self {
            name,
            balance,
            annual_rate,
            minimum_payment,
            due_day: None,
        })
    }

    /// Set the day of month the minimum payment is due.
    pub fn with_due_day(mut self, day: u32) -> Result<Self, ValidationError> {
        if !(1..=31).contains(&day) {
            return Err(ValidationError::InvalidDueDay {
                name: self.name,
                day,
            });
        }
        self.due_day = Some(day);
        Ok(self)
    }

    // --- Accessors ---

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn annual_rate(&self) -> Decimal {
        self.annual_rate
    }

    pub fn minimum_payment(&self) -> Decimal {
        self.minimum_payment
    }

    pub fn due_day(&self) -> Option<u32> {
        self.due_day
    }

    /// Still carries a balance and takes part in allocation.
    pub fn is_active(&self) -> bool {
        self.balance > Decimal::ZERO
    }

    /// Interest this debt accrues over the next period at its current balance.
    pub fn accrued_interest(&self) -> Decimal {
        monthly_interest(self.balance, self.annual_rate)
    }

    /// Amount that would zero the debt this period.
    pub fn payoff_amount(&self) -> Decimal {
        if !self.is_active() {
            return Decimal::ZERO;
        }
        self.balance + self.accrued_interest()
    }

    /// What is left to pay off after the minimum payment this period.
    ///
    /// This is the most extra a debt can absorb in one period.
    pub fn balance_after_minimum(&self) -> Decimal {
        (self.payoff_amount() - self.minimum_payment).max(Decimal::ZERO)
    }

    /// Portion of the minimum payment not needed to zero the debt this period.
    pub fn minimum_overshoot(&self) -> Decimal {
        if !self.is_active() {
            return Decimal::ZERO;
        }
        (self.minimum_payment - self.payoff_amount()).max(Decimal::ZERO)
    }

    /// Whether the minimum payment alone retires any principal.
    pub fn minimum_covers_interest(&self) -> bool {
        self.minimum_payment > self.accrued_interest()
    }

    /// Apply one period: accrue interest, then apply `scheduled + extra`.
    ///
    /// The debt is never overpaid. Anything beyond `balance + interest` comes
    /// back as [`PeriodPayment::freed`]. When the payment does not cover the
    /// accrued interest, the uncovered part is reported as unpaid interest and
    /// the balance stays where it was.
    pub fn apply_period_payment(
        &mut self,
        scheduled_payment: Decimal,
        extra_payment: Decimal,
    ) -> PeriodPayment {
        let offered = (scheduled_payment + extra_payment).max(Decimal::ZERO);
        if !self.is_active() {
            return PeriodPayment {
                starting_balance: self.balance,
                interest: Decimal::ZERO,
                payment: Decimal::ZERO,
                principal: Decimal::ZERO,
                unpaid_interest: Decimal::ZERO,
                new_balance: self.balance,
                freed: offered,
            };
        }

        let starting_balance = self.balance;
        let interest = self.accrued_interest();
        let payment = offered.min(starting_balance + interest);
        let principal = (payment - interest).max(Decimal::ZERO);
        let unpaid_interest = (interest - payment).max(Decimal::ZERO);
        let new_balance = (starting_balance - principal).max(Decimal::ZERO);
        self.balance = new_balance;

        PeriodPayment {
            starting_balance,
            interest,
            payment,
            principal,
            unpaid_interest,
            new_balance,
            freed: offered - payment,
        }
    }
}
