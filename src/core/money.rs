use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Number of decimal places every recorded currency amount carries.
pub const CURRENCY_DP: u32 = 2;

/// Largest balance, payment or cash-flow amount accepted as input.
///
/// Keeps `balance * rate`, per-period sums and whole-horizon totals well
/// inside `Decimal`'s 96-bit mantissa.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Round an amount to currency precision (cents), half-up.
///
/// # Examples
///
/// ```
/// use debt_optimizer::core::money::round_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_currency(dec!(16.665)), dec!(16.67));
/// assert_eq!(round_currency(dec!(16.664)), dec!(16.66));
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an annual percentage rate (e.g. `18.99`) into a monthly fraction.
///
/// Repeating fractions are truncated at 28 digits, so ledger amounts go
/// through [`monthly_interest`] instead.
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / dec!(1200)
}

/// One month of interest on `balance`, rounded to cents.
///
/// The product is formed before dividing so that exact midpoints such as
/// `1206 * 7% / 12 = 7.035` round up instead of landing a hair below.
pub fn monthly_interest(balance: Decimal, annual_rate_percent: Decimal) -> Decimal {
    round_currency(balance * annual_rate_percent / dec!(1200))
}

/// Lossy conversion for display ratios and closed-form checks.
pub fn to_f64(amount: Decimal) -> f64 {
    amount.to_string().parse::<f64>().unwrap_or(0.0)
}
