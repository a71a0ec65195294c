use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-point amount in minor units (cents).
///
/// All booking prices are carried as integer cents so totals are never
/// accumulated in floating point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }

    /// Multiply by a factor given in hundredths (150 = x1.5), rounding half away from zero
    pub fn checked_scale(self, hundredths: u32) -> Option<Money> {
        let scaled = self.0.checked_mul(i64::from(hundredths))?;
        let quotient = scaled / 100;
        let remainder = scaled % 100;
        let rounded = if remainder >= 50 {
            quotient + 1
        } else if remainder <= -50 {
            quotient - 1
        } else {
            quotient
        };
        Some(Money(rounded))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}
