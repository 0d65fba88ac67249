use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

use serde::{Serialize, Serializer};

use crate::EngineError;

/// A payment in **integer cents**.
///
/// Parsing keeps the sign so a negative payment can be reported with its
/// value; [`JobRecord`](crate::JobRecord) refuses anything outside
/// `0..=Money::MAX_PAYMENT`. Sums saturate instead of wrapping.
///
/// ```rust
/// use engine::Money;
///
/// let amount: Money = "12,3".parse().unwrap();
/// assert_eq!(amount.cents(), 1230);
/// assert_eq!(amount.format("$"), "$12.30");
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest payment a single job may carry: 10 billion currency units.
    /// A store would need close to a million such jobs before a total
    /// reached `i64::MAX`.
    pub const MAX_PAYMENT: Money = Money(1_000_000_000_000);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Whole currency units with the cents dropped; negative amounts give 0.
    #[must_use]
    pub const fn whole_units(self) -> u64 {
        if self.0 < 0 { 0 } else { (self.0 / 100) as u64 }
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `$500.00`, or `-$10.50` for negative amounts.
    #[must_use]
    pub fn format(self, symbol: &str) -> String {
        if self.0 < 0 {
            format!("-{symbol}{}", Money(self.0.saturating_neg()))
        } else {
            format!("{symbol}{self}")
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// `500`, `500.5`, `500,50`, with an optional sign. At most two decimals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || EngineError::Validation(format!("invalid amount \"{raw}\""));
        if raw.is_empty() {
            return Err(EngineError::Validation("empty amount".to_string()));
        }

        let (negative, digits) = match raw.as_bytes()[0] {
            b'-' => (true, &raw[1..]),
            b'+' => (false, &raw[1..]),
            _ => (false, raw),
        };
        let (units, fraction) = digits
            .split_once(['.', ','])
            .unwrap_or((digits, ""));

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if units.is_empty() || !all_digits(units) || !all_digits(fraction) {
            return Err(invalid());
        }
        let fraction_cents = match fraction.len() {
            0 => 0,
            1 => i64::from(fraction.as_bytes()[0] - b'0') * 10,
            2 => fraction.parse::<i64>().map_err(|_| invalid())?,
            _ => return Err(EngineError::Validation("too many decimals".to_string())),
        };

        let cents = units
            .parse::<i64>()
            .ok()
            .and_then(|u| u.checked_mul(100))
            .and_then(|c| c.checked_add(fraction_cents))
            .ok_or_else(|| EngineError::Validation("amount too large".to_string()))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
