use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::errors::EngineError;

/// A currency code: exactly three ASCII letters, stored uppercase.
///
/// The engine does no conversion — a plan is denominated in one currency and
/// every amount entering it must match (see `EngineError::CurrencyMismatch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency([u8; 3]);

impl Currency {
    /// British pound sterling — the product's home-market default.
    pub const GBP: Currency = Currency(*b"GBP");

    /// Parse a currency code (e.g., "GBP", "usd"). Trims whitespace and
    /// uppercases; anything that isn't exactly 3 ASCII letters is rejected.
    pub fn new(code: &str) -> Result<Self, EngineError> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(EngineError::Validation(format!(
                "Invalid currency code '{code}': must be exactly 3 ASCII letters (e.g., GBP, USD, EUR)"
            )));
        }
        let mut bytes = [0u8; 3];
        for (i, b) in trimmed.bytes().enumerate() {
            bytes[i] = b.to_ascii_uppercase();
        }
        Ok(Self(bytes))
    }

    /// The code as a string slice, always uppercase.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII letters only.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Currency {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Currency::new(&code).map_err(serde::de::Error::custom)
    }
}

/// A monetary amount: an integer count of minor currency units (pence,
/// cents) plus its currency. Never represented as a binary float — all
/// arithmetic is integer math with explicit rounding rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Signed count of minor units (e.g., 1_000_000 = £10,000.00).
    minor_units: i64,
    currency: Currency,
}

impl Money {
    /// Create a value from minor units (the only constructor — there is
    /// deliberately no way to build Money from a float).
    #[must_use]
    pub const fn from_minor(minor_units: i64, currency: Currency) -> Self {
        Self {
            minor_units,
            currency,
        }
    }

    /// Zero in the given currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self::from_minor(0, currency)
    }

    #[must_use]
    pub const fn minor_units(&self) -> i64 {
        self.minor_units
    }

    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.minor_units > 0
    }

    /// Add two same-currency amounts.
    pub fn add(self, other: Money) -> Result<Money, EngineError> {
        self.ensure_same_currency(other)?;
        let sum = self.minor_units.checked_add(other.minor_units).ok_or_else(|| {
            EngineError::Validation("amount overflow in addition".to_string())
        })?;
        Ok(Money::from_minor(sum, self.currency))
    }

    /// Subtract, allowing a negative result (e.g., remaining headroom of an
    /// overspent category).
    pub fn sub(self, other: Money) -> Result<Money, EngineError> {
        self.ensure_same_currency(other)?;
        let diff = self.minor_units.checked_sub(other.minor_units).ok_or_else(|| {
            EngineError::Validation("amount overflow in subtraction".to_string())
        })?;
        Ok(Money::from_minor(diff, self.currency))
    }

    /// Subtract in a non-negative context: fails with `NegativeResult`
    /// instead of producing a value below zero.
    pub fn sub_non_negative(self, other: Money) -> Result<Money, EngineError> {
        let diff = self.sub(other)?;
        if diff.is_negative() {
            return Err(EngineError::NegativeResult(format!(
                "{self} - {other} is below zero"
            )));
        }
        Ok(diff)
    }

    /// Ratio of `self` to `whole` (e.g., 0.4 = 40%). Returns 0.0 when
    /// `whole` is zero — callers never hit a division-by-zero fault.
    /// Currencies are not compared: the plan upholds single-currency amounts
    /// before ratios are ever taken.
    #[must_use]
    pub fn percent_of(&self, whole: Money) -> f64 {
        if whole.minor_units == 0 {
            return 0.0;
        }
        self.minor_units as f64 / whole.minor_units as f64
    }

    /// Split this amount into `weights.len()` parts proportional to the
    /// weights, guaranteeing the parts sum back to the total exactly.
    ///
    /// Uses largest-remainder allocation: each part gets the floor of its
    /// ideal share, then the leftover units go to the largest fractional
    /// remainders (ties resolved by position, earlier entry first).
    /// All-zero weights fall back to an equal split. Negative weights are
    /// treated as zero. Empty weights yield an empty vec.
    #[must_use]
    pub fn split_proportional(&self, weights: &[i64]) -> Vec<Money> {
        if weights.is_empty() {
            return Vec::new();
        }

        let mut clamped: Vec<i128> = weights.iter().map(|w| (*w).max(0) as i128).collect();
        if clamped.iter().all(|w| *w == 0) {
            // Equal split fallback
            clamped = vec![1; weights.len()];
        }
        let weight_sum: i128 = clamped.iter().sum();

        let total = self.minor_units as i128;
        let mut shares: Vec<i128> = Vec::with_capacity(clamped.len());
        let mut remainders: Vec<(usize, i128)> = Vec::with_capacity(clamped.len());
        for (i, w) in clamped.iter().enumerate() {
            let numerator = total * w;
            // div_euclid floors toward negative infinity, so remainders stay
            // non-negative even for a negative total.
            shares.push(numerator.div_euclid(weight_sum));
            remainders.push((i, numerator.rem_euclid(weight_sum)));
        }

        let assigned: i128 = shares.iter().sum();
        let mut leftover = total - assigned;
        remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let mut next = 0usize;
        while leftover > 0 {
            shares[remainders[next % remainders.len()].0] += 1;
            leftover -= 1;
            next += 1;
        }

        shares
            .into_iter()
            .map(|s| Money::from_minor(s as i64, self.currency))
            .collect()
    }

    fn ensure_same_currency(&self, other: Money) -> Result<(), EngineError> {
        if self.currency != other.currency {
            return Err(EngineError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }
}

/// Only same-currency values are ordered; comparing across currencies
/// yields `None` rather than a meaningless answer.
impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (self.currency == other.currency).then(|| self.minor_units.cmp(&other.minor_units))
    }
}

/// Debug-oriented formatting assuming two decimal places. Locale-aware
/// display is the UI layer's concern, not this type's.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor_units < 0 { "-" } else { "" };
        let abs = self.minor_units.unsigned_abs();
        write!(f, "{}{}.{:02} {}", sign, abs / 100, abs % 100, self.currency)
    }
}
