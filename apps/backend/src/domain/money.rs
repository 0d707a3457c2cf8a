//! Fixed-point currency and commission arithmetic.
//!
//! Amounts are held in minor units (cents) so that ledger math never touches
//! floating point. On the wire they travel as decimal strings: `"20"`,
//! `"20.5"` and `"20.50"` all parse to the same value and render as `"20.50"`.

use std::fmt;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

const MINOR_PER_MAJOR: i64 = 100;
const BPS_SCALE: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("empty amount")]
    Empty,
    #[error("malformed amount '{0}'")]
    Malformed(String),
    #[error("amount '{0}' has more than two decimal places")]
    TooPrecise(String),
    #[error("amount '{0}' is out of range")]
    Overflow(String),
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub fn from_major(major: i64) -> Option<Self> {
        major.checked_mul(MINOR_PER_MAJOR).map(Money)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    pub fn checked_mul(self, factor: i64) -> Option<Money> {
        self.0.checked_mul(factor).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = MINOR_PER_MAJOR.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / per, abs % per)
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        let well_formed = !whole.is_empty()
            && whole.bytes().all(|b| b.is_ascii_digit())
            && frac.bytes().all(|b| b.is_ascii_digit())
            && !(digits.contains('.') && frac.is_empty());
        if !well_formed {
            return Err(MoneyParseError::Malformed(raw.to_string()));
        }
        if frac.len() > 2 {
            return Err(MoneyParseError::TooPrecise(raw.to_string()));
        }

        let overflow = || MoneyParseError::Overflow(raw.to_string());
        let whole: i64 = whole.parse().map_err(|_| overflow())?;
        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| overflow())? * 10,
            _ => frac.parse().map_err(|_| overflow())?,
        };
        let minor = whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(cents))
            .ok_or_else(overflow)?;
        Ok(Money(if negative { -minor } else { minor }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateParseError {
    #[error("commission rate '{0}' is not a decimal fraction")]
    Malformed(String),
    #[error("commission rate '{0}' must be in [0, 1)")]
    OutOfRange(String),
    #[error("commission rate '{0}' is finer than one basis point")]
    TooPrecise(String),
}

/// Platform commission in basis points; always below 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommissionRate {
    bps: u16,
}

impl CommissionRate {
    pub fn from_bps(bps: u16) -> Option<Self> {
        (i64::from(bps) < BPS_SCALE).then_some(Self { bps })
    }

    pub const fn bps(self) -> u16 {
        self.bps
    }

    /// Split a pot into `(prize, commission)`.
    ///
    /// The commission is rounded down to the cent, so the winner keeps any
    /// fractional remainder and `prize + commission == pot` always holds.
    pub fn split(self, pot: Money) -> (Money, Money) {
        let commission = i128::from(pot.minor()) * i128::from(self.bps) / i128::from(BPS_SCALE);
        // commission <= pot, so it fits back into i64
        let commission = Money::from_minor(commission as i64);
        let prize = Money::from_minor(pot.minor() - commission.minor());
        (prize, commission)
    }
}

impl fmt::Display for CommissionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:04}", self.bps / 10_000, self.bps % 10_000)
    }
}

impl FromStr for CommissionRate {
    type Err = RateParseError;

    /// Parses a fraction such as `"0.1"` or `"0.025"` into basis points.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim();
        let malformed = || RateParseError::Malformed(raw.to_string());
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty()
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }
        if whole.trim_start_matches('0') != "" {
            return Err(RateParseError::OutOfRange(raw.to_string()));
        }
        let significant = frac.trim_end_matches('0');
        if significant.len() > 4 {
            return Err(RateParseError::TooPrecise(raw.to_string()));
        }
        let padded = format!("{significant:0<4}");
        let bps: u16 = padded.parse().map_err(|_| malformed())?;
        CommissionRate::from_bps(bps).ok_or_else(|| RateParseError::OutOfRange(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn parses_decimal_strings() {
        assert_eq!(m("20"), Money::from_minor(2000));
        assert_eq!(m("20.5"), Money::from_minor(2050));
        assert_eq!(m("0.07"), Money::from_minor(7));
        assert_eq!(m("-3.10"), Money::from_minor(-310));
        assert_eq!(m(" 100 "), Money::from_minor(10_000));
    }

    #[test]
    fn rejects_bad_amounts() {
        assert_eq!("".parse::<Money>(), Err(MoneyParseError::Empty));
        assert!(matches!("1.234".parse::<Money>(), Err(MoneyParseError::TooPrecise(_))));
        assert!(matches!("abc".parse::<Money>(), Err(MoneyParseError::Malformed(_))));
        assert!(matches!("1.".parse::<Money>(), Err(MoneyParseError::Malformed(_))));
        assert!(matches!(".5".parse::<Money>(), Err(MoneyParseError::Malformed(_))));
        assert!(matches!(
            "99999999999999999999".parse::<Money>(),
            Err(MoneyParseError::Overflow(_))
        ));
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Money::from_minor(2000).to_string(), "20.00");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(-250).to_string(), "-2.50");
    }

    #[test]
    fn serde_uses_strings() {
        let json = serde_json::to_string(&Money::from_minor(4000)).unwrap();
        assert_eq!(json, "\"40.00\"");
        let back: Money = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(back, Money::from_minor(1250));
    }

    #[test]
    fn commission_parse_and_split() {
        let rate: CommissionRate = "0.1".parse().unwrap();
        assert_eq!(rate.bps(), 1000);
        assert_eq!(rate.split(m("40")), (m("36"), m("4")));

        let rate: CommissionRate = "0.025".parse().unwrap();
        assert_eq!(rate.bps(), 250);
        // 2.5% of 0.99 = 0.02475 -> commission floors to 0.02
        assert_eq!(rate.split(m("0.99")), (m("0.97"), m("0.02")));
    }

    #[test]
    fn commission_bounds() {
        assert!("1".parse::<CommissionRate>().is_err());
        assert!("1.0".parse::<CommissionRate>().is_err());
        assert!("0.00001".parse::<CommissionRate>().is_err());
        assert_eq!("0".parse::<CommissionRate>().unwrap().bps(), 0);
        assert_eq!("0.9999".parse::<CommissionRate>().unwrap().bps(), 9999);
        assert!(CommissionRate::from_bps(10_000).is_none());
    }

    #[test]
    fn zero_commission_pays_full_pot() {
        let rate = CommissionRate::default();
        assert_eq!(rate.split(m("100")), (m("100"), Money::ZERO));
    }
}
