// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fractional sibling order keys.
//!
//! A key is a string over the printable ASCII range `'!'..='~'`, read as a
//! base-94 fraction `0.d1 d2 d3 ...` where `'!'` is the digit zero. Keys never
//! end in a zero digit, so two distinct keys never denote the same fraction and
//! plain lexicographic comparison of the strings matches numeric order (a strict
//! prefix sorts first).
//!
//! New keys are allocated between neighbors without renumbering anything:
//!
//! ```rust
//! use vellum_model::order::{OrderKey, calc_position};
//!
//! let a = OrderKey::first();
//! let c = a.plus_one();
//! let b = calc_position(Some(&a), Some(&c)).unwrap().unwrap();
//! assert!(a < b && b < c);
//! assert_eq!(calc_position(None, Some(&c)).unwrap(), None);
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest digit character.
pub const MIN_DIGIT: u8 = b'!';
/// Largest digit character.
pub const MAX_DIGIT: u8 = b'~';
/// Number of digits in the alphabet.
pub const BASE: u8 = MAX_DIGIT - MIN_DIGIT + 1;

/// Reasons an order key cannot be parsed or allocated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OrderKeyError {
    /// Keys carry at least one digit.
    #[error("order key is empty")]
    Empty,
    /// A character outside `'!'..='~'`.
    #[error("order key {key:?} has invalid character {ch:?} at byte {index}")]
    InvalidChar {
        /// Offending key.
        key: String,
        /// Offending character.
        ch: char,
        /// Byte offset of the character.
        index: usize,
    },
    /// A key ending in `'!'` aliases the shorter key without it.
    #[error("order key {0:?} ends with the zero digit '!'")]
    TrailingZero(String),
    /// `midpoint` needs `a < b`.
    #[error("order keys are not ascending: {a:?} >= {b:?}")]
    NotAscending {
        /// Lower bound as given.
        a: String,
        /// Upper bound as given.
        b: String,
    },
}

/// A validated sibling order key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderKey(String);

impl OrderKey {
    /// Validate `key`.
    pub fn parse(key: impl Into<String>) -> Result<Self, OrderKeyError> {
        let key = key.into();
        if key.is_empty() {
            return Err(OrderKeyError::Empty);
        }
        if let Some((index, ch)) = key
            .char_indices()
            .find(|(_, ch)| !(MIN_DIGIT as char..=MAX_DIGIT as char).contains(ch))
        {
            return Err(OrderKeyError::InvalidChar { key, ch, index });
        }
        if key.as_bytes().last() == Some(&MIN_DIGIT) {
            return Err(OrderKeyError::TrailingZero(key));
        }
        Ok(Self(key))
    }

    /// The key given to the first child of an empty list: the middle digit,
    /// leaving equal room on both sides.
    pub fn first() -> Self {
        Self::from_digits(&[BASE / 2])
    }

    /// The key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Next key after `self`; see [`plus_one`].
    pub fn plus_one(&self) -> Self {
        plus_one(self)
    }

    /// A key strictly before `self`, halfway to zero.
    pub fn before(&self) -> Self {
        let zero = vec![0; self.0.len()];
        Self::from_digits(&step_halfway(zero, &self.digits()))
    }

    fn digits(&self) -> Vec<u8> {
        self.0.bytes().map(|b| b - MIN_DIGIT).collect()
    }

    /// Build a key from digit values, dropping trailing zeros.
    ///
    /// Callers guarantee at least one nonzero digit.
    fn from_digits(digits: &[u8]) -> Self {
        let len = digits.iter().rposition(|d| *d != 0).map_or(0, |i| i + 1);
        Self(
            digits[..len]
                .iter()
                .map(|d| char::from(MIN_DIGIT + d))
                .collect(),
        )
    }
}

impl fmt::Debug for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OrderKey({:?})", self.0)
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderKey {
    type Error = OrderKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for OrderKey {
    type Error = OrderKeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<OrderKey> for String {
    fn from(key: OrderKey) -> Self {
        key.0
    }
}

/// Increment the last digit of `key`, carrying into earlier digits.
///
/// Digits zeroed by the carry are trimmed. When every digit is the maximum
/// the carry would run off the front; the key is extended with one more digit
/// instead, which keeps the result strictly greater.
pub fn plus_one(key: &OrderKey) -> OrderKey {
    let mut digits = key.digits();
    for i in (0..digits.len()).rev() {
        if digits[i] + 1 < BASE {
            digits[i] += 1;
            digits.truncate(i + 1);
            return OrderKey::from_digits(&digits);
        }
    }
    digits.push(1);
    OrderKey::from_digits(&digits)
}

/// A key strictly between `a` and `b`.
///
/// Both keys are padded to the same length and the difference is halved.
/// Numerically adjacent keys (difference of one unit in the last place) are
/// extended by one digit first. The result depends only on the inputs.
pub fn midpoint(a: &OrderKey, b: &OrderKey) -> Result<OrderKey, OrderKeyError> {
    if a >= b {
        tracing::warn!(%a, %b, "rejected order key midpoint");
        return Err(OrderKeyError::NotAscending {
            a: a.0.clone(),
            b: b.0.clone(),
        });
    }
    let len = a.0.len().max(b.0.len());
    let mut lo = a.digits();
    let mut hi = b.digits();
    lo.resize(len, 0);
    hi.resize(len, 0);
    Ok(OrderKey::from_digits(&step_halfway(lo, &hi)))
}

/// `lo + (hi - lo) / 2` on equal-length digit strings with `lo < hi`.
fn step_halfway(mut lo: Vec<u8>, hi: &[u8]) -> Vec<u8> {
    let mut diff = sub(hi, &lo);
    let mut half = halve(&diff);
    if half.iter().all(|d| *d == 0) {
        lo.push(0);
        diff.push(0);
        half = halve(&diff);
    }
    add_in_place(&mut lo, &half);
    lo
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "digit arithmetic stays below BASE"
)]
fn sub(hi: &[u8], lo: &[u8]) -> Vec<u8> {
    let mut out = vec![0; hi.len()];
    let mut borrow = 0_i16;
    for i in (0..hi.len()).rev() {
        let mut d = i16::from(hi[i]) - i16::from(lo[i]) - borrow;
        borrow = 0;
        if d < 0 {
            d += i16::from(BASE);
            borrow = 1;
        }
        out[i] = d as u8;
    }
    out
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "digit arithmetic stays below BASE"
)]
fn halve(digits: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(digits.len());
    let mut rem = 0_u16;
    for d in digits {
        let cur = rem * u16::from(BASE) + u16::from(*d);
        out.push((cur / 2) as u8);
        rem = cur % 2;
    }
    out
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "digit arithmetic stays below BASE"
)]
fn add_in_place(acc: &mut [u8], rhs: &[u8]) {
    let mut carry = 0_u16;
    for i in (0..acc.len()).rev() {
        let sum = u16::from(acc[i]) + u16::from(rhs[i]) + carry;
        acc[i] = (sum % u16::from(BASE)) as u8;
        carry = sum / u16::from(BASE);
    }
}

/// Position for a node placed between two siblings.
///
/// - no `after`: `None`, the caller decides (usually appends)
/// - only `after`: [`plus_one`] of it
/// - both: [`midpoint`]
pub fn calc_position(
    after: Option<&OrderKey>,
    before: Option<&OrderKey>,
) -> Result<Option<OrderKey>, OrderKeyError> {
    match (after, before) {
        (None, _) => Ok(None),
        (Some(after), None) => Ok(Some(plus_one(after))),
        (Some(after), Some(before)) => midpoint(after, before).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(s: &str) -> OrderKey {
        OrderKey::parse(s).unwrap()
    }

    #[test]
    fn parse_rejects_bad_keys() {
        assert_eq!(OrderKey::parse(""), Err(OrderKeyError::Empty));
        assert!(matches!(
            OrderKey::parse("ab c"),
            Err(OrderKeyError::InvalidChar { ch: ' ', index: 2, .. })
        ));
        assert!(matches!(
            OrderKey::parse("aé"),
            Err(OrderKeyError::InvalidChar { index: 1, .. })
        ));
        assert_eq!(
            OrderKey::parse("a!"),
            Err(OrderKeyError::TrailingZero("a!".into()))
        );
        assert!(OrderKey::parse("!a").is_ok());
    }

    #[test]
    fn plus_one_increments_and_carries() {
        assert_eq!(plus_one(&key("a")), key("b"));
        assert_eq!(plus_one(&key("a~")), key("b"));
        assert_eq!(plus_one(&key("a}~")), key("a~"));
        // Full overflow extends instead of wrapping.
        let all_max = key("~~");
        let next = plus_one(&all_max);
        assert_eq!(next, key("~~\""));
        assert!(next > all_max);
    }

    #[test]
    fn midpoint_between_distant_and_adjacent_keys() {
        let m = midpoint(&key("!\""), &key("~")).unwrap();
        assert!(key("!\"") < m && m < key("~"));
        // Adjacent at full length: needs another digit.
        let m = midpoint(&key("a"), &key("b")).unwrap();
        assert_eq!(m, key("aP"));
        // Prefix relation.
        let m = midpoint(&key("a"), &key("a\"")).unwrap();
        assert!(key("a") < m && m < key("a\""));
        assert_eq!(
            midpoint(&key("b"), &key("a")),
            Err(OrderKeyError::NotAscending {
                a: "b".into(),
                b: "a".into()
            })
        );
        assert!(midpoint(&key("b"), &key("b")).is_err());
    }

    #[test]
    fn before_is_strictly_smaller() {
        for s in ["\"", "!\"", "P", "~", "a~"] {
            let k = key(s);
            assert!(k.before() < k, "{s}");
        }
    }

    #[test]
    fn calc_position_cases() {
        let a = key("a");
        let c = key("c");
        assert_eq!(calc_position(None, None).unwrap(), None);
        assert_eq!(calc_position(None, Some(&c)).unwrap(), None);
        assert_eq!(calc_position(Some(&a), None).unwrap(), Some(key("b")));
        assert_eq!(calc_position(Some(&a), Some(&c)).unwrap(), Some(key("b")));
    }

    #[test]
    fn repeated_insertion_after_same_key_stays_ordered() {
        let a = OrderKey::first();
        let mut upper = a.plus_one();
        let mut inserted = Vec::new();
        for _ in 0..200 {
            let k = midpoint(&a, &upper).unwrap();
            assert!(a < k && k < upper);
            inserted.push(k.clone());
            upper = k;
        }
        let mut sorted = inserted.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), inserted.len());
        inserted.reverse();
        assert_eq!(sorted, inserted);
    }

    #[test]
    fn serde_validates() {
        let k: OrderKey = serde_json::from_str("\"aP\"").unwrap();
        assert_eq!(k, key("aP"));
        assert!(serde_json::from_str::<OrderKey>("\"a!\"").is_err());
        assert_eq!(serde_json::to_string(&k).unwrap(), "\"aP\"");
    }

    fn arb_key() -> impl Strategy<Value = OrderKey> {
        (prop::collection::vec(0_u8..BASE, 0..6), 1_u8..BASE).prop_map(|(mut d, last)| {
            d.push(last);
            OrderKey::from_digits(&d)
        })
    }

    proptest! {
        #[test]
        fn midpoint_is_strictly_between(a in arb_key(), b in arb_key()) {
            prop_assume!(a != b);
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            let m = midpoint(&lo, &hi).unwrap();
            prop_assert!(lo < m && m < hi, "{lo} < {m} < {hi}");
            prop_assert!(OrderKey::parse(m.as_str()).is_ok());
        }

        #[test]
        fn plus_one_is_strictly_greater(a in arb_key()) {
            let next = plus_one(&a);
            prop_assert!(next > a);
            prop_assert!(OrderKey::parse(next.as_str()).is_ok());
        }
    }
}
