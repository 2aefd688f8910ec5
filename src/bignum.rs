//! Thin facade over [`num_bigint`], the toolkit's single arbitrary-precision
//! integer library.
//!
//! Every attack and ingestion routine goes through here instead of calling
//! `num_bigint`/`num_integer` directly, so the rest of the crate reads like
//! it is written against a primitive bignum type (spec treats bignum
//! arithmetic as primitive) rather than against a specific crate's API
//! quirks.

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer as _;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;

/// A shared pool of small constants, built once.
pub mod consts {
    use super::{BigUint, Lazy};

    macro_rules! small_const {
        ($name:ident, $val:expr) => {
            pub static $name: Lazy<BigUint> = Lazy::new(|| BigUint::from($val as u32));
        };
    }

    small_const!(ZERO, 0);
    small_const!(ONE, 1);
    small_const!(TWO, 2);
    small_const!(THREE, 3);
    small_const!(FOUR, 4);
    small_const!(FIVE, 5);
    small_const!(SIX, 6);
    small_const!(SEVEN, 7);
    small_const!(EIGHT, 8);
    small_const!(NINE, 9);
    small_const!(ELEVEN, 11);
    small_const!(SIXTEEN, 16);
}

/// Parse a decimal string into a [`BigUint`].
#[must_use]
pub fn from_decimal(s: &str) -> Option<BigUint> {
    BigUint::parse_bytes(s.trim().as_bytes(), 10)
}

/// Parse a hex string into a [`BigUint`]. A leading `0x`/`0X` is stripped if
/// present; otherwise the whole string is read as hex.
#[must_use]
pub fn from_hex(s: &str) -> Option<BigUint> {
    let s = s.trim();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    BigUint::parse_bytes(s.as_bytes(), 16)
}

/// Parse a decimal string, trying hex first if it carries a `0x` prefix.
///
/// This mirrors the base-sniffing rule used by the integer-list key format:
/// base is 16 iff the literal is `0x`-prefixed, else base 10.
#[must_use]
pub fn from_prefixed(s: &str) -> Option<BigUint> {
    let s = s.trim();
    if s.starts_with("0x") || s.starts_with("0X") {
        from_hex(s)
    } else {
        from_decimal(s)
    }
}

/// Big-endian, minimal-length bytes (`BigUint::to_bytes_be` already omits
/// leading zero bytes except for zero itself, which is a single `0x00`).
#[must_use]
pub fn to_bytes_be(n: &BigUint) -> Vec<u8> {
    n.to_bytes_be()
}

/// Parse big-endian bytes into a [`BigUint`].
#[must_use]
pub fn from_bytes_be(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// `a mod m` computed via the extended Euclidean algorithm, returning
/// `None` when `gcd(a, m) != 1` (callers treat this as "candidate
/// rejected", per spec's `mod_inverse` contract).
#[must_use]
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let a_int = BigInt::from(a.clone());
    let m_int = BigInt::from(m.clone());

    let (g, x, _) = extended_gcd(&a_int, &m_int);
    if g != BigInt::one() {
        return None;
    }

    let m_signed = m_int.clone();
    let result = ((x % &m_signed) + &m_signed) % &m_signed;
    result.to_biguint()
}

/// Extended Euclidean algorithm: returns `(gcd, x, y)` such that
/// `a*x + b*y == gcd`.
#[must_use]
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    if a.is_zero() {
        return (b.clone(), BigInt::zero(), BigInt::one());
    }

    let (q, r) = b.div_rem(a);
    let (g, x1, y1) = extended_gcd(&r, a);
    (g, y1 - &q * &x1, x1)
}

/// `gcd(a, b)`.
#[must_use]
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    a.gcd(b)
}

/// `base^exp mod modulus`.
#[must_use]
pub fn mod_exp(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// Integer square root (floor).
#[must_use]
pub fn isqrt(n: &BigUint) -> BigUint {
    n.sqrt()
}

/// Number of bits needed to represent `n` (`0` has bit length `0`).
#[must_use]
pub fn bit_length(n: &BigUint) -> u64 {
    n.bits()
}

/// Whether bit `i` (0-indexed, LSB first) of `n` is set.
#[must_use]
pub fn test_bit(n: &BigUint, i: u64) -> bool {
    n.bit(i)
}

/// Bitwise AND.
#[must_use]
pub fn and(a: &BigUint, b: &BigUint) -> BigUint {
    a & b
}

/// Convert a non-negative [`BigInt`] to a [`BigUint`], panicking on a
/// negative input. Used at call sites that have already established
/// non-negativity through the surrounding algorithm.
#[must_use]
pub fn to_biguint_nonneg(n: &BigInt) -> BigUint {
    assert_ne!(n.sign(), Sign::Minus, "to_biguint_nonneg: negative input");
    n.magnitude().clone()
}
