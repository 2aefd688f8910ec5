//! Number-theoretic helpers shared by the attacks: private-exponent
//! recovery, the continued-fraction toolkit, perfect-square testing, Lucas
//! sequence doubling and the prime sieves used by trial-division attacks.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive, Zero};

use crate::bignum;

/// `d = e^-1 mod (p-1)(q-1)`. `None` iff `gcd(e, (p-1)(q-1)) != 1`, i.e. `p`,
/// `q` do not form a valid RSA factor pair for this `e`.
#[must_use]
pub fn solve_for_d(p: &BigUint, q: &BigUint, e: &BigUint) -> Option<BigUint> {
    let p1 = p - &*bignum::consts::ONE;
    let q1 = q - &*bignum::consts::ONE;
    let totient = p1 * q1;
    bignum::mod_inverse(e, &totient)
}

/// Recover a nontrivial factor of `n` from a known `(d, e)` pair.
///
/// Ported from the `_slowmath.py`-derived algorithm used by the source
/// toolkit: strip factors of two from `k = d*e - 1` to get `k = t * 2^s`,
/// then for each even base `a` in `2..=998`, walk `u = t, 2t, 4t, ...`
/// looking for a nontrivial square root of unity modulo `n`. Odd bases are
/// never tried — that is intentional-by-algorithm in the source, not an
/// omission to "fix" (see `DESIGN.md`).
#[must_use]
pub fn find_p_given_d(d: &BigUint, e: &BigUint, n: &BigUint) -> Option<BigUint> {
    let ktot = d * e - &*bignum::consts::ONE;
    if ktot.is_zero() {
        return None;
    }

    let mut t = ktot.clone();
    while (&t % &*bignum::consts::TWO).is_zero() {
        t /= &*bignum::consts::TWO;
    }

    let n_minus_one = n - &*bignum::consts::ONE;

    let mut a: u64 = 2;
    while a < 1000 {
        let base = BigUint::from(a);
        let mut u = t.clone();

        while u < ktot {
            let cand = bignum::mod_exp(&base, &u, n);

            if cand != *bignum::consts::ONE
                && cand != n_minus_one
                && bignum::mod_exp(&cand, &bignum::consts::TWO, n) == *bignum::consts::ONE
            {
                let factor = bignum::gcd(&(cand + &*bignum::consts::ONE), n);
                if factor > *bignum::consts::ONE && &factor < n {
                    return Some(factor);
                }
            }

            u *= &*bignum::consts::TWO;
        }

        a += 2;
    }

    None
}

/// Euclidean continued-fraction expansion of `x/y`.
///
/// # Panics
///
/// If `y` is zero.
#[must_use]
pub fn rational_to_contfract(x: &BigInt, y: &BigInt) -> Vec<BigInt> {
    assert!(!y.is_zero(), "rational_to_contfract: zero denominator");

    let mut quotients = Vec::new();
    let (mut x, mut y) = (x.clone(), y.clone());

    loop {
        let q = &x / &y;
        let r = &x - &q * &y;
        quotients.push(q);

        if r.is_zero() {
            break;
        }

        x = y;
        y = r;
    }

    quotients
}

/// Inverse of [`rational_to_contfract`]: rebuild `(num, den)` from a
/// sequence of quotients.
#[must_use]
pub fn contfract_to_rational(quotients: &[BigInt]) -> (BigInt, BigInt) {
    match quotients {
        [] => (BigInt::zero(), BigInt::one()),
        [q] => (q.clone(), BigInt::one()),
        [q, rest @ ..] => {
            let (num, den) = contfract_to_rational(rest);
            (q * &num + &den, num)
        }
    }
}

/// The list of prefix convergents `(num_i, den_i)` of a continued fraction.
#[must_use]
pub fn convergents(quotients: &[BigInt]) -> Vec<(BigInt, BigInt)> {
    (0..quotients.len())
        .map(|i| contfract_to_rational(&quotients[0..i + 1]))
        .collect()
}

/// `Some(sqrt(n))` if `n` is a perfect square, `None` otherwise.
///
/// Fast-rejects via `n mod 16` (only `{0, 1, 4, 9}` are quadratic residues
/// mod 16) before paying for an [`bignum::isqrt`] confirmation.
#[must_use]
pub fn is_perfect_square(n: &BigUint) -> Option<BigUint> {
    // AND with 15 (0b1111) is a cheap `n mod 16`; `consts::SIXTEEN` is the
    // *value* 16 from the spec's constant pool, not the mask, so it is not
    // reused here.
    let residue = bignum::and(n, &BigUint::from(15_u32)).to_u8().unwrap_or(255);

    if !matches!(residue, 0 | 1 | 4 | 9) {
        return None;
    }

    let root = bignum::isqrt(n);
    if &root * &root == *n {
        Some(root)
    } else {
        None
    }
}

/// `V_a`, the `a`-th term of the Lucas sequence seeded by `V_1 = v`, modulo
/// `n`, computed via the doubling recurrences
/// `V_{2k} = V_k^2 - 2`, `V_{2k+1} = V_k*V_{k+1} - V_1`,
/// scanning the bits of `a` from second-most-significant downwards.
#[must_use]
pub fn mlucas(v: &BigUint, a: &BigUint, n: &BigUint) -> BigUint {
    let bits = bignum::bit_length(a);
    if bits == 0 {
        return &*bignum::consts::TWO % n;
    }
    if bits == 1 {
        return v % n;
    }

    let submod = |x: &BigUint, y: &BigUint, n: &BigUint| -> BigUint {
        if x >= y {
            (x - y) % n
        } else {
            (n - ((y - x) % n)) % n
        }
    };

    let mut v1 = v % n;
    let mut v2 = submod(&bignum::mod_exp(v, &bignum::consts::TWO, n), &bignum::consts::TWO, n);

    for i in (0..=bits - 2).rev() {
        if bignum::test_bit(a, i) {
            let new_v1 = submod(&((&v1 * &v2) % n), v, n);
            let new_v2 = submod(&((&v2 * &v2) % n), &bignum::consts::TWO, n);
            v1 = new_v1;
            v2 = new_v2;
        } else {
            let new_v2 = submod(&((&v1 * &v2) % n), v, n);
            let new_v1 = submod(&((&v1 * &v1) % n), &bignum::consts::TWO, n);
            v1 = new_v1;
            v2 = new_v2;
        }
    }

    v1
}

/// All primes `< limit`, ascending, via a plain sieve of Eratosthenes.
#[must_use]
pub fn sieve_eratosthenes(limit: u64) -> Vec<u64> {
    if limit < 2 {
        return Vec::new();
    }

    let limit = limit as usize;
    let mut composite = vec![false; limit];
    let mut primes = Vec::new();

    for i in 2..limit {
        if composite[i] {
            continue;
        }
        primes.push(i as u64);

        let mut k = i * i;
        while k < limit {
            composite[k] = true;
            k += i;
        }
    }

    primes
}

/// Primes in the half-open range `[begin, end)`, ascending, sieved with a
/// block of base primes up to `sqrt(end)`.
#[must_use]
pub fn sieve_segment(begin: u64, end: u64) -> Vec<u64> {
    if begin >= end {
        return Vec::new();
    }

    let sqrt_end = (end as f64).sqrt() as u64 + 1;
    let base_primes = sieve_eratosthenes(sqrt_end + 1);

    let begin = begin.max(2);
    let size = (end - begin) as usize;
    let mut composite = vec![false; size];

    for &p in &base_primes {
        let start = ((begin + p - 1) / p).max(p) * p;
        let mut k = start;
        while k < end {
            if k >= begin {
                composite[(k - begin) as usize] = true;
            }
            k += p;
        }
    }

    (begin..end)
        .zip(composite)
        .filter_map(|(n, is_composite)| (!is_composite).then_some(n))
        .collect()
}

/// Primes `< limit`, ascending, via a classic sieve of Atkin.
#[must_use]
pub fn sieve_atkin(limit: u64) -> Vec<u64> {
    if limit < 2 {
        return Vec::new();
    }

    let limit = limit as usize;
    let mut is_prime = vec![false; limit];
    let sqrt_limit = (limit as f64).sqrt() as u64 + 1;

    for x in 1..=sqrt_limit {
        for y in 1..=sqrt_limit {
            let (x2, y2) = (x * x, y * y);

            let n = 4 * x2 + y2;
            if n < limit as u64 && (n % 12 == 1 || n % 12 == 5) {
                is_prime[n as usize] ^= true;
            }

            let n = 3 * x2 + y2;
            if n < limit as u64 && n % 12 == 7 {
                is_prime[n as usize] ^= true;
            }

            if x > y {
                let n = 3 * x2 - y2;
                if n < limit as u64 && n % 12 == 11 {
                    is_prime[n as usize] ^= true;
                }
            }
        }
    }

    for n in 5..sqrt_limit {
        if is_prime[n as usize] {
            let n2 = n * n;
            let mut k = n2;
            while k < limit as u64 {
                is_prime[k as usize] = false;
                k += n2;
            }
        }
    }

    let mut primes = Vec::new();
    if limit > 2 {
        primes.push(2);
    }
    if limit > 3 {
        primes.push(3);
    }
    for (n, &p) in is_prime.iter().enumerate().skip(5) {
        if p {
            primes.push(n as u64);
        }
    }
    primes
}

/// Primes in `[begin, limit)`, ascending, via the sieve of Atkin.
#[must_use]
pub fn sieve_atkin_range(begin: u64, limit: u64) -> Vec<u64> {
    sieve_atkin(limit)
        .into_iter()
        .filter(|&p| p >= begin)
        .collect()
}
