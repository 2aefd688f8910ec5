//! Brent's cycle-detection variant of Pollard's rho: finds a nontrivial
//! factor of `n` in roughly `O(n^1/4)` time, batching the GCD check across
//! several steps the way the RsaCracker reference implementation does.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::thread_rng;

use super::Attack;
use crate::bignum;
use crate::error::AttackError;
use crate::key::RsaWork;

/// How many steps to accumulate before paying for a GCD, trading a few
/// wasted steps past the actual cycle for far fewer (expensive) GCDs.
const BATCH: usize = 128;

/// How many restarts (with a different pseudo-random function) to try
/// before giving up.
const MAX_RESTARTS: u32 = 20;

pub struct PollardRho;

impl Attack for PollardRho {
    fn name(&self) -> &'static str {
        "pollard-rho"
    }

    fn run(&self, works: &mut [RsaWork]) -> Result<bool, AttackError> {
        if works.first().is_some_and(|w| w.key.d.is_some()) {
            return Ok(true);
        }

        let work = works
            .first_mut()
            .ok_or(AttackError::PreconditionMissing { why: "no key supplied" })?;

        let n = work.key.public.n.clone();
        let mut rng = thread_rng();
        for _ in 0..MAX_RESTARTS {
            let c = rng.gen_biguint_below(&n).max(BigUint::one());
            let seed = rng.gen_biguint_below(&n);
            if let Some(factor) = brent(&n, &c, &seed) {
                let q = &n / &factor;
                work.key.complete_from_primes(factor, q);
                return Ok(true);
            }
        }

        Err(AttackError::FactorizationFailed)
    }
}

/// One restart of Brent's algorithm with pseudo-random function
/// `f(x) = x^2 + c mod n`, seeded from `y0`. Returns a nontrivial factor of
/// `n`, or `None` if this restart cycled back to a trivial gcd without
/// finding one.
fn brent(n: &BigUint, c: &BigUint, y0: &BigUint) -> Option<BigUint> {
    if !bignum::test_bit(n, 0) {
        return Some(BigUint::from(2_u32));
    }

    let f = |x: &BigUint| -> BigUint { (bignum::mod_exp(x, &BigUint::from(2_u32), n) + c) % n };

    let mut y = y0.clone();
    let mut x;
    let mut d = BigUint::one();
    let mut power: u64 = 1;
    let mut lam: u64 = 0;
    let mut product = BigUint::one();
    let mut since_gcd = 0usize;

    x = y.clone();

    while d == BigUint::one() {
        if power == lam {
            y = x.clone();
            power *= 2;
            lam = 0;
        }
        x = f(&x);
        lam += 1;

        let diff = if x >= y { &x - &y } else { &y - &x };
        if diff.is_zero() {
            // x and y collided exactly; this restart's function is
            // degenerate for this n. Bail to the next c.
            return None;
        }
        product = (product * diff) % n;
        since_gcd += 1;

        if since_gcd == BATCH {
            d = bignum::gcd(&product, n);
            since_gcd = 0;
            if d != BigUint::one() {
                break;
            }
        }
    }

    if d == BigUint::one() {
        d = bignum::gcd(&product, n);
    }

    if d > BigUint::one() && &d < n {
        Some(d)
    } else {
        None
    }
}
