//! Trial division by every prime under 100,000 — the cheapest possible
//! check, and the first thing an unattended sweep should try.

use num_traits::{One, Zero};

use super::Attack;
use crate::error::AttackError;
use crate::key::RsaWork;
use crate::ntheory;

const LIMIT: u64 = 100_000;

pub struct SmallPrime;

impl Attack for SmallPrime {
    fn name(&self) -> &'static str {
        "small-prime"
    }

    fn run(&self, works: &mut [RsaWork]) -> Result<bool, AttackError> {
        if works.first().is_some_and(|w| w.key.d.is_some()) {
            return Ok(true);
        }

        let work = works
            .first_mut()
            .ok_or(AttackError::PreconditionMissing { why: "no key supplied" })?;

        let n = work.key.public.n.clone();
        for p in ntheory::sieve_eratosthenes(LIMIT) {
            let p = num_bigint::BigUint::from(p);
            if (&n % &p).is_zero() {
                let q = &n / &p;
                if q > num_bigint::BigUint::one() {
                    work.key.complete_from_primes(p, q);
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn factors_a_small_q_key() {
        // n = 97 * 65537, well inside the trial-division bound.
        let n = BigUint::from(97_u32) * BigUint::from(65537_u32);
        let e = BigUint::from(17_u32);
        let mut work = RsaWork::from_components(n, e);
        assert_eq!(SmallPrime.run(std::slice::from_mut(&mut work)), Ok(true));
        assert!(work.key.is_solved());
        let (p, q) = work.key.primes.clone().unwrap();
        assert!(
            (p == BigUint::from(97_u32) && q == BigUint::from(65537_u32))
                || (q == BigUint::from(97_u32) && p == BigUint::from(65537_u32))
        );
    }

    #[test]
    fn fails_on_a_key_with_no_small_factor() {
        // Two primes both well above the trial-division bound.
        let p = BigUint::from(100003_u32);
        let q = BigUint::from(100019_u32);
        let n = &p * &q;
        let mut work = RsaWork::from_components(n, BigUint::from(65537_u32));
        assert_eq!(SmallPrime.run(std::slice::from_mut(&mut work)), Ok(false));
        assert!(!work.key.is_solved());
    }

    #[test]
    fn already_solved_key_is_a_no_op() {
        let p = BigUint::from(97_u32);
        let q = BigUint::from(65537_u32);
        let mut work = RsaWork::from_components(&p * &q, BigUint::from(17_u32));
        work.key.complete_from_primes(p.clone(), q.clone());

        assert_eq!(SmallPrime.run(std::slice::from_mut(&mut work)), Ok(true));
        assert_eq!(work.key.primes, Some((p, q)));
    }
}
