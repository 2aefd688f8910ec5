//! Checks `n` against a user-supplied list of primes seen in earlier CTF
//! challenges — degenerate key generators reuse the same small pool of
//! "random" primes often enough that this is worth trying before anything
//! expensive.

use num_traits::{One, Zero};

use super::Attack;
use crate::error::AttackError;
use crate::key::RsaWork;

pub struct PastCtfPrimes;

impl Attack for PastCtfPrimes {
    fn name(&self) -> &'static str {
        "past-ctf-primes"
    }

    fn run(&self, works: &mut [RsaWork]) -> Result<bool, AttackError> {
        if works.first().is_some_and(|w| w.key.d.is_some()) {
            return Ok(true);
        }

        let work = works
            .first_mut()
            .ok_or(AttackError::PreconditionMissing { why: "no key supplied" })?;

        if work.past_primes_file.is_none() {
            return Err(AttackError::PreconditionMissing {
                why: "no past-primes file configured",
            });
        }

        let candidates = work.load_past_primes()?;
        let n = work.key.public.n.clone();

        for p in candidates {
            if p.is_zero() || p == num_bigint::BigUint::one() {
                continue;
            }
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

    struct ScratchFile(std::path::PathBuf);

    impl ScratchFile {
        fn new(name: &str, contents: &str) -> Self {
            let mut path = std::env::temp_dir();
            path.push(format!("rsatk-test-{}-{}", std::process::id(), name));
            std::fs::write(&path, contents).unwrap();
            ScratchFile(path)
        }
    }

    impl Drop for ScratchFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn finds_a_factor_in_the_supplied_list() {
        let file = ScratchFile::new("past-primes-ok", "# known-weak primes\n97\n\n65537\n");

        let n = BigUint::from(97_u32) * BigUint::from(104729_u32);
        let mut work = RsaWork::from_components(n, BigUint::from(65537_u32));
        work.past_primes_file = Some(file.0.clone());

        PastCtfPrimes.run(std::slice::from_mut(&mut work)).unwrap();
        assert!(work.key.is_solved());
    }

    #[test]
    fn errors_without_a_configured_file() {
        let mut work =
            RsaWork::from_components(BigUint::from(35_u32), BigUint::from(5_u32));
        let err = PastCtfPrimes.run(std::slice::from_mut(&mut work)).unwrap_err();
        assert!(matches!(err, AttackError::PreconditionMissing { .. }));
    }

    #[test]
    fn already_solved_key_is_a_no_op() {
        let mut work = RsaWork::from_components(BigUint::from(35_u32), BigUint::from(5_u32));
        work.key.complete_from_primes(BigUint::from(5_u32), BigUint::from(7_u32));

        assert_eq!(PastCtfPrimes.run(std::slice::from_mut(&mut work)), Ok(true));
    }
}
