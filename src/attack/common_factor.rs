//! Shared-factor attack: given two or more public keys, checks every
//! lexicographic pair for `gcd(n_i, n_j) != 1`. A shared prime between two
//! otherwise-unrelated moduli breaks both keys at once — a classic symptom
//! of a weak or reused entropy source at key-generation time.

use itertools::Itertools;
use num_traits::One;

use super::Attack;
use crate::bignum;
use crate::error::AttackError;
use crate::key::RsaWork;

pub struct CommonFactor;

impl Attack for CommonFactor {
    fn name(&self) -> &'static str {
        "common-factor"
    }

    fn multi_key(&self) -> bool {
        true
    }

    fn run(&self, works: &mut [RsaWork]) -> Result<bool, AttackError> {
        if works.first().is_some_and(|w| w.key.d.is_some()) {
            return Ok(true);
        }

        if works.len() < 2 {
            return Err(AttackError::PreconditionMissing {
                why: "common-factor needs at least two keys",
            });
        }

        for (i, j) in (0..works.len()).tuple_combinations() {
            let g = bignum::gcd(&works[i].key.public.n, &works[j].key.public.n);
            if g <= num_bigint::BigUint::one() {
                continue;
            }

            for idx in [i, j] {
                let n = works[idx].key.public.n.clone();
                let q = &n / &g;
                if q > num_bigint::BigUint::one() {
                    works[idx].key.complete_from_primes(g.clone(), q);
                }
            }
            return Ok(true);
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn recovers_both_keys_sharing_a_factor() {
        let shared = BigUint::from(100003_u32);
        let p1 = BigUint::from(65537_u32);
        let p2 = BigUint::from(104729_u32);

        let n1 = &shared * &p1;
        let n2 = &shared * &p2;

        let mut works = vec![
            RsaWork::from_components(n1, BigUint::from(17_u32)),
            RsaWork::from_components(n2, BigUint::from(17_u32)),
        ];

        CommonFactor.run(&mut works).unwrap();
        assert!(works[0].key.is_solved());
        assert!(works[1].key.is_solved());
    }

    #[test]
    fn leaves_coprime_keys_unsolved() {
        let n1 = BigUint::from(100003_u32) * BigUint::from(65537_u32);
        let n2 = BigUint::from(104729_u32) * BigUint::from(104723_u32);
        let mut works = vec![
            RsaWork::from_components(n1, BigUint::from(17_u32)),
            RsaWork::from_components(n2, BigUint::from(17_u32)),
        ];

        assert_eq!(CommonFactor.run(&mut works), Ok(false));
        assert!(!works[0].key.is_solved());
        assert!(!works[1].key.is_solved());
    }

    #[test]
    fn already_solved_first_key_is_a_no_op() {
        let p = BigUint::from(5_u32);
        let q = BigUint::from(7_u32);
        let other_n = BigUint::from(100003_u32) * BigUint::from(104729_u32);
        let mut works = vec![
            RsaWork::from_components(&p * &q, BigUint::from(17_u32)),
            RsaWork::from_components(other_n, BigUint::from(17_u32)),
        ];
        works[0].key.complete_from_primes(p.clone(), q.clone());

        assert_eq!(CommonFactor.run(&mut works), Ok(true));
        assert_eq!(works[0].key.primes, Some((p, q)));
        assert!(!works[1].key.is_solved());
    }

    #[test]
    fn errors_on_a_single_key() {
        let mut works = vec![RsaWork::from_components(BigUint::from(35_u32), BigUint::from(5_u32))];
        let err = CommonFactor.run(&mut works).unwrap_err();
        assert!(matches!(err, AttackError::PreconditionMissing { .. }));
    }
}
