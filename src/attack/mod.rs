//! The attack catalogue: one [`Attack`] implementation per recovery
//! technique, registered in [`ATTACKS`] the way the RsaCracker reference
//! tool registers its own `lazy_static! ATTACKS` table.

mod apbq;
mod common_factor;
mod past_primes;
mod pollard_rho;
mod small_prime;

use once_cell::sync::Lazy;

use crate::error::AttackError;
use crate::key::RsaWork;

/// One RSA key-recovery technique.
///
/// `run` is always handed a slice of [`RsaWork`] — single-key attacks
/// operate on `works[0]` and ignore the rest; [`Attack::multi_key`] attacks
/// need at least two entries and search across all of them.
pub trait Attack {
    /// Stable, lowercase, hyphen-free name used by `--attack` and `--list`.
    fn name(&self) -> &'static str;

    /// Whether this attack is safe to include in an unattended sweep
    /// (spec's "fast, broadly applicable" bar — APBQ is excluded because it
    /// needs hints the sweep cannot guess).
    fn unattended(&self) -> bool {
        true
    }

    /// Whether this attack needs more than one key to do anything useful.
    fn multi_key(&self) -> bool {
        false
    }

    /// Attempt recovery, mutating `works` in place on success.
    ///
    /// Three outcomes, not two: `Ok(true)` once at least one key in `works`
    /// has become [`crate::key::PrivateKey::is_solved`]; `Ok(false)` when the
    /// attack ran cleanly but its technique just doesn't apply here (no small
    /// factor, no shared factor, no match in the past-primes list — a benign
    /// miss, not an error); `Err(AttackError)` for a genuine precondition
    /// failure or a budget exhausted without success. The orchestrator skips
    /// `Ok(false)` silently and only collects `Err`s as sweep diagnostics.
    fn run(&self, works: &mut [RsaWork]) -> Result<bool, AttackError>;
}

/// The fixed set of attacks the toolkit knows about, in the order an
/// unattended sweep tries them: cheapest and most broadly applicable first.
pub static ATTACKS: Lazy<Vec<Box<dyn Attack + Sync + Send>>> = Lazy::new(|| {
    vec![
        Box::new(small_prime::SmallPrime),
        Box::new(past_primes::PastCtfPrimes),
        Box::new(common_factor::CommonFactor),
        Box::new(pollard_rho::PollardRho),
        Box::new(apbq::Apbq),
    ]
});

/// Look up a registered attack by name, for `--attack <name>`.
#[must_use]
pub fn find(name: &str) -> Option<&'static (dyn Attack + Sync + Send)> {
    ATTACKS
        .iter()
        .find(|a| a.name() == name)
        .map(std::convert::AsRef::as_ref)
}
