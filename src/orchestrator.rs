//! Picks which attack(s) to run and in what order: an unattended sweep over
//! a single key, a named attack against one or more keys, or a sweep over
//! the multi-key attacks when more than one key was supplied.

use crate::attack::{self, ATTACKS};
use crate::error::AttackError;
use crate::key::RsaWork;

/// The outcome of a sweep: which attack (if any) solved the key, plus every
/// non-fatal error collected along the way — useful for `--verbose`
/// diagnostics even on a successful run.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub solved_by: Option<&'static str>,
    pub errors: Vec<(&'static str, AttackError)>,
}

impl SweepReport {
    #[must_use]
    pub fn solved(&self) -> bool {
        self.solved_by.is_some()
    }
}

/// Try every single-key attack eligible for unattended use, in catalogue
/// order, stopping at the first success (spec's "stop on first success,
/// collect non-fatal errors" sweep semantics).
pub fn run_unattended(work: &mut RsaWork) -> SweepReport {
    let mut report = SweepReport::default();

    for a in ATTACKS.iter().filter(|a| a.unattended() && !a.multi_key()) {
        match a.run(std::slice::from_mut(work)) {
            Ok(true) => {
                report.solved_by = Some(a.name());
                return report;
            }
            Ok(false) => {}
            Err(e) => report.errors.push((a.name(), e)),
        }
    }

    report
}

/// Run one named attack by catalogue name, regardless of its `unattended`
/// flag (a user who asks for `apbq` by name has already supplied the hints
/// it needs). Returns whether the attack actually solved the key.
pub fn run_named(name: &str, works: &mut [RsaWork]) -> Result<bool, AttackError> {
    let a = attack::find(name).ok_or_else(|| AttackError::UnsupportedAttack {
        name: name.to_string(),
    })?;
    a.run(works)
}

/// Run one named multi-key attack (currently just `common-factor`) over a
/// set of keys loaded together via `--keylist`. Returns whether the attack
/// actually solved any key.
pub fn run_multi_key(name: &str, works: &mut [RsaWork]) -> Result<bool, AttackError> {
    let a = attack::find(name).ok_or_else(|| AttackError::UnsupportedAttack {
        name: name.to_string(),
    })?;
    if !a.multi_key() {
        return Err(AttackError::PreconditionMissing {
            why: "attack does not operate on multiple keys",
        });
    }
    a.run(works)
}

/// The catalogue's names, in sweep order, for `--list`.
#[must_use]
pub fn list_attacks() -> Vec<&'static str> {
    ATTACKS.iter().map(|a| a.name()).collect()
}
