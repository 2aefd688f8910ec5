//! Typed errors for the two places the toolkit can fail: key ingestion and
//! attack execution.

/// Errors raised while turning input bytes into an [`crate::key::RsaWork`].
///
/// A `KeyError` is fatal to the run: per spec, ingestion failures abort the
/// program before any attack is attempted.
#[derive(thiserror::Error, Debug)]
pub enum KeyError {
    /// Input was not a PEM/DER key in any of the supported forms, nor a
    /// valid integer-list key.
    #[error("malformed key: {0}")]
    Malformed(String),

    /// Integer-list ingestion was missing a required `n` or `e` field.
    #[error("missing required field `{field}` in key data")]
    MissingField { field: &'static str },

    /// Underlying filesystem error while reading a key or ciphertext file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised by an individual attack's execution.
///
/// Unlike [`KeyError`], an `AttackError` is never fatal by itself: the
/// orchestrator collects these and keeps trying the remaining attacks in
/// the sweep (spec §4.9, §7).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AttackError {
    /// `run_named`/`run_multi_key` was asked for a name not in the
    /// catalogue.
    #[error("unsupported attack: {name}")]
    UnsupportedAttack { name: String },

    /// The attack requires input (hints, ciphertext, a brute-force bound)
    /// that was not supplied.
    #[error("precondition missing: {why}")]
    PreconditionMissing { why: &'static str },

    /// The attack ran to its iteration/search budget without success.
    #[error("factorization failed: search budget exhausted")]
    FactorizationFailed,

    /// A file the attack depends on (e.g. the past-CTF-primes file)
    /// couldn't be read.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AttackError {
    fn from(err: std::io::Error) -> Self {
        AttackError::Io(err.to_string())
    }
}
