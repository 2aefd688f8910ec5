//! The data model every attack and the orchestrator operate on: a public
//! key, an optional private half, and the auxiliary material (ciphertext,
//! leaked-bit hints, a past-primes file, a brute-force bound) a run may or
//! may not have been given.

use std::fs;
use std::path::{Path, PathBuf};

use num_bigint::BigUint;
use regex::Regex;

use crate::bignum;
use crate::error::KeyError;
use crate::pem;

/// `(n, e)` — always present; this is the one thing every ingestion path
/// guarantees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub n: BigUint,
    pub e: BigUint,
}

/// A public key plus whatever private material an attack has recovered (or
/// the input already carried).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub public: PublicKey,
    pub d: Option<BigUint>,
    pub primes: Option<(BigUint, BigUint)>,
}

impl PrivateKey {
    fn public_only(n: BigUint, e: BigUint) -> Self {
        PrivateKey {
            public: PublicKey { n, e },
            d: None,
            primes: None,
        }
    }

    /// A key is "solved" once both the factorization and the private
    /// exponent are known — the condition every attack is racing to reach.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.d.is_some() && self.primes.is_some()
    }

    /// Fill in whichever of `d`/`primes` is missing, given the other.
    /// No-op for fields already populated with a different value — callers
    /// own the decision to overwrite.
    pub fn complete_from_primes(&mut self, p: BigUint, q: BigUint) {
        if self.d.is_none() {
            let phi = (&p - &*bignum::consts::ONE) * (&q - &*bignum::consts::ONE);
            self.d = bignum::mod_inverse(&self.public.e, &phi);
        }
        self.primes = Some((p, q));
    }

    pub fn complete_from_d(&mut self, d: BigUint) {
        self.d = Some(d);
    }
}

/// Everything a single run of the toolkit has to work with: the key under
/// attack, plus optional ciphertext/plaintext and attack-specific inputs.
#[derive(Debug, Clone)]
pub struct RsaWork {
    pub key: PrivateKey,
    pub cipher_text: Option<BigUint>,
    pub plain_text: Option<BigUint>,
    /// Leaked high bits of `p`, one per guess, for the APBQ attack.
    pub hints: Vec<BigUint>,
    /// Local-search budget for APBQ; also usable as a generic iteration cap.
    pub brute_max: Option<u64>,
    pub past_primes_file: Option<PathBuf>,
    pub verbose: bool,
}

impl RsaWork {
    fn new(key: PrivateKey) -> Self {
        RsaWork {
            key,
            cipher_text: None,
            plain_text: None,
            hints: Vec::new(),
            brute_max: None,
            past_primes_file: None,
            verbose: false,
        }
    }

    /// Build directly from `(n, e)`, as `--createkey` does; no PEM/DER
    /// round-trip involved.
    #[must_use]
    pub fn from_components(n: BigUint, e: BigUint) -> Self {
        RsaWork::new(PrivateKey::public_only(n, e))
    }

    /// Try PEM first, then DER, mirroring the source toolkit's
    /// `ImportKey`/`parsePublicRsaKey` fallback: most key files in the wild
    /// are PEM, but some CTF drops are raw DER.
    pub fn from_key_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let looks_like_pem = bytes.windows(5).any(|w| w == b"-----");
        let decoded = if looks_like_pem {
            pem::decode_pem(bytes).or_else(|_| pem::decode_der(bytes))?
        } else {
            pem::decode_der(bytes).or_else(|_| pem::decode_pem(bytes))?
        };

        Ok(RsaWork::new(PrivateKey {
            public: PublicKey {
                n: decoded.n,
                e: decoded.e,
            },
            d: decoded.d,
            primes: decoded.primes,
        }))
    }

    pub fn from_key_file(path: &Path) -> Result<Self, KeyError> {
        let bytes = fs::read(path)?;
        Self::from_key_bytes(&bytes)
    }

    /// Parse the `field: value` / `field = value` integer-list format
    /// (`n`, `e`, `c`, one per line, `0x`-prefixed hex or decimal,
    /// case-insensitive field names, last occurrence of a field wins).
    ///
    /// `n` and `e` are required; `c` populates [`RsaWork::cipher_text`].
    pub fn from_integer_list(text: &str) -> Result<Self, KeyError> {
        static FIELD_RE_SRC: &str = r"(?i)^\s*([nec])\s*[:=]\s*((?:0x)?[0-9A-Fa-f]+)\s*$";
        let re = Regex::new(FIELD_RE_SRC).expect("integer-list regex is a constant, always valid");

        let mut n = None;
        let mut e = None;
        let mut c = None;

        for line in text.lines() {
            let Some(caps) = re.captures(line) else {
                continue;
            };
            let field = caps[1].to_ascii_lowercase();
            let value = bignum::from_prefixed(&caps[2]).ok_or_else(|| {
                KeyError::Malformed(format!("unparseable integer literal: {}", &caps[2]))
            })?;

            match field.as_str() {
                "n" => n = Some(value),
                "e" => e = Some(value),
                "c" => c = Some(value),
                _ => unreachable!("regex only matches n/e/c"),
            }
        }

        let n = n.ok_or(KeyError::MissingField { field: "n" })?;
        let e = e.ok_or(KeyError::MissingField { field: "e" })?;

        let mut work = RsaWork::new(PrivateKey::public_only(n, e));
        work.cipher_text = c;
        Ok(work)
    }

    /// PKCS#1 PEM for the recovered private key, once [`PrivateKey::is_solved`].
    pub fn dump_private_pem(&self) -> Result<String, KeyError> {
        let (p, q) = self
            .key
            .primes
            .clone()
            .ok_or_else(|| KeyError::Malformed("key has not been factored yet".into()))?;
        let d = self
            .key
            .d
            .clone()
            .ok_or_else(|| KeyError::Malformed("private exponent not recovered yet".into()))?;

        pem::encode_private_pem(&self.key.public.n, &self.key.public.e, &d, &p, &q)
    }

    /// PKCS#1 PEM for the public half, used by `--createkey`/`--dumpkey`.
    pub fn dump_public_pem(&self) -> Result<String, KeyError> {
        pem::encode_public_pem(&self.key.public.n, &self.key.public.e)
    }

    /// `c^d mod n`, once a private exponent is known.
    #[must_use]
    pub fn decrypt(&self) -> Option<BigUint> {
        let c = self.cipher_text.as_ref()?;
        let d = self.key.d.as_ref()?;
        Some(bignum::mod_exp(c, d, &self.key.public.n))
    }

    /// Read the newline-delimited past-primes file, skipping blank lines
    /// and `#`-prefixed comments.
    ///
    /// Returns a plain `io::Error` rather than [`KeyError`]: this is read
    /// during an attack's run, not during key ingestion, so the caller
    /// converts it into an [`crate::error::AttackError`] instead.
    pub fn load_past_primes(&self) -> std::io::Result<Vec<BigUint>> {
        let Some(path) = &self.past_primes_file else {
            return Ok(Vec::new());
        };
        let text = fs::read_to_string(path)?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(bignum::from_prefixed)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_list_parses_required_fields() {
        let work = RsaWork::from_integer_list("N:0x10001\nE=3\nc = 42\n").unwrap();
        assert_eq!(work.key.public.n, BigUint::from(0x10001_u32));
        assert_eq!(work.key.public.e, BigUint::from(3_u32));
        assert_eq!(work.cipher_text, Some(BigUint::from(42_u32)));
    }

    #[test]
    fn integer_list_last_occurrence_wins() {
        let work = RsaWork::from_integer_list("n: 10\nn: 20\ne: 3\n").unwrap();
        assert_eq!(work.key.public.n, BigUint::from(20_u32));
    }

    #[test]
    fn integer_list_missing_e_errors() {
        let err = RsaWork::from_integer_list("n: 10\n").unwrap_err();
        assert!(matches!(err, KeyError::MissingField { field: "e" }));
    }

    #[test]
    fn integer_list_ignores_blank_and_junk_lines() {
        let work = RsaWork::from_integer_list("\n# comment\nn: 10\n\ne: 3\ngarbage\n").unwrap();
        assert_eq!(work.key.public.n, BigUint::from(10_u32));
    }

    #[test]
    fn from_components_is_public_only() {
        let work = RsaWork::from_components(BigUint::from(10_u32), BigUint::from(3_u32));
        assert!(!work.key.is_solved());
    }

    #[test]
    fn complete_from_primes_recovers_d() {
        let mut key = PrivateKey::public_only(BigUint::from(3233_u32), BigUint::from(17_u32));
        key.complete_from_primes(BigUint::from(61_u32), BigUint::from(53_u32));
        assert_eq!(key.d, Some(BigUint::from(2753_u32)));
        assert!(key.is_solved());
    }
}
