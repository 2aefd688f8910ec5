//! The toolkit's only point of contact with PEM/DER: everything here
//! defers to the `rsa` crate (RustCrypto), the "PEM/DER encoding/decoding
//! of RSA keys" collaborator spec §1 calls out as assumed-available rather
//! than something to hand-roll.
//!
//! The rest of the crate never imports `rsa::*` directly — it goes through
//! the small [`DecodedKey`] struct and the two encode functions below, all
//! expressed in terms of our own [`num_bigint::BigUint`].

use num_bigint::BigUint;
use pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use pkcs8::{DecodePublicKey, LineEnding};

use crate::error::KeyError;

/// The numeric fields recovered from a decoded key, public-only unless the
/// input was a private key.
pub struct DecodedKey {
    pub n: BigUint,
    pub e: BigUint,
    pub d: Option<BigUint>,
    pub primes: Option<(BigUint, BigUint)>,
}

fn to_rsa_biguint(n: &BigUint) -> rsa::BigUint {
    rsa::BigUint::from_bytes_be(&n.to_bytes_be())
}

fn from_rsa_biguint(n: &rsa::BigUint) -> BigUint {
    BigUint::from_bytes_be(&n.to_bytes_be())
}

fn from_public(key: &rsa::RsaPublicKey) -> DecodedKey {
    use rsa::traits::PublicKeyParts;
    DecodedKey {
        n: from_rsa_biguint(key.n()),
        e: from_rsa_biguint(key.e()),
        d: None,
        primes: None,
    }
}

fn from_private(key: &rsa::RsaPrivateKey) -> DecodedKey {
    use rsa::traits::PrivateKeyParts;
    use rsa::traits::PublicKeyParts;

    let primes = key.primes();
    let (p, q) = if primes.len() == 2 {
        (
            Some(from_rsa_biguint(&primes[0])),
            Some(from_rsa_biguint(&primes[1])),
        )
    } else {
        (None, None)
    };

    DecodedKey {
        n: from_rsa_biguint(key.n()),
        e: from_rsa_biguint(key.e()),
        d: Some(from_rsa_biguint(key.d())),
        primes: p.zip(q),
    }
}

/// Decode PEM bytes, trying PKCS#1 public, then SPKI public, then PKCS#1
/// private, in that order — the same fallback chain as the source
/// toolkit's `parsePublicRsaKey`/`ImportKey`.
pub fn decode_pem(bytes: &[u8]) -> Result<DecodedKey, KeyError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| KeyError::Malformed("PEM input is not valid UTF-8".into()))?;

    if let Ok(pk) = rsa::RsaPublicKey::from_pkcs1_pem(text) {
        return Ok(from_public(&pk));
    }
    if let Ok(pk) = rsa::RsaPublicKey::from_public_key_pem(text) {
        return Ok(from_public(&pk));
    }
    if let Ok(sk) = rsa::RsaPrivateKey::from_pkcs1_pem(text) {
        return Ok(from_private(&sk));
    }

    Err(KeyError::Malformed(
        "not a recognized PEM public/private RSA key".into(),
    ))
}

/// Decode DER bytes via the same fallback chain as [`decode_pem`], minus
/// the PEM unwrap step.
pub fn decode_der(bytes: &[u8]) -> Result<DecodedKey, KeyError> {
    if let Ok(pk) = rsa::RsaPublicKey::from_pkcs1_der(bytes) {
        return Ok(from_public(&pk));
    }
    if let Ok(pk) = rsa::RsaPublicKey::from_public_key_der(bytes) {
        return Ok(from_public(&pk));
    }
    if let Ok(sk) = rsa::RsaPrivateKey::from_pkcs1_der(bytes) {
        return Ok(from_private(&sk));
    }

    Err(KeyError::Malformed(
        "not a recognized DER public/private RSA key".into(),
    ))
}

/// Encode a recovered private key as PKCS#1 PEM.
pub fn encode_private_pem(
    n: &BigUint,
    e: &BigUint,
    d: &BigUint,
    p: &BigUint,
    q: &BigUint,
) -> Result<String, KeyError> {
    let key = rsa::RsaPrivateKey::from_components(
        to_rsa_biguint(n),
        to_rsa_biguint(e),
        to_rsa_biguint(d),
        vec![to_rsa_biguint(p), to_rsa_biguint(q)],
    )
    .map_err(|e| KeyError::Malformed(format!("failed to assemble recovered key: {e}")))?;

    key.to_pkcs1_pem(LineEnding::LF)
        .map(|z| z.to_string())
        .map_err(|e| KeyError::Malformed(format!("failed to encode PEM: {e}")))
}

/// Encode a public key as PKCS#1 PEM (used by `--createkey`, round-trips
/// through [`decode_pem`]).
pub fn encode_public_pem(n: &BigUint, e: &BigUint) -> Result<String, KeyError> {
    let key = rsa::RsaPublicKey::new(to_rsa_biguint(n), to_rsa_biguint(e))
        .map_err(|e| KeyError::Malformed(format!("invalid public key components: {e}")))?;

    key.to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| KeyError::Malformed(format!("failed to encode PEM: {e}")))
}
