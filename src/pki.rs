//! Signing and verification of SSH signature blobs.
//!
//! A signature blob is `string algorithm, string signature`. The inner
//! signature format depends on the family:
//!
//! * RSA: PKCS#1 v1.5 signature, SHA-1/SHA-256/SHA-512 per algorithm name
//! * DSA: `r || s`, 20 bytes each, over SHA-1
//! * ECDSA: `mpint r, mpint s`, hash chosen by the curve
//! * Ed25519: the 64 byte signature

use rsa::pkcs1v15::{
    Signature as RsaSignature, SigningKey as RsaSigningKey, VerifyingKey as RsaVerifyingKey,
};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use signature::{DigestSigner, DigestVerifier, SignatureEncoding, Signer, Verifier};

use crate::error::{Result, SshCertError};
use crate::key::{EcdsaCurve, KeyAlgorithm, KeyPair, PublicKey, RsaHash};
use crate::wire;

/// DSA `r` and `s` are each encoded on 160 bits.
const DSA_SIGNATURE_PART: usize = 20;

/// Signature algorithms understood in signature blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    Rsa(RsaHash),
    Dsa,
    Ecdsa(EcdsaCurve),
    Ed25519,
}

impl SignatureAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            SignatureAlgorithm::Rsa(hash) => hash.signature_algorithm(),
            SignatureAlgorithm::Dsa => "ssh-dss",
            SignatureAlgorithm::Ecdsa(curve) => curve.key_type(),
            SignatureAlgorithm::Ed25519 => "ssh-ed25519",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ssh-rsa" => Some(SignatureAlgorithm::Rsa(RsaHash::Sha1)),
            "rsa-sha2-256" => Some(SignatureAlgorithm::Rsa(RsaHash::Sha256)),
            "rsa-sha2-512" => Some(SignatureAlgorithm::Rsa(RsaHash::Sha512)),
            "ssh-dss" => Some(SignatureAlgorithm::Dsa),
            "ssh-ed25519" => Some(SignatureAlgorithm::Ed25519),
            other => match KeyAlgorithm::from_key_type(other) {
                Some(KeyAlgorithm::Ecdsa(curve)) => Some(SignatureAlgorithm::Ecdsa(curve)),
                _ => None,
            },
        }
    }

    /// The key family able to produce and check this signature.
    pub fn key_algorithm(self) -> KeyAlgorithm {
        match self {
            SignatureAlgorithm::Rsa(_) => KeyAlgorithm::Rsa,
            SignatureAlgorithm::Dsa => KeyAlgorithm::Dsa,
            SignatureAlgorithm::Ecdsa(curve) => KeyAlgorithm::Ecdsa(curve),
            SignatureAlgorithm::Ed25519 => KeyAlgorithm::Ed25519,
        }
    }
}

/// A decoded signature blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshSignature {
    pub algorithm: SignatureAlgorithm,
    pub bytes: Vec<u8>,
}

impl SshSignature {
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        let mut blob = Vec::new();
        wire::write_str(&mut blob, self.algorithm.name())?;
        wire::write_bytes(&mut blob, &self.bytes)?;
        Ok(blob)
    }

    /// Parses a signature blob. Anything that is not a well formed blob of a
    /// known algorithm is reported as [`SshCertError::VerificationMalformed`].
    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        let mut reader = blob;
        let name = wire::read_string(&mut reader).map_err(malformed)?;
        let bytes = wire::read_bytes(&mut reader).map_err(malformed)?;
        wire::ensure_consumed(reader, "signature").map_err(malformed)?;
        let algorithm = SignatureAlgorithm::from_name(&name).ok_or_else(|| {
            SshCertError::VerificationMalformed(format!("unknown signature algorithm {name:?}"))
        })?;
        Ok(Self { algorithm, bytes })
    }
}

/// Signs `data` with `key`. `rsa_hash` is only used by RSA keys.
pub fn sign_data(data: &[u8], key: &KeyPair, rsa_hash: RsaHash) -> Result<SshSignature> {
    let (algorithm, bytes) = match key {
        KeyPair::Rsa { private, .. } => {
            let private = (**private).clone();
            let bytes = match rsa_hash {
                RsaHash::Sha1 => RsaSigningKey::<Sha1>::new(private).try_sign(data)?.to_vec(),
                RsaHash::Sha256 => RsaSigningKey::<Sha256>::new(private).try_sign(data)?.to_vec(),
                RsaHash::Sha512 => RsaSigningKey::<Sha512>::new(private).try_sign(data)?.to_vec(),
            };
            (SignatureAlgorithm::Rsa(rsa_hash), bytes)
        }
        KeyPair::Dsa { signing_key } => {
            let signature: dsa::Signature =
                signing_key.try_sign_digest(Sha1::new_with_prefix(data))?;
            let mut bytes = wire::pad_to(&signature.r().to_bytes_be(), DSA_SIGNATURE_PART)?;
            bytes.extend(wire::pad_to(&signature.s().to_bytes_be(), DSA_SIGNATURE_PART)?);
            (SignatureAlgorithm::Dsa, bytes)
        }
        KeyPair::EcdsaP256 { signing_key, .. } => {
            let signature: p256::ecdsa::Signature = signing_key.try_sign(data)?;
            let (r, s) = signature.split_bytes();
            (
                SignatureAlgorithm::Ecdsa(EcdsaCurve::NistP256),
                encode_ecdsa_signature(&r, &s)?,
            )
        }
        KeyPair::EcdsaP384 { signing_key, .. } => {
            let signature: p384::ecdsa::Signature = signing_key.try_sign(data)?;
            let (r, s) = signature.split_bytes();
            (
                SignatureAlgorithm::Ecdsa(EcdsaCurve::NistP384),
                encode_ecdsa_signature(&r, &s)?,
            )
        }
        KeyPair::EcdsaP521 { signing_key, .. } => {
            let signature: p521::ecdsa::Signature = signing_key.try_sign(data)?;
            let (r, s) = signature.split_bytes();
            (
                SignatureAlgorithm::Ecdsa(EcdsaCurve::NistP521),
                encode_ecdsa_signature(&r, &s)?,
            )
        }
        KeyPair::Ed25519 { signing_key } => {
            let signature = signing_key.try_sign(data)?;
            (SignatureAlgorithm::Ed25519, signature.to_bytes().to_vec())
        }
    };

    Ok(SshSignature { algorithm, bytes })
}

/// Verifies a signature blob over `data` with `key`.
///
/// Returns `Ok(false)` for a well formed signature that does not match,
/// including one made by a different key family. Returns
/// [`SshCertError::VerificationMalformed`] when the blob or the signature
/// inside it cannot be interpreted.
pub fn verify_signature(data: &[u8], key: &PublicKey, blob: &[u8]) -> Result<bool> {
    let signature = SshSignature::from_blob(blob)?;
    if signature.algorithm.key_algorithm() != key.algorithm() {
        tracing::debug!(
            signature_algorithm = signature.algorithm.name(),
            key_type = key.key_type(),
            "signature algorithm does not match key"
        );
        return Ok(false);
    }
    let bytes = signature.bytes.as_slice();

    let valid = match (key, signature.algorithm) {
        (PublicKey::Rsa(public), SignatureAlgorithm::Rsa(hash)) => {
            let rsa_signature = decode_rsa_signature(bytes, public)?;
            match hash {
                RsaHash::Sha1 => RsaVerifyingKey::<Sha1>::new(public.clone())
                    .verify(data, &rsa_signature)
                    .is_ok(),
                RsaHash::Sha256 => RsaVerifyingKey::<Sha256>::new(public.clone())
                    .verify(data, &rsa_signature)
                    .is_ok(),
                RsaHash::Sha512 => RsaVerifyingKey::<Sha512>::new(public.clone())
                    .verify(data, &rsa_signature)
                    .is_ok(),
            }
        }
        (PublicKey::Dsa(verifying_key), SignatureAlgorithm::Dsa) => {
            let dsa_signature = decode_dsa_signature(bytes)?;
            verifying_key
                .verify_digest(Sha1::new_with_prefix(data), &dsa_signature)
                .is_ok()
        }
        (PublicKey::EcdsaP256(verifying_key), SignatureAlgorithm::Ecdsa(curve)) => {
            let raw = decode_ecdsa_signature(bytes, curve)?;
            let ecdsa_signature = p256::ecdsa::Signature::from_slice(&raw)
                .map_err(|e| SshCertError::VerificationMalformed(e.to_string()))?;
            verifying_key.verify(data, &ecdsa_signature).is_ok()
        }
        (PublicKey::EcdsaP384(verifying_key), SignatureAlgorithm::Ecdsa(curve)) => {
            let raw = decode_ecdsa_signature(bytes, curve)?;
            let ecdsa_signature = p384::ecdsa::Signature::from_slice(&raw)
                .map_err(|e| SshCertError::VerificationMalformed(e.to_string()))?;
            verifying_key.verify(data, &ecdsa_signature).is_ok()
        }
        (PublicKey::EcdsaP521(verifying_key), SignatureAlgorithm::Ecdsa(curve)) => {
            let raw = decode_ecdsa_signature(bytes, curve)?;
            let ecdsa_signature = p521::ecdsa::Signature::from_slice(&raw)
                .map_err(|e| SshCertError::VerificationMalformed(e.to_string()))?;
            verifying_key.verify(data, &ecdsa_signature).is_ok()
        }
        (PublicKey::Ed25519(verifying_key), SignatureAlgorithm::Ed25519) => {
            let ed_signature = ed25519_dalek::Signature::from_slice(bytes)
                .map_err(|e| SshCertError::VerificationMalformed(e.to_string()))?;
            verifying_key.verify(data, &ed_signature).is_ok()
        }
        _ => false,
    };

    Ok(valid)
}

fn encode_ecdsa_signature(r: &[u8], s: &[u8]) -> Result<Vec<u8>> {
    let mut inner = Vec::new();
    wire::write_mpint(&mut inner, r)?;
    wire::write_mpint(&mut inner, s)?;
    Ok(inner)
}

/// Turns `mpint r, mpint s` into the fixed width `r || s` form.
fn decode_ecdsa_signature(bytes: &[u8], curve: EcdsaCurve) -> Result<Vec<u8>> {
    let mut reader = bytes;
    let r = wire::read_mpint(&mut reader).map_err(malformed)?;
    let s = wire::read_mpint(&mut reader).map_err(malformed)?;
    wire::ensure_consumed(reader, "ECDSA signature").map_err(malformed)?;

    let mut raw = wire::pad_to(&r, curve.field_size()).map_err(malformed)?;
    raw.extend(wire::pad_to(&s, curve.field_size()).map_err(malformed)?);
    Ok(raw)
}

/// Checks that an RSA signature is a residue modulo `n` on exactly the
/// modulus length.
fn decode_rsa_signature(bytes: &[u8], public: &RsaPublicKey) -> Result<RsaSignature> {
    if bytes.len() != public.size() {
        return Err(SshCertError::VerificationMalformed(format!(
            "RSA signature is {} bytes, modulus is {}",
            bytes.len(),
            public.size()
        )));
    }
    if BigUint::from_bytes_be(bytes) >= *public.n() {
        return Err(SshCertError::VerificationMalformed(
            "RSA signature is not below the modulus".to_string(),
        ));
    }
    RsaSignature::try_from(bytes).map_err(|e| SshCertError::VerificationMalformed(e.to_string()))
}

/// Turns the 40 byte `r || s` form into a DSA signature.
fn decode_dsa_signature(bytes: &[u8]) -> Result<dsa::Signature> {
    if bytes.len() != 2 * DSA_SIGNATURE_PART {
        return Err(SshCertError::VerificationMalformed(format!(
            "DSA signatures are {} bytes, got {}",
            2 * DSA_SIGNATURE_PART,
            bytes.len()
        )));
    }
    let (r, s) = bytes.split_at(DSA_SIGNATURE_PART);
    dsa::Signature::from_components(
        dsa::BigUint::from_bytes_be(r),
        dsa::BigUint::from_bytes_be(s),
    )
    .map_err(|e| SshCertError::VerificationMalformed(e.to_string()))
}

fn malformed(err: SshCertError) -> SshCertError {
    match err {
        SshCertError::VerificationMalformed(_) => err,
        other => SshCertError::VerificationMalformed(other.to_string()),
    }
}
