//! Certificate variants and the table mapping wire type tags to them.

use std::fmt;

use crate::error::{Result, SshCertError};
use crate::key::{EcdsaCurve, KeyAlgorithm, PublicKey, RsaHash};

/// The certificate flavours, one per subject key family.
///
/// RSA certificates also carry the hash named by their tag. The hash selects
/// the tag and is the default hash for signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertVariant {
    Rsa(RsaHash),
    Dsa,
    Ecdsa(EcdsaCurve),
    Ed25519,
}

/// Every supported `(tag, variant)` pair.
static REGISTRY: [(&str, CertVariant); 8] = [
    ("ssh-rsa-cert-v01@openssh.com", CertVariant::Rsa(RsaHash::Sha1)),
    ("rsa-sha2-256-cert-v01@openssh.com", CertVariant::Rsa(RsaHash::Sha256)),
    ("rsa-sha2-512-cert-v01@openssh.com", CertVariant::Rsa(RsaHash::Sha512)),
    ("ssh-dss-cert-v01@openssh.com", CertVariant::Dsa),
    (
        "ecdsa-sha2-nistp256-cert-v01@openssh.com",
        CertVariant::Ecdsa(EcdsaCurve::NistP256),
    ),
    (
        "ecdsa-sha2-nistp384-cert-v01@openssh.com",
        CertVariant::Ecdsa(EcdsaCurve::NistP384),
    ),
    (
        "ecdsa-sha2-nistp521-cert-v01@openssh.com",
        CertVariant::Ecdsa(EcdsaCurve::NistP521),
    ),
    ("ssh-ed25519-cert-v01@openssh.com", CertVariant::Ed25519),
];

impl CertVariant {
    pub fn rsa(hash: RsaHash) -> Self {
        CertVariant::Rsa(hash)
    }

    pub fn dsa() -> Self {
        CertVariant::Dsa
    }

    pub fn ecdsa(curve: EcdsaCurve) -> Self {
        CertVariant::Ecdsa(curve)
    }

    pub fn ed25519() -> Self {
        CertVariant::Ed25519
    }

    /// All variants in registry order.
    pub fn all() -> impl Iterator<Item = CertVariant> {
        REGISTRY.iter().map(|(_, variant)| *variant)
    }

    /// Looks up the variant for a wire type tag.
    pub fn resolve(tag: &str) -> Result<Self> {
        REGISTRY
            .iter()
            .find(|(known, _)| *known == tag)
            .map(|(_, variant)| *variant)
            .ok_or_else(|| SshCertError::Format(format!("unknown certificate type {tag:?}")))
    }

    pub fn type_tag(self) -> &'static str {
        REGISTRY
            .iter()
            .find(|(_, variant)| *variant == self)
            .map(|(tag, _)| *tag)
            .unwrap_or_default()
    }

    pub fn key_algorithm(self) -> KeyAlgorithm {
        match self {
            CertVariant::Rsa(_) => KeyAlgorithm::Rsa,
            CertVariant::Dsa => KeyAlgorithm::Dsa,
            CertVariant::Ecdsa(curve) => KeyAlgorithm::Ecdsa(curve),
            CertVariant::Ed25519 => KeyAlgorithm::Ed25519,
        }
    }

    /// Hash used for RSA signatures when the signing options leave it open.
    pub fn rsa_hash(self) -> Option<RsaHash> {
        match self {
            CertVariant::Rsa(hash) => Some(hash),
            _ => None,
        }
    }

    /// The default variant for a subject key. RSA keys get SHA-512.
    pub fn for_public_key(key: &PublicKey) -> Self {
        Self::for_algorithm(key.algorithm())
    }

    pub fn for_algorithm(algorithm: KeyAlgorithm) -> Self {
        match algorithm {
            KeyAlgorithm::Rsa => CertVariant::Rsa(RsaHash::default()),
            KeyAlgorithm::Dsa => CertVariant::Dsa,
            KeyAlgorithm::Ecdsa(curve) => CertVariant::Ecdsa(curve),
            KeyAlgorithm::Ed25519 => CertVariant::Ed25519,
        }
    }

    /// Whether `key` can be the subject of a certificate of this variant.
    pub fn accepts(self, key: &PublicKey) -> bool {
        key.algorithm() == self.key_algorithm()
    }

    /// Decodes the subject public key fields that follow the nonce.
    pub fn decode_public_key(self, reader: &mut &[u8]) -> Result<PublicKey> {
        PublicKey::decode_fields(self.key_algorithm(), reader)
    }
}

impl fmt::Display for CertVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_tag())
    }
}
