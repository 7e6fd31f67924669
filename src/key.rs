use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use ed25519_dalek::{SigningKey as Ed25519SigningKey, VerifyingKey as Ed25519VerifyingKey};
use p256::ecdsa::{SigningKey as P256SigningKey, VerifyingKey as P256VerifyingKey};
use p384::ecdsa::{SigningKey as P384SigningKey, VerifyingKey as P384VerifyingKey};
use p521::ecdsa::{SigningKey as P521SigningKey, VerifyingKey as P521VerifyingKey};
use pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::error::{Result, SshCertError};
use crate::wire;

/// Largest RSA modulus accepted from the wire, matching OpenSSH.
const RSA_MAX_BITS: usize = 16384;

/// NIST curves usable for ECDSA keys and certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcdsaCurve {
    NistP256,
    NistP384,
    NistP521,
}

impl EcdsaCurve {
    /// Curve identifier as it appears inside public key blobs, e.g. `nistp256`.
    pub fn identifier(self) -> &'static str {
        match self {
            EcdsaCurve::NistP256 => "nistp256",
            EcdsaCurve::NistP384 => "nistp384",
            EcdsaCurve::NistP521 => "nistp521",
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            "nistp256" => Some(EcdsaCurve::NistP256),
            "nistp384" => Some(EcdsaCurve::NistP384),
            "nistp521" => Some(EcdsaCurve::NistP521),
            _ => None,
        }
    }

    pub fn key_size(self) -> u32 {
        match self {
            EcdsaCurve::NistP256 => 256,
            EcdsaCurve::NistP384 => 384,
            EcdsaCurve::NistP521 => 521,
        }
    }

    /// SSH key type, e.g. `ecdsa-sha2-nistp256`.
    pub fn key_type(self) -> &'static str {
        match self {
            EcdsaCurve::NistP256 => "ecdsa-sha2-nistp256",
            EcdsaCurve::NistP384 => "ecdsa-sha2-nistp384",
            EcdsaCurve::NistP521 => "ecdsa-sha2-nistp521",
        }
    }

    /// Size in bytes of a field element (and of `r`/`s` in a signature).
    pub(crate) fn field_size(self) -> usize {
        match self {
            EcdsaCurve::NistP256 => 32,
            EcdsaCurve::NistP384 => 48,
            EcdsaCurve::NistP521 => 66,
        }
    }
}

/// Hash used for RSA PKCS#1 v1.5 signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RsaHash {
    Sha1,
    Sha256,
    #[default]
    Sha512,
}

impl RsaHash {
    /// SSH signature algorithm name for this hash.
    pub fn signature_algorithm(self) -> &'static str {
        match self {
            RsaHash::Sha1 => "ssh-rsa",
            RsaHash::Sha256 => "rsa-sha2-256",
            RsaHash::Sha512 => "rsa-sha2-512",
        }
    }
}

/// Key algorithm families, with the curve for ECDSA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Rsa,
    Dsa,
    Ecdsa(EcdsaCurve),
    Ed25519,
}

impl KeyAlgorithm {
    /// SSH key type name, e.g. `ssh-ed25519`.
    pub fn key_type(self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa => "ssh-rsa",
            KeyAlgorithm::Dsa => "ssh-dss",
            KeyAlgorithm::Ecdsa(curve) => curve.key_type(),
            KeyAlgorithm::Ed25519 => "ssh-ed25519",
        }
    }

    pub fn from_key_type(key_type: &str) -> Option<Self> {
        match key_type {
            "ssh-rsa" => Some(KeyAlgorithm::Rsa),
            "ssh-dss" => Some(KeyAlgorithm::Dsa),
            "ecdsa-sha2-nistp256" => Some(KeyAlgorithm::Ecdsa(EcdsaCurve::NistP256)),
            "ecdsa-sha2-nistp384" => Some(KeyAlgorithm::Ecdsa(EcdsaCurve::NistP384)),
            "ecdsa-sha2-nistp521" => Some(KeyAlgorithm::Ecdsa(EcdsaCurve::NistP521)),
            "ssh-ed25519" => Some(KeyAlgorithm::Ed25519),
            _ => None,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_type())
    }
}

/// Supported key pairs for signing certificates.
#[derive(Clone)]
pub enum KeyPair {
    Rsa {
        private: Box<RsaPrivateKey>,
        public: RsaPublicKey,
    },
    Dsa {
        signing_key: Box<dsa::SigningKey>,
    },
    EcdsaP256 {
        signing_key: P256SigningKey,
        verifying_key: P256VerifyingKey,
    },
    EcdsaP384 {
        signing_key: P384SigningKey,
        verifying_key: P384VerifyingKey,
    },
    EcdsaP521 {
        signing_key: P521SigningKey,
        verifying_key: P521VerifyingKey,
    },
    Ed25519 {
        signing_key: Ed25519SigningKey,
    },
}

impl KeyPair {
    /// Generate an RSA key pair with the specified number of bits.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)?;
        let public = RsaPublicKey::from(&private);
        Ok(KeyPair::Rsa {
            private: Box::new(private),
            public,
        })
    }

    /// Generate a DSA key pair with 1024-bit `p` and 160-bit `q`, the only size OpenSSH accepts.
    #[allow(deprecated)]
    pub fn generate_dsa() -> Self {
        let mut rng = rand_core::OsRng;
        let components = dsa::Components::generate(&mut rng, dsa::KeySize::DSA_1024_160);
        let signing_key = dsa::SigningKey::generate(&mut rng, components);
        KeyPair::Dsa {
            signing_key: Box::new(signing_key),
        }
    }

    /// Generate an ECDSA key pair on the given curve.
    pub fn generate_ecdsa(curve: EcdsaCurve) -> Self {
        match curve {
            EcdsaCurve::NistP256 => Self::generate_ecdsa_p256(),
            EcdsaCurve::NistP384 => Self::generate_ecdsa_p384(),
            EcdsaCurve::NistP521 => Self::generate_ecdsa_p521(),
        }
    }

    /// Generate an ECDSA P-256 key pair.
    pub fn generate_ecdsa_p256() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = P256SigningKey::random(&mut rng);
        let verifying_key = P256VerifyingKey::from(&signing_key);
        KeyPair::EcdsaP256 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an ECDSA P-384 key pair.
    pub fn generate_ecdsa_p384() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = P384SigningKey::random(&mut rng);
        let verifying_key = P384VerifyingKey::from(&signing_key);
        KeyPair::EcdsaP384 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an ECDSA P-521 key pair.
    pub fn generate_ecdsa_p521() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = P521SigningKey::random(&mut rng);
        let verifying_key = P521VerifyingKey::from(&signing_key);
        KeyPair::EcdsaP521 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an Ed25519 key pair.
    pub fn generate_ed25519() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key: Ed25519SigningKey = Ed25519SigningKey::generate(&mut rng);
        KeyPair::Ed25519 { signing_key }
    }

    /// Rebuild an RSA key pair from its numbers, all big-endian.
    pub fn rsa_from_components(n: &[u8], e: &[u8], d: &[u8], p: &[u8], q: &[u8]) -> Result<Self> {
        let private = RsaPrivateKey::from_components(
            BigUint::from_bytes_be(n),
            BigUint::from_bytes_be(e),
            BigUint::from_bytes_be(d),
            vec![BigUint::from_bytes_be(p), BigUint::from_bytes_be(q)],
        )?;
        private.validate()?;
        let public = RsaPublicKey::from(&private);
        Ok(KeyPair::Rsa {
            private: Box::new(private),
            public,
        })
    }

    /// Rebuild a DSA key pair from its domain parameters, public value `y` and private value `x`.
    pub fn dsa_from_components(p: &[u8], q: &[u8], g: &[u8], y: &[u8], x: &[u8]) -> Result<Self> {
        let verifying_key = dsa_verifying_key(p, q, g, y)?;
        let signing_key =
            dsa::SigningKey::from_components(verifying_key, dsa::BigUint::from_bytes_be(x))?;
        Ok(KeyPair::Dsa {
            signing_key: Box::new(signing_key),
        })
    }

    /// Rebuild an ECDSA key pair from its big-endian private scalar.
    pub fn ecdsa_from_private_scalar(curve: EcdsaCurve, scalar: &[u8]) -> Result<Self> {
        let invalid = |e: &dyn fmt::Display| SshCertError::Key(format!("invalid {curve:?} scalar: {e}"));
        match curve {
            EcdsaCurve::NistP256 => {
                let secret = p256::SecretKey::from_slice(scalar).map_err(|e| invalid(&e))?;
                let signing_key =
                    P256SigningKey::from_bytes(&secret.to_bytes()).map_err(|e| invalid(&e))?;
                let verifying_key = P256VerifyingKey::from(&signing_key);
                Ok(KeyPair::EcdsaP256 {
                    signing_key,
                    verifying_key,
                })
            }
            EcdsaCurve::NistP384 => {
                let secret = p384::SecretKey::from_slice(scalar).map_err(|e| invalid(&e))?;
                let signing_key =
                    P384SigningKey::from_bytes(&secret.to_bytes()).map_err(|e| invalid(&e))?;
                let verifying_key = P384VerifyingKey::from(&signing_key);
                Ok(KeyPair::EcdsaP384 {
                    signing_key,
                    verifying_key,
                })
            }
            EcdsaCurve::NistP521 => {
                let secret = p521::SecretKey::from_slice(scalar).map_err(|e| invalid(&e))?;
                let signing_key =
                    P521SigningKey::from_bytes(&secret.to_bytes()).map_err(|e| invalid(&e))?;
                let verifying_key = P521VerifyingKey::from(&signing_key);
                Ok(KeyPair::EcdsaP521 {
                    signing_key,
                    verifying_key,
                })
            }
        }
    }

    /// Rebuild an Ed25519 key pair from its 32-byte seed.
    pub fn ed25519_from_bytes(seed: &[u8; 32]) -> Self {
        KeyPair::Ed25519 {
            signing_key: Ed25519SigningKey::from_bytes(seed),
        }
    }

    /// Import an unencrypted PKCS#8 PEM private key of any supported family.
    pub fn import_from_pkcs8_pem(pem: &str) -> Result<Self> {
        if let Ok(private) = RsaPrivateKey::from_pkcs8_pem(pem) {
            let public = RsaPublicKey::from(&private);
            return Ok(KeyPair::Rsa {
                private: Box::new(private),
                public,
            });
        }
        if let Ok(signing_key) = Ed25519SigningKey::from_pkcs8_pem(pem) {
            return Ok(KeyPair::Ed25519 { signing_key });
        }
        if let Ok(secret) = p256::SecretKey::from_pkcs8_pem(pem) {
            return Self::ecdsa_from_private_scalar(EcdsaCurve::NistP256, &secret.to_bytes());
        }
        if let Ok(secret) = p384::SecretKey::from_pkcs8_pem(pem) {
            return Self::ecdsa_from_private_scalar(EcdsaCurve::NistP384, &secret.to_bytes());
        }
        if let Ok(secret) = p521::SecretKey::from_pkcs8_pem(pem) {
            return Self::ecdsa_from_private_scalar(EcdsaCurve::NistP521, &secret.to_bytes());
        }
        let signing_key = dsa::SigningKey::from_pkcs8_pem(pem)?;
        Ok(KeyPair::Dsa {
            signing_key: Box::new(signing_key),
        })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            KeyPair::Rsa { .. } => KeyAlgorithm::Rsa,
            KeyPair::Dsa { .. } => KeyAlgorithm::Dsa,
            KeyPair::EcdsaP256 { .. } => KeyAlgorithm::Ecdsa(EcdsaCurve::NistP256),
            KeyPair::EcdsaP384 { .. } => KeyAlgorithm::Ecdsa(EcdsaCurve::NistP384),
            KeyPair::EcdsaP521 { .. } => KeyAlgorithm::Ecdsa(EcdsaCurve::NistP521),
            KeyPair::Ed25519 { .. } => KeyAlgorithm::Ed25519,
        }
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> PublicKey {
        match self {
            KeyPair::Rsa { public, .. } => PublicKey::Rsa(public.clone()),
            KeyPair::Dsa { signing_key } => PublicKey::Dsa(signing_key.verifying_key().clone()),
            KeyPair::EcdsaP256 { verifying_key, .. } => PublicKey::EcdsaP256(*verifying_key),
            KeyPair::EcdsaP384 { verifying_key, .. } => PublicKey::EcdsaP384(*verifying_key),
            KeyPair::EcdsaP521 { verifying_key, .. } => {
                PublicKey::EcdsaP521(verifying_key.clone())
            }
            KeyPair::Ed25519 { signing_key } => PublicKey::Ed25519(signing_key.verifying_key()),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm())
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// A public key of any supported family.
#[derive(Clone)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    Dsa(dsa::VerifyingKey),
    EcdsaP256(P256VerifyingKey),
    EcdsaP384(P384VerifyingKey),
    EcdsaP521(P521VerifyingKey),
    Ed25519(Ed25519VerifyingKey),
}

impl PublicKey {
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        key_pair.public_key()
    }

    /// Build an RSA public key from its big-endian exponent and modulus.
    pub fn rsa_from_components(e: &[u8], n: &[u8]) -> Result<Self> {
        let key = RsaPublicKey::new_with_max_size(
            BigUint::from_bytes_be(n),
            BigUint::from_bytes_be(e),
            RSA_MAX_BITS,
        )?;
        Ok(PublicKey::Rsa(key))
    }

    /// Build a DSA public key from its domain parameters and public value.
    pub fn dsa_from_components(p: &[u8], q: &[u8], g: &[u8], y: &[u8]) -> Result<Self> {
        Ok(PublicKey::Dsa(dsa_verifying_key(p, q, g, y)?))
    }

    /// Build an ECDSA public key from its big-endian affine coordinates.
    pub fn ecdsa_from_coordinates(curve: EcdsaCurve, x: &[u8], y: &[u8]) -> Result<Self> {
        let width = curve.field_size();
        let mut sec1 = Vec::with_capacity(1 + 2 * width);
        sec1.push(0x04);
        sec1.extend(wire::pad_to(x, width).map_err(|e| SshCertError::Key(e.to_string()))?);
        sec1.extend(wire::pad_to(y, width).map_err(|e| SshCertError::Key(e.to_string()))?);
        Self::ecdsa_from_sec1(curve, &sec1)
    }

    /// Build an ECDSA public key from a SEC1-encoded point.
    pub fn ecdsa_from_sec1(curve: EcdsaCurve, point: &[u8]) -> Result<Self> {
        let invalid = |e: &dyn fmt::Display| SshCertError::Key(format!("invalid {curve:?} point: {e}"));
        Ok(match curve {
            EcdsaCurve::NistP256 => PublicKey::EcdsaP256(
                P256VerifyingKey::from_sec1_bytes(point).map_err(|e| invalid(&e))?,
            ),
            EcdsaCurve::NistP384 => PublicKey::EcdsaP384(
                P384VerifyingKey::from_sec1_bytes(point).map_err(|e| invalid(&e))?,
            ),
            EcdsaCurve::NistP521 => PublicKey::EcdsaP521(
                P521VerifyingKey::from_sec1_bytes(point).map_err(|e| invalid(&e))?,
            ),
        })
    }

    /// Build an Ed25519 public key from its 32 raw bytes.
    pub fn ed25519_from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; 32] = bytes.try_into().map_err(|_| {
            SshCertError::Key(format!("Ed25519 keys are 32 bytes, got {}", bytes.len()))
        })?;
        let key = Ed25519VerifyingKey::from_bytes(&raw)
            .map_err(|e| SshCertError::Key(e.to_string()))?;
        Ok(PublicKey::Ed25519(key))
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PublicKey::Rsa(_) => KeyAlgorithm::Rsa,
            PublicKey::Dsa(_) => KeyAlgorithm::Dsa,
            PublicKey::EcdsaP256(_) => KeyAlgorithm::Ecdsa(EcdsaCurve::NistP256),
            PublicKey::EcdsaP384(_) => KeyAlgorithm::Ecdsa(EcdsaCurve::NistP384),
            PublicKey::EcdsaP521(_) => KeyAlgorithm::Ecdsa(EcdsaCurve::NistP521),
            PublicKey::Ed25519(_) => KeyAlgorithm::Ed25519,
        }
    }

    /// SSH key type name, e.g. `ssh-rsa`.
    pub fn key_type(&self) -> &'static str {
        self.algorithm().key_type()
    }

    /// Writes the algorithm-specific key fields, without the leading key type.
    ///
    /// This is the encoding embedded in a certificate header, where the
    /// certificate type tag takes the place of the key type.
    pub fn encode_fields(&self, writer: &mut Vec<u8>) -> Result<()> {
        match self {
            PublicKey::Rsa(key) => {
                wire::write_mpint(writer, &key.e().to_bytes_be())?;
                wire::write_mpint(writer, &key.n().to_bytes_be())
            }
            PublicKey::Dsa(key) => {
                let components = key.components();
                wire::write_mpint(writer, &components.p().to_bytes_be())?;
                wire::write_mpint(writer, &components.q().to_bytes_be())?;
                wire::write_mpint(writer, &components.g().to_bytes_be())?;
                wire::write_mpint(writer, &key.y().to_bytes_be())
            }
            PublicKey::EcdsaP256(key) => {
                wire::write_str(writer, EcdsaCurve::NistP256.identifier())?;
                wire::write_bytes(writer, key.to_encoded_point(false).as_bytes())
            }
            PublicKey::EcdsaP384(key) => {
                wire::write_str(writer, EcdsaCurve::NistP384.identifier())?;
                wire::write_bytes(writer, key.to_encoded_point(false).as_bytes())
            }
            PublicKey::EcdsaP521(key) => {
                wire::write_str(writer, EcdsaCurve::NistP521.identifier())?;
                wire::write_bytes(writer, key.to_encoded_point(false).as_bytes())
            }
            PublicKey::Ed25519(key) => wire::write_bytes(writer, key.as_bytes()),
        }
    }

    /// Reads the algorithm-specific key fields for `algorithm`, advancing `reader`.
    ///
    /// Keys that parse on the wire but are not valid keys are format errors.
    pub fn decode_fields(algorithm: KeyAlgorithm, reader: &mut &[u8]) -> Result<Self> {
        let as_format = |e: SshCertError| SshCertError::Format(format!("invalid {algorithm} key: {e}"));
        match algorithm {
            KeyAlgorithm::Rsa => {
                let e = wire::read_mpint(reader)?;
                let n = wire::read_mpint(reader)?;
                Self::rsa_from_components(&e, &n).map_err(as_format)
            }
            KeyAlgorithm::Dsa => {
                let p = wire::read_mpint(reader)?;
                let q = wire::read_mpint(reader)?;
                let g = wire::read_mpint(reader)?;
                let y = wire::read_mpint(reader)?;
                Self::dsa_from_components(&p, &q, &g, &y).map_err(as_format)
            }
            KeyAlgorithm::Ecdsa(curve) => {
                let identifier = wire::read_string(reader)?;
                if identifier != curve.identifier() {
                    return Err(SshCertError::Format(format!(
                        "curve {identifier:?} does not match {}",
                        curve.key_type()
                    )));
                }
                let point = wire::read_bytes(reader)?;
                if point.first() != Some(&0x04) {
                    return Err(SshCertError::Format(
                        "ECDSA points must be uncompressed".to_string(),
                    ));
                }
                Self::ecdsa_from_sec1(curve, &point).map_err(as_format)
            }
            KeyAlgorithm::Ed25519 => {
                let raw = wire::read_bytes(reader)?;
                Self::ed25519_from_bytes(&raw).map_err(as_format)
            }
        }
    }

    /// The full SSH public key blob: key type followed by the key fields.
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        let mut blob = Vec::new();
        wire::write_str(&mut blob, self.key_type())?;
        self.encode_fields(&mut blob)?;
        Ok(blob)
    }

    /// Parses a full SSH public key blob, which must be consumed entirely.
    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        let mut reader = blob;
        let key_type = wire::read_string(&mut reader)?;
        let algorithm = KeyAlgorithm::from_key_type(&key_type)
            .ok_or_else(|| SshCertError::Format(format!("unknown key type {key_type:?}")))?;
        let key = Self::decode_fields(algorithm, &mut reader)?;
        wire::ensure_consumed(reader, "public key")?;
        Ok(key)
    }

    /// Exports the key as an OpenSSH `authorized_keys` style line.
    pub fn to_openssh(&self, comment: Option<&str>) -> Result<String> {
        let encoded = STANDARD.encode(self.to_blob()?);
        Ok(match comment {
            Some(comment) if !comment.is_empty() => {
                format!("{} {encoded} {comment}", self.key_type())
            }
            _ => format!("{} {encoded}", self.key_type()),
        })
    }

    /// Parses an OpenSSH public key line (`<type> <base64> [comment]`).
    pub fn from_openssh(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let (Some(key_type), Some(encoded)) = (parts.next(), parts.next()) else {
            return Err(SshCertError::Format(
                "expected \"<type> <base64> [comment]\"".to_string(),
            ));
        };
        let key = Self::from_blob(&STANDARD.decode(encoded)?)?;
        if key.key_type() != key_type {
            return Err(SshCertError::Format(format!(
                "key type {key_type:?} does not match encoded {}",
                key.key_type()
            )));
        }
        Ok(key)
    }

    /// SHA-256 fingerprint in the `SHA256:<base64>` form printed by `ssh-keygen -l`.
    pub fn fingerprint(&self) -> Result<String> {
        let digest = Sha256::digest(self.to_blob()?);
        Ok(format!("SHA256:{}", STANDARD_NO_PAD.encode(digest)))
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_blob(), other.to_blob()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PublicKey {}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("PublicKey");
        tuple.field(&self.key_type());
        match self.fingerprint() {
            Ok(fingerprint) => tuple.field(&fingerprint),
            Err(_) => tuple.field(&"<unencodable>"),
        };
        tuple.finish()
    }
}

impl From<&KeyPair> for PublicKey {
    fn from(key_pair: &KeyPair) -> Self {
        key_pair.public_key()
    }
}

fn dsa_verifying_key(p: &[u8], q: &[u8], g: &[u8], y: &[u8]) -> Result<dsa::VerifyingKey> {
    let components = dsa::Components::from_components(
        dsa::BigUint::from_bytes_be(p),
        dsa::BigUint::from_bytes_be(q),
        dsa::BigUint::from_bytes_be(g),
    )?;
    Ok(dsa::VerifyingKey::from_components(
        components,
        dsa::BigUint::from_bytes_be(y),
    )?)
}
