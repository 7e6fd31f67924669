pub mod fields;
pub mod params;
pub mod variant;

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand_core::{OsRng, RngCore};
use tracing::{debug, trace};

use crate::error::{Result, SignabilityCause, SignabilityError, SshCertError};
use crate::key::{KeyPair, PublicKey};
use crate::pki::{self, SshSignature};
use crate::wire;
use fields::{CertField, CertType, FieldValue, OptionMap, Timestamp};
use params::SigningOptions;
use variant::CertVariant;

/// Length of the nonce generated for new certificates.
const NONCE_LEN: usize = 32;

/// Shortest nonce accepted when signing.
const MIN_NONCE_LEN: usize = 16;

/// The CA bound to a certificate. Decoded certificates only know the public
/// half until a key pair is attached with [`Certificate::set_ca`].
#[derive(Debug, Clone)]
struct CaKey {
    public: PublicKey,
    key_pair: Option<Arc<KeyPair>>,
}

/// An OpenSSH certificate (`*-cert-v01@openssh.com`).
///
/// The signed layout is the header (type tag, nonce, subject key fields),
/// the body fields in [`CertField::ORDER`], an empty reserved string and the
/// CA public key. The signature blob follows and is not covered by itself.
///
/// # Field assignment
///
/// A body field that holds a non-empty value cannot be changed: later calls
/// to [`Certificate::set_field`] are silently ignored. This guards values
/// assigned early in piecewise construction, but it also means a decoded
/// certificate cannot be edited, and a wrong value that was assigned
/// first wins over a later correction. Empty values (an empty string, list
/// or map) can still be replaced.
#[derive(Debug, Clone)]
pub struct Certificate {
    variant: CertVariant,
    nonce: Vec<u8>,
    public_key: PublicKey,
    body: [Option<FieldValue>; CertField::ORDER.len()],
    ca: Option<CaKey>,
    signature: Option<Vec<u8>>,
}

impl Certificate {
    /// Creates an unsigned certificate for `subject`.
    ///
    /// `overrides` assigns body fields by name, for instance from a
    /// [`params::CertificateParams`]. A name that is not a body field fails
    /// with [`SshCertError::InvalidField`].
    pub fn create<I, N, V>(subject: PublicKey, ca: Option<Arc<KeyPair>>, overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<FieldValue>,
    {
        let variant = CertVariant::for_public_key(&subject);
        Self::create_with_variant(variant, subject, ca, overrides)
    }

    /// Like [`Certificate::create`] with an explicit variant, for example an
    /// RSA certificate tagged `rsa-sha2-256-cert-v01@openssh.com`.
    pub fn create_with_variant<I, N, V>(
        variant: CertVariant,
        subject: PublicKey,
        ca: Option<Arc<KeyPair>>,
        overrides: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<FieldValue>,
    {
        if !variant.accepts(&subject) {
            return Err(SshCertError::KeyMismatch(format!(
                "{variant} cannot certify a {} key",
                subject.key_type()
            )));
        }

        let mut nonce = vec![0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let mut cert = Self {
            variant,
            nonce,
            public_key: subject,
            body: Default::default(),
            ca: None,
            signature: None,
        };

        for (name, value) in overrides {
            cert.set_field(name.as_ref(), value)?;
        }
        if let Some(ca) = ca {
            cert.set_ca(ca);
        }

        debug!(variant = %cert.variant, "created certificate");
        Ok(cert)
    }

    /// Parses a binary certificate.
    ///
    /// The type tag on the wire selects the variant. A `hint` only checks
    /// that the tag belongs to the expected key family. The whole input must
    /// be consumed. The reserved string is read and discarded.
    pub fn decode(bytes: &[u8], hint: Option<CertVariant>) -> Result<Self> {
        let mut reader = bytes;

        let tag = wire::read_string(&mut reader)?;
        let variant = CertVariant::resolve(&tag)?;
        if let Some(hint) = hint {
            if hint.key_algorithm() != variant.key_algorithm() {
                return Err(SshCertError::Format(format!(
                    "expected a {hint} certificate, found {tag}"
                )));
            }
        }

        let nonce = wire::read_bytes(&mut reader)?;
        let public_key = variant.decode_public_key(&mut reader)?;

        let mut body: [Option<FieldValue>; CertField::ORDER.len()] = Default::default();
        for field in CertField::ORDER {
            body[field.index()] = Some(field.kind().decode(&mut reader)?);
        }

        wire::read_bytes(&mut reader)?;
        let ca_blob = wire::read_bytes(&mut reader)?;
        let ca_public = PublicKey::from_blob(&ca_blob)?;
        let signature = wire::read_bytes(&mut reader)?;
        wire::ensure_consumed(reader, "certificate")?;

        debug!(%variant, "decoded certificate");
        Ok(Self {
            variant,
            nonce,
            public_key,
            body,
            ca: Some(CaKey {
                public: ca_public,
                key_pair: None,
            }),
            signature: Some(signature),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::decode(bytes, None)
    }

    /// Parses the OpenSSH text form `<tag> <base64> [comment]`.
    pub fn from_openssh(text: &str) -> Result<Self> {
        Ok(Self::parse_openssh(text)?.0)
    }

    /// Parses the OpenSSH text form and also returns its comment.
    ///
    /// The comment is everything after the second space, kept as written
    /// apart from the line ending.
    pub fn parse_openssh(text: &str) -> Result<(Self, Option<String>)> {
        let line = text.trim_start().trim_end_matches(['\r', '\n']);
        let mut parts = line.splitn(3, ' ');
        let (Some(tag), Some(encoded)) = (parts.next(), parts.next()) else {
            return Err(SshCertError::Format(
                "expected \"<type> <base64> [comment]\"".to_string(),
            ));
        };
        let encoded = encoded.trim_end();
        let comment = parts.next().unwrap_or_default();

        let cert = Self::from_bytes(&STANDARD.decode(encoded)?)?;
        if cert.variant.type_tag() != tag {
            return Err(SshCertError::Format(format!(
                "text tag {tag:?} does not match encoded {}",
                cert.variant
            )));
        }
        Ok((cert, (!comment.is_empty()).then(|| comment.to_string())))
    }

    /// Assigns a body field by name. Ignored when the field already holds a
    /// non-empty value.
    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        let field = CertField::from_name(name)?;
        self.set_value(field, value)
    }

    /// Assigns a body field. Ignored when the field already holds a
    /// non-empty value.
    pub fn set_value(&mut self, field: CertField, value: impl Into<FieldValue>) -> Result<()> {
        let value = field.kind().coerce(value.into())?;
        let slot = &mut self.body[field.index()];
        if slot.as_ref().is_some_and(|current| !current.is_empty()) {
            trace!(%field, "field already set, keeping the first value");
        } else {
            *slot = Some(value);
        }
        Ok(())
    }

    /// Reads a body field by name. `Ok(None)` means the field was never
    /// assigned.
    pub fn get_field(&self, name: &str) -> Result<Option<&FieldValue>> {
        Ok(self.get_value(CertField::from_name(name)?))
    }

    pub fn get_value(&self, field: CertField) -> Option<&FieldValue> {
        self.body[field.index()].as_ref()
    }

    pub fn serial(&self) -> Option<u64> {
        match self.get_value(CertField::Serial) {
            Some(FieldValue::Uint64(serial)) => Some(*serial),
            _ => None,
        }
    }

    pub fn cert_type(&self) -> Option<CertType> {
        match self.get_value(CertField::CertType) {
            Some(FieldValue::CertType(cert_type)) => Some(*cert_type),
            _ => None,
        }
    }

    pub fn key_id(&self) -> Option<&str> {
        match self.get_value(CertField::KeyId) {
            Some(FieldValue::String(key_id)) => Some(key_id),
            _ => None,
        }
    }

    pub fn principals(&self) -> Option<&[String]> {
        match self.get_value(CertField::Principals) {
            Some(FieldValue::StringList(principals)) => Some(principals),
            _ => None,
        }
    }

    pub fn valid_after(&self) -> Option<Timestamp> {
        self.timestamp(CertField::ValidAfter)
    }

    pub fn valid_before(&self) -> Option<Timestamp> {
        self.timestamp(CertField::ValidBefore)
    }

    pub fn critical_options(&self) -> Option<&OptionMap> {
        self.option_map(CertField::CriticalOptions)
    }

    pub fn extensions(&self) -> Option<&OptionMap> {
        self.option_map(CertField::Extensions)
    }

    fn timestamp(&self, field: CertField) -> Option<Timestamp> {
        match self.get_value(field) {
            Some(FieldValue::Timestamp(timestamp)) => Some(*timestamp),
            _ => None,
        }
    }

    fn option_map(&self, field: CertField) -> Option<&OptionMap> {
        match self.get_value(field) {
            Some(FieldValue::OptionMap(map)) => Some(map),
            _ => None,
        }
    }

    pub fn variant(&self) -> CertVariant {
        self.variant
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// The certified (subject) public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Binds the CA key pair used by [`Certificate::sign`]. Replaces any CA
    /// previously bound or decoded.
    pub fn set_ca(&mut self, key_pair: Arc<KeyPair>) {
        self.ca = Some(CaKey {
            public: key_pair.public_key(),
            key_pair: Some(key_pair),
        });
    }

    /// The CA public key embedded in the certificate.
    pub fn ca_public_key(&self) -> Option<&PublicKey> {
        self.ca.as_ref().map(|ca| &ca.public)
    }

    /// The CA key pair, when one was bound with [`Certificate::set_ca`].
    pub fn signing_key(&self) -> Option<&Arc<KeyPair>> {
        self.ca.as_ref().and_then(|ca| ca.key_pair.as_ref())
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// The parsed signature, if the certificate carries one.
    pub fn signature(&self) -> Option<Result<SshSignature>> {
        self.signature.as_deref().map(SshSignature::from_blob)
    }

    /// Checks whether [`Certificate::sign`] would succeed. Every problem
    /// found is reported, not only the first one.
    pub fn can_sign(&self) -> std::result::Result<(), SignabilityError> {
        let mut causes = Vec::new();

        if self.nonce.len() < MIN_NONCE_LEN {
            causes.push(SignabilityCause::InvalidNonce(format!(
                "{} bytes, at least {MIN_NONCE_LEN} required",
                self.nonce.len()
            )));
        }

        for field in CertField::ORDER {
            if let Err(cause) = field.validate(self.get_value(field)) {
                causes.push(cause);
            }
        }

        if let (Some(after), Some(before)) = (self.valid_after(), self.valid_before()) {
            if before <= after {
                causes.push(SignabilityCause::InvalidValidity {
                    valid_after: after.as_unix(),
                    valid_before: before.as_unix(),
                });
            }
        }

        match &self.ca {
            None => causes.push(SignabilityCause::NoCaKey),
            Some(CaKey { key_pair: None, .. }) => causes.push(SignabilityCause::CaKeyCannotSign),
            Some(_) => {}
        }

        if causes.is_empty() {
            Ok(())
        } else {
            Err(SignabilityError::new(causes))
        }
    }

    /// The bytes covered by the signature. Unset fields encode as empty,
    /// and a missing CA encodes as an empty key blob.
    pub fn signable_data(&self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        wire::write_str(&mut data, self.variant.type_tag())?;
        wire::write_bytes(&mut data, &self.nonce)?;
        self.public_key.encode_fields(&mut data)?;

        for field in CertField::ORDER {
            field.kind().encode(self.get_value(field), &mut data)?;
        }

        wire::write_bytes(&mut data, &[])?;
        match &self.ca {
            Some(ca) => wire::write_bytes(&mut data, &ca.public.to_blob()?)?,
            None => wire::write_bytes(&mut data, &[])?,
        }
        Ok(data)
    }

    /// Signs the certificate with the bound CA key pair.
    ///
    /// The certificate is left untouched when signing fails.
    pub fn sign(&mut self, options: &SigningOptions) -> Result<&mut Self> {
        self.can_sign()?;
        let key_pair = self
            .signing_key()
            .ok_or_else(|| SignabilityError::new(vec![SignabilityCause::NoCaKey]))?;

        let rsa_hash = options
            .rsa_hash
            .or(self.variant.rsa_hash())
            .unwrap_or_default();
        let data = self.signable_data()?;
        let signature = pki::sign_data(&data, key_pair, rsa_hash)?;
        let blob = signature.to_blob()?;

        debug!(
            variant = %self.variant,
            algorithm = signature.algorithm.name(),
            "signed certificate"
        );
        self.signature = Some(blob);
        Ok(self)
    }

    /// Verifies the signature against `ca_public_key`, or against the CA key
    /// embedded in the certificate when `None`.
    ///
    /// Verifying against the embedded key only shows that the certificate is
    /// internally consistent: anyone can embed their own CA key and sign with
    /// it. To trust a certificate, pass the CA key you actually trust.
    ///
    /// Returns `Ok(false)` for a well formed signature that does not match,
    /// including a signature made by a different key family. A malformed
    /// signature is an error.
    pub fn verify(&self, ca_public_key: Option<&PublicKey>) -> Result<bool> {
        let blob = self.signature.as_deref().ok_or(SshCertError::NotSigned)?;
        let key = match ca_public_key {
            Some(key) => key,
            None => self.ca_public_key().ok_or_else(|| {
                SshCertError::KeyMismatch("no CA public key to verify against".to_string())
            })?,
        };

        let data = self.signable_data()?;
        let valid = pki::verify_signature(&data, key, blob)?;
        debug!(variant = %self.variant, valid, "verified certificate");
        Ok(valid)
    }

    /// The binary certificate. Fails with [`SshCertError::NotSigned`] before
    /// signing.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let signature = self.signature.as_deref().ok_or(SshCertError::NotSigned)?;
        let mut bytes = self.signable_data()?;
        wire::write_bytes(&mut bytes, signature)?;
        Ok(bytes)
    }

    /// The OpenSSH text form `<tag> <base64> [comment]`, as found in
    /// `*-cert.pub` files.
    pub fn to_openssh(&self, comment: Option<&str>) -> Result<String> {
        let encoded = STANDARD.encode(self.to_bytes()?);
        let tag = self.variant.type_tag();
        Ok(match comment {
            Some(comment) if !comment.is_empty() => format!("{tag} {encoded} {comment}"),
            _ => format!("{tag} {encoded}"),
        })
    }
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn fingerprint(key: &PublicKey) -> String {
            key.fingerprint()
                .unwrap_or_else(|_| "<unencodable>".to_string())
        }

        fn map_entries(map: Option<&OptionMap>) -> String {
            match map {
                Some(map) if !map.is_empty() => map
                    .iter()
                    .map(|(name, value)| {
                        if value.is_empty() {
                            name.clone()
                        } else {
                            format!("{name} {value}")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => "(none)".to_string(),
            }
        }

        let unset = || "(unset)".to_string();

        writeln!(f, "Type: {}", self.variant)?;
        writeln!(
            f,
            "Public key: {} {}",
            self.public_key.key_type(),
            fingerprint(&self.public_key)
        )?;
        match self.ca_public_key() {
            Some(ca) => writeln!(f, "Signing CA: {} {}", ca.key_type(), fingerprint(ca))?,
            None => writeln!(f, "Signing CA: (none)")?,
        }
        writeln!(f, "Nonce: {}", STANDARD.encode(&self.nonce))?;
        writeln!(
            f,
            "Certificate type: {}",
            self.cert_type().map_or_else(unset, |t| t.to_string())
        )?;
        writeln!(
            f,
            "Serial: {}",
            self.serial().map_or_else(unset, |s| s.to_string())
        )?;
        writeln!(f, "Key ID: {:?}", self.key_id().unwrap_or_default())?;
        writeln!(
            f,
            "Valid: from {} to {}",
            self.valid_after().map_or_else(unset, |t| t.to_string()),
            self.valid_before().map_or_else(unset, |t| t.to_string())
        )?;
        match self.principals() {
            Some(principals) if !principals.is_empty() => {
                writeln!(f, "Principals: {}", principals.join(", "))?
            }
            _ => writeln!(f, "Principals: (none)")?,
        }
        writeln!(f, "Critical options: {}", map_entries(self.critical_options()))?;
        writeln!(f, "Extensions: {}", map_entries(self.extensions()))?;
        write!(
            f,
            "Signature: {}",
            if self.is_signed() { "present" } else { "(unsigned)" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ed25519_subject() -> PublicKey {
        KeyPair::ed25519_from_bytes(&[7u8; 32]).public_key()
    }

    #[test]
    fn unknown_override_is_rejected() {
        let err = Certificate::create(ed25519_subject(), None, [("subject", "alice")]).unwrap_err();
        assert!(matches!(err, SshCertError::InvalidField(_)));
    }

    #[test]
    fn variant_must_match_subject_key() {
        let err = Certificate::create_with_variant(
            CertVariant::dsa(),
            ed25519_subject(),
            None,
            Vec::<(&str, FieldValue)>::new(),
        )
        .unwrap_err();
        assert!(matches!(err, SshCertError::KeyMismatch(_)));
    }

    #[test]
    fn unset_field_reads_as_absent() {
        let cert =
            Certificate::create(ed25519_subject(), None, Vec::<(&str, FieldValue)>::new()).unwrap();
        assert_eq!(cert.get_field("serial").unwrap(), None);
        assert_eq!(cert.serial(), None);
        assert!(cert.get_field("subject").is_err());
        assert_eq!(cert.nonce().len(), NONCE_LEN);
    }

    #[test]
    fn empty_values_can_be_replaced() {
        let mut cert =
            Certificate::create(ed25519_subject(), None, Vec::<(&str, FieldValue)>::new()).unwrap();
        cert.set_field("key_id", "").unwrap();
        cert.set_field("key_id", "ops").unwrap();
        cert.set_field("key_id", "other").unwrap();
        assert_eq!(cert.key_id(), Some("ops"));
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let mut cert =
            Certificate::create(ed25519_subject(), None, Vec::<(&str, FieldValue)>::new()).unwrap();
        assert!(matches!(
            cert.set_field("principals", 5u64),
            Err(SshCertError::InvalidField(_))
        ));
    }

    #[test]
    fn unsigned_certificate_cannot_be_exported_or_verified() {
        let cert =
            Certificate::create(ed25519_subject(), None, Vec::<(&str, FieldValue)>::new()).unwrap();
        assert!(matches!(cert.to_bytes(), Err(SshCertError::NotSigned)));
        assert!(matches!(cert.verify(None), Err(SshCertError::NotSigned)));
    }

    #[test]
    fn signable_data_without_ca_ends_with_empty_key() {
        let cert =
            Certificate::create(ed25519_subject(), None, Vec::<(&str, FieldValue)>::new()).unwrap();
        let data = cert.signable_data().unwrap();
        assert!(data.ends_with(&[0, 0, 0, 0, 0, 0, 0, 0]));
        assert_eq!(data, cert.signable_data().unwrap());
    }
}
