use bon::Builder;
use time::Duration;
use time::OffsetDateTime;

use super::fields::{CertField, CertType, FieldValue, OptionMap, Timestamp};
use crate::key::RsaHash;

/// Body field values for a new certificate.
///
/// Every field is optional; the ones left out stay unset and can be assigned
/// later with [`crate::cert::Certificate::set_field`]. The struct converts
/// into the `(name, value)` overrides accepted by
/// [`crate::cert::Certificate::create`].
///
/// # Fields
/// * `serial` - Serial number chosen by the CA.
/// * `cert_type` - User or host certificate.
/// * `key_id` - Free-form identifier logged by the server.
/// * `principals` - User or host names the certificate is valid for.
/// * `validity` - Validity window.
/// * `critical_options` - Options the server must understand.
/// * `extensions` - Optional features granted to the holder.
#[derive(Clone, Debug, Default, Builder)]
pub struct CertificateParams {
    pub serial: Option<u64>,
    pub cert_type: Option<CertType>,
    #[builder(into)]
    pub key_id: Option<String>,
    pub principals: Option<Vec<String>>,
    pub validity: Option<Validity>,
    pub critical_options: Option<OptionMap>,
    pub extensions: Option<OptionMap>,
}

impl IntoIterator for CertificateParams {
    type Item = (&'static str, FieldValue);
    type IntoIter = std::vec::IntoIter<(&'static str, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        let mut values: Vec<(CertField, FieldValue)> = Vec::new();
        if let Some(serial) = self.serial {
            values.push((CertField::Serial, serial.into()));
        }
        if let Some(cert_type) = self.cert_type {
            values.push((CertField::CertType, cert_type.into()));
        }
        if let Some(key_id) = self.key_id {
            values.push((CertField::KeyId, key_id.into()));
        }
        if let Some(principals) = self.principals {
            values.push((CertField::Principals, principals.into()));
        }
        if let Some(validity) = self.validity {
            values.push((CertField::ValidAfter, validity.valid_after.into()));
            values.push((CertField::ValidBefore, validity.valid_before.into()));
        }
        if let Some(options) = self.critical_options {
            values.push((CertField::CriticalOptions, options.into()));
        }
        if let Some(extensions) = self.extensions {
            values.push((CertField::Extensions, extensions.into()));
        }

        values
            .into_iter()
            .map(|(field, value)| (field.name(), value))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// Validity window of a certificate, in unix seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validity {
    pub valid_after: Timestamp,
    pub valid_before: Timestamp,
}

impl Validity {
    pub fn new(valid_after: impl Into<Timestamp>, valid_before: impl Into<Timestamp>) -> Self {
        Self {
            valid_after: valid_after.into(),
            valid_before: valid_before.into(),
        }
    }

    /// Creates a validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self::new(now, now + Duration::days(days))
    }

    /// Valid from now on, without expiry.
    pub fn forever() -> Self {
        Self::new(Timestamp::now(), Timestamp::FOREVER)
    }
}

/// Options for [`crate::cert::Certificate::sign`].
///
/// `rsa_hash` picks the hash of RSA CA signatures. When unset, an RSA
/// certificate uses the hash named by its type tag and every other
/// certificate uses SHA-512.
#[derive(Clone, Copy, Debug, Default, Builder)]
pub struct SigningOptions {
    pub rsa_hash: Option<RsaHash>,
}
