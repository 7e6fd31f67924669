use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::cert::Certificate;
use crate::cert::fields::CertField;
use crate::cert::params::{CertificateParams, SigningOptions};
use crate::error::{Result, SshCertError};
use crate::key::{KeyPair, PublicKey};

/// A CA that signs certificates with its own key and numbering.
///
/// Implementors provide the key and the serial sequence; `issue` does the rest.
pub trait Issuer {
    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &Arc<KeyPair>;

    /// Returns the serial number for the next certificate.
    ///
    /// A serial is used up even when signing the certificate then fails.
    fn next_serial(&self) -> Result<u64>;

    /// Returns the options used to sign issued certificates.
    fn signing_options(&self) -> SigningOptions {
        SigningOptions::default()
    }

    /// Issues a signed certificate for `subject`.
    ///
    /// A serial in `params` is kept; otherwise the next serial of the issuer
    /// is assigned.
    ///
    /// # Arguments
    /// * `subject` - The public key to certify.
    /// * `params` - The body fields of the certificate.
    fn issue(&self, subject: PublicKey, params: CertificateParams) -> Result<Certificate> {
        let mut cert = Certificate::create(subject, Some(self.signing_key().clone()), params)?;
        if cert.serial().is_none() {
            cert.set_value(CertField::Serial, self.next_serial()?)?;
        }
        cert.sign(&self.signing_options())?;

        debug!(
            serial = cert.serial(),
            variant = %cert.variant(),
            "issued certificate"
        );
        Ok(cert)
    }
}

/// A CA holding its key pair and a serial counter.
///
/// Issuing is safe from several threads at once; each certificate without an
/// explicit serial gets a distinct one. The counter never wraps: once it
/// reaches `u64::MAX`, issuing without an explicit serial fails with
/// [`SshCertError::SerialExhausted`].
#[derive(Debug)]
pub struct CertificateAuthority {
    key: Arc<KeyPair>,
    serial: AtomicU64,
    options: SigningOptions,
}

impl CertificateAuthority {
    /// Serials start at 1.
    pub fn new(key: Arc<KeyPair>) -> Self {
        Self::with_first_serial(key, 1)
    }

    pub fn with_first_serial(key: Arc<KeyPair>, first_serial: u64) -> Self {
        Self {
            key,
            serial: AtomicU64::new(first_serial),
            options: SigningOptions::default(),
        }
    }

    pub fn with_signing_options(mut self, options: SigningOptions) -> Self {
        self.options = options;
        self
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }
}

impl Issuer for CertificateAuthority {
    fn signing_key(&self) -> &Arc<KeyPair> {
        &self.key
    }

    fn next_serial(&self) -> Result<u64> {
        self.serial
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |serial| {
                serial.checked_add(1)
            })
            .map_err(|_| SshCertError::SerialExhausted)
    }

    fn signing_options(&self) -> SigningOptions {
        self.options
    }
}
