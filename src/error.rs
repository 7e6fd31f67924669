//! use sshcertkit::error::SshCertError;

use std::fmt;

use thiserror::Error;

use crate::cert::fields::CertField;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, SshCertError>;

/// Represents errors that can occur in the sshcertkit library.
///
/// Every error surfaces to the caller; the library performs no silent recovery.
#[derive(Debug, Error, Clone)]
pub enum SshCertError {
    /// Malformed or truncated wire bytes, an unknown type tag, or trailing data.
    #[error("Invalid certificate format: {0}")]
    Format(String),

    /// A field name that is not part of the certificate body, or a value of the wrong type.
    #[error("Invalid certificate field: {0}")]
    InvalidField(String),

    /// The certificate is not ready to be signed. Carries every cause at once.
    #[error(transparent)]
    Signability(#[from] SignabilityError),

    /// Export attempted before the certificate carries a signature.
    #[error("The certificate has not been signed")]
    NotSigned,

    /// The signature or key material could not be interpreted during verification.
    #[error("Malformed signature or key during verification: {0}")]
    VerificationMalformed(String),

    /// A key does not belong to the family the operation requires.
    #[error("Key mismatch: {0}")]
    KeyMismatch(String),

    /// Key construction, import or generation failed.
    #[error("Key error: {0}")]
    Key(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    Encoding(String),

    /// The issuer has handed out its last serial number.
    #[error("No serial numbers left to issue")]
    SerialExhausted,
}

/// One reason why a certificate cannot be signed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignabilityCause {
    #[error("the nonce is invalid: {0}")]
    InvalidNonce(String),

    #[error("the field {0} is missing a value")]
    MissingField(CertField),

    #[error("the field {field} is invalid: {reason}")]
    InvalidField { field: CertField, reason: String },

    #[error("valid_before ({valid_before}) must be later than valid_after ({valid_after})")]
    InvalidValidity { valid_after: u64, valid_before: u64 },

    #[error("no CA key is set")]
    NoCaKey,

    #[error("the CA private key is not loaded, only its public key is known")]
    CaKeyCannotSign,
}

/// Aggregate of every [`SignabilityCause`] found by [`crate::cert::Certificate::can_sign`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub struct SignabilityError {
    causes: Vec<SignabilityCause>,
}

impl SignabilityError {
    pub fn new(causes: Vec<SignabilityCause>) -> Self {
        Self { causes }
    }

    pub fn causes(&self) -> &[SignabilityCause] {
        &self.causes
    }

    pub fn into_causes(self) -> Vec<SignabilityCause> {
        self.causes
    }
}

impl fmt::Display for SignabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "The certificate cannot be signed")?;
        for (i, cause) in self.causes.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{cause}")?;
        }
        Ok(())
    }
}

impl From<ssh_encoding::Error> for SshCertError {
    fn from(err: ssh_encoding::Error) -> Self {
        SshCertError::Format(err.to_string())
    }
}

impl From<rsa::Error> for SshCertError {
    fn from(err: rsa::Error) -> Self {
        SshCertError::Key(err.to_string())
    }
}

impl From<signature::Error> for SshCertError {
    fn from(err: signature::Error) -> Self {
        SshCertError::Key(err.to_string())
    }
}

impl From<pkcs8::Error> for SshCertError {
    fn from(err: pkcs8::Error) -> Self {
        SshCertError::Key(err.to_string())
    }
}

impl From<base64::DecodeError> for SshCertError {
    fn from(err: base64::DecodeError) -> Self {
        SshCertError::Format(format!("invalid base64: {err}"))
    }
}
