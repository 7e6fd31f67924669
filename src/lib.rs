//! # SshCertKit - OpenSSH Certificates in Pure Rust
//!
//! SshCertKit creates, parses, signs and verifies OpenSSH certificates
//! (`*-cert-v01@openssh.com`) using the RustCrypto libraries. Certificates are
//! byte compatible with `ssh-keygen -s` and can be read back by `ssh-keygen -L`.
//!
//! ## Supported Key Types
//!
//! Both certified keys and CA keys may be any of:
//! - **RSA**: certificates tagged `ssh-rsa`, `rsa-sha2-256` or `rsa-sha2-512`
//! - **DSA**: 1024-bit keys with SHA-1 signatures
//! - **ECDSA**: P-256, P-384 and P-521 curves
//! - **Ed25519**: Edwards curve digital signature algorithm
//!
//! ## Supported Certificate Formats
//!
//! - **Binary**: the SSH wire encoding
//! - **OpenSSH text**: `<type> <base64> [comment]`, the format of `*-cert.pub` files
//!
//! ## Quick Start
//!
//! ### Signing a User Certificate
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sshcertkit::{
//!     cert::{
//!         Certificate,
//!         fields::CertType,
//!         params::{CertificateParams, SigningOptions, Validity},
//!     },
//!     key::KeyPair,
//! };
//!
//! # fn main() -> Result<(), sshcertkit::error::SshCertError> {
//! let ca_key = Arc::new(KeyPair::generate_ed25519());
//! let user_key = KeyPair::generate_ecdsa_p256();
//!
//! let params = CertificateParams::builder()
//!     .serial(1)
//!     .cert_type(CertType::User)
//!     .key_id("alice@example.com")
//!     .principals(vec!["alice".to_string()])
//!     .validity(Validity::for_days(30))
//!     .build();
//!
//! let mut cert = Certificate::create(user_key.public_key(), Some(ca_key.clone()), params)?;
//! cert.sign(&SigningOptions::default())?;
//!
//! assert!(cert.verify(Some(&ca_key.public_key()))?);
//! println!("{}", cert.to_openssh(Some("alice"))?);
//! # Ok(())
//! # }
//! ```
//!
//! ### Issuing From a Certificate Authority
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sshcertkit::{
//!     cert::{fields::CertType, params::{CertificateParams, Validity}},
//!     issuer::{CertificateAuthority, Issuer},
//!     key::KeyPair,
//! };
//!
//! # fn main() -> Result<(), sshcertkit::error::SshCertError> {
//! let ca = CertificateAuthority::new(Arc::new(KeyPair::generate_rsa(3072)?));
//! let host_key = KeyPair::generate_ed25519();
//!
//! let params = CertificateParams::builder()
//!     .cert_type(CertType::Host)
//!     .principals(vec!["server.example.com".to_string()])
//!     .validity(Validity::for_days(365))
//!     .build();
//!
//! let cert = ca.issue(host_key.public_key(), params)?;
//! println!("issued serial {:?}", cert.serial());
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading a Certificate
//!
//! ```rust,no_run
//! use sshcertkit::{cert::Certificate, key::PublicKey};
//!
//! # fn main() -> Result<(), sshcertkit::error::SshCertError> {
//! let text = std::fs::read_to_string("id_ed25519-cert.pub").expect("readable file");
//! let trusted_ca = PublicKey::from_openssh(&std::fs::read_to_string("ca.pub").expect("readable file"))?;
//!
//! let cert = Certificate::from_openssh(&text)?;
//! println!("{cert}");
//! assert!(cert.verify(Some(&trusted_ca))?);
//! # Ok(())
//! # }
//! ```
//!
//! `verify(None)` checks the signature against the CA key embedded in the
//! certificate. That only proves the certificate is internally consistent;
//! always pass the CA key you trust.
//!
//! ## Error Handling
//!
//! Signing reports every problem at once:
//!
//! ```rust
//! use sshcertkit::{cert::Certificate, error::SshCertError, key::KeyPair};
//!
//! let subject = KeyPair::generate_ed25519().public_key();
//! let cert = Certificate::create(subject, None, [("key_id", "incomplete")]).unwrap();
//!
//! match cert.can_sign() {
//!     Ok(()) => println!("ready"),
//!     Err(err) => {
//!         for cause in err.causes() {
//!             println!("cannot sign: {cause}");
//!         }
//!     }
//! }
//!
//! match Certificate::from_bytes(b"garbage") {
//!     Err(SshCertError::Format(msg)) => println!("Failed to decode certificate: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//!     Ok(_) => unreachable!(),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: Key generation, import, and the SSH public key encoding
//! - [`pki`]: SSH signature blobs, signing and verification
//! - [`cert`]: Certificate creation, encoding/decoding, signing and verification
//! - [`issuer`]: Certificate issuing functionality and CA operations
//! - [`wire`]: The SSH wire codec shared by keys and certificates
//! - [`error`]: Error types

pub mod cert;
pub mod error;
pub mod issuer;
pub mod key;
pub mod pki;
pub mod wire;
