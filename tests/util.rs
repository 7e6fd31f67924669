#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use sshcertkit::cert::Certificate;
use sshcertkit::cert::fields::CertType;
use sshcertkit::cert::params::{CertificateParams, SigningOptions, Validity};
use sshcertkit::cert::variant::CertVariant;
use sshcertkit::key::{EcdsaCurve, KeyPair, PublicKey, RsaHash};

/// Generating RSA and DSA keys is slow, so every test binary shares one key
/// per family.
fn cached(cell: &'static OnceLock<Arc<KeyPair>>, generate: fn() -> KeyPair) -> Arc<KeyPair> {
    cell.get_or_init(|| Arc::new(generate())).clone()
}

pub fn rsa_key() -> Arc<KeyPair> {
    static KEY: OnceLock<Arc<KeyPair>> = OnceLock::new();
    cached(&KEY, || KeyPair::generate_rsa(2048).unwrap())
}

pub fn dsa_key() -> Arc<KeyPair> {
    static KEY: OnceLock<Arc<KeyPair>> = OnceLock::new();
    cached(&KEY, KeyPair::generate_dsa)
}

pub fn p256_key() -> Arc<KeyPair> {
    static KEY: OnceLock<Arc<KeyPair>> = OnceLock::new();
    cached(&KEY, KeyPair::generate_ecdsa_p256)
}

pub fn p384_key() -> Arc<KeyPair> {
    static KEY: OnceLock<Arc<KeyPair>> = OnceLock::new();
    cached(&KEY, KeyPair::generate_ecdsa_p384)
}

pub fn p521_key() -> Arc<KeyPair> {
    static KEY: OnceLock<Arc<KeyPair>> = OnceLock::new();
    cached(&KEY, KeyPair::generate_ecdsa_p521)
}

pub fn ed25519_key() -> Arc<KeyPair> {
    static KEY: OnceLock<Arc<KeyPair>> = OnceLock::new();
    cached(&KEY, KeyPair::generate_ed25519)
}

/// One CA key per family.
pub fn ca_keys() -> Vec<Arc<KeyPair>> {
    vec![
        rsa_key(),
        dsa_key(),
        p256_key(),
        p384_key(),
        p521_key(),
        ed25519_key(),
    ]
}

/// Every certificate variant with a matching subject key.
pub fn variants_with_subjects() -> Vec<(CertVariant, Arc<KeyPair>)> {
    vec![
        (CertVariant::rsa(RsaHash::Sha1), rsa_key()),
        (CertVariant::rsa(RsaHash::Sha256), rsa_key()),
        (CertVariant::rsa(RsaHash::Sha512), rsa_key()),
        (CertVariant::dsa(), dsa_key()),
        (CertVariant::ecdsa(EcdsaCurve::NistP256), p256_key()),
        (CertVariant::ecdsa(EcdsaCurve::NistP384), p384_key()),
        (CertVariant::ecdsa(EcdsaCurve::NistP521), p521_key()),
        (CertVariant::ed25519(), ed25519_key()),
    ]
}

/// The body used throughout the tests: user certificate 1 for alice, valid
/// from 1000 to 2000.
pub fn alice_params() -> CertificateParams {
    CertificateParams::builder()
        .serial(1)
        .cert_type(CertType::User)
        .key_id("alice")
        .principals(vec!["alice".to_string()])
        .validity(Validity::new(1000u64, 2000u64))
        .build()
}

pub fn signed_alice_cert(subject: PublicKey, ca: Arc<KeyPair>) -> Certificate {
    let mut cert = Certificate::create(subject, Some(ca), alice_params()).unwrap();
    cert.sign(&SigningOptions::default()).unwrap();
    cert
}
