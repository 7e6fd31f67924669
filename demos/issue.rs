use std::sync::Arc;

use sshcertkit::cert::fields::{CertType, OptionMap};
use sshcertkit::cert::params::{CertificateParams, Validity};
use sshcertkit::error::SshCertError;
use sshcertkit::issuer::{CertificateAuthority, Issuer};
use sshcertkit::key::KeyPair;

fn main() -> Result<(), SshCertError> {
    // CA key (or choose RSA/ECDSA/DSA)
    let ca = CertificateAuthority::new(Arc::new(KeyPair::generate_ed25519()));
    println!("CA public key:\n{}", ca.public_key().to_openssh(Some("demo-ca"))?);

    let user_key = KeyPair::generate_ecdsa_p256();

    let mut extensions = OptionMap::new();
    extensions.insert("permit-pty".to_string(), String::new());
    extensions.insert("permit-agent-forwarding".to_string(), String::new());

    let params = CertificateParams::builder()
        .cert_type(CertType::User)
        .key_id("alice@example.com")
        .principals(vec!["alice".to_string()])
        .validity(Validity::for_days(30))
        .extensions(extensions)
        .build();

    // The serial comes from the CA counter.
    let cert = ca.issue(user_key.public_key(), params)?;

    println!("{cert}");
    println!("User certificate:\n{}", cert.to_openssh(Some("alice"))?);

    Ok(())
}
