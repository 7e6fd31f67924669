mod util;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use regex::Regex;
use sshcertkit::cert::Certificate;
use sshcertkit::cert::fields::{CertType, OptionMap};
use sshcertkit::cert::params::{CertificateParams, SigningOptions, Validity};
use sshcertkit::key::PublicKey;

/// Runs `ssh-keygen`, or returns `None` when it is not installed.
fn ssh_keygen(args: &[&str]) -> Option<Output> {
    match Command::new("ssh-keygen").args(args).output() {
        Ok(output) => Some(output),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("ssh-keygen not found, skipping");
            None
        }
        Err(err) => panic!("Failed to execute ssh-keygen: {err}"),
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sshcertkit-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("Failed to create scratch directory");
    dir
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn test_ssh_keygen_lists_certificate() {
    let ca = util::ed25519_key();
    let mut extensions = OptionMap::new();
    extensions.insert("permit-pty".to_string(), String::new());
    let mut critical_options = OptionMap::new();
    critical_options.insert("force-command".to_string(), "/usr/bin/true".to_string());

    let params = CertificateParams::builder()
        .serial(42)
        .cert_type(CertType::User)
        .key_id("alice@example.com")
        .principals(vec!["alice".to_string(), "admin".to_string()])
        .validity(Validity::for_days(1))
        .critical_options(critical_options)
        .extensions(extensions)
        .build();
    let mut cert = Certificate::create(util::p256_key().public_key(), Some(ca), params).unwrap();
    cert.sign(&SigningOptions::default()).unwrap();

    let dir = scratch_dir("list");
    let cert_path = dir.join("id_ecdsa-cert.pub");
    fs::write(&cert_path, cert.to_openssh(Some("alice")).unwrap())
        .expect("Failed to write certificate");

    // ssh-keygen verifies the CA signature while loading the certificate.
    let Some(output) = ssh_keygen(&["-L", "-f", path_str(&cert_path)]) else {
        return;
    };
    assert!(
        output.status.success(),
        "ssh-keygen -L failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output_text = String::from_utf8_lossy(&output.stdout);
    assert!(
        output_text.contains("Type: ecdsa-sha2-nistp256-cert-v01@openssh.com user certificate"),
        "Type field is incorrect"
    );
    assert!(output_text.contains("Serial: 42"), "Serial field is incorrect");
    assert!(
        output_text.contains("Key ID: \"alice@example.com\""),
        "Key ID field is incorrect"
    );
    assert!(
        Regex::new(r"Signing CA: ED25519 SHA256:\S+")
            .unwrap()
            .is_match(&output_text),
        "Signing CA field is incorrect"
    );
    assert!(
        Regex::new(r"Valid: from \S+ to \S+").unwrap().is_match(&output_text),
        "Missing or incorrect Valid field"
    );
    assert!(
        Regex::new(r"Principals: \n\s+alice\n\s+admin")
            .unwrap()
            .is_match(&output_text),
        "Principals field is incorrect"
    );
    assert!(
        Regex::new(r"force-command /usr/bin/true").unwrap().is_match(&output_text),
        "Critical options field is incorrect"
    );
    assert!(output_text.contains("permit-pty"), "Extensions field is incorrect");

    fs::remove_dir_all(&dir).expect("Failed to remove scratch directory");
}

#[test]
fn test_ssh_keygen_signed_certificate_decodes() {
    for key_type in ["ed25519", "ecdsa", "rsa"] {
        let dir = scratch_dir(&format!("sign-{key_type}"));
        let ca_path = dir.join("ca");
        let user_path = dir.join("user");

        for path in [&ca_path, &user_path] {
            let Some(output) = ssh_keygen(&["-q", "-t", key_type, "-N", "", "-f", path_str(path)])
            else {
                return;
            };
            assert!(output.status.success(), "ssh-keygen failed to generate a key");
        }

        let Some(output) = ssh_keygen(&[
            "-q",
            "-s",
            path_str(&ca_path),
            "-I",
            "alice",
            "-n",
            "alice,bob",
            "-z",
            "7",
            "-V",
            "+1d",
            path_str(&dir.join("user.pub")),
        ]) else {
            return;
        };
        assert!(
            output.status.success(),
            "ssh-keygen -s failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let text = fs::read_to_string(dir.join("user-cert.pub")).expect("certificate written");
        let ca_public =
            PublicKey::from_openssh(&fs::read_to_string(dir.join("ca.pub")).unwrap()).unwrap();
        let user_public =
            PublicKey::from_openssh(&fs::read_to_string(dir.join("user.pub")).unwrap()).unwrap();

        let cert = Certificate::from_openssh(&text).unwrap();
        assert_eq!(cert.serial(), Some(7));
        assert_eq!(cert.key_id(), Some("alice"));
        assert_eq!(
            cert.principals(),
            Some(&["alice".to_string(), "bob".to_string()][..])
        );
        assert_eq!(cert.cert_type(), Some(CertType::User));
        assert_eq!(cert.public_key(), &user_public);
        assert_eq!(cert.ca_public_key(), Some(&ca_public));
        assert!(cert.verify(Some(&ca_public)).unwrap(), "{key_type} signature");

        let encoded = text.split_whitespace().nth(1).unwrap();
        let reencoded = cert.to_openssh(None).unwrap();
        assert_eq!(reencoded.split_whitespace().nth(1).unwrap(), encoded);

        fs::remove_dir_all(&dir).expect("Failed to remove scratch directory");
    }
}
