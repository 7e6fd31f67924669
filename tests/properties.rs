mod util;

use proptest::prelude::*;

use sshcertkit::cert::Certificate;
use sshcertkit::cert::fields::{CertType, OptionMap};
use sshcertkit::cert::params::{CertificateParams, SigningOptions, Validity};

const EXTENSIONS: [&str; 6] = [
    "no-touch-required",
    "permit-X11-forwarding",
    "permit-agent-forwarding",
    "permit-port-forwarding",
    "permit-pty",
    "permit-user-rc",
];

fn extension_map() -> impl Strategy<Value = OptionMap> {
    prop::collection::btree_map(
        prop::sample::select(EXTENSIONS.to_vec()).prop_map(str::to_string),
        "[ -~]{0,16}",
        0..EXTENSIONS.len(),
    )
}

fn params() -> impl Strategy<Value = CertificateParams> {
    (
        any::<u64>(),
        prop::bool::ANY,
        "[ -~]{0,32}",
        prop::collection::vec("[a-z0-9.-]{1,24}", 0..5),
        0u64..u64::MAX - 1,
        extension_map(),
    )
        .prop_flat_map(|(serial, host, key_id, principals, after, extensions)| {
            (after + 1..=u64::MAX).prop_map(move |before| CertificateParams {
                serial: Some(serial),
                cert_type: Some(if host { CertType::Host } else { CertType::User }),
                key_id: Some(key_id.clone()),
                principals: Some(principals.clone()),
                validity: Some(Validity::new(after, before)),
                critical_options: None,
                extensions: Some(extensions.clone()),
            })
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn signed_certificates_round_trip(params in params()) {
        let ca = util::ed25519_key();
        let mut cert = Certificate::create(util::p256_key().public_key(), Some(ca.clone()), params.clone()).unwrap();
        cert.sign(&SigningOptions::default()).unwrap();
        let bytes = cert.to_bytes().unwrap();

        let decoded = Certificate::from_bytes(&bytes).unwrap();
        prop_assert_eq!(decoded.to_bytes().unwrap(), bytes);
        prop_assert_eq!(decoded.serial(), params.serial);
        prop_assert_eq!(decoded.key_id(), params.key_id.as_deref());
        prop_assert_eq!(decoded.principals(), params.principals.as_deref());
        prop_assert_eq!(decoded.extensions(), params.extensions.as_ref());
        prop_assert!(decoded.verify(Some(&ca.public_key())).unwrap());
    }

    #[test]
    fn flipping_a_signed_bit_breaks_verification(params in params(), index in any::<prop::sample::Index>(), bit in 0u8..8) {
        let ca = util::ed25519_key();
        let mut cert = Certificate::create(util::ed25519_key().public_key(), Some(ca.clone()), params).unwrap();
        cert.sign(&SigningOptions::default()).unwrap();
        let signed_len = cert.signable_data().unwrap().len();

        let mut bytes = cert.to_bytes().unwrap();
        bytes[index.index(signed_len)] ^= 1 << bit;

        // Either the flip breaks the framing or the signature no longer matches.
        if let Ok(tampered) = Certificate::from_bytes(&bytes) {
            prop_assert!(!tampered.verify(Some(&ca.public_key())).unwrap_or(false));
        }
    }

    #[test]
    fn decoding_arbitrary_bytes_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = Certificate::from_bytes(&bytes);
    }
}
