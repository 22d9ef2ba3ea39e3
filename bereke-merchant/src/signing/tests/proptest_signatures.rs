use proptest::prelude::*;

use crate::signing::{
    KeyLoading, RequestSigner, compute_hash,
    test_support::{PASSPHRASE, TEST_KEY, key_file},
    verify,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_signature_verification_roundtrip(body in "[a-zA-Z0-9=&%+._-]{0,256}") {
        let file = key_file();
        let signer = RequestSigner::new(
            file.path(),
            zeroize::Zeroizing::new(PASSPHRASE.to_owned()),
            KeyLoading::PerRequest,
        );

        let signature = signer.sign(&body).expect("signing failed");

        prop_assert_eq!(&signature.hash, &compute_hash(body.as_bytes()));
        prop_assert!(verify(&TEST_KEY.public_pem, body.as_bytes(), &signature.signature).unwrap());
    }

    #[test]
    fn test_hash_is_deterministic(body in any::<Vec<u8>>()) {
        prop_assert_eq!(compute_hash(&body), compute_hash(&body));
    }

    #[test]
    fn test_tampered_body_fails_verification(
        body in "[a-z0-9=&]{1,128}",
        suffix in "[a-z0-9]{1,8}",
    ) {
        let file = key_file();
        let signer = RequestSigner::new(
            file.path(),
            zeroize::Zeroizing::new(PASSPHRASE.to_owned()),
            KeyLoading::Cached,
        );
        let signature = signer.sign(&body).expect("signing failed");
        let tampered = format!("{body}{suffix}");

        prop_assert!(!verify(&TEST_KEY.public_pem, tampered.as_bytes(), &signature.signature).unwrap());
    }
}
