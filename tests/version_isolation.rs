use ironseal::{Options, Password, SealError, Sealer, Version};
use serde_json::{json, Value};

const PASSWORD: &str = "some_not_random_password_that_is_at_least_32_characters";

#[test]
fn test_versions_never_cross_verify() {
    // Threat: confusion between protocol variants.
    // Goal: a token sealed under one variant is rejected by the other, even
    // with the same password and options.
    let password = Password::new(PASSWORD);
    let v2 = Sealer::new(Options::default(), Version::V2);
    let v2_1 = Sealer::new(Options::default(), Version::V2_1);

    let sealed_v2 = v2.seal(&json!({ "a": 1 }), &password).unwrap();
    let sealed_v2_1 = v2_1.seal(&json!({ "a": 1 }), &password).unwrap();

    let expected = SealError::Validation("Wrong MAC prefix".into());
    assert_eq!(v2_1.unseal::<Value>(&sealed_v2, &password).unwrap_err(), expected);
    assert_eq!(v2.unseal::<Value>(&sealed_v2_1, &password).unwrap_err(), expected);
}

#[test]
fn test_relabelled_token_fails_mac() {
    // Rewriting the prefix gets past the prefix check, but the prefix is part
    // of the MAC base string and the derivation digest differs.
    let password = Password::new(PASSWORD);
    let v2 = Sealer::new(Options::default(), Version::V2);
    let v2_1 = Sealer::new(Options::default(), Version::V2_1);

    let sealed = v2.seal(&json!({ "a": 1 }), &password).unwrap();
    let relabelled = sealed.replacen("Fe26.2*", "Fe26.2.1*", 1);

    let err = v2_1.unseal::<Value>(&relabelled, &password).unwrap_err();
    assert_eq!(err, SealError::Integrity("Bad HMAC value".into()));
}
