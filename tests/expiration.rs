use ironseal::{Options, Password, SealError, Sealer, Version};
use serde_json::{json, Value};

const PASSWORD: &str = "some_not_random_password_that_is_at_least_32_characters";

fn sealer(options: Options) -> Sealer {
    Sealer::new(options, Version::V2)
}

#[test]
fn test_unseal_before_expiration() {
    let sealer = sealer(Options::default().with_ttl(200));
    let password = Password::new(PASSWORD);

    let sealed = sealer.seal(&json!({ "a": 1 }), &password).unwrap();
    let unsealed: Value = sealer.unseal(&sealed, &password).unwrap();
    assert_eq!(unsealed, json!({ "a": 1 }));
}

#[test]
fn test_unseal_after_expiration() {
    // Threat: replay of a stale token.
    let password = Password::new(PASSWORD);
    let options = Options::default().with_ttl(200).with_timestamp_skew_sec(0);

    // 1. Seal with a 200ms lifetime.
    let sealed = sealer(options.clone())
        .seal(&json!({ "a": 1 }), &password)
        .unwrap();

    // 2. Unseal with a clock that is one second ahead.
    let later = sealer(options.with_localtime_offset_msec(1_000));
    let err = later.unseal::<Value>(&sealed, &password).unwrap_err();
    assert_eq!(err, SealError::Expired);
}

#[test]
fn test_skew_tolerates_clock_drift() {
    let password = Password::new(PASSWORD);
    let options = Options::default().with_ttl(200).with_timestamp_skew_sec(60);

    let sealed = sealer(options.clone())
        .seal(&json!({ "a": 1 }), &password)
        .unwrap();

    // One second late is within the 60 second skew...
    let late = sealer(options.clone().with_localtime_offset_msec(1_000));
    assert!(late.unseal::<Value>(&sealed, &password).is_ok());

    // ...two minutes late is not.
    let very_late = sealer(options.with_localtime_offset_msec(120_000));
    assert_eq!(
        very_late.unseal::<Value>(&sealed, &password).unwrap_err(),
        SealError::Expired
    );
}

#[test]
fn test_expiration_and_offset_together() {
    // A sealer whose clock runs behind still honours its own tokens.
    let options = Options::default()
        .with_ttl(200)
        .with_localtime_offset_msec(-100_000);
    let sealer = sealer(options);
    let password = Password::new(PASSWORD);

    let sealed = sealer.seal(&json!({ "a": 1 }), &password).unwrap();
    let unsealed: Value = sealer.unseal(&sealed, &password).unwrap();
    assert_eq!(unsealed, json!({ "a": 1 }));
}

#[test]
fn test_no_ttl_never_expires() {
    let password = Password::new(PASSWORD);
    let sealed = sealer(Options::default())
        .seal(&json!({ "a": 1 }), &password)
        .unwrap();

    // Ten years on.
    let future = sealer(Options::default().with_localtime_offset_msec(315_360_000_000));
    assert!(future.unseal::<Value>(&sealed, &password).is_ok());
}
