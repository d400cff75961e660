//! Minimal example: sealing a session under rotating passwords.
//!
//! Demonstrates sealing with a password id and unsealing against a set of
//! current and retired passwords.
//! Run with: `cargo run --example password_rotation`
//!
//! - Tokens carry the id of the password that sealed them, in clear text
//! - The unsealer picks the matching entry from its password set
//! - Tokens without an id fall back to the `default` entry
//! - Tokens whose password was retired fail to open

use ironseal::{Options, Password, PasswordSet, Sealer, Version};
use serde_json::{json, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1. Setup. Keep the previous password around while its tokens are live.
    let mut passwords = PasswordSet::new();
    passwords
        .insert("2025_q4", "some_not_random_password_that_is_at_least_32_characters1")
        .insert("2026_q1", "some_not_random_password_that_is_at_least_32_characters2")
        .insert("default", "some_not_random_password_that_is_at_least_32_characters");

    let sealer = Sealer::new(Options::default().with_ttl(60 * 60 * 1000), Version::V2_1);

    // 2. Seal a session with the current password.
    let current = Password::with_id(
        "2026_q1",
        "some_not_random_password_that_is_at_least_32_characters2",
    );
    let session = json!({ "user": "alice", "roles": ["admin"] });
    let sealed = sealer.seal(&session, &current)?;
    println!("Sealed: {sealed}");

    // 3. Unseal against the set.
    let unsealed: Value = sealer.unseal(&sealed, &passwords)?;
    assert_eq!(unsealed, session);
    println!("Unsealed: {unsealed}");

    // 4. Retire the password and try again.
    let retired: PasswordSet = [
        ("2026_q2", "some_not_random_password_that_is_at_least_32_characters3"),
    ]
    .into_iter()
    .collect();
    match sealer.unseal::<Value>(&sealed, &retired) {
        Ok(_) => println!("Unexpectedly opened with a retired password"),
        Err(e) => println!("After rotation: {e}"),
    }

    Ok(())
}
