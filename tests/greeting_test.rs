use hydra::{VERSION, greeting};

#[test]
fn test_greeting() {
    assert_eq!(greeting(), "Hello from Hydra!");
}

#[test]
fn test_version_matches_package() {
    assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
}
