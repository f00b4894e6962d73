//! Tests for credentials module

use super::*;
use mockall::{mock, predicate::always, Sequence};
use std::sync::Arc;

mock! {
    pub Backend {}

    impl SecretBackend for Backend {
        fn name(&self) -> &'static str;
        fn create(&self, request: &CreateRequest) -> Status;
        fn update(&self, request: &UpdateRequest) -> Status;
        fn query(&self, request: &QueryRequest) -> (Status, Option<CredentialValue>);
        fn delete(&self, spec: &MatchSpec) -> Status;
    }
}

fn key(service: &str, account: &str) -> CredentialKey {
    CredentialKey::new(service, account).unwrap()
}

fn mock_store(mut backend: MockBackend) -> CredentialStore {
    backend.expect_name().return_const("mock");
    CredentialStore::from_backend(Arc::new(backend))
}

// ============================================================================
// Values and keys
// ============================================================================

#[test]
fn test_credential_value_redacted() {
    let secret = CredentialValue::from("my-secret-value");
    assert_eq!(secret.expose(), b"my-secret-value");
    assert_eq!(secret.len(), 15);
    assert!(!secret.is_empty());

    let debug = format!("{:?}", secret);
    assert!(!debug.contains("my-secret-value"));
    assert!(debug.contains("REDACTED"));

    let display = format!("{}", secret);
    assert!(!display.contains("my-secret-value"));
    assert!(display.contains("REDACTED"));
}

#[test]
fn test_credential_value_equality() {
    let a = CredentialValue::from("test-value");
    let b = CredentialValue::new(b"test-value".to_vec());
    let c = CredentialValue::from("different-value");

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_credential_value_clear() {
    let mut secret = CredentialValue::from("sensitive-data");
    secret.clear();
    assert!(secret.is_empty());
}

#[test]
fn test_text_round_trip() {
    for text in ["", "TestToken", "héllo wörld", "日本語", "emoji 🔑", " padded "] {
        assert_eq!(text_from_bytes(&bytes_from_text(text)), text);
    }
}

#[test]
fn test_text_from_invalid_utf8_is_lossy() {
    let text = text_from_bytes(&[b'o', b'k', 0xFF, 0xFE]);
    assert!(text.starts_with("ok"));
    assert!(text.contains('\u{FFFD}'));

    let value = CredentialValue::new(vec![0xC3]);
    assert_eq!(value.to_text(), "\u{FFFD}");
}

#[test]
fn test_key_rejects_empty_parts() {
    assert_eq!(
        CredentialKey::new("", "auth").unwrap_err(),
        InvalidKey { field: "service" }
    );
    assert_eq!(
        CredentialKey::new("token", "").unwrap_err(),
        InvalidKey { field: "account" }
    );

    let key = key("token", "auth");
    assert_eq!(key.service(), "token");
    assert_eq!(key.account(), "auth");
    assert_eq!(key.to_string(), "token:auth");
}

#[test]
fn test_query_request_single() {
    let request = QueryRequest::single(MatchSpec::for_key(&key("s", "a")));
    assert!(request.return_data);
    assert_eq!(request.limit, 1);
    assert_eq!(request.spec.class, ItemClass::GenericPassword);
}

#[test]
fn test_backend_detect() {
    let backend = BackendKind::detect();
    assert_ne!(backend, BackendKind::Auto);
    assert_eq!(BackendKind::Auto.resolve(), backend);
    assert_eq!(BackendKind::Memory.resolve(), BackendKind::Memory);
}

// ============================================================================
// Store semantics (memory backend)
// ============================================================================

#[test]
fn test_scenario() {
    let store = CredentialStore::in_memory();
    let key = key("token", "auth");

    store.save(&key, "TestToken").unwrap();
    assert_eq!(store.load(&key).unwrap().unwrap().to_text(), "TestToken");

    store.update(&key, "TestToken Updated").unwrap();
    assert_eq!(
        store.load(&key).unwrap().unwrap().to_text(),
        "TestToken Updated"
    );

    store.delete(&key).unwrap();
    assert!(store.load(&key).unwrap().is_none());
}

#[test]
fn test_binary_round_trip() {
    let store = CredentialStore::in_memory();
    let key = key("bin", "blob");
    let bytes: Vec<u8> = (0..=255).collect();

    store.save(&key, &bytes).unwrap();
    assert_eq!(store.load(&key).unwrap().unwrap().expose(), bytes.as_slice());
}

#[test]
fn test_save_is_upsert() {
    let store = CredentialStore::in_memory();
    let key = key("token", "auth");

    store.save(&key, "v1").unwrap();
    store.save(&key, "v2").unwrap();
    assert_eq!(store.load(&key).unwrap().unwrap().expose(), b"v2");
}

#[test]
fn test_update_requires_existing_entry() {
    let store = CredentialStore::in_memory();
    let err = store.update(&key("token", "missing"), "v").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        err,
        StoreError::NotFound {
            service: "token".to_string(),
            account: "missing".to_string(),
        }
    );
    assert!(store.load(&key("token", "missing")).unwrap().is_none());
}

#[test]
fn test_delete_is_idempotent() {
    let store = CredentialStore::in_memory();
    let key = key("token", "auth");

    store.delete(&key).unwrap();
    store.save(&key, "v").unwrap();
    store.delete(&key).unwrap();
    store.delete(&key).unwrap();
    assert!(!store.exists(&key).unwrap());
}

#[test]
fn test_key_isolation() {
    let store = CredentialStore::in_memory();
    let keys = [
        key("svc", "user"),
        key("svc", "other"),
        key("Svc", "user"),
        key("svc ", "user"),
        key("other", "user"),
    ];

    for (i, k) in keys.iter().enumerate() {
        store.save(k, format!("value-{}", i)).unwrap();
    }
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(
            store.load(k).unwrap().unwrap().to_text(),
            format!("value-{}", i)
        );
    }

    store.delete(&keys[0]).unwrap();
    assert!(store.load(&keys[0]).unwrap().is_none());
    assert!(store.exists(&keys[1]).unwrap());
}

#[test]
fn test_service_prefix() {
    let backend = Arc::new(MemoryBackend::new());
    let store = CredentialStore::from_backend(backend.clone()).with_prefix("myapp");
    let key = key("openai", "key");
    store.save(&key, "secret").unwrap();

    let spec = MatchSpec {
        class: ItemClass::GenericPassword,
        service: "myapp-openai".to_string(),
        account: "key".to_string(),
    };
    let (status, value) = backend.query(&QueryRequest::single(spec));
    assert_eq!(status, Status::Success);
    assert_eq!(value.unwrap().expose(), b"secret");

    // Unprefixed view of the same backend sees nothing
    let plain = CredentialStore::from_backend(backend);
    assert!(plain.load(&key).unwrap().is_none());
}

#[test]
fn test_load_or_env() {
    let store = CredentialStore::in_memory();
    let key = key("test", "user");
    let var = "KEYSTASH_TEST_LOAD_OR_ENV";

    std::env::set_var(var, "env-value");
    let result = store.load_or_env(&key, var).unwrap().unwrap();
    assert_eq!(result.expose(), b"env-value");
    std::env::remove_var(var);

    assert!(store.load_or_env(&key, var).unwrap().is_none());

    store.save(&key, "stored-value").unwrap();
    let result = store.load_or_env(&key, var).unwrap().unwrap();
    assert_eq!(result.expose(), b"stored-value");
}

#[test]
fn test_concurrent_saves_distinct_keys() {
    let store = CredentialStore::in_memory();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || {
                let key = key("svc", &format!("account-{}", i));
                store.save(&key, format!("secret-{}", i)).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for i in 0..8 {
        let key = key("svc", &format!("account-{}", i));
        assert_eq!(
            store.load(&key).unwrap().unwrap().to_text(),
            format!("secret-{}", i)
        );
    }
}

// ============================================================================
// Status mapping (scripted backend)
// ============================================================================

#[test]
fn test_save_duplicate_falls_back_to_single_update() {
    let mut backend = MockBackend::new();
    let mut seq = Sequence::new();
    backend
        .expect_create()
        .with(always())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Status::DuplicateItem);
    backend
        .expect_update()
        .withf(|request| request.value.expose() == b"v2" && request.spec.account == "auth")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Status::Success);

    let store = mock_store(backend);
    store.save(&key("token", "auth"), "v2").unwrap();
}

#[test]
fn test_save_new_entry_never_updates() {
    let mut backend = MockBackend::new();
    backend.expect_create().times(1).returning(|_| Status::Success);
    backend.expect_update().never();

    let store = mock_store(backend);
    store.save(&key("token", "auth"), "v").unwrap();
}

#[test]
fn test_save_failure_is_not_retried() {
    let mut backend = MockBackend::new();
    backend
        .expect_create()
        .times(1)
        .returning(|_| Status::failure(code::INTERACTION_NOT_ALLOWED, "locked"));
    backend.expect_update().never();

    let store = mock_store(backend);
    let err = store.save(&key("token", "auth"), "v").unwrap_err();
    assert_eq!(
        err,
        StoreError::BackendFailure {
            code: code::INTERACTION_NOT_ALLOWED,
            message: Some("locked".to_string()),
        }
    );
}

#[test]
fn test_save_duplicate_then_update_failure_surfaces() {
    let mut backend = MockBackend::new();
    backend.expect_create().times(1).returning(|_| Status::DuplicateItem);
    backend.expect_update().times(1).returning(|_| Status::Failure {
        code: code::AUTH_FAILED,
        detail: None,
    });

    let store = mock_store(backend);
    let err = store.save(&key("token", "auth"), "v").unwrap_err();
    assert_eq!(
        err,
        StoreError::BackendFailure {
            code: code::AUTH_FAILED,
            message: status_message(code::AUTH_FAILED).map(str::to_string),
        }
    );
}

#[test]
fn test_load_maps_statuses() {
    let mut backend = MockBackend::new();
    let mut seq = Sequence::new();
    backend
        .expect_query()
        .withf(|request| request.limit == 1 && request.return_data)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| (Status::ItemNotFound, None));
    backend
        .expect_query()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| (Status::failure(code::IO, "disk"), None));
    backend
        .expect_query()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| (Status::Success, None));

    let store = mock_store(backend);
    let key = key("token", "auth");

    assert!(store.load(&key).unwrap().is_none());
    assert_eq!(
        store.load(&key).unwrap_err(),
        StoreError::BackendFailure {
            code: code::IO,
            message: Some("disk".to_string()),
        }
    );
    match store.load(&key).unwrap_err() {
        StoreError::BackendFailure { code: c, .. } => assert_eq!(c, code::DECODE),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_update_maps_statuses() {
    let mut backend = MockBackend::new();
    let mut seq = Sequence::new();
    backend
        .expect_update()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Status::ItemNotFound);
    backend
        .expect_update()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Status::Failure {
            code: -1234,
            detail: None,
        });

    let store = mock_store(backend);
    let key = key("token", "auth");

    assert!(store.update(&key, "v").unwrap_err().is_not_found());
    assert_eq!(
        store.update(&key, "v").unwrap_err(),
        StoreError::BackendFailure {
            code: -1234,
            message: None,
        }
    );
}

#[test]
fn test_delete_maps_statuses() {
    let mut backend = MockBackend::new();
    let mut seq = Sequence::new();
    backend
        .expect_delete()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Status::ItemNotFound);
    backend
        .expect_delete()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Status::failure(code::NOT_AVAILABLE, "no keychain"));

    let store = mock_store(backend);
    let key = key("token", "auth");

    store.delete(&key).unwrap();
    let err = store.delete(&key).unwrap_err();
    assert!(!err.is_not_found());
    assert!(err.to_string().contains("no keychain"));
}

#[test]
fn test_store_error_display() {
    let err = StoreError::BackendFailure {
        code: -5,
        message: None,
    };
    assert_eq!(err.to_string(), "Backend failure (-5): no diagnostic");

    let err = StoreError::NotFound {
        service: "token".to_string(),
        account: "auth".to_string(),
    };
    assert_eq!(err.to_string(), "Credential not found: token:auth");
}
