use std::sync::Arc;

use proptest::prelude::*;

use super::types::clamp_score;
use super::*;
use crate::dns::tests::StubResolver;
use crate::store::{ListEntry, ListKind, StoreError};
use crate::validator::ValidationMode;

fn stub() -> StubResolver {
    StubResolver::new()
        .with_mail_domain("example.com")
        .with_mail_domain("gmail.com")
        .with_mail_domain("mailinator.com")
        .with_web_only_domain("nomail.test")
        .with_failing_domain("slow.test")
}

fn build(resolver: Arc<StubResolver>, store: Arc<MemoryStore>) -> Validator {
    Validator::builder()
        .resolver(resolver)
        .store(store)
        .build()
        .expect("stub resolver needs no system config")
}

fn setup() -> (Arc<StubResolver>, Arc<MemoryStore>, Validator) {
    let resolver = Arc::new(stub());
    let store = Arc::new(MemoryStore::with_defaults());
    let validator = build(resolver.clone(), store.clone());
    (resolver, store, validator)
}

struct DownStore;

impl ReferenceStore for DownStore {
    fn entries(&self, _: ListKind) -> Result<Vec<ListEntry>, StoreError> {
        Err(StoreError::unavailable("database offline"))
    }
}

impl ReputationStore for DownStore {
    fn find(&self, _: &str) -> Result<Option<DomainReputation>, StoreError> {
        Err(StoreError::unavailable("database offline"))
    }

    fn upsert_with(
        &self,
        _: &str,
        _: &mut dyn FnMut(&mut DomainReputation),
    ) -> Result<DomainReputation, StoreError> {
        Err(StoreError::unavailable("database offline"))
    }
}

#[test]
fn missing_at_sign_short_circuits_without_dns() {
    let (resolver, _, validator) = setup();
    for input in ["", "plainaddress", "user.gmail.com"] {
        let result = validator.validate(input);
        assert!(!result.valid);
        assert_eq!(result.score, 0);
        assert!(!result.checks.format);
        assert!(!result.checks.typo);
        assert_eq!(result.checks.dns, None);
        assert_eq!(result.suggestion, None);
    }
    assert_eq!(resolver.calls(), 0);
}

#[test]
fn malformed_address_still_gets_typo_suggestion() {
    let (resolver, _, validator) = setup();
    let result = validator.validate("user name@gmial.com");
    assert_eq!(result.score, 0);
    assert!(!result.checks.format);
    assert!(result.checks.typo);
    assert_eq!(result.suggestion.as_deref(), Some("user name@gmail.com"));
    assert_eq!(result.checks.mx_records, None);
    assert_eq!(resolver.calls(), 0);
}

#[test]
fn typo_domain_is_suggested_and_penalized() {
    let (_, _, validator) = setup();
    let result = validator.validate("user@gmial.com");
    assert!(result.checks.typo);
    assert_eq!(result.suggestion.as_deref(), Some("user@gmail.com"));
    // gmial.com does not resolve: 15 - 5, then stop
    assert_eq!(result.checks.dns, Some(false));
    assert_eq!(result.checks.mx_records, None);
    assert_eq!(result.score, 10);
    assert!(!result.valid);
}

#[test]
fn exact_common_domain_is_not_a_typo() {
    let (_, _, validator) = setup();
    let result = validator.validate("user@gmail.com");
    assert!(!result.checks.typo);
    assert_eq!(result.suggestion, None);
    assert_eq!(result.checks.free_provider, Some(false));
    assert_eq!(result.score, 85);
    assert!(result.valid);
}

#[test]
fn clean_address_collects_every_check() {
    let (_, _, validator) = setup();
    let result = validator.validate("john.doe@example.com");
    let expected = Checks {
        format: true,
        typo: false,
        dns: Some(true),
        mx_records: Some(true),
        disposable: Some(true),
        free_provider: Some(true),
        role_based: Some(true),
        bot_pattern: Some(true),
        syntax_corrected: Some(false),
        catch_all: Some(false),
        domain_reputation: Some(50),
    };
    assert_eq!(result.checks, expected);
    assert_eq!(result.score, 90);
    assert!(result.valid);
    assert!(result.checks.failures().is_empty());
    assert_eq!(result.email, "john.doe@example.com");
}

#[test]
fn missing_mx_stops_after_dns_points() {
    let (_, _, validator) = setup();
    let result = validator.validate("john.doe@nomail.test");
    assert_eq!(result.checks.dns, Some(true));
    assert_eq!(result.checks.mx_records, Some(false));
    assert_eq!(result.checks.disposable, None);
    assert_eq!(result.checks.domain_reputation, None);
    assert_eq!(result.score, 35);
    assert!(!result.valid);
    assert_eq!(result.checks.failures(), vec!["mx_records"]);
}

#[test]
fn dns_timeout_counts_as_missing_record() {
    let (_, _, validator) = setup();
    let result = validator.validate("john.doe@slow.test");
    assert_eq!(result.checks.dns, Some(false));
    assert_eq!(result.score, 15);
}

#[test]
fn score_of_59_fails_even_when_gate_passes() {
    let (_, _, validator) = setup();
    // 15 + 20 + 20 + 10 (not disposable) + 0 (free) + 10 (not role) - 15 (bot)
    let before = validator.validate("12345678@gmail.com");
    assert_eq!(before.score, 60);
    assert!(before.valid);

    for was_valid in [true, true, false, false, false] {
        validator
            .update_domain_reputation("gmail.com", was_valid)
            .expect("in-memory store");
    }
    assert_eq!(validator.get_domain_reputation("gmail.com"), 40);

    let after = validator.validate("12345678@gmail.com");
    assert_eq!(after.checks.domain_reputation, Some(40));
    assert_eq!(after.score, 59);
    assert!(after.checks.passes_gate());
    assert!(!after.valid);
}

#[test]
fn disposable_domain_fails_at_exactly_60() {
    let (_, _, validator) = setup();
    let result = validator.validate("john.doe@mailinator.com");
    assert_eq!(result.checks.disposable, Some(false));
    assert_eq!(result.score, 60);
    assert!(!result.valid);
}

#[test]
fn gate_requires_score_and_hard_checks() {
    let passing = Checks {
        format: true,
        dns: Some(true),
        mx_records: Some(true),
        disposable: Some(true),
        ..Checks::default()
    };
    assert!(!is_valid(59, &passing));
    assert!(is_valid(60, &passing));

    let disposable = Checks {
        disposable: Some(false),
        ..passing.clone()
    };
    assert!(!is_valid(60, &disposable));
    assert!(!is_valid(100, &Checks::default()));
}

#[test]
fn stacked_penalties_bottom_out_at_zero() {
    let resolver = Arc::new(stub().with_mail_domain("gmial.com"));
    let store = Arc::new(MemoryStore::with_defaults());
    store.insert(ListKind::Disposable, "gmial.com");
    store.insert(ListKind::FreeProvider, "gmial.com");
    let validator = build(resolver, store);
    validator
        .update_domain_reputation("gmial.com", false)
        .expect("in-memory store");

    let result = validator.validate("admin.12345678@gmial.com");
    assert!(result.checks.typo);
    assert_eq!(result.checks.role_based, Some(false));
    assert_eq!(result.checks.bot_pattern, Some(false));
    assert_eq!(result.checks.domain_reputation, Some(0));
    assert_eq!(result.score, 0);
    assert_eq!(result.suggestion.as_deref(), Some("admin.12345678@gmail.com"));
}

#[test]
fn clamp_bounds() {
    assert_eq!(clamp_score(-30), 0);
    assert_eq!(clamp_score(130), 100);
    assert_eq!(clamp_score(59), 59);
}

#[test]
fn reputation_nudges_score_by_at_most_five() {
    let (_, _, validator) = setup();
    validator
        .update_domain_reputation("example.com", true)
        .expect("in-memory store");
    assert_eq!(validator.validate("john.doe@example.com").score, 95);
    assert_eq!(reputation_adjustment(0), -5);
    assert_eq!(reputation_adjustment(45), 0);
    assert_eq!(reputation_adjustment(59), 0);
    assert_eq!(reputation_adjustment(100), 5);
}

#[test]
fn validate_is_idempotent() {
    let (_, store, validator) = setup();
    for email in ["john.doe@example.com", "user@gmial.com", "not-an-email"] {
        assert_eq!(validator.validate(email), validator.validate(email));
    }
    assert!(store.reputations().is_empty());
}

#[test]
fn reputation_feedback_counts() {
    let (_, _, validator) = setup();
    let row = validator
        .update_domain_reputation("example.com", true)
        .expect("in-memory store");
    assert_eq!((row.total_validations, row.valid_count, row.score), (1, 1, 100));

    let row = validator
        .update_domain_reputation("example.com", false)
        .expect("in-memory store");
    assert_eq!(
        (row.total_validations, row.valid_count, row.invalid_count, row.score),
        (2, 1, 1, 50)
    );
    assert_eq!(validator.get_domain_reputation("unknown.test"), 50);
}

#[test]
fn list_edits_apply_after_refresh() {
    let (_, store, validator) = setup();
    assert_eq!(
        validator.validate("john.doe@example.com").checks.disposable,
        Some(true)
    );

    store.insert(ListKind::Disposable, "example.com");
    assert_eq!(
        validator.validate("john.doe@example.com").checks.disposable,
        Some(true)
    );

    validator.refresh_cache();
    let result = validator.validate("john.doe@example.com");
    assert_eq!(result.checks.disposable, Some(false));
    assert!(!result.valid);
}

#[test]
fn syntax_correction_overrides_typo_suggestion() {
    let resolver = Arc::new(stub().with_mail_domain("gmial.com"));
    let validator = Validator::builder()
        .options(ValidatorOptions::new().with_mode(ValidationMode::Relaxed))
        .resolver(resolver)
        .build()
        .expect("stub resolver");

    let result = validator.validate("\"john doe\"@gmial.com");
    assert!(result.checks.format);
    assert!(result.checks.typo);
    assert_eq!(result.checks.syntax_corrected, Some(true));
    assert_eq!(result.suggestion.as_deref(), Some("\"johndoe\"@gmial.com"));
}

#[test]
fn store_outage_degrades_to_neutral_results() {
    let validator = Validator::builder()
        .resolver(Arc::new(stub()))
        .reference_store(Arc::new(DownStore))
        .reputation_store(Arc::new(DownStore))
        .build()
        .expect("stub resolver");

    let result = validator.validate("support@mailinator.com");
    assert_eq!(result.checks.disposable, Some(true));
    assert_eq!(result.checks.role_based, Some(true));
    assert_eq!(result.checks.domain_reputation, Some(50));
    assert_eq!(result.score, 90);
    assert!(validator.update_domain_reputation("mailinator.com", true).is_err());
}

#[test]
fn custom_common_domains_drive_typos() {
    let validator = Validator::builder()
        .options(ValidatorOptions::new().with_common_domains(["Proton.me"]))
        .resolver(Arc::new(stub()))
        .build()
        .expect("stub resolver");
    let result = validator.validate("user@protn.me");
    assert_eq!(result.suggestion.as_deref(), Some("user@proton.me"));
    assert!(!validator.validate("user@gmial.com").checks.typo);
}

#[test]
fn bulk_validation_preserves_order() {
    let (_, _, validator) = setup();
    let emails = vec![
        "john.doe@example.com",
        "nope",
        "user@gmial.com",
        "12345678@gmail.com",
        "john.doe@mailinator.com",
        "john.doe@nomail.test",
        "support@example.com",
    ];
    let sequential: Vec<ValidationResult> =
        emails.iter().map(|email| validator.validate(email)).collect();
    let parallel = validator.validate_many(&emails, 3);
    assert_eq!(parallel, sequential);
    assert_eq!(validator.validate_many(&emails, 1), sequential);
}

proptest! {
    #[test]
    fn without_at_sign_score_is_zero(input in "[^@]{0,40}") {
        let validator = build(Arc::new(stub()), Arc::new(MemoryStore::with_defaults()));
        let result = validator.validate(&input);
        prop_assert!(!result.valid);
        prop_assert_eq!(result.score, 0);
        prop_assert_eq!(result.checks.dns, None);
    }

    #[test]
    fn verdict_always_follows_gate(
        local in "[a-z0-9._-]{1,16}",
        domain in prop::sample::select(vec![
            "example.com", "gmail.com", "mailinator.com", "nomail.test", "gmial.com",
        ]),
    ) {
        let validator = build(Arc::new(stub()), Arc::new(MemoryStore::with_defaults()));
        let result = validator.validate(&format!("{local}@{domain}"));
        prop_assert!(result.score <= 100);
        prop_assert_eq!(
            result.valid,
            result.score >= VALID_THRESHOLD && result.checks.passes_gate()
        );
    }
}
