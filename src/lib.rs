#![forbid(unsafe_code)]
//! mailscore_lib: scoring d'adresses e-mail: format, typos, DNS/MX,
//! listes de référence et réputation par domaine.

pub mod cache;
pub mod dns;
pub mod lists;
pub mod reputation;
pub mod scoring;
pub mod store;
pub mod validator;

pub use cache::{Cache, MemoryCache};
pub use dns::{DnsError, DnsOptions, DomainResolver, MxRecord, MxStatus, SystemResolver};
pub use lists::{ListSnapshot, ReferenceLists};
pub use reputation::{DomainReputation, NEUTRAL_SCORE, ReputationError, ReputationTracker};
pub use scoring::{
    Checks, VALID_THRESHOLD, ValidationResult, Validator, ValidatorBuilder, ValidatorOptions,
    correct_syntax_errors, detect_typo, is_bot_pattern, is_role_based, is_valid,
};
pub use store::{
    ListEntry, ListKind, MemoryStore, ReferenceStore, ReputationStore, StoreError,
};
pub use validator::{FormatIssue, FormatReport, ValidationMode, check_format};
