//! DNS presence checks (A/AAAA and MX) behind the [`DomainResolver`] seam.

mod error;
mod resolver;
mod types;

pub use error::DnsError;
pub use resolver::{DomainResolver, SystemResolver, normalize_domain, resolve_with};
pub use types::{DnsOptions, MxRecord, MxStatus};
