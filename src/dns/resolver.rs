use std::sync::atomic::{AtomicUsize, Ordering};

use trust_dns_resolver::{
    Resolver,
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    system_conf::read_system_conf,
};

use super::{DnsError, DnsOptions, MxRecord, MxStatus};

/// Presence lookups the scoring pipeline needs from DNS.
///
/// Implementations receive an ASCII (IDNA-normalized) domain. A domain that
/// exists but has no record of the requested type is `Ok(false)` /
/// `Ok(vec![])`, not an error.
pub trait DomainResolver: Send + Sync {
    fn lookup_address(&self, ascii_domain: &str) -> Result<bool, DnsError>;
    fn lookup_mx(&self, ascii_domain: &str) -> Result<Vec<MxRecord>, DnsError>;
}

/// System resolver (`/etc/resolv.conf`) with bounded timeouts.
///
/// The synchronous trust-dns resolver runs every query under one runtime
/// lock, so concurrent callers need a pool of them: lookups rotate over
/// `pool_size` resolvers.
pub struct SystemResolver {
    pool: Vec<Resolver>,
    next: AtomicUsize,
}

impl SystemResolver {
    /// `size` independent resolvers (at least one) built from the system
    /// configuration.
    pub fn with_pool(options: &DnsOptions, size: usize) -> Result<Self, DnsError> {
        let (config, opts) = read_system_conf().map_err(DnsError::resolver_init)?;
        Self::with_config(config, opts, options, size)
    }

    pub fn with_config(
        config: ResolverConfig,
        mut opts: ResolverOpts,
        options: &DnsOptions,
        size: usize,
    ) -> Result<Self, DnsError> {
        opts.timeout = options.timeout;
        opts.attempts = options.attempts;
        let size = size.max(1);
        let mut pool = Vec::with_capacity(size);
        for _ in 0..size {
            pool.push(Resolver::new(config.clone(), opts.clone()).map_err(DnsError::resolver_init)?);
        }
        Ok(Self {
            pool,
            next: AtomicUsize::new(0),
        })
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    fn pick(&self) -> &Resolver {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.pool.len();
        &self.pool[idx]
    }
}

impl DomainResolver for SystemResolver {
    fn lookup_address(&self, ascii_domain: &str) -> Result<bool, DnsError> {
        match self.pick().lookup_ip(fqdn(ascii_domain).as_str()) {
            Ok(lookup) => Ok(lookup.iter().next().is_some()),
            Err(err) if is_no_records(&err) => Ok(false),
            Err(err) => Err(DnsError::lookup("A/AAAA", ascii_domain, err)),
        }
    }

    fn lookup_mx(&self, ascii_domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        let lookup = match self.pick().mx_lookup(fqdn(ascii_domain).as_str()) {
            Ok(lookup) => lookup,
            Err(err) if is_no_records(&err) => return Ok(Vec::new()),
            Err(err) => return Err(DnsError::lookup("MX", ascii_domain, err)),
        };
        Ok(lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), normalize_exchange(&mx.exchange().to_utf8())))
            .collect())
    }
}

/// Sorted, deduplicated MX records of `ascii_domain`.
pub fn resolve_with<R>(resolver: &R, ascii_domain: &str) -> Result<MxStatus, DnsError>
where
    R: DomainResolver + ?Sized,
{
    let mut records = resolver.lookup_mx(ascii_domain)?;

    records.sort();
    records.dedup();

    if records.is_empty() {
        Ok(MxStatus::NoRecords)
    } else {
        Ok(MxStatus::Records(records))
    }
}

pub fn normalize_domain(domain: &str) -> Result<String, DnsError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(DnsError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(DnsError::idna)
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

// absolute name: search domains from resolv.conf must not be appended
fn fqdn(ascii_domain: &str) -> String {
    if ascii_domain.ends_with('.') {
        ascii_domain.to_string()
    } else {
        format!("{ascii_domain}.")
    }
}

fn is_no_records(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}
