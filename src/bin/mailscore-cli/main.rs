mod args;
mod output;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use mailscore_lib::{
    ListKind, MemoryCache, MemoryStore, ReputationStore, ReputationTracker, Validator,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = Arc::new(build_store(&cli)?);
    load_reputations(&store, cli.reputation_file.as_deref())?;

    let emails = match &cli.cmd {
        Some(Commands::Feedback { domain, verdict }) => {
            return feedback(&cli, store, domain, verdict.valid);
        }
        Some(Commands::Reputation { domain }) => return reputation(store, domain),
        Some(Commands::Validate { email, .. }) => vec![email.clone()],
        None if cli.stdin => read_stdin()?,
        None => {
            Cli::clap_command().print_help()?;
            println!();
            return Ok(());
        }
    };

    let validator = Validator::builder()
        .options(cli.validator_options())
        .store(store)
        .build()
        .context("init DNS resolver")?;

    let rows = validator.validate_many(&emails, cli.jobs);
    output::write_reports(&rows, &cli)?;

    // codes de sortie : 0 OK, 2 invalids, 1 fatal
    if output::any_invalid(&rows) {
        std::process::exit(2);
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_stdin() -> Result<Vec<String>> {
    let mut emails = Vec::new();
    for line in io::stdin().lock().lines() {
        let email = line.context("read stdin")?;
        if !email.is_empty() {
            emails.push(email);
        }
    }
    Ok(emails)
}

fn build_store(cli: &Cli) -> Result<MemoryStore> {
    let store = if cli.no_default_lists {
        MemoryStore::new()
    } else {
        MemoryStore::with_defaults()
    };
    for (kind, path) in [
        (ListKind::Disposable, cli.disposable_list.as_deref()),
        (ListKind::FreeProvider, cli.free_list.as_deref()),
        (ListKind::RoleKeyword, cli.role_list.as_deref()),
    ] {
        let Some(path) = path else { continue };
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let added = store
            .load_list(kind, BufReader::new(file))
            .with_context(|| format!("read {}", path.display()))?;
        debug!(list = %kind, added, path = %path.display(), "list file merged");
    }
    Ok(store)
}

fn feedback(cli: &Cli, store: Arc<MemoryStore>, domain: &str, was_valid: bool) -> Result<()> {
    let Some(path) = cli.reputation_file.as_deref() else {
        bail!("feedback nécessite --reputation-file pour conserver le résultat");
    };
    let tracker = ReputationTracker::new(store.clone(), Arc::new(MemoryCache::<u8>::new()));
    let row = tracker.update_domain_reputation(domain, was_valid)?;
    save_reputations(&store, path)?;
    println!("{}", output::reputation_line(&row.domain, row.score, Some(&row)));
    Ok(())
}

fn reputation(store: Arc<MemoryStore>, domain: &str) -> Result<()> {
    let domain = domain.trim().to_lowercase();
    let row = store.find(&domain)?;
    let tracker = ReputationTracker::new(store, Arc::new(MemoryCache::<u8>::new()));
    let score = tracker.get_domain_reputation(&domain);
    println!("{}", output::reputation_line(&domain, score, row.as_ref()));
    Ok(())
}

#[cfg(feature = "with-serde")]
fn load_reputations(store: &MemoryStore, path: Option<&Path>) -> Result<()> {
    let Some(path) = path else { return Ok(()) };
    if !path.exists() {
        return Ok(());
    }
    let json =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let restored = store
        .restore_reputations_json(&json)
        .with_context(|| format!("parse {}", path.display()))?;
    debug!(restored, path = %path.display(), "reputation snapshot loaded");
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn load_reputations(_: &MemoryStore, path: Option<&Path>) -> Result<()> {
    if path.is_some() {
        bail!("--reputation-file nécessite la feature 'with-serde'");
    }
    Ok(())
}

#[cfg(feature = "with-serde")]
fn save_reputations(store: &MemoryStore, path: &Path) -> Result<()> {
    let json = store.reputations_to_json()?;
    let path = path.to_string_lossy();
    output::write_all_atomically(&path, json.as_bytes())
}

#[cfg(not(feature = "with-serde"))]
fn save_reputations(_: &MemoryStore, _: &Path) -> Result<()> {
    bail!("--reputation-file nécessite la feature 'with-serde'")
}
