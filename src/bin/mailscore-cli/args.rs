use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use mailscore_lib::{DnsOptions, ValidationMode, ValidatorOptions};

#[derive(Parser)]
#[command(name = "mailscore-cli", version, about = "Score d'adresses e-mail (0-100)")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// nombre de threads pour le mode --stdin
    #[arg(long, default_value_t = 1)]
    pub jobs: usize,

    /// write report to file (human/JSON/NDJSON/CSV selon --format)
    #[arg(long)]
    pub out: Option<String>,

    /// mode: strict|relaxed
    #[arg(long, default_value = "strict")]
    pub mode: String,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// timeout DNS par requête (ms)
    #[arg(long = "dns-timeout-ms", default_value_t = 3_000)]
    pub dns_timeout_ms: u64,

    /// nombre de tentatives DNS
    #[arg(long = "dns-attempts", default_value_t = 2)]
    pub dns_attempts: usize,

    /// fichier de domaines jetables à ajouter (un par ligne, '#' = commentaire)
    #[arg(long = "disposable-list")]
    pub disposable_list: Option<PathBuf>,

    /// fichier de fournisseurs gratuits à ajouter
    #[arg(long = "free-list")]
    pub free_list: Option<PathBuf>,

    /// fichier de mots-clés "role" à ajouter (admin, support, ...)
    #[arg(long = "role-list")]
    pub role_list: Option<PathBuf>,

    /// n'utilise pas les listes intégrées
    #[arg(long = "no-default-lists")]
    pub no_default_lists: bool,

    /// fichier JSON de réputation, relu et réécrit entre deux exécutions
    /// (feature `with-serde`)
    #[arg(long = "reputation-file")]
    pub reputation_file: Option<PathBuf>,

    /// verbosité des logs sur stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// score une adresse
    Validate {
        /// mode: strict|relaxed (prend le pas sur l'option globale)
        #[arg(long)]
        mode: Option<String>,
        email: String,
    },
    /// enregistre un retour de délivrabilité pour un domaine
    Feedback {
        domain: String,
        #[command(flatten)]
        verdict: Verdict,
    },
    /// affiche la réputation courante d'un domaine
    Reputation { domain: String },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct Verdict {
    /// l'adresse a bien été délivrée
    #[arg(long)]
    pub valid: bool,
    /// l'adresse a rebondi
    #[arg(long)]
    pub invalid: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    /// Mode effectif: celui de `validate --mode` s'il est donné.
    pub fn parsed_mode(&self) -> ValidationMode {
        match &self.cmd {
            Some(Commands::Validate {
                mode: Some(mode), ..
            }) => mode_from_str(mode),
            _ => mode_from_str(&self.mode),
        }
    }

    pub fn dns_options(&self) -> DnsOptions {
        DnsOptions::default()
            .with_timeout(Duration::from_millis(self.dns_timeout_ms))
            .with_attempts(self.dns_attempts)
    }

    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions::new()
            .with_mode(self.parsed_mode())
            .with_dns(self.dns_options())
            .with_dns_pool(self.jobs)
    }
}

pub fn mode_from_str(s: &str) -> ValidationMode {
    match s {
        "relaxed" => ValidationMode::Relaxed,
        _ => ValidationMode::Strict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::clap_command().debug_assert();
    }

    #[test]
    fn subcommand_mode_wins() {
        let cli = Cli::try_parse_from(["mailscore-cli", "validate", "--mode", "relaxed", "a@b.com"])
            .expect("valid args");
        assert_eq!(cli.parsed_mode(), ValidationMode::Relaxed);
    }

    #[test]
    fn feedback_needs_a_verdict() {
        assert!(Cli::try_parse_from(["mailscore-cli", "feedback", "example.com"]).is_err());
        assert!(
            Cli::try_parse_from(["mailscore-cli", "feedback", "example.com", "--valid", "--invalid"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["mailscore-cli", "feedback", "example.com", "--invalid"]).is_ok());
    }

    #[test]
    fn dns_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "mailscore-cli",
            "--dns-timeout-ms",
            "500",
            "--dns-attempts",
            "1",
            "--stdin",
        ])
        .expect("valid args");
        let dns = cli.dns_options();
        assert_eq!(dns.timeout, Duration::from_millis(500));
        assert_eq!(dns.attempts, 1);
    }

    #[test]
    fn jobs_size_the_resolver_pool() {
        let cli = Cli::try_parse_from(["mailscore-cli", "--stdin", "--jobs", "6"]).expect("valid args");
        assert_eq!(cli.validator_options().dns_pool, 6);

        let cli = Cli::try_parse_from(["mailscore-cli", "--stdin", "--jobs", "0"]).expect("valid args");
        assert_eq!(cli.validator_options().dns_pool, 1);
    }
}
