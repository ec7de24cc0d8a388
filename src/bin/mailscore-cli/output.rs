use anyhow::{Context, Result, bail};

use crate::args::Cli;
use mailscore_lib::{DomainReputation, VALID_THRESHOLD, ValidationResult};

pub fn write_reports(rows: &[ValidationResult], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(rows, cli),
        "json" => write_json(rows, cli),
        "ndjson" => write_ndjson(rows, cli),
        "csv" => write_csv(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn any_invalid(rows: &[ValidationResult]) -> bool {
    rows.iter().any(|row| !row.valid)
}

/// Une ligne de statut, plus une ligne `suggestion:` si besoin.
pub fn human_lines(row: &ValidationResult) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    if row.valid {
        lines.push(format!("[OK]    {} (score {})", row.email, row.score));
    } else {
        let mut failures: Vec<String> = row
            .checks
            .failures()
            .into_iter()
            .map(str::to_string)
            .collect();
        if failures.is_empty() {
            failures.push(format!("score < {VALID_THRESHOLD}"));
        }
        lines.push(format!(
            "[INVALID] {} (score {}) :: {}",
            row.email,
            row.score,
            failures.join("; ")
        ));
    }
    if let Some(suggestion) = &row.suggestion {
        lines.push(format!("        suggestion: {suggestion}"));
    }
    lines
}

pub fn reputation_line(domain: &str, score: u8, row: Option<&DomainReputation>) -> String {
    match row {
        Some(row) => format!(
            "{domain}: {score} ({} valid / {} invalid / {} total)",
            row.valid_count, row.invalid_count, row.total_validations
        ),
        None => format!("{domain}: {score} (no history)"),
    }
}

fn write_human(rows: &[ValidationResult], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = String::new();
        for line in rows.iter().flat_map(human_lines) {
            buf.push_str(&line);
            buf.push('\n');
        }
        write_all_atomically(path, buf.as_bytes())?;
    } else {
        for row in rows {
            for line in human_lines(row) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[ValidationResult], cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[ValidationResult], _: &Cli) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(rows: &[ValidationResult], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = Vec::new();
        for row in rows {
            let line = serde_json::to_string(row)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[ValidationResult], _: &Cli) -> Result<()> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-csv")]
const CSV_HEADER: [&str; 15] = [
    "email",
    "valid",
    "score",
    "suggestion",
    "format",
    "typo",
    "dns",
    "mx_records",
    "disposable",
    "free_provider",
    "role_based",
    "bot_pattern",
    "syntax_corrected",
    "catch_all",
    "domain_reputation",
];

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[ValidationResult], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[ValidationResult], _: &Cli) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

#[cfg(feature = "with-csv")]
fn csv_record(row: &ValidationResult) -> Vec<String> {
    let checks = &row.checks;
    vec![
        row.email.clone(),
        row.valid.to_string(),
        row.score.to_string(),
        row.suggestion.clone().unwrap_or_default(),
        checks.format.to_string(),
        checks.typo.to_string(),
        bool_opt_str(checks.dns).to_string(),
        bool_opt_str(checks.mx_records).to_string(),
        bool_opt_str(checks.disposable).to_string(),
        bool_opt_str(checks.free_provider).to_string(),
        bool_opt_str(checks.role_based).to_string(),
        bool_opt_str(checks.bot_pattern).to_string(),
        bool_opt_str(checks.syntax_corrected).to_string(),
        bool_opt_str(checks.catch_all).to_string(),
        checks
            .domain_reputation
            .map(|score| score.to_string())
            .unwrap_or_default(),
    ]
}

#[cfg(feature = "with-csv")]
fn bool_opt_str(opt: Option<bool>) -> &'static str {
    match opt {
        Some(true) => "true",
        Some(false) => "false",
        None => "",
    }
}

pub fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
