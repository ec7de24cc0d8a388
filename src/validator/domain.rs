use super::types::FormatIssue;

const MAX_LABEL_LEN: usize = 63;

/// Valide le domaine: conversion IDNA puis contrôle label par label.
pub(crate) fn check_domain(domain: &str, issues: &mut Vec<FormatIssue>) {
    let Ok(ascii) = idna::domain_to_ascii(domain) else {
        issues.push(FormatIssue::DomainIdna);
        return;
    };

    if ascii.is_empty() {
        issues.push(FormatIssue::DomainEmpty);
        return;
    }

    if !ascii.contains('.') {
        issues.push(FormatIssue::DomainWithoutDot);
    }

    for label in ascii.split('.') {
        if let Some(issue) = label_issue(label) {
            issues.push(issue);
        }
    }
}

fn label_issue(label: &str) -> Option<FormatIssue> {
    if label.is_empty() {
        return Some(FormatIssue::EmptyLabel);
    }
    if label.len() > MAX_LABEL_LEN {
        return Some(FormatIssue::LabelTooLong {
            label: label.to_string(),
            len: label.len(),
        });
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Some(FormatIssue::LabelHyphen(label.to_string()));
    }
    if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Some(FormatIssue::LabelChars(label.to_string()));
    }
    None
}
