use std::fmt;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Strict,
    Relaxed,
}

/// One reason an address failed the format check.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatIssue {
    TooLong(usize),
    AtSignCount(usize),
    LocalLength(usize),
    InvalidLocal(ValidationMode),
    DomainIdna,
    DomainEmpty,
    DomainWithoutDot,
    EmptyLabel,
    LabelTooLong { label: String, len: usize },
    LabelHyphen(String),
    LabelChars(String),
}

impl fmt::Display for FormatIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong(len) => write!(f, "total length {len} > 254"),
            Self::AtSignCount(count) => write!(f, "must contain exactly one '@' (found {count})"),
            Self::LocalLength(len) => write!(f, "local part length {len} invalid (1..=64)"),
            Self::InvalidLocal(ValidationMode::Strict) => f.write_str("invalid local part (strict rules)"),
            Self::InvalidLocal(ValidationMode::Relaxed) => {
                f.write_str("invalid local part (relaxed rules)")
            }
            Self::DomainIdna => f.write_str("domain punycode conversion failed"),
            Self::DomainEmpty => f.write_str("domain empty after IDNA conversion"),
            Self::DomainWithoutDot => f.write_str("domain must contain at least one dot"),
            Self::EmptyLabel => f.write_str("empty domain label"),
            Self::LabelTooLong { label, len } => {
                write!(f, "domain label '{label}' length {len} > 63")
            }
            Self::LabelHyphen(label) => write!(f, "domain label '{label}' cannot start/end with '-'"),
            Self::LabelChars(label) => write!(f, "domain label '{label}' has invalid chars"),
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatReport {
    pub ok: bool,
    pub issues: Vec<FormatIssue>,
}

impl FormatReport {
    pub(crate) fn from_issues(issues: Vec<FormatIssue>) -> Self {
        Self {
            ok: issues.is_empty(),
            issues,
        }
    }

    pub fn reasons(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}
