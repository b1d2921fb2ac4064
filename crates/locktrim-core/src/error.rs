use std::fmt;

/// Machine-readable error codes for scripts and agents driving locktrim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    LockfileUnreadable,
    ConfigParseError,
    InvalidCategoryPattern,
    NameCollision,
    NoRoots,
    UnknownCategory,
    OutputWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::LockfileUnreadable => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InvalidCategoryPattern => "E1003",
            Self::NameCollision => "E2001",
            Self::NoRoots => "E2002",
            Self::UnknownCategory => "E2003",
            Self::OutputWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::LockfileUnreadable => "Lockfile could not be read",
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidCategoryPattern => "Invalid category pattern",
            Self::NameCollision => "Duplicate package name",
            Self::NoRoots => "No root packages given",
            Self::UnknownCategory => "Unknown category label",
            Self::OutputWriteFailed => "Output file write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::LockfileUnreadable => Some("Check the --lockfile path and that it is UTF-8 text."),
            Self::ConfigParseError => Some("Fix syntax in locktrim.toml and retry."),
            Self::InvalidCategoryPattern => {
                Some("Fix the `regex` entries of the offending [[categories]] rule.")
            }
            Self::NameCollision => {
                Some("Use --collision qualify (or first-wins/last-wins) to index duplicate names.")
            }
            Self::NoRoots => Some("Pass --root NAME or set `roots` in locktrim.toml."),
            Self::UnknownCategory => Some("Run `locktrim summary` to list category labels."),
            Self::OutputWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
