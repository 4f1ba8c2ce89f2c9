use std::fmt;

/// Machine-readable error codes for stable CLI and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    TaskFileMissing,
    TaskNotFound,
    InvalidEnumValue,
    InvalidDate,
    CsvMalformed,
    CsvMissingColumn,
    ImportRowCapExceeded,
    SourceUnavailable,
    SourceRejected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::TaskFileMissing => "E1003",
            Self::TaskNotFound => "E2001",
            Self::InvalidEnumValue => "E2005",
            Self::InvalidDate => "E2006",
            Self::CsvMalformed => "E4001",
            Self::CsvMissingColumn => "E4002",
            Self::ImportRowCapExceeded => "E4003",
            Self::SourceUnavailable => "E5001",
            Self::SourceRejected => "E5002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::TaskFileMissing => "Task file not found",
            Self::TaskNotFound => "Task not found",
            Self::InvalidEnumValue => "Invalid status/priority value",
            Self::InvalidDate => "Invalid calendar date",
            Self::CsvMalformed => "Malformed CSV input",
            Self::CsvMissingColumn => "Required CSV column missing",
            Self::ImportRowCapExceeded => "Import row limit exceeded",
            Self::SourceUnavailable => "Task source unavailable",
            Self::SourceRejected => "Task source rejected the request",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .clientdesk/config.toml and retry."),
            Self::TaskFileMissing => Some("Pass --file with the path to a JSON task list."),
            Self::TaskNotFound => Some("List tasks with `cdesk tasks` to find a valid id."),
            Self::InvalidEnumValue => Some(
                "Use todo|in_progress|closed for status and low|medium|high for priority.",
            ),
            Self::InvalidDate => Some("Use calendar dates in YYYY-MM-DD form."),
            Self::CsvMalformed => Some("Re-export the file as UTF-8 CSV with a header row."),
            Self::CsvMissingColumn => Some("Add `name` and `email` columns to the header row."),
            Self::ImportRowCapExceeded => Some(
                "Split the file, or set import.on_overflow = \"truncate\" in the config.",
            ),
            Self::SourceUnavailable => Some("Retry the operation once the source is reachable."),
            Self::SourceRejected => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 10] = [
        ErrorCode::ConfigParseError,
        ErrorCode::TaskFileMissing,
        ErrorCode::TaskNotFound,
        ErrorCode::InvalidEnumValue,
        ErrorCode::InvalidDate,
        ErrorCode::CsvMalformed,
        ErrorCode::CsvMissingColumn,
        ErrorCode::ImportRowCapExceeded,
        ErrorCode::SourceUnavailable,
        ErrorCode::SourceRejected,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let rendered = code.code();
            assert_eq!(rendered.len(), 5);
            assert!(rendered.starts_with('E'));
            assert!(rendered.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn display_matches_code() {
        assert_eq!(ErrorCode::ImportRowCapExceeded.to_string(), "E4003");
    }
}
