// CampaignLens - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Field-level recoveries never surface here; only load, export and
// configuration failures do.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all CampaignLens operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum CampaignLensError {
    /// Dataset loading failed.
    Load(LoadError),

    /// Export of the normalised table or report failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for CampaignLensError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "Load error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for CampaignLensError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Errors that abort a dataset load. Each one becomes the single diagnostic
/// reported by the permissive loader.
#[derive(Debug)]
pub enum LoadError {
    /// The dataset file does not exist.
    NotFound { path: PathBuf },

    /// The dataset file exists but could not be read.
    Io { path: PathBuf, source: io::Error },

    /// The CSV reader rejected the file (ragged rows, bad quoting).
    Csv { path: PathBuf, source: csv::Error },

    /// The file has no header line.
    EmptyHeader { path: PathBuf },

    /// One or more required columns are absent from the header.
    MissingColumns { path: PathBuf, missing: Vec<String> },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "Dataset '{}' does not exist", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Could not read dataset '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "Malformed CSV in '{}': {source}", path.display())
            }
            Self::EmptyHeader { path } => {
                write!(f, "Dataset '{}' has no header line", path.display())
            }
            Self::MissingColumns { path, missing } => write!(
                f,
                "Dataset '{}' is missing required column(s): {}",
                path.display(),
                missing.join(", ")
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<LoadError> for CampaignLensError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

// ---------------------------------------------------------------------------
// Locale number errors
// ---------------------------------------------------------------------------

/// Why a Spanish-locale numeric string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleNumberError {
    /// The input was empty or whitespace only.
    Empty,

    /// The input does not follow the digit-group grammar.
    Malformed { input: String },

    /// The digits parsed but the value is not finite.
    NotFinite { input: String },
}

impl fmt::Display for LocaleNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty numeric value"),
            Self::Malformed { input } => {
                write!(f, "'{input}' is not a locale-formatted number")
            }
            Self::NotFinite { input } => write!(f, "'{input}' is out of range"),
        }
    }
}

impl std::error::Error for LocaleNumberError {}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for CampaignLensError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for CampaignLensError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for CampaignLens results.
pub type Result<T> = std::result::Result<T, CampaignLensError>;
