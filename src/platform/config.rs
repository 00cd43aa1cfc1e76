// CampaignLens - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Resolved platform paths for CampaignLens configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/campaignlens/ or %APPDATA%\CampaignLens\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Location of config.toml inside the config directory.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// Report format
// =============================================================================

/// Output format of the analysis report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!(
                "unknown report format \"{other}\" (expected \"text\" or \"json\")"
            )),
        }
    }
}

/// Parse a delimiter setting: a single ASCII character, or the word `tab`.
pub fn parse_delimiter(s: &str) -> Option<u8> {
    if s.eq_ignore_ascii_case("tab") || s == "\t" {
        return Some(b'\t');
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && !c.is_ascii_alphanumeric() && c != '"' => {
            Some(c as u8)
        }
        _ => None,
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[data]` section.
    pub data: DataSection,
    /// `[analysis]` section.
    pub analysis: AnalysisSection,
    /// `[report]` section.
    pub report: ReportSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[data]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Dataset CSV path.
    pub path: Option<String>,
    /// Field delimiter (single character or "tab"). Unset = auto-detect.
    pub delimiter: Option<String>,
}

/// `[analysis]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Fraction of the median below which a campaign is short.
    pub short_ratio: Option<f64>,
    /// Fraction of the median up to which a campaign is medium.
    pub long_ratio: Option<f64>,
}

/// `[report]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// "text" or "json".
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Dataset path, if configured.
    pub dataset_path: Option<PathBuf>,
    /// Delimiter override; `None` = detect from the header.
    pub delimiter: Option<u8>,
    /// Short/medium boundary as a fraction of the median.
    pub short_ratio: f64,
    /// Medium/long boundary as a fraction of the median.
    pub long_ratio: f64,
    /// Report output format.
    pub report_format: ReportFormat,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            delimiter: None,
            short_ratio: constants::DEFAULT_SHORT_RATIO,
            long_ratio: constants::DEFAULT_LONG_RATIO,
            report_format: ReportFormat::Text,
            log_level: None,
        }
    }
}

fn out_of_range(field: &str, value: impl ToString, expected: impl ToString) -> String {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
    .to_string()
}

/// Validate a parsed config against named constants, accumulating warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    // -- Data --
    if let Some(path) = raw.data.path.filter(|p| !p.trim().is_empty()) {
        config.dataset_path = Some(PathBuf::from(path));
    }
    if let Some(ref delim) = raw.data.delimiter {
        match parse_delimiter(delim) {
            Some(d) => config.delimiter = Some(d),
            None => warnings.push(out_of_range(
                "[data] delimiter",
                delim,
                "a single punctuation character or \"tab\"; auto-detecting",
            )),
        }
    }

    // -- Analysis: thresholds --
    let ratio_ok = |r: f64| r.is_finite() && r > 0.0 && r <= constants::MAX_THRESHOLD_RATIO;
    let short = raw.analysis.short_ratio.unwrap_or(constants::DEFAULT_SHORT_RATIO);
    let long = raw.analysis.long_ratio.unwrap_or(constants::DEFAULT_LONG_RATIO);
    if !ratio_ok(short) {
        warnings.push(out_of_range(
            "[analysis] short_ratio",
            short,
            format!(
                "0 < value <= {}; using default {}",
                constants::MAX_THRESHOLD_RATIO,
                constants::DEFAULT_SHORT_RATIO
            ),
        ));
    } else if !ratio_ok(long) {
        warnings.push(out_of_range(
            "[analysis] long_ratio",
            long,
            format!(
                "0 < value <= {}; using default {}",
                constants::MAX_THRESHOLD_RATIO,
                constants::DEFAULT_LONG_RATIO
            ),
        ));
    } else if short > long {
        warnings.push(out_of_range(
            "[analysis] short_ratio",
            short,
            format!("<= long_ratio ({long}); using defaults for both"),
        ));
    } else {
        config.short_ratio = short;
        config.long_ratio = long;
    }

    // -- Report: format --
    if let Some(ref format) = raw.report.format {
        match format.parse::<ReportFormat>() {
            Ok(f) => config.report_format = f,
            Err(reason) => warnings.push(format!("[report] format: {reason}. Using default (text).")),
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}

/// Read and validate a specific config file.
///
/// Unlike `load_config`, a missing or unparseable file is an error.
pub fn load_config_file(path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %path.display(), "Loaded config.toml");
    Ok(validate(raw))
}

/// Load and validate `config.toml` from the platform config directory.
///
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unreadable or unparseable, returns defaults with the error
/// as a warning so the tool still runs.
pub fn load_config(paths: &PlatformPaths) -> (AppConfig, Vec<String>) {
    let config_path = paths.config_file();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match load_config_file(&config_path) {
        Ok((config, warnings)) => {
            if !warnings.is_empty() {
                tracing::warn!(count = warnings.len(), "Config validation produced warnings");
            }
            (config, warnings)
        }
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}
