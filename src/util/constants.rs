// CampaignLens - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Column names follow the cleaned Spanish campaign dataset exactly.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "CampaignLens";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "CampaignLens";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Dataset
// =============================================================================

/// Dataset file name looked up in the working directory when neither the CLI
/// nor config.toml name one.
pub const DEFAULT_DATASET_FILE: &str = "limpio_marketingcampaigns.csv";

/// Default field delimiter.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Delimiters tried (in order) when the header line contains no comma.
pub const FALLBACK_DELIMITERS: &[u8] = &[b';', b'\t'];

pub const COL_NAME: &str = "nombre campaña";
pub const COL_CHANNEL: &str = "canal";
pub const COL_TYPE: &str = "tipo";
pub const COL_AUDIENCE: &str = "audiencia target";
pub const COL_START_DATE: &str = "fecha inicio";
pub const COL_END_DATE: &str = "fecha fin";
pub const COL_INVESTMENT: &str = "inversión";
pub const COL_REVENUE: &str = "facturación";
pub const COL_ROI: &str = "retorno inversión";
pub const COL_CONVERSION: &str = "ratio conversión";
pub const COL_DURATION: &str = "duración días";
pub const COL_NET_PROFIT: &str = "beneficio neto";
pub const COL_SUCCESS: &str = "campaña exitosa";

/// Columns that must be present in the header for a load to succeed.
/// Duration, net profit and success are derivable and always recomputed.
pub const REQUIRED_COLUMNS: &[&str] = &[
    COL_NAME,
    COL_CHANNEL,
    COL_TYPE,
    COL_AUDIENCE,
    COL_START_DATE,
    COL_END_DATE,
    COL_INVESTMENT,
    COL_REVENUE,
    COL_ROI,
    COL_CONVERSION,
];

// Derived column names written on export.
pub const COL_INVESTMENT_NUM: &str = "inversión_num";
pub const COL_REVENUE_NUM: &str = "facturación_num";
pub const COL_ROI_NUM: &str = "roi_num";
pub const COL_CONVERSION_NUM: &str = "ratio_conv_num";
pub const COL_DURATION_NUM: &str = "duracion_num";
pub const COL_NET_PROFIT_NUM: &str = "beneficio_neto_num";
pub const COL_MONTH: &str = "mes";
pub const COL_DURATION_CATEGORY: &str = "categoría duración";
pub const COL_INVESTMENT_TIER: &str = "categoría inversión";
pub const COL_NET_PROFIT_TIER: &str = "categoría beneficio";

// =============================================================================
// Sentinels and labels
// =============================================================================

/// Label written wherever a value is intentionally unknown.
pub const NO_DATA_LABEL: &str = "sin datos";

/// Input spellings recognised as the "no data" sentinel (compared trimmed,
/// case-insensitively). The empty string is also treated as no data.
pub const NO_DATA_SPELLINGS: &[&str] = &["sin datos", "no data", "no-data", "n/a", "nan"];

/// Rendering of the success flag.
pub const SUCCESS_YES: &str = "Sí";
pub const SUCCESS_NO: &str = "No";

/// Date formats tried, in order, for `fecha inicio` / `fecha fin`.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Date-time formats tried after `DATE_FORMATS`; only the date part is kept.
pub const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// =============================================================================
// Locale formatting
// =============================================================================

/// Thousands separator of the Spanish locale.
pub const THOUSANDS_SEPARATOR: char = '.';

/// Decimal separator of the Spanish locale.
pub const DECIMAL_SEPARATOR: char = ',';

/// Decimal places used when rendering monetary values.
pub const MONEY_DECIMALS: usize = 2;

/// Tolerance used when comparing a formatted-then-reparsed value.
pub const ROUND_TRIP_TOLERANCE: f64 = 1e-6;

// =============================================================================
// Categorisation thresholds
// =============================================================================

/// Fraction of the median below which a value is "short" / "low".
pub const DEFAULT_SHORT_RATIO: f64 = 0.75;

/// Fraction of the median at or below which a value is "medium".
pub const DEFAULT_LONG_RATIO: f64 = 1.25;

/// Hard upper bound on a configurable ratio (prevents configuration mistakes).
pub const MAX_THRESHOLD_RATIO: f64 = 10.0;

/// Campaign types left out of the per-type revenue and duration breakdowns.
/// `B2B` appears in the type column by mistake in the source data.
pub const TYPE_BREAKDOWN_EXCLUDED: &[&str] = &["B2B", NO_DATA_LABEL];

/// Campaign types left out of the ROI-per-channel-and-type breakdown.
/// `event` has too few campaigns to compare.
pub const CHANNEL_TYPE_ROI_EXCLUDED: &[&str] = &["B2B", "event", NO_DATA_LABEL];

/// Number of buckets in the ROI distribution shown in the report.
pub const ROI_HISTOGRAM_BINS: usize = 10;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Valid values of `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
