// CampaignLens - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::core::locale;
use crate::util::constants;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

// =============================================================================
// Category (categorical cell with explicit sentinel)
// =============================================================================

/// A categorical value such as a channel or audience.
///
/// `NoData` is its own variant so the sentinel can never be mistaken for a
/// genuine category. It sorts after every real value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Value(String),
    NoData,
}

impl Category {
    /// Classify a raw cell. Empty cells and the recognised sentinel spellings
    /// become `NoData`; everything else is kept verbatim (trimmed).
    pub fn parse(cell: &str) -> Self {
        if is_no_data(cell) {
            Category::NoData
        } else {
            Category::Value(cell.trim().to_string())
        }
    }

    /// Display label; `NoData` renders as the sentinel label.
    pub fn label(&self) -> &str {
        match self {
            Category::Value(v) => v,
            Category::NoData => constants::NO_DATA_LABEL,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Category::NoData)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// True if `cell` is empty or one of the recognised "no data" spellings.
pub fn is_no_data(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty()
        || constants::NO_DATA_SPELLINGS
            .iter()
            .any(|s| trimmed.eq_ignore_ascii_case(s))
}

// =============================================================================
// Duration category and value tiers
// =============================================================================

/// Campaign length relative to the dataset's median duration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum DurationCategory {
    #[serde(rename = "corta")]
    Short,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "larga")]
    Long,
    #[default]
    #[serde(rename = "sin datos")]
    NoData,
}

impl DurationCategory {
    /// All variants in display order.
    pub fn all() -> &'static [DurationCategory] {
        &[
            DurationCategory::Short,
            DurationCategory::Medium,
            DurationCategory::Long,
            DurationCategory::NoData,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            DurationCategory::Short => "corta",
            DurationCategory::Medium => "media",
            DurationCategory::Long => "larga",
            DurationCategory::NoData => constants::NO_DATA_LABEL,
        }
    }
}

impl std::fmt::Display for DurationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Low/medium/high classification of a monetary value against its column
/// median. Uses the same thresholds as `DurationCategory`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum ValueTier {
    #[serde(rename = "bajo")]
    Low,
    #[serde(rename = "medio")]
    Medium,
    #[serde(rename = "alto")]
    High,
    #[default]
    #[serde(rename = "sin datos")]
    NoData,
}

impl ValueTier {
    pub fn label(&self) -> &'static str {
        match self {
            ValueTier::Low => "bajo",
            ValueTier::Medium => "medio",
            ValueTier::High => "alto",
            ValueTier::NoData => constants::NO_DATA_LABEL,
        }
    }
}

impl std::fmt::Display for ValueTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Raw campaign row (as read from CSV)
// =============================================================================

/// One row of the source CSV, cells kept as text.
///
/// Header names must match the constants in `util::constants`; the derivable
/// columns are optional and recomputed during normalisation. Cells missing
/// from a short row decode as empty text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCampaign {
    #[serde(rename = "nombre campaña", default)]
    pub name: String,

    #[serde(rename = "canal", default)]
    pub channel: String,

    #[serde(rename = "tipo", default)]
    pub campaign_type: String,

    #[serde(rename = "audiencia target", default)]
    pub audience: String,

    #[serde(rename = "fecha inicio", default)]
    pub start_date: String,

    #[serde(rename = "fecha fin", default)]
    pub end_date: String,

    #[serde(rename = "inversión", default)]
    pub investment: String,

    #[serde(rename = "facturación", default)]
    pub revenue: String,

    #[serde(rename = "retorno inversión", default)]
    pub roi: String,

    #[serde(rename = "ratio conversión", default)]
    pub conversion_rate: String,

    #[serde(rename = "duración días", default)]
    pub duration_days: Option<String>,

    #[serde(rename = "beneficio neto", default)]
    pub net_profit: Option<String>,

    #[serde(rename = "campaña exitosa", default)]
    pub success: Option<String>,
}

// =============================================================================
// Normalised campaign
// =============================================================================

/// A fully typed campaign with every derived column populated.
///
/// `None` means "no data": the source cell was a sentinel or failed to parse.
#[derive(Debug, Clone, Serialize)]
pub struct Campaign {
    pub name: String,
    pub channel: Category,
    pub campaign_type: Category,
    pub audience: Category,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    pub investment: Option<f64>,
    pub revenue: Option<f64>,
    pub roi: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub duration_days: Option<f64>,

    /// revenue - investment; `None` unless both operands parsed.
    pub net_profit: Option<f64>,

    /// Calendar month (1-12) of the start date.
    pub month: Option<u32>,

    pub duration_category: DurationCategory,
    pub investment_tier: ValueTier,
    pub net_profit_tier: ValueTier,

    /// True iff net profit is known and strictly positive.
    pub success: bool,

    /// Original cells, kept for export.
    #[serde(skip)]
    pub raw: RawCampaign,
}

impl Campaign {
    /// Net profit in the dataset's locale format, or the no-data label.
    pub fn net_profit_display(&self) -> String {
        match self.net_profit {
            Some(v) => locale::format_money(v),
            None => constants::NO_DATA_LABEL.to_string(),
        }
    }

    /// `Sí` / `No` rendering of the success flag.
    pub fn success_label(&self) -> &'static str {
        if self.success {
            constants::SUCCESS_YES
        } else {
            constants::SUCCESS_NO
        }
    }
}

// =============================================================================
// Normalised table
// =============================================================================

/// Counts of field-level recoveries made while normalising.
///
/// Keys are source column names. A recovery never aborts the load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizeSummary {
    /// Rows normalised.
    pub rows: usize,

    /// Numeric cells that were present but did not parse.
    pub invalid_numbers: BTreeMap<&'static str, usize>,

    /// Date cells that were present but did not parse.
    pub invalid_dates: BTreeMap<&'static str, usize>,

    /// Cells holding the "no data" sentinel (or empty), by column.
    pub no_data_cells: BTreeMap<&'static str, usize>,

    /// Rows flagged as successful.
    pub successful: usize,
}

impl NormalizeSummary {
    /// Total field-level recoveries across all columns.
    pub fn total_recoveries(&self) -> usize {
        self.invalid_numbers.values().sum::<usize>() + self.invalid_dates.values().sum::<usize>()
    }
}

/// The normalised dataset. Immutable once built.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CampaignTable {
    pub rows: Vec<Campaign>,

    /// Median of the valid durations, used for `DurationCategory`.
    pub median_duration: Option<f64>,

    /// Median of the valid investments, used for `investment_tier`.
    pub median_investment: Option<f64>,

    /// Median of the valid net profits, used for `net_profit_tier`.
    pub median_net_profit: Option<f64>,

    pub summary: NormalizeSummary,
}

impl CampaignTable {
    /// The empty table substituted when a load fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Query vocabulary
// =============================================================================

/// Numeric columns that can be aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    Investment,
    Revenue,
    Roi,
    ConversionRate,
    NetProfit,
    DurationDays,
}

impl Metric {
    pub fn value(&self, campaign: &Campaign) -> Option<f64> {
        match self {
            Metric::Investment => campaign.investment,
            Metric::Revenue => campaign.revenue,
            Metric::Roi => campaign.roi,
            Metric::ConversionRate => campaign.conversion_rate,
            Metric::NetProfit => campaign.net_profit,
            Metric::DurationDays => campaign.duration_days,
        }
    }

    /// Name of the derived numeric column.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Investment => constants::COL_INVESTMENT_NUM,
            Metric::Revenue => constants::COL_REVENUE_NUM,
            Metric::Roi => constants::COL_ROI_NUM,
            Metric::ConversionRate => constants::COL_CONVERSION_NUM,
            Metric::NetProfit => constants::COL_NET_PROFIT_NUM,
            Metric::DurationDays => constants::COL_DURATION_NUM,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Investment => "Inversión",
            Metric::Revenue => "Facturación",
            Metric::Roi => "ROI",
            Metric::ConversionRate => "Ratio conversión",
            Metric::NetProfit => "Beneficio neto",
            Metric::DurationDays => "Duración (días)",
        }
    }
}

/// Categorical columns rows can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dimension {
    Channel,
    CampaignType,
    Audience,
    DurationCategory,
    InvestmentTier,
    Success,
}

impl Dimension {
    /// Group key for `campaign` under this dimension.
    pub fn key(&self, campaign: &Campaign) -> String {
        match self {
            Dimension::Channel => campaign.channel.label().to_string(),
            Dimension::CampaignType => campaign.campaign_type.label().to_string(),
            Dimension::Audience => campaign.audience.label().to_string(),
            Dimension::DurationCategory => campaign.duration_category.label().to_string(),
            Dimension::InvestmentTier => campaign.investment_tier.label().to_string(),
            Dimension::Success => campaign.success_label().to_string(),
        }
    }

    /// Source column name.
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Channel => constants::COL_CHANNEL,
            Dimension::CampaignType => constants::COL_TYPE,
            Dimension::Audience => constants::COL_AUDIENCE,
            Dimension::DurationCategory => constants::COL_DURATION_CATEGORY,
            Dimension::InvestmentTier => constants::COL_INVESTMENT_TIER,
            Dimension::Success => constants::COL_SUCCESS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_sentinel_spellings() {
        for cell in ["", "  ", "sin datos", "Sin Datos", "no data", "no-data", "NaN"] {
            assert_eq!(Category::parse(cell), Category::NoData, "cell {cell:?}");
        }
        assert_eq!(
            Category::parse(" Referral "),
            Category::Value("Referral".to_string())
        );
    }

    #[test]
    fn test_no_data_is_distinct_from_values() {
        let no_data = Category::NoData;
        let value = Category::Value("Paid".to_string());
        assert_ne!(no_data, value);
        assert!(value < no_data, "NoData sorts after real values");
        assert_eq!(no_data.label(), constants::NO_DATA_LABEL);
    }

    #[test]
    fn test_category_serialises_as_label() {
        let json = serde_json::to_string(&vec![Category::Value("B2C".into()), Category::NoData])
            .unwrap();
        assert_eq!(json, r#"["B2C","sin datos"]"#);
    }

    #[test]
    fn test_duration_category_labels() {
        let labels: Vec<_> = DurationCategory::all().iter().map(|c| c.label()).collect();
        assert_eq!(labels, ["corta", "media", "larga", "sin datos"]);
        assert_eq!(
            serde_json::to_string(&DurationCategory::Medium).unwrap(),
            "\"media\""
        );
    }
}
