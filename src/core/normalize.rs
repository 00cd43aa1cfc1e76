// CampaignLens - core/normalize.rs
//
// Turns raw CSV rows into typed campaigns with every derived column.
//
// Two passes: the first parses each row independently, the second
// categorises against medians of the whole table, so categories always
// reflect the dataset currently loaded.
//
// Field-level failures are absorbed here: the cell becomes `None`, the
// recovery is counted in `NormalizeSummary`, and the row is kept.

use crate::core::locale::{self, parse_locale_number};
use crate::core::model::{
    is_no_data, Campaign, CampaignTable, Category, DurationCategory, NormalizeSummary,
    RawCampaign, ValueTier,
};
use crate::util::constants;
use chrono::{Datelike, NaiveDate};

/// Median-relative thresholds shared by duration categories and value tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Values strictly below `short_ratio * median` fall in the lowest band.
    pub short_ratio: f64,
    /// Values at or below `long_ratio * median` fall in the middle band.
    pub long_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            short_ratio: constants::DEFAULT_SHORT_RATIO,
            long_ratio: constants::DEFAULT_LONG_RATIO,
        }
    }
}

/// Position of a value relative to the median bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Below,
    Within,
    Above,
}

fn band(value: Option<f64>, median: Option<f64>, thresholds: &Thresholds) -> Option<Band> {
    let value = value.filter(|v| v.is_finite())?;
    let median = median.filter(|m| m.is_finite())?;

    if value < median * thresholds.short_ratio {
        Some(Band::Below)
    } else if value <= median * thresholds.long_ratio {
        Some(Band::Within)
    } else {
        Some(Band::Above)
    }
}

/// Classify a duration against the dataset median with the default
/// thresholds: `< 0.75 * median` is short, `<= 1.25 * median` is medium,
/// anything longer is long.
pub fn categorize_duration(days: Option<f64>, median: f64) -> DurationCategory {
    categorize_duration_with(days, Some(median), &Thresholds::default())
}

/// `categorize_duration` with explicit thresholds and an optional median.
/// A missing or non-finite median makes every row `NoData`.
pub fn categorize_duration_with(
    days: Option<f64>,
    median: Option<f64>,
    thresholds: &Thresholds,
) -> DurationCategory {
    match band(days, median, thresholds) {
        Some(Band::Below) => DurationCategory::Short,
        Some(Band::Within) => DurationCategory::Medium,
        Some(Band::Above) => DurationCategory::Long,
        None => DurationCategory::NoData,
    }
}

/// Classify a monetary value against its column median.
pub fn categorize_value(
    value: Option<f64>,
    median: Option<f64>,
    thresholds: &Thresholds,
) -> ValueTier {
    match band(value, median, thresholds) {
        Some(Band::Below) => ValueTier::Low,
        Some(Band::Within) => ValueTier::Medium,
        Some(Band::Above) => ValueTier::High,
        None => ValueTier::NoData,
    }
}

/// Median of the finite values in `values`, `None` if there are none.
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// revenue - investment, both given as locale strings. `None` if either
/// operand fails to parse.
pub fn net_profit_value(investment: &str, revenue: &str) -> Option<f64> {
    let investment = parse_locale_number(investment).ok()?;
    let revenue = parse_locale_number(revenue).ok()?;
    Some(revenue - investment)
}

/// Net profit rendered in the dataset's locale format, or the no-data label
/// when either operand is unparsable.
pub fn net_profit(investment: &str, revenue: &str) -> String {
    match net_profit_value(investment, revenue) {
        Some(v) => locale::format_money(v),
        None => constants::NO_DATA_LABEL.to_string(),
    }
}

// =============================================================================
// Table normalisation
// =============================================================================

fn numeric_cell(
    row: usize,
    column: &'static str,
    cell: &str,
    summary: &mut NormalizeSummary,
) -> Option<f64> {
    if is_no_data(cell) {
        *summary.no_data_cells.entry(column).or_default() += 1;
        return None;
    }
    match parse_locale_number(cell) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(row, column, error = %e, "Numeric cell recovered as no data");
            *summary.invalid_numbers.entry(column).or_default() += 1;
            None
        }
    }
}

fn date_cell(
    row: usize,
    column: &'static str,
    cell: &str,
    summary: &mut NormalizeSummary,
) -> Option<NaiveDate> {
    if is_no_data(cell) {
        *summary.no_data_cells.entry(column).or_default() += 1;
        return None;
    }
    let parsed = locale::parse_date(cell);
    if parsed.is_none() {
        tracing::debug!(row, column, value = cell, "Date cell recovered as no data");
        *summary.invalid_dates.entry(column).or_default() += 1;
    }
    parsed
}

fn category_cell(column: &'static str, cell: &str, summary: &mut NormalizeSummary) -> Category {
    let category = Category::parse(cell);
    if category.is_no_data() {
        *summary.no_data_cells.entry(column).or_default() += 1;
    }
    category
}

/// Duration in days: the source column when it holds a plain number,
/// otherwise the span between the two dates.
fn duration_cell(
    row: usize,
    raw: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    summary: &mut NormalizeSummary,
) -> Option<f64> {
    if let Some(cell) = raw.filter(|c| !is_no_data(c)) {
        match cell.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => return Some(v),
            _ => {
                tracing::debug!(
                    row,
                    column = constants::COL_DURATION,
                    value = cell,
                    "Duration cell not numeric; deriving from dates"
                );
                *summary
                    .invalid_numbers
                    .entry(constants::COL_DURATION)
                    .or_default() += 1;
            }
        }
    }

    match (start, end) {
        (Some(start), Some(end)) => Some((end - start).num_days() as f64),
        _ => None,
    }
}

/// First pass: everything that depends only on the row itself.
fn normalize_row(row: usize, raw: RawCampaign, summary: &mut NormalizeSummary) -> Campaign {
    let channel = category_cell(constants::COL_CHANNEL, &raw.channel, summary);
    let campaign_type = category_cell(constants::COL_TYPE, &raw.campaign_type, summary);
    let audience = category_cell(constants::COL_AUDIENCE, &raw.audience, summary);

    let start_date = date_cell(row, constants::COL_START_DATE, &raw.start_date, summary);
    let end_date = date_cell(row, constants::COL_END_DATE, &raw.end_date, summary);

    let investment = numeric_cell(row, constants::COL_INVESTMENT, &raw.investment, summary);
    let revenue = numeric_cell(row, constants::COL_REVENUE, &raw.revenue, summary);
    let roi = numeric_cell(row, constants::COL_ROI, &raw.roi, summary);
    let conversion_rate =
        numeric_cell(row, constants::COL_CONVERSION, &raw.conversion_rate, summary);

    let duration_days = duration_cell(
        row,
        raw.duration_days.as_deref(),
        start_date,
        end_date,
        summary,
    );

    let net_profit = match (investment, revenue) {
        (Some(investment), Some(revenue)) => Some(revenue - investment),
        _ => None,
    };
    let success = net_profit.is_some_and(|p| p > 0.0);
    if success {
        summary.successful += 1;
    }

    Campaign {
        name: raw.name.trim().to_string(),
        channel,
        campaign_type,
        audience,
        start_date,
        end_date,
        investment,
        revenue,
        roi,
        conversion_rate,
        duration_days,
        net_profit,
        month: start_date.map(|d| d.month()),
        duration_category: DurationCategory::NoData,
        investment_tier: ValueTier::NoData,
        net_profit_tier: ValueTier::NoData,
        success,
        raw,
    }
}

/// Normalise raw rows into a `CampaignTable` with every derived column set.
pub fn normalize(raws: Vec<RawCampaign>, thresholds: &Thresholds) -> CampaignTable {
    let mut summary = NormalizeSummary::default();

    let mut rows: Vec<Campaign> = raws
        .into_iter()
        .enumerate()
        .map(|(i, raw)| normalize_row(i, raw, &mut summary))
        .collect();
    summary.rows = rows.len();

    let median_duration = median(rows.iter().filter_map(|c| c.duration_days));
    let median_investment = median(rows.iter().filter_map(|c| c.investment));
    let median_net_profit = median(rows.iter().filter_map(|c| c.net_profit));

    for campaign in &mut rows {
        campaign.duration_category =
            categorize_duration_with(campaign.duration_days, median_duration, thresholds);
        campaign.investment_tier =
            categorize_value(campaign.investment, median_investment, thresholds);
        campaign.net_profit_tier =
            categorize_value(campaign.net_profit, median_net_profit, thresholds);
    }

    tracing::info!(
        rows = summary.rows,
        successful = summary.successful,
        recoveries = summary.total_recoveries(),
        median_duration = ?median_duration,
        "Dataset normalised"
    );

    CampaignTable {
        rows,
        median_duration,
        median_investment,
        median_net_profit,
        summary,
    }
}
