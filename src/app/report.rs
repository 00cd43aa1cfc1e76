// CampaignLens - app/report.rs
//
// Assembles the analysis report from a normalised table and renders it as
// plain text. JSON rendering goes through core::export::export_json.
//
// The report carries the same aggregates the campaign dashboard shows:
// headline KPIs, channel mix and ROI, audience conversion, revenue per
// campaign type, ROI per channel and type, seasonal (monthly) means,
// duration categories, the ROI distribution and the investment / duration /
// revenue relationships.

use crate::core::aggregate::{
    self, Correlation, CrossDescription, Descriptive, GroupCount, GroupDescription, GroupMean,
    HistogramBin, MonthlyMeans, Overview,
};
use crate::core::filter::{self, CampaignFilter};
use crate::core::locale::{format_locale_number, format_money};
use crate::core::model::{CampaignTable, Dimension, Metric, NormalizeSummary};
use crate::util::constants;
use serde::Serialize;
use std::io::{self, Write};

/// Metrics averaged per month in the seasonal section.
pub const MONTHLY_METRICS: &[Metric] = &[Metric::Roi, Metric::ConversionRate, Metric::Revenue];

/// Metric pairs whose relationship the report quantifies.
pub const CORRELATED_METRICS: &[(Metric, Metric)] = &[
    (Metric::Investment, Metric::Revenue),
    (Metric::Investment, Metric::Roi),
    (Metric::DurationDays, Metric::Revenue),
    (Metric::Roi, Metric::Revenue),
];

/// Full analysis report. Serialisable for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Dataset the report was built from.
    pub source: String,

    /// Load diagnostics (empty on success).
    pub diagnostics: Vec<String>,

    pub overview: Overview,
    pub channel_counts: Vec<GroupCount>,

    /// Ascending by mean ROI.
    pub roi_by_channel: Vec<GroupMean>,

    /// Descending by mean conversion ratio.
    pub conversion_by_audience: Vec<GroupMean>,

    /// Excludes the mislabelled `B2B` type and rows without a type.
    pub revenue_by_type: Vec<GroupMean>,

    /// ROI spread per channel and campaign type, without `B2B`, `event`
    /// and rows without a type.
    pub roi_by_channel_and_type: Vec<CrossDescription>,

    /// Duration spread per campaign type, same exclusions as revenue.
    pub duration_by_type: Vec<GroupDescription>,

    pub monthly: Vec<MonthlyMeans>,
    pub duration_categories: Vec<GroupCount>,
    pub median_duration: Option<f64>,
    pub revenue_by_duration: Vec<GroupDescription>,
    pub roi_by_investment_tier: Vec<GroupMean>,
    pub roi_distribution: Vec<HistogramBin>,
    pub correlations: Vec<Correlation>,
    pub normalization: NormalizeSummary,
}

/// Build the report for `table`.
pub fn build_report(table: &CampaignTable, source: &str, diagnostics: Vec<String>) -> Report {
    let rows = &table.rows;

    let mut roi_by_channel = aggregate::grouped_mean(rows, Dimension::Channel, Metric::Roi);
    aggregate::sort_by_mean(&mut roi_by_channel, true);

    let mut conversion_by_audience =
        aggregate::grouped_mean(rows, Dimension::Audience, Metric::ConversionRate);
    aggregate::sort_by_mean(&mut conversion_by_audience, false);

    let type_filter =
        CampaignFilter::excluding_types(constants::TYPE_BREAKDOWN_EXCLUDED.iter().copied());
    let mut revenue_by_type = aggregate::grouped_mean(
        filter::select(rows, &type_filter),
        Dimension::CampaignType,
        Metric::Revenue,
    );
    aggregate::sort_by_mean(&mut revenue_by_type, false);
    let duration_by_type = aggregate::grouped_describe(
        filter::select(rows, &type_filter),
        Dimension::CampaignType,
        Metric::DurationDays,
    );

    let channel_type_filter =
        CampaignFilter::excluding_types(constants::CHANNEL_TYPE_ROI_EXCLUDED.iter().copied());
    let roi_by_channel_and_type = aggregate::cross_describe(
        filter::select(rows, &channel_type_filter),
        Dimension::Channel,
        Dimension::CampaignType,
        Metric::Roi,
    );

    let correlations: Vec<Correlation> = CORRELATED_METRICS
        .iter()
        .map(|&(x, y)| aggregate::correlation(rows, x, y))
        .collect();

    let report = Report {
        source: source.to_string(),
        diagnostics,
        overview: aggregate::overview(rows),
        channel_counts: aggregate::grouped_count(rows, Dimension::Channel),
        roi_by_channel,
        conversion_by_audience,
        revenue_by_type,
        roi_by_channel_and_type,
        duration_by_type,
        monthly: aggregate::monthly_means(rows, MONTHLY_METRICS),
        duration_categories: aggregate::grouped_count(rows, Dimension::DurationCategory),
        median_duration: table.median_duration,
        revenue_by_duration: aggregate::grouped_describe(
            rows,
            Dimension::DurationCategory,
            Metric::Revenue,
        ),
        roi_by_investment_tier: aggregate::grouped_mean(
            rows,
            Dimension::InvestmentTier,
            Metric::Roi,
        ),
        roi_distribution: aggregate::histogram(
            rows.iter().filter_map(|c| c.roi),
            constants::ROI_HISTOGRAM_BINS,
        ),
        correlations,
        normalization: table.summary.clone(),
    };

    tracing::debug!(
        campaigns = report.overview.campaigns,
        channels = report.channel_counts.len(),
        months = report.monthly.len(),
        "Report built"
    );
    report
}

// =============================================================================
// Text rendering
// =============================================================================

fn ratio(v: Option<f64>) -> String {
    v.map(|v| format_locale_number(v, 2))
        .unwrap_or_else(|| constants::NO_DATA_LABEL.to_string())
}

fn money(v: Option<f64>) -> String {
    v.map(format_money)
        .unwrap_or_else(|| constants::NO_DATA_LABEL.to_string())
}

fn heading<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.chars().count()))
}

fn group_means<W: Write>(
    out: &mut W,
    groups: &[GroupMean],
    render: fn(Option<f64>) -> String,
) -> io::Result<()> {
    if groups.is_empty() {
        return writeln!(out, "  (no data)");
    }
    for g in groups {
        writeln!(out, "  {:<20} {:>14}  (n={})", g.key, render(g.mean), g.count)?;
    }
    Ok(())
}

fn days(v: f64) -> String {
    format_locale_number(v, 1)
}

fn roi(v: f64) -> String {
    format_locale_number(v, 2)
}

fn describe_line<W: Write>(
    out: &mut W,
    label: &str,
    stats: Option<&Descriptive>,
    render: fn(f64) -> String,
) -> io::Result<()> {
    match stats {
        Some(s) => writeln!(
            out,
            "  {:<24} n={:<5} min={} q1={} median={} q3={} max={}",
            label,
            s.count,
            render(s.min),
            render(s.q1),
            render(s.median),
            render(s.q3),
            render(s.max)
        ),
        None => writeln!(out, "  {:<24} {}", label, constants::NO_DATA_LABEL),
    }
}

fn group_descriptions<W: Write>(
    out: &mut W,
    groups: &[GroupDescription],
    render: fn(f64) -> String,
) -> io::Result<()> {
    if groups.is_empty() {
        return writeln!(out, "  (no data)");
    }
    for g in groups {
        describe_line(out, &g.key, g.stats.as_ref(), render)?;
    }
    Ok(())
}

fn group_counts<W: Write>(out: &mut W, groups: &[GroupCount]) -> io::Result<()> {
    if groups.is_empty() {
        return writeln!(out, "  (no data)");
    }
    for g in groups {
        writeln!(out, "  {:<20} {:>6}", g.key, g.count)?;
    }
    Ok(())
}

/// Render `report` as human-readable text.
pub fn render_text<W: Write>(report: &Report, mut out: W) -> io::Result<()> {
    writeln!(
        out,
        "{} v{} - {}",
        constants::APP_NAME,
        constants::APP_VERSION,
        report.source
    )?;
    for d in &report.diagnostics {
        writeln!(out, "! {d}")?;
    }

    let o = &report.overview;
    heading(&mut out, "Overview")?;
    writeln!(out, "  Campaigns            {:>14}", o.campaigns)?;
    writeln!(out, "  Mean ROI             {:>14}", ratio(o.mean_roi))?;
    writeln!(out, "  Mean conversion      {:>14}", ratio(o.mean_conversion_rate))?;
    writeln!(out, "  Total investment     {:>14}", format_money(o.total_investment))?;
    writeln!(out, "  Total revenue        {:>14}", format_money(o.total_revenue))?;
    writeln!(out, "  Total net profit     {:>14}", format_money(o.total_net_profit))?;
    let success = o
        .success_rate
        .map(|r| format!("{}%", format_locale_number(r, 1)))
        .unwrap_or_else(|| constants::NO_DATA_LABEL.to_string());
    writeln!(out, "  Successful campaigns {:>14}", success)?;

    heading(&mut out, "Campaigns per channel")?;
    group_counts(&mut out, &report.channel_counts)?;

    heading(&mut out, "Mean ROI per channel")?;
    group_means(&mut out, &report.roi_by_channel, ratio)?;

    heading(&mut out, "Mean conversion ratio per audience")?;
    group_means(&mut out, &report.conversion_by_audience, ratio)?;

    heading(&mut out, "Mean revenue per campaign type")?;
    group_means(&mut out, &report.revenue_by_type, money)?;

    heading(&mut out, "ROI per channel and campaign type")?;
    if report.roi_by_channel_and_type.is_empty() {
        writeln!(out, "  (no data)")?;
    }
    for cell in &report.roi_by_channel_and_type {
        let label = format!("{} / {}", cell.outer, cell.inner);
        describe_line(&mut out, &label, cell.stats.as_ref(), roi)?;
    }

    heading(&mut out, "Monthly means")?;
    if report.monthly.is_empty() {
        writeln!(out, "  (no data)")?;
    }
    for m in &report.monthly {
        let cells: Vec<String> = MONTHLY_METRICS
            .iter()
            .map(|metric| {
                let value = m.means.get(metric.column()).copied().flatten();
                format!("{}={}", metric.label(), ratio(value))
            })
            .collect();
        writeln!(out, "  {:>2}  {}", m.month, cells.join("  "))?;
    }

    heading(&mut out, "Duration categories")?;
    writeln!(out, "  Median duration (days) {}", ratio(report.median_duration))?;
    group_counts(&mut out, &report.duration_categories)?;

    heading(&mut out, "Revenue by duration category")?;
    group_descriptions(&mut out, &report.revenue_by_duration, format_money)?;

    heading(&mut out, "Duration (days) per campaign type")?;
    group_descriptions(&mut out, &report.duration_by_type, days)?;

    heading(&mut out, "Mean ROI per investment tier")?;
    group_means(&mut out, &report.roi_by_investment_tier, ratio)?;

    heading(&mut out, "ROI distribution")?;
    if report.roi_distribution.is_empty() {
        writeln!(out, "  (no data)")?;
    }
    let widest = report
        .roi_distribution
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0)
        .max(1);
    for b in &report.roi_distribution {
        let bar = "#".repeat(b.count * 40 / widest);
        writeln!(
            out,
            "  {:>8} .. {:<8} {:>5} {bar}",
            format_locale_number(b.lower, 2),
            format_locale_number(b.upper, 2),
            b.count
        )?;
    }

    heading(&mut out, "Correlations")?;
    for c in &report.correlations {
        writeln!(
            out,
            "  {:<36} {:>8}  (n={})",
            format!("{} ~ {}", c.x, c.y),
            ratio(c.coefficient),
            c.count
        )?;
    }

    let n = &report.normalization;
    heading(&mut out, "Data quality")?;
    writeln!(out, "  Rows normalised      {:>14}", n.rows)?;
    for (column, count) in &n.invalid_numbers {
        writeln!(out, "  Unparsable number in '{column}': {count}")?;
    }
    for (column, count) in &n.invalid_dates {
        writeln!(out, "  Unparsable date in '{column}': {count}")?;
    }
    for (column, count) in &n.no_data_cells {
        writeln!(out, "  No data in '{column}': {count}")?;
    }
    Ok(())
}
