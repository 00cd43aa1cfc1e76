// CampaignLens - core/aggregate.rs
//
// Plain relational aggregates over normalised campaigns: group by a
// categorical dimension, reduce a numeric metric by mean or count.
//
// Missing values are dropped at aggregation time; no imputation happens
// here. Groups come out in ascending key order.

use crate::core::model::{Campaign, Dimension, Metric};
use serde::Serialize;
use std::collections::BTreeMap;

/// Mean of one metric within one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: String,
    /// `None` when every row in the group lacks the metric.
    pub mean: Option<f64>,
    /// Rows that contributed a value.
    pub count: usize,
}

/// Row count of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: usize,
}

/// Means of several metrics for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyMeans {
    pub month: u32,
    /// Keyed by the metric's derived column name.
    pub means: BTreeMap<&'static str, Option<f64>>,
}

/// Summary statistics of a numeric sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptive {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// `Descriptive` for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDescription {
    pub key: String,
    pub stats: Option<Descriptive>,
}

/// One equal-width histogram bucket. `upper` is inclusive only for the last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// `describe` of one metric within one (outer, inner) group pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossDescription {
    pub outer: String,
    pub inner: String,
    pub stats: Option<Descriptive>,
}

/// Pearson correlation between two metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    pub x: &'static str,
    pub y: &'static str,
    /// None with fewer than two complete pairs or a constant series.
    pub coefficient: Option<f64>,
    /// Rows where both metrics are present.
    pub count: usize,
}

/// Headline figures of the whole table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub campaigns: usize,
    pub mean_roi: Option<f64>,
    pub mean_conversion_rate: Option<f64>,
    pub total_investment: f64,
    pub total_revenue: f64,
    pub total_net_profit: f64,
    /// Percentage (0-100) of campaigns flagged successful.
    pub success_rate: Option<f64>,
}

/// Arithmetic mean of the finite values, `None` if there are none.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean of `metric` per `dimension` group. Rows missing the metric still
/// create their group but do not contribute to the mean.
pub fn grouped_mean<'a>(
    rows: impl IntoIterator<Item = &'a Campaign>,
    dimension: Dimension,
    metric: Metric,
) -> Vec<GroupMean> {
    let mut groups: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for campaign in rows {
        let entry = groups.entry(dimension.key(campaign)).or_insert((0.0, 0));
        if let Some(v) = metric.value(campaign).filter(|v| v.is_finite()) {
            entry.0 += v;
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(key, (sum, count))| GroupMean {
            key,
            mean: (count > 0).then(|| sum / count as f64),
            count,
        })
        .collect()
}

/// Number of rows per `dimension` group.
pub fn grouped_count<'a>(
    rows: impl IntoIterator<Item = &'a Campaign>,
    dimension: Dimension,
) -> Vec<GroupCount> {
    let mut groups: BTreeMap<String, usize> = BTreeMap::new();
    for campaign in rows {
        *groups.entry(dimension.key(campaign)).or_default() += 1;
    }
    groups
        .into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect()
}

/// Mean of each metric per start month. Rows without a month are dropped.
pub fn monthly_means<'a>(
    rows: impl IntoIterator<Item = &'a Campaign>,
    metrics: &[Metric],
) -> Vec<MonthlyMeans> {
    let mut by_month: BTreeMap<u32, Vec<&Campaign>> = BTreeMap::new();
    for campaign in rows {
        if let Some(month) = campaign.month {
            by_month.entry(month).or_default().push(campaign);
        }
    }

    by_month
        .into_iter()
        .map(|(month, campaigns)| MonthlyMeans {
            month,
            means: metrics
                .iter()
                .map(|m| (m.column(), mean(campaigns.iter().filter_map(|c| m.value(c)))))
                .collect(),
        })
        .collect()
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

/// Count, mean, quartiles and extremes of the finite values.
pub fn describe(values: impl IntoIterator<Item = f64>) -> Option<Descriptive> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    Some(Descriptive {
        count: sorted.len(),
        mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// `describe` of `metric` per `dimension` group.
pub fn grouped_describe<'a>(
    rows: impl IntoIterator<Item = &'a Campaign>,
    dimension: Dimension,
    metric: Metric,
) -> Vec<GroupDescription> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for campaign in rows {
        let values = groups.entry(dimension.key(campaign)).or_default();
        if let Some(v) = metric.value(campaign) {
            values.push(v);
        }
    }
    groups
        .into_iter()
        .map(|(key, values)| GroupDescription {
            key,
            stats: describe(values),
        })
        .collect()
}

/// Equal-width histogram of the finite values over `[min, max]`.
pub fn histogram(values: impl IntoIterator<Item = f64>, bins: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// `describe` of `metric` per (`outer`, `inner`) pair, ordered by outer
/// key then inner key.
pub fn cross_describe<'a>(
    rows: impl IntoIterator<Item = &'a Campaign>,
    outer: Dimension,
    inner: Dimension,
    metric: Metric,
) -> Vec<CrossDescription> {
    let mut groups: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for campaign in rows {
        let values = groups
            .entry((outer.key(campaign), inner.key(campaign)))
            .or_default();
        if let Some(v) = metric.value(campaign) {
            values.push(v);
        }
    }
    groups
        .into_iter()
        .map(|((outer, inner), values)| CrossDescription {
            outer,
            inner,
            stats: describe(values),
        })
        .collect()
}

/// Pearson correlation coefficient of the finite `(x, y)` pairs.
pub fn pearson(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = pairs
        .into_iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

/// Correlation of metric `x` against metric `y` over rows that have both.
pub fn correlation<'a>(
    rows: impl IntoIterator<Item = &'a Campaign>,
    x: Metric,
    y: Metric,
) -> Correlation {
    let pairs: Vec<(f64, f64)> = rows
        .into_iter()
        .filter_map(|c| Some((x.value(c)?, y.value(c)?)))
        .collect();
    Correlation {
        x: x.column(),
        y: y.column(),
        count: pairs.len(),
        coefficient: pearson(pairs),
    }
}

/// Headline figures for `rows`.
pub fn overview<'a>(rows: impl IntoIterator<Item = &'a Campaign>) -> Overview {
    let rows: Vec<&Campaign> = rows.into_iter().collect();
    let successes = rows.iter().filter(|c| c.success).count();

    Overview {
        campaigns: rows.len(),
        mean_roi: mean(rows.iter().filter_map(|c| c.roi)),
        mean_conversion_rate: mean(rows.iter().filter_map(|c| c.conversion_rate)),
        total_investment: rows.iter().filter_map(|c| c.investment).sum(),
        total_revenue: rows.iter().filter_map(|c| c.revenue).sum(),
        total_net_profit: rows.iter().filter_map(|c| c.net_profit).sum(),
        success_rate: (!rows.is_empty())
            .then(|| successes as f64 * 100.0 / rows.len() as f64),
    }
}

/// Order groups by mean; groups without a mean go last.
pub fn sort_by_mean(groups: &mut [GroupMean], ascending: bool) {
    groups.sort_by(|a, b| match (a.mean, b.mean) {
        (Some(x), Some(y)) if ascending => x.total_cmp(&y),
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{CampaignTable, RawCampaign};
    use crate::core::normalize::{normalize, Thresholds};

    fn row(channel: &str, roi: &str, start: &str, investment: &str, revenue: &str) -> RawCampaign {
        RawCampaign {
            name: format!("{channel}-{roi}"),
            channel: channel.to_string(),
            campaign_type: "Email".to_string(),
            audience: "B2C".to_string(),
            start_date: start.to_string(),
            end_date: String::new(),
            investment: investment.to_string(),
            revenue: revenue.to_string(),
            roi: roi.to_string(),
            conversion_rate: "0,1".to_string(),
            ..Default::default()
        }
    }

    fn table(rows: Vec<RawCampaign>) -> CampaignTable {
        normalize(rows, &Thresholds::default())
    }

    fn assert_close(a: Option<f64>, b: f64) {
        let a = a.expect("value present");
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_grouped_mean_by_channel() {
        let t = table(vec![
            row("A", "0,4", "2023-01-01", "1,0", "2,0"),
            row("A", "0,6", "2023-01-01", "1,0", "2,0"),
            row("B", "0,5", "2023-01-01", "1,0", "2,0"),
        ]);
        let groups = grouped_mean(&t.rows, Dimension::Channel, Metric::Roi);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "A");
        assert_close(groups[0].mean, 0.5);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[1].key, "B");
        assert_close(groups[1].mean, 0.5);
    }

    #[test]
    fn test_grouped_mean_drops_missing_values() {
        let t = table(vec![
            row("A", "0,4", "2023-01-01", "1,0", "2,0"),
            row("A", "sin datos", "2023-01-01", "1,0", "2,0"),
            row("C", "abc", "2023-01-01", "1,0", "2,0"),
        ]);
        let groups = grouped_mean(&t.rows, Dimension::Channel, Metric::Roi);
        assert_close(groups[0].mean, 0.4);
        assert_eq!(groups[0].count, 1);
        assert_eq!(groups[1].key, "C");
        assert_eq!(groups[1].mean, None);
    }

    #[test]
    fn test_grouped_count_keeps_no_data_separate() {
        let t = table(vec![
            row("Paid", "0,1", "2023-01-01", "1,0", "2,0"),
            row("sin datos", "0,1", "2023-01-01", "1,0", "2,0"),
            row("Paid", "0,1", "2023-01-01", "1,0", "2,0"),
        ]);
        let counts = grouped_count(&t.rows, Dimension::Channel);
        assert_eq!(
            counts,
            vec![
                GroupCount { key: "Paid".into(), count: 2 },
                GroupCount { key: "sin datos".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_monthly_means() {
        let t = table(vec![
            row("A", "0,2", "2023-01-05", "1,0", "2,0"),
            row("A", "0,4", "2023-01-20", "1,0", "4,0"),
            row("A", "0,9", "2023-03-01", "1,0", "2,0"),
            row("A", "0,9", "bad date", "1,0", "2,0"),
        ]);
        let months = monthly_means(&t.rows, &[Metric::Roi, Metric::Revenue]);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, 1);
        assert_close(months[0].means["roi_num"], 0.3);
        assert_close(months[0].means["facturación_num"], 3.0);
        assert_eq!(months[1].month, 3);
        assert_close(months[1].means["roi_num"], 0.9);
    }

    #[test]
    fn test_describe_quartiles() {
        let d = describe(vec![4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
        assert_eq!(d.count, 5);
        assert_eq!(d.min, 1.0);
        assert_eq!(d.q1, 2.0);
        assert_eq!(d.median, 3.0);
        assert_eq!(d.q3, 4.0);
        assert_eq!(d.max, 5.0);
        assert_eq!(d.mean, 3.0);

        let even = describe(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(even.median, 2.5);
        assert_eq!(even.q1, 1.75);
        assert!(describe(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn test_histogram_covers_all_values() {
        let bins = histogram(vec![0.0, 0.1, 0.5, 0.9, 1.0], 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].count, 3);
        assert_eq!(bins[1].upper, 1.0);

        let flat = histogram(vec![2.0, 2.0], 5);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].count, 2);
        assert!(histogram(Vec::<f64>::new(), 3).is_empty());
    }

    #[test]
    fn test_overview() {
        let t = table(vec![
            row("A", "0,2", "2023-01-01", "100,00", "150,00"),
            row("A", "0,4", "2023-01-01", "100,00", "50,00"),
        ]);
        let o = overview(&t.rows);
        assert_eq!(o.campaigns, 2);
        assert_close(o.mean_roi, 0.3);
        assert_eq!(o.total_investment, 200.0);
        assert_eq!(o.total_net_profit, 0.0);
        assert_close(o.success_rate, 50.0);

        let empty = overview(&CampaignTable::empty().rows);
        assert_eq!(empty.campaigns, 0);
        assert_eq!(empty.success_rate, None);
        assert_eq!(empty.mean_roi, None);
    }

    #[test]
    fn test_cross_describe_pairs_keys() {
        let mut raws = vec![
            row("Paid", "0,2", "2023-01-01", "1,0", "2,0"),
            row("Paid", "0,4", "2023-01-01", "1,0", "2,0"),
            row("Organic", "0,9", "2023-01-01", "1,0", "2,0"),
        ];
        raws[1].campaign_type = "Webinar".to_string();
        let t = table(raws);

        let cells = cross_describe(
            &t.rows,
            Dimension::Channel,
            Dimension::CampaignType,
            Metric::Roi,
        );
        let keys: Vec<_> = cells
            .iter()
            .map(|c| (c.outer.as_str(), c.inner.as_str()))
            .collect();
        assert_eq!(keys, [("Organic", "Email"), ("Paid", "Email"), ("Paid", "Webinar")]);
        assert_eq!(cells[1].stats.as_ref().map(|s| s.count), Some(1));
        assert_close(cells[2].stats.as_ref().map(|s| s.median), 0.4);
    }

    #[test]
    fn test_pearson() {
        assert_close(pearson(vec![(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]), 1.0);
        assert_close(pearson(vec![(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]), -1.0);
        assert_eq!(pearson(vec![(1.0, 1.0)]), None);
        assert_eq!(pearson(vec![(1.0, 5.0), (2.0, 5.0)]), None);
        assert_close(pearson(vec![(1.0, 2.0), (f64::NAN, 0.0), (2.0, 4.0)]), 1.0);
    }

    #[test]
    fn test_correlation_skips_incomplete_rows() {
        let t = table(vec![
            row("A", "0,1", "2023-01-01", "100,00", "150,00"),
            row("A", "0,1", "2023-01-01", "200,00", "300,00"),
            row("A", "0,1", "2023-01-01", "sin datos", "900,00"),
            row("A", "0,1", "2023-01-01", "400,00", "600,00"),
        ]);
        let c = correlation(&t.rows, Metric::Investment, Metric::Revenue);
        assert_eq!(c.x, "inversión_num");
        assert_eq!(c.y, "facturación_num");
        assert_eq!(c.count, 3);
        assert_close(c.coefficient, 1.0);
    }

    #[test]
    fn test_sort_by_mean() {
        let mut groups = vec![
            GroupMean { key: "x".into(), mean: None, count: 0 },
            GroupMean { key: "y".into(), mean: Some(2.0), count: 1 },
            GroupMean { key: "z".into(), mean: Some(1.0), count: 1 },
        ];
        sort_by_mean(&mut groups, true);
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["z", "y", "x"]);
        sort_by_mean(&mut groups, false);
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["y", "z", "x"]);
    }
}
