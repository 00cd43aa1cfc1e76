// CampaignLens - core/export.rs
//
// CSV export of the normalised table and JSON export of any serialisable
// value (the report).
// Core layer: writes to any Write trait object.

use crate::core::model::{Campaign, CampaignTable};
use crate::util::constants;
use crate::util::error::ExportError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Header of the exported CSV: source columns first, derived columns after.
pub fn export_header() -> [&'static str; 23] {
    [
        constants::COL_NAME,
        constants::COL_CHANNEL,
        constants::COL_TYPE,
        constants::COL_AUDIENCE,
        constants::COL_START_DATE,
        constants::COL_END_DATE,
        constants::COL_INVESTMENT,
        constants::COL_REVENUE,
        constants::COL_ROI,
        constants::COL_CONVERSION,
        constants::COL_DURATION,
        constants::COL_NET_PROFIT,
        constants::COL_SUCCESS,
        constants::COL_INVESTMENT_NUM,
        constants::COL_REVENUE_NUM,
        constants::COL_ROI_NUM,
        constants::COL_CONVERSION_NUM,
        constants::COL_DURATION_NUM,
        constants::COL_NET_PROFIT_NUM,
        constants::COL_MONTH,
        constants::COL_DURATION_CATEGORY,
        constants::COL_INVESTMENT_TIER,
        constants::COL_NET_PROFIT_TIER,
    ]
}

fn num(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn record(campaign: &Campaign) -> Vec<String> {
    let raw = &campaign.raw;
    let duration = campaign
        .duration_days
        .map(|d| d.to_string())
        .unwrap_or_else(|| constants::NO_DATA_LABEL.to_string());

    vec![
        raw.name.clone(),
        raw.channel.clone(),
        raw.campaign_type.clone(),
        raw.audience.clone(),
        campaign
            .start_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| raw.start_date.clone()),
        campaign
            .end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| raw.end_date.clone()),
        raw.investment.clone(),
        raw.revenue.clone(),
        raw.roi.clone(),
        raw.conversion_rate.clone(),
        duration,
        campaign.net_profit_display(),
        campaign.success_label().to_string(),
        num(campaign.investment),
        num(campaign.revenue),
        num(campaign.roi),
        num(campaign.conversion_rate),
        num(campaign.duration_days),
        num(campaign.net_profit),
        campaign.month.map(|m| m.to_string()).unwrap_or_default(),
        campaign.duration_category.label().to_string(),
        campaign.investment_tier.label().to_string(),
        campaign.net_profit_tier.label().to_string(),
    ]
}

/// Export the normalised table to CSV. Returns the number of rows written.
///
/// Recomputed columns (duration, net profit, success) replace whatever the
/// source file held. Missing numerics are written as empty cells.
pub fn export_csv<W: Write>(
    table: &CampaignTable,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };

    csv_writer.write_record(export_header()).map_err(csv_err)?;

    let mut count = 0;
    for campaign in &table.rows {
        csv_writer.write_record(record(campaign)).map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %export_path.display(), rows = count, "CSV export written");
    Ok(count)
}

/// Write any serialisable value as pretty-printed JSON.
pub fn export_json<W: Write, T: Serialize + ?Sized>(
    value: &T,
    writer: W,
    export_path: &Path,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, value).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::RawCampaign;
    use crate::core::normalize::{normalize, Thresholds};
    use std::path::PathBuf;

    fn make_table() -> CampaignTable {
        let raw = |name: &str, investment: &str, revenue: &str| RawCampaign {
            name: name.to_string(),
            channel: "Paid".to_string(),
            campaign_type: "Email".to_string(),
            audience: "B2C".to_string(),
            start_date: "2023-02-01".to_string(),
            end_date: "2023-03-03".to_string(),
            investment: investment.to_string(),
            revenue: revenue.to_string(),
            roi: "0,5".to_string(),
            conversion_rate: "0,1".to_string(),
            ..Default::default()
        };
        normalize(
            vec![raw("Winner", "1.000,00", "1.500,00"), raw("Unknown", "sin datos", "10,00")],
            &Thresholds::default(),
        )
    }

    #[test]
    fn test_csv_export() {
        let table = make_table();
        let mut buf = Vec::new();
        let count = export_csv(&table, &mut buf, &PathBuf::from("out.csv")).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        let mut lines = output.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("nombre campaña,canal,tipo"));
        assert!(header.ends_with("categoría beneficio"));

        let winner = lines.next().unwrap();
        assert!(winner.contains("\"500,00\",Sí,1000,1500"), "row: {winner}");
        assert!(winner.contains(",30,"), "duration column: {winner}");

        let unknown = lines.next().unwrap();
        assert!(unknown.contains("sin datos,No,,10,"), "row: {unknown}");
    }

    #[test]
    fn test_csv_export_round_trips_through_csv_reader() {
        let table = make_table();
        let mut buf = Vec::new();
        export_csv(&table, &mut buf, &PathBuf::from("out.csv")).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        assert_eq!(reader.headers().unwrap().len(), export_header().len());
        assert_eq!(reader.records().count(), 2);
    }

    #[test]
    fn test_json_export() {
        let table = make_table();
        let mut buf = Vec::new();
        export_json(&table.rows, &mut buf, &PathBuf::from("out.json")).unwrap();

        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("\"name\": \"Winner\""));
        assert!(output.contains("\"duration_category\": \"media\""));
    }
}
