// CampaignLens - tests/e2e_pipeline.rs
//
// End-to-end tests for the load -> normalise -> aggregate -> report pipeline.
//
// These tests exercise the real filesystem, the real CSV decoder and the
// real locale parser against the fixture datasets in tests/fixtures/.
// No mocks, no stubs.

use campaignlens::app::cache::DatasetCache;
use campaignlens::app::loader::{load_and_normalize, load_or_empty, LoadOptions};
use campaignlens::app::report::{build_report, render_text};
use campaignlens::core::aggregate::grouped_mean;
use campaignlens::core::export::{export_csv, export_header};
use campaignlens::core::model::{Dimension, DurationCategory, Metric};
use campaignlens::core::reader::ReadConfig;
use campaignlens::util::error::LoadError;
use std::fs;
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

// =============================================================================
// Normalisation
// =============================================================================

#[test]
fn e2e_three_row_dataset_normalises() {
    let table = load_and_normalize(&fixture("campaigns.csv"), &LoadOptions::default())
        .expect("fixture must load");
    assert_eq!(table.len(), 3);

    let investment: Vec<_> = table.rows.iter().map(|c| c.investment).collect();
    assert_eq!(investment, [Some(1000.0), Some(2500.5), None]);

    let net_profit: Vec<_> = table.rows.iter().map(|c| c.net_profit_display()).collect();
    assert_eq!(net_profit, ["500,00", "-500,50", "sin datos"]);

    let success: Vec<_> = table.rows.iter().map(|c| c.success).collect();
    assert_eq!(success, [true, false, false]);

    // Durations 30, 60 and 10 days around a median of 30.
    assert_eq!(table.median_duration, Some(30.0));
    let categories: Vec<_> = table.rows.iter().map(|c| c.duration_category).collect();
    assert_eq!(
        categories,
        [
            DurationCategory::Medium,
            DurationCategory::Long,
            DurationCategory::Short
        ]
    );

    // The sentinel audience is kept distinct from any real category.
    assert!(table.rows[2].audience.is_no_data());
    assert_eq!(table.summary.invalid_numbers.values().sum::<usize>(), 0);
    assert!(table.summary.no_data_cells.values().sum::<usize>() >= 2);
}

#[test]
fn e2e_grouped_mean_per_channel() {
    let table = load_and_normalize(&fixture("campaigns.csv"), &LoadOptions::default()).unwrap();
    let groups = grouped_mean(&table.rows, Dimension::Channel, Metric::Roi);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].key, "A");
    assert!((groups[0].mean.unwrap() - 0.5).abs() < 1e-9);
    assert_eq!(groups[1].key, "B");
    assert!((groups[1].mean.unwrap() - 0.5).abs() < 1e-9);
}

#[test]
fn e2e_semicolon_dataset_with_source_duration() {
    let path = fixture("campaigns_semicolon.csv");

    // Auto-detected and explicit delimiters agree.
    let detected = load_and_normalize(&path, &LoadOptions::default()).unwrap();
    let explicit = load_and_normalize(
        &path,
        &LoadOptions {
            read: ReadConfig {
                delimiter: Some(b';'),
            },
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(detected.len(), 2);
    assert_eq!(explicit.len(), 2);

    // First row carries its own duration; the second falls back to dates.
    assert_eq!(detected.rows[0].duration_days, Some(29.0));
    assert_eq!(detected.rows[1].duration_days, Some(30.0));
    assert_eq!(detected.rows[0].month, Some(6));
    assert_eq!(detected.rows[1].month, Some(9));

    // Revenue is missing on the second row, so no profit and no success.
    assert_eq!(detected.rows[0].net_profit, Some(1800.0));
    assert_eq!(detected.rows[1].net_profit, None);
    assert!(!detected.rows[1].success);
}

// =============================================================================
// Failure handling
// =============================================================================

#[test]
fn e2e_missing_file_yields_empty_table_and_one_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("limpio_marketingcampaigns.csv");

    let (table, diagnostics) = load_or_empty(&path, &LoadOptions::default());
    assert!(table.is_empty());
    assert_eq!(diagnostics.len(), 1);

    // Downstream aggregation and rendering still work on the empty table.
    let report = build_report(&table, &path.display().to_string(), diagnostics);
    assert_eq!(report.overview.campaigns, 0);
    let mut out = Vec::new();
    render_text(&report, &mut out).unwrap();
    assert!(String::from_utf8(out).unwrap().contains("Error loading data"));
}

#[test]
fn e2e_short_row_is_recovered_per_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.csv");
    fs::write(
        &path,
        "nombre campaña,canal,tipo,audiencia target,fecha inicio,fecha fin,\
         inversión,facturación,retorno inversión,ratio conversión\n\
         A,Paid,Email,B2C,2023-01-01,2023-01-31,\"100,00\",\"300,00\",\"2,0\"\n\
         B,Organic,Webinar,B2B,2023-02-01,2023-02-11,\"50,00\",\"20,00\",\"0,1\",\"0,2\"\n",
    )
    .unwrap();

    let (table, diagnostics) = load_or_empty(&path, &LoadOptions::default());
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows[0].conversion_rate, None);
    assert_eq!(table.rows[0].net_profit, Some(200.0));
    assert_eq!(table.rows[1].conversion_rate, Some(0.2));
    assert_eq!(table.summary.no_data_cells.get("ratio conversión"), Some(&1));
}

#[test]
fn e2e_cached_missing_file_reports_one_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let cache = DatasetCache::new(dir.path().join("absent.csv"), LoadOptions::default());

    let (table, diagnostics) = cache.table_and_diagnostics();
    assert!(table.is_empty());
    assert_eq!(diagnostics.len(), 1);

    let report = build_report(table, "absent.csv", diagnostics);
    assert_eq!(report.diagnostics.len(), 1);
    assert!(report.correlations.iter().all(|c| c.coefficient.is_none()));
}

#[test]
fn e2e_missing_required_column_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.csv");
    fs::write(&path, "nombre campaña,canal,tipo\nA,Paid,Email\n").unwrap();

    match load_and_normalize(&path, &LoadOptions::default()) {
        Err(LoadError::MissingColumns { missing, .. }) => {
            assert!(missing.iter().any(|c| c == "inversión"));
            assert!(!missing.iter().any(|c| c == "canal"));
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

// =============================================================================
// Cache and export
// =============================================================================

#[test]
fn e2e_cache_loads_fixture_once() {
    let cache = DatasetCache::new(fixture("campaigns.csv"), LoadOptions::default());
    let first = cache.get_or_load().unwrap();
    let second = cache.get_or_load().unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.len(), 3);
}

#[test]
fn e2e_export_csv_round_trips_through_reader() {
    let table = load_and_normalize(&fixture("campaigns.csv"), &LoadOptions::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("normalizado.csv");
    let file = fs::File::create(&out_path).unwrap();
    let written = export_csv(&table, file, &out_path).unwrap();
    assert_eq!(written, 3);

    // The export is itself a valid input: re-loading yields the same figures.
    let reloaded = load_and_normalize(&out_path, &LoadOptions::default()).unwrap();
    assert_eq!(reloaded.len(), 3);
    for (a, b) in table.rows.iter().zip(&reloaded.rows) {
        assert_eq!(a.investment, b.investment);
        assert_eq!(a.net_profit, b.net_profit);
        assert_eq!(a.success, b.success);
        assert_eq!(a.duration_category, b.duration_category);
    }

    let mut reader = csv::Reader::from_path(&out_path).unwrap();
    assert_eq!(reader.headers().unwrap().len(), export_header().len());
}
