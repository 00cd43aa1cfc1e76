// CampaignLens - core/reader.rs
//
// CSV decoding of the campaign dataset.
// Core layer: works on already-read text, never touches the filesystem.

use crate::core::model::RawCampaign;
use crate::util::constants;
use crate::util::error::LoadError;
use std::path::Path;

/// Options for decoding the dataset text.
#[derive(Debug, Clone, Default)]
pub struct ReadConfig {
    /// Field delimiter. `None` detects it from the header line.
    pub delimiter: Option<u8>,
}

/// Pick the delimiter from the header line: comma unless the header has no
/// comma and contains one of the fallback delimiters.
pub fn detect_delimiter(header_line: &str) -> u8 {
    if header_line.contains(constants::DEFAULT_DELIMITER as char) {
        return constants::DEFAULT_DELIMITER;
    }
    constants::FALLBACK_DELIMITERS
        .iter()
        .copied()
        .find(|d| header_line.contains(*d as char))
        .unwrap_or(constants::DEFAULT_DELIMITER)
}

/// Decode `content` into raw campaign rows.
///
/// `source` is only used for error context. Fails if the header is empty,
/// if a required column is missing, or if the CSV itself is malformed.
/// Extra columns are ignored.
pub fn read_campaigns(
    content: &str,
    source: &Path,
    config: &ReadConfig,
) -> Result<Vec<RawCampaign>, LoadError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let header_line = content.lines().next().unwrap_or("");
    if header_line.trim().is_empty() {
        return Err(LoadError::EmptyHeader {
            path: source.to_path_buf(),
        });
    }

    let delimiter = config
        .delimiter
        .unwrap_or_else(|| detect_delimiter(header_line));
    tracing::debug!(
        path = %source.display(),
        delimiter = %(delimiter as char).escape_default(),
        "Decoding dataset"
    );

    // Short rows are padded below: missing trailing cells decode as empty
    // and are recovered per field during normalisation.
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let csv_err = |e: csv::Error| LoadError::Csv {
        path: source.to_path_buf(),
        source: e,
    };

    let headers = reader.headers().map_err(csv_err)?.clone();

    let missing: Vec<String> = constants::REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns {
            path: source.to_path_buf(),
            missing,
        });
    }

    let mut rows = Vec::new();
    let mut padded = 0usize;
    for record in reader.records() {
        let mut record = record.map_err(csv_err)?;
        if record.len() < headers.len() {
            padded += 1;
            while record.len() < headers.len() {
                record.push_field("");
            }
        }
        rows.push(record.deserialize::<RawCampaign>(Some(&headers)).map_err(csv_err)?);
    }
    if padded > 0 {
        tracing::debug!(path = %source.display(), rows = padded, "Short rows padded");
    }

    tracing::debug!(path = %source.display(), rows = rows.len(), "Dataset decoded");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const HEADER: &str = "nombre campaña,canal,tipo,audiencia target,fecha inicio,fecha fin,\
                          inversión,facturación,retorno inversión,ratio conversión";

    fn path() -> PathBuf {
        PathBuf::from("campaigns.csv")
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c"), b',');
        assert_eq!(detect_delimiter("a;b;c"), b';');
        assert_eq!(detect_delimiter("a\tb"), b'\t');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn test_reads_quoted_locale_numbers() {
        let content = format!(
            "{HEADER}\n\
             Spring,Paid,Email,B2C,2023-01-01,2023-02-01,\"1.000,00\",\"1.500,00\",\"0,5\",\"0,12\"\n"
        );
        let rows = read_campaigns(&content, &path(), &ReadConfig::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Spring");
        assert_eq!(rows[0].investment, "1.000,00");
        assert_eq!(rows[0].conversion_rate, "0,12");
        assert_eq!(rows[0].duration_days, None);
    }

    #[test]
    fn test_reads_semicolon_file_with_bom_and_extra_columns() {
        let content = format!(
            "\u{feff}{};extra\nA;Organic;Webinar;B2B;2023-01-01;;100,00;50,00;0,1;0,2;x\n",
            HEADER.replace(',', ";")
        );
        let rows = read_campaigns(&content, &path(), &ReadConfig::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].channel, "Organic");
        assert_eq!(rows[0].end_date, "");
        assert_eq!(rows[0].revenue, "50,00");
    }

    #[test]
    fn test_optional_derived_columns_are_read() {
        let content = format!(
            "{HEADER},duración días,beneficio neto,campaña exitosa\n\
             A,Paid,Email,B2C,2023-01-01,2023-01-11,\"1,00\",\"2,00\",\"1,0\",\"0,1\",10,\"1,00\",Sí\n"
        );
        let rows = read_campaigns(&content, &path(), &ReadConfig::default()).unwrap();
        assert_eq!(rows[0].duration_days.as_deref(), Some("10"));
        assert_eq!(rows[0].success.as_deref(), Some("Sí"));
    }

    #[test]
    fn test_missing_columns_are_listed() {
        let content = "nombre campaña,canal\nA,Paid\n";
        let err = read_campaigns(content, &path(), &ReadConfig::default()).unwrap_err();
        match err {
            LoadError::MissingColumns { missing, .. } => {
                assert!(missing.contains(&"inversión".to_string()));
                assert!(!missing.contains(&"canal".to_string()));
                assert_eq!(missing.len(), constants::REQUIRED_COLUMNS.len() - 2);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_content_is_rejected() {
        let err = read_campaigns("", &path(), &ReadConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyHeader { .. }));
    }

    #[test]
    fn test_short_row_is_padded_not_fatal() {
        let content = format!(
            "{HEADER}\n\
             A,Paid,Email,B2C,2023-01-01,2023-01-31,\"1,00\",\"2,00\",\"1,0\"\n\
             B,Organic\n\
             C,Paid,Webinar,B2B,2023-02-01,2023-02-11,\"3,00\",\"4,00\",\"0,3\",\"0,2\"\n"
        );
        let rows = read_campaigns(&content, &path(), &ReadConfig::default()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].roi, "1,0");
        assert_eq!(rows[0].conversion_rate, "");
        assert_eq!(rows[1].channel, "Organic");
        assert_eq!(rows[1].investment, "");
        assert_eq!(rows[2].conversion_rate, "0,2");
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let rows = read_campaigns(HEADER, &path(), &ReadConfig::default()).unwrap();
        assert!(rows.is_empty());
    }
}
