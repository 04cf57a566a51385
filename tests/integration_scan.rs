//! End-to-end scan of a data directory through the public API

use chrono::NaiveDate;
use precip_processor::report::{self, ReportCollector, TableExport, TextReport};
use precip_processor::{
    Granularity, HeaderError, Line2Rule, PrecipError, PrecipProcessor, ProcessorConfig,
    RejectReason,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const LINE1: &str = "precip\tMIROC5\tRCP60\tREGRESION\tdecimas\t1";

fn body_line(year: i32, month: u32, value: f64) -> String {
    let values = vec![format!("{}", value); 31].join(" ");
    format!("P {} {:02} {}", year, month, values)
}

fn write_file(dir: &Path, name: &str, line2: &str, body: &[String]) {
    let mut content = format!("{}\n{}\n", LINE1, line2);
    for line in body {
        content.push_str(line);
        content.push('\n');
    }
    fs::write(dir.join(name), content).unwrap();
}

fn suffix_config() -> ProcessorConfig {
    ProcessorConfig::new(Line2Rule::EndsWith("-1".to_string()), Granularity::Daily)
        .without_progress()
}

#[tokio::test]
async fn test_scan_and_write_reports() {
    let data_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();

    let year_2000: Vec<String> = (1..=12).map(|m| body_line(2000, m, 1.0)).collect();
    let year_2001: Vec<String> = (1..=12).map(|m| body_line(2001, m, 2.0)).collect();
    write_file(data_dir.path(), "model1.dat", "MIROC5 r1i1p1-1", &year_2000);
    write_file(data_dir.path(), "model2.dat", "MIROC5 r1i1p1-1", &year_2001);
    write_file(data_dir.path(), "model3.dat", "MIROC5 r1i1p1-2", &year_2001);

    let processor = PrecipProcessor::new(data_dir.path().to_path_buf(), suffix_config()).unwrap();
    let scan = processor.process().await.unwrap();

    assert_eq!(scan.accepted_count(), 2);
    assert_eq!(
        scan.files[2].reject_reason(),
        Some(&RejectReason::Header(HeaderError::HeaderMismatch {
            line: 2,
            content: "MIROC5 r1i1p1-2".to_string(),
        }))
    );

    let stats = &scan.statistics;
    assert_eq!(stats.year(2000).unwrap().total, 372.0);
    assert_eq!(stats.year(2001).unwrap().total, 744.0);
    assert_eq!(stats.wettest_year.unwrap().year, 2001);
    assert_eq!(stats.driest_year.unwrap().year, 2000);
    assert_eq!(stats.grand_total, 1116.0);

    let timestamp = NaiveDate::from_ymd_opt(2023, 12, 31)
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap();
    let text = TextReport::at(out_dir.path().to_path_buf(), timestamp);
    let table = TableExport::new(out_dir.path().to_path_buf());
    let mut collectors: Vec<Box<dyn ReportCollector>> =
        vec![Box::new(text.clone()), Box::new(table.clone())];

    report::collect_all(&mut collectors, &scan).unwrap();

    let results = fs::read_to_string(text.results_path()).unwrap();
    assert!(results.contains("Good files: 2"));
    assert!(results.contains("model3.dat"));
    assert!(results.contains("2001: +100.00%"));
    assert!(
        out_dir
            .path()
            .join("review_31-12-2023_23-59-59.log")
            .exists()
    );
    assert!(table.csv_path().exists());
}

#[tokio::test]
async fn test_missing_directory_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("does-not-exist");

    let result = PrecipProcessor::new(missing, suffix_config());
    assert!(matches!(result, Err(PrecipError::DirectoryNotFound { .. })));
}

#[tokio::test]
async fn test_pattern_limits_scan() {
    let data_dir = TempDir::new().unwrap();
    write_file(data_dir.path(), "a.dat", "X-1", &[body_line(1990, 1, 1.0)]);
    fs::write(data_dir.path().join("README.txt"), "not a data file").unwrap();

    let config = suffix_config().with_file_pattern("*.dat");
    let scan = PrecipProcessor::new(data_dir.path().to_path_buf(), config)
        .unwrap()
        .process()
        .await
        .unwrap();

    assert_eq!(scan.files.len(), 1);
    assert_eq!(scan.rejected_count(), 0);
}
