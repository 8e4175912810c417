//! CSV and JSON export of scans, comparisons and bulk results.

mod helpers;

use std::sync::Arc;

use domain_insight::export::{
    bulk_results_to_csv, comparison_to_csv, scan_to_csv, scan_to_json, write_output,
};
use domain_insight::{BulkOptions, BulkScanManager, CompetitiveAnalyzer, ScanType};
use helpers::{create_test_pool, orchestrator, FakeCollectors, FakeSite};

#[tokio::test]
async fn test_scan_csv_has_one_row_per_category() {
    let site = FakeSite::healthy().failing("whois", "WHOIS server timed out");
    let fakes = Arc::new(FakeCollectors::new().with_site("example.com", site));
    let result = orchestrator(fakes).scan("example.com").await;

    let csv = scan_to_csv(&result).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[0], "category,status,score,detail");
    assert_eq!(lines[2], "whois,error,,WHOIS server timed out");
    assert!(lines[6].starts_with("seo,ok,92,"));
    assert!(lines[10].starts_with("overall,ok,"));
}

#[tokio::test]
async fn test_scan_json_matches_serde_form() {
    let fakes = Arc::new(FakeCollectors::new().with_site("example.com", FakeSite::healthy()));
    let result = orchestrator(fakes).scan("example.com").await;

    let json = scan_to_json(&result).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["domain"], "example.com");
    assert_eq!(value["overall_score"]["grade"], "A+");
}

#[tokio::test]
async fn test_comparison_csv_in_rank_order() {
    let fakes = FakeCollectors::new()
        .with_site("slow.com", FakeSite::healthy().with_score_seo(30))
        .with_site("fast.com", FakeSite::healthy());
    let analyzer = CompetitiveAnalyzer::new(Arc::new(orchestrator(Arc::new(fakes))));
    let report = analyzer.compare(&["slow.com", "fast.com"]).await.unwrap();

    let csv = comparison_to_csv(&report).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("rank,domain,score,grade"));
    assert!(lines[1].starts_with("1,fast.com,90.6,A+,92,"));
    assert!(lines[2].starts_with("2,slow.com,"));
}

#[tokio::test]
async fn test_bulk_csv_reports_task_errors() {
    let pool = Arc::new(create_test_pool().await);
    let fakes = FakeCollectors::new().with_site("good.com", FakeSite::healthy());
    let manager = BulkScanManager::new(pool, Arc::new(orchestrator(Arc::new(fakes))));

    let job_id = manager
        .create_job(
            None,
            &["good.com", "down.example"],
            ScanType::Complete,
            BulkOptions::default(),
        )
        .await
        .unwrap();
    manager.process_job(&job_id).await.unwrap();
    let results = manager.get_job_results(&job_id).await.unwrap();

    let csv = bulk_results_to_csv(&results).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "job_id,domain,status,score,grade,error");
    assert_eq!(lines[1], format!("{},good.com,completed,90.6,A+,", job_id));
    // A complete scan never fails as a whole; an unreachable site scores 0
    assert_eq!(lines[2], format!("{},down.example,completed,0,F,", job_id));
}

#[test]
fn test_write_output_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");
    write_output(Some(&path), "a,b\n1,2\n").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n1,2\n");
}
