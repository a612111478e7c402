use infra_kit::logger::{self, Level};
use infra_kit::LogConfig;
use serde_json::Value;
use std::panic;
use tempfile::TempDir;

fn read_records(path: &std::path::Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

// 全域日誌只有一份，所以整個流程放在同一個測試裡
#[test]
fn test_global_logger_writes_structured_records() {
    let temp_dir = TempDir::new().unwrap();
    let log_file = temp_dir.path().join("logs").join("service.log");

    let config = LogConfig {
        level: "INFO".to_string(),
        encoding: "json".to_string(),
        file_name: log_file.clone(),
        ..LogConfig::default()
    };
    logger::init(config.clone()).unwrap();
    assert!(logger::global().is_installed());
    assert_eq!(logger::global().level(), Level::Info);

    infra_kit::debug!("hidden");
    infra_kit::info!("order created", order_id = 42, customer = "alice");
    infra_kit::warnf!("retry {} of {}", 1, 3);
    infra_kit::error!("payment failed", reason = "timeout");

    let result = panic::catch_unwind(|| {
        infra_kit::log_panic!("inventory corrupted");
    });
    let payload = result.unwrap_err();
    assert_eq!(
        payload.downcast_ref::<String>().map(String::as_str),
        Some("inventory corrupted")
    );

    let records = read_records(&log_file);
    assert_eq!(records.len(), 4, "records: {records:?}");

    let created = &records[0];
    assert_eq!(created["level"], "info");
    assert_eq!(created["msg"], "order created");
    assert_eq!(created["order_id"], 42);
    assert_eq!(created["customer"], "alice");
    let caller = created["caller"].as_str().unwrap();
    assert!(caller.starts_with(env!("CARGO_MANIFEST_DIR")), "{caller}");
    assert!(caller.contains("tests/logger_test.rs:"));
    assert!(created.get("caller_root").is_none());
    assert!(created["time"].is_string());
    assert!(created.get("stacktrace").is_none());

    let keys: Vec<&str> = created
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert!(keys.contains(&"logger"));

    assert_eq!(records[1]["level"], "warn");
    assert_eq!(records[1]["msg"], "retry 1 of 3");
    assert!(records[1].get("stacktrace").is_none());

    assert_eq!(records[2]["level"], "error");
    assert_eq!(records[2]["reason"], "timeout");
    let stacktrace = records[2]["stacktrace"].as_str().unwrap();
    assert!(stacktrace
        .lines()
        .next()
        .unwrap()
        .contains("test_global_logger_writes_structured_records"));

    assert_eq!(records[3]["level"], "panic");
    assert_eq!(records[3]["msg"], "inventory corrupted");
    assert!(records[3]["stacktrace"].is_string());

    // 重新初始化後改用新的等級
    logger::init(LogConfig {
        level: "error".to_string(),
        ..config
    })
    .unwrap();
    assert!(!logger::enabled(Level::Warn));
    assert!(logger::enabled(Level::Error));

    infra_kit::infof!("suppressed {}", 1);
    infra_kit::errorf!("disk usage at {}%", 97);

    let records = read_records(&log_file);
    assert_eq!(records.len(), 5);
    assert_eq!(records[4]["msg"], "disk usage at 97%");
}
