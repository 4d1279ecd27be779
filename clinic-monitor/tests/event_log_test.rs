//! 事件日志集成测试
//!
//! 覆盖阈值过滤、1000条上限、CRITICAL告警和存储故障下的行为

mod common;

use serde_json::json;
use std::sync::Arc;

use clinic_monitor::models::{LogEntry, LogError, LogLevel, MonitorConfig};
use clinic_monitor::services::kv_store::{self, keys};
use clinic_monitor::services::{EventLog, KeyValueStore, MAX_LOG_ENTRIES};
use common::{test_env, FlakyStore, RecordingSink};

async fn persisted_logs(store: &dyn KeyValueStore) -> Vec<LogEntry> {
    kv_store::load_json(store, keys::SYSTEM_LOGS)
        .await
        .unwrap()
        .unwrap_or_default()
}

#[tokio::test]
async fn test_five_levels_with_info_threshold() {
    let env = test_env(MonitorConfig::default()).await;
    let log = &env.state.event_log;

    log.debug("Agenda", "debug message", None).await.unwrap();
    log.info("Agenda", "info message", None).await.unwrap();
    log.warn("Agenda", "warn message", None).await.unwrap();
    log.error("Agenda", "error message", None).await.unwrap();
    log.critical("Agenda", "critical message", None).await.unwrap();

    let persisted = persisted_logs(&env.store).await;
    let levels: Vec<LogLevel> = persisted.iter().map(|e| e.level).collect();
    // 第一条是日志系统的启动记录
    assert_eq!(
        levels,
        vec![
            LogLevel::Info,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
            LogLevel::Critical
        ]
    );

    // DEBUG 既不持久化也不输出
    assert_eq!(env.sink.lines().len(), 5);
    assert!(!env.sink.lines().iter().any(|l| l.starts_with("[DEBUG]")));

    let notifications = env.sink.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].message, "critical message");
}

#[tokio::test]
async fn test_log_capped_with_fifo_eviction() {
    let env = test_env(MonitorConfig::default()).await;
    let log = &env.state.event_log;

    for i in 0..(MAX_LOG_ENTRIES + 25) {
        log.info("Pacientes", &format!("entry {}", i), None)
            .await
            .unwrap();
    }

    let persisted = persisted_logs(&env.store).await;
    assert_eq!(persisted.len(), MAX_LOG_ENTRIES);
    // 启动记录和最早的 26 条被淘汰
    assert_eq!(persisted.first().unwrap().message, "entry 26");
    assert_eq!(
        persisted.last().unwrap().message,
        format!("entry {}", MAX_LOG_ENTRIES + 24)
    );
    assert_eq!(log.len().await, MAX_LOG_ENTRIES);
}

#[tokio::test]
async fn test_entries_keep_creation_order() {
    let env = test_env(MonitorConfig::default()).await;
    let log = &env.state.event_log;

    for module in ["Agenda", "Pacientes", "Relatorios"] {
        log.info(module, "visited", None).await.unwrap();
    }

    let entries = log.entries().await;
    let modules: Vec<&str> = entries.iter().map(|e| e.module.as_str()).collect();
    assert_eq!(
        modules,
        vec!["LoggingSystem", "Agenda", "Pacientes", "Relatorios"]
    );
    assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[tokio::test]
async fn test_threshold_change_applies_immediately() {
    let env = test_env(MonitorConfig::default()).await;
    let log = &env.state.event_log;

    assert!(log.debug("Agenda", "hidden", None).await.unwrap().is_none());
    log.set_threshold(LogLevel::Debug).await.unwrap();
    assert!(log.debug("Agenda", "visible", None).await.unwrap().is_some());

    let messages: Vec<String> = log.entries().await.into_iter().map(|e| e.message).collect();
    assert_eq!(
        messages,
        vec!["Logging system initialized", "Log threshold changed", "visible"]
    );
}

#[tokio::test]
async fn test_structured_data_is_kept() {
    let env = test_env(MonitorConfig::default()).await;

    let entry = env
        .state
        .event_log
        .warn(
            "Agenda",
            "Horário ocupado",
            Some(json!({"medico": "Dr. Silva", "slot": "09:30"})),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(entry.data["medico"], "Dr. Silva");
    let persisted = persisted_logs(&env.store).await;
    assert_eq!(persisted.last().unwrap().data["slot"], "09:30");
}

#[tokio::test]
async fn test_contract_violations_are_rejected() {
    let env = test_env(MonitorConfig::default()).await;
    let log = &env.state.event_log;

    assert_eq!(
        log.info("Agenda", "", None).await.unwrap_err(),
        LogError::EmptyField("message".to_string())
    );
    assert!(matches!(
        log.info("Agenda", "msg", Some(json!("text"))).await,
        Err(LogError::InvalidData(_))
    ));
    assert_eq!(log.len().await, 1);
    assert_eq!(
        env.sink.lines(),
        vec!["[INFO] LoggingSystem: Logging system initialized"]
    );
}

#[tokio::test]
async fn test_store_failure_does_not_fail_record() {
    let store = Arc::new(FlakyStore::failing());
    let sink = Arc::new(RecordingSink::default());
    let log = EventLog::open(store.clone(), sink.clone(), LogLevel::Info).await;

    let entry = log.error("Agenda", "still recorded", None).await.unwrap();

    assert!(entry.is_some());
    assert_eq!(log.len().await, 1);
    assert_eq!(sink.lines(), vec!["[ERROR] Agenda: still recorded"]);

    // 存储恢复后下一次写入带上完整序列
    store.set_failing(false);
    log.info("Agenda", "after recovery", None).await.unwrap();
    assert_eq!(persisted_logs(&*store).await.len(), 2);
}

#[tokio::test]
async fn test_reopen_continues_persisted_sequence() {
    let env = test_env(MonitorConfig::default()).await;
    env.state
        .event_log
        .info("Agenda", "before restart", None)
        .await
        .unwrap();

    let reopened = EventLog::open(
        Arc::new(env.store.clone()),
        Arc::new(RecordingSink::default()),
        LogLevel::Info,
    )
    .await;
    reopened.info("Agenda", "after restart", None).await.unwrap();

    let messages: Vec<String> = persisted_logs(&env.store)
        .await
        .into_iter()
        .map(|e| e.message)
        .collect();
    assert_eq!(
        messages,
        vec!["Logging system initialized", "before restart", "after restart"]
    );
}

#[tokio::test]
async fn test_corrupt_document_starts_empty() {
    let store = Arc::new(clinic_monitor::services::MemoryStore::new());
    store
        .set(keys::SYSTEM_LOGS, "{not json".to_string())
        .await
        .unwrap();

    let log = EventLog::open(store.clone(), Arc::new(RecordingSink::default()), LogLevel::Info).await;
    assert!(log.is_empty().await);

    log.warn("Agenda", "rewritten", None).await.unwrap();
    assert_eq!(persisted_logs(&*store).await.len(), 1);
}

#[tokio::test]
async fn test_startup_entry_is_recorded_once_per_start() {
    let env = test_env(MonitorConfig::default()).await;

    let entries = env.state.event_log.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].module, "LoggingSystem");
    assert_eq!(entries[0].data["level"], "INFO");

    let restarted = EventLog::start(
        Arc::new(env.store.clone()),
        Arc::new(RecordingSink::default()),
        LogLevel::Info,
    )
    .await;
    let startups = restarted
        .entries()
        .await
        .into_iter()
        .filter(|e| e.message == "Logging system initialized")
        .count();
    assert_eq!(startups, 2);
}

#[tokio::test]
async fn test_startup_entry_respects_threshold() {
    let env = test_env(MonitorConfig::default().with_threshold(LogLevel::Error)).await;

    assert!(env.state.event_log.is_empty().await);
    assert!(env.sink.lines().is_empty());
}
