//! 面板命令集成测试

mod common;

use serde_json::json;

use clinic_monitor::commands::activity_commands::{list_activity, record_page_view, PageViewRequest};
use clinic_monitor::commands::log_commands::{
    log_batch, log_event, query_logs, set_log_threshold, LogEventRequest,
};
use clinic_monitor::commands::metrics_commands::{clear_metrics, get_metrics, get_metrics_overview};
use clinic_monitor::models::{ActivityUser, LogLevel, LogQuery, MonitorConfig};
use common::test_env;

fn request(level: &str, module: &str, message: &str) -> LogEventRequest {
    LogEventRequest {
        level: level.to_string(),
        module: module.to_string(),
        message: message.to_string(),
        data: None,
    }
}

#[tokio::test]
async fn test_log_event_rejects_unknown_level() {
    let env = test_env(MonitorConfig::default()).await;

    let err = log_event(&env.state, request("FATAL", "Agenda", "x"))
        .await
        .unwrap_err();

    assert!(err.contains("FATAL"));
    // 只有启动记录
    assert_eq!(env.state.event_log.len().await, 1);
}

#[tokio::test]
async fn test_log_batch_counts_recorded_entries() {
    let env = test_env(MonitorConfig::default()).await;

    let recorded = log_batch(
        &env.state,
        vec![
            request("debug", "Agenda", "suppressed"),
            request("info", "Agenda", "kept"),
            request("error", "", "rejected"),
            request("critical", "Pacientes", "kept too"),
        ],
    )
    .await
    .unwrap();

    assert_eq!(recorded, 2);
    assert_eq!(env.sink.notifications().len(), 1);
}

#[tokio::test]
async fn test_set_log_threshold_command() {
    let env = test_env(MonitorConfig::default()).await;

    assert_eq!(
        set_log_threshold(&env.state, "warn".to_string()).await.unwrap(),
        "WARN"
    );
    assert_eq!(env.state.event_log.threshold(), LogLevel::Warn);
    assert!(set_log_threshold(&env.state, "loud".to_string()).await.is_err());
}

#[tokio::test]
async fn test_query_logs_filters_and_lists_choices() {
    let env = test_env(MonitorConfig::default()).await;
    let log = &env.state.event_log;
    log.info("Agenda", "Consulta confirmada", None).await.unwrap();
    log.error("Pacientes", "Falha ao salvar", Some(json!({"id": 9})))
        .await
        .unwrap();
    log.info("Pacientes", "Consulta remarcada", None).await.unwrap();

    let response = query_logs(
        &env.state,
        LogQuery::default()
            .with_level(LogLevel::Info)
            .with_search("CONSULTA"),
    )
    .await
    .unwrap();

    assert_eq!(response.total, 4);
    assert_eq!(response.entries.len(), 2);
    assert_eq!(response.levels, vec![LogLevel::Info, LogLevel::Error]);
    assert_eq!(
        response.modules,
        vec!["LoggingSystem", "Agenda", "Pacientes"]
    );
}

#[tokio::test]
async fn test_metrics_commands() {
    let env = test_env(MonitorConfig::default()).await;
    let monitor = &env.state.monitor;

    let overview = get_metrics_overview(&env.state).await.unwrap();
    assert_eq!(overview.average_response_ms, None);
    assert_eq!(overview.error_rate, None);

    monitor.track_api_call("/api/a", 100.0, 200).await;
    monitor.track_api_call("/api/b", 300.0, 500).await;
    monitor.track_error("API_CALL", "timeout", None).await;

    let overview = get_metrics_overview(&env.state).await.unwrap();
    assert_eq!(overview.average_response_ms, Some(200.0));
    assert_eq!(overview.error_rate, Some(0.5));

    clear_metrics(&env.state).await.unwrap();
    let snapshot = get_metrics(&env.state).await.unwrap();
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_activity_commands() {
    let env = test_env(MonitorConfig::default()).await;

    record_page_view(
        &env.state,
        PageViewRequest {
            path: "/agendamentos".to_string(),
            user: Some(ActivityUser::new("1", Some("Admin".to_string()))),
            user_agent: None,
        },
    )
    .await
    .unwrap();
    record_page_view(
        &env.state,
        PageViewRequest {
            path: "/pacientes".to_string(),
            user: None,
            user_agent: Some("Mozilla/5.0".to_string()),
        },
    )
    .await
    .unwrap();

    let latest = list_activity(&env.state, Some(1)).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].path, "/pacientes");
    assert_eq!(latest[0].user_id, "anonymous");

    assert_eq!(list_activity(&env.state, None).await.unwrap().len(), 2);

    let empty_path = PageViewRequest {
        path: " ".to_string(),
        user: None,
        user_agent: None,
    };
    assert!(record_page_view(&env.state, empty_path).await.is_err());
}
