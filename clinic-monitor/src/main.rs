use clinic_monitor::services::ConfigService;
use clinic_monitor::utils::logger;
use clinic_monitor::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigService::load()?;

    // guard 必须存活到进程退出
    let _guard = logger::init(&config.log_dir)?;

    let state = AppState::new(&config).await?;
    state.monitor.initialize(&state.api_client).await?;
    state.activity.page_view(None, "/", None).await;

    state
        .event_log
        .info("App", "Clinic monitor running, press Ctrl-C to stop", None)
        .await?;

    tokio::signal::ctrl_c().await?;

    state.monitor.teardown(&state.api_client).await;
    let metrics = state.monitor.get_metrics().await;
    tracing::info!(
        page_loads = metrics.page_loads,
        api_calls = metrics.api_calls,
        errors = metrics.errors,
        "Clinic monitor stopped"
    );

    Ok(())
}
