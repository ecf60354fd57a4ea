//! Process lifecycle: logging setup, serving, one-shot checks

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{ServiceConfig, data_dir};
use crate::hosting::RepositoryId;
use crate::service::pipeline::Pipeline;
use crate::service::presenter::{Presentation, ReportFormat, present};
use crate::service::routes::{AppState, build_router};
use crate::service::trigger::TriggerHandler;
use crate::version::cache::{MemoryReportStore, ReportStore};

const DEFAULT_LOG_FILTER: &str = "depstale=info,tower_http=info";
const LOG_FILE_NAME: &str = "depstale.log";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

/// Install the global subscriber.
///
/// Logs go to stdout, or to `depstale.log` under the data directory when
/// `log_file` is set. Keep the returned guard alive until exit so buffered
/// lines are flushed.
pub fn init_tracing(format: LogFormat, log_file: bool) -> anyhow::Result<WorkerGuard> {
    let (writer, guard) = if log_file {
        let dir = data_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, LOG_FILE_NAME))
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true);

    match format {
        LogFormat::Human => builder.with_ansi(!log_file).try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(guard)
}

/// Serve the HTTP surface until ctrl-c
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    let addr = config.listen_addr()?;
    let store: Arc<dyn ReportStore> = Arc::new(MemoryReportStore::new());
    let pipeline = Arc::new(Pipeline::from_config(&config, store));
    let app = build_router(AppState::new(TriggerHandler::new(pipeline)));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("depstale listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("depstale stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Resolve one repository immediately and render the result
pub async fn run_check(
    config: &ServiceConfig,
    repository: &RepositoryId,
    format: ReportFormat,
) -> anyhow::Result<String> {
    let store: Arc<dyn ReportStore> = Arc::new(MemoryReportStore::new());
    let pipeline = Pipeline::from_config(config, store.clone());

    pipeline
        .resolve(repository)
        .await
        .with_context(|| format!("Failed to check {}", repository))?;

    render(present(&*store, repository, format))
}

fn render(presentation: Presentation) -> anyhow::Result<String> {
    Ok(match presentation {
        Presentation::NotAvailable => "not available".to_string(),
        Presentation::Json(report) => serde_json::to_string_pretty(&report)?,
        Presentation::Text(text) => text,
        Presentation::Status(status) => status.to_string(),
    })
}
