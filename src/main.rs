use std::path::PathBuf;

use clap::{Parser, Subcommand};
use depstale::config::ServiceConfig;
use depstale::hosting::RepositoryId;
use depstale::service::presenter::ReportFormat;
use depstale::service::server::{LogFormat, init_tracing, run_check, run_server};

#[derive(Parser)]
#[command(name = "depstale")]
#[command(version, about = "Reports npm dependencies whose latest release is outside the declared range")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook and report server (default)
    Serve {
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overrides server.listen from the config
        #[arg(long)]
        listen: Option<String>,
        #[arg(long, value_enum, default_value_t = LogFormat::Human)]
        log_format: LogFormat,
        /// Write logs to the data directory instead of stdout
        #[arg(long)]
        log_file: bool,
    },
    /// Resolve one repository and print its report
    Check {
        /// Repository as owner/name
        repository: RepositoryId,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "text")]
        format: ReportFormat,
    },
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve {
        config: None,
        listen: None,
        log_format: LogFormat::Human,
        log_file: false,
    }) {
        Command::Serve {
            config,
            listen,
            log_format,
            log_file,
        } => {
            let _guard = init_tracing(log_format, log_file)?;
            let mut config = ServiceConfig::load(config.as_deref())?;
            if let Some(listen) = listen {
                config.server.listen = listen;
            }
            runtime()?.block_on(run_server(config))
        }
        Command::Check {
            repository,
            config,
            format,
        } => {
            let _guard = init_tracing(LogFormat::Human, false)?;
            let config = ServiceConfig::load(config.as_deref())?;
            let output = runtime()?.block_on(run_check(&config, &repository, format))?;
            println!("{}", output);
            Ok(())
        }
    }
}
