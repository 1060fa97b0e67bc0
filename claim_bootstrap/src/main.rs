// /////////////////////////////////////////////////////////////////////////////
// Claim Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

use std::time::Duration;

use claim_bootstrap::cli::Cli;
use claim_bootstrap::exit_code::ExitCode;
use claim_bootstrap::shutdown::ShutdownCoordinator;
use claim_bootstrap::signals::{create_signal_handler, SystemSignals};
use claim_engine::infrastructure::config::AppConfig;
use claim_engine::infrastructure::logging::{self, LogFormat};
use claim_engine::infrastructure::metrics::MetricsEndpoint;
use claim_engine::presentation::Dispatcher;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse_args();

    if cli.verbose && std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "debug");
    }
    logging::init(LogFormat::Pretty);

    let config_path = cli.config.to_string_lossy().into_owned();
    let command = match cli.into_pipeline_command() {
        Ok(cmd) => cmd,
        Err(e) => {
            tracing::error!(error = %e, "invalid command-line arguments");
            return std::process::ExitCode::from(ExitCode::UsageError.as_i32() as u8);
        }
    };

    let exit_code = run(&config_path, command).await;
    std::process::ExitCode::from(exit_code.as_i32() as u8)
}

async fn run(config_path: &str, command: claim_engine::presentation::PipelineCommand) -> ExitCode {
    let shutdown = ShutdownCoordinator::new(Duration::from_secs(10));
    let signal_handler = create_signal_handler();
    let token = shutdown.token();
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        signal_handler
            .wait_for_signal(Box::new(move || shutdown_for_signal.initiate_shutdown()))
            .await;
    });

    let config = match AppConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::Config;
        }
    };

    let dispatcher = match Dispatcher::build(&config).await {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            tracing::error!(error = %e, "failed to build pipeline dispatcher");
            return ExitCode::Software;
        }
    };

    let metrics_endpoint = MetricsEndpoint::new(dispatcher.metrics());
    let metrics_port = config.processing.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = metrics_endpoint.serve(metrics_port).await {
            tracing::warn!(error = %e, "metrics endpoint stopped");
        }
    });

    tokio::select! {
        result = dispatcher.run(command) => match result {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                tracing::error!(error = %e, "pipeline command failed");
                ExitCode::from_error(&e)
            }
        },
        _ = token.cancelled() => {
            tracing::info!("shutdown requested before command completed");
            ExitCode::Interrupted
        }
    }
}
