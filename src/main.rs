use std::io;
use std::process::ExitCode;

use portfolio_core::{protocol, App, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries protocol responses only
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            init_tracing(false);
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_json);

    let app = match App::new(config) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(error = %e, "failed to start");
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    if let Err(e) = protocol::serve(&app, stdin.lock(), io::stdout().lock()) {
        tracing::warn!(error = %e, "stdio closed");
    }

    ExitCode::SUCCESS
}
