use std::process;

use brezza::{
    application::{build::BuildService, error::AppError},
    config,
    infra::{http, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Build(config::BuildArgs::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Build(_) => run_build(settings).await,
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_build(settings: config::Settings) -> Result<(), AppError> {
    let service = BuildService::new(&settings);
    service.build().await?;
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    http::serve(&settings).await?;
    Ok(())
}
