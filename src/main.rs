use std::{future::IntoFuture, process, sync::Arc};

use minblog::{
    application::error::AppError,
    config::{self, Settings},
    infra::{
        backend::{self, RestRepositories},
        error::InfraError,
        http::{self, RouterState},
        telemetry,
    },
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
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
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::CheckConfig => run_check_config(settings).await,
    }
}

async fn run_serve(settings: Settings) -> Result<(), AppError> {
    let repositories = backend::connect(&settings.backend)?;
    let router = http::build_router(RouterState::new(repositories, &settings));

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "minblog::server",
        addr = %settings.server.addr,
        "listening"
    );

    let stop = Arc::new(Notify::new());
    let stopped = stop.clone();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { stopped.notified().await });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        joined = &mut server => return server_outcome(joined),
        () = shutdown_signal() => {}
    }

    info!(
        target = "minblog::server",
        grace_seconds = settings.server.graceful_shutdown.as_secs(),
        "shutdown requested; draining connections"
    );
    stop.notify_one();

    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(joined) => server_outcome(joined),
        Err(_) => {
            warn!(
                target = "minblog::server",
                "graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}

fn server_outcome(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "minblog::server", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(target = "minblog::server", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

async fn run_check_config(settings: Settings) -> Result<(), AppError> {
    println!("server.addr = {}", settings.server.addr);
    println!(
        "server.graceful_shutdown_seconds = {}",
        settings.server.graceful_shutdown.as_secs()
    );
    println!("logging.level = {}", settings.logging.level);
    println!("logging.format = {:?}", settings.logging.format);
    println!(
        "backend.url = {}",
        settings
            .backend
            .url
            .as_ref()
            .map(|url| url.as_str())
            .unwrap_or("<unset>")
    );
    println!(
        "backend.key = {}",
        if settings.backend.key.is_some() {
            "<redacted>"
        } else {
            "<unset>"
        }
    );
    println!(
        "backend.timeout_seconds = {}",
        settings.backend.timeout.as_secs()
    );
    println!("profile.id = {}", settings.profile.id);
    println!("site.title = {}", settings.site.title);

    let Some((url, key)) = settings.backend.credentials() else {
        let missing = settings.backend.missing_keys().join(", ");
        return Err(InfraError::configuration(format!("missing {missing}")).into());
    };

    let client = RestRepositories::new(url, key, settings.backend.timeout)?;
    client
        .health_check()
        .await
        .map_err(|err| InfraError::backend(format!("backend probe failed: {err}")))?;

    println!("backend reachable");
    Ok(())
}
