use std::process::ExitCode;

/// Entry point for the Creo Supervisor.
///
/// Launches the configured containers, monitors them until SIGINT/SIGTERM/SIGQUIT and removes
/// them again before exiting.
///
/// Exits with status 1 if the container runtime cannot be reached or no container could be
/// launched, 0 otherwise.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug CREO_SUPERVISOR_CONFIG=supervisor.json cargo run
/// ```
#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match creo_supervisor::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
