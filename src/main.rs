use anyhow::Result;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use admission_dashboard::api::{AdmissionsBackend, DashboardClient};
use admission_dashboard::models::Config;
use admission_dashboard::ui::run_app;

/// Logs must not land on the terminal the dashboard draws on, so by default
/// only errors are kept unless a log file is configured.
fn init_logging(config: &Config) -> Result<()> {
    let default_level = if config.log_file.is_some() { "info" } else { "error" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("admission_dashboard={}", default_level)));

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration Error: {}", e);
            eprintln!("Check ADMISSIONS_* variables in your environment or .env file.");
            std::process::exit(1);
        }
    };

    init_logging(&config)?;
    info!("Starting admissions dashboard against {}", config.api_base);

    let client = DashboardClient::new(&config)?;

    if let (Some(email), Some(password)) = (&config.login_email, &config.login_password) {
        if let Err(e) = client.login(email, password).await {
            error!("Login failed: {}", e);
            eprintln!("❌ Login failed: {}", e);
            std::process::exit(1);
        }
        info!("Logged in as {}", email);
    }

    let backend: Arc<dyn AdmissionsBackend> = Arc::new(client);
    match run_app(config, backend).await {
        Ok(true) => println!("You have been logged out."),
        Ok(false) => {}
        Err(e) => {
            error!("TUI error: {}", e);
            eprintln!("❌ TUI Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
