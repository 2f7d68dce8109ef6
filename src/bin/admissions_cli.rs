use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use admission_dashboard::api::{AdmissionsBackend, DashboardClient, UploadKind};
use admission_dashboard::controller::{ops, RoleGate};
use admission_dashboard::export::{CsvExporter, CsvQuoting};
use admission_dashboard::models::{Config, ListPayload};
use admission_dashboard::table::schemas::{fee_schema, iteration_export_base, iteration_schema, student_schema};
use admission_dashboard::table::{CellFormat, TableSchema};

/// Scripted access to the admissions backend
#[derive(Parser)]
#[command(name = "admissions-cli")]
#[command(version = "1.0.0")]
#[command(about = "Query, export and update admissions data without the dashboard")]
#[command(long_about = "
Runs one dashboard operation and exits. Connection settings come from the
ADMISSIONS_* environment variables (or a .env file); flags override them.

Examples:
  admissions-cli stats
  admissions-cli students Kumar --export
  admissions-cli iterations 2 --export --quoting verbatim
  admissions-cli upload fees ./fees_paid.csv
  admissions-cli withdraw 2024A009
")]
struct Args {
    /// Backend origin, e.g. http://localhost:8000
    #[arg(long, env = "ADMISSIONS_API_BASE")]
    api_base: Option<String>,

    /// Account email used to open a session
    #[arg(long, env = "ADMISSIONS_EMAIL")]
    email: Option<String>,

    /// Account password used to open a session
    #[arg(long, env = "ADMISSIONS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Directory exported CSV files are written to
    #[arg(long, env = "ADMISSIONS_EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show application totals, latest iteration and gender distribution
    Stats,
    /// Search fee details by application number
    Fees {
        query: String,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Search students by application number or name
    Students {
        query: String,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Show the offers of one iteration
    Iterations {
        iteration: u32,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Upload a CSV file (master, iteration, fees or withdraw)
    Upload { kind: UploadKind, file: PathBuf },
    /// Withdraw a student by application number
    Withdraw {
        app_no: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Request a password reset email
    ForgotPassword { email: String },
    /// Set a new password with a reset token
    ResetPassword {
        token: String,
        new_password: String,
        confirm_password: String,
    },
    /// End the current session
    Logout,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Save the results as CSV in the export directory
    #[arg(long)]
    export: bool,

    /// CSV quoting: rfc4180 or verbatim
    #[arg(long, default_value = "rfc4180")]
    quoting: CsvQuoting,
}

fn prompt_user(message: &str) -> Result<bool> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase().starts_with('y'))
}

fn print_table<T>(schema: &TableSchema<T>, payload: ListPayload<T>, format: &CellFormat) -> Vec<T> {
    let (records, message) = payload.into_parts();
    if records.is_empty() {
        println!("{}", schema.empty_message);
        if let Some(message) = message {
            println!("{}", message);
        }
        return records;
    }

    println!("{} ({} records)", schema.title, records.len());
    println!("{}", schema.headers().join(" | "));
    for row in schema.rows(&records, format) {
        println!("{}", row.join(" | "));
    }
    records
}

fn export_rows<T>(
    exporter: &CsvExporter,
    schema: &TableSchema<T>,
    base: &str,
    records: &[T],
    format: &CellFormat,
    export: &ExportArgs,
) -> Result<()> {
    if !export.export {
        return Ok(());
    }
    let path = ops::export_table(exporter, schema, base, records, format, export.quoting)?;
    println!("✅ Saved {}", path.display());
    Ok(())
}

async fn require_gate(backend: &dyn AdmissionsBackend, allowed: impl Fn(&RoleGate) -> bool) -> Result<()> {
    let gate = ops::load_role_gate(backend).await;
    if !allowed(&gate) {
        bail!("your role ({:?}) does not permit this action", gate.role());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("admission_dashboard=info,admissions_cli=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(api_base) = args.api_base {
        config.api_base = api_base.trim_end_matches('/').to_string();
    }
    if let Some(dir) = args.export_dir {
        config.export_dir = dir;
    }

    let client = DashboardClient::new(&config)?;
    let backend: &dyn AdmissionsBackend = &client;

    let anonymous = matches!(
        args.command,
        Command::ForgotPassword { .. } | Command::ResetPassword { .. }
    );
    if !anonymous {
        if let (Some(email), Some(password)) = (&args.email, &args.password) {
            backend.login(email, password).await?;
            info!("Logged in as {}", email);
        }
    }

    let format = CellFormat::new(config.date_format.clone());
    let exporter = CsvExporter::new(config.export_dir.clone());

    match args.command {
        Command::Stats => {
            let stats = backend.stats().await?;
            println!("Total Applications: {}", stats.total_applications);
            println!("Accepted Students:  {}", stats.accepted_students);
            match stats.latest_iteration_number {
                Some(n) => println!(
                    "Latest Iteration:   #{} on {}",
                    n,
                    format.date(stats.latest_iteration_date)
                ),
                None => println!("Latest Iteration:   none"),
            }
            println!("Gender Distribution:");
            for share in stats.gender_shares() {
                println!("  {}: {} ({})", share.label, share.count, share.percent_label());
            }
        }
        Command::Fees { query, export } => {
            let payload = ops::fetch_fees(backend, query.trim()).await?;
            let schema = fee_schema();
            let records = print_table(schema, payload, &format);
            export_rows(&exporter, schema, schema.export_base, &records, &format, &export)?;
        }
        Command::Students { query, export } => {
            let payload = ops::fetch_students(backend, query.trim()).await?;
            let schema = student_schema();
            let records = print_table(schema, payload, &format);
            export_rows(&exporter, schema, schema.export_base, &records, &format, &export)?;
        }
        Command::Iterations { iteration, export } => {
            let payload = ops::fetch_iterations(backend, iteration).await?;
            let schema = iteration_schema();
            let records = print_table(schema, payload, &format);
            let base = iteration_export_base(iteration);
            export_rows(&exporter, schema, &base, &records, &format, &export)?;
        }
        Command::Upload { kind, file } => {
            require_gate(backend, |gate| gate.can_upload(kind)).await?;
            if !file.is_file() {
                bail!("{} is not a readable file", file.display());
            }
            backend.upload(kind, &file).await?;
            println!("✅ File uploaded successfully");
        }
        Command::Withdraw { app_no, yes } => {
            require_gate(backend, RoleGate::can_withdraw).await?;
            let prompt = format!(
                "Are you sure you want to withdraw Application No: {}? [y/N] ",
                app_no
            );
            if !yes && !prompt_user(&prompt)? {
                println!("Cancelled.");
                return Ok(());
            }
            ops::withdraw_student(backend, &app_no)
                .await
                .map_err(|e| match e.detail() {
                    Some(detail) => anyhow!("Failed to withdraw: {}", detail),
                    None => anyhow!("Error processing withdrawal: {}", e),
                })?;
            println!("✅ Application No: {} successfully withdrawn.", app_no);
        }
        Command::ForgotPassword { email } => {
            let message = backend.forgot_password(&email).await?;
            println!("{}", message);
        }
        Command::ResetPassword {
            token,
            new_password,
            confirm_password,
        } => {
            if new_password != confirm_password {
                bail!("Passwords do not match.");
            }
            let message = backend.reset_password(&token, &new_password).await?;
            println!("{}", message);
        }
        Command::Logout => {
            backend.logout().await?;
            println!("You have been logged out.");
        }
    }

    Ok(())
}
