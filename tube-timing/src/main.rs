use chrono::Utc;
use chrono_tz::Europe::London;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tube_timing::cli::{Cli, run};

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays the departure list.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let now = Utc::now().with_timezone(&London);

    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    let code = match run(cli, now, &mut stdout, &mut stderr).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            2
        }
    };
    std::process::exit(code);
}
