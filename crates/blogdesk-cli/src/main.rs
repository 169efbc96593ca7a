//! blogdesk - command-line host for the blog client's session core.
//!
//! Restores the saved session, then runs one command: sign in, register,
//! sign out, show status, or check access to a view or resource.

mod app;
mod cli;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use cli::{Command, USAGE};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the requested command. `Ok(false)` means the answer was "no".
async fn run() -> Result<bool> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(true);
    }

    let mut app = App::new()?;
    info!(?command, "blogdesk starting");

    match command {
        Command::Login { username } => app.login_interactive(username).await?,
        Command::Register { username, email } => app.register_interactive(username, email).await?,
        Command::Logout => app.logout(),
        Command::Status => app.print_status(),
        Command::Open { path } => return Ok(app.open(&path)),
        Command::CanEdit { author_id } => return Ok(app.can_edit(author_id)),
        Command::Help => {}
    }
    Ok(true)
}
