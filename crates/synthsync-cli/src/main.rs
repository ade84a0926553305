mod app;
mod cli;
mod observability;
mod output;
mod settings;

use clap::Parser;

use cli::Cli;

#[tokio::main]
async fn main() {
    // Load .env file if present; absent is fine
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    let cli = Cli::parse();
    std::process::exit(app::execute(cli).await);
}
