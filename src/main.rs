// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, create an API client and hand both to
//   the orchestration layer.
// - Returns `anyhow::Result` so any propagated failure exits with code 1.

use clap::Parser;
use contabo_snap::{api::ApiClient, args::Args, ui};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Log verbosity is governed by RUST_LOG; silent by default so the
    // listing output stays clean for cron mails.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Endpoint bases come from CONTABO_AUTH_URL / CONTABO_API_URL or default
    // to the public API. See `api::ApiClient::from_env`.
    let api = ApiClient::from_env()?;

    ui::run(&api, &args)
}
