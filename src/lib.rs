// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to implement the snapshot tool.
//
// Module responsibilities:
// - `api`: Encapsulates HTTP interactions with the Contabo API (token
//   exchange, instance lookup, snapshot list/create/delete).
// - `args`: The clap definition of the CLI flags.
// - `config`: Credential resolution (flags, config file, prompts).
// - `ui`: Orchestrates the list and rotate flows and formats output.
pub mod api;
pub mod args;
pub mod config;
pub mod ui;
