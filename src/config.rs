// Credential handling. Values are resolved once at startup into an
// immutable `Credentials` value: a CLI flag wins, then the optional config
// file in the user's home directory, and anything still missing is prompted
// for interactively (hidden input for secrets).

use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

use crate::args::Args;

const CONFIG_FILE: &str = ".contabo-snap.json";

/// Resolved credential set for the OAuth2 password grant. Once built it is
/// only ever borrowed, never mutated.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

/// On-disk shape of `~/.contabo-snap.json`. All keys optional; the file
/// itself is optional too. Key names match the CLI flags.
#[derive(Debug, Default, Deserialize)]
struct StoredCredentials {
    clientid: Option<String>,
    clientsecret: Option<String>,
    apiuser: Option<String>,
    apipassword: Option<String>,
}

impl Credentials {
    /// Build the credential set from flags, the config file and prompts.
    pub fn resolve(args: &Args) -> Result<Self> {
        let stored = load_stored().unwrap_or_default();
        Ok(Credentials {
            client_id: pick(args.clientid.clone(), stored.clientid, "Client id", false)?,
            client_secret: pick(
                args.clientsecret.clone(),
                stored.clientsecret,
                "Client secret",
                true,
            )?,
            username: pick(args.apiuser.clone(), stored.apiuser, "API user", false)?,
            password: pick(
                args.apipassword.clone(),
                stored.apipassword,
                "API password",
                true,
            )?,
        })
    }
}

/// Flag value wins, then the stored one; otherwise ask on the terminal.
fn pick(flag: Option<String>, stored: Option<String>, prompt: &str, secret: bool) -> Result<String> {
    if let Some(value) = flag.or(stored) {
        return Ok(value);
    }
    let value = if secret {
        Password::new().with_prompt(prompt).interact()
    } else {
        Input::new().with_prompt(prompt).interact_text()
    };
    value.with_context(|| format!("failed to read {prompt} from terminal"))
}

/// Read the config file from the user's home directory, if it exists.
fn load_stored() -> Option<StoredCredentials> {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    debug!(path = %path.display(), "loaded stored credentials");
    serde_json::from_str(&data).ok()
}
