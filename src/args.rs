// CLI argument surface. Flag names are kept flat (`--clientid`, not
// `--client-id`) so existing cron entries for the tool keep working.

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "contabo-snap", about = "Rolling snapshot management for a Contabo instance")]
pub struct Args {
    /// OAuth2 client id. Falls back to the config file, then to a prompt.
    #[arg(long)]
    pub clientid: Option<String>,

    /// OAuth2 client secret.
    #[arg(long)]
    pub clientsecret: Option<String>,

    /// API user (resource-owner username).
    #[arg(long)]
    pub apiuser: Option<String>,

    /// API password.
    #[arg(long)]
    pub apipassword: Option<String>,

    /// Name of the instance to operate on. Required.
    #[arg(long)]
    pub hostname: Option<String>,

    /// `create` rotates snapshots; anything else (or absent) lists them.
    #[arg(long)]
    pub action: Option<String>,

    /// Name for a newly created snapshot.
    #[arg(long, default_value = "daily")]
    pub name: String,

    /// Description for a newly created snapshot.
    #[arg(long, default_value = "daily")]
    pub description: String,

    /// Retention threshold: how many snapshots to keep around.
    #[arg(long, default_value_t = 2)]
    pub noofpsnaps: usize,
}
