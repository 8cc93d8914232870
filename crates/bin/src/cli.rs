//! CLI argument definitions for the houseview binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use houseview::auth::Credential;

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// JSON documents in the data directory
    File,
    /// SQLite database
    Sqlite,
    /// PostgreSQL database
    Postgres,
}

/// House viewer backend server
#[derive(Parser, Debug)]
#[command(name = "houseview")]
#[command(about = "Items, BIM element metadata and logins for the 3D house viewer")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Check health of a running server
    Health(HealthArgs),
    /// Print a bearer token for an email, e.g. for BIM sync scripts
    Token(TokenArgs),
}

/// Storage selection, shared by commands that open the store.
#[derive(clap::Args, Debug, Clone)]
pub struct StorageArgs {
    /// Storage backend to use. Inferred from --database-url when omitted:
    /// a `sqlite:` URL selects sqlite, any other URL postgres, no URL file.
    #[arg(short, long, env = "HOUSEVIEW_BACKEND")]
    pub backend: Option<Backend>,

    /// Data directory.
    /// For file: stores items.json and elements.json
    /// For SQLite without a URL: stores houseview.db
    #[arg(short = 'D', long, default_value = ".", env = "HOUSEVIEW_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Database connection URL (sqlite: or postgres://)
    #[arg(long, env = "HOUSEVIEW_DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Token signing settings.
#[derive(clap::Args, Debug, Clone)]
pub struct TokenSettings {
    /// Secret used to sign and verify bearer tokens
    #[arg(long, env = "HOUSEVIEW_AUTH_SECRET", hide_env_values = true)]
    pub auth_secret: String,

    /// Token lifetime in seconds
    #[arg(long, default_value_t = 3600, env = "HOUSEVIEW_TOKEN_TTL_SECS")]
    pub token_ttl_secs: u64,
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "HOUSEVIEW_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "HOUSEVIEW_HOST")]
    pub host: String,

    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(flatten)]
    pub tokens: TokenSettings,

    /// Email of the account allowed to annotate elements
    #[arg(long, env = "HOUSEVIEW_EDITOR_EMAIL")]
    pub editor_email: Option<String>,

    /// Login account as `email:password`; the password may be an Argon2
    /// PHC hash. Repeatable; semicolon separated in the environment, since
    /// PHC strings contain commas.
    #[arg(
        long = "user",
        value_name = "EMAIL:PASSWORD",
        env = "HOUSEVIEW_USERS",
        value_delimiter = ';',
        hide_env_values = true
    )]
    pub users: Vec<Credential>,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "HOUSEVIEW_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the token command
#[derive(clap::Args, Debug)]
pub struct TokenArgs {
    /// Email the token is issued for
    pub email: String,

    #[command(flatten)]
    pub tokens: TokenSettings,
}
