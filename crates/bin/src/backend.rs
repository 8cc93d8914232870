//! Backend creation and utility functions.

use houseview::backend::{
    BackendImpl,
    database::{InMemory, SqlxBackend},
};

use crate::cli::{Backend, StorageArgs};

const SQLITE_FILE: &str = "houseview.db";

/// Redact credentials from a database connection URL for safe logging
pub fn redact_database_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

/// The backend to use: the explicit choice, else inferred from the URL.
pub fn resolve_backend(args: &StorageArgs) -> Backend {
    match (args.backend, args.database_url.as_deref()) {
        (Some(backend), _) => backend,
        (None, Some(url)) if url.starts_with("sqlite:") => Backend::Sqlite,
        (None, Some(_)) => Backend::Postgres,
        (None, None) => Backend::File,
    }
}

/// Short label for startup output
pub fn backend_label(args: &StorageArgs) -> String {
    match (resolve_backend(args), args.database_url.as_deref()) {
        (Backend::File, _) => format!("file ({})", args.data_dir.display()),
        (Backend::Sqlite, Some(url)) => format!("sqlite ({url})"),
        (Backend::Sqlite, None) => {
            format!("sqlite ({})", args.data_dir.join(SQLITE_FILE).display())
        }
        (Backend::Postgres, Some(url)) => format!("postgres ({})", redact_database_url(url)),
        (Backend::Postgres, None) => "postgres".to_string(),
    }
}

/// Create the appropriate backend based on configuration
pub async fn create_backend(
    args: &StorageArgs,
) -> Result<Box<dyn BackendImpl>, Box<dyn std::error::Error>> {
    match resolve_backend(args) {
        Backend::File => {
            tokio::fs::create_dir_all(&args.data_dir).await?;
            tracing::info!(
                "Using JSON document backend in {}",
                args.data_dir.display()
            );
            Ok(Box::new(InMemory::open(&args.data_dir)))
        }
        Backend::Sqlite => match args.database_url.as_deref() {
            Some(url) => {
                tracing::info!("Using SQLite backend at {url}");
                Ok(Box::new(SqlxBackend::connect_sqlite(url).await?))
            }
            None => {
                tokio::fs::create_dir_all(&args.data_dir).await?;
                let db_path = args.data_dir.join(SQLITE_FILE);
                tracing::info!("Using SQLite backend at {}", db_path.display());
                Ok(Box::new(SqlxBackend::open_sqlite(&db_path).await?))
            }
        },
        Backend::Postgres => {
            let url = args.database_url.as_ref().ok_or(
                "PostgreSQL backend requires --database-url or HOUSEVIEW_DATABASE_URL",
            )?;

            let display_url = redact_database_url(url);
            tracing::info!("Connecting to PostgreSQL backend at {}", display_url);

            match SqlxBackend::connect_postgres(url).await {
                Ok(backend) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(Box::new(backend))
                }
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {}: {}", display_url, e).into())
                }
            }
        }
    }
}
