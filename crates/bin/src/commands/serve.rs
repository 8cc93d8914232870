//! Serve command - runs the houseview HTTP server.

use std::time::Duration;

use houseview::{
    Instance,
    auth::{AccessGuard, Credentials},
    backend::database::SqlxBackend,
    http::{AppState, router},
};
use tokio::signal::unix::{SignalKind, signal};

use crate::backend::{backend_label, create_backend};
use crate::cli::ServeArgs;

/// Run the houseview server
pub async fn run(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.tokens.auth_secret.trim().is_empty() {
        return Err("--auth-secret / HOUSEVIEW_AUTH_SECRET must not be empty".into());
    }

    // Create the storage backend
    let backend_box = create_backend(&args.storage).await?;
    let instance = Instance::open(backend_box);

    let mut guard = AccessGuard::new(args.tokens.auth_secret.clone(), instance.clock_arc())
        .with_token_ttl(Duration::from_secs(args.tokens.token_ttl_secs));
    if let Some(editor) = &args.editor_email {
        guard = guard.with_editor(editor.clone());
    }
    match guard.editor_email() {
        Some(editor) => tracing::info!("Element annotations restricted to {editor}"),
        None => tracing::warn!("No editor email configured; element annotations are disabled"),
    }

    let credentials: Credentials = args.users.into_iter().collect();
    if credentials.is_empty() {
        tracing::warn!("No login accounts configured; every login will be rejected");
    } else {
        tracing::info!("{} login account(s) configured", credentials.len());
    }

    let app = router(AppState::new(instance.clone(), guard, credentials));

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    // Print startup message
    println!("houseview listening on http://{local_addr}");
    println!("Storage: {}", backend_label(&args.storage));
    println!();
    println!("Available endpoints:");
    println!("  GET    /health               - Health check");
    println!("  POST   /api/auth/login       - Exchange email/password for a token");
    println!("  GET    /api/items            - List items");
    println!("  POST   /api/items            - Add an item");
    println!("  DELETE /api/items            - Remove all items");
    println!("  PUT    /api/items/{{id}}       - Update an item");
    println!("  DELETE /api/items/{{id}}       - Remove an item");
    println!("  GET    /api/elements         - List elements");
    println!("  POST   /api/elements/sync    - Sync elements from the BIM model");
    println!("  PUT    /api/elements/{{guid}}  - Annotate an element (editor only)");
    println!();
    println!("Press Ctrl+C to shutdown");

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Close the connection pool (only needed for SQL backends)
    if let Some(sql_backend) = instance.backend().as_any().downcast_ref::<SqlxBackend>() {
        sql_backend.close().await;
        tracing::info!("Database connections closed");
    }

    println!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to install signal handlers: {e}");
            std::future::pending::<()>().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }
}
