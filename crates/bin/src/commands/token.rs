//! Token command - prints a bearer token signed with the server's secret.

use std::time::Duration;

use houseview::{SystemClock, auth::issue_token};

use crate::cli::TokenArgs;

/// Run the token command
pub fn run(args: &TokenArgs) -> Result<(), Box<dyn std::error::Error>> {
    let email = args.email.trim();
    if email.is_empty() {
        return Err("email must not be empty".into());
    }
    let ttl = Duration::from_secs(args.tokens.token_ttl_secs);
    let token = issue_token(email, &args.tokens.auth_secret, ttl, &SystemClock);
    tracing::debug!(email, ttl_secs = args.tokens.token_ttl_secs, "issued token");
    println!("{token}");
    Ok(())
}
