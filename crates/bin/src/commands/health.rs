//! `houseview health`: asks a running server for its `/health` report and
//! exits non-zero unless the server answers that it is healthy.

use std::fmt;
use std::time::Duration;

use houseview::http::HealthResponse;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::cli::HealthArgs;

/// Why a server does not count as healthy.
#[derive(Debug)]
enum Unhealthy {
    Unreachable(reqwest::Error),
    HttpStatus(StatusCode),
    Unreadable(reqwest::Error),
    Reported(HealthResponse),
}

impl fmt::Display for Unhealthy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unhealthy::Unreachable(e) => write!(f, "unreachable: {e}"),
            Unhealthy::HttpStatus(status) => write!(f, "answered HTTP {status}"),
            Unhealthy::Unreadable(e) => write!(f, "sent an unreadable health report: {e}"),
            Unhealthy::Reported(report) => write!(
                f,
                "reports status {:?} on {} storage",
                report.status, report.backend
            ),
        }
    }
}

/// The `/health` endpoint of the server at `base`. A URL that already
/// names the endpoint is used as is.
fn health_url(base: &str) -> Result<Url, url::ParseError> {
    let base = base.trim_end_matches('/');
    if base.ends_with("/health") {
        Url::parse(base)
    } else {
        Url::parse(&format!("{base}/health"))
    }
}

async fn check_health(client: &Client, url: Url) -> Result<HealthResponse, Unhealthy> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(Unhealthy::Unreachable)?;
    if !response.status().is_success() {
        return Err(Unhealthy::HttpStatus(response.status()));
    }
    let report: HealthResponse = response.json().await.map_err(Unhealthy::Unreadable)?;
    if report.status == "healthy" {
        Ok(report)
    } else {
        Err(Unhealthy::Reported(report))
    }
}

/// Run the health check command
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let url = health_url(&args.url)?;
    let client = Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    match check_health(&client, url.clone()).await {
        Ok(report) => {
            println!("{url}: healthy, {} storage", report.backend);
            Ok(())
        }
        Err(problem) => {
            eprintln!("{url}: {problem}");
            std::process::exit(1);
        }
    }
}
