//! Answer one call per stdin line
//!
//! Each line is a request body; headers are taken from `DEMO_AUTH` and
//! `DEMO_ROLE` so the context extractor and admin guard can be tried out:
//!
//! ```bash
//! echo '{"method":"math.add","args":[3,4]}' | cargo run -p demo-server
//! DEMO_AUTH="Bearer ada" cargo run -p demo-server
//! ```

use anyhow::{Context, Result};
use demo_api::store::UserStore;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use wirebind::{LogTarget, ObservabilityConfig, Request};

fn request_from_env() -> Request {
    let mut request = Request::new().with_peer("stdin");
    if let Ok(auth) = std::env::var("DEMO_AUTH") {
        request.insert_header("authorization", auth);
    }
    if let Ok(role) = std::env::var("DEMO_ROLE") {
        request.insert_header("x-role", role);
    }
    request
}

#[tokio::main]
async fn main() -> Result<()> {
    // Responses go to stdout
    let telemetry = ObservabilityConfig::new("demo-server")
        .with_log_target(LogTarget::Stderr)
        .with_log_level("warn")
        .init()
        .context("Failed to initialise telemetry")?;

    let service = demo_server::service(Arc::new(UserStore::new()));
    tracing::info!(methods = ?service.methods(), "Serving demo-api on stdin");

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = service.handle(request_from_env(), line.as_bytes()).await;
        let out = format!("{} {}\n", response.status(), response.body());
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    telemetry.shutdown();
    Ok(())
}
