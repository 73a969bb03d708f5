//! Polls for new movements, waiting out the API's rate limit between calls.
//!
//! Requires `FIO_TOKEN` environment variable. Each call advances the
//! server-side cursor, so movements are reported once.
//!
//! Run: `cargo run --example poll_last --features cli -- 3`

use core::time::Duration;
use std::process::ExitCode;

use fio_rs::client::FioClient;
use fio_rs::context::Context;

/// Minimum spacing between calls with the same token.
const INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _dotenv = dotenvy::dotenv();

    let token =
        std::env::var("FIO_TOKEN").map_err(|_| "FIO_TOKEN environment variable not set")?;
    let rounds: u32 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(2);

    let client = FioClient::builder().token(token).build()?;

    // Ctrl-C stops both an in-flight call and the wait between calls.
    let (ctx, handle) = Context::with_cancel();
    let _watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    for round in 1..=rounds {
        let call_ctx = ctx.clone().timeout(Duration::from_secs(60));
        match client.transactions_since_last_download(&call_ctx).await {
            Ok(statement) => {
                println!(
                    "round {round}: {} new movements on {}",
                    statement.transactions.len(),
                    statement.info.account_id
                );
                for tx in &statement.transactions {
                    let id = tx.id.map(|id| id.to_string()).unwrap_or_default();
                    let amount = tx.amount.map(|amount| amount.to_string()).unwrap_or_default();
                    let currency = tx.currency.as_deref().unwrap_or("");
                    println!("  {id:>12} {amount:>12} {currency}");
                }
            }
            Err(err) if err.is_retryable() => {
                println!("round {round}: rate limited, waiting");
            }
            Err(err) => return Err(err.into()),
        }

        if round < rounds {
            ctx.run(tokio::time::sleep(INTERVAL)).await?;
        }
    }

    Ok(())
}
