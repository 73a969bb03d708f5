//! CLI binary for downloading Fio bank statements.

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use fio_rs::client::FioClient;
use fio_rs::context::{CancelHandle, Context};
use fio_rs::error::FioError;
use fio_rs::models::{ExportFormat, NaiveDate, Statement, Transaction, TransactionId};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::AsyncWrite;

/// Environment variable name for the API token.
const TOKEN_ENV: &str = "FIO_TOKEN";

/// Environment variable name for the base URL override.
const BASE_URL_ENV: &str = "FIO_BASE_URL";

/// Fio banking API CLI: fetch statements and manage the download cursor.
#[derive(Debug, Parser)]
#[command(name = "fio", version, about)]
struct Cli {
    /// Override the API base URL (default: the production endpoint).
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Movements between two dates (inclusive).
    Period {
        /// Start date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,
        /// End date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,
        /// Output selection.
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Official statement by year and number.
    Statement {
        /// Statement year.
        #[arg(long)]
        year: i32,
        /// Statement number within the year.
        #[arg(long)]
        id: u32,
        /// Output selection.
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Movements since the last download. Advances the server cursor.
    Last {
        /// Output selection.
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Move the download cursor to a movement id.
    SetLastId {
        /// Movement id.
        id: i64,
    },
    /// Move the download cursor to a date.
    SetLastDate {
        /// Date (YYYY-MM-DD).
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
}

/// How a fetched statement is presented.
#[derive(Debug, Default, Args)]
struct OutputArgs {
    /// Download the raw export in this format (json, xml, csv, gpc, html, ofx).
    #[arg(long, value_parser = parse_format, conflicts_with = "json")]
    format: Option<ExportFormat>,
    /// Write the raw export to FILE instead of stdout. Requires --format.
    #[arg(long, value_name = "FILE", requires = "format")]
    output: Option<PathBuf>,
    /// Print the parsed statement as JSON.
    #[arg(long)]
    json: bool,
}

/// A statement-producing API call.
#[derive(Debug, Clone, Copy)]
enum Query {
    /// Date range.
    Period {
        /// Start date.
        from: NaiveDate,
        /// End date.
        to: NaiveDate,
    },
    /// Official statement.
    Statement {
        /// Statement year.
        year: i32,
        /// Statement number.
        id: u32,
    },
    /// Since the server cursor.
    Last,
}

impl Query {
    /// Human-readable description for progress messages.
    fn describe(self) -> String {
        match self {
            Self::Period { from, to } => format!("movements {from} to {to}"),
            Self::Statement { year, id } => format!("statement {id}/{year}"),
            Self::Last => "movements since last download".to_owned(),
        }
    }

    /// Fetches and parses the statement.
    async fn fetch(self, client: &FioClient, ctx: &Context) -> fio_rs::error::Result<Statement> {
        match self {
            Self::Period { from, to } => client.transactions_by_period(ctx, from, to).await,
            Self::Statement { year, id } => client.statement(ctx, year, id).await,
            Self::Last => client.transactions_since_last_download(ctx).await,
        }
    }

    /// Streams the raw export into `sink`.
    async fn export<W>(
        self,
        client: &FioClient,
        ctx: &Context,
        format: ExportFormat,
        sink: &mut W,
    ) -> fio_rs::error::Result<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        match self {
            Self::Period { from, to } => {
                client.export_by_period(ctx, from, to, format, sink).await
            }
            Self::Statement { year, id } => {
                client.export_statement(ctx, year, id, format, sink).await
            }
            Self::Last => client.export_since_last_download(ctx, format, sink).await,
        }
    }
}

/// Parses a date string in `YYYY-MM-DD` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|err| err.to_string())
}

/// Parses an export format name for clap.
fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse::<ExportFormat>().map_err(|err| err.to_string())
}

/// Reads the API token from the environment.
fn read_token() -> io::Result<Option<String>> {
    match std::env::var(TOKEN_ENV) {
        Ok(val) if !val.is_empty() => Ok(Some(val)),
        _ => {
            let mut err = io::stderr().lock();
            writeln!(
                err,
                "{} {} environment variable is not set",
                "error:".red().bold(),
                TOKEN_ENV.bold()
            )?;
            writeln!(
                err,
                "  {} create a .env file with {}=<your_token>",
                "hint:".cyan(),
                TOKEN_ENV
            )?;
            Ok(None)
        }
    }
}

/// Picks the base URL from the flag, then the environment.
fn resolve_base_url(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var(BASE_URL_ENV).ok())
        .filter(|url| !url.is_empty())
}

/// Runs the CLI, returning an appropriate exit code.
async fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let Some(token) = read_token()? else {
        return Ok(ExitCode::FAILURE);
    };

    let mut builder = FioClient::builder().token(token);
    if let Some(base_url) = resolve_base_url(cli.base_url) {
        builder = builder.base_url(base_url);
    }
    let client = match builder.build() {
        Ok(client) => client,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to build client: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let (ctx, handle) = Context::with_cancel();
    let watcher = tokio::spawn(cancel_on_interrupt(handle));
    let code = dispatch(&client, &ctx, cli.command).await;
    watcher.abort();
    code
}

/// Cancels the context on Ctrl-C.
async fn cancel_on_interrupt(handle: CancelHandle) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("interrupt received, cancelling request");
        handle.cancel();
    }
}

/// Dispatches to the appropriate subcommand handler.
async fn dispatch(client: &FioClient, ctx: &Context, command: Command) -> io::Result<ExitCode> {
    match command {
        Command::Period { from, to, output } => {
            cmd_fetch(client, ctx, Query::Period { from, to }, &output).await
        }
        Command::Statement { year, id, output } => {
            cmd_fetch(client, ctx, Query::Statement { year, id }, &output).await
        }
        Command::Last { output } => cmd_fetch(client, ctx, Query::Last, &output).await,
        Command::SetLastId { id } => cmd_set_last_id(client, ctx, TransactionId::new(id)).await,
        Command::SetLastDate { date } => cmd_set_last_date(client, ctx, date).await,
    }
}

/// Executes a fetching subcommand: table, JSON or raw export.
async fn cmd_fetch(
    client: &FioClient,
    ctx: &Context,
    query: Query,
    output: &OutputArgs,
) -> io::Result<ExitCode> {
    if let Some(format) = output.format {
        return cmd_export(client, ctx, query, format, output.output.as_deref()).await;
    }

    let spinner = make_spinner(&format!("Fetching {}...", query.describe()));
    let result = query.fetch(client, ctx).await;
    spinner.finish_and_clear();

    match result {
        Ok(statement) => {
            if output.json {
                print_json(&statement)?;
            } else {
                print_statement(&statement)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure("fetch failed", &err),
    }
}

/// Streams a raw export to `path`, or to stdout without one.
async fn cmd_export(
    client: &FioClient,
    ctx: &Context,
    query: Query,
    format: ExportFormat,
    path: Option<&Path>,
) -> io::Result<ExitCode> {
    let Some(path) = path else {
        let mut stdout = tokio::io::stdout();
        return match query.export(client, ctx, format, &mut stdout).await {
            Ok(_) => Ok(ExitCode::SUCCESS),
            Err(err) => report_failure("export failed", &err),
        };
    };

    let mut file = match tokio::fs::File::create(path).await {
        Ok(file) => file,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} cannot create {}: {err}",
                "error:".red().bold(),
                path.display()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let spinner = make_spinner(&format!("Exporting {} as {format}...", query.describe()));
    let result = query.export(client, ctx, format, &mut file).await;
    spinner.finish_and_clear();
    drop(file);

    match result {
        Ok(bytes) => {
            writeln!(
                io::stderr().lock(),
                "{} {bytes} bytes to {}",
                "Wrote".green().bold(),
                path.display()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            if let Err(remove_err) = tokio::fs::remove_file(path).await {
                tracing::debug!(error = %remove_err, "failed to remove partial export");
            }
            report_failure("export failed", &err)
        }
    }
}

/// Executes the `set-last-id` subcommand.
async fn cmd_set_last_id(
    client: &FioClient,
    ctx: &Context,
    id: TransactionId,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Moving download cursor...");
    let result = client.set_last_download_id(ctx, id).await;
    spinner.finish_and_clear();

    match result {
        Ok(()) => {
            writeln!(
                io::stdout().lock(),
                "{} cursor set to movement {}",
                "Done:".green().bold(),
                id.bold()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure("set-last-id failed", &err),
    }
}

/// Executes the `set-last-date` subcommand.
async fn cmd_set_last_date(
    client: &FioClient,
    ctx: &Context,
    date: NaiveDate,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Moving download cursor...");
    let result = client.set_last_download_date(ctx, date).await;
    spinner.finish_and_clear();

    match result {
        Ok(()) => {
            writeln!(
                io::stdout().lock(),
                "{} cursor set to {}",
                "Done:".green().bold(),
                date.bold()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure("set-last-date failed", &err),
    }
}

/// Prints a failed call with a hint where one applies.
fn report_failure(what: &str, err: &FioError) -> io::Result<ExitCode> {
    let mut out = io::stderr().lock();
    writeln!(out, "{} {what}: {err}", "error:".red().bold())?;
    if err.is_retryable() {
        writeln!(
            out,
            "  {} the API accepts one call per token every 30 seconds; try again later",
            "hint:".cyan()
        )?;
    } else if matches!(*err, FioError::Cancelled(_)) {
        writeln!(out, "  {} the request was interrupted", "hint:".cyan())?;
    }
    Ok(ExitCode::FAILURE)
}

/// Prints a statement as pretty JSON.
fn print_json(statement: &Statement) -> io::Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, statement)?;
    writeln!(out)?;
    Ok(())
}

/// Prints the statement header and its movements.
fn print_statement(statement: &Statement) -> io::Result<()> {
    let info = &statement.info;
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} {}",
        "Account".green().bold(),
        format_args!("{}/{} ({})", info.account_id, info.bank_id, info.currency).dimmed()
    )?;
    writeln!(out)?;

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Field").fg(Color::Cyan),
        Cell::new("Value").fg(Color::Cyan),
    ]);
    let rows = [
        ("IBAN", info.iban.clone()),
        ("BIC", info.bic.clone()),
        (
            "Period",
            format!(
                "{} to {}",
                info.date_start.format("%Y-%m-%d"),
                info.date_end.format("%Y-%m-%d")
            ),
        ),
        ("Opening balance", info.opening_balance.to_string()),
        ("Closing balance", info.closing_balance.to_string()),
        ("Movement ids", format!("{} to {}", info.id_from, info.id_to)),
    ];
    for (name, value) in rows {
        _ = table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    writeln!(out, "{table}")?;
    drop(out);

    print_transactions_table(&statement.transactions)
}

/// Prints movements in a table.
fn print_transactions_table(txs: &[Transaction]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if txs.is_empty() {
        writeln!(out, "{}", "No transactions found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Date").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
        Cell::new("Counterparty").fg(Color::Cyan),
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Message").fg(Color::Cyan),
    ]);

    for tx in txs {
        let date = tx.date.map_or_else(
            || "\u{2014}".to_owned(),
            |date| date.format("%Y-%m-%d").to_string(),
        );

        let currency = tx.currency.as_deref().unwrap_or("");
        let amount_cell = match tx.amount {
            Some(amount) if amount.is_sign_negative() => {
                Cell::new(format!("{amount} {currency}")).fg(Color::Red)
            }
            Some(amount) => Cell::new(format!("{amount} {currency}")).fg(Color::Green),
            None => Cell::new("\u{2014}").fg(Color::DarkGrey),
        };

        let message = tx
            .recipient_message
            .as_deref()
            .or(tx.comment.as_deref())
            .unwrap_or("");

        _ = table.add_row(vec![
            Cell::new(date),
            amount_cell,
            Cell::new(counterparty(tx)),
            Cell::new(tx.kind.as_deref().unwrap_or("")),
            Cell::new(message),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Transactions".green().bold(),
        format_args!("({})", txs.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Formats the counterparty as `name (account/bank)` from whatever is set.
fn counterparty(tx: &Transaction) -> String {
    let account = match (tx.account.as_deref(), tx.bank_code.as_deref()) {
        (Some(account), Some(bank)) => Some(format!("{account}/{bank}")),
        (Some(account), None) => Some(account.to_owned()),
        (None, _) => None,
    };
    match (tx.account_name.as_deref(), account) {
        (Some(name), Some(account)) => format!("{name} ({account})"),
        (Some(name), None) => name.to_owned(),
        (None, Some(account)) => account,
        (None, None) => "\u{2014}".to_owned(),
    }
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Entry point.
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            // Last-resort error output; a failing stderr leaves nothing to do.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
