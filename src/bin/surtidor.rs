//! CLI binary for browsing and submitting fuel-discount promotions.
#![allow(
    clippy::exit,
    reason = "CLI binary uses process::exit for fatal errors"
)]

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use surtidor_rs::cooldown::CooldownState;
use surtidor_rs::error::SurtidorError;
use surtidor_rs::models::days::{EVERY_DAY, is_known_day};
use surtidor_rs::models::{
    Discount, DiscountId, ErrorReportDraft, Frequency, FuelBrand, RecommendationDraft,
};
use surtidor_rs::query::{DiscountQuery, SortDirection, SortField, SortSpec};
use surtidor_rs::storage::{BlockingCooldownStore, FileStorage, SubmissionKind};
use surtidor_rs::surtidor::SurtidorBlocking;

/// Environment variable name for the data-service base URL.
const URL_ENV: &str = "SURTIDOR_URL";

/// Environment variable name for the data-service anon key.
const KEY_ENV: &str = "SURTIDOR_ANON_KEY";

/// Surtidor CLI — browse fuel discounts, recommend new ones, report
/// errors.
#[derive(Debug, Parser)]
#[command(name = "surtidor", version, about)]
struct Cli {
    /// Override the storage directory (default: XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// List discounts, optionally filtered, searched, and sorted.
    Discounts(DiscountArgs),
    /// Recommend a new discount (moderated; 3s cooldown).
    Recommend(RecommendArgs),
    /// Report an error on a published discount (30s cooldown).
    Report(ReportArgs),
    /// Show the submission cooldown gates.
    Cooldown,
}

/// Arguments for the `discounts` subcommand.
#[derive(Debug, Args)]
struct DiscountArgs {
    /// Filter by brand (repeatable: YPF, SHELL, AXION, Multiple).
    #[arg(long, value_parser = parse_brand)]
    brand: Vec<FuelBrand>,
    /// Filter by day name (repeatable; "Todos los días" is exclusive).
    #[arg(long)]
    day: Vec<String>,
    /// Free-text search over payment method, frequency, brand, day.
    #[arg(long)]
    search: Option<String>,
    /// Sort column: discount, reimbursement, brand, or day.
    #[arg(long, value_parser = parse_sort_field)]
    sort: Option<SortField>,
    /// Sort ascending instead of the default descending.
    #[arg(long, requires = "sort")]
    asc: bool,
}

/// Arguments for the `recommend` subcommand.
#[derive(Debug, Args)]
struct RecommendArgs {
    /// Brand the discount applies to (repeatable).
    #[arg(long, required = true, value_parser = parse_brand)]
    brand: Vec<FuelBrand>,
    /// Day the discount applies to (repeatable).
    #[arg(long, required = true)]
    day: Vec<String>,
    /// Payment method (e.g. "Visa crédito", "Modo").
    #[arg(long)]
    card_method: String,
    /// Discount percentage (0-100).
    #[arg(long, value_parser = parse_percentage)]
    discount: u8,
    /// Reimbursement limit in pesos.
    #[arg(long, conflicts_with = "unlimited")]
    reimbursement: Option<u32>,
    /// The discount has no reimbursement cap.
    #[arg(long)]
    unlimited: bool,
    /// Usage frequency: weekly or monthly.
    #[arg(long, value_parser = parse_frequency)]
    frequency: Frequency,
    /// Link to the promotion's source.
    #[arg(long)]
    source_url: Option<String>,
}

/// Arguments for the `report` subcommand.
#[derive(Debug, Args)]
struct ReportArgs {
    /// ID of the discount being reported.
    #[arg(long)]
    discount_id: String,
    /// The discount has been discontinued (excludes the error flags).
    #[arg(long)]
    discontinued: bool,
    /// The day descriptor is wrong.
    #[arg(long)]
    days_error: bool,
    /// The discount percentage is wrong.
    #[arg(long)]
    discount_error: bool,
    /// The reimbursement limit is wrong.
    #[arg(long)]
    reimbursement_error: bool,
    /// The frequency is wrong.
    #[arg(long)]
    frequency_error: bool,
    /// Suggested corrected day (repeatable).
    #[arg(long)]
    suggested_day: Vec<String>,
    /// Suggested corrected percentage.
    #[arg(long, value_parser = parse_percentage)]
    suggested_discount: Option<u8>,
    /// Suggested corrected reimbursement limit.
    #[arg(long)]
    suggested_reimbursement: Option<u32>,
    /// Suggested corrected frequency.
    #[arg(long, value_parser = parse_frequency)]
    suggested_frequency: Option<Frequency>,
    /// Evidence link ("https://" is assumed when no scheme is given).
    #[arg(long)]
    evidence_url: String,
    /// Additional free-text comment.
    #[arg(long)]
    comments: Option<String>,
}

/// Parses a brand name for clap.
fn parse_brand(s: &str) -> Result<FuelBrand, String> {
    s.parse::<FuelBrand>().map_err(|err| format!("{err}"))
}

/// Parses a frequency name for clap.
fn parse_frequency(s: &str) -> Result<Frequency, String> {
    s.parse::<Frequency>().map_err(|err| format!("{err}"))
}

/// Parses a percentage in `[0, 100]` for clap.
fn parse_percentage(s: &str) -> Result<u8, String> {
    let value: u8 = s.parse().map_err(|err| format!("{err}"))?;
    if value > 100 {
        return Err(format!("percentage must be between 0 and 100, got {value}"));
    }
    Ok(value)
}

/// Parses a sort column name for clap.
fn parse_sort_field(s: &str) -> Result<SortField, String> {
    match s.to_ascii_lowercase().as_str() {
        "discount" => Ok(SortField::Discount),
        "reimbursement" => Ok(SortField::ReimbursementLimit),
        "brand" => Ok(SortField::FuelBrand),
        "day" => Ok(SortField::Day),
        other => Err(format!(
            "unknown sort column: {other} (expected discount, reimbursement, brand, or day)"
        )),
    }
}

/// Reads the service URL and anon key from the environment.
fn read_config() -> io::Result<Option<(String, String)>> {
    let url = std::env::var(URL_ENV).ok().filter(|v| !v.is_empty());
    let key = std::env::var(KEY_ENV).ok().filter(|v| !v.is_empty());
    match url.zip(key) {
        Some(config) => Ok(Some(config)),
        None => {
            let mut err = io::stderr().lock();
            writeln!(
                err,
                "{} {} and {} environment variables are required",
                "error:".red().bold(),
                URL_ENV.bold(),
                KEY_ENV.bold()
            )?;
            writeln!(
                err,
                "  {} create a .env file with {}=<project_url> and {}=<anon_key>",
                "hint:".cyan(),
                URL_ENV,
                KEY_ENV
            )?;
            Ok(None)
        }
    }
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let Some((url, key)) = read_config()? else {
        return Ok(ExitCode::FAILURE);
    };

    let storage = match create_storage(cli.data_dir) {
        Ok(storage) => storage,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to initialize storage: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let client = match SurtidorBlocking::builder()
        .api_key(key)
        .base_url(url)
        .storage(storage)
        .build()
    {
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

    dispatch(&client, cli.command)
}

/// Creates the storage backend, using `data_dir` if provided or the
/// default XDG data directory otherwise.
fn create_storage(data_dir: Option<PathBuf>) -> surtidor_rs::error::Result<FileStorage> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => FileStorage::default_dir()?,
    };
    FileStorage::new(dir)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch<S: BlockingCooldownStore>(
    client: &SurtidorBlocking<S>,
    command: Command,
) -> io::Result<ExitCode> {
    match command {
        Command::Discounts(args) => cmd_discounts(client, &args),
        Command::Recommend(args) => cmd_recommend(client, &args),
        Command::Report(args) => cmd_report(client, &args),
        Command::Cooldown => cmd_cooldown(client),
    }
}

/// Builds a [`DiscountQuery`] from CLI arguments.
fn build_query(args: &DiscountArgs) -> DiscountQuery {
    let mut query = DiscountQuery::new();
    for brand in &args.brand {
        query = query.brand(brand.as_str());
    }
    for day in &args.day {
        query = query.day(day);
    }
    if let Some(search) = args.search.as_deref() {
        query = query.search(search);
    }
    if let Some(field) = args.sort {
        query.sort = Some(SortSpec {
            field,
            direction: if args.asc {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            },
        });
    }
    query
}

/// Executes the `discounts` subcommand: fetches and prints the listing.
fn cmd_discounts<S: BlockingCooldownStore>(
    client: &SurtidorBlocking<S>,
    args: &DiscountArgs,
) -> io::Result<ExitCode> {
    let query = build_query(args);
    let spinner = make_spinner("Fetching discounts...");

    match client.discounts(&query) {
        Ok(discounts) => {
            spinner.finish_and_clear();
            print_discounts_table(&discounts)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            spinner.finish_and_clear();
            writeln!(
                io::stderr().lock(),
                "{} failed to fetch discounts: {err}",
                "error:".red().bold()
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Builds a [`RecommendationDraft`] from CLI arguments.
///
/// Returns `None` (with an error printed) when a day name is not a
/// canonical day value.
fn build_recommend_draft(args: &RecommendArgs) -> io::Result<Option<RecommendationDraft>> {
    let mut draft = RecommendationDraft::new();
    for brand in &args.brand {
        draft.toggle_brand(*brand);
    }
    for day in &args.day {
        if !is_known_day(day) {
            writeln!(
                io::stderr().lock(),
                "{} unknown day: {day} (expected a day name or {EVERY_DAY:?})",
                "error:".red().bold()
            )?;
            return Ok(None);
        }
        draft.toggle_day(day);
    }
    draft.set_card_method(args.card_method.as_str());
    draft.set_discount(&args.discount.to_string());
    if let Some(limit) = args.reimbursement {
        draft.set_reimbursement(&limit.to_string());
    }
    draft.set_unlimited(args.unlimited);
    draft.set_frequency(args.frequency);
    if let Some(url) = args.source_url.as_deref() {
        draft.set_source_url(url);
    }
    Ok(Some(draft))
}

/// Executes the `recommend` subcommand.
fn cmd_recommend<S: BlockingCooldownStore>(
    client: &SurtidorBlocking<S>,
    args: &RecommendArgs,
) -> io::Result<ExitCode> {
    let Some(draft) = build_recommend_draft(args)? else {
        return Ok(ExitCode::FAILURE);
    };

    let spinner = make_spinner("Submitting recommendation...");
    match client.recommend(&draft) {
        Ok(()) => {
            spinner.finish_and_clear();
            writeln!(
                io::stdout().lock(),
                "{} recommendation submitted for moderation",
                "ok:".green().bold()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            spinner.finish_and_clear();
            print_submit_error("recommendation", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Builds an [`ErrorReportDraft`] from CLI arguments.
fn build_report_draft(args: &ReportArgs) -> ErrorReportDraft {
    let mut draft = ErrorReportDraft::new(DiscountId::new(args.discount_id.clone()));
    draft.set_days_error(args.days_error);
    draft.set_discount_error(args.discount_error);
    draft.set_reimbursement_error(args.reimbursement_error);
    draft.set_frequency_error(args.frequency_error);
    for day in &args.suggested_day {
        draft.toggle_suggested_day(day);
    }
    if let Some(percentage) = args.suggested_discount {
        draft.suggest_discount(percentage);
    }
    if let Some(limit) = args.suggested_reimbursement {
        draft.suggest_reimbursement(limit);
    }
    if let Some(frequency) = args.suggested_frequency {
        draft.suggest_frequency(frequency);
    }
    // Discontinued last: it clears the field flags and suggestions.
    if args.discontinued {
        draft.set_discontinued(true);
    }
    draft.set_evidence_url(args.evidence_url.as_str());
    if let Some(comments) = args.comments.as_deref() {
        draft.set_comments(comments);
    }
    draft
}

/// Executes the `report` subcommand.
fn cmd_report<S: BlockingCooldownStore>(
    client: &SurtidorBlocking<S>,
    args: &ReportArgs,
) -> io::Result<ExitCode> {
    let draft = build_report_draft(args);

    let spinner = make_spinner("Submitting error report...");
    match client.report(&draft) {
        Ok(()) => {
            spinner.finish_and_clear();
            writeln!(
                io::stdout().lock(),
                "{} error report submitted",
                "ok:".green().bold()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            spinner.finish_and_clear();
            print_submit_error("error report", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `cooldown` subcommand: prints both gates.
fn cmd_cooldown<S: BlockingCooldownStore>(
    client: &SurtidorBlocking<S>,
) -> io::Result<ExitCode> {
    let mut out = io::stdout().lock();
    for (label, kind) in [
        ("Recommend", SubmissionKind::Recommendation),
        ("Report", SubmissionKind::Report),
    ] {
        match client.cooldown(kind) {
            Ok(CooldownState::Ready) => {
                writeln!(out, "{} {}", format_args!("{label}:").bold(), "ready".green())?;
            }
            Ok(CooldownState::Cooling { remaining_secs }) => {
                writeln!(
                    out,
                    "{} {}",
                    format_args!("{label}:").bold(),
                    format_args!("wait {remaining_secs}s").yellow()
                )?;
            }
            Err(err) => {
                writeln!(
                    io::stderr().lock(),
                    "{} failed to read cooldown state: {err}",
                    "error:".red().bold()
                )?;
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ── Output formatting ────────────────────────────────────────────────

/// Prints a submission failure with a cooldown-aware message.
fn print_submit_error(label: &str, err: &SurtidorError) -> io::Result<()> {
    let mut stderr = io::stderr().lock();
    match err {
        SurtidorError::Cooldown { remaining_secs } => writeln!(
            stderr,
            "{} please wait {remaining_secs}s before submitting another {label}",
            "error:".red().bold()
        ),
        SurtidorError::DuplicateReport => writeln!(
            stderr,
            "{} a report for this discount is already pending review",
            "error:".red().bold()
        ),
        other => writeln!(
            stderr,
            "{} failed to submit {label}: {other}",
            "error:".red().bold()
        ),
    }
}

/// Prints discounts in a table.
fn print_discounts_table(discounts: &[Discount]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if discounts.is_empty() {
        writeln!(out, "{}", "No discounts found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Brand").fg(Color::Cyan),
        Cell::new("Day").fg(Color::Cyan),
        Cell::new("Payment Method").fg(Color::Cyan),
        Cell::new("Discount").fg(Color::Cyan),
        Cell::new("Reimburse Limit").fg(Color::Cyan),
        Cell::new("Frequency").fg(Color::Cyan),
    ]);

    for discount in discounts {
        let limit_cell = discount.reimbursement_limit.map_or_else(
            || Cell::new("no limit").fg(Color::Magenta),
            |limit| Cell::new(format!("${limit}")),
        );
        let percent_cell = if discount.discount > 20 {
            Cell::new(format!("{}%", discount.discount)).fg(Color::Green)
        } else {
            Cell::new(format!("{}%", discount.discount))
        };
        _ = table.add_row(vec![
            Cell::new(discount.fuel_brand.as_str()),
            Cell::new(&discount.day),
            Cell::new(&discount.card_method),
            percent_cell,
            limit_cell,
            Cell::new(discount.frequency.as_str()),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Discounts".green().bold(),
        format_args!("({})", discounts.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
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
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // Last-resort error output — if stderr itself failed, nothing
            // we can do.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
