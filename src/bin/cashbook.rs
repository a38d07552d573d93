//! CLI binary for keeping a multi-currency cashbook.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cashbook::context::LedgerContext;
use cashbook::ledger::Ledger;
use cashbook::models::{
    Currency, DATE_FORMAT, Movement, MovementDraft, MovementId, MovementPatch, MovementType,
    validate_date,
};
use cashbook::storage::{FileStorage, MovementStore};
use cashbook::views::{
    CashFlowMode, MovementFilter, PeriodSummary, Scope, filter_totals, running_balances,
};
use chrono::{Datelike as _, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use owo_colors::OwoColorize;

/// Environment variable overriding the storage directory.
const DATA_DIR_ENV: &str = "CASHBOOK_DATA_DIR";

/// Short month names for table rows.
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Cashbook CLI: record movements and browse balances.
#[derive(Debug, Parser)]
#[command(name = "cashbook", version, about)]
struct Cli {
    /// Override the storage directory (default: $CASHBOOK_DATA_DIR, then
    /// the XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Record a new movement.
    Add(AddArgs),
    /// Change fields of an existing movement.
    Edit(EditArgs),
    /// Remove a movement.
    Delete {
        /// Movement id.
        id: String,
    },
    /// Copy a movement under a new id.
    Duplicate {
        /// Movement id.
        id: String,
    },
    /// Enable or disable a single movement.
    Toggle {
        /// Movement id.
        id: String,
    },
    /// Enable every filtered movement if any is disabled, otherwise
    /// disable them all.
    ToggleAll(FilterArgs),
    /// List movements, most recent first, with a running balance.
    List(FilterArgs),
    /// Monthly cash-flow summary of a year.
    Summary(PeriodArgs),
    /// Expense distribution by category.
    Categories(PeriodArgs),
    /// Cumulative savings and investments of a year.
    Savings {
        /// Year (default: current year).
        #[arg(long)]
        year: Option<i32>,
    },
    /// Overall, monthly and savings balances.
    Headline {
        /// Month as YYYY-MM (default: current month).
        #[arg(long, value_parser = parse_month)]
        month: Option<String>,
    },
    /// Show the default exchange rates.
    Rates,
    /// Set the default exchange rate of a currency.
    SetRate {
        /// Currency code (EUR, USD, COP).
        #[arg(value_parser = parse_currency)]
        currency: Currency,
        /// Units of the currency per unit of the base currency.
        rate: f64,
    },
    /// Append movements from a JSON export.
    Import {
        /// Path of the JSON file.
        file: PathBuf,
    },
    /// Report stored values that are counted with a fallback.
    Check,
    /// List the allowed categories per movement type.
    CategoriesList,
}

/// Arguments for the `add` subcommand.
#[derive(Debug, Args)]
struct AddArgs {
    /// Movement type (fixed, variable, income).
    #[arg(long = "type", value_parser = parse_kind)]
    kind: MovementType,
    /// Category name.
    #[arg(long)]
    category: String,
    /// Amount in the movement currency.
    #[arg(long)]
    amount: f64,
    /// Currency code (default: base currency).
    #[arg(long, value_parser = parse_currency)]
    currency: Option<Currency>,
    /// Exchange rate (default: stored default for the currency).
    #[arg(long)]
    rate: Option<f64>,
    /// Free text.
    #[arg(long)]
    description: Option<String>,
    /// Booking date (YYYY-MM-DD, default: today).
    #[arg(long, value_parser = parse_date)]
    date: Option<String>,
}

/// Arguments for the `edit` subcommand.
#[derive(Debug, Args)]
struct EditArgs {
    /// Movement id.
    id: String,
    /// New movement type.
    #[arg(long = "type", value_parser = parse_kind)]
    kind: Option<MovementType>,
    /// New category.
    #[arg(long)]
    category: Option<String>,
    /// New amount.
    #[arg(long)]
    amount: Option<f64>,
    /// New currency.
    #[arg(long, value_parser = parse_currency)]
    currency: Option<Currency>,
    /// New exchange rate.
    #[arg(long)]
    rate: Option<f64>,
    /// New description.
    #[arg(long)]
    description: Option<String>,
    /// New date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    date: Option<String>,
}

/// Listing filters shared by `list` and `toggle-all`.
#[derive(Debug, Default, Args)]
struct FilterArgs {
    /// Earliest date (inclusive, YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    from: Option<String>,
    /// Latest date (inclusive, YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    to: Option<String>,
    /// Movement type.
    #[arg(long = "type", value_parser = parse_kind)]
    kind: Option<MovementType>,
    /// Exact category name.
    #[arg(long)]
    category: Option<String>,
    /// Minimum amount in the base currency.
    #[arg(long)]
    min_amount: Option<f64>,
    /// Maximum amount in the base currency.
    #[arg(long)]
    max_amount: Option<f64>,
    /// Description substring (case-insensitive).
    #[arg(long)]
    description: Option<String>,
}

/// Year and optional month of a period view.
#[derive(Debug, Args)]
struct PeriodArgs {
    /// Year (default: current year).
    #[arg(long)]
    year: Option<i32>,
    /// Month number 1-12; switches to the single-month view.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,
}

/// Parses a date in canonical `YYYY-MM-DD` form for clap.
fn parse_date(s: &str) -> Result<String, String> {
    validate_date(s).map_err(|err| err.to_string())?;
    Ok(s.to_owned())
}

/// Parses a `YYYY-MM` month for clap.
fn parse_month(s: &str) -> Result<String, String> {
    let first = format!("{s}-01");
    match NaiveDate::parse_from_str(&first, DATE_FORMAT) {
        Ok(date) if date.format(DATE_FORMAT).to_string() == first => Ok(s.to_owned()),
        Ok(_) => Err(format!("{s:?} must be zero-padded YYYY-MM")),
        Err(err) => Err(format!("{s:?}: {err}")),
    }
}

/// Parses a movement type for clap.
fn parse_kind(s: &str) -> Result<MovementType, String> {
    s.parse().map_err(|err: cashbook::error::LedgerError| err.to_string())
}

/// Parses a currency code for clap.
fn parse_currency(s: &str) -> Result<Currency, String> {
    s.parse().map_err(|err: cashbook::error::LedgerError| err.to_string())
}

/// Prints `error: <what>: <err>` to stderr and returns a failure code.
fn report<E: core::fmt::Display>(what: &str, err: E) -> io::Result<ExitCode> {
    writeln!(io::stderr().lock(), "{} {what}: {err}", "error:".red().bold())?;
    Ok(ExitCode::FAILURE)
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut ledger = match create_ledger(cli.data_dir) {
        Ok(ledger) => ledger,
        Err(err) => return report("failed to open ledger", err),
    };

    dispatch(&mut ledger, cli.command)
}

/// Picks the storage directory: the flag, then the environment, then the
/// platform default.
fn resolve_data_dir(flag: Option<PathBuf>) -> cashbook::error::Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        Some(_) | None => FileStorage::default_dir(),
    }
}

/// Opens the file-backed ledger.
fn create_ledger(data_dir: Option<PathBuf>) -> cashbook::error::Result<Ledger<FileStorage>> {
    let storage = FileStorage::new(resolve_data_dir(data_dir)?)?;
    Ledger::builder().storage(storage).build()
}

/// Current year from the local clock.
fn current_year() -> i32 {
    Local::now().year()
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch<S: MovementStore>(ledger: &mut Ledger<S>, command: Command) -> io::Result<ExitCode> {
    match command {
        Command::Add(args) => cmd_add(ledger, args),
        Command::Edit(args) => cmd_edit(ledger, args),
        Command::Delete { id } => cmd_delete(ledger, &MovementId::from(id)),
        Command::Duplicate { id } => cmd_duplicate(ledger, &MovementId::from(id)),
        Command::Toggle { id } => cmd_toggle(ledger, &MovementId::from(id)),
        Command::ToggleAll(args) => cmd_toggle_all(ledger, &args),
        Command::List(args) => cmd_list(ledger, &args),
        Command::Summary(args) => cmd_summary(ledger, &args),
        Command::Categories(args) => cmd_categories(ledger, &args),
        Command::Savings { year } => cmd_savings(ledger, year.unwrap_or_else(current_year)),
        Command::Headline { month } => cmd_headline(ledger, month),
        Command::Rates => cmd_rates(ledger.context()),
        Command::SetRate { currency, rate } => cmd_set_rate(ledger, currency, rate),
        Command::Import { file } => cmd_import(ledger, &file),
        Command::Check => cmd_check(ledger),
        Command::CategoriesList => cmd_categories_list(ledger.context()),
    }
}

/// Builds a [`MovementFilter`] from CLI arguments.
fn build_filter(args: &FilterArgs) -> MovementFilter {
    MovementFilter {
        date_from: args.from.clone(),
        date_to: args.to.clone(),
        kind: args.kind,
        category: args.category.clone(),
        amount_min: args.min_amount,
        amount_max: args.max_amount,
        description: args.description.clone(),
    }
}

/// Executes the `add` subcommand.
fn cmd_add<S: MovementStore>(ledger: &mut Ledger<S>, args: AddArgs) -> io::Result<ExitCode> {
    let date = args
        .date
        .unwrap_or_else(|| Local::now().date_naive().format(DATE_FORMAT).to_string());
    let draft = MovementDraft {
        kind: Some(args.kind),
        category: Some(args.category),
        amount: Some(args.amount),
        currency: args.currency,
        rate: args.rate,
        description: args.description,
        date: Some(date),
    };
    match ledger.add(draft) {
        Ok(movement) => print_saved("Added", &movement),
        Err(err) => report("failed to add movement", err),
    }
}

/// Executes the `edit` subcommand.
fn cmd_edit<S: MovementStore>(ledger: &mut Ledger<S>, args: EditArgs) -> io::Result<ExitCode> {
    let patch = MovementPatch {
        kind: args.kind,
        category: args.category,
        amount: args.amount,
        currency: args.currency,
        rate: args.rate,
        description: args.description,
        date: args.date,
    };
    if patch.is_empty() {
        writeln!(
            io::stderr().lock(),
            "{} edit requires at least one field to change",
            "error:".red().bold()
        )?;
        return Ok(ExitCode::FAILURE);
    }
    match ledger.edit(&MovementId::from(args.id), patch) {
        Ok(movement) => print_saved("Updated", &movement),
        Err(err) => report("failed to edit movement", err),
    }
}

/// Executes the `delete` subcommand.
fn cmd_delete<S: MovementStore>(ledger: &Ledger<S>, id: &MovementId) -> io::Result<ExitCode> {
    match ledger.delete(id) {
        Ok(movement) => print_saved("Deleted", &movement),
        Err(err) => report("failed to delete movement", err),
    }
}

/// Executes the `duplicate` subcommand.
fn cmd_duplicate<S: MovementStore>(ledger: &Ledger<S>, id: &MovementId) -> io::Result<ExitCode> {
    match ledger.duplicate(id) {
        Ok(movement) => print_saved("Duplicated as", &movement),
        Err(err) => report("failed to duplicate movement", err),
    }
}

/// Executes the `toggle` subcommand.
fn cmd_toggle<S: MovementStore>(ledger: &Ledger<S>, id: &MovementId) -> io::Result<ExitCode> {
    match ledger.toggle(id) {
        Ok(enabled) => {
            let state = if enabled { "enabled" } else { "disabled" };
            writeln!(io::stdout().lock(), "{} {id} {state}", "Movement".green().bold())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("failed to toggle movement", err),
    }
}

/// Executes the `toggle-all` subcommand over the filtered listing.
fn cmd_toggle_all<S: MovementStore>(ledger: &Ledger<S>, args: &FilterArgs) -> io::Result<ExitCode> {
    let listing = match ledger.filter(&build_filter(args)) {
        Ok(listing) => listing,
        Err(err) => return report("failed to read movements", err),
    };
    let ids: Vec<MovementId> = listing.into_iter().map(|movement| movement.id).collect();
    match ledger.toggle_all(&ids) {
        Ok(enabled) => {
            let state = if enabled { "enabled" } else { "disabled" };
            writeln!(
                io::stdout().lock(),
                "{} {} {state}",
                "Movements".green().bold(),
                ids.len()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("failed to toggle movements", err),
    }
}

/// Executes the `list` subcommand.
fn cmd_list<S: MovementStore>(ledger: &Ledger<S>, args: &FilterArgs) -> io::Result<ExitCode> {
    match ledger.filter(&build_filter(args)) {
        Ok(listing) => {
            print_listing(ledger.context(), &listing)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("failed to read movements", err),
    }
}

/// Executes the `summary` subcommand.
fn cmd_summary<S: MovementStore>(ledger: &Ledger<S>, args: &PeriodArgs) -> io::Result<ExitCode> {
    let year = args.year.unwrap_or_else(current_year);
    let mode = if args.month.is_some() {
        CashFlowMode::Month
    } else {
        CashFlowMode::Year
    };
    match ledger.period_summary(year, mode, args.month) {
        Ok(summary) => {
            print_summary(ledger.context(), &summary, mode)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("failed to compute summary", err),
    }
}

/// Executes the `categories` subcommand.
fn cmd_categories<S: MovementStore>(
    ledger: &Ledger<S>,
    args: &PeriodArgs,
) -> io::Result<ExitCode> {
    let year = args.year.unwrap_or_else(current_year);
    let scope = args
        .month
        .map_or(Scope::Year(year), |month| Scope::Month { year, month });
    let distribution = match ledger.category_distribution(scope) {
        Ok(distribution) => distribution,
        Err(err) => return report("failed to compute distribution", err),
    };

    let mut out = io::stdout().lock();
    if distribution.entries.is_empty() {
        writeln!(out, "{}", "No expenses in this period.".dimmed())?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Total").fg(Color::Cyan),
        Cell::new("Share").fg(Color::Cyan),
    ]);
    for entry in &distribution.entries {
        _ = table.add_row(vec![
            Cell::new(&entry.category),
            Cell::new(format!("{:.2}", entry.total)).fg(Color::Red),
            Cell::new(format!("{:.1}%", entry.share * 100.0_f64)),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Expenses by category".green().bold(),
        format_args!("({}, {} {:.2})", scope.prefix(), ledger.context().base(), distribution.grand_total)
            .dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `savings` subcommand.
fn cmd_savings<S: MovementStore>(ledger: &Ledger<S>, year: i32) -> io::Result<ExitCode> {
    let series = match ledger.savings_series(year) {
        Ok(series) => series,
        Err(err) => return report("failed to compute savings", err),
    };

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Month").fg(Color::Cyan),
        Cell::new("Cumulative").fg(Color::Cyan),
    ]);
    for (name, value) in MONTH_NAMES.iter().zip(series.cumulative) {
        _ = table.add_row(vec![Cell::new(name), Cell::new(format!("{value:.2}"))]);
    }

    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} {}",
        format_args!("Savings {year}").green().bold(),
        format_args!("(carried in: {:.2})", series.prior_total).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `headline` subcommand.
fn cmd_headline<S: MovementStore>(ledger: &Ledger<S>, month: Option<String>) -> io::Result<ExitCode> {
    let month = month.unwrap_or_else(|| Local::now().format("%Y-%m").to_string());
    let headline = match ledger.headline(Some(&month)) {
        Ok(headline) => headline,
        Err(err) => return report("failed to compute balances", err),
    };
    let base = ledger.context().base();
    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Balances".green().bold())?;
    writeln!(out)?;
    writeln!(out, "  {} {} {base}", "Overall:".bold(), signed_amount(headline.balance))?;
    writeln!(
        out,
        "  {} {} {base}",
        format_args!("{month}:").bold(),
        signed_amount(headline.month_balance)
    )?;
    writeln!(out, "  {} {:.2} {base}", "Savings:".bold(), headline.savings)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `rates` subcommand.
fn cmd_rates(ctx: &LedgerContext) -> io::Result<ExitCode> {
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Currency").fg(Color::Cyan),
        Cell::new(format!("Per 1 {}", ctx.base())).fg(Color::Cyan),
    ]);
    for (currency, rate) in ctx.rates().iter() {
        _ = table.add_row(vec![Cell::new(currency), Cell::new(rate)]);
    }
    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Default rates".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `set-rate` subcommand.
fn cmd_set_rate<S: MovementStore>(
    ledger: &mut Ledger<S>,
    currency: Currency,
    rate: f64,
) -> io::Result<ExitCode> {
    match ledger.set_default_rate(currency, rate) {
        Ok(true) => {
            writeln!(
                io::stdout().lock(),
                "{} {currency} = {rate}",
                "Default rate".green().bold()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(false) => report("invalid rate", format_args!("{rate} must be positive and finite")),
        Err(err) => report("failed to save rate", err),
    }
}

/// Executes the `import` subcommand.
fn cmd_import<S: MovementStore>(ledger: &Ledger<S>, file: &Path) -> io::Result<ExitCode> {
    let contents = match fs::read_to_string(file) {
        Ok(contents) => contents,
        Err(err) => return report(&format!("failed to read {}", file.display()), err),
    };
    let incoming: Vec<Movement> = match serde_json::from_str(&contents) {
        Ok(incoming) => incoming,
        Err(err) => return report("failed to parse export", err),
    };
    match ledger.import(incoming) {
        Ok(count) => {
            writeln!(io::stdout().lock(), "{} {count} movements", "Imported".green().bold())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("failed to import", err),
    }
}

/// Executes the `check` subcommand.
fn cmd_check<S: MovementStore>(ledger: &Ledger<S>) -> io::Result<ExitCode> {
    let issues = match ledger.data_quality() {
        Ok(issues) => issues,
        Err(err) => return report("failed to read movements", err),
    };
    let mut out = io::stdout().lock();
    if issues.is_empty() {
        writeln!(out, "{}", "No data-quality issues found.".green())?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Movement").fg(Color::Cyan),
        Cell::new("Issue").fg(Color::Cyan),
    ]);
    for issue in &issues {
        _ = table.add_row(vec![
            Cell::new(&issue.id),
            Cell::new(issue.kind).fg(Color::Yellow),
        ]);
    }
    writeln!(
        out,
        "{} {}",
        "Data-quality issues".yellow().bold(),
        format_args!("({})", issues.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `categories-list` subcommand.
fn cmd_categories_list(ctx: &LedgerContext) -> io::Result<ExitCode> {
    let registry = ctx.registry();
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Categories").fg(Color::Cyan),
    ]);
    for kind in MovementType::ALL {
        _ = table.add_row(vec![
            Cell::new(kind),
            Cell::new(registry.categories(kind).join(", ")),
        ]);
    }
    writeln!(io::stdout().lock(), "{table}")?;
    Ok(ExitCode::SUCCESS)
}

// ── Output formatting ────────────────────────────────────────────────

/// Formats a balance with an explicit sign, coloured by sign.
fn signed_amount(value: f64) -> String {
    let text = format!("{value:+.2}");
    if value < 0.0_f64 {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

/// Prints the outcome of a single-movement mutation.
fn print_saved(verb: &str, movement: &Movement) -> io::Result<ExitCode> {
    writeln!(
        io::stdout().lock(),
        "{} {} {}",
        verb.green().bold(),
        movement.id,
        format_args!(
            "({} {} {:.2} {} on {})",
            movement.kind, movement.category, movement.amount, movement.currency, movement.date
        )
        .dimmed()
    )?;
    Ok(ExitCode::SUCCESS)
}

/// Prints a listing with its running balance and totals.
fn print_listing(ctx: &LedgerContext, listing: &[Movement]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if listing.is_empty() {
        writeln!(out, "{}", "No movements found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Date").fg(Color::Cyan),
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
        Cell::new(ctx.base()).fg(Color::Cyan),
        Cell::new("Balance").fg(Color::Cyan),
        Cell::new("Description").fg(Color::Cyan),
        Cell::new("Id").fg(Color::Cyan),
    ]);

    for row in running_balances(ctx, listing) {
        let movement = row.movement;
        let normalized = ctx.normalize(movement);
        let amount_color = match (movement.enabled, movement.kind.is_income()) {
            (false, _) => Color::DarkGrey,
            (true, true) => Color::Green,
            (true, false) => Color::Red,
        };
        let text_color = if movement.enabled {
            Color::Reset
        } else {
            Color::DarkGrey
        };
        _ = table.add_row(vec![
            Cell::new(&movement.date).fg(text_color),
            Cell::new(movement.kind).fg(text_color),
            Cell::new(&movement.category).fg(text_color),
            Cell::new(format!("{:.2} {}", movement.amount, movement.currency)).fg(text_color),
            Cell::new(format!("{normalized:.2}")).fg(amount_color),
            Cell::new(format!("{:.2}", row.balance)),
            Cell::new(&movement.description).fg(text_color),
            Cell::new(&movement.id).fg(Color::DarkGrey),
        ]);
    }

    let totals = filter_totals(ctx, listing);
    writeln!(
        out,
        "{} {}",
        "Movements".green().bold(),
        format_args!("({})", listing.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    writeln!(
        out,
        "  {} {:.2}  {} {:.2}  {} {}",
        "Income:".bold(),
        totals.income,
        "Expense:".bold(),
        totals.expense,
        "Net:".bold(),
        signed_amount(totals.net())
    )?;
    Ok(())
}

/// Prints a period summary with its footer row.
fn print_summary(ctx: &LedgerContext, summary: &PeriodSummary, mode: CashFlowMode) -> io::Result<()> {
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Month").fg(Color::Cyan),
        Cell::new("Income").fg(Color::Cyan),
        Cell::new("Expense").fg(Color::Cyan),
        Cell::new("Net").fg(Color::Cyan),
        Cell::new("Cumulative").fg(Color::Cyan),
    ]);
    for (name, row) in MONTH_NAMES.iter().zip(&summary.rows) {
        _ = table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{:.2}", row.income)).fg(Color::Green),
            Cell::new(format!("{:.2}", row.expense)).fg(Color::Red),
            Cell::new(format!("{:.2}", row.net)),
            Cell::new(format!("{:.2}", row.cumulative)),
        ]);
    }
    let totals = summary.totals();
    _ = table.add_row(vec![
        Cell::new("Total").fg(Color::Cyan),
        Cell::new(format!("{:.2}", totals.income)).fg(Color::Green),
        Cell::new(format!("{:.2}", totals.expense)).fg(Color::Red),
        Cell::new(format!("{:.2}", totals.net)),
        Cell::new(format!("{:.2}", totals.closing)),
    ]);

    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} {}",
        format_args!("Cash flow {} ({mode} view)", summary.year).green().bold(),
        format_args!("(opening balance: {:.2} {})", summary.opening_balance, ctx.base()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // Last-resort error output; if stderr itself failed there is
            // nothing left to do.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cashbook::storage::InMemoryStorage;

    fn mock_ledger() -> Ledger<InMemoryStorage> {
        Ledger::builder()
            .storage(InMemoryStorage::new())
            .build()
            .unwrap()
    }

    fn add_args(kind: MovementType, category: &str, amount: f64, date: &str) -> AddArgs {
        AddArgs {
            kind,
            category: category.to_owned(),
            amount,
            currency: None,
            rate: None,
            description: None,
            date: Some(date.to_owned()),
        }
    }

    // ── parser tests ──────────────────────────────────────────────────

    #[test]
    fn parse_date_valid() {
        assert_eq!(parse_date("2024-01-15").unwrap(), "2024-01-15");
    }

    #[test]
    fn parse_date_invalid() {
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("2024-1-5").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn parse_month_valid_and_invalid() {
        assert_eq!(parse_month("2024-03").unwrap(), "2024-03");
        assert!(parse_month("2024-3").is_err());
        assert!(parse_month("2024-13").is_err());
    }

    #[test]
    fn parse_kind_and_currency() {
        assert_eq!(parse_kind("ingreso").unwrap(), MovementType::Income);
        assert_eq!(parse_currency("usd").unwrap(), Currency::Usd);
        assert!(parse_kind("other").is_err());
        assert!(parse_currency("GBP").is_err());
    }

    // ── configuration tests ───────────────────────────────────────────

    #[test]
    fn resolve_data_dir_prefers_flag() {
        let dir = PathBuf::from("/tmp/cashbook-test");
        assert_eq!(resolve_data_dir(Some(dir.clone())).unwrap(), dir);
    }

    #[test]
    fn create_ledger_with_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = create_ledger(Some(dir.path().to_path_buf()));
        assert!(ledger.is_ok());
        assert!(dir.path().join("default_rates.json").exists());
    }

    #[test]
    fn build_filter_copies_every_field() {
        let args = FilterArgs {
            from: Some("2024-01-01".to_owned()),
            to: Some("2024-01-31".to_owned()),
            kind: Some(MovementType::Variable),
            category: Some("Ocio".to_owned()),
            min_amount: Some(1.0),
            max_amount: Some(100.0),
            description: Some("cine".to_owned()),
        };
        let filter = build_filter(&args);
        assert_eq!(filter.date_from.as_deref(), Some("2024-01-01"));
        assert_eq!(filter.date_to.as_deref(), Some("2024-01-31"));
        assert_eq!(filter.kind, Some(MovementType::Variable));
        assert_eq!(filter.category.as_deref(), Some("Ocio"));
        assert_eq!(filter.amount_min, Some(1.0));
        assert_eq!(filter.amount_max, Some(100.0));
        assert_eq!(filter.description.as_deref(), Some("cine"));
    }

    #[test]
    fn build_filter_no_args_matches_everything() {
        assert_eq!(build_filter(&FilterArgs::default()), MovementFilter::new());
    }

    // ── command tests ─────────────────────────────────────────────────

    #[test]
    fn add_then_list_succeeds() {
        let mut ledger = mock_ledger();
        let code = cmd_add(
            &mut ledger,
            add_args(MovementType::Income, "Salario", 1000.0, "2024-01-01"),
        )
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(ledger.movements().unwrap().len(), 1);
        assert_eq!(
            cmd_list(&ledger, &FilterArgs::default()).unwrap(),
            ExitCode::SUCCESS
        );
    }

    #[test]
    fn add_invalid_category_fails() {
        let mut ledger = mock_ledger();
        let code = cmd_add(
            &mut ledger,
            add_args(MovementType::Income, "Vivienda", 1.0, "2024-01-01"),
        )
        .unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        assert!(ledger.movements().unwrap().is_empty());
    }

    #[test]
    fn edit_requires_a_change() {
        let mut ledger = mock_ledger();
        let args = EditArgs {
            id: "any".to_owned(),
            kind: None,
            category: None,
            amount: None,
            currency: None,
            rate: None,
            description: None,
            date: None,
        };
        assert_eq!(cmd_edit(&mut ledger, args).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn unknown_id_fails() {
        let ledger = mock_ledger();
        let missing = MovementId::from("missing");
        assert_eq!(cmd_delete(&ledger, &missing).unwrap(), ExitCode::FAILURE);
        assert_eq!(cmd_duplicate(&ledger, &missing).unwrap(), ExitCode::FAILURE);
        assert_eq!(cmd_toggle(&ledger, &missing).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn toggle_all_uses_the_filter() {
        let mut ledger = mock_ledger();
        let _income = cmd_add(
            &mut ledger,
            add_args(MovementType::Income, "Salario", 1000.0, "2024-01-01"),
        )
        .unwrap();
        let _leisure = cmd_add(
            &mut ledger,
            add_args(MovementType::Variable, "Ocio", 20.0, "2024-01-02"),
        )
        .unwrap();
        let args = FilterArgs {
            kind: Some(MovementType::Variable),
            ..FilterArgs::default()
        };
        assert_eq!(cmd_toggle_all(&ledger, &args).unwrap(), ExitCode::SUCCESS);

        let all = ledger.movements().unwrap();
        let disabled: Vec<&str> = all
            .iter()
            .filter(|movement| !movement.enabled)
            .map(|movement| movement.category.as_str())
            .collect();
        assert_eq!(disabled, ["Ocio"]);
    }

    #[test]
    fn views_succeed_on_empty_ledger() {
        let mut ledger = mock_ledger();
        let period = PeriodArgs {
            year: Some(2024),
            month: None,
        };
        let month = PeriodArgs {
            year: Some(2024),
            month: Some(2),
        };
        assert_eq!(cmd_summary(&ledger, &period).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_summary(&ledger, &month).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_categories(&ledger, &period).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_savings(&ledger, 2024).unwrap(), ExitCode::SUCCESS);
        assert_eq!(
            cmd_headline(&ledger, Some("2024-02".to_owned())).unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(cmd_rates(ledger.context()).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_check(&ledger).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_categories_list(ledger.context()).unwrap(), ExitCode::SUCCESS);
        assert_eq!(
            cmd_set_rate(&mut ledger, Currency::Usd, -1.0).unwrap(),
            ExitCode::FAILURE
        );
    }

    #[test]
    fn import_reads_legacy_export() {
        let ledger = mock_ledger();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        fs::write(
            &path,
            r#"[{"id":"1","type":"ingreso","category":"Salario","amount":900,
                "currency":"EUR","trm":1,"desc":"nomina","date":"2024-01-31"}]"#,
        )
        .unwrap();
        assert_eq!(cmd_import(&ledger, &path).unwrap(), ExitCode::SUCCESS);
        assert_eq!(ledger.movements().unwrap().len(), 1);
    }

    #[test]
    fn import_missing_file_fails() {
        let ledger = mock_ledger();
        let path = PathBuf::from("/nonexistent/cashbook/export.json");
        assert_eq!(cmd_import(&ledger, &path).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn import_malformed_export_fails_without_writing() {
        let ledger = mock_ledger();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        fs::write(
            &path,
            r#"[{"id":"1","type":"ingreso","category":"Salario","amount":100,
                "currency":"EUR","date":"2024-03-05"},
               {"id":"2","type":"variable","category":"","amount":-50,
                "currency":"EUR","date":"2024-3-5"}]"#,
        )
        .unwrap();
        assert_eq!(cmd_import(&ledger, &path).unwrap(), ExitCode::FAILURE);
        assert!(ledger.movements().unwrap().is_empty());
    }
}
