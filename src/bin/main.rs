//! Drilldown CLI - Inspect facets of a configured store
//!
//! Usage:
//!   drilldown values <table> <facet> [--filter <field=value>]... [--search <term>]
//!   drilldown periods <table> <facet> [--filter <field=value>]...
//!   drilldown granularity <table> <facet>
//!   drilldown sql <table> <facet> [--dialect <dialect>] [--periods <granularity>]
//!
//! Examples:
//!   drilldown values Events Tags --filter Status=open --json
//!   drilldown periods Events when --search rock
//!   drilldown sql Events Tags --filter Tags=_none --dialect tsql

use clap::{Args, Parser, Subcommand, ValueEnum};
use drilldown::config::Settings;
use drilldown::display::format_integer;
use drilldown::executor::SqliteExecutor;
use drilldown::facet::{AppliedFilter, FacetContext, FacetCounts, Filter, FilterValue, TimeGranularity};
use drilldown::search::LikeSearch;
use drilldown::sql::Dialect;
use drilldown::DrilldownResult;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "drilldown")]
#[command(about = "Drilldown - Faceted drill-down counts over a tabular store")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $DRILLDOWN_CONFIG, ./drilldown.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count the possible values of a facet
    Values {
        #[command(flatten)]
        facet: FacetArgs,

        /// List every value of an applied facet, ignoring other selections
        #[arg(long)]
        applied: bool,
    },

    /// Count the time periods of a date facet
    Periods {
        #[command(flatten)]
        facet: FacetArgs,
    },

    /// Show the time granularity a date facet would use
    Granularity {
        #[command(flatten)]
        facet: FacetArgs,
    },

    /// Print the SQL a facet query would run, without running it
    Sql {
        #[command(flatten)]
        facet: FacetArgs,

        /// SQL dialect to generate (defaults to the configured one)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Print the time-period query at this granularity instead
        #[arg(long)]
        periods: Option<GranularityArg>,
    },
}

#[derive(Args)]
struct FacetArgs {
    /// Logical table name
    table: String,

    /// Facet (field) name
    facet: String,

    /// Applied selection as FIELD=VALUE; `_none` and `_other` are markers.
    /// Repeating a field ORs its values.
    #[arg(short, long = "filter", value_parser = parse_selection)]
    filters: Vec<(String, String)>,

    /// Full-text search term
    #[arg(short, long)]
    search: Option<String>,

    /// Print counts as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Sqlite,
    Duckdb,
    Postgres,
    Mysql,
    Tsql,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Tsql => Dialect::TSql,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum GranularityArg {
    Day,
    Month,
    Year,
    Decade,
}

impl From<GranularityArg> for TimeGranularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Day => TimeGranularity::Day,
            GranularityArg::Month => TimeGranularity::Month,
            GranularityArg::Year => TimeGranularity::Year,
            GranularityArg::Decade => TimeGranularity::Decade,
        }
    }
}

fn parse_selection(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
        _ => Err(format!("expected FIELD=VALUE, got '{s}'")),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Values { facet, applied } => cmd_values(&settings, &facet, applied),
        Commands::Periods { facet } => cmd_periods(&settings, &facet),
        Commands::Granularity { facet } => cmd_granularity(&settings, &facet),
        Commands::Sql {
            facet,
            dialect,
            periods,
        } => cmd_sql(&settings, &facet, dialect, periods),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// The facet being counted plus the selections applied on its table.
struct Request {
    filter: Arc<Filter>,
    applied: Vec<AppliedFilter>,
    search: LikeSearch,
}

impl Request {
    fn build(settings: &Settings, args: &FacetArgs) -> DrilldownResult<Self> {
        let filter = settings.filter(&args.table, &args.facet)?;

        // One AppliedFilter per field, values in the order given
        let mut applied: Vec<AppliedFilter> = Vec::new();
        for (field, value) in &args.filters {
            let value = FilterValue::parse(value);
            match applied.iter_mut().find(|af| af.filter.name == *field) {
                Some(existing) => existing.values.push(value),
                None => {
                    let target = settings.filter(&args.table, field)?;
                    applied.push(AppliedFilter::new(target).value(value));
                }
            }
        }

        Ok(Self {
            filter,
            applied,
            search: settings.search_provider(),
        })
    }

    fn context<'a>(&'a self, args: &'a FacetArgs) -> FacetContext<'a> {
        let ctx = FacetContext::new(&self.applied).with_search_provider(&self.search);
        match &args.search {
            Some(term) => ctx.with_search_term(term),
            None => ctx,
        }
    }
}

fn open_executor(settings: &Settings) -> DrilldownResult<SqliteExecutor> {
    let executor = match settings.engine.resolved_database()? {
        Some(path) => {
            debug!(path = %path.display(), "opening database");
            SqliteExecutor::open(path)?
        }
        None => SqliteExecutor::open_in_memory()?,
    };
    Ok(executor)
}

fn print_counts(settings: &Settings, counts: &FacetCounts, json: bool) -> DrilldownResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(counts)?);
        return Ok(());
    }

    for (key, count) in counts.iter() {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        println!("{}\t{}", key, format_integer(count, &settings.display));
    }
    Ok(())
}

fn cmd_values(settings: &Settings, args: &FacetArgs, applied: bool) -> DrilldownResult<()> {
    let request = Request::build(settings, args)?;
    let executor = open_executor(settings)?;
    let ctx = request.context(args);

    let counts = if applied {
        request.filter.applied_values(&executor, &ctx)?
    } else {
        request.filter.possible_values(&executor, &ctx)?
    };
    print_counts(settings, &counts, args.json)
}

fn cmd_periods(settings: &Settings, args: &FacetArgs) -> DrilldownResult<()> {
    let request = Request::build(settings, args)?;
    let executor = open_executor(settings)?;
    let counts = request
        .filter
        .possible_time_periods(&executor, &request.context(args))?;
    print_counts(settings, &counts, args.json)
}

fn cmd_granularity(settings: &Settings, args: &FacetArgs) -> DrilldownResult<()> {
    let request = Request::build(settings, args)?;
    let executor = open_executor(settings)?;
    match request
        .filter
        .time_granularity(&executor, &request.context(args))?
    {
        Some(granularity) => println!("{}", granularity),
        None => println!("(no dates)"),
    }
    Ok(())
}

fn cmd_sql(
    settings: &Settings,
    args: &FacetArgs,
    dialect: Option<DialectArg>,
    periods: Option<GranularityArg>,
) -> DrilldownResult<()> {
    let request = Request::build(settings, args)?;
    let ctx = request.context(args);
    let dialect = dialect.map(Dialect::from).unwrap_or(settings.engine.dialect);

    let query = match periods {
        Some(granularity) => request.filter.time_periods_query(&ctx, granularity.into()),
        None => request.filter.values_query(&ctx),
    };
    println!("{}", query.to_sql(dialect));
    Ok(())
}
