//! Gridview CLI - Answer grid requests against configured views
//!
//! Usage:
//!   gridview query <view> [-p name=value]... [--config <file>]
//!   gridview sql <view> [-p name=value]... [--dialect <dialect>]
//!   gridview views
//!
//! Examples:
//!   gridview query users -p iDisplayStart=0 -p iDisplayLength=10 -p sSearch=ann
//!   gridview sql users -p iSortCol_0=1 -p sSortDir_0=desc --dialect postgres
//!   gridview views --config ./gridview.toml

use clap::{Parser, Subcommand};
use gridview::config::Settings;
use gridview::engine::PreparedQuery;
use gridview::executor::SqliteExecutor;
use gridview::sql::Dialect;
use gridview::{GridRequest, GridView};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "gridview")]
#[command(about = "Gridview - server-side paging, sorting and search for data grids")]
#[command(version)]
struct Cli {
    /// Config file (defaults to GRIDVIEW_CONFIG, ./gridview.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a grid request against a view and print the JSON response
    Query {
        /// Name of the view
        view: String,

        /// Request parameter, e.g. `-p iDisplayLength=10`
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Pretty-print the response
        #[arg(long)]
        pretty: bool,
    },

    /// Print the SQL a grid request compiles to
    Sql {
        /// Name of the view
        view: String,

        /// Request parameter, e.g. `-p sSearch=ann`
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// SQL dialect to generate (defaults to the configured one)
        #[arg(short, long)]
        dialect: Option<Dialect>,
    },

    /// List configured views
    Views,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{}'", s))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
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

    match cli.command {
        Commands::Query {
            view,
            params,
            pretty,
        } => cmd_query(&settings, &view, params, pretty),
        Commands::Sql {
            view,
            params,
            dialect,
        } => cmd_sql(&settings, &view, params, dialect),
        Commands::Views => cmd_views(&settings),
    }
}

fn cmd_query(
    settings: &Settings,
    view: &str,
    params: Vec<(String, String)>,
    pretty: bool,
) -> ExitCode {
    let descriptor = match settings.descriptor(view) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if settings.database.dialect != Dialect::Sqlite {
        eprintln!(
            "Error: only sqlite databases can be queried (configured: {})",
            settings.database.dialect
        );
        return ExitCode::FAILURE;
    }

    let executor = match settings
        .database
        .resolved_path()
        .map_err(|e| e.to_string())
        .and_then(|path| SqliteExecutor::open(path).map_err(|e| e.to_string()))
    {
        Ok(executor) => executor,
        Err(e) => {
            eprintln!("Error opening database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let request = match GridRequest::from_params(params) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Invalid request: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let response = match GridView::new(descriptor).respond(&executor, &request) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Query error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let json = if pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    };
    match json {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error encoding response: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_sql(
    settings: &Settings,
    view: &str,
    params: Vec<(String, String)>,
    dialect: Option<Dialect>,
) -> ExitCode {
    let dialect = dialect.unwrap_or(settings.database.dialect);

    let result = settings
        .descriptor(view)
        .map_err(|e| e.to_string())
        .and_then(|descriptor| {
            let request = GridRequest::from_params(params).map_err(|e| e.to_string())?;
            let grid = GridView::new(descriptor);
            let data = grid.data_query(&request).map_err(|e| e.to_string())?;
            Ok([
                ("total", grid.count_query(&request, false)),
                ("filtered", grid.count_query(&request, true)),
                ("data", data),
            ])
        });

    let queries = match result {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for (name, prepared) in &queries {
        if let Err(e) = print_query(name, prepared, dialect) {
            eprintln!("Error compiling {} query: {}", name, e);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn print_query(name: &str, prepared: &PreparedQuery, dialect: Dialect) -> gridview::GridResult<()> {
    let compiled = prepared.compile(dialect)?;
    println!("-- {} ({})", name, dialect);
    for (i, value) in compiled.params.iter().enumerate() {
        println!("-- param {}: {}", i + 1, value);
    }
    println!("{};", compiled.sql);
    println!();
    Ok(())
}

fn cmd_views(settings: &Settings) -> ExitCode {
    if settings.views.is_empty() {
        println!("No views defined.");
        return ExitCode::SUCCESS;
    }

    println!("Views:");
    for (name, view) in &settings.views {
        let labels: Vec<_> = view
            .fields
            .iter()
            .map(|(label, _)| label.as_str())
            .filter(|label| *label != gridview::descriptor::IDENTIFIER_LABEL)
            .collect();
        println!(
            "  - {} (from: {} {}; columns: {})",
            name,
            view.entity,
            view.alias,
            labels.join(", ")
        );
    }
    ExitCode::SUCCESS
}
