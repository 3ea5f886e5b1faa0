use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use carbonwise::cli::{self, OutputFormat, RecommendArgs, Session};
use carbonwise::{config, web};

#[derive(Debug, Parser)]
#[command(name = "carbonwise")]
#[command(about = "Vehicle lifecycle emissions explorer for the CarbonWise API")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check backend reachability, config files and the request log
    Health,
    /// List vehicles, narrowed by brand and model
    Vehicles {
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        model: Option<String>,
        /// EV, HEV, PHEV or ICE
        #[arg(long)]
        powertrain: Option<String>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Lifecycle emissions for one vehicle ("Brand|Model|Year")
    Lifecycle {
        vehicle: String,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        grid_year: Option<i32>,
        /// Also fetch the per-km and lifetime summary
        #[arg(long)]
        summary: bool,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Compare up to three vehicles side by side
    Compare {
        /// Vehicles as "Brand|Model|Year"
        #[arg(required = true)]
        vehicles: Vec<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        grid_year: Option<i32>,
        /// g_km (default), lifetime_kg or ten_year_kg
        #[arg(long, default_value = "g_km")]
        unit: String,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Distance at which an EV overtakes a combustion vehicle
    BreakEven {
        /// Electric vehicle as "Brand|Model|Year"
        #[arg(long)]
        ev: String,
        /// Combustion vehicle as "Brand|Model|Year"
        #[arg(long)]
        ice: String,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        grid_year: Option<i32>,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Personalized vehicle recommendations
    Recommend {
        #[arg(long, default_value = "40")]
        daily_km: f64,
        #[arg(long, default_value = "8")]
        years: u32,
        #[arg(long)]
        body_type: Option<String>,
        #[arg(long)]
        powertrain: Option<String>,
        #[arg(long)]
        price_min: Option<u32>,
        #[arg(long)]
        price_max: Option<u32>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        grid_year: Option<i32>,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Greenwashing risk analysis for one vehicle
    Greenwashing {
        vehicle: String,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        grid_year: Option<i32>,
        /// Let the backend search the web for marketing claims
        #[arg(long)]
        search_web: bool,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Grid carbon intensity for a country
    Grid {
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        /// Append a five-year linear projection
        #[arg(long)]
        forecast: bool,
        /// List available countries instead
        #[arg(long)]
        list: bool,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Vehicle detail: lifecycle, score and grid sensitivity
    Detail {
        vehicle: String,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        grid_year: Option<i32>,
        /// Also compute the annual impact at this distance
        #[arg(long)]
        annual_km: Option<f64>,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show the backend's methodology description
    Methodology {
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Launch the local web dashboard
    Web {
        /// Listen address (default from config, 127.0.0.1:9750)
        #[arg(long)]
        addr: Option<String>,
        /// Don't open the browser automatically
        #[arg(long)]
        no_browser: bool,
    },
    /// Summarize the request log
    Log {
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value by dotted key, e.g. defaults.country DE
    Set { key: String, value: String },
    /// Restore the default config file
    Reset,
}

fn main() {
    if let Err(e) = run(App::parse()) {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run(app: App) -> Result<()> {
    let fmt = |s: &str| OutputFormat::from_str_opt(Some(s));

    match app.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
        Commands::Log { days, format } => cli::run_log(fmt(&format), days),
        Commands::Web { addr, no_browser } => {
            let config = config::load();
            let addr = addr.unwrap_or_else(|| config.web.addr.clone());
            let open = config.web.open_browser && !no_browser;
            web::serve(&addr, open, config)
        }
        command => {
            let ctx = Session::load();
            run_session(&ctx, command, fmt)
        }
    }
}

fn run_session(ctx: &Session, command: Commands, fmt: impl Fn(&str) -> OutputFormat) -> Result<()> {
    match command {
        Commands::Health => cli::run_health(ctx),
        Commands::Vehicles {
            brand,
            model,
            powertrain,
            format,
        } => cli::run_vehicles(ctx, brand, model, powertrain, fmt(&format)),
        Commands::Lifecycle {
            vehicle,
            country,
            grid_year,
            summary,
            format,
        } => cli::run_lifecycle(
            ctx,
            &vehicle,
            country.as_deref(),
            grid_year,
            summary,
            fmt(&format),
        ),
        Commands::Compare {
            vehicles,
            country,
            grid_year,
            unit,
            format,
        } => cli::run_compare(
            ctx,
            &vehicles,
            country.as_deref(),
            grid_year,
            &unit,
            fmt(&format),
        ),
        Commands::BreakEven {
            ev,
            ice,
            country,
            grid_year,
            format,
        } => cli::run_break_even(ctx, &ev, &ice, country.as_deref(), grid_year, fmt(&format)),
        Commands::Recommend {
            daily_km,
            years,
            body_type,
            powertrain,
            price_min,
            price_max,
            country,
            grid_year,
            format,
        } => {
            let args = RecommendArgs {
                daily_km,
                years,
                body_type,
                powertrain,
                price_min,
                price_max,
                country,
                grid_year,
            };
            cli::run_recommend(ctx, args, fmt(&format))
        }
        Commands::Greenwashing {
            vehicle,
            country,
            grid_year,
            search_web,
            format,
        } => cli::run_greenwashing(
            ctx,
            &vehicle,
            country.as_deref(),
            grid_year,
            search_web,
            fmt(&format),
        ),
        Commands::Grid {
            country,
            year,
            forecast,
            list,
            format,
        } => cli::run_grid(ctx, country.as_deref(), year, forecast, list, fmt(&format)),
        Commands::Detail {
            vehicle,
            country,
            grid_year,
            annual_km,
            format,
        } => cli::run_detail(
            ctx,
            &vehicle,
            country.as_deref(),
            grid_year,
            annual_km,
            fmt(&format),
        ),
        Commands::Methodology { format } => cli::run_methodology(ctx, fmt(&format)),
        Commands::Config { .. } | Commands::Log { .. } | Commands::Web { .. } => {
            unreachable!("handled before the session is built")
        }
    }
}
