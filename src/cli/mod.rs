//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `carbonwise health`: backend reachability, config files, request log
//! - `carbonwise vehicles`: vehicle list and brand/model/year cascade
//! - `carbonwise lifecycle | compare | break-even | recommend`: emissions views
//! - `carbonwise greenwashing | detail | grid | methodology`: analysis pages
//! - `carbonwise log --days N`: request log summary
//! - `carbonwise config show|init|set|reset`: configuration management

use anyhow::{Context, Result, bail};
use colored::Colorize;
use serde::Serialize;

use crate::api::{CarbonClient, Powertrain, RecommendFilters, RecommendRequest};
use crate::config::{self, CarbonConfig};
use crate::dashboard::break_even::{BreakEvenPage, BreakEvenView};
use crate::dashboard::cascade::{CascadeSelection, VehicleFilter};
use crate::dashboard::compare::{ComparePage, CompareView, Skipped, Unit};
use crate::dashboard::grid::GridView;
use crate::dashboard::recommend::{self, RecommendationCard, ScoreClass};
use crate::dashboard::vehicle_detail::{self, DetailView, ScoreBand};
use crate::dashboard::{greenwashing, input};
use crate::diagnostics::logger;
use crate::diagnostics::reporter::{self, RequestReport};
use crate::format::{csv_field, format_emission, format_large_number, format_percentage};

/// Output format for commands that print data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Resolved config plus a client built from it, shared by every command.
pub struct Session {
    pub config: CarbonConfig,
    pub client: CarbonClient,
}

impl Session {
    pub fn load() -> Self {
        let config = config::load();
        let client = CarbonClient::from_config(&config);
        Self { config, client }
    }

    pub fn country(&self, arg: Option<&str>) -> Result<String> {
        let raw = arg.unwrap_or(&self.config.defaults.country);
        Ok(input::country(raw)?)
    }

    pub fn grid_year(&self, arg: Option<i32>) -> i32 {
        arg.unwrap_or(self.config.defaults.grid_year)
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn header(title: &str, width: usize) {
    println!("{}", title.bold().cyan());
    println!("{}", "=".repeat(width));
}

// ---------------------------------------------------------------------------
// carbonwise health
// ---------------------------------------------------------------------------

/// Check backend reachability, config files and the request log.
pub fn run_health(ctx: &Session) -> Result<()> {
    header("CarbonWise Health Check", 40);

    let backend = ctx.client.health_check();
    let detail = match &backend {
        Ok(status) => format!("{} ({})", ctx.client.base_url(), status.summary()),
        Err(e) => format!("{} unreachable: {e}", ctx.client.base_url()),
    };
    print_health_item("Backend", backend.is_ok(), &detail);

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.carbonwise/config.toml found"
        } else {
            "not found (run `carbonwise config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".carbonwise.toml found"
        } else {
            "none (optional)"
        },
    );
    print_health_item(
        "Defaults",
        true,
        &format!(
            "{} / grid year {}",
            ctx.config.defaults.country, ctx.config.defaults.grid_year
        ),
    );

    let log_path = logger::request_log_path();
    let log_exists = log_path.as_ref().is_some_and(|p| p.exists());
    let log_detail = match (&log_path, ctx.config.logging.enabled) {
        (_, false) => "disabled (logging.enabled = false)".to_string(),
        (Some(p), true) if log_exists => {
            format!("{} entries", logger::read_entries(p).len())
        }
        _ => "no log file yet".to_string(),
    };
    print_health_item("Request log", log_exists || !ctx.config.logging.enabled, &log_detail);

    if backend.is_err() {
        println!();
        println!(
            "  {} Set CARBONWISE_API_URL or `carbonwise config set api.base_url <url>`",
            "Hint:".dimmed()
        );
    }
    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// carbonwise vehicles
// ---------------------------------------------------------------------------

/// List vehicles, narrowed by the brand → model cascade.
pub fn run_vehicles(
    ctx: &Session,
    brand: Option<String>,
    model: Option<String>,
    powertrain: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let vehicles = ctx.client.vehicles().context("failed to load vehicles")?;
    let filter = VehicleFilter {
        powertrain: powertrain.as_deref().map(Powertrain::parse),
        require_consumption: false,
    };
    let mut cascade = CascadeSelection::default();
    cascade.set_brand(brand);
    cascade.set_model(model);
    let options = cascade.options(&vehicles, &filter);

    let rows: Vec<_> = vehicles
        .iter()
        .filter(|v| filter.accepts(v))
        .filter(|v| cascade.brand.as_ref().is_none_or(|b| &v.brand == b))
        .filter(|v| cascade.model.as_ref().is_none_or(|m| &v.model == m))
        .collect();

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Csv => {
            println!("brand,model,year,type,co2_wltp_gpkm,electric_wh_per_km");
            for v in &rows {
                println!(
                    "{},{},{},{},{},{}",
                    csv_field(&v.brand),
                    csv_field(&v.model),
                    v.year,
                    v.powertrain,
                    v.co2_wltp_gpkm.map(|x| x.to_string()).unwrap_or_default(),
                    v.electric_wh_per_km.map(|x| x.to_string()).unwrap_or_default(),
                );
            }
        }
        OutputFormat::Table => {
            header(&format!("Vehicles ({})", rows.len()), 60);
            match (&cascade.brand, &cascade.model) {
                (None, _) => println!("  {} {}", "Brands:".bold(), options.brands.join(", ")),
                (Some(_), None) => println!("  {} {}", "Models:".bold(), options.models.join(", ")),
                (Some(_), Some(_)) => println!(
                    "  {} {}",
                    "Years: ".bold(),
                    options
                        .years
                        .iter()
                        .map(i32::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }
            println!();
            println!(
                "  {:<16} {:<24} {:>6} {:<6} {:>10}",
                "Brand", "Model", "Year", "Type", "WLTP g/km"
            );
            println!("  {}", "-".repeat(66));
            for (i, v) in rows.iter().take(200).enumerate() {
                let line = format!(
                    "  {:<16} {:<24} {:>6} {:<6} {:>10}",
                    truncate(&v.brand, 16),
                    truncate(&v.model, 24),
                    v.year,
                    v.powertrain.as_str(),
                    format_emission(v.co2_wltp_gpkm),
                );
                if i % 2 == 0 {
                    println!("{line}");
                } else {
                    println!("{}", line.dimmed());
                }
            }
            if rows.len() > 200 {
                println!("  {}", format!("… {} more", rows.len() - 200).dimmed());
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// carbonwise lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle emissions for one vehicle.
pub fn run_lifecycle(
    ctx: &Session,
    vehicle: &str,
    country: Option<&str>,
    grid_year: Option<i32>,
    summary: bool,
    format: OutputFormat,
) -> Result<()> {
    let key = input::vehicle_key(vehicle)?;
    let country = ctx.country(country)?;
    let grid_year = ctx.grid_year(grid_year);
    let lc = ctx.client.lifecycle(&key, &country, grid_year)?;
    let single = if summary {
        Some(ctx.client.compare(&key, &country)?)
    } else {
        None
    };

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "vehicle": key,
            "country": country,
            "grid_year": grid_year,
            "lifecycle": lc,
            "summary": single,
        }));
    }

    header(&format!("Lifecycle: {key}"), 50);
    println!("  {} {} / {}", "Grid:         ".bold(), country, grid_year);
    println!("  {} {} g/km", "Total:        ".bold(), format_emission(lc.total_g_per_km).green());
    println!("  {} {} g/km", "Manufacturing:".bold(), format_emission(lc.manufacturing_g_per_km));
    println!("  {} {} g/km", "Operational:  ".bold(), format_emission(lc.operational_g_per_km));
    if let Some(s) = single {
        println!(
            "  {} {} kg over the vehicle lifetime",
            "Lifetime:     ".bold(),
            format_large_number(s.lifetime_kg)
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// carbonwise compare
// ---------------------------------------------------------------------------

/// Compare up to three vehicles side by side.
pub fn run_compare(
    ctx: &Session,
    vehicles: &[String],
    country: Option<&str>,
    grid_year: Option<i32>,
    unit: &str,
    format: OutputFormat,
) -> Result<()> {
    let keys = vehicles
        .iter()
        .map(|v| input::vehicle_key(v))
        .collect::<Result<Vec<_>, _>>()?;
    if keys.is_empty() {
        bail!("give at least one vehicle as 'Brand|Model|Year'");
    }
    let unit = Unit::parse(unit).with_context(|| format!("unknown unit '{unit}'"))?;

    let mut page = ComparePage::new(ctx.country(country)?, ctx.grid_year(grid_year));
    page.unit = unit;
    for skipped in page.select_all(&ctx.client, keys) {
        match skipped {
            Skipped::Full(key) => eprintln!(
                "{} only three vehicles can be compared; ignoring {key}",
                "warning:".yellow().bold()
            ),
            Skipped::Failed(key, e) => eprintln!("{} {key}: {e}", "warning:".yellow().bold()),
        }
    }
    let view = page.view();

    match format {
        OutputFormat::Json => print_json(&view),
        OutputFormat::Csv => {
            println!("brand,model,year,value,manufacturing_g_per_km,operational_g_per_km");
            for card in &view.cards {
                println!(
                    "{},{},{},{},{},{}",
                    csv_field(&card.key.brand),
                    csv_field(&card.key.model),
                    card.key.year,
                    card.value.map(|v| v.to_string()).unwrap_or_default(),
                    card.manufacturing_g_per_km.map(|v| v.to_string()).unwrap_or_default(),
                    card.operational_g_per_km.map(|v| v.to_string()).unwrap_or_default(),
                );
            }
            Ok(())
        }
        OutputFormat::Table => {
            print_compare_table(&view, &page.country, page.grid_year);
            Ok(())
        }
    }
}

fn print_compare_table(view: &CompareView, country: &str, grid_year: i32) {
    header(&format!("Lifecycle Comparison ({country} grid, {grid_year})"), 70);
    if view.cards.is_empty() {
        println!("{}", "No vehicles could be compared.".yellow());
        return;
    }
    println!(
        "  {:<30} {:<6} {:>12} {:>10} {:>10}",
        "Vehicle", "Type", view.unit_label, "Mfg g/km", "Op g/km"
    );
    println!("  {}", "-".repeat(72));
    for card in &view.cards {
        println!(
            "  {:<30} {:<6} {:>12} {:>10} {:>10}",
            truncate(&card.label, 30),
            card.powertrain.as_ref().map(|p| p.as_str()).unwrap_or("-"),
            format_large_number(card.value),
            format_emission(card.manufacturing_g_per_km),
            format_emission(card.operational_g_per_km),
        );
    }

    println!();
    let max = view.bar_values.iter().copied().fold(0.0_f64, f64::max);
    for (label, value) in view.bar_labels.iter().zip(&view.bar_values) {
        println!(
            "  {:<30} {} {}",
            truncate(label, 30),
            bar(*value, max, 30).green(),
            format_emission(*value).dimmed()
        );
    }
}

/// Horizontal bar of `width` cells scaled to `max`.
fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    "█".repeat(cells.clamp(1, width))
}

// ---------------------------------------------------------------------------
// carbonwise break-even
// ---------------------------------------------------------------------------

/// Break-even distance between an EV and an ICE vehicle.
pub fn run_break_even(
    ctx: &Session,
    ev: &str,
    ice: &str,
    country: Option<&str>,
    grid_year: Option<i32>,
    format: OutputFormat,
) -> Result<()> {
    let (ev, ice) = (input::vehicle_key(ev)?, input::vehicle_key(ice)?);
    let vehicles = ctx.client.vehicles().context("failed to load vehicles")?;

    let mut page = BreakEvenPage::default();
    for (cascade, key) in [(&mut page.ev, &ev), (&mut page.ice, &ice)] {
        cascade.set_brand(Some(key.brand.clone()));
        cascade.set_model(Some(key.model.clone()));
        cascade.set_year(Some(key.year));
    }
    let view = page.calculate(
        &ctx.client,
        &vehicles,
        &ctx.country(country)?,
        ctx.grid_year(grid_year),
    )?;

    if format == OutputFormat::Json {
        return print_json(&view);
    }
    print_break_even_table(&view);
    Ok(())
}

fn print_break_even_table(view: &BreakEvenView) {
    header("EV vs ICE Break-Even", 60);
    println!("  {} {} km", "Break-even:".bold(), view.break_even.green());
    println!("  {}", view.message);
    println!();
    println!(
        "  {:<8} {:<26} {:>8} {:>8} {:>8}",
        "", "Vehicle", "Mfg", "Op", "Total"
    );
    println!("  {}", "-".repeat(62));
    for (tag, side) in [("EV", &view.ev), ("ICE", &view.ice)] {
        println!(
            "  {} {:<26} {:>8} {:>8} {:>8}",
            format!("{tag:<8}").bold(),
            truncate(&side.label, 26),
            side.manufacturing,
            side.operational,
            side.total
        );
    }

    if let Some(chart) = &view.chart {
        println!();
        println!("{}", "Cumulative emissions (t CO₂)".bold().cyan());
        println!("  {:>10} {:>10} {:>10}", "km", "EV", "ICE");
        for i in (0..chart.distance_km.len()).step_by(10) {
            println!(
                "  {:>10} {:>10.1} {:>10.1}",
                format_large_number(chart.distance_km[i]),
                chart.ev_kg[i] / 1000.0,
                chart.ice_kg[i] / 1000.0
            );
        }
    }
}

// ---------------------------------------------------------------------------
// carbonwise recommend
// ---------------------------------------------------------------------------

/// Arguments of `carbonwise recommend`.
#[derive(Debug, Clone, Default)]
pub struct RecommendArgs {
    pub daily_km: f64,
    pub years: u32,
    pub body_type: Option<String>,
    pub powertrain: Option<String>,
    pub price_min: Option<u32>,
    pub price_max: Option<u32>,
    pub country: Option<String>,
    pub grid_year: Option<i32>,
}

pub fn run_recommend(ctx: &Session, args: RecommendArgs, format: OutputFormat) -> Result<()> {
    let request = RecommendRequest {
        daily_km: args.daily_km,
        years: args.years,
        filters: RecommendFilters {
            body_type: args.body_type,
            powertrain: args.powertrain.map(|p| Powertrain::parse(&p).to_string()),
            price_min: args.price_min,
            price_max: args.price_max,
        },
        country: ctx.country(args.country.as_deref())?,
        grid_year: ctx.grid_year(args.grid_year),
    };
    let cards = recommend::recommend(&ctx.client, &request)?;

    match format {
        OutputFormat::Json => print_json(&cards),
        OutputFormat::Csv => {
            println!("rank,vehicle,powertrain,score,total_g_per_km");
            for c in &cards {
                println!(
                    "{},{},{},{},{}",
                    c.rank,
                    csv_field(&c.vehicle),
                    c.powertrain,
                    c.score,
                    c.total_g_per_km
                );
            }
            Ok(())
        }
        OutputFormat::Table => {
            print_recommend_table(&cards);
            Ok(())
        }
    }
}

fn print_recommend_table(cards: &[RecommendationCard]) {
    header("Recommended Vehicles", 60);
    if cards.is_empty() {
        println!(
            "{}",
            "No vehicles match your criteria. Try adjusting your filters.".yellow()
        );
        return;
    }
    for card in cards {
        let score = format!("{}/100", card.score);
        let score = match card.score_class {
            ScoreClass::Excellent => score.green(),
            ScoreClass::Good => score.yellow(),
            ScoreClass::Moderate => score.red(),
        };
        println!(
            "  {} {} [{}] {}",
            format!("#{}", card.rank).bold(),
            card.vehicle.bold(),
            card.powertrain,
            score
        );
        println!(
            "     Lifecycle: {} g/km{}",
            format_emission(card.total_g_per_km),
            card.personalized_total_kg
                .map(|kg| format!("  ·  {} kg over your ownership", format_large_number(kg)))
                .unwrap_or_default()
        );
        for reason in &card.reasons {
            println!("     {} {}", "✓".green(), reason.dimmed());
        }
    }
}

// ---------------------------------------------------------------------------
// carbonwise greenwashing
// ---------------------------------------------------------------------------

pub fn run_greenwashing(
    ctx: &Session,
    vehicle: &str,
    country: Option<&str>,
    grid_year: Option<i32>,
    search_web: bool,
    format: OutputFormat,
) -> Result<()> {
    let key = input::vehicle_key(vehicle)?;
    let vehicle = ctx.client.vehicle_detail(&key)?;
    let view = greenwashing::analyze(
        &ctx.client,
        &vehicle,
        &ctx.country(country)?,
        ctx.grid_year(grid_year),
        search_web,
    )?;

    if format == OutputFormat::Json {
        return print_json(&view);
    }

    header(&format!("Greenwashing Check: {}", view.vehicle), 60);
    let badge = match view.risk_level.as_str() {
        "high" => view.risk_badge.red().bold(),
        "medium" => view.risk_badge.yellow().bold(),
        _ => view.risk_badge.green().bold(),
    };
    println!("  {} {}", "Risk:        ".bold(), badge);
    println!(
        "  {} {:.0} ({})",
        "Transparency:".bold(),
        view.transparency_score,
        view.transparency_label
    );
    println!(
        "  {} {} g/km (mfg {} + op {})",
        "Lifecycle:   ".bold(),
        view.total,
        view.manufacturing,
        view.operational
    );
    println!();
    println!("{}", "Indicators".bold().cyan());
    if view.indicators.is_empty() {
        println!("  {}", "✓ No greenwashing indicators detected".green());
    }
    for ind in &view.indicators {
        println!("  {} {}", "⚠".yellow(), ind);
    }
    println!();
    println!("{}", "Findings".bold().cyan());
    if view.findings.is_empty() {
        println!(
            "  {}",
            "No significant findings. Emissions reporting appears transparent.".dimmed()
        );
    }
    for f in &view.findings {
        println!("  · {f}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// carbonwise grid
// ---------------------------------------------------------------------------

pub fn run_grid(
    ctx: &Session,
    country: Option<&str>,
    year: Option<i32>,
    forecast: bool,
    list: bool,
    format: OutputFormat,
) -> Result<()> {
    if list {
        let countries = ctx.client.countries()?;
        if format == OutputFormat::Json {
            return print_json(&countries);
        }
        header("Countries", 30);
        for c in countries {
            println!("  {:<6} {}", c.code.bold(), c.name);
        }
        return Ok(());
    }

    let country = ctx.country(country)?;
    let view = GridView::fetch(&ctx.client, &country, year, forecast)?;

    match format {
        OutputFormat::Json => print_json(&view),
        OutputFormat::Csv => {
            println!("year,raw,corrected,projected");
            for p in &view.series {
                println!(
                    "{},{},{},{}",
                    p.year,
                    p.raw.map(|v| v.to_string()).unwrap_or_default(),
                    p.corrected.map(|v| v.to_string()).unwrap_or_default(),
                    p.projected
                );
            }
            Ok(())
        }
        OutputFormat::Table => {
            header(&format!("Grid Insights: {}", view.country), 50);
            println!(
                "  {} {}",
                "Year:                 ".bold(),
                crate::format::placeholder(view.year)
            );
            println!(
                "  {} {} g/kWh",
                "Generation intensity: ".bold(),
                view.generation_intensity
            );
            println!(
                "  {} {} g/kWh",
                "Plug-adjusted:        ".bold(),
                view.plug_adjusted_intensity
            );
            println!(
                "  {} {}",
                "Transmission loss:    ".bold(),
                view.transmission_loss
            );
            println!();
            println!("  {:>6} {:>12} {:>12}", "Year", "Generation", "Plug");
            println!("  {}", "-".repeat(34));
            for p in &view.series {
                let line = format!(
                    "  {:>6} {:>12} {:>12}",
                    p.year,
                    format_emission(p.raw),
                    format_emission(p.corrected)
                );
                if p.projected {
                    println!("{} {}", line.dimmed(), "(forecast)".dimmed());
                } else {
                    println!("{line}");
                }
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// carbonwise detail
// ---------------------------------------------------------------------------

pub fn run_detail(
    ctx: &Session,
    vehicle: &str,
    country: Option<&str>,
    grid_year: Option<i32>,
    annual_km: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    let key = input::vehicle_key(vehicle)?;
    let view = vehicle_detail::load(
        &ctx.client,
        &key,
        &ctx.country(country)?,
        ctx.grid_year(grid_year),
        &ctx.config.defaults.sensitivity_countries,
    )?;
    let impact = annual_km
        .map(|km| vehicle_detail::annual_impact(&ctx.client, view.total_g_per_km, km))
        .transpose()?;

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "detail": view, "annual_impact": impact }));
    }
    print_detail_table(&view);
    if let Some(impact) = impact {
        println!();
        println!(
            "  {} {} kg CO₂ at {} km/year ({})",
            "Annual impact:".bold(),
            impact.annual_kg.green(),
            format_large_number(impact.annual_km),
            impact.equivalent
        );
    }
    Ok(())
}

fn print_detail_table(view: &DetailView) {
    header(&format!("{}  ({})", view.title, view.meta), 50);
    let score = format!("{:.0}", view.score);
    let score = match view.score_band {
        ScoreBand::Green => score.green(),
        ScoreBand::Amber => score.yellow(),
        ScoreBand::Red => score.red(),
    };
    println!("  {} {} {}", "Carbon score: ".bold(), score.bold(), view.score_label);
    println!("  {} {} g/km", "Total:        ".bold(), view.total);
    println!(
        "  {} {} g/km ({})",
        "Manufacturing:".bold(),
        view.manufacturing,
        format_percentage(view.breakdown.manufacturing_pct)
    );
    println!("  {} {} g/km", "Operational:  ".bold(), view.operational);

    println!();
    println!("{}", "Grid sensitivity (total g/km)".bold().cyan());
    if let Some(err) = &view.sensitivity_error {
        println!("  {}", format!("unavailable: {err}").yellow());
    }
    let max = view
        .sensitivity
        .iter()
        .map(|s| s.total_g_per_km)
        .fold(0.0_f64, f64::max);
    for s in &view.sensitivity {
        println!(
            "  {:<4} {} {}",
            s.country,
            bar(s.total_g_per_km, max, 30).green(),
            format_emission(s.total_g_per_km).dimmed()
        );
    }
}

// ---------------------------------------------------------------------------
// carbonwise methodology
// ---------------------------------------------------------------------------

pub fn run_methodology(ctx: &Session, format: OutputFormat) -> Result<()> {
    let methodology = ctx.client.methodology()?;
    if format == OutputFormat::Json {
        return print_json(&methodology);
    }
    header("Methodology", 60);
    for (key, value) in &methodology {
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        println!("  {}", key.bold());
        println!("    {}", text.dimmed());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// carbonwise log
// ---------------------------------------------------------------------------

/// Summarize the request log.
pub fn run_log(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let report = reporter::compute_report(days);

    if report.total_requests == 0 {
        println!(
            "{}",
            "No requests logged yet. Run some commands to see stats.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Csv => print_log_csv(&report),
        OutputFormat::Table => print_log_table(&report),
    }
    Ok(())
}

fn print_log_table(report: &RequestReport) {
    header("CarbonWise Request Log", 70);
    println!("  {} {}", "Total requests:".bold(), report.total_requests);
    println!(
        "  {} {} ({:.1}%)",
        "Failed:        ".bold(),
        report.failed_requests,
        report.failure_pct()
    );
    println!();
    println!(
        "  {:<6} {:<24} {:>6} {:>8} {:>10} {:>10}",
        "Method", "Endpoint", "Count", "Fail %", "Avg ms", "Max ms"
    );
    println!("  {}", "-".repeat(68));
    for (i, ep) in report.endpoints.iter().enumerate() {
        let line = format!(
            "  {:<6} {:<24} {:>6} {:>7.1}% {:>10.1} {:>10}",
            ep.method,
            truncate(&ep.endpoint, 24),
            ep.count,
            ep.failure_pct(),
            ep.avg_duration_ms,
            ep.max_duration_ms,
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }

    if !report.recent_failures.is_empty() {
        println!();
        println!("{}", "Recent failures".bold().cyan());
        for entry in &report.recent_failures {
            println!(
                "  {} {} {} {}",
                entry.timestamp.dimmed(),
                entry.method,
                entry.endpoint,
                entry.error.as_deref().unwrap_or("").red()
            );
        }
    }
}

fn print_log_csv(report: &RequestReport) {
    println!("method,endpoint,count,failures,avg_duration_ms,max_duration_ms");
    for ep in &report.endpoints {
        println!(
            "{},{},{},{},{:.1},{}",
            ep.method, ep.endpoint, ep.count, ep.failures, ep.avg_duration_ms, ep.max_duration_ms,
        );
    }
}

// ---------------------------------------------------------------------------
// carbonwise config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    header("Effective CarbonWise Configuration", 50);
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    for (exists, name) in [
        (global_exists, "~/.carbonwise/config.toml"),
        (project_exists, ".carbonwise.toml"),
    ] {
        if exists {
            println!("  {} {}", "✓".green(), name.dimmed());
        } else {
            println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
        }
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "CARBONWISE_* environment variables".dimmed()
    );
    Ok(())
}

/// Initialize a default config file at `~/.carbonwise/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} Config written to {}", "✓".green().bold(), path.display());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
