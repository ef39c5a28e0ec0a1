use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use lumina_bi::auth::gate_from_config;
use lumina_bi::config::Config;
use lumina_bi::constants::DEFAULT_CONFIG_PATH;
use lumina_bi::dashboard::{DashboardBuilder, DashboardData};
use lumina_bi::logging;
use lumina_bi::pipeline::processing::StateLookup;
use lumina_bi::server::{start_server, AppState};
use lumina_bi::types::Severity;

#[derive(Parser)]
#[command(name = "lumina_bi")]
#[command(about = "Brazilian state population dashboards for Lumina BI")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and print the region summary and state detail tables
    Summary,
    /// Write the renderer inputs and the dashboard document as JSON files
    Export {
        /// Output directory
        #[arg(long, default_value = "output")]
        out: PathBuf,
    },
    /// Serve the tables and dashboard document over HTTP
    Serve {
        /// Overrides [server].port
        #[arg(long)]
        port: Option<u16>,
    },
}

fn print_summary(data: &DashboardData) {
    let output = &data.output;

    println!("\n📊 Population by region:");
    println!("   {:<14} {:>18} {:>8}", "Region", "Total", "States");
    for row in &output.summary {
        println!(
            "   {:<14} {:>18.1} {:>8}",
            row.region.as_str(),
            row.total_population,
            row.state_count
        );
    }

    println!("\n📋 Population by state:");
    for row in &output.details {
        println!(
            "   {:<14} {:<22} {:>16.1}",
            row.region.as_str(),
            row.state_name,
            row.population
        );
    }

    if !output.diagnostics.is_empty() {
        println!("\n⚠️  {} rows dropped:", output.diagnostics.len());
        for diagnostic in &output.diagnostics {
            let row = diagnostic
                .row
                .map(|r| format!("row {}", r))
                .unwrap_or_else(|| "-".to_string());
            println!("   - [{}] {}", row, diagnostic.description);
        }
    }
}

fn write_json<T: serde::Serialize>(dir: &Path, name: &str, value: &T) -> anyhow::Result<()> {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote export");
    Ok(())
}

fn export(data: &DashboardData, out: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory {}", out.display()))?;

    write_json(out, "summary.json", &data.output.summary)?;
    write_json(out, "details.json", &data.output.details)?;
    write_json(
        out,
        "choropleth.json",
        &serde_json::json!({
            "settings": data.map,
            "data": data.output.choropleth,
        }),
    )?;
    write_json(out, "dashboard.json", &DashboardBuilder::new(data).build())?;
    write_json(out, "diagnostics.json", &data.output.diagnostics)?;

    println!("✅ Exported dashboard data to {}", out.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)?;

    if let Some(addr) = config.metrics.listen_addr {
        lumina_bi::metrics::init_metrics(addr);
    }

    let data = match DashboardData::load(&config, StateLookup::brazil()) {
        Ok(data) => data,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(e.into());
        }
    };

    let warnings = data
        .output
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    if warnings > 0 {
        warn!("{} rows dropped with warnings, see diagnostics", warnings);
    }

    match cli.command {
        Commands::Summary => print_summary(&data),
        Commands::Export { out } => export(&data, &out)?,
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let gate = gate_from_config(&config.server);
            let state = AppState::new(data, gate, &config.server);
            start_server(state, &config.server).await?;
        }
    }

    Ok(())
}
