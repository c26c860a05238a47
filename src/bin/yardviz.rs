//! CLI for YardViz - landscaping makeovers from street-level photos.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use yardviz::config::credential_status;
use yardviz::pipeline::SessionState;
use yardviz::{
    BatchOrchestrator, FalTransformer, GeminiAnalyzer, GoogleGeocoder, InteractiveOrchestrator,
    LocationQuery, SampleLocation, StreetViewProvider, YardVizError,
};

#[derive(Parser)]
#[command(name = "yardviz")]
#[command(about = "Generate AI landscaping makeovers from Street View photos")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a makeover for one address or "lat,lng" pair
    Generate(GenerateArgs),

    /// Generate before/after examples for the built-in sample locations
    Batch(BatchArgs),

    /// Show which provider credentials are configured
    Providers,
}

#[derive(Args)]
struct GenerateArgs {
    /// Street address, or coordinates as "lat,lng"
    address: LocationQuery,

    /// Run scene analysis and include it in the prompt
    #[arg(long)]
    analyze: bool,

    /// Pass the address straight to Street View instead of geocoding it
    #[arg(long)]
    no_geocode: bool,

    /// Save the before image to this path
    #[arg(long)]
    before_out: Option<PathBuf>,
}

#[derive(Args)]
struct BatchArgs {
    /// Write the example records JSON here instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Run scene analysis for every example
    #[arg(long)]
    analyze: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate(args) => generate(args, cli.json).await,
        Commands::Batch(args) => batch(args, cli.json).await,
        Commands::Providers => list_providers(cli.json),
    };

    if let Err(e) = result {
        let message = match e.downcast_ref::<YardVizError>() {
            Some(err) => err.user_message(),
            None => e.to_string(),
        };
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "yardviz=debug" } else { "yardviz=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    // Every credential is checked before the first request goes out.
    let imagery = Arc::new(StreetViewProvider::builder().build()?);
    let transformer = Arc::new(FalTransformer::builder().build()?);

    let mut orchestrator = InteractiveOrchestrator::new(imagery, transformer);
    if !args.no_geocode {
        orchestrator = orchestrator.with_geocoder(Arc::new(GoogleGeocoder::builder().build()?));
    }
    if args.analyze {
        orchestrator = orchestrator.with_analyzer(Arc::new(GeminiAnalyzer::builder().build()?));
    }

    let makeover = orchestrator
        .run_with_observer(&args.address, |state: &SessionState| {
            if !json_output && state.is_loading() {
                eprintln!("{}...", state.stage);
            }
        })
        .await?;

    if let Some(path) = &args.before_out {
        makeover.before.save(path)?;
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&makeover.summary())?);
    } else {
        println!("Location: {}", makeover.before.location());
        if let Some(coords) = makeover.resolved_location {
            println!("Resolved: {coords}");
        }
        println!(
            "Before: heading {}, {} bytes",
            makeover.before.angle().heading,
            makeover.before.size()
        );
        if let Some(path) = &args.before_out {
            println!("  saved to {}", path.display());
        }
        if let Some(analysis) = &makeover.analysis {
            println!("\nAnalysis:\n{analysis}\n");
        }
        println!("After: {}", makeover.after.image_url);
        println!("Seed: {}", makeover.after.seed);
    }

    Ok(())
}

async fn batch(args: BatchArgs, json_output: bool) -> anyhow::Result<()> {
    let imagery = Arc::new(StreetViewProvider::builder().build()?);
    let transformer = Arc::new(FalTransformer::builder().build()?);

    let mut orchestrator = BatchOrchestrator::new(imagery, transformer);
    if args.analyze {
        orchestrator = orchestrator.with_analyzer(Arc::new(GeminiAnalyzer::builder().build()?));
    }

    let samples = SampleLocation::defaults();
    // Per-item progress is logged by the orchestrator.
    let report = orchestrator.run(&samples).await;

    let records = report.records_json()?;
    match &args.out {
        Some(path) => std::fs::write(path, &records)?,
        None => println!("{records}"),
    }

    if !json_output {
        eprintln!(
            "\nGenerated {}/{} examples",
            report.records.len(),
            samples.len()
        );
        for item in &report.skipped {
            eprintln!("  skipped {} ({}): {}", item.index, item.label, item.reason);
        }
        if let Some(path) = &args.out {
            eprintln!("Saved to {}", path.display());
        }
    }

    Ok(())
}

fn list_providers(json_output: bool) -> anyhow::Result<()> {
    let statuses = credential_status();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else {
        println!("Providers:\n");
        for s in &statuses {
            let mark = if s.is_configured() { "✓" } else { "✗" };
            println!("  {} {} ({})", mark, s.provider, s.role);
            match s.resolved_from {
                Some(var) => println!("    API key: {var}"),
                None => println!("    API key: set one of {}", s.env_vars.join(", ")),
            }
        }
    }

    Ok(())
}
