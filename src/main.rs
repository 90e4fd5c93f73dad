use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use balanced_groups::export::{create_export, export_allocation, GroupSummary};
use balanced_groups::{AllocationConfig, Allocator, Person};

#[derive(Parser, Debug)]
#[command(name = "balanced_groups")]
#[command(about = "Split a roster into balanced groups by role")]
struct Args {
    /// JSON file holding an array of {"name": ..., "role": ...} entries
    #[arg(short, long)]
    roster: PathBuf,

    /// Desired number of people per group (at least 2)
    #[arg(short = 'n', long, default_value = "4")]
    size: f64,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print the export document as JSON instead of the text summary
    #[arg(long)]
    json: bool,

    /// Also write the export document to this path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let text = fs::read_to_string(&args.roster)
        .with_context(|| format!("reading roster {}", args.roster.display()))?;
    let roster: Vec<Person> = serde_json::from_str(&text)
        .with_context(|| format!("parsing roster {}", args.roster.display()))?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let config = AllocationConfig::new(args.size).with_seed(seed);
    let allocator = Allocator::new(config)?;
    let allocation = allocator.allocate(&roster)?;

    if args.json {
        let export = create_export(&allocation, Some(seed));
        println!("{}", serde_json::to_string_pretty(&export)?);
    } else {
        println!("Allocating {} people", roster.len());
        println!("{}", allocator.seeds());
        println!("Group sizes: {:?}", allocation.capacities);
        print!("{}", GroupSummary(&allocation));
    }

    if let Some(path) = &args.output {
        export_allocation(&allocation, Some(seed), path)
            .with_context(|| format!("writing export to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
