use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use assetfix_lib::{
    config::{is_missing_prerequisite, PathOverrides, RepairConfig},
    db::open_pool,
    repair::{run_repair, RepairOptions, RepairStatus, RepairSummary},
    report::format_human_summary,
    scoring::RecencyPolicy,
    storage::AssetRoot,
};

/// Exit code used when conflicts survive the repair pass.
const UNRESOLVED_EXIT_CODE: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "assetfix",
    about = "Keep a single preferred media asset per entity and asset type",
    version
)]
struct Cli {
    /// Directory holding `viewra.db` and `assets/` (defaults to ./viewra-data).
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    assets: Option<PathBuf>,

    /// Score and report without writing.
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON instead of the text report.
    #[arg(long)]
    json: bool,

    /// Tie-break used between otherwise equal candidates.
    #[arg(long, value_enum, default_value_t = RecencyPolicy::Timestamp)]
    recency: RecencyPolicy,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    assetfix_lib::init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config = RepairConfig::resolve(PathOverrides {
        data_dir: cli.data_dir,
        db: cli.db,
        assets: cli.assets,
    })
    .context("resolve database and asset paths")?;

    if let Err(err) = config.check_prerequisites() {
        if is_missing_prerequisite(&err) {
            println!("{}", err.message());
            return Ok(0);
        }
        return Err(err.into());
    }

    if !cli.json {
        println!(
            "Fixing preferred assets in database: {}",
            config.db_path.display()
        );
        println!("Assets directory: {}", config.assets_dir.display());
    }

    let store = AssetRoot::new(&config.assets_dir);
    let options = RepairOptions {
        recency: cli.recency,
        dry_run: cli.dry_run,
    };

    let pool = open_pool(&config.db_path)
        .await
        .with_context(|| format!("open {}", config.db_path.display()))?;
    let result = run_repair(&pool, &store, options).await;
    pool.close().await;
    let summary = result.context("repair preferred assets")?;

    if cli.json {
        print_summary_json(&summary)?;
    } else {
        print!("{}", format_human_summary(&summary));
    }

    if let Err(err) = summary.ensure_resolved() {
        eprintln!("Error: {err}");
    }

    Ok(match summary.status {
        RepairStatus::Unresolved => UNRESOLVED_EXIT_CODE,
        RepairStatus::Completed | RepairStatus::DryRun => 0,
    })
}

fn print_summary_json(summary: &RepairSummary) -> Result<()> {
    let serialized =
        serde_json::to_string_pretty(summary).context("serialize repair summary")?;
    println!("{serialized}");
    Ok(())
}
