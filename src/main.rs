use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use softpreview::chunk::ChunkIdentity;
use softpreview::encoding::{sha256_hex, write_png};
use softpreview::plan::{load_and_validate_plan, DEFAULT_SIZE};
use softpreview::preview::{build_preview, PreviewKind};

const LONG_VERSION: &str = match option_env!("SOFTPREVIEW_GIT_HASH") {
    Some(hash) => hash,
    None => "unknown",
};

#[derive(Debug, Parser)]
#[command(name = "softpreview")]
#[command(about = "Deterministic CPU preview thumbnails for procedural assets")]
#[command(version, long_version = LONG_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render a single preview.
    Render {
        #[arg(long)]
        kind: String,
        #[arg(long)]
        asset: String,
        #[arg(long, default_value_t = 0)]
        seed: u32,
        #[arg(long, default_value_t = DEFAULT_SIZE)]
        width: u32,
        #[arg(long, default_value_t = DEFAULT_SIZE)]
        height: u32,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Render every preview listed in a YAML plan.
    Batch {
        plan: PathBuf,
        #[arg(long = "out-dir")]
        out_dir: Option<PathBuf>,
    },
    /// Validate a YAML plan without rendering.
    Check { plan: PathBuf },
}

#[derive(Debug, Serialize)]
struct RenderSummary {
    kind: &'static str,
    asset: String,
    seed: u32,
    width: u32,
    height: u32,
    chunk: String,
    node_id: u32,
    sha256: String,
    output: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            kind,
            asset,
            seed,
            width,
            height,
            output,
            json,
        } => run_render(&kind, &asset, seed, width, height, output.as_deref(), json),
        Commands::Batch { plan, out_dir } => run_batch(&plan, out_dir.as_deref()),
        Commands::Check { plan } => run_check(&plan),
    }
}

fn run_render(
    kind: &str,
    asset: &str,
    seed: u32,
    width: u32,
    height: u32,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let preview = build_preview(kind, asset, seed, width, height)?;
    let digest = sha256_hex(preview.rgba());
    if let Some(path) = output {
        write_png(path, &preview)?;
    }

    if json {
        let chunk = ChunkIdentity::derive(asset, seed);
        let summary = RenderSummary {
            kind: PreviewKind::parse(kind).as_str(),
            asset: asset.to_owned(),
            seed,
            width,
            height,
            chunk: chunk.tag(),
            node_id: chunk.node_id,
            sha256: digest,
            output: output.map(|path| path.display().to_string()),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        match output {
            Some(path) => println!("{digest}  {}", path.display()),
            None => println!("{digest}"),
        }
    }
    Ok(())
}

fn run_batch(plan_path: &Path, out_dir: Option<&Path>) -> Result<()> {
    let plan = load_and_validate_plan(plan_path)?;
    let root = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => plan_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
    };

    let jobs = plan.jobs();
    let total = jobs.len();
    for (index, job) in jobs.iter().enumerate() {
        info!("rendering {} preview of '{}' (seed {})", job.kind, job.asset, job.seed);
        let preview = build_preview(&job.kind, &job.asset, job.seed, job.width, job.height)?;
        let path = root.join(&job.output);
        write_png(&path, &preview)?;
        println!("{}  {}", sha256_hex(preview.rgba()), job.output.display());
        eprintln!("rendered preview {}/{}", index + 1, total);
    }
    Ok(())
}

fn run_check(plan_path: &Path) -> Result<()> {
    let plan = load_and_validate_plan(plan_path)?;
    println!(
        "OK: {} ({} previews, default {}x{}, seed {})",
        plan_path.display(),
        plan.previews.len(),
        plan.defaults.width,
        plan.defaults.height,
        plan.defaults.seed
    );
    Ok(())
}
