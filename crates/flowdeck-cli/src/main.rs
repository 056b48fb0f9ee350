use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use flowdeck_core::{
    is_asset_missing, is_asset_stale, resolve_run_repository, LiveDataForNode, RepoAddress, RunId,
    RunRecord,
};
use flowdeck_session::validate_run_config_yaml;
use flowdeck_workspace::{load_workspace_with_retry, Config, WorkspaceContext, WorkspaceSnapshot};

#[derive(Parser)]
#[command(name = "flowdeck", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize flowdeck in the current directory (config + starter manifest)
    Init,

    /// Summarize the loaded workspace
    Status {
        /// Workspace manifest; defaults to the configured path
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Match a run against the loaded workspace and report how it matched
    ResolveRun {
        #[arg(long)]
        pipeline: String,
        #[arg(long)]
        origin_repo: Option<String>,
        #[arg(long)]
        origin_location: Option<String>,
        #[arg(long)]
        snapshot_id: Option<String>,
        #[arg(long)]
        parent_snapshot_id: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Evaluate asset staleness from logical versions
    Stale {
        #[arg(long)]
        current: Option<String>,
        #[arg(long)]
        projected: Option<String>,
    },

    /// Validate a run-config yaml file before launch
    CheckConfig {
        #[arg(long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let project_root = std::env::current_dir()?;

    match cli.cmd {
        Command::Init => {
            let cfg_path = Config::config_path(&project_root);
            if !cfg_path.exists() {
                let project_id =
                    project_root.file_name().and_then(|s| s.to_str()).unwrap_or("project");
                Config::default_for_project(project_id).save_to(&cfg_path)?;
            }
            let cfg = Config::load_from(&cfg_path)?;
            let manifest = cfg.manifest_path(&project_root);
            if !manifest.exists() {
                if let Some(parent) = manifest.parent() {
                    std::fs::create_dir_all(parent).ok();
                }
                std::fs::write(&manifest, STARTER_MANIFEST)?;
            }
            println!("Initialized flowdeck in {}", project_root.display());
        }
        Command::Status { file } => {
            let snap = load_snapshot(&project_root, file)?;
            println!("Repositories: {}", snap.options.len());
            for option in &snap.options {
                println!(
                    "- {}@{} ({} pipelines)",
                    option.address.repository_name,
                    option.address.location_name,
                    option.pipelines.len()
                );
                for p in &option.pipelines {
                    println!("    {} [{}]", p.name, p.snapshot_id);
                }
            }
        }
        Command::ResolveRun {
            pipeline,
            origin_repo,
            origin_location,
            snapshot_id,
            parent_snapshot_id,
            file,
            json,
        } => {
            let origin = match (origin_repo, origin_location) {
                (Some(r), Some(l)) => Some(RepoAddress::new(r, l)),
                (None, None) => None,
                _ => {
                    return Err(anyhow!(
                        "--origin-repo and --origin-location must be given together"
                    ))
                }
            };
            let run = RunRecord {
                id: RunId::new(),
                pipeline_name: pipeline,
                repository_origin: origin,
                pipeline_snapshot_id: snapshot_id,
                parent_pipeline_snapshot_id: parent_snapshot_id,
            };
            let snap = load_snapshot(&project_root, file)?;
            match resolve_run_repository(Some(&run), &snap.options) {
                Some(m) if json => println!("{}", serde_json::to_string_pretty(&m.to_resolved())?),
                Some(m) => println!(
                    "{}@{} ({})",
                    m.repo.address.repository_name,
                    m.repo.address.location_name,
                    m.match_type.as_str()
                ),
                None if json => println!("null"),
                None => println!("no repository matches this run"),
            }
        }
        Command::Stale { current, projected } => {
            let live = LiveDataForNode {
                current_logical_version: current,
                projected_logical_version: projected,
            };
            if is_asset_missing(Some(&live)) {
                println!("missing");
            } else if is_asset_stale(Some(&live)) {
                println!("stale");
            } else {
                println!("fresh");
            }
        }
        Command::CheckConfig { file } => {
            let yaml = std::fs::read_to_string(&file)?;
            validate_run_config_yaml(&yaml)
                .map_err(|e| anyhow!("{}: {}", file.display(), e))?;
            println!("OK");
        }
    }

    Ok(())
}

/// Load the manifest (explicit --file, else the configured path), then hand
/// the options to a workspace context so ordering and uniqueness match what
/// the dashboard would see.
fn load_snapshot(project_root: &Path, file: Option<PathBuf>) -> Result<WorkspaceSnapshot> {
    let cfg_path = Config::config_path(project_root);
    let cfg = if cfg_path.exists() {
        Config::load_from(&cfg_path)?
    } else {
        let project_id = project_root.file_name().and_then(|s| s.to_str()).unwrap_or("project");
        Config::default_for_project(project_id)
    };

    let manifest = file.unwrap_or_else(|| cfg.manifest_path(project_root));
    let options = load_workspace_with_retry(&manifest, cfg.refresh_max_retries())?;

    let ctx = WorkspaceContext::new();
    ctx.replace_options(options)?;
    Ok(ctx.snapshot())
}

const STARTER_MANIFEST: &str = "\
locations:
  - name: local
    repositories:
      - name: example
        pipelines:
          - name: hello_pipeline
";
