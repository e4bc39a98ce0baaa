//! YAML batch plans: a list of previews to render in one invocation.
//!
//! ```yaml
//! defaults: { width: 96, height: 96, seed: 0 }
//! previews:
//!   - kind: mesh
//!     asset: levels/corridor_a.chunk
//!     seed: 7
//!     output: corridor.png
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::preview::PreviewKind;

pub const DEFAULT_SIZE: u32 = 96;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    #[serde(default)]
    pub defaults: PlanDefaults,
    pub previews: Vec<PlanEntry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanDefaults {
    #[serde(default = "default_size")]
    pub width: u32,
    #[serde(default = "default_size")]
    pub height: u32,
    #[serde(default)]
    pub seed: u32,
}

impl Default for PlanDefaults {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            seed: 0,
        }
    }
}

fn default_size() -> u32 {
    DEFAULT_SIZE
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanEntry {
    pub kind: String,
    pub asset: String,
    #[serde(default)]
    pub seed: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// A plan entry with defaults applied and its output path decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewJob {
    pub kind: String,
    pub asset: String,
    pub seed: u32,
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
}

impl Plan {
    pub fn jobs(&self) -> Vec<PreviewJob> {
        self.previews
            .iter()
            .enumerate()
            .map(|(index, entry)| PreviewJob {
                kind: entry.kind.clone(),
                asset: entry.asset.clone(),
                seed: entry.seed.unwrap_or(self.defaults.seed),
                width: entry.width.unwrap_or(self.defaults.width),
                height: entry.height.unwrap_or(self.defaults.height),
                output: entry.output.clone().unwrap_or_else(|| {
                    PathBuf::from(format!(
                        "{index:03}_{}.png",
                        PreviewKind::parse(&entry.kind).as_str()
                    ))
                }),
            })
            .collect()
    }
}

pub fn load_and_validate_plan(path: &Path) -> Result<Plan> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read plan {}", path.display()))?;
    parse_and_validate_plan(&contents)
        .with_context(|| format!("invalid plan {}", path.display()))
}

pub fn parse_and_validate_plan(contents: &str) -> Result<Plan> {
    let plan: Plan = serde_yaml::from_str(contents).map_err(|error| {
        let location = error
            .location()
            .map(|location| format!("line {}, column {}", location.line(), location.column()))
            .unwrap_or_else(|| "unknown location".to_owned());
        anyhow!("failed to parse yaml at {}: {}", location, error)
    })?;
    validate_plan(&plan)?;
    Ok(plan)
}

fn validate_plan(plan: &Plan) -> Result<()> {
    if plan.previews.is_empty() {
        bail!("plan must define at least one preview");
    }

    let mut seen_outputs = HashSet::with_capacity(plan.previews.len());
    for (index, job) in plan.jobs().iter().enumerate() {
        if job.asset.trim().is_empty() {
            bail!("preview #{index} has an empty asset path");
        }
        if job.width == 0 || job.height == 0 {
            bail!(
                "preview #{index} ('{}') size must be positive, got {}x{}",
                job.asset,
                job.width,
                job.height
            );
        }
        validate_output_path(&job.output)
            .with_context(|| format!("preview #{index} ('{}') has a bad output", job.asset))?;
        if !seen_outputs.insert(job.output.clone()) {
            bail!(
                "duplicate output path '{}' (preview #{index})",
                job.output.display()
            );
        }
    }
    Ok(())
}

fn validate_output_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("output path is empty");
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => bail!(
                "output '{}' must not contain '..' components",
                path.display()
            ),
            Component::RootDir | Component::Prefix(_) => {
                bail!("output '{}' must be a relative path", path.display())
            }
        }
    }
    Ok(())
}
