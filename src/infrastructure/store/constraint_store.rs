use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::domain::models::ContextAgentConfig;
use crate::domain::{PipelineError, PipelineResult};

/// Insert `_<suffix>` between a path's stem and its extension.
///
/// `Results/generated_constraints.txt` with suffix 3 becomes
/// `Results/generated_constraints_3.txt`.
pub fn append_suffix_to_path(path: &Path, suffix: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    };
    path.with_file_name(name)
}

/// File name prefix shared by every numbered constraint artifact.
pub fn artifact_prefix(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}_")
}

/// Write `contents` to `path`, creating parent directories, and sync to disk
/// so the next stage observes the complete file.
pub async fn write_durable(path: &Path, contents: &str) -> PipelineResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| PipelineError::io(parent, e))?;
    }

    let mut file = fs::File::create(path)
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    file.write_all(contents.as_bytes())
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    file.flush().await.map_err(|e| PipelineError::io(path, e))?;
    file.sync_all().await.map_err(|e| PipelineError::io(path, e))?;

    debug!(path = %path.display(), bytes = contents.len(), "artifact written");
    Ok(())
}

/// The directory of text artifacts exchanged between pipeline stages.
#[derive(Debug, Clone)]
pub struct ConstraintFileStore {
    overview_path: PathBuf,
    constraint_base_path: PathBuf,
    aggregated_path: PathBuf,
}

impl ConstraintFileStore {
    pub fn new(config: &ContextAgentConfig) -> Self {
        Self {
            overview_path: config.llm_process_overview_save_path.clone(),
            constraint_base_path: config.llm_constraint_save_path.clone(),
            aggregated_path: config.llm_constraint_avg_save_path.clone(),
        }
    }

    pub fn overview_path(&self) -> &Path {
        &self.overview_path
    }

    pub fn aggregated_path(&self) -> &Path {
        &self.aggregated_path
    }

    /// Path of the constraint artifact for sampling iteration `iteration`.
    pub fn constraint_path(&self, iteration: u32) -> PathBuf {
        append_suffix_to_path(&self.constraint_base_path, iteration)
    }

    /// Directory scanned for constraint artifacts.
    pub fn results_dir(&self) -> PathBuf {
        match self.constraint_base_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub async fn write_overview(&self, overview: &str) -> PipelineResult<()> {
        write_durable(&self.overview_path, &format!("{}\n", overview.trim())).await
    }

    pub async fn write_constraints(&self, iteration: u32, text: &str) -> PipelineResult<PathBuf> {
        let path = self.constraint_path(iteration);
        write_durable(&path, text).await?;
        Ok(path)
    }

    pub async fn write_aggregated(&self, text: &str) -> PipelineResult<()> {
        write_durable(&self.aggregated_path, text).await
    }

    /// Read the single designated overview, trailing whitespace removed.
    pub async fn read_overview(&self) -> PipelineResult<String> {
        match fs::read_to_string(&self.overview_path).await {
            Ok(text) => Ok(text.trim_end().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PipelineError::MissingOverview(self.overview_path.clone()))
            }
            Err(e) => Err(PipelineError::io(&self.overview_path, e)),
        }
    }

    /// List constraint artifacts, ordered by iteration number.
    ///
    /// A file qualifies when its name starts with the configured stem plus
    /// `_` and its extension matches the configured one. The aggregated
    /// artifact is never included even if its name matches.
    pub async fn discover_constraint_artifacts(&self) -> PipelineResult<Vec<PathBuf>> {
        let dir = self.results_dir();
        let prefix = artifact_prefix(&self.constraint_base_path);
        let extension = self.constraint_base_path.extension().map(|e| e.to_os_string());

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::NoConstraintArtifacts(dir));
            }
            Err(e) => return Err(PipelineError::io(&dir, e)),
        };

        let mut artifacts = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PipelineError::io(&dir, e))?
        {
            let path = entry.path();
            if !path.is_file() || path.extension().map(|e| e.to_os_string()) != extension {
                continue;
            }
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if !name.starts_with(&prefix) || same_file(&path, &self.aggregated_path) {
                continue;
            }
            artifacts.push(path);
        }

        artifacts.sort_by(|a, b| compare_artifacts(a, b, &prefix));

        if artifacts.is_empty() {
            return Err(PipelineError::NoConstraintArtifacts(dir));
        }
        Ok(artifacts)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    a.file_name() == b.file_name()
        && match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
}

fn iteration_of(path: &Path, prefix: &str) -> Option<u32> {
    path.file_stem()?
        .to_str()?
        .strip_prefix(prefix)?
        .parse()
        .ok()
}

/// Numbered artifacts first, ascending; anything else after, by name.
fn compare_artifacts(a: &Path, b: &Path, prefix: &str) -> Ordering {
    match (iteration_of(a, prefix), iteration_of(b, prefix)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.file_name().cmp(&b.file_name()),
    }
}
