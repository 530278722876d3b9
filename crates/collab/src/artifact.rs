//! Model persistence and hot reload.
//!
//! Artifacts are a single JSON document:
//!
//! ```json
//! { "format": "repo-recs-cf", "version": 1, "model": { ... } }
//! ```
//!
//! Writes go through a temp file in the destination directory followed by a
//! rename, so a crash mid-save never leaves a truncated artifact behind.

use crate::error::{CfError, Result};
use crate::model::FactorModel;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{info, instrument, warn};

pub const ARTIFACT_FORMAT: &str = "repo-recs-cf";
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ArtifactRef<'a> {
    format: &'a str,
    version: u32,
    model: &'a FactorModel,
}

/// Header is checked before the body so a foreign file reports a version
/// problem rather than a parse error.
#[derive(Deserialize)]
struct ArtifactHeader {
    #[serde(default)]
    format: String,
    #[serde(default)]
    version: u32,
}

#[derive(Deserialize)]
struct ArtifactBody {
    model: FactorModel,
}

/// Persist a model atomically at `path`
#[instrument(skip(model), fields(path = %path.display()))]
pub fn save_model(model: &FactorModel, path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let temp = NamedTempFile::new_in(&parent)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer(
            &mut writer,
            &ArtifactRef {
                format: ARTIFACT_FORMAT,
                version: ARTIFACT_VERSION,
                model,
            },
        )?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| CfError::Io(e.error))?;

    info!(
        users = model.num_users(),
        repos = model.num_items(),
        "Saved CF model"
    );
    Ok(())
}

/// Load and validate a model artifact
#[instrument(fields(path = %path.display()))]
pub fn load_model(path: &Path) -> Result<FactorModel> {
    let unavailable = |reason: String| CfError::ModelUnavailable {
        path: path.display().to_string(),
        reason,
    };

    let file = File::open(path).map_err(|e| unavailable(e.to_string()))?;
    let value: serde_json::Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| unavailable(e.to_string()))?;

    let header = ArtifactHeader::deserialize(&value).map_err(|e| unavailable(e.to_string()))?;
    if header.format != ARTIFACT_FORMAT || header.version != ARTIFACT_VERSION {
        return Err(CfError::IncompatibleModelVersion {
            expected: format!("{ARTIFACT_FORMAT} v{ARTIFACT_VERSION}"),
            found: format!("{} v{}", header.format, header.version),
        });
    }

    let body = ArtifactBody::deserialize(value).map_err(|e| unavailable(e.to_string()))?;
    body.model.check_shape().map_err(unavailable)?;

    info!(
        users = body.model.num_users(),
        repos = body.model.num_items(),
        factors = body.model.factors(),
        "Loaded CF model"
    );
    Ok(body.model)
}

/// Shared, swappable reference to the serving model.
///
/// Readers take an `Arc` snapshot, so a reload never blocks in-flight
/// requests and a request always sees one consistent model.
#[derive(Debug)]
pub struct ModelHandle {
    path: Option<PathBuf>,
    current: RwLock<Arc<FactorModel>>,
}

impl ModelHandle {
    /// Load the artifact at `path` and remember the path for [`reload`](Self::reload)
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let model = load_model(&path)?;
        Ok(Self {
            path: Some(path),
            current: RwLock::new(Arc::new(model)),
        })
    }

    /// Serve an in-memory model with no backing artifact
    pub fn from_model(model: FactorModel) -> Self {
        Self {
            path: None,
            current: RwLock::new(Arc::new(model)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn current(&self) -> Arc<FactorModel> {
        Arc::clone(&self.current.read())
    }

    /// Re-read the artifact from disk. On failure the previous model keeps serving.
    pub fn reload(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Err(CfError::ModelUnavailable {
                path: "<memory>".to_string(),
                reason: "handle has no backing artifact".to_string(),
            });
        };
        match load_model(path) {
            Ok(model) => {
                *self.current.write() = Arc::new(model);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Model reload failed, keeping previous model");
                Err(e)
            }
        }
    }

    /// Swap in a freshly trained model
    pub fn replace(&self, model: FactorModel) {
        *self.current.write() = Arc::new(model);
    }
}
