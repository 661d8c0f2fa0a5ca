//! JSON-file-backed artifact store.
//!
//! Each operation is one atomic read-modify-write unit under a single
//! mutex, with a temp-file + rename write so concurrent saves never lose an
//! entry. No cross-operation transactions are provided. `save` returns only
//! after the write has landed on disk.

use newsreport_core::types::{NewsletterType, ReportArtifact};
use newsreport_core::{ReportError, ReportResult};
use newsreport_engine::ArtifactStore;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

pub struct ReportStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ReportStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Persist an artifact. Fails with a storage error when the write
    /// fails; nothing is retried silently.
    pub fn save(&self, artifact: &ReportArtifact) -> ReportResult<()> {
        let _guard = self.lock.lock();
        let mut artifacts = self.read_all()?;
        artifacts.push(artifact.clone());
        self.write_all(&artifacts)?;
        info!(artifact_id = %artifact.id, name = %artifact.name, "Report artifact saved");
        Ok(())
    }

    /// All persisted artifacts, unordered at this layer. Callers sort by
    /// creation timestamp for display.
    pub fn list(&self) -> ReportResult<Vec<ReportArtifact>> {
        let _guard = self.lock.lock();
        self.read_all()
    }

    /// Delete by id. An unknown id is an error, including a second delete
    /// of the same id.
    pub fn delete(&self, id: Uuid) -> ReportResult<()> {
        let _guard = self.lock.lock();
        let mut artifacts = self.read_all()?;
        let before = artifacts.len();
        artifacts.retain(|a| a.id != id);
        if artifacts.len() == before {
            return Err(ReportError::NotFound(format!("no report with id {}", id)));
        }
        self.write_all(&artifacts)?;
        info!(artifact_id = %id, "Report artifact deleted");
        Ok(())
    }

    /// Exact-match filters, both optional, combined with AND.
    pub fn filter(
        &self,
        advertiser: Option<&str>,
        newsletter_type: Option<NewsletterType>,
    ) -> ReportResult<Vec<ReportArtifact>> {
        let artifacts = self.list()?;
        Ok(artifacts
            .into_iter()
            .filter(|a| advertiser.map_or(true, |adv| a.advertiser == adv))
            .filter(|a| newsletter_type.map_or(true, |t| a.newsletter_type == t))
            .collect())
    }

    fn read_all(&self) -> ReportResult<Vec<ReportArtifact>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| ReportError::Storage(format!("failed to read {}: {}", self.path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ReportError::Storage(format!("failed to parse {}: {}", self.path.display(), e)))
    }

    fn write_all(&self, artifacts: &[ReportArtifact]) -> ReportResult<()> {
        let content = serde_json::to_string_pretty(artifacts)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| ReportError::Storage(format!("failed to create {}: {}", parent.display(), e)))?;
        }
        // Write to a sibling temp file and rename so readers never observe
        // a partially written list.
        let tmp = temp_path(&self.path);
        fs::write(&tmp, content)
            .map_err(|e| ReportError::Storage(format!("failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| ReportError::Storage(format!("failed to replace {}: {}", self.path.display(), e)))?;
        debug!(count = artifacts.len(), path = %self.path.display(), "Report list written");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

impl ArtifactStore for ReportStore {
    fn save(&self, artifact: &ReportArtifact) -> ReportResult<()> {
        ReportStore::save(self, artifact)
    }
}
