//! Experiment workspace layout
//!
//! Subject data lives under `<dataroot>/<experiment>/<modality>/<subject>`,
//! and pipeline artifacts (master descriptions, rendered scripts) under
//! `<dataroot>/<experiment>/scripts`. This module is the thin filesystem
//! collaborator the assembler, renderer, and scaffolding wizard share.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SCRIPTS_DIR: &str = "scripts";

#[derive(Debug, Clone)]
pub struct Workspace {
    data_root: PathBuf,
}

impl Workspace {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    pub fn experiment_dir(&self, experiment: &str) -> PathBuf {
        self.data_root.join(experiment)
    }

    pub fn modality_dir(&self, experiment: &str, modality: &str) -> PathBuf {
        self.experiment_dir(experiment).join(modality)
    }

    pub fn subject_dir(&self, experiment: &str, modality: &str, subject: &str) -> PathBuf {
        self.modality_dir(experiment, modality).join(subject)
    }

    pub fn scripts_dir(&self, experiment: &str) -> PathBuf {
        self.experiment_dir(experiment).join(SCRIPTS_DIR)
    }

    /// Existing subject directories for one experiment/modality, sorted.
    pub fn subjects(&self, experiment: &str, modality: &str) -> Result<Vec<String>> {
        let dir = self.modality_dir(experiment, modality);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut subjects = Vec::new();
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("cannot read `{}`", dir.display()))?
        {
            let entry = entry.with_context(|| format!("cannot read `{}`", dir.display()))?;
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                subjects.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        subjects.sort();
        Ok(subjects)
    }

    /// Creates the scripts directory if needed and verifies it is writable.
    pub fn ensure_scripts_dir(&self, experiment: &str) -> Result<PathBuf> {
        let dir = self.scripts_dir(experiment);
        fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create scripts directory `{}`", dir.display()))?;

        let permissions = fs::metadata(&dir)
            .with_context(|| format!("cannot inspect `{}`", dir.display()))?
            .permissions();
        if permissions.readonly() {
            bail!("scripts directory `{}` is not writable", dir.display());
        }

        Ok(dir)
    }

    /// Creates one subject directory tree.
    ///
    /// Returns `false` when the subject already existed and nothing was
    /// created.
    pub fn scaffold_subject(
        &self,
        experiment: &str,
        modality: &str,
        subject: &str,
    ) -> Result<bool> {
        let dir = self.subject_dir(experiment, modality, subject);
        if dir.is_dir() {
            debug!("subject directory `{}` already exists", dir.display());
            return Ok(false);
        }
        fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create subject directory `{}`", dir.display()))?;
        Ok(true)
    }
}
