//! Module-library access
//!
//! The library is a flat directory of module scripts. Scanning returns the
//! regular files in name order; loading reads one script into memory so the
//! header and body extractors can work on it.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::header::{self, FormatError};
use super::schema::{ModuleHeader, SchemaError};

/// A loaded module script.
#[derive(Debug, Clone)]
pub struct Module {
    /// Name, identical to the file name in the library.
    pub name: String,
    /// Full file contents.
    pub contents: String,
}

impl Module {
    /// The declaration header lines, comment markers stripped.
    pub fn header(&self) -> Result<Vec<String>, FormatError> {
        header::read_header(&self.name, &self.contents)
    }

    /// The executable body lines, verbatim.
    pub fn body(&self) -> Result<Vec<String>, FormatError> {
        header::read_body(&self.name, &self.contents)
    }

    /// The typed header record.
    pub fn schema(&self) -> Result<ModuleHeader, ModuleParseError> {
        let lines = self.header()?;
        Ok(ModuleHeader::parse(&self.name, &lines)?)
    }
}

/// Either failure mode of turning a file into a typed header record.
#[derive(Debug, thiserror::Error)]
pub enum ModuleParseError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A directory of module scripts.
#[derive(Debug, Clone)]
pub struct ModuleLibrary {
    root: PathBuf,
}

impl ModuleLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all module files in the library, sorted.
    pub fn module_names(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("cannot read module library `{}`", self.root.display()))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("cannot read module library `{}`", self.root.display()))?;
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        debug!("library `{}` holds {} module(s)", self.root.display(), names.len());
        Ok(names)
    }

    /// Whether a module file with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }

    /// Loads one module by name.
    pub fn load(&self, name: &str) -> Result<Module> {
        let path = self.root.join(name);
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("cannot read module `{}`", path.display()))?;
        Ok(Module {
            name: name.to_string(),
            contents,
        })
    }
}
