//! The master pipeline description
//!
//! The master script is the persisted record of an assembled pipeline: four
//! `KEY=value` global bindings followed by one invocation line per step.
//! It is written incrementally (every completed module extends the file on
//! disk before the session moves on) and never modified afterwards. An
//! interrupted session therefore leaves a valid, merely truncated,
//! description behind.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::module::query;

/// Keys of the four global bindings, in the order they are written.
pub const BINDING_KEYS: [&str; 4] = ["LIBRARY", "DATAROOT", "EXPERIMENT", "MODALITY"];

/// The four global bindings every master description carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindings {
    /// Module-library directory.
    pub library: PathBuf,
    /// Root of the per-subject data tree.
    pub dataroot: PathBuf,
    /// Experiment identifier.
    pub experiment: String,
    /// Data/modality identifier.
    pub modality: String,
}

impl Bindings {
    fn pairs(&self) -> [(&'static str, String); 4] {
        [
            ("LIBRARY", self.library.display().to_string()),
            ("DATAROOT", self.dataroot.display().to_string()),
            ("EXPERIMENT", self.experiment.clone()),
            ("MODALITY", self.modality.clone()),
        ]
    }
}

/// One resolved pipeline step: a module name and its literal argument values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationLine {
    pub module: String,
    pub args: Vec<String>,
}

impl fmt::Display for InvocationLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.module)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Append-only writer for a master description being assembled.
///
/// Creation writes the binding block and refuses to overwrite an existing
/// file; the description is immutable once saved. Each appended line is
/// flushed immediately so the on-disk artifact always reflects every
/// completed step.
#[derive(Debug)]
pub struct MasterWriter {
    file: File,
    path: PathBuf,
}

impl MasterWriter {
    pub fn create(path: &Path, bindings: &Bindings) -> io::Result<Self> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        for (key, value) in bindings.pairs() {
            writeln!(file, "{key}={value}")?;
        }
        file.flush()?;
        debug!("created master description `{}`", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one completed invocation line and flushes.
    pub fn append(&mut self, line: &InvocationLine) -> io::Result<()> {
        writeln!(self.file, "{line}")?;
        self.file.flush()
    }
}

/// A saved master description, re-parsed for rendering.
#[derive(Debug, Clone)]
pub struct MasterDescription {
    lines: Vec<String>,
}

impl MasterDescription {
    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::from_text(&contents))
    }

    pub fn from_text(contents: &str) -> Self {
        Self {
            lines: contents.lines().map(str::to_string).collect(),
        }
    }

    /// Looks up one global binding by key.
    pub fn binding(&self, key: &str) -> Option<String> {
        query::find(&self.lines, key).map(|tokens| tokens[0].clone())
    }

    /// Every non-empty line split into a leading token and the rest.
    ///
    /// This includes the binding lines; the renderer keeps only entries
    /// whose leading token names a module file that still exists, which
    /// excludes bindings, comments, and modules that have since been
    /// removed from the library.
    pub fn entries(&self) -> Vec<InvocationLine> {
        self.lines
            .iter()
            .filter_map(|line| {
                let mut tokens = query::tokenize(line).into_iter();
                let module = tokens.next()?;
                Some(InvocationLine {
                    module,
                    args: tokens.collect(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bindings() -> Bindings {
        Bindings {
            library: PathBuf::from("/lib/modules"),
            dataroot: PathBuf::from("/data"),
            experiment: "pilot01".to_string(),
            modality: "func".to_string(),
        }
    }

    #[test]
    fn test_writer_emits_bindings_then_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nightly.master");

        let mut writer = MasterWriter::create(&path, &bindings()).unwrap();
        writer
            .append(&InvocationLine {
                module: "convert_dicom".to_string(),
                args: vec![],
            })
            .unwrap();
        writer
            .append(&InvocationLine {
                module: "smooth".to_string(),
                args: vec!["raw".to_string(), "6".to_string()],
            })
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "LIBRARY=/lib/modules\nDATAROOT=/data\nEXPERIMENT=pilot01\nMODALITY=func\nconvert_dicom\nsmooth raw 6\n"
        );
    }

    #[test]
    fn test_writer_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.master");
        fs::write(&path, "EXPERIMENT=old\n").unwrap();
        assert!(MasterWriter::create(&path, &bindings()).is_err());
    }

    #[test]
    fn test_every_append_is_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.master");
        let mut writer = MasterWriter::create(&path, &bindings()).unwrap();

        writer
            .append(&InvocationLine {
                module: "motion".to_string(),
                args: vec![],
            })
            .unwrap();

        // Read back while the writer is still alive.
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("motion\n"));
    }

    #[test]
    fn test_binding_lookup() {
        let master = MasterDescription::from_text(
            "LIBRARY=/lib\nDATAROOT=/data\nEXPERIMENT=pilot01\nMODALITY=func\nsmooth raw 6\n",
        );
        assert_eq!(master.binding("EXPERIMENT").as_deref(), Some("pilot01"));
        assert_eq!(master.binding("LIBRARY").as_deref(), Some("/lib"));
        assert_eq!(master.binding("RUN"), None);
    }

    #[test]
    fn test_entries_parse_name_and_args() {
        let master = MasterDescription::from_text("smooth raw 6\nmotion\n");
        let entries = master.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].module, "smooth");
        assert_eq!(entries[0].args, vec!["raw", "6"]);
        assert_eq!(entries[1].module, "motion");
        assert!(entries[1].args.is_empty());
    }

    #[test]
    fn test_entries_skip_blank_lines() {
        let master = MasterDescription::from_text("\nsmooth raw\n\n");
        assert_eq!(master.entries().len(), 1);
    }

    #[test]
    fn test_invocation_line_display() {
        let line = InvocationLine {
            module: "smooth".to_string(),
            args: vec!["raw".to_string(), "6".to_string()],
        };
        assert_eq!(line.to_string(), "smooth raw 6");
    }
}
