//! Rendering a master description into a standalone script
//!
//! Rendering reconstructs each recorded module's body with its argument
//! values hard-coded in place of the positional placeholders, concatenated
//! after a fixed preamble. The result is a single executable script; if any
//! part of that cannot be produced, nothing is.

use regex::{NoExpand, Regex};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::assemble::master::{Bindings, MasterDescription, BINDING_KEYS};
use crate::module::header::FormatError;
use crate::module::schema::{ModuleHeader, SchemaError};
use crate::module::ModuleLibrary;

/// Fatal rendering failures. There is no partial-success mode: any of these
/// aborts the whole render.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A required `KEY=value` binding is absent from the master description.
    #[error("master description is missing required binding `{0}`")]
    MissingBinding(&'static str),

    /// No line of the master description names a module that still exists.
    #[error("no module from library `{0}` appears in the master description")]
    NoModules(PathBuf),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("cannot read `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot make `{path}` executable")]
    Executable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub struct Renderer<'a> {
    library: &'a ModuleLibrary,
}

impl<'a> Renderer<'a> {
    pub fn new(library: &'a ModuleLibrary) -> Self {
        Self { library }
    }

    /// Renders a master description to script text.
    ///
    /// Invocation lines whose leading token no longer names a module file
    /// are skipped silently; the master may outlive its library. When the
    /// description carries invocation lines but none of them match, it and
    /// the library have nothing to do with each other and the render is
    /// fatal. A description with no invocation lines at all is an empty
    /// pipeline and renders to the bare preamble.
    pub fn render(&self, master: &MasterDescription) -> Result<String, RenderError> {
        let bindings = extract_bindings(master)?;

        let entries = master.entries();
        let honored: Vec<_> = entries
            .iter()
            .filter(|entry| {
                let known = self.library.contains(&entry.module);
                if !known {
                    debug!("skipping `{}`: not in the library", entry.module);
                }
                known
            })
            .collect();

        let candidates = entries
            .iter()
            .filter(|entry| {
                !BINDING_KEYS.contains(&entry.module.as_str()) && !entry.module.starts_with('#')
            })
            .count();
        if honored.is_empty() && candidates > 0 {
            return Err(RenderError::NoModules(self.library.root().to_path_buf()));
        }

        let mut script = preamble(&bindings);
        for entry in &honored {
            let module = self.read_module(&entry.module)?;
            let header_lines = crate::module::read_header(&entry.module, &module)?;
            let header = ModuleHeader::parse(&entry.module, &header_lines)?;
            header.check_arg_count(entry.args.len())?;

            let mut body = crate::module::read_body(&entry.module, &module)?;
            for (i, value) in entry.args.iter().enumerate() {
                substitute(&mut body, i + 1, value);
            }

            script.push('\n');
            script.push_str(&format!("# {entry}\n"));
            for line in &body {
                script.push_str(line);
                script.push('\n');
            }
        }

        Ok(script)
    }

    /// Loads a master description from disk, renders it, and writes an
    /// executable script to `out_path`.
    pub fn render_to_file(&self, master_path: &Path, out_path: &Path) -> Result<(), RenderError> {
        let master = MasterDescription::load(master_path).map_err(|source| RenderError::Io {
            path: master_path.to_path_buf(),
            source,
        })?;

        let script = self.render(&master)?;

        fs::write(out_path, script).map_err(|source| RenderError::Write {
            path: out_path.to_path_buf(),
            source,
        })?;
        mark_executable(out_path)?;

        info!("rendered `{}`", out_path.display());
        Ok(())
    }

    fn read_module(&self, name: &str) -> Result<String, RenderError> {
        let path = self.library.root().join(name);
        fs::read_to_string(&path).map_err(|source| RenderError::Io { path, source })
    }
}

fn extract_bindings(master: &MasterDescription) -> Result<Bindings, RenderError> {
    let mut values = Vec::with_capacity(BINDING_KEYS.len());
    for key in BINDING_KEYS {
        values.push(master.binding(key).ok_or(RenderError::MissingBinding(key))?);
    }
    let [library, dataroot, experiment, modality] = <[String; 4]>::try_from(values)
        .expect("binding key count is fixed");
    Ok(Bindings {
        library: PathBuf::from(library),
        dataroot: PathBuf::from(dataroot),
        experiment,
        modality,
    })
}

/// The fixed head of every rendered script: a usage check for the subject
/// argument and exports of the four global bindings.
fn preamble(bindings: &Bindings) -> String {
    format!(
        r#"#!/bin/bash
#
# Rendered by pipewright. Runs one subject through the assembled pipeline.

if [ -z "$1" ]; then
    echo "usage: $(basename "$0") <subject>" >&2
    exit 1
fi

export SUBJECT="$1"
export LIBRARY="{library}"
export DATAROOT="{dataroot}"
export EXPERIMENT="{experiment}"
export MODALITY="{modality}"
"#,
        library = bindings.library.display(),
        dataroot = bindings.dataroot.display(),
        experiment = bindings.experiment,
        modality = bindings.modality,
    )
}

/// Replaces the positional placeholder for `index` in the first body line
/// that contains one.
///
/// Placeholders are `$N` and `${N}`; a bare `$1` never matches inside `$12`.
/// Only the first occurrence on the first matching line is replaced, and the
/// scan stops there for that index; later lines keep their placeholders.
fn substitute(body: &mut [String], index: usize, value: &str) {
    let pattern = format!(r"\$(?:\{{{index}\}}|{index}\b)");
    let re = Regex::new(&pattern).expect("placeholder pattern is well-formed");

    for line in body.iter_mut() {
        if re.is_match(line) {
            *line = re.replace(line, NoExpand(value)).into_owned();
            return;
        }
    }
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<(), RenderError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| {
        // No partial success: do not leave a non-executable script behind.
        let _ = fs::remove_file(path);
        RenderError::Executable {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<(), RenderError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_substitute_bare_placeholder() {
        let mut lines = body(&["run_tool $1"]);
        substitute(&mut lines, 1, "A");
        assert_eq!(lines, vec!["run_tool A"]);
    }

    #[test]
    fn test_substitute_braced_placeholder() {
        let mut lines = body(&["run_tool ${1}_series"]);
        substitute(&mut lines, 1, "A");
        assert_eq!(lines, vec!["run_tool A_series"]);
    }

    #[test]
    fn test_dollar_one_does_not_match_in_dollar_twelve() {
        let mut lines = body(&["echo $12", "echo $1"]);
        substitute(&mut lines, 1, "A");
        assert_eq!(lines, vec!["echo $12", "echo A"]);
    }

    #[test]
    fn test_first_matching_line_wins_and_scan_stops() {
        let mut lines = body(&["first $1", "second $1"]);
        substitute(&mut lines, 1, "A");
        assert_eq!(lines, vec!["first A", "second $1"]);
    }

    #[test]
    fn test_only_first_occurrence_on_the_line() {
        let mut lines = body(&["cp $1 $1.bak"]);
        substitute(&mut lines, 1, "A");
        assert_eq!(lines, vec!["cp A $1.bak"]);
    }

    #[test]
    fn test_indices_scan_independently() {
        let mut lines = body(&["combine $1 $2"]);
        substitute(&mut lines, 1, "A");
        substitute(&mut lines, 2, "B");
        assert_eq!(lines, vec!["combine A B"]);
    }

    #[test]
    fn test_missing_placeholder_is_ignored() {
        let mut lines = body(&["echo static"]);
        substitute(&mut lines, 1, "A");
        assert_eq!(lines, vec!["echo static"]);
    }

    #[test]
    fn test_value_with_dollar_is_literal() {
        let mut lines = body(&["echo $1"]);
        substitute(&mut lines, 1, "$HOME");
        assert_eq!(lines, vec!["echo $HOME"]);
    }

    #[test]
    fn test_preamble_exports_all_bindings() {
        let bindings = Bindings {
            library: PathBuf::from("/lib"),
            dataroot: PathBuf::from("/data"),
            experiment: "pilot01".to_string(),
            modality: "func".to_string(),
        };
        let text = preamble(&bindings);
        assert!(text.starts_with("#!/bin/bash\n"));
        assert!(text.contains("export SUBJECT=\"$1\""));
        assert!(text.contains("export LIBRARY=\"/lib\""));
        assert!(text.contains("export DATAROOT=\"/data\""));
        assert!(text.contains("export EXPERIMENT=\"pilot01\""));
        assert!(text.contains("export MODALITY=\"func\""));
        assert!(text.contains("exit 1"));
    }
}
