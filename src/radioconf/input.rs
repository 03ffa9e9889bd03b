use super::{ConfError, RADIOCONF_EXT};
use std::fs;
use std::path::{Path, PathBuf};

/// The `.radioconf` file chosen among the command line inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: PathBuf,
    /// Other candidates, in order, not used.
    pub ignored: Vec<PathBuf>,
}

fn is_radioconf(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case(RADIOCONF_EXT))
}

/// Collects `.radioconf` files from `inputs` (files, or directories scanned
/// one level deep) and picks the lexicographically first.
pub fn find_radioconf<P: AsRef<Path>>(inputs: &[P]) -> Result<Resolved, ConfError> {
    let mut found = vec![];
    for input in inputs {
        let input = input.as_ref();
        if !input.exists() {
            return Err(ConfError::MissingPath(input.to_path_buf()));
        }
        if input.is_dir() {
            let entries = fs::read_dir(input).map_err(|e| ConfError::Io(input.to_path_buf(), e))?;
            for entry in entries {
                let path = entry.map_err(|e| ConfError::Io(input.to_path_buf(), e))?.path();
                if is_radioconf(&path) {
                    found.push(path);
                }
            }
        } else if is_radioconf(input) {
            found.push(input.to_path_buf());
        } else {
            tracing::warn!(target: "radioconf", "skip {}, not a .{} file", input.display(), RADIOCONF_EXT);
        }
    }
    found.sort();
    found.dedup();
    let mut found = found.into_iter();
    match found.next() {
        Some(path) => {
            let ignored = found.collect::<Vec<_>>();
            if !ignored.is_empty() {
                tracing::warn!(target: "radioconf", "{} .{} files found, using {}", ignored.len() + 1, RADIOCONF_EXT, path.display());
            }
            Ok(Resolved { path, ignored })
        }
        None => Err(ConfError::NoInput),
    }
}
