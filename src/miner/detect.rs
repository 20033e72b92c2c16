// src/miner/detect.rs
//! Backend classification
//!
//! Looks at the executables in the installation's miner directory and
//! decides which driver can run them.

use crate::types::BackendKind;
use crate::utils::error::MinerError;
use std::fs;
use std::path::{Path, PathBuf};

const KNOWN_KINDS: [BackendKind; 2] = [BackendKind::Xmrig, BackendKind::XmrStak];

/// Finds the first supported miner executable in `dir`
///
/// Entries are inspected in file name order so the result is stable when
/// several executables are bundled.
///
/// # Returns
/// * `Ok((kind, path))` - The driver kind and the executable's full path
/// * `Err(MinerError::Detection)` - Directory unreadable or no known executable
pub fn detect_backend_kind(dir: &Path) -> Result<(BackendKind, PathBuf), MinerError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        MinerError::Detection(format!("cannot read {}: {}", dir.display(), e))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    files
        .into_iter()
        .find_map(|path| classify(&path).map(|kind| (kind, path)))
        .ok_or_else(|| {
            MinerError::Detection(format!("no supported miner found in {}", dir.display()))
        })
}

/// Maps an executable path to a backend kind
///
/// Only extension-less files and `.exe` files are considered, so generated
/// configuration files next to the executable never match.
fn classify(path: &Path) -> Option<BackendKind> {
    match path.extension().and_then(|ext| ext.to_str()) {
        None => {}
        Some(ext) if ext.eq_ignore_ascii_case("exe") => {}
        Some(_) => return None,
    }

    let stem = path.file_stem()?.to_str()?.to_lowercase();
    KNOWN_KINDS
        .into_iter()
        .find(|kind| kind.executable_stem() == stem)
}
