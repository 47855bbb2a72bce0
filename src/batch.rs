//! Discovering MIDI files and gathering their statistics into a single report.

use crate::{event::MetaSkip, prelude::*, stat::Stat};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, ffi::OsStr, fs};
use tracing::{error, info};
use walkdir::WalkDir;

/// Statistics for a batch of files, keyed by MIDI name and then by version name.
///
/// A MIDI name is the directory holding the file, a version name is the file name without its
/// `.mid` suffix, so `midis/Song/v1.mid` lands at `["Song"]["v1"]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    pub midis: BTreeMap<String, BTreeMap<String, Stat>>,
}
impl Report {
    pub fn new() -> Report {
        Report::default()
    }

    /// Store a stat, replacing any previous stat under the same names.
    pub fn insert(&mut self, midi: String, version: String, stat: Stat) -> Option<Stat> {
        self.midis.entry(midi).or_default().insert(version, stat)
    }

    pub fn get(&self, midi: &str, version: &str) -> Option<&Stat> {
        self.midis.get(midi)?.get(version)
    }

    /// Total amount of files in the report.
    pub fn len(&self) -> usize {
        self.midis.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report as JSON to `path`, replacing it if it exists.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fn save_impl(report: &Report, path: &Path) -> io::Result<()> {
            fs::write(path, report.to_json()?)?;
            info!("Saved midi info to {}", path.display());
            Ok(())
        }
        save_impl(self, path.as_ref())
    }
}

/// Recursively list every file under `root` with the given extension (without the dot).
///
/// Symlinks are listed but not followed. Paths are returned in file name order within each directory, so batches are deterministic.
pub fn find_midis<P: AsRef<Path>>(root: P, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut midis = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.into_path();
        if path.extension() == Some(OsStr::new(extension)) {
            info!("Found MIDI: {}", path.display());
            midis.push(path);
        }
    }
    Ok(midis)
}

/// Split a path into its MIDI name (parent directory) and version name (file name minus `.mid`).
pub fn midi_names(path: &Path) -> (String, String) {
    let midi = path
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let version = match file_name.strip_suffix(".mid") {
        Some(stem) => stem.to_string(),
        None => file_name,
    };
    (midi, version)
}

/// Gather the statistics of every file, in order.
///
/// The first file that fails aborts the batch: its error is returned as-is and the stats already
/// gathered are dropped.
pub fn collect<I, P>(paths: I, meta_skip: MetaSkip) -> Result<Report>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut report = Report::new();
    for path in paths {
        let path = path.as_ref();
        let (midi, version) = midi_names(path);
        let stat = match Stat::from_path_with(path, meta_skip) {
            Ok(stat) => stat,
            Err(err) => {
                error!(path = %path.display(), "failed to parse midi: {}", err);
                return Err(err);
            }
        };
        report.insert(midi, version, stat);
    }
    Ok(report)
}
