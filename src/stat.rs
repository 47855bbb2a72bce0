//! Per-file statistics.

use crate::{event::MetaSkip, prelude::*, smf};
use serde::{Deserialize, Serialize};
use std::io::BufReader;
use tracing::debug;

/// Statistics gathered from a single MIDI file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stat {
    /// Size of the file on disk, as formatted by [`byte_count_si`].
    pub file_size: String,
    /// Track count declared in the header.
    pub tracks: u16,
    /// The header's division field.
    pub ppqn: u16,
    /// Note-On events across all tracks.
    pub notes: u64,
}
impl Stat {
    /// Open the file at `path` and gather its statistics.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Stat> {
        Stat::from_path_with(path, MetaSkip::default())
    }

    /// Like [`Stat::from_path`], with an explicit meta skip policy.
    pub fn from_path_with<P: AsRef<Path>>(path: P, meta_skip: MetaSkip) -> Result<Stat> {
        fn from_path_impl(path: &Path, meta_skip: MetaSkip) -> Result<Stat> {
            debug!(path = %path.display(), "parsing midi");
            let file = File::open(path)?;
            let size = file.metadata()?.len();
            Stat::read(&mut BufReader::new(file), size, meta_skip)
        }
        from_path_impl(path.as_ref(), meta_skip)
    }

    /// Gather statistics from a byte source positioned at the start of an SMF file.
    ///
    /// `size` is only used to fill in `file_size`.
    pub fn read<R: Read>(src: &mut R, size: u64, meta_skip: MetaSkip) -> Result<Stat> {
        let (header, notes) = smf::scan(src, meta_skip)?;
        debug!(notes, "parsed tracks for notes");
        Ok(Stat {
            file_size: byte_count_si(size),
            tracks: header.track_count,
            ppqn: header.division,
            notes,
        })
    }
}

/// Format a byte count with decimal (base 1000) units, e.g. `1.5 kB`.
///
/// Counts under 1000 are printed exactly, everything else with one decimal.
pub fn byte_count_si(bytes: u64) -> String {
    const UNIT: u64 = 1000;
    const PREFIXES: [char; 6] = ['k', 'M', 'G', 'T', 'P', 'E'];
    if bytes < UNIT {
        return format!("{} B", bytes);
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}B", bytes as f64 / div as f64, PREFIXES[exp])
}
