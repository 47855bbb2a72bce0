//! Specific to the SMF chunk packaging: the header chunk and the track chunks that follow it.

use crate::{
    event::{count_notes, MetaSkip},
    prelude::*,
    primitive::read_array,
};
use tracing::debug;

/// The only SMF format accepted: several tracks played simultaneously.
pub const SUPPORTED_FORMAT: u16 = 1;

/// A decoded `MThd` chunk.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct Header {
    /// How many `MTrk` chunks should follow the header.
    pub track_count: u16,
    /// The raw division field, reported as PPQN.
    ///
    /// No distinction is made between metrical and timecode divisions.
    pub division: u16,
}
impl Header {
    pub fn new(track_count: u16, division: u16) -> Header {
        Header {
            track_count,
            division,
        }
    }

    /// Read and validate the header chunk from a source positioned at the start of the file.
    pub fn read<R: Read>(src: &mut R) -> Result<Header> {
        let id: [u8; 4] = read_array(src, "failed to read header chunk id")?;
        ensure!(&id == b"MThd", err_invalid!("file does not start with an MThd chunk"));
        let len = u32::read(src)?;
        ensure!(len == 6, err_invalid!("header chunk length is not 6"));
        let format = u16::read(src)?;
        ensure!(format == SUPPORTED_FORMAT, Error::UnsupportedFormat(format));
        let track_count = u16::read(src)?;
        let division = u16::read(src)?;
        debug!(track_count, division, "parsed header");
        Ok(Header::new(track_count, division))
    }
}

/// Read one `MTrk` chunk and count the notes in it.
///
/// The chunk data is read in full before scanning, so a chunk that declares more bytes than the
/// source holds fails with `Truncated` even if its End-of-Track event comes early.
pub fn read_track<R: Read>(src: &mut R, index: u16, meta_skip: MetaSkip) -> Result<u64> {
    let id: [u8; 4] = read_array(src, "failed to read track chunk id")?;
    ensure!(&id == b"MTrk", err_invalid!("expected an MTrk chunk"));
    let len = u32::read(src)?;
    let mut data = Vec::new();
    src.by_ref().take(len as u64).read_to_end(&mut data)?;
    ensure!(
        data.len() == len as usize,
        err_truncated!("reached eof before track chunk ended")
    );
    let notes = count_notes(&data, meta_skip)?;
    debug!(track = index, len, notes, "scanned track");
    Ok(notes)
}

/// Read the header and every declared track, returning the header and the total note count.
pub(crate) fn scan<R: Read>(src: &mut R, meta_skip: MetaSkip) -> Result<(Header, u64)> {
    let header = Header::read(src)?;
    let mut notes = 0;
    for index in 0..header.track_count {
        notes += read_track(src, index, meta_skip)?;
    }
    Ok((header, notes))
}
