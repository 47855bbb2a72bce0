//! Event classification and the track scanner.
//!
//! Events are never decoded into values. Each one is classified just far enough to know how many
//! payload bytes follow its status byte, and the cursor jumps over them.

use crate::prelude::*;
use std::{fmt, str::FromStr};

/// How meta event payloads are skipped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaSkip {
    /// Skip each known meta type by a fixed amount, and text-like types by a varlen length.
    ///
    /// The fixed amounts count one byte past the declared payload of the standard encoding
    /// (for example `FF 51 03 tt tt tt` skips 5 bytes after the type). Files with a Tempo or Time
    /// Signature event followed by more events can therefore desynchronize, reading the rest of
    /// the track as stray data bytes. Unknown meta types are rejected.
    #[default]
    Fixed,
    /// Read every meta event as type, varlen length and payload, accepting any type.
    Declared,
}
impl FromStr for MetaSkip {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<MetaSkip, String> {
        match s {
            "fixed" => Ok(MetaSkip::Fixed),
            "declared" => Ok(MetaSkip::Declared),
            _ => Err(format!(
                "unknown meta skip policy \"{}\" (expected \"fixed\" or \"declared\")",
                s
            )),
        }
    }
}
impl fmt::Display for MetaSkip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            MetaSkip::Fixed => "fixed",
            MetaSkip::Declared => "declared",
        })
    }
}

/// A scanned track event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Event {
    /// How many MIDI ticks after the previous event this event fires.
    pub delta: u32,
    /// What kind of event it was.
    pub kind: EventKind,
}

/// The different kinds of SMF events, carrying only what is needed to skip their payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A channel voice or channel mode message (status `0x80..=0xEF`).
    Channel {
        /// The MIDI channel in the low nibble of the status.
        channel: u8,
        message: ChannelMessage,
    },
    /// A System Exclusive message (`0xF0`), followed by a varlen length and the data.
    SysEx,
    /// An escape sequence (`0xF7`), followed by a varlen length and the data.
    Escape,
    /// A system common or system realtime message.
    Common(SystemCommon),
    /// A meta event (`0xFF`).
    Meta(MetaKind),
    /// A data byte (`0x00..=0x7F`) found where a status byte was expected. Nothing is skipped.
    Stray(u8),
}

/// Channel messages, identified by the high nibble of their status byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChannelMessage {
    NoteOff,
    /// Counted as a note regardless of velocity, so a zero-velocity note-off counts too.
    NoteOn,
    PolyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
}
impl ChannelMessage {
    fn from_status(status: u8) -> Option<ChannelMessage> {
        Some(match status >> 4 {
            0x8 => ChannelMessage::NoteOff,
            0x9 => ChannelMessage::NoteOn,
            0xA => ChannelMessage::PolyPressure,
            0xB => ChannelMessage::ControlChange,
            0xC => ChannelMessage::ProgramChange,
            0xD => ChannelMessage::ChannelPressure,
            0xE => ChannelMessage::PitchBend,
            _ => return None,
        })
    }

    /// Amount of data bytes after the status.
    pub fn payload_len(self) -> usize {
        match self {
            ChannelMessage::ProgramChange | ChannelMessage::ChannelPressure => 1,
            _ => 2,
        }
    }
}

/// System common and realtime messages that may be skipped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SystemCommon {
    /// `0xF1`. Its data byte is not skipped.
    MtcQuarterFrame,
    /// `0xF2`, 2 data bytes.
    SongPosition,
    /// `0xF3`, 1 data byte.
    SongSelect,
    /// `0xF6`.
    TuneRequest,
    /// One of the defined realtime bytes `0xF8`, `0xFA`, `0xFB`, `0xFC` or `0xFE`.
    Realtime(u8),
}
impl SystemCommon {
    fn from_status(status: u8) -> Option<SystemCommon> {
        Some(match status {
            0xF1 => SystemCommon::MtcQuarterFrame,
            0xF2 => SystemCommon::SongPosition,
            0xF3 => SystemCommon::SongSelect,
            0xF6 => SystemCommon::TuneRequest,
            0xF8 | 0xFA | 0xFB | 0xFC | 0xFE => SystemCommon::Realtime(status),
            _ => return None,
        })
    }

    /// Amount of bytes skipped after the status.
    pub fn payload_len(self) -> usize {
        match self {
            SystemCommon::SongPosition => 2,
            SystemCommon::SongSelect => 1,
            _ => 0,
        }
    }
}

/// Meta event types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MetaKind {
    /// `0x00`.
    SequenceNumber,
    /// `0x01..=0x07` (text, copyright, track name, instrument, lyric, marker, cue point) and
    /// `0x7F` (sequencer specific), all carrying a varlen length. Holds the raw type byte.
    Text(u8),
    /// `0x20`.
    ChannelPrefix,
    /// `0x2F`. Terminates the track.
    EndOfTrack,
    /// `0x51`.
    Tempo,
    /// `0x54`.
    SmpteOffset,
    /// `0x58`.
    TimeSignature,
    /// `0x59`.
    KeySignature,
    /// Any other type. Only produced under [`MetaSkip::Declared`].
    Other(u8),
}
impl MetaKind {
    fn from_type(kind: u8) -> MetaKind {
        match kind {
            0x00 => MetaKind::SequenceNumber,
            0x01..=0x07 | 0x7F => MetaKind::Text(kind),
            0x20 => MetaKind::ChannelPrefix,
            0x2F => MetaKind::EndOfTrack,
            0x51 => MetaKind::Tempo,
            0x54 => MetaKind::SmpteOffset,
            0x58 => MetaKind::TimeSignature,
            0x59 => MetaKind::KeySignature,
            _ => MetaKind::Other(kind),
        }
    }

    /// Bytes skipped after the type byte under [`MetaSkip::Fixed`].
    ///
    /// `None` means a varlen length follows instead.
    fn fixed_skip(self) -> Option<usize> {
        match self {
            MetaKind::SequenceNumber | MetaKind::KeySignature => Some(4),
            MetaKind::ChannelPrefix => Some(3),
            MetaKind::EndOfTrack => Some(2),
            MetaKind::Tempo => Some(5),
            MetaKind::SmpteOffset => Some(7),
            MetaKind::TimeSignature => Some(6),
            MetaKind::Text(_) | MetaKind::Other(_) => None,
        }
    }
}

/// A cursor over a single track buffer, yielding one [`Event`] per step.
///
/// Iteration ends when the cursor reaches the end of the buffer, right after an End-of-Track meta
/// event, or after the first error.
/// Payload skips are not bounds checked: a skip that lands past the end simply ends iteration.
#[derive(Clone, Debug)]
pub struct TrackCursor<'a> {
    raw: &'a [u8],
    pos: usize,
    meta_skip: MetaSkip,
    done: bool,
}
impl<'a> TrackCursor<'a> {
    pub fn new(raw: &'a [u8], meta_skip: MetaSkip) -> TrackCursor<'a> {
        TrackCursor {
            raw,
            pos: 0,
            meta_skip,
            done: false,
        }
    }

    /// Current offset into the track buffer. May exceed the buffer length after a skip.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether iteration stopped at an End-of-Track event or an error, rather than running off
    /// the end of the buffer.
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn skip(&mut self, len: usize) {
        self.pos = self.pos.saturating_add(len);
    }

    fn skip_varlen(&mut self) -> Result<()> {
        let len = read_varlen(self.raw, &mut self.pos)?;
        self.skip(len as usize);
        Ok(())
    }

    fn read_event(&mut self) -> Result<Option<Event>> {
        let delta = read_varlen(self.raw, &mut self.pos)?;
        if self.pos >= self.raw.len() {
            return Ok(None);
        }
        let status_pos = self.pos;
        let status = self.raw[status_pos];
        self.pos += 1;
        let kind = match status {
            0x00..=0x7F => EventKind::Stray(status),
            0xF0 => {
                self.skip_varlen()?;
                EventKind::SysEx
            }
            0xF7 => {
                self.skip_varlen()?;
                EventKind::Escape
            }
            0xFF => EventKind::Meta(self.read_meta()?),
            _ => {
                if let Some(message) = ChannelMessage::from_status(status) {
                    self.skip(message.payload_len());
                    EventKind::Channel {
                        channel: status & 0x0F,
                        message,
                    }
                } else if let Some(common) = SystemCommon::from_status(status) {
                    self.skip(common.payload_len());
                    EventKind::Common(common)
                } else {
                    bail!(Error::UnrecognizedEvent(Unrecognized::Status {
                        status,
                        offset: status_pos,
                    }))
                }
            }
        };
        Ok(Some(Event { delta, kind }))
    }

    fn read_meta(&mut self) -> Result<MetaKind> {
        let type_pos = self.pos;
        let type_byte = *self
            .raw
            .get(type_pos)
            .ok_or(err_truncated!("failed to read meta event type"))?;
        self.pos += 1;
        let kind = MetaKind::from_type(type_byte);
        match self.meta_skip {
            MetaSkip::Fixed => match kind {
                MetaKind::Other(kind) => bail!(Error::UnrecognizedEvent(Unrecognized::Meta {
                    kind,
                    offset: type_pos,
                })),
                _ => match kind.fixed_skip() {
                    Some(len) => self.skip(len),
                    None => self.skip_varlen()?,
                },
            },
            MetaSkip::Declared => self.skip_varlen()?,
        }
        Ok(kind)
    }
}
impl<'a> Iterator for TrackCursor<'a> {
    type Item = Result<Event>;
    fn next(&mut self) -> Option<Result<Event>> {
        if self.done || self.pos >= self.raw.len() {
            return None;
        }
        match self.read_event() {
            Ok(Some(ev)) => {
                if ev.kind == EventKind::Meta(MetaKind::EndOfTrack) {
                    self.done = true;
                }
                Some(Ok(ev))
            }
            Ok(None) => None,
            Err(err) => {
                //Never resume from the middle of a broken event
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Count the Note-On events in a track buffer.
pub fn count_notes(raw: &[u8], meta_skip: MetaSkip) -> Result<u64> {
    let mut notes = 0;
    for ev in TrackCursor::new(raw, meta_skip) {
        if let EventKind::Channel {
            message: ChannelMessage::NoteOn,
            ..
        } = ev?.kind
        {
            notes += 1;
        }
    }
    Ok(notes)
}
