//! # Overview
//!
//! `midistat` walks a directory of Standard Midi Files (SMF) and reports, for every file, its
//! size, the declared track count, the pulses-per-quarter-note and the number of Note-On events.
//!
//! Parsing a single file is as simple as:
//!
//! ```rust,no_run
//! use midistat::Stat;
//!
//! let stat = Stat::from_path("midis/Song/v1.mid").unwrap();
//! println!("{} tracks, {} notes", stat.tracks, stat.notes);
//! ```
//!
//! Whole directory trees are handled by [`find_midis`](fn.find_midis.html) and
//! [`collect`](fn.collect.html):
//!
//! ```rust,no_run
//! use midistat::{collect, find_midis, MetaSkip};
//!
//! let midis = find_midis("midis", "mid").unwrap();
//! let report = collect(&midis, MetaSkip::Fixed).unwrap();
//! println!("{}", report.to_json().unwrap());
//! ```
//!
//! # About the parser
//!
//! The parser never builds an event list. Each track chunk is read into a buffer and a cursor
//! walks it, classifying each event just enough to know how many payload bytes to skip.
//! Only format 1 files are accepted and the header's division is reported raw.
//!
//! Meta events are skipped by a fixed size table by default (see [`MetaSkip`]).
//! Any status byte or meta type without a known payload size is reported as
//! [`Error::UnrecognizedEvent`] rather than guessed at.
//!
//! # Errors
//!
//! All parsing functions return [`Result`](type.Result.html). The first error aborts the file
//! being parsed, and [`collect`](fn.collect.html) aborts the whole batch on the first failing
//! file.

macro_rules! bail {
    ($err:expr) => {{
        return Err($err.into());
    }};
}
macro_rules! ensure {
    ($cond:expr, $err:expr) => {{
        if !$cond {
            bail!($err)
        }
    }};
}

/// All of the errors this crate produces.
#[macro_use]
mod error;

mod prelude {
    pub(crate) use crate::{
        error::{Error, Result, Unrecognized},
        primitive::{read_varlen, IntRead},
    };
    pub(crate) use std::{
        fs::File,
        io::{self, Read},
        path::{Path, PathBuf},
    };
}

mod batch;
pub mod config;
mod event;
mod primitive;
mod smf;
mod stat;

pub use crate::{
    batch::{collect, find_midis, midi_names, Report},
    config::{Config, ConfigError},
    error::{Error, Result, Unrecognized},
    event::{
        count_notes, ChannelMessage, Event, EventKind, MetaKind, MetaSkip, SystemCommon, TrackCursor,
    },
    primitive::{read_varlen, write_varlen},
    smf::{read_track, Header},
    stat::{byte_count_si, Stat},
};
