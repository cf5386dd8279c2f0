//! Converter from StepMania `.sm` simfiles into the tick-indexed `.chart` format.
//!
//! The conversion runs in three phases:
//!
//! - [`sm`] reads the `.sm` text into an [`sm::SmDocument`]: metadata, the tempo map, the stop map and one [`sm::NoteGrid`] per `#NOTES` block.
//! - [`timing`] and [`resolve`] turn beats into ticks. [`timing::TempoSchedule`] places beats onto ticks, [`timing::StopSchedule`] inserts the pauses, [`timing::WarpRanges`] drops notes in rewound sections, and [`resolve::NoteGridResolver`] pairs hold heads with their tails.
//! - [`convert`] ties them together and produces a [`chart::Chart`], which [`chart`] can write as `.chart` text.
//!
//! # Example
//!
//! ```
//! use sm2chart::{convert::{ConvertConfig, convert_sm}, sm::parse_sm};
//!
//! let source = "\
//! #TITLE:Example;
//! #OFFSET:0;
//! #SAMPLESTART:10;
//! #SAMPLELENGTH:15;
//! #BPMS:0=120;
//! #NOTES:dance-single::Hard:8::
//! 2000
//! 0000
//! 0000
//! 0000
//! ,
//! 3000
//! 0000
//! 0000
//! 0000
//! ;
//! ";
//! let document = parse_sm(source).document.expect("valid simfile");
//! let output = convert_sm(&document, &ConvertConfig::default()).expect("convertible");
//! let track = &output.chart.tracks[0];
//! assert_eq!(track.notes[0].tick, 0);
//! assert_eq!(track.notes[0].sustain, 768);
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod chart;
pub mod convert;
#[cfg(feature = "diagnostics")]
pub mod diagnostics;
pub mod mixin;
pub mod prelude;
pub mod resolve;
pub mod sm;
pub mod timing;
pub mod util;
