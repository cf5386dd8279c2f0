//! Prelude module for the crate.
//!
//! You can use `use sm2chart::prelude::*;` to import the conversion types at once.

#[cfg(feature = "diagnostics")]
pub use crate::diagnostics::{
    SimpleSource, ToAriadne, collect_sm_reports, emit_convert_warnings, emit_sm_error,
    emit_sm_warnings,
};

pub use crate::{
    chart::{
        Chart, ChartDifficulty, ChartNote, NOTE_FRETS, NoteTrack, SongSection, SyncEvent,
    },
    convert::{ConvertConfig, ConvertError, ConvertOutput, ConvertWarning, convert_sm},
    mixin::{SourceRangeMixin, SourceRangeMixinExt},
    resolve::{Note, NoteGridResolver, NoteKind, ResolveError, TimedNote},
    sm::{
        LexOutput, LexWarning, LexWarningWithRange, Measure, NoteCode, NoteGrid, NotesBlock,
        ParseError, ParseErrorWithRange, ParseWarning, ParseWarningWithRange, Row, SmDifficulty,
        SmDocument, SmHeader, SmOutput, SmWarning, lex_sm, parse_sm,
    },
    timing::{
        DEFAULT_RESOLUTION, ResolvedOffset, StopPoint, StopPolicy, StopSchedule, SyncEntry,
        TempoPoint, TempoSchedule, TimingError, WarpRange, WarpRanges,
    },
};
