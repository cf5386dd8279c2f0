//! Writing [`Chart`] as `.chart` text.

use std::fmt::{self, Display};

use super::{Chart, ChartNote, NoteTrack, SongSection, SyncEvent};

/// Fret of the forced-note marker written with every note.
const FORCED_MARKER: usize = super::NOTE_FRETS;
/// Fret of the tap-note marker written with every note.
const TAP_MARKER: usize = 6;

impl Chart {
    /// Writes the document as `.chart` text.
    ///
    /// Sections come in the order `[Song]`, `[SyncTrack]`, `[Events]`, then the note tracks as stored.
    #[must_use]
    pub fn unparse(&self) -> String {
        self.to_string()
    }
}

impl Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section(f, "Song", |f| self.song.fmt(f))?;
        section(f, "SyncTrack", |f| {
            self.sync_track.iter().try_for_each(|event| writeln!(f, "  {event}"))
        })?;
        section(f, "Events", |_| Ok(()))?;
        self.tracks.iter().try_for_each(|track| track.fmt(f))
    }
}

fn section(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    body: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    writeln!(f, "[{name}]")?;
    writeln!(f, "{{")?;
    body(f)?;
    writeln!(f, "}}")
}

fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    out.extend(text.chars().filter(|&c| c != '"'));
    out.push('"');
    out
}

impl Display for SongSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Name = {}", quoted(&self.name))?;
        if let Some(artist) = &self.artist {
            writeln!(f, "  Artist = {}", quoted(artist))?;
        }
        if let Some(charter) = &self.charter {
            writeln!(f, "  Charter = {}", quoted(charter))?;
        }
        if let Some(genre) = &self.genre {
            writeln!(f, "  Genre = {}", quoted(genre))?;
        }
        writeln!(f, "  Offset = {}", self.offset)?;
        writeln!(f, "  Resolution = {}", self.resolution)?;
        writeln!(f, "  PreviewStart = {}", self.preview_start)?;
        writeln!(f, "  PreviewEnd = {}", self.preview_end)?;
        if let Some(music) = &self.music_stream {
            writeln!(f, "  MusicStream = {}", quoted(music))?;
        }
        Ok(())
    }
}

impl Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeSignature { tick, numerator } => write!(f, "{tick} = TS {numerator}"),
            Self::Tempo { tick, millibpm } => write!(f, "{tick} = B {millibpm}"),
        }
    }
}

impl Display for NoteTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section(f, self.difficulty.section_name(), |f| {
            self.notes.iter().try_for_each(|note| note.fmt(f))
        })
    }
}

impl Display for ChartNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { tick, fret, sustain } = self;
        writeln!(f, "  {tick} = N {fret} {sustain}")?;
        writeln!(f, "  {tick} = N {FORCED_MARKER} 0")?;
        writeln!(f, "  {tick} = N {TAP_MARKER} 0")
    }
}
