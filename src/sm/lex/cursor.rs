use std::ops::Range;

/// Reads the simfile source from front to back.
///
/// All the delimiters searched here (`#`, `:`, `;`, `/` and line feed) are ASCII, so any index found by byte search
/// is a char boundary.
pub(crate) struct Cursor<'a> {
    /// The byte index of the next unread char.
    index: usize,
    /// The source str.
    source: &'a str,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let index = if source.starts_with('\u{feff}') {
            '\u{feff}'.len_utf8()
        } else {
            0
        };
        Self { index, source }
    }

    pub(crate) const fn index(&self) -> usize {
        self.index
    }

    fn rest(&self) -> &'a str {
        self.source.get(self.index..).unwrap_or_default()
    }

    pub(crate) fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.index += c.len_utf8();
        Some(c)
    }

    /// Skips whitespaces and `//` comments.
    pub(crate) fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.index += rest.len() - trimmed.len();
            if trimmed.starts_with("//") {
                self.index += trimmed.find('\n').unwrap_or(trimmed.len());
            } else {
                break;
            }
        }
    }

    /// Moves through a tag name until `:`. Returns `None` if the line or the tag ends first, leaving the cursor on
    /// the next line.
    pub(crate) fn take_name(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let stop = rest.find([':', ';', '\n']).unwrap_or(rest.len());
        let name = rest.get(..stop).unwrap_or(rest);
        self.index += stop;
        match self.bump() {
            Some(':') => Some(name),
            _ => None,
        }
    }

    /// Moves through a tag value. Returns the value range and whether `;` closed it.
    ///
    /// A value without `;` ends before the next line starting with `#`, or at the end of the source.
    pub(crate) fn take_value(&mut self) -> (Range<usize>, bool) {
        let bytes = self.source.as_bytes();
        let start = self.index;
        let mut i = start;
        while let Some(&byte) = bytes.get(i) {
            match byte {
                b';' => {
                    self.index = i + 1;
                    return (start..i, true);
                }
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    i = self
                        .source
                        .get(i..)
                        .and_then(|rest| rest.find('\n'))
                        .map_or(bytes.len(), |end| i + end);
                }
                b'\n' => {
                    let next_line = self
                        .source
                        .get(i + 1..)
                        .unwrap_or_default()
                        .trim_start_matches([' ', '\t', '\r']);
                    if next_line.starts_with('#') {
                        self.index = i + 1;
                        return (start..i, false);
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }
        self.index = bytes.len();
        (start..bytes.len(), false)
    }

    /// Moves through text outside of any tag, until the line ends or a tag starts. The cursor must not be on `#` or
    /// a line feed.
    pub(crate) fn take_stray(&mut self) -> &'a str {
        let rest = self.rest();
        let stop = rest.find(['\n', '#']).unwrap_or(rest.len());
        self.index += stop;
        rest.get(..stop).unwrap_or(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::Cursor;

    #[test]
    fn trivia_skips_comments_and_bom() {
        let mut cursor = Cursor::new("\u{feff}  // note\n\t#TITLE:x;");
        cursor.skip_trivia();
        assert_eq!(cursor.peek_char(), Some('#'));
    }

    #[test]
    fn value_ignores_semicolon_in_comment() {
        let source = "#BPMS:0=120 // a;b\n,4=60;rest";
        let mut cursor = Cursor::new(source);
        assert_eq!(cursor.bump(), Some('#'));
        assert_eq!(cursor.take_name(), Some("BPMS"));
        let (range, terminated) = cursor.take_value();
        assert!(terminated);
        assert_eq!(&source[range], "0=120 // a;b\n,4=60");
        assert_eq!(cursor.take_stray(), "rest");
    }

    #[test]
    fn value_without_semicolon_stops_before_next_tag() {
        let source = "#TITLE:Song\n#ARTIST:Someone;";
        let mut cursor = Cursor::new(source);
        cursor.bump();
        assert_eq!(cursor.take_name(), Some("TITLE"));
        let (range, terminated) = cursor.take_value();
        assert!(!terminated);
        assert_eq!(&source[range], "Song");
        cursor.skip_trivia();
        assert_eq!(cursor.peek_char(), Some('#'));
    }

    #[test]
    fn name_without_colon_is_rejected() {
        let mut cursor = Cursor::new("#BROKEN;\n#TITLE:x;");
        cursor.bump();
        assert_eq!(cursor.take_name(), None);
        cursor.skip_trivia();
        assert_eq!(cursor.bump(), Some('#'));
    }

    #[test]
    fn unterminated_value_with_comment_runs_to_end() {
        let source = "#TITLE:Sóng // no newline;";
        let mut cursor = Cursor::new(source);
        cursor.bump();
        assert_eq!(cursor.take_name(), Some("TITLE"));
        let (range, terminated) = cursor.take_value();
        assert!(!terminated);
        assert_eq!(range, 7..source.len());
        assert_eq!(cursor.peek_char(), None);
        assert_eq!(cursor.take_stray(), "");
    }
}
