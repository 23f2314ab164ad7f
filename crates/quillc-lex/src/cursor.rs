//! Character cursor for traversing source code.
//!
//! Maintains position state while iterating through source code characters.
//! Tracks line/column information purely for attaching [`quillc_util::Span`]s
//! to tokens later on; the lexer itself never consults these for control
//! flow decisions.

pub struct Cursor<'a> {
    source: &'a str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Character at the current position, or `'\0'` past the end.
    pub fn current_char(&self) -> char {
        self.source[self.position..].chars().next().unwrap_or('\0')
    }

    /// Character `offset` positions ahead of the current one, or `'\0'`.
    pub fn peek_char(&self, offset: usize) -> char {
        self.source[self.position..]
            .chars()
            .nth(offset)
            .unwrap_or('\0')
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Advances past the current character, updating line/column.
    pub fn advance(&mut self) {
        if self.is_at_end() {
            return;
        }
        let c = self.current_char();
        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Slice of source from `start` up to (not including) the current position.
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.position]
    }

    pub fn source(&self) -> &'a str {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_through_ascii() {
        let mut c = Cursor::new("ab");
        assert_eq!(c.current_char(), 'a');
        c.advance();
        assert_eq!(c.current_char(), 'b');
        c.advance();
        assert!(c.is_at_end());
    }

    #[test]
    fn tracks_line_and_column_across_newlines() {
        let mut c = Cursor::new("a\nb");
        assert_eq!((c.line(), c.column()), (1, 1));
        c.advance(); // 'a'
        assert_eq!((c.line(), c.column()), (1, 2));
        c.advance(); // '\n'
        assert_eq!((c.line(), c.column()), (2, 1));
    }

    #[test]
    fn handles_multibyte_utf8() {
        let mut c = Cursor::new("é!");
        assert_eq!(c.current_char(), 'é');
        c.advance();
        assert_eq!(c.current_char(), '!');
    }
}
