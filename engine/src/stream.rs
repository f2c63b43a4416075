//! Cursor-based reader over the unparsed text of a command invocation.
//!
//! A [`TokenStream`] is created once per invocation from the text following
//! the matched prefix and command name, mutated by every parameter
//! resolution, and discarded once the command body starts executing. The
//! cursor can be rewound by a byte count, which is how converters hand
//! unconsumed text back to the next parameter.

use std::borrow::Cow;

/// Cursor over the raw invocation text.
///
/// The cursor is a byte offset into the source and always sits on a
/// character boundary. It never exceeds the source length and rewinding
/// never moves it below zero.
///
/// # Examples
///
/// ```
/// use chat_command_engine::TokenStream;
///
/// let mut stream = TokenStream::new("ban  \"Gray Mouser\" spamming");
/// assert_eq!(stream.read_word(), "ban");
/// stream.skip_whitespace();
/// assert_eq!(stream.read_word(), "Gray Mouser");
/// stream.skip_whitespace();
/// assert_eq!(stream.read_rest(), "spamming");
/// assert!(stream.at_end());
/// ```
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> TokenStream<'a> {
    /// Creates a stream positioned at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self { source, offset: 0 }
    }

    /// The full source text the stream was created over.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Current cursor offset in bytes.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Unconsumed text from the cursor to end-of-input, without advancing.
    pub fn remaining(&self) -> &'a str {
        &self.source[self.offset..]
    }

    /// Whether the cursor has reached end-of-input.
    pub fn at_end(&self) -> bool {
        self.offset == self.source.len()
    }

    /// Advances the cursor past consecutive whitespace.
    ///
    /// No-op at end-of-input; never errors.
    pub fn skip_whitespace(&mut self) {
        let rest = self.remaining();
        let trimmed = rest.trim_start();
        self.offset += rest.len() - trimmed.len();
    }

    /// Reads one word from the cursor.
    ///
    /// At a quote character (`"` or `'`) the word runs to the matching
    /// unescaped closing quote; a backslash escapes the quote character
    /// inside. The returned text has the quotes stripped and escapes
    /// resolved, and the cursor lands just past the closing quote. An
    /// unterminated quote consumes to end-of-input.
    ///
    /// Otherwise the word runs to the next whitespace or end-of-input.
    ///
    /// Leading whitespace is not skipped; callers call
    /// [`skip_whitespace`](TokenStream::skip_whitespace) first.
    ///
    /// # Examples
    ///
    /// ```
    /// use chat_command_engine::TokenStream;
    ///
    /// let mut stream = TokenStream::new("\"a b c\" next");
    /// assert_eq!(stream.read_word(), "a b c");
    /// assert_eq!(stream.remaining(), " next");
    /// ```
    pub fn read_word(&mut self) -> Cow<'a, str> {
        let rest = self.remaining();
        match rest.chars().next() {
            None => Cow::Borrowed(""),
            Some(quote @ ('"' | '\'')) => self.read_quoted(quote),
            Some(_) => {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                self.offset += end;
                Cow::Borrowed(&rest[..end])
            }
        }
    }

    fn read_quoted(&mut self, quote: char) -> Cow<'a, str> {
        let content_start = self.offset + quote.len_utf8();
        let rest = &self.source[content_start..];
        // Only allocate when an escape actually occurs.
        let mut unescaped: Option<String> = None;
        let mut segment_start = 0;

        let mut iter = rest.char_indices().peekable();
        while let Some((i, ch)) = iter.next() {
            if ch == '\\' {
                if let Some(&(j, next)) = iter.peek() {
                    if next == quote {
                        let buf = unescaped.get_or_insert_with(String::new);
                        buf.push_str(&rest[segment_start..i]);
                        buf.push(quote);
                        iter.next();
                        segment_start = j + quote.len_utf8();
                    }
                }
            } else if ch == quote {
                self.offset = content_start + i + quote.len_utf8();
                return match unescaped {
                    None => Cow::Borrowed(&rest[..i]),
                    Some(mut buf) => {
                        buf.push_str(&rest[segment_start..i]);
                        Cow::Owned(buf)
                    }
                };
            }
        }

        // Unterminated quote: consume everything after the opening quote.
        self.offset = self.source.len();
        match unescaped {
            None => Cow::Borrowed(rest),
            Some(mut buf) => {
                buf.push_str(&rest[segment_start..]);
                Cow::Owned(buf)
            }
        }
    }

    /// Reads all remaining text verbatim, advancing the cursor to
    /// end-of-input.
    pub fn read_rest(&mut self) -> &'a str {
        let rest = self.remaining();
        self.offset = self.source.len();
        rest
    }

    /// Moves the cursor back by `n` bytes.
    ///
    /// Callers must only rewind over text previously read from this exact
    /// stream.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the bytes consumed since stream creation, or
    /// if the resulting offset would split a character.
    pub fn rewind(&mut self, n: usize) {
        assert!(
            n <= self.offset,
            "rewind of {n} bytes exceeds {} consumed",
            self.offset
        );
        let target = self.offset - n;
        assert!(
            self.source.is_char_boundary(target),
            "rewind target {target} is not a character boundary"
        );
        self.offset = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_word_stops_at_whitespace() {
        let mut stream = TokenStream::new("hello world");
        assert_eq!(stream.read_word(), "hello");
        assert_eq!(stream.remaining(), " world");
    }

    #[test]
    fn test_read_word_strips_quotes_and_consumes_closing_quote() {
        let mut stream = TokenStream::new("\"a b c\" tail");
        assert_eq!(stream.read_word(), "a b c");
        assert_eq!(stream.offset(), "\"a b c\"".len());
        stream.skip_whitespace();
        assert_eq!(stream.read_word(), "tail");
    }

    #[test]
    fn test_read_word_resolves_escaped_quotes() {
        let mut stream = TokenStream::new(r#""say \"hi\"" rest"#);
        assert_eq!(stream.read_word(), "say \"hi\"");
        assert_eq!(stream.remaining(), " rest");
    }

    #[test]
    fn test_read_word_single_quotes() {
        let mut stream = TokenStream::new("'one two' three");
        assert_eq!(stream.read_word(), "one two");
        assert_eq!(stream.remaining(), " three");
    }

    #[test]
    fn test_unterminated_quote_reads_to_end() {
        let mut stream = TokenStream::new("\"never closed");
        assert_eq!(stream.read_word(), "never closed");
        assert!(stream.at_end());
    }

    #[test]
    fn test_read_rest_is_verbatim() {
        let mut stream = TokenStream::new("front  \"mid\"  back ");
        assert_eq!(stream.read_word(), "front");
        stream.skip_whitespace();
        assert_eq!(stream.read_rest(), "\"mid\"  back ");
        assert!(stream.at_end());
    }

    #[test]
    fn test_skip_whitespace_is_noop_at_end() {
        let mut stream = TokenStream::new("x");
        stream.read_word();
        stream.skip_whitespace();
        assert!(stream.at_end());
    }

    #[test]
    fn test_rewind_re_exposes_consumed_text() {
        let mut stream = TokenStream::new("alpha beta");
        let word = stream.read_word();
        stream.rewind(word.len());
        assert_eq!(stream.read_word(), "alpha");
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn test_rewind_past_start_panics() {
        let mut stream = TokenStream::new("ab");
        stream.read_word();
        stream.rewind(3);
    }

    #[test]
    fn test_cursor_stays_on_char_boundaries_with_multibyte_input() {
        let mut stream = TokenStream::new("héllo wörld");
        assert_eq!(stream.read_word(), "héllo");
        stream.skip_whitespace();
        let word = stream.read_word();
        assert_eq!(word, "wörld");
        stream.rewind(word.len());
        assert_eq!(stream.read_word(), "wörld");
    }
}
