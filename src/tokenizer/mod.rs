//! HTML5 tokenizer
//!
//! The tokenizer partitions a UTF-8 byte stream into tokens. It keeps the
//! bytes of the current token in a growable buffer and works with spans
//! (start/end offsets) into that buffer: `raw` delimits all bytes of the
//! token, `data` the semantic payload (tag name, text, comment body), and the
//! attribute spans the not-yet-materialized key/value pairs. Nothing is
//! copied or unescaped until an accessor asks for it.
//!
//! Concatenating [`Tokenizer::raw`] over all emitted tokens, including the
//! terminal Error token, plus [`Tokenizer::buffered`] reproduces the input
//! byte for byte.

pub mod token;

use std::io::Read;

use crate::atom::Atom;
use crate::entity;
use crate::errors::Error;
use crate::tokenizer::token::{Attribute, Token, TokenKind};

/// How often a reader may return `ErrorKind::Interrupted` in a row before the
/// tokenizer gives up with [`Error::NoProgress`].
const MAX_ZERO_READS: usize = 100;

/// A half-open `[start, end)` window into the tokenizer buffer.
#[derive(Debug, Default, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
}

/// Sub-states for the script-data escape dance (`<script><!-- ... --></script>`).
enum ScriptState {
    Data,
    LessThanSign,
    EndTagOpen,
    EscapeStart,
    EscapeStartDash,
    Escaped,
    EscapedDash,
    EscapedDashDash,
    EscapedLessThanSign,
    EscapedEndTagOpen,
    DoubleEscapeStart,
    DoubleEscaped,
    DoubleEscapedDash,
    DoubleEscapedDashDash,
    DoubleEscapedLessThanSign,
    DoubleEscapeEnd,
}

/// The tokenizer reads the input stream and emits tokens that can be used by
/// the parser.
pub struct Tokenizer<R: Read> {
    reader: R,
    /// Buffer holding `buffered data | current token | lookahead`
    buf: Vec<u8>,
    /// Kind of the most recent token
    kind: TokenKind,
    /// Sticky error; once set, next() keeps returning Error tokens
    err: Option<Error>,
    /// All bytes of the current token
    raw: Span,
    /// Payload of the current token (tag name, text, comment body)
    data: Span,
    /// Key and value spans of the attribute being scanned
    pending_attr: [Span; 2],
    /// Completed attribute span pairs of the current tag
    attrs: Vec<[Span; 2]>,
    n_attr_returned: usize,
    /// Lowercased name of the raw-text element we are inside, or empty
    raw_tag: String,
    /// True when the current text token should not be unescaped
    text_is_raw: bool,
    /// True when NUL bytes in the current token convert to U+FFFD
    convert_nul: bool,
    /// CDATA sections are only recognized in foreign content
    allow_cdata: bool,
    /// Upper bound on the live buffer window; 0 means unbounded
    max_buf: usize,
}

impl<R: Read> Tokenizer<R> {
    /// Creates a tokenizer over the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(4096),
            kind: TokenKind::Error,
            err: None,
            raw: Span::default(),
            data: Span::default(),
            pending_attr: [Span::default(); 2],
            attrs: Vec::new(),
            n_attr_returned: 0,
            raw_tag: String::new(),
            text_is_raw: false,
            convert_nul: false,
            allow_cdata: false,
            max_buf: 0,
        }
    }

    /// Creates a tokenizer for a fragment whose context element is named
    /// `context_tag`. If the context element is a raw-text element, the
    /// tokenizer starts out in the matching raw-text mode.
    pub fn new_fragment(reader: R, context_tag: &str) -> Self {
        let mut tokenizer = Self::new(reader);
        match context_tag.to_ascii_lowercase().as_str() {
            tag @ ("iframe" | "noembed" | "noframes" | "noscript" | "plaintext" | "script"
            | "style" | "title" | "textarea" | "xmp") => {
                tokenizer.raw_tag = tag.to_string();
            }
            _ => {}
        }
        tokenizer
    }

    /// Caps the live buffer window at `n` bytes. A single token larger than
    /// the cap fails the tokenizer with [`Error::BufferExceeded`]. 0 removes
    /// the cap.
    pub fn set_max_buf(&mut self, n: usize) {
        self.max_buf = n;
    }

    /// Enables or disables recognition of `<![CDATA[ ... ]]>` sections.
    /// CDATA is only valid in foreign (MathML/SVG) content.
    pub fn set_allow_cdata(&mut self, allow: bool) {
        self.allow_cdata = allow;
    }

    /// Instructs the tokenizer that the next token should be read without the
    /// raw-text mode the previous start tag switched on. The parser uses this
    /// for `<noscript>` without scripting and for foreign content.
    pub fn next_is_not_raw_text(&mut self) {
        self.raw_tag.clear();
    }

    /// The error that stopped the tokenizer, if any. [`Error::Eof`] is the
    /// normal end of input.
    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Takes the stopping error, leaving the tokenizer in the errored state.
    pub fn take_err(&mut self) -> Option<Error> {
        match self.err {
            None => None,
            Some(_) => self.err.replace(Error::Eof),
        }
    }

    /// Kind of the most recently read token.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The unmodified bytes of the current token. Valid until the next call
    /// to [`Tokenizer::next`].
    pub fn raw(&self) -> &[u8] {
        &self.buf[self.raw.start..self.raw.end]
    }

    /// Bytes that have been read from the reader but not yet tokenized.
    pub fn buffered(&self) -> &[u8] {
        &self.buf[self.raw.end..]
    }

    /// Reads one byte, refilling the buffer from the reader as needed. On any
    /// failure the sticky error is set and 0 is returned; callers check
    /// `self.err` rather than the byte.
    fn read_byte(&mut self) -> u8 {
        if self.raw.end >= self.buf.len() && !self.refill() {
            return 0;
        }

        let x = self.buf[self.raw.end];
        self.raw.end += 1;
        if self.max_buf > 0 && self.raw.end - self.raw.start >= self.max_buf {
            self.err = Some(Error::BufferExceeded);
            return 0;
        }
        x
    }

    /// Slides the live window to the front of the buffer, doubles the buffer
    /// when the window exceeds half of it, and reads at least one byte into
    /// the tail. Returns false when the sticky error got set instead.
    fn refill(&mut self) -> bool {
        let capacity = self.buf.capacity();
        let window = self.raw.end - self.raw.start;

        let shift = self.raw.start;
        if shift > 0 {
            self.buf.copy_within(shift..self.raw.end, 0);
            self.rebase_spans(shift);
        }
        self.buf.truncate(window);
        if 2 * window > capacity {
            self.buf.reserve(2 * capacity.max(2048) - window);
        }

        let tail = self.buf.len();
        self.buf.resize(self.buf.capacity(), 0);

        let mut zero_reads = 0;
        loop {
            match self.reader.read(&mut self.buf[tail..]) {
                Ok(0) => {
                    self.buf.truncate(tail);
                    self.err = Some(Error::Eof);
                    return false;
                }
                Ok(n) => {
                    self.buf.truncate(tail + n);
                    return true;
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                    zero_reads += 1;
                    if zero_reads >= MAX_ZERO_READS {
                        self.buf.truncate(tail);
                        self.err = Some(Error::NoProgress);
                        return false;
                    }
                }
                Err(e) => {
                    self.buf.truncate(tail);
                    self.err = Some(Error::Io(e));
                    return false;
                }
            }
        }
    }

    /// Rebases every span after the live window moved `shift` bytes down.
    fn rebase_spans(&mut self, shift: usize) {
        let rebase = |span: &mut Span| {
            span.start = span.start.saturating_sub(shift);
            span.end = span.end.saturating_sub(shift);
        };
        rebase(&mut self.raw);
        rebase(&mut self.data);
        rebase(&mut self.pending_attr[0]);
        rebase(&mut self.pending_attr[1]);
        for pair in &mut self.attrs {
            rebase(&mut pair[0]);
            rebase(&mut pair[1]);
        }
    }

    /// Un-reads the most recently read byte.
    fn unread_byte(&mut self) {
        self.raw.end -= 1;
    }

    /// Scans to the next token and returns its kind.
    pub fn next(&mut self) -> TokenKind {
        self.raw.start = self.raw.end;
        self.data.start = self.raw.end;
        self.data.end = self.raw.end;
        if self.err.is_some() {
            self.kind = TokenKind::Error;
            return self.kind;
        }

        if !self.raw_tag.is_empty() {
            if self.raw_tag == "plaintext" {
                // Everything up to EOF is text.
                while self.err.is_none() {
                    self.read_byte();
                }
                self.data.end = self.raw.end;
                self.text_is_raw = true;
            } else {
                self.read_raw_or_rcdata();
            }
            if self.data.end > self.data.start {
                self.kind = TokenKind::Text;
                self.convert_nul = true;
                return self.kind;
            }
        }
        self.text_is_raw = false;
        self.convert_nul = false;

        loop {
            let mut c = self.read_byte();
            if self.err.is_some() {
                break;
            }
            if c != b'<' {
                continue;
            }

            // Check if the '<' we have just read is part of a tag, comment or
            // doctype. If not, it's part of the accumulated text token.
            c = self.read_byte();
            if self.err.is_some() {
                break;
            }
            let kind = match c {
                b'a'..=b'z' | b'A'..=b'Z' => TokenKind::StartTag,
                b'/' => TokenKind::EndTag,
                b'!' | b'?' => TokenKind::Comment,
                _ => {
                    self.unread_byte();
                    continue;
                }
            };

            // We have a non-text token, but we might have accumulated some
            // text before the '<'. If so, emit that text first.
            let x = self.raw.end - "<a".len();
            if self.raw.start < x {
                self.raw.end = x;
                self.data.end = x;
                self.kind = TokenKind::Text;
                return self.kind;
            }

            match kind {
                TokenKind::StartTag => {
                    self.kind = self.read_start_tag();
                    return self.kind;
                }
                TokenKind::EndTag => {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    if c == b'>' {
                        // "</>" does not generate a token at all. Generate an
                        // empty comment to allow passthrough clients to pick
                        // up the data using raw().
                        self.kind = TokenKind::Comment;
                        return self.kind;
                    }
                    if c.is_ascii_alphabetic() {
                        self.read_tag(false);
                        self.kind = if self.err.is_some() {
                            TokenKind::Error
                        } else {
                            TokenKind::EndTag
                        };
                        return self.kind;
                    }
                    self.unread_byte();
                    self.read_until_close_angle();
                    self.kind = TokenKind::Comment;
                    return self.kind;
                }
                _ => {
                    // TokenKind::Comment
                    if c == b'!' {
                        self.kind = self.read_markup_declaration();
                        return self.kind;
                    }
                    self.unread_byte();
                    self.read_until_close_angle();
                    self.kind = TokenKind::Comment;
                    return self.kind;
                }
            }
        }

        if self.raw.start < self.raw.end {
            self.data.end = self.raw.end;
            self.kind = TokenKind::Text;
            return self.kind;
        }
        self.kind = TokenKind::Error;
        self.kind
    }

    /// Reads until the next "</foo>", where "foo" is the raw-text tag the
    /// previous start tag switched on.
    fn read_raw_or_rcdata(&mut self) {
        if self.raw_tag == "script" {
            self.read_script();
            self.text_is_raw = true;
            self.raw_tag.clear();
            return;
        }
        loop {
            let c = self.read_byte();
            if self.err.is_some() {
                break;
            }
            if c != b'<' {
                continue;
            }
            let c = self.read_byte();
            if self.err.is_some() {
                break;
            }
            if c != b'/' {
                self.unread_byte();
                continue;
            }
            if self.read_raw_end_tag() || self.err.is_some() {
                break;
            }
        }
        self.data.end = self.raw.end;
        // A textarea's or a title's RCDATA can contain escaped entities.
        self.text_is_raw = self.raw_tag != "textarea" && self.raw_tag != "title";
        self.raw_tag.clear();
    }

    /// Attempts to read a tag like "</foo>", where "foo" is `self.raw_tag`.
    /// If it succeeds, it backs up the input position to reconsume the tag and
    /// returns true. Otherwise it returns false. The opening "</" has already
    /// been consumed.
    fn read_raw_end_tag(&mut self) -> bool {
        let tag_len = self.raw_tag.len();
        for i in 0..tag_len {
            let c = self.read_byte();
            if self.err.is_some() {
                return false;
            }
            let want = self.raw_tag.as_bytes()[i];
            if c != want && c != want.to_ascii_uppercase() {
                self.unread_byte();
                return false;
            }
        }
        let c = self.read_byte();
        if self.err.is_some() {
            return false;
        }
        match c {
            b' ' | b'\n' | b'\r' | b'\t' | b'\x0C' | b'/' | b'>' => {
                // The 3 is 2 for the leading "</" plus 1 for the trailing character.
                self.raw.end -= 3 + tag_len;
                true
            }
            _ => {
                self.unread_byte();
                false
            }
        }
    }

    /// Reads until the next `</script>`, following the byzantine rules for
    /// escaping and double-escaping script data.
    fn read_script(&mut self) {
        use ScriptState::*;
        let mut state = Data;
        loop {
            match state {
                Data => {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    state = if c == b'<' { LessThanSign } else { Data };
                }
                LessThanSign => {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    state = match c {
                        b'/' => EndTagOpen,
                        b'!' => EscapeStart,
                        _ => {
                            self.unread_byte();
                            Data
                        }
                    };
                }
                EndTagOpen => {
                    if self.read_raw_end_tag() || self.err.is_some() {
                        break;
                    }
                    state = Data;
                }
                EscapeStart => {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    state = if c == b'-' {
                        EscapeStartDash
                    } else {
                        self.unread_byte();
                        Data
                    };
                }
                EscapeStartDash => {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    state = if c == b'-' {
                        EscapedDashDash
                    } else {
                        self.unread_byte();
                        Data
                    };
                }
                Escaped => {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    state = match c {
                        b'-' => EscapedDash,
                        b'<' => EscapedLessThanSign,
                        _ => Escaped,
                    };
                }
                EscapedDash => {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    state = match c {
                        b'-' => EscapedDashDash,
                        b'<' => EscapedLessThanSign,
                        _ => Escaped,
                    };
                }
                EscapedDashDash => {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    state = match c {
                        b'-' => EscapedDashDash,
                        b'<' => EscapedLessThanSign,
                        b'>' => Data,
                        _ => Escaped,
                    };
                }
                EscapedLessThanSign => {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    state = if c == b'/' {
                        EscapedEndTagOpen
                    } else if c.is_ascii_alphabetic() {
                        DoubleEscapeStart
                    } else {
                        self.unread_byte();
                        Escaped
                    };
                }
                EscapedEndTagOpen => {
                    if self.read_raw_end_tag() || self.err.is_some() {
                        break;
                    }
                    state = Escaped;
                }
                DoubleEscapeStart => {
                    self.unread_byte();
                    let mut matched = true;
                    for i in 0.."script".len() {
                        let c = self.read_byte();
                        if self.err.is_some() {
                            break;
                        }
                        let want = b"script"[i];
                        if c != want && c != want.to_ascii_uppercase() {
                            self.unread_byte();
                            matched = false;
                            break;
                        }
                    }
                    if self.err.is_some() {
                        break;
                    }
                    if !matched {
                        state = Escaped;
                        continue;
                    }
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    state = match c {
                        b' ' | b'\n' | b'\r' | b'\t' | b'\x0C' | b'/' | b'>' => DoubleEscaped,
                        _ => {
                            self.unread_byte();
                            Escaped
                        }
                    };
                }
                DoubleEscaped => {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    state = match c {
                        b'-' => DoubleEscapedDash,
                        b'<' => DoubleEscapedLessThanSign,
                        _ => DoubleEscaped,
                    };
                }
                DoubleEscapedDash => {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    state = match c {
                        b'-' => DoubleEscapedDashDash,
                        b'<' => DoubleEscapedLessThanSign,
                        _ => DoubleEscaped,
                    };
                }
                DoubleEscapedDashDash => {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    state = match c {
                        b'-' => DoubleEscapedDashDash,
                        b'<' => DoubleEscapedLessThanSign,
                        b'>' => Data,
                        _ => DoubleEscaped,
                    };
                }
                DoubleEscapedLessThanSign => {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        break;
                    }
                    state = if c == b'/' {
                        DoubleEscapeEnd
                    } else {
                        self.unread_byte();
                        DoubleEscaped
                    };
                }
                DoubleEscapeEnd => {
                    if self.read_raw_end_tag() {
                        self.raw.end += "</script>".len();
                        state = Escaped;
                        continue;
                    }
                    if self.err.is_some() {
                        break;
                    }
                    state = DoubleEscaped;
                }
            }
        }
        self.data.end = self.raw.end;
    }

    /// Reads everything up to and including the next '>' as comment data.
    fn read_until_close_angle(&mut self) {
        self.data.start = self.raw.end;
        loop {
            let c = self.read_byte();
            if self.err.is_some() {
                self.data.end = self.raw.end;
                return;
            }
            if c == b'>' {
                self.data.end = self.raw.end - 1;
                return;
            }
        }
    }

    /// Distinguishes `<!--`, `<!DOCTYPE` and `<![CDATA[` after the leading
    /// "<!" has been consumed. Anything else is a bogus comment.
    fn read_markup_declaration(&mut self) -> TokenKind {
        self.data.start = self.raw.end;
        let mut c = [0u8; 2];
        for i in 0..2 {
            c[i] = self.read_byte();
            if self.err.is_some() {
                self.data.end = self.raw.end;
                return TokenKind::Comment;
            }
        }
        if c[0] == b'-' && c[1] == b'-' {
            self.read_comment();
            return TokenKind::Comment;
        }
        self.raw.end -= 2;
        if self.read_doctype() {
            return TokenKind::Doctype;
        }
        if self.allow_cdata && self.read_cdata() {
            self.convert_nul = true;
            return TokenKind::Text;
        }
        // It's a bogus comment.
        self.read_until_close_angle();
        TokenKind::Comment
    }

    /// Reads the "-- ... -->" of a comment; "<!--" is already consumed. The
    /// comment also ends on "--!>" and, abruptly, at EOF with up to two
    /// trailing dashes (and a '!') discarded.
    fn read_comment(&mut self) {
        self.data.start = self.raw.end;

        let mut dash_count = 0;
        let mut beginning = true;
        loop {
            let c = self.read_byte();
            if self.err.is_some() {
                self.data.end = self.abrupt_comment_data_end();
                break;
            }
            match c {
                b'-' => {
                    dash_count += 1;
                    continue;
                }
                b'>' => {
                    if dash_count >= 2 || beginning {
                        self.data.end = self.raw.end - "-->".len();
                        break;
                    }
                }
                b'!' => {
                    if dash_count >= 2 {
                        let c = self.read_byte();
                        if self.err.is_some() {
                            self.data.end = self.abrupt_comment_data_end();
                            break;
                        }
                        if c == b'>' {
                            self.data.end = self.raw.end - "--!>".len();
                            break;
                        } else if c == b'-' {
                            dash_count = 1;
                            beginning = false;
                            continue;
                        }
                    }
                }
                _ => {}
            }
            dash_count = 0;
            beginning = false;
        }

        if self.data.end < self.data.start {
            // It's a comment with no data, like <!-->.
            self.data.end = self.data.start;
        }
    }

    /// Where the comment data ends when the input stops mid-comment.
    fn abrupt_comment_data_end(&mut self) -> usize {
        let raw = self.raw();
        let prefix_len = "<!--".len();
        if raw.len() >= prefix_len {
            let rest = &raw[prefix_len..];
            if rest.ends_with(b"--!") {
                return self.raw.end - 3;
            } else if rest.ends_with(b"--") {
                return self.raw.end - 2;
            } else if rest.ends_with(b"-") {
                return self.raw.end - 1;
            }
        }
        self.raw.end
    }

    /// Attempts to read a doctype declaration; "<!" is already consumed.
    /// Returns false to let the caller back up and try something else.
    fn read_doctype(&mut self) -> bool {
        const DOCTYPE: &[u8] = b"DOCTYPE";
        for i in 0..DOCTYPE.len() {
            let c = self.read_byte();
            if self.err.is_some() {
                self.data.end = self.raw.end;
                return true;
            }
            if c != DOCTYPE[i] && c != DOCTYPE[i].to_ascii_lowercase() {
                // Back up to read the fragment of "DOCTYPE" again.
                self.raw.end = self.data.start;
                return false;
            }
        }
        self.skip_white_space();
        if self.err.is_some() {
            self.data.start = self.raw.end;
            self.data.end = self.raw.end;
            return true;
        }
        self.data.start = self.raw.end;
        loop {
            let c = self.read_byte();
            if self.err.is_some() {
                self.data.end = self.raw.end;
                return true;
            }
            if c == b'>' {
                self.data.end = self.raw.end - 1;
                return true;
            }
        }
    }

    /// Attempts to read a CDATA section; "<!" is already consumed. Returns
    /// false to let the caller back up and treat it as a bogus comment.
    fn read_cdata(&mut self) -> bool {
        const PREFIX: &[u8] = b"[CDATA[";
        for i in 0..PREFIX.len() {
            let c = self.read_byte();
            if self.err.is_some() {
                self.data.end = self.raw.end;
                return true;
            }
            if c != PREFIX[i] {
                self.raw.end = self.data.start;
                return false;
            }
        }
        self.data.start = self.raw.end;
        let mut brackets = 0;
        loop {
            let c = self.read_byte();
            if self.err.is_some() {
                self.data.end = self.raw.end;
                return true;
            }
            match c {
                b']' => brackets += 1,
                b'>' => {
                    if brackets >= 2 {
                        self.data.end = self.raw.end - "]]>".len();
                        return true;
                    }
                    brackets = 0;
                }
                _ => brackets = 0,
            }
        }
    }

    /// True when `self.data` equals any of the given lowercase names,
    /// ASCII-case-insensitively.
    fn start_tag_in(&self, names: &[&str]) -> bool {
        let tag = &self.buf[self.data.start..self.data.end];
        names.iter().any(|name| tag.eq_ignore_ascii_case(name.as_bytes()))
    }

    /// Reads a start tag after "<a" has been consumed, switching the
    /// tokenizer into raw-text mode for the raw-text trigger tags.
    fn read_start_tag(&mut self) -> TokenKind {
        self.read_tag(true);
        if self.err.is_some() {
            return TokenKind::Error;
        }
        // Several tags flag the tokenizer's next token as raw.
        let raw = match self.buf[self.data.start].to_ascii_lowercase() {
            b'i' => self.start_tag_in(&["iframe"]),
            b'n' => self.start_tag_in(&["noembed", "noframes", "noscript"]),
            b'p' => self.start_tag_in(&["plaintext"]),
            b's' => self.start_tag_in(&["script", "style"]),
            b't' => self.start_tag_in(&["textarea", "title"]),
            b'x' => self.start_tag_in(&["xmp"]),
            _ => false,
        };
        if raw {
            self.raw_tag = String::from_utf8_lossy(&self.buf[self.data.start..self.data.end])
                .to_ascii_lowercase();
        }
        // Look for a self-closing token like "<br/>".
        if self.err.is_none() && self.buf[self.raw.end - 2] == b'/' {
            return TokenKind::SelfClosingTag;
        }
        TokenKind::StartTag
    }

    /// Reads the tag name and attributes; "<a" or "</a" is already consumed.
    /// Attribute spans are only saved when `save_attr` is set; end tags drop
    /// theirs.
    fn read_tag(&mut self, save_attr: bool) {
        self.attrs.clear();
        self.n_attr_returned = 0;
        self.read_tag_name();
        self.skip_white_space();
        if self.err.is_some() {
            return;
        }
        loop {
            let c = self.read_byte();
            if self.err.is_some() || c == b'>' {
                break;
            }
            self.unread_byte();
            self.read_tag_attr_key();
            self.read_tag_attr_val();
            if save_attr && self.pending_attr[0].start != self.pending_attr[0].end {
                self.attrs.push(self.pending_attr);
            }
            self.skip_white_space();
            if self.err.is_some() {
                break;
            }
        }
    }

    /// Sets `self.data` to the tag name; "<a" or "</a" is already consumed
    /// and the 'a' is the first byte of the name.
    fn read_tag_name(&mut self) {
        self.data.start = self.raw.end - 1;
        loop {
            let c = self.read_byte();
            if self.err.is_some() {
                self.data.end = self.raw.end;
                return;
            }
            match c {
                b' ' | b'\n' | b'\r' | b'\t' | b'\x0C' => {
                    self.data.end = self.raw.end - 1;
                    return;
                }
                b'/' | b'>' => {
                    self.unread_byte();
                    self.data.end = self.raw.end;
                    return;
                }
                _ => {}
            }
        }
    }

    /// Sets `self.pending_attr[0]` to the key of the current attribute.
    fn read_tag_attr_key(&mut self) {
        self.pending_attr[0].start = self.raw.end;
        loop {
            let c = self.read_byte();
            if self.err.is_some() {
                self.pending_attr[0].end = self.raw.end;
                return;
            }
            match c {
                b'=' if self.pending_attr[0].start + 1 == self.raw.end => {
                    // An equals sign before the attribute name counts as a
                    // character in the name.
                }
                b' ' | b'\n' | b'\r' | b'\t' | b'\x0C' | b'/' | b'>' | b'=' => {
                    // Reconsume in the after-attribute-name state to pick up
                    // '/' and '=' again.
                    self.unread_byte();
                    self.pending_attr[0].end = self.raw.end;
                    return;
                }
                _ => {}
            }
        }
    }

    /// Sets `self.pending_attr[1]` to the value of the current attribute.
    fn read_tag_attr_val(&mut self) {
        self.pending_attr[1].start = self.raw.end;
        self.pending_attr[1].end = self.raw.end;
        self.skip_white_space();
        if self.err.is_some() {
            return;
        }
        let c = self.read_byte();
        if self.err.is_some() {
            return;
        }
        if c == b'/' {
            // The solidus switches to the self-closing start tag state.
            return;
        }
        if c != b'=' {
            self.unread_byte();
            return;
        }
        self.skip_white_space();
        if self.err.is_some() {
            return;
        }
        let quote = self.read_byte();
        if self.err.is_some() {
            return;
        }
        match quote {
            b'>' => {
                self.unread_byte();
            }
            b'\'' | b'"' => {
                self.pending_attr[1].start = self.raw.end;
                loop {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        self.pending_attr[1].end = self.raw.end;
                        return;
                    }
                    if c == quote {
                        self.pending_attr[1].end = self.raw.end - 1;
                        return;
                    }
                }
            }
            _ => {
                self.pending_attr[1].start = self.raw.end - 1;
                loop {
                    let c = self.read_byte();
                    if self.err.is_some() {
                        self.pending_attr[1].end = self.raw.end;
                        return;
                    }
                    match c {
                        b' ' | b'\n' | b'\r' | b'\t' | b'\x0C' => {
                            self.pending_attr[1].end = self.raw.end - 1;
                            return;
                        }
                        b'>' => {
                            self.unread_byte();
                            self.pending_attr[1].end = self.raw.end;
                            return;
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    fn skip_white_space(&mut self) {
        if self.err.is_some() {
            return;
        }
        loop {
            let c = self.read_byte();
            if self.err.is_some() {
                return;
            }
            match c {
                b' ' | b'\n' | b'\r' | b'\t' | b'\x0C' => {}
                _ => {
                    self.unread_byte();
                    return;
                }
            }
        }
    }

    /// The unescaped payload of the current Text, Comment or Doctype token,
    /// or None for other kinds. Consumes the data span; a second call returns
    /// an empty payload.
    pub fn text(&mut self) -> Option<String> {
        match self.kind {
            TokenKind::Text | TokenKind::Comment | TokenKind::Doctype => {
                let mut s = self.buf[self.data.start..self.data.end].to_vec();
                self.data.start = self.raw.end;
                self.data.end = self.raw.end;
                convert_newlines(&mut s);
                if (self.convert_nul || self.kind == TokenKind::Comment) && s.contains(&0) {
                    s = replace_nul(&s);
                }
                if !self.text_is_raw {
                    let n = entity::unescape_in_place(&mut s, false);
                    s.truncate(n);
                }
                Some(String::from_utf8_lossy(&s).into_owned())
            }
            _ => None,
        }
    }

    /// The lowercased tag name and whether there are attributes left to read
    /// with [`Tokenizer::tag_attr`]. None for non-tag tokens and empty names.
    pub fn tag_name(&mut self) -> Option<(String, bool)> {
        if self.data.start >= self.data.end {
            return None;
        }
        match self.kind {
            TokenKind::StartTag | TokenKind::EndTag | TokenKind::SelfClosingTag => {
                let mut s = self.buf[self.data.start..self.data.end].to_vec();
                self.data.start = self.raw.end;
                self.data.end = self.raw.end;
                s.make_ascii_lowercase();
                Some((
                    String::from_utf8_lossy(&s).into_owned(),
                    self.n_attr_returned < self.attrs.len(),
                ))
            }
            _ => None,
        }
    }

    /// The next attribute of the current tag: lowercased key, unescaped
    /// value, and whether more attributes follow.
    pub fn tag_attr(&mut self) -> Option<(String, String, bool)> {
        if self.n_attr_returned >= self.attrs.len() {
            return None;
        }
        match self.kind {
            TokenKind::StartTag | TokenKind::SelfClosingTag => {
                let [key_span, val_span] = self.attrs[self.n_attr_returned];
                self.n_attr_returned += 1;

                let mut key = self.buf[key_span.start..key_span.end].to_vec();
                key.make_ascii_lowercase();

                let mut val = self.buf[val_span.start..val_span.end].to_vec();
                convert_newlines(&mut val);
                let n = entity::unescape_in_place(&mut val, true);
                val.truncate(n);

                Some((
                    String::from_utf8_lossy(&key).into_owned(),
                    String::from_utf8_lossy(&val).into_owned(),
                    self.n_attr_returned < self.attrs.len(),
                ))
            }
            _ => None,
        }
    }

    /// Materializes the current token as an owning [`Token`] value. Duplicate
    /// attribute keys are dropped, keeping the first occurrence.
    pub fn token(&mut self) -> Token {
        let mut t = Token {
            kind: self.kind,
            ..Default::default()
        };
        match self.kind {
            TokenKind::Text | TokenKind::Comment | TokenKind::Doctype => {
                t.data = self.text().unwrap_or_default();
            }
            TokenKind::StartTag | TokenKind::SelfClosingTag | TokenKind::EndTag => {
                if let Some((name, mut more_attr)) = self.tag_name() {
                    while more_attr {
                        let Some((key, val, more)) = self.tag_attr() else {
                            break;
                        };
                        more_attr = more;
                        if t.attrs.iter().any(|a: &Attribute| a.name == key) {
                            continue;
                        }
                        t.attrs.push(Attribute::new(&key, &val));
                    }
                    let atom = Atom::lookup(name.as_bytes());
                    if atom.is_unknown() {
                        t.data = name;
                    } else {
                        t.atom = atom;
                        t.data = atom.as_str().to_string();
                    }
                }
            }
            TokenKind::Error => {}
        }
        t
    }
}

/// Rewrites `\r` and `\r\n` to `\n` in place, truncating the buffer.
fn convert_newlines(s: &mut Vec<u8>) {
    let Some(first_cr) = s.iter().position(|&c| c == b'\r') else {
        return;
    };

    let mut dst = first_cr;
    let mut src = first_cr;
    while src < s.len() {
        if s[src] == b'\r' {
            if src + 1 < s.len() && s[src + 1] == b'\n' {
                src += 1;
            }
            s[dst] = b'\n';
        } else {
            s[dst] = s[src];
        }
        src += 1;
        dst += 1;
    }
    s.truncate(dst);
}

/// Replaces NUL bytes with U+FFFD.
fn replace_nul(s: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for &c in s {
        if c == 0 {
            out.extend_from_slice("\u{FFFD}".as_bytes());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs the tokenizer over `input` and renders each token as
    /// "Kind(data)" for compact comparisons.
    fn tokenize(input: &str) -> Vec<String> {
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let mut out = vec![];
        loop {
            let kind = tokenizer.next();
            let token = tokenizer.token();
            match kind {
                TokenKind::Error => break,
                TokenKind::Text => out.push(format!("Text({})", token.data)),
                TokenKind::StartTag => out.push(format!("StartTag({})", token.data)),
                TokenKind::SelfClosingTag => out.push(format!("SelfClosingTag({})", token.data)),
                TokenKind::EndTag => out.push(format!("EndTag({})", token.data)),
                TokenKind::Comment => out.push(format!("Comment({})", token.data)),
                TokenKind::Doctype => out.push(format!("Doctype({})", token.data)),
            }
        }
        out
    }

    /// Concatenated raw() over all tokens including the terminal Error token
    /// must reproduce the input.
    fn assert_reassembles(input: &str) {
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let mut raw = Vec::new();
        loop {
            let kind = tokenizer.next();
            raw.extend_from_slice(tokenizer.raw());
            if kind == TokenKind::Error {
                break;
            }
        }
        raw.extend_from_slice(tokenizer.buffered());
        assert_eq!(raw, input.as_bytes(), "raw reassembly for {input:?}");
    }

    #[test]
    fn self_closing_tags_and_text() {
        assert_eq!(
            tokenize("<a/>b<c/>d</e>"),
            vec![
                "SelfClosingTag(a)",
                "Text(b)",
                "SelfClosingTag(c)",
                "Text(d)",
                "EndTag(e)",
            ]
        );
        assert_reassembles("<a/>b<c/>d</e>");
    }

    #[test]
    fn text_entities() {
        assert_eq!(tokenize("&notit;&notin;"), vec!["Text(\u{AC}it;\u{2209})"]);
    }

    #[test]
    fn attribute_entities() {
        let mut tokenizer =
            Tokenizer::new(&b"<a b=\"q=z&amp=5&notice=hello&not;=world\">"[..]);
        assert_eq!(tokenizer.next(), TokenKind::StartTag);
        let token = tokenizer.token();
        assert_eq!(token.attrs.len(), 1);
        assert_eq!(token.attrs[0].name, "b");
        assert_eq!(token.attrs[0].value, "q=z&amp=5&notice=hello\u{AC}=world");
    }

    #[test]
    fn attributes() {
        let mut tokenizer = Tokenizer::new(&b"<div A=1 b='2' C = \"three\" d e=>"[..]);
        assert_eq!(tokenizer.next(), TokenKind::StartTag);
        let token = tokenizer.token();
        assert_eq!(token.data, "div");
        let got: Vec<(String, String)> = token
            .attrs
            .iter()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "three".to_string()),
                ("d".to_string(), "".to_string()),
                ("e".to_string(), "".to_string()),
            ]
        );
    }

    #[test]
    fn duplicate_attributes_keep_first() {
        let mut tokenizer = Tokenizer::new(&b"<p id=a id=b>"[..]);
        assert_eq!(tokenizer.next(), TokenKind::StartTag);
        let token = tokenizer.token();
        assert_eq!(token.attrs.len(), 1);
        assert_eq!(token.attrs[0].value, "a");
    }

    #[test]
    fn lone_less_than_is_text() {
        assert_eq!(tokenize("a < b"), vec!["Text(a < b)"]);
        assert_eq!(tokenize("<"), vec!["Text(<)"]);
        assert_eq!(tokenize("a<1>b"), vec!["Text(a<1>b)"]);
        assert_reassembles("a < b");
    }

    #[test]
    fn empty_end_tag_is_empty_comment() {
        assert_eq!(tokenize("a</>b"), vec!["Text(a)", "Comment()", "Text(b)"]);
        assert_reassembles("a</>b");
    }

    #[test]
    fn comments() {
        assert_eq!(tokenize("<!--x-->"), vec!["Comment(x)"]);
        assert_eq!(tokenize("<!--x--!>"), vec!["Comment(x)"]);
        assert_eq!(tokenize("<!-->"), vec!["Comment()"]);
        assert_eq!(tokenize("<!--x-- >-->"), vec!["Comment(x-- >)"]);
        // Abrupt end of input; at most two trailing dashes are dropped.
        assert_eq!(tokenize("<!--x"), vec!["Comment(x)"]);
        assert_eq!(tokenize("<!--x--"), vec!["Comment(x)"]);
        assert_eq!(tokenize("<!--x---"), vec!["Comment(x-)"]);
        assert_reassembles("<!--x-->");
        assert_reassembles("<!--x--");
    }

    #[test]
    fn bogus_comments() {
        assert_eq!(tokenize("<?xml?>"), vec!["Comment(?xml?)"]);
        assert_eq!(tokenize("<!x>"), vec!["Comment(x)"]);
        assert_eq!(tokenize("</ x>"), vec!["Comment( x)"]);
    }

    #[test]
    fn doctype() {
        assert_eq!(tokenize("<!DOCTYPE html>"), vec!["Doctype(html)"]);
        assert_eq!(tokenize("<!doctype HTML>"), vec!["Doctype(HTML)"]);
    }

    #[test]
    fn cdata_requires_foreign_content() {
        assert_eq!(tokenize("<![CDATA[x]]>"), vec!["Comment([CDATA[x]])"]);

        let mut tokenizer = Tokenizer::new(&b"<![CDATA[x]]>"[..]);
        tokenizer.set_allow_cdata(true);
        assert_eq!(tokenizer.next(), TokenKind::Text);
        assert_eq!(tokenizer.token().data, "x");
    }

    #[test]
    fn raw_text_script() {
        assert_eq!(
            tokenize("<script>a < b</script>x"),
            vec!["StartTag(script)", "Text(a < b)", "EndTag(script)", "Text(x)"]
        );
        assert_reassembles("<script>a < b</script>x");
    }

    #[test]
    fn script_escape_nesting() {
        // The whole commented-out script stays inside the script text.
        let input = "<script><!-- <script>alert()</script> --></script>";
        assert_eq!(
            tokenize(input),
            vec![
                "StartTag(script)",
                "Text(<!-- <script>alert()</script> -->)",
                "EndTag(script)",
            ]
        );
        assert_reassembles(input);
    }

    #[test]
    fn rcdata_title_unescapes() {
        assert_eq!(
            tokenize("<title>a&amp;b</title>"),
            vec!["StartTag(title)", "Text(a&b)", "EndTag(title)"]
        );
        // Raw text elements do not unescape.
        assert_eq!(
            tokenize("<style>a&amp;b</style>"),
            vec!["StartTag(style)", "Text(a&amp;b)", "EndTag(style)"]
        );
    }

    #[test]
    fn raw_text_end_tag_needs_terminator() {
        assert_eq!(
            tokenize("<textarea></textareax</textarea>"),
            vec!["StartTag(textarea)", "Text(</textareax)", "EndTag(textarea)"]
        );
    }

    #[test]
    fn plaintext_swallows_rest() {
        assert_eq!(
            tokenize("<plaintext>a</plaintext>b"),
            vec!["StartTag(plaintext)", "Text(a</plaintext>b)"]
        );
    }

    #[test]
    fn newline_normalization() {
        assert_eq!(tokenize("a\r\nb\rc"), vec!["Text(a\nb\nc)"]);
        let mut tokenizer = Tokenizer::new(&b"<a b='x\r\ny'>"[..]);
        assert_eq!(tokenizer.next(), TokenKind::StartTag);
        assert_eq!(tokenizer.token().attrs[0].value, "x\ny");
    }

    #[test]
    fn eof_in_tag_is_error_with_raw() {
        let mut tokenizer = Tokenizer::new(&b"<a href="[..]);
        assert_eq!(tokenizer.next(), TokenKind::Error);
        assert_eq!(tokenizer.raw(), b"<a href=");
        assert!(tokenizer.err().expect("eof").is_eof());
    }

    #[test]
    fn empty_input() {
        let mut tokenizer = Tokenizer::new(&b""[..]);
        assert_eq!(tokenizer.next(), TokenKind::Error);
        assert!(tokenizer.err().expect("eof").is_eof());
    }

    #[test]
    fn max_buf_exceeded() {
        let input = vec![b'x'; 1 << 16];
        let mut tokenizer = Tokenizer::new(&input[..]);
        tokenizer.set_max_buf(256);
        // The text accumulated before the cap is still delivered, then the
        // tokenizer fails.
        assert_eq!(tokenizer.next(), TokenKind::Text);
        assert_eq!(tokenizer.next(), TokenKind::Error);
        assert!(matches!(tokenizer.err(), Some(Error::BufferExceeded)));
    }

    #[test]
    fn max_buf_respected_across_tokens() {
        // Each token stays under the cap, so tokenization completes.
        let input = "<p>hello</p>".repeat(100);
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        tokenizer.set_max_buf(64);
        let mut tokens = 0;
        while tokenizer.next() != TokenKind::Error {
            tokens += 1;
        }
        assert_eq!(tokens, 300);
        assert!(tokenizer.err().expect("eof").is_eof());
    }

    #[test]
    fn no_progress_reader() {
        struct Interrupting;
        impl std::io::Read for Interrupting {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(std::io::ErrorKind::Interrupted))
            }
        }
        let mut tokenizer = Tokenizer::new(Interrupting);
        assert_eq!(tokenizer.next(), TokenKind::Error);
        assert!(matches!(tokenizer.err(), Some(Error::NoProgress)));
    }

    #[test]
    fn raw_reassembly_property() {
        let inputs = [
            "",
            "plain",
            "<p>one</p><p>two</p>",
            "<a href='x'>y</a",
            "<!-- c --><!DOCTYPE html><p class=\"x y\">&amp;</p>",
            "<script><!-- </script> --></script>",
            "<table><tr><td>a<td>b</table>trailing",
            "&notit;&#65;<",
        ];
        for input in inputs {
            assert_reassembles(input);
        }
    }

    #[test]
    fn nul_conversion_in_cdata() {
        let mut tokenizer = Tokenizer::new(&b"<![CDATA[a\x00b]]>"[..]);
        tokenizer.set_allow_cdata(true);
        assert_eq!(tokenizer.next(), TokenKind::Text);
        assert_eq!(tokenizer.token().data, "a\u{FFFD}b");
    }

    #[test]
    fn small_reads_still_reassemble() {
        // A reader that trickles one byte at a time exercises buffer refills
        // and span rebasing.
        struct OneByte<'a>(&'a [u8]);
        impl std::io::Read for OneByte<'_> {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.0.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0[0];
                self.0 = &self.0[1..];
                Ok(1)
            }
        }
        let input = b"<div id=\"greeting\" class='big'>hello &amp; goodbye</div>";
        let mut tokenizer = Tokenizer::new(OneByte(input));
        let mut raw = Vec::new();
        let mut tags = vec![];
        loop {
            let kind = tokenizer.next();
            raw.extend_from_slice(tokenizer.raw());
            if kind == TokenKind::Error {
                break;
            }
            tags.push(tokenizer.token().data);
        }
        assert_eq!(raw, input);
        assert_eq!(tags, vec!["div", "hello & goodbye", "div"]);
    }
}
