// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Streaming lexer for templex templates.
//!
//! The lexer reads its source one byte at a time and runs every byte through
//! an explicit state machine ([`step`]). Bytes that may still turn out to be
//! part of a tag are held in a *tentative* buffer; bytes known to be text are
//! held in a *pending literal* buffer. When a tag attempt fails, the tentative
//! bytes are folded back into the literal and the byte that broke the attempt
//! is fed again from the text state, so malformed tags come out as text and no
//! byte is ever dropped.
//!
//! Because the breaking byte starts over, braces pair up from the left:
//! `{{{{.a}}` lexes as the literal `{{` followed by the variable `{{.a}}` and
//! renders as `{{` plus the value of `.a`, while `{{{.a}}` stays text.
//!
//! # Recognized Tags
//!
//! ```text
//! {{ .seg.seg }}          variable     seg = [A-Za-z_][A-Za-z0-9_]* | [0-9]+
//! {{ #for .seg.seg }}     loop begin   keyword case-insensitive
//! {{ #end }}              loop end     keyword case-insensitive
//! ```
//!
//! Spaces are allowed after `{{`, after the keyword and before `}}`.
//!
//! # Output
//!
//! Completing a tag emits the pending literal (when non-empty) followed by the
//! tag itself. The stream always ends with one `Literal` token holding the
//! remaining text, which is empty when the template ends with a tag.
//!
//! # Example
//!
//! ```rust
//! use templex::{lex, TokenKind};
//!
//! let tokens = lex("Hi {{.name}}!".as_bytes()).unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(kinds, [TokenKind::Literal, TokenKind::Variable, TokenKind::Literal]);
//! ```

use crate::ast::{Span, Token, TokenKind};
use crate::error::Result;
use std::collections::VecDeque;
use std::io::{Bytes, Read};

/// Control keywords following `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `for`, opening a loop.
    For,
    /// `end`, closing a loop.
    End,
}

impl Keyword {
    fn letters(self) -> &'static [u8; 3] {
        match self {
            Keyword::For => b"for",
            Keyword::End => b"end",
        }
    }
}

/// Lexer states.
///
/// States carrying a [`TokenKind`] are shared by variable and loop-open tags;
/// the kind records which token the tag completes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Accumulating literal text.
    Text,
    /// Seen `{`.
    OpenBrace,
    /// Seen `{{`, possibly followed by spaces.
    TagOpen,
    /// Seen `{{#`.
    Hash,
    /// Matching a keyword; `matched` letters so far.
    Keyword {
        /// Which keyword is being matched.
        keyword: Keyword,
        /// Number of letters already matched.
        matched: usize,
    },
    /// Whole keyword matched, possibly followed by spaces.
    AfterKeyword(Keyword),
    /// Seen a `.` that must be followed by a segment.
    SegmentStart(TokenKind),
    /// Inside an identifier segment.
    Identifier(TokenKind),
    /// Inside a numeric index segment.
    Index(TokenKind),
    /// Spaces after the path.
    PathEnd(TokenKind),
    /// Seen the first `}` of the closing delimiter.
    CloseBrace(TokenKind),
}

/// What to do with the byte that caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The byte is literal text.
    Text,
    /// The byte extends the current tag attempt.
    Tentative,
    /// The tag attempt failed at this byte.
    Reject,
    /// The byte completes a tag of the given kind.
    Complete(TokenKind),
}

fn is_space(byte: u8) -> bool {
    byte == b' '
}

fn is_identifier_start(byte: u8) -> bool {
    byte == b'_' || byte.is_ascii_alphabetic()
}

fn is_identifier_continue(byte: u8) -> bool {
    byte == b'_' || byte.is_ascii_alphanumeric()
}

/// The transition function of the lexer state machine.
///
/// On [`Effect::Reject`] the returned state is [`State::Text`]; the caller
/// feeds the byte again from there.
pub fn step(state: State, byte: u8) -> (State, Effect) {
    use Effect::{Complete, Reject, Tentative};

    let reject = (State::Text, Reject);
    match state {
        State::Text => match byte {
            b'{' => (State::OpenBrace, Tentative),
            _ => (State::Text, Effect::Text),
        },
        State::OpenBrace => match byte {
            b'{' => (State::TagOpen, Tentative),
            _ => reject,
        },
        State::TagOpen => match byte {
            b' ' => (State::TagOpen, Tentative),
            b'.' => (State::SegmentStart(TokenKind::Variable), Tentative),
            b'#' => (State::Hash, Tentative),
            _ => reject,
        },
        State::Hash => {
            if byte.eq_ignore_ascii_case(&b'f') {
                (State::Keyword { keyword: Keyword::For, matched: 1 }, Tentative)
            } else if byte.eq_ignore_ascii_case(&b'e') {
                (State::Keyword { keyword: Keyword::End, matched: 1 }, Tentative)
            } else {
                reject
            }
        }
        State::Keyword { keyword, matched } => {
            if !byte.eq_ignore_ascii_case(&keyword.letters()[matched]) {
                return reject;
            }
            if matched + 1 == keyword.letters().len() {
                (State::AfterKeyword(keyword), Tentative)
            } else {
                (State::Keyword { keyword, matched: matched + 1 }, Tentative)
            }
        }
        State::AfterKeyword(keyword) => match (keyword, byte) {
            (_, b' ') => (state, Tentative),
            (Keyword::For, b'.') => (State::SegmentStart(TokenKind::LoopBegin), Tentative),
            (Keyword::End, b'}') => (State::CloseBrace(TokenKind::LoopEnd), Tentative),
            _ => reject,
        },
        State::SegmentStart(kind) => {
            if is_identifier_start(byte) {
                (State::Identifier(kind), Tentative)
            } else if byte.is_ascii_digit() {
                (State::Index(kind), Tentative)
            } else {
                reject
            }
        }
        State::Identifier(_) if is_identifier_continue(byte) => (state, Tentative),
        State::Index(_) if byte.is_ascii_digit() => (state, Tentative),
        State::Identifier(kind) | State::Index(kind) => match byte {
            b'.' => (State::SegmentStart(kind), Tentative),
            b'}' => (State::CloseBrace(kind), Tentative),
            _ if is_space(byte) => (State::PathEnd(kind), Tentative),
            _ => reject,
        },
        State::PathEnd(kind) => match byte {
            b'}' => (State::CloseBrace(kind), Tentative),
            _ if is_space(byte) => (state, Tentative),
            _ => reject,
        },
        State::CloseBrace(kind) => match byte {
            b'}' => (State::Text, Complete(kind)),
            _ => reject,
        },
    }
}

/// Pull-based lexer over any byte source.
///
/// Yields tokens as soon as they are complete. Reads are issued one byte at a
/// time, so wrap unbuffered sources such as files in a `BufReader`.
pub struct Lexer<R> {
    bytes: Bytes<R>,
    state: State,
    pending: Vec<u8>,
    pending_span: Span,
    tentative: Vec<u8>,
    tentative_span: Span,
    position: Span,
    // One byte can complete a literal and a tag at once.
    ready: VecDeque<Token>,
    finished: bool,
}

impl<R: Read> Lexer<R> {
    /// Creates a lexer reading from `source`.
    pub fn new(source: R) -> Self {
        Self {
            bytes: source.bytes(),
            state: State::Text,
            pending: Vec::new(),
            pending_span: Span::start(),
            tentative: Vec::new(),
            tentative_span: Span::start(),
            position: Span::start(),
            ready: VecDeque::with_capacity(2),
            finished: false,
        }
    }

    fn feed(&mut self, byte: u8) {
        let span = self.position;
        self.position.offset += 1;
        if byte == b'\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
        self.apply(byte, span);
    }

    fn apply(&mut self, byte: u8, span: Span) {
        let (next, effect) = step(self.state, byte);
        self.state = next;
        match effect {
            Effect::Text => self.push_pending(byte, span),
            Effect::Tentative => self.push_tentative(byte, span),
            Effect::Reject => {
                tracing::debug!(
                    "Tag attempt at {} is not a valid tag, keeping it as text: {:?}",
                    self.tentative_span,
                    String::from_utf8_lossy(&self.tentative)
                );
                self.fold();
                self.apply(byte, span);
            }
            Effect::Complete(kind) => {
                self.push_tentative(byte, span);
                self.emit(kind);
            }
        }
    }

    fn push_pending(&mut self, byte: u8, span: Span) {
        if self.pending.is_empty() {
            self.pending_span = span;
        }
        self.pending.push(byte);
    }

    fn push_tentative(&mut self, byte: u8, span: Span) {
        if self.tentative.is_empty() {
            self.tentative_span = span;
        }
        self.tentative.push(byte);
    }

    /// Moves the tentative bytes to the end of the pending literal.
    fn fold(&mut self) {
        if self.tentative.is_empty() {
            return;
        }
        if self.pending.is_empty() {
            self.pending_span = self.tentative_span;
        }
        self.pending.append(&mut self.tentative);
    }

    fn emit(&mut self, kind: TokenKind) {
        if !self.pending.is_empty() {
            let literal = std::mem::take(&mut self.pending);
            self.ready
                .push_back(Token::new(TokenKind::Literal, literal).at(self.pending_span));
        }
        let raw = std::mem::take(&mut self.tentative);
        tracing::trace!(
            "Lexed {} tag at {}: {}",
            kind,
            self.tentative_span,
            String::from_utf8_lossy(&raw)
        );
        self.ready
            .push_back(Token::new(kind, raw).at(self.tentative_span));
    }

    fn finish(&mut self) {
        self.fold();
        self.state = State::Text;
        let span = if self.pending.is_empty() {
            self.position
        } else {
            self.pending_span
        };
        let literal = std::mem::take(&mut self.pending);
        self.ready
            .push_back(Token::new(TokenKind::Literal, literal).at(span));
        self.finished = true;
    }
}

impl<R: Read> Iterator for Lexer<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.ready.pop_front() {
                return Some(Ok(token));
            }
            if self.finished {
                return None;
            }
            match self.bytes.next() {
                Some(Ok(byte)) => self.feed(byte),
                Some(Err(err)) => {
                    self.finished = true;
                    return Some(Err(err.into()));
                }
                None => self.finish(),
            }
        }
    }
}

/// Lexes a whole template source into tokens.
///
/// # Errors
///
/// Fails only when reading `source` fails.
pub fn lex<R: Read>(source: R) -> Result<Vec<Token>> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TemplexError;
    use std::io;

    fn kinds_and_text(input: &str) -> Vec<(TokenKind, String)> {
        lex(input.as_bytes())
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text()))
            .collect()
    }

    fn literal(text: &str) -> (TokenKind, String) {
        (TokenKind::Literal, text.to_string())
    }

    /// Hands out at most one byte per `read` call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((first, rest)) if !buf.is_empty() => {
                    buf[0] = *first;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "source gone"))
        }
    }

    #[test]
    fn text_without_tags_is_one_literal() {
        for input in ["", "plain text", "a { b } c", "json: {\"a\": 1}", "调度在"] {
            assert_eq!(kinds_and_text(input), vec![literal(input)], "input {:?}", input);
        }
    }

    #[test]
    fn lone_variable_has_no_leading_literal() {
        assert_eq!(
            kinds_and_text("{{.a.b}}"),
            vec![(TokenKind::Variable, "{{.a.b}}".to_string()), literal("")]
        );
    }

    #[test]
    fn variable_without_dot_is_literal() {
        assert_eq!(kinds_and_text("{{x}}"), vec![literal("{{x}}")]);
    }

    #[test]
    fn variable_between_text() {
        assert_eq!(
            kinds_and_text("调度在{{.tasks.first.started_at}}开始"),
            vec![
                literal("调度在"),
                (TokenKind::Variable, "{{.tasks.first.started_at}}".to_string()),
                literal("开始"),
            ]
        );
    }

    #[test]
    fn loop_block() {
        assert_eq!(
            kinds_and_text("{{#for .tasks}}调度在{{.items.started_at}}开始{{#end}}"),
            vec![
                (TokenKind::LoopBegin, "{{#for .tasks}}".to_string()),
                literal("调度在"),
                (TokenKind::Variable, "{{.items.started_at}}".to_string()),
                literal("开始"),
                (TokenKind::LoopEnd, "{{#end}}".to_string()),
                literal(""),
            ]
        );
    }

    #[test]
    fn spaces_and_upper_case_keywords() {
        assert_eq!(
            kinds_and_text("{{  #FOR   .tasks  }}x{{ .a }}{{ #End  }}"),
            vec![
                (TokenKind::LoopBegin, "{{  #FOR   .tasks  }}".to_string()),
                literal("x"),
                (TokenKind::Variable, "{{ .a }}".to_string()),
                (TokenKind::LoopEnd, "{{ #End  }}".to_string()),
                literal(""),
            ]
        );
    }

    #[test]
    fn numeric_and_list_keyword_segments() {
        assert_eq!(
            kinds_and_text("{{.items.0.name}}{{.items.last}}"),
            vec![
                (TokenKind::Variable, "{{.items.0.name}}".to_string()),
                (TokenKind::Variable, "{{.items.last}}".to_string()),
                literal(""),
            ]
        );
    }

    #[test]
    fn malformed_tags_degrade_to_literal() {
        for input in [
            "{{#format .x}}",
            "{{#for x}}",
            "{{#ending}}",
            "{{.a b}}",
            "{{.1a}}",
            "{{.a..b}}",
            "{{.}}",
            "{{.a}x",
            "{{ # for .a}}",
            "{{.a-b}}",
            "{.a}}",
        ] {
            assert_eq!(kinds_and_text(input), vec![literal(input)], "input {:?}", input);
        }
    }

    #[test]
    fn unterminated_tag_is_flushed_at_end() {
        assert_eq!(kinds_and_text("before {{.a"), vec![literal("before {{.a")]);
        assert_eq!(kinds_and_text("x{{#for .a }"), vec![literal("x{{#for .a }")]);
    }

    #[test]
    fn mismatching_brace_starts_a_new_attempt() {
        assert_eq!(
            kinds_and_text("{{{{.a}}"),
            vec![
                literal("{{"),
                (TokenKind::Variable, "{{.a}}".to_string()),
                literal(""),
            ]
        );
        assert_eq!(kinds_and_text("{{{.a}}"), vec![literal("{{{.a}}")]);
        assert_eq!(
            kinds_and_text("{x{{.a}}"),
            vec![
                literal("{x"),
                (TokenKind::Variable, "{{.a}}".to_string()),
                literal(""),
            ]
        );
    }

    #[test]
    fn rejected_attempt_merges_with_following_text() {
        assert_eq!(
            kinds_and_text("a{{b}}c{{.d}}"),
            vec![
                literal("a{{b}}c"),
                (TokenKind::Variable, "{{.d}}".to_string()),
                literal(""),
            ]
        );
    }

    #[test]
    fn spans_track_lines_and_columns() {
        let tokens = lex("ab\n  {{.x}}\n{{#end}}".as_bytes()).unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 1, 1));
        assert_eq!(tokens[1].kind, TokenKind::Variable);
        assert_eq!(tokens[1].span, Span::new(5, 2, 3));
        assert_eq!(tokens[2].text(), "\n");
        assert_eq!(tokens[2].span, Span::new(11, 2, 9));
        assert_eq!(tokens[3].kind, TokenKind::LoopEnd);
        assert_eq!(tokens[3].span, Span::new(12, 3, 1));
    }

    #[test]
    fn works_on_a_trickling_source() {
        let input = "A{{ #for .x }}B{{.__value__}}C{{#END}}D";
        let streamed: Vec<Token> = Lexer::new(Trickle(input.as_bytes()))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(streamed, lex(input.as_bytes()).unwrap());
        assert_eq!(streamed.len(), 7);
    }

    #[test]
    fn read_errors_propagate() {
        let err = lex(Broken).unwrap_err();
        assert!(matches!(err, TemplexError::Io(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
    }

    #[test]
    fn step_is_pure() {
        assert_eq!(step(State::Text, b'a'), (State::Text, Effect::Text));
        assert_eq!(step(State::Text, b'{'), (State::OpenBrace, Effect::Tentative));
        assert_eq!(step(State::OpenBrace, b'x'), (State::Text, Effect::Reject));
        assert_eq!(
            step(State::CloseBrace(TokenKind::LoopEnd), b'}'),
            (State::Text, Effect::Complete(TokenKind::LoopEnd))
        );
        assert_eq!(
            step(State::Keyword { keyword: Keyword::For, matched: 2 }, b'R'),
            (State::AfterKeyword(Keyword::For), Effect::Tentative)
        );
    }
}
