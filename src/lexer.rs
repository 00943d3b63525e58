//! Segments an [InputStream](crate::InputStream) into [Token]s.
//!
//! A [Lexer] is built once from a set of [TokenType] classifiers and can then tokenize any
//! number of streams, one at a time, via [Lexer::next_token]. Internally it runs a small state
//! machine over three modes: [Mode::Normal] (the default), [Mode::LineComment] and
//! [Mode::BlockComment], entered when the accumulated text of a lexeme matches a configured
//! comment-start marker.
//!
//! Classification of a finished lexeme tries, in order, the literal type (if configured), then
//! separators, then prefixes, then postfixes — each longest pattern first within its category
//! — and finally keyword/word lookup. Separators, prefixes and postfixes can turn one lexeme
//! into several tokens (e.g. `x=1` through a `=` separator becomes `x`, `=`, `1`); those are
//! queued on an emission stack and drained left to right before the lexer reads more input.

use crate::error::LexicalError;
use crate::input_buffer::InputBuffer;
use crate::lexeme::{Kind, Token, TokenType};
use crate::position::Position;
use crate::util::Log;
use crate::InputStream;
use once_cell::unsync::OnceCell;
use std::collections::HashMap;
use std::rc::Rc;

const NORMAL_FILL_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    LineComment,
    BlockComment,
}

/// Scans an [InputStream] into [Token]s according to a fixed set of [TokenType] classifiers.
pub struct Lexer {
    keywords: HashMap<String, Rc<TokenType>>,
    words: Vec<Rc<TokenType>>,
    prefixes: Vec<Rc<TokenType>>,
    postfixes: Vec<Rc<TokenType>>,
    separators: Vec<Rc<TokenType>>,
    literal: Option<Rc<TokenType>>,

    line_comment_start: Option<String>,
    block_comment: Option<(String, String)>,

    mode: Mode,
    buffer: InputBuffer,
    position: Position,
    current_lit_delim: Option<char>,
    emission: Vec<Token>,
    debug: OnceCell<Log<&'static str>>,
}

impl Lexer {
    pub fn new(token_types: Vec<Rc<TokenType>>) -> Self {
        let mut keywords = HashMap::new();
        let mut words = Vec::new();
        let mut prefixes = Vec::new();
        let mut postfixes = Vec::new();
        let mut separators = Vec::new();
        let mut literal = None;

        for tt in token_types {
            match &tt.kind {
                Kind::Keyword { text, .. } => {
                    keywords.insert(text.clone(), tt);
                }
                Kind::Literal { .. } => literal = Some(tt),
                Kind::Prefix { .. } => prefixes.push(tt),
                Kind::Postfix { .. } => postfixes.push(tt),
                Kind::Separator { .. } => separators.push(tt),
                Kind::Word { .. } => words.push(tt),
            }
        }

        // longest pattern first within each category; `sort_by` is stable so ties keep
        // registration order.
        prefixes.sort_by(|a, b| b.pattern_len().cmp(&a.pattern_len()));
        postfixes.sort_by(|a, b| b.pattern_len().cmp(&a.pattern_len()));
        separators.sort_by(|a, b| b.pattern_len().cmp(&a.pattern_len()));

        Self {
            keywords,
            words,
            prefixes,
            postfixes,
            separators,
            literal,
            line_comment_start: None,
            block_comment: None,
            mode: Mode::Normal,
            buffer: InputBuffer::new(NORMAL_FILL_SIZE),
            position: Position::start(),
            current_lit_delim: None,
            emission: Vec::new(),
            debug: OnceCell::new(),
        }
    }

    /// Assign a debug trace level, printed to stdout under `cfg(debug_assertions)` as tokens
    /// are emitted. May only be called once per lexer.
    pub fn set_log(&mut self, log_label: Log<&'static str>) -> Result<(), String> {
        self.debug
            .set(log_label)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    pub fn enable_line_comments(&mut self, start: impl Into<String>) -> &mut Self {
        self.line_comment_start = Some(start.into());
        self
    }

    pub fn enable_block_comments(
        &mut self,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> &mut Self {
        self.block_comment = Some((start.into(), end.into()));
        self
    }

    /// Reset scan state so this lexer's configuration can be reused against a fresh stream.
    pub fn reset(&mut self) {
        self.mode = Mode::Normal;
        self.buffer = InputBuffer::new(NORMAL_FILL_SIZE);
        self.position = Position::start();
        self.current_lit_delim = None;
        self.emission.clear();
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Pull the next token from `stream`, or `None` at end of input.
    pub fn next_token(
        &mut self,
        stream: &mut dyn InputStream,
    ) -> Result<Option<Token>, LexicalError> {
        loop {
            if let Some(token) = self.emission.pop() {
                return Ok(Some(token));
            }
            match self.mode {
                Mode::Normal => {
                    let (consumed, start, terminated) = self.accumulate_normal(stream);
                    if consumed.is_empty() {
                        if !terminated {
                            return Ok(None);
                        }
                        continue;
                    }
                    if self.enters_comment(&consumed) {
                        continue;
                    }
                    let tokens = match self.classify(&consumed, start) {
                        Ok(tokens) => tokens,
                        Err(err) => {
                            #[cfg(debug_assertions)]
                            {
                                let debug = self.debug.get().copied().unwrap_or(Log::None);
                                if debug.order() >= Log::Result(()).order() {
                                    println!("[{}; LexicalError]: {}", debug, err);
                                }
                            }
                            return Err(err);
                        }
                    };
                    #[cfg(debug_assertions)]
                    {
                        let debug = self.debug.get().copied().unwrap_or(Log::None);
                        if debug.order() >= Log::Verbose(()).order() {
                            for token in &tokens {
                                println!("[{}; token]: {:?} at {}", debug, token.text, start);
                            }
                        }
                    }
                    self.queue(tokens);
                }
                Mode::LineComment | Mode::BlockComment => {
                    if !self.scan_comment(stream) {
                        return Ok(None);
                    }
                    self.exit_comment_mode();
                }
            }
        }
    }

    fn queue(&mut self, tokens: Vec<Token>) {
        for token in tokens.into_iter().rev() {
            self.emission.push(token);
        }
    }

    fn escape_char(&self) -> Option<char> {
        self.literal.as_ref().and_then(|l| l.escape_char())
    }

    fn literal_delims(&self) -> &[char] {
        self.literal.as_deref().map_or(&[], |l| l.delimiters())
    }

    /// Track literal-open/close state and report whether `ch` terminates a lexeme. Delimiter
    /// characters toggle [current_lit_delim](Self::current_lit_delim) instead of being treated
    /// as whitespace; while a literal is open, nothing terminates.
    fn check_whitespace_and_track(&mut self, ch: char) -> bool {
        if self.literal_delims().contains(&ch) {
            match self.current_lit_delim {
                Some(delim) if delim == ch => self.current_lit_delim = None,
                Some(_) => {}
                None => self.current_lit_delim = Some(ch),
            }
            false
        } else if self.current_lit_delim.is_some() {
            false
        } else {
            ch.is_whitespace()
        }
    }

    /// Accumulate one lexeme, skipping leading whitespace. Returns the lexeme text, the
    /// position of its first character, and whether it ended because a terminating
    /// whitespace character was consumed (as opposed to end of input).
    fn accumulate_normal(&mut self, stream: &mut dyn InputStream) -> (String, Position, bool) {
        let mut consumed = String::new();
        let mut prev_char: Option<char> = None;
        let mut start = self.position;

        loop {
            if self.buffer.content(stream).is_empty() {
                return (consumed, start, false);
            }
            let pos_before = self.position;
            let ch = self
                .buffer
                .consume_char(stream)
                .expect("buffer reported non-empty content");
            self.position.advance(ch);

            if let (Some(escape), Some(prev)) = (self.escape_char(), prev_char) {
                if prev == escape {
                    if self.literal_delims().contains(&ch) {
                        consumed.pop();
                    }
                    consumed.push(ch);
                    prev_char = Some(ch);
                    continue;
                }
            }

            if self.check_whitespace_and_track(ch) {
                if consumed.is_empty() {
                    start = self.position;
                    prev_char = None;
                    continue;
                }
                return (consumed, start, true);
            }

            if consumed.is_empty() {
                start = pos_before;
            }
            consumed.push(ch);
            prev_char = Some(ch);
        }
    }

    /// Check whether `consumed` opens a configured comment and, if so, switch mode.
    fn enters_comment(&mut self, consumed: &str) -> bool {
        if let Some(start) = self.line_comment_start.clone() {
            if consumed.starts_with(&start) {
                self.mode = Mode::LineComment;
                self.buffer.set_fill_size(1);
                return true;
            }
        }
        if let Some((start, end)) = self.block_comment.clone() {
            if consumed.starts_with(&start) {
                self.mode = Mode::BlockComment;
                self.buffer.set_fill_size(end.chars().count().max(1));
                return true;
            }
        }
        false
    }

    /// Advance through the current comment, returning whether it was properly terminated
    /// (`false` means end of input was reached first).
    fn scan_comment(&mut self, stream: &mut dyn InputStream) -> bool {
        match self.mode {
            Mode::LineComment => loop {
                if self.buffer.content(stream).is_empty() {
                    return false;
                }
                let ch = self.buffer.consume_char(stream).unwrap();
                self.position.advance(ch);
                if ch == '\n' {
                    return true;
                }
            },
            Mode::BlockComment => {
                let end = self.block_comment.as_ref().unwrap().1.clone();
                loop {
                    let content = self.buffer.content(stream);
                    if content.is_empty() {
                        return false;
                    }
                    if content == end {
                        for ch in self.buffer.consume_all().chars() {
                            self.position.advance(ch);
                        }
                        return true;
                    }
                    let ch = self.buffer.consume_char(stream).unwrap();
                    self.position.advance(ch);
                }
            }
            Mode::Normal => unreachable!("scan_comment called outside a comment mode"),
        }
    }

    fn exit_comment_mode(&mut self) {
        self.mode = Mode::Normal;
        self.buffer.set_fill_size(NORMAL_FILL_SIZE);
    }

    /// Classify `text` (known to start at `start`) into one or more tokens, in left-to-right
    /// order. A separator/prefix/postfix match recurses into its remainder(s); text never
    /// spans a line break at this point, so column arithmetic by character count is safe.
    fn classify(&self, text: &str, start: Position) -> Result<Vec<Token>, LexicalError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(literal) = &self.literal {
            if literal.literal_matches(text) {
                return Ok(vec![Token::new(
                    text,
                    start.line,
                    start.column,
                    vec![literal.id()],
                )]);
            }
        }

        for separator in &self.separators {
            if let Some((left, matched, right)) = separator.separator_split(text) {
                let mut tokens = self.classify(&left, start)?;
                let sep_start = Position::new(start.line, start.column + left.chars().count());
                tokens.push(Token::new(
                    matched.clone(),
                    sep_start.line,
                    sep_start.column,
                    vec![separator.id()],
                ));
                let right_start =
                    Position::new(sep_start.line, sep_start.column + matched.chars().count());
                tokens.extend(self.classify(&right, right_start)?);
                return Ok(tokens);
            }
        }

        for prefix in &self.prefixes {
            if let Some((matched, right)) = prefix.prefix_split(text) {
                let mut tokens = vec![Token::new(
                    matched.clone(),
                    start.line,
                    start.column,
                    vec![prefix.id()],
                )];
                let right_start =
                    Position::new(start.line, start.column + matched.chars().count());
                tokens.extend(self.classify(&right, right_start)?);
                return Ok(tokens);
            }
        }

        for postfix in &self.postfixes {
            if let Some((left, matched)) = postfix.postfix_split(text) {
                let mut tokens = self.classify(&left, start)?;
                let post_start =
                    Position::new(start.line, start.column + left.chars().count());
                tokens.push(Token::new(
                    matched,
                    post_start.line,
                    post_start.column,
                    vec![postfix.id()],
                ));
                return Ok(tokens);
            }
        }

        let mut matched_types = Vec::new();
        if let Some(tt) = self.keywords.get(text) {
            matched_types.push(tt.id());
        } else {
            let upper = text.to_uppercase();
            if let Some(tt) = self.keywords.get(&upper) {
                if !tt.is_case_sensitive() {
                    matched_types.push(tt.id());
                }
            }
        }
        for word in &self.words {
            if word.word_matches(text) {
                matched_types.push(word.id());
            }
        }

        if matched_types.is_empty() {
            return Err(LexicalError::new(start.line, start.column, text));
        }
        Ok(vec![Token::new(
            text,
            start.line,
            start.column,
            matched_types,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StringStream;

    fn lexer_with(types: Vec<TokenType>) -> Lexer {
        Lexer::new(types.into_iter().map(Rc::new).collect())
    }

    #[test]
    fn splits_keyword_and_word_tokens_on_whitespace() {
        let mut lexer = lexer_with(vec![
            TokenType::keyword("let", true),
            TokenType::word(r"[a-z][a-z0-9]*").unwrap(),
        ]);
        let mut stream = StringStream::new("let x");
        let first = lexer.next_token(&mut stream).unwrap().unwrap();
        assert_eq!(first.text, "let");
        assert_eq!(first.start_line, 1);
        assert_eq!(first.start_column, 0);
        let second = lexer.next_token(&mut stream).unwrap().unwrap();
        assert_eq!(second.text, "x");
        assert_eq!(second.start_column, 4);
        assert!(lexer.next_token(&mut stream).unwrap().is_none());
    }

    #[test]
    fn reports_position_of_unrecognized_lexeme() {
        let mut lexer = lexer_with(vec![TokenType::keyword("let", true)]);
        let mut stream = StringStream::new("let $$$");
        lexer.next_token(&mut stream).unwrap();
        let err = lexer.next_token(&mut stream).unwrap_err();
        assert_eq!(err.text, "$$$");
        assert_eq!(err.column, 4);
    }

    #[test]
    fn separator_splits_one_lexeme_into_three_tokens() {
        let mut lexer = lexer_with(vec![
            TokenType::separator("=", false),
            TokenType::word(r"[a-z]+").unwrap(),
            TokenType::word(r"[0-9]+").unwrap(),
        ]);
        let mut stream = StringStream::new("x=1");
        let a = lexer.next_token(&mut stream).unwrap().unwrap();
        let b = lexer.next_token(&mut stream).unwrap().unwrap();
        let c = lexer.next_token(&mut stream).unwrap().unwrap();
        assert_eq!((a.text.as_str(), a.start_column), ("x", 0));
        assert_eq!((b.text.as_str(), b.start_column), ("=", 1));
        assert_eq!((c.text.as_str(), c.start_column), ("1", 2));
    }

    #[test]
    fn line_comment_is_skipped_entirely() {
        let mut lexer = lexer_with(vec![TokenType::word(r"[a-z]+").unwrap()]);
        lexer.enable_line_comments("//");
        let mut stream = StringStream::new("a // this is ignored\nb");
        let first = lexer.next_token(&mut stream).unwrap().unwrap();
        let second = lexer.next_token(&mut stream).unwrap().unwrap();
        assert_eq!(first.text, "a");
        assert_eq!(second.text, "b");
        assert_eq!(second.start_line, 2);
    }

    #[test]
    fn literal_keeps_delimiters_and_resolves_escaped_delimiter() {
        let mut lexer = lexer_with(vec![TokenType::literal(vec!['"'], '\\')]);
        let mut stream = StringStream::new(r#""a\"b""#);
        let token = lexer.next_token(&mut stream).unwrap().unwrap();
        assert_eq!(token.text, "\"a\"b\"");
    }
}
