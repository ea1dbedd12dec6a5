//! The incremental parser core.
//!
//! [`StreamingParser`] consumes an arbitrarily-chunked character stream of
//! free text interleaved with JSON-like structures. A top-level mode switch
//! alternates between text accumulation and a lenient structural state
//! machine; completed entities land in an append-only ledger, and
//! [`StreamingParser::preview`] exposes the ledger plus the in-progress
//! entity as a consistent [`Snapshot`] at any point.
//!
//! The grammar is intentionally permissive: bareword keys, missing colons,
//! missing or duplicated commas, and stray characters are tolerated by
//! discarding, never by raising an error. Input never needs to be aligned to
//! any structural boundary; a single character per call is valid, and a
//! backslash that arrives as the last available character suspends parsing
//! exactly there until more input arrives.
//!
//! # Examples
//!
//! ```rust
//! use jsonweave::{ParserOptions, StreamingParser};
//!
//! let mut parser = StreamingParser::new(ParserOptions::default());
//! parser.append("hola {\"name\":\"John\",");
//! parser.append("\"age\":30}");
//! let snapshot = parser.finish();
//! assert!(snapshot.complete);
//! assert_eq!(snapshot.entities[0].as_text(), Some("hola "));
//! assert_eq!(snapshot.entities[1].id, Some(0));
//! ```

use std::mem;
use std::sync::Arc;

use crate::{
    entity::{Entity, Snapshot},
    options::ParserOptions,
    stack::{ContainerKind, ContainerStack, PathComponent},
    value::Value,
};

// ------------------------------------------------------------------------------------------------
// Modes and sub-states
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    Structural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Start,
    InObject,
    KeyQuoted,
    KeyUnquoted,
    AfterKey,
    Value,
    ValueQuoted,
    ValueNumber,
    ValueLiteral,
    InArray,
    AfterValue,
}

/// The result of one processing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The pass exhausted its budget with input still buffered; call
    /// [`StreamingParser::run`] again, yielding to the host in between if
    /// desired.
    Pending,
    /// All currently available input has been consumed (or parsing is
    /// suspended on a truncated escape awaiting more input).
    Idle,
}

// ------------------------------------------------------------------------------------------------
// Input buffer
// ------------------------------------------------------------------------------------------------

/// Append-only input queue with a read cursor. Appends are always safe while
/// the cursor is mid-buffer; storage is reclaimed whenever the cursor
/// catches up.
#[derive(Debug, Default)]
struct InputBuffer {
    buf: String,
    pos: usize,
}

impl InputBuffer {
    fn push(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    fn peek(&self) -> Option<char> {
        self.buf[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.buf[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn has_remaining(&self) -> bool {
        self.pos < self.buf.len()
    }

    fn compact(&mut self) {
        if !self.has_remaining() {
            self.buf.clear();
            self.pos = 0;
        }
    }

    fn clear(&mut self) {
        self.buf.clear();
        self.pos = 0;
    }
}

// ------------------------------------------------------------------------------------------------
// Parser
// ------------------------------------------------------------------------------------------------

/// The incremental text/JSON parser.
///
/// One instance owns all of its state; there is no shared or global state.
/// Feed input with [`append`](Self::append), drive processing with
/// [`run`](Self::run) (or let [`finish`](Self::finish) drain everything),
/// and read results with [`preview`](Self::preview).
pub struct StreamingParser {
    input: InputBuffer,
    mode: Mode,
    state: ParseState,
    /// Free text accumulated since the last entity boundary.
    text: String,
    /// The one in-flight scalar token (string/number/literal).
    token: String,
    /// Set only while a key has been captured and its value not yet
    /// committed.
    pending_key: Option<String>,
    stack: ContainerStack,
    /// Finished entities, in discovery order.
    entities: Vec<Arc<Entity>>,
    /// Sequence id of the in-progress JSON entity.
    current_id: Option<u64>,
    next_id: u64,
    end_of_input: bool,
    complete: bool,
    options: ParserOptions,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn decode_escape(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        other => other,
    }
}

impl StreamingParser {
    /// Creates a parser with the given options.
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Self {
            input: InputBuffer::default(),
            mode: Mode::Text,
            state: ParseState::Start,
            text: String::new(),
            token: String::new(),
            pending_key: None,
            stack: ContainerStack::default(),
            entities: Vec::new(),
            current_id: None,
            next_id: 0,
            end_of_input: false,
            complete: false,
            options,
        }
    }

    /// Appends a chunk to the input queue without processing it.
    ///
    /// Chunks may be split anywhere, including in the middle of an escape
    /// sequence or a multi-byte sequence of text (as long as each chunk is
    /// itself valid UTF-8, which `&str` guarantees).
    pub fn append(&mut self, chunk: &str) {
        self.input.push(chunk);
    }

    /// Processes up to `step_budget` characters of buffered input.
    ///
    /// Returns [`StepOutcome::Pending`] when input remains, so callers can
    /// interleave passes with other work instead of blocking on very large
    /// inputs. Concurrent appends between passes are always safe.
    pub fn run(&mut self) -> StepOutcome {
        let mut budget = self.options.step_budget.max(1);
        let mut suspended = false;
        while budget > 0 {
            let Some(c) = self.input.peek() else { break };
            let progressed = match self.mode {
                Mode::Text => self.text_char(c),
                Mode::Structural => self.structural_char(c),
            };
            if !progressed {
                suspended = true;
                break;
            }
            budget -= 1;
        }
        self.input.compact();
        if suspended || !self.input.has_remaining() {
            StepOutcome::Idle
        } else {
            StepOutcome::Pending
        }
    }

    /// True once end-of-stream finalization has run.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// True while appended input has not been fully consumed.
    #[must_use]
    pub fn has_pending_input(&self) -> bool {
        self.input.has_remaining()
    }

    /// The live root of the in-progress JSON entity, if one is open.
    ///
    /// The returned value reflects every key and element committed so far;
    /// it is the same tree the parser mutates, read in place.
    #[must_use]
    pub fn current_value(&self) -> Option<&Value> {
        self.stack.root_ref()
    }

    /// Marks the end of the input stream. Further `run` passes will resolve
    /// any suspended escape and drain the queue; [`finish`](Self::finish)
    /// does both and finalizes.
    pub fn close(&mut self) {
        self.end_of_input = true;
    }

    /// Runs end-of-stream finalization and returns the final snapshot.
    ///
    /// Pending free text is flushed as a finished entity; an unfinished JSON
    /// entity is force-finished even with unbalanced containers, so the
    /// stream always terminates with a bounded, inspectable result. An
    /// in-flight scalar token is dropped with the rest of its open scope.
    pub fn finish(&mut self) -> Snapshot {
        self.close();
        while self.run() == StepOutcome::Pending {}
        match self.mode {
            Mode::Text => self.flush_text(),
            Mode::Structural => {
                let value = self.stack.take_root().unwrap_or(Value::Null);
                self.finish_entity(value);
            }
        }
        self.complete = true;
        self.preview()
    }

    /// Clears all parser and ledger state back to initial values.
    pub fn reset(&mut self) {
        self.input.clear();
        self.mode = Mode::Text;
        self.state = ParseState::Start;
        self.text.clear();
        self.token.clear();
        self.pending_key = None;
        self.stack.clear();
        self.entities.clear();
        self.current_id = None;
        self.next_id = 0;
        self.end_of_input = false;
        self.complete = false;
    }

    // --------------------------------------------------------------------------------------------
    // Mode switcher
    // --------------------------------------------------------------------------------------------

    /// Text mode. The canonical escape rule is the lookahead pair: a
    /// backslash followed by one of `{ [ } ]` emits that bracket literally
    /// and never enters structural mode; a backslash followed by anything
    /// else is itself literal. Returns `false` to suspend when the character
    /// after a backslash has not arrived yet.
    fn text_char(&mut self, c: char) -> bool {
        match c {
            '\\' => match self.input.peek_second() {
                Some(next @ ('{' | '[' | '}' | ']')) => {
                    self.input.bump();
                    self.input.bump();
                    self.text.push(next);
                    true
                }
                Some(_) => {
                    self.input.bump();
                    self.text.push('\\');
                    true
                }
                None if self.end_of_input => {
                    self.input.bump();
                    self.text.push('\\');
                    true
                }
                None => false,
            },
            // An unescaped opening bracket starts a new JSON entity; the
            // bracket itself is re-examined by the Start state.
            '{' | '[' => {
                self.flush_text();
                self.mode = Mode::Structural;
                self.state = ParseState::Start;
                self.current_id = Some(self.next_id);
                self.next_id += 1;
                true
            }
            _ => {
                self.input.bump();
                self.text.push(c);
                true
            }
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = mem::take(&mut self.text);
            self.entities.push(Arc::new(Entity::text(text)));
        }
    }

    // --------------------------------------------------------------------------------------------
    // Structural state machine
    // --------------------------------------------------------------------------------------------

    fn structural_char(&mut self, c: char) -> bool {
        match self.state {
            ParseState::Start => self.on_start(c),
            ParseState::InObject => self.on_in_object(c),
            ParseState::KeyQuoted => return self.on_key_quoted(c),
            ParseState::KeyUnquoted => self.on_key_unquoted(c),
            ParseState::AfterKey => self.on_after_key(c),
            ParseState::Value => self.on_value(c),
            ParseState::ValueQuoted => return self.on_value_quoted(c),
            ParseState::ValueNumber => self.on_value_number(c),
            ParseState::ValueLiteral => self.on_value_literal(c),
            ParseState::InArray => self.on_in_array(c),
            ParseState::AfterValue => self.on_after_value(c),
        }
        true
    }

    fn on_start(&mut self, c: char) {
        match c {
            '{' => {
                self.stack.open_root(ContainerKind::Object);
                self.state = ParseState::InObject;
                self.input.bump();
            }
            '[' => {
                self.stack.open_root(ContainerKind::Array);
                self.state = ParseState::InArray;
                self.input.bump();
            }
            // Whitespace and stray characters alike.
            _ => self.input.bump(),
        }
    }

    fn on_in_object(&mut self, c: char) {
        match c {
            c if c.is_whitespace() => self.input.bump(),
            '}' => {
                self.input.bump();
                self.close_container();
            }
            '"' => {
                self.pending_key = Some(String::new());
                self.state = ParseState::KeyQuoted;
                self.input.bump();
            }
            c if is_ident_start(c) => {
                // Bareword key, a non-standard extension.
                self.pending_key = Some(String::from(c));
                self.state = ParseState::KeyUnquoted;
                self.input.bump();
            }
            // Stray commas and anything else are discarded.
            _ => self.input.bump(),
        }
    }

    /// Quoted key capture. Returns `false` to suspend on a truncated escape.
    fn on_key_quoted(&mut self, c: char) -> bool {
        match c {
            '\\' => match self.input.peek_second() {
                Some(esc) => {
                    self.input.bump();
                    self.input.bump();
                    if let Some(key) = self.pending_key.as_mut() {
                        key.push(decode_escape(esc));
                    }
                    true
                }
                None if self.end_of_input => {
                    // Dangling escape at end of stream; nothing to decode.
                    self.input.bump();
                    true
                }
                None => false,
            },
            '"' => {
                self.input.bump();
                self.state = ParseState::AfterKey;
                true
            }
            _ => {
                self.input.bump();
                if let Some(key) = self.pending_key.as_mut() {
                    key.push(c);
                }
                true
            }
        }
    }

    fn on_key_unquoted(&mut self, c: char) {
        match c {
            // Terminators are re-examined in AfterKey.
            ':' => self.state = ParseState::AfterKey,
            c if c.is_whitespace() => self.state = ParseState::AfterKey,
            c if is_ident_char(c) => {
                self.input.bump();
                if let Some(key) = self.pending_key.as_mut() {
                    key.push(c);
                }
            }
            _ => self.state = ParseState::AfterKey,
        }
    }

    fn on_after_key(&mut self, c: char) {
        match c {
            c if c.is_whitespace() => self.input.bump(),
            ':' => {
                self.input.bump();
                self.state = ParseState::Value;
            }
            // Lenient: missing colon; the character is re-examined.
            _ => self.state = ParseState::Value,
        }
    }

    fn on_value(&mut self, c: char) {
        match c {
            c if c.is_whitespace() => self.input.bump(),
            '"' => {
                self.token.clear();
                self.state = ParseState::ValueQuoted;
                self.input.bump();
            }
            '{' => {
                self.open_child(ContainerKind::Object);
                self.state = ParseState::InObject;
                self.input.bump();
            }
            '[' => {
                self.open_child(ContainerKind::Array);
                self.state = ParseState::InArray;
                self.input.bump();
            }
            '0'..='9' | '-' => {
                self.token.clear();
                self.token.push(c);
                self.state = ParseState::ValueNumber;
                self.input.bump();
            }
            't' | 'f' | 'n' => {
                self.token.clear();
                self.token.push(c);
                self.state = ParseState::ValueLiteral;
                self.input.bump();
            }
            _ => self.input.bump(),
        }
    }

    /// Quoted string value. Returns `false` to suspend on a truncated
    /// escape.
    fn on_value_quoted(&mut self, c: char) -> bool {
        match c {
            '\\' => match self.input.peek_second() {
                Some(esc) => {
                    self.input.bump();
                    self.input.bump();
                    self.token.push(decode_escape(esc));
                    true
                }
                None if self.end_of_input => {
                    self.input.bump();
                    true
                }
                None => false,
            },
            '"' => {
                self.input.bump();
                let token = mem::take(&mut self.token);
                self.commit_scalar(Value::String(token));
                true
            }
            _ => {
                self.input.bump();
                self.token.push(c);
                true
            }
        }
    }

    fn on_value_number(&mut self, c: char) {
        match c {
            '0'..='9' | '.' | 'e' | 'E' | '+' | '-' => {
                self.input.bump();
                self.token.push(c);
            }
            _ => {
                // Terminator; the current character is re-examined in
                // AfterValue. Malformed tokens such as `1e` or `-` yield the
                // NaN sentinel, never an error.
                let token = mem::take(&mut self.token);
                let number = token.parse::<f64>().unwrap_or(f64::NAN);
                self.commit_scalar(Value::Number(number));
            }
        }
    }

    fn on_value_literal(&mut self, c: char) {
        match c {
            c if c.is_ascii_alphabetic() => {
                self.input.bump();
                self.token.push(c);
            }
            _ => {
                let token = mem::take(&mut self.token);
                let value = match token.as_str() {
                    "true" => Value::Boolean(true),
                    "false" => Value::Boolean(false),
                    "null" => Value::Null,
                    // Unknown barewords are committed verbatim.
                    _ => Value::String(token),
                };
                self.commit_scalar(value);
            }
        }
    }

    fn on_in_array(&mut self, c: char) {
        match c {
            c if c.is_whitespace() => self.input.bump(),
            ']' => {
                self.input.bump();
                self.close_container();
            }
            // Re-examined as a value.
            _ => self.state = ParseState::Value,
        }
    }

    fn on_after_value(&mut self, c: char) {
        match c {
            c if c.is_whitespace() => self.input.bump(),
            ',' => {
                self.input.bump();
                self.state = match self.stack.top_kind() {
                    Some(ContainerKind::Object) => ParseState::InObject,
                    _ => ParseState::InArray,
                };
            }
            '}' if self.stack.top_kind() == Some(ContainerKind::Object) => {
                self.input.bump();
                self.close_container();
            }
            ']' if self.stack.top_kind() == Some(ContainerKind::Array) => {
                self.input.bump();
                self.close_container();
            }
            // Lenient: a missing comma drops characters until a separator
            // or the container's closing bracket appears.
            _ => self.input.bump(),
        }
    }

    // --------------------------------------------------------------------------------------------
    // Container plumbing
    // --------------------------------------------------------------------------------------------

    fn open_child(&mut self, kind: ContainerKind) {
        let key = self.pending_key.take();
        self.stack.open_child(kind, key);
    }

    /// Stores a scalar in the innermost open container, clearing the pending
    /// key, and resumes sibling scanning.
    fn commit_scalar(&mut self, value: Value) {
        let key = self.pending_key.take();
        self.stack.commit(key, value);
        self.state = ParseState::AfterValue;
    }

    fn close_container(&mut self) {
        if self.stack.pop() {
            let value = self.stack.take_root().unwrap_or(Value::Null);
            self.finish_entity(value);
        } else {
            self.state = ParseState::AfterValue;
        }
    }

    fn finish_entity(&mut self, value: Value) {
        let id = self.current_id.take();
        self.entities.push(Arc::new(Entity::json(id, true, value)));
        self.mode = Mode::Text;
        self.pending_key = None;
        self.token.clear();
    }

    // --------------------------------------------------------------------------------------------
    // Preview synthesizer
    // --------------------------------------------------------------------------------------------

    /// Builds an observer-facing snapshot without mutating parser state.
    ///
    /// Finished entities are shared with the ledger. A non-empty text buffer
    /// appears as a synthetic finished text entity. An in-progress JSON
    /// entity carries a copy of its live value tree; while a string value is
    /// actively being typed, the in-flight token is spliced into that copy
    /// at the open position. Scalars mid-token in any other sub-state
    /// (numbers, literals, bareword keys) are absent until committed.
    #[must_use]
    pub fn preview(&self) -> Snapshot {
        let mut entities = self.entities.clone();
        match self.mode {
            Mode::Text => {
                if !self.text.is_empty() {
                    entities.push(Arc::new(Entity::text(self.text.clone())));
                }
            }
            Mode::Structural => {
                if let Some(root) = self.stack.root_ref() {
                    let value = if self.state == ParseState::ValueQuoted {
                        self.spliced(root)
                    } else {
                        root.clone()
                    };
                    entities.push(Arc::new(Entity::json(self.current_id, false, value)));
                }
            }
        }
        Snapshot {
            complete: self.complete,
            entities,
        }
    }

    /// Deep-copies the live tree and splices the in-flight string token into
    /// the innermost open container of the copy. The canonical tree is never
    /// touched.
    fn spliced(&self, root: &Value) -> Value {
        let mut copy = root.clone();
        if let Some(target) = descend(&mut copy, self.stack.open_path()) {
            match target {
                Value::Object(map) => {
                    if let Some(key) = &self.pending_key {
                        map.insert(key.clone(), Value::String(self.token.clone()));
                    }
                }
                Value::Array(items) => {
                    // The token is committed only on the closing quote, so it
                    // is absent from the copy unless an identical element was
                    // just committed; skip the splice in that case.
                    let duplicate =
                        matches!(items.last(), Some(Value::String(s)) if *s == self.token);
                    if !duplicate {
                        items.push(Value::String(self.token.clone()));
                    }
                }
                _ => {}
            }
        }
        copy
    }
}

/// Walks `path` components down a value tree.
fn descend<'a>(
    value: &'a mut Value,
    path: impl Iterator<Item = &'a PathComponent>,
) -> Option<&'a mut Value> {
    let mut current = value;
    for component in path {
        current = match (component, current) {
            (PathComponent::Key(k), Value::Object(map)) => map.get_mut(k)?,
            (PathComponent::Index(i), Value::Array(items)) => items.get_mut(*i)?,
            _ => return None,
        };
    }
    Some(current)
}
