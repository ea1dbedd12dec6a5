//! The input/scheduling shell around a [`StreamingParser`].
//!
//! A [`ParserSession`] drives processing passes, publishes a [`Snapshot`] to
//! subscribed observers after every pass, and resolves one-shot completion
//! hooks exactly once when the stream is finalized. Processing is
//! cooperative and single-threaded; the exclusive `&mut self` receivers are
//! what guarantees that a second pass can never start while one is active.

use crate::{
    entity::Snapshot,
    error::SessionError,
    options::{FinalizeOptions, ParserOptions},
    parser::{StepOutcome, StreamingParser},
};

type Observer = Box<dyn FnMut(&Snapshot)>;
type CompletionHook = Box<dyn FnOnce(&Snapshot)>;

/// Owns a parser, an observer list, and the pass loop.
///
/// # Examples
///
/// ```rust
/// use jsonweave::{FinalizeOptions, ParserOptions, ParserSession};
///
/// let mut session = ParserSession::new(ParserOptions::default());
/// session.append("hola {\"name\":\"John\"}").unwrap();
/// let snapshot = session.finalize(FinalizeOptions::default()).unwrap();
/// assert!(snapshot.complete);
/// assert_eq!(snapshot.entities.len(), 2);
/// ```
pub struct ParserSession {
    parser: StreamingParser,
    observers: Vec<Observer>,
    completion_hooks: Vec<CompletionHook>,
    /// The terminal snapshot of the last finalized stream, kept so late
    /// completion hooks can resolve immediately.
    last_final: Option<Snapshot>,
}

impl ParserSession {
    /// Creates a session with the given parser options.
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Self {
            parser: StreamingParser::new(options),
            observers: Vec::new(),
            completion_hooks: Vec::new(),
            last_final: None,
        }
    }

    /// Subscribes to the snapshot notification channel.
    ///
    /// The observer is called after every processing pass, including the
    /// zero-length pass caused by [`finalize`](Self::finalize). Observers
    /// persist across [`reset`](Self::reset).
    pub fn subscribe(&mut self, observer: impl FnMut(&Snapshot) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Registers a one-shot hook resolved with the terminal snapshot, the
    /// first one where `complete` is true.
    ///
    /// If the session was already finalized (and not reset), the hook fires
    /// immediately with the stored final snapshot.
    pub fn on_complete(&mut self, hook: impl FnOnce(&Snapshot) + 'static) {
        if let Some(last) = &self.last_final {
            hook(last);
        } else {
            self.completion_hooks.push(Box::new(hook));
        }
    }

    /// Appends a chunk and processes it to idle, notifying observers after
    /// each pass. Returns once the chunk's characters are fully consumed
    /// (apart from a suspended trailing escape awaiting its next character).
    ///
    /// # Errors
    ///
    /// [`SessionError::Finalized`] if the stream was finalized without a
    /// reset.
    pub fn append(&mut self, chunk: &str) -> Result<(), SessionError> {
        if self.parser.is_complete() {
            return Err(SessionError::Finalized);
        }
        self.parser.append(chunk);
        loop {
            let outcome = self.parser.run();
            let snapshot = self.parser.preview();
            self.notify(&snapshot);
            if outcome == StepOutcome::Idle {
                break;
            }
        }
        Ok(())
    }

    /// Runs end-of-stream finalization.
    ///
    /// Remaining buffered input is drained first; those passes still notify
    /// with `complete` false. Exactly one terminal notification with
    /// `complete` true is then emitted, completion hooks fire, and the final
    /// snapshot is returned. With `reset_after` (the default) the session is
    /// immediately reusable for a new stream.
    ///
    /// # Errors
    ///
    /// [`SessionError::AlreadyFinalized`] if called twice without a reset.
    pub fn finalize(&mut self, options: FinalizeOptions) -> Result<Snapshot, SessionError> {
        if self.parser.is_complete() {
            return Err(SessionError::AlreadyFinalized);
        }
        self.parser.close();
        loop {
            let outcome = self.parser.run();
            let snapshot = self.parser.preview();
            self.notify(&snapshot);
            if outcome == StepOutcome::Idle {
                break;
            }
        }
        let snapshot = self.parser.finish();
        self.notify(&snapshot);
        for hook in self.completion_hooks.drain(..) {
            hook(&snapshot);
        }
        if options.reset_after {
            self.parser.reset();
        } else {
            self.last_final = Some(snapshot.clone());
        }
        Ok(snapshot)
    }

    /// Clears all parser and ledger state. Observers persist; unresolved
    /// completion hooks stay registered for the next finalization.
    pub fn reset(&mut self) {
        self.parser.reset();
        self.last_final = None;
    }

    /// An on-demand preview of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.parser.preview()
    }

    /// Read access to the underlying parser.
    #[must_use]
    pub fn parser(&self) -> &StreamingParser {
        &self.parser
    }

    fn notify(&mut self, snapshot: &Snapshot) {
        for observer in &mut self.observers {
            observer(snapshot);
        }
    }
}
