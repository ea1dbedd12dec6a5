//! Configuration options for the parser and for finalization.

/// Configuration for a [`StreamingParser`] or [`ParserSession`].
///
/// # Examples
///
/// ```rust
/// use jsonweave::{ParserOptions, StreamingParser};
///
/// let parser = StreamingParser::new(ParserOptions {
///     step_budget: 1024,
///     ..Default::default()
/// });
/// ```
///
/// [`StreamingParser`]: crate::StreamingParser
/// [`ParserSession`]: crate::ParserSession
#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Upper bound on the number of characters examined by one processing
    /// pass. A pass that exhausts its budget with input still buffered
    /// reports [`StepOutcome::Pending`] so the caller can yield to its host
    /// before resuming.
    ///
    /// A budget of zero is treated as one.
    ///
    /// # Default
    ///
    /// `4096`
    ///
    /// [`StepOutcome::Pending`]: crate::StepOutcome::Pending
    pub step_budget: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { step_budget: 4096 }
    }
}

/// Options for [`ParserSession::finalize`].
///
/// [`ParserSession::finalize`]: crate::ParserSession::finalize
#[derive(Debug, Clone, Copy)]
pub struct FinalizeOptions {
    /// Whether to reset all parser and ledger state after the final snapshot
    /// has been built, making the session reusable for a new stream.
    ///
    /// # Default
    ///
    /// `true`
    pub reset_after: bool,
}

impl Default for FinalizeOptions {
    fn default() -> Self {
        Self { reset_after: true }
    }
}
