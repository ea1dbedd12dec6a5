//! Session-level errors.
//!
//! The grammar itself never fails: unexpected characters, missing or
//! duplicate separators, and unmatched brackets are all tolerated. Errors
//! exist only for misuse of the session API.

use thiserror::Error;

/// An error returned by [`ParserSession`] operations.
///
/// [`ParserSession`]: crate::ParserSession
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Input was appended after the stream was finalized without a reset.
    #[error("input appended after the stream was finalized")]
    Finalized,
    /// `finalize` was called a second time without a reset.
    #[error("the stream was already finalized")]
    AlreadyFinalized,
}
