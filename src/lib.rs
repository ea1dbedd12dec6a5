//! An incremental parser for character streams that interleave free text
//! with JSON-like structures.
//!
//! The parser consumes arbitrarily-chunked input, switching between free-text
//! accumulation and a lenient structural grammar, and exposes a consistent
//! [`Snapshot`] of every entity discovered so far, including one in-progress
//! JSON value mid-construction. Malformed JSON (bareword keys, missing or
//! duplicated separators, unbalanced brackets at end of stream) is tolerated
//! rather than rejected, and input never needs to be aligned to any
//! structural boundary.
//!
//! # Examples
//!
//! ```rust
//! use jsonweave::{ParserOptions, StreamingParser, Value};
//!
//! let mut parser = StreamingParser::new(ParserOptions::default());
//! parser.append("hola {\"name\":\"John\",\"age\":30}");
//! let snapshot = parser.finish();
//!
//! assert!(snapshot.complete);
//! assert_eq!(snapshot.entities[0].as_text(), Some("hola "));
//! let json = snapshot.entities[1].as_json().unwrap();
//! assert_eq!(json.get("name"), Some(&Value::String("John".into())));
//! assert_eq!(json.get("age"), Some(&Value::Number(30.0)));
//! ```
//!
//! For push-style consumption with observer callbacks, see
//! [`ParserSession`].

mod entity;
mod error;
mod options;
mod parser;
mod session;
mod stack;
mod value;

#[cfg(test)]
mod tests;

pub use entity::{Entity, EntityValue, Snapshot};
pub use error::SessionError;
pub use options::{FinalizeOptions, ParserOptions};
pub use parser::{StepOutcome, StreamingParser};
pub use session::ParserSession;
pub use value::{Array, Map, Value};
