//! Streaming HTTP form body builder.
//!
//! Build an HTTP request body incrementally from named fields
//! (scalars, files, byte streams) and serialize it on demand into
//! `multipart/form-data`, `application/x-www-form-urlencoded`, or
//! `application/json`, with `content-type` and `content-length`
//! negotiation that never materializes the body when it can be avoided:
//! - [`FormData`] - Ordered field store with boundary management
//! - [`Field`] - Tagged field value (scalar / stream / file / file-stream)
//! - [`BodyStream`] - One-shot byte source for stream-backed fields
//! - [`flatten`] - Nested value expansion into flat wire keys
//! - [`Error`] and [`Result`] - Error handling
//!
//! # Example
//!
//! ```
//! use formwire::FormData;
//!
//! let mut form = FormData::new();
//! form.set("name", "Bob");
//! form.set("tags", serde_json::json!(["a", "b"]));
//!
//! let headers = form.headers(None)?;
//! assert_eq!(
//!     headers.get("content-type").map(String::as_str),
//!     Some("application/x-www-form-urlencoded")
//! );
//!
//! let body = form.to_bytes()?;
//! assert_eq!(body.as_ref(), b"name=Bob&tags%5B0%5D=a&tags%5B1%5D=b");
//! # Ok::<(), formwire::Error>(())
//! ```
//!
//! Forms carrying files or streams negotiate multipart and are best
//! serialized with the asynchronous [`FormData::pipe`], which drains
//! one byte source at a time in field insertion order.

mod content;
mod encode;
mod error;
mod field;
mod flatten;
mod form;
mod headers;
pub mod prelude;

pub use error::{Error, Result};
pub use field::{BodyStream, Field};
pub use flatten::flatten;
pub use form::FormData;
