//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use formwire::prelude::*;
//! ```

pub use crate::{BodyStream, Error, Field, FormData, Result, flatten};
