//! Entry points used by the command-line driver.
//!
//! - [`convert_images`]: run a manifest-described conversion job

mod convert;

pub use convert::*;
