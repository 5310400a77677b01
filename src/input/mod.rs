//! Byte sources for the reader
//!
//! This module provides the [`ElfReader`] trait the reader context pulls
//! bytes through, and the stock backends: byte slices, named in-memory
//! images, closures, and (with the `std` feature) files.

#[cfg(feature = "std")]
pub use backend::ElfFile;
pub use backend::{ElfBinary, FnReader};
pub use traits::{ElfReader, IntoElfReader};

mod backend;
mod traits;
