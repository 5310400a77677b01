//! # elf_codec
//! A `no_std` codec for the ELF container format: a validating, pull-based
//! reader and an incremental writer with an explicit layout model.
//! ## Reader
//! [`ElfReaderContext`] checks the file header once, then decodes section
//! headers, program headers, symbols and strings on demand through any
//! [`ElfReader`](input::ElfReader). It never allocates, so it fits
//! bootloaders and other environments without a heap. 32- and 64-bit files
//! of either byte order are normalized into the same host-endian values.
//! ## Writer
//! [`ElfWriter`] builds an image from sections whose data borrows the
//! caller's buffers, lays the file out and serializes it into a byte
//! vector or any [`ElfSink`](writer::ElfSink).
//! ## Example
//! ```rust
//! use elf_codec::{ElfClass, ElfReaderContext, Endianness, abi, writer::*};
//!
//! let mut writer = ElfWriter::new();
//! writer
//!     .create_header(HeaderCreateInfo::new(
//!         ElfClass::Elf32,
//!         Endianness::Big,
//!         abi::ET_REL,
//!         abi::EM_PPC,
//!     ))
//!     .unwrap();
//! let data = [1u8, 2, 3, 4];
//! let id = writer
//!     .add_section(SectionCreateInfo::new(".data", abi::SHT_PROGBITS).with_align(4))
//!     .unwrap();
//! writer.section_mut(id).unwrap().append_data(&data, 4).unwrap();
//! let image = writer.to_bytes().unwrap();
//!
//! let mut ctx = ElfReaderContext::new(image.as_slice());
//! ctx.init().unwrap();
//! let (idx, shdr) = ctx.section_by_name(".data").unwrap();
//! assert_eq!(idx, id.file_index());
//! assert_eq!(shdr.sh_size, 4);
//! ```
#![no_std]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod elf;
pub mod endian;
mod error;
pub mod input;
pub mod reader;
pub mod writer;

pub use crate::elf::{ElfClass, abi};
pub use endian::Endianness;
pub use error::*;
pub use reader::ElfReaderContext;
pub use writer::ElfWriter;

/// A type alias for `Result`s returned by `elf_codec` functions.
///
/// This is a convenience alias that eliminates the need to repeatedly specify
/// the `Error` type in function signatures.
pub type Result<T> = core::result::Result<T, Error>;
