//! ELF (Executable and Linkable Format) data structures and utilities.
//!
//! Every record decoded from a file is normalized into a host-endian,
//! width-unified value: addresses, offsets and sizes are widened to `u64`
//! regardless of the file class, so callers never branch on 32 vs 64 bit.

mod defs;
mod ehdr;
mod phdr;
mod shdr;
mod symbol;

pub use defs::{ElfClass, SHT_RELR, SectionFlags, SegmentFlags};
pub use ehdr::ElfHeader;
pub use phdr::ProgramHeader;
pub use shdr::SectionHeader;
pub use symbol::ElfSymbol;

pub(crate) use defs::{EI_NIDENT, MAX_HEADER_SIZE, MAX_PHDR_SIZE, MAX_SHDR_SIZE, MAX_SYM_SIZE};

/// ELF ABI constants and definitions from the elf crate.
pub mod abi {
    pub use elf::abi::*;
}
