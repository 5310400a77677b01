//! ELF file header
//!
//! The header sits at offset 0 and describes the file's identity (class,
//! byte order, type, machine) and where the program and section header
//! tables live.

use crate::{
    elf::{EI_NIDENT, ElfClass},
    endian::{Endianness, FieldReader, FieldWriter},
};
use elf::abi::{
    EI_ABIVERSION, EI_CLASS, EI_DATA, EI_OSABI, EI_VERSION, ELFMAGIC, ET_DYN, ET_EXEC, ET_REL,
};

/// Normalized ELF file header.
///
/// All fields are host-endian; `e_entry`, `e_phoff` and `e_shoff` are
/// widened to `u64`. Counts and indices are stored exactly as on disk, so
/// `e_shnum` and `e_shstrndx` may still hold the `SHN_UNDEF` / `SHN_XINDEX`
/// escapes. The reader context resolves those separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfHeader {
    /// Raw identification bytes (`e_ident`).
    pub e_ident: [u8; EI_NIDENT],
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    pub e_entry: u64,
    pub e_phoff: u64,
    pub e_shoff: u64,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl ElfHeader {
    /// Decodes a header of `class` from `buf`, which must hold at least
    /// `class.header_size()` bytes.
    pub(crate) fn parse(buf: &[u8], class: ElfClass, order: Endianness) -> Self {
        let f = FieldReader::new(buf, order);
        let mut e_ident = [0u8; EI_NIDENT];
        e_ident.copy_from_slice(&buf[..EI_NIDENT]);
        let is_64 = class.is_64();
        // Offsets of the fields following e_entry shift by the word size.
        let w = class.word_size();
        let tail = 24 + 3 * w;
        Self {
            e_ident,
            e_type: f.u16(16),
            e_machine: f.u16(18),
            e_version: f.u32(20),
            e_entry: f.word(24, is_64),
            e_phoff: f.word(24 + w, is_64),
            e_shoff: f.word(24 + 2 * w, is_64),
            e_flags: f.u32(tail),
            e_ehsize: f.u16(tail + 4),
            e_phentsize: f.u16(tail + 6),
            e_phnum: f.u16(tail + 8),
            e_shentsize: f.u16(tail + 10),
            e_shnum: f.u16(tail + 12),
            e_shstrndx: f.u16(tail + 14),
        }
    }

    /// Encodes the header into `buf` using the class and byte order named
    /// by its own identification bytes.
    pub(crate) fn encode(&self, buf: &mut [u8]) {
        let class = self.class();
        let is_64 = class.is_64();
        let w = class.word_size();
        let tail = 24 + 3 * w;
        let mut f = FieldWriter::new(buf, self.endianness());
        f.bytes(0, &self.e_ident);
        f.u16(16, self.e_type);
        f.u16(18, self.e_machine);
        f.u32(20, self.e_version);
        f.word(24, self.e_entry, is_64);
        f.word(24 + w, self.e_phoff, is_64);
        f.word(24 + 2 * w, self.e_shoff, is_64);
        f.u32(tail, self.e_flags);
        f.u16(tail + 4, self.e_ehsize);
        f.u16(tail + 6, self.e_phentsize);
        f.u16(tail + 8, self.e_phnum);
        f.u16(tail + 10, self.e_shentsize);
        f.u16(tail + 12, self.e_shnum);
        f.u16(tail + 14, self.e_shstrndx);
    }

    /// Returns `true` if the identification starts with `0x7F 'E' 'L' 'F'`.
    #[inline]
    pub fn has_magic(&self) -> bool {
        self.e_ident[..ELFMAGIC.len()] == ELFMAGIC
    }

    #[inline]
    pub fn class(&self) -> ElfClass {
        ElfClass::from_ident(self.e_ident[EI_CLASS])
    }

    #[inline]
    pub fn endianness(&self) -> Endianness {
        Endianness::from_ident(self.e_ident[EI_DATA])
    }

    /// Identification version byte (`EI_VERSION`).
    #[inline]
    pub fn ident_version(&self) -> u8 {
        self.e_ident[EI_VERSION]
    }

    #[inline]
    pub fn osabi(&self) -> u8 {
        self.e_ident[EI_OSABI]
    }

    #[inline]
    pub fn abi_version(&self) -> u8 {
        self.e_ident[EI_ABIVERSION]
    }

    /// Checks if the file is a relocatable object (`ET_REL`).
    #[inline]
    pub fn is_relocatable(&self) -> bool {
        self.e_type == ET_REL
    }

    /// Checks if the file is an executable (`ET_EXEC` or a PIE `ET_DYN`).
    #[inline]
    pub fn is_executable(&self) -> bool {
        self.e_type == ET_EXEC || self.e_type == ET_DYN
    }

    /// Checks if the file is a shared object (`ET_DYN`).
    #[inline]
    pub fn is_dylib(&self) -> bool {
        self.e_type == ET_DYN
    }
}
