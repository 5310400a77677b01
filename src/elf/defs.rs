//! On-disk sizes and flag sets shared by the reader and the writer.

use elf::abi::{ELFCLASS32, ELFCLASS64, ELFCLASSNONE};

/// Number of identification bytes at the start of every ELF file.
pub(crate) const EI_NIDENT: usize = 16;

/// Section type for relative relocation tables (`SHT_RELR`).
pub const SHT_RELR: u32 = 19;

pub(crate) const MAX_HEADER_SIZE: usize = 64;
pub(crate) const MAX_SHDR_SIZE: usize = 64;
pub(crate) const MAX_PHDR_SIZE: usize = 56;
pub(crate) const MAX_SYM_SIZE: usize = 24;

/// Width variant of an ELF file, taken from `EI_CLASS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfClass {
    /// Invalid or unspecified class.
    None,
    /// `ELFCLASS32`: 4-byte addresses and offsets.
    Elf32,
    /// `ELFCLASS64`: 8-byte addresses and offsets.
    Elf64,
}

impl ElfClass {
    /// Maps the `EI_CLASS` identification byte. Unknown values map to `None`.
    #[inline]
    pub fn from_ident(class: u8) -> Self {
        match class {
            ELFCLASS32 => ElfClass::Elf32,
            ELFCLASS64 => ElfClass::Elf64,
            _ => ElfClass::None,
        }
    }

    #[inline]
    pub fn to_ident(self) -> u8 {
        match self {
            ElfClass::None => ELFCLASSNONE,
            ElfClass::Elf32 => ELFCLASS32,
            ElfClass::Elf64 => ELFCLASS64,
        }
    }

    #[inline]
    pub fn is_64(self) -> bool {
        self == ElfClass::Elf64
    }

    #[inline]
    fn pick(self, size32: usize, size64: usize) -> usize {
        match self {
            ElfClass::None => 0,
            ElfClass::Elf32 => size32,
            ElfClass::Elf64 => size64,
        }
    }

    /// Size of an address or offset field.
    #[inline]
    pub fn word_size(self) -> usize {
        self.pick(4, 8)
    }

    /// Size of the file header (`Elf32_Ehdr` / `Elf64_Ehdr`).
    #[inline]
    pub fn header_size(self) -> usize {
        self.pick(52, 64)
    }

    /// Size of one section header table entry.
    #[inline]
    pub fn shdr_size(self) -> usize {
        self.pick(40, 64)
    }

    /// Size of one program header table entry.
    #[inline]
    pub fn phdr_size(self) -> usize {
        self.pick(32, 56)
    }

    /// Size of one symbol table entry.
    #[inline]
    pub fn sym_size(self) -> usize {
        self.pick(16, 24)
    }

    #[inline]
    pub fn rel_size(self) -> usize {
        self.pick(8, 16)
    }

    #[inline]
    pub fn rela_size(self) -> usize {
        self.pick(12, 24)
    }

    #[inline]
    pub fn relr_size(self) -> usize {
        self.pick(4, 8)
    }
}

bitflags::bitflags! {
    /// Section attribute flags (`sh_flags`).
    ///
    /// Unknown bits are kept when converting from a raw value, so
    /// processor- and OS-specific flags survive a read/write cycle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SectionFlags: u64 {
        const WRITE = 0x1;
        const ALLOC = 0x2;
        const EXECINSTR = 0x4;
        const MERGE = 0x10;
        const STRINGS = 0x20;
        const INFO_LINK = 0x40;
        const LINK_ORDER = 0x80;
        const OS_NONCONFORMING = 0x100;
        const GROUP = 0x200;
        const TLS = 0x400;
        /// Section data is compressed and starts with a compression header.
        const COMPRESSED = 0x800;
    }
}

bitflags::bitflags! {
    /// Segment permission flags (`p_flags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SegmentFlags: u32 {
        const X = 0x1;
        const W = 0x2;
        const R = 0x4;
    }
}
