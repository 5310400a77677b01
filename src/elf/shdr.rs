use crate::{
    elf::{ElfClass, SectionFlags},
    endian::{Endianness, FieldReader, FieldWriter},
};
use elf::abi::{SHT_NOBITS, SHT_NULL};

/// Normalized section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionHeader {
    /// Offset of the name in the section-name string table.
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

impl SectionHeader {
    pub(crate) fn parse(buf: &[u8], class: ElfClass, order: Endianness) -> Self {
        let f = FieldReader::new(buf, order);
        if class.is_64() {
            Self {
                sh_name: f.u32(0),
                sh_type: f.u32(4),
                sh_flags: f.u64(8),
                sh_addr: f.u64(16),
                sh_offset: f.u64(24),
                sh_size: f.u64(32),
                sh_link: f.u32(40),
                sh_info: f.u32(44),
                sh_addralign: f.u64(48),
                sh_entsize: f.u64(56),
            }
        } else {
            Self {
                sh_name: f.u32(0),
                sh_type: f.u32(4),
                sh_flags: f.u32(8) as u64,
                sh_addr: f.u32(12) as u64,
                sh_offset: f.u32(16) as u64,
                sh_size: f.u32(20) as u64,
                sh_link: f.u32(24),
                sh_info: f.u32(28),
                sh_addralign: f.u32(32) as u64,
                sh_entsize: f.u32(36) as u64,
            }
        }
    }

    pub(crate) fn encode(&self, buf: &mut [u8], class: ElfClass, order: Endianness) {
        let mut f = FieldWriter::new(buf, order);
        let is_64 = class.is_64();
        let w = class.word_size();
        f.u32(0, self.sh_name);
        f.u32(4, self.sh_type);
        f.word(8, self.sh_flags, is_64);
        f.word(8 + w, self.sh_addr, is_64);
        f.word(8 + 2 * w, self.sh_offset, is_64);
        f.word(8 + 3 * w, self.sh_size, is_64);
        f.u32(8 + 4 * w, self.sh_link);
        f.u32(12 + 4 * w, self.sh_info);
        f.word(16 + 4 * w, self.sh_addralign, is_64);
        f.word(16 + 5 * w, self.sh_entsize, is_64);
    }

    /// Returns the section flags, keeping bits this crate does not name.
    #[inline]
    pub fn flags(&self) -> SectionFlags {
        SectionFlags::from_bits_retain(self.sh_flags)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.sh_type == SHT_NULL
    }

    /// `SHT_NOBITS` sections occupy memory but no file bytes.
    #[inline]
    pub fn is_nobits(&self) -> bool {
        self.sh_type == SHT_NOBITS
    }

    /// Returns the number of fixed-size entries, or 0 if the section has no
    /// entry size.
    #[inline]
    pub fn entry_count(&self) -> u64 {
        if self.sh_entsize == 0 {
            0
        } else {
            self.sh_size / self.sh_entsize
        }
    }
}
