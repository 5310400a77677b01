use crate::{
    elf::{ElfClass, SegmentFlags},
    endian::{Endianness, FieldReader, FieldWriter},
};
use elf::abi::PT_LOAD;

/// Normalized program header.
///
/// The 64-bit record stores `p_flags` right after `p_type`; the 32-bit
/// record stores it after `p_memsz`. Both decode into the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgramHeader {
    pub p_type: u32,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_paddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

impl ProgramHeader {
    pub(crate) fn parse(buf: &[u8], class: ElfClass, order: Endianness) -> Self {
        let f = FieldReader::new(buf, order);
        if class.is_64() {
            Self {
                p_type: f.u32(0),
                p_flags: f.u32(4),
                p_offset: f.u64(8),
                p_vaddr: f.u64(16),
                p_paddr: f.u64(24),
                p_filesz: f.u64(32),
                p_memsz: f.u64(40),
                p_align: f.u64(48),
            }
        } else {
            Self {
                p_type: f.u32(0),
                p_offset: f.u32(4) as u64,
                p_vaddr: f.u32(8) as u64,
                p_paddr: f.u32(12) as u64,
                p_filesz: f.u32(16) as u64,
                p_memsz: f.u32(20) as u64,
                p_flags: f.u32(24),
                p_align: f.u32(28) as u64,
            }
        }
    }

    pub(crate) fn encode(&self, buf: &mut [u8], class: ElfClass, order: Endianness) {
        let mut f = FieldWriter::new(buf, order);
        if class.is_64() {
            f.u32(0, self.p_type);
            f.u32(4, self.p_flags);
            f.u64(8, self.p_offset);
            f.u64(16, self.p_vaddr);
            f.u64(24, self.p_paddr);
            f.u64(32, self.p_filesz);
            f.u64(40, self.p_memsz);
            f.u64(48, self.p_align);
        } else {
            f.u32(0, self.p_type);
            f.u32(4, self.p_offset as u32);
            f.u32(8, self.p_vaddr as u32);
            f.u32(12, self.p_paddr as u32);
            f.u32(16, self.p_filesz as u32);
            f.u32(20, self.p_memsz as u32);
            f.u32(24, self.p_flags);
            f.u32(28, self.p_align as u32);
        }
    }

    #[inline]
    pub fn flags(&self) -> SegmentFlags {
        SegmentFlags::from_bits_retain(self.p_flags)
    }

    #[inline]
    pub fn is_load(&self) -> bool {
        self.p_type == PT_LOAD
    }
}
