use crate::{
    elf::ElfClass,
    endian::{Endianness, FieldReader},
};
use elf::abi::{STB_GLOBAL, STB_LOCAL, STB_WEAK, STT_FUNC, STT_OBJECT, SHN_UNDEF};

/// Normalized symbol table entry.
///
/// `st_info` is split into its type (low four bits) and binding (high four
/// bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElfSymbol {
    /// Offset of the name in the linked string table.
    pub st_name: u32,
    pub st_type: u8,
    pub st_bind: u8,
    pub st_other: u8,
    pub st_shndx: u16,
    pub st_value: u64,
    pub st_size: u64,
}

impl ElfSymbol {
    /// Decodes one symbol record.
    ///
    /// 32-bit layout: name, value, size, info, other, shndx.
    /// 64-bit layout: name, info, other, shndx, value, size.
    pub(crate) fn parse(buf: &[u8], class: ElfClass, order: Endianness) -> Self {
        let f = FieldReader::new(buf, order);
        let (info, st_other, st_shndx, st_value, st_size) = if class.is_64() {
            (f.u8(4), f.u8(5), f.u16(6), f.u64(8), f.u64(16))
        } else {
            (
                f.u8(12),
                f.u8(13),
                f.u16(14),
                f.u32(4) as u64,
                f.u32(8) as u64,
            )
        };
        Self {
            st_name: f.u32(0),
            st_type: info & 0xf,
            st_bind: info >> 4,
            st_other,
            st_shndx,
            st_value,
            st_size,
        }
    }

    /// Recombines type and binding into the on-disk `st_info` byte.
    #[inline]
    pub fn st_info(&self) -> u8 {
        (self.st_bind << 4) | (self.st_type & 0xf)
    }

    /// Checks if the symbol is undefined (`st_shndx == SHN_UNDEF`).
    #[inline]
    pub fn is_undef(&self) -> bool {
        self.st_shndx == SHN_UNDEF
    }

    #[inline]
    pub fn is_local(&self) -> bool {
        self.st_bind == STB_LOCAL
    }

    #[inline]
    pub fn is_global(&self) -> bool {
        self.st_bind == STB_GLOBAL
    }

    #[inline]
    pub fn is_weak(&self) -> bool {
        self.st_bind == STB_WEAK
    }

    /// Checks if the symbol names a function or a data object, the two
    /// kinds an exact address lookup considers.
    #[inline]
    pub fn is_func_or_object(&self) -> bool {
        self.st_type == STT_FUNC || self.st_type == STT_OBJECT
    }

    /// Checks if `addr` falls in `[st_value, st_value + st_size)`.
    #[inline]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.st_value && addr - self.st_value < self.st_size
    }
}
