//! Byte order primitives
//!
//! ELF files record their data encoding in `EI_DATA`. Fields are read from
//! the raw bytes in host order and then normalized: if the file's order
//! differs from the host's, the value is byte-swapped. The host order is
//! probed at runtime so one build works on hosts of either order.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use elf::abi::{ELFDATA2LSB, ELFDATA2MSB, ELFDATANONE};

/// Byte order of an ELF file or of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Unknown or irrelevant order. Never causes a swap.
    None,
    /// Least significant byte first (`ELFDATA2LSB`).
    Little,
    /// Most significant byte first (`ELFDATA2MSB`).
    Big,
}

impl Endianness {
    /// Maps the `EI_DATA` identification byte. Unknown values map to `None`.
    #[inline]
    pub fn from_ident(data: u8) -> Self {
        match data {
            ELFDATA2LSB => Endianness::Little,
            ELFDATA2MSB => Endianness::Big,
            _ => Endianness::None,
        }
    }

    /// Returns the `EI_DATA` identification byte for this order.
    #[inline]
    pub fn to_ident(self) -> u8 {
        match self {
            Endianness::None => ELFDATANONE,
            Endianness::Little => ELFDATA2LSB,
            Endianness::Big => ELFDATA2MSB,
        }
    }

    #[inline]
    fn needs_swap(self) -> bool {
        self != Endianness::None && self != host_endianness()
    }
}

/// Detects the host byte order at runtime.
#[inline]
pub fn host_endianness() -> Endianness {
    let probe = 1u16.to_ne_bytes();
    if probe[0] == 1 {
        Endianness::Little
    } else {
        Endianness::Big
    }
}

#[inline]
pub fn swap16(v: u16) -> u16 {
    (v >> 8) | (v << 8)
}

#[inline]
pub fn swap32(v: u32) -> u32 {
    ((v >> 24) & 0x0000_00FF)
        | ((v >> 8) & 0x0000_FF00)
        | ((v << 8) & 0x00FF_0000)
        | ((v << 24) & 0xFF00_0000)
}

#[inline]
pub fn swap64(v: u64) -> u64 {
    (swap32(v as u32) as u64) << 32 | swap32((v >> 32) as u32) as u64
}

/// Normalizes a 16-bit field read in host order from a file of `order`.
#[inline]
pub fn read16(raw: u16, order: Endianness) -> u16 {
    if order.needs_swap() { swap16(raw) } else { raw }
}

/// Normalizes a 32-bit field read in host order from a file of `order`.
#[inline]
pub fn read32(raw: u32, order: Endianness) -> u32 {
    if order.needs_swap() { swap32(raw) } else { raw }
}

/// Normalizes a 64-bit field read in host order from a file of `order`.
#[inline]
pub fn read64(raw: u64, order: Endianness) -> u64 {
    if order.needs_swap() { swap64(raw) } else { raw }
}

/// Field decoder over a raw record buffer.
///
/// Offsets are relative to the start of the record; every getter reads the
/// bytes in host order and normalizes them with [`read16`]/[`read32`]/[`read64`].
pub(crate) struct FieldReader<'a> {
    buf: &'a [u8],
    order: Endianness,
}

impl<'a> FieldReader<'a> {
    #[inline]
    pub(crate) fn new(buf: &'a [u8], order: Endianness) -> Self {
        Self { buf, order }
    }

    #[inline]
    pub(crate) fn u8(&self, off: usize) -> u8 {
        self.buf[off]
    }

    #[inline]
    pub(crate) fn u16(&self, off: usize) -> u16 {
        let mut raw = [0u8; 2];
        raw.copy_from_slice(&self.buf[off..off + 2]);
        read16(u16::from_ne_bytes(raw), self.order)
    }

    #[inline]
    pub(crate) fn u32(&self, off: usize) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.buf[off..off + 4]);
        read32(u32::from_ne_bytes(raw), self.order)
    }

    #[inline]
    pub(crate) fn u64(&self, off: usize) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.buf[off..off + 8]);
        read64(u64::from_ne_bytes(raw), self.order)
    }

    /// Reads a word-sized field: 4 bytes for 32-bit files, 8 for 64-bit,
    /// widened to `u64`.
    #[inline]
    pub(crate) fn word(&self, off: usize, is_64: bool) -> u64 {
        if is_64 {
            self.u64(off)
        } else {
            self.u32(off) as u64
        }
    }
}

/// Field encoder over a raw record buffer, the inverse of [`FieldReader`].
///
/// Values are stored in the file's order; `Endianness::None` is treated as
/// little-endian.
pub(crate) struct FieldWriter<'a> {
    buf: &'a mut [u8],
    order: Endianness,
}

impl<'a> FieldWriter<'a> {
    #[inline]
    pub(crate) fn new(buf: &'a mut [u8], order: Endianness) -> Self {
        Self { buf, order }
    }

    #[inline]
    pub(crate) fn bytes(&mut self, off: usize, v: &[u8]) {
        self.buf[off..off + v.len()].copy_from_slice(v);
    }

    #[inline]
    pub(crate) fn u16(&mut self, off: usize, v: u16) {
        let dst = &mut self.buf[off..off + 2];
        match self.order {
            Endianness::Big => BigEndian::write_u16(dst, v),
            _ => LittleEndian::write_u16(dst, v),
        }
    }

    #[inline]
    pub(crate) fn u32(&mut self, off: usize, v: u32) {
        let dst = &mut self.buf[off..off + 4];
        match self.order {
            Endianness::Big => BigEndian::write_u32(dst, v),
            _ => LittleEndian::write_u32(dst, v),
        }
    }

    #[inline]
    pub(crate) fn u64(&mut self, off: usize, v: u64) {
        let dst = &mut self.buf[off..off + 8];
        match self.order {
            Endianness::Big => BigEndian::write_u64(dst, v),
            _ => LittleEndian::write_u64(dst, v),
        }
    }

    /// Writes a word-sized field, truncating to 4 bytes for 32-bit files.
    #[inline]
    pub(crate) fn word(&mut self, off: usize, v: u64, is_64: bool) {
        if is_64 {
            self.u64(off, v)
        } else {
            self.u32(off, v as u32)
        }
    }
}
