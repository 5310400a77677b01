use super::ElfReaderContext;
use crate::{
    Error, Result,
    elf::SectionHeader,
    error::{bad_arg, bad_header},
    input::ElfReader,
};
use core::ffi::CStr;
use elf::abi::SHT_STRTAB;

/// Size of the scratch buffer name scans compare through.
pub(crate) const NAME_BUF_SIZE: usize = 256;

impl<R: ElfReader> ElfReaderContext<R> {
    /// Reads a NUL-terminated string at absolute file `offset` into `buf`.
    ///
    /// Bytes are fetched one read at a time, so nothing past the terminator
    /// is touched. Fails with `BufferOverflow` if no NUL appears within
    /// `buf.len()` bytes.
    pub fn read_str<'b>(&mut self, offset: u64, buf: &'b mut [u8]) -> Result<&'b CStr> {
        self.cache()?;
        if buf.is_empty() {
            return Err(bad_arg("string buffer is empty"));
        }
        let mut end = None;
        for i in 0..buf.len() {
            let pos = offset
                .checked_add(i as u64)
                .ok_or(Error::IoEof)?;
            let mut byte = [0u8; 1];
            self.reader.read(&mut byte, pos)?;
            buf[i] = byte[0];
            if byte[0] == 0 {
                end = Some(i);
                break;
            }
        }
        let end = end.ok_or(Error::BufferOverflow)?;
        CStr::from_bytes_with_nul(&buf[..=end]).map_err(|_| Error::BufferOverflow)
    }

    /// Reads the string at `str_idx` of the string table in section `sec_idx`.
    ///
    /// Fails with `BadArg` if the section is not `SHT_STRTAB` or the index
    /// lies outside it.
    pub fn str_from_table<'b>(
        &mut self,
        sec_idx: u32,
        str_idx: u32,
        buf: &'b mut [u8],
    ) -> Result<&'b CStr> {
        let strtab = self.section_header(sec_idx)?;
        if strtab.sh_type != SHT_STRTAB {
            return Err(bad_arg("section is not a string table"));
        }
        if str_idx as u64 >= strtab.sh_size {
            return Err(bad_arg("string index is outside the string table"));
        }
        let offset = strtab
            .sh_offset
            .checked_add(str_idx as u64)
            .ok_or_else(|| bad_header("string offset overflows"))?;
        self.read_str(offset, buf)
    }

    /// Resolves the name of `shdr` through the section-name string table.
    pub fn section_name<'b>(&mut self, shdr: &SectionHeader, buf: &'b mut [u8]) -> Result<&'b CStr> {
        let shstrndx = self.cache()?.shstrndx;
        self.str_from_table(shstrndx, shdr.sh_name, buf)
    }

    /// Finds the first section named `name`, skipping section 0.
    ///
    /// Names are compared through a 256-byte buffer; a longer name on disk
    /// fails the scan with `BufferOverflow`.
    pub fn section_by_name(&mut self, name: &str) -> Result<(u32, SectionHeader)> {
        self.cache()?;
        let count = self.section_count();
        if count == 0 {
            return Err(bad_arg("file has no sections"));
        }
        let mut buf = [0u8; NAME_BUF_SIZE];
        for idx in 1..count {
            let shdr = self.section_header(idx)?;
            if self.section_name(&shdr, &mut buf)?.to_bytes() == name.as_bytes() {
                return Ok((idx, shdr));
            }
        }
        Err(Error::NotFound)
    }
}
