use super::ElfReaderContext;
use crate::{
    Error, Result,
    elf::{MAX_PHDR_SIZE, ProgramHeader},
    input::ElfReader,
};

impl<R: ElfReader> ElfReaderContext<R> {
    /// Number of program headers. Returns 0 when uninitialized.
    #[inline]
    pub fn program_header_count(&self) -> u16 {
        self.cache.map_or(0, |c| c.phnum)
    }

    /// Reads the program header at `idx`.
    pub fn program_header(&mut self, idx: u16) -> Result<ProgramHeader> {
        let cache = self.cache()?;
        if idx >= cache.phnum {
            return Err(Error::BadIndex);
        }
        let size = cache.class.phdr_size();
        let mut buf = [0u8; MAX_PHDR_SIZE];
        self.read_record(
            &mut buf[..size],
            cache.phoff,
            idx as u64,
            cache.phentsize as u64,
        )?;
        Ok(ProgramHeader::parse(&buf, cache.class, cache.order))
    }

    /// Iterates over all program headers.
    pub fn program_headers(&mut self) -> ProgramHeaders<'_, R> {
        let end = self.program_header_count();
        ProgramHeaders {
            ctx: self,
            next: 0,
            end,
        }
    }
}

/// Iterator over the program headers of an [`ElfReaderContext`].
pub struct ProgramHeaders<'a, R: ElfReader> {
    ctx: &'a mut ElfReaderContext<R>,
    next: u16,
    end: u16,
}

impl<R: ElfReader> Iterator for ProgramHeaders<'_, R> {
    type Item = Result<ProgramHeader>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let idx = self.next;
        self.next += 1;
        Some(self.ctx.program_header(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = (self.end - self.next) as usize;
        (len, Some(len))
    }
}
