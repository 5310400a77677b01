use super::ElfReaderContext;
use crate::{
    Error, Result,
    elf::{ElfClass, MAX_SHDR_SIZE, SHT_RELR, SectionFlags, SectionHeader},
    error::{bad_format, bad_size},
    input::ElfReader,
};
use elf::abi::{ET_REL, SHT_DYNSYM, SHT_GROUP, SHT_NOBITS, SHT_REL, SHT_RELA, SHT_SYMTAB};

/// Type-specific checks applied to every section header except the null one.
fn validate(shdr: &SectionHeader, class: ElfClass, e_type: u16) -> Result<()> {
    let expected = match shdr.sh_type {
        SHT_RELA => Some(class.rela_size()),
        SHT_REL => Some(class.rel_size()),
        SHT_RELR => Some(class.relr_size()),
        SHT_SYMTAB | SHT_DYNSYM => Some(class.sym_size()),
        _ => None,
    };
    if let Some(size) = expected {
        if shdr.sh_entsize != size as u64 {
            return Err(bad_size("sh_entsize does not match the section type"));
        }
    }

    let flags = shdr.flags();
    if flags.contains(SectionFlags::COMPRESSED) {
        if flags.contains(SectionFlags::ALLOC) {
            return Err(bad_format("SHF_COMPRESSED set on an allocated section"));
        }
        if shdr.sh_type == SHT_NOBITS {
            return Err(bad_format("SHF_COMPRESSED set on a SHT_NOBITS section"));
        }
    }

    if shdr.sh_type == SHT_GROUP && e_type != ET_REL {
        return Err(bad_format("SHT_GROUP outside a relocatable file"));
    }
    Ok(())
}

impl<R: ElfReader> ElfReaderContext<R> {
    /// Number of entries in the section header table, with the `SHN_UNDEF`
    /// escape resolved. Returns 0 when uninitialized.
    #[inline]
    pub fn section_count(&self) -> u32 {
        self.cache.map_or(0, |c| c.shnum)
    }

    /// Reads and validates the section header at `idx`.
    ///
    /// Relocation and symbol tables must carry the entry size of their
    /// class, compressed sections may be neither allocated nor `NOBITS`, and
    /// `SHT_GROUP` only appears in relocatable files. Section 0 is returned
    /// as read.
    pub fn section_header(&mut self, idx: u32) -> Result<SectionHeader> {
        let cache = self.cache()?;
        if idx >= cache.shnum {
            return Err(Error::BadIndex);
        }
        let size = cache.class.shdr_size();
        let mut buf = [0u8; MAX_SHDR_SIZE];
        self.read_record(
            &mut buf[..size],
            cache.shoff,
            idx as u64,
            cache.shentsize as u64,
        )?;
        let shdr = SectionHeader::parse(&buf, cache.class, cache.order);
        if idx != 0 {
            validate(&shdr, cache.class, cache.e_type)?;
        }
        Ok(shdr)
    }

    /// Iterates over all section headers, index 0 included.
    pub fn sections(&mut self) -> Sections<'_, R> {
        let end = self.section_count();
        Sections {
            ctx: self,
            next: 0,
            end,
        }
    }
}

/// Iterator over the section headers of an [`ElfReaderContext`].
///
/// Each item is the result of [`ElfReaderContext::section_header`]; the
/// iterator keeps going after an error.
pub struct Sections<'a, R: ElfReader> {
    ctx: &'a mut ElfReaderContext<R>,
    next: u32,
    end: u32,
}

impl<R: ElfReader> Iterator for Sections<'_, R> {
    type Item = Result<SectionHeader>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let idx = self.next;
        self.next += 1;
        Some(self.ctx.section_header(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = (self.end - self.next) as usize;
        (len, Some(len))
    }
}
