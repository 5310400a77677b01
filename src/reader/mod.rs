//! Reader context and header validation
//!
//! [`ElfReaderContext`] wraps an [`ElfReader`] and pulls exactly the bytes
//! each accessor needs. Apart from the fixed header fields cached by
//! [`init`](ElfReaderContext::init), nothing is kept between calls and no
//! heap memory is used: every record is decoded from a stack buffer sized
//! for the largest class.

mod section;
mod segment;
mod string;
mod symbol;

pub use section::Sections;
pub use segment::ProgramHeaders;

use crate::{
    Error, Result,
    elf::{EI_NIDENT, ElfClass, ElfHeader, MAX_HEADER_SIZE, MAX_SHDR_SIZE, SectionHeader},
    endian::Endianness,
    error::{bad_format, bad_header, bad_size},
    input::{ElfReader, IntoElfReader},
};
use elf::abi::{
    EI_CLASS, EI_DATA, EI_VERSION, ELFMAGIC, EV_CURRENT, SHN_UNDEF, SHN_XINDEX, SHT_NULL,
};

/// Fixed header fields, normalized and with the section escapes resolved.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeaderCache {
    pub(crate) class: ElfClass,
    pub(crate) order: Endianness,
    pub(crate) e_type: u16,
    pub(crate) entry: u64,
    pub(crate) phoff: u64,
    pub(crate) shoff: u64,
    pub(crate) phentsize: u16,
    pub(crate) shentsize: u16,
    pub(crate) phnum: u16,
    /// Real section count, after `SHN_UNDEF` resolution.
    pub(crate) shnum: u32,
    /// Real section-name table index, after `SHN_XINDEX` resolution.
    pub(crate) shstrndx: u32,
}

/// Random-access view of one ELF image.
///
/// A context starts uninitialized; every accessor except
/// [`init`](Self::init) fails with [`Error::Uninitialized`] (counts return
/// 0) until `init` has succeeded. A failed `init` leaves the context
/// uninitialized.
///
/// # Examples
/// ```no_run
/// use elf_codec::ElfReaderContext;
///
/// let bytes: &[u8] = &[]; // the bytes of an ELF file
/// let mut ctx = ElfReaderContext::new(bytes);
/// ctx.init().unwrap();
/// let (idx, text) = ctx.section_by_name(".text").unwrap();
/// println!("section {idx} at offset {:#x}", text.sh_offset);
/// ```
pub struct ElfReaderContext<R: ElfReader> {
    reader: R,
    cache: Option<HeaderCache>,
}

impl<R: ElfReader> ElfReaderContext<R> {
    /// Wraps `reader` in an uninitialized context. Performs no I/O.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            cache: None,
        }
    }

    /// Converts `input` into a reader, then creates and initializes a
    /// context over it.
    pub fn open<'a, I>(input: I) -> Result<Self>
    where
        I: IntoElfReader<'a, Reader = R>,
    {
        let mut ctx = Self::new(input.into_reader()?);
        ctx.init()?;
        Ok(ctx)
    }

    /// Returns the wrapped reader, consuming the context.
    pub fn into_inner(self) -> R {
        self.reader
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.cache.is_some()
    }

    /// Validates the file header and caches the fields every other accessor
    /// relies on.
    ///
    /// # Errors
    /// * `BadMagic`, `BadVersion`, `BadClass`, `BadEndianness` for a bad
    ///   identification or header version.
    /// * `BadSize` if the header or table entry sizes disagree with the class.
    /// * `BadHeader` if a table has entries but no offset, or a section
    ///   escape cannot be resolved.
    /// * `BadFormat` if the escape-carrying section 0 is not `SHT_NULL`.
    /// * Any error of the underlying reader.
    pub fn init(&mut self) -> Result<()> {
        self.cache = None;

        let mut ident = [0u8; EI_NIDENT];
        self.reader.read(&mut ident, 0)?;
        if ident[..ELFMAGIC.len()] != ELFMAGIC {
            return Err(Error::BadMagic);
        }
        if ident[EI_VERSION] != EV_CURRENT {
            return Err(Error::BadVersion);
        }
        let class = ElfClass::from_ident(ident[EI_CLASS]);
        if class == ElfClass::None {
            return Err(Error::BadClass);
        }
        let order = Endianness::from_ident(ident[EI_DATA]);
        if order == Endianness::None {
            return Err(Error::BadEndianness);
        }

        let header_size = class.header_size();
        let mut buf = [0u8; MAX_HEADER_SIZE];
        self.reader.read(&mut buf[..header_size], 0)?;
        let ehdr = ElfHeader::parse(&buf, class, order);
        if ehdr.e_version != EV_CURRENT as u32 {
            return Err(Error::BadVersion);
        }

        if ehdr.e_ehsize as usize != header_size {
            return Err(bad_size("e_ehsize does not match the file class"));
        }
        if ehdr.e_phnum > 0 && ehdr.e_phentsize as usize != class.phdr_size() {
            return Err(bad_size("e_phentsize does not match the file class"));
        }
        if ehdr.e_shnum > 0 && ehdr.e_shentsize as usize != class.shdr_size() {
            return Err(bad_size("e_shentsize does not match the file class"));
        }
        if ehdr.e_phnum > 0 && ehdr.e_phoff == 0 {
            return Err(bad_header("program headers present but e_phoff is 0"));
        }
        if ehdr.e_shnum > 0 && ehdr.e_shoff == 0 {
            return Err(bad_header("section headers present but e_shoff is 0"));
        }

        let mut shnum = ehdr.e_shnum as u64;
        let mut shstrndx = ehdr.e_shstrndx as u32;
        // e_shnum == 0 with no table at all is simply a file without sections.
        let count_escaped = ehdr.e_shnum == SHN_UNDEF && ehdr.e_shoff != 0;
        let index_escaped = ehdr.e_shstrndx == SHN_XINDEX;
        if count_escaped || index_escaped {
            if ehdr.e_shoff == 0 {
                return Err(bad_header("SHN_XINDEX used without a section header table"));
            }
            let shdr_size = class.shdr_size();
            let mut raw = [0u8; MAX_SHDR_SIZE];
            self.reader.read(&mut raw[..shdr_size], ehdr.e_shoff)?;
            let null = SectionHeader::parse(&raw, class, order);
            if null.sh_type != SHT_NULL {
                return Err(bad_format("section 0 carrying header escapes is not SHT_NULL"));
            }
            if count_escaped {
                shnum = null.sh_size;
            }
            if index_escaped {
                shstrndx = null.sh_link;
            }
            #[cfg(feature = "log")]
            log::trace!(
                "[Init] resolved escapes: section count {}, name table index {}",
                shnum,
                shstrndx
            );
        }
        let shnum = u32::try_from(shnum)
            .map_err(|_| bad_header("resolved section count does not fit in 32 bits"))?;
        if count_escaped && shnum > 0 && ehdr.e_shentsize as usize != class.shdr_size() {
            return Err(bad_size("e_shentsize does not match the file class"));
        }

        let cache = HeaderCache {
            class,
            order,
            e_type: ehdr.e_type,
            entry: ehdr.e_entry,
            phoff: ehdr.e_phoff,
            shoff: ehdr.e_shoff,
            phentsize: ehdr.e_phentsize,
            shentsize: ehdr.e_shentsize,
            phnum: ehdr.e_phnum,
            shnum,
            shstrndx,
        };
        #[cfg(feature = "log")]
        log::debug!(
            "[Init] {}: {:?} {:?}, {} program headers, {} sections",
            self.reader.file_name(),
            class,
            order,
            cache.phnum,
            cache.shnum
        );
        self.cache = Some(cache);
        Ok(())
    }

    #[inline]
    pub(crate) fn cache(&self) -> Result<HeaderCache> {
        self.cache.ok_or(Error::Uninitialized)
    }

    /// Reads `buf.len()` bytes at `base + idx * stride`.
    pub(crate) fn read_record(
        &mut self,
        buf: &mut [u8],
        base: u64,
        idx: u64,
        stride: u64,
    ) -> Result<()> {
        let offset = idx
            .checked_mul(stride)
            .and_then(|rel| rel.checked_add(base))
            .ok_or_else(|| bad_header("record offset overflows"))?;
        self.reader.read(buf, offset)
    }

    /// Re-reads and returns the file header as stored on disk.
    ///
    /// Counts and indices are not escape-resolved here; use
    /// [`section_count`](Self::section_count) for the real count.
    pub fn header(&mut self) -> Result<ElfHeader> {
        let cache = self.cache()?;
        let mut buf = [0u8; MAX_HEADER_SIZE];
        self.reader.read(&mut buf[..cache.class.header_size()], 0)?;
        Ok(ElfHeader::parse(&buf, cache.class, cache.order))
    }

    pub fn class(&self) -> Result<ElfClass> {
        Ok(self.cache()?.class)
    }

    pub fn endianness(&self) -> Result<Endianness> {
        Ok(self.cache()?.order)
    }

    /// Object file type (`e_type`).
    pub fn file_type(&self) -> Result<u16> {
        Ok(self.cache()?.e_type)
    }

    pub fn entry(&self) -> Result<u64> {
        Ok(self.cache()?.entry)
    }

    /// Index of the section-name string table, after escape resolution.
    pub fn shstrndx(&self) -> Result<u32> {
        Ok(self.cache()?.shstrndx)
    }

    /// Returns the name of the underlying reader.
    pub fn file_name(&self) -> &str {
        self.reader.file_name()
    }
}
