use super::list::GrowList;
use crate::{Result, elf::SectionFlags, error::bad_arg};
use alloc::{borrow::Cow, string::String, vec::Vec};

/// Handle to a section of an [`ElfWriter`](super::ElfWriter).
///
/// Handles are plain indices in creation order. Section `k` is written at
/// file index `k + 1`, after the null section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub(crate) usize);

impl SectionId {
    /// Position in the writer's section list.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    /// Index of the section in the emitted section header table.
    #[inline]
    pub fn file_index(self) -> u32 {
        self.0 as u32 + 1
    }
}

/// Parameters for [`ElfWriter::add_section`](super::ElfWriter::add_section).
#[derive(Debug, Clone)]
pub struct SectionCreateInfo<'a> {
    pub name: &'a str,
    pub sh_type: u32,
    pub flags: SectionFlags,
    /// Load address. Must be 0 unless `flags` contains `ALLOC`.
    pub addr: u64,
    pub link: Option<SectionId>,
    pub info: u32,
    /// Alignment, a nonzero power of two.
    pub align: u64,
    pub entsize: u64,
}

impl<'a> SectionCreateInfo<'a> {
    /// Creates a section description with no flags, no address and byte
    /// alignment.
    pub fn new(name: &'a str, sh_type: u32) -> Self {
        Self {
            name,
            sh_type,
            flags: SectionFlags::empty(),
            addr: 0,
            link: None,
            info: 0,
            align: 1,
            entsize: 0,
        }
    }

    pub fn with_flags(mut self, flags: SectionFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_addr(mut self, addr: u64) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_link(mut self, link: SectionId) -> Self {
        self.link = Some(link);
        self
    }

    pub fn with_info(mut self, info: u32) -> Self {
        self.info = info;
        self
    }

    pub fn with_align(mut self, align: u64) -> Self {
        self.align = align;
        self
    }

    pub fn with_entsize(mut self, entsize: u64) -> Self {
        self.entsize = entsize;
        self
    }
}

/// A piece of section data placed at a fixed offset within its section.
#[derive(Debug)]
pub struct Chunk<'data> {
    data: Cow<'data, [u8]>,
    offset: u64,
    align: u64,
}

impl<'data> Chunk<'data> {
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Offset of the chunk from the start of its section.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[inline]
    pub fn align(&self) -> u64 {
        self.align
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if the chunk holds a copy rather than a borrow.
    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self.data, Cow::Owned(_))
    }
}

#[inline]
pub(crate) fn is_valid_align(align: u64) -> bool {
    align.is_power_of_two()
}

/// Rounds `value` up to a multiple of `align`, a power of two.
#[inline]
pub(crate) fn align_up(value: u64, align: u64) -> u64 {
    let mask = align.max(1) - 1;
    (value + mask) & !mask
}

/// [`align_up`] that reports overflow instead of wrapping.
#[inline]
pub(crate) fn checked_align_up(value: u64, align: u64) -> Option<u64> {
    let mask = align.max(1) - 1;
    value.checked_add(mask).map(|v| v & !mask)
}

/// Writer-side section: metadata plus an ordered list of data chunks.
///
/// The section's size is the end of its last chunk. Chunks never overlap;
/// each one starts at the running cursor rounded up to its alignment.
#[derive(Debug)]
pub struct Section<'data> {
    pub(crate) name: String,
    pub(crate) sh_type: u32,
    pub(crate) flags: SectionFlags,
    pub(crate) addr: u64,
    pub(crate) link: Option<SectionId>,
    pub(crate) info: u32,
    pub(crate) align: u64,
    pub(crate) entsize: u64,
    chunks: GrowList<Chunk<'data>>,
    cursor: u64,
}

impl<'data> Section<'data> {
    pub(crate) fn new(info: &SectionCreateInfo<'_>) -> Self {
        Self {
            name: info.name.into(),
            sh_type: info.sh_type,
            flags: info.flags,
            addr: info.addr,
            link: info.link,
            info: info.info,
            align: info.align,
            entsize: info.entsize,
            chunks: GrowList::new(),
            cursor: 0,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn sh_type(&self) -> u32 {
        self.sh_type
    }

    #[inline]
    pub fn flags(&self) -> SectionFlags {
        self.flags
    }

    #[inline]
    pub fn addr(&self) -> u64 {
        self.addr
    }

    #[inline]
    pub fn link(&self) -> Option<SectionId> {
        self.link
    }

    #[inline]
    pub fn info(&self) -> u32 {
        self.info
    }

    /// Alignment given at creation (`sh_addralign`).
    #[inline]
    pub fn align(&self) -> u64 {
        self.align
    }

    #[inline]
    pub fn entsize(&self) -> u64 {
        self.entsize
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk<'data>] {
        self.chunks.as_slice()
    }

    /// Total size of the section data, padding included.
    #[inline]
    pub fn size(&self) -> u64 {
        self.cursor
    }

    /// Alignment the section needs in the file: the larger of its own
    /// alignment and that of every chunk.
    pub fn effective_align(&self) -> u64 {
        self.chunks
            .iter()
            .map(Chunk::align)
            .fold(self.align.max(1), u64::max)
    }

    /// Offset the next chunk with `align` would be placed at.
    #[inline]
    pub fn next_offset(&self, align: u64) -> u64 {
        align_up(self.cursor, align)
    }

    fn push_chunk(&mut self, data: Cow<'data, [u8]>, align: u64) -> Result<u64> {
        if !is_valid_align(align) {
            return Err(bad_arg("chunk alignment must be a nonzero power of two"));
        }
        if data.is_empty() {
            return Ok(self.cursor);
        }
        let offset = self.next_offset(align);
        let end = offset
            .checked_add(data.len() as u64)
            .ok_or_else(|| bad_arg("section size overflows"))?;
        self.chunks.push(Chunk {
            data,
            offset,
            align,
        })?;
        self.cursor = end;
        Ok(offset)
    }

    /// Appends borrowed `data` at the next offset aligned to `align` and
    /// returns that offset. Empty data changes nothing.
    pub fn append_data(&mut self, data: &'data [u8], align: u64) -> Result<u64> {
        self.push_chunk(Cow::Borrowed(data), align)
    }

    /// Like [`append_data`](Self::append_data), but the section takes
    /// ownership of the bytes.
    pub fn append_owned(&mut self, data: Vec<u8>, align: u64) -> Result<u64> {
        self.push_chunk(Cow::Owned(data), align)
    }

    /// Replaces all section data with `data`.
    pub fn set_data(&mut self, data: &'data [u8], align: u64) -> Result<u64> {
        if !is_valid_align(align) {
            return Err(bad_arg("chunk alignment must be a nonzero power of two"));
        }
        self.chunks.clear();
        self.cursor = 0;
        self.append_data(data, align)
    }
}
