use super::{list::GrowList, section::SectionId};
use crate::elf::SegmentFlags;

/// Handle to a segment of an [`ElfWriter`](super::ElfWriter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId(pub(crate) usize);

impl SegmentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Parameters for [`ElfWriter::add_segment`](super::ElfWriter::add_segment).
#[derive(Debug, Clone, Copy)]
pub struct SegmentCreateInfo {
    pub p_type: u32,
    pub flags: SegmentFlags,
    pub align: u64,
}

impl SegmentCreateInfo {
    pub fn new(p_type: u32, flags: SegmentFlags) -> Self {
        Self {
            p_type,
            flags,
            align: 1,
        }
    }

    pub fn with_align(mut self, align: u64) -> Self {
        self.align = align;
        self
    }
}

/// One range of section data covered by a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegMap {
    pub section: SectionId,
    /// Start of the range within the section.
    pub sec_offset: u64,
    pub size: u64,
    /// When set, the segment's virtual address is rounded up to this
    /// alignment.
    pub vaddr_align: Option<u64>,
}

impl SegMap {
    /// Maps the whole of `section`, `size` bytes long.
    pub fn new(section: SectionId, size: u64) -> Self {
        Self {
            section,
            sec_offset: 0,
            size,
            vaddr_align: None,
        }
    }

    pub fn with_sec_offset(mut self, sec_offset: u64) -> Self {
        self.sec_offset = sec_offset;
        self
    }

    pub fn with_vaddr_align(mut self, align: u64) -> Self {
        self.vaddr_align = Some(align);
        self
    }
}

/// Writer-side segment, emitted as one program header.
#[derive(Debug)]
pub struct Segment {
    pub(crate) p_type: u32,
    pub(crate) flags: SegmentFlags,
    pub(crate) align: u64,
    pub(crate) maps: GrowList<SegMap>,
}

impl Segment {
    pub(crate) fn new(info: &SegmentCreateInfo) -> Self {
        Self {
            p_type: info.p_type,
            flags: info.flags,
            align: info.align,
            maps: GrowList::new(),
        }
    }

    #[inline]
    pub fn p_type(&self) -> u32 {
        self.p_type
    }

    #[inline]
    pub fn flags(&self) -> SegmentFlags {
        self.flags
    }

    #[inline]
    pub fn align(&self) -> u64 {
        self.align
    }

    #[inline]
    pub fn maps(&self) -> &[SegMap] {
        self.maps.as_slice()
    }
}
