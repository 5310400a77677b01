//! ELF image builder
//!
//! [`ElfWriter`] collects a header, sections and segments, then lays them
//! out and serializes them. Section data is appended as chunks that borrow
//! the caller's buffers for `'data`; nothing is copied until emission
//! unless [`Section::append_owned`] is used.
//!
//! # Examples
//! ```rust
//! use elf_codec::{
//!     ElfClass, Endianness,
//!     abi::{EM_X86_64, ET_REL, SHT_PROGBITS},
//!     elf::SectionFlags,
//!     writer::{ElfWriter, HeaderCreateInfo, SectionCreateInfo},
//! };
//!
//! let code = [0xc3u8];
//! let mut writer = ElfWriter::new();
//! writer
//!     .create_header(HeaderCreateInfo::new(ElfClass::Elf64, Endianness::Little, ET_REL, EM_X86_64))
//!     .unwrap();
//! let text = writer
//!     .add_section(
//!         SectionCreateInfo::new(".text", SHT_PROGBITS)
//!             .with_flags(SectionFlags::ALLOC | SectionFlags::EXECINSTR)
//!             .with_align(16),
//!     )
//!     .unwrap();
//! writer.section_mut(text).unwrap().append_data(&code, 1).unwrap();
//! let image = writer.to_bytes().unwrap();
//! assert_eq!(&image[..4], b"\x7fELF");
//! ```

mod emit;
mod layout;
mod list;
mod section;
mod segment;

pub use emit::ElfSink;
pub use layout::{Layout, LayoutPolicy};
pub use list::GrowList;
pub use section::{Chunk, Section, SectionCreateInfo, SectionId};
pub use segment::{SegMap, Segment, SegmentCreateInfo, SegmentId};

use crate::{
    Error, Result,
    elf::{EI_NIDENT, ElfClass, ElfHeader, SectionFlags},
    endian::Endianness,
    error::bad_arg,
};
use alloc::boxed::Box;
use elf::abi::{
    EI_ABIVERSION, EI_CLASS, EI_DATA, EI_OSABI, EI_VERSION, ELFMAGIC, ELFOSABI_SYSV, EV_CURRENT,
    SHT_DYNSYM, SHT_NULL, SHT_STRTAB, SHT_SYMTAB,
};
use section::is_valid_align;

/// Runtime configuration of an [`ElfWriter`].
#[derive(Debug, Clone, Copy)]
pub struct ElfWriterConfig {
    /// How section file offsets are chosen (default: `Packed`)
    pub layout_policy: LayoutPolicy,
    /// Page size used by `LayoutPolicy::Compat` (default: 0x1000)
    pub page_size: u64,
    /// Emit a `.shstrtab` section holding the section names (default: true)
    pub generate_shstrtab: bool,
}

impl Default for ElfWriterConfig {
    fn default() -> Self {
        Self {
            layout_policy: LayoutPolicy::Packed,
            page_size: 0x1000,
            generate_shstrtab: true,
        }
    }
}

impl ElfWriterConfig {
    /// Set the layout policy
    pub fn with_layout_policy(mut self, policy: LayoutPolicy) -> Self {
        self.layout_policy = policy;
        self
    }

    /// Set custom page size
    pub fn with_page_size(mut self, size: u64) -> Self {
        self.page_size = size;
        self
    }

    /// Enable or disable the generated section-name string table
    pub fn with_generate_shstrtab(mut self, generate: bool) -> Self {
        self.generate_shstrtab = generate;
        self
    }
}

/// Parameters for [`ElfWriter::create_header`].
#[derive(Debug, Clone, Copy)]
pub struct HeaderCreateInfo {
    pub class: ElfClass,
    pub order: Endianness,
    pub osabi: u8,
    pub abi_version: u8,
    /// Object file type (`e_type`).
    pub file_type: u16,
    pub machine: u16,
    pub entry: u64,
    pub flags: u32,
}

impl HeaderCreateInfo {
    pub fn new(class: ElfClass, order: Endianness, file_type: u16, machine: u16) -> Self {
        Self {
            class,
            order,
            osabi: ELFOSABI_SYSV,
            abi_version: 0,
            file_type,
            machine,
            entry: 0,
            flags: 0,
        }
    }

    pub fn with_osabi(mut self, osabi: u8, abi_version: u8) -> Self {
        self.osabi = osabi;
        self.abi_version = abi_version;
        self
    }

    pub fn with_entry(mut self, entry: u64) -> Self {
        self.entry = entry;
        self
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }
}

/// Incremental ELF image builder.
///
/// The writer performs no I/O of its own; see [`to_bytes`](Self::to_bytes)
/// and [`write_to`](Self::write_to) for emission.
#[derive(Debug, Default)]
pub struct ElfWriter<'data> {
    config: ElfWriterConfig,
    header: Option<Box<ElfHeader>>,
    sections: GrowList<Section<'data>>,
    segments: GrowList<Segment>,
}

impl<'data> ElfWriter<'data> {
    /// Creates an empty writer with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ElfWriterConfig::default())
    }

    pub fn with_config(config: ElfWriterConfig) -> Self {
        Self {
            config,
            header: None,
            sections: GrowList::new(),
            segments: GrowList::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &ElfWriterConfig {
        &self.config
    }

    /// Returns the header, if one was created. Table offsets and counts are
    /// only filled in by [`layout`](Self::layout).
    #[inline]
    pub fn header(&self) -> Option<&ElfHeader> {
        self.header.as_deref()
    }

    /// Creates or updates the file header.
    ///
    /// Class and file type are fixed by the first call; a later call may
    /// change the other fields. Fails with `BadArg` if class or byte order
    /// is `None`, if an earlier header had another class or file type, or
    /// if existing symbol tables have an entry size the class rejects.
    pub fn create_header(&mut self, info: HeaderCreateInfo) -> Result<()> {
        if info.class == ElfClass::None {
            return Err(bad_arg("file class must be 32 or 64 bit"));
        }
        if info.order == Endianness::None {
            return Err(bad_arg("byte order must be little or big endian"));
        }
        if let Some(old) = self.header.as_deref() {
            if old.class() != info.class {
                return Err(bad_arg("header already created with another class"));
            }
            if old.e_type != info.file_type {
                return Err(bad_arg("header already created with another file type"));
            }
        }
        let sym_size = info.class.sym_size() as u64;
        let conflict = self.sections.iter().any(|sec| {
            (sec.sh_type == SHT_SYMTAB || sec.sh_type == SHT_DYNSYM) && sec.entsize != sym_size
        });
        if conflict {
            return Err(bad_arg("symbol table entry size does not match the class"));
        }

        let mut e_ident = [0u8; EI_NIDENT];
        e_ident[..ELFMAGIC.len()].copy_from_slice(&ELFMAGIC);
        e_ident[EI_CLASS] = info.class.to_ident();
        e_ident[EI_DATA] = info.order.to_ident();
        e_ident[EI_VERSION] = EV_CURRENT;
        e_ident[EI_OSABI] = info.osabi;
        e_ident[EI_ABIVERSION] = info.abi_version;
        let header = ElfHeader {
            e_ident,
            e_type: info.file_type,
            e_machine: info.machine,
            e_version: EV_CURRENT as u32,
            e_entry: info.entry,
            e_phoff: 0,
            e_shoff: 0,
            e_flags: info.flags,
            e_ehsize: info.class.header_size() as u16,
            e_phentsize: 0,
            e_phnum: 0,
            e_shentsize: 0,
            e_shnum: 0,
            e_shstrndx: 0,
        };
        match self.header.as_deref_mut() {
            Some(old) => *old = header,
            None => self.header = Some(Box::new(header)),
        }
        Ok(())
    }

    /// Adds a section and returns its handle. The name is copied.
    ///
    /// Fails with `BadArg`, creating nothing, if:
    /// * `align` is not a nonzero power of two;
    /// * `addr` is nonzero without `SHF_ALLOC`, or not a multiple of `align`;
    /// * `entsize` is nonzero and not a multiple of `align`;
    /// * an `SHT_NULL` section has an address or entry size;
    /// * an `SHT_STRTAB` section has an entry size other than 0 or 1;
    /// * a symbol table's entry size does not match the header's class;
    /// * `link` names no existing section.
    pub fn add_section(&mut self, info: SectionCreateInfo<'_>) -> Result<SectionId> {
        let align = info.align;
        if !is_valid_align(align) {
            return Err(bad_arg("section alignment must be a nonzero power of two"));
        }
        if info.addr != 0 {
            if !info.flags.contains(SectionFlags::ALLOC) {
                return Err(bad_arg("only SHF_ALLOC sections may have an address"));
            }
            if info.addr % align != 0 {
                return Err(bad_arg("section address is not a multiple of its alignment"));
            }
        }
        if info.entsize % align != 0 {
            return Err(bad_arg("entry size is not a multiple of the alignment"));
        }
        match info.sh_type {
            SHT_NULL if info.addr != 0 || info.entsize != 0 => {
                return Err(bad_arg("SHT_NULL section with an address or entry size"));
            }
            SHT_STRTAB if info.entsize > 1 => {
                return Err(bad_arg("string table entry size must be 0 or 1"));
            }
            SHT_SYMTAB | SHT_DYNSYM => {
                if let Some(header) = self.header.as_deref() {
                    if info.entsize != header.class().sym_size() as u64 {
                        return Err(bad_arg("symbol table entry size does not match the class"));
                    }
                }
            }
            _ => {}
        }
        if let Some(link) = info.link {
            if link.0 >= self.sections.len() {
                return Err(bad_arg("section link names no existing section"));
            }
        }
        let idx = self.sections.push(Section::new(&info))?;
        Ok(SectionId(idx))
    }

    #[inline]
    pub fn section(&self, id: SectionId) -> Option<&Section<'data>> {
        self.sections.get(id.0)
    }

    #[inline]
    pub fn section_mut(&mut self, id: SectionId) -> Option<&mut Section<'data>> {
        self.sections.get_mut(id.0)
    }

    /// Number of sections added, not counting the null section and the
    /// generated `.shstrtab`.
    #[inline]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn sections(&self) -> impl Iterator<Item = (SectionId, &Section<'data>)> {
        self.sections
            .iter()
            .enumerate()
            .map(|(idx, sec)| (SectionId(idx), sec))
    }

    /// Adds an empty segment.
    pub fn add_segment(&mut self, info: SegmentCreateInfo) -> Result<SegmentId> {
        if !is_valid_align(info.align) {
            return Err(bad_arg("segment alignment must be a nonzero power of two"));
        }
        let idx = self.segments.push(Segment::new(&info))?;
        Ok(SegmentId(idx))
    }

    /// Adds a section range to `segment`.
    ///
    /// Whether the range fits its section is checked by
    /// [`layout`](Self::layout), since sections may still grow.
    pub fn segment_add_map(&mut self, segment: SegmentId, map: SegMap) -> Result<()> {
        if map.section.0 >= self.sections.len() {
            return Err(bad_arg("segment map names no existing section"));
        }
        if map.sec_offset.checked_add(map.size).is_none() {
            return Err(bad_arg("segment map range overflows"));
        }
        if let Some(align) = map.vaddr_align {
            if !is_valid_align(align) {
                return Err(bad_arg("vaddr alignment must be a nonzero power of two"));
            }
        }
        let seg = self.segments.get_mut(segment.0).ok_or(Error::BadIndex)?;
        seg.maps.push(map)?;
        Ok(())
    }

    #[inline]
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0)
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}
