use super::{
    ElfWriter,
    section::{align_up, checked_align_up},
};
use crate::{
    Error, Result,
    elf::{ElfHeader, ProgramHeader, SectionFlags, SectionHeader},
    error::bad_arg,
};
use alloc::vec::Vec;
use elf::abi::{PN_XNUM, SHN_LORESERVE, SHN_UNDEF, SHN_XINDEX, SHT_NOBITS, SHT_STRTAB};

const SHSTRTAB_NAME: &[u8] = b".shstrtab";

/// How the writer chooses section file offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutPolicy {
    /// Each section starts at the running cursor rounded up to its
    /// alignment.
    #[default]
    Packed,
    /// As `Packed`, but allocated sections with an address are placed at a
    /// file offset congruent to that address modulo the page size, so the
    /// image can be mapped page by page.
    Compat,
}

/// Result of [`ElfWriter::layout`]: every table entry the emitted file will
/// contain, with offsets resolved.
#[derive(Debug, Clone)]
pub struct Layout {
    pub(crate) header: ElfHeader,
    pub(crate) program_headers: Vec<ProgramHeader>,
    /// Full section header table, null entry and `.shstrtab` included.
    pub(crate) section_headers: Vec<SectionHeader>,
    pub(crate) shstrtab: Vec<u8>,
    pub(crate) file_size: u64,
}

impl Layout {
    /// The final file header.
    #[inline]
    pub fn header(&self) -> &ElfHeader {
        &self.header
    }

    #[inline]
    pub fn program_headers(&self) -> &[ProgramHeader] {
        &self.program_headers
    }

    #[inline]
    pub fn section_headers(&self) -> &[SectionHeader] {
        &self.section_headers
    }

    /// Contents of the generated section-name string table.
    #[inline]
    pub fn shstrtab(&self) -> &[u8] {
        &self.shstrtab
    }

    /// Total size of the emitted file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Real number of section headers, escapes resolved.
    #[inline]
    pub fn section_count(&self) -> usize {
        self.section_headers.len()
    }

    /// File offset of the section with file index `file_idx`.
    #[inline]
    pub fn section_offset(&self, file_idx: u32) -> Option<u64> {
        self.section_headers
            .get(file_idx as usize)
            .map(|shdr| shdr.sh_offset)
    }
}

/// Smallest offset `>= off` that is congruent to `addr` modulo `page`.
fn congruent_offset(off: u64, addr: u64, page: u64) -> u64 {
    let want = addr % page;
    let have = off % page;
    if have <= want {
        off - have + want
    } else {
        off - have + page + want
    }
}

impl<'data> ElfWriter<'data> {
    /// Computes file offsets for every table and section without changing
    /// the writer.
    ///
    /// Fails with `Uninitialized` if no header was created, and with
    /// `BadArg` for a segment without maps or with a map outside its
    /// section.
    pub fn layout(&self) -> Result<Layout> {
        let mut header = *self.header.as_deref().ok_or(Error::Uninitialized)?;
        let class = header.class();
        let word = class.word_size() as u64;
        let shdr_size = class.shdr_size() as u64;
        let phdr_size = class.phdr_size() as u64;
        let compat = self.config.layout_policy == LayoutPolicy::Compat && self.config.page_size > 1;

        let mut cursor = class.header_size() as u64;

        let phnum = self.segments.len();
        if phnum >= PN_XNUM as usize {
            return Err(bad_arg("too many segments"));
        }
        let phoff = if phnum > 0 {
            let phoff = align_up(cursor, word);
            cursor = phoff + phnum as u64 * phdr_size;
            phoff
        } else {
            0
        };

        let mut shstrtab = Vec::new();
        if self.config.generate_shstrtab {
            shstrtab.push(0);
        }

        let mut section_headers = Vec::with_capacity(self.sections.len() + 2);
        section_headers.push(SectionHeader::default());
        for sec in self.sections.iter() {
            let sh_name = if self.config.generate_shstrtab {
                let name_off = shstrtab.len() as u32;
                shstrtab.extend_from_slice(sec.name.as_bytes());
                shstrtab.push(0);
                name_off
            } else {
                0
            };
            let align = sec.effective_align();
            let mut offset = align_up(cursor, align);
            if compat && sec.flags.contains(SectionFlags::ALLOC) && sec.addr != 0 {
                offset = congruent_offset(offset, sec.addr, self.config.page_size);
            }
            if sec.sh_type != SHT_NOBITS {
                cursor = offset + sec.size();
            }
            #[cfg(feature = "log")]
            log::trace!(
                "[Layout] section: {}, offset: 0x{:x}, size: 0x{:x}, align: {}",
                sec.name,
                offset,
                sec.size(),
                align
            );
            section_headers.push(SectionHeader {
                sh_name,
                sh_type: sec.sh_type,
                sh_flags: sec.flags.bits(),
                sh_addr: sec.addr,
                sh_offset: offset,
                sh_size: sec.size(),
                sh_link: sec.link.map_or(0, |id| id.file_index()),
                sh_info: sec.info,
                sh_addralign: align,
                sh_entsize: sec.entsize,
            });
        }

        let mut shstrndx = SHN_UNDEF as u32;
        if self.config.generate_shstrtab {
            let sh_name = shstrtab.len() as u32;
            shstrtab.extend_from_slice(SHSTRTAB_NAME);
            shstrtab.push(0);
            shstrndx = section_headers.len() as u32;
            section_headers.push(SectionHeader {
                sh_name,
                sh_type: SHT_STRTAB,
                sh_offset: cursor,
                sh_size: shstrtab.len() as u64,
                sh_addralign: 1,
                ..Default::default()
            });
            cursor += shstrtab.len() as u64;
        }

        let shnum = section_headers.len();
        let shoff = align_up(cursor, word);
        let file_size = shoff + shnum as u64 * shdr_size;

        // Counts and indices past the reserved range move into section 0.
        let null = &mut section_headers[0];
        header.e_shnum = if shnum >= SHN_LORESERVE as usize {
            null.sh_size = shnum as u64;
            SHN_UNDEF
        } else {
            shnum as u16
        };
        header.e_shstrndx = if shstrndx >= SHN_LORESERVE as u32 {
            null.sh_link = shstrndx;
            SHN_XINDEX
        } else {
            shstrndx as u16
        };
        header.e_phoff = phoff;
        header.e_phnum = phnum as u16;
        header.e_phentsize = if phnum > 0 { phdr_size as u16 } else { 0 };
        header.e_shoff = shoff;
        header.e_shentsize = shdr_size as u16;
        header.e_ehsize = class.header_size() as u16;

        let mut program_headers = Vec::with_capacity(phnum);
        for seg in self.segments.iter() {
            let maps = seg.maps();
            let first = maps.first().ok_or_else(|| bad_arg("segment has no maps"))?;
            // Indices were checked when the maps were added.
            let first_shdr = &section_headers[first.section.file_index() as usize];
            let p_offset = first_shdr
                .sh_offset
                .checked_add(first.sec_offset)
                .ok_or_else(|| bad_arg("segment offset overflows"))?;
            let mut p_vaddr = first_shdr
                .sh_addr
                .checked_add(first.sec_offset)
                .ok_or_else(|| bad_arg("segment address overflows"))?;
            if let Some(align) = first.vaddr_align {
                p_vaddr = checked_align_up(p_vaddr, align)
                    .ok_or_else(|| bad_arg("segment address overflows"))?;
            }
            let mut file_end = p_offset;
            let mut mem_end = p_offset;
            for map in maps {
                let shdr = &section_headers[map.section.file_index() as usize];
                let map_end = map
                    .sec_offset
                    .checked_add(map.size)
                    .filter(|&end| end <= shdr.sh_size)
                    .ok_or_else(|| bad_arg("segment map lies outside its section"))?;
                let end = shdr
                    .sh_offset
                    .checked_add(map_end)
                    .ok_or_else(|| bad_arg("segment end overflows"))?;
                if shdr.sh_type != SHT_NOBITS {
                    file_end = file_end.max(end);
                }
                mem_end = mem_end.max(end);
            }
            program_headers.push(ProgramHeader {
                p_type: seg.p_type,
                p_flags: seg.flags.bits(),
                p_offset,
                p_vaddr,
                p_paddr: p_vaddr,
                p_filesz: file_end - p_offset,
                p_memsz: mem_end.max(file_end) - p_offset,
                p_align: seg.align,
            });
        }

        Ok(Layout {
            header,
            program_headers,
            section_headers,
            shstrtab,
            file_size,
        })
    }
}
