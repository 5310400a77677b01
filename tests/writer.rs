mod common;

use common::{init_logger, put_symbol};
use elf_codec::{
    ElfClass, ElfReaderContext, ElfWriter, Endianness, Error, Result,
    abi::{
        EM_PPC, EM_X86_64, ET_EXEC, ET_REL, PT_LOAD, SHN_XINDEX, SHT_GROUP, SHT_NOBITS, SHT_NULL,
        SHT_PROGBITS, SHT_RELA, SHT_STRTAB, SHT_SYMTAB, STB_GLOBAL, STT_OBJECT,
    },
    elf::{SectionFlags, SegmentFlags},
    writer::{
        ElfSink, ElfWriterConfig, GrowList, HeaderCreateInfo, LayoutPolicy, SectionCreateInfo,
        SegMap, SegmentCreateInfo,
    },
};
use object::{Object, ObjectSection};

const DEADBEEF: [u8; 4] = [0xde, 0xad, 0xbe, 0xef];

fn header(class: ElfClass, order: Endianness) -> HeaderCreateInfo {
    HeaderCreateInfo::new(class, order, ET_REL, EM_X86_64)
}

fn writer64<'data>() -> ElfWriter<'data> {
    init_logger();
    let mut writer = ElfWriter::new();
    writer
        .create_header(header(ElfClass::Elf64, Endianness::Little))
        .unwrap();
    writer
}

fn alloc(name: &str, sh_type: u32) -> SectionCreateInfo<'_> {
    SectionCreateInfo::new(name, sh_type).with_flags(SectionFlags::ALLOC)
}

#[test]
fn header_identity_is_fixed() {
    let mut writer = ElfWriter::new();
    assert!(matches!(
        writer.create_header(header(ElfClass::None, Endianness::Little)),
        Err(Error::BadArg { .. })
    ));
    assert!(matches!(
        writer.create_header(header(ElfClass::Elf64, Endianness::None)),
        Err(Error::BadArg { .. })
    ));
    assert!(writer.header().is_none());

    writer
        .create_header(header(ElfClass::Elf64, Endianness::Little))
        .unwrap();
    assert!(matches!(
        writer.create_header(header(ElfClass::Elf32, Endianness::Little)),
        Err(Error::BadArg { .. })
    ));
    assert!(matches!(
        writer.create_header(HeaderCreateInfo::new(
            ElfClass::Elf64,
            Endianness::Little,
            ET_EXEC,
            EM_X86_64
        )),
        Err(Error::BadArg { .. })
    ));

    writer
        .create_header(header(ElfClass::Elf64, Endianness::Little).with_entry(0x401000))
        .unwrap();
    let ehdr = writer.header().unwrap();
    assert!(ehdr.has_magic());
    assert_eq!(ehdr.e_entry, 0x401000);
    assert_eq!(ehdr.class(), ElfClass::Elf64);
    assert_eq!(ehdr.e_version, 1);
}

#[test]
fn header_checks_existing_symbol_tables() {
    let mut writer = ElfWriter::new();
    writer
        .add_section(SectionCreateInfo::new(".symtab", SHT_SYMTAB).with_entsize(16))
        .unwrap();
    assert!(matches!(
        writer.create_header(header(ElfClass::Elf64, Endianness::Little)),
        Err(Error::BadArg { .. })
    ));
    writer
        .create_header(header(ElfClass::Elf32, Endianness::Big))
        .unwrap();
}

#[test]
fn invalid_sections_are_not_created() {
    // A handle this writer never handed out.
    let mut other = ElfWriter::new();
    other.add_section(SectionCreateInfo::new("x", SHT_PROGBITS)).unwrap();
    let foreign = other.add_section(SectionCreateInfo::new("y", SHT_PROGBITS)).unwrap();

    let mut writer = writer64();
    let text = writer
        .add_section(alloc(".text", SHT_PROGBITS).with_align(16))
        .unwrap();
    let bad = [
        SectionCreateInfo::new("a", SHT_PROGBITS).with_align(0),
        SectionCreateInfo::new("b", SHT_PROGBITS).with_align(3),
        SectionCreateInfo::new("c", SHT_PROGBITS).with_addr(0x1000),
        alloc("d", SHT_PROGBITS).with_align(16).with_addr(0x1008),
        SectionCreateInfo::new("e", SHT_PROGBITS).with_align(8).with_entsize(12),
        SectionCreateInfo::new("f", SHT_NULL).with_align(4).with_entsize(4),
        SectionCreateInfo::new("g", SHT_STRTAB).with_entsize(2),
        SectionCreateInfo::new("h", SHT_SYMTAB).with_entsize(16).with_align(8),
        SectionCreateInfo::new("i", SHT_PROGBITS).with_link(foreign),
    ];
    for info in bad {
        let name = info.name;
        assert!(
            matches!(writer.add_section(info), Err(Error::BadArg { .. })),
            "section {name} was accepted"
        );
    }
    assert_eq!(writer.section_count(), 1);

    let symtab = writer
        .add_section(
            SectionCreateInfo::new(".symtab", SHT_SYMTAB)
                .with_entsize(24)
                .with_align(8)
                .with_link(text),
        )
        .unwrap();
    let sec = writer.section(symtab).unwrap();
    assert_eq!(sec.name(), ".symtab");
    assert_eq!(sec.link(), Some(text));
    assert_eq!(symtab.file_index(), 2);
}

#[test]
fn chunks_follow_the_cursor() {
    let head = [1u8, 2, 3];
    let tail = [4u8; 4];
    let mut writer = writer64();
    let id = writer
        .add_section(SectionCreateInfo::new(".data", SHT_PROGBITS))
        .unwrap();
    let sec = writer.section_mut(id).unwrap();
    assert_eq!(sec.append_data(&head, 1).unwrap(), 0);
    assert_eq!(sec.next_offset(8), 8);
    assert_eq!(sec.next_offset(1), 3);
    assert_eq!(sec.append_data(&tail, 8).unwrap(), 8);
    assert_eq!(sec.size(), 12);

    assert_eq!(sec.append_data(&[], 64).unwrap(), 12);
    assert_eq!(sec.chunks().len(), 2);
    assert!(matches!(sec.append_data(&tail, 6), Err(Error::BadArg { .. })));
    assert!(matches!(sec.append_data(&tail, 0), Err(Error::BadArg { .. })));
    assert_eq!(sec.effective_align(), 8);

    let chunk = &sec.chunks()[1];
    assert_eq!((chunk.offset(), chunk.len(), chunk.align()), (8, 4, 8));
    assert!(!chunk.is_owned());

    assert_eq!(sec.append_owned(vec![9; 2], 4).unwrap(), 12);
    assert!(sec.chunks()[2].is_owned());
    assert_eq!(sec.size(), 14);

    assert_eq!(sec.set_data(&tail, 2).unwrap(), 0);
    assert_eq!(sec.chunks().len(), 1);
    assert_eq!(sec.size(), 4);
}

#[test]
fn next_offset_rounds_up_without_moving() {
    let mut writer = writer64();
    let id = writer
        .add_section(SectionCreateInfo::new(".data", SHT_PROGBITS))
        .unwrap();
    let sec = writer.section_mut(id).unwrap();
    sec.append_data(&[7u8; 5], 1).unwrap();
    assert_eq!(sec.next_offset(16), 16);
    assert_eq!(sec.next_offset(16), 16);
    assert_eq!(sec.size(), 5);

    sec.append_data(&[7u8; 11], 1).unwrap();
    assert_eq!(sec.size(), 16);
    assert_eq!(sec.next_offset(16), 16);
    assert_eq!(sec.append_data(&[8u8; 4], 16).unwrap(), 16);
}

#[test]
fn segment_maps_must_fit_their_section() {
    let code = [0x90u8; 8];
    let mut writer = writer64();
    let text = writer
        .add_section(alloc(".text", SHT_PROGBITS).with_addr(0x1000))
        .unwrap();
    writer.section_mut(text).unwrap().append_data(&code, 1).unwrap();
    let seg = writer
        .add_segment(SegmentCreateInfo::new(PT_LOAD, SegmentFlags::R))
        .unwrap();
    assert!(matches!(
        writer.segment_add_map(seg, SegMap::new(text, 4).with_sec_offset(u64::MAX)),
        Err(Error::BadArg { .. })
    ));
    assert!(writer.segment(seg).unwrap().maps().is_empty());

    // Accepted while the section may still grow, rejected at layout.
    writer
        .segment_add_map(seg, SegMap::new(text, 8).with_sec_offset(4))
        .unwrap();
    assert!(matches!(writer.layout(), Err(Error::BadArg { .. })));
    assert!(matches!(writer.to_bytes(), Err(Error::BadArg { .. })));

    writer.section_mut(text).unwrap().append_data(&code, 1).unwrap();
    let phdr = writer.layout().unwrap().program_headers()[0];
    assert_eq!(phdr.p_vaddr, 0x1004);
    assert_eq!(phdr.p_filesz, 8);
}

#[test]
fn segment_address_overflow_is_rejected() {
    let mut writer = writer64();
    let text = writer
        .add_section(alloc(".text", SHT_PROGBITS).with_addr(u64::MAX - 2))
        .unwrap();
    writer.section_mut(text).unwrap().append_data(&[0u8; 8], 1).unwrap();
    let seg = writer
        .add_segment(SegmentCreateInfo::new(PT_LOAD, SegmentFlags::R))
        .unwrap();
    writer
        .segment_add_map(seg, SegMap::new(text, 4).with_sec_offset(4))
        .unwrap();
    assert!(matches!(writer.layout(), Err(Error::BadArg { .. })));

    let mut writer = writer64();
    let text = writer
        .add_section(alloc(".text", SHT_PROGBITS).with_addr(u64::MAX - 2))
        .unwrap();
    writer.section_mut(text).unwrap().append_data(&[0u8; 8], 1).unwrap();
    let seg = writer
        .add_segment(SegmentCreateInfo::new(PT_LOAD, SegmentFlags::R))
        .unwrap();
    writer
        .segment_add_map(seg, SegMap::new(text, 4).with_vaddr_align(0x1000))
        .unwrap();
    assert!(matches!(writer.layout(), Err(Error::BadArg { .. })));
}

#[test]
fn grow_list_doubles_from_four() {
    let mut list = GrowList::new();
    assert_eq!(list.capacity(), 0);
    assert_eq!(list.push(10u32).unwrap(), 0);
    assert_eq!(list.capacity(), 4);
    for v in 11..14 {
        list.push(v).unwrap();
    }
    assert_eq!(list.capacity(), 4);
    assert_eq!(list.push(14).unwrap(), 4);
    assert_eq!(list.capacity(), 8);
    assert_eq!(list.len(), 5);
    assert_eq!(list.get(2), Some(&12));
    assert_eq!(list.get(5), None);
    *list.get_mut(0).unwrap() = 7;
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), [7, 11, 12, 13, 14]);
    list.clear();
    assert!(list.is_empty());
}

#[test]
fn packed_layout_offsets() {
    let code = [0x90u8; 6];
    let word = [0u8; 4];
    let mut writer = writer64();
    let text = writer
        .add_section(alloc(".text", SHT_PROGBITS).with_align(16))
        .unwrap();
    let data = writer
        .add_section(SectionCreateInfo::new(".data", SHT_PROGBITS).with_align(1))
        .unwrap();
    writer.section_mut(text).unwrap().append_data(&code, 1).unwrap();
    writer.section_mut(data).unwrap().append_data(&word, 8).unwrap();

    let layout = writer.layout().unwrap();
    assert_eq!(layout.section_offset(text.file_index()), Some(64));
    // The chunk alignment raises the section alignment to 8.
    assert_eq!(layout.section_offset(data.file_index()), Some(72));
    assert_eq!(layout.section_headers()[2].sh_addralign, 8);
    assert_eq!(layout.shstrtab(), b"\0.text\0.data\0.shstrtab\0");
    let shstrtab = &layout.section_headers()[3];
    assert_eq!(shstrtab.sh_type, SHT_STRTAB);
    assert_eq!(shstrtab.sh_offset, 76);
    assert_eq!(layout.header().e_shoff, 104);
    assert_eq!(layout.header().e_shnum, 4);
    assert_eq!(layout.header().e_shstrndx, 3);
    assert_eq!(layout.file_size(), 104 + 4 * 64);
    assert_eq!(writer.to_bytes().unwrap().len() as u64, layout.file_size());
}

#[test]
fn compat_layout_keeps_addresses_congruent() {
    let code = [0xc3u8; 8];
    let mut writer = ElfWriter::with_config(
        ElfWriterConfig::default()
            .with_layout_policy(LayoutPolicy::Compat)
            .with_page_size(0x1000),
    );
    writer
        .create_header(header(ElfClass::Elf64, Endianness::Little))
        .unwrap();
    let text = writer
        .add_section(alloc(".text", SHT_PROGBITS).with_addr(0x401010).with_align(16))
        .unwrap();
    writer.section_mut(text).unwrap().append_data(&code, 16).unwrap();
    let layout = writer.layout().unwrap();
    assert_eq!(layout.section_offset(text.file_index()), Some(0x1010));

    // Packed ignores the address.
    let mut packed = ElfWriter::new();
    packed
        .create_header(header(ElfClass::Elf64, Endianness::Little))
        .unwrap();
    let text = packed
        .add_section(alloc(".text", SHT_PROGBITS).with_addr(0x401010).with_align(16))
        .unwrap();
    packed.section_mut(text).unwrap().append_data(&code, 16).unwrap();
    assert_eq!(packed.layout().unwrap().section_offset(text.file_index()), Some(64));
}

#[test]
fn segments_span_their_maps() {
    let code = [0xc3u8; 10];
    let bss = [0u8; 32];
    let mut writer = writer64();
    let text = writer
        .add_section(alloc(".text", SHT_PROGBITS).with_addr(0x400100).with_align(16))
        .unwrap();
    let zero = writer
        .add_section(alloc(".bss", SHT_NOBITS).with_addr(0x400200).with_align(16))
        .unwrap();
    let note = writer
        .add_section(SectionCreateInfo::new(".comment", SHT_PROGBITS))
        .unwrap();
    writer.section_mut(text).unwrap().append_data(&code, 1).unwrap();
    writer.section_mut(zero).unwrap().append_data(&bss, 1).unwrap();
    writer.section_mut(note).unwrap().append_data(b"x\0", 1).unwrap();

    let seg = writer
        .add_segment(SegmentCreateInfo::new(PT_LOAD, SegmentFlags::R | SegmentFlags::X).with_align(0x1000))
        .unwrap();
    writer.segment_add_map(seg, SegMap::new(text, 10)).unwrap();
    writer.segment_add_map(seg, SegMap::new(zero, 32)).unwrap();
    assert!(matches!(
        writer.segment_add_map(seg, SegMap::new(note, 1).with_vaddr_align(3)),
        Err(Error::BadArg { .. })
    ));

    let layout = writer.layout().unwrap();
    let ehdr = layout.header();
    assert_eq!(ehdr.e_phoff, 64);
    assert_eq!(ehdr.e_phnum, 1);
    assert_eq!(ehdr.e_phentsize, 56);

    // Header and one program header end at 120; .text aligns to 128.
    let text_off = layout.section_offset(text.file_index()).unwrap();
    let bss_off = layout.section_offset(zero.file_index()).unwrap();
    assert_eq!(text_off, 128);
    assert_eq!(bss_off, 144);
    // .bss takes no file space, so .comment follows .text directly.
    assert_eq!(layout.section_offset(note.file_index()), Some(text_off + 10));

    let phdr = layout.program_headers()[0];
    assert_eq!(phdr.p_type, PT_LOAD);
    assert_eq!(phdr.p_offset, text_off);
    assert_eq!(phdr.p_vaddr, 0x400100);
    assert_eq!(phdr.p_paddr, 0x400100);
    assert_eq!(phdr.p_filesz, 10);
    assert_eq!(phdr.p_memsz, bss_off + 32 - text_off);
    assert_eq!(phdr.flags(), SegmentFlags::R | SegmentFlags::X);
    assert_eq!(phdr.p_align, 0x1000);

    let empty = writer
        .add_segment(SegmentCreateInfo::new(PT_LOAD, SegmentFlags::R))
        .unwrap();
    assert!(writer.segment(empty).unwrap().maps().is_empty());
    assert!(matches!(writer.layout(), Err(Error::BadArg { .. })));
}

#[test]
fn layout_requires_a_header() {
    let writer = ElfWriter::new();
    assert!(matches!(writer.layout(), Err(Error::Uninitialized)));
    assert!(matches!(writer.to_bytes(), Err(Error::Uninitialized)));
}

/// Writes `.text`, `.data` holding DEADBEEF after a 3-byte chunk, `.bss`,
/// and a symbol table, then reads it back with both readers.
fn round_trip(class: ElfClass, order: Endianness) {
    init_logger();
    let prefix = [1u8, 2, 3];
    let strtab_bytes = b"\0answer\0";
    let mut writer = ElfWriter::new();
    writer
        .create_header(HeaderCreateInfo::new(class, order, ET_REL, EM_PPC))
        .unwrap();
    let text = writer
        .add_section(
            alloc(".text", SHT_PROGBITS)
                .with_flags(SectionFlags::ALLOC | SectionFlags::EXECINSTR)
                .with_align(4),
        )
        .unwrap();
    let data = writer
        .add_section(
            alloc(".data", SHT_PROGBITS)
                .with_flags(SectionFlags::ALLOC | SectionFlags::WRITE)
                .with_align(4),
        )
        .unwrap();
    let bss = writer
        .add_section(alloc(".bss", SHT_NOBITS).with_align(8))
        .unwrap();
    let strtab = writer
        .add_section(SectionCreateInfo::new(".strtab", SHT_STRTAB))
        .unwrap();
    let sym_size = class.sym_size() as u64;
    let symtab = writer
        .add_section(
            SectionCreateInfo::new(".symtab", SHT_SYMTAB)
                .with_link(strtab)
                .with_info(1)
                .with_align(class.word_size() as u64)
                .with_entsize(sym_size),
        )
        .unwrap();

    let mut symbols = Vec::new();
    put_symbol(&mut symbols, class, order, 0, 0, 0, 0, 0);
    put_symbol(
        &mut symbols,
        class,
        order,
        1,
        (STB_GLOBAL << 4) | STT_OBJECT,
        data.file_index() as u16,
        4,
        4,
    );
    let zeros = [0u8; 16];
    writer.section_mut(text).unwrap().append_data(&[0x4e, 0x80, 0x00, 0x20], 4).unwrap();
    writer.section_mut(data).unwrap().append_data(&prefix, 1).unwrap();
    let beef_off = writer.section_mut(data).unwrap().append_data(&DEADBEEF, 4).unwrap();
    assert_eq!(beef_off, 4);
    writer.section_mut(bss).unwrap().append_data(&zeros, 8).unwrap();
    writer.section_mut(strtab).unwrap().append_data(strtab_bytes, 1).unwrap();
    writer.section_mut(symtab).unwrap().append_owned(symbols, 1).unwrap();

    let layout = writer.layout().unwrap();
    let image = writer.to_bytes().unwrap();
    assert_eq!(image.len() as u64, layout.file_size());
    let beef_at = (layout.section_offset(data.file_index()).unwrap() + beef_off) as usize;
    assert_eq!(&image[beef_at..beef_at + 4], &DEADBEEF);
    // Alignment gap inside .data is zero-filled.
    assert_eq!(image[beef_at - 1], 0);

    let file = object::File::parse(image.as_slice()).unwrap();
    assert_eq!(file.is_64(), class.is_64());
    assert_eq!(file.is_little_endian(), order == Endianness::Little);
    let obj_data = file.section_by_name(".data").unwrap();
    assert_eq!(obj_data.data().unwrap(), &[1, 2, 3, 0, 0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(obj_data.index().0 as u32, data.file_index());
    assert_eq!(file.section_by_name(".bss").unwrap().size(), 16);
    assert!(file.section_by_name(".shstrtab").is_some());

    let mut ctx = ElfReaderContext::new(image.as_slice());
    ctx.init().unwrap();
    assert_eq!(ctx.class().unwrap(), class);
    assert_eq!(ctx.endianness().unwrap(), order);
    assert_eq!(ctx.section_count(), 7);
    let (idx, shdr) = ctx.section_by_name(".data").unwrap();
    assert_eq!(idx, data.file_index());
    assert_eq!(shdr.sh_offset, layout.section_offset(idx).unwrap());
    assert_eq!(shdr.sh_size, 8);
    let (_, bss_hdr) = ctx.section_by_name(".bss").unwrap();
    assert!(bss_hdr.is_nobits());

    let (_, symtab_hdr) = ctx.section_by_name(".symtab").unwrap();
    assert_eq!(symtab_hdr.sh_link, strtab.file_index());
    assert_eq!(ctx.symbol_count(&symtab_hdr), 2);
    let (sym_idx, sym) = ctx.symbol_by_name(&symtab_hdr, "answer").unwrap();
    assert_eq!(sym_idx, 1);
    assert_eq!(sym.st_value, 4);
    assert_eq!(sym.st_type, STT_OBJECT);
    assert_eq!(sym.st_shndx as u32, data.file_index());
    assert_eq!(ctx.symbol_by_addr_exact(&symtab_hdr, 4).unwrap().1, sym);
    assert_eq!(ctx.symbol_by_addr_range(&symtab_hdr, 7).unwrap().1, sym);
}

#[test]
fn round_trip_64_little() {
    round_trip(ElfClass::Elf64, Endianness::Little);
}

#[test]
fn round_trip_64_big() {
    round_trip(ElfClass::Elf64, Endianness::Big);
}

#[test]
fn round_trip_32_little() {
    round_trip(ElfClass::Elf32, Endianness::Little);
}

#[test]
fn round_trip_32_big() {
    round_trip(ElfClass::Elf32, Endianness::Big);
}

#[test]
fn names_can_be_left_out() {
    let code = [0u8; 4];
    let mut writer = ElfWriter::with_config(ElfWriterConfig::default().with_generate_shstrtab(false));
    writer
        .create_header(header(ElfClass::Elf32, Endianness::Little))
        .unwrap();
    let text = writer
        .add_section(alloc(".text", SHT_PROGBITS))
        .unwrap();
    writer.section_mut(text).unwrap().append_data(&code, 1).unwrap();
    let image = writer.to_bytes().unwrap();

    let mut ctx = ElfReaderContext::new(image.as_slice());
    ctx.init().unwrap();
    assert_eq!(ctx.section_count(), 2);
    assert_eq!(ctx.shstrndx().unwrap(), 0);
    let shdr = ctx.section_header(1).unwrap();
    assert_eq!(shdr.sh_size, 4);
    let mut buf = [0u8; 16];
    assert!(matches!(ctx.section_name(&shdr, &mut buf), Err(Error::BadArg { .. })));
}

#[test]
fn large_section_tables_use_escapes() {
    let mut writer = ElfWriter::new();
    writer
        .create_header(header(ElfClass::Elf64, Endianness::Big))
        .unwrap();
    for _ in 0..0xff00 {
        writer
            .add_section(SectionCreateInfo::new("s", SHT_PROGBITS))
            .unwrap();
    }
    let layout = writer.layout().unwrap();
    assert_eq!(layout.header().e_shnum, 0);
    assert_eq!(layout.header().e_shstrndx, SHN_XINDEX);
    assert_eq!(layout.section_headers()[0].sh_size, 0xff02);
    assert_eq!(layout.section_headers()[0].sh_link, 0xff01);

    let image = writer.to_bytes().unwrap();
    let mut ctx = ElfReaderContext::new(image.as_slice());
    ctx.init().unwrap();
    assert_eq!(ctx.section_count(), 0xff02);
    assert_eq!(ctx.shstrndx().unwrap(), 0xff01);
    let shstrtab = ctx.section_header(0xff01).unwrap();
    let mut buf = [0u8; 16];
    assert_eq!(ctx.section_name(&shstrtab, &mut buf).unwrap().to_bytes(), b".shstrtab");
}

/// Rejects gaps and overlaps, so emission must zero-fill in order.
#[derive(Default)]
struct StrictSink {
    bytes: Vec<u8>,
}

impl ElfSink for StrictSink {
    fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        assert_eq!(offset, self.bytes.len() as u64);
        self.bytes.extend_from_slice(data);
        Ok(())
    }
}

#[test]
fn emission_is_sequential() {
    let code = [0xaau8; 5];
    let mut writer = writer64();
    let a = writer
        .add_section(alloc(".a", SHT_PROGBITS).with_align(32))
        .unwrap();
    let b = writer
        .add_section(alloc(".b", SHT_PROGBITS).with_align(64))
        .unwrap();
    writer.section_mut(a).unwrap().append_data(&code, 1).unwrap();
    writer.section_mut(a).unwrap().append_data(&code, 16).unwrap();
    writer.section_mut(b).unwrap().append_data(&code, 1).unwrap();

    let mut sink = StrictSink::default();
    let layout = writer.write_to(&mut sink).unwrap();
    assert_eq!(sink.bytes.len() as u64, layout.file_size());
    assert_eq!(sink.bytes, writer.to_bytes().unwrap());
}

#[test]
fn reader_validates_written_sections() {
    let payload = [0u8; 8];

    let mut writer = writer64();
    let rela = writer
        .add_section(SectionCreateInfo::new(".rela.text", SHT_RELA).with_align(8).with_entsize(8))
        .unwrap();
    writer.section_mut(rela).unwrap().append_data(&payload, 8).unwrap();
    let image = writer.to_bytes().unwrap();
    let mut ctx = ElfReaderContext::new(image.as_slice());
    ctx.init().unwrap();
    assert!(matches!(ctx.section_header(0), Ok(_)));
    assert!(matches!(ctx.section_header(rela.file_index()), Err(Error::BadSize { .. })));

    let mut writer = writer64();
    let zdebug = writer
        .add_section(alloc(".zdata", SHT_PROGBITS).with_flags(SectionFlags::ALLOC | SectionFlags::COMPRESSED))
        .unwrap();
    let zbss = writer
        .add_section(SectionCreateInfo::new(".zbss", SHT_NOBITS).with_flags(SectionFlags::COMPRESSED))
        .unwrap();
    let image = writer.to_bytes().unwrap();
    let mut ctx = ElfReaderContext::new(image.as_slice());
    ctx.init().unwrap();
    assert!(matches!(ctx.section_header(zdebug.file_index()), Err(Error::BadFormat { .. })));
    assert!(matches!(ctx.section_header(zbss.file_index()), Err(Error::BadFormat { .. })));

    for (e_type, ok) in [(ET_REL, true), (ET_EXEC, false)] {
        let mut writer = ElfWriter::new();
        writer
            .create_header(HeaderCreateInfo::new(ElfClass::Elf64, Endianness::Little, e_type, EM_X86_64))
            .unwrap();
        let group = writer
            .add_section(SectionCreateInfo::new(".group", SHT_GROUP).with_align(4).with_entsize(4))
            .unwrap();
        let image = writer.to_bytes().unwrap();
        let mut ctx = ElfReaderContext::new(image.as_slice());
        ctx.init().unwrap();
        let res = ctx.section_header(group.file_index());
        if ok {
            assert!(res.is_ok());
        } else {
            assert!(matches!(res, Err(Error::BadFormat { .. })));
        }
    }
}
