#![allow(dead_code)]

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use elf_codec::{
    ElfClass, Endianness,
    abi::{EI_CLASS, EI_DATA, EI_VERSION, ELFMAGIC, ET_REL, EV_CURRENT},
};
use object::write::{Object, StandardSection, Symbol, SymbolSection};
use object::{Architecture, BinaryFormat, SymbolFlags, SymbolKind, SymbolScope};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn put_u16(buf: &mut [u8], order: Endianness, v: u16) {
    match order {
        Endianness::Big => BigEndian::write_u16(buf, v),
        _ => LittleEndian::write_u16(buf, v),
    }
}

fn put_u32(buf: &mut [u8], order: Endianness, v: u32) {
    match order {
        Endianness::Big => BigEndian::write_u32(buf, v),
        _ => LittleEndian::write_u32(buf, v),
    }
}

fn put_word(buf: &mut [u8], class: ElfClass, order: Endianness, v: u64) {
    if class.is_64() {
        match order {
            Endianness::Big => BigEndian::write_u64(buf, v),
            _ => LittleEndian::write_u64(buf, v),
        }
    } else {
        put_u32(buf, order, v as u32);
    }
}

/// Appends one symbol record in the layout of `class`.
pub fn put_symbol(
    out: &mut Vec<u8>,
    class: ElfClass,
    order: Endianness,
    name: u32,
    info: u8,
    shndx: u16,
    value: u64,
    size: u64,
) {
    fn put<B: ByteOrder>(out: &mut Vec<u8>, is_64: bool, name: u32, info: u8, shndx: u16, value: u64, size: u64) {
        let mut rec = [0u8; 24];
        B::write_u32(&mut rec[0..], name);
        if is_64 {
            rec[4] = info;
            B::write_u16(&mut rec[6..], shndx);
            B::write_u64(&mut rec[8..], value);
            B::write_u64(&mut rec[16..], size);
            out.extend_from_slice(&rec);
        } else {
            B::write_u32(&mut rec[4..], value as u32);
            B::write_u32(&mut rec[8..], size as u32);
            rec[12] = info;
            B::write_u16(&mut rec[14..], shndx);
            out.extend_from_slice(&rec[..16]);
        }
    }
    match order {
        Endianness::Big => put::<BigEndian>(out, class.is_64(), name, info, shndx, value, size),
        _ => put::<LittleEndian>(out, class.is_64(), name, info, shndx, value, size),
    }
}

/// Hand-built file header for exercising header validation.
#[derive(Debug, Clone)]
pub struct RawHeader {
    pub magic: [u8; 4],
    pub class: ElfClass,
    pub class_byte: Option<u8>,
    pub order: Endianness,
    pub data_byte: Option<u8>,
    pub ident_version: u8,
    pub e_type: u16,
    pub e_version: u32,
    pub e_ehsize: Option<u16>,
    pub e_phoff: u64,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shoff: u64,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl RawHeader {
    /// A valid relocatable header without program or section tables.
    pub fn new(class: ElfClass, order: Endianness) -> Self {
        Self {
            magic: ELFMAGIC,
            class,
            class_byte: None,
            order,
            data_byte: None,
            ident_version: EV_CURRENT,
            e_type: ET_REL,
            e_version: EV_CURRENT as u32,
            e_ehsize: None,
            e_phoff: 0,
            e_phentsize: 0,
            e_phnum: 0,
            e_shoff: 0,
            e_shentsize: 0,
            e_shnum: 0,
            e_shstrndx: 0,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let class = self.class;
        let order = self.order;
        let w = class.word_size();
        let mut buf = vec![0u8; class.header_size()];
        buf[..4].copy_from_slice(&self.magic);
        buf[EI_CLASS] = self.class_byte.unwrap_or(class.to_ident());
        buf[EI_DATA] = self.data_byte.unwrap_or(order.to_ident());
        buf[EI_VERSION] = self.ident_version;
        put_u16(&mut buf[16..], order, self.e_type);
        put_u16(&mut buf[18..], order, 0);
        put_u32(&mut buf[20..], order, self.e_version);
        put_word(&mut buf[24 + w..], class, order, self.e_phoff);
        put_word(&mut buf[24 + 2 * w..], class, order, self.e_shoff);
        let tail = 24 + 3 * w;
        let ehsize = self.e_ehsize.unwrap_or(class.header_size() as u16);
        put_u16(&mut buf[tail + 4..], order, ehsize);
        put_u16(&mut buf[tail + 6..], order, self.e_phentsize);
        put_u16(&mut buf[tail + 8..], order, self.e_phnum);
        put_u16(&mut buf[tail + 10..], order, self.e_shentsize);
        put_u16(&mut buf[tail + 12..], order, self.e_shnum);
        put_u16(&mut buf[tail + 14..], order, self.e_shstrndx);
        buf
    }
}

/// Encodes a section header with only type, size and link set.
pub fn raw_shdr(class: ElfClass, order: Endianness, sh_type: u32, size: u64, link: u32) -> Vec<u8> {
    let w = class.word_size();
    let mut buf = vec![0u8; class.shdr_size()];
    put_u32(&mut buf[4..], order, sh_type);
    put_word(&mut buf[8 + 3 * w..], class, order, size);
    put_u32(&mut buf[8 + 4 * w..], order, link);
    buf
}

/// A header followed directly by a section table holding only section 0,
/// whose `sh_size` and `sh_link` carry the given escape values.
pub fn escaped_header(
    class: ElfClass,
    order: Endianness,
    e_shnum: u16,
    e_shstrndx: u16,
    null_type: u32,
    null_size: u64,
    null_link: u32,
) -> Vec<u8> {
    let mut header = RawHeader::new(class, order);
    header.e_shoff = class.header_size() as u64;
    header.e_shentsize = class.shdr_size() as u16;
    header.e_shnum = e_shnum;
    header.e_shstrndx = e_shstrndx;
    let mut bytes = header.to_bytes();
    bytes.extend(raw_shdr(class, order, null_type, null_size, null_link));
    bytes
}

pub const TEXT: [u8; 16] = [
    0x55, 0x48, 0x89, 0xe5, 0x5d, 0xc3, 0x90, 0x90, 0x31, 0xc0, 0xc3, 0x90, 0x90, 0x90, 0x90, 0x90,
];
pub const DATA: [u8; 8] = [0, 0, 0, 0, 0x2a, 0, 0, 0];

/// Relocatable object built with `object::write`:
/// * `.text` holding `main` (0..6) and `helper` (8..12), both functions;
/// * `.data` holding `counter` (4..8), an object;
/// * `puts`, undefined.
pub fn object_file(arch: Architecture, endian: object::Endianness) -> Vec<u8> {
    let mut obj = Object::new(BinaryFormat::Elf, arch, endian);
    let text = obj.section_id(StandardSection::Text);
    obj.append_section_data(text, &TEXT, 16);
    let data = obj.section_id(StandardSection::Data);
    obj.append_section_data(data, &DATA, 8);

    let mut add = |name: &str, value, size, kind, section| {
        obj.add_symbol(Symbol {
            name: name.as_bytes().to_vec(),
            value,
            size,
            kind,
            scope: SymbolScope::Linkage,
            weak: false,
            section,
            flags: SymbolFlags::None,
        });
    };
    add("main", 0, 6, SymbolKind::Text, SymbolSection::Section(text));
    add("helper", 8, 4, SymbolKind::Text, SymbolSection::Section(text));
    add("counter", 4, 4, SymbolKind::Data, SymbolSection::Section(data));
    add("puts", 0, 0, SymbolKind::Text, SymbolSection::Undefined);
    obj.write().unwrap()
}

pub fn x86_64_object() -> Vec<u8> {
    object_file(Architecture::X86_64, object::Endianness::Little)
}

pub fn i386_object() -> Vec<u8> {
    object_file(Architecture::I386, object::Endianness::Little)
}

pub fn ppc64_object() -> Vec<u8> {
    object_file(Architecture::PowerPc64, object::Endianness::Big)
}
