use super::{ElfWriter, layout::Layout};
use crate::{
    Error, Result,
    elf::{MAX_HEADER_SIZE, MAX_PHDR_SIZE, MAX_SHDR_SIZE},
};
use alloc::vec::Vec;
use elf::abi::SHT_NOBITS;

/// Destination of an emitted image.
///
/// Writes arrive in ascending, non-overlapping offset order; gaps between
/// them are filled with explicit zero writes, so a sink may simply append.
pub trait ElfSink {
    /// Stores `data` at absolute file `offset`.
    fn write(&mut self, offset: u64, data: &[u8]) -> Result<()>;
}

impl ElfSink for Vec<u8> {
    fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        let start = usize::try_from(offset).map_err(|_| Error::NoMemory)?;
        let end = start.checked_add(data.len()).ok_or(Error::NoMemory)?;
        if end > self.len() {
            self.try_reserve(end - self.len())
                .map_err(|_| Error::NoMemory)?;
            self.resize(end, 0);
        }
        self[start..end].copy_from_slice(data);
        Ok(())
    }
}

impl<S: ElfSink + ?Sized> ElfSink for &mut S {
    #[inline]
    fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        (**self).write(offset, data)
    }
}

#[cfg(feature = "std")]
impl ElfSink for std::fs::File {
    fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        use crate::error::io_error;
        use alloc::format;
        cfg_if::cfg_if! {
            if #[cfg(unix)] {
                use std::os::unix::fs::FileExt;
                self.write_all_at(data, offset)
                    .map_err(|e| io_error(format!("{e}")))
            } else {
                use std::io::{Seek, SeekFrom, Write};
                self.seek(SeekFrom::Start(offset))
                    .map_err(|e| io_error(format!("{e}")))?;
                self.write_all(data).map_err(|e| io_error(format!("{e}")))
            }
        }
    }
}

const ZEROS: [u8; 64] = [0; 64];

/// Tracks the emission position and zero-fills gaps.
struct Emitter<'s, S: ElfSink + ?Sized> {
    sink: &'s mut S,
    pos: u64,
}

impl<S: ElfSink + ?Sized> Emitter<'_, S> {
    fn put(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        while self.pos < offset {
            let n = (offset - self.pos).min(ZEROS.len() as u64) as usize;
            self.sink.write(self.pos, &ZEROS[..n])?;
            self.pos += n as u64;
        }
        if !data.is_empty() {
            self.sink.write(offset, data)?;
            self.pos = self.pos.max(offset + data.len() as u64);
        }
        Ok(())
    }
}

impl<'data> ElfWriter<'data> {
    /// Lays out the image and serializes it into `sink`.
    ///
    /// Returns the layout that was written.
    pub fn write_to<S: ElfSink + ?Sized>(&self, sink: &mut S) -> Result<Layout> {
        let layout = self.layout()?;
        let class = layout.header.class();
        let order = layout.header.endianness();
        let mut out = Emitter { sink, pos: 0 };

        let mut buf = [0u8; MAX_HEADER_SIZE];
        let size = class.header_size();
        layout.header.encode(&mut buf[..size]);
        out.put(0, &buf[..size])?;

        let phdr_size = class.phdr_size();
        for (idx, phdr) in layout.program_headers.iter().enumerate() {
            let mut buf = [0u8; MAX_PHDR_SIZE];
            phdr.encode(&mut buf[..phdr_size], class, order);
            out.put(
                layout.header.e_phoff + (idx * phdr_size) as u64,
                &buf[..phdr_size],
            )?;
        }

        for (sec, shdr) in self.sections.iter().zip(&layout.section_headers[1..]) {
            if shdr.sh_type == SHT_NOBITS {
                continue;
            }
            for chunk in sec.chunks() {
                out.put(shdr.sh_offset + chunk.offset(), chunk.data())?;
            }
            // Trailing alignment padding inside the section.
            out.put(shdr.sh_offset + shdr.sh_size, &[])?;
        }

        if !layout.shstrtab.is_empty() {
            let shdr = &layout.section_headers[layout.section_headers.len() - 1];
            out.put(shdr.sh_offset, &layout.shstrtab)?;
        }

        let shdr_size = class.shdr_size();
        for (idx, shdr) in layout.section_headers.iter().enumerate() {
            let mut buf = [0u8; MAX_SHDR_SIZE];
            shdr.encode(&mut buf[..shdr_size], class, order);
            out.put(
                layout.header.e_shoff + (idx * shdr_size) as u64,
                &buf[..shdr_size],
            )?;
        }
        Ok(layout)
    }

    /// Lays out the image and returns it as a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut image = Vec::new();
        let layout = self.write_to(&mut image)?;
        debug_assert_eq!(image.len() as u64, layout.file_size());
        Ok(image)
    }
}
