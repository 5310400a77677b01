use super::{ElfReader, IntoElfReader};
use crate::{Error, Result};
use alloc::{
    string::{String, ToString},
    vec::Vec,
};

/// Copies `buf.len()` bytes at `offset` out of `bytes`, failing with
/// `IoEof` when the range runs past the end.
#[inline]
fn read_slice(bytes: &[u8], buf: &mut [u8], offset: u64) -> Result<()> {
    let start = usize::try_from(offset).map_err(|_| Error::IoEof)?;
    let end = start.checked_add(buf.len()).ok_or(Error::IoEof)?;
    let src = bytes.get(start..end).ok_or(Error::IoEof)?;
    buf.copy_from_slice(src);
    Ok(())
}

/// An ELF object source backed by an in-memory byte slice.
///
/// This is useful for ELF images that are already in memory, such as
/// those embedded in the binary or received over a network.
#[derive(Debug)]
pub struct ElfBinary<'bytes> {
    /// The name assigned to this ELF object.
    name: String,
    /// The raw ELF data.
    bytes: &'bytes [u8],
}

impl<'bytes> ElfBinary<'bytes> {
    /// Creates a new memory-based ELF object.
    ///
    /// # Arguments
    /// - `name` - A string identifier for the ELF object, typically the
    ///   original file path. Used for debugging.
    /// - `bytes` - A byte slice containing the complete ELF data.
    ///
    /// # Examples
    /// ```rust
    /// use elf_codec::input::ElfBinary;
    ///
    /// let data = &[]; // In practice, this would be the bytes of an ELF file
    /// let binary = ElfBinary::new("liba.o", data);
    /// ```
    pub fn new(name: &str, bytes: &'bytes [u8]) -> Self {
        Self {
            name: name.to_string(),
            bytes,
        }
    }

    /// Returns the wrapped bytes.
    #[inline]
    pub fn bytes(&self) -> &'bytes [u8] {
        self.bytes
    }
}

impl<'bytes> ElfReader for ElfBinary<'bytes> {
    fn file_name(&self) -> &str {
        &self.name
    }

    fn read(&mut self, buf: &mut [u8], offset: u64) -> Result<()> {
        read_slice(self.bytes, buf, offset)
    }
}

// Implementation of `ElfReader` for byte slices.
//
// This allows users to pass a byte slice directly to the reader context
// for in-memory ELF data.
impl<'a> ElfReader for &'a [u8] {
    fn read(&mut self, buf: &mut [u8], offset: u64) -> Result<()> {
        read_slice(self, buf, offset)
    }
}

/// An ELF object source backed by a caller-supplied read function.
///
/// The closure receives the absolute offset and the buffer to fill, and
/// carries whatever state it captures. This is the hook for bootloaders and
/// drivers that have no file or slice to hand out.
///
/// # Examples
/// ```rust
/// use elf_codec::{Error, input::{ElfReader, FnReader}};
///
/// let image = [0x7fu8, b'E', b'L', b'F'];
/// let mut reader = FnReader::new(|offset: u64, buf: &mut [u8]| {
///     let start = offset as usize;
///     let src = image.get(start..start + buf.len()).ok_or(Error::IoEof)?;
///     buf.copy_from_slice(src);
///     Ok(())
/// });
/// let mut magic = [0u8; 4];
/// reader.read(&mut magic, 0).unwrap();
/// assert_eq!(&magic, b"\x7fELF");
/// ```
pub struct FnReader<F> {
    read: F,
}

impl<F> FnReader<F>
where
    F: FnMut(u64, &mut [u8]) -> Result<()>,
{
    pub fn new(read: F) -> Self {
        Self { read }
    }

    /// Returns the wrapped closure.
    pub fn into_inner(self) -> F {
        self.read
    }
}

impl<F> ElfReader for FnReader<F>
where
    F: FnMut(u64, &mut [u8]) -> Result<()>,
{
    #[inline]
    fn read(&mut self, buf: &mut [u8], offset: u64) -> Result<()> {
        (self.read)(offset, buf)
    }
}

#[cfg(feature = "std")]
pub use file::ElfFile;

#[cfg(feature = "std")]
mod file {
    use super::{ElfReader, IntoElfReader};
    use crate::{Error, Result, error::io_error};
    use alloc::{format, string::String};
    use std::{fs::File, io};

    /// An ELF object source backed by a file on the filesystem.
    pub struct ElfFile {
        /// The path the file was opened from.
        name: String,
        file: File,
    }

    impl ElfFile {
        /// Opens the file at `path` for reading.
        ///
        /// The file is closed when the [`ElfFile`] is dropped.
        pub fn from_path(path: impl AsRef<str>) -> Result<Self> {
            let name = path.as_ref();
            let file = File::open(name)
                .map_err(|e| io_error(format!("failed to open {name}: {e}")))?;
            Ok(Self::from_file(name, file))
        }

        /// Wraps an already opened file.
        pub fn from_file(name: &str, file: File) -> Self {
            Self {
                name: name.into(),
                file,
            }
        }
    }

    fn map_io(e: io::Error) -> Error {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::IoEof
        } else {
            io_error(format!("{e}"))
        }
    }

    impl ElfReader for ElfFile {
        fn file_name(&self) -> &str {
            &self.name
        }

        fn read(&mut self, buf: &mut [u8], offset: u64) -> Result<()> {
            cfg_if::cfg_if! {
                if #[cfg(unix)] {
                    use std::os::unix::fs::FileExt;
                    self.file.read_exact_at(buf, offset).map_err(map_io)
                } else {
                    use std::io::{Read, Seek, SeekFrom};
                    self.file.seek(SeekFrom::Start(offset)).map_err(map_io)?;
                    self.file.read_exact(buf).map_err(map_io)
                }
            }
        }
    }

    // Implementation for string slices (file paths)
    impl<'a> IntoElfReader<'a> for &'a str {
        type Reader = ElfFile;

        fn into_reader(self) -> Result<Self::Reader> {
            ElfFile::from_path(self)
        }
    }

    // Implementation for owned strings (file paths)
    impl<'a> IntoElfReader<'a> for String {
        type Reader = ElfFile;

        fn into_reader(self) -> Result<Self::Reader> {
            ElfFile::from_path(&self)
        }
    }

    // Implementation for already constructed ElfFile (pass-through)
    impl<'a> IntoElfReader<'a> for ElfFile {
        type Reader = ElfFile;

        fn into_reader(self) -> Result<Self::Reader> {
            Ok(self)
        }
    }
}

// Implementation for byte slices (in-memory ELF data)
impl<'a> IntoElfReader<'a> for &'a [u8] {
    type Reader = ElfBinary<'a>;

    fn into_reader(self) -> Result<Self::Reader> {
        Ok(ElfBinary::new("<memory>", self))
    }
}

impl<'a> IntoElfReader<'a> for &'a Vec<u8> {
    type Reader = ElfBinary<'a>;

    fn into_reader(self) -> Result<Self::Reader> {
        Ok(ElfBinary::new("<memory>", self.as_slice()))
    }
}

// Implementation for already constructed ElfBinary (pass-through)
impl<'a, 'b> IntoElfReader<'a> for ElfBinary<'b>
where
    'b: 'a,
{
    type Reader = ElfBinary<'b>;

    fn into_reader(self) -> Result<Self::Reader> {
        Ok(self)
    }
}

impl<'a, F> IntoElfReader<'a> for FnReader<F>
where
    F: FnMut(u64, &mut [u8]) -> Result<()> + 'a,
{
    type Reader = FnReader<F>;

    fn into_reader(self) -> Result<Self::Reader> {
        Ok(self)
    }
}
