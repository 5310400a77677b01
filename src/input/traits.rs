use crate::Result;

/// A trait for reading ELF data from various sources.
///
/// `ElfReader` abstracts the underlying storage (memory, file system, a
/// flash device behind a driver) and gives the reader context positional
/// access to it. Every call is addressed by an absolute offset; the source
/// keeps no cursor the context relies on.
pub trait ElfReader {
    /// Fills `buf` completely with the bytes starting at `offset`.
    ///
    /// # Errors
    /// * [`Error::IoEof`](crate::Error::IoEof) if the source ends before
    ///   `offset + buf.len()`.
    /// * [`Error::Io`](crate::Error::Io) for any other failure.
    ///
    /// Partial fills are not allowed; implementations must not retry on the
    /// caller's behalf.
    fn read(&mut self, buf: &mut [u8], offset: u64) -> Result<()>;

    /// Returns the full name or path of the ELF object.
    fn file_name(&self) -> &str {
        "<memory>"
    }

    /// Returns the short name of the ELF object (the filename without the path).
    fn shortname(&self) -> &str {
        let name = self.file_name();
        name.rsplit('/').next().unwrap_or(name)
    }
}

impl<R: ElfReader + ?Sized> ElfReader for &mut R {
    #[inline]
    fn read(&mut self, buf: &mut [u8], offset: u64) -> Result<()> {
        (**self).read(buf, offset)
    }

    #[inline]
    fn file_name(&self) -> &str {
        (**self).file_name()
    }
}

/// A trait for converting various input sources into an `ElfReader`.
///
/// This trait allows different types (like file paths or byte slices) to be
/// converted into a reader that implements `ElfReader`, so
/// [`ElfReaderContext::open`](crate::ElfReaderContext::open) accepts any of
/// them.
pub trait IntoElfReader<'a> {
    /// The type of reader produced by this conversion.
    type Reader: ElfReader + 'a;

    /// Converts the input into an `ElfReader`.
    ///
    /// # Returns
    /// * `Ok(reader)` - The converted reader.
    /// * `Err(error)` - If the conversion fails (e.g., file not found).
    fn into_reader(self) -> Result<Self::Reader>;
}
