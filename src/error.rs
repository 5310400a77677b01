use alloc::borrow::Cow;
use core::fmt::{Debug, Display};

/// Error types used throughout the `elf_codec` library.
///
/// Every reader accessor and writer operation reports failures through
/// this type. The variants mirror the distinct failure kinds a caller may
/// want to branch on; some carry a message describing the offending value.
#[derive(Debug)]
pub enum Error {
    /// The reader context has not been initialized, or the writer has no
    /// header yet.
    Uninitialized,

    /// The identification bytes do not start with `0x7F 'E' 'L' 'F'`.
    BadMagic,

    /// The identification or header version is not `EV_CURRENT`.
    BadVersion,

    /// The file class is neither 32-bit nor 64-bit.
    BadClass,

    /// The data encoding is neither little-endian nor big-endian.
    BadEndianness,

    /// An argument was rejected before any work was done.
    ///
    /// This error typically indicates:
    /// * Alignment that is zero or not a power of two
    /// * A string table lookup on a section that is not `SHT_STRTAB`
    /// * An empty output buffer
    BadArg {
        /// A descriptive message about the rejected argument.
        msg: Cow<'static, str>,
    },

    /// A table index is past the end of its table.
    BadIndex,

    /// A size recorded in the file disagrees with the size its class
    /// requires (header size, table entry sizes).
    BadSize {
        /// A descriptive message about the size mismatch.
        msg: Cow<'static, str>,
    },

    /// The file header is internally inconsistent (a table with entries
    /// but no offset, an unresolvable escape).
    BadHeader {
        /// A descriptive message about the header inconsistency.
        msg: Cow<'static, str>,
    },

    /// A structure violates a format rule that is independent of sizes
    /// (compressed allocated sections, misplaced groups).
    BadFormat {
        /// A descriptive message about the format violation.
        msg: Cow<'static, str>,
    },

    /// A name or address lookup found no match.
    NotFound,

    /// A string did not fit in the caller's buffer.
    BufferOverflow,

    /// The underlying source ended before the requested bytes.
    IoEof,

    /// The underlying source failed to deliver the requested bytes.
    Io {
        /// A descriptive message about the I/O error.
        msg: Cow<'static, str>,
    },

    /// An allocation on the writer side failed.
    NoMemory,
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Uninitialized => write!(f, "context is not initialized"),
            Error::BadMagic => write!(f, "invalid ELF magic"),
            Error::BadVersion => write!(f, "invalid ELF version"),
            Error::BadClass => write!(f, "invalid ELF class"),
            Error::BadEndianness => write!(f, "invalid ELF data encoding"),
            Error::BadArg { msg } => write!(f, "Bad argument: {msg}"),
            Error::BadIndex => write!(f, "index out of range"),
            Error::BadSize { msg } => write!(f, "Size mismatch: {msg}"),
            Error::BadHeader { msg } => write!(f, "ELF header error: {msg}"),
            Error::BadFormat { msg } => write!(f, "ELF format error: {msg}"),
            Error::NotFound => write!(f, "not found"),
            Error::BufferOverflow => write!(f, "string does not fit in the buffer"),
            Error::IoEof => write!(f, "I/O error: unexpected end of file"),
            Error::Io { msg } => write!(f, "I/O error: {msg}"),
            Error::NoMemory => write!(f, "out of memory"),
        }
    }
}

impl core::error::Error for Error {}

/// Creates an I/O error with the specified message.
#[cold]
#[inline(never)]
pub fn io_error(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::Io { msg: msg.into() }
}

/// Creates a bad argument error with the specified message.
#[cold]
#[inline(never)]
pub(crate) fn bad_arg(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::BadArg { msg: msg.into() }
}

/// Creates a size mismatch error with the specified message.
#[cold]
#[inline(never)]
pub(crate) fn bad_size(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::BadSize { msg: msg.into() }
}

/// Creates a header consistency error with the specified message.
#[cold]
#[inline(never)]
pub(crate) fn bad_header(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::BadHeader { msg: msg.into() }
}

/// Creates a format violation error with the specified message.
#[cold]
#[inline(never)]
pub(crate) fn bad_format(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::BadFormat { msg: msg.into() }
}
