use std::io;
use std::string;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MachError {
    #[error("unsupported format, multi-architecture containers unsupported (magic 0x{0:08x}).")]
    UnsupportedFormat(u32),
    #[error("invalid magic, {0:02x?}.")]
    InvalidMagic([u8; 4]),
    #[error("truncated header, {0} bytes required at offset {1}.")]
    TruncatedHeader(usize, u64),
    #[error("truncated load command, {0} bytes required at offset {1}.")]
    TruncatedLoadCommand(usize, u64),
    #[error("truncated segment header, {0} bytes required but only {1} bytes left in the command.")]
    TruncatedSegmentHeader(usize, usize),
    #[error("truncated section header, {0} bytes required but only {1} bytes left in the command.")]
    TruncatedSectionHeader(usize, usize),
    #[error("invalid load command size, {0} bytes is smaller than the command header.")]
    InvalidLoadCommandSize(u32),
    #[error("out of range region `{name}`, offset 0x{offset:x} with size 0x{size:x} exceeds {len} bytes.")]
    OutOfRange {
        name: String,
        offset: u64,
        size: u64,
        len: u64,
    },
    #[error("no segment or section names were requested.")]
    EmptySelection,
    /// A selected section lies below the rebase origin.
    ///
    /// Raised while planning, before the output is touched, so unlike a read
    /// or write failure it leaves nothing from the run in the output.
    #[error("invalid placement of section `{sectname}` at 0x{addr:x}, below the rebase origin 0x{origin:x}.")]
    InvalidPlacement { sectname: String, addr: u64, origin: u64 },
    #[error("fail to convert a String from a UTF-8 byte vector, {0}.")]
    Utf8Error(#[from] string::FromUtf8Error),
    #[error("fail to do I/O operations, {0}.")]
    IoError(#[from] io::Error),
}

impl MachError {
    /// A short name of the failure kind, used for one line reports.
    pub fn kind(&self) -> &'static str {
        match self {
            MachError::UnsupportedFormat(_) => "unsupported-format",
            MachError::InvalidMagic(_) => "invalid-magic",
            MachError::TruncatedHeader(..) => "truncated-header",
            MachError::TruncatedLoadCommand(..) => "truncated-load-command",
            MachError::TruncatedSegmentHeader(..) => "truncated-segment-header",
            MachError::TruncatedSectionHeader(..) => "truncated-section-header",
            MachError::InvalidLoadCommandSize(_) => "invalid-load-command-size",
            MachError::OutOfRange { .. } => "out-of-range-region",
            MachError::EmptySelection => "selection-error",
            MachError::InvalidPlacement { .. } => "invalid-placement",
            MachError::Utf8Error(_) => "invalid-name",
            MachError::IoError(_) => "io-error",
        }
    }
}

pub type Result<T> = ::std::result::Result<T, MachError>;
