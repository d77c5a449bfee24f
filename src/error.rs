// Error types for page decoding and encoding

use std::fmt;
use thiserror::Error;

/// Part of a page that was being read when the source ran dry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSection {
    Header,
    SegmentTable,
    Payload,
}

impl fmt::Display for PageSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSection::Header => write!(f, "page header"),
            PageSection::SegmentTable => write!(f, "segment table"),
            PageSection::Payload => write!(f, "page payload"),
        }
    }
}

/// Every way a single page decode can end without producing a page.
///
/// `StreamExhausted` is the normal end of a scan. `Truncated` and
/// `MalformedCapture` leave the source at an unknown position and the
/// caller should stop decoding from it. `Io` is the transport's own error,
/// passed through untouched.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("end of Ogg stream")]
    StreamExhausted,

    #[error("truncated {section}: expected {expected} bytes, got {available}")]
    Truncated {
        section: PageSection,
        expected: usize,
        available: usize,
    },

    #[error("Ogg page header is 0x{} ({}), should be 0x4f676753 (OggS)", hex(.found), printable(.found))]
    MalformedCapture { found: [u8; 4] },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// True for the clean end-of-stream signal
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, DecodeError::StreamExhausted)
    }

    /// True when the source position can no longer be trusted
    pub fn is_fatal_for_source(&self) -> bool {
        matches!(
            self,
            DecodeError::Truncated { .. } | DecodeError::MalformedCapture { .. }
        )
    }
}

/// Errors that stop a multi-page scan.
///
/// Wraps the decode outcomes and adds the checks a scan makes on top of
/// them. A clean end of stream never shows up here.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Only raised by a reader configured to reject bad checksums
    #[error("checksum mismatch on page {sequence}: stored 0x{stored:08x}, computed 0x{computed:08x}")]
    ChecksumMismatch {
        sequence: u32,
        stored: u32,
        computed: u32,
    },
}

impl From<std::io::Error> for ScanError {
    fn from(e: std::io::Error) -> Self {
        ScanError::Decode(DecodeError::Io(e))
    }
}

impl ScanError {
    /// The underlying decode failure, if that is what stopped the scan
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            ScanError::Decode(e) => Some(e),
            ScanError::ChecksumMismatch { .. } => None,
        }
    }
}

/// Errors raised while assembling a page for writing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("page would need {0} segments, at most 255 fit")]
    TooManySegments(usize),

    #[error("segment table describes {table_total} bytes but payload has {payload_len}")]
    SegmentTableMismatch { table_total: usize, payload_len: usize },
}

fn hex(bytes: &[u8; 4]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn printable(bytes: &[u8; 4]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect()
}
