// Ogg page decoding
//
// OGG Page Layout (all multi-byte fields little-endian):
// - Capture Pattern: "OggS" (4 bytes)
// - Version: 0 (1 byte, passed through unchecked)
// - Header Type: 1=continuation, 2=bos, 4=eos (1 byte)
// - Granule Position (8 bytes, signed, -1 = no packet completed)
// - Bitstream Serial Number (4 bytes)
// - Page Sequence Number (4 bytes)
// - CRC Checksum (4 bytes)
// - Number of Page Segments (1 byte)
// - Segment Table (variable, one lacing value per segment)
// - Payload (sum of the segment table)

pub mod crc;
pub mod decoder;
pub mod index;
pub mod page;
pub mod reader;
pub mod source;
pub mod writer;

pub use decoder::decode;
pub use index::{IndexEntry, PageIndex, SequenceGap, StreamSummary};
pub use page::{ChecksumStatus, HeaderFlags, Page};
pub use reader::PageReader;
pub use source::{FileSource, PageSource, SliceSource, StreamSource};
pub use writer::PageBuilder;

// OGG signature
pub const OGG_SIGNATURE: &[u8; 4] = b"OggS";

/// Size of the fixed part of every page header
pub const HEADER_SIZE: usize = 27;

/// Largest segment count a header can announce
pub const MAX_SEGMENTS: usize = 255;

/// Lacing value meaning "packet continues in the next segment"
pub const MAX_LACING_VALUE: u8 = 255;

// OGG page header types
pub const OGG_HEADER_TYPE_CONTINUATION: u8 = 0x01;
pub const OGG_HEADER_TYPE_BOS: u8 = 0x02; // Beginning of Stream
pub const OGG_HEADER_TYPE_EOS: u8 = 0x04; // End of Stream

// Field offsets inside the fixed header
pub(crate) const VERSION_OFFSET: usize = 4;
pub(crate) const FLAGS_OFFSET: usize = 5;
pub(crate) const GRANULE_OFFSET: usize = 6;
pub(crate) const SERIAL_OFFSET: usize = 14;
pub(crate) const SEQUENCE_OFFSET: usize = 18;
pub(crate) const CHECKSUM_OFFSET: usize = 22;
pub(crate) const SEGMENT_COUNT_OFFSET: usize = 26;
