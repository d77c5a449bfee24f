use serde::Serialize;

use crate::ogg::crc;
use crate::ogg::{
    HEADER_SIZE, MAX_LACING_VALUE, OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_CONTINUATION,
    OGG_HEADER_TYPE_EOS,
};

/// Header type byte of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct HeaderFlags(u8);

impl HeaderFlags {
    /// Wrap a raw header type byte; unknown bits are kept as-is
    pub const fn from_bits(bits: u8) -> Self {
        HeaderFlags(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn is_continued(self) -> bool {
        self.0 & OGG_HEADER_TYPE_CONTINUATION != 0
    }

    pub fn is_bos(self) -> bool {
        self.0 & OGG_HEADER_TYPE_BOS != 0
    }

    pub fn is_eos(self) -> bool {
        self.0 & OGG_HEADER_TYPE_EOS != 0
    }

    pub fn with_continued(self, on: bool) -> Self {
        self.with(OGG_HEADER_TYPE_CONTINUATION, on)
    }

    pub fn with_bos(self, on: bool) -> Self {
        self.with(OGG_HEADER_TYPE_BOS, on)
    }

    pub fn with_eos(self, on: bool) -> Self {
        self.with(OGG_HEADER_TYPE_EOS, on)
    }

    fn with(self, bit: u8, on: bool) -> Self {
        if on {
            HeaderFlags(self.0 | bit)
        } else {
            HeaderFlags(self.0 & !bit)
        }
    }
}

/// Result of checking a page's stored CRC against its contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumStatus {
    Valid,
    Mismatch { stored: u32, computed: u32 },
    /// The payload was skipped during decode, so there is nothing to hash
    Unavailable,
}

/// One decoded Ogg page.
///
/// Pages only come out of [`crate::ogg::decode`]; there is no way to change
/// one after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    version: u8,
    flags: HeaderFlags,
    granule_position: i64,
    stream_serial: u32,
    sequence_number: u32,
    checksum: u32,
    segment_table: Vec<u8>,
    #[serde(skip)]
    segment_lengths: Vec<u32>,
    #[serde(skip)]
    segment_offsets: Vec<u32>,
    total_length: u32,
    #[serde(skip)]
    header: [u8; HEADER_SIZE],
    #[serde(skip)]
    payload: Option<Vec<u8>>,
}

/// Everything the decoder gathered for one page
pub(crate) struct PageParts {
    pub version: u8,
    pub flags: HeaderFlags,
    pub granule_position: i64,
    pub stream_serial: u32,
    pub sequence_number: u32,
    pub checksum: u32,
    pub segment_table: Vec<u8>,
    pub segment_lengths: Vec<u32>,
    pub segment_offsets: Vec<u32>,
    pub total_length: u32,
    pub header: [u8; HEADER_SIZE],
    pub payload: Option<Vec<u8>>,
}

impl Page {
    pub(crate) fn from_parts(parts: PageParts) -> Self {
        Page {
            version: parts.version,
            flags: parts.flags,
            granule_position: parts.granule_position,
            stream_serial: parts.stream_serial,
            sequence_number: parts.sequence_number,
            checksum: parts.checksum,
            segment_table: parts.segment_table,
            segment_lengths: parts.segment_lengths,
            segment_offsets: parts.segment_offsets,
            total_length: parts.total_length,
            header: parts.header,
            payload: parts.payload,
        }
    }

    /// Stream structure version, 0 for every page seen so far
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn flags(&self) -> HeaderFlags {
        self.flags
    }

    /// True if the first segment carries on a packet from an earlier page
    pub fn is_continued(&self) -> bool {
        self.flags.is_continued()
    }

    /// True if the first segment starts a new packet
    pub fn is_fresh(&self) -> bool {
        !self.flags.is_continued()
    }

    pub fn is_bos(&self) -> bool {
        self.flags.is_bos()
    }

    pub fn is_eos(&self) -> bool {
        self.flags.is_eos()
    }

    /// Codec-defined position of the last packet completed on this page,
    /// or -1 if no packet finishes here
    pub fn granule_position(&self) -> i64 {
        self.granule_position
    }

    /// The granule position, with the "no packet completed" marker mapped to `None`
    pub fn completed_granule(&self) -> Option<i64> {
        if self.granule_position == -1 {
            None
        } else {
            Some(self.granule_position)
        }
    }

    pub fn stream_serial(&self) -> u32 {
        self.stream_serial
    }

    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// Checksum as stored in the header; see [`Page::verify_checksum`]
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn segment_count(&self) -> usize {
        self.segment_table.len()
    }

    /// Raw lacing values
    pub fn segment_table(&self) -> &[u8] {
        &self.segment_table
    }

    pub fn segment_lengths(&self) -> &[u32] {
        &self.segment_lengths
    }

    /// Start of each segment within the payload
    pub fn segment_offsets(&self) -> &[u32] {
        &self.segment_offsets
    }

    /// Payload size announced by the segment table
    pub fn total_length(&self) -> u32 {
        self.total_length
    }

    /// Bytes this page occupies in the stream: header, segment table and payload.
    ///
    /// The same value comes back whether or not the payload was kept.
    pub fn wire_length(&self) -> u64 {
        (HEADER_SIZE + self.segment_table.len()) as u64 + self.total_length as u64
    }

    /// The 27 fixed header bytes as read
    pub fn header(&self) -> &[u8; HEADER_SIZE] {
        &self.header
    }

    /// Page data, `None` when the page was decoded with the payload skipped
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Take the payload out of the page without copying it
    pub fn into_payload(self) -> Option<Vec<u8>> {
        self.payload
    }

    /// Bytes of segment `index`, if the payload was kept
    pub fn payload_segment(&self, index: usize) -> Option<&[u8]> {
        let payload = self.payload.as_deref()?;
        let start = *self.segment_offsets.get(index)? as usize;
        let len = self.segment_lengths[index] as usize;
        payload.get(start..start + len)
    }

    /// Number of packets that end on this page
    pub fn packet_count(&self) -> usize {
        self.segment_table
            .iter()
            .filter(|&&lacing| lacing < MAX_LACING_VALUE)
            .count()
    }

    /// False when the final packet spills over into the next page
    pub fn ends_packet(&self) -> bool {
        match self.segment_table.last() {
            Some(&lacing) => lacing < MAX_LACING_VALUE,
            None => false,
        }
    }

    /// Serialize the page back into its wire form.
    ///
    /// Returns `None` if the payload was not kept.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        let payload = self.payload.as_deref()?;
        let mut bytes = Vec::with_capacity(self.wire_length() as usize);
        bytes.extend_from_slice(&self.header);
        bytes.extend_from_slice(&self.segment_table);
        bytes.extend_from_slice(payload);
        Some(bytes)
    }

    /// CRC over the page as it would appear on the wire, checksum field zeroed
    pub fn compute_checksum(&self) -> Option<u32> {
        let payload = self.payload.as_deref()?;
        let crc = crc::header_checksum(&self.header);
        let crc = crc::update(crc, &self.segment_table);
        Some(crc::update(crc, payload))
    }

    /// Compare the stored checksum against the page contents
    pub fn verify_checksum(&self) -> ChecksumStatus {
        match self.compute_checksum() {
            None => ChecksumStatus::Unavailable,
            Some(computed) if computed == self.checksum => ChecksumStatus::Valid,
            Some(computed) => ChecksumStatus::Mismatch {
                stored: self.checksum,
                computed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ogg::{decode, PageBuilder, SliceSource};

    fn decode_bytes(bytes: &[u8], skip_payload: bool) -> Page {
        decode(&mut SliceSource::new(bytes), skip_payload).unwrap()
    }

    #[test]
    fn test_header_flags() {
        let flags = HeaderFlags::from_bits(0x02);
        assert!(flags.is_bos());
        assert!(!flags.is_continued());
        assert!(!flags.is_eos());

        let flags = flags.with_eos(true).with_continued(true).with_bos(false);
        assert_eq!(flags.bits(), 0x05);

        // Reserved bits survive
        let flags = HeaderFlags::from_bits(0xf8).with_bos(true);
        assert_eq!(flags.bits(), 0xfa);
    }

    #[test]
    fn test_packet_queries() {
        let bytes = PageBuilder::new(7, 3)
            .packet(&[1u8; 10])
            .unwrap()
            .packet(&[2u8; 300])
            .unwrap()
            .build()
            .unwrap();
        let page = decode_bytes(&bytes, false);

        assert_eq!(page.segment_table(), &[10, 255, 45]);
        assert_eq!(page.packet_count(), 2);
        assert!(page.ends_packet());
        assert_eq!(page.payload_segment(0), Some(&[1u8; 10][..]));
        assert_eq!(page.payload_segment(2).map(|s| s.len()), Some(45));
        assert_eq!(page.payload_segment(3), None);
        assert!(page.is_fresh());
    }

    #[test]
    fn test_spilling_packet() {
        let bytes = PageBuilder::new(1, 9)
            .flags(HeaderFlags::default().with_continued(true))
            .granule_position(-1)
            .packet_part(&[0u8; 510])
            .unwrap()
            .build()
            .unwrap();
        let page = decode_bytes(&bytes, false);

        assert!(page.is_continued());
        assert!(!page.is_fresh());
        assert!(!page.ends_packet());
        assert_eq!(page.packet_count(), 0);
        assert_eq!(page.completed_granule(), None);
    }

    #[test]
    fn test_wire_length_matches_in_both_modes() {
        let bytes = PageBuilder::new(1, 0).packet(&[9u8; 600]).unwrap().build().unwrap();
        let full = decode_bytes(&bytes, false);
        let skipped = decode_bytes(&bytes, true);

        assert_eq!(full.wire_length(), bytes.len() as u64);
        assert_eq!(skipped.wire_length(), bytes.len() as u64);
        assert_eq!(skipped.total_length(), full.total_length());
        assert_eq!(skipped.payload(), None);
        assert_eq!(skipped.to_bytes(), None);
    }

    #[test]
    fn test_reserialize_and_verify() {
        let bytes = PageBuilder::new(0xdead_beef, 12)
            .granule_position(44_100)
            .packet(b"some codec packet")
            .unwrap()
            .build()
            .unwrap();
        let page = decode_bytes(&bytes, false);
        assert_eq!(page.to_bytes().as_deref(), Some(&bytes[..]));
        assert_eq!(page.verify_checksum(), ChecksumStatus::Valid);
        assert_eq!(page.completed_granule(), Some(44_100));

        let mut corrupted = bytes.clone();
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0x40;
        let page = decode_bytes(&corrupted, false);
        match page.verify_checksum() {
            ChecksumStatus::Mismatch { stored, computed } => {
                assert_eq!(stored, page.checksum());
                assert_ne!(stored, computed);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }

        assert_eq!(decode_bytes(&bytes, true).verify_checksum(), ChecksumStatus::Unavailable);
    }
}
