// Page encoder
//
// Assembles a well-formed page, lacing packets into 255-byte segments and
// filling in the checksum.

use crate::error::EncodeError;
use crate::ogg::crc;
use crate::ogg::page::HeaderFlags;
use crate::ogg::{
    CHECKSUM_OFFSET, HEADER_SIZE, MAX_LACING_VALUE, MAX_SEGMENTS, OGG_SIGNATURE,
};

/// Builder for a single serialized page
#[derive(Debug, Clone)]
pub struct PageBuilder {
    version: u8,
    flags: HeaderFlags,
    granule_position: i64,
    stream_serial: u32,
    sequence_number: u32,
    segment_table: Vec<u8>,
    payload: Vec<u8>,
}

/// Lacing values for a packet of `size` bytes that ends on this page.
///
/// A packet whose size is a multiple of 255 gets a trailing zero-length
/// segment so the reader can tell it has ended.
pub fn lacing_values(size: usize) -> Vec<u8> {
    let mut table = vec![MAX_LACING_VALUE; size / 255];
    table.push((size % 255) as u8);
    table
}

impl PageBuilder {
    pub fn new(stream_serial: u32, sequence_number: u32) -> Self {
        PageBuilder {
            version: 0,
            flags: HeaderFlags::default(),
            granule_position: 0,
            stream_serial,
            sequence_number,
            segment_table: Vec::new(),
            payload: Vec::new(),
        }
    }

    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    pub fn flags(mut self, flags: HeaderFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn granule_position(mut self, granule_position: i64) -> Self {
        self.granule_position = granule_position;
        self
    }

    /// Append a whole packet that finishes on this page
    pub fn packet(self, data: &[u8]) -> Result<Self, EncodeError> {
        let table = lacing_values(data.len());
        self.append(&table, data)
    }

    /// Append the leading part of a packet that carries on into the next page.
    ///
    /// The part has to fill whole 255-byte segments.
    pub fn packet_part(self, data: &[u8]) -> Result<Self, EncodeError> {
        if data.len() % 255 != 0 {
            return Err(EncodeError::SegmentTableMismatch {
                table_total: data.len() - data.len() % 255,
                payload_len: data.len(),
            });
        }
        let table = vec![MAX_LACING_VALUE; data.len() / 255];
        self.append(&table, data)
    }

    /// Append an explicit segment table and the payload it describes
    pub fn raw_segments(self, table: &[u8], payload: &[u8]) -> Result<Self, EncodeError> {
        let table_total: usize = table.iter().map(|&x| x as usize).sum();
        if table_total != payload.len() {
            return Err(EncodeError::SegmentTableMismatch {
                table_total,
                payload_len: payload.len(),
            });
        }
        self.append(table, payload)
    }

    fn append(mut self, table: &[u8], data: &[u8]) -> Result<Self, EncodeError> {
        let segments = self.segment_table.len() + table.len();
        if segments > MAX_SEGMENTS {
            return Err(EncodeError::TooManySegments(segments));
        }
        self.segment_table.extend_from_slice(table);
        self.payload.extend_from_slice(data);
        Ok(self)
    }

    /// Serialize the page with a freshly computed checksum
    pub fn build(&self) -> Result<Vec<u8>, EncodeError> {
        if self.segment_table.len() > MAX_SEGMENTS {
            return Err(EncodeError::TooManySegments(self.segment_table.len()));
        }

        let mut page = Vec::with_capacity(HEADER_SIZE + self.segment_table.len() + self.payload.len());
        page.extend_from_slice(OGG_SIGNATURE);
        page.push(self.version);
        page.push(self.flags.bits());
        page.extend_from_slice(&self.granule_position.to_le_bytes());
        page.extend_from_slice(&self.stream_serial.to_le_bytes());
        page.extend_from_slice(&self.sequence_number.to_le_bytes());
        page.extend_from_slice(&[0u8; 4]);
        page.push(self.segment_table.len() as u8);
        page.extend_from_slice(&self.segment_table);
        page.extend_from_slice(&self.payload);

        let checksum = crc::checksum(&page);
        page[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].copy_from_slice(&checksum.to_le_bytes());
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lacing_values() {
        assert_eq!(lacing_values(0), vec![0]);
        assert_eq!(lacing_values(100), vec![100]);
        assert_eq!(lacing_values(255), vec![255, 0]);
        assert_eq!(lacing_values(600), vec![255, 255, 90]);
    }

    #[test]
    fn test_header_layout() {
        let page = PageBuilder::new(0x0403_0201, 0x0807_0605)
            .flags(HeaderFlags::default().with_eos(true))
            .granule_position(0x1122_3344_5566_7788)
            .packet(b"abc")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(&page[0..4], b"OggS");
        assert_eq!(page[4], 0);
        assert_eq!(page[5], 0x04);
        assert_eq!(&page[6..14], &[0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]);
        assert_eq!(&page[14..18], &[1, 2, 3, 4]);
        assert_eq!(&page[18..22], &[5, 6, 7, 8]);
        assert_eq!(page[26], 1);
        assert_eq!(page[27], 3);
        assert_eq!(&page[28..], b"abc");

        let stored = u32::from_le_bytes([page[22], page[23], page[24], page[25]]);
        assert_eq!(stored, crc::checksum(&page));
    }

    #[test]
    fn test_segment_limits() {
        // 253 full segments plus the terminating zero
        let builder = PageBuilder::new(1, 0).packet(&vec![0u8; 253 * 255]).unwrap();
        assert!(builder.clone().packet(b"").is_ok());
        assert_eq!(
            builder.packet(b"ab").and_then(|b| b.packet(b"cd")).unwrap_err(),
            EncodeError::TooManySegments(256)
        );
    }

    #[test]
    fn test_mismatched_segments() {
        assert_eq!(
            PageBuilder::new(1, 0).raw_segments(&[10, 20], &[0u8; 25]).unwrap_err(),
            EncodeError::SegmentTableMismatch { table_total: 30, payload_len: 25 }
        );
        assert!(PageBuilder::new(1, 0).packet_part(&[0u8; 300]).is_err());
        assert!(PageBuilder::new(1, 0).packet_part(&[0u8; 510]).is_ok());
    }
}
