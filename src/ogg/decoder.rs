// Single-page decoder
//
// Reads exactly one page from a positioned source. Nothing is buffered
// beyond the page itself and nothing is un-read on failure.

use log::trace;

use crate::error::{DecodeError, PageSection};
use crate::ogg::page::{HeaderFlags, Page, PageParts};
use crate::ogg::source::PageSource;
use crate::ogg::{
    CHECKSUM_OFFSET, FLAGS_OFFSET, GRANULE_OFFSET, HEADER_SIZE, MAX_SEGMENTS, OGG_SIGNATURE,
    SEGMENT_COUNT_OFFSET, SEQUENCE_OFFSET, SERIAL_OFFSET, VERSION_OFFSET,
};
use crate::utils::io::{le_i64_at, le_u32_at};

/// Decode the page starting at the source's cursor.
///
/// With `skip_payload` set, only the header and segment table are consumed
/// and the returned page carries no payload. Moving the source past the
/// unread payload is then up to the caller (see [`PageSource::skip`]).
///
/// A source that is already at its end yields
/// [`DecodeError::StreamExhausted`], which is how a page scan normally stops.
/// The other outcomes are `Truncated`, `MalformedCapture` and `Io`.
pub fn decode<S: PageSource + ?Sized>(
    source: &mut S,
    skip_payload: bool,
) -> Result<Page, DecodeError> {
    if source.remaining_hint()? == Some(false) {
        return Err(DecodeError::StreamExhausted);
    }

    let mut header = [0u8; HEADER_SIZE];
    let read = source.read_full(&mut header)?;
    if read == 0 {
        return Err(DecodeError::StreamExhausted);
    }
    if read < HEADER_SIZE {
        return Err(DecodeError::Truncated {
            section: PageSection::Header,
            expected: HEADER_SIZE,
            available: read,
        });
    }

    if &header[0..4] != OGG_SIGNATURE {
        let mut found = [0u8; 4];
        found.copy_from_slice(&header[0..4]);
        return Err(DecodeError::MalformedCapture { found });
    }

    let version = header[VERSION_OFFSET];
    let flags = HeaderFlags::from_bits(header[FLAGS_OFFSET]);
    let granule_position = le_i64_at(&header, GRANULE_OFFSET);
    let stream_serial = le_u32_at(&header, SERIAL_OFFSET);
    let sequence_number = le_u32_at(&header, SEQUENCE_OFFSET);
    let checksum = le_u32_at(&header, CHECKSUM_OFFSET);
    let segment_count = header[SEGMENT_COUNT_OFFSET] as usize;

    // Read segment table
    let mut lacing = [0u8; MAX_SEGMENTS];
    let segment_table = &mut lacing[..segment_count];
    let read = source.read_full(segment_table)?;
    if read < segment_count {
        return Err(DecodeError::Truncated {
            section: PageSection::SegmentTable,
            expected: segment_count,
            available: read,
        });
    }

    let mut segment_lengths = Vec::with_capacity(segment_count);
    let mut segment_offsets = Vec::with_capacity(segment_count);
    let mut total_length = 0u32;
    for &value in segment_table.iter() {
        segment_lengths.push(value as u32);
        segment_offsets.push(total_length);
        total_length += value as u32;
    }

    let payload = if skip_payload {
        None
    } else {
        let mut data = vec![0u8; total_length as usize];
        let read = source.read_full(&mut data)?;
        if read < data.len() {
            return Err(DecodeError::Truncated {
                section: PageSection::Payload,
                expected: data.len(),
                available: read,
            });
        }
        Some(data)
    };

    trace!(
        "decoded page serial={:08x} seq={} granule={} segments={} length={}",
        stream_serial,
        sequence_number,
        granule_position,
        segment_count,
        total_length
    );

    Ok(Page::from_parts(PageParts {
        version,
        flags,
        granule_position,
        stream_serial,
        sequence_number,
        checksum,
        segment_table: segment_table.to_vec(),
        segment_lengths,
        segment_offsets,
        total_length,
        header,
        payload,
    }))
}
