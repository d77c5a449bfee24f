// Ogg page checksum
//
// CRC-32 with polynomial 0x04c11db7, no reflection, zero initial value and
// no final xor. The checksum field itself is hashed as four zero bytes.

use super::{CHECKSUM_OFFSET, HEADER_SIZE};

const POLYNOMIAL: u32 = 0x04c1_1db7;

static CRC_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut r = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            r = if r & 0x8000_0000 != 0 {
                (r << 1) ^ POLYNOMIAL
            } else {
                r << 1
            };
            bit += 1;
        }
        table[i] = r;
        i += 1;
    }
    table
}

/// Feed `bytes` into a running checksum
pub fn update(crc: u32, bytes: &[u8]) -> u32 {
    bytes.iter().fold(crc, |crc, &byte| {
        (crc << 8) ^ CRC_TABLE[(((crc >> 24) as u8) ^ byte) as usize]
    })
}

/// Checksum of a 27-byte fixed header with its checksum field zeroed
pub fn header_checksum(header: &[u8; HEADER_SIZE]) -> u32 {
    let mut zeroed = *header;
    zeroed[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].fill(0);
    update(0, &zeroed)
}

/// Checksum of a complete serialized page.
///
/// Whatever is stored in the checksum field is ignored, so the result can be
/// compared directly against the stored value.
pub fn checksum(page: &[u8]) -> u32 {
    if page.len() < HEADER_SIZE {
        return update(0, page);
    }
    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&page[..HEADER_SIZE]);
    update(header_checksum(&header), &page[HEADER_SIZE..])
}
