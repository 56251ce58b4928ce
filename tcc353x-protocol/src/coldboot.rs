//! Coldboot firmware container.
//!
//! Image format:
//! ```text
//! +--------+--------+------------+--------+--------+------------+-----
//! | Tag 1  | Len    | Code       | Tag 2  | Len    | DAGU       | ...
//! | u32 BE | u32 BE | Len bytes  | u32 BE | u32 BE | Len bytes  |
//! +--------+--------+------------+--------+--------+------------+-----
//! ```
//!
//! Segments follow in the fixed order code, DAGU, DINT, RAND, column order.
//! The column-order segment is only present when at least one more header
//! fits in the remaining buffer. The last four bytes of the code segment are
//! the big-endian CRC-32/MPEG-2 of the bytes before them, which is what the
//! chip's download engine computes.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::ProtocolError;

/// Segment header size: 4 (tag) + 4 (length).
pub const SEGMENT_HEADER_SIZE: usize = 8;

/// Size of the CRC trailer at the end of the code segment.
pub const CODE_CRC_SIZE: usize = 4;

/// Segment tags in container order.
pub const TAG_CODE: u32 = 1;
pub const TAG_DAGU: u32 = 2;
pub const TAG_DINT: u32 = 3;
pub const TAG_RAND: u32 = 4;
pub const TAG_COL_ORDER: u32 = 5;

/// Parsed view of a coldboot image. Borrows every segment from the caller's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareContainer<'a> {
    pub code: &'a [u8],
    pub dagu: Option<&'a [u8]>,
    pub dint: Option<&'a [u8]>,
    pub rand: Option<&'a [u8]>,
    pub col_order: Option<&'a [u8]>,
}

impl<'a> FirmwareContainer<'a> {
    /// Parse a coldboot image.
    ///
    /// Any tag mismatch or a length running past the buffer fails the whole
    /// parse; nothing is returned for a partially valid image.
    pub fn parse(image: &'a [u8]) -> Result<Self, ProtocolError> {
        let mut cursor = Cursor { buf: image, offset: 0 };

        let code = cursor.segment(TAG_CODE)?;
        let dagu = non_empty(cursor.segment(TAG_DAGU)?);
        let dint = non_empty(cursor.segment(TAG_DINT)?);
        let rand = non_empty(cursor.segment(TAG_RAND)?);
        let col_order = if cursor.buf.remaining() >= SEGMENT_HEADER_SIZE {
            non_empty(cursor.segment(TAG_COL_ORDER)?)
        } else {
            None
        };

        Ok(Self {
            code,
            dagu,
            dint,
            rand,
            col_order,
        })
    }

    /// Code bytes without the CRC trailer, as written to chip memory.
    pub fn code_body(&self) -> Result<&'a [u8], ProtocolError> {
        if self.code.len() < CODE_CRC_SIZE {
            return Err(ProtocolError::SegmentTooShort(self.code.len()));
        }
        Ok(&self.code[..self.code.len() - CODE_CRC_SIZE])
    }

    /// CRC trailer stored at the end of the code segment.
    pub fn code_crc(&self) -> Result<u32, ProtocolError> {
        let body = self.code_body()?;
        let mut trailer = &self.code[body.len()..];
        Ok(trailer.get_u32())
    }

    /// True when the stored trailer matches the code bytes.
    pub fn code_crc_valid(&self) -> bool {
        match (self.code_body(), self.code_crc()) {
            (Ok(body), Ok(stored)) => crc32_mpeg2(body) == stored,
            _ => false,
        }
    }
}

struct Cursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn segment(&mut self, tag: u32) -> Result<&'a [u8], ProtocolError> {
        if self.buf.remaining() < SEGMENT_HEADER_SIZE {
            return Err(ProtocolError::Truncated {
                expected: self.offset + SEGMENT_HEADER_SIZE,
                actual: self.offset + self.buf.remaining(),
            });
        }

        let found = self.buf.get_u32();
        if found != tag {
            return Err(ProtocolError::UnexpectedTag {
                offset: self.offset,
                expected: tag,
                found,
            });
        }
        let length = self.buf.get_u32() as usize;
        self.offset += SEGMENT_HEADER_SIZE;

        if self.buf.remaining() < length {
            return Err(ProtocolError::Truncated {
                expected: self.offset + length,
                actual: self.offset + self.buf.remaining(),
            });
        }
        let rest: &'a [u8] = self.buf;
        let data = &rest[..length];
        self.buf.advance(length);
        self.offset += length;
        Ok(data)
    }
}

fn non_empty(data: &[u8]) -> Option<&[u8]> {
    if data.is_empty() {
        None
    } else {
        Some(data)
    }
}

/// Builds coldboot images; the inverse of [`FirmwareContainer::parse`].
#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
    code: Vec<u8>,
    dagu: Vec<u8>,
    dint: Vec<u8>,
    rand: Vec<u8>,
    col_order: Option<Vec<u8>>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the code bytes. The CRC trailer is appended by [`Self::build`].
    pub fn code(mut self, code: &[u8]) -> Self {
        self.code = code.to_vec();
        self
    }

    pub fn dagu(mut self, data: &[u8]) -> Self {
        self.dagu = data.to_vec();
        self
    }

    pub fn dint(mut self, data: &[u8]) -> Self {
        self.dint = data.to_vec();
        self
    }

    pub fn rand(mut self, data: &[u8]) -> Self {
        self.rand = data.to_vec();
        self
    }

    pub fn col_order(mut self, data: &[u8]) -> Self {
        self.col_order = Some(data.to_vec());
        self
    }

    /// Encode the image, appending the CRC trailer to the code segment.
    pub fn build(&self) -> Bytes {
        let mut code = BytesMut::with_capacity(self.code.len() + CODE_CRC_SIZE);
        code.put_slice(&self.code);
        code.put_u32(crc32_mpeg2(&self.code));

        let mut buf = BytesMut::new();
        put_segment(&mut buf, TAG_CODE, &code);
        put_segment(&mut buf, TAG_DAGU, &self.dagu);
        put_segment(&mut buf, TAG_DINT, &self.dint);
        put_segment(&mut buf, TAG_RAND, &self.rand);
        if let Some(col_order) = &self.col_order {
            put_segment(&mut buf, TAG_COL_ORDER, col_order);
        }
        buf.freeze()
    }
}

fn put_segment(buf: &mut BytesMut, tag: u32, data: &[u8]) {
    buf.put_u32(tag);
    buf.put_u32(data.len() as u32);
    buf.put_slice(data);
}

/// CRC-32/MPEG-2 lookup table (polynomial 0x04C11DB7).
static CRC_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut j = 0;
        while j < 8 {
            if crc & 0x8000_0000 != 0 {
                crc = (crc << 1) ^ 0x04C1_1DB7;
            } else {
                crc <<= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// Incremental CRC-32/MPEG-2, fed in the same chunks the download engine sees.
#[derive(Debug, Clone, Copy)]
pub struct Crc32Mpeg2 {
    state: u32,
}

impl Default for Crc32Mpeg2 {
    fn default() -> Self {
        Self { state: 0xFFFF_FFFF }
    }
}

impl Crc32Mpeg2 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            let index = ((self.state >> 24) ^ byte as u32) as usize;
            self.state = (self.state << 8) ^ CRC_TABLE[index];
        }
    }

    pub fn value(&self) -> u32 {
        self.state
    }
}

/// One-shot CRC-32/MPEG-2.
pub fn crc32_mpeg2(data: &[u8]) -> u32 {
    let mut crc = Crc32Mpeg2::new();
    crc.update(data);
    crc.value()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> Bytes {
        ContainerBuilder::new()
            .code(&[0x11; 64])
            .dagu(&[0x22; 12])
            .dint(&[0x33; 8])
            .rand(&[0x44; 4])
            .col_order(&[0x55; 16])
            .build()
    }

    #[test]
    fn test_parse_five_segments() {
        let image = sample_image();
        let container = FirmwareContainer::parse(&image).unwrap();

        assert_eq!(container.code.len(), 68);
        assert_eq!(container.code_body().unwrap(), &[0x11; 64][..]);
        assert_eq!(container.dagu, Some(&[0x22; 12][..]));
        assert_eq!(container.dint, Some(&[0x33; 8][..]));
        assert_eq!(container.rand, Some(&[0x44; 4][..]));
        assert_eq!(container.col_order, Some(&[0x55; 16][..]));

        // Segments point into the caller's buffer.
        assert_eq!(container.code.as_ptr(), image[8..].as_ptr());
        assert!(container.code_crc_valid());
    }

    #[test]
    fn test_empty_optional_segments_are_absent() {
        let image = ContainerBuilder::new().code(&[1, 2, 3, 4]).build();
        let container = FirmwareContainer::parse(&image).unwrap();
        assert_eq!(container.dagu, None);
        assert_eq!(container.dint, None);
        assert_eq!(container.rand, None);
        assert_eq!(container.col_order, None);
    }

    #[test]
    fn test_zero_length_col_order_is_absent() {
        let image = ContainerBuilder::new().code(&[9; 8]).col_order(&[]).build();
        let container = FirmwareContainer::parse(&image).unwrap();
        assert_eq!(container.col_order, None);
    }

    #[test]
    fn test_corrupted_tag_fails() {
        let image = sample_image();
        let tag_offsets = [0usize, 76, 96, 112, 124];
        for offset in tag_offsets {
            for byte in 0..4 {
                let mut corrupted = image.to_vec();
                corrupted[offset + byte] ^= 0x80;
                let result = FirmwareContainer::parse(&corrupted);
                assert!(
                    matches!(result, Err(ProtocolError::UnexpectedTag { .. })),
                    "offset {} byte {}: {:?}",
                    offset,
                    byte,
                    result
                );
            }
        }
    }

    #[test]
    fn test_length_past_end_fails() {
        let mut image = sample_image().to_vec();
        // Grow the RAND length beyond the buffer.
        image[116..120].copy_from_slice(&0x1000u32.to_be_bytes());
        assert!(matches!(
            FirmwareContainer::parse(&image),
            Err(ProtocolError::Truncated { .. })
        ));
    }

    #[test]
    fn test_missing_header_fails() {
        let image = sample_image();
        assert!(matches!(
            FirmwareContainer::parse(&image[..20]),
            Err(ProtocolError::Truncated { .. })
        ));
        assert!(FirmwareContainer::parse(&[]).is_err());
    }

    #[test]
    fn test_short_code_segment() {
        let mut buf = BytesMut::new();
        put_segment(&mut buf, TAG_CODE, &[1, 2]);
        for tag in [TAG_DAGU, TAG_DINT, TAG_RAND] {
            put_segment(&mut buf, tag, &[]);
        }
        let container = FirmwareContainer::parse(&buf).unwrap();
        assert_eq!(container.code_body(), Err(ProtocolError::SegmentTooShort(2)));
        assert!(!container.code_crc_valid());
    }

    #[test]
    fn test_crc32_mpeg2_check_value() {
        assert_eq!(crc32_mpeg2(b"123456789"), 0x0376_E6E7);

        let mut crc = Crc32Mpeg2::new();
        crc.update(b"1234");
        crc.update(b"56789");
        assert_eq!(crc.value(), 0x0376_E6E7);
    }
}
