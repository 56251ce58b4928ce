//! Mailbox frame codec.
//!
//! Host mail and slave replies travel through the chip's mail FIFO as
//! big-endian words:
//! ```text
//! host:  | 0x47 | cnt:4 rsp:1 -:3 | command (16) | payload words ...
//! slave: | 0x74 | cnt:4 status:4  | command (16) | data words ...
//! ```
//! `cnt` counts the words after the header; `rsp` asks the firmware to reply.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::ProtocolError;

/// Marker byte of host-to-firmware mail.
pub const HOST_MAIL: u8 = 0x47;

/// Marker byte of firmware-to-host mail.
pub const SLAVE_MAIL: u8 = 0x74;

/// Maximum payload/data words per mail.
pub const MAX_MAIL_WORDS: usize = 7;

/// Header size in bytes.
pub const MAIL_HEADER_SIZE: usize = 4;

/// Firmware command identifiers.
pub mod command {
    /// Start demodulation after a tune.
    pub const SYS_START: u16 = 0x0001;
    /// Read the DSP code version word.
    pub const SYS_ASM_VER: u16 = 0x0002;
    /// Read the raw TMCC block.
    pub const TMCC_RESULT: u16 = 0x0101;
}

/// Payload of the start mail.
pub const SYS_START_ARGUMENT: u32 = 0x11;

/// Header of a host mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostMailHeader {
    pub command: u16,
    pub word_count: usize,
    pub expects_reply: bool,
}

impl HostMailHeader {
    pub fn to_word(&self) -> u32 {
        ((HOST_MAIL as u32) << 24)
            | (((self.word_count as u32) & 0x0F) << 20)
            | ((self.expects_reply as u32) << 19)
            | self.command as u32
    }

    pub fn from_word(word: u32) -> Result<Self, ProtocolError> {
        if (word >> 24) as u8 != HOST_MAIL {
            return Err(ProtocolError::InvalidMailHeader(word));
        }
        Ok(Self {
            command: (word & 0xFFFF) as u16,
            word_count: ((word >> 20) & 0x0F) as usize,
            expects_reply: (word >> 19) & 0x01 != 0,
        })
    }
}

/// Encode a host mail into FIFO bytes.
pub fn encode_host_mail(
    command: u16,
    payload: &[u32],
    expects_reply: bool,
) -> Result<Bytes, ProtocolError> {
    if payload.len() > MAX_MAIL_WORDS {
        return Err(ProtocolError::MailTooLong(payload.len(), MAX_MAIL_WORDS));
    }
    let header = HostMailHeader {
        command,
        word_count: payload.len(),
        expects_reply,
    };

    let mut buf = BytesMut::with_capacity(MAIL_HEADER_SIZE + payload.len() * 4);
    buf.put_u32(header.to_word());
    for word in payload {
        buf.put_u32(*word);
    }
    Ok(buf.freeze())
}

/// Decode a host mail; used by the simulated firmware.
pub fn decode_host_mail(mut buf: &[u8]) -> Result<(HostMailHeader, Vec<u32>), ProtocolError> {
    if buf.remaining() < MAIL_HEADER_SIZE {
        return Err(ProtocolError::Truncated {
            expected: MAIL_HEADER_SIZE,
            actual: buf.remaining(),
        });
    }
    let header = HostMailHeader::from_word(buf.get_u32())?;
    let words = read_words(&mut buf, header.word_count)?;
    Ok((header, words))
}

/// Reply from the firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub command: u16,
    pub status: u8,
    pub data: Vec<u32>,
}

impl Mailbox {
    /// Data word `index`, zero when the reply was shorter.
    pub fn word(&self, index: usize) -> u32 {
        self.data.get(index).copied().unwrap_or(0)
    }

    /// Encode as slave mail; used by the simulated firmware.
    pub fn encode(&self) -> Result<Bytes, ProtocolError> {
        if self.data.len() > MAX_MAIL_WORDS {
            return Err(ProtocolError::MailTooLong(self.data.len(), MAX_MAIL_WORDS));
        }
        let mut buf = BytesMut::with_capacity(MAIL_HEADER_SIZE + self.data.len() * 4);
        buf.put_u32(
            ((SLAVE_MAIL as u32) << 24)
                | (((self.data.len() as u32) & 0x0F) << 20)
                | (((self.status as u32) & 0x0F) << 16)
                | self.command as u32,
        );
        for word in &self.data {
            buf.put_u32(*word);
        }
        Ok(buf.freeze())
    }
}

/// Split a slave-mail header word into (command, status, data word count).
pub fn decode_slave_header(word: u32) -> Result<(u16, u8, usize), ProtocolError> {
    if (word >> 24) as u8 != SLAVE_MAIL {
        return Err(ProtocolError::InvalidMailHeader(word));
    }
    let count = ((word >> 20) & 0x0F) as usize;
    if count > MAX_MAIL_WORDS {
        return Err(ProtocolError::MailTooLong(count, MAX_MAIL_WORDS));
    }
    Ok(((word & 0xFFFF) as u16, ((word >> 16) & 0x0F) as u8, count))
}

/// Decode a full slave mail from FIFO bytes.
pub fn decode_slave_mail(mut buf: &[u8]) -> Result<Mailbox, ProtocolError> {
    if buf.remaining() < MAIL_HEADER_SIZE {
        return Err(ProtocolError::Truncated {
            expected: MAIL_HEADER_SIZE,
            actual: buf.remaining(),
        });
    }
    let (command, status, count) = decode_slave_header(buf.get_u32())?;
    let data = read_words(&mut buf, count)?;
    Ok(Mailbox {
        command,
        status,
        data,
    })
}

fn read_words(buf: &mut &[u8], count: usize) -> Result<Vec<u32>, ProtocolError> {
    if buf.remaining() < count * 4 {
        return Err(ProtocolError::Truncated {
            expected: MAIL_HEADER_SIZE + count * 4,
            actual: MAIL_HEADER_SIZE + buf.remaining(),
        });
    }
    Ok((0..count).map(|_| buf.get_u32()).collect())
}

/// Fields of the DSP code version word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub year: u8,
    pub month: u8,
    pub day: u8,
}

impl CodeVersion {
    pub fn from_word(word: u32) -> Self {
        Self {
            major: ((word >> 28) & 0x0F) as u8,
            minor: ((word >> 24) & 0x0F) as u8,
            patch: ((word >> 16) & 0xFF) as u8,
            year: ((word >> 9) & 0x3F) as u8,
            month: ((word >> 5) & 0x0F) as u8,
            day: (word & 0x1F) as u8,
        }
    }
}

impl std::fmt::Display for CodeVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{} (20{:02}-{:02}-{:02})",
            self.major, self.minor, self.patch, self.year, self.month, self.day
        )
    }
}
