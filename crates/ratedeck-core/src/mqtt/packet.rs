//! MQTT 3.1.1 packet encoding and decoding
//!
//! Encoders write a complete packet (fixed header included) into a caller
//! buffer and return its length. [`Packet::decode`] parses the body of a
//! packet whose fixed header has already been read.

use thiserror_no_std::Error;

/// Largest value a remaining-length field can carry
pub const MAX_REMAINING_LENGTH: usize = 268_435_455;

/// Errors from encoding or decoding packets
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    #[error("buffer too small for packet")]
    BufferTooSmall,
    #[error("malformed remaining length")]
    MalformedLength,
    #[error("malformed packet")]
    Malformed,
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    #[error("unknown packet type {0}")]
    UnknownType(u8),
}

/// Delivery guarantee of a PUBLISH
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl QoS {
    pub const fn from_bits(bits: u8) -> Result<Self, PacketError> {
        match bits {
            0 => Ok(Self::AtMostOnce),
            1 => Ok(Self::AtLeastOnce),
            2 => Ok(Self::ExactlyOnce),
            _ => Err(PacketError::Malformed),
        }
    }
}

/// Control packet type, the high nibble of the fixed header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    Connect = 1,
    ConnAck = 2,
    Publish = 3,
    PubAck = 4,
    PubRec = 5,
    PubRel = 6,
    PubComp = 7,
    Subscribe = 8,
    SubAck = 9,
    Unsubscribe = 10,
    UnsubAck = 11,
    PingReq = 12,
    PingResp = 13,
    Disconnect = 14,
}

impl PacketType {
    /// Decode from the first byte of a fixed header
    pub const fn from_header(header: u8) -> Result<Self, PacketError> {
        Ok(match header >> 4 {
            1 => Self::Connect,
            2 => Self::ConnAck,
            3 => Self::Publish,
            4 => Self::PubAck,
            5 => Self::PubRec,
            6 => Self::PubRel,
            7 => Self::PubComp,
            8 => Self::Subscribe,
            9 => Self::SubAck,
            10 => Self::Unsubscribe,
            11 => Self::UnsubAck,
            12 => Self::PingReq,
            13 => Self::PingResp,
            14 => Self::Disconnect,
            other => return Err(PacketError::UnknownType(other)),
        })
    }
}

// ---------------------------------------------------------------------------
// Primitive helpers
// ---------------------------------------------------------------------------

/// Number of bytes needed to encode `value` as a remaining length
pub const fn variable_length_len(value: usize) -> usize {
    match value {
        0..=127 => 1,
        128..=16_383 => 2,
        16_384..=2_097_151 => 3,
        _ => 4,
    }
}

/// Encode a remaining length, returning the number of bytes written
pub fn write_variable_length(buf: &mut [u8], mut value: usize) -> Result<usize, PacketError> {
    if value > MAX_REMAINING_LENGTH {
        return Err(PacketError::MalformedLength);
    }
    let mut written = 0;
    loop {
        let mut byte = (value % 128) as u8;
        value /= 128;
        if value > 0 {
            byte |= 0x80;
        }
        *buf.get_mut(written).ok_or(PacketError::BufferTooSmall)? = byte;
        written += 1;
        if value == 0 {
            return Ok(written);
        }
    }
}

/// Decode a remaining length from the start of `buf`.
///
/// Returns `Ok(None)` if `buf` ends before the field does, otherwise the
/// value and the number of bytes it occupied.
pub fn read_variable_length(buf: &[u8]) -> Result<Option<(usize, usize)>, PacketError> {
    let mut value = 0usize;
    let mut multiplier = 1usize;
    for (i, &byte) in buf.iter().enumerate() {
        if i == 4 {
            return Err(PacketError::MalformedLength);
        }
        value += (byte & 0x7F) as usize * multiplier;
        if byte & 0x80 == 0 {
            return Ok(Some((value, i + 1)));
        }
        multiplier *= 128;
    }
    if buf.len() >= 4 {
        Err(PacketError::MalformedLength)
    } else {
        Ok(None)
    }
}

/// Write a length-prefixed UTF-8 string, returning bytes written
pub fn write_string(buf: &mut [u8], s: &str) -> Result<usize, PacketError> {
    let mut cursor = Cursor::new(buf);
    cursor.put_str(s)?;
    Ok(cursor.pos)
}

/// Bounds-checked writer over a byte buffer
struct Cursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), PacketError> {
        let end = self.pos + bytes.len();
        self.buf
            .get_mut(self.pos..end)
            .ok_or(PacketError::BufferTooSmall)?
            .copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn put_u8(&mut self, value: u8) -> Result<(), PacketError> {
        self.put(&[value])
    }

    fn put_u16(&mut self, value: u16) -> Result<(), PacketError> {
        self.put(&value.to_be_bytes())
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), PacketError> {
        let len = u16::try_from(bytes.len()).map_err(|_| PacketError::Malformed)?;
        self.put_u16(len)?;
        self.put(bytes)
    }

    fn put_str(&mut self, s: &str) -> Result<(), PacketError> {
        self.put_bytes(s.as_bytes())
    }

    fn put_fixed_header(&mut self, header: u8, remaining: usize) -> Result<(), PacketError> {
        self.put_u8(header)?;
        let written = write_variable_length(&mut self.buf[self.pos..], remaining)?;
        self.pos += written;
        Ok(())
    }
}

/// Bounds-checked reader over a packet body
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn u8(&mut self) -> Result<u8, PacketError> {
        let (&first, rest) = self.buf.split_first().ok_or(PacketError::Malformed)?;
        self.buf = rest;
        Ok(first)
    }

    fn u16(&mut self) -> Result<u16, PacketError> {
        Ok(u16::from_be_bytes([self.u8()?, self.u8()?]))
    }

    fn str(&mut self) -> Result<&'a str, PacketError> {
        let len = self.u16()? as usize;
        if self.buf.len() < len {
            return Err(PacketError::Malformed);
        }
        let (bytes, rest) = self.buf.split_at(len);
        self.buf = rest;
        core::str::from_utf8(bytes).map_err(|_| PacketError::InvalidUtf8)
    }
}

// ---------------------------------------------------------------------------
// Outbound packets
// ---------------------------------------------------------------------------

/// CONNECT parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connect<'a> {
    pub client_id: &'a str,
    pub keep_alive_secs: u16,
    pub clean_session: bool,
    pub username: Option<&'a str>,
    pub password: Option<&'a [u8]>,
}

impl Connect<'_> {
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, PacketError> {
        // protocol name (2 + 4) + level + flags + keep-alive
        let mut remaining = 10 + 2 + self.client_id.len();
        let mut flags = 0u8;
        if self.clean_session {
            flags |= 0x02;
        }
        if let Some(username) = self.username {
            flags |= 0x80;
            remaining += 2 + username.len();
        }
        if let Some(password) = self.password {
            flags |= 0x40;
            remaining += 2 + password.len();
        }

        let mut cursor = Cursor::new(buf);
        cursor.put_fixed_header(0x10, remaining)?;
        cursor.put_str("MQTT")?;
        cursor.put_u8(4)?;
        cursor.put_u8(flags)?;
        cursor.put_u16(self.keep_alive_secs)?;
        cursor.put_str(self.client_id)?;
        if let Some(username) = self.username {
            cursor.put_str(username)?;
        }
        if let Some(password) = self.password {
            cursor.put_bytes(password)?;
        }
        Ok(cursor.pos)
    }
}

/// SUBSCRIBE to a single topic filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscribe<'a> {
    pub packet_id: u16,
    pub topic: &'a str,
    pub qos: QoS,
}

impl Subscribe<'_> {
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, PacketError> {
        let remaining = 2 + 2 + self.topic.len() + 1;
        let mut cursor = Cursor::new(buf);
        cursor.put_fixed_header(0x82, remaining)?;
        cursor.put_u16(self.packet_id)?;
        cursor.put_str(self.topic)?;
        cursor.put_u8(self.qos as u8)?;
        Ok(cursor.pos)
    }
}

/// PUBLISH in either direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Publish<'a> {
    pub topic: &'a str,
    pub payload: &'a [u8],
    pub qos: QoS,
    /// Present for QoS 1 and 2
    pub packet_id: Option<u16>,
    pub retain: bool,
    pub dup: bool,
}

impl<'a> Publish<'a> {
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, PacketError> {
        let id_len = if self.qos == QoS::AtMostOnce { 0 } else { 2 };
        let remaining = 2 + self.topic.len() + id_len + self.payload.len();

        let mut header = 0x30 | ((self.qos as u8) << 1);
        if self.retain {
            header |= 0x01;
        }
        if self.dup {
            header |= 0x08;
        }

        let mut cursor = Cursor::new(buf);
        cursor.put_fixed_header(header, remaining)?;
        cursor.put_str(self.topic)?;
        if id_len > 0 {
            cursor.put_u16(self.packet_id.ok_or(PacketError::Malformed)?)?;
        }
        cursor.put(self.payload)?;
        Ok(cursor.pos)
    }

    fn decode(header: u8, body: &'a [u8]) -> Result<Self, PacketError> {
        let qos = QoS::from_bits((header >> 1) & 0x03)?;
        let mut reader = Reader { buf: body };
        let topic = reader.str()?;
        let packet_id = if qos == QoS::AtMostOnce {
            None
        } else {
            Some(reader.u16()?)
        };
        Ok(Self {
            topic,
            payload: reader.buf,
            qos,
            packet_id,
            retain: header & 0x01 != 0,
            dup: header & 0x08 != 0,
        })
    }
}

// ---------------------------------------------------------------------------
// Inbound packets
// ---------------------------------------------------------------------------

/// A packet received from the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet<'a> {
    ConnAck {
        session_present: bool,
        return_code: u8,
    },
    SubAck {
        packet_id: u16,
        return_code: u8,
    },
    Publish(Publish<'a>),
    PubAck {
        packet_id: u16,
    },
    PingResp,
    /// Anything the client does not act on
    Other(PacketType),
}

impl<'a> Packet<'a> {
    /// Decode a packet body given its fixed-header byte
    pub fn decode(header: u8, body: &'a [u8]) -> Result<Self, PacketError> {
        let kind = PacketType::from_header(header)?;
        let mut reader = Reader { buf: body };
        Ok(match kind {
            PacketType::ConnAck => {
                let flags = reader.u8()?;
                Self::ConnAck {
                    session_present: flags & 0x01 != 0,
                    return_code: reader.u8()?,
                }
            }
            PacketType::SubAck => Self::SubAck {
                packet_id: reader.u16()?,
                return_code: reader.u8()?,
            },
            PacketType::Publish => Self::Publish(Publish::decode(header, body)?),
            PacketType::PubAck => Self::PubAck {
                packet_id: reader.u16()?,
            },
            PacketType::PingResp => Self::PingResp,
            other => Self::Other(other),
        })
    }

    pub const fn kind(&self) -> PacketType {
        match self {
            Self::ConnAck { .. } => PacketType::ConnAck,
            Self::SubAck { .. } => PacketType::SubAck,
            Self::Publish(_) => PacketType::Publish,
            Self::PubAck { .. } => PacketType::PubAck,
            Self::PingResp => PacketType::PingResp,
            Self::Other(kind) => *kind,
        }
    }
}
