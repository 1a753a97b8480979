//! MQTT session over an async byte stream
//!
//! The connection is split into an [`MqttReader`] and an [`MqttWriter`] so
//! the ingest loop and the publisher loop can own one half each.

use embedded_io_async::{Read, ReadExactError, Write};
use log::{debug, info, warn};

use super::packet::{
    Connect, Packet, PacketError, PacketType, Publish, QoS, Subscribe, read_variable_length,
};

/// SUBACK return code for a refused subscription
const SUBACK_FAILURE: u8 = 0x80;

/// Errors from an MQTT session
#[derive(Debug)]
pub enum MqttError<E> {
    /// The underlying transport failed
    Transport(E),
    /// The peer closed the stream
    ConnectionClosed,
    /// A packet could not be encoded or decoded
    Packet(PacketError),
    /// CONNACK carried a non-zero return code
    ConnectRefused(u8),
    /// SUBACK reported failure
    SubscribeRefused,
    /// The broker sent something that does not fit the session state
    UnexpectedPacket(PacketType),
}

impl<E> From<PacketError> for MqttError<E> {
    fn from(err: PacketError) -> Self {
        Self::Packet(err)
    }
}

/// Parameters for the CONNECT packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions<'a> {
    pub client_id: &'a str,
    pub keep_alive_secs: u16,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
}

impl<'a> ConnectOptions<'a> {
    pub const fn new(client_id: &'a str) -> Self {
        Self {
            client_id,
            keep_alive_secs: 60,
            username: None,
            password: None,
        }
    }
}

async fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), MqttError<R::Error>> {
    reader.read_exact(buf).await.map_err(|e| match e {
        ReadExactError::UnexpectedEof => MqttError::ConnectionClosed,
        ReadExactError::Other(e) => MqttError::Transport(e),
    })
}

/// Inbound half of a session, buffering up to `N` bytes of packet body
pub struct MqttReader<R, const N: usize> {
    reader: R,
    buf: [u8; N],
}

impl<R: Read, const N: usize> MqttReader<R, N> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: [0; N],
        }
    }

    /// Wait for the next complete packet.
    ///
    /// A PUBLISH whose body exceeds the buffer is truncated to fit and the
    /// rest is discarded from the stream. Any other oversized packet is
    /// discarded whole and reported as [`Packet::Other`].
    pub async fn next_packet(&mut self) -> Result<Packet<'_>, MqttError<R::Error>> {
        let mut header = [0u8; 1];
        read_exact(&mut self.reader, &mut header).await?;

        let mut len_bytes = [0u8; 4];
        let mut remaining = None;
        for i in 0..len_bytes.len() {
            read_exact(&mut self.reader, &mut len_bytes[i..=i]).await?;
            if let Some((value, _)) = read_variable_length(&len_bytes[..=i])? {
                remaining = Some(value);
                break;
            }
        }
        let remaining = remaining.ok_or(PacketError::MalformedLength)?;

        let kept = remaining.min(N);
        read_exact(&mut self.reader, &mut self.buf[..kept]).await?;

        if kept < remaining {
            warn!("Dropping {} bytes of oversized packet", remaining - kept);
            let mut scratch = [0u8; 32];
            let mut left = remaining - kept;
            while left > 0 {
                let n = left.min(scratch.len());
                read_exact(&mut self.reader, &mut scratch[..n]).await?;
                left -= n;
            }
            let kind = PacketType::from_header(header[0])?;
            if kind != PacketType::Publish {
                return Ok(Packet::Other(kind));
            }
        }

        Ok(Packet::decode(header[0], &self.buf[..kept])?)
    }
}

/// Outbound half of a session, encoding into an `N` byte buffer
pub struct MqttWriter<W, const N: usize> {
    writer: W,
    buf: [u8; N],
    next_packet_id: u16,
}

impl<W: Write, const N: usize> MqttWriter<W, N> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buf: [0; N],
            next_packet_id: 1,
        }
    }

    /// Allocate a packet identifier; zero is never used
    fn next_id(&mut self) -> u16 {
        let id = self.next_packet_id;
        self.next_packet_id = self.next_packet_id.wrapping_add(1).max(1);
        id
    }

    async fn send(&mut self, len: usize) -> Result<(), MqttError<W::Error>> {
        self.writer
            .write_all(&self.buf[..len])
            .await
            .map_err(MqttError::Transport)?;
        self.writer.flush().await.map_err(MqttError::Transport)
    }

    pub async fn connect(&mut self, options: &ConnectOptions<'_>) -> Result<(), MqttError<W::Error>> {
        let len = Connect {
            client_id: options.client_id,
            keep_alive_secs: options.keep_alive_secs,
            clean_session: true,
            username: options.username,
            password: options.password.map(str::as_bytes),
        }
        .encode(&mut self.buf)?;
        self.send(len).await
    }

    /// Subscribe to one topic, returning the packet identifier used
    pub async fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<u16, MqttError<W::Error>> {
        let packet_id = self.next_id();
        let len = Subscribe {
            packet_id,
            topic,
            qos,
        }
        .encode(&mut self.buf)?;
        self.send(len).await?;
        Ok(packet_id)
    }

    /// Publish a message, returning the packet identifier for QoS > 0
    pub async fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
    ) -> Result<Option<u16>, MqttError<W::Error>> {
        let packet_id = match qos {
            QoS::AtMostOnce => None,
            _ => Some(self.next_id()),
        };
        let len = Publish {
            topic,
            payload,
            qos,
            packet_id,
            retain: false,
            dup: false,
        }
        .encode(&mut self.buf)?;
        self.send(len).await?;
        Ok(packet_id)
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.writer
    }
}

/// Open a session: CONNECT, wait for CONNACK, SUBSCRIBE to `topic` at QoS 0
/// and wait for its SUBACK.
///
/// Packets other than the awaited SUBACK are skipped while subscribing.
pub async fn handshake<R, W, const RN: usize, const WN: usize>(
    reader: &mut MqttReader<R, RN>,
    writer: &mut MqttWriter<W, WN>,
    options: &ConnectOptions<'_>,
    topic: &str,
) -> Result<(), MqttError<R::Error>>
where
    R: Read,
    W: Write<Error = R::Error>,
{
    writer.connect(options).await?;
    match reader.next_packet().await? {
        Packet::ConnAck { return_code: 0, .. } => {
            info!("Connected to broker as {}", options.client_id);
        }
        Packet::ConnAck { return_code, .. } => return Err(MqttError::ConnectRefused(return_code)),
        other => return Err(MqttError::UnexpectedPacket(other.kind())),
    }

    let packet_id = writer.subscribe(topic, QoS::AtMostOnce).await?;
    loop {
        match reader.next_packet().await? {
            Packet::SubAck {
                packet_id: id,
                return_code,
            } if id == packet_id => {
                if return_code == SUBACK_FAILURE {
                    return Err(MqttError::SubscribeRefused);
                }
                info!("Subscribed to {}", topic);
                return Ok(());
            }
            other => debug!("Skipping {:?} while waiting for SUBACK", other),
        }
    }
}
