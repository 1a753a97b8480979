//! Minimal MQTT 3.1.1 client
//!
//! Only what the device needs: a clean-session CONNECT, one SUBSCRIBE,
//! QoS 0/1 PUBLISH in both directions, PINGREQ and DISCONNECT. The codec in
//! [`packet`] is transport-free; [`client`] drives it over any
//! `embedded_io_async` reader/writer pair, which on the device are the two
//! halves of an `embassy-net` TCP socket.
//!
//! ## Limitations
//!
//! - No inbound QoS 1/2 acknowledgement (the device subscribes at QoS 0)
//! - No retransmission of unacknowledged outbound QoS 1 publishes
//! - No TLS, no wills, no topic wildcards

pub mod client;
pub mod packet;

pub use client::{ConnectOptions, MqttError, MqttReader, MqttWriter, handshake};
pub use packet::{
    Packet, PacketError, PacketType, Publish, QoS, read_variable_length, write_string,
    write_variable_length,
};
