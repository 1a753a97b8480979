//! Inbound `[DATA]` message parsing
//!
//! Rate updates arrive as a single text payload:
//!
//! ```text
//! [DATA] <seq>,<RUB>,<EUR>,<CZK>,<BTC>,<ETH>
//! ```
//!
//! The first space-separated token is the marker. The rest is split on
//! commas; position 0 is unused and positions 1..=5 follow the menu order of
//! [`Currency::ALL`]. Each field is trimmed, so padding never reaches the
//! display and a blank field counts as empty. Positions that are missing or
//! empty leave the stored quote untouched. Anything without the marker is
//! ignored.

use core::convert::Infallible;

use embedded_io_async::Read;
use log::{debug, trace};

use crate::app_state::SharedState;
use crate::currency::{CURRENCY_COUNT, Currency};
use crate::mqtt::{MqttError, MqttReader, Packet};
use crate::rates::RateBook;

/// Marker token that identifies a rate update
pub const DATA_MARKER: &str = "[DATA]";

/// Longest payload considered; anything after this is dropped
pub const MAX_MESSAGE_LEN: usize = 255;

/// Quote fields extracted from one `[DATA]` message, borrowed from the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateUpdate<'a> {
    fields: [Option<&'a str>; CURRENCY_COUNT],
}

impl<'a> RateUpdate<'a> {
    /// Parse a raw payload.
    ///
    /// Returns `None` when the payload does not carry the [`DATA_MARKER`].
    pub fn parse(payload: &'a [u8]) -> Option<Self> {
        let text = payload_text(payload);
        let text = text.trim_start_matches(' ');
        let (marker, rest) = text.split_once(' ').unwrap_or((text, ""));
        if !marker.starts_with(DATA_MARKER) {
            return None;
        }

        let mut update = Self::default();
        for (slot, field) in update.fields.iter_mut().zip(rest.split(',').skip(1)) {
            let field = field.trim();
            if !field.is_empty() {
                *slot = Some(field);
            }
        }
        Some(update)
    }

    /// Value carried for `currency`, if any
    pub fn get(&self, currency: Currency) -> Option<&'a str> {
        self.fields[currency.index()]
    }

    /// Number of currencies this update carries a value for
    pub fn len(&self) -> usize {
        self.fields.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write every carried value into `book`
    pub fn apply(&self, book: &mut RateBook) {
        for currency in Currency::ALL {
            if let Some(value) = self.get(currency) {
                if book.set(currency, value) {
                    debug!("Quote for {} truncated", currency);
                }
            }
        }
    }
}

/// Handle one inbound broker payload.
///
/// Returns `true` if it was a rate update (even one carrying no values).
pub fn ingest(state: &SharedState, payload: &[u8]) -> bool {
    match RateUpdate::parse(payload) {
        Some(update) => {
            debug!("Rate update with {} field(s)", update.len());
            state.update_rates(|book| update.apply(book));
            true
        }
        None => {
            debug!("Ignoring non-rate message ({} bytes)", payload.len());
            false
        }
    }
}

/// Feed every PUBLISH received on `topic` into [`ingest`] until the
/// session fails.
///
/// Acknowledgements for the publisher's own QoS 1 messages arrive here too
/// and are dropped.
pub async fn run_ingest<R: Read, const N: usize>(
    reader: &mut MqttReader<R, N>,
    topic: &str,
    state: &SharedState,
) -> Result<Infallible, MqttError<R::Error>> {
    loop {
        match reader.next_packet().await? {
            Packet::Publish(publish) if publish.topic == topic => {
                ingest(state, publish.payload);
            }
            Packet::Publish(publish) => debug!("Ignoring message on {}", publish.topic),
            Packet::PubAck { packet_id } => trace!("PUBACK {}", packet_id),
            other => debug!("Ignoring {:?}", other.kind()),
        }
    }
}

/// Bounded view of the payload as text: at most [`MAX_MESSAGE_LEN`] bytes,
/// stopping at the first NUL, and only the valid UTF-8 prefix.
fn payload_text(payload: &[u8]) -> &str {
    let bounded = &payload[..payload.len().min(MAX_MESSAGE_LEN)];
    let bounded = match bounded.iter().position(|&b| b == 0) {
        Some(nul) => &bounded[..nul],
        None => bounded,
    };
    match core::str::from_utf8(bounded) {
        Ok(text) => text,
        // valid_up_to() is always a boundary, so this re-parse cannot fail
        Err(e) => core::str::from_utf8(&bounded[..e.valid_up_to()]).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::QUOTE_CAPACITY;
    use crate::test_support::ScriptedRx;
    use embassy_futures::block_on;
    use proptest::prelude::*;

    fn seeded_state() -> SharedState {
        let state = SharedState::new();
        state.update_rates(|book| {
            for currency in Currency::ALL {
                book.set(currency, "old");
            }
        });
        state
    }

    #[test]
    fn test_full_update() {
        let state = SharedState::new();
        assert!(ingest(&state, b"[DATA] x,111,222,333,444,555"));

        assert_eq!(state.quote(Currency::Rub).as_str(), "111");
        assert_eq!(state.quote(Currency::Eur).as_str(), "222");
        assert_eq!(state.quote(Currency::Czk).as_str(), "333");
        assert_eq!(state.quote(Currency::Btc).as_str(), "444");
        assert_eq!(state.quote(Currency::Eth).as_str(), "555");
    }

    #[test]
    fn test_partial_update_keeps_other_quotes() {
        let state = seeded_state();
        assert!(ingest(&state, b"[DATA] x,111"));

        assert_eq!(state.quote(Currency::Rub).as_str(), "111");
        for currency in [Currency::Eur, Currency::Czk, Currency::Btc, Currency::Eth] {
            assert_eq!(state.quote(currency).as_str(), "old");
        }
    }

    #[test]
    fn test_non_data_message_is_ignored() {
        let state = seeded_state();

        assert!(!ingest(&state, b"[CURRENCY] EUR"));
        assert!(!ingest(&state, b"x,111,222,333,444,555"));
        assert!(!ingest(&state, b""));
        for currency in Currency::ALL {
            assert_eq!(state.quote(currency).as_str(), "old");
        }
    }

    #[test]
    fn test_extra_fields_ignored() {
        let update = RateUpdate::parse(b"[DATA] 7,1,2,3,4,5,6,7").unwrap();
        assert_eq!(update.len(), 5);
        assert_eq!(update.get(Currency::Eth), Some("5"));
    }

    #[test]
    fn test_empty_fields_and_whitespace() {
        let update = RateUpdate::parse(b"  [DATA] 7,,2.5 , ,4\r\n").unwrap();
        assert_eq!(update.get(Currency::Rub), None);
        assert_eq!(update.get(Currency::Eur), Some("2.5"));
        assert_eq!(update.get(Currency::Czk), None);
        assert_eq!(update.get(Currency::Btc), Some("4"));
        assert_eq!(update.get(Currency::Eth), None);
    }

    #[test]
    fn test_padded_fields_are_stored_trimmed() {
        let state = seeded_state();
        assert!(ingest(&state, b"[DATA] 1, 0.011USD,\t1.09USD ,   "));

        assert_eq!(state.quote(Currency::Rub).as_str(), "0.011USD");
        assert_eq!(state.quote(Currency::Eur).as_str(), "1.09USD");
        // Blank field keeps the previous quote
        assert_eq!(state.quote(Currency::Czk).as_str(), "old");
    }

    #[test]
    fn test_marker_without_fields() {
        let update = RateUpdate::parse(b"[DATA]").unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_payload_stops_at_nul() {
        let update = RateUpdate::parse(b"[DATA] 1,10\0,20").unwrap();
        assert_eq!(update.get(Currency::Rub), Some("10"));
        assert_eq!(update.get(Currency::Eur), None);
    }

    #[test]
    fn test_invalid_utf8_tail_is_dropped() {
        let update = RateUpdate::parse(b"[DATA] 1,10,2\xff0").unwrap();
        assert_eq!(update.get(Currency::Rub), Some("10"));
        assert_eq!(update.get(Currency::Eur), Some("2"));
    }

    #[test]
    fn test_oversized_payload_is_bounded() {
        let mut payload = std::vec::Vec::from(&b"[DATA] 0,"[..]);
        payload.extend(core::iter::repeat_n(b'9', 600));
        let update = RateUpdate::parse(&payload).unwrap();
        let rub = update.get(Currency::Rub).unwrap();
        assert_eq!(rub.len(), MAX_MESSAGE_LEN - "[DATA] 0,".len());
    }

    #[test]
    fn test_run_ingest_applies_topic_messages() {
        let on_topic: [&[u8]; 3] = [&[0x30, 18, 0, 4], b"test", b"[DATA] 1,2,3"];
        let other_topic: [&[u8]; 3] = [&[0x30, 21, 0, 5], b"other", b"[DATA] 1,9,9,9"];
        let puback: [u8; 4] = [0x40, 2, 0, 1];
        let mut chunks: std::vec::Vec<&[u8]> = std::vec::Vec::new();
        chunks.extend(other_topic);
        chunks.push(&puback);
        chunks.extend(on_topic);

        let state = SharedState::new();
        let mut reader = MqttReader::<_, 64>::new(ScriptedRx::new(&chunks));
        let result = block_on(run_ingest(&mut reader, "test", &state));

        assert!(matches!(result, Err(MqttError::ConnectionClosed)));
        assert_eq!(state.quote(Currency::Rub).as_str(), "2");
        assert_eq!(state.quote(Currency::Eur).as_str(), "3");
        assert_eq!(state.quote(Currency::Czk).as_str(), "");
    }

    proptest! {
        #[test]
        fn prop_quotes_never_exceed_capacity(payload in proptest::collection::vec(any::<u8>(), 0..1024)) {
            let state = SharedState::new();
            let mut framed = std::vec::Vec::from(&b"[DATA] "[..]);
            framed.extend_from_slice(&payload);
            ingest(&state, &framed);
            ingest(&state, &payload);
            for currency in Currency::ALL {
                prop_assert!(state.quote(currency).len() <= QUOTE_CAPACITY);
            }
        }
    }
}
