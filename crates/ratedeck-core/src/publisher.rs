//! Periodic announcement of the selected currency
//!
//! Every [`PUBLISH_INTERVAL_MS`] the device publishes `[CURRENCY] <CODE>`
//! on the broker topic so the backend knows which quote the user is
//! looking at. The selection is read fresh each time.

use core::convert::Infallible;
use core::fmt::Write as _;

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::Write;
use log::debug;

use crate::app_state::SharedState;
use crate::currency::Currency;
use crate::mqtt::{MqttError, MqttWriter, QoS};

/// Prefix of every outbound selection message
pub const CURRENCY_MARKER: &str = "[CURRENCY]";

/// Period between selection messages
pub const PUBLISH_INTERVAL_MS: u32 = 2000;

/// Outbound message for `currency`, e.g. `[CURRENCY] EUR`
pub fn selection_message(currency: Currency) -> heapless::String<16> {
    let mut message = heapless::String::new();
    // "[CURRENCY] " plus a three-letter code always fits
    let _ = write!(message, "{} {}", CURRENCY_MARKER, currency.code());
    message
}

/// Publish the current selection on `topic` forever, at QoS 1.
///
/// Returns only when a publish fails; the caller tears the session down.
pub async fn run_publisher<W, D, const N: usize>(
    writer: &mut MqttWriter<W, N>,
    topic: &str,
    state: &SharedState,
    delay: &mut D,
) -> Result<Infallible, MqttError<W::Error>>
where
    W: Write,
    D: DelayNs,
{
    loop {
        let message = selection_message(state.selected());
        writer
            .publish(topic, message.as_bytes(), QoS::AtLeastOnce)
            .await?;
        debug!("Published {}", message);
        delay.delay_ms(PUBLISH_INTERVAL_MS).await;
    }
}
