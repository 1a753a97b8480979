//! Gesture events, the sensor abstraction, and sweep decoding
//!
//! The UI is driven entirely by four directional swipes. A [`GestureSource`]
//! is polled until it reports one; [`wait_for_gesture`] wraps that polling in
//! a backoff delay so the UI task sleeps instead of spinning on the bus.
//!
//! [`GestureDecoder`] turns the raw photodiode datasets produced by an
//! APDS-9960 style gesture engine into a direction. It lives here rather than
//! in the driver so it can be tested on the host.

use embedded_hal_async::delay::DelayNs;
use log::warn;

use crate::app_state::AppError;

/// A discrete directional swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Up,
    Down,
    Left,
    Right,
}

impl Gesture {
    /// Label used in log output
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }
}

/// Anything that can be polled for swipes.
///
/// `Ok(None)` means no complete gesture is available yet.
#[allow(async_fn_in_trait)]
pub trait GestureSource {
    type Error: core::fmt::Debug;

    async fn read_gesture(&mut self) -> Result<Option<Gesture>, Self::Error>;
}

/// First poll delay after an empty read
pub const GESTURE_POLL_MIN_MS: u32 = 10;

/// Upper bound for the poll delay
pub const GESTURE_POLL_MAX_MS: u32 = 80;

/// Poll `source` until it produces a gesture.
///
/// Empty reads back off exponentially from [`GESTURE_POLL_MIN_MS`] to
/// [`GESTURE_POLL_MAX_MS`]. Read errors are logged and treated like an empty
/// read; the sensor is never given up on.
pub async fn wait_for_gesture<G, D>(source: &mut G, delay: &mut D) -> Gesture
where
    G: GestureSource,
    D: DelayNs,
{
    let mut backoff_ms = GESTURE_POLL_MIN_MS;
    loop {
        match source.read_gesture().await {
            Ok(Some(gesture)) => return gesture,
            Ok(None) => {}
            Err(e) => warn!("{}", AppError::describe(AppError::Gesture, &e)),
        }
        delay.delay_ms(backoff_ms).await;
        backoff_ms = (backoff_ms * 2).min(GESTURE_POLL_MAX_MS);
    }
}

// ---------------------------------------------------------------------------
// Sweep decoding
// ---------------------------------------------------------------------------

/// One FIFO dataset: photodiode counts for the up, down, left and right
/// channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureSample {
    pub up: u8,
    pub down: u8,
    pub left: u8,
    pub right: u8,
}

impl GestureSample {
    pub const fn new(up: u8, down: u8, left: u8, right: u8) -> Self {
        Self {
            up,
            down,
            left,
            right,
        }
    }

    /// Parse a FIFO dataset in register order (U, D, L, R)
    pub const fn from_fifo(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    fn all_above(&self, threshold: u8) -> bool {
        self.up > threshold && self.down > threshold && self.left > threshold && self.right > threshold
    }

    /// (up/down ratio, left/right ratio), each in -100..=100
    fn ratios(&self) -> (i32, i32) {
        let ratio = |a: u8, b: u8| {
            let (a, b) = (a as i32, b as i32);
            if a + b == 0 { 0 } else { (a - b) * 100 / (a + b) }
        };
        (ratio(self.up, self.down), ratio(self.left, self.right))
    }
}

/// Datasets with any channel at or below this are ignored as noise
pub const GESTURE_THRESHOLD_OUT: u8 = 10;

/// Minimum ratio change for a sweep to count as a gesture
pub const GESTURE_SENSITIVITY: i32 = 20;

/// Accumulates the datasets of one sweep and classifies it.
///
/// Only the first and last datasets where every channel clears
/// [`GESTURE_THRESHOLD_OUT`] matter: a hand moving upward reaches the up
/// channel first and the down channel last, so the up/down ratio falls
/// across the sweep.
#[derive(Debug, Clone, Default)]
pub struct GestureDecoder {
    first: Option<GestureSample>,
    last: Option<GestureSample>,
}

impl GestureDecoder {
    pub const fn new() -> Self {
        Self {
            first: None,
            last: None,
        }
    }

    /// Feed one dataset from the FIFO
    pub fn push(&mut self, sample: GestureSample) {
        if !sample.all_above(GESTURE_THRESHOLD_OUT) {
            return;
        }
        if self.first.is_none() {
            self.first = Some(sample);
        }
        self.last = Some(sample);
    }

    /// Whether any usable dataset has been collected for the current sweep
    pub fn has_samples(&self) -> bool {
        self.first.is_some()
    }

    /// Classify the collected sweep and reset for the next one
    pub fn finish(&mut self) -> Option<Gesture> {
        let (first, last) = (self.first.take()?, self.last.take()?);

        let (ud_first, lr_first) = first.ratios();
        let (ud_last, lr_last) = last.ratios();
        let ud_delta = ud_last - ud_first;
        let lr_delta = lr_last - lr_first;

        if ud_delta.abs() >= lr_delta.abs() {
            if ud_delta <= -GESTURE_SENSITIVITY {
                Some(Gesture::Up)
            } else if ud_delta >= GESTURE_SENSITIVITY {
                Some(Gesture::Down)
            } else {
                None
            }
        } else if lr_delta <= -GESTURE_SENSITIVITY {
            Some(Gesture::Left)
        } else if lr_delta >= GESTURE_SENSITIVITY {
            Some(Gesture::Right)
        } else {
            None
        }
    }
}

/// Gesture engine registers sampled at the start of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FifoStatus {
    /// GVALID: the FIFO holds at least the configured number of datasets
    pub valid: bool,
    /// GMODE: the engine is still collecting the current sweep
    pub engine_active: bool,
    /// GFLVL: datasets waiting in the FIFO
    pub level: u8,
}

/// What a poll should do with the gesture FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FifoStep {
    /// Read every waiting dataset into the decoder
    Drain,
    /// The sweep is over and the FIFO is empty; classify it
    Finish,
    /// The engine is still collecting
    Wait,
}

impl FifoStatus {
    /// While the engine runs the FIFO is read only once GVALID is set. After
    /// it exits, datasets left below the GVALID threshold are drained before
    /// the sweep is classified so they cannot open the next sweep.
    pub const fn next_step(&self) -> FifoStep {
        if self.level > 0 && (self.valid || !self.engine_active) {
            FifoStep::Drain
        } else if self.engine_active {
            FifoStep::Wait
        } else {
            FifoStep::Finish
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingDelay;
    use embassy_futures::block_on;
    use std::collections::VecDeque;

    /// Scripted sensor: pops one result per poll
    struct ScriptedSource(VecDeque<Result<Option<Gesture>, &'static str>>);

    impl GestureSource for ScriptedSource {
        type Error = &'static str;

        async fn read_gesture(&mut self) -> Result<Option<Gesture>, Self::Error> {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    #[test]
    fn test_wait_returns_first_gesture_without_delay() {
        let mut source = ScriptedSource([Ok(Some(Gesture::Left))].into());
        let mut delay = RecordingDelay::default();

        assert_eq!(block_on(wait_for_gesture(&mut source, &mut delay)), Gesture::Left);
        assert!(delay.0.is_empty());
    }

    #[test]
    fn test_wait_backs_off_and_caps() {
        let mut script: VecDeque<_> = core::iter::repeat_n(Ok(None), 6).collect();
        script.push_back(Ok(Some(Gesture::Up)));
        let mut source = ScriptedSource(script);
        let mut delay = RecordingDelay::default();

        assert_eq!(block_on(wait_for_gesture(&mut source, &mut delay)), Gesture::Up);
        assert_eq!(delay.0, [10, 20, 40, 80, 80, 80]);
    }

    #[test]
    fn test_wait_retries_after_errors() {
        let mut source = ScriptedSource(
            [Err("nack"), Ok(None), Err("nack"), Ok(Some(Gesture::Right))].into(),
        );
        let mut delay = RecordingDelay::default();

        assert_eq!(block_on(wait_for_gesture(&mut source, &mut delay)), Gesture::Right);
        assert_eq!(delay.0.len(), 3);
    }

    /// Build a sweep that moves the (ud, lr) ratios from `start` to `end`
    fn sweep(start: GestureSample, end: GestureSample) -> GestureDecoder {
        let mut decoder = GestureDecoder::new();
        decoder.push(start);
        decoder.push(GestureSample::new(100, 100, 100, 100));
        decoder.push(end);
        decoder
    }

    #[test]
    fn test_decode_up_down_sweeps() {
        // Down channel dominates first, up channel dominates last
        let mut decoder = sweep(
            GestureSample::new(40, 120, 80, 80),
            GestureSample::new(120, 40, 80, 80),
        );
        // ud ratio rises from -50 to +50
        assert_eq!(decoder.finish(), Some(Gesture::Down));

        let mut decoder = sweep(
            GestureSample::new(120, 40, 80, 80),
            GestureSample::new(40, 120, 80, 80),
        );
        assert_eq!(decoder.finish(), Some(Gesture::Up));
    }

    #[test]
    fn test_decode_left_right_sweeps() {
        let mut decoder = sweep(
            GestureSample::new(80, 80, 120, 40),
            GestureSample::new(80, 80, 40, 120),
        );
        assert_eq!(decoder.finish(), Some(Gesture::Left));

        let mut decoder = sweep(
            GestureSample::new(80, 80, 40, 120),
            GestureSample::new(80, 80, 120, 40),
        );
        assert_eq!(decoder.finish(), Some(Gesture::Right));
    }

    #[test]
    fn test_decode_rejects_small_motion() {
        let mut decoder = sweep(
            GestureSample::new(100, 95, 100, 100),
            GestureSample::new(95, 100, 100, 100),
        );
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_decoder_ignores_noise_and_resets() {
        let mut decoder = GestureDecoder::new();
        decoder.push(GestureSample::new(5, 200, 200, 200));
        assert!(!decoder.has_samples());
        assert_eq!(decoder.finish(), None);

        decoder.push(GestureSample::new(120, 40, 80, 80));
        decoder.push(GestureSample::new(40, 120, 80, 80));
        assert!(decoder.finish().is_some());
        assert!(!decoder.has_samples());
    }

    #[test]
    fn test_from_fifo_order() {
        assert_eq!(
            GestureSample::from_fifo([1, 2, 3, 4]),
            GestureSample::new(1, 2, 3, 4)
        );
    }

    #[test]
    fn test_fifo_step() {
        let status = |valid, engine_active, level| FifoStatus {
            valid,
            engine_active,
            level,
        };
        assert_eq!(status(false, true, 0).next_step(), FifoStep::Wait);
        assert_eq!(status(false, true, 3).next_step(), FifoStep::Wait);
        assert_eq!(status(true, true, 4).next_step(), FifoStep::Drain);
        assert_eq!(status(false, false, 2).next_step(), FifoStep::Drain);
        assert_eq!(status(false, false, 0).next_step(), FifoStep::Finish);
    }

    /// One driver poll against an in-memory FIFO; `Some` once classified
    fn poll(
        fifo: &mut VecDeque<GestureSample>,
        decoder: &mut GestureDecoder,
        valid: bool,
        engine_active: bool,
    ) -> Option<Option<Gesture>> {
        let status = FifoStatus {
            valid,
            engine_active,
            level: fifo.len() as u8,
        };
        match status.next_step() {
            FifoStep::Drain => {
                fifo.drain(..).for_each(|sample| decoder.push(sample));
                None
            }
            FifoStep::Finish => Some(decoder.finish()),
            FifoStep::Wait => None,
        }
    }

    #[test]
    fn test_sweep_tail_stays_in_its_sweep() {
        let mut decoder = GestureDecoder::new();
        let mut fifo: VecDeque<GestureSample> = [
            GestureSample::from_fifo([120, 100, 100, 100]),
            GestureSample::from_fifo([118, 100, 100, 100]),
            GestureSample::from_fifo([116, 100, 100, 100]),
            GestureSample::from_fifo([115, 100, 100, 100]),
        ]
        .into();
        assert_eq!(poll(&mut fifo, &mut decoder, true, true), None);

        // The engine exits with two datasets below the GVALID threshold,
        // and the motion only shows in them
        fifo.push_back(GestureSample::from_fifo([30, 180, 100, 100]));
        fifo.push_back(GestureSample::from_fifo([20, 200, 100, 100]));
        assert_eq!(poll(&mut fifo, &mut decoder, false, false), None);
        assert!(fifo.is_empty());

        assert_eq!(
            poll(&mut fifo, &mut decoder, false, false),
            Some(Some(Gesture::Up))
        );
        assert!(!decoder.has_samples());
    }
}
