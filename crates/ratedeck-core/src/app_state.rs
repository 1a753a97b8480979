//! Application-wide shared state and error types for ratedeck
//!
//! The UI loop, the broker ingest loop and the publisher loop all run
//! concurrently and share two values: the quote buffers and the currently
//! selected currency. Both live in [`SharedState`], which is allocated once
//! (usually in a `static`) and handed to every task by reference.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use thiserror_no_std::Error;

use crate::currency::Currency;
use crate::rates::{Quote, RateBook};

/// State shared between the UI, ingest and publisher tasks
pub struct SharedState {
    rates: Mutex<CriticalSectionRawMutex, RefCell<RateBook>>,
    selected: AtomicU8,
}

impl SharedState {
    /// Empty quotes, first currency selected
    pub const fn new() -> Self {
        Self {
            rates: Mutex::new(RefCell::new(RateBook::new())),
            selected: AtomicU8::new(0),
        }
    }

    /// Copy out the current quote for one currency.
    ///
    /// The lock is held only for the copy, so the caller never sees a quote
    /// half-way through an update.
    pub fn quote(&self, currency: Currency) -> Quote {
        self.rates.lock(|book| {
            let book = book.borrow();
            let mut quote = Quote::new();
            let _ = quote.push_str(book.get(currency));
            quote
        })
    }

    /// Run `f` with exclusive access to the rate book
    pub fn update_rates<R>(&self, f: impl FnOnce(&mut RateBook) -> R) -> R {
        self.rates.lock(|book| f(&mut book.borrow_mut()))
    }

    /// Record the currency committed from the menu
    pub fn select(&self, currency: Currency) {
        self.selected.store(currency.index() as u8, Ordering::Relaxed);
    }

    /// Currency the publisher should announce
    pub fn selected(&self) -> Currency {
        Currency::from_index(self.selected.load(Ordering::Relaxed) as usize).unwrap_or_default()
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("WiFi connection failed: {0}")]
    Wifi(heapless::String<64>),
    #[error("Broker session failed: {0}")]
    Broker(heapless::String<64>),
    #[error("Display error: {0}")]
    Display(heapless::String<64>),
    #[error("Gesture sensor error: {0}")]
    Gesture(heapless::String<64>),
}

impl AppError {
    /// Build an error from any `Debug` value, keeping as much of its text as
    /// fits in the message buffer.
    pub fn describe<E: core::fmt::Debug>(make: fn(heapless::String<64>) -> Self, err: &E) -> Self {
        let mut text = heapless::String::<64>::new();
        let mut writer = TruncatingWriter(&mut text);
        let _ = core::fmt::write(&mut writer, format_args!("{:?}", err));
        make(text)
    }
}

/// `fmt::Write` adapter that silently drops whatever does not fit
struct TruncatingWriter<'a, const N: usize>(&'a mut heapless::String<N>);

impl<const N: usize> core::fmt::Write for TruncatingWriter<'_, N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}
