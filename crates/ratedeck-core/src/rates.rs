//! Per-currency quote buffers

use heapless::String;

use crate::currency::{CURRENCY_COUNT, Currency};

/// Maximum bytes of quote text kept per currency
pub const QUOTE_CAPACITY: usize = 255;

/// A single quote as received from the broker (opaque text)
pub type Quote = String<QUOTE_CAPACITY>;

/// The latest quote text for every currency.
///
/// Every buffer starts empty and is overwritten wholesale whenever an inbound
/// message carries a value for it. Writes are bounded: text longer than
/// [`QUOTE_CAPACITY`] is cut at the last character boundary that fits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateBook {
    quotes: [Quote; CURRENCY_COUNT],
}

impl RateBook {
    pub const fn new() -> Self {
        Self {
            quotes: [const { String::new() }; CURRENCY_COUNT],
        }
    }

    /// Current quote text for `currency` (empty until the first update)
    pub fn get(&self, currency: Currency) -> &str {
        self.quotes[currency.index()].as_str()
    }

    /// Replace the quote for `currency`, truncating to capacity.
    ///
    /// Returns `true` if the text had to be truncated.
    pub fn set(&mut self, currency: Currency, text: &str) -> bool {
        let slot = &mut self.quotes[currency.index()];
        slot.clear();
        let fitted = truncate_to_boundary(text, QUOTE_CAPACITY);
        // `fitted` never exceeds the capacity, so this cannot fail
        let _ = slot.push_str(fitted);
        fitted.len() < text.len()
    }
}

impl Default for RateBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Longest prefix of `text` that is at most `max_len` bytes and ends on a
/// character boundary.
pub fn truncate_to_boundary(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_book_is_empty() {
        let book = RateBook::new();
        for currency in Currency::ALL {
            assert_eq!(book.get(currency), "");
        }
    }

    #[test]
    fn test_set_overwrites() {
        let mut book = RateBook::new();
        assert!(!book.set(Currency::Eur, "1.09USD"));
        assert!(!book.set(Currency::Eur, "1.1USD"));
        assert_eq!(book.get(Currency::Eur), "1.1USD");
        assert_eq!(book.get(Currency::Rub), "");
    }

    #[test]
    fn test_set_truncates_at_capacity() {
        let mut book = RateBook::new();
        let long = "9".repeat(QUOTE_CAPACITY + 40);
        assert!(book.set(Currency::Btc, &long));
        assert_eq!(book.get(Currency::Btc).len(), QUOTE_CAPACITY);
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // "€" is three bytes; cutting at 4 would split the second one
        assert_eq!(truncate_to_boundary("€€", 4), "€");
        assert_eq!(truncate_to_boundary("abc", 8), "abc");
        assert_eq!(truncate_to_boundary("abc", 0), "");
    }
}
