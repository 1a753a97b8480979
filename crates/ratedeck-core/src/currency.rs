//! The fixed currency table shown in the menu

use core::fmt;

/// Number of currencies in the menu
pub const CURRENCY_COUNT: usize = 5;

/// Currencies the device knows about, in menu order.
///
/// The order is also the field order of inbound `[DATA]` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Currency {
    #[default]
    Rub,
    Eur,
    Czk,
    Btc,
    Eth,
}

impl Currency {
    /// All currencies in menu order
    pub const ALL: [Currency; CURRENCY_COUNT] = [
        Currency::Rub,
        Currency::Eur,
        Currency::Czk,
        Currency::Btc,
        Currency::Eth,
    ];

    /// Three-letter code, as shown on screen and published to the broker
    pub const fn code(self) -> &'static str {
        match self {
            Self::Rub => "RUB",
            Self::Eur => "EUR",
            Self::Czk => "CZK",
            Self::Btc => "BTC",
            Self::Eth => "ETH",
        }
    }

    /// Position in the menu (and in [`Currency::ALL`])
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a currency by menu position
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < CURRENCY_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
