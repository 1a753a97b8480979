// src/ui/core.rs
//! Core UI types for page navigation

use crate::currency::Currency;

/// Actions a page can request from the page manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Navigate to a specific page
    NavigateToPage(PageId),
    /// Commit a currency from the menu and open its detail page
    SelectCurrency(Currency),
    /// Go back to the page this one was opened from
    GoBack,
}

/// Page identifier for navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    Welcome,
    Menu,
    Detail(Currency),
}
