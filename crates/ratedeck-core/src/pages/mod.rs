pub mod detail;
pub mod menu;
pub mod page;
pub mod page_manager;
pub mod welcome;

pub use detail::DetailPage;
pub use menu::MenuPage;
pub use page::{Page, PageWrapper};
pub use page_manager::PageManager;
pub use welcome::WelcomePage;

/// Row holding a page title
pub const TITLE_ROW: usize = 0;

/// Row holding the main body text
pub const BODY_ROW: usize = 4;

/// First row of the currency list on the menu
pub const MENU_FIRST_ROW: usize = 1;
