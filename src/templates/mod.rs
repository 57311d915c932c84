//! HTML templates and styling for the reading tracker.
//!
//! ## Module Structure
//!
//! - `styles` - CSS theme
//! - `components` - Shared HTML components (nav bar, base template, escaping)
//! - `chapters` - Chapter list, chapter detail, menu and login views

mod chapters;
mod components;
mod styles;

pub use chapters::{list_url, render_chapter_detail, render_chapter_list, render_login, render_menu};
pub use components::{base_html, html_escape, nav_bar};
pub use styles::STYLE;
