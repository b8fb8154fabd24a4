//! Driver layer for browser automation.
//!
//! This crate wraps a WebDriver session (chromedriver by default) with the
//! helpers the publisher needs:
//!
//! - [`browser::driver::GleanDriver`]: session lifecycle, channel fallback, cookie transfer
//! - [`browser::page::GleanPage`]: waits, visibility checks, typing, screenshots
//! - [`browser::launch`]: Chrome arguments and capabilities
//! - [`session`]: Playwright-compatible session state files and cookie conversion
pub mod browser;
pub mod session;

pub use browser::driver::GleanDriver;
pub use browser::launch::{BrowserChannel, LaunchOptions};
pub use browser::page::GleanPage;
pub use session::{SessionCookie, SessionState};
