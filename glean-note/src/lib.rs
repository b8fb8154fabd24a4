//! Draft publishing for note.com.
//!
//! [`content::load_content`] reads the article, [`publisher::Publisher`] owns
//! the browser session, and [`composer::publish_draft`] drives the editor
//! through the [`composer::ComposerPage`] seam so the flow can run against a
//! real browser ([`glean_drivers::GleanPage`]) or a scripted fake.
//! [`login::capture_session`] records a session state file for later
//! headless runs.
pub mod browser_page;
pub mod composer;
pub mod content;
pub mod error;
pub mod login;
pub mod publisher;

pub use composer::{
    publish_draft, BodyStrategy, ComposerPage, DraftOutcome, Locate, PublishSettings,
};
pub use content::{load_content, DraftContent};
pub use error::NoteError;
pub use publisher::{session_request, Publisher, SessionMode, NOTE_AUTH_ENV};
