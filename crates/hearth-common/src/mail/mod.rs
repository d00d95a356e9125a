//! Mail delivery with fallback

mod mailer;

pub use mailer::{Mailer, OutgoingMail};
