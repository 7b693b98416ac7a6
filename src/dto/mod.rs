//! Wire types exchanged with the session-state service.

pub mod admin;
pub mod play;
pub mod question;
pub mod validation;
