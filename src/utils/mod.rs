//! Small helpers shared across the site generator.

pub mod date;
pub mod html;
pub mod slug;
