//! HTTP request handlers.

pub(crate) mod docs;
pub(crate) mod menu;
pub(crate) mod refresh;
pub(crate) mod versions;
