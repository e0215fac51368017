//! Request extractors for the data routes.

mod list;
pub use list::*;
