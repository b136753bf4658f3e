//! Book-club service: users, books, clubs and reviews.
//!
//! [`app`] wires the resource [`modules`] into a running service.

pub mod app;
pub mod modules;
pub mod utils;
