//! Various serde utilities

pub mod num;
