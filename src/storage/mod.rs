//! Key-value storage layer for AvtoTest Core
//!
//! A small localStorage-style string store on top of SQLite:
//! - JSON document per key, read through serde
//! - single writer, closure-based read-modify-write
//! - change notifications for every written key

pub mod store;
pub mod watch;

pub use store::Store;
pub use watch::StoreEvent;
