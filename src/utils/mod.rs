//! Utility functions

pub mod id_gen;

pub use id_gen::{generate_timestamp_id, generate_user_id};
