//! Host-facing boundary: the JSON line codec for host messages.

pub mod json;
