//! Adapters for the domain ports: an in-memory checkout service and a
//! `tracing`-backed checkout observer.

pub mod in_memory;
pub mod observer;
