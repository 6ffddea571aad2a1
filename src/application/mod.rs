//! Application layer containing the payment-session orchestration.
//!
//! `SessionOrchestrator` turns host events into checkout mutations and
//! classifies their failures; `MessageCorrelator` guarantees that every
//! inbound event gets exactly one response.

pub mod correlator;
pub mod orchestrator;
