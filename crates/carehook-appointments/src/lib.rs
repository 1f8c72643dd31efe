//! Carehook: appointment event ingestion bounded context.
//!
//! Responsible for turning inbound webhook bodies into stored appointment
//! events exactly once, and for reading them back.

pub mod application;
pub mod domain;
