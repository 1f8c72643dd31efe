//! Carehook Core: shared domain abstractions.
//!
//! This crate defines the appointment event model, the schema-driven
//! validator and the event store contract that the other crates depend on.
//! It contains no database or HTTP code.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod repository;
pub mod schema;
pub mod validation;
