//! Command abstractions.

use uuid::Uuid;

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Identifier of the inbound request that produced this command. Echoed
    /// back to the caller and attached to every log line for the request.
    fn request_id(&self) -> Uuid;
}
