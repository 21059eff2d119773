//! ---
//! dsb_section: "02-device-model"
//! dsb_subsection: "module"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Vendor-neutral device, capability, and value model."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---
use crate::value::PayloadKind;

/// Error vocabulary shared by the model, marshalling, and interface crates.
///
/// Every fallible bridge operation returns one of these rather than panicking;
/// the orchestrator decides whether a failure aborts the device exposure or is
/// skipped with a logged diagnostic.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A required input was null, empty, or otherwise unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Assignment attempted between values of different payload kinds.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Kind declared by the value being written to.
        expected: PayloadKind,
        /// Kind of the value supplied by the caller.
        actual: PayloadKind,
    },
    /// The payload kind is outside the set supported on the bus.
    #[error("payload kind {0} is not supported on the bus")]
    NotImplemented(PayloadKind),
    /// Wire data inconsistent with the expected type tag.
    #[error("wire argument `{actual}` does not match expected kind {expected}")]
    Marshal {
        /// Kind the interface description promised.
        expected: PayloadKind,
        /// Signature tag of the argument actually received.
        actual: &'static str,
    },
    /// An object path did not resolve to a known property.
    #[error("object path does not resolve to a known property: {0:?}")]
    UnresolvedReference(String),
    /// Unknown signal or listener in a registry operation.
    #[error("invalid handle: {0}")]
    InvalidHandle(&'static str),
    /// Resource exhaustion while building a new interface description.
    #[error("allocation failed while building interface description")]
    AllocationFailed,
    /// The process ran out of memory.
    #[error("out of memory")]
    OutOfMemory,
}
