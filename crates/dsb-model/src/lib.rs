//! ---
//! dsb_section: "02-device-model"
//! dsb_subsection: "module"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Vendor-neutral device, capability, and value model."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---
//! In-memory device model mirrored onto the bus by the bridge.
//! Adapters populate this model; the wire and interface crates translate
//! it without any adapter carrying protocol-specific knowledge.
#![warn(missing_docs)]

pub mod adapter;
pub mod capability;
pub mod device;
pub mod error;
pub mod value;

/// Shared result type for model operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

pub use adapter::{
    Adapter, SignalListener, CHANGE_OF_VALUE_SIGNAL, COV_ATTRIBUTE_HANDLE, COV_PROPERTY_HANDLE,
    DEVICE_ARRIVAL_SIGNAL, DEVICE_HANDLE_PARAM, DEVICE_REMOVAL_SIGNAL,
};
pub use capability::{Method, MethodStatus, Property, PropertyHandle, Signal, SignalId};
pub use device::{Device, DeviceDescriptor};
pub use error::BridgeError;
pub use value::{Payload, PayloadKind, Value};
