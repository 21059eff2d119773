//! ---
//! dsb_section: "02-device-model"
//! dsb_subsection: "module"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Vendor-neutral device, capability, and value model."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::capability::PropertyHandle;
use crate::{BridgeError, Result};

/// Closed set of payload variants a [`Value`] may carry.
///
/// The variant tag is fixed at creation time and determines the wire
/// signature for the value. Nested objects, maps, and arrays other than
/// string arrays are deliberately unsupported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// Boolean flag.
    Bool(bool),
    /// Unsigned byte.
    UInt8(u8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// IEEE-754 double.
    Double(f64),
    /// UTF-8 string.
    Str(String),
    /// Array of UTF-8 strings.
    StrArray(Vec<String>),
    /// Link to another property, marshalled as a resolvable path string.
    /// `None` means the link is currently unbound.
    ObjectRef(Option<PropertyHandle>),
}

impl Payload {
    /// Variant tag of this payload.
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Bool(_) => PayloadKind::Bool,
            Payload::UInt8(_) => PayloadKind::UInt8,
            Payload::Int16(_) => PayloadKind::Int16,
            Payload::UInt16(_) => PayloadKind::UInt16,
            Payload::Int32(_) => PayloadKind::Int32,
            Payload::UInt32(_) => PayloadKind::UInt32,
            Payload::Int64(_) => PayloadKind::Int64,
            Payload::UInt64(_) => PayloadKind::UInt64,
            Payload::Double(_) => PayloadKind::Double,
            Payload::Str(_) => PayloadKind::Str,
            Payload::StrArray(_) => PayloadKind::StrArray,
            Payload::ObjectRef(_) => PayloadKind::ObjectRef,
        }
    }
}

/// Fieldless mirror of [`Payload`] used for signatures and error reporting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// Boolean flag.
    Bool,
    /// Unsigned byte.
    UInt8,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// IEEE-754 double.
    Double,
    /// UTF-8 string.
    Str,
    /// Array of UTF-8 strings.
    StrArray,
    /// Link to another property.
    ObjectRef,
}

/// Named, type-tagged value attached to a property, method, or signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    name: String,
    payload: Payload,
}

impl Value {
    /// Create a value. The payload fixes the variant tag for the value's
    /// lifetime.
    pub fn new(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Value name as declared by the adapter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Variant tag of the current payload.
    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    /// Copy `other`'s payload into this value.
    ///
    /// Fails with [`BridgeError::TypeMismatch`] when the variant tags differ,
    /// so a bus-side write can never silently change a capability's declared
    /// type.
    pub fn set(&mut self, other: &Value) -> Result<()> {
        self.set_payload(other.payload.clone())
    }

    /// Replace the payload, keeping the variant tag.
    pub fn set_payload(&mut self, payload: Payload) -> Result<()> {
        if payload.kind() != self.payload.kind() {
            return Err(BridgeError::TypeMismatch {
                expected: self.payload.kind(),
                actual: payload.kind(),
            });
        }
        self.payload = payload;
        Ok(())
    }
}
