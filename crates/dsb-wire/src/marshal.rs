//! ---
//! dsb_section: "03-wire-marshalling"
//! dsb_subsection: "module"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Type-tagged value marshalling and bus-name sanitisation."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---
use dsb_model::{BridgeError, Payload, PayloadKind, Result, Value};

use crate::resolver::PathResolver;

/// Protocol-level encoded form of a [`Value`], tagged by its signature.
///
/// The wire byte encoding itself belongs to the transport; this is the
/// logical argument the transport binding consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum WireArg {
    /// `b`
    Bool(bool),
    /// `y`
    Byte(u8),
    /// `n`
    Int16(i16),
    /// `q`
    UInt16(u16),
    /// `i`
    Int32(i32),
    /// `u`
    UInt32(u32),
    /// `x`
    Int64(i64),
    /// `t`
    UInt64(u64),
    /// `d`
    Double(f64),
    /// `s`
    Str(String),
    /// `as`
    StrArray(Vec<String>),
}

impl WireArg {
    /// Signature tag of this argument.
    pub fn signature(&self) -> &'static str {
        match self {
            WireArg::Bool(_) => "b",
            WireArg::Byte(_) => "y",
            WireArg::Int16(_) => "n",
            WireArg::UInt16(_) => "q",
            WireArg::Int32(_) => "i",
            WireArg::UInt32(_) => "u",
            WireArg::Int64(_) => "x",
            WireArg::UInt64(_) => "t",
            WireArg::Double(_) => "d",
            WireArg::Str(_) => "s",
            WireArg::StrArray(_) => "as",
        }
    }
}

/// Wire type signature for a payload kind.
///
/// Total and deterministic over the supported kind set; `ObjectRef` has no
/// direct signature (it marshals as a path string) and reports
/// `NotImplemented`, as would any kind added outside the supported set.
pub fn signature(kind: PayloadKind) -> Result<&'static str> {
    match kind {
        PayloadKind::Bool => Ok("b"),
        PayloadKind::UInt8 => Ok("y"),
        PayloadKind::Int16 => Ok("n"),
        PayloadKind::UInt16 => Ok("q"),
        PayloadKind::Int32 => Ok("i"),
        PayloadKind::UInt32 => Ok("u"),
        PayloadKind::Int64 => Ok("x"),
        PayloadKind::UInt64 => Ok("t"),
        PayloadKind::Double => Ok("d"),
        PayloadKind::Str => Ok("s"),
        PayloadKind::StrArray => Ok("as"),
        PayloadKind::ObjectRef => Err(BridgeError::NotImplemented(kind)),
    }
}

/// Encode a model value into a wire argument.
///
/// An empty string array is deliberately encoded as a one-element array
/// holding a single empty string, never as a zero-length array; existing
/// peers expect that legacy shape. Object references encode as the referenced
/// property's bus path, or the empty string when the resolver has no path.
pub fn to_wire(value: &Value, resolver: &dyn PathResolver) -> Result<WireArg> {
    let arg = match value.payload() {
        Payload::Bool(v) => WireArg::Bool(*v),
        Payload::UInt8(v) => WireArg::Byte(*v),
        Payload::Int16(v) => WireArg::Int16(*v),
        Payload::UInt16(v) => WireArg::UInt16(*v),
        Payload::Int32(v) => WireArg::Int32(*v),
        Payload::UInt32(v) => WireArg::UInt32(*v),
        Payload::Int64(v) => WireArg::Int64(*v),
        Payload::UInt64(v) => WireArg::UInt64(*v),
        Payload::Double(v) => WireArg::Double(*v),
        Payload::Str(v) => WireArg::Str(v.clone()),
        Payload::StrArray(v) => {
            if v.is_empty() {
                // legacy shape: one empty string, not a zero-length array
                WireArg::StrArray(vec![String::new()])
            } else {
                WireArg::StrArray(v.clone())
            }
        }
        Payload::ObjectRef(handle) => {
            let path = handle
                .and_then(|h| resolver.resolve_path(h))
                .unwrap_or_default();
            WireArg::Str(path)
        }
    };
    Ok(arg)
}

/// Decode a wire argument into a payload of `expected` kind.
///
/// The value being updated dictates the expected tag; the engine never
/// infers type from the wire data alone. A tag mismatch fails with
/// [`BridgeError::Marshal`]; an object path with no matching property fails
/// with [`BridgeError::UnresolvedReference`].
pub fn from_wire(
    arg: &WireArg,
    expected: PayloadKind,
    resolver: &dyn PathResolver,
) -> Result<Payload> {
    let mismatch = || BridgeError::Marshal {
        expected,
        actual: arg.signature(),
    };
    let payload = match expected {
        PayloadKind::Bool => match arg {
            WireArg::Bool(v) => Payload::Bool(*v),
            _ => return Err(mismatch()),
        },
        PayloadKind::UInt8 => match arg {
            WireArg::Byte(v) => Payload::UInt8(*v),
            _ => return Err(mismatch()),
        },
        PayloadKind::Int16 => match arg {
            WireArg::Int16(v) => Payload::Int16(*v),
            _ => return Err(mismatch()),
        },
        PayloadKind::UInt16 => match arg {
            WireArg::UInt16(v) => Payload::UInt16(*v),
            _ => return Err(mismatch()),
        },
        PayloadKind::Int32 => match arg {
            WireArg::Int32(v) => Payload::Int32(*v),
            _ => return Err(mismatch()),
        },
        PayloadKind::UInt32 => match arg {
            WireArg::UInt32(v) => Payload::UInt32(*v),
            _ => return Err(mismatch()),
        },
        PayloadKind::Int64 => match arg {
            WireArg::Int64(v) => Payload::Int64(*v),
            _ => return Err(mismatch()),
        },
        PayloadKind::UInt64 => match arg {
            WireArg::UInt64(v) => Payload::UInt64(*v),
            _ => return Err(mismatch()),
        },
        PayloadKind::Double => match arg {
            WireArg::Double(v) => Payload::Double(*v),
            _ => return Err(mismatch()),
        },
        PayloadKind::Str => match arg {
            WireArg::Str(v) => Payload::Str(v.clone()),
            _ => return Err(mismatch()),
        },
        PayloadKind::StrArray => match arg {
            WireArg::StrArray(v) => Payload::StrArray(v.clone()),
            _ => return Err(mismatch()),
        },
        PayloadKind::ObjectRef => match arg {
            WireArg::Str(path) => {
                let handle = resolver
                    .resolve_property(path)
                    .ok_or_else(|| BridgeError::UnresolvedReference(path.clone()))?;
                Payload::ObjectRef(Some(handle))
            }
            _ => return Err(mismatch()),
        },
    };
    Ok(payload)
}
