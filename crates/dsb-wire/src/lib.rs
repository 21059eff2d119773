//! ---
//! dsb_section: "03-wire-marshalling"
//! dsb_subsection: "module"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Type-tagged value marshalling and bus-name sanitisation."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---
//! Marshalling engine for the bus boundary.
//! Pure, synchronous translation between model [`dsb_model::Value`]s and
//! wire arguments tagged with D-Bus-style type signatures, plus the name
//! sanitisation rules every bus-visible identifier must pass through.
#![warn(missing_docs)]

pub mod marshal;
pub mod names;
pub mod resolver;

pub use marshal::{from_wire, signature, to_wire, WireArg};
pub use names::{bus_object_name, member_name, service_name_segment};
pub use resolver::{NullResolver, PathResolver};
