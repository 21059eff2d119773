//! ---
//! dsb_section: "04-interface-synthesis"
//! dsb_subsection: "module"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Dynamic bus interface synthesis and reuse cache."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---
//! Interface synthesizer: turns a property's attribute list into a reusable
//! bus interface description. Properties with structurally identical
//! attribute type-multisets share one description; a description, once
//! activated, is immutable for the bridge's lifetime.
#![warn(missing_docs)]

pub mod interface;
pub mod registry;

pub use interface::{
    Access, BusPropertyEntry, PropertyInterface, ANNOTATION_TRUE, EMIT_CHANGE_SIGNAL_ANNOTATION,
};
pub use registry::InterfaceRegistry;
