//! ---
//! dsb_section: "03-wire-marshalling"
//! dsb_subsection: "module"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Type-tagged value marshalling and bus-name sanitisation."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---
use dsb_model::PropertyHandle;

/// Bidirectional object-path <-> property resolution, supplied by the
/// orchestrator that owns the bus object layout.
///
/// Object-reference values marshal through this seam: encoding asks for the
/// referenced property's bus path, decoding maps a path string back to a
/// property handle.
pub trait PathResolver {
    /// Bus object path for `handle`, or `None` when the property is not
    /// exposed on the bus.
    fn resolve_path(&self, handle: PropertyHandle) -> Option<String>;

    /// Property handle for `path`, or `None` when no exposed property
    /// matches.
    fn resolve_property(&self, path: &str) -> Option<PropertyHandle>;
}

/// Resolver that resolves nothing, for adapters without object-reference
/// values.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl PathResolver for NullResolver {
    fn resolve_path(&self, _handle: PropertyHandle) -> Option<String> {
        None
    }

    fn resolve_property(&self, _path: &str) -> Option<PropertyHandle> {
        None
    }
}
