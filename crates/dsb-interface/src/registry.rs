//! ---
//! dsb_section: "04-interface-synthesis"
//! dsb_subsection: "module"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Dynamic bus interface synthesis and reuse cache."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use dsb_model::{Property, Result};
use dsb_wire::{bus_object_name, member_name, signature};

use crate::interface::{BusPropertyEntry, PropertyInterface};

struct RegistryState {
    interfaces: Vec<Arc<PropertyInterface>>,
    next_index: u32,
}

/// Append-only cache of synthesized interface descriptions.
///
/// The search-or-create step runs under one lock scope so two threads can
/// never race to create duplicate interfaces for the same type-multiset.
/// Activated descriptions live for the registry's lifetime; they are never
/// mutated or removed, even when no property references them anymore.
pub struct InterfaceRegistry {
    root: String,
    state: Mutex<RegistryState>,
}

impl InterfaceRegistry {
    /// Create a registry. `root` prefixes every synthesized interface name
    /// (e.g. `com.contoso.bridge`).
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            state: Mutex::new(RegistryState {
                interfaces: Vec::new(),
                next_index: 1,
            }),
        }
    }

    /// Snapshot of every activated description, in creation order.
    pub fn interfaces(&self) -> Vec<Arc<PropertyInterface>> {
        self.state.lock().interfaces.clone()
    }

    /// Obtain a bus interface description for `property`, reusing a cached
    /// one when its attribute signature multiset matches exactly.
    ///
    /// On a miss a new description is built: one read-write entry per
    /// attribute, the change-of-value annotation attached to every entry when
    /// `cov_supported` is set, and `secure` recorded for the interface
    /// creation boundary call. An attribute outside the supported kind set
    /// aborts the build with `NotImplemented`.
    pub fn synthesize(
        &self,
        property: &Property,
        cov_supported: bool,
        secure: bool,
    ) -> Result<Arc<PropertyInterface>> {
        // signatures are pure; compute them before taking the lock
        let mut signatures = Vec::with_capacity(property.attributes().len());
        for attribute in property.attributes() {
            signatures.push((attribute.name(), signature(attribute.kind())?));
        }

        let mut state = self.state.lock();
        if let Some(existing) = state
            .interfaces
            .iter()
            .find(|candidate| candidate.matches_property(property))
        {
            debug!(
                interface = %existing.name(),
                property = %property.name(),
                "reusing interface description"
            );
            return Ok(Arc::clone(existing));
        }

        let index = state.next_index;
        state.next_index += 1;

        let mut base = bus_object_name(property.name());
        if base.is_empty() {
            base = "property".to_owned();
        }
        let name = format!("{}.{}{}", self.root, base, index);

        let mut entries: Vec<BusPropertyEntry> = Vec::with_capacity(signatures.len());
        for (attribute_name, tag) in signatures {
            let member = unique_member_name(&entries, attribute_name);
            entries.push(BusPropertyEntry::new(member, tag, cov_supported));
        }

        let interface = Arc::new(PropertyInterface::activate(name, secure, entries));
        debug!(
            interface = %interface.name(),
            property = %property.name(),
            entries = interface.entries().len(),
            "activated new interface description"
        );
        state.interfaces.push(Arc::clone(&interface));
        Ok(interface)
    }
}

// Sanitised member name, de-duplicated within the interface by a counter
// suffix.
fn unique_member_name(entries: &[BusPropertyEntry], attribute_name: &str) -> String {
    let mut member = member_name(attribute_name);
    if member.is_empty() {
        member = "attr".to_owned();
    }
    if !entries.iter().any(|e| e.name() == member) {
        return member;
    }
    let mut suffix = 1u32;
    loop {
        let candidate = format!("{member}{suffix}");
        if !entries.iter().any(|e| e.name() == candidate) {
            return candidate;
        }
        suffix += 1;
    }
}
