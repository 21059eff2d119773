//! ---
//! dsb_section: "04-interface-synthesis"
//! dsb_subsection: "module"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Dynamic bus interface synthesis and reuse cache."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---
use dsb_model::Property;
use dsb_wire::signature;

/// Change-of-value annotation attached to bus property entries when the
/// owning device supports change notification.
pub const EMIT_CHANGE_SIGNAL_ANNOTATION: &str =
    "org.freedesktop.DBus.Property.EmitsChangedSignal";
/// Annotation value marking change notification as enabled.
pub const ANNOTATION_TRUE: &str = "true";

/// Access mode of a synthesized bus property entry.
///
/// Every entry is read-write; adapters gate writes through the model's
/// type-preserving assignment instead of wire-level access flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Readable and writable over the bus.
    ReadWrite,
}

/// One attribute of a property, as exposed on the synthesized interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusPropertyEntry {
    name: String,
    signature: &'static str,
    access: Access,
    emits_changed: bool,
}

impl BusPropertyEntry {
    pub(crate) fn new(name: String, signature: &'static str, emits_changed: bool) -> Self {
        Self {
            name,
            signature,
            access: Access::ReadWrite,
            emits_changed,
        }
    }

    /// Sanitised, interface-unique member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wire type signature of the attribute.
    pub fn signature(&self) -> &'static str {
        self.signature
    }

    /// Access mode (always read-write).
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether the change-of-value annotation is attached.
    pub fn emits_changed(&self) -> bool {
        self.emits_changed
    }

    /// The annotation pair to register on the bus, when change notification
    /// is enabled for the owning device.
    pub fn annotation(&self) -> Option<(&'static str, &'static str)> {
        self.emits_changed
            .then_some((EMIT_CHANGE_SIGNAL_ANNOTATION, ANNOTATION_TRUE))
    }
}

/// Activated bus interface description.
///
/// Built once by the registry and frozen behind an `Arc`; there is no
/// mutation API after activation. Multiple properties whose attribute
/// type-multisets match share the same description.
#[derive(Debug, PartialEq, Eq)]
pub struct PropertyInterface {
    name: String,
    secure: bool,
    entries: Vec<BusPropertyEntry>,
}

impl PropertyInterface {
    pub(crate) fn activate(name: String, secure: bool, entries: Vec<BusPropertyEntry>) -> Self {
        Self {
            name,
            secure,
            entries,
        }
    }

    /// Fully qualified interface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the interface must be created through the secured boundary
    /// call. Opaque to this crate; forwarded to the transport binding.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Property entries in the fixed enumeration order.
    pub fn entries(&self) -> &[BusPropertyEntry] {
        &self.entries
    }

    /// Type-multiset match between this description and `property`.
    ///
    /// Every attribute must consume exactly one not-yet-consumed entry with
    /// an equal wire signature, and no entry may remain unconsumed: a
    /// bijection on signatures, ignoring names and order. A property with an
    /// attribute outside the supported kind set matches nothing.
    pub fn matches_property(&self, property: &Property) -> bool {
        let attributes = property.attributes();
        if attributes.len() != self.entries.len() {
            return false;
        }
        let mut consumed = vec![false; self.entries.len()];
        for attribute in attributes {
            let Ok(tag) = signature(attribute.kind()) else {
                return false;
            };
            let slot = self
                .entries
                .iter()
                .enumerate()
                .position(|(i, entry)| !consumed[i] && entry.signature() == tag);
            match slot {
                Some(i) => consumed[i] = true,
                None => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsb_model::{Payload, Value};

    fn interface(signatures: &[&'static str]) -> PropertyInterface {
        let entries = signatures
            .iter()
            .enumerate()
            .map(|(i, sig)| BusPropertyEntry::new(format!("attr{i}"), sig, false))
            .collect();
        PropertyInterface::activate("com.contoso.test1".into(), false, entries)
    }

    #[test]
    fn match_ignores_names_and_order() {
        let description = interface(&["d", "s"]);
        let property = Property::new("Humidity")
            .with_attribute(Value::new("Units", Payload::Str("percent".into())))
            .with_attribute(Value::new("Level", Payload::Double(40.0)));
        assert!(description.matches_property(&property));
    }

    #[test]
    fn match_is_a_bijection_on_signatures() {
        let description = interface(&["d", "d"]);
        let single = Property::new("Temperature")
            .with_attribute(Value::new("CurrentValue", Payload::Double(21.0)));
        assert!(!description.matches_property(&single));

        let pair = Property::new("Range")
            .with_attribute(Value::new("Low", Payload::Double(-40.0)))
            .with_attribute(Value::new("High", Payload::Double(85.0)));
        assert!(description.matches_property(&pair));

        let mixed = Property::new("Range")
            .with_attribute(Value::new("Low", Payload::Double(-40.0)))
            .with_attribute(Value::new("High", Payload::Int32(85)));
        assert!(!description.matches_property(&mixed));
    }

    #[test]
    fn unsupported_attribute_kind_matches_nothing() {
        let description = interface(&["s"]);
        let property = Property::new("Linked")
            .with_attribute(Value::new("Target", Payload::ObjectRef(None)));
        assert!(!description.matches_property(&property));
    }

    #[test]
    fn annotation_present_only_when_enabled() {
        let notifying = BusPropertyEntry::new("CurrentValue".into(), "d", true);
        assert_eq!(
            notifying.annotation(),
            Some((EMIT_CHANGE_SIGNAL_ANNOTATION, ANNOTATION_TRUE))
        );
        let silent = BusPropertyEntry::new("CurrentValue".into(), "d", false);
        assert_eq!(silent.annotation(), None);
        assert_eq!(silent.access(), Access::ReadWrite);
    }
}
