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
use uuid::Uuid;

use crate::value::Value;
use crate::{BridgeError, Result};

/// Opaque token identifying a property across the path-resolver boundary.
///
/// Generated once at property creation; never derived from memory addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyHandle(Uuid);

impl PropertyHandle {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PropertyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque token identifying a signal in the listener registry.
///
/// A signal's identity is this token, not its name; two signals may share a
/// name and still hold distinct listener sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalId(Uuid);

impl SignalId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SignalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Named, ordered bag of attribute values exposed as one bus interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    name: String,
    handle: PropertyHandle,
    attributes: Vec<Value>,
}

impl Property {
    /// Create an empty property. Attribute order is significant and stays
    /// stable for the property's lifetime.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: PropertyHandle::generate(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style attribute append.
    pub fn with_attribute(mut self, attribute: Value) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Append an attribute.
    pub fn add_attribute(&mut self, attribute: Value) {
        self.attributes.push(attribute);
    }

    /// Property name as declared by the adapter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolver token for this property.
    pub fn handle(&self) -> PropertyHandle {
        self.handle
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> &[Value] {
        &self.attributes
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.iter().find(|value| value.name() == name)
    }

    /// Mutable attribute lookup, used by the get/set paths.
    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.attributes
            .iter_mut()
            .find(|value| value.name() == name)
    }

    /// Copy attribute payloads from `other`, attribute by attribute.
    ///
    /// Both properties must declare the same number of attributes and each
    /// pairwise assignment must preserve the variant tag.
    pub fn set(&mut self, other: &Property) -> Result<()> {
        if self.attributes.len() != other.attributes.len() {
            return Err(BridgeError::InvalidArgument(
                "attribute count mismatch on property assignment",
            ));
        }
        for (target, source) in self.attributes.iter_mut().zip(other.attributes.iter()) {
            target.set(source)?;
        }
        Ok(())
    }
}

/// Status code recorded on a method after invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodStatus(u32);

impl MethodStatus {
    /// Invocation completed without error.
    pub const SUCCESS: MethodStatus = MethodStatus(0);

    /// Wrap an adapter-defined status code (0 = success).
    pub fn new(code: u32) -> Self {
        Self(code)
    }

    /// Raw status code.
    pub fn code(&self) -> u32 {
        self.0
    }

    /// Whether the invocation succeeded.
    pub fn is_success(&self) -> bool {
        self.0 == 0
    }
}

/// Callable capability with typed input and output parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    name: String,
    description: String,
    inputs: Vec<Value>,
    outputs: Vec<Value>,
    result: Option<MethodStatus>,
}

impl Method {
    /// Create a method. `result` stays `None` until invocation completes.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            result: None,
        }
    }

    /// Append an input parameter.
    pub fn add_input_param(&mut self, param: Value) {
        self.inputs.push(param);
    }

    /// Append an output parameter.
    pub fn add_output_param(&mut self, param: Value) {
        self.outputs.push(param);
    }

    /// Builder-style input append.
    pub fn with_input_param(mut self, param: Value) -> Self {
        self.inputs.push(param);
        self
    }

    /// Builder-style output append.
    pub fn with_output_param(mut self, param: Value) -> Self {
        self.outputs.push(param);
        self
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Input parameters in declaration order.
    pub fn inputs(&self) -> &[Value] {
        &self.inputs
    }

    /// Mutable input lookup by name.
    pub fn input_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.inputs.iter_mut().find(|value| value.name() == name)
    }

    /// Output parameters in declaration order.
    pub fn outputs(&self) -> &[Value] {
        &self.outputs
    }

    /// Mutable output lookup by name.
    pub fn output_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.outputs.iter_mut().find(|value| value.name() == name)
    }

    /// Invocation status; `None` before the method has been called.
    pub fn result(&self) -> Option<MethodStatus> {
        self.result
    }

    /// Record the invocation status.
    pub fn set_result(&mut self, status: MethodStatus) {
        self.result = Some(status);
    }
}

/// Event capability with typed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    name: String,
    id: SignalId,
    params: Vec<Value>,
}

impl Signal {
    /// Create a signal with a fresh identity token.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: SignalId::generate(),
            params: Vec::new(),
        }
    }

    /// Builder-style parameter append.
    pub fn with_param(mut self, param: Value) -> Self {
        self.params.push(param);
        self
    }

    /// Append a parameter.
    pub fn add_param(&mut self, param: Value) {
        self.params.push(param);
    }

    /// Signal name. Not an identity: two signals may share a name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry identity of this signal.
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.iter().find(|value| value.name() == name)
    }

    /// Mutable parameter lookup, used when raising the signal.
    pub fn param_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.params.iter_mut().find(|value| value.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Payload;

    #[test]
    fn property_keeps_attribute_order() {
        let property = Property::new("Temperature")
            .with_attribute(Value::new("CurrentValue", Payload::Double(20.0)))
            .with_attribute(Value::new("Units", Payload::Str("celsius".into())));
        let names: Vec<_> = property.attributes().iter().map(Value::name).collect();
        assert_eq!(names, ["CurrentValue", "Units"]);
    }

    #[test]
    fn property_set_is_pairwise_type_checked() {
        let mut target = Property::new("Temperature")
            .with_attribute(Value::new("CurrentValue", Payload::Double(20.0)));
        let source = Property::new("Temperature")
            .with_attribute(Value::new("CurrentValue", Payload::Str("oops".into())));
        assert!(matches!(
            target.set(&source),
            Err(BridgeError::TypeMismatch { .. })
        ));

        let shorter = Property::new("Temperature");
        assert!(matches!(
            target.set(&shorter),
            Err(BridgeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn signals_with_same_name_have_distinct_identity() {
        let first = Signal::new("Change_Of_Value");
        let second = Signal::new("Change_Of_Value");
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn method_result_undefined_before_invocation() {
        let mut method = Method::new("Reset", "Reset the device to defaults.");
        assert!(method.result().is_none());
        method.set_result(MethodStatus::SUCCESS);
        assert!(method.result().expect("set").is_success());
    }
}
