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

use crate::capability::{Method, Property, PropertyHandle, Signal, SignalId};

/// Static identity block for a device.
///
/// The serial number is the stable key used for bus object path resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Device name.
    pub name: String,
    /// Manufacturer name.
    pub vendor: String,
    /// Model name.
    pub model: String,
    /// Firmware version string.
    pub firmware_version: String,
    /// Serial number; stable identity for path resolution.
    pub serial_number: String,
    /// Free-form device description.
    pub description: String,
}

/// One physical or virtual device exposed through the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    descriptor: DeviceDescriptor,
    properties: Vec<Property>,
    methods: Vec<Method>,
    signals: Vec<Signal>,
}

impl Device {
    /// Create a device from its descriptor with empty capability lists.
    pub fn new(descriptor: DeviceDescriptor) -> Self {
        Self {
            descriptor,
            properties: Vec::new(),
            methods: Vec::new(),
            signals: Vec::new(),
        }
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Manufacturer name.
    pub fn vendor(&self) -> &str {
        &self.descriptor.vendor
    }

    /// Model name.
    pub fn model(&self) -> &str {
        &self.descriptor.model
    }

    /// Firmware version string.
    pub fn firmware_version(&self) -> &str {
        &self.descriptor.firmware_version
    }

    /// Serial number; the path-resolution identity of this device.
    pub fn serial_number(&self) -> &str {
        &self.descriptor.serial_number
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        &self.descriptor.description
    }

    /// Full descriptor.
    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    /// Append a property.
    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Append a method.
    pub fn add_method(&mut self, method: Method) {
        self.methods.push(method);
    }

    /// Append a signal.
    pub fn add_signal(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    /// Builder-style property append.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Builder-style method append.
    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Builder-style signal append.
    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signals.push(signal);
        self
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Signals in declaration order.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Mutable property lookup by name.
    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.name() == name)
    }

    /// Look up a property by its resolver handle.
    pub fn property_by_handle(&self, handle: PropertyHandle) -> Option<&Property> {
        self.properties.iter().find(|p| p.handle() == handle)
    }

    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name() == name)
    }

    /// Mutable method lookup by name.
    pub fn method_mut(&mut self, name: &str) -> Option<&mut Method> {
        self.methods.iter_mut().find(|m| m.name() == name)
    }

    /// Look up a signal by its identity token.
    pub fn signal_by_id(&self, id: SignalId) -> Option<&Signal> {
        self.signals.iter().find(|s| s.id() == id)
    }

    /// Mutable signal lookup by identity token.
    pub fn signal_by_id_mut(&mut self, id: SignalId) -> Option<&mut Signal> {
        self.signals.iter_mut().find(|s| s.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Payload, Value};

    fn sensor() -> Device {
        Device::new(DeviceDescriptor {
            name: "Living Room Sensor #2".into(),
            vendor: "Contoso".into(),
            model: "LRS-2".into(),
            firmware_version: "1.0.4".into(),
            serial_number: "LRS2-0042".into(),
            description: "Combined temperature and humidity sensor.".into(),
        })
    }

    #[test]
    fn capability_lists_preserve_order() {
        let device = sensor()
            .with_property(
                Property::new("Temperature")
                    .with_attribute(Value::new("CurrentValue", Payload::Double(21.0))),
            )
            .with_property(
                Property::new("Humidity")
                    .with_attribute(Value::new("Level", Payload::Double(40.0))),
            );
        let names: Vec<_> = device.properties().iter().map(Property::name).collect();
        assert_eq!(names, ["Temperature", "Humidity"]);
    }

    #[test]
    fn property_lookup_by_handle() {
        let property = Property::new("Temperature");
        let handle = property.handle();
        let device = sensor().with_property(property);
        assert_eq!(
            device.property_by_handle(handle).map(Property::name),
            Some("Temperature")
        );
    }
}
