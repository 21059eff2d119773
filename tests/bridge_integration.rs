//! ---
//! dsb_section: "15-testing-qa-runbook"
//! dsb_subsection: "integration-tests"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Integration and validation tests for the DSB stack."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---
//! End-to-end walk of the bridge core: an adapter populates the generic
//! model, the synthesizer derives bus interfaces, the marshalling engine
//! moves values across the boundary, and signal listeners observe change
//! notifications.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dsb_common::BridgeConfig;
use dsb_interface::InterfaceRegistry;
use dsb_model::{
    Adapter, Device, DeviceDescriptor, Payload, PayloadKind, Property, PropertyHandle, Signal,
    SignalListener, Value, CHANGE_OF_VALUE_SIGNAL, DEVICE_ARRIVAL_SIGNAL,
};
use dsb_wire::{bus_object_name, from_wire, service_name_segment, to_wire, PathResolver, WireArg};
use serde_json::Value as JsonValue;

/// Path resolver over a fixed device snapshot, laying objects out as
/// `/{root}/{device}/{property}` the way the orchestrator would.
struct SnapshotResolver {
    by_handle: HashMap<PropertyHandle, String>,
    by_path: HashMap<String, PropertyHandle>,
}

impl SnapshotResolver {
    fn new(root: &str, devices: &[Device]) -> Self {
        let mut by_handle = HashMap::new();
        let mut by_path = HashMap::new();
        for device in devices {
            for property in device.properties() {
                let path = format!(
                    "/{}/{}/{}",
                    root,
                    bus_object_name(device.name()),
                    bus_object_name(property.name())
                );
                by_handle.insert(property.handle(), path.clone());
                by_path.insert(path, property.handle());
            }
        }
        Self { by_handle, by_path }
    }
}

impl PathResolver for SnapshotResolver {
    fn resolve_path(&self, handle: PropertyHandle) -> Option<String> {
        self.by_handle.get(&handle).cloned()
    }

    fn resolve_property(&self, path: &str) -> Option<PropertyHandle> {
        self.by_path.get(path).copied()
    }
}

struct Observer {
    seen: Arc<Mutex<Vec<String>>>,
}

impl SignalListener for Observer {
    fn on_signal(&self, signal: &Signal, _context: Option<&JsonValue>) {
        self.seen.lock().expect("observer lock").push(
            signal
                .params()
                .iter()
                .fold(signal.name().to_owned(), |acc, p| {
                    format!("{acc}|{}", p.name())
                }),
        );
    }
}

fn sensor_device() -> Device {
    Device::new(DeviceDescriptor {
        name: "Living Room Sensor #2".into(),
        vendor: "Contoso".into(),
        model: "LRS-2".into(),
        firmware_version: "1.0.4".into(),
        serial_number: "LRS2-0042".into(),
        description: "Combined temperature and humidity sensor.".into(),
    })
    .with_property(
        Property::new("Temperature")
            .with_attribute(Value::new("CurrentValue", Payload::Double(21.0))),
    )
    .with_property(
        Property::new("Humidity").with_attribute(Value::new("Level", Payload::Double(40.0))),
    )
}

#[test]
fn device_exposure_end_to_end() {
    let config = BridgeConfig::default();
    let adapter = Adapter::new("Contoso", "SensorBridge", "0.1.0");
    adapter.initialize().expect("initialize");
    assert!(adapter.is_initialized());
    adapter.add_device(sensor_device()).expect("add device");

    // interface synthesis: both double-valued properties share one interface
    let registry = InterfaceRegistry::new(format!(
        "{}.{}",
        config.service.root_service_name,
        service_name_segment(adapter.name())
    ));
    let devices = adapter.devices();
    let device = &devices[0];
    let temperature = device.property("Temperature").expect("temperature");
    let humidity = device.property("Humidity").expect("humidity");

    let first = registry
        .synthesize(temperature, true, config.security.secure_access_required)
        .expect("synthesize temperature");
    let second = registry
        .synthesize(humidity, true, config.security.secure_access_required)
        .expect("synthesize humidity");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.entries().len(), 1);
    assert_eq!(first.entries()[0].signature(), "d");
    assert!(first.entries()[0].emits_changed());
    assert!(first.name().starts_with("com.contoso.SensorBridge."));

    // an incoming bus write marshals into the model
    let resolver = SnapshotResolver::new("contoso", &devices);
    let incoming = WireArg::Double(23.5);
    let payload = from_wire(&incoming, PayloadKind::Double, &resolver).expect("decode");
    adapter
        .set_property_value(
            "LRS2-0042",
            "Temperature",
            &Value::new("CurrentValue", payload),
        )
        .expect("bus write lands in the model");

    // and back out again for a property get
    let current = adapter
        .get_property_value("LRS2-0042", "Temperature", "CurrentValue")
        .expect("read back");
    let outgoing = to_wire(&current, &resolver).expect("encode");
    assert_eq!(outgoing, WireArg::Double(23.5));
}

#[test]
fn change_notification_reaches_bus_listeners() {
    let adapter = Adapter::new("Contoso", "SensorBridge", "0.1.0");
    adapter.add_device(sensor_device()).expect("add device");

    let cov = adapter.signal(CHANGE_OF_VALUE_SIGNAL).expect("cov signal");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let listener: Arc<dyn SignalListener> = Arc::new(Observer {
        seen: Arc::clone(&seen),
    });
    adapter
        .register_signal_listener(&cov, Arc::clone(&listener), None)
        .expect("register");

    adapter
        .set_property_value(
            "LRS2-0042",
            "Temperature",
            &Value::new("CurrentValue", Payload::Double(22.5)),
        )
        .expect("set value");
    adapter
        .raise_change_of_value("LRS2-0042", "Temperature", "CurrentValue")
        .expect("raise cov");

    let entries = seen.lock().expect("seen lock").clone();
    assert_eq!(
        entries,
        vec!["Change_Of_Value|Property_Handle|Attribute_Handle".to_owned()]
    );

    // the armed property handle marshals as a resolvable object path
    let devices = adapter.devices();
    let resolver = SnapshotResolver::new("contoso", &devices);
    let cov_now = adapter.signal(CHANGE_OF_VALUE_SIGNAL).expect("cov signal");
    let link = cov_now.param("Property_Handle").expect("cov property param");
    let wire = to_wire(link, &resolver).expect("encode handle");
    assert_eq!(
        wire,
        WireArg::Str("/contoso/Living_Room_Sensor_2/Temperature".into())
    );
    let decoded = from_wire(&wire, PayloadKind::ObjectRef, &resolver).expect("decode handle");
    assert_eq!(
        decoded,
        Payload::ObjectRef(Some(
            devices[0].property("Temperature").expect("prop").handle()
        ))
    );

    adapter
        .unregister_signal_listener(&cov, &listener)
        .expect("unregister");
    adapter
        .raise_change_of_value("LRS2-0042", "Temperature", "CurrentValue")
        .expect("raise again");
    assert_eq!(seen.lock().expect("seen lock").len(), 1);
}

#[test]
fn arrival_signal_fires_for_each_new_device() {
    let adapter = Adapter::new("Contoso", "SensorBridge", "0.1.0");
    let arrival = adapter.signal(DEVICE_ARRIVAL_SIGNAL).expect("arrival");
    let seen = Arc::new(Mutex::new(Vec::new()));
    adapter
        .register_signal_listener(
            &arrival,
            Arc::new(Observer {
                seen: Arc::clone(&seen),
            }),
            None,
        )
        .expect("register");

    adapter.add_device(sensor_device()).expect("add first");
    let mut descriptor = sensor_device().descriptor().clone();
    descriptor.serial_number = "LRS2-0043".into();
    adapter.add_device(Device::new(descriptor)).expect("add second");

    assert_eq!(seen.lock().expect("seen lock").len(), 2);
}

#[test]
fn bus_write_cannot_change_declared_types() {
    let adapter = Adapter::new("Contoso", "SensorBridge", "0.1.0");
    adapter.add_device(sensor_device()).expect("add device");

    // a peer sends a string where the interface promised a double
    let devices = adapter.devices();
    let resolver = SnapshotResolver::new("contoso", &devices);
    let bad = from_wire(&WireArg::Str("hot".into()), PayloadKind::Double, &resolver);
    assert!(bad.is_err());

    // even a pre-typed value of the wrong kind is rejected by the model
    let sneaky = Value::new("CurrentValue", Payload::Str("hot".into()));
    assert!(adapter
        .set_property_value("LRS2-0042", "Temperature", &sneaky)
        .is_err());
    let unchanged = adapter
        .get_property_value("LRS2-0042", "Temperature", "CurrentValue")
        .expect("read");
    assert_eq!(unchanged.payload(), &Payload::Double(21.0));
}
