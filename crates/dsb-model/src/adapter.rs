//! ---
//! dsb_section: "02-device-model"
//! dsb_subsection: "module"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Vendor-neutral device, capability, and value model."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use tracing::{debug, error};

use crate::capability::{Method, MethodStatus, Property, Signal, SignalId};
use crate::device::Device;
use crate::value::{Payload, Value};
use crate::{BridgeError, Result};

/// Adapter-level signal raised when a device is added.
pub const DEVICE_ARRIVAL_SIGNAL: &str = "Device_Arrival";
/// Adapter-level signal raised when a device is removed.
pub const DEVICE_REMOVAL_SIGNAL: &str = "Device_Removal";
/// Parameter carrying the device serial number on arrival/removal signals.
pub const DEVICE_HANDLE_PARAM: &str = "Device_Handle";
/// Adapter-level signal raised when a property attribute changes.
pub const CHANGE_OF_VALUE_SIGNAL: &str = "Change_Of_Value";
/// Parameter linking the change-of-value signal to the changed property.
pub const COV_PROPERTY_HANDLE: &str = "Property_Handle";
/// Parameter naming the changed attribute on the change-of-value signal.
pub const COV_ATTRIBUTE_HANDLE: &str = "Attribute_Handle";

/// Callback invoked when a signal a listener registered for is raised.
///
/// Implementations run on the caller's thread with no adapter lock held;
/// a panicking listener is isolated and reported, never propagated to
/// sibling listeners.
pub trait SignalListener: Send + Sync {
    /// Deliver `signal` together with the context stored at registration.
    fn on_signal(&self, signal: &Signal, context: Option<&JsonValue>);
}

struct ListenerEntry {
    listener: Arc<dyn SignalListener>,
    context: Option<JsonValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Initialized,
    ShutDown,
}

struct AdapterState {
    lifecycle: Lifecycle,
    devices: Vec<Device>,
    signals: Vec<Signal>,
    listeners: IndexMap<SignalId, Vec<ListenerEntry>>,
}

impl AdapterState {
    fn owns_signal(&self, id: SignalId) -> bool {
        self.signals.iter().any(|s| s.id() == id)
            || self
                .devices
                .iter()
                .any(|d| d.signal_by_id(id).is_some())
    }

    fn find_signal(&self, id: SignalId) -> Option<&Signal> {
        self.signals
            .iter()
            .find(|s| s.id() == id)
            .or_else(|| self.devices.iter().find_map(|d| d.signal_by_id(id)))
    }

    fn device(&self, serial: &str) -> Result<&Device> {
        self.devices
            .iter()
            .find(|d| d.serial_number() == serial)
            .ok_or(BridgeError::InvalidHandle("unknown device serial number"))
    }

    fn device_mut(&mut self, serial: &str) -> Result<&mut Device> {
        self.devices
            .iter_mut()
            .find(|d| d.serial_number() == serial)
            .ok_or(BridgeError::InvalidHandle("unknown device serial number"))
    }

    fn snapshot_listeners(&self, id: SignalId) -> Vec<(Arc<dyn SignalListener>, Option<JsonValue>)> {
        self.listeners
            .get(&id)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| (Arc::clone(&entry.listener), entry.context.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Root of the in-memory model for one bridge instance.
///
/// Owns the device list, the adapter-level signals, and the signal listener
/// registry. All state mutations are serialized by one mutex scoped to a
/// single model operation; the lock is never held across a listener callback
/// or a call into the bus transport.
pub struct Adapter {
    vendor: String,
    name: String,
    version: String,
    state: Mutex<AdapterState>,
}

impl Adapter {
    /// Create an adapter and its well-known signals (device arrival, device
    /// removal, change of value).
    pub fn new(
        vendor: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let signals = vec![
            Signal::new(DEVICE_ARRIVAL_SIGNAL)
                .with_param(Value::new(DEVICE_HANDLE_PARAM, Payload::Str(String::new()))),
            Signal::new(DEVICE_REMOVAL_SIGNAL)
                .with_param(Value::new(DEVICE_HANDLE_PARAM, Payload::Str(String::new()))),
            Signal::new(CHANGE_OF_VALUE_SIGNAL)
                .with_param(Value::new(COV_PROPERTY_HANDLE, Payload::ObjectRef(None)))
                .with_param(Value::new(COV_ATTRIBUTE_HANDLE, Payload::Str(String::new()))),
        ];
        Self {
            vendor: vendor.into(),
            name: name.into(),
            version: version.into(),
            state: Mutex::new(AdapterState {
                lifecycle: Lifecycle::Created,
                devices: Vec::new(),
                signals,
                listeners: IndexMap::new(),
            }),
        }
    }

    /// Adapter vendor.
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Adapter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adapter version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Mark the adapter ready for bridging. Idempotent.
    pub fn initialize(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.lifecycle = Lifecycle::Initialized;
        debug!(adapter = %self.name, "adapter initialized");
        Ok(())
    }

    /// Whether the adapter is initialized and not shut down.
    pub fn is_initialized(&self) -> bool {
        self.state.lock().lifecycle == Lifecycle::Initialized
    }

    /// Tear the adapter down and drop every registered listener.
    pub fn shutdown(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.lifecycle = Lifecycle::ShutDown;
        state.listeners.clear();
        debug!(adapter = %self.name, "adapter shut down");
        Ok(())
    }

    /// Snapshot of the current device list, in registration order.
    pub fn devices(&self) -> Vec<Device> {
        self.state.lock().devices.clone()
    }

    /// Snapshot of the adapter-level signals.
    pub fn signals(&self) -> Vec<Signal> {
        self.state.lock().signals.clone()
    }

    /// Look up an adapter-level signal by name.
    pub fn signal(&self, name: &str) -> Option<Signal> {
        self.state
            .lock()
            .signals
            .iter()
            .find(|s| s.name() == name)
            .cloned()
    }

    /// Add a device and raise the arrival signal.
    ///
    /// Fails with `InvalidArgument` when a device with the same serial number
    /// is already registered.
    pub fn add_device(&self, device: Device) -> Result<()> {
        let (signal, targets) = {
            let mut state = self.state.lock();
            if state
                .devices
                .iter()
                .any(|d| d.serial_number() == device.serial_number())
            {
                return Err(BridgeError::InvalidArgument(
                    "device serial number already registered",
                ));
            }
            let serial = device.serial_number().to_owned();
            state.devices.push(device);
            self.arm_device_signal(&mut state, DEVICE_ARRIVAL_SIGNAL, &serial)?
        };
        self.dispatch(&signal, targets);
        Ok(())
    }

    /// Remove a device by serial number and raise the removal signal.
    ///
    /// Listeners registered on the removed device's signals are dropped.
    pub fn remove_device(&self, serial: &str) -> Result<Device> {
        let (device, signal, targets) = {
            let mut state = self.state.lock();
            let index = state
                .devices
                .iter()
                .position(|d| d.serial_number() == serial)
                .ok_or(BridgeError::InvalidHandle("unknown device serial number"))?;
            let device = state.devices.remove(index);
            for gone in device.signals() {
                state.listeners.shift_remove(&gone.id());
            }
            let (signal, targets) =
                self.arm_device_signal(&mut state, DEVICE_REMOVAL_SIGNAL, serial)?;
            (device, signal, targets)
        };
        self.dispatch(&signal, targets);
        Ok(device)
    }

    /// Read a whole property, attribute values included.
    pub fn get_property(&self, serial: &str, property_name: &str) -> Result<Property> {
        let state = self.state.lock();
        state
            .device(serial)?
            .property(property_name)
            .cloned()
            .ok_or(BridgeError::InvalidHandle("unknown property"))
    }

    /// Overwrite a property's attribute payloads from `source`.
    pub fn set_property(&self, serial: &str, source: &Property) -> Result<()> {
        let mut state = self.state.lock();
        state
            .device_mut(serial)?
            .property_mut(source.name())
            .ok_or(BridgeError::InvalidHandle("unknown property"))?
            .set(source)
    }

    /// Read a single attribute value of a property.
    pub fn get_property_value(
        &self,
        serial: &str,
        property_name: &str,
        attribute_name: &str,
    ) -> Result<Value> {
        let state = self.state.lock();
        state
            .device(serial)?
            .property(property_name)
            .ok_or(BridgeError::InvalidHandle("unknown property"))?
            .attribute(attribute_name)
            .cloned()
            .ok_or(BridgeError::InvalidHandle("unknown attribute"))
    }

    /// Write a single attribute value; the attribute is matched by
    /// `value.name()` and the assignment is type-preserving.
    pub fn set_property_value(
        &self,
        serial: &str,
        property_name: &str,
        value: &Value,
    ) -> Result<()> {
        let mut state = self.state.lock();
        state
            .device_mut(serial)?
            .property_mut(property_name)
            .ok_or(BridgeError::InvalidHandle("unknown property"))?
            .attribute_mut(value.name())
            .ok_or(BridgeError::InvalidHandle("unknown attribute"))?
            .set(value)
    }

    /// Invoke a device method in-memory.
    ///
    /// `request.inputs()` are written onto the device method's declared
    /// inputs (type-checked pairwise); the declared outputs are copied back
    /// into `request` and the result status is recorded on both.
    pub fn call_method(&self, serial: &str, request: &mut Method) -> Result<()> {
        let mut state = self.state.lock();
        let device = state.device_mut(serial)?;
        let target = device
            .method_mut(request.name())
            .ok_or(BridgeError::InvalidHandle("unknown method"))?;
        if target.inputs().len() != request.inputs().len() {
            return Err(BridgeError::InvalidArgument(
                "method input parameter count mismatch",
            ));
        }
        for param in request.inputs() {
            target
                .input_mut(param.name())
                .ok_or(BridgeError::InvalidHandle("unknown method input parameter"))?
                .set(param)?;
        }
        target.set_result(MethodStatus::SUCCESS);
        let outputs: Vec<Value> = target.outputs().to_vec();
        for output in outputs {
            if let Some(slot) = request.output_mut(output.name()) {
                slot.set(&output)?;
            }
        }
        request.set_result(MethodStatus::SUCCESS);
        Ok(())
    }

    /// Raise the change-of-value signal for one property attribute.
    pub fn raise_change_of_value(
        &self,
        serial: &str,
        property_name: &str,
        attribute_name: &str,
    ) -> Result<()> {
        let (signal, targets) = {
            let mut state = self.state.lock();
            let handle = {
                let device = state.device(serial)?;
                let property = device
                    .property(property_name)
                    .ok_or(BridgeError::InvalidHandle("unknown property"))?;
                property
                    .attribute(attribute_name)
                    .ok_or(BridgeError::InvalidHandle("unknown attribute"))?;
                property.handle()
            };
            let cov = state
                .signals
                .iter_mut()
                .find(|s| s.name() == CHANGE_OF_VALUE_SIGNAL)
                .ok_or(BridgeError::InvalidHandle("change-of-value signal missing"))?;
            if let Some(param) = cov.param_mut(COV_PROPERTY_HANDLE) {
                param.set_payload(Payload::ObjectRef(Some(handle)))?;
            }
            if let Some(param) = cov.param_mut(COV_ATTRIBUTE_HANDLE) {
                param.set_payload(Payload::Str(attribute_name.to_owned()))?;
            }
            let signal = cov.clone();
            let targets = state.snapshot_listeners(signal.id());
            (signal, targets)
        };
        self.dispatch(&signal, targets);
        Ok(())
    }

    /// Register `listener` for `signal`. Multiple listeners per signal are
    /// permitted; notification preserves registration order.
    pub fn register_signal_listener(
        &self,
        signal: &Signal,
        listener: Arc<dyn SignalListener>,
        context: Option<JsonValue>,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if !state.owns_signal(signal.id()) {
            return Err(BridgeError::InvalidHandle(
                "signal is not owned by this adapter",
            ));
        }
        state
            .listeners
            .entry(signal.id())
            .or_default()
            .push(ListenerEntry { listener, context });
        Ok(())
    }

    /// Remove a previously registered listener.
    ///
    /// Fails with `InvalidHandle` when the signal has no registrations or the
    /// listener was never registered for it.
    pub fn unregister_signal_listener(
        &self,
        signal: &Signal,
        listener: &Arc<dyn SignalListener>,
    ) -> Result<()> {
        let mut state = self.state.lock();
        let entries = state
            .listeners
            .get_mut(&signal.id())
            .ok_or(BridgeError::InvalidHandle("signal has no listeners"))?;
        let position = entries
            .iter()
            .position(|entry| Arc::ptr_eq(&entry.listener, listener))
            .ok_or(BridgeError::InvalidHandle(
                "listener not registered for signal",
            ))?;
        entries.remove(position);
        if entries.is_empty() {
            state.listeners.shift_remove(&signal.id());
        }
        Ok(())
    }

    /// Notify every listener registered for `signal`, in registration order.
    ///
    /// Succeeds (and does nothing) when no listener is registered; fails with
    /// `InvalidHandle` when the signal is not one this adapter owns. The
    /// current owned signal state is delivered, not the caller's clone.
    pub fn notify_signal_listener(&self, signal: &Signal) -> Result<()> {
        let (signal, targets) = {
            let state = self.state.lock();
            let owned = state
                .find_signal(signal.id())
                .ok_or(BridgeError::InvalidHandle(
                    "signal is not owned by this adapter",
                ))?
                .clone();
            let targets = state.snapshot_listeners(owned.id());
            (owned, targets)
        };
        self.dispatch(&signal, targets);
        Ok(())
    }

    fn arm_device_signal(
        &self,
        state: &mut AdapterState,
        name: &str,
        serial: &str,
    ) -> Result<(Signal, Vec<(Arc<dyn SignalListener>, Option<JsonValue>)>)> {
        let signal = state
            .signals
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or(BridgeError::InvalidHandle("well-known signal missing"))?;
        if let Some(param) = signal.param_mut(DEVICE_HANDLE_PARAM) {
            param.set_payload(Payload::Str(serial.to_owned()))?;
        }
        let signal = signal.clone();
        let targets = state.snapshot_listeners(signal.id());
        Ok((signal, targets))
    }

    // Fan-out happens with the adapter lock released. A panicking listener is
    // reported and skipped; remaining listeners still run.
    fn dispatch(
        &self,
        signal: &Signal,
        targets: Vec<(Arc<dyn SignalListener>, Option<JsonValue>)>,
    ) {
        for (listener, context) in targets {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                listener.on_signal(signal, context.as_ref());
            }));
            if outcome.is_err() {
                error!(signal = %signal.name(), "signal listener panicked during notification");
            }
        }
    }
}
