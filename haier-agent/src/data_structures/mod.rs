mod device_states;

pub use device_states::{DeviceState, DeviceStates};
