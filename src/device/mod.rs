//! Audio device capability boundary
//!
//! The session state machines talk to one `AudioDevice` behind a shared
//! handle, the way the original app drove a single recorder/player object.
//! The shipped implementation is a software loopback device; tests inject
//! scripted doubles through the same trait.

pub mod backend;
pub mod loopback;

pub use backend::{
    share, AudioDevice, DeviceConfig, DeviceFactory, DeviceFault, DeviceSource, PlaybackProgress,
    SharedDevice,
};
pub use loopback::LoopbackDevice;
