// freefare-rs/freefare/src/device/mod.rs

pub mod builder;
pub mod handle;

pub use builder::DeviceBuilder;
pub use handle::{Device, Initialized, Uninitialized};
