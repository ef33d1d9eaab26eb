// freefare-rs/freefare/src/device/builder.rs

//! Assembles a reader [`Device`] from a transport before tag discovery.

use crate::device::handle::{Device, Initialized, Uninitialized};
use crate::transport::Transport;
use crate::{Error, Result};

/// Collects the reader transport and produces a [`Device`] ready to list
/// and connect tags.
#[derive(Default)]
pub struct DeviceBuilder {
    transport: Option<Box<dyn Transport>>,
}

impl DeviceBuilder {
    pub fn new() -> Self {
        Self { transport: None }
    }

    /// Reader link that carries tag commands, such as a PC/SC bridge or
    /// `MockTransport` in tests.
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Device that still has to be initialized before tags can be listed.
    /// Fails with `DeviceNotFound` when no reader transport was given.
    pub fn build_uninitialized(self) -> Result<Device<Uninitialized>> {
        match self.transport {
            Some(t) => Device::new_with_transport(t),
            None => Err(Error::DeviceNotFound),
        }
    }

    /// Device ready for [`Device::tags`].
    pub fn build(self) -> Result<Device<Initialized>> {
        self.build_uninitialized()?.initialize()
    }
}
