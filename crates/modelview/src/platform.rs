//! Hosts the binder can run against.

pub mod memory;

#[cfg(target_arch = "wasm32")]
pub mod browser;
