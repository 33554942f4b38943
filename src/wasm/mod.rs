//! WebAssembly bindings for the 65el02 emulator.
//!
//! A thin JavaScript-facing wrapper over [`Machine`](crate::Machine) for
//! running 65el02 programs in the browser.

#[cfg(feature = "wasm")]
pub mod api;

#[cfg(feature = "wasm")]
pub use api::Emulator65el02;
