//! Core trait definitions

mod platform;

pub use platform::Platform;
