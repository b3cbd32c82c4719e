//! In-process extension registry

mod host;

pub use host::ExtensionHost;
