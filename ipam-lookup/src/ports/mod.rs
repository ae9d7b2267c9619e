pub mod registry;

pub use registry::RegistryClient;
