pub mod client;
pub mod clients;
pub mod factory;
pub mod registry;

pub use client::{InvokeOptions, ProviderClient};
pub use factory::build_client;
pub use registry::{ProviderId, ProviderRegistry};
