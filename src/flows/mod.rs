pub mod config;
pub mod processor;
pub mod processor_enums;
pub mod producers;
pub mod sources;
pub mod synthetic;
pub mod upstream;

pub use config::FlowsConfig;
pub use sources::DataSource;
