pub mod schema;

pub use schema::{ClassifierConfig, Config, NetworkConfig, TablesConfig};
