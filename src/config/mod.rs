//! Configuration and path management

pub mod paths;
pub mod settings;

pub use paths::Paths;
pub use settings::Settings;
