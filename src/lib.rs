// library crate for ccond
// exposes the condition engine and the modules needed by auxiliary binaries (e.g., generate-man)

pub mod cli;
pub mod conditions;
pub mod config;
pub mod engine;

pub use engine::Engine;
