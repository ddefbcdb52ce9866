pub mod loader;
pub mod settlement;
