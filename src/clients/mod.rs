pub mod inference;
pub mod messaging;
