pub mod grouping;
pub mod message;
pub mod summary;
