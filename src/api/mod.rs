pub mod advance;
pub mod analytics;
pub mod attendance;
pub mod invoice;
pub mod payroll;
pub mod settings;
pub mod user;
