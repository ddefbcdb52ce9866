pub mod advance;
pub mod attendance;
pub mod deduction_rules;
pub mod invoice;
pub mod role;
pub mod salary;
pub mod user;
