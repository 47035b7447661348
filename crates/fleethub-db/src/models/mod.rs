//! Database models.

pub mod customer;
pub mod machine;
pub mod user_machine;
