//! HTTP endpoint handlers for user management.

pub mod create;
pub mod delete;
pub mod list;
pub mod roles;
pub mod update;

pub use create::{create_user_handler, self_signup_handler};
pub use delete::delete_user_handler;
pub use list::{get_user_handler, list_users_handler};
pub use roles::assign_role_handler;
pub use update::update_user_handler;
