//! Request and response models for the user management API.

pub mod requests;
pub mod responses;

pub use requests::{AssignRoleRequest, CreateUserRequest, ListUsersQuery, UpdateUserRequest};
pub use responses::{CreateUserResponse, MachineAssignmentView, RoleAssignmentResult, UserProfile};
