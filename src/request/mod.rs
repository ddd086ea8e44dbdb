pub mod auth_parameters;
pub mod authority;
