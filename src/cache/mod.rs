pub mod account;
pub mod app_metadata;
pub mod cache_manager;
pub mod credential;
pub mod id_token;
pub mod scopes;
pub mod token_response;
pub mod validity;
