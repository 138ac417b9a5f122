pub mod auth;
pub mod signature;
