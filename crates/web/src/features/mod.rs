pub mod admin;
pub mod applications;
pub mod ratings;
pub mod students;
pub mod webhooks;
