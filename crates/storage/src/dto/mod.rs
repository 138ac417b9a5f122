pub mod admin;
pub mod application;
pub mod common;
pub mod rating;
pub mod student;
