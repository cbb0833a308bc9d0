pub mod auth;
pub mod path;
