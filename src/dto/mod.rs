pub mod auth;
pub mod permissions;
pub mod segments;
pub mod shows;
