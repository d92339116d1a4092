pub mod audit_service;
pub mod auth_service;
pub mod permission_service;
pub mod role_service;
pub mod segment_service;
pub mod setup_service;
pub mod show_service;
