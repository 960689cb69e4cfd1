pub mod reconciliation;
pub mod user_service;
