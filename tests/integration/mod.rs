//! Integration tests against a mock admissions backend

pub mod client_contract;
pub mod controller_flow;
pub mod export_flow;
