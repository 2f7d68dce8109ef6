//! Unit tests of public library behaviour

pub mod controllers;
pub mod table_schemas;
