pub mod api;
pub mod controller;
pub mod export;
pub mod models;
pub mod table;
pub mod ui;
