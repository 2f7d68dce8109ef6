//! Terminal front-end: one tab per dashboard page, driven by backend events.

pub mod app;
pub mod components;
pub mod dashboard;
pub mod events;
pub mod iterations;
pub mod layout;
pub mod records;
pub mod students;
pub mod view;

pub use app::{run_app, DashboardApp};
pub use events::{AppEvent, EventManager};
pub use view::{View, ViewContext};
