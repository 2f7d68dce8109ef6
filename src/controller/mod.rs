//! UI-independent state machines behind the dashboard views.
//!
//! Controllers never talk to the network themselves. A view asks a controller
//! for a request (a [`SearchTicket`], an [`UploadRequest`], an application
//! number to withdraw), runs it through [`ops`], and hands the outcome back.

pub mod notify;
pub mod ops;
pub mod role;
pub mod search;
pub mod upload;
pub mod withdraw;

pub use notify::{Level, Notification, NotificationQueue};
pub use role::{Role, RoleGate};
pub use search::{Applied, SearchController, SearchPhase, SearchTicket};
pub use upload::{UploadController, UploadFinish, UploadPhase, UploadRequest};
pub use withdraw::{latest_iteration, withdraw_state, PendingWithdrawal, WithdrawFlow, WithdrawState};
