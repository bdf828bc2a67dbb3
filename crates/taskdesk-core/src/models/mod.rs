//! Data models for TaskDesk entities.
//!
//! - `Task`, `TaskDraft`, `StatusUpdate`: tasks and the bodies that change them
//! - `User`, `Invite`, `InviteRequest`, `RoleChange`: organization membership
//! - `TaskStats`: admin dashboard counters

pub mod stats;
pub mod task;
pub mod user;

pub use stats::TaskStats;
pub use task::{Assignee, StatusUpdate, Task, TaskCategory, TaskDraft, TaskPriority, TaskStatus};
pub use user::{Invite, InviteRequest, RoleChange, User};
