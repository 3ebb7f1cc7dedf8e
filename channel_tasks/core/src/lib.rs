//! Core domain models and scheduling logic for channel and private task lists.
pub mod digest;
pub mod filter;
pub mod render;
pub mod task;

pub use digest::{DailyPrefs, DigestEntry, DigestSections, DigestSource, DigestState};
pub use filter::{Bucket, DayWindow, TaskFilter};
pub use render::ListingScope;
pub use task::{GroupId, TaskGroup, TaskId, TaskItem, TaskList, TaskListError, UserId};
