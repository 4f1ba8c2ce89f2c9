pub mod client;
pub mod filter;
pub mod task;

pub use client::ClientRecord;
pub use filter::{PriorityFilter, StatusFilter, TaskFilter};
pub use task::{ParseEnumError, Priority, Task, TaskId, TaskStatus};
