//! Business record types.
//!
//! Every type here is a [`ScopedEntity`](crate::repository::ScopedEntity)
//! stored in its own table and owned by exactly one tenant.

pub mod customer;
pub mod daily_log;
pub mod document;
pub mod follow_up_task;
pub mod goal;
pub mod invoice;
pub mod meeting;
pub mod message_template;
pub mod order;
pub mod partnership;
pub mod performance_metric;
pub mod supplier;
pub mod transaction;
