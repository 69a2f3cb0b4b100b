//! modelhub-event-core - 事件核心库
//!
//! 实体变更事件与 outbox 中存储的事件记录

mod domain_event;
mod outbox_event;

pub use domain_event::*;
pub use outbox_event::*;
