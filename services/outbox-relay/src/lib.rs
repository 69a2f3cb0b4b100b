//! outbox-relay - outbox 事件中继
//!
//! 轮询 outbox 表并把已提交的实体变更事件按顺序转发给下游

mod publisher;
mod sink;

pub use publisher::*;
pub use sink::*;
