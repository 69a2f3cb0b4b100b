//! ports - 抽象 trait 层
//!
//! outbox 发布器依赖的存储与下游接口

mod event_publisher;
mod outbox;

pub use event_publisher::*;
pub use outbox::*;
