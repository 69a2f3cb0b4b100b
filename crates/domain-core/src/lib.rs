//! domain-core - 实体仓储共享的领域核心类型
//!
//! 通用实体记录 `Entity<K>`、实体种类注册 `EntityKind` 与过滤字段白名单，
//! 以及平台内置的四种实体：training、packaging、deployment、connection。

mod connection;
mod deployment;
mod entity;
mod filter;
mod packaging;
mod training;

pub use connection::*;
pub use deployment::*;
pub use entity::*;
pub use filter::*;
pub use packaging::*;
pub use training::*;
