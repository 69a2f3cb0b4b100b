//! modelhub-adapter-postgres - PostgreSQL 适配器
//!
//! 实体仓储、过滤编译、事务管理、outbox 写入与读取、schema 迁移

mod connection;
mod entity_store;
mod error_mapper;
mod filter;
mod migration;
mod outbox;
mod transaction;

pub use connection::*;
pub use entity_store::*;
pub use error_mapper::*;
pub use filter::*;
pub use migration::*;
pub use outbox::*;
pub use transaction::*;
