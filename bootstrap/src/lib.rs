//! modelhub-bootstrap - 统一启动骨架
//!
//! 运行时初始化、数据库连接与迁移、关闭信号

mod database;
mod runtime;

pub use database::*;
pub use runtime::*;
