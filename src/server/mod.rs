//! 本地内容服务 - 基础设施层
//!
//! 在回环地址的临时端口上以静态文件方式提供解包后的课件

pub mod content_server;

pub use content_server::ContentServer;
