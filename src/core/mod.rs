//! ### svn 执行引擎
//!
//! 进程执行、编码识别、错误分类、工作副本句柄和注册表

pub mod app;
pub mod encoding;
pub mod error;
pub mod info;
pub mod output;
pub mod registry;
pub mod repository;
pub mod settings;
pub mod status;
pub mod svn;
pub mod svn_error;
pub mod utils;
