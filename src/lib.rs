//! Run svn commands against one or more working copies.

pub mod commands;
pub mod core;
pub mod ui;
