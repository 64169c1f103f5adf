//! ### 指令集合

pub mod batch;
pub mod branch;
pub mod commit;
pub mod conflicts;
pub mod credentials;
pub mod handlers;
pub mod pick;
pub mod prompt;
pub mod property;
pub mod registry;
pub mod resource_pair;
