//! 交互接口
//!
//! 工作流只通过这个 trait 和用户交互，终端实现见 `ui::display::AppUI`

use crate::core::error::AppResult;

pub trait Prompt {
    /// Index of the chosen item, `None` when dismissed.
    fn pick(&self, title: &str, items: &[String]) -> AppResult<Option<usize>>;

    /// Free text, `None` when dismissed.
    fn input(&self, title: &str, secret: bool) -> AppResult<Option<String>>;

    fn confirm(&self, title: &str) -> AppResult<bool>;

    fn info(&self, msg: &str);

    fn warn(&self, msg: &str);

    fn error(&self, msg: &str);
}
