use std::{cell::RefCell, io, path::Path, sync::Arc};

use comfy_table::{Cell, ContentArrangement, Table, presets};
use crossterm::{cursor, execute, style::{self, SetForegroundColor, Stylize}};
use dialoguer::{Select, theme};
use unicode_width::UnicodeWidthStr;

use crate::{
    commands::prompt::Prompt,
    core::{
        error::{AppError, AppResult},
        info::LogEntry,
        repository::Repository,
        status::Resource,
        utils::{CursorGuard, format_relative_time},
    },
    ui::models::{SpinnerInfo, StatusRow},
};

pub struct AppUI {
    spinner: RefCell<Option<SpinnerInfo>>,
    dialoguer_color_theme: theme::ColorfulTheme,
    _cursor_guard: CursorGuard,
}

impl AppUI {
    pub fn new() -> Self {
        let mut color_theme = dialoguer::theme::ColorfulTheme::default();
        color_theme.success_prefix = dialoguer::console::style(String::from("[ OK ]")).green().bold().bright();
        color_theme.error_prefix = dialoguer::console::style(String::from("[ERR!]")).red().bright().bold();
        color_theme.prompt_prefix = dialoguer::console::style(String::from("[INFO]")).blue().bright().bold();
        color_theme.active_item_style = dialoguer::console::Style::new().for_stderr().green();
        color_theme.success_suffix = dialoguer::console::style(String::new());
        color_theme.prompt_style = dialoguer::console::Style::new().for_stderr();
        color_theme.prompt_suffix = dialoguer::console::style(String::new()).for_stderr().black().bright();
        color_theme.active_item_prefix = dialoguer::console::style(">".to_string()).for_stderr().green();

        AppUI {
            spinner: RefCell::new(None),
            dialoguer_color_theme: color_theme,
            _cursor_guard: CursorGuard::new(),
        }
    }

    /// 打印普通信息
    pub fn info(&self, msg: &str) {
        self.print_safe(format!("{} {}", "[INFO]".blue().bold(), msg));
    }

    /// 打印警告信息
    pub fn warn(&self, msg: &str) {
        self.print_safe(format!("{} {}", "[WARN]".dark_yellow().bold(), tint(msg, style::Color::Yellow)));
    }

    /// 打印成功信息
    pub fn success(&self, msg: &str) {
        self.finish_step();
        self.print_safe(format!("{} {}", "[ OK ]".green().bold(), msg));
    }

    /// 打印错误
    pub fn error(&self, msg: &str) {
        self.finish_step();
        self.print_safe(format!("{} {}", "[ERR!]".red().bold(), tint(msg, style::Color::Red)));
    }

    /// 原样输出 (diff / cat 的内容)
    pub fn print_raw(&self, text: &str) {
        self.finish_step();
        self.print_safe(text.trim_end().to_string());
    }

    /// 更新 spinner
    pub fn update_step(&self, msg: &str) {
        if let Some(pb_info) = self.spinner.borrow().as_ref() {
            pb_info.pb.set_message(msg.to_string());
            return;
        }
        self.start_step(msg);
    }

    /// status 显示
    pub fn show_status(&self, root: &Path, resources: &[Resource]) {
        self.finish_step();
        if resources.is_empty() {
            self.success(&format!("{} has no local changes", root.display()));
            return;
        }

        let mut table = self.create_clean_table();
        table.set_header([
            Cell::new("  ST").fg(comfy_table::Color::DarkGrey),
            Cell::new("PATH").fg(comfy_table::Color::DarkGrey),
            Cell::new("CHANGELIST").fg(comfy_table::Color::DarkGrey),
        ]);
        for column in table.column_iter_mut() {
            column.set_padding((0, 3));
        }

        for row in resources.iter().map(|r| StatusRow::from_resource(r, root)) {
            table.add_row([
                Cell::new(format!("  {}", row.code)).fg(row.color).add_attribute(comfy_table::Attribute::Bold),
                Cell::new(row.path).fg(row.color),
                Cell::new(row.changelist.unwrap_or_default()).fg(comfy_table::Color::DarkGrey),
            ]);
        }

        self.print_safe(format!("{}", table));
    }

    /// log 显示
    pub fn show_log(&self, log_entries: &[LogEntry]) {
        self.finish_step();
        let mut table = self.create_clean_table();

        let hander_cell1 = Cell::new("  REV").fg(comfy_table::Color::DarkGrey).add_attribute(comfy_table::Attribute::Bold);
        let hander_cell2 = Cell::new("AUTHOR").fg(comfy_table::Color::DarkGrey).add_attribute(comfy_table::Attribute::Bold);
        let hander_cell3 = Cell::new("DATE").fg(comfy_table::Color::DarkGrey).add_attribute(comfy_table::Attribute::Bold);
        let hander_cell4 = Cell::new("MESSAGE").fg(comfy_table::Color::DarkGrey).add_attribute(comfy_table::Attribute::Bold);
        table.set_header([hander_cell1, hander_cell2, hander_cell3, hander_cell4]);

        for column in table.column_iter_mut() {
            column.set_padding((0, 3));
        }

        for log in log_entries {
            // 多行提交信息只显示第一行
            let first_line = log.message.lines().next().unwrap_or("").to_string();
            table.add_row([
                Cell::new(format!("  r{}", log.revision)).fg(comfy_table::Color::Yellow),
                Cell::new(&log.author),
                Cell::new(format_relative_time(&log.date)).fg(comfy_table::Color::DarkGrey),
                Cell::new(first_line),
            ]);
        }

        self.print_safe(format!("{}", table));
    }

    /// 分支列表，当前分支以 `*` 标出
    pub fn show_branches(&self, branches: &[String], current: Option<usize>) {
        self.finish_step();
        let count = branches.len();
        for (i, name) in branches.iter().enumerate() {
            let prefix = if i == 0 {
                ""
            } else if i == count - 1 {
                "  └─ "
            } else {
                "  ├─ "
            };

            if Some(i) == current {
                self.print_safe(format!("{}{}", prefix, format!("* {}", name).yellow().bold()));
            } else {
                self.print_safe(format!("{}{}", prefix, name));
            }
        }
    }

    /// 已注册的工作副本
    pub fn show_repositories(&self, repositories: &[Arc<Repository>]) {
        if repositories.is_empty() {
            self.warn("No working copies are open");
            return;
        }

        let mut table = self.create_clean_table();
        table.set_header([
            Cell::new("  WORKING COPY").fg(comfy_table::Color::DarkGrey),
            Cell::new("OPENED FROM").fg(comfy_table::Color::DarkGrey),
        ]);
        for column in table.column_iter_mut() {
            column.set_padding((0, 3));
        }

        let width = repositories.iter().map(|r| r.root().display().to_string().width()).max().unwrap_or(0);
        for repository in repositories {
            let root = repository.root().display().to_string();
            table.add_row([
                Cell::new(format!("  {:<width$}", root, width = width)).fg(comfy_table::Color::Yellow),
                Cell::new(repository.workspace_root().display().to_string()).fg(comfy_table::Color::DarkGrey),
            ]);
        }

        self.print_safe(format!("{}", table));
    }

    /// 在 spinner 暂停期间运行交互控件
    fn suspended<T>(&self, f: impl FnOnce(Option<&str>) -> T) -> T {
        match self.spinner.borrow().as_ref() {
            Some(pb_info) => {
                let message = pb_info.get_current_message();
                pb_info.pb.suspend(|| f(Some(&message)))
            }
            None => f(None),
        }
    }

    /// 开启一个 selector，Esc / q 返回 None
    fn get_selector_result(&self, prompt: &str, items: &[String], message: Option<&str>) -> AppResult<Option<usize>> {
        let mut stderr_io = io::stderr();
        if let Some(msg) = message {
            execute!(stderr_io, crossterm::style::Print(msg), cursor::MoveLeft(msg.width() as u16)).ok();
        }

        println!("{} {}", "[INFO]".blue().bold(), prompt);
        let result = Select::with_theme(&self.dialoguer_color_theme)
            .default(0)
            .items(items)
            .interact_opt()
            .map_err(|e| AppError::Validation(e.to_string()));

        if let Ok(Some(index)) = &result {
            println!("{} Choose: {}", "[ OK ]".green().bold(), items[*index]);
        }
        execute!(stderr_io, cursor::Hide).ok();

        result
    }

    /// 开启一个 Input
    fn get_input_result(&self, prompt: &str, secret: bool, message: Option<&str>) -> AppResult<String> {
        let mut stderr_io = io::stderr();
        if let Some(msg) = message {
            execute!(stderr_io, crossterm::style::Print(msg), cursor::MoveLeft(msg.width() as u16)).ok();
        }
        execute!(stderr_io, cursor::Show).ok();

        let result = if secret {
            dialoguer::Password::with_theme(&self.dialoguer_color_theme)
                .with_prompt(prompt)
                .allow_empty_password(true)
                .interact()
        } else {
            dialoguer::Input::<String>::with_theme(&self.dialoguer_color_theme)
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
        };

        execute!(stderr_io, cursor::Hide).ok();
        result.map_err(|e| AppError::Validation(e.to_string()))
    }

    /// 开启一个 spinner
    fn start_step(&self, msg: &str) {
        self.finish_step();
        let spinner_info = SpinnerInfo::new();
        spinner_info.pb.set_message(msg.to_string());
        *self.spinner.borrow_mut() = Some(spinner_info);
    }

    /// 结束 spinner
    fn finish_step(&self) {
        if let Some(pb_info) = self.spinner.borrow_mut().take() {
            pb_info.pb.finish_and_clear();
        }
    }

    fn print_safe(&self, msg: String) {
        if let Some(pb_info) = self.spinner.borrow().as_ref() {
            pb_info.pb.suspend(|| println!("{}", msg));
        } else {
            println!("{}", msg);
        }
    }

    /// 创建一个无边框且动态宽度的表格
    fn create_clean_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }
}

impl Prompt for AppUI {
    fn pick(&self, title: &str, items: &[String]) -> AppResult<Option<usize>> {
        self.suspended(|message| self.get_selector_result(title, items, message))
    }

    fn input(&self, title: &str, secret: bool) -> AppResult<Option<String>> {
        self.suspended(|message| self.get_input_result(title, secret, message)).map(Some)
    }

    fn confirm(&self, title: &str) -> AppResult<bool> {
        let items = ["Yes".to_string(), "No".to_string()];
        Ok(self.pick(title, &items)? == Some(0))
    }

    fn info(&self, msg: &str) {
        AppUI::info(self, msg)
    }

    fn warn(&self, msg: &str) {
        AppUI::warn(self, msg)
    }

    fn error(&self, msg: &str) {
        AppUI::error(self, msg)
    }
}

/// Colors `msg` and re-applies the color after any reset embedded in it.
fn tint(msg: &str, color: style::Color) -> String {
    let style_prefix = format!("{}", SetForegroundColor(color));
    let reset_all = format!("{}", style::Attribute::Reset);
    let reset_fg = format!("{}", SetForegroundColor(style::Color::Reset));
    let restore_patch = format!("{}{}", reset_all, style_prefix);
    let fixed_msg = msg.replace(&reset_all, &restore_patch).replace(&reset_fg, &restore_patch);
    format!("{}{}{}", style_prefix, fixed_msg, reset_all)
}
