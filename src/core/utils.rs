//! ### 工具函数
//!

use std::{fmt::Display, io};

use chrono::{DateTime, Local};
use crossterm::execute;

use super::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Revision {
    Head,
    Base,
    Number(u64),
}

impl Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Head => write!(f, "HEAD"),
            Revision::Base => write!(f, "BASE"),
            Revision::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Accepts `HEAD`, `BASE`, `100` and `r100`.
pub fn parse_revision_arg(input: &str) -> AppResult<Revision> {
    let s = input.trim();

    if s.eq_ignore_ascii_case("HEAD") {
        return Ok(Revision::Head);
    }
    if s.eq_ignore_ascii_case("BASE") {
        return Ok(Revision::Base);
    }

    match s.trim_start_matches(['r', 'R']).parse() {
        Ok(n) => Ok(Revision::Number(n)),
        Err(_) => Err(AppError::Validation(format!("Failed to parse revision: {}", input))),
    }
}

/// 格式化相对时间显示
pub fn format_relative_time(iso_time: &str) -> String {
    let dt = match DateTime::parse_from_rfc3339(iso_time) {
        Ok(d) => d,
        Err(_) => return iso_time.to_string(),
    };

    let dt = dt.with_timezone(&Local);
    let diff = Local::now().signed_duration_since(dt);
    let secs = diff.num_seconds();

    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        format!("{} mins ago", diff.num_minutes())
    } else if secs < 86400 {
        format!("{} hours ago", diff.num_hours())
    } else {
        dt.format("%Y-%m-%d %H:%M").to_string()
    }
}

pub struct CursorGuard;

impl CursorGuard {
    pub fn new() -> Self {
        execute!(io::stderr(), crossterm::cursor::Hide).ok();
        CursorGuard
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        execute!(io::stderr(), crossterm::cursor::Show).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_revision_forms() {
        assert_eq!(parse_revision_arg("head").unwrap(), Revision::Head);
        assert_eq!(parse_revision_arg("BASE").unwrap(), Revision::Base);
        assert_eq!(parse_revision_arg("r100").unwrap(), Revision::Number(100));
        assert_eq!(parse_revision_arg(" 7 ").unwrap(), Revision::Number(7));
        assert!(parse_revision_arg("yesterday").is_err());
    }

    #[test]
    fn unparseable_time_is_returned_as_is() {
        assert_eq!(format_relative_time("not a date"), "not a date");
    }
}
