//! UI 相关的数据模型

use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::core::status::{Resource, Status};

pub struct SpinnerInfo {
    pub pb: ProgressBar,
}

impl SpinnerInfo {
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner();
        let frames = ["[=   ]","[==  ]","[=== ]","[ ===]","[  ==]","[   =]","[    ]","[   =]","[  ==]","[ ===]","[====]","[=== ]","[==  ]","[=   ]", "[    ]","    "];

        // the template is a constant; a parse failure falls back to the default style
        let style = ProgressStyle::default_spinner()
            .tick_strings(&frames)
            .template("{spinner:.blue.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);

        pb.enable_steady_tick(std::time::Duration::from_millis(50));
        SpinnerInfo { pb }
    }

    pub fn get_current_message(&self) -> String {
        format!("{} {}", "[WAIT]".cyan().bold(), self.pb.message())
    }
}

/// One line of the status table.
pub struct StatusRow {
    pub code: &'static str,
    pub path: String,
    pub changelist: Option<String>,
    pub color: comfy_table::Color,
}

impl StatusRow {
    pub fn from_resource(resource: &Resource, root: &std::path::Path) -> Self {
        let relative = resource.path.strip_prefix(root).unwrap_or(&resource.path);
        let mut path = relative.display().to_string();
        if let Some(source) = &resource.rename_source {
            let source = source.strip_prefix(root).unwrap_or(source);
            path = format!("{} (from {})", path, source.display());
        }

        let (code, color) = match resource.status {
            Status::Added => ("A", comfy_table::Color::Green),
            Status::Conflicted => ("C", comfy_table::Color::Red),
            Status::Deleted => ("D", comfy_table::Color::DarkRed),
            Status::External => ("X", comfy_table::Color::DarkGrey),
            Status::Ignored => ("I", comfy_table::Color::DarkGrey),
            Status::Incomplete => ("!", comfy_table::Color::DarkYellow),
            Status::Merged => ("G", comfy_table::Color::Cyan),
            Status::Missing => ("!", comfy_table::Color::DarkYellow),
            Status::Modified => ("M", comfy_table::Color::Yellow),
            Status::None | Status::Normal => (" ", comfy_table::Color::Reset),
            Status::Obstructed => ("~", comfy_table::Color::DarkYellow),
            Status::Replaced => ("R", comfy_table::Color::Magenta),
            Status::Unversioned => ("?", comfy_table::Color::DarkGrey),
        };

        // property-only changes show in the second column in svn; fold them in here
        let (code, color) = if code == " " && resource.props != Status::None && resource.props != Status::Normal {
            ("M", comfy_table::Color::Yellow)
        } else if resource.tree_conflicted {
            ("C", comfy_table::Color::Red)
        } else {
            (code, color)
        };

        StatusRow {
            code,
            path,
            changelist: resource.changelist.clone(),
            color,
        }
    }
}
