use std::{path::Path, sync::Arc};

use crossterm::style::Stylize;

use crate::{
    core::{
        error::AppResult,
        output::{OutputChannel, Subscription},
        registry::Registry,
        settings::Settings,
        svn::Svn,
    },
    ui::display::AppUI,
};

pub struct App {
    pub ui: AppUI,
    pub settings: Settings,
    pub registry: Registry,
    _diagnostics: Option<Subscription>,
}

impl App {
    /// 找到 svn，打开 `folder` 下的工作副本
    /// `verbose` 时把执行的命令行和 stderr 打印到终端
    pub fn new(settings: Settings, folder: &Path, verbose: bool) -> AppResult<Self> {
        let output = OutputChannel::new();
        let diagnostics = verbose.then(|| {
            output.subscribe(|line| eprintln!("{}", line.trim_end().to_string().dark_grey()))
        });

        let svn = Svn::find(settings.svn.path.as_deref(), output, settings.default.encoding.clone())?;
        let registry = Registry::new(Arc::new(svn), settings.layout.clone());

        let found = registry.discover(folder, settings.discovery.depth)?;
        tracing::info!("Opened {} working cop{} under {}", found.len(), if found.len() == 1 { "y" } else { "ies" }, folder.display());

        Ok(App {
            ui: AppUI::new(),
            settings,
            registry,
            _diagnostics: diagnostics,
        })
    }
}
