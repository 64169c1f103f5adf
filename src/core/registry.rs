//! ### 工作副本注册表
//!
//! 会话内唯一；根目录 -> `Repository`。负责把任意路径归属到工作副本，
//! 以及把一批路径按工作副本分组、并发执行。

use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
    sync::{Arc, RwLock},
    thread,
};

use crate::core::{
    error::{AppError, AppResult},
    info::parse_info,
    repository::Repository,
    settings::BranchLayout,
    svn::{ExecOptions, Svn},
};

/// Paths grouped under the working copy that owns them.
pub type Batch = Vec<(Arc<Repository>, Vec<PathBuf>)>;

pub struct Registry {
    svn: Arc<Svn>,
    layout: BranchLayout,
    repositories: RwLock<HashMap<PathBuf, Arc<Repository>>>,
}

impl Registry {
    pub fn new(svn: Arc<Svn>, layout: BranchLayout) -> Self {
        Registry {
            svn,
            layout,
            repositories: RwLock::new(HashMap::new()),
        }
    }

    pub fn svn(&self) -> &Arc<Svn> {
        &self.svn
    }

    /// Returns the existing handle when `root` is already registered.
    pub fn register(&self, root: &Path) -> Arc<Repository> {
        self.register_with_workspace(root, root)
    }

    pub fn register_with_workspace(&self, root: &Path, workspace_root: &Path) -> Arc<Repository> {
        let root = normalize(root);
        let mut repositories = self.repositories.write().unwrap_or_else(|e| e.into_inner());

        repositories
            .entry(root.clone())
            .or_insert_with(|| {
                tracing::debug!("Registered working copy {}", root.display());
                Arc::new(Repository::new(
                    root.clone(),
                    normalize(workspace_root),
                    self.svn.clone(),
                    self.layout.clone(),
                ))
            })
            .clone()
    }

    /// Drops the handle for `root`; returns whether it was registered.
    pub fn close(&self, root: &Path) -> bool {
        let root = normalize(root);
        let mut repositories = self.repositories.write().unwrap_or_else(|e| e.into_inner());
        repositories.remove(&root).is_some()
    }

    pub fn repositories(&self) -> Vec<Arc<Repository>> {
        let repositories = self.repositories.read().unwrap_or_else(|e| e.into_inner());
        let mut list: Vec<Arc<Repository>> = repositories.values().cloned().collect();
        list.sort_by(|a, b| a.root().cmp(b.root()));
        list
    }

    /// The handle whose root is the longest prefix of `path`.
    pub fn resolve(&self, path: &Path) -> Option<Arc<Repository>> {
        let path = normalize(path);
        let repositories = self.repositories.read().unwrap_or_else(|e| e.into_inner());

        repositories
            .iter()
            .filter(|(root, _)| path.starts_with(root))
            .max_by_key(|(root, _)| root.components().count())
            .map(|(_, repository)| repository.clone())
    }

    /// Groups `paths` by owning working copy, in first-seen order.
    /// Paths outside every working copy are skipped with a warning.
    pub fn group_by_repository<I, P>(&self, paths: I) -> Batch
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut batch: Batch = Vec::new();

        for path in paths {
            let path = normalize(path.as_ref());
            let Some(repository) = self.resolve(&path) else {
                tracing::warn!("{} is not inside a known working copy, skipping", path.display());
                continue;
            };

            match batch.iter_mut().find(|(r, _)| Arc::ptr_eq(r, &repository)) {
                Some((_, group)) => {
                    if !group.contains(&path) {
                        group.push(path);
                    }
                }
                None => batch.push((repository, vec![path])),
            }
        }

        batch
    }

    /// Runs `op` once per group, all groups at the same time. One group
    /// failing does not stop the others; results keep group order.
    pub fn dispatch<T, F>(&self, paths: &[PathBuf], op: F) -> Vec<(Arc<Repository>, AppResult<T>)>
    where
        T: Send,
        F: Fn(&Repository, &[PathBuf]) -> AppResult<T> + Sync,
    {
        let batch = self.group_by_repository(paths);
        let op = &op;

        thread::scope(|scope| {
            let handles: Vec<_> = batch
                .into_iter()
                .map(|(repository, group)| {
                    let worker = repository.clone();
                    let handle = scope.spawn(move || op(&worker, &group));
                    (repository, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(repository, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(AppError::Validation(format!(
                            "operation on {} panicked",
                            repository.root().display()
                        )))
                    });
                    (repository, result)
                })
                .collect()
        })
    }

    /// ### 发现工作副本
    /// `folder` 所在的工作副本（svn info），以及 `depth` 层以内带 `.svn` 的目录
    pub fn discover(&self, folder: &Path, depth: usize) -> AppResult<Vec<Arc<Repository>>> {
        let mut found = Vec::new();

        match self.svn.exec(folder, vec!["info".into(), "--xml".into()], ExecOptions::quiet()) {
            Ok(result) => {
                let info = parse_info(&result.stdout)?;
                let root = info.wc_root.unwrap_or_else(|| folder.to_path_buf());
                found.push(self.register_with_workspace(&root, folder));
            }
            Err(err) => tracing::debug!("{} is not a working copy itself: {}", folder.display(), err),
        }

        let walker = ignore::WalkBuilder::new(folder)
            .standard_filters(false)
            .hidden(false)
            .max_depth(Some(depth))
            .filter_entry(|entry| entry.file_name() != ".svn" && entry.file_name() != ".git")
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("Skipping part of {} during discovery: {}", folder.display(), err);
                    continue;
                }
            };
            let dir = entry.path();
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) || !dir.join(".svn").is_dir() {
                continue;
            }
            let repository = self.register_with_workspace(dir, folder);
            if !found.iter().any(|r| Arc::ptr_eq(r, &repository)) {
                found.push(repository);
            }
        }

        Ok(found)
    }
}

/// Absolute, with `.` and `..` segments collapsed lexically and trailing
/// separators removed. Symlinks are not resolved.
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() && !normalized.has_root() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::output::OutputChannel;

    fn registry() -> Registry {
        let svn = Svn::new(PathBuf::from("svn"), "1.14.3".into(), OutputChannel::new(), None);
        Registry::new(Arc::new(svn), BranchLayout::default())
    }

    #[test]
    fn register_is_idempotent() {
        let registry = registry();
        let first = registry.register(Path::new("/a"));
        let second = registry.register(Path::new("/a/"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.repositories().len(), 1);
    }

    #[test]
    fn resolve_picks_longest_root() {
        let registry = registry();
        let outer = registry.register(Path::new("/a"));
        let inner = registry.register(Path::new("/a/b"));

        let owner = registry.resolve(Path::new("/a/b/file.txt")).unwrap();
        assert!(Arc::ptr_eq(&owner, &inner));

        let owner = registry.resolve(Path::new("/a/c.txt")).unwrap();
        assert!(Arc::ptr_eq(&owner, &outer));

        let exact = registry.resolve(Path::new("/a/b")).unwrap();
        assert!(Arc::ptr_eq(&exact, &inner));
    }

    #[test]
    fn parent_segments_collapse_before_matching() {
        assert_eq!(normalize(Path::new("/a/b/../c.txt")), PathBuf::from("/a/c.txt"));
        assert_eq!(normalize(Path::new("/a/./b/../../d")), PathBuf::from("/d"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));

        let registry = registry();
        let outer = registry.register(Path::new("/a"));
        registry.register(Path::new("/a/b"));

        let owner = registry.resolve(Path::new("/a/b/../c.txt")).unwrap();
        assert!(Arc::ptr_eq(&owner, &outer));
        assert!(registry.resolve(Path::new("/a/../elsewhere/x")).is_none());
    }

    #[test]
    fn resolve_matches_whole_components_only() {
        let registry = registry();
        registry.register(Path::new("/a/b"));
        assert!(registry.resolve(Path::new("/a/bc/file.txt")).is_none());
    }

    #[test]
    fn grouping_keeps_first_seen_order_and_drops_strays() {
        let registry = registry();
        registry.register(Path::new("/one"));
        registry.register(Path::new("/two"));

        let batch = registry.group_by_repository([
            "/two/x.txt",
            "/one/y.txt",
            "/elsewhere/z.txt",
            "/two/w.txt",
            "/two/x.txt",
        ]);

        let shape: Vec<(PathBuf, Vec<PathBuf>)> = batch
            .iter()
            .map(|(r, paths)| (r.root().to_path_buf(), paths.clone()))
            .collect();
        assert_eq!(
            shape,
            vec![
                (PathBuf::from("/two"), vec![PathBuf::from("/two/x.txt"), PathBuf::from("/two/w.txt")]),
                (PathBuf::from("/one"), vec![PathBuf::from("/one/y.txt")]),
            ]
        );
    }

    #[test]
    fn dispatch_keeps_group_order_and_independent_results() {
        let registry = registry();
        registry.register(Path::new("/ok"));
        registry.register(Path::new("/bad"));

        let paths = vec![PathBuf::from("/ok/a"), PathBuf::from("/bad/b"), PathBuf::from("/ok/c")];
        let results = registry.dispatch(&paths, |repository, group| {
            if repository.root() == Path::new("/bad") {
                Err(AppError::Validation("boom".into()))
            } else {
                Ok(group.len())
            }
        });

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.root(), Path::new("/ok"));
        assert_eq!(results[0].1.as_ref().ok(), Some(&2));
        assert!(results[1].1.is_err());
    }

    #[test]
    fn close_forgets_the_handle() {
        let registry = registry();
        registry.register(Path::new("/a"));
        assert!(registry.close(Path::new("/a")));
        assert!(!registry.close(Path::new("/a")));
        assert!(registry.resolve(Path::new("/a/file")).is_none());
    }
}
