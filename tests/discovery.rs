#![cfg(unix)]

mod common;

use std::{fs, os::unix::fs::PermissionsExt};

use common::FakeSvn;

fn outside_working_copy() -> FakeSvn {
    FakeSvn::new(&[("info", "echo \"svn: E155007: '$(pwd -P)' is not a working copy\" >&2; exit 1")])
}

#[test]
fn nested_working_copies_are_registered() {
    let fake = outside_working_copy();
    let folder = fake.working_copy("workspace");
    fs::create_dir_all(folder.join("app/.svn")).unwrap();
    fs::create_dir_all(folder.join("libs/core/.svn")).unwrap();
    fs::create_dir_all(folder.join("notes")).unwrap();

    let registry = fake.registry();
    let mut roots: Vec<_> = registry
        .discover(&folder, 3)
        .unwrap()
        .iter()
        .map(|r| r.root().to_path_buf())
        .collect();
    roots.sort();

    assert_eq!(roots, vec![folder.join("app"), folder.join("libs/core")]);
    assert_eq!(registry.repositories().len(), 2);
}

#[test]
fn unreadable_folder_still_discovers_the_rest() {
    let fake = outside_working_copy();
    let folder = fake.working_copy("workspace");
    fs::create_dir_all(folder.join("app/.svn")).unwrap();
    let sealed = folder.join("sealed");
    fs::create_dir_all(sealed.join("inner/.svn")).unwrap();
    fs::set_permissions(&sealed, fs::Permissions::from_mode(0o000)).unwrap();

    let registry = fake.registry();
    let found = registry.discover(&folder, 3);
    fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();

    let found = found.unwrap();
    assert!(found.iter().any(|r| r.root() == folder.join("app")));
}

#[test]
fn missing_folder_discovers_nothing() {
    let fake = outside_working_copy();
    let registry = fake.registry();

    let found = registry.discover(&fake.dir.path().join("gone"), 2).unwrap();
    assert!(found.is_empty());
    assert!(registry.repositories().is_empty());
}
