#![cfg(unix)]

mod common;

use std::sync::Arc;

use common::{Answer, FakeSvn, ScriptedPrompt};
use svn_scm::{
    commands::{batch, pick::pick_repository, property::set_property_flow},
    core::{error::AppError, svn_error::SvnErrorCode},
};

/// Both working copies must be inside `svn add` at the same time; a call
/// that waits alone for 5s fails. The "locked" working copy then reports a
/// lock error.
const RENDEZVOUS: &str = r#"WC=$(basename "$(pwd -P)"); mkdir -p "$HERE/marks"; touch "$HERE/marks/$WC"; i=0; while [ "$(ls "$HERE/marks" | wc -l)" -lt 2 ]; do i=$((i+1)); if [ $i -gt 100 ]; then echo 'svn: E000001: ran alone' >&2; exit 1; fi; sleep 0.05; done; if [ "$WC" = locked ]; then echo "svn: E155004: Working copy '$WC' locked." >&2; exit 1; fi; echo "A  $3""#;

#[test]
fn groups_run_concurrently_and_fail_independently() {
    let fake = FakeSvn::new(&[("add", RENDEZVOUS)]);
    let registry = fake.registry();
    let healthy = fake.working_copy("healthy");
    let locked = fake.working_copy("locked");
    registry.register(&healthy);
    registry.register(&locked);

    let paths = vec![healthy.join("a.txt"), locked.join("b.txt")];
    let results = batch::add(&registry, &paths);

    assert_eq!(results.len(), 2);
    let (first, first_result) = &results[0];
    let (second, second_result) = &results[1];

    assert!(first.root().ends_with("healthy"));
    assert!(first_result.as_ref().unwrap().contains("a.txt"));

    assert!(second.root().ends_with("locked"));
    let err = second_result.as_ref().unwrap_err();
    assert_eq!(err.svn_code(), Some(SvnErrorCode::RepositoryIsLocked));

    let prompt = ScriptedPrompt::new([]);
    assert_eq!(batch::report(&results, &prompt), 1);
    assert_eq!(prompt.messages.borrow().len(), 1);
    assert!(prompt.messages.borrow()[0].contains("locked"));
}

#[test]
fn one_call_per_working_copy_and_strays_are_dropped() {
    let fake = FakeSvn::new(&[("revert", "echo reverted")]);
    let registry = fake.registry();
    let first = fake.working_copy("one");
    let second = fake.working_copy("two");
    registry.register(&first);
    registry.register(&second);

    let paths = vec![
        first.join("a"),
        second.join("b"),
        first.join("c"),
        fake.dir.path().join("elsewhere").join("d"),
    ];
    let results = batch::revert(&registry, &paths, false);

    assert_eq!(results.len(), 2);
    let reverts = fake.calls_to("revert");
    assert_eq!(reverts.len(), 2);

    let one = reverts.iter().find(|argv| argv.iter().any(|a| a.ends_with("/one/a"))).unwrap();
    assert!(one.iter().any(|a| a.ends_with("/one/c")));
    assert!(!reverts.iter().flatten().any(|a| a.contains("elsewhere")));
}

#[test]
fn patch_joins_diffs_in_group_order() {
    let fake = FakeSvn::new(&[("diff", "echo \"Index: $(basename \"$(pwd -P)\")\"")]);
    let registry = fake.registry();
    let first = fake.working_copy("alpha");
    let second = fake.working_copy("beta");
    registry.register(&first);
    registry.register(&second);

    let (patch, results) = batch::patch(&registry, &[second.join("x"), first.join("y")]);
    assert!(results.iter().all(|(_, r)| r.is_ok()));
    assert_eq!(patch, "Index: beta\nIndex: alpha");

    let diffs = fake.calls_to("diff");
    assert!(diffs.iter().all(|argv| argv.contains(&"--internal-diff".to_string())));
}

#[test]
fn pick_repository_three_ways() {
    let fake = FakeSvn::new(&[]);
    let registry = fake.registry();
    let prompt = ScriptedPrompt::new([Answer::Pick(Some(1)), Answer::Pick(None)]);

    let err = pick_repository(&registry, None, &prompt).unwrap_err();
    assert!(matches!(err, AppError::NoRepository(_)));

    let only = registry.register(&fake.working_copy("only"));
    let picked = pick_repository(&registry, None, &prompt).unwrap();
    assert!(Arc::ptr_eq(&picked, &only));

    let other = registry.register(&fake.working_copy("other"));
    let by_path = pick_repository(&registry, Some(&other.root().join("file.txt")), &prompt).unwrap();
    assert!(Arc::ptr_eq(&by_path, &other));
    assert_eq!(prompt.remaining(), 2, "exact and sole matches never prompt");

    // repositories() is sorted by root: "only" then "other"
    let chosen = pick_repository(&registry, None, &prompt).unwrap();
    assert!(Arc::ptr_eq(&chosen, &other));

    let err = pick_repository(&registry, None, &prompt).unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn marker_properties_are_set_without_asking_for_a_value() {
    let fake = FakeSvn::new(&[("propset", "echo \"property '$2' set\"")]);
    let registry = fake.registry();
    let wc = fake.working_copy("wc");
    registry.register(&wc);

    // index 2 is svn:executable
    let prompt = ScriptedPrompt::new([Answer::Pick(Some(2))]);
    let results = set_property_flow(&registry, &[wc.join("run.sh")], &prompt).unwrap();
    assert!(results.iter().all(|(_, r)| r.is_ok()));

    let calls = fake.calls_to("propset");
    assert_eq!(calls.len(), 1);
    assert_eq!(&calls[0][..3], &["propset".to_string(), "svn:executable".into(), "*".into()]);
}

#[test]
fn custom_property_asks_for_name_and_value() {
    let fake = FakeSvn::new(&[("propset", "true")]);
    let registry = fake.registry();
    let wc = fake.working_copy("wc");
    registry.register(&wc);

    let prompt = ScriptedPrompt::new([
        Answer::Pick(Some(5)),
        Answer::Input(Some("team:owner".to_string())),
        Answer::Input(Some("platform".to_string())),
    ]);
    set_property_flow(&registry, &[wc.join("lib.rs")], &prompt).unwrap();

    let calls = fake.calls_to("propset");
    assert_eq!(&calls[0][..3], &["propset".to_string(), "team:owner".into(), "platform".into()]);
}

#[test]
fn ignore_appends_to_the_existing_patterns() {
    let fake = FakeSvn::new(&[("propget", "printf '*.o\\nbuild\\n'"), ("propset", "true")]);
    let registry = fake.registry();
    let wc = fake.working_copy("wc");
    let repository = registry.register(&wc);

    repository.ignore(&wc.join("build.log"), None).unwrap();

    let calls = fake.calls_to("propset");
    assert_eq!(calls.len(), 1);
    assert_eq!(&calls[0][..3], &["propset".to_string(), "svn:ignore".into(), "*.o\nbuild\nbuild.log".into()]);
}

#[test]
fn missing_ignore_property_starts_an_empty_list() {
    let fake = FakeSvn::new(&[
        (
            "propget",
            "echo \"svn: warning: W200017: Property 'svn:ignore' not found on '$3'\" >&2; echo 'svn: E200000: A problem occurred; see other errors for details' >&2; exit 1",
        ),
        ("propset", "true"),
    ]);
    let registry = fake.registry();
    let wc = fake.working_copy("wc");
    let repository = registry.register(&wc);

    repository.ignore(&wc.join("build.log"), None).unwrap();

    let calls = fake.calls_to("propset");
    assert_eq!(calls.len(), 1);
    assert_eq!(&calls[0][..3], &["propset".to_string(), "svn:ignore".into(), "build.log".into()]);
}

#[test]
fn failed_propget_leaves_svn_ignore_untouched() {
    let fake = FakeSvn::new(&[
        ("propget", "echo 'svn: E200033: database is locked' >&2; exit 1"),
        ("propset", "true"),
    ]);
    let registry = fake.registry();
    let wc = fake.working_copy("wc");
    let repository = registry.register(&wc);

    let err = repository.ignore(&wc.join("build.log"), None).unwrap_err();
    let AppError::Svn(svn) = &err else {
        panic!("expected an svn error, got {err}");
    };
    assert!(svn.stderr.as_deref().unwrap_or("").contains("E200033"));
    assert!(fake.calls_to("propset").is_empty());
}
