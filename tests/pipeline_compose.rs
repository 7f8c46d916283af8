mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::Path;

use siteforge::errors::SiteforgeError;
use siteforge::fs::FileSystem;
use siteforge::fs::mock::MockFileSystem;
use siteforge_test_utils::builders::{ConfigFileBuilder, Harness, stock_site};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn default_pipeline_resolves_in_declared_order() -> TestResult {
    init_tracing();

    let harness = Harness::stock();
    let plan = harness.composer().resolve("default")?;

    let ids: Vec<String> = plan.steps.iter().map(|s| s.to_string()).collect();
    assert_eq!(ids, ["includes", "clean:styles", "styles", "copy"]);
    assert!(!plan.enter_watch);
    Ok(())
}

#[test]
fn nested_aliases_flatten_left_to_right() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_pipeline("everything", &["default", "compress", "cleancss"])
        .build();
    let fs = MockFileSystem::new();
    stock_site(&fs);
    let harness = Harness::new(fs, cfg);

    let plan = harness.composer().resolve("everything")?;
    let ids: Vec<String> = plan.steps.iter().map(|s| s.to_string()).collect();
    assert_eq!(
        ids,
        ["includes", "clean:styles", "styles", "copy", "images", "uncss"]
    );
    Ok(())
}

#[test]
fn dev_pipeline_enters_watch_mode_after_its_steps() -> TestResult {
    init_tracing();

    let harness = Harness::stock();
    let plan = harness.composer().resolve("dev")?;

    assert!(plan.enter_watch);
    // The watch entry is a mode switch, not a step.
    let ids: Vec<String> = plan.steps.iter().map(|s| s.to_string()).collect();
    assert_eq!(ids, ["includes", "clean:styles", "styles", "copy"]);
    Ok(())
}

#[test]
fn unknown_pipeline_is_reported() {
    init_tracing();

    let harness = Harness::stock();
    let err = harness.composer().resolve("deploy").unwrap_err();
    assert!(matches!(err, SiteforgeError::UnknownPipeline(_)), "{err}");
}

#[test]
fn failing_step_aborts_and_names_pipeline_step_and_cause() {
    init_tracing();

    let harness = Harness::stock();
    harness
        .toolkit
        .style_compiler
        .fail_with("SyntaxError: unmatched brace in imports/base.less on line 12");

    let err = harness.composer().run("default").unwrap_err();
    let SiteforgeError::StepFailed {
        pipeline,
        step,
        source,
    } = err
    else {
        panic!("expected StepFailed, got {err}");
    };

    assert_eq!(pipeline, "default");
    assert_eq!(step, "styles");
    assert!(source.to_string().contains("line 12"), "{source}");
}

#[test]
fn steps_after_a_failure_do_not_run() {
    init_tracing();

    let harness = Harness::stock();
    harness.toolkit.style_compiler.fail_with("boom");

    // default = includes, clean:styles, styles, copy -- copy must not run.
    let _ = harness.composer().run("default").unwrap_err();

    assert!(harness.fs.exists(Path::new("dist/index.html")), "includes ran");
    assert!(
        !harness.fs.exists(Path::new("dist/css/legacy.css")),
        "copy must not run after the styles step failed"
    );
}

#[test]
fn reruns_are_idempotent_for_the_default_pipeline() -> TestResult {
    init_tracing();

    let harness = Harness::stock();
    harness.composer().run("default")?;
    let first_index = harness.fs.read_to_string(Path::new("dist/index.html"))?;
    let first_css = harness.fs.read_to_string(Path::new("dist/css/style.css"))?;

    harness.composer().run("default")?;
    let second_index = harness.fs.read_to_string(Path::new("dist/index.html"))?;
    let second_css = harness.fs.read_to_string(Path::new("dist/css/style.css"))?;

    assert_eq!(first_index, second_index);
    assert_eq!(first_css, second_css);
    Ok(())
}

#[test]
fn independent_composers_share_no_state() -> TestResult {
    init_tracing();

    // Two harnesses over separate filesystems; runs interleave freely.
    let a = Harness::stock();
    let b = Harness::stock();

    a.composer().run("refresh_html")?;
    b.composer().run("default")?;
    a.composer().run("default")?;

    assert!(a.fs.exists(Path::new("dist/css/style.css")));
    assert!(b.fs.exists(Path::new("dist/css/style.css")));
    Ok(())
}
