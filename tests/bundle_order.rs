mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::Path;

use proptest::prelude::*;
use siteforge::errors::SiteforgeError;
use siteforge::fs::FileSystem;
use siteforge::fs::mock::MockFileSystem;
use siteforge_test_utils::builders::{ConfigFileBuilder, Harness, stock_site};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn explicit_source_order_is_preserved_verbatim() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.add_file("src/js/c.js", "function c() { return 3; }\n");

    // Declared order deliberately disagrees with lexicographic order.
    let cfg = ConfigFileBuilder::new()
        .with_pipeline("only_concat", &["concat"])
        .steps(|s| {
            s.concat.sources = vec![
                "js/c.js".to_string(),
                "js/a.js".to_string(),
                "js/b.js".to_string(),
            ]
        })
        .build();
    let harness = Harness::new(fs, cfg);
    harness.composer().run("only_concat")?;

    let bundle = harness.fs.read_to_string(Path::new("dist/js/script.js"))?;
    let c_at = bundle.find("function c").unwrap();
    let a_at = bundle.find("function a").unwrap();
    let b_at = bundle.find("function b").unwrap();
    assert!(c_at < a_at && a_at < b_at, "declared order must win");
    Ok(())
}

#[test]
fn glob_sources_expand_in_lexicographic_order() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    // Inserted out of order on purpose; the mock preserves insertion order
    // in read_dir, the step must not.
    fs.add_file("src/js/z_last.js", "var z;\n");
    fs.add_file("src/js/0_first.js", "var zero;\n");

    let cfg = ConfigFileBuilder::new()
        .with_pipeline("only_concat", &["concat"])
        .build();
    let harness = Harness::new(fs, cfg);
    harness.composer().run("only_concat")?;

    let bundle = harness.fs.read_to_string(Path::new("dist/js/script.js"))?;
    let zero_at = bundle.find("var zero").unwrap();
    let a_at = bundle.find("function a").unwrap();
    let z_at = bundle.find("var z;").unwrap();
    assert!(zero_at < a_at && a_at < z_at);
    Ok(())
}

#[test]
fn separator_is_placed_between_parts() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_pipeline("only_concat", &["concat"])
        .build();
    let fs = MockFileSystem::new();
    stock_site(&fs);
    let harness = Harness::new(fs, cfg);
    harness.composer().run("only_concat")?;

    let bundle = harness.fs.read_to_string(Path::new("dist/js/script.js"))?;
    // Two stock scripts -> exactly one separator.
    assert_eq!(bundle.matches(";\n").count(), 1);
    Ok(())
}

#[test]
fn missing_explicit_script_is_a_missing_input() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_pipeline("only_concat", &["concat"])
        .steps(|s| s.concat.sources = vec!["js/gone.js".to_string()])
        .build();
    let fs = MockFileSystem::new();
    stock_site(&fs);

    let harness = Harness::new(fs, cfg);
    let err = harness.composer().run("only_concat").unwrap_err();
    let SiteforgeError::StepFailed { step, source, .. } = err else {
        panic!("expected StepFailed");
    };
    assert_eq!(step, "concat");
    assert!(source.to_string().contains("gone.js"), "{source}");
}

#[test]
fn minify_js_prepends_project_banner() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_pipeline("bundle", &["concat", "minify_js"])
        .build();
    let fs = MockFileSystem::new();
    stock_site(&fs);
    let harness = Harness::new(fs, cfg);
    harness.composer().run("bundle")?;

    let minified = harness
        .fs
        .read_to_string(Path::new("dist/js/script.min.js"))?;
    let banner = minified.lines().next().unwrap();
    assert!(banner.starts_with("/*!"), "{banner}");
    assert!(banner.contains("demo-site v1.2.3"), "{banner}");
    Ok(())
}

#[test]
fn rebundling_differs_only_in_the_banner() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_pipeline("bundle", &["concat", "minify_js"])
        .build();
    let fs = MockFileSystem::new();
    stock_site(&fs);
    let harness = Harness::new(fs, cfg);

    harness.composer().run("bundle")?;
    let first = harness
        .fs
        .read_to_string(Path::new("dist/js/script.min.js"))?;

    harness.composer().run("bundle")?;
    let second = harness
        .fs
        .read_to_string(Path::new("dist/js/script.min.js"))?;

    let body = |s: &str| s.splitn(2, '\n').nth(1).unwrap_or_default().to_string();
    assert_eq!(body(&first), body(&second));
    Ok(())
}

#[test]
fn minify_js_without_bundle_is_a_missing_input() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_pipeline("only_min", &["minify_js"])
        .build();
    let fs = MockFileSystem::new();
    stock_site(&fs);

    let harness = Harness::new(fs, cfg);
    let err = harness.composer().run("only_min").unwrap_err();
    assert!(err.to_string().contains("minify_js"), "{err}");
}

proptest! {
    /// Lexicographic expansion makes the bundle independent of directory
    /// enumeration order.
    #[test]
    fn glob_bundles_are_stable_across_insertion_orders(
        mut names in proptest::collection::hash_set("[a-z]{1,8}", 2..8),
    ) {
        init_tracing();

        let names: Vec<String> = names.drain().collect();

        let build_bundle = |ordered: &[String]| -> String {
            let fs = MockFileSystem::new();
            stock_site(&fs);
            for name in ordered {
                fs.add_file(
                    format!("src/js/{name}.js"),
                    format!("// {name}\n"),
                );
            }
            let cfg = ConfigFileBuilder::new()
                .with_pipeline("only_concat", &["concat"])
                .build();
            let harness = Harness::new(fs, cfg);
            harness.composer().run("only_concat").unwrap();
            harness
                .fs
                .read_to_string(Path::new("dist/js/script.js"))
                .unwrap()
        };

        let forward = build_bundle(&names);
        let mut reversed = names.clone();
        reversed.reverse();
        let backward = build_bundle(&reversed);

        prop_assert_eq!(forward, backward);
    }
}
