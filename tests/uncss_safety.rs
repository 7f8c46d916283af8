mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::{Path, PathBuf};

use siteforge::errors::SiteforgeError;
use siteforge::fs::FileSystem;
use siteforge::fs::mock::MockFileSystem;
use siteforge_test_utils::builders::{ConfigFileBuilder, Harness, stock_site};

type TestResult = Result<(), Box<dyn Error>>;

/// The A/B/C safety property: used selectors survive, unused ones go,
/// ignored sources pass through untouched.
#[test]
fn analyzed_sheets_are_reduced_and_ignored_sheets_pass_through() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.add_file("dist/css/style.css", ".used{}\n.unused{}\n");
    fs.add_file("dist/css/fonts.googleapis.css", ".webfont{}\n");

    let cfg = ConfigFileBuilder::new()
        .steps(|s| {
            s.uncss.sources = vec!["css/*.css".to_string()];
        })
        .build();
    let harness = Harness::new(fs, cfg);
    // Canned reduction: the analyzer dropped `.unused`.
    harness.toolkit.selector_analyzer.set_reduced(".used{}");

    harness.composer().run("cleancss")?;

    let reduced = harness
        .fs
        .read_to_string(Path::new("dist/css/style.uncss.css"))?;
    assert!(reduced.contains(".used{}"));
    assert!(!reduced.contains(".unused"));
    // The ignored source's content survives verbatim.
    assert!(reduced.contains(".webfont{}"));

    // Only the non-ignored sheet reached the analyzer.
    let calls = harness.toolkit.selector_analyzer.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, PathBuf::from("dist/css/style.css"));
    Ok(())
}

#[test]
fn analyzer_receives_the_union_of_sampled_documents() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.add_file("dist/css/style.css", ".a{}\n");

    let cfg = ConfigFileBuilder::new()
        .steps(|s| {
            s.uncss.samples = vec![
                "site/index.html".to_string(),
                "site/pages/about.html".to_string(),
            ];
        })
        .build();
    let harness = Harness::new(fs, cfg);

    harness.composer().run("cleancss")?;

    let calls = harness.toolkit.selector_analyzer.calls();
    assert_eq!(
        calls[0].1,
        vec![
            PathBuf::from("src/site/index.html"),
            PathBuf::from("src/site/pages/about.html"),
        ]
    );
    Ok(())
}

#[test]
fn missing_sampled_document_is_a_missing_input() {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.add_file("dist/css/style.css", ".a{}\n");

    let cfg = ConfigFileBuilder::new()
        .steps(|s| s.uncss.samples = vec!["site/missing.html".to_string()])
        .build();
    let harness = Harness::new(fs, cfg);

    let err = harness.composer().run("cleancss").unwrap_err();
    let SiteforgeError::StepFailed { step, source, .. } = err else {
        panic!("expected StepFailed");
    };
    assert_eq!(step, "uncss");
    assert!(source.to_string().contains("missing.html"), "{source}");
}

#[test]
fn no_matching_stylesheets_is_a_missing_input() {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);

    let harness = Harness::new(fs, ConfigFileBuilder::new().build());
    let err = harness.composer().run("cleancss").unwrap_err();
    assert!(err.to_string().contains("uncss"), "{err}");
}
