mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::Path;

use siteforge::fs::FileSystem;
use siteforge::fs::mock::MockFileSystem;
use siteforge_test_utils::builders::{ConfigFileBuilder, Harness, stock_site};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn cleaning_a_nonexistent_destination_is_a_no_op() -> TestResult {
    init_tracing();

    // Fresh tree: dist/ does not exist at all.
    let fs = MockFileSystem::new();
    stock_site(&fs);
    let harness = Harness::new(fs, ConfigFileBuilder::new().with_pipeline("only_clean", &["clean"]).build());

    harness.composer().run("only_clean")?;
    Ok(())
}

#[test]
fn clean_group_removes_only_its_own_matches() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.add_file("dist/css/style.css", "old");
    fs.add_file("dist/css/style.uncss.css", "old");
    fs.add_file("dist/js/script.js", "old");
    fs.add_file("dist/index.html", "old");

    let cfg = ConfigFileBuilder::new()
        .with_pipeline("only_clean_styles", &["clean:styles"])
        .build();
    let harness = Harness::new(fs, cfg);
    harness.composer().run("only_clean_styles")?;

    assert!(!harness.fs.exists(Path::new("dist/css/style.css")));
    assert!(!harness.fs.exists(Path::new("dist/css/style.uncss.css")));
    assert!(harness.fs.exists(Path::new("dist/js/script.js")));
    assert!(harness.fs.exists(Path::new("dist/index.html")));
    Ok(())
}

#[test]
fn variantless_clean_removes_all_groups() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.add_file("dist/css/style.css", "old");
    fs.add_file("dist/js/script.js", "old");
    fs.add_file("dist/index.html", "old");
    // Not covered by any group's globs.
    fs.add_file("dist/data/feed.json", "{}");

    let cfg = ConfigFileBuilder::new()
        .with_pipeline("only_clean", &["clean"])
        .build();
    let harness = Harness::new(fs, cfg);
    harness.composer().run("only_clean")?;

    assert!(!harness.fs.exists(Path::new("dist/css/style.css")));
    assert!(!harness.fs.exists(Path::new("dist/js/script.js")));
    assert!(!harness.fs.exists(Path::new("dist/index.html")));
    assert!(harness.fs.exists(Path::new("dist/data/feed.json")));
    Ok(())
}

#[test]
fn clean_never_touches_the_source_tree() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.add_file("dist/index.html", "old");

    let cfg = ConfigFileBuilder::new()
        .with_pipeline("only_clean", &["clean"])
        .build();
    let harness = Harness::new(fs, cfg);
    harness.composer().run("only_clean")?;

    assert!(harness.fs.exists(Path::new("src/site/index.html")));
    assert!(harness.fs.exists(Path::new("src/css/legacy.css")));
    assert!(harness.fs.exists(Path::new("src/js/a.js")));
    Ok(())
}
