mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::Path;

use siteforge::fs::FileSystem;
use siteforge::fs::mock::MockFileSystem;
use siteforge_test_utils::builders::{ConfigFileBuilder, Harness, stock_site};

type TestResult = Result<(), Box<dyn Error>>;

fn site_with_asset_links() -> MockFileSystem {
    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.add_file(
        "src/site/index.html",
        "<html>\n<link rel=\"stylesheet\" href=\"../css/style.css\">\n<script src=\"../js/script.min.js\"></script>\n<img src=\"../images/logo.png\">\n</html>\n",
    );
    fs
}

#[test]
fn build_pipeline_rewrites_source_layout_paths() -> TestResult {
    init_tracing();

    let harness = Harness::new(site_with_asset_links(), ConfigFileBuilder::new().build());
    harness.composer().run("build")?;

    let index = harness.fs.read_to_string(Path::new("dist/index.html"))?;
    assert!(index.contains("href=\"css/style.css\""), "{index}");
    assert!(index.contains("src=\"js/script.min.js\""), "{index}");
    assert!(index.contains("src=\"images/logo.png\""), "{index}");
    assert!(!index.contains("../"), "{index}");
    Ok(())
}

#[test]
fn rewriting_twice_equals_rewriting_once() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_pipeline("only_rewrite", &["rewrite"])
        .build();
    let harness = Harness::new(site_with_asset_links(), cfg);

    harness.composer().run("build")?;
    let once = harness.fs.read_to_string(Path::new("dist/index.html"))?;

    harness.composer().run("only_rewrite")?;
    let twice = harness.fs.read_to_string(Path::new("dist/index.html"))?;

    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn custom_rules_apply_in_declared_order() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.add_file("dist/page.html", "<a href=\"../docs/x.html\">x</a>\n");

    let cfg = ConfigFileBuilder::new()
        .with_pipeline("only_rewrite", &["rewrite"])
        .steps(|s| {
            s.rewrite.rules = vec![siteforge::config::model::RewriteRule {
                from: "../docs/".to_string(),
                to: "docs/".to_string(),
            }]
        })
        .build();
    let harness = Harness::new(fs, cfg);
    harness.composer().run("only_rewrite")?;

    let page = harness.fs.read_to_string(Path::new("dist/page.html"))?;
    assert_eq!(page, "<a href=\"docs/x.html\">x</a>\n");
    Ok(())
}
