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
fn expands_fragments_into_flattened_outputs() -> TestResult {
    init_tracing();

    let harness = Harness::stock();
    harness.composer().run("refresh_html")?;

    let index = harness.fs.read_to_string(Path::new("dist/index.html"))?;
    assert!(index.contains("<header>top</header>"));
    assert!(index.contains("<footer>bottom</footer>"));
    assert!(!index.contains("include"), "directives must be consumed");

    // pages/about.html flattens to the build root.
    let about = harness.fs.read_to_string(Path::new("dist/about.html"))?;
    assert!(about.contains("<header>top</header>"));
    assert!(!harness.fs.exists(Path::new("dist/pages/about.html")));
    Ok(())
}

#[test]
fn duplicate_fragment_is_emitted_once_in_first_reference_order() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.add_file(
        "src/site/index.html",
        "<!-- include \"header.html\" -->\nmiddle\n<!-- include \"footer.html\" -->\n<!-- include \"header.html\" -->\n",
    );

    let harness = Harness::new(fs, ConfigFileBuilder::new().build());
    harness.composer().run("refresh_html")?;

    let index = harness.fs.read_to_string(Path::new("dist/index.html"))?;
    assert_eq!(index.matches("<header>top</header>").count(), 1);
    assert_eq!(index.matches("<footer>bottom</footer>").count(), 1);

    let header_at = index.find("<header>").unwrap();
    let footer_at = index.find("<footer>").unwrap();
    assert!(header_at < footer_at, "first-reference order preserved");
    Ok(())
}

#[test]
fn duplicates_true_re_emits_fragments() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.add_file(
        "src/site/index.html",
        "<!-- include \"header.html\" -->\n<!-- include \"header.html\" -->\n",
    );

    let cfg = ConfigFileBuilder::new()
        .steps(|s| s.includes.duplicates = true)
        .build();
    let harness = Harness::new(fs, cfg);
    harness.composer().run("refresh_html")?;

    let index = harness.fs.read_to_string(Path::new("dist/index.html"))?;
    assert_eq!(index.matches("<header>top</header>").count(), 2);
    Ok(())
}

#[test]
fn missing_fragment_aborts_naming_fragment_and_template() {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.remove_file(Path::new("src/site/include/footer.html"))
        .unwrap();

    let harness = Harness::new(fs, ConfigFileBuilder::new().build());
    let err = harness.composer().run("refresh_html").unwrap_err();

    let SiteforgeError::StepFailed {
        pipeline,
        step,
        source,
    } = err
    else {
        panic!("expected StepFailed, got {err}");
    };
    assert_eq!(pipeline, "refresh_html");
    assert_eq!(step, "includes");

    let cause = source.to_string();
    assert!(cause.contains("footer.html"), "{cause}");
    assert!(cause.contains("index.html"), "{cause}");
}

#[test]
fn nested_fragments_expand_to_arbitrary_depth() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.add_file(
        "src/site/include/header.html",
        "<header>\n<!-- include \"nav.html\" -->\n</header>\n",
    );
    fs.add_file("src/site/include/nav.html", "<nav>links</nav>\n");

    let harness = Harness::new(fs, ConfigFileBuilder::new().build());
    harness.composer().run("refresh_html")?;

    let index = harness.fs.read_to_string(Path::new("dist/index.html"))?;
    assert!(index.contains("<nav>links</nav>"));
    Ok(())
}

#[test]
fn include_cycle_fails_naming_the_chain() {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    fs.add_file(
        "src/site/include/header.html",
        "<!-- include \"footer.html\" -->\n",
    );
    fs.add_file(
        "src/site/include/footer.html",
        "<!-- include \"header.html\" -->\n",
    );
    // duplicates = true so suppression doesn't mask the cycle.
    let cfg = ConfigFileBuilder::new()
        .steps(|s| s.includes.duplicates = true)
        .build();

    let harness = Harness::new(fs, cfg);
    let err = harness.composer().run("refresh_html").unwrap_err();
    assert!(err.to_string().contains("includes"), "{err}");

    let chain = format!("{:?}", anyhow::Error::new(err));
    assert!(chain.contains("cycle"), "{chain}");
}

#[test]
fn no_matching_templates_is_a_no_op() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    stock_site(&fs);
    let cfg = ConfigFileBuilder::new()
        .steps(|s| s.includes.sources = vec!["nonexistent/*.html".to_string()])
        .build();

    let harness = Harness::new(fs, cfg);
    harness.composer().run("refresh_html")?;
    assert!(!harness.fs.exists(Path::new("dist/index.html")));
    Ok(())
}
