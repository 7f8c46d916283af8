mod common;
use crate::common::init_tracing;

use std::error::Error;

use siteforge::config::load_and_validate;
use siteforge::errors::SiteforgeError;
use siteforge_test_utils::builders::ConfigFileBuilder;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn stock_configuration_validates() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new().try_build()?;
    assert!(cfg.pipelines.contains_key("default"));
    assert!(cfg.pipelines.contains_key("dev"));
    assert!(cfg.watch.contains_key("config"));
    Ok(())
}

#[test]
fn empty_toml_gets_full_defaults() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Siteforge.toml");
    std::fs::write(&path, "")?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.paths.src_root, std::path::PathBuf::from("src"));
    assert_eq!(cfg.paths.build_root, std::path::PathBuf::from("dist"));
    assert_eq!(cfg.steps.styles.keep_special_comments, 0);
    assert!(cfg.pipelines.contains_key("cleancss"));
    Ok(())
}

#[test]
fn toml_overrides_merge_with_defaults() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Siteforge.toml");
    std::fs::write(
        &path,
        r#"
[paths]
build_root = "public"

[steps.styles]
keep_special_comments = 1

[steps.images]
quality = 60
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.paths.build_root, std::path::PathBuf::from("public"));
    assert_eq!(cfg.steps.styles.keep_special_comments, 1);
    assert_eq!(cfg.steps.images.quality, 60);
    // Untouched sections keep their defaults.
    assert_eq!(cfg.steps.concat.separator, ";");
    Ok(())
}

#[test]
fn pipeline_alias_cycle_is_rejected() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .with_pipeline("a", &["b"])
        .with_pipeline("b", &["a"])
        .try_build()
        .unwrap_err();

    assert!(matches!(err, SiteforgeError::PipelineCycle(_)), "{err}");
}

#[test]
fn self_referencing_pipeline_is_rejected() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .with_pipeline("loop", &["loop"])
        .try_build()
        .unwrap_err();

    assert!(matches!(err, SiteforgeError::PipelineCycle(_)), "{err}");
}

#[test]
fn unknown_step_reference_is_rejected() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .with_pipeline("broken", &["includes", "compress_everything"])
        .try_build()
        .unwrap_err();

    assert!(matches!(err, SiteforgeError::UnknownStep(_)), "{err}");
}

#[test]
fn pipeline_name_colliding_with_step_is_rejected() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .with_pipeline("styles", &["includes"])
        .try_build()
        .unwrap_err();

    assert!(matches!(err, SiteforgeError::ConfigError(_)), "{err}");
}

#[test]
fn watch_entry_must_be_last() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .with_pipeline("bad", &["watch", "includes"])
        .try_build()
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("must be the last entry"), "{msg}");
}

#[test]
fn watch_entering_pipeline_cannot_be_nested() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .with_pipeline("outer", &["dev"])
        .try_build()
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("enters watch mode"), "{msg}");
}

#[test]
fn unknown_clean_group_variant_is_rejected() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .with_pipeline("bad", &["clean:nonexistent"])
        .try_build()
        .unwrap_err();

    assert!(err.to_string().contains("unknown clean group"), "{err}");
}

#[test]
fn variant_on_variantless_step_is_rejected() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .with_pipeline("bad", &["styles:fast"])
        .try_build()
        .unwrap_err();

    assert!(err.to_string().contains("takes no variant"), "{err}");
}

#[test]
fn watch_binding_must_reference_known_pipeline() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .with_watch_binding("extra", &["src/**/*.txt"], Some("nope"), false)
        .try_build()
        .unwrap_err();

    assert!(err.to_string().contains("unknown pipeline"), "{err}");
}

#[test]
fn watch_binding_cannot_dispatch_watch_entering_pipeline() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .with_watch_binding("extra", &["src/**/*.txt"], Some("dev"), false)
        .try_build()
        .unwrap_err();

    assert!(err.to_string().contains("cannot be watch-dispatched"), "{err}");
}

#[test]
fn second_reload_binding_is_rejected() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .with_watch_binding("another_config", &["Other.toml"], None, true)
        .try_build()
        .unwrap_err();

    assert!(
        err.to_string().contains("at most one watch binding"),
        "{err}"
    );
}

#[test]
fn reload_binding_with_pipeline_is_rejected() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .clear_watch_bindings()
        .with_watch_binding("config", &["Siteforge.toml"], Some("default"), true)
        .try_build()
        .unwrap_err();

    assert!(err.to_string().contains("take no pipeline"), "{err}");
}

#[test]
fn rewrite_rule_without_fixed_point_is_rejected() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .steps(|s| {
            s.rewrite.rules[0].from = "css/".to_string();
            s.rewrite.rules[0].to = "assets/css/".to_string();
        })
        .try_build()
        .unwrap_err();

    assert!(err.to_string().contains("fixed point"), "{err}");
}

#[test]
fn outputs_escaping_the_build_root_are_rejected() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .steps(|s| s.concat.output = "../elsewhere/script.js".to_string())
        .try_build()
        .unwrap_err();

    assert!(err.to_string().contains("stay inside"), "{err}");
}

#[test]
fn image_quality_above_100_is_rejected() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .steps(|s| s.images.quality = 101)
        .try_build()
        .unwrap_err();

    assert!(err.to_string().contains("quality"), "{err}");
}

#[test]
fn src_and_build_roots_must_differ() {
    init_tracing();

    let err = ConfigFileBuilder::new()
        .paths(|p| {
            p.src_root = "site".into();
            p.build_root = "site".into();
        })
        .try_build()
        .unwrap_err();

    assert!(err.to_string().contains("must differ"), "{err}");
}
