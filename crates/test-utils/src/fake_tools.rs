//! Fake collaborator tools.
//!
//! Each fake is cheaply cloneable and shares its recorded state, so a test
//! can hand clones to a `ToolSet` and keep the originals for assertions.
//! Behaviour is data-driven: set a canned output or a canned failure, no
//! closures involved.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use siteforge::config::model::LintOptions;
use siteforge::fs::mock::MockFileSystem;
use siteforge::tools::{
    EncodeOptions, ImageEncoder, ImageFormat, LintViolation, Prefixer, ScriptLinter,
    ScriptMinifier, SelectorAnalyzer, StyleCompiler, StylesheetMinifier, ToolError, ToolResult,
    ToolSet,
};

fn canned<T: Clone>(tool: &str, result: &Result<T, String>) -> ToolResult<T> {
    result
        .clone()
        .map_err(|message| ToolError::new(tool, message))
}

#[derive(Clone)]
pub struct FakeStyleCompiler {
    result: Arc<Mutex<Result<String, String>>>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeStyleCompiler {
    pub fn returning(css: &str) -> Self {
        Self {
            result: Arc::new(Mutex::new(Ok(css.to_string()))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make subsequent compiles fail with the given diagnostic (e.g. a
    /// syntax error message carrying file/line context).
    pub fn fail_with(&self, message: &str) {
        *self.result.lock().unwrap() = Err(message.to_string());
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl StyleCompiler for FakeStyleCompiler {
    fn compile(&self, entry: &Path) -> ToolResult<String> {
        self.calls.lock().unwrap().push(entry.to_path_buf());
        canned("style_compiler", &self.result.lock().unwrap())
    }
}

#[derive(Clone, Default)]
pub struct FakePrefixer {
    browsers_seen: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakePrefixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn browsers_seen(&self) -> Vec<Vec<String>> {
        self.browsers_seen.lock().unwrap().clone()
    }
}

impl Prefixer for FakePrefixer {
    fn prefix(&self, css: &str, browsers: &[String]) -> ToolResult<String> {
        self.browsers_seen.lock().unwrap().push(browsers.to_vec());
        Ok(css.to_string())
    }
}

#[derive(Clone, Default)]
pub struct FakeStylesheetMinifier {
    keep_counts: Arc<Mutex<Vec<u32>>>,
}

impl FakeStylesheetMinifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keep_counts(&self) -> Vec<u32> {
        self.keep_counts.lock().unwrap().clone()
    }
}

impl StylesheetMinifier for FakeStylesheetMinifier {
    fn minify(&self, css: &str, keep_special_comments: u32) -> ToolResult<String> {
        self.keep_counts.lock().unwrap().push(keep_special_comments);
        // Whitespace-stripping stand-in; deterministic for idempotence tests.
        Ok(css.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

#[derive(Clone)]
pub struct FakeSelectorAnalyzer {
    result: Arc<Mutex<Result<String, String>>>,
    calls: Arc<Mutex<Vec<(PathBuf, Vec<PathBuf>)>>>,
}

impl FakeSelectorAnalyzer {
    pub fn returning(reduced: &str) -> Self {
        Self {
            result: Arc::new(Mutex::new(Ok(reduced.to_string()))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn fail_with(&self, message: &str) {
        *self.result.lock().unwrap() = Err(message.to_string());
    }

    /// Change the canned reduction result.
    pub fn set_reduced(&self, reduced: &str) {
        *self.result.lock().unwrap() = Ok(reduced.to_string());
    }

    /// `(stylesheet, documents)` per reduce call.
    pub fn calls(&self) -> Vec<(PathBuf, Vec<PathBuf>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl SelectorAnalyzer for FakeSelectorAnalyzer {
    fn reduce(&self, stylesheet: &Path, documents: &[PathBuf]) -> ToolResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((stylesheet.to_path_buf(), documents.to_vec()));
        canned("selector_analyzer", &self.result.lock().unwrap())
    }
}

#[derive(Clone, Default)]
pub struct FakeScriptLinter {
    violations: Arc<Mutex<Vec<LintViolation>>>,
    linted: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeScriptLinter {
    pub fn clean() -> Self {
        Self::default()
    }

    /// Report this finding for every subsequently linted file.
    pub fn add_violation(&self, file: &str, line: u32, message: &str) {
        self.violations.lock().unwrap().push(LintViolation {
            file: PathBuf::from(file),
            line: Some(line),
            message: message.to_string(),
        });
    }

    pub fn linted(&self) -> Vec<PathBuf> {
        self.linted.lock().unwrap().clone()
    }
}

impl ScriptLinter for FakeScriptLinter {
    fn lint(&self, file: &Path, _options: &LintOptions) -> ToolResult<Vec<LintViolation>> {
        self.linted.lock().unwrap().push(file.to_path_buf());
        Ok(self.violations.lock().unwrap().clone())
    }
}

#[derive(Clone, Default)]
pub struct FakeScriptMinifier {
    inputs: Arc<Mutex<Vec<String>>>,
}

impl FakeScriptMinifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl ScriptMinifier for FakeScriptMinifier {
    fn minify(&self, js: &str) -> ToolResult<String> {
        self.inputs.lock().unwrap().push(js.to_string());
        // Strip blank lines; enough to be visibly "minified" in asserts.
        Ok(js
            .lines()
            .filter(|l| !l.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Records encode calls and writes a marker output through the shared mock
/// filesystem, so newer-than checks see a real output file.
#[derive(Clone)]
pub struct FakeImageEncoder {
    fs: MockFileSystem,
    calls: Arc<Mutex<Vec<(ImageFormat, PathBuf, PathBuf, u8)>>>,
}

impl FakeImageEncoder {
    pub fn writing_to(fs: &MockFileSystem) -> Self {
        Self {
            fs: fs.clone(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// `(format, input, output, quality)` per encode call.
    pub fn calls(&self) -> Vec<(ImageFormat, PathBuf, PathBuf, u8)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageEncoder for FakeImageEncoder {
    fn encode(
        &self,
        format: ImageFormat,
        input: &Path,
        output: &Path,
        options: &EncodeOptions,
    ) -> ToolResult<()> {
        self.calls.lock().unwrap().push((
            format,
            input.to_path_buf(),
            output.to_path_buf(),
            options.quality,
        ));
        self.fs.add_file(output, b"encoded".to_vec());
        Ok(())
    }
}

/// One of every fake, pre-wired; `toolset()` clones them into a `ToolSet`
/// while the originals stay behind for assertions.
#[derive(Clone)]
pub struct FakeToolkit {
    pub style_compiler: FakeStyleCompiler,
    pub prefixer: FakePrefixer,
    pub css_minifier: FakeStylesheetMinifier,
    pub selector_analyzer: FakeSelectorAnalyzer,
    pub script_linter: FakeScriptLinter,
    pub script_minifier: FakeScriptMinifier,
    pub image_encoder: FakeImageEncoder,
}

impl FakeToolkit {
    pub fn new(fs: &MockFileSystem) -> Self {
        Self {
            style_compiler: FakeStyleCompiler::returning("body{color:red}"),
            prefixer: FakePrefixer::new(),
            css_minifier: FakeStylesheetMinifier::new(),
            selector_analyzer: FakeSelectorAnalyzer::returning(".kept{}"),
            script_linter: FakeScriptLinter::clean(),
            script_minifier: FakeScriptMinifier::new(),
            image_encoder: FakeImageEncoder::writing_to(fs),
        }
    }

    pub fn toolset(&self) -> ToolSet {
        ToolSet {
            style_compiler: Box::new(self.style_compiler.clone()),
            prefixer: Box::new(self.prefixer.clone()),
            css_minifier: Box::new(self.css_minifier.clone()),
            selector_analyzer: Box::new(self.selector_analyzer.clone()),
            script_linter: Box::new(self.script_linter.clone()),
            script_minifier: Box::new(self.script_minifier.clone()),
            image_encoder: Box::new(self.image_encoder.clone()),
        }
    }
}
