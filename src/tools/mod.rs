// src/tools/mod.rs

//! Capability interfaces for the external collaborators.
//!
//! The pipeline itself never parses CSS or JS and never encodes images; it
//! talks to one trait per delegated concern. Production implementations in
//! [`command`] shell out to the configured command templates; tests
//! substitute fakes.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::model::{LintOptions, ToolCommands};
use crate::errors::SiteforgeError;

pub mod command;

use command::{
    CommandImageEncoder, CommandPrefixer, CommandScriptLinter, CommandScriptMinifier,
    CommandSelectorAnalyzer, CommandStyleCompiler, CommandStylesheetMinifier,
};

/// Failure of a delegated tool.
///
/// `message` carries the tool's own diagnostics (stderr), so file/line
/// context from e.g. a stylesheet syntax error survives into the pipeline
/// error output.
#[derive(Debug, Clone)]
pub struct ToolError {
    pub tool: String,
    pub message: String,
}

impl ToolError {
    pub fn new(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tool, self.message)
    }
}

impl std::error::Error for ToolError {}

impl From<ToolError> for SiteforgeError {
    fn from(err: ToolError) -> Self {
        SiteforgeError::ToolFailure {
            tool: err.tool,
            message: err.message,
        }
    }
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// A single linter finding. Advisory: violations are reported, not fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintViolation {
    pub file: PathBuf,
    pub line: Option<u32>,
    pub message: String,
}

impl fmt::Display for LintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.file.display(), line, self.message),
            None => write!(f, "{}: {}", self.file.display(), self.message),
        }
    }
}

/// Options handed to an image encoder invocation.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    pub quality: u8,
    pub optimization_level: u8,
    pub progressive: bool,
}

/// Raster formats the image step dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

impl ImageFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }
}

/// Structured-stylesheet compiler: entry file in, plain stylesheet out.
/// Syntax errors come back as a `ToolError` carrying the tool's file/line
/// diagnostics.
pub trait StyleCompiler: Send + Sync {
    fn compile(&self, entry: &Path) -> ToolResult<String>;
}

/// Vendor prefixer for a given browser support matrix.
pub trait Prefixer: Send + Sync {
    fn prefix(&self, css: &str, browsers: &[String]) -> ToolResult<String>;
}

/// Stylesheet minifier. `keep_special_comments` bounds how many `/*! */`
/// comments survive; zero strips all of them.
pub trait StylesheetMinifier: Send + Sync {
    fn minify(&self, css: &str, keep_special_comments: u32) -> ToolResult<String>;
}

/// Unused-selector analyzer: reduces a stylesheet against the union of the
/// sampled documents. Must be conservative; the caller handles ignore-listed
/// sources before this is consulted.
pub trait SelectorAnalyzer: Send + Sync {
    fn reduce(&self, stylesheet: &Path, documents: &[PathBuf]) -> ToolResult<String>;
}

/// Static script checker. Returns findings without modifying anything.
pub trait ScriptLinter: Send + Sync {
    fn lint(&self, file: &Path, options: &LintOptions) -> ToolResult<Vec<LintViolation>>;
}

/// Behaviour-preserving script minifier.
pub trait ScriptMinifier: Send + Sync {
    fn minify(&self, js: &str) -> ToolResult<String>;
}

/// Format-dispatching image encoder. Writes the re-encoded image to
/// `output`.
pub trait ImageEncoder: Send + Sync {
    fn encode(
        &self,
        format: ImageFormat,
        input: &Path,
        output: &Path,
        options: &EncodeOptions,
    ) -> ToolResult<()>;
}

/// One implementation of every collaborator, bundled for the composer.
pub struct ToolSet {
    pub style_compiler: Box<dyn StyleCompiler>,
    pub prefixer: Box<dyn Prefixer>,
    pub css_minifier: Box<dyn StylesheetMinifier>,
    pub selector_analyzer: Box<dyn SelectorAnalyzer>,
    pub script_linter: Box<dyn ScriptLinter>,
    pub script_minifier: Box<dyn ScriptMinifier>,
    pub image_encoder: Box<dyn ImageEncoder>,
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSet").finish_non_exhaustive()
    }
}

impl ToolSet {
    /// Production tool set backed by the configured command templates.
    pub fn from_commands(commands: &ToolCommands) -> Self {
        Self {
            style_compiler: Box::new(CommandStyleCompiler::new(&commands.style_compiler)),
            prefixer: Box::new(CommandPrefixer::new(&commands.prefixer)),
            css_minifier: Box::new(CommandStylesheetMinifier::new(&commands.css_minifier)),
            selector_analyzer: Box::new(CommandSelectorAnalyzer::new(&commands.selector_analyzer)),
            script_linter: Box::new(CommandScriptLinter::new(&commands.script_linter)),
            script_minifier: Box::new(CommandScriptMinifier::new(&commands.script_minifier)),
            image_encoder: Box::new(CommandImageEncoder::new(
                &commands.jpeg_encoder,
                &commands.png_encoder,
                &commands.gif_encoder,
            )),
        }
    }
}
