// src/tools/command.rs

//! Command-backed collaborator implementations.
//!
//! Each tool is a configured command template run through the platform
//! shell. Text-transforming tools read stdin and write stdout; path-based
//! tools get `{input}`/`{output}` substituted. Stderr is captured so a
//! failing tool's own diagnostics (file/line context) end up in the
//! pipeline error.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use regex::Regex;
use tracing::debug;

use crate::config::model::LintOptions;
use super::{
    EncodeOptions, ImageEncoder, ImageFormat, LintViolation, Prefixer, ScriptLinter,
    ScriptMinifier, SelectorAnalyzer, StyleCompiler, StylesheetMinifier, ToolError, ToolResult,
};

struct ShellOutput {
    status_code: i32,
    stdout: String,
    stderr: String,
}

/// Run a rendered command line through the platform shell, optionally
/// feeding `stdin`. Only spawn/IO problems are errors here; callers decide
/// what a nonzero exit means for their tool.
fn run_shell(tool: &str, cmdline: &str, stdin: Option<&str>) -> ToolResult<ShellOutput> {
    debug!(tool, cmd = %cmdline, "invoking external tool");

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmdline);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmdline);
        c
    };

    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|e| ToolError::new(tool, format!("failed to spawn '{cmdline}': {e}")))?;

    if let Some(input) = stdin {
        let mut handle = child
            .stdin
            .take()
            .ok_or_else(|| ToolError::new(tool, "failed to open tool stdin"))?;
        handle
            .write_all(input.as_bytes())
            .map_err(|e| ToolError::new(tool, format!("writing tool stdin: {e}")))?;
        // Drop closes stdin so the tool sees EOF.
    }

    let output = child
        .wait_with_output()
        .map_err(|e| ToolError::new(tool, format!("waiting for tool: {e}")))?;

    Ok(ShellOutput {
        status_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a command that must succeed, returning its stdout.
fn run_expecting_output(tool: &str, cmdline: &str, stdin: Option<&str>) -> ToolResult<String> {
    let out = run_shell(tool, cmdline, stdin)?;
    if out.status_code != 0 {
        let detail = if out.stderr.trim().is_empty() {
            out.stdout
        } else {
            out.stderr
        };
        return Err(ToolError::new(
            tool,
            format!("exit code {}: {}", out.status_code, detail.trim()),
        ));
    }
    Ok(out.stdout)
}

fn render(template: &str, substitutions: &[(&str, String)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in substitutions {
        rendered = rendered.replace(&format!("{{{key}}}"), value);
    }
    rendered
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

pub struct CommandStyleCompiler {
    template: String,
}

impl CommandStyleCompiler {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }
}

impl StyleCompiler for CommandStyleCompiler {
    fn compile(&self, entry: &Path) -> ToolResult<String> {
        let cmdline = render(&self.template, &[("input", path_arg(entry))]);
        run_expecting_output("style_compiler", &cmdline, None)
    }
}

pub struct CommandPrefixer {
    template: String,
}

impl CommandPrefixer {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }
}

impl Prefixer for CommandPrefixer {
    fn prefix(&self, css: &str, browsers: &[String]) -> ToolResult<String> {
        let cmdline = render(&self.template, &[("browsers", browsers.join(", "))]);
        run_expecting_output("prefixer", &cmdline, Some(css))
    }
}

pub struct CommandStylesheetMinifier {
    template: String,
}

impl CommandStylesheetMinifier {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }
}

impl StylesheetMinifier for CommandStylesheetMinifier {
    fn minify(&self, css: &str, keep_special_comments: u32) -> ToolResult<String> {
        let cmdline = render(
            &self.template,
            &[("keep_comments", keep_special_comments.to_string())],
        );
        run_expecting_output("css_minifier", &cmdline, Some(css))
    }
}

pub struct CommandSelectorAnalyzer {
    template: String,
}

impl CommandSelectorAnalyzer {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }
}

impl SelectorAnalyzer for CommandSelectorAnalyzer {
    fn reduce(&self, stylesheet: &Path, documents: &[PathBuf]) -> ToolResult<String> {
        let docs = documents
            .iter()
            .map(|d| path_arg(d))
            .collect::<Vec<_>>()
            .join(" ");
        let cmdline = render(
            &self.template,
            &[("input", path_arg(stylesheet)), ("documents", docs)],
        );
        run_expecting_output("selector_analyzer", &cmdline, None)
    }
}

pub struct CommandScriptLinter {
    template: String,
    line_pattern: Regex,
}

impl CommandScriptLinter {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
            // unix-reporter style: "file.js:12:3: message" (column optional)
            line_pattern: Regex::new(r"^(?P<file>.+?):(?P<line>\d+):(?:\d+:)?\s*(?P<msg>.+)$")
                .expect("lint line pattern is valid"),
        }
    }

    fn parse_violations(&self, output: &str) -> Vec<LintViolation> {
        output
            .lines()
            .filter_map(|line| {
                let caps = self.line_pattern.captures(line.trim())?;
                Some(LintViolation {
                    file: PathBuf::from(&caps["file"]),
                    line: caps["line"].parse().ok(),
                    message: caps["msg"].to_string(),
                })
            })
            .collect()
    }
}

impl ScriptLinter for CommandScriptLinter {
    fn lint(&self, file: &Path, options: &LintOptions) -> ToolResult<Vec<LintViolation>> {
        let cmdline = render(
            &self.template,
            &[
                ("input", path_arg(file)),
                ("curly", options.curly.to_string()),
                ("globals", options.globals.join(",")),
            ],
        );

        let out = run_shell("script_linter", &cmdline, None)?;
        if out.status_code == 0 {
            return Ok(Vec::new());
        }

        // Linters exit nonzero when they have findings; only an exit with
        // no parseable findings is treated as a tool failure.
        let violations = self.parse_violations(&out.stdout);
        if violations.is_empty() {
            let detail = if out.stderr.trim().is_empty() {
                out.stdout
            } else {
                out.stderr
            };
            return Err(ToolError::new(
                "script_linter",
                format!("exit code {}: {}", out.status_code, detail.trim()),
            ));
        }
        Ok(violations)
    }
}

pub struct CommandScriptMinifier {
    template: String,
}

impl CommandScriptMinifier {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }
}

impl ScriptMinifier for CommandScriptMinifier {
    fn minify(&self, js: &str) -> ToolResult<String> {
        run_expecting_output("script_minifier", &self.template, Some(js))
    }
}

pub struct CommandImageEncoder {
    jpeg_template: String,
    png_template: String,
    gif_template: String,
}

impl CommandImageEncoder {
    pub fn new(jpeg: &str, png: &str, gif: &str) -> Self {
        Self {
            jpeg_template: jpeg.to_string(),
            png_template: png.to_string(),
            gif_template: gif.to_string(),
        }
    }
}

impl ImageEncoder for CommandImageEncoder {
    fn encode(
        &self,
        format: ImageFormat,
        input: &Path,
        output: &Path,
        options: &EncodeOptions,
    ) -> ToolResult<()> {
        let template = match format {
            ImageFormat::Jpeg => &self.jpeg_template,
            ImageFormat::Png => &self.png_template,
            ImageFormat::Gif => &self.gif_template,
        };

        let cmdline = render(
            template,
            &[
                ("input", path_arg(input)),
                ("output", path_arg(output)),
                ("quality", options.quality.to_string()),
                ("level", options.optimization_level.to_string()),
                ("progressive", options.progressive.to_string()),
            ],
        );

        run_expecting_output("image_encoder", &cmdline, None).map(|_| ())
    }
}
