// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [paths]
/// src_root = "src"
/// build_root = "dist"
///
/// [steps.styles]
/// entry = "less/main.less"
/// output = "css/style.css"
///
/// [pipelines]
/// default = ["includes", "clean:styles", "styles", "copy"]
///
/// [watch.styles]
/// files = ["src/less/**/*.less"]
/// pipeline = "refresh_styles"
/// ```
///
/// All sections are optional; the defaults describe the stock site layout
/// (`src/site`, `src/js`, `src/less`, `src/images` into `dist/`).
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Source/destination path registry from `[paths]`.
    #[serde(default)]
    pub paths: Paths,

    /// Project metadata wiring from `[project]`.
    #[serde(default)]
    pub project: ProjectSection,

    /// Per-step option tables from `[steps.*]`.
    #[serde(default)]
    pub steps: StepsSection,

    /// Named pipelines from `[pipelines]`.
    ///
    /// Keys are the *pipeline names* (e.g. `"default"`, `"build"`); values
    /// are ordered lists of step references (`"clean:styles"`) or other
    /// pipeline names. The reserved entry `"watch"` may only appear last.
    #[serde(default = "default_pipelines")]
    pub pipelines: BTreeMap<String, Vec<String>>,

    /// Watch bindings from `[watch.<name>]`.
    #[serde(default = "default_watch_bindings")]
    pub watch: BTreeMap<String, WatchBinding>,

    /// External tool command templates from `[tools]`.
    #[serde(default)]
    pub tools: ToolCommands,
}

impl Default for RawConfigFile {
    fn default() -> Self {
        Self {
            paths: Paths::default(),
            project: ProjectSection::default(),
            steps: StepsSection::default(),
            pipelines: default_pipelines(),
            watch: default_watch_bindings(),
            tools: ToolCommands::default(),
        }
    }
}

/// Validated configuration. Construct via `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub paths: Paths,
    pub project: ProjectSection,
    pub steps: StepsSection,
    pub pipelines: BTreeMap<String, Vec<String>>,
    pub watch: BTreeMap<String, WatchBinding>,
    pub tools: ToolCommands,
}

impl ConfigFile {
    /// Construct without validation. Only `config::validate` should call
    /// this, after the raw config has passed all checks.
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            paths: raw.paths,
            project: raw.project,
            steps: raw.steps,
            pipelines: raw.pipelines,
            watch: raw.watch,
            tools: raw.tools,
        }
    }
}

/// `[paths]` section: the path registry every step binds against.
///
/// `src_root` and `build_root` anchor the two trees; the `*_dir` entries are
/// relative to their root. Input globs resolve under `src_root`, outputs
/// land under `build_root`.
#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    #[serde(default = "default_src_root")]
    pub src_root: PathBuf,

    #[serde(default = "default_build_root")]
    pub build_root: PathBuf,

    /// Page templates live here; `pages_dir` and `include_dir` are nested
    /// inside it in the stock layout.
    #[serde(default = "default_html_dir")]
    pub html_dir: String,

    #[serde(default = "default_include_dir")]
    pub include_dir: String,

    #[serde(default = "default_js_dir")]
    pub js_dir: String,

    #[serde(default = "default_css_dir")]
    pub css_dir: String,

    #[serde(default = "default_less_dir")]
    pub less_dir: String,

    #[serde(default = "default_images_dir")]
    pub images_dir: String,

    #[serde(default = "default_build_css_dir")]
    pub build_css_dir: String,

    #[serde(default = "default_build_js_dir")]
    pub build_js_dir: String,

    #[serde(default = "default_build_images_dir")]
    pub build_images_dir: String,
}

fn default_src_root() -> PathBuf {
    PathBuf::from("src")
}
fn default_build_root() -> PathBuf {
    PathBuf::from("dist")
}
fn default_html_dir() -> String {
    "site".to_string()
}
fn default_include_dir() -> String {
    "site/include".to_string()
}
fn default_js_dir() -> String {
    "js".to_string()
}
fn default_css_dir() -> String {
    "css".to_string()
}
fn default_less_dir() -> String {
    "less".to_string()
}
fn default_images_dir() -> String {
    "images".to_string()
}
fn default_build_css_dir() -> String {
    "css".to_string()
}
fn default_build_js_dir() -> String {
    "js".to_string()
}
fn default_build_images_dir() -> String {
    "images".to_string()
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            src_root: default_src_root(),
            build_root: default_build_root(),
            html_dir: default_html_dir(),
            include_dir: default_include_dir(),
            js_dir: default_js_dir(),
            css_dir: default_css_dir(),
            less_dir: default_less_dir(),
            images_dir: default_images_dir(),
            build_css_dir: default_build_css_dir(),
            build_js_dir: default_build_js_dir(),
            build_images_dir: default_build_images_dir(),
        }
    }
}

impl Paths {
    pub fn src(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.src_root.join(rel)
    }

    pub fn build(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.build_root.join(rel)
    }

    /// Directory holding top-level page templates.
    pub fn html_root(&self) -> PathBuf {
        self.src_root.join(&self.html_dir)
    }

    /// Directory holding include fragments.
    pub fn include_root(&self) -> PathBuf {
        self.src_root.join(&self.include_dir)
    }

    pub fn js_root(&self) -> PathBuf {
        self.src_root.join(&self.js_dir)
    }

    pub fn css_root(&self) -> PathBuf {
        self.src_root.join(&self.css_dir)
    }

    pub fn images_root(&self) -> PathBuf {
        self.src_root.join(&self.images_dir)
    }

    pub fn build_css_root(&self) -> PathBuf {
        self.build_root.join(&self.build_css_dir)
    }

    pub fn build_js_root(&self) -> PathBuf {
        self.build_root.join(&self.build_js_dir)
    }

    pub fn build_images_root(&self) -> PathBuf {
        self.build_root.join(&self.build_images_dir)
    }
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    /// Path to a JSON metadata file (name/version), read-only and
    /// informational; feeds the bundle banner. A missing file is not an
    /// error.
    #[serde(default = "default_metadata_file")]
    pub metadata: PathBuf,
}

fn default_metadata_file() -> PathBuf {
    PathBuf::from("package.json")
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            metadata: default_metadata_file(),
        }
    }
}

/// `[steps.*]` option tables, one per step family.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepsSection {
    #[serde(default)]
    pub clean: CleanOptions,
    #[serde(default)]
    pub includes: IncludesOptions,
    #[serde(default)]
    pub rewrite: RewriteOptions,
    #[serde(default)]
    pub styles: StylesOptions,
    #[serde(default)]
    pub copy: CopyOptions,
    #[serde(default)]
    pub uncss: UncssOptions,
    #[serde(default)]
    pub lint: LintOptions,
    #[serde(default)]
    pub concat: ConcatOptions,
    #[serde(default)]
    pub minify_js: MinifyJsOptions,
    #[serde(default)]
    pub images: ImagesOptions,
}

/// `[steps.clean]`: named groups of destination-scoped glob patterns.
///
/// ```toml
/// [steps.clean]
/// html = ["**/*.html"]
/// styles = ["css/*.css"]
/// scripts = ["js/*.js"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CleanOptions {
    /// Group name -> globs relative to `build_root`.
    #[serde(flatten)]
    pub groups: BTreeMap<String, Vec<String>>,
}

impl Default for CleanOptions {
    fn default() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert("html".to_string(), vec!["**/*.html".to_string()]);
        groups.insert("styles".to_string(), vec!["css/*.css".to_string()]);
        groups.insert("scripts".to_string(), vec!["js/*.js".to_string()]);
        Self { groups }
    }
}

/// `[steps.includes]`: include-expansion of page templates.
#[derive(Debug, Clone, Deserialize)]
pub struct IncludesOptions {
    /// Template globs relative to the html root (`paths.html_dir`).
    #[serde(default = "default_include_sources")]
    pub sources: Vec<String>,

    /// Drop input subdirectory structure in the output tree.
    #[serde(default = "default_true")]
    pub flatten: bool,

    /// When false, a fragment already emitted into the current output
    /// document is not emitted again.
    #[serde(default)]
    pub duplicates: bool,
}

fn default_include_sources() -> Vec<String> {
    vec!["*.html".to_string(), "pages/*.html".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for IncludesOptions {
    fn default() -> Self {
        Self {
            sources: default_include_sources(),
            flatten: true,
            duplicates: false,
        }
    }
}

/// One `{ from, to }` prefix-rewrite rule for deployed asset paths.
#[derive(Debug, Clone, Deserialize)]
pub struct RewriteRule {
    pub from: String,
    pub to: String,
}

/// `[steps.rewrite]`: in-place path rewriting of built documents.
#[derive(Debug, Clone, Deserialize)]
pub struct RewriteOptions {
    /// Document globs relative to `build_root`.
    #[serde(default = "default_rewrite_sources")]
    pub sources: Vec<String>,

    #[serde(default = "default_rewrite_rules")]
    pub rules: Vec<RewriteRule>,
}

fn default_rewrite_sources() -> Vec<String> {
    vec!["**/*.html".to_string()]
}

fn default_rewrite_rules() -> Vec<RewriteRule> {
    vec![
        RewriteRule {
            from: "../css/".to_string(),
            to: "css/".to_string(),
        },
        RewriteRule {
            from: "../js/".to_string(),
            to: "js/".to_string(),
        },
        RewriteRule {
            from: "../images/".to_string(),
            to: "images/".to_string(),
        },
    ]
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            sources: default_rewrite_sources(),
            rules: default_rewrite_rules(),
        }
    }
}

/// `[steps.styles]`: compile -> prefix -> minify pipeline for stylesheets.
#[derive(Debug, Clone, Deserialize)]
pub struct StylesOptions {
    /// Entry stylesheet, relative to `src_root`. Transitive imports are the
    /// compiler's business.
    #[serde(default = "default_styles_entry")]
    pub entry: String,

    /// Compiled output, relative to `build_root`.
    #[serde(default = "default_styles_output")]
    pub output: String,

    /// Browser support matrix handed to the vendor prefixer.
    #[serde(default = "default_browsers")]
    pub browsers: Vec<String>,

    /// How many `/*! ... */` comments the minifier keeps. Zero strips all.
    #[serde(default)]
    pub keep_special_comments: u32,
}

fn default_styles_entry() -> String {
    "less/main.less".to_string()
}

fn default_styles_output() -> String {
    "css/style.css".to_string()
}

fn default_browsers() -> Vec<String> {
    [
        "Android >= 4",
        "Chrome >= 35",
        "Firefox >= 35",
        "Explorer >= 7",
        "iOS >= 6",
        "Opera >= 20",
        "Safari >= 9",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for StylesOptions {
    fn default() -> Self {
        Self {
            entry: default_styles_entry(),
            output: default_styles_output(),
            browsers: default_browsers(),
            keep_special_comments: 0,
        }
    }
}

/// `[steps.copy]`: mirror hand-written plain CSS into the build tree.
#[derive(Debug, Clone, Deserialize)]
pub struct CopyOptions {
    /// Globs relative to `src_root`.
    #[serde(default = "default_copy_sources")]
    pub sources: Vec<String>,

    /// Destination directory relative to `build_root`.
    #[serde(default = "default_build_css_dir")]
    pub dest: String,
}

fn default_copy_sources() -> Vec<String> {
    vec!["css/*.css".to_string()]
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            sources: default_copy_sources(),
            dest: default_build_css_dir(),
        }
    }
}

/// `[steps.uncss]`: unused-selector removal.
#[derive(Debug, Clone, Deserialize)]
pub struct UncssOptions {
    /// Rendered documents to sample, relative to `src_root`. Selector usage
    /// is judged against the union of all of them.
    #[serde(default = "default_uncss_samples")]
    pub samples: Vec<String>,

    /// Stylesheets to reduce, relative to `build_root`.
    #[serde(default = "default_uncss_sources")]
    pub sources: Vec<String>,

    /// Reduced output, relative to `build_root`.
    #[serde(default = "default_uncss_output")]
    pub output: String,

    /// Regex patterns naming stylesheet sources that are exempt from
    /// analysis and passed through unmodified.
    #[serde(default = "default_uncss_ignore")]
    pub ignore: Vec<String>,
}

fn default_uncss_samples() -> Vec<String> {
    vec!["site/index.html".to_string()]
}

fn default_uncss_sources() -> Vec<String> {
    vec!["css/style.css".to_string()]
}

fn default_uncss_output() -> String {
    "css/style.uncss.css".to_string()
}

fn default_uncss_ignore() -> Vec<String> {
    vec![r"fonts\.googleapis".to_string()]
}

impl Default for UncssOptions {
    fn default() -> Self {
        Self {
            samples: default_uncss_samples(),
            sources: default_uncss_sources(),
            output: default_uncss_output(),
            ignore: default_uncss_ignore(),
        }
    }
}

/// `[steps.lint]`: rule set handed to the script linter.
#[derive(Debug, Clone, Deserialize)]
pub struct LintOptions {
    /// Require braces around all blocks.
    #[serde(default = "default_true")]
    pub curly: bool,

    /// Identifiers the linter treats as predeclared globals.
    #[serde(default = "default_lint_globals")]
    pub globals: Vec<String>,
}

fn default_lint_globals() -> Vec<String> {
    vec!["jQuery".to_string()]
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            curly: true,
            globals: default_lint_globals(),
        }
    }
}

/// `[steps.concat]`: script concatenation.
///
/// Each `sources` entry is either a glob (expanded and sorted
/// lexicographically) or a literal file path; entries contribute their files
/// in declared order, so listing files explicitly pins the bundle order.
#[derive(Debug, Clone, Deserialize)]
pub struct ConcatOptions {
    /// Globs or files relative to `src_root`.
    #[serde(default = "default_concat_sources")]
    pub sources: Vec<String>,

    #[serde(default = "default_separator")]
    pub separator: String,

    /// Bundle output, relative to `build_root`.
    #[serde(default = "default_concat_output")]
    pub output: String,
}

fn default_concat_sources() -> Vec<String> {
    vec!["js/*.js".to_string()]
}

fn default_separator() -> String {
    ";".to_string()
}

fn default_concat_output() -> String {
    "js/script.js".to_string()
}

impl Default for ConcatOptions {
    fn default() -> Self {
        Self {
            sources: default_concat_sources(),
            separator: default_separator(),
            output: default_concat_output(),
        }
    }
}

/// `[steps.minify_js]`: script minification + banner.
#[derive(Debug, Clone, Deserialize)]
pub struct MinifyJsOptions {
    /// Input bundle, relative to `build_root`.
    #[serde(default = "default_concat_output")]
    pub input: String,

    /// Minified output, relative to `build_root`.
    #[serde(default = "default_minified_output")]
    pub output: String,

    /// Prepend the build-metadata banner (project name/version + generation
    /// timestamp).
    #[serde(default = "default_true")]
    pub banner: bool,
}

fn default_minified_output() -> String {
    "js/script.min.js".to_string()
}

impl Default for MinifyJsOptions {
    fn default() -> Self {
        Self {
            input: default_concat_output(),
            output: default_minified_output(),
            banner: true,
        }
    }
}

/// `[steps.images]`: image compression.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesOptions {
    /// Globs relative to the images root (`paths.images_dir`).
    #[serde(default = "default_image_sources")]
    pub sources: Vec<String>,

    /// JPEG encoder quality, 0..=100.
    #[serde(default = "default_quality")]
    pub quality: u8,

    #[serde(default = "default_optimization_level")]
    pub optimization_level: u8,

    /// Progressive JPEG encoding.
    #[serde(default)]
    pub progressive: bool,
}

fn default_image_sources() -> Vec<String> {
    vec!["**/*.{png,jpg,gif}".to_string()]
}

fn default_quality() -> u8 {
    75
}

fn default_optimization_level() -> u8 {
    1
}

impl Default for ImagesOptions {
    fn default() -> Self {
        Self {
            sources: default_image_sources(),
            quality: default_quality(),
            optimization_level: default_optimization_level(),
            progressive: false,
        }
    }
}

/// `[watch.<name>]` binding.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchBinding {
    /// Globs relative to the project root (the config file's directory).
    pub files: Vec<String>,

    /// Pipeline to run when a matching file changes. Required unless
    /// `reload = true`.
    #[serde(default)]
    pub pipeline: Option<String>,

    /// Restart the whole watch session (re-reading configuration) instead
    /// of running a pipeline. Only valid for the binding that watches the
    /// configuration file itself.
    #[serde(default)]
    pub reload: bool,
}

fn default_pipelines() -> BTreeMap<String, Vec<String>> {
    let mut p = BTreeMap::new();
    let def = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    p.insert(
        "default".to_string(),
        def(&["includes", "clean:styles", "styles", "copy"]),
    );
    p.insert("dev".to_string(), def(&["default", "watch"]));
    p.insert("build".to_string(), def(&["includes", "rewrite"]));
    p.insert("test".to_string(), def(&["default"]));
    p.insert("compress".to_string(), def(&["images"]));
    p.insert("cleancss".to_string(), def(&["uncss"]));
    p.insert("refresh_html".to_string(), def(&["includes"]));
    p.insert(
        "refresh_styles".to_string(),
        def(&["clean:styles", "styles", "copy"]),
    );
    p.insert(
        "refresh_scripts".to_string(),
        def(&[
            "lint:sources",
            "clean:scripts",
            "concat",
            "minify_js",
            "lint:bundle",
        ]),
    );
    p
}

fn default_watch_bindings() -> BTreeMap<String, WatchBinding> {
    let mut w = BTreeMap::new();
    let files = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    w.insert(
        "config".to_string(),
        WatchBinding {
            files: files(&["Siteforge.toml"]),
            pipeline: None,
            reload: true,
        },
    );
    w.insert(
        "html".to_string(),
        WatchBinding {
            files: files(&["src/site/**/*.html"]),
            pipeline: Some("refresh_html".to_string()),
            reload: false,
        },
    );
    w.insert(
        "styles".to_string(),
        WatchBinding {
            files: files(&["src/less/**/*.less"]),
            pipeline: Some("refresh_styles".to_string()),
            reload: false,
        },
    );
    w.insert(
        "scripts".to_string(),
        WatchBinding {
            files: files(&["src/js/*.js"]),
            pipeline: Some("refresh_scripts".to_string()),
            reload: false,
        },
    );
    w.insert(
        "images".to_string(),
        WatchBinding {
            files: files(&["src/images/**/*.{png,jpg,gif}"]),
            pipeline: Some("compress".to_string()),
            reload: false,
        },
    );
    w
}

/// `[tools]`: command templates for the external collaborators.
///
/// Templates run through the platform shell; `{input}`, `{output}` and
/// option placeholders are substituted per invocation. Tools that transform
/// text read stdin and write stdout when no `{input}`/`{output}` appears.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCommands {
    #[serde(default = "default_style_compiler")]
    pub style_compiler: String,

    #[serde(default = "default_prefixer")]
    pub prefixer: String,

    #[serde(default = "default_css_minifier")]
    pub css_minifier: String,

    #[serde(default = "default_selector_analyzer")]
    pub selector_analyzer: String,

    #[serde(default = "default_script_linter")]
    pub script_linter: String,

    #[serde(default = "default_script_minifier")]
    pub script_minifier: String,

    #[serde(default = "default_jpeg_encoder")]
    pub jpeg_encoder: String,

    #[serde(default = "default_png_encoder")]
    pub png_encoder: String,

    #[serde(default = "default_gif_encoder")]
    pub gif_encoder: String,
}

fn default_style_compiler() -> String {
    "lessc --no-color {input}".to_string()
}

fn default_prefixer() -> String {
    "autoprefixer-cli --browsers \"{browsers}\"".to_string()
}

fn default_css_minifier() -> String {
    "cleancss --comments {keep_comments}".to_string()
}

fn default_selector_analyzer() -> String {
    "uncss --stylesheet {input} {documents}".to_string()
}

fn default_script_linter() -> String {
    "jshint --reporter=unix {input}".to_string()
}

fn default_script_minifier() -> String {
    "uglifyjs --compress --mangle".to_string()
}

fn default_jpeg_encoder() -> String {
    "cjpeg -quality {quality} -outfile {output} {input}".to_string()
}

fn default_png_encoder() -> String {
    "optipng -o{level} -quiet -clobber -out {output} {input}".to_string()
}

fn default_gif_encoder() -> String {
    "gifsicle -O{level} -o {output} {input}".to_string()
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self {
            style_compiler: default_style_compiler(),
            prefixer: default_prefixer(),
            css_minifier: default_css_minifier(),
            selector_analyzer: default_selector_analyzer(),
            script_linter: default_script_linter(),
            script_minifier: default_script_minifier(),
            jpeg_encoder: default_jpeg_encoder(),
            png_encoder: default_png_encoder(),
            gif_encoder: default_gif_encoder(),
        }
    }
}
