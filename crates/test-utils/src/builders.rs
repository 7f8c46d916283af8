#![allow(dead_code)]

use std::path::Path;

use siteforge::compose::Composer;
use siteforge::config::model::{ConfigFile, Paths, RawConfigFile, StepsSection, WatchBinding};
use siteforge::fs::mock::MockFileSystem;
use siteforge::project::ProjectMeta;
use siteforge::tools::ToolSet;

use crate::fake_tools::FakeToolkit;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the stock configuration (default pipelines, watch bindings
/// and step options) and lets tests override the parts they care about.
pub struct ConfigFileBuilder {
    raw: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawConfigFile::default(),
        }
    }

    pub fn with_pipeline(mut self, name: &str, entries: &[&str]) -> Self {
        self.raw.pipelines.insert(
            name.to_string(),
            entries.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn without_pipeline(mut self, name: &str) -> Self {
        self.raw.pipelines.remove(name);
        self
    }

    pub fn with_watch_binding(
        mut self,
        name: &str,
        files: &[&str],
        pipeline: Option<&str>,
        reload: bool,
    ) -> Self {
        self.raw.watch.insert(
            name.to_string(),
            WatchBinding {
                files: files.iter().map(|s| s.to_string()).collect(),
                pipeline: pipeline.map(|s| s.to_string()),
                reload,
            },
        );
        self
    }

    pub fn clear_watch_bindings(mut self) -> Self {
        self.raw.watch.clear();
        self
    }

    pub fn paths(mut self, f: impl FnOnce(&mut Paths)) -> Self {
        f(&mut self.raw.paths);
        self
    }

    pub fn steps(mut self, f: impl FnOnce(&mut StepsSection)) -> Self {
        f(&mut self.raw.steps);
        self
    }

    pub fn try_build(self) -> siteforge::errors::Result<ConfigFile> {
        ConfigFile::try_from(self.raw)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Populate a mock filesystem with the stock site layout the default
/// configuration expects.
pub fn stock_site(fs: &MockFileSystem) {
    fs.add_file(
        "package.json",
        r#"{ "name": "demo-site", "version": "1.2.3" }"#,
    );
    fs.add_file(
        "src/site/index.html",
        "<html>\n<!-- include \"header.html\" -->\n<body>hello</body>\n<!-- include \"footer.html\" -->\n</html>\n",
    );
    fs.add_file(
        "src/site/pages/about.html",
        "<html>\n<!-- include \"header.html\" -->\n<body>about</body>\n</html>\n",
    );
    fs.add_file("src/site/include/header.html", "<header>top</header>\n");
    fs.add_file("src/site/include/footer.html", "<footer>bottom</footer>\n");
    fs.add_file("src/less/main.less", "@c: red;\nbody { color: @c; }\n");
    fs.add_file("src/css/legacy.css", ".legacy { float: left; }\n");
    fs.add_file("src/js/a.js", "function a() { return 1; }\n");
    fs.add_file("src/js/b.js", "function b() { return 2; }\n");
    fs.add_file("src/images/logo.png", b"PNG".to_vec());
    fs.add_file("src/images/photo.jpg", b"JPEG".to_vec());
}

/// Everything a composer test needs, wired to fakes and a mock filesystem.
///
/// Tests use `Path::new("")` as the project root, so configured relative
/// paths double as mock filesystem keys.
pub struct Harness {
    pub fs: MockFileSystem,
    pub toolkit: FakeToolkit,
    pub tools: ToolSet,
    pub config: ConfigFile,
    pub project: ProjectMeta,
}

impl Harness {
    pub fn new(fs: MockFileSystem, config: ConfigFile) -> Self {
        let toolkit = FakeToolkit::new(&fs);
        let tools = toolkit.toolset();
        let project = ProjectMeta::load(&fs, Path::new("package.json"))
            .expect("project metadata should load");
        Self {
            fs,
            toolkit,
            tools,
            config,
            project,
        }
    }

    /// Stock site fixture + default configuration.
    pub fn stock() -> Self {
        let fs = MockFileSystem::new();
        stock_site(&fs);
        Self::new(fs, ConfigFileBuilder::new().build())
    }

    pub fn composer(&self) -> Composer<'_> {
        Composer::new(
            &self.config,
            &self.tools,
            &self.fs,
            &self.project,
            Path::new(""),
        )
    }
}
