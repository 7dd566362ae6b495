use relative_path::{RelativePath, RelativePathBuf};
use rst_guides_config::ParserConfig;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::OriginError;

/// Where `include` and external `uml` sources are read from.
pub trait SourceOrigin: Send + Sync {
    fn has(&self, path: &RelativePath) -> bool;

    fn read(&self, path: &RelativePath) -> Result<Vec<u8>, OriginError>;

    fn read_to_string(&self, path: &RelativePath) -> Result<String, OriginError> {
        String::from_utf8(self.read(path)?)
            .map_err(|_| OriginError::InvalidUtf8(path.as_str().to_string()))
    }
}

/// Reads sources from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsOrigin {
    root: PathBuf,
}

impl FsOrigin {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Origin rooted at the configured source root, if one is set.
    pub fn from_config(config: &ParserConfig) -> Option<Self> {
        config.resolved_source_root().map(Self::new)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceOrigin for FsOrigin {
    fn has(&self, path: &RelativePath) -> bool {
        path.to_path(&self.root).is_file()
    }

    fn read(&self, path: &RelativePath) -> Result<Vec<u8>, OriginError> {
        let absolute_path = path.to_path(&self.root);
        if !absolute_path.exists() {
            return Err(OriginError::NotFound(path.as_str().to_string()));
        }
        fs::read(&absolute_path).map_err(|source| OriginError::Io {
            path: absolute_path,
            source,
        })
    }
}

/// In-memory sources keyed by root-relative path.
#[derive(Debug, Clone, Default)]
pub struct MemoryOrigin {
    files: BTreeMap<RelativePathBuf, String>,
}

impl MemoryOrigin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, content: impl Into<String>) {
        self.files
            .insert(RelativePathBuf::from(path), content.into());
    }

    #[must_use]
    pub fn with_file(mut self, path: &str, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }
}

impl SourceOrigin for MemoryOrigin {
    fn has(&self, path: &RelativePath) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &RelativePath) -> Result<Vec<u8>, OriginError> {
        self.files
            .get(path)
            .map(|s| s.clone().into_bytes())
            .ok_or_else(|| OriginError::NotFound(path.as_str().to_string()))
    }
}

/// Turns a target path into a URL usable from the current document.
pub trait UrlGenerator: Send + Sync {
    fn relative_url(&self, current_file: Option<&RelativePath>, target: &str) -> String;
}

/// Leaves absolute URLs and document-relative paths alone and rewrites
/// root-absolute paths (`/img/a.png`) relative to the current document.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeUrlGenerator;

impl UrlGenerator for RelativeUrlGenerator {
    fn relative_url(&self, current_file: Option<&RelativePath>, target: &str) -> String {
        if has_scheme(target) || target.starts_with('#') {
            return target.to_string();
        }
        let Some(rooted) = target.strip_prefix('/') else {
            return target.to_string();
        };
        let depth = current_file
            .and_then(RelativePath::parent)
            .map_or(0, |dir| dir.components().count());
        format!("{}{rooted}", "../".repeat(depth))
    }
}

/// `http://...`, `mailto:...`, `data:...`.
pub fn has_scheme(target: &str) -> bool {
    match target.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                && scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn fs_origin_reads_relative_to_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("guide")).unwrap();
        fs::write(dir.path().join("guide/intro.rst"), "Intro\n=====\n").unwrap();

        let origin = FsOrigin::new(dir.path());
        let path = RelativePath::new("guide/intro.rst");
        assert!(origin.has(path));
        assert_eq!(origin.read_to_string(path).unwrap(), "Intro\n=====\n");

        let missing = RelativePath::new("guide/missing.rst");
        assert!(!origin.has(missing));
        assert!(matches!(
            origin.read(missing),
            Err(OriginError::NotFound(p)) if p == "guide/missing.rst"
        ));
    }

    #[test]
    fn fs_origin_from_config_uses_source_root() {
        let config = ParserConfig {
            source_root: Some(PathBuf::from("/srv/docs")),
            ..ParserConfig::default()
        };
        let origin = FsOrigin::from_config(&config).unwrap();
        assert_eq!(origin.root(), Path::new("/srv/docs"));
        assert!(FsOrigin::from_config(&ParserConfig::default()).is_none());
    }

    #[test]
    fn memory_origin_round_trip() {
        let origin = MemoryOrigin::new().with_file("a.rst", "text");
        assert!(origin.has(RelativePath::new("a.rst")));
        assert_eq!(
            origin.read_to_string(RelativePath::new("a.rst")).unwrap(),
            "text"
        );
        assert!(origin.read(RelativePath::new("b.rst")).is_err());
    }

    #[rstest]
    #[case(Some("index.rst"), "/img/logo.png", "img/logo.png")]
    #[case(Some("guide/deep/page.rst"), "/img/logo.png", "../../img/logo.png")]
    #[case(Some("guide/page.rst"), "local.png", "local.png")]
    #[case(Some("guide/page.rst"), "https://example.com/a.png", "https://example.com/a.png")]
    #[case(None, "/img/logo.png", "img/logo.png")]
    fn relative_urls(#[case] current: Option<&str>, #[case] target: &str, #[case] expected: &str) {
        let url = RelativeUrlGenerator.relative_url(current.map(RelativePath::new), target);
        assert_eq!(url, expected);
    }

    #[rstest]
    #[case("http://example.com", true)]
    #[case("mailto:a@b.c", true)]
    #[case("img/a.png", false)]
    #[case("not a scheme:notes", false)]
    #[case(":weird", false)]
    fn scheme_detection(#[case] target: &str, #[case] expected: bool) {
        assert_eq!(has_scheme(target), expected);
    }
}
