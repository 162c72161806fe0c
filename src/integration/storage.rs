use std::env;
use std::path::{Path, PathBuf};

use log::warn;
use url::Url;

/// Where uploaded files live on disk and how clients reach them.
#[derive(Clone)]
pub struct Config {
    base_url: Url,
    static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://127.0.0.1:8000/", "static").expect("default base url is valid")
    }
}

impl Config {
    pub fn new(base_url: &str, static_dir: impl Into<PathBuf>) -> Result<Self, url::ParseError> {
        // a base without a trailing slash would have its last segment replaced on join
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        Ok(Self {
            base_url,
            static_dir: static_dir.into(),
        })
    }

    pub fn env() -> Option<Self> {
        let base_url = env::var("BASE_URL").ok()?;
        let static_dir = env::var("STATIC_DIR").unwrap_or("static".into());

        match Self::new(&base_url, static_dir) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!("BASE_URL is not a valid url: {e}");
                None
            }
        }
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    /// Renders a stored relative path as an absolute url.
    pub fn resolve(&self, path: &str) -> String {
        match self.base_url.join(path.trim_start_matches('/')) {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!("Could not resolve '{path}' against base url: {e}");
                path.to_string()
            }
        }
    }

    pub fn resolve_opt(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| self.resolve(p))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_prefix_relative_path() {
        let cfg = Config::new("http://localhost:8000", "static").unwrap();

        assert_eq!(
            cfg.resolve("static/avatars/jora.png"),
            "http://localhost:8000/static/avatars/jora.png"
        );
    }

    #[test]
    fn should_keep_base_path_segments() {
        let cfg = Config::new("https://welt.example/api", "static").unwrap();

        assert_eq!(
            cfg.resolve("/static/icon.png"),
            "https://welt.example/api/static/icon.png"
        );
    }

    #[test]
    fn should_skip_missing_path() {
        let cfg = Config::default();

        assert_eq!(cfg.resolve_opt(None), None);
    }
}
