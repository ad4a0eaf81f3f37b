//! URL to filesystem resolution with SPA fallback.

use super::error::ServeError;
use crate::config::ServeConfig;
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

/// Outcome of resolving a request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Serve this file.
    File(PathBuf),
    /// Path escapes the site root.
    Forbidden,
    /// Asset-shaped path with no matching file.
    NotFound,
}

/// Built site directory plus the routing rules applied to it.
#[derive(Debug, Clone)]
pub struct SiteRoot {
    /// Canonical absolute path of the site directory
    root: PathBuf,
    index: String,
    asset_prefix: String,
}

impl SiteRoot {
    /// Open the site directory, failing if it is missing or empty.
    pub fn open(config: &ServeConfig) -> Result<Self, ServeError> {
        let dir = &config.dir;
        if !dir.is_dir() {
            return Err(ServeError::MissingDir(dir.clone()));
        }

        let mut entries = fs::read_dir(dir).map_err(|e| ServeError::Io(dir.clone(), e))?;
        if entries.next().is_none() {
            return Err(ServeError::EmptyDir(dir.clone()));
        }

        let root = dir
            .canonicalize()
            .map_err(|e| ServeError::Io(dir.clone(), e))?;

        Ok(Self {
            root,
            index: config.index.clone(),
            asset_prefix: config.asset_prefix.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Root document served for SPA routes.
    pub fn root_index(&self) -> PathBuf {
        self.root.join(&self.index)
    }

    /// Resolve a request URL (path plus optional query) to a target.
    pub fn resolve(&self, url: &str) -> Target {
        let mut route = route_from_url(url);
        if route.is_empty() {
            route.clone_from(&self.index);
        }

        let local = normalize(&self.root.join(&route));
        if !local.starts_with(&self.root) {
            return Target::Forbidden;
        }

        let Ok(meta) = fs::metadata(&local) else {
            return if is_asset_route(&route, &self.asset_prefix) {
                Target::NotFound
            } else {
                Target::File(self.root_index())
            };
        };

        if !self.contains(&local) {
            return Target::Forbidden;
        }

        if meta.is_dir() {
            let index = local.join(&self.index);
            if !index.is_file() {
                return Target::File(self.root_index());
            }
            if !self.contains(&index) {
                return Target::Forbidden;
            }
            return Target::File(index);
        }

        Target::File(local)
    }

    /// Whether `path`, with symlinks followed, stays inside the root.
    fn contains(&self, path: &Path) -> bool {
        path.canonicalize()
            .is_ok_and(|canonical| canonical.starts_with(&self.root))
    }
}

/// Extract the route from a URL: drop query/fragment, decode, trim leading slashes.
fn route_from_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    decoded.trim_start_matches('/').to_string()
}

/// Requests under the asset prefix, or with an extension, never fall back to the index.
fn is_asset_route(route: &str, asset_prefix: &str) -> bool {
    let under_prefix = route
        .strip_prefix(asset_prefix)
        .is_some_and(|rest| rest.starts_with('/'));
    under_prefix || route.contains('.')
}

/// Lexically resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site() -> (TempDir, SiteRoot) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("index.html"), "<html>root</html>").unwrap();
        fs::create_dir_all(root.join("assets")).unwrap();
        fs::write(root.join("assets/app.js"), "console.log(1)").unwrap();
        fs::create_dir_all(root.join("menu")).unwrap();
        fs::write(root.join("menu/index.html"), "<html>menu</html>").unwrap();
        fs::create_dir_all(root.join("gallery")).unwrap();

        let config = ServeConfig {
            dir: root.to_path_buf(),
            ..ServeConfig::default()
        };
        let site = SiteRoot::open(&config).unwrap();
        (dir, site)
    }

    #[test]
    fn test_route_from_url() {
        assert_eq!(route_from_url("/"), "");
        assert_eq!(route_from_url("///assets/app.js"), "assets/app.js");
        assert_eq!(route_from_url("/menu?lang=it#top"), "menu");
        assert_eq!(route_from_url("/torta%20al%20limone"), "torta al limone");
        // Encoded '?' is part of the path, not a query
        assert_eq!(route_from_url("/a%3Fb"), "a?b");
    }

    #[test]
    fn test_is_asset_route() {
        assert!(is_asset_route("assets/missing", "assets"));
        assert!(is_asset_route("favicon.ico", "assets"));
        assert!(is_asset_route("deep/route/file.v2", "assets"));
        assert!(!is_asset_route("assets", "assets"));
        assert!(!is_asset_route("assetsy/page", "assets"));
        assert!(!is_asset_route("contact", "assets"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/srv/dist/a/../b")), PathBuf::from("/srv/dist/b"));
        assert_eq!(normalize(Path::new("/srv/dist/./a")), PathBuf::from("/srv/dist/a"));
        assert_eq!(normalize(Path::new("/srv/dist/../../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize(Path::new("/../..")), PathBuf::from("/"));
    }

    #[test]
    fn test_resolve_root_and_files() {
        let (_dir, site) = site();
        assert_eq!(site.resolve("/"), Target::File(site.root_index()));
        assert_eq!(
            site.resolve("/assets/app.js"),
            Target::File(site.path().join("assets/app.js"))
        );
    }

    #[test]
    fn test_resolve_traversal_is_forbidden() {
        let (_dir, site) = site();
        for url in [
            "/../secret.txt",
            "/assets/../../secret.txt",
            "/%2e%2e/%2e%2e/etc/passwd",
            "/..%2f..%2fetc%2fpasswd",
            "/menu/../../../",
        ] {
            assert_eq!(site.resolve(url), Target::Forbidden, "{url}");
        }
    }

    #[test]
    fn test_resolve_dot_segments_inside_root() {
        let (_dir, site) = site();
        assert_eq!(
            site.resolve("/menu/../assets/app.js"),
            Target::File(site.path().join("assets/app.js"))
        );
    }

    #[test]
    fn test_resolve_directories() {
        let (_dir, site) = site();
        assert_eq!(
            site.resolve("/menu"),
            Target::File(site.path().join("menu/index.html"))
        );
        // No index inside: SPA fallback
        assert_eq!(site.resolve("/gallery/"), Target::File(site.root_index()));
    }

    #[test]
    fn test_resolve_missing_paths() {
        let (_dir, site) = site();
        assert_eq!(site.resolve("/contact"), Target::File(site.root_index()));
        assert_eq!(site.resolve("/orders/42/status"), Target::File(site.root_index()));
        assert_eq!(site.resolve("/assets/missing"), Target::NotFound);
        assert_eq!(site.resolve("/logo.png"), Target::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_symlink_escape_is_forbidden() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), "nope").unwrap();

        let (dir, site) = site();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("leak")).unwrap();

        assert_eq!(site.resolve("/leak/secret.txt"), Target::Forbidden);

        // A directory whose index links outside the root
        fs::create_dir_all(dir.path().join("specials")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            dir.path().join("specials/index.html"),
        )
        .unwrap();
        assert_eq!(site.resolve("/specials/index.html"), Target::Forbidden);
        assert_eq!(site.resolve("/specials"), Target::Forbidden);
        assert_eq!(site.resolve("/specials/"), Target::Forbidden);
    }

    #[test]
    fn test_open_rejects_missing_and_empty() {
        let dir = TempDir::new().unwrap();

        let missing = ServeConfig {
            dir: dir.path().join("dist"),
            ..ServeConfig::default()
        };
        assert!(matches!(
            SiteRoot::open(&missing),
            Err(ServeError::MissingDir(_))
        ));

        let empty = ServeConfig {
            dir: dir.path().to_path_buf(),
            ..ServeConfig::default()
        };
        assert!(matches!(SiteRoot::open(&empty), Err(ServeError::EmptyDir(_))));
    }
}
