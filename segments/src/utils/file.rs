//! File utility functions

use std::path::{Component, Path, PathBuf};

/// Resolve a `--config` path given on the command line or in the environment
///
/// A leading `~` component is replaced with the home directory; everything
/// else is returned as given, so relative paths stay relative to the working
/// directory. `~user` forms are not expanded.
pub fn resolve_config_path(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_unchanged() {
        let path = Path::new("/etc/segments.json");
        assert_eq!(resolve_config_path(path), PathBuf::from("/etc/segments.json"));
    }

    #[test]
    fn test_resolve_relative_unchanged() {
        assert_eq!(
            resolve_config_path(Path::new("conf/segments.json")),
            PathBuf::from("conf/segments.json")
        );
    }

    #[test]
    fn test_resolve_home_prefix() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(
            resolve_config_path(Path::new("~/.segments/segments.json")),
            home.join(".segments").join("segments.json")
        );
        assert_eq!(resolve_config_path(Path::new("~")), home);
    }

    #[test]
    fn test_resolve_tilde_inside_name_unchanged() {
        assert_eq!(
            resolve_config_path(Path::new("~backup.json")),
            PathBuf::from("~backup.json")
        );
        assert_eq!(
            resolve_config_path(Path::new("conf/~/segments.json")),
            PathBuf::from("conf/~/segments.json")
        );
    }
}
