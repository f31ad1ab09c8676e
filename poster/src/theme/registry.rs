use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::{Theme, ThemeError};

const BUILTINS: &[(&str, &str)] = &[
    ("blueprint", include_str!("../../themes/blueprint.json")),
    ("japanese_ink", include_str!("../../themes/japanese_ink.json")),
    ("midnight_blue", include_str!("../../themes/midnight_blue.json")),
    ("neon_cyberpunk", include_str!("../../themes/neon_cyberpunk.json")),
    ("noir", include_str!("../../themes/noir.json")),
    ("ocean", include_str!("../../themes/ocean.json")),
    ("terracotta", include_str!("../../themes/terracotta.json")),
    ("warm_beige", include_str!("../../themes/warm_beige.json")),
];

pub const DEFAULT_THEME: &str = "terracotta";

/// The catalog of themes, by key. Every theme in here passed validation.
#[derive(Clone, Debug, Default)]
pub struct ThemeRegistry {
    themes: BTreeMap<String, Arc<Theme>>,
}

impl ThemeRegistry {
    pub fn empty() -> ThemeRegistry {
        ThemeRegistry::default()
    }

    /// Every theme shipped with the program.
    pub fn with_builtins() -> Result<ThemeRegistry, ThemeError> {
        let mut registry = ThemeRegistry::empty();
        for (key, raw) in BUILTINS {
            registry.register(Theme::from_json(key, raw)?);
        }
        Ok(registry)
    }

    /// Adds or replaces a theme.
    pub fn register(&mut self, theme: Theme) {
        if self.themes.contains_key(&theme.key) {
            info!("Replacing theme {}", theme.key);
        }
        self.themes.insert(theme.key.clone(), Arc::new(theme));
    }

    /// Registers every `*.json` file in a directory, keyed by the file stem. Returns the keys
    /// added, in sorted order. If any file is unreadable or invalid, nothing is registered.
    pub fn load_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<Vec<String>, ThemeError> {
        let dir = dir.as_ref();
        let io_err = |err: std::io::Error| ThemeError::Io {
            path: dir.display().to_string(),
            reason: err.to_string(),
        };
        let mut paths = Vec::new();
        for entry in fs_err::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|x| x.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loaded = Vec::new();
        for path in paths {
            let key = match path.file_stem().and_then(|x| x.to_str()) {
                Some(key) => key.to_string(),
                None => continue,
            };
            let raw = fs_err::read_to_string(&path).map_err(|err| ThemeError::Io {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?;
            loaded.push(Theme::from_json(&key, &raw)?);
        }

        let added: Vec<String> = loaded.iter().map(|t| t.key.clone()).collect();
        for theme in loaded {
            self.register(theme);
        }
        info!("Loaded {} themes from {}", added.len(), dir.display());
        Ok(added)
    }

    pub fn get(&self, key: &str) -> Result<Arc<Theme>, ThemeError> {
        self.themes
            .get(key)
            .cloned()
            .ok_or_else(|| ThemeError::UnknownTheme {
                name: key.to_string(),
                available: self.list_names(),
            })
    }

    /// Sorted
    pub fn list_names(&self) -> Vec<String> {
        self.themes.keys().cloned().collect()
    }

    pub fn all(&self) -> impl Iterator<Item = &Arc<Theme>> {
        self.themes.values()
    }
}

#[cfg(test)]
mod tests {
    use road_network::Category;

    use super::*;
    use crate::validate;

    #[test]
    fn builtins_are_complete() {
        let registry = ThemeRegistry::with_builtins().unwrap();
        assert_eq!(registry.list_names().len(), BUILTINS.len());
        for theme in registry.all() {
            assert_eq!(validate(&theme.to_def()), Ok(()));
            for c in Category::ALL {
                assert!(theme.style(c).line_width > 0.0);
            }
        }
        assert!(registry.get(DEFAULT_THEME).is_ok());
    }

    #[test]
    fn names_sorted() {
        let registry = ThemeRegistry::with_builtins().unwrap();
        let names = registry.list_names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn unknown_theme() {
        let registry = ThemeRegistry::with_builtins().unwrap();
        match registry.get("vaporwave") {
            Err(ThemeError::UnknownTheme { name, available }) => {
                assert_eq!(name, "vaporwave");
                assert!(available.contains(&"noir".to_string()));
            }
            other => panic!("expected UnknownTheme, got {:?}", other),
        }
    }

    #[test]
    fn load_dir_rejects_incomplete() {
        let dir = std::env::temp_dir().join(format!("poster_themes_{}", std::process::id()));
        fs_err::create_dir_all(&dir).unwrap();
        let mut def = Theme::from_json("noir", BUILTINS[4].1).unwrap().to_def();
        fs_err::write(dir.join("mine.json"), serde_json::to_string(&def).unwrap()).unwrap();
        fs_err::write(dir.join("notes.txt"), "ignored").unwrap();

        let mut registry = ThemeRegistry::empty();
        assert_eq!(registry.load_dir(&dir).unwrap(), vec!["mine".to_string()]);
        assert!(registry.get("mine").is_ok());

        def.roads.remove("service");
        fs_err::write(dir.join("broken.json"), serde_json::to_string(&def).unwrap()).unwrap();
        assert!(matches!(
            registry.load_dir(&dir),
            Err(ThemeError::IncompleteTheme { .. })
        ));
        fs_err::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_dir_is_all_or_nothing() {
        let dir = std::env::temp_dir().join(format!("poster_themes_atomic_{}", std::process::id()));
        fs_err::create_dir_all(&dir).unwrap();
        let mut def = Theme::from_json("noir", BUILTINS[4].1).unwrap().to_def();
        // Sorted before the broken file, so it'd be registered first
        fs_err::write(dir.join("a_fine.json"), serde_json::to_string(&def).unwrap()).unwrap();
        def.roads.remove("motorway");
        fs_err::write(dir.join("z_broken.json"), serde_json::to_string(&def).unwrap()).unwrap();

        let mut registry = ThemeRegistry::with_builtins().unwrap();
        let before = registry.list_names();
        assert!(registry.load_dir(&dir).is_err());
        assert_eq!(registry.list_names(), before);
        assert!(registry.get("a_fine").is_err());
        fs_err::remove_dir_all(&dir).unwrap();
    }
}
