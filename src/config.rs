use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::{BikeshareError, Result};

// ---------------------------------------------------------------------------
// Data sources
// ---------------------------------------------------------------------------

/// Cities shipped with the tool and the file each one reads.
pub const BUNDLED_CITIES: [(&str, &str); 3] = [
    ("chicago", "chicago.csv"),
    ("new york city", "new_york_city.csv"),
    ("washington", "washington.csv"),
];

/// Where the trips of one city come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub path: PathBuf,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DataSource { path: path.into() }
    }
}

/// One entry of a registry file: either a bare path or `{ "path": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SourceEntry {
    Path(PathBuf),
    Detailed { path: PathBuf },
}

impl SourceEntry {
    fn into_path(self) -> PathBuf {
        match self {
            SourceEntry::Path(p) | SourceEntry::Detailed { path: p } => p,
        }
    }
}

// ---------------------------------------------------------------------------
// CityRegistry
// ---------------------------------------------------------------------------

/// Lowercase city name → data source. Built once and handed to the loader.
#[derive(Debug, Clone, Default)]
pub struct CityRegistry {
    cities: BTreeMap<String, DataSource>,
}

impl CityRegistry {
    /// The three bundled cities, resolved against `data_dir`.
    pub fn bundled(data_dir: &Path) -> Self {
        Self::from_entries(
            BUNDLED_CITIES
                .iter()
                .map(|(city, file)| (city.to_string(), DataSource::new(data_dir.join(file)))),
        )
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, DataSource)>,
    {
        let cities = entries
            .into_iter()
            .map(|(city, source)| (normalize_city(&city), source))
            .collect();
        CityRegistry { cities }
    }

    /// Load a registry from a JSON object such as
    ///
    /// ```json
    /// { "chicago": "chicago.csv", "boston": { "path": "/srv/trips/boston.json" } }
    /// ```
    ///
    /// Relative paths are taken relative to the registry file itself.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| BikeshareError::data_source(path, e))?;
        let raw: BTreeMap<String, SourceEntry> =
            serde_json::from_str(&text).map_err(|e| BikeshareError::Registry {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if raw.is_empty() {
            return Err(BikeshareError::Registry {
                path: path.to_path_buf(),
                reason: "no cities defined".to_string(),
            });
        }

        let invalid = |reason: String| BikeshareError::Registry {
            path: path.to_path_buf(),
            reason,
        };

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let mut cities = BTreeMap::new();
        for (name, entry) in raw {
            let city = normalize_city(&name);
            if city.is_empty() {
                return Err(invalid("city names must not be blank".to_string()));
            }
            if cities.contains_key(&city) {
                return Err(invalid(format!("city '{city}' is defined more than once")));
            }
            let file = entry.into_path();
            let resolved = if file.is_absolute() {
                file
            } else {
                base.join(file)
            };
            cities.insert(city, DataSource::new(resolved));
        }
        let registry = CityRegistry { cities };

        debug!(
            "Loaded {} cities from {}",
            registry.cities.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn source(&self, city: &str) -> Option<&DataSource> {
        self.cities.get(city)
    }

    pub fn contains(&self, city: &str) -> bool {
        self.cities.contains_key(city)
    }

    /// Registered city keys in sorted order.
    pub fn city_names(&self) -> impl Iterator<Item = &str> {
        self.cities.keys().map(String::as_str)
    }

    /// Human list for prompts: "Chicago, New York City, or Washington".
    pub fn display_list(&self) -> String {
        let names: Vec<String> = self.city_names().map(title_case).collect();
        match names.as_slice() {
            [] => String::new(),
            [one] => one.clone(),
            [a, b] => format!("{a} or {b}"),
            [head @ .., last] => format!("{}, or {last}", head.join(", ")),
        }
    }
}

pub fn normalize_city(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Capitalise the first letter of every whitespace-separated word.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_bundled_registry_resolves_against_data_dir() {
        let registry = CityRegistry::bundled(Path::new("/data/trips"));
        assert_eq!(registry.city_names().count(), 3);
        assert_eq!(
            registry.source("new york city").unwrap().path,
            PathBuf::from("/data/trips/new_york_city.csv")
        );
        assert!(registry.contains("washington"));
        assert!(!registry.contains("boston"));
    }

    #[test]
    fn test_display_list() {
        let registry = CityRegistry::bundled(Path::new("."));
        assert_eq!(
            registry.display_list(),
            "Chicago, New York City, or Washington"
        );

        let two = CityRegistry::from_entries(vec![
            ("Boston".to_string(), DataSource::new("b.csv")),
            ("austin".to_string(), DataSource::new("a.csv")),
        ]);
        assert_eq!(two.display_list(), "Austin or Boston");
    }

    #[test]
    fn test_from_entries_normalizes_names() {
        let registry = CityRegistry::from_entries(vec![(
            "  San Francisco ".to_string(),
            DataSource::new("sf.csv"),
        )]);
        assert!(registry.contains("san francisco"));
    }

    #[test]
    fn test_registry_json_relative_and_absolute_paths() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let file = dir.join("cities.json");
        fs::write(
            &file,
            r#"{ "Chicago": "chi.csv", "boston": { "path": "/srv/boston.csv" } }"#,
        )
        .unwrap();

        let registry = CityRegistry::from_json_file(&file).unwrap();
        assert_eq!(registry.source("chicago").unwrap().path, dir.join("chi.csv"));
        assert_eq!(
            registry.source("boston").unwrap().path,
            PathBuf::from("/srv/boston.csv")
        );
    }

    #[test]
    fn test_registry_json_rejects_empty_and_malformed() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let empty = dir.join("empty.json");
        fs::write(&empty, "{}").unwrap();
        assert!(matches!(
            CityRegistry::from_json_file(&empty),
            Err(BikeshareError::Registry { .. })
        ));

        let broken = dir.join("broken.json");
        fs::write(&broken, "[1, 2").unwrap();
        assert!(matches!(
            CityRegistry::from_json_file(&broken),
            Err(BikeshareError::Registry { .. })
        ));

        assert!(matches!(
            CityRegistry::from_json_file(&dir.join("missing.json")),
            Err(BikeshareError::DataSource { .. })
        ));
    }

    #[test]
    fn test_registry_json_rejects_names_that_collide() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("cities.json");
        fs::write(&file, r#"{ "Chicago": "a.csv", "chicago ": "b.csv" }"#).unwrap();

        match CityRegistry::from_json_file(&file) {
            Err(BikeshareError::Registry { reason, .. }) => {
                assert_eq!(reason, "city 'chicago' is defined more than once");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let blank = tmp.path().join("blank.json");
        fs::write(&blank, r#"{ "  ": "a.csv" }"#).unwrap();
        assert!(matches!(
            CityRegistry::from_json_file(&blank),
            Err(BikeshareError::Registry { .. })
        ));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new york city"), "New York City");
        assert_eq!(title_case("march"), "March");
        assert_eq!(title_case(""), "");
    }
}
