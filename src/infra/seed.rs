//! JSON content file loading.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::entities::{CategoryRecord, PostRecord};

use super::error::InfraError;

/// On-disk layout: `{ "categories": [...], "posts": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentSeed {
    pub categories: Vec<CategoryRecord>,
    pub posts: Vec<PostRecord>,
}

pub fn load_seed(path: &Path) -> Result<ContentSeed, InfraError> {
    let raw = fs::read_to_string(path)?;
    let seed: ContentSeed = serde_json::from_str(&raw).map_err(|source| InfraError::Seed {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        posts = seed.posts.len(),
        categories = seed.categories.len(),
        "Read content file"
    );
    Ok(seed)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_seed_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{
                "categories": [{{
                    "id": "00000000-0000-0000-0000-00000000000a",
                    "slug": "web",
                    "name": "Web",
                    "status": "published",
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-01-01T00:00:00Z"
                }}]
            }}"#
        )
        .expect("write seed");

        let seed = load_seed(file.path()).expect("seed loads");
        assert_eq!(seed.categories.len(), 1);
        assert!(seed.posts.is_empty());
    }

    #[test]
    fn malformed_seed_reports_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "posts": "nope" }}"#).expect("write seed");

        let err = load_seed(file.path()).expect_err("malformed seed");
        assert!(matches!(err, InfraError::Seed { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_seed(Path::new("/definitely/not/here.json")).expect_err("missing");
        assert!(matches!(err, InfraError::Io(_)));
    }
}
