//! Building an [`InteractionIndex`] from a dataset directory.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::info;

impl InteractionIndex {
    /// Load users, repositories and interactions from `data_dir`.
    ///
    /// The three files are parsed in parallel, inserted, then validated so
    /// that every interaction points at a known user and repository.
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!(data_dir = %data_dir.display(), "Loading interaction dataset");

        let users_path = data_dir.join("users.dat");
        let repos_path = data_dir.join("repos.dat");
        let interactions_path = data_dir.join("interactions.dat");

        let ((users, repos), interactions) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_repos(&repos_path),
                )
            },
            || parser::parse_interactions(&interactions_path),
        );

        let users = users?;
        let repos = repos?;
        let interactions = interactions?;

        info!(
            users = users.len(),
            repos = repos.len(),
            interactions = interactions.len(),
            "Parsed dataset files"
        );

        let mut index = InteractionIndex::new();
        for user in users {
            index.insert_user(user);
        }
        for repo in repos {
            index.insert_repo(repo);
        }
        for interaction in interactions {
            index.insert_interaction(interaction);
        }

        index.validate()?;
        Ok(index)
    }

    /// Check that every interaction references a known user and repository
    pub fn validate(&self) -> Result<()> {
        for interaction in &self.interactions {
            if !self.users.contains_key(&interaction.user_id) {
                return Err(DataLoadError::MissingReference {
                    entity: "User".to_string(),
                    id: interaction.user_id.clone(),
                });
            }
            if !self.repos.contains_key(&interaction.repo_id) {
                return Err(DataLoadError::MissingReference {
                    entity: "Repository".to_string(),
                    id: interaction.repo_id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_dataset(dir: &Path, interactions: &str) {
        fs::write(dir.join("users.dat"), "u1::ada::rust::backend::cli\nu2::bob::go::::\n").unwrap();
        fs::write(
            dir.join("repos.dat"),
            "r1::a/b::A Rust CLI toolkit::Rust::cli\nr2::c/d::A Go web server::Go::web\n",
        )
        .unwrap();
        fs::write(dir.join("interactions.dat"), interactions).unwrap();
    }

    #[test]
    fn test_load_dataset() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "u1::r1::saved\nu1::r2::left::not my stack\nu2::r2::right\n");

        let index = InteractionIndex::load_from_files(dir.path()).unwrap();
        assert_eq!(index.counts(), (2, 2, 3));
        assert!(index.rejected_repos("u1").contains("r2"));
        assert_eq!(index.feedback_reason("u1", "r2"), Some("not my stack"));
    }

    #[test]
    fn test_dangling_repo_reference() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "u1::r9::saved\n");

        match InteractionIndex::load_from_files(dir.path()) {
            Err(DataLoadError::MissingReference { entity, id }) => {
                assert_eq!(entity, "Repository");
                assert_eq!(id, "r9");
            }
            other => panic!("expected missing reference, got {:?}", other.map(|i| i.counts())),
        }
    }
}
