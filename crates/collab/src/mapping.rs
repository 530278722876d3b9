//! Bijective id <-> dense index mapping.
//!
//! Serialized as the plain list of ids (position = index); the reverse lookup
//! is rebuilt on load and duplicate ids are rejected so a tampered artifact
//! cannot produce a non-bijective mapping.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct IdMapping {
    ids: Vec<String>,
    index: HashMap<String, usize>,
}

impl IdMapping {
    /// Build from observed ids. Duplicates collapse and indices follow
    /// ascending id order, so the same input always yields the same mapping.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
        let ids: Vec<String> = unique.into_iter().collect();
        let index = ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();
        Self { ids, index }
    }

    pub fn get_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get_id(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    /// Ids ordered by index
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl TryFrom<Vec<String>> for IdMapping {
    type Error = String;

    fn try_from(ids: Vec<String>) -> Result<Self, Self::Error> {
        let mut index = HashMap::with_capacity(ids.len());
        for (idx, id) in ids.iter().enumerate() {
            if index.insert(id.clone(), idx).is_some() {
                return Err(format!("duplicate id in mapping: {}", id));
            }
        }
        Ok(Self { ids, index })
    }
}

impl From<IdMapping> for Vec<String> {
    fn from(mapping: IdMapping) -> Self {
        mapping.ids
    }
}
