//! Question Data
//!
//! Quiz entities and the read-only source the engine walks through.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::messages::capitalize;

/// Number of multiple-choice options per entity.
pub const OPTION_COUNT: usize = 4;

/// Artwork base URL for the built-in question set.
const ARTWORK_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

// =============================================================================
// QUIZ ENTITY
// =============================================================================

/// One question: an image and four candidate names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizEntity {
    /// Opaque identifier.
    pub id: u32,
    /// Canonical lowercase answer.
    pub name: String,
    /// Image URL, passed through to presentation.
    #[serde(alias = "imageURL", alias = "image_url")]
    pub image_ref: String,
    /// Answer candidates, one of which matches `name`.
    pub options: Vec<String>,
}

impl QuizEntity {
    /// Create an entity.
    pub fn new<I, S>(id: u32, name: impl Into<String>, image_ref: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            name: name.into(),
            image_ref: image_ref.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Case-insensitive answer check. No trimming.
    pub fn is_answer(&self, candidate: &str) -> bool {
        candidate.to_lowercase() == self.name.to_lowercase()
    }

    /// Name as shown to the player ("pikachu" -> "Pikachu").
    pub fn display_name(&self) -> String {
        capitalize(&self.name)
    }

    /// Check the entity is answerable.
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.name.is_empty() {
            return Err(SourceError::EmptyName { id: self.id });
        }
        if self.options.len() != OPTION_COUNT {
            return Err(SourceError::WrongOptionCount {
                id: self.id,
                count: self.options.len(),
            });
        }
        if !self.options.iter().any(|option| self.is_answer(option)) {
            return Err(SourceError::AnswerNotInOptions {
                id: self.id,
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// QUESTION SOURCE
// =============================================================================

/// Immutable, ordered question list. Cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionSource {
    entities: Arc<[QuizEntity]>,
}

impl QuestionSource {
    /// Wrap a list of entities as-is.
    ///
    /// No validation: an entity whose name is missing from its options
    /// simply cannot be answered correctly.
    pub fn new(entities: Vec<QuizEntity>) -> Self {
        Self {
            entities: entities.into(),
        }
    }

    /// Validated source.
    pub fn validated(entities: Vec<QuizEntity>) -> Result<Self, SourceError> {
        for entity in &entities {
            entity.validate()?;
        }
        Ok(Self::new(entities))
    }

    /// Parse a JSON array of entities and validate it.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let entities: Vec<QuizEntity> = serde_json::from_str(json)?;
        Self::validated(entities)
    }

    /// Load and validate a JSON question file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The five starter questions the game ships with.
    pub fn builtin() -> Self {
        let entry = |id: u32, name: &str, options: [&str; OPTION_COUNT]| {
            QuizEntity::new(id, name, format!("{}/{}.png", ARTWORK_BASE, id), options)
        };

        Self::new(vec![
            entry(25, "pikachu", ["pikachu", "raichu", "pichu", "voltorb"]),
            entry(1, "bulbasaur", ["bulbasaur", "ivysaur", "venusaur", "oddish"]),
            entry(4, "charmander", ["charmander", "charmeleon", "charizard", "growlithe"]),
            entry(7, "squirtle", ["squirtle", "wartortle", "blastoise", "psyduck"]),
            entry(150, "mewtwo", ["mewtwo", "mew", "alakazam", "hypno"]),
        ])
    }

    /// Entity at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&QuizEntity> {
        self.entities.get(index)
    }

    /// Number of entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if there is nothing to ask.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate in question order.
    pub fn iter(&self) -> impl Iterator<Item = &QuizEntity> {
        self.entities.iter()
    }
}

impl Default for QuestionSource {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Question data errors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Question file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// JSON did not describe a list of entities.
    #[error("invalid question data: {0}")]
    Parse(#[from] serde_json::Error),
    /// Entity has an empty name.
    #[error("entity {id} has an empty name")]
    EmptyName {
        /// Offending entity.
        id: u32,
    },
    /// Entity does not carry exactly four options.
    #[error("entity {id} has {count} options, expected 4")]
    WrongOptionCount {
        /// Offending entity.
        id: u32,
        /// Options found.
        count: usize,
    },
    /// None of the options matches the answer.
    #[error("entity {id}: answer {name:?} is not among its options")]
    AnswerNotInOptions {
        /// Offending entity.
        id: u32,
        /// The expected answer.
        name: String,
    },
}
