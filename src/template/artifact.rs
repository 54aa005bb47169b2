//! A precomputed snapshot of a template's branching structure.
//!
//! Generating every path through a large branching section is the most
//! expensive query the engine answers. The artifact captures the per-section
//! transition lists and enumerated paths once, to be cached on disk and
//! reloaded without touching the template again.

use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

use crate::error::{ArtifactError, TraversalError};
use crate::flow::Transition;
use crate::template::definition::{QuestionId, SectionId};
use crate::template::Template;

/// The flattened branching structure of one section.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SectionGraph {
    pub section: SectionId,
    /// The section's first question; `None` for an empty section.
    pub start: Option<QuestionId>,
    pub transitions: Vec<Transition>,
    pub paths: Vec<Vec<QuestionId>>,
}

/// Per-section graphs in hierarchy order, ready to serialize.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GraphArtifact {
    pub template_title: String,
    pub sections: Vec<SectionGraph>,
}

impl GraphArtifact {
    pub fn section(&self, id: SectionId) -> Option<&SectionGraph> {
        self.sections.iter().find(|graph| graph.section == id)
    }

    /// Saves the artifact to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), ArtifactError> {
        let bytes =
            encode_to_vec(self, standard()).map_err(|e| ArtifactError::Encode(e.to_string()))?;
        let mut file = fs::File::create(path).map_err(|e| ArtifactError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        file.write_all(&bytes).map_err(|e| ArtifactError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Loads an artifact from a file.
    pub fn from_file(path: &str) -> Result<Self, ArtifactError> {
        let mut file = fs::File::open(path).map_err(|e| ArtifactError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| ArtifactError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }

    /// Deserializes an artifact from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        decode_from_slice(bytes, standard())
            .map(|(artifact, _)| artifact) // bincode 2 returns a tuple (data, bytes_read)
            .map_err(|e| ArtifactError::Decode(e.to_string()))
    }
}

impl Template {
    /// Computes the transition list and the full path enumeration of every
    /// section.
    pub fn generate_graph_artifact(&self) -> Result<GraphArtifact, TraversalError> {
        let mut sections = Vec::new();
        for section in self.ordered_sections() {
            let map = section.generate_transition_map();
            sections.push(SectionGraph {
                section: section.id(),
                start: section.first_question().map(|q| q.id()),
                transitions: map.to_list(),
                paths: section.find_all_paths()?,
            });
        }
        log::info!(
            "Generated graph artifact for '{}': {} sections",
            self.title(),
            sections.len()
        );
        Ok(GraphArtifact {
            template_title: self.title().to_string(),
            sections,
        })
    }
}
