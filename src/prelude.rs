//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! veiviser crate. Import this module to get access to the core functionality
//! without having to import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! // Use the prelude to get easy access to all the core types.
//! use veiviser::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! // Load and build a template
//! let definition = TemplateDefinition::from_file("path/to/template.json")?;
//! let template = Template::builder(definition).build()?;
//!
//! // Load recorded answers and check them against the graph
//! let answers = veiviser::data::load_answers("path/to/answers.json")?;
//! let complete = template.validate_data(&answers)?;
//!
//! println!("Template '{}' complete: {}", template.title(), complete);
//! # Ok(())
//! # }
//! ```

// Core template building and traversal
pub use crate::template::{Question, Section, Template, TemplateBuilder};

// Definition types, the canonical import/export model
pub use crate::template::definition::{
    BranchDefinition, BranchId, CannedAnswerDefinition, CannedAnswerId, QuestionDefinition,
    QuestionId, SectionDefinition, SectionId, TemplateDefinition,
};
pub use crate::template::{GraphArtifact, IntoTemplate, SectionGraph};

// Flow primitives
pub use crate::flow::{Transition, TransitionCategory, TransitionMap};

// Answer data
pub use crate::data::{Answer, AnswerMap};

// Input type extension point
pub use crate::inputs::{InputType, InputTypeRegistry, QuestionContext};

// Error types
pub use crate::error::{TemplateBuildError, TraversalError};

// Standard library re-exports commonly used with this crate
pub use std::path::Path;

// Result type alias for convenience
pub type Result<T, E = Box<dyn std::error::Error>> = std::result::Result<T, E>;
