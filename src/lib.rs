//! # Veiviser - Question Graph Branching and Traversal Engine
//!
//! **Veiviser** is a branching-logic engine for question templates: forms
//! whose questions are organized into sections and where the answer to one
//! question decides which question comes next. Veiviser builds the template
//! into an indexed, validated graph ahead of time, then answers the runtime
//! questions cheaply: what comes next, what came before, which answers are
//! still missing, and whether a set of answers completes the template.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic. It operates on a canonical internal model
//! of a "template definition." The primary workflow is:
//!
//! 1.  **Load Your Data**: Parse your custom template format (e.g., from JSON, a
//!     database, etc.) into your own Rust structs.
//! 2.  **Convert to Veiviser's Model**: Implement the `IntoTemplate` trait for your
//!     structs to provide a translation layer into Veiviser's `TemplateDefinition`.
//!     Templates stored in the native JSON format skip this step via
//!     `TemplateDefinition::from_file`.
//! 3.  **Build**: Use `Template::builder` to validate the definition and index it
//!     for traversal. Broken references, duplicate positions and missing section
//!     toggles are caught here, once, instead of at every lookup.
//! 4.  **Traverse and Validate**: Ask the built template for next/previous
//!     questions against a set of recorded answers, enumerate the possible paths
//!     through each section, validate answer sets, and generate canned text.
//!
//! ## Quick Start
//!
//! The following example demonstrates the end-to-end process.
//!
//! ```rust,no_run
//! use veiviser::prelude::*;
//! use veiviser::data::Answer;
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. A small branching template in the native JSON format: answering
//!     //    "No" to the first question jumps straight out of the section.
//!     let definition = TemplateDefinition::from_json(
//!         r#"{
//!             "title": "Data management plan",
//!             "sections": [
//!                 {"id": 1, "title": "Sensitive data", "position": 1}
//!             ],
//!             "questions": [
//!                 {"id": 1, "section": 1, "position": 1, "input_type": "bool",
//!                  "question": "Will you store sensitive data?"},
//!                 {"id": 2, "section": 1, "position": 2, "input_type": "reason",
//!                  "question": "Describe the protective measures.", "on_trunk": false}
//!             ],
//!             "canned_answers": [
//!                 {"id": 1, "question": 1, "choice": "Yes", "position": 1},
//!                 {"id": 2, "question": 1, "choice": "No", "position": 2, "transition": 1}
//!             ],
//!             "branches": [
//!                 {"id": 1, "current_question": 1, "category": "CannedAnswer",
//!                  "condition": "No", "next_question": null}
//!             ]
//!         }"#,
//!     )?;
//!
//!     // 2. Build: validates every cross-reference and indexes the graph.
//!     let template = Template::builder(definition).build()?;
//!
//!     // 3. Traverse against recorded answers.
//!     let mut answers = AnswerMap::default();
//!     answers.insert("1".to_string(), Answer::new(json!("No")));
//!
//!     let first = template.first_question().ok_or("empty template")?;
//!     match first.next_question(&answers, true)? {
//!         Some(next) => println!("-> Next up: {}", next),
//!         None => println!("-> Section done."),
//!     }
//!
//!     // 4. Validate the whole answer set.
//!     if template.validate_data(&answers)? {
//!         println!("-> Plan is complete.");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod error;
pub mod flow;
pub mod graph;
pub mod inputs;
pub mod prelude;
pub mod template;
pub mod viz;
