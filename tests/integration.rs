//! Integration tests for Veiviser
//!
//! End-to-end tests that verify the complete functionality works together.
//!
mod common;
use common::*;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use veiviser::error::{ArtifactError, TemplateConversionError};
use veiviser::prelude::*;

const TEMPLATE_JSON: &str = r#"{
    "title": "Data Management Plan",
    "description": "Minimal plan used by the integration tests",
    "sections": [
        {"id": 1, "title": "Collection", "position": 1},
        {"id": 2, "title": "Publication", "position": 2}
    ],
    "questions": [
        {"id": 1, "section": 1, "position": 1, "input_type": "bool",
         "question": "Will you collect personal data?"},
        {"id": 2, "section": 1, "position": 2, "input_type": "choice",
         "question": "Which consent form will you use?", "on_trunk": false},
        {"id": 3, "section": 1, "position": 3, "input_type": "reason",
         "question": "Why is the data needed?"},
        {"id": 4, "section": 2, "position": 1, "input_type": "date",
         "question": "When will the dataset be published?"}
    ],
    "canned_answers": [
        {"id": 1, "question": 1, "choice": "Yes", "position": 1},
        {"id": 2, "question": 1, "choice": "No", "position": 2, "transition": 1},
        {"id": 3, "question": 2, "choice": "Standard", "position": 1},
        {"id": 4, "question": 2, "choice": "Custom", "position": 2}
    ],
    "branches": [
        {"id": 1, "current_question": 1, "category": "CannedAnswer",
         "condition": "No", "next_question": 3}
    ]
}"#;

fn setup_test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("veiviser_tests").join(name);
    fs::create_dir_all(&dir).expect("Failed to create test directory");
    dir
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_json_template_end_to_end() {
        let definition =
            TemplateDefinition::from_json(TEMPLATE_JSON).expect("Failed to parse template JSON");
        let template = Template::builder(definition).build().expect("Failed to build template");

        assert_eq!(template.title(), "Data Management Plan");
        assert_eq!(template.questions().len(), 4);
        assert!(template.is_design_valid());

        let q1 = template.first_question().expect("Expected a first question");
        assert_eq!(q1.id(), QuestionId(1));

        let mut answers = AnswerMap::new();
        answer(&mut answers, 1, json!("No"));
        let next = q1
            .next_question(&answers, false)
            .expect("Failed to step")
            .expect("Expected a next question");
        assert_eq!(next.id(), QuestionId(3), "'No' skips the consent question");

        answer(&mut answers, 3, json!("Only anonymized aggregates are stored"));
        answer(&mut answers, 4, json!("2027-01-01"));
        assert!(template.validate_data(&answers).expect("Failed to validate answers"));
        println!("Validated {} answers against '{}'", answers.len(), template.title());

        let mut answers = AnswerMap::new();
        answer(&mut answers, 1, json!("Yes"));
        let next = q1
            .next_question(&answers, false)
            .expect("Failed to step")
            .expect("Expected a next question");
        assert_eq!(next.id(), QuestionId(2), "'Yes' walks into the consent question");
    }

    #[test]
    fn test_template_from_file() {
        let dir = setup_test_dir("from_file");
        let path = dir.join("template.json");
        fs::write(&path, TEMPLATE_JSON).expect("Failed to write template file");

        let definition = TemplateDefinition::from_file(&path).expect("Failed to load template");
        let template = build(definition);
        assert_eq!(template.title(), "Data Management Plan");

        let missing = dir.join("missing.json");
        match TemplateDefinition::from_file(&missing).err().unwrap() {
            TemplateBuildError::JsonParseError(message) => assert!(!message.is_empty()),
            _ => panic!("Expected JsonParseError error"),
        }

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_definition_json_round_trip() {
        let definition = shortcut_template();
        let json = serde_json::to_string_pretty(&definition).expect("Failed to serialize");
        let parsed = TemplateDefinition::from_json(&json).expect("Failed to reparse definition");

        assert_eq!(parsed.sections.len(), definition.sections.len());
        assert_eq!(parsed.questions.len(), definition.questions.len());
        assert_eq!(parsed.canned_answers.len(), definition.canned_answers.len());
        assert_eq!(parsed.branches.len(), definition.branches.len());

        let template = build(parsed);
        assert_eq!(template.title(), "Shortcut");
    }

    #[test]
    fn test_graph_artifact_round_trip() {
        let template = build(diamond_template());
        let artifact = template.generate_graph_artifact().expect("Failed to generate artifact");
        assert_eq!(artifact.template_title, "Diamond");
        assert_eq!(artifact.sections.len(), 1);

        let graph = artifact.section(SectionId(1)).expect("Expected a section graph");
        assert_eq!(graph.start, Some(QuestionId(1)));
        assert_eq!(graph.transitions.len(), 5);
        assert_eq!(
            graph.paths,
            vec![
                vec![QuestionId(1), QuestionId(2), QuestionId(4)],
                vec![QuestionId(1), QuestionId(3), QuestionId(4)],
            ]
        );

        let dir = setup_test_dir("artifact");
        let path = dir.join("diamond.bin");
        let path_str = path.to_str().expect("Failed to render path");
        artifact.save(path_str).expect("Failed to save artifact");

        let reloaded = GraphArtifact::from_file(path_str).expect("Failed to reload artifact");
        assert_eq!(reloaded.template_title, artifact.template_title);
        assert_eq!(reloaded.sections.len(), 1);
        assert_eq!(reloaded.section(SectionId(1)).unwrap().paths, graph.paths);
        println!("Artifact round-tripped through {}", path_str);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_artifact_error_variants() {
        match GraphArtifact::from_bytes(&[0xff, 0xff, 0xff]).err().unwrap() {
            ArtifactError::Decode(message) => assert!(!message.is_empty()),
            _ => panic!("Expected Decode error"),
        }

        match GraphArtifact::from_file("/nonexistent/veiviser/artifact.bin").err().unwrap() {
            ArtifactError::Io { path, .. } => assert!(path.contains("nonexistent")),
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_dot_source_output() {
        let template = build(shortcut_template());
        let section = template.section(SectionId(1)).unwrap();
        assert_eq!(section.dot_source_filename(), "section-1.gv");

        let dot = section.generate_dot_source(false);
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("Shortcut: Branching"));
        assert!(dot.contains("\"s-1-start\" [label=\"Start\" shape=doublecircle]"));
        assert!(dot.contains("\"s-1-end\" [label=\"End\" shape=doublecircle]"));
        assert!(dot.contains("\"s-1-start\" -> \"q1\""));
        assert!(dot.contains("<bool>"));
        assert!(dot.contains("\"q1\" -> \"q3\" [label=\"CannedAnswer\"]"));
        assert!(dot.contains("\"q3\" -> \"s-1-end\" [label=\"last\"]"));

        let debug = section.generate_dot_source(true);
        assert!(debug.contains("p1 #1"), "Debug labels carry canned-answer ids");
        assert!(debug.contains("eb1"), "Debug labels name the linked branch");

        let dir = setup_test_dir("dot");
        let path = dir.join(section.dot_source_filename());
        fs::write(&path, &dot).expect("Failed to write DOT source");
        assert!(path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_full_walk_through_template() {
        let template = build(optional_section_template());
        let mut answers = AnswerMap::new();
        answer(&mut answers, 10, json!("No"));
        answer(&mut answers, 21, json!("done"));

        let mut visited = Vec::new();
        let mut current = template.first_question();
        while let Some(question) = current {
            visited.push(question.id());
            current = question.next_question(&answers, false).expect("Failed to step");
        }

        assert_eq!(visited, vec![QuestionId(10), QuestionId(21)]);
        assert!(template.validate_data(&answers).expect("Failed to validate answers"));
        println!("Visited {} questions", visited.len());
    }

    struct LegacySurvey {
        name: String,
        prompts: Vec<(u32, String)>,
    }

    impl IntoTemplate for LegacySurvey {
        fn into_template(self) -> Result<TemplateDefinition, TemplateConversionError> {
            if self.prompts.is_empty() {
                return Err(TemplateConversionError::ValidationError(
                    "survey has no prompts".to_string(),
                ));
            }
            let questions = self
                .prompts
                .into_iter()
                .enumerate()
                .map(|(index, (id, text))| {
                    let mut converted = question(id, 1, index as u32 + 1, "shortfreetext");
                    converted.question = text;
                    converted
                })
                .collect();
            Ok(TemplateDefinition {
                title: self.name,
                sections: vec![section(1, 1, "Imported")],
                questions,
                ..Default::default()
            })
        }
    }

    #[test]
    fn test_custom_model_conversion() {
        let survey = LegacySurvey {
            name: "Legacy import".to_string(),
            prompts: vec![(1, "First?".to_string()), (2, "Second?".to_string())],
        };
        let definition = survey.into_template().expect("Failed to convert survey");
        let template = build(definition);
        assert_eq!(template.title(), "Legacy import");
        assert_eq!(template.questions().len(), 2);
        assert_eq!(template.first_question().unwrap().to_string(), "First?");

        let empty = LegacySurvey {
            name: "Empty".to_string(),
            prompts: Vec::new(),
        };
        match empty.into_template().err().unwrap() {
            TemplateConversionError::ValidationError(message) => {
                assert!(message.contains("no prompts"));
            }
        }
    }
}
