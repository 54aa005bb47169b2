//! Graphviz DOT rendering of a section's branching graph.
//!
//! The generated source shows every question of a section as a node, the
//! transition map as labeled edges, and a doublecircle Start/End pair
//! marking where traversal enters and falls off the section. Rendering the
//! source to an image is left to callers and the `dot` binary.

use std::fmt::Write;

use crate::flow::TransitionCategory;
use crate::template::definition::QuestionId;
use crate::template::Section;

#[cfg(feature = "debug-tools")]
use crate::error::ArtifactError;

/// Greedy word wrap to `width` columns. Existing whitespace collapses, the
/// way the labels read best inside graph nodes.
fn wrap_label(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
        } else if line.len() + 1 + word.len() <= width {
            line.push(' ');
            line.push_str(word);
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

fn escape_label(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn node_id(question: QuestionId) -> String {
    format!("q{question}")
}

impl Section<'_> {
    /// The DOT source of this section's branching graph.
    ///
    /// `debug` widens every label with positions, ids, trunk/optional
    /// flags and the matched canned answer per edge. Output ordering is
    /// deterministic: questions by position, edges in transition-map
    /// insertion order.
    pub fn generate_dot_source(&self, debug: bool) -> String {
        let map = self.generate_transition_map();
        let start_id = format!("s-{}-start", self.id());
        let end_id = format!("s-{}-end", self.id());

        let mut dot = String::new();
        writeln!(dot, "digraph {{").unwrap();
        let mut section_label = format!("Section \"{self}\"");
        if debug {
            section_label.push_str(&format!(" p{} #{}", self.position(), self.id()));
        }
        writeln!(
            dot,
            "\tsection [label=\"{}\" shape=plaintext]",
            escape_label(&section_label)
        )
        .unwrap();
        writeln!(dot, "\t\"{start_id}\" [label=\"Start\" shape=doublecircle]").unwrap();
        writeln!(dot, "\t{{").unwrap();
        writeln!(dot, "\t\trank=same").unwrap();
        writeln!(dot, "\t\tsection").unwrap();
        writeln!(dot, "\t\t\"{start_id}\"").unwrap();
        writeln!(dot, "\t}}").unwrap();
        writeln!(dot, "\t\"{end_id}\" [label=\"End\" shape=doublecircle]").unwrap();

        let first = self.first_question().map(|q| q.id());
        for question in self.questions() {
            let record = question.record();
            let label = if debug {
                let on_trunk = if record.on_trunk { '-' } else { 'N' };
                let optional = if record.optional { 'o' } else { '-' };
                format!(
                    "\"{question}\"\n<{}>\np{} #{} {on_trunk}{optional}",
                    record.input_type, record.position, record.id,
                )
            } else {
                format!("{question}\n<{}>", record.input_type)
            };
            let q_id = node_id(question.id());
            if first == Some(question.id()) {
                writeln!(dot, "\t\"{start_id}\" -> \"{q_id}\"").unwrap();
            }
            writeln!(
                dot,
                "\t\"{q_id}\" [label=\"{}\"]",
                escape_label(&wrap_label(&label, 20))
            )
            .unwrap();

            let transitions: Vec<_> = map
                .transitions()
                .iter()
                .filter(|t| t.current == question.id())
                .collect();
            if transitions.is_empty() {
                writeln!(dot, "\t\"{q_id}\" -> \"{end_id}\"").unwrap();
                continue;
            }
            for transition in transitions {
                let target = match transition.next {
                    Some(next) => node_id(next),
                    None => end_id.clone(),
                };
                let mut edge_label = transition.category.to_string();
                if debug {
                    let canned = transition.choice.as_deref().and_then(|choice| {
                        question.canned_answers().into_iter().find(|c| c.choice == choice)
                    });
                    if let Some(canned) = canned {
                        match canned.position {
                            Some(position) => {
                                edge_label.push_str(&format!(" p{position} #{}", canned.id));
                            }
                            None => edge_label.push_str(&format!(" p- #{}", canned.id)),
                        }
                        if let Some(branch) = canned.transition {
                            edge_label.push_str(&format!(" eb{branch}"));
                        }
                    }
                    if matches!(
                        transition.category,
                        TransitionCategory::CannedAnswer | TransitionCategory::ExplicitBranch
                    ) {
                        if let Some(choice) = &transition.choice {
                            edge_label.push_str(&format!(": \"{choice}\""));
                        }
                    }
                }
                writeln!(
                    dot,
                    "\t\"{q_id}\" -> \"{target}\" [label=\"{}\"]",
                    escape_label(&wrap_label(&edge_label, 15))
                )
                .unwrap();
            }
        }
        writeln!(dot, "}}").unwrap();
        dot
    }

    /// The conventional file name for this section's rendered graph.
    pub fn dot_source_filename(&self) -> String {
        format!("section-{}.gv", self.id())
    }

    /// Writes the DOT source under `directory`, creating it as needed.
    /// Returns the full path written.
    #[cfg(feature = "debug-tools")]
    pub fn write_dot_source(&self, directory: &str, debug: bool) -> Result<String, ArtifactError> {
        let path = std::path::Path::new(directory).join(self.dot_source_filename());
        std::fs::create_dir_all(directory).map_err(|e| ArtifactError::Io {
            path: directory.to_string(),
            message: e.to_string(),
        })?;
        let rendered = path.to_string_lossy().into_owned();
        std::fs::write(&path, self.generate_dot_source(debug)).map_err(|e| ArtifactError::Io {
            path: rendered.clone(),
            message: e.to_string(),
        })?;
        Ok(rendered)
    }
}
