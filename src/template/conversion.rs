use super::definition::TemplateDefinition;
use crate::error::TemplateConversionError;

/// A trait for custom data models that can be converted into a veiviser
/// [`TemplateDefinition`].
///
/// This is the primary extension point for making veiviser format-agnostic.
/// By implementing this trait on your own model structs, you provide a
/// translation layer that lets the template builder consume question data in
/// whatever shape your storage layer keeps it.
///
/// # Example
///
/// ```rust,no_run
/// use veiviser::prelude::*;
/// use veiviser::error::TemplateConversionError;
///
/// // 1. Define your custom structs for parsing your format.
/// struct MyQuestionRow { id: u32, section: u32, order: u32, text: String }
/// struct MySurvey { title: String, rows: Vec<MyQuestionRow> }
///
/// // 2. Implement `IntoTemplate` for your top-level struct.
/// impl IntoTemplate for MySurvey {
///     fn into_template(self) -> Result<TemplateDefinition, TemplateConversionError> {
///         let mut questions = Vec::new();
///         let mut sections = Vec::new();
///         for row in self.rows {
///             // Your logic to convert a row into a QuestionDefinition
///             questions.push(QuestionDefinition {
///                 id: QuestionId(row.id),
///                 section: SectionId(row.section),
///                 position: row.order,
///                 input_type: "shortfreetext".to_string(),
///                 question: row.text,
/// #                label: String::new(),
/// #                framing_text: String::new(),
/// #                help_text: String::new(),
/// #                optional_canned_text: String::new(),
/// #                optional: false,
/// #                on_trunk: true,
/// #                has_notes: false,
///             });
///         }
/// #        sections.push(SectionDefinition {
/// #            id: SectionId(1), title: "All".into(), label: String::new(),
/// #            position: 1, introductory_text: String::new(), comment: String::new(),
/// #            super_section: None, optional: false,
/// #        });
///
///         Ok(TemplateDefinition {
///             title: self.title,
///             sections,
///             questions,
///             ..Default::default()
///         })
///     }
/// }
/// ```
pub trait IntoTemplate {
    /// Consumes the object and converts it into a buildable template
    /// definition.
    fn into_template(self) -> Result<TemplateDefinition, TemplateConversionError>;
}

impl IntoTemplate for TemplateDefinition {
    fn into_template(self) -> Result<TemplateDefinition, TemplateConversionError> {
        Ok(self)
    }
}
