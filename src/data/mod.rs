//! Answer data as supplied by the plan-answering UI or API.

mod model;

pub use model::{Answer, AnswerMap, answer_for, load_answers};
