pub mod llm;
pub mod query;
pub mod story;

pub use llm::NarrationClient;
pub use query::{QueryAnswer, answer_question, build_graph_context};
pub use story::{Chapter, build_story_prompt, chapter_range, generate_story};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NarrateError {
    #[error("language model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("language model returned an error: {0}")]
    Api(String),

    #[error("language model returned no content")]
    NoContent,

    #[error("story generation failed: {0}")]
    Story(String),
}
