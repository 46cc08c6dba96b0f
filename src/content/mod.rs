/*!
 * Content generation from paper text.
 *
 * - `core`: the `ContentGenerator` driving the language model
 * - `chunking`: recursive character splitter used by summarisation
 * - `prompts`: prompt templates and caller overrides
 */

pub use self::chunking::TextSplitter;
pub use self::core::ContentGenerator;
pub use self::prompts::{PromptSet, PromptTemplate};

pub mod chunking;
pub mod core;
pub mod prompts;
