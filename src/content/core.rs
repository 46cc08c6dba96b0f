/*!
 * Content generator.
 *
 * Drives the language model through the four chained requests of a
 * session: summary, key ideas, blog post and video script. Model failures
 * are returned to the caller unchanged; nothing is retried.
 */

use log::{debug, info};
use std::sync::Arc;

use super::chunking::TextSplitter;
use super::prompts::{PromptSet, PromptTemplate};
use crate::app_config::Config;
use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Generation, Provider};

/// Joins partial summaries before the combine step
const SUMMARY_SEPARATOR: &str = "\n\n";

/// Generates every text artifact derived from a paper
pub struct ContentGenerator {
    provider: Arc<dyn Provider>,
    splitter: TextSplitter,
    max_combine_chars: usize,
    temperature: f32,
    max_tokens: u32,
    prompts: PromptSet,
}

impl ContentGenerator {
    /// Create a generator using the given provider and configuration
    pub fn new(provider: Arc<dyn Provider>, config: &Config) -> Self {
        Self {
            provider,
            splitter: TextSplitter::new(config.paper.chunk_size, config.paper.chunk_overlap),
            max_combine_chars: config.paper.max_combine_chars.max(1),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
            prompts: PromptSet::from_overrides(&config.prompts),
        }
    }

    /// Templates in use
    pub fn prompts(&self) -> &PromptSet {
        &self.prompts
    }

    /// Send one prompt to the model
    pub async fn generate(&self, prompt: String) -> Result<Generation, ProviderError> {
        let request = CompletionRequest::new(prompt)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);
        self.provider.complete(request).await
    }

    /// Summarize the paper with a map-reduce pass over overlapping chunks
    pub async fn summarize(&self, paper_text: &str) -> Result<Generation, ProviderError> {
        let chunks = self.splitter.split(paper_text);
        info!("Summarizing {} chunk(s) with {}", chunks.len(), self.provider.name());

        let mut partials = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            debug!("Summarizing chunk {}/{}", i + 1, chunks.len());
            partials.push(self.summarize_text(&self.prompts.summary, chunk).await?);
        }

        let partials = self.collapse(partials).await?;
        let summary = self.summarize_text(&self.prompts.summary, &partials.join(SUMMARY_SEPARATOR)).await?;
        Ok(Generation::new(summary))
    }

    /// Shrink partial summaries until they fit the combine prompt
    async fn collapse(&self, mut partials: Vec<String>) -> Result<Vec<String>, ProviderError> {
        loop {
            let total = combined_len(&partials);
            if total <= self.max_combine_chars || partials.len() <= 1 {
                return Ok(partials);
            }

            let groups = group_by_size(&partials, self.max_combine_chars);
            debug!("Collapsing {} partial summaries into {} group(s)", partials.len(), groups.len());

            let mut collapsed = Vec::with_capacity(groups.len());
            for group in groups {
                collapsed.push(self.summarize_text(&self.prompts.summary, &group.join(SUMMARY_SEPARATOR)).await?);
            }

            // No progress means another round would loop forever
            if collapsed.len() >= partials.len() && combined_len(&collapsed) >= total {
                return Ok(collapsed);
            }
            partials = collapsed;
        }
    }

    async fn summarize_text(&self, template: &PromptTemplate, text: &str) -> Result<String, ProviderError> {
        let generation = self.generate(template.render(&[("text", text)])).await?;
        Ok(generation.text.trim().to_string())
    }

    /// Extract contributions, methodologies and thesis from the full paper text
    pub async fn extract_key_ideas(&self, paper_text: &str) -> Result<Generation, ProviderError> {
        info!("Extracting key ideas");
        self.generate(self.prompts.key_ideas.render(&[("text", paper_text)])).await
    }

    /// Write a blog post from the summary and key ideas
    pub async fn generate_blog_post(&self, summary: &str, key_ideas: &str) -> Result<Generation, ProviderError> {
        info!("Generating blog post");
        self.generate(self.prompts.blog_post.render(&[("summary", summary), ("key_ideas", key_ideas)])).await
    }

    /// Write the narrated video script, including `[VISUAL: ...]` cues
    pub async fn generate_video_script(&self, summary: &str, key_ideas: &str) -> Result<Generation, ProviderError> {
        info!("Generating video script");
        self.generate(self.prompts.video_script.render(&[("summary", summary), ("key_ideas", key_ideas)])).await
    }
}

fn combined_len(parts: &[String]) -> usize {
    let separators = parts.len().saturating_sub(1) * SUMMARY_SEPARATOR.len();
    parts.iter().map(|p| p.chars().count()).sum::<usize>() + separators
}

/// Greedily pack consecutive parts into groups no larger than `limit`.
/// A single oversized part still forms its own group.
fn group_by_size(parts: &[String], limit: usize) -> Vec<Vec<String>> {
    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0usize;

    for part in parts {
        let len = part.chars().count();
        let extra = if current.is_empty() { len } else { len + SUMMARY_SEPARATOR.len() };
        if !current.is_empty() && current_len + extra > limit {
            groups.push(std::mem::take(&mut current));
            current_len = 0;
            current.push(part.clone());
            current_len += len;
        } else {
            current.push(part.clone());
            current_len += extra;
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}
