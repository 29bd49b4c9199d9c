// src/rag.rs
// =============================================================================
// The boundary between the crawled corpus and question answering.
//
// Nothing here embeds text or runs a model. An index (built from the
// PageRecord stream) sits behind Retriever, a language model sits behind
// Generator, and RagContext wires the two together. The context is built
// explicitly and handed to whoever needs it.
// =============================================================================

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Serialize;

/// Characters of chunk text shown in a result listing.
const SNIPPET_CHARS: usize = 240;

/// One ranked chunk returned by the index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub text: String,
    pub title: String,
    pub url: String,
    pub domain: String,
    /// Cosine distance from the query (0 = identical).
    pub distance: f32,
}

impl SearchHit {
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }

    /// Single-line preview of the chunk, cut at SNIPPET_CHARS characters.
    pub fn snippet(&self) -> String {
        let flat = self.text.replace('\n', " ");
        if flat.chars().count() > SNIPPET_CHARS {
            let cut: String = flat.chars().take(SNIPPET_CHARS).collect();
            format!("{cut}...")
        } else {
            flat
        }
    }
}

/// Similarity search over indexed page chunks.
#[async_trait]
pub trait Retriever {
    /// Returns up to `k` hits, closest first.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<SearchHit>>;
}

/// Text generation from a prompt.
#[async_trait]
pub trait Generator {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Builds a prompt that restricts the answer to the numbered sources.
pub fn build_prompt(question: &str, hits: &[SearchHit]) -> String {
    let mut sources = String::new();
    for (i, hit) in hits.iter().enumerate() {
        sources.push_str(&format!(
            "[{}] TITLE: {}\nURL: {}\nTEXT: {}\n\n",
            i + 1,
            hit.title,
            hit.url,
            hit.text
        ));
    }

    format!(
        "You are a networking assistant. Answer ONLY using the provided sources.\n\
         If the answer is not in the sources, say: \"Not found in the provided sources.\"\n\
         \n\
         Rules:\n\
         - Be concise and technical.\n\
         - Use bullet points if helpful.\n\
         - At the end, cite sources like: Sources: [1], [3]\n\
         \n\
         Question: {question}\n\
         \n\
         Sources:\n\
         {sources}"
    )
}

/// Retrieved hits plus the generated answer.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub hits: Vec<SearchHit>,
    pub text: String,
}

pub struct RagContext<R, G> {
    retriever: R,
    generator: G,
    /// Hits requested from the retriever.
    pub top_k: usize,
    /// Hits passed on to the prompt.
    pub max_context: usize,
}

impl<R: Retriever, G: Generator> RagContext<R, G> {
    pub fn new(retriever: R, generator: G) -> Self {
        Self {
            retriever,
            generator,
            top_k: 12,
            max_context: 6,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Retrieves the top hits for `question` and asks the generator to answer
    /// from the closest `max_context` of them.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            bail!("question is empty");
        }

        let hits = self.retriever.query(question, self.top_k).await?;
        let context = &hits[..hits.len().min(self.max_context)];
        let prompt = build_prompt(question, context);

        tracing::debug!(hits = hits.len(), context = context.len(), "generating answer");
        let text = self.generator.generate(&prompt).await?;

        Ok(Answer { hits, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn hit(n: usize) -> SearchHit {
        SearchHit {
            text: format!("chunk {n}"),
            title: format!("Title {n}"),
            url: format!("https://example.com/{n}"),
            domain: "example.com".to_string(),
            distance: 0.1 * n as f32,
        }
    }

    struct FixedIndex(Vec<SearchHit>);

    #[async_trait]
    impl Retriever for FixedIndex {
        async fn query(&self, _text: &str, k: usize) -> Result<Vec<SearchHit>> {
            Ok(self.0.iter().take(k).cloned().collect())
        }
    }

    #[derive(Default)]
    struct EchoModel {
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Generator for EchoModel {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("answer".to_string())
        }
    }

    #[test]
    fn test_prompt_numbers_sources() {
        let prompt = build_prompt("What is DNS?", &[hit(1), hit(2)]);
        assert!(prompt.contains("Question: What is DNS?"));
        assert!(prompt.contains("[1] TITLE: Title 1\nURL: https://example.com/1\nTEXT: chunk 1"));
        assert!(prompt.contains("[2] TITLE: Title 2"));
        assert!(!prompt.contains("[3]"));
    }

    #[test]
    fn test_snippet_flattens_and_truncates() {
        let mut long = hit(1);
        long.text = format!("a\nb{}", "x".repeat(300));
        let snippet = long.snippet();
        assert!(!snippet.contains('\n'));
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), SNIPPET_CHARS + 3);

        assert_eq!(hit(2).snippet(), "chunk 2");
    }

    #[test]
    fn test_similarity_from_distance() {
        let mut h = hit(0);
        h.distance = 0.25;
        assert!((h.similarity() - 0.75).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_answer_limits_context() {
        let index = FixedIndex((1..=10).map(hit).collect());
        let model = EchoModel::default();
        let prompts = Arc::clone(&model.prompts);
        let rag = RagContext::new(index, model).with_top_k(8);

        let answer = rag.answer("  How does TCP work?  ").await.unwrap();

        assert_eq!(answer.hits.len(), 8);
        assert_eq!(answer.text, "answer");
        let prompts = prompts.lock().unwrap();
        assert!(prompts[0].contains("[6] TITLE"));
        assert!(!prompts[0].contains("[7] TITLE"));
        assert!(prompts[0].contains("Question: How does TCP work?\n"));
    }

    #[tokio::test]
    async fn test_blank_question_rejected() {
        let rag = RagContext::new(FixedIndex(vec![hit(1)]), EchoModel::default());
        assert!(rag.answer("   ").await.is_err());
    }
}
