use anyhow::Result as Fallible;
use serde_json::Value;

/// External language-model collaborator consumed by the Auto-Noos extractor
/// and the lore tooling. Implementations live outside the core; calls block
/// and carry their own per-call timeout.
pub trait LoreGenerator {
    /// Free-form rewrite/classification with sampling controls.
    fn edit_text(
        &self,
        system: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Fallible<String>;

    /// Structured JSON emission constrained by the prompts.
    fn generate_structure(&self, system: &str, user_prompt: &str) -> Fallible<Value>;

    /// Schema-less extraction returning a `{"properties": [{key, value}, ...]}`
    /// envelope.
    fn extract_metadata(&self, corpus: &str) -> Fallible<Value>;
}
