use async_trait::async_trait;
use rand::RngCore;
use regex::Regex;
use tracing::debug;

use super::{RecipeBackendError, RecipeDraft, RecipeRequest, RecipeTextProvider};
use crate::api_connection::{ApiConnectionError, ChatCompletionRequest, ChatMessage, Provider};

pub const DEFAULT_GENERATED_TITLE: &str = "AI Generated Recipe";

const SYSTEM_PROMPT: &str = "/no_thinking
You are a recipe generator. You receive a comma separated list of ingredients after 'INPUT:' and write one recipe after 'OUTPUT:'.
Respond on a single line using exactly this format, with no markdown and no extra commentary:
TITLE: <recipe title> | INGREDIENTS: <ingredient 1>; <ingredient 2>; <ingredient 3> | INSTRUCTIONS: <step by step instructions>
End your answer with <END>.";

struct SectionPatterns {
    title: Regex,
    ingredients: Regex,
    instructions: Regex,
}

impl SectionPatterns {
    fn new() -> Self {
        // All three patterns are compile-time constants.
        Self {
            title: Regex::new(r"TITLE:\s*([^|\n]+)").expect("title pattern is valid"),
            ingredients: Regex::new(r"(?s)INGREDIENTS:\s*(.+?)(?:\|?\s*INSTRUCTIONS:|$)")
                .expect("ingredients pattern is valid"),
            instructions: Regex::new(r"(?s)INSTRUCTIONS:\s*(.+)").expect("instructions pattern is valid"),
        }
    }
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6 {
        let inner = &trimmed[3..trimmed.len() - 3];
        // drop an optional language tag on the opening fence
        match inner.find('\n') {
            Some(pos) if !inner[..pos].contains(':') => inner[pos + 1..].trim(),
            _ => inner.trim(),
        }
    } else {
        trimmed
    }
}

fn extract_sections(text: &str, patterns: &SectionPatterns) -> Result<RecipeDraft, RecipeBackendError> {
    let content = strip_code_fences(text);
    let content = match content.find("OUTPUT:") {
        Some(pos) => &content[pos + "OUTPUT:".len()..],
        None => content,
    };
    let content = match content.find("<END>") {
        Some(pos) => &content[..pos],
        None => content,
    };
    let content = content.trim();

    let title = patterns.title.captures(content).map(|c| c[1].trim().to_string());
    let ingredients = patterns.ingredients.captures(content).map(|c| {
        c[1].split(';')
            .map(|item| item.trim().trim_matches('|').trim())
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect::<Vec<_>>()
    });
    let instructions = patterns.instructions.captures(content).map(|c| c[1].trim().to_string());

    if title.is_none() && ingredients.is_none() && instructions.is_none() {
        return Err(RecipeBackendError::Unparseable(content.chars().take(200).collect()));
    }

    Ok(RecipeDraft {
        title: title.filter(|t| !t.is_empty()).unwrap_or_else(|| DEFAULT_GENERATED_TITLE.to_string()),
        ingredients: ingredients.unwrap_or_default(),
        instructions: instructions.unwrap_or_default(),
    })
}

/// Parses `TITLE: … | INGREDIENTS: a; b | INSTRUCTIONS: …` output. Each section is extracted
/// independently; a missing section comes back empty (title falls back to a generic one).
/// Output without any of the three markers is an error.
pub fn parse_generated_recipe(text: &str) -> Result<RecipeDraft, RecipeBackendError> {
    extract_sections(text, &SectionPatterns::new())
}

/// Generative backend calling a chat-completion model through OpenRouter.
pub struct OpenRouterRecipeGenerator {
    provider: Provider,
    model: String,
    patterns: SectionPatterns,
}

impl OpenRouterRecipeGenerator {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            patterns: SectionPatterns::new(),
        }
    }

    /// Usable only when the API key is present in the environment.
    pub fn is_available(&self) -> bool {
        self.provider.has_credentials()
    }

    fn build_request(&self, ingredients: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("INPUT: {}\nOUTPUT:", ingredients),
                },
            ],
            temperature: Some(0.8),
            top_p: Some(0.9),
            max_tokens: Some(400),
            stop: vec!["<END>".to_string()],
        }
    }
}

#[async_trait]
impl RecipeTextProvider for OpenRouterRecipeGenerator {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn produce(
        &self,
        request: &RecipeRequest,
        _rng: &mut (dyn RngCore + Send),
    ) -> Result<RecipeDraft, RecipeBackendError> {
        let response = self
            .provider
            .call_chat_completion(self.build_request(&request.ingredients))
            .await?;
        let choice = response.choices.first().ok_or(ApiConnectionError::EmptyResponse)?;
        debug!(model = %self.model, "Raw recipe generation output: {}", choice.message.content);
        extract_sections(&choice.message.content, &self.patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pipe_delimited_output() {
        let draft = parse_generated_recipe(
            "TITLE: Lemon Chicken | INGREDIENTS: chicken; lemon ; garlic | INSTRUCTIONS: Roast for 40 minutes.<END>",
        )
        .unwrap();
        assert_eq!(draft.title, "Lemon Chicken");
        assert_eq!(draft.ingredients, vec!["chicken", "lemon", "garlic"]);
        assert_eq!(draft.instructions, "Roast for 40 minutes.");
    }

    #[test]
    fn test_parse_keeps_text_after_output_marker() {
        let draft = parse_generated_recipe(
            "INPUT: rice, beans\nOUTPUT: TITLE: Rice Bowl | INGREDIENTS: rice; beans | INSTRUCTIONS: Mix. <END> trailing noise",
        )
        .unwrap();
        assert_eq!(draft.title, "Rice Bowl");
        assert_eq!(draft.ingredients, vec!["rice", "beans"]);
        assert_eq!(draft.instructions, "Mix.");
    }

    #[test]
    fn test_parse_missing_sections_are_empty() {
        let draft = parse_generated_recipe("INSTRUCTIONS: Just boil it").unwrap();
        assert_eq!(draft.title, DEFAULT_GENERATED_TITLE);
        assert!(draft.ingredients.is_empty());
        assert_eq!(draft.instructions, "Just boil it");
    }

    #[test]
    fn test_parse_strips_code_fences() {
        let draft = parse_generated_recipe("```text\nTITLE: Fenced | INGREDIENTS: egg\n```").unwrap();
        assert_eq!(draft.title, "Fenced");
        assert_eq!(draft.ingredients, vec!["egg"]);
    }

    #[test]
    fn test_parse_rejects_output_without_markers() {
        assert!(matches!(
            parse_generated_recipe("I cannot help with that."),
            Err(RecipeBackendError::Unparseable(_))
        ));
    }

    #[test]
    fn test_request_wraps_ingredients_in_prompt() {
        let generator = OpenRouterRecipeGenerator::new(Provider::openrouter("NUTRICHEF_TEST_UNSET_KEY"), "qwen/qwen3-32b");
        let request = generator.build_request("tofu, kale");
        assert_eq!(request.messages[1].content, "INPUT: tofu, kale\nOUTPUT:");
        assert!(!generator.is_available());
    }
}
