//! Model registry — known Groq-hosted models with a public lookup API.

/// A registered model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    /// Model identifier as sent to the API
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Whether the model accepts image input
    pub vision: bool,
    /// Context window size in tokens
    pub context_window: u32,
}

/// Default model for text-only requests
pub const DEFAULT_TEXT_MODEL: &str = "llama-3.3-70b-versatile";

/// Default model for requests carrying an image
pub const DEFAULT_VISION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

const MODELS: &[ModelSpec] = &[
    ModelSpec {
        id: "llama-3.3-70b-versatile",
        name: "Llama 3.3 70B Versatile",
        vision: false,
        context_window: 131072,
    },
    ModelSpec {
        id: "llama-3.1-8b-instant",
        name: "Llama 3.1 8B Instant",
        vision: false,
        context_window: 131072,
    },
    ModelSpec {
        id: "meta-llama/llama-4-scout-17b-16e-instruct",
        name: "Llama 4 Scout 17B",
        vision: true,
        context_window: 131072,
    },
    ModelSpec {
        id: "meta-llama/llama-4-maverick-17b-128e-instruct",
        name: "Llama 4 Maverick 17B",
        vision: true,
        context_window: 131072,
    },
];

/// Look up a model by ID.
pub fn get_model_by_id(id: &str) -> Option<ModelSpec> {
    MODELS.iter().find(|m| m.id == id).copied()
}

/// Get all registered models.
pub fn get_all_models() -> &'static [ModelSpec] {
    MODELS
}

/// Whether a model ID is known to accept image input. Unknown IDs are
/// assumed vision-capable so a user-configured model is not second-guessed.
pub fn supports_vision(id: &str) -> bool {
    get_model_by_id(id).map(|m| m.vision).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_registered() {
        assert!(get_model_by_id(DEFAULT_TEXT_MODEL).is_some());
        let vision = get_model_by_id(DEFAULT_VISION_MODEL).unwrap();
        assert!(vision.vision);
    }

    #[test]
    fn test_unknown_model_assumed_vision() {
        assert!(supports_vision("some-future-model"));
        assert!(!supports_vision(DEFAULT_TEXT_MODEL));
    }
}
