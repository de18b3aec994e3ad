/// Asset served when no provider-specific logo exists.
pub const FALLBACK_ICON: &str = "/file.svg";

/// Canonical provider presentation metadata. `None` means unmapped; the
/// fallback policy (raw input for names, [`FALLBACK_ICON`] for logos) is
/// applied by the helpers below so callers never hardcode it.
pub trait ProviderCatalog {
    fn display_name(&self, key: &str) -> Option<String>;
    fn logo_path(&self, key: &str) -> Option<String>;
}

/// Display spelling per normalized provider identifier.
const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("openai", "OpenAI"),
    ("anthropic", "Anthropic"),
    ("google", "Google"),
    ("cohere", "Cohere"),
    ("mistral", "Mistral AI"),
    ("mistral-ai", "Mistral AI"),
    ("palm", "PaLM"),
    ("azure", "Azure"),
    ("azure-openai", "Azure"),
    ("aws", "AWS"),
    ("bedrock", "AWS Bedrock"),
    ("vertex", "Vertex AI"),
    ("anyscale", "Anyscale"),
    ("together", "Together AI"),
    ("together-ai", "Together AI"),
    ("fireworks", "Fireworks AI"),
    ("groq", "Groq"),
    ("cerebras", "Cerebras"),
    ("ollama", "Ollama"),
    ("huggingface", "Hugging Face"),
    ("litellm", "LiteLLM"),
    ("elevenlabs", "ElevenLabs"),
    ("perplexity", "Perplexity"),
    ("openrouter", "OpenRouter"),
    ("twilio", "Twilio"),
    ("vapi", "Vapi"),
    ("xai", "xAI"),
];

/// Logo file stem per normalized provider identifier. Aliases collapse onto
/// one asset (PaLM ships under the Google logo, Anyscale under OpenAI).
const LOGO_FILES: &[(&str, &str)] = &[
    ("openai", "openai"),
    ("anthropic", "anthropic"),
    ("google", "google"),
    ("cohere", "cohere"),
    ("mistral", "mistral"),
    ("mistral-ai", "mistral"),
    ("palm", "google"),
    ("azure", "azure"),
    ("azure-openai", "azure"),
    ("aws", "aws"),
    ("bedrock", "bedrock"),
    ("vertex", "vertex"),
    ("anyscale", "openai"),
    ("together", "together"),
    ("together-ai", "together"),
    ("fireworks", "fireworks"),
    ("groq", "groq"),
    ("cerebras", "cerebras"),
    ("ollama", "ollama"),
    ("huggingface", "huggingface"),
    ("litellm", "litellm"),
    ("elevenlabs", "elevenlabs"),
    ("perplexity", "perplexity"),
    ("openrouter", "openrouter"),
    ("twilio", "twilio"),
    ("vapi", "vapi"),
    ("xai", "xai"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl ProviderCatalog for BuiltinCatalog {
    fn display_name(&self, key: &str) -> Option<String> {
        table_lookup(DISPLAY_NAMES, key).map(ToString::to_string)
    }

    fn logo_path(&self, key: &str) -> Option<String> {
        table_lookup(LOGO_FILES, key).map(|stem| format!("/logos/{stem}.svg"))
    }
}

fn table_lookup(table: &'static [(&str, &str)], key: &str) -> Option<&'static str> {
    let key = key.trim().to_lowercase();
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, value)| *value)
}

#[must_use]
pub fn display_name_or_raw(catalog: &dyn ProviderCatalog, provider: &str) -> String {
    if provider.trim().is_empty() {
        return String::new();
    }
    catalog
        .display_name(provider)
        .unwrap_or_else(|| provider.to_string())
}

#[must_use]
pub fn logo_or_placeholder(catalog: &dyn ProviderCatalog, provider: &str) -> String {
    if provider.trim().is_empty() {
        return FALLBACK_ICON.to_string();
    }
    catalog
        .logo_path(provider)
        .unwrap_or_else(|| FALLBACK_ICON.to_string())
}
