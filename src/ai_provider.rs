use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// コメント整形に使うAI CLI
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Claude,
    Codex,
    Gemini,
}

impl AiProvider {
    pub fn command_name(&self) -> &'static str {
        match self {
            AiProvider::Claude => "claude",
            AiProvider::Codex => "codex",
            AiProvider::Gemini => "gemini",
        }
    }

    /// 非対話でプロンプトを1回実行する引数
    pub fn prompt_args(&self, prompt: &str) -> Vec<String> {
        match self {
            AiProvider::Claude => vec![
                "-p".into(),
                prompt.into(),
                "--output-format".into(),
                "text".into(),
            ],
            AiProvider::Codex => vec!["exec".into(), prompt.into()],
            AiProvider::Gemini => vec!["-p".into(), prompt.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_args_carry_prompt() {
        for provider in [AiProvider::Claude, AiProvider::Codex, AiProvider::Gemini] {
            let args = provider.prompt_args("notes");
            assert!(args.iter().any(|a| a == "notes"), "{:?}", provider);
        }
        assert_eq!(AiProvider::default().command_name(), "claude");
    }

    #[test]
    fn test_provider_serde_lowercase() {
        let json = serde_json::to_string(&AiProvider::Gemini).unwrap();
        assert_eq!(json, "\"gemini\"");
        let parsed: AiProvider = serde_json::from_str("\"codex\"").unwrap();
        assert_eq!(parsed, AiProvider::Codex);
    }
}
