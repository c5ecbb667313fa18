//! コメント整形モジュール
//!
//! 現場メモを報告書向けの文章に書き直す外部サービス。
//! 失敗しても呼び出し側は元の文章を保持する（session::refine_comments）。

use crate::ai_provider::AiProvider;
use crate::error::{ReporterError, Result};
use std::time::Duration;
use tokio::process::Command;

/// 文章整形サービス
#[allow(async_fn_in_trait)]
pub trait Refiner {
    async fn refine(&self, text: &str) -> Result<String>;
}

/// 整形プロンプトを構築
pub fn build_refine_prompt(notes: &str) -> String {
    format!(
        "You are a professional construction inspector. \
Rewrite the following rough field notes into a clear, concise, and professional \
General Comments section for a Field Inspection Report. \
The output should be factual, objective, and formatted as professional sentences. \
Separate paragraphs with a blank line and output only the rewritten text.\n\n\
Rough notes: \"{}\"",
        notes
    )
}

/// AI CLIを子プロセスとして呼び出す実装
#[derive(Debug, Clone)]
pub struct CliRefiner {
    provider: AiProvider,
    timeout: Duration,
}

impl CliRefiner {
    pub fn new(provider: AiProvider, timeout: Duration) -> Self {
        Self { provider, timeout }
    }
}

impl Refiner for CliRefiner {
    async fn refine(&self, text: &str) -> Result<String> {
        let prompt = build_refine_prompt(text);
        let command = self.provider.command_name();
        log::debug!("refine via {} ({} chars)", command, prompt.len());

        // Windowsではcmd /c経由
        #[cfg(windows)]
        let mut cmd = {
            let mut cmd = Command::new("cmd");
            cmd.arg("/c").arg(command);
            cmd
        };
        #[cfg(not(windows))]
        let mut cmd = Command::new(command);

        cmd.args(self.provider.prompt_args(&prompt)).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                ReporterError::RefineUnavailable(format!(
                    "{} timed out after {}s",
                    command,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| ReporterError::RefineUnavailable(format!("{}: {}", command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReporterError::RefineUnavailable(format!(
                "{} failed (code {:?}): {}",
                command,
                output.status.code(),
                stderr.trim()
            )));
        }

        let refined = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if refined.is_empty() {
            return Err(ReporterError::RefineUnavailable(format!(
                "{} returned no text",
                command
            )));
        }
        Ok(refined)
    }
}
