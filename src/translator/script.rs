use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::Translator;

/// External-program backend.
///
/// The program is invoked once per source text as
/// `<command> [args..] <from> <to>` with the text on stdin. It must print
/// the translation to stdout and exit zero; one trailing newline is
/// stripped so line-oriented tools work unmodified. A non-zero exit
/// aborts the run with the program's stderr.
pub struct ScriptTranslator {
    command: PathBuf,
    args: Vec<String>,
}

impl ScriptTranslator {
    pub fn new(command: PathBuf, args: Vec<String>) -> Self {
        Self { command, args }
    }

    async fn run(&self, text: &str, from: &str, to: &str) -> Result<String> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .arg(from)
            .arg(to)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| {
                format!("Failed to run translator script: {}", self.command.display())
            })?;

        let mut stdin = child
            .stdin
            .take()
            .context("Failed to open translator script stdin")?;
        // A script may exit without draining stdin; its exit status decides
        // the outcome, not the broken pipe.
        if let Err(err) = stdin.write_all(text.as_bytes()).await {
            if err.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(err).context("Failed to write source text to translator script");
            }
        }
        // Close stdin so the script sees EOF.
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .context("Failed to read translator script output")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Translator script {} failed ({}): {}",
                self.command.display(),
                output.status,
                stderr.trim()
            );
        }

        let mut translated = String::from_utf8(output.stdout)
            .context("Translator script output was not valid UTF-8")?;
        if translated.ends_with('\n') {
            translated.pop();
            if translated.ends_with('\r') {
                translated.pop();
            }
        }
        Ok(translated)
    }
}

impl Translator for ScriptTranslator {
    fn name(&self) -> &'static str {
        "Custom script"
    }

    /// Namespace derived from the command line, so two different scripts
    /// (or the same script with different arguments) keep separate caches.
    fn cache_namespace(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.command.as_os_str().as_encoded_bytes());
        for arg in &self.args {
            hasher.update([0]);
            hasher.update(arg.as_bytes());
        }
        let digest = hex::encode(hasher.finalize());
        format!("script:{}", &digest[..16])
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        from: &'a str,
        to: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        self.run(text, from, to).boxed()
    }
}
