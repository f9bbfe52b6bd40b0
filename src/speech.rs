use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::warn;

use crate::config::SpeechConfig;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to run speech command {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("speech command {command} exited with {status}")]
    Failed { command: String, status: String },
}

pub trait Speaker {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError>;
}

/// Used when speech is disabled or no command is configured.
pub struct NullSpeaker;

impl Speaker for NullSpeaker {
    fn speak(&mut self, _text: &str) -> Result<(), SpeechError> {
        Ok(())
    }
}

/// Pronounces words through an external program such as `espeak` or `say`.
/// Blocks until the program exits. After the first failure it goes quiet
/// for the rest of the run.
pub struct CommandSpeaker {
    command: String,
    args: Vec<String>,
    disabled: bool,
}

impl CommandSpeaker {
    pub fn new(command: &str, args: &[String]) -> Self {
        Self {
            command: command.to_string(),
            args: args.to_vec(),
            disabled: false,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn run(&self, text: &str) -> Result<(), SpeechError> {
        let status = Command::new(&self.command)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| SpeechError::Spawn {
                command: self.command.clone(),
                source,
            })?;
        if !status.success() {
            return Err(SpeechError::Failed {
                command: self.command.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        if self.disabled || text.trim().is_empty() {
            return Ok(());
        }
        self.run(text).inspect_err(|e| {
            warn!(error = %e, "speech disabled for this run");
            self.disabled = true;
        })
    }
}

pub fn from_config(config: &SpeechConfig) -> Box<dyn Speaker> {
    match (&config.command, config.enabled) {
        (Some(command), true) if !command.trim().is_empty() => {
            Box::new(CommandSpeaker::new(command, &config.args))
        }
        _ => Box::new(NullSpeaker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_fails_once_then_goes_quiet() {
        let mut speaker = CommandSpeaker::new("cihui-no-such-speech-program", &[]);
        assert!(matches!(speaker.speak("abandon"), Err(SpeechError::Spawn { .. })));
        assert!(speaker.is_disabled());
        assert!(speaker.speak("abandon").is_ok());
    }

    #[test]
    fn blank_text_is_not_spoken() {
        let mut speaker = CommandSpeaker::new("cihui-no-such-speech-program", &[]);
        assert!(speaker.speak("   ").is_ok());
        assert!(!speaker.is_disabled());
    }

    #[cfg(unix)]
    #[test]
    fn failing_exit_status_is_reported() {
        let mut speaker = CommandSpeaker::new("false", &[]);
        assert!(matches!(speaker.speak("abandon"), Err(SpeechError::Failed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn successful_command_stays_enabled() {
        let mut speaker = CommandSpeaker::new("true", &[]);
        assert!(speaker.speak("abandon").is_ok());
        assert!(!speaker.is_disabled());
    }

    #[test]
    fn disabled_config_gives_null_speaker() {
        let config = SpeechConfig {
            enabled: false,
            command: Some("cihui-no-such-speech-program".to_string()),
            args: Vec::new(),
        };
        let mut speaker = from_config(&config);
        assert!(speaker.speak("abandon").is_ok());
    }
}
