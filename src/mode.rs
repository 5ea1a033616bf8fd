/// Mode controller: reads operator commands line by line and publishes the
/// current mode on a watch channel.
///
/// Commands (trimmed, case-insensitive):
///   mode=normal | mode=night | mode=party
///
/// Anything else is rejected with a "Command not found" notice. The reader
/// returns on end of input or a read error; `main` treats that as a
/// shutdown request.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;

/// Behavioral profile selecting background color and tinting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Night,
    Party,
}

impl Mode {
    /// Parse a `mode=<name>` command. Trims whitespace, case-insensitive.
    pub fn parse_command(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mode=normal" => Some(Mode::Normal),
            "mode=night" => Some(Mode::Night),
            "mode=party" => Some(Mode::Party),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Normal => f.write_str("normal"),
            Mode::Night => f.write_str("night"),
            Mode::Party => f.write_str("party"),
        }
    }
}

/// Why the command reader stopped.
#[derive(Debug)]
pub enum InputEnd {
    Eof,
    Error(std::io::Error),
}

/// Apply one command line. Returns the new mode, or None if the line was rejected.
pub fn apply_command(line: &str, tx: &watch::Sender<Mode>) -> Option<Mode> {
    let Some(mode) = Mode::parse_command(line) else {
        log::warn!("Command not found: {}", line.trim());
        return None;
    };
    let previous = tx.send_replace(mode);
    if previous != mode {
        log::info!("Mode {previous} → {mode}");
    }
    Some(mode)
}

/// Read commands until end of input. Blank lines are skipped.
pub async fn run<R>(reader: R, tx: watch::Sender<Mode>) -> InputEnd
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                apply_command(&line, &tx);
            }
            Ok(None) => return InputEnd::Eof,
            Err(e) => return InputEnd::Error(e),
        }
    }
}
