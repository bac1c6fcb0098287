//! Stdin command bridge.
//!
//! A background thread owns stdin and forwards parsed commands over a
//! bounded channel; the poll loop drains the channel once per
//! iteration so command handling never blocks the motor timing.

use crossbeam_channel as xch;
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Feed,
    Reset,
    Maintenance,
    TareReservoir,
    TareBowl,
    /// Adjust the deficit by the given milligrams (negative for food
    /// given by hand).
    AdjustDeficit(i32),
    /// Set the daily ration in grams.
    SetRate(i32),
    Status,
    Quit,
}

pub fn parse(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let cmd = match parts.next()? {
        "feed" => Command::Feed,
        "reset" => Command::Reset,
        "maintenance" | "maint" => Command::Maintenance,
        "tare-reservoir" => Command::TareReservoir,
        "tare-bowl" => Command::TareBowl,
        "deficit" => Command::AdjustDeficit(parts.next()?.parse().ok()?),
        "rate" => Command::SetRate(parts.next()?.parse().ok()?),
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(cmd)
}

/// Spawn the reader thread. The channel closes when stdin reaches EOF
/// or the receiver is dropped.
pub fn spawn_stdin_bridge() -> xch::Receiver<Command> {
    let (tx, rx) = xch::bounded(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse(line) {
                Some(cmd) => {
                    if tx.send(cmd).is_err() {
                        break;
                    }
                }
                None => tracing::warn!(line, "unrecognized command"),
            }
        }
        tracing::debug!("stdin bridge exiting");
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("feed", Command::Feed)]
    #[case("reset", Command::Reset)]
    #[case("maint", Command::Maintenance)]
    #[case("maintenance", Command::Maintenance)]
    #[case("tare-reservoir", Command::TareReservoir)]
    #[case("tare-bowl", Command::TareBowl)]
    #[case("deficit -9000", Command::AdjustDeficit(-9000))]
    #[case("rate 45", Command::SetRate(45))]
    #[case("status", Command::Status)]
    #[case("exit", Command::Quit)]
    fn parses_known_commands(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(parse(line), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("refill")]
    #[case("deficit")]
    #[case("deficit lots")]
    #[case("rate 45 extra")]
    fn rejects_malformed_lines(#[case] line: &str) {
        assert_eq!(parse(line), None);
    }
}
