//! Console stand-in for the phone notifier

use std::io::Write;
use veering_core::{Action, ActionNotifier, NotifyError};

/// Writes each action and its characteristic payload to a writer (stdout by default)
pub struct ConsoleNotifier<W: Write> {
    device_name: String,
    out: W,
    sent: usize,
    last: Option<Action>,
}

impl ConsoleNotifier<std::io::Stdout> {
    pub fn stdout(device_name: impl Into<String>) -> Self {
        Self::new(device_name, std::io::stdout())
    }
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn new(device_name: impl Into<String>, out: W) -> Self {
        Self {
            device_name: device_name.into(),
            out,
            sent: 0,
            last: None,
        }
    }

    pub fn sent(&self) -> usize {
        self.sent
    }

    pub fn last_action(&self) -> Option<Action> {
        self.last
    }
}

impl<W: Write> ActionNotifier for ConsoleNotifier<W> {
    fn notify(&mut self, action: Action) -> Result<(), NotifyError> {
        log::debug!("Sending action {} to phone {}", action, self.device_name);

        writeln!(
            self.out,
            "action : {} ({})",
            action,
            String::from_utf8_lossy(action.payload())
        )?;
        self.out.flush()?;

        self.sent += 1;
        self.last = Some(action);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_action_and_payload() {
        let mut buffer = Vec::new();
        {
            let mut notifier = ConsoleNotifier::new("test-phone", &mut buffer);
            notifier.notify(Action::VeerLeft).unwrap();
            notifier.notify(Action::KeepGoing).unwrap();

            assert_eq!(notifier.sent(), 2);
            assert_eq!(notifier.last_action(), Some(Action::KeepGoing));
        }

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "action : ACTION_VEER_LEFT (Left)\naction : ACTION_KEEP_GOING (Straight)\n"
        );
    }
}
