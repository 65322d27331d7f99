use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use tcsync_runtime::Echo;

/// Echoes transcript lines to stdout, highlighting failures on a terminal.
pub struct ConsoleEcho {
    color: bool,
}

impl Default for ConsoleEcho {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleEcho {
    pub fn new() -> Self {
        Self {
            color: std::io::stdout().is_terminal(),
        }
    }
}

fn is_failure(text: &str) -> bool {
    text.starts_with("Error") || text.starts_with("API errors occurred")
}

impl Echo for ConsoleEcho {
    fn line(&mut self, text: &str) {
        if self.color && is_failure(text) {
            println!("{}", text.red());
        } else if self.color && text == tcsync_runtime::check::SUMMARY_OK {
            println!("{}", text.green());
        } else {
            println!("{}", text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_lines_are_detected() {
        assert!(is_failure("Error: You have not specified a NS_URL"));
        assert!(is_failure(
            "Error occurred querying Nightscout status: HTTP 401"
        ));
        assert!(is_failure(tcsync_runtime::check::SUMMARY_FAILED));
        assert!(!is_failure("Querying Nightscout status..."));
    }
}
