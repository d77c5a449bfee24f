// Progress reporting for long page scans

use log::info;

/// Receives human-readable status lines while a scan runs
pub trait Loader {
    fn set_message(&mut self, message: &str);
}

/// Discards every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLoader;

impl Loader for NoopLoader {
    fn set_message(&mut self, _message: &str) {}
}

/// Forwards messages to the `log` facade at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogLoader;

impl Loader for LogLoader {
    fn set_message(&mut self, message: &str) {
        info!("{}", message);
    }
}

impl<F: FnMut(&str)> Loader for F {
    fn set_message(&mut self, message: &str) {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_loader() {
        let mut seen = Vec::new();
        {
            let mut loader = |message: &str| seen.push(message.to_string());
            loader.set_message("scanning");
            loader.set_message("done");
        }
        assert_eq!(seen, vec!["scanning", "done"]);

        NoopLoader.set_message("ignored");
        LogLoader.set_message("logged");
    }
}
