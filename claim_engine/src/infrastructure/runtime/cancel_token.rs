use std::path::PathBuf;

/// Single-writer advisory marker per stage (spec.md §3, §4.8). Presence
/// means "cancel requested"; each stage polls it at its main-loop boundary,
/// finishes the current document, then exits. Cleared on next stage start.
pub struct CancelToken {
    marker_path: PathBuf,
}

impl CancelToken {
    pub fn new(marker_path: PathBuf) -> Self {
        Self { marker_path }
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.marker_path.exists()
    }

    /// Called by operator tooling or the shutdown handler to request a soft
    /// stop.
    pub fn request_cancel(&self) -> std::io::Result<()> {
        std::fs::write(&self.marker_path, b"")
    }

    /// Called by a stage at start-of-run.
    pub fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.marker_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_then_detect_then_clear() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancelToken::new(dir.path().join("cancel.marker"));

        assert!(!token.is_cancel_requested());
        token.request_cancel().unwrap();
        assert!(token.is_cancel_requested());
        token.clear().unwrap();
        assert!(!token.is_cancel_requested());
    }
}
