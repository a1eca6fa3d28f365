//! Persisted high score
//!
//! A single text record `HIGHSCORE = <n>`, read once at startup and rewritten
//! wholesale on quit. A missing or malformed record is fatal at startup: there
//! is no implicit fallback to zero.

use std::path::Path;

use crate::error::{SimError, SimResult};

/// Record prefix in the save file
const RECORD_PREFIX: &str = "HIGHSCORE";

/// The best score seen across sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    pub fn new(best: u64) -> Self {
        Self { best }
    }

    /// Parse the first line of a save record
    pub fn parse(text: &str) -> SimResult<Self> {
        let line = text.lines().next().unwrap_or("").trim();
        let malformed = || SimError::SaveMalformed { line: line.to_string() };

        let (key, value) = line.split_once('=').ok_or_else(malformed)?;
        if key.trim() != RECORD_PREFIX {
            return Err(malformed());
        }
        let best = value.trim().parse::<u64>().map_err(|_| malformed())?;
        Ok(Self { best })
    }

    /// Render the save record
    pub fn to_record(&self) -> String {
        format!("{} = {}", RECORD_PREFIX, self.best)
    }

    /// Fold a score in. Returns true if it is a new best.
    pub fn record(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Load the record from disk
    pub fn load(path: &Path) -> SimResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SimError::SaveMissing { path: path.to_path_buf() });
            }
            Err(e) => return Err(e.into()),
        };
        let score = Self::parse(&text)?;
        log::info!("Loaded high score {}", score.best);
        Ok(score)
    }

    /// Rewrite the record on disk
    pub fn save(&self, path: &Path) -> SimResult<()> {
        log::info!("Saving high score {}...", self.best);
        std::fs::write(path, self.to_record())?;
        log::info!("High score saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record() {
        assert_eq!(HighScore::parse("HIGHSCORE = 4200").unwrap().best, 4200);
        assert_eq!(HighScore::parse("HIGHSCORE=7\nignored").unwrap().best, 7);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            HighScore::parse("SCORE = 10"),
            Err(SimError::SaveMalformed { .. })
        ));
        assert!(matches!(
            HighScore::parse("HIGHSCORE = lots"),
            Err(SimError::SaveMalformed { .. })
        ));
        assert!(HighScore::parse("").is_err());
    }

    #[test]
    fn test_record_is_monotonic() {
        let mut score = HighScore::new(100);
        assert!(!score.record(50));
        assert_eq!(score.best, 100);
        assert!(score.record(150));
        assert_eq!(score.best, 150);
    }

    #[test]
    fn test_record_format() {
        assert_eq!(HighScore::new(12).to_record(), "HIGHSCORE = 12");
    }
}
