use std::{fs::{self, OpenOptions}, io::{self, Write}, path::{Path, PathBuf}};

/// Append-only log of final scores, one integer per line.
pub struct ScoreLog {
    path: PathBuf,
}

impl ScoreLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ScoreLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, score: u32) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", score)?;
        log::info!("wrote score {} to {}", score, self.path.display());
        Ok(())
    }

    /// Every score recorded so far. A missing file is an empty log; lines that
    /// are not numbers are skipped.
    pub fn read_all(&self) -> io::Result<Vec<u32>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e),
        };

        let scores = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(i, line)| match line.trim().parse::<u32>() {
                Ok(score) => Some(score),
                Err(_) => {
                    log::warn!("{}:{}: ignoring malformed score {:?}", self.path.display(), i + 1, line);
                    None
                }
            })
            .collect();

        Ok(scores)
    }

    pub fn best(&self) -> io::Result<Option<u32>> {
        Ok(self.read_all()?.into_iter().max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_log(dir: &TempDir) -> ScoreLog {
        ScoreLog::new(dir.path().join("highscores.txt"))
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        assert_eq!(log.read_all().unwrap(), Vec::<u32>::new());
        assert_eq!(log.best().unwrap(), None);
    }

    #[test]
    fn appends_one_score_per_line() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);

        log.append(15).unwrap();
        log.append(40).unwrap();
        log.append(5).unwrap();

        assert_eq!(fs::read_to_string(log.path()).unwrap(), "15\n40\n5\n");
        assert_eq!(log.read_all().unwrap(), vec![15, 40, 5]);
        assert_eq!(log.best().unwrap(), Some(40));
    }

    #[test]
    fn skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);
        fs::write(log.path(), "10\nbanana\n\n  25 \n-3\n").unwrap();

        assert_eq!(log.read_all().unwrap(), vec![10, 25]);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let log = ScoreLog::new(dir.path().join("no-such-dir").join("scores.txt"));

        assert!(log.append(5).is_err());
    }
}
