use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use super::error::{IntakeError, Result};
use super::profile::CandidateProfile;
use super::prompts;
use crate::text_generation::{Message, TextGenerator};

const SUMMARY_MAX_CHARS: usize = 100;
const FALLBACK_RECORD_NAME: &str = "unnamed";

/// Append-only directory of completed interview records, one JSON file each.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fills in the evaluation summary if it can, then writes the record.
    pub async fn persist(&self, profile: &mut CandidateProfile, generator: &dyn TextGenerator) -> Result<PathBuf> {
        if needs_summary(profile) {
            profile.evaluation_summary = summarize(profile, generator).await;
        }
        self.write(profile, Local::now())
    }

    /// Writes `profile` as `<name>_<YYYYMMDD_HHMMSS>.json`. An existing file
    /// is never replaced: a numeric suffix is added instead.
    pub fn write(&self, profile: &CandidateProfile, at: DateTime<Local>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| IntakeError::Persistence {
            path: self.dir.clone(),
            source,
        })?;

        let body = serde_json::to_vec_pretty(profile)?;
        let stem = format!("{}_{}", record_name(profile), at.format("%Y%m%d_%H%M%S"));

        let mut attempt = 1;
        loop {
            let file_name = if attempt == 1 {
                format!("{}.json", stem)
            } else {
                format!("{}-{}.json", stem, attempt)
            };
            let path = self.dir.join(file_name);

            match create_new(&path) {
                Ok(mut file) => {
                    fill_or_discard(&path, || file.write_all(&body))
                        .map_err(|source| IntakeError::Persistence { path: path.clone(), source })?;
                    info!("Saved candidate record to {}", path.display());
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("{} already exists, trying the next suffix", path.display());
                    attempt += 1;
                }
                Err(source) => return Err(IntakeError::Persistence { path, source }),
            }
        }
    }
}

#[cfg(unix)]
fn create_new(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    // Records hold personal data; keep them owner-only.
    OpenOptions::new().write(true).create_new(true).mode(0o600).open(path)
}

#[cfg(not(unix))]
fn create_new(path: &Path) -> io::Result<fs::File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

/// Runs `write` against the freshly created `path`. A failed write removes
/// the file so no truncated record is left behind.
fn fill_or_discard(path: &Path, write: impl FnOnce() -> io::Result<()>) -> io::Result<()> {
    let result = write();
    if result.is_err() {
        if let Err(e) = fs::remove_file(path) {
            warn!("Could not remove partial record {}: {}", path.display(), e);
        }
    }
    result
}

/// Filesystem-safe stem from the candidate's name, else the email's local
/// part, else a fixed fallback.
pub fn record_name(profile: &CandidateProfile) -> String {
    let source = profile
        .name
        .as_deref()
        .map(str::to_string)
        .or_else(|| {
            profile
                .email
                .as_deref()
                .and_then(|email| email.split('@').next())
                .map(str::to_string)
        })
        .unwrap_or_default();

    let sanitized: String = source
        .trim()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();

    if sanitized.trim_matches(|c| c == '_' || c == '.').is_empty() {
        FALLBACK_RECORD_NAME.to_string()
    } else {
        sanitized
    }
}

fn needs_summary(profile: &CandidateProfile) -> bool {
    profile.evaluation_summary.is_none()
        && !profile.tech_stack.is_empty()
        && profile.interview.answered() > 0
        && !profile.interview.has_pending_question()
}

/// One request for a single-line summary. Any failure leaves it absent.
async fn summarize(profile: &CandidateProfile, generator: &dyn TextGenerator) -> Option<String> {
    let request = [Message::user(prompts::evaluation_prompt(profile))];
    match generator.generate("You evaluate technical screening interviews.", &request).await {
        Ok(text) => {
            let summary = single_line(&text);
            if summary.is_empty() {
                warn!("Evaluation summary came back empty");
                None
            } else {
                Some(summary)
            }
        }
        Err(e) => {
            warn!("Could not generate evaluation summary: {}", e);
            None
        }
    }
}

fn single_line(text: &str) -> String {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or_default();
    line.chars().take(SUMMARY_MAX_CHARS).collect::<String>().trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::intake::profile::ProfileField;
    use crate::text_generation::testing::ScriptedGenerator;
    use crate::text_generation::GenerationError;

    fn interviewed() -> CandidateProfile {
        let mut profile = CandidateProfile::default();
        profile.fill(ProfileField::Name, "Ada Lovelace");
        profile.fill(ProfileField::Email, "ada@example.com");
        profile.fill(ProfileField::Experience, "5 years");
        profile.fill_tech_stack(vec!["Rust".into(), "SQL".into()]);
        profile.interview.push_question("What is ownership?".into());
        profile.interview.push_question("What is an index?".into());
        profile.interview.push_answer("Each value has one owner".into());
        profile.interview.push_answer("A sorted lookup structure".into());
        profile
    }

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 12, 30, 5).unwrap()
    }

    #[test]
    fn file_name_embeds_sanitized_name_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("candidates"));

        let path = store.write(&interviewed(), noon()).unwrap();
        assert_eq!(path.file_name().unwrap(), "Ada_Lovelace_20240309_123005.json");
    }

    #[test]
    fn record_reads_back_equal() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let profile = interviewed();

        let path = store.write(&profile, noon()).unwrap();
        let restored: CandidateProfile = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(restored, profile);
    }

    #[test]
    fn same_second_writes_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        let first = store.write(&interviewed(), noon()).unwrap();
        let second = store.write(&interviewed(), noon()).unwrap();

        assert_ne!(first, second);
        assert_eq!(second.file_name().unwrap(), "Ada_Lovelace_20240309_123005-2.json");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn record_name_falls_back_to_email_then_literal() {
        let mut profile = CandidateProfile::default();
        assert_eq!(record_name(&profile), "unnamed");

        profile.fill(ProfileField::Email, "grace.h@example.com");
        assert_eq!(record_name(&profile), "grace.h");

        profile.fill(ProfileField::Name, "José O'Neil/../x");
        assert_eq!(record_name(&profile), "Jos_ONeil..x");
    }

    #[tokio::test]
    async fn persist_adds_a_bounded_single_line_summary() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let long = format!("{}\nsecond line", "Strong Rust fundamentals. ".repeat(10));
        let generator = ScriptedGenerator::replying(&[long.as_str()]);
        let mut profile = interviewed();

        store.persist(&mut profile, &generator).await.unwrap();

        let summary = profile.evaluation_summary.unwrap();
        assert!(summary.chars().count() <= SUMMARY_MAX_CHARS);
        assert!(summary.starts_with("Strong Rust fundamentals."));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn failed_summary_is_left_absent_and_record_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let generator = ScriptedGenerator::new([Err(GenerationError::Empty)]);
        let mut profile = interviewed();

        let path = store.persist(&mut profile, &generator).await.unwrap();

        assert!(profile.evaluation_summary.is_none());
        assert!(path.exists());
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn no_summary_while_a_question_is_unanswered() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let generator = ScriptedGenerator::replying(&["unused"]);
        let mut profile = interviewed();
        profile.interview.push_question("What is Pin?".into());

        let path = store.persist(&mut profile, &generator).await.unwrap();

        assert!(profile.evaluation_summary.is_none());
        assert!(path.exists());
        assert_eq!(generator.calls(), 0);
    }

    #[test]
    fn failed_write_leaves_no_partial_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Ada_20240309_123005.json");
        let mut file = create_new(&path).unwrap();

        let result = fill_or_discard(&path, || {
            file.write_all(b"{\"name\": ")?;
            Err(io::Error::new(io::ErrorKind::WriteZero, "disk full"))
        });

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::WriteZero);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn no_summary_without_answers() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let generator = ScriptedGenerator::replying(&["unused"]);
        let mut profile = CandidateProfile::default();
        profile.fill_tech_stack(vec!["Go".into()]);

        store.persist(&mut profile, &generator).await.unwrap();

        assert!(profile.evaluation_summary.is_none());
        assert_eq!(generator.calls(), 0);
    }
}
