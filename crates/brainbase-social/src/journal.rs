//! Post log, drafts and image locations under the SNS directory

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::Result;

pub const POST_LOG_FILE: &str = "post_log.md";
pub const DEFAULT_TEMPLATE: &str = "infographic";

/// Files kept alongside posts
#[derive(Debug, Clone)]
pub struct PostJournal {
    sns_dir: PathBuf,
}

impl PostJournal {
    pub fn new(sns_dir: impl Into<PathBuf>) -> Self {
        Self {
            sns_dir: sns_dir.into(),
        }
    }

    pub fn sns_dir(&self) -> &Path {
        &self.sns_dir
    }

    pub fn post_log_path(&self) -> PathBuf {
        self.sns_dir.join(POST_LOG_FILE)
    }

    pub fn drafts_dir(&self) -> PathBuf {
        self.sns_dir.join("drafts")
    }

    /// `images/infographic_YYYYmmdd_HHMMSS.png`
    pub fn default_image_path(&self, now: NaiveDateTime) -> PathBuf {
        self.sns_dir
            .join("images")
            .join(format!("infographic_{}.png", now.format("%Y%m%d_%H%M%S")))
    }

    /// Append a row to the post log table
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the log cannot be opened or written
    pub fn log_post(&self, url: &str, topic: &str, template: &str, now: NaiveDateTime) -> Result<()> {
        std::fs::create_dir_all(&self.sns_dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.post_log_path())?;
        writeln!(
            file,
            "| {} | {url} | {topic} | {template} |",
            now.format("%Y-%m-%d %H:%M")
        )?;
        tracing::info!(topic, "Post logged");
        Ok(())
    }

    /// Append a draft to today's draft file, separated by `---`
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the drafts directory or file cannot be written
    pub fn save_draft(
        &self,
        title: &str,
        body: &str,
        points: &[String],
        now: NaiveDateTime,
    ) -> Result<PathBuf> {
        let drafts_dir = self.drafts_dir();
        std::fs::create_dir_all(&drafts_dir)?;

        let date = now.format("%Y-%m-%d").to_string();
        let path = drafts_dir.join(format!("{date}_draft.md"));

        let mut content = format!("# SNS Draft - {date}\n\n## {title}\n\n{body}\n\n");
        if !points.is_empty() {
            content.push_str("### Points for Infographic\n");
            let lines: String = points.iter().map(|point| format!("- {point}\n")).collect();
            content.push_str(&lines);
        }

        let existed = path.exists();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if existed {
            file.write_all(b"\n---\n\n")?;
        }
        file.write_all(content.as_bytes())?;

        tracing::info!(path = %path.display(), "Draft saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 7)
            .unwrap()
    }

    #[test]
    fn test_post_log_rows_append() {
        let dir = tempfile::tempdir().unwrap();
        let journal = PostJournal::new(dir.path().join("sns"));

        journal
            .log_post("https://x.com/i/web/status/1", "事業OS", DEFAULT_TEMPLATE, at(9, 5))
            .unwrap();
        journal
            .log_post("https://x.com/i/web/status/2", "KPI", DEFAULT_TEMPLATE, at(18, 30))
            .unwrap();

        let log = std::fs::read_to_string(journal.post_log_path()).unwrap();
        assert_eq!(
            log,
            "| 2026-01-15 09:05 | https://x.com/i/web/status/1 | 事業OS | infographic |\n\
             | 2026-01-15 18:30 | https://x.com/i/web/status/2 | KPI | infographic |\n"
        );
    }

    #[test]
    fn test_drafts_share_a_daily_file() {
        let dir = tempfile::tempdir().unwrap();
        let journal = PostJournal::new(dir.path());

        let first = journal
            .save_draft(
                "Title A",
                "Body A",
                &["p1".to_string(), "p2".to_string()],
                at(9, 0),
            )
            .unwrap();
        let second = journal.save_draft("Title B", "Body B", &[], at(10, 0)).unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with("drafts/2026-01-15_draft.md"));

        let content = std::fs::read_to_string(first).unwrap();
        assert_eq!(
            content,
            "# SNS Draft - 2026-01-15\n\n## Title A\n\nBody A\n\n### Points for Infographic\n- p1\n- p2\n\
             \n---\n\n# SNS Draft - 2026-01-15\n\n## Title B\n\nBody B\n\n"
        );
    }

    #[test]
    fn test_default_image_path() {
        let journal = PostJournal::new("/tmp/sns");
        assert_eq!(
            journal.default_image_path(at(9, 5)),
            PathBuf::from("/tmp/sns/images/infographic_20260115_090507.png")
        );
    }
}
