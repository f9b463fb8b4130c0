//! Journal use-case service.
//!
//! # Responsibility
//! - Create, update and delete entries with editor defaults applied.
//! - Compute mood statistics over a trailing window.
//! - Filter loaded entries by search text, mood and calendar month.
//!
//! # Invariants
//! - An entry is rejected only when both title and content are blank.
//! - Month filtering intersects with the storage date-range query, so the
//!   result never contains entries the range query did not return.

use crate::clock::{fixed_offset, month_bounds_ms, Clock, SystemClock, DAY_MS};
use crate::model::journal::{
    normalize_tags, EntryDraft, EntryId, JournalEntry, Mood, UNTITLED_ENTRY,
};
use crate::model::ValidationError;
use crate::repo::journal_repo::JournalRepository;
use crate::repo::RepoError;
use chrono::FixedOffset;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const PREVIEW_CHARS: usize = 100;

const NEUTRAL_PROMPTS: &[&str] = &[
    "What is on your mind right now?",
    "Describe one small moment from today.",
];

/// Service error for journal use-cases.
#[derive(Debug)]
pub enum JournalServiceError {
    /// Title and content are both blank.
    BlankEntry,
    EntryNotFound(EntryId),
    /// Month filter is not `yyyy-MM`.
    InvalidMonth(String),
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for JournalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankEntry => write!(f, "entry needs a title or content"),
            Self::EntryNotFound(id) => write!(f, "journal entry not found: {id}"),
            Self::InvalidMonth(value) => write!(f, "invalid month `{value}`, expected yyyy-MM"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for JournalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for JournalServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Calendar month used by the month filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Parses `yyyy-MM`.
    pub fn parse(value: &str) -> Result<Self, JournalServiceError> {
        let invalid = || JournalServiceError::InvalidMonth(value.to_string());
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || month.len() != 2 || !all_digits(year) || !all_digits(month) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }

    /// First and last millisecond of the month in `offset`.
    pub fn bounds_ms(&self, offset: FixedOffset) -> Option<(i64, i64)> {
        month_bounds_ms(self.year, self.month, offset)
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Journal page filter. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalFilter {
    pub search: String,
    pub mood: Option<Mood>,
    pub month: Option<YearMonth>,
}

impl JournalFilter {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.mood.is_none() && self.month.is_none()
    }
}

/// Journal service facade over repository implementations.
pub struct JournalService<R: JournalRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl<R: JournalRepository> JournalService<R> {
    /// Creates a service reading the wall clock, cutting months in UTC.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            offset: fixed_offset(0),
        }
    }

    /// Sets the UTC offset used for month boundaries.
    pub fn with_utc_offset(mut self, utc_offset_minutes: i32) -> Self {
        self.offset = fixed_offset(utc_offset_minutes);
        self
    }

    /// Entries, newest `date` first.
    pub fn get_all(&self) -> Result<Vec<JournalEntry>, JournalServiceError> {
        Ok(self.repo.get_all()?)
    }

    pub fn get_by_id(&self, id: EntryId) -> Result<JournalEntry, JournalServiceError> {
        self.repo
            .get_by_id(id)?
            .ok_or(JournalServiceError::EntryNotFound(id))
    }

    pub fn get_by_date_range(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<JournalEntry>, JournalServiceError> {
        Ok(self.repo.get_by_date_range(start_ms, end_ms)?)
    }

    pub fn create(&self, draft: EntryDraft) -> Result<JournalEntry, JournalServiceError> {
        let now = self.clock.now_ms();
        let (title, content) = editor_text(&draft)?;
        let entry = JournalEntry {
            id: Uuid::new_v4(),
            title,
            content,
            mood: draft.mood,
            tags: normalize_tags(&draft.tags),
            date: draft.date.unwrap_or(now),
            garden_used: draft.garden_used,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&entry).map_err(|err| {
            log::error!("event=journal_create module=service status=error error={err}");
            JournalServiceError::from(err)
        })?;
        log::info!(
            "event=journal_create module=service status=ok entry_id={} tags={}",
            entry.id,
            entry.tags.len()
        );
        Ok(entry)
    }

    /// Replaces the editable fields of `id`. `date` falls back to the stored one.
    pub fn update(
        &self,
        id: EntryId,
        draft: EntryDraft,
    ) -> Result<JournalEntry, JournalServiceError> {
        let existing = self.get_by_id(id)?;
        let (title, content) = editor_text(&draft)?;
        let entry = JournalEntry {
            title,
            content,
            mood: draft.mood,
            tags: normalize_tags(&draft.tags),
            date: draft.date.unwrap_or(existing.date),
            garden_used: draft.garden_used,
            updated_at: self.clock.now_ms(),
            ..existing
        };
        self.repo.update(&entry).map_err(|err| {
            log::error!("event=journal_update module=service status=error entry_id={id} error={err}");
            not_found_or(err, id)
        })?;
        log::info!("event=journal_update module=service status=ok entry_id={id}");
        Ok(entry)
    }

    pub fn delete(&self, id: EntryId) -> Result<(), JournalServiceError> {
        self.repo.delete(id).map_err(|err| not_found_or(err, id))?;
        log::info!("event=journal_delete module=service status=ok entry_id={id}");
        Ok(())
    }

    /// Mood counts over entries dated within the last `days` days.
    pub fn get_mood_stats(&self, days: u32) -> Result<BTreeMap<Mood, usize>, JournalServiceError> {
        let cutoff = self.clock.now_ms() - i64::from(days) * DAY_MS;
        let mut stats = BTreeMap::new();
        for entry in self.repo.get_all()? {
            if entry.date < cutoff {
                continue;
            }
            if let Some(mood) = entry.mood {
                *stats.entry(mood).or_insert(0) += 1;
            }
        }
        Ok(stats)
    }

    /// Narrows `entries` by search text, then mood, then month.
    ///
    /// Search matches title, content or any tag, case-insensitively.
    pub fn filter_entries(
        &self,
        entries: &[JournalEntry],
        filter: &JournalFilter,
    ) -> Result<Vec<JournalEntry>, JournalServiceError> {
        let needle = filter.search.trim().to_lowercase();
        let mut filtered: Vec<JournalEntry> = entries
            .iter()
            .filter(|entry| needle.is_empty() || entry_matches(entry, &needle))
            .filter(|entry| filter.mood.is_none() || entry.mood == filter.mood)
            .cloned()
            .collect();

        if let Some(month) = filter.month {
            let (start, end) = month
                .bounds_ms(self.offset)
                .ok_or_else(|| JournalServiceError::InvalidMonth(month.to_string()))?;
            let in_month: HashSet<EntryId> = self
                .repo
                .get_by_date_range(start, end)?
                .into_iter()
                .map(|entry| entry.id)
                .collect();
            filtered.retain(|entry| in_month.contains(&entry.id));
        }

        log::debug!(
            "event=journal_filter module=service status=ok input={} output={}",
            entries.len(),
            filtered.len()
        );
        Ok(filtered)
    }
}

fn editor_text(draft: &EntryDraft) -> Result<(String, String), JournalServiceError> {
    let title = draft.title.trim();
    let content = draft.content.trim();
    if title.is_empty() && content.is_empty() {
        return Err(JournalServiceError::BlankEntry);
    }
    let title = if title.is_empty() { UNTITLED_ENTRY } else { title };
    Ok((title.to_string(), content.to_string()))
}

fn entry_matches(entry: &JournalEntry, needle: &str) -> bool {
    entry.title.to_lowercase().contains(needle)
        || entry.content.to_lowercase().contains(needle)
        || entry.tags.iter().any(|tag| tag.contains(needle))
}

fn not_found_or(err: RepoError, id: EntryId) -> JournalServiceError {
    if err.is_not_found() {
        JournalServiceError::EntryNotFound(id)
    } else {
        err.into()
    }
}

/// Writing prompts offered when an entry is started with `mood` selected.
pub fn prompts_for(mood: Option<Mood>) -> &'static [&'static str] {
    match mood {
        Some(Mood::Peaceful) => &[
            "Where did you feel most at ease today?",
            "What in your surroundings feels still right now?",
        ],
        Some(Mood::Reflective) => &[
            "What lesson keeps coming back to you?",
            "How have you changed since last month?",
        ],
        Some(Mood::Inspired) => &[
            "What sparked this feeling?",
            "What would you start if nothing held you back?",
        ],
        Some(Mood::Centered) => &[
            "What helps you stay grounded?",
            "Which routine anchored your day?",
        ],
        Some(Mood::Grateful) => &[
            "Name three things you are thankful for.",
            "Who made today better, and how?",
        ],
        Some(Mood::Anxious) => &[
            "What is within your control right now?",
            "Write the worry down, then one next step.",
        ],
        Some(Mood::Calm) => &[
            "Describe your breathing in this moment.",
            "What can you let go of tonight?",
        ],
        Some(Mood::Energetic) => &[
            "Where do you want to spend this energy?",
            "What made you feel alive today?",
        ],
        None => NEUTRAL_PROMPTS,
    }
}

/// Whitespace-separated word count across all entry contents.
pub fn total_words(entries: &[JournalEntry]) -> usize {
    entries
        .iter()
        .map(|entry| entry.content.split_whitespace().count())
        .sum()
}

/// Markdown-stripped excerpt of `content`, at most 100 characters.
pub fn preview(content: &str) -> Option<String> {
    let without_images = MARKDOWN_IMAGE_RE.replace_all(content, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(PREVIEW_CHARS).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::repo::journal_repo::InMemoryJournalRepository;

    const NOW: i64 = 1_792_146_600_000;

    fn service() -> JournalService<InMemoryJournalRepository> {
        JournalService::with_clock(InMemoryJournalRepository::new(), Arc::new(ManualClock::new(NOW)))
    }

    fn draft(title: &str, content: &str) -> EntryDraft {
        EntryDraft {
            title: title.to_string(),
            content: content.to_string(),
            ..EntryDraft::default()
        }
    }

    #[test]
    fn create_applies_editor_defaults() {
        let service = service();
        let mut input = draft("   ", "  body text ");
        input.tags = vec!["Zen".to_string(), "zen".to_string()];
        let entry = service.create(input).unwrap();
        assert_eq!(entry.title, UNTITLED_ENTRY);
        assert_eq!(entry.content, "body text");
        assert_eq!(entry.tags, vec!["zen".to_string()]);
        assert_eq!(entry.date, NOW);
    }

    #[test]
    fn create_rejects_blank_title_and_content() {
        let service = service();
        assert!(matches!(
            service.create(draft(" ", "\n")),
            Err(JournalServiceError::BlankEntry)
        ));
        assert!(service.get_all().unwrap().is_empty());
    }

    #[test]
    fn update_keeps_stored_date_when_draft_has_none() {
        let service = service();
        let mut input = draft("Morning", "sun");
        input.date = Some(NOW - DAY_MS);
        let entry = service.create(input).unwrap();

        let updated = service.update(entry.id, draft("Morning", "rain")).unwrap();
        assert_eq!(updated.date, NOW - DAY_MS);
        assert_eq!(updated.created_at, entry.created_at);
        assert_eq!(service.get_by_id(entry.id).unwrap().content, "rain");
    }

    #[test]
    fn mood_stats_skip_entries_outside_window() {
        let service = service();
        for (mood, age_days) in [(Mood::Peaceful, 1), (Mood::Peaceful, 2), (Mood::Calm, 3), (Mood::Calm, 40)] {
            let mut input = draft("t", "c");
            input.mood = Some(mood);
            input.date = Some(NOW - age_days * DAY_MS);
            service.create(input).unwrap();
        }
        let stats = service.get_mood_stats(30).unwrap();
        assert_eq!(stats.get(&Mood::Peaceful), Some(&2));
        assert_eq!(stats.get(&Mood::Calm), Some(&1));
        assert_eq!(stats.len(), 2);
    }

    #[test]
    fn year_month_parse_rejects_malformed_input() {
        assert_eq!(
            YearMonth::parse("2026-10").unwrap(),
            YearMonth { year: 2026, month: 10 }
        );
        for bad in [
            "2026-13", "2026-1", "26-10", "october", "2026-00", "+202-10", "-202-10", "2026-+1",
        ] {
            assert!(YearMonth::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn oversized_offset_cuts_months_in_utc() {
        let service = service().with_utc_offset(40_000_000);
        let mut input = draft("Late", "last minute of september");
        // 2026-09-30T23:59:59.999Z
        input.date = Some(1_790_812_799_999);
        let entry = service.create(input).unwrap();

        let september = JournalFilter {
            month: Some(YearMonth::parse("2026-09").unwrap()),
            ..JournalFilter::default()
        };
        let matched = service.filter_entries(&[entry], &september).unwrap();
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn search_covers_tags() {
        let service = service();
        let mut input = draft("Walk", "by the river");
        input.tags = vec!["Outdoors".to_string()];
        service.create(input).unwrap();
        service.create(draft("Tea", "quiet afternoon")).unwrap();

        let entries = service.get_all().unwrap();
        let filter = JournalFilter {
            search: "OUTDOOR".to_string(),
            ..JournalFilter::default()
        };
        let found = service.filter_entries(&entries, &filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Walk");
    }

    #[test]
    fn preview_strips_markdown_and_truncates() {
        let text = preview("# Title\n\n**bold** [link](https://x.y) ![img](a.png)").unwrap();
        assert_eq!(text, "Title bold link");
        assert_eq!(preview("a ".repeat(200).as_str()).unwrap().chars().count(), 100);
        assert_eq!(preview("  ## "), None);
    }

    #[test]
    fn words_and_prompts() {
        let service = service();
        service.create(draft("a", "one two  three")).unwrap();
        service.create(draft("b", "four")).unwrap();
        assert_eq!(total_words(&service.get_all().unwrap()), 4);
        assert!(!prompts_for(Some(Mood::Anxious)).is_empty());
        assert_eq!(prompts_for(None), NEUTRAL_PROMPTS);
    }
}
