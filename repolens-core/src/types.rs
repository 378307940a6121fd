//! Core data type definitions
//!
//! Every analysis request rebuilds these values from scratch; nothing here is persisted.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Owner/name pair identifying a repository on the hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Where a piece of data came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Live hosting-platform API
    #[default]
    Api,
    /// Local shallow clone; per-day and social counts are unavailable
    GitFallback,
}

/// Outcome of a retrieval that may degrade instead of failing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Fetched<T> {
    /// Retrieved from the hosting-platform API
    Api(T),
    /// Synthesized from the local clone fallback
    Fallback(T),
    /// Nothing could be retrieved
    Empty,
}

impl<T> Fetched<T> {
    pub fn provenance(&self) -> Option<Provenance> {
        match self {
            Fetched::Api(_) => Some(Provenance::Api),
            Fetched::Fallback(_) => Some(Provenance::GitFallback),
            Fetched::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Fetched::Empty)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Fetched::Api(value) | Fetched::Fallback(value) => Some(value),
            Fetched::Empty => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Fetched::Api(value) | Fetched::Fallback(value) => Some(value),
            Fetched::Empty => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Fetched<U> {
        match self {
            Fetched::Api(value) => Fetched::Api(f(value)),
            Fetched::Fallback(value) => Fetched::Fallback(f(value)),
            Fetched::Empty => Fetched::Empty,
        }
    }
}

impl<T: Default> Fetched<T> {
    /// The retrieved value, or the typed-empty default
    pub fn unwrap_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

/// Statistics only available from a local clone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneStats {
    pub commit_count: u64,
    pub last_commit_date: Option<String>,
    pub branch_count: u64,
}

/// Repository metadata snapshot, fetched once per analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    #[serde(flatten)]
    pub id: RepoId,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub language: Option<String>,
    pub clone_url: Option<String>,
    pub homepage: Option<String>,
    pub provenance: Provenance,
    /// Present only for clone-derived metadata
    pub clone_stats: Option<CloneStats>,
}

impl RepositoryMetadata {
    /// Metadata carrying nothing but the identifier, used when every source failed
    pub fn unknown(id: RepoId) -> Self {
        Self {
            id,
            description: None,
            stars: 0,
            forks: 0,
            watchers: 0,
            open_issues: 0,
            language: None,
            clone_url: None,
            homepage: None,
            provenance: Provenance::Api,
            clone_stats: None,
        }
    }

    /// The reported clone URL, or the conventional one derived from the identifier
    pub fn clone_url_or_default(&self) -> String {
        self.clone_url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| format!("https://github.com/{}.git", self.id.full_name()))
    }
}

/// Kind of an entry in a repository listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, submodules and anything unrecognised
    #[default]
    #[serde(other)]
    Other,
}

/// A single entry of the flattened repository listing; content is fetched lazily
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub path: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
}

impl ContentEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            size: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Language name -> file count, kept in first-encountered order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageHistogram {
    entries: Vec<(String, usize)>,
}

impl LanguageHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, language: &str) {
        match self.entries.iter_mut().find(|(name, _)| name == language) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((language.to_string(), 1)),
        }
    }

    pub fn get(&self, language: &str) -> usize {
        self.entries
            .iter()
            .find(|(name, _)| name == language)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.entries.iter().map(|(_, count)| *count).max().unwrap_or(0)
    }

    /// Language with the highest count; ties go to the first encountered
    pub fn most_used(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (name, count) in &self.entries {
            match best {
                Some((_, best_count)) if *count <= best_count => {}
                _ => best = Some((name.as_str(), *count)),
            }
        }
        best.map(|(name, _)| name)
    }
}

impl<'a> FromIterator<(&'a str, usize)> for LanguageHistogram {
    fn from_iter<I: IntoIterator<Item = (&'a str, usize)>>(iter: I) -> Self {
        let mut histogram = LanguageHistogram::new();
        for (name, count) in iter {
            match histogram.entries.iter_mut().find(|(n, _)| n == name) {
                Some((_, existing)) => *existing += count,
                None => histogram.entries.push((name.to_string(), count)),
            }
        }
        histogram
    }
}

impl Serialize for LanguageHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, count) in &self.entries {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LanguageHistogram {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HistogramVisitor;

        impl<'de> Visitor<'de> for HistogramVisitor {
            type Value = LanguageHistogram;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of language names to file counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((name, count)) = access.next_entry::<String, usize>()? {
                    entries.push((name, count));
                }
                Ok(LanguageHistogram { entries })
            }
        }

        deserializer.deserialize_map(HistogramVisitor)
    }
}

/// Per-file complexity metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileComplexity {
    pub lines: usize,
    pub functions: usize,
    pub classes: usize,
}

/// Coarse size tier derived from the classified-file count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexityTier {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComplexityTier::High => "High",
            ComplexityTier::Medium => "Medium",
            ComplexityTier::Low => "Low",
            ComplexityTier::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Qualitative reading of a code-analysis summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitativeAssessment {
    pub complexity: ComplexityTier,
    pub important_languages: Vec<String>,
    pub technologies: Vec<String>,
    pub quality: Vec<String>,
}

/// Aggregated result of walking a repository's files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeAnalysisSummary {
    /// Entries of kind file, whether or not content was retrievable
    pub total_files: usize,
    pub languages: LanguageHistogram,
    pub dependencies: BTreeSet<String>,
    pub main_files: Vec<String>,
    /// Duplicates are kept; frequency is meaningful
    pub architecture: Vec<String>,
    pub complexity: BTreeMap<String, FileComplexity>,
    /// Sum of per-language file counts
    pub total_code: usize,
    pub most_used_language: Option<String>,
    pub assessment: QualitativeAssessment,
}

/// One weekly bucket of commit activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekActivity {
    /// Unix timestamp of the start of the week
    pub week: i64,
    pub total: u64,
    /// Sunday-first per-day counts; all zero for clone-derived data
    pub days: [u64; 7],
    pub commit_frequency: f64,
    pub percentage_of_total: f64,
}

impl WeekActivity {
    pub fn new(week: i64, total: u64, days: [u64; 7]) -> Self {
        Self {
            week,
            total,
            days,
            commit_frequency: 0.0,
            percentage_of_total: 0.0,
        }
    }
}

/// Weekly commit activity with its provenance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitActivity {
    pub weeks: Vec<WeekActivity>,
    pub provenance: Provenance,
}

impl CommitActivity {
    /// Builds the record and fills in frequency and percentage-of-total per week
    pub fn new(mut weeks: Vec<WeekActivity>, provenance: Provenance) -> Self {
        let total: u64 = weeks.iter().map(|w| w.total).sum();
        for week in &mut weeks {
            week.commit_frequency = week.total as f64 / 7.0;
            week.percentage_of_total = if total > 0 {
                week.total as f64 / total as f64 * 100.0
            } else {
                0.0
            };
        }
        Self { weeks, provenance }
    }

    pub fn total_commits(&self) -> u64 {
        self.weeks.iter().map(|w| w.total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

/// Derived commit cadence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitFrequency {
    pub daily_average: f64,
    pub weekly_average: f64,
    pub monthly_average: f64,
    pub busiest_day: Option<u64>,
    pub busiest_week: Option<i64>,
    pub total_commits: u64,
    pub total_weeks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
    #[serde(other)]
    Other,
}

/// Raw issue as returned by the source; `created_at` is kept unparsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub title: String,
    pub state: IssueState,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorRecord {
    pub login: String,
    pub contributions: u64,
}

/// Which path produced a piece of generated prose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    Model,
    Fallback,
}

/// Generated prose together with its origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub text: String,
    pub source: NarrativeSource,
}

impl Narrative {
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: NarrativeSource::Model,
        }
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: NarrativeSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == NarrativeSource::Fallback
    }
}

/// Issue counts plus generated insight prose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInsight {
    pub open: usize,
    pub closed: usize,
    pub narrative: Narrative,
}

/// Whether an issue response time was measured or is the fixed placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTimeBasis {
    Measured,
    /// No usable timestamps; the value is a constant, not an observation
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueResponseTime {
    pub days: i64,
    pub basis: ResponseTimeBasis,
}

/// Headline repository metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetrics {
    pub avg_contributions: f64,
    pub active_contributors: usize,
    pub open_issues: usize,
    pub issue_response_time: IssueResponseTime,
    pub total_code: usize,
}

/// Top-level result handed to presentation layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: RepoId,
    pub repository: Option<RepositoryMetadata>,
    pub contributors: Vec<ContributorRecord>,
    pub commit_activity: Option<CommitActivity>,
    pub commit_frequency: CommitFrequency,
    pub issues: Vec<IssueRecord>,
    pub issue_insight: IssueInsight,
    pub code_analysis: CodeAnalysisSummary,
    pub language_bytes: BTreeMap<String, u64>,
    pub readme: Narrative,
    pub metrics: RepositoryMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_histogram_most_used_prefers_first_on_tie() {
        let mut histogram = LanguageHistogram::new();
        histogram.increment("Rust");
        histogram.increment("Python");
        histogram.increment("Python");
        histogram.increment("Rust");

        assert_eq!(histogram.most_used(), Some("Rust"));
        assert_eq!(histogram.total(), 4);
        assert_eq!(histogram.names().collect::<Vec<_>>(), vec!["Rust", "Python"]);
    }

    #[test]
    fn test_histogram_empty_has_no_most_used() {
        assert_eq!(LanguageHistogram::new().most_used(), None);
    }

    #[test]
    fn test_histogram_serializes_in_insertion_order() {
        let histogram: LanguageHistogram = [("YAML", 1), ("Go", 3)].into_iter().collect();
        let json = serde_json::to_string(&histogram).unwrap();
        assert_eq!(json, r#"{"YAML":1,"Go":3}"#);

        let back: LanguageHistogram = serde_json::from_str(&json).unwrap();
        assert_eq!(back, histogram);
    }

    #[test]
    fn test_commit_activity_percentages() {
        let activity = CommitActivity::new(
            vec![
                WeekActivity::new(1_700_000_000, 10, [0; 7]),
                WeekActivity::new(1_700_604_800, 5, [0; 7]),
            ],
            Provenance::Api,
        );

        assert_eq!(activity.total_commits(), 15);
        assert!((activity.weeks[0].percentage_of_total - 66.666).abs() < 0.01);
        let sum: f64 = activity.weeks.iter().map(|w| w.percentage_of_total).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((activity.weeks[1].commit_frequency - 5.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_commit_activity_zero_total() {
        let activity = CommitActivity::new(
            vec![WeekActivity::new(0, 0, [0; 7])],
            Provenance::GitFallback,
        );
        assert_eq!(activity.weeks[0].percentage_of_total, 0.0);
        assert_eq!(activity.weeks[0].commit_frequency, 0.0);
    }

    #[test]
    fn test_fetched_helpers() {
        let api: Fetched<Vec<u8>> = Fetched::Api(vec![1]);
        assert_eq!(api.provenance(), Some(Provenance::Api));
        assert_eq!(api.clone().map(|v| v.len()), Fetched::Api(1));

        let fallback: Fetched<u8> = Fetched::Fallback(3);
        assert_eq!(fallback.provenance(), Some(Provenance::GitFallback));

        let empty: Fetched<Vec<u8>> = Fetched::Empty;
        assert!(empty.is_empty());
        assert!(empty.unwrap_or_default().is_empty());
    }

    #[test]
    fn test_entry_kind_accepts_unknown_types() {
        let kind: EntryKind = serde_json::from_str(r#""submodule""#).unwrap();
        assert_eq!(kind, EntryKind::Other);
        let kind: EntryKind = serde_json::from_str(r#""dir""#).unwrap();
        assert_eq!(kind, EntryKind::Dir);
    }

    #[test]
    fn test_clone_url_default() {
        let meta = RepositoryMetadata::unknown(RepoId::new("octo", "demo"));
        assert_eq!(meta.clone_url_or_default(), "https://github.com/octo/demo.git");
    }
}
