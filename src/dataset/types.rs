use serde::{Deserialize, Serialize};

/// One indexed reference composition
///
/// Entries are produced by the offline indexer and are read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    /// Stable unique identifier
    pub id: String,
    /// Normalized match key (e.g. "strangerthings")
    #[serde(default)]
    pub slug: String,
    /// Best-effort display title
    #[serde(default)]
    pub title: String,
    /// Path of the source file inside the song collection
    #[serde(default)]
    pub source_path: Option<String>,
    /// Upstream location of the source file
    #[serde(default)]
    pub source_url: Option<String>,
    /// Author, when detectable
    #[serde(default)]
    pub author: Option<String>,
    /// Tempo parsed from the source
    #[serde(default)]
    pub bpm: Option<f64>,
    /// Cycles per minute, when the source sets it directly
    #[serde(default)]
    pub cpm: Option<f64>,
    /// Musical key, e.g. "g:minor"
    #[serde(default)]
    pub key: Option<String>,
    /// Synth and sample names used
    #[serde(default)]
    pub instruments: Vec<String>,
    /// Production techniques, e.g. "arpeggio", "filter-sweep"
    #[serde(default)]
    pub techniques: Vec<String>,
    /// Mood tags, e.g. "dark", "euphoric"
    #[serde(default)]
    pub moods: Vec<String>,
    /// Genre tags, e.g. "techno", "ambient"
    #[serde(default)]
    pub genres: Vec<String>,
    /// Natural-language prompts this entry should answer
    #[serde(default)]
    pub prompt_seeds: Vec<String>,
    /// Bounded preview of the source code
    #[serde(default)]
    pub snippet: String,
    /// Alternate match strings
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Tokenized title
    #[serde(default)]
    pub title_tokens: Vec<String>,
    /// Tokenized source path
    #[serde(default)]
    pub path_tokens: Vec<String>,
}

/// The corpus document: entries plus build metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusIndex {
    /// Indexed entries, in corpus order
    pub songs: Vec<CorpusEntry>,
    /// When the offline indexer ran
    #[serde(default)]
    pub generated_at: String,
    /// Index format version
    #[serde(default)]
    pub version: String,
}

/// Summary statistics describing what good pattern scripts look like
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StylePriors {
    #[serde(default)]
    pub summary_bullets: Vec<String>,
    #[serde(default)]
    pub common_moves: Vec<String>,
    #[serde(default)]
    pub do_more_of: Vec<String>,
    #[serde(default)]
    pub avoid: Vec<String>,
    #[serde(default)]
    pub tempo_distribution: Vec<TempoBucket>,
    #[serde(default)]
    pub typical_voice_count: VoiceCount,
    #[serde(default)]
    pub most_common_instruments: Vec<NamedCount>,
    #[serde(default)]
    pub most_common_techniques: Vec<NamedCount>,
}

/// Number of corpus entries within a tempo range such as "120-140"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoBucket {
    pub range: String,
    pub count: usize,
}

/// Voice count statistics across the corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCount {
    pub min: usize,
    pub max: usize,
    pub common: usize,
}

/// Frequency of a named instrument or technique
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub count: usize,
}
