use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A script that passes validation with the default limits
#[allow(dead_code)]
pub const VALID_SCRIPT: &str = r#"setcpm(90)
// drums
$: s("bd ~ sd ~").gain(0.6)
$: s("hh*8").gain(0.25)
// bass
$: note("c2 ~ eb2 g1").s("sine").lpf(300)
// pad
$: note("<[c3,eb3,g3] [ab2,c3,eb3]>").s("triangle").gain(0.3)
"#;

/// A small corpus document in the indexer's output format
#[allow(dead_code)]
pub const CORPUS_JSON: &str = r#"{
  "songs": [
    {
      "id": "stranger-things",
      "slug": "strangerthings",
      "title": "Stranger Things",
      "bpm": 84,
      "genres": ["synthwave"],
      "moods": ["brooding"],
      "techniques": ["arpeggio"],
      "instruments": ["sawtooth"],
      "prompt_seeds": ["stranger things theme"],
      "snippet": "setcpm(21)\n$: note(\"c3 e3 g3 b3\").s(\"sawtooth\")",
      "title_tokens": ["stranger", "things"]
    },
    {
      "id": "acid-techno",
      "slug": "acidtechno",
      "title": "Acid Techno",
      "bpm": 130,
      "genres": ["techno", "acid"],
      "moods": ["dark"],
      "techniques": ["filter-sweep"],
      "instruments": ["tr909"],
      "prompt_seeds": ["dark acid techno"],
      "snippet": "setcpm(32)\n$: s(\"bd*4\").bank(\"tr909\")",
      "title_tokens": ["acid", "techno"]
    },
    {
      "id": "ambient-drift",
      "slug": "ambientdrift",
      "title": "Ambient Drift",
      "bpm": 70,
      "genres": ["ambient"],
      "moods": ["calm"],
      "techniques": ["long-release"],
      "instruments": ["triangle"],
      "prompt_seeds": ["calm ambient pads"],
      "snippet": "setcpm(17)\n$: note(\"<c3 a2>\").s(\"triangle\")",
      "title_tokens": ["ambient", "drift"]
    }
  ],
  "generated_at": "2024-01-01T00:00:00Z",
  "version": "1.0"
}"#;

/// Style priors matching [`CORPUS_JSON`]
#[allow(dead_code)]
pub const PRIORS_JSON: &str = r#"{
  "summary_bullets": ["Keep voices sparse"],
  "avoid": ["long silences"],
  "typical_voice_count": {"min": 2, "max": 6, "common": 4},
  "tempo_distribution": [{"range": "20-30", "count": 2}]
}"#;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Writes the corpus and priors into `dir/dataset` and returns a config file
/// pointing at it, with the session database under `dir/session.db`
#[allow(dead_code)]
pub fn write_workspace(dir: &Path) -> PathBuf {
    let dataset = dir.join("dataset");
    fs::create_dir_all(&dataset).expect("failed to create dataset dir");
    fs::write(dataset.join("index.json"), CORPUS_JSON).expect("failed to write index");
    fs::write(dataset.join("style_priors.json"), PRIORS_JSON).expect("failed to write priors");

    let config = format!(
        "dataset:\n  search_dirs: [\"{}\"]\nsession:\n  storage_path: \"{}\"\n",
        dataset.display(),
        dir.join("session.db").display()
    );
    let config_path = dir.join("config.yaml");
    fs::write(&config_path, config).expect("failed to write config file");
    config_path
}
