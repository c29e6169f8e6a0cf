use std::fs;
use std::io::Write;
use tempfile::TempDir;

use deskroute_core::config::{ChunkingSettings, Config, Settings};
use deskroute_core::data_processor::DataProcessor;
use deskroute_core::error::Error;
use deskroute_core::types::{Chunk, Corpus, Domain};
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;

#[test]
fn load_corpus_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let mut f = fs::File::create(dir.join("leave.md")).unwrap();
    writeln!(f, "# Leave Policy\n\nEmployees receive 20 vacation days.").unwrap();

    let corpus = DataProcessor::new().load_corpus(Domain::Hr, dir).expect("load");

    assert_eq!(corpus.len(), 1, "one small file becomes one chunk");
    let chunk = &corpus.chunks()[0];
    assert_eq!(chunk.domain, Domain::Hr);
    assert_eq!(chunk.source_id, "leave.md");
    assert_eq!(chunk.ordinal, 0);
    assert_eq!(chunk.section_label.as_deref(), Some("Leave Policy"));
}

#[test]
fn load_corpus_skips_unsupported_and_sorts_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("b.txt"), "bravo").unwrap();
    fs::write(dir.join("nested/a.md"), "alpha").unwrap();
    fs::write(dir.join("image.png"), [0u8, 1, 2]).unwrap();

    let corpus = DataProcessor::new().load_corpus(Domain::Tech, dir).expect("load");

    let ids: Vec<&str> = corpus.chunks().iter().map(|c| c.source_id.as_str()).collect();
    assert_eq!(ids, vec!["b.txt", "nested/a.md"]);
}

#[test]
fn unreadable_pdf_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("broken.pdf"), b"not really a pdf").unwrap();
    fs::write(dir.join("SCAN.PDF"), [0u8, 159, 146, 150]).unwrap();
    fs::write(dir.join("policy.md"), "Expense reports are due monthly.").unwrap();

    let corpus = DataProcessor::new().load_corpus(Domain::Finance, dir).expect("load");

    let ids: Vec<&str> = corpus.chunks().iter().map(|c| c.source_id.as_str()).collect();
    assert_eq!(ids, vec!["policy.md"]);
}

#[test]
fn missing_directory_is_an_empty_corpus() {
    let tmp = TempDir::new().unwrap();
    let corpus = DataProcessor::new().load_corpus(Domain::Finance, &tmp.path().join("absent")).expect("load");
    assert!(corpus.is_empty());
    assert_eq!(corpus.domain(), Domain::Finance);
}

#[test]
fn overlapping_windows_cover_the_text() {
    let processor = DataProcessor::with_chunking(ChunkingSettings { chunk_size: 10, chunk_overlap: 4 });
    let text = "abcdefghijklmnopqrstuvwxyz";
    let chunks = processor.chunk_content(Domain::Hr, "alpha.txt", text);

    assert_eq!(chunks[0].text, "abcdefghij");
    assert_eq!(chunks[1].text, "ghijklmnop");
    assert!(chunks.last().unwrap().text.ends_with('z'));
    let ordinals: Vec<usize> = chunks.iter().map(|c| c.ordinal).collect();
    assert_eq!(ordinals, (0..chunks.len()).collect::<Vec<_>>());
}

#[test]
fn windows_respect_char_boundaries() {
    let processor = DataProcessor::with_chunking(ChunkingSettings { chunk_size: 3, chunk_overlap: 1 });
    let chunks = processor.chunk_content(Domain::Hr, "u.txt", "éééééé");
    assert!(chunks.iter().all(|c| c.text.chars().count() <= 3));
    assert_eq!(chunks[0].text, "ééé");
}

#[test]
fn corpus_rejects_foreign_domain_chunks() {
    let chunks = vec![Chunk::new(Domain::Tech, "a.txt", 0, "vpn")];
    let err = Corpus::new(Domain::Hr, chunks).unwrap_err();
    assert!(matches!(err, Error::InvalidCorpus(_)));
}

#[test]
fn corpus_rejects_non_increasing_ordinals() {
    let chunks = vec![
        Chunk::new(Domain::Hr, "a.txt", 1, "one"),
        Chunk::new(Domain::Hr, "b.txt", 0, "other source"),
        Chunk::new(Domain::Hr, "a.txt", 1, "again"),
    ];
    assert!(matches!(Corpus::new(Domain::Hr, chunks), Err(Error::InvalidCorpus(_))));
}

#[test]
fn domain_labels_parse_leniently() {
    assert_eq!(Domain::from_label(" Tech\n"), Some(Domain::Tech));
    assert_eq!(Domain::from_label("IT/Tech"), Some(Domain::Tech));
    assert_eq!(Domain::from_label("\"HR\"."), Some(Domain::Hr));
    assert_eq!(Domain::from_label("Unknown"), None);
    assert_eq!("finance".parse::<Domain>().unwrap(), Domain::Finance);
}

fn config_from(toml: &str) -> Config {
    Config::from_figment(Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(toml)))
}

#[test]
fn settings_defaults_are_valid() {
    let settings = config_from("").settings_without_env().expect("settings");
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.retrieval.top_k, 5);
    assert_eq!(settings.chunking.chunk_size, 1000);
    assert_eq!(settings.chunking.chunk_overlap, 200);
}

#[test]
fn toml_layer_overrides_defaults() {
    let config = config_from(
        r#"
        [retrieval]
        top_k = 3

        [routing.keywords]
        finance = ["invoice", "expense report"]
        "#,
    );
    let settings = config.settings_without_env().expect("settings");
    assert_eq!(settings.retrieval.top_k, 3);
    assert_eq!(settings.synthesis.max_line_chars, 240);
    assert_eq!(
        settings.routing.keywords.get(&Domain::Finance).cloned(),
        Some(vec!["invoice".to_string(), "expense report".to_string()])
    );
    let top_k: usize = config.get("retrieval.top_k").expect("get");
    assert_eq!(top_k, 3);
}

#[test]
fn invalid_overlap_is_rejected() {
    let err = config_from("[chunking]\nchunk_size = 100\nchunk_overlap = 100\n").settings_without_env().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn legacy_env_fills_llm_settings() {
    let mut settings = Settings::default();
    settings.apply_legacy_env(|k| match k {
        "OPENROUTER_API_KEY" => Some("sk-or".to_string()),
        "OPENAI_MODEL" => Some("gpt-4o-mini".to_string()),
        _ => None,
    });
    assert_eq!(settings.llm.api_key.as_deref(), Some("sk-or"));
    assert_eq!(settings.llm.effective_base_url(), "https://openrouter.ai/api/v1");
    assert_eq!(settings.llm.model, "gpt-4o-mini");
    assert!(settings.llm.is_available());
}

#[test]
fn disable_llm_switches_to_offline() {
    let mut settings = Settings::default();
    settings.apply_legacy_env(|k| match k {
        "OPENAI_API_KEY" => Some("sk-test".to_string()),
        "DISABLE_LLM" | "DISABLE_EVALUATION" => Some("1".to_string()),
        _ => None,
    });
    assert!(!settings.llm.is_available());
    assert!(!settings.evaluation.enabled);
    assert_eq!(settings.llm.effective_base_url(), "https://api.openai.com/v1");
}

#[test]
fn data_dirs_resolve_against_root() {
    let settings = config_from("[data]\nroot = \"/srv/kb\"\nfinance_dir = \"/abs/finance\"\n").settings_without_env().unwrap();
    assert_eq!(settings.data.dir_for(Domain::Hr), std::path::PathBuf::from("/srv/kb/hr_docs"));
    assert_eq!(settings.data.dir_for(Domain::Finance), std::path::PathBuf::from("/abs/finance"));
}
