use std::env;
use std::hash::Hasher;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use sened_classify::ClassifierEngine;
use sened_core::config::Config;
use sened_core::keyphrases::extract_key_phrases;
use sened_core::lang::detect_language;
use sened_core::script::is_ethiopic;
use sened_core::traits::Embedder;
use sened_core::types::{
    Category, IndexableDocument, Language, MatchedField, ProcessingStatus,
};
use sened_embed::{default_provider, HashEmbedder};
use sened_hybrid::{DocumentEngine, SearchOptions};
use sened_text::KeywordIndex;
use sened_vector::FlatVectorIndex;

const KEY_PHRASE_COUNT: usize = 5;
const HYDRATE_LIMIT: usize = 10_000;

type Engine = DocumentEngine<KeywordIndex, FlatVectorIndex>;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <ingest|search|classify|train> [args...]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    config.thresholds().validate()?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "ingest" => cmd_ingest(&config, &args),
        "search" => cmd_search(&config, &args),
        "classify" => cmd_classify(&config, &args),
        "train" => cmd_train(&config, &args),
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
}

fn build_engine(config: &Config) -> anyhow::Result<Engine> {
    let index_dir: String = config
        .get("data.index_dir")
        .unwrap_or_else(|_| "./data/indexes/keyword".to_string());
    let text = KeywordIndex::open(sened_core::config::expand_path(&index_dir))?;
    let embedder = default_provider(HashEmbedder::DEFAULT_DIM)?;
    let vector = FlatVectorIndex::new(embedder.dim());
    Ok(DocumentEngine::new(
        text,
        vector,
        Box::new(embedder),
        config.thresholds(),
    ))
}

fn build_classifier(config: &Config) -> ClassifierEngine {
    let model_path: String = config
        .get("model.path")
        .unwrap_or_else(|_| "./data/models/classifier.json".to_string());
    let classifier = ClassifierEngine::with_builtin_rules(
        sened_core::config::expand_path(&model_path),
        config.thresholds(),
    );
    // Config may extend the keyword table per category, e.g.
    //   [rules]
    //   housing = ["ቦታ", "villa"]
    for category in Category::ALL {
        let key = format!("rules.{}", category.name());
        if let Ok(keywords) = config.get::<Vec<String>>(&key) {
            for kw in keywords {
                let language = if kw.chars().any(is_ethiopic) {
                    Language::Amharic
                } else {
                    Language::English
                };
                classifier.add_rule_keywords(language, category, [kw]);
            }
        }
    }
    classifier.load_model();
    classifier
}

fn document_id(relative_path: &Path) -> u64 {
    let mut hasher = twox_hash::XxHash64::with_seed(0);
    hasher.write(relative_path.to_string_lossy().as_bytes());
    hasher.finish()
}

fn created_ts(path: &Path) -> i64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or_else(|| chrono::Utc::now().timestamp())
}

fn txt_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "txt"))
        .map(|e| e.path().to_path_buf())
        .collect()
}

fn cmd_ingest(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let data_dir = args.first().map(PathBuf::from).unwrap_or_else(|| {
        let dir: String = config
            .get("data.raw_txt_dir")
            .unwrap_or_else(|_| "./data/txt".to_string());
        sened_core::config::expand_path(dir)
    });
    println!("Ingesting from {}", data_dir.display());

    let classifier = build_classifier(config);
    let engine = build_engine(config)?;
    let files = txt_files(&data_dir);
    if files.is_empty() {
        println!("No .txt files found under {}", data_dir.display());
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut statuses = vec![ProcessingStatus::Pending; files.len()];
    for (file, status) in files.iter().zip(statuses.iter_mut()) {
        pb.inc(1);
        *status = ProcessingStatus::Processing;
        *status = match ingest_file(&classifier, &engine, &data_dir, file) {
            Ok(()) => ProcessingStatus::Completed,
            Err(e) => {
                warn!(path = %file.display(), %e, "ingest failed");
                ProcessingStatus::Error
            }
        };
    }
    pb.finish_and_clear();
    let indexed = statuses
        .iter()
        .filter(|s| **s == ProcessingStatus::Completed)
        .count();
    println!(
        "✅ Ingest complete: {} indexed, {} failed",
        indexed,
        statuses.len() - indexed
    );
    Ok(())
}

fn ingest_file(
    classifier: &ClassifierEngine,
    engine: &Engine,
    data_dir: &Path,
    file: &Path,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)?;
    let relative = file.strip_prefix(data_dir).unwrap_or(file);
    let title = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let (language, _) = detect_language(&content);
    let classification = classifier.classify(&content, Some(language));
    let tags = extract_key_phrases(&content, language, KEY_PHRASE_COUNT);
    let doc = IndexableDocument {
        id: document_id(relative),
        title,
        content,
        tags,
        category: classification.category,
        language,
        created_ts: created_ts(file),
        embedding: Vec::new(),
    };
    engine.index_document(&doc)
}

fn cmd_search(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let mut query = None;
    let mut options = SearchOptions::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--no-semantic" => options.use_semantic = false,
            "--category" => {
                i += 1;
                let name = args.get(i).map(String::as_str).unwrap_or_default();
                match Category::from_name(name) {
                    Some(c) => options.category = Some(c),
                    None => {
                        eprintln!("Unknown category: {}", name);
                        std::process::exit(1);
                    }
                }
            }
            "--tag" => {
                i += 1;
                if let Some(tag) = args.get(i) {
                    options.tags.push(tag.clone());
                }
            }
            "--limit" => {
                i += 1;
                options.limit = args
                    .get(i)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(options.limit);
            }
            "--threshold" => {
                i += 1;
                options.similarity_threshold = args.get(i).and_then(|v| v.parse().ok());
            }
            other if !other.starts_with('-') => query = Some(other.to_string()),
            other => {
                eprintln!("Unknown flag: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }
    let query = query.unwrap_or_default();

    let engine = build_engine(config)?;
    if options.use_semantic {
        engine.hydrate_vectors(HYDRATE_LIMIT)?;
    }
    let results = engine.search(&query, &options)?;
    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }
    for (rank, r) in results.iter().enumerate() {
        let fields: Vec<&str> = r.matched_fields.iter().map(field_name).collect();
        println!(
            "{:2}. [{:.3}] #{} ({}) {}",
            rank + 1,
            r.score,
            r.document_id,
            r.category.name(),
            fields.join(",")
        );
        if let Some(snippet) = &r.snippet {
            println!("      {}", snippet.replace('\n', " "));
        }
    }
    Ok(())
}

fn field_name(f: &MatchedField) -> &'static str {
    match f {
        MatchedField::Title => "title",
        MatchedField::Content => "content",
        MatchedField::Tags => "tags",
        MatchedField::Semantic => "semantic",
    }
}

fn cmd_classify(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let Some(path) = args.first() else {
        eprintln!("Usage: sened classify <file.txt>");
        std::process::exit(1);
    };
    let content = std::fs::read_to_string(path)?;
    let classifier = build_classifier(config);
    let c = classifier.classify(&content, None);
    println!("category:   {}", c.category.name());
    println!("confidence: {:.3}", c.confidence);
    println!("language:   {}", c.language.code());
    if !c.matched_tags.is_empty() {
        println!("matched:    {}", c.matched_tags.join(", "));
    }
    let phrases = extract_key_phrases(&content, c.language, KEY_PHRASE_COUNT);
    if !phrases.is_empty() {
        println!("keyphrases: {}", phrases.join(", "));
    }
    Ok(())
}

/// Train from a directory tree where each first-level subdirectory is named
/// after a category and holds that category's .txt examples.
fn cmd_train(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let Some(dir) = args.first().map(PathBuf::from) else {
        eprintln!("Usage: sened train <labeled-dir>");
        std::process::exit(1);
    };

    let mut texts = Vec::new();
    let mut labels = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(category) = Category::from_name(&name) else {
            warn!(directory = %name, "not a category name, skipping");
            continue;
        };
        for file in txt_files(&entry.path()) {
            match std::fs::read_to_string(&file) {
                Ok(content) => {
                    texts.push(content);
                    labels.push(category);
                }
                Err(e) => warn!(path = %file.display(), %e, "could not read file"),
            }
        }
    }

    let classifier = build_classifier(config);
    classifier.train(&texts, &labels)?;
    println!(
        "✅ Trained on {} documents, model saved to {}",
        texts.len(),
        classifier.model_path().display()
    );
    Ok(())
}
