use std::{
  collections::{BTreeMap, BTreeSet, VecDeque},
  ffi::OsStr,
  fmt,
  path::{Component, Path, PathBuf},
};

use anyhow::Context;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecFormat {
  #[default]
  Json,
  Yaml,
}

impl SpecFormat {
  #[must_use]
  pub fn from_extension(ext: &str) -> Self {
    match ext {
      "yaml" | "yml" => Self::Yaml,
      _ => Self::Json,
    }
  }

  #[must_use]
  pub fn from_path(path: &Path) -> Self {
    path
      .extension()
      .and_then(OsStr::to_str)
      .map_or(Self::default(), Self::from_extension)
  }

  pub fn parse(self, bytes: &[u8]) -> anyhow::Result<Value> {
    match self {
      Self::Json => Ok(serde_json::from_slice(bytes)?),
      Self::Yaml => Ok(serde_yaml::from_slice(bytes)?),
    }
  }
}

/// Where a specification document lives.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpecSource {
  File(PathBuf),
  Remote(String),
}

impl SpecSource {
  #[must_use]
  pub fn parse(input: &str) -> Self {
    if input.starts_with("http://") || input.starts_with("https://") {
      Self::Remote(input.to_string())
    } else {
      Self::File(normalize(Path::new(input)))
    }
  }

  /// Resolves a relative `$ref` file part against this document.
  pub fn join(&self, relative: &str) -> anyhow::Result<Self> {
    if relative.starts_with("http://") || relative.starts_with("https://") {
      return Ok(Self::Remote(relative.to_string()));
    }

    match self {
      Self::File(path) => {
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Self::File(normalize(&base.join(relative))))
      }
      Self::Remote(base) => join_remote(base, relative).map(Self::Remote),
    }
  }

  #[must_use]
  pub fn key(&self) -> String {
    self.to_string()
  }
}

impl fmt::Display for SpecSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::File(path) => write!(f, "{}", path.display()),
      Self::Remote(url) => f.write_str(url),
    }
  }
}

fn normalize(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        if !out.pop() {
          out.push("..");
        }
      }
      other => out.push(other.as_os_str()),
    }
  }
  out
}

#[cfg(feature = "remote")]
fn join_remote(base: &str, relative: &str) -> anyhow::Result<String> {
  let base = url::Url::parse(base).with_context(|| format!("invalid specification URL {base}"))?;
  Ok(base.join(relative)?.to_string())
}

#[cfg(not(feature = "remote"))]
fn join_remote(base: &str, _relative: &str) -> anyhow::Result<String> {
  anyhow::bail!("cannot resolve references from {base}: built without the `remote` feature")
}

pub struct SpecLoader {
  file: AsyncMmapFile,
  format: SpecFormat,
}

impl SpecLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let format = SpecFormat::from_path(path);
    let file = AsyncMmapFile::open(path)
      .await
      .with_context(|| format!("failed to open {}", path.display()))?;

    Ok(Self { file, format })
  }

  pub fn parse(&self) -> anyhow::Result<Value> {
    self.format.parse(self.file.as_slice())
  }
}

pub async fn load_document(source: &SpecSource) -> anyhow::Result<Value> {
  match source {
    SpecSource::File(path) => SpecLoader::open(path)
      .await?
      .parse()
      .with_context(|| format!("failed to parse {}", path.display())),
    SpecSource::Remote(url) => fetch_remote(url).await,
  }
}

#[cfg(feature = "remote")]
async fn fetch_remote(url: &str) -> anyhow::Result<Value> {
  let parsed = url::Url::parse(url).with_context(|| format!("invalid specification URL {url}"))?;
  let format = SpecFormat::from_path(Path::new(parsed.path()));
  let bytes = reqwest::get(parsed)
    .await
    .with_context(|| format!("failed to fetch {url}"))?
    .error_for_status()?
    .bytes()
    .await?;
  format.parse(&bytes).with_context(|| format!("failed to parse {url}"))
}

#[cfg(not(feature = "remote"))]
async fn fetch_remote(url: &str) -> anyhow::Result<Value> {
  anyhow::bail!("cannot load {url}: built without the `remote` feature")
}

static NULL: Value = Value::Null;

#[derive(Debug, Clone)]
pub struct Document {
  pub source: SpecSource,
  pub value: Value,
}

/// Target of a `$ref`: the document key and JSON pointer, plus the value
/// when both resolve.
#[derive(Debug, Clone, Copy)]
pub struct RefTarget<'s, 'r> {
  pub document: Option<&'s str>,
  pub pointer: &'r str,
  pub value: Option<&'s Value>,
}

/// The root specification plus every document its `$ref`s reach.
#[derive(Debug, Clone)]
pub struct DocumentStore {
  root: String,
  documents: BTreeMap<String, Document>,
  failures: Vec<(String, String)>,
}

impl DocumentStore {
  /// Loads the root document and, breadth first, every external document it
  /// references. Only the root is required to load.
  pub async fn load(root: SpecSource) -> anyhow::Result<Self> {
    let root_key = root.key();
    let value = load_document(&root)
      .await
      .with_context(|| format!("failed to load specification {root}"))?;

    let mut store = Self {
      root: root_key.clone(),
      documents: BTreeMap::new(),
      failures: Vec::new(),
    };
    let mut queue = store.insert(root, value);

    while let Some(source) = queue.pop_front() {
      let key = source.key();
      if store.documents.contains_key(&key) || store.failures.iter().any(|(failed, _)| *failed == key) {
        continue;
      }
      match load_document(&source).await {
        Ok(value) => queue.extend(store.insert(source, value)),
        Err(err) => store.failures.push((key, format!("{err:#}"))),
      }
    }

    Ok(store)
  }

  /// Builds a store from documents already in memory.
  #[must_use]
  pub fn from_documents(root: SpecSource, value: Value, others: impl IntoIterator<Item = (SpecSource, Value)>) -> Self {
    let mut store = Self {
      root: root.key(),
      documents: BTreeMap::new(),
      failures: Vec::new(),
    };
    store.insert(root, value);
    for (source, value) in others {
      store.insert(source, value);
    }
    store
  }

  fn insert(&mut self, source: SpecSource, value: Value) -> VecDeque<SpecSource> {
    let mut files = BTreeSet::new();
    collect_external_files(&value, &mut files);

    let mut pending = VecDeque::new();
    for file in files {
      match source.join(&file) {
        Ok(target) if !self.documents.contains_key(&target.key()) => pending.push_back(target),
        Ok(_) => {}
        Err(err) => self.failures.push((file, format!("{err:#}"))),
      }
    }

    self.documents.insert(source.key(), Document { source, value });
    pending
  }

  #[must_use]
  pub fn root_key(&self) -> &str {
    &self.root
  }

  /// The root document. Always present.
  #[must_use]
  pub fn root(&self) -> &Value {
    self.documents.get(&self.root).map_or(&NULL, |doc| &doc.value)
  }

  #[must_use]
  pub fn get(&self, key: &str) -> Option<&Document> {
    self.documents.get(key)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.documents.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.documents.is_empty()
  }

  /// External documents that could not be loaded, with the reason.
  #[must_use]
  pub fn failures(&self) -> &[(String, String)] {
    &self.failures
  }

  /// Resolves `reference` as written inside the document `from`.
  #[must_use]
  pub fn resolve_ref<'s, 'r>(&'s self, from: &str, reference: &'r str) -> RefTarget<'s, 'r> {
    let (file, pointer) = reference.split_once('#').unwrap_or((reference, ""));

    let document = if file.is_empty() {
      self.documents.get_key_value(from).map(|(key, _)| key.as_str())
    } else {
      self
        .documents
        .get(from)
        .and_then(|doc| doc.source.join(file).ok())
        .and_then(|target| self.documents.get_key_value(&target.key()))
        .map(|(key, _)| key.as_str())
    };

    let value = document
      .and_then(|key| self.documents.get(key))
      .and_then(|doc| doc.value.pointer(pointer));

    RefTarget {
      document,
      pointer,
      value,
    }
  }
}

fn collect_external_files(value: &Value, files: &mut BTreeSet<String>) {
  match value {
    Value::Object(map) => {
      if let Some(Value::String(reference)) = map.get("$ref") {
        let file = reference.split_once('#').map_or(reference.as_str(), |(file, _)| file);
        if !file.is_empty() {
          files.insert(file.to_string());
        }
      }
      for child in map.values() {
        collect_external_files(child, files);
      }
    }
    Value::Array(items) => {
      for child in items {
        collect_external_files(child, files);
      }
    }
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_spec_format_from_extension() {
    assert_eq!(SpecFormat::from_extension("yaml"), SpecFormat::Yaml);
    assert_eq!(SpecFormat::from_extension("yml"), SpecFormat::Yaml);
    assert_eq!(SpecFormat::from_extension("json"), SpecFormat::Json);
    assert_eq!(SpecFormat::from_path(Path::new("spec")), SpecFormat::Json);
  }

  #[test]
  fn test_source_join_normalizes_relative_paths() {
    let source = SpecSource::parse("specs/storage/stable/storage.json");
    let joined = source.join("../../common-types/types.json").unwrap();
    assert_eq!(joined, SpecSource::File(PathBuf::from("specs/common-types/types.json")));
    assert!(matches!(SpecSource::parse("https://example.com/a.json"), SpecSource::Remote(_)));
  }

  #[test]
  fn test_resolve_ref_across_documents() {
    let store = DocumentStore::from_documents(
      SpecSource::parse("api/main.json"),
      json!({ "definitions": { "Local": { "type": "string" } } }),
      [(
        SpecSource::parse("common/types.json"),
        json!({ "definitions": { "Resource": { "type": "object" } } }),
      )],
    );

    let local = store.resolve_ref(store.root_key(), "#/definitions/Local");
    assert_eq!(local.document, Some("api/main.json"));
    assert_eq!(local.value, Some(&json!({ "type": "string" })));

    let external = store.resolve_ref(store.root_key(), "../common/types.json#/definitions/Resource");
    assert_eq!(external.document, Some("common/types.json"));
    assert_eq!(external.pointer, "/definitions/Resource");
    assert!(external.value.is_some());

    let missing = store.resolve_ref(store.root_key(), "#/definitions/Nope");
    assert!(missing.value.is_none());
  }

  #[tokio::test]
  async fn test_load_follows_external_refs() {
    let dir = tempfile::tempdir().unwrap();
    let main = dir.path().join("main.yaml");
    std::fs::write(
      &main,
      "definitions:\n  Thing:\n    allOf:\n      - $ref: './common.json#/definitions/Resource'\n",
    )
    .unwrap();
    std::fs::write(
      dir.path().join("common.json"),
      r#"{ "definitions": { "Resource": { "$ref": "./missing.json#/definitions/X" } } }"#,
    )
    .unwrap();

    let store = DocumentStore::load(SpecSource::File(main)).await.unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.failures().len(), 1);
    assert!(store.root().pointer("/definitions/Thing/allOf/0/$ref").is_some());
  }
}
