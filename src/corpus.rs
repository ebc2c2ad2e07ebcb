//! Loading document sets into keyword profiles
//!
//! Each document is read and tokenized independently. A document that fails
//! is logged, recorded in [`Corpus::failures`] and left out of the profiles;
//! the rest of the set still loads.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::io::{IoError, IoResult, ReaderRegistry};
use crate::keywords::{KeywordOptions, KeywordProfile};

/// A document that could not be turned into a profile
#[derive(Debug)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub error: IoError,
}

/// Profiles for every readable document, in load order
#[derive(Debug, Default)]
pub struct Corpus {
    pub profiles: Vec<KeywordProfile>,
    pub failures: Vec<DocumentFailure>,
}

impl Corpus {
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profile by document id
    pub fn profile(&self, id: &str) -> Option<&KeywordProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }
}

/// Identifier for a document: its file name
pub fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Expand `inputs` into document paths.
///
/// Files are kept as given. Directories contribute every file a registered
/// reader supports, sorted by file name; subdirectories are not descended.
pub fn collect_paths(inputs: &[PathBuf], registry: &ReaderRegistry) -> IoResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && registry.supports_path(path))
                .collect();
            entries.sort_by_key(|path| document_id(path));
            debug!(dir = %input.display(), documents = entries.len(), "expanded directory");
            paths.extend(entries);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

/// Read and profile every document in `paths`
pub fn load_profiles(
    paths: &[PathBuf],
    registry: &ReaderRegistry,
    options: &KeywordOptions,
) -> Corpus {
    let mut corpus = Corpus::default();
    let mut seen = HashSet::new();

    for path in paths {
        let id = document_id(path);
        let result = if seen.contains(&id) {
            Err(IoError::DuplicateDocument(id.clone()))
        } else {
            registry.read_text(path)
        };

        match result {
            Ok(text) => {
                let profile = KeywordProfile::from_text(id.clone(), &text, options);
                debug!(document = %id, keywords = profile.keywords.len(), "profiled document");
                seen.insert(id);
                corpus.profiles.push(profile);
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping document");
                corpus.failures.push(DocumentFailure {
                    path: path.clone(),
                    error,
                });
            }
        }
    }

    info!(
        loaded = corpus.profiles.len(),
        failed = corpus.failures.len(),
        "loaded corpus"
    );
    corpus
}

/// [`collect_paths`] followed by [`load_profiles`]
pub fn load_inputs(
    inputs: &[PathBuf],
    registry: &ReaderRegistry,
    options: &KeywordOptions,
) -> IoResult<Corpus> {
    let paths = collect_paths(inputs, registry)?;
    Ok(load_profiles(&paths, registry, options))
}
