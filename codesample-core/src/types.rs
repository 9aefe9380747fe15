//! Domain types for code sample synchronization.
//!
//! A [`CodeFragment`] is one language rendition of a snippet extracted from a
//! source file. Fragments sharing a [`CodenameRoot`] form one
//! [`CodenameCodeFragments`] bundle, which the backend stores as a single
//! content item whose variant is a [`CodeSamples`] record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The codename shared by every language variant of one logical snippet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CodenameRoot(pub String);

impl CodenameRoot {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodenameRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CodenameRoot {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CodenameRoot {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The closed set of languages the backend record has a field for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Curl,
    CSharp,
    JavaScript,
    TypeScript,
    Java,
    JavaRx,
    Php,
    Swift,
    Ruby,
}

impl Language {
    /// Every supported language, in record field order.
    pub fn all() -> &'static [Language] {
        &[
            Language::Curl,
            Language::CSharp,
            Language::JavaScript,
            Language::TypeScript,
            Language::Java,
            Language::JavaRx,
            Language::Php,
            Language::Swift,
            Language::Ruby,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Curl => "curl",
            Language::CSharp => "csharp",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::JavaRx => "javarx",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::Ruby => "ruby",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Language::all()
            .iter()
            .copied()
            .find(|lang| lang.as_str() == lowered)
            .ok_or_else(|| CoreError::UnknownLanguage(s.to_string()))
    }
}

/// How a fragment was delimited in its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentType {
    /// An excerpt cut out of a larger program.
    Snippet,
    /// A complete, runnable program.
    Sample,
}

impl fmt::Display for FragmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentType::Snippet => write!(f, "snippet"),
            FragmentType::Sample => write!(f, "sample"),
        }
    }
}

impl FromStr for FragmentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "snippet" => Ok(FragmentType::Snippet),
            "sample" => Ok(FragmentType::Sample),
            _ => Err(CoreError::UnknownFragmentType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Fragments and files
// ---------------------------------------------------------------------------

/// One language-specific rendition of a snippet.
///
/// Immutable once produced by file parsing; the file or bundle holding it is
/// what changes over time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeFragment {
    /// `<root>_<variant>`, e.g. `intro_curl`.
    pub codename: String,
    pub content: String,
    pub language: Language,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub fragment_type: Option<FragmentType>,
}

impl CodeFragment {
    pub fn new(
        codename: impl Into<String>,
        language: Language,
        content: impl Into<String>,
    ) -> Self {
        Self {
            codename: codename.into(),
            content: content.into(),
            language,
            fragment_type: None,
        }
    }

    pub fn with_type(mut self, fragment_type: FragmentType) -> Self {
        self.fragment_type = Some(fragment_type);
        self
    }

    /// Identity used to match two observations of the same fragment.
    /// Content is deliberately not part of it.
    pub fn key(&self) -> FragmentKey {
        FragmentKey {
            codename: self.codename.clone(),
            language: self.language,
            fragment_type: self.fragment_type,
        }
    }
}

/// `(codename, language, type)` identity of a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentKey {
    pub codename: String,
    pub language: Language,
    pub fragment_type: Option<FragmentType>,
}

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.codename, self.language)?;
        if let Some(fragment_type) = self.fragment_type {
            write!(f, "({fragment_type})")?;
        }
        Ok(())
    }
}

/// The last fragment set observed for one tracked source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFile {
    /// Repository-relative path, used as the snapshot key.
    pub path: String,
    #[serde(default)]
    pub fragments: Vec<CodeFragment>,
}

impl CodeFile {
    pub fn new(path: impl Into<String>, fragments: Vec<CodeFragment>) -> Self {
        Self {
            path: path.into(),
            fragments,
        }
    }
}

// ---------------------------------------------------------------------------
// Bundles and backend records
// ---------------------------------------------------------------------------

/// Every fragment sharing one codename root; pushed to the backend as one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodenameCodeFragments {
    pub codename_root: CodenameRoot,
    pub fragments: Vec<CodeFragment>,
}

impl CodenameCodeFragments {
    pub fn new(codename_root: impl Into<CodenameRoot>) -> Self {
        Self {
            codename_root: codename_root.into(),
            fragments: Vec::new(),
        }
    }

    /// Distinct languages present in the bundle, in record field order.
    pub fn languages(&self) -> Vec<Language> {
        Language::all()
            .iter()
            .copied()
            .filter(|lang| self.fragments.iter().any(|f| f.language == *lang))
            .collect()
    }
}

/// Fixed-shape projection of a bundle onto the supported languages.
///
/// A language with no fragment is an empty string, never missing, so the
/// backend always receives a complete record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSamples {
    pub curl: String,
    pub csharp: String,
    pub javascript: String,
    pub typescript: String,
    pub java: String,
    pub javarx: String,
    pub php: String,
    pub swift: String,
    pub ruby: String,
}

impl CodeSamples {
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Curl => &self.curl,
            Language::CSharp => &self.csharp,
            Language::JavaScript => &self.javascript,
            Language::TypeScript => &self.typescript,
            Language::Java => &self.java,
            Language::JavaRx => &self.javarx,
            Language::Php => &self.php,
            Language::Swift => &self.swift,
            Language::Ruby => &self.ruby,
        }
    }

    pub fn set(&mut self, language: Language, content: impl Into<String>) {
        let field = match language {
            Language::Curl => &mut self.curl,
            Language::CSharp => &mut self.csharp,
            Language::JavaScript => &mut self.javascript,
            Language::TypeScript => &mut self.typescript,
            Language::Java => &mut self.java,
            Language::JavaRx => &mut self.javarx,
            Language::Php => &mut self.php,
            Language::Swift => &mut self.swift,
            Language::Ruby => &mut self.ruby,
        };
        *field = content.into();
    }

    /// Languages whose field holds content.
    pub fn filled(&self) -> Vec<Language> {
        Language::all()
            .iter()
            .copied()
            .filter(|lang| !self.get(*lang).is_empty())
            .collect()
    }
}

/// Backend-side identity of a codename root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub codename: CodenameRoot,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Change notification
// ---------------------------------------------------------------------------

/// File paths touched by one change notification, split by change class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
