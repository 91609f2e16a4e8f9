//! In-memory model of a gettext PO catalog.

pub mod mo;
pub mod po;

/// One translatable sentence of a catalog.
///
/// `original` and `context` together identify the entry; the orchestration
/// loop fills in `translation` and leaves everything else untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Comment lines (`#`, `#.`, `#:`, `#,`, `#|`) preserved verbatim.
    pub comments: Vec<String>,
    /// Disambiguating context (`msgctxt`).
    pub context: Option<String>,
    /// The immutable source text (`msgid`).
    pub original: String,
    /// The plural form of the source text (`msgid_plural`).
    pub plural: Option<String>,
    /// The translation (`msgstr`, or `msgstr[0]` for plural entries).
    pub translation: Option<String>,
    /// Plural translations beyond the first (`msgstr[1]`…), carried through
    /// untouched.
    pub plural_translations: Vec<String>,
}

impl Entry {
    /// Creates an entry with only a source text.
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if the entry carries a non-empty translation.
    ///
    /// An empty `msgstr` means "not yet translated" in gettext, so it is
    /// reported as untranslated here and picked up by the next pass.
    pub fn is_translated(&self) -> bool {
        self.translation.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// A parsed catalog: the header entry plus translatable entries in file
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// The `msgid ""` metadata entry, kept out of `entries` so it is never
    /// offered for translation.
    pub header: Option<Entry>,
    /// Translatable entries in catalog order.
    pub entries: Vec<Entry>,
    /// Obsolete (`#~`) lines, preserved verbatim at the catalog tail.
    pub obsolete: Vec<String>,
}

impl Catalog {
    /// Creates a catalog from entries, without header or obsolete tail.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Number of entries still lacking a translation.
    pub fn untranslated_len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_translated()).count()
    }
}
