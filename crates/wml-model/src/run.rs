//! The Run Model: an ordered sequence of [`RunEntry`] values representing
//! exactly one paragraph (spec.md §3).

/// The polymorphic tag of a [`RunEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunKind {
    Text,
    Deletion,
    Insertion,
    Hyperlink,
    Bookmark,
    Field,
    ContainerStart,
    ContainerEnd,
    ParagraphStart,
    ParagraphEnd,
}

impl RunKind {
    /// Whether entries of this kind contribute their text length to Accepted
    /// Text (spec.md §3: "the concatenation of all text of kind ∈
    /// {text, insertion, hyperlink}" — hyperlinks are containers whose
    /// *inner* text entries carry the actual characters, so in this
    /// implementation only `Text` and `Insertion` entries carry non-empty
    /// `text`, and both advance accepted-text offsets).
    pub fn advances_accepted_text(self) -> bool {
        matches!(self, RunKind::Text | RunKind::Insertion)
    }

    pub fn is_text_bearing(self) -> bool {
        matches!(self, RunKind::Text | RunKind::Insertion | RunKind::Deletion)
    }
}

/// A run-property-change marker: the run kept its text but a formatting run
/// property changed. Carries the pre-change property snapshot so the
/// Serializer can emit `<w:rPrChange>` (spec.md §4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    pub original_properties_xml: String,
    pub author: String,
    pub date: String,
}

/// A single unit in the Run Model.
///
/// Text-bearing entries (`Text`, `Insertion`, `Deletion`) carry `text` and
/// `run_properties_xml`. Non-text entries (containers, bookmarks, fields,
/// paragraph boundaries) carry `node_xml`, the verbatim opaque payload to
/// reproduce the node on serialization, and have zero-width offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct RunEntry {
    pub kind: RunKind,

    /// Literal text for `Text`/`Insertion`/`Deletion` entries (tabs are
    /// represented as `'\t'`, breaks as `'\n'`, per spec.md §4.1).
    pub text: Option<String>,

    /// Opaque, verbatim run-properties XML (`<w:rPr>...</w:rPr>`) for
    /// text-bearing entries.
    pub run_properties_xml: Option<String>,

    /// Opaque, verbatim XML for non-text-bearing entries (bookmarks,
    /// container open/close tags, field codes, ...).
    pub node_xml: Option<String>,

    /// Author of a deletion/insertion, present only on those kinds.
    pub author: Option<String>,

    /// Set by the Run Splitter & Patcher when this run's properties changed
    /// but its text did not (spec.md §4.4 "format-only detection").
    pub format_change: Option<PropertyChange>,

    pub start_offset: usize,
    pub end_offset: usize,
}

impl RunEntry {
    pub fn text(text: impl Into<String>, run_properties_xml: Option<String>) -> Self {
        Self {
            kind: RunKind::Text,
            text: Some(text.into()),
            run_properties_xml,
            node_xml: None,
            author: None,
            format_change: None,
            start_offset: 0,
            end_offset: 0,
        }
    }

    pub fn insertion(
        text: impl Into<String>,
        run_properties_xml: Option<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            kind: RunKind::Insertion,
            text: Some(text.into()),
            run_properties_xml,
            node_xml: None,
            author: Some(author.into()),
            format_change: None,
            start_offset: 0,
            end_offset: 0,
        }
    }

    pub fn deletion(
        text: impl Into<String>,
        run_properties_xml: Option<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            kind: RunKind::Deletion,
            text: Some(text.into()),
            run_properties_xml,
            node_xml: None,
            author: Some(author.into()),
            format_change: None,
            start_offset: 0,
            end_offset: 0,
        }
    }

    pub fn opaque(kind: RunKind, node_xml: impl Into<String>) -> Self {
        debug_assert!(!kind.is_text_bearing());
        Self {
            kind,
            text: None,
            run_properties_xml: None,
            node_xml: Some(node_xml.into()),
            author: None,
            format_change: None,
            start_offset: 0,
            end_offset: 0,
        }
    }

    pub fn len(&self) -> usize {
        if self.kind.advances_accepted_text() {
            self.text.as_deref().map(str::len).unwrap_or(0)
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An ordered sequence of [`RunEntry`] representing one paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunModel {
    pub entries: Vec<RunEntry>,
    /// Opaque `<w:pPr>` payload, captured but never interpreted.
    pub paragraph_properties_xml: Option<String>,
}

impl RunModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepted Text: the paragraph's text as if all existing tracked
    /// changes were accepted (spec.md §3). Deletions never appear here.
    pub fn accepted_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            if entry.kind.advances_accepted_text() {
                if let Some(t) = &entry.text {
                    out.push_str(t);
                }
            }
        }
        out
    }

    /// Recompute `start_offset`/`end_offset` on every entry in the
    /// accepted-text coordinate space: deletions get a zero-width position
    /// at the current cursor, everything else advances the cursor by its
    /// length (spec.md §3 invariant).
    pub fn recompute_offsets(&mut self) {
        let mut cursor = 0usize;
        for entry in &mut self.entries {
            entry.start_offset = cursor;
            if entry.kind.advances_accepted_text() {
                cursor += entry.len();
            }
            entry.end_offset = cursor;
        }
    }

    pub fn push(&mut self, entry: RunEntry) {
        self.entries.push(entry);
    }
}
