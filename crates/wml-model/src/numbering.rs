//! Numbering identity (spec.md §3/§4.6).

/// The marker format a list level renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerFormat {
    Bullet,
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

/// Identity of one abstract numbering level: its marker format and nesting
/// depth. Two lists share an abstract definition iff every level they use
/// has the same `(level, format)` pairs — this is the "style signature"
/// referenced throughout spec.md §4.6/§4.7.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleSignature {
    pub levels: Vec<MarkerFormat>,
}

impl StyleSignature {
    pub fn single_level(format: MarkerFormat) -> Self {
        Self { levels: vec![format] }
    }
}

/// A concrete, allocated numbering identity: the abstract definition id plus
/// the numId that paragraphs reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingDefinition {
    pub abstract_num_id: u32,
    pub num_id: u32,
}

/// The `numId`/`ilvl` pair read off a paragraph's `<w:pPr>` (spec.md §4.1
/// "Numbering Context").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingContext {
    pub num_id: u32,
    pub ilvl: u32,
}
