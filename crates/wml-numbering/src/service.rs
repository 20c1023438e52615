//! Numbering Service (spec.md §4.6): interns numbering definitions by style
//! signature, allocates identifiers from a dynamic floor, and emits or merges
//! the numbering part.

use std::collections::HashMap;

use rustc_hash::FxBuildHasher;
use wml_model::{MarkerFormat, NumberingDefinition, StyleSignature};
use wml_xml::{QName, XmlElement, XmlNode};

use crate::error::{Error, Result};

/// Default upper bound the allocator prefers to stay under before falling
/// back to reusing holes in the allocated range (spec.md §4.6: "a
/// configurable upper preferred bound and a reuse-holes policy").
pub const DEFAULT_PREFERRED_BOUND: u32 = 2000;

/// Per-run allocation and interning state. Not shared across reconciliation
/// runs (spec.md §5: "process-local mutable state for the current
/// reconciliation run only").
pub struct NumberingService {
    next_abstract_id: u32,
    next_num_id: u32,
    preferred_bound: u32,
    by_style: HashMap<StyleSignature, NumberingDefinition, FxBuildHasher>,
    order: Vec<StyleSignature>,
}

impl NumberingService {
    /// `existing_max_abstract_id`/`existing_max_num_id` are the highest ids
    /// already present in the destination numbering part, or 0 when there is
    /// none; allocation starts at `max(existing) + 1` (spec.md §4.6).
    pub fn new(existing_max_abstract_id: u32, existing_max_num_id: u32) -> Self {
        Self {
            next_abstract_id: existing_max_abstract_id + 1,
            next_num_id: existing_max_num_id + 1,
            preferred_bound: DEFAULT_PREFERRED_BOUND,
            by_style: HashMap::default(),
            order: Vec::new(),
        }
    }

    pub fn with_preferred_bound(mut self, bound: u32) -> Self {
        self.preferred_bound = bound;
        self
    }

    /// Idempotent within one run: the same style signature always yields the
    /// same `NumberingDefinition`.
    #[tracing::instrument(skip(self, style))]
    pub fn obtain_for_style(&mut self, style: &StyleSignature) -> NumberingDefinition {
        if let Some(existing) = self.by_style.get(style) {
            return *existing;
        }
        let definition = NumberingDefinition {
            abstract_num_id: self.allocate_abstract_id(),
            num_id: self.allocate_num_id(),
        };
        self.by_style.insert(style.clone(), definition);
        self.order.push(style.clone());
        definition
    }

    fn allocate_abstract_id(&mut self) -> u32 {
        let id = self.next_abstract_id;
        self.next_abstract_id += 1;
        id
    }

    fn allocate_num_id(&mut self) -> u32 {
        if self.next_num_id > self.preferred_bound {
            if let Some(hole) = self.find_reusable_hole() {
                return hole;
            }
        }
        let id = self.next_num_id;
        self.next_num_id += 1;
        id
    }

    fn find_reusable_hole(&self) -> Option<u32> {
        let used: std::collections::BTreeSet<u32> =
            self.by_style.values().map(|d| d.num_id).collect();
        (1..self.preferred_bound).find(|candidate| !used.contains(candidate))
    }

    /// All interned definitions in allocation order.
    pub fn definitions(&self) -> Vec<(StyleSignature, NumberingDefinition)> {
        self.order
            .iter()
            .map(|style| (style.clone(), self.by_style[style]))
            .collect()
    }

    /// Emit a `<w:numbering>` document covering every interned definition.
    /// Abstract definitions precede concrete `<w:num>` entries (spec.md §4.6:
    /// "preserves schema child order").
    pub fn build_numbering_part(&self) -> XmlElement {
        let mut root = XmlElement::new(QName::prefixed("w", "numbering"));
        let mut children = Vec::new();
        for (style, def) in self.definitions() {
            children.push(XmlNode::Element(build_abstract_num(def.abstract_num_id, &style)));
        }
        for (_, def) in self.definitions() {
            children.push(XmlNode::Element(build_num(def.num_id, def.abstract_num_id)));
        }
        root.children = children;
        root
    }
}

fn marker_format_value(format: MarkerFormat) -> &'static str {
    match format {
        MarkerFormat::Bullet => "bullet",
        MarkerFormat::Decimal => "decimal",
        MarkerFormat::LowerAlpha => "lowerLetter",
        MarkerFormat::UpperAlpha => "upperLetter",
        MarkerFormat::LowerRoman => "lowerRoman",
        MarkerFormat::UpperRoman => "upperRoman",
    }
}

fn build_abstract_num(abstract_num_id: u32, style: &StyleSignature) -> XmlElement {
    let mut abstract_num = XmlElement::new(QName::prefixed("w", "abstractNum"))
        .with_attr(QName::prefixed("w", "abstractNumId"), abstract_num_id.to_string());
    let levels = style
        .levels
        .iter()
        .enumerate()
        .map(|(ilvl, format)| XmlNode::Element(build_lvl(ilvl as u32, *format)))
        .collect();
    abstract_num.children = levels;
    abstract_num
}

fn build_lvl(ilvl: u32, format: MarkerFormat) -> XmlElement {
    let numbering_format = XmlElement::new(QName::prefixed("w", "numFmt"))
        .with_attr(QName::prefixed("w", "val"), marker_format_value(format));
    let mut lvl = XmlElement::new(QName::prefixed("w", "lvl"))
        .with_attr(QName::prefixed("w", "ilvl"), ilvl.to_string());
    lvl.children = vec![XmlNode::Element(numbering_format)];
    lvl
}

fn build_num(num_id: u32, abstract_num_id: u32) -> XmlElement {
    let abstract_num_ref = XmlElement::new(QName::prefixed("w", "abstractNumId"))
        .with_attr(QName::prefixed("w", "val"), abstract_num_id.to_string());
    let mut num = XmlElement::new(QName::prefixed("w", "num"))
        .with_attr(QName::prefixed("w", "numId"), num_id.to_string());
    num.children = vec![XmlNode::Element(abstract_num_ref)];
    num
}

/// Re-map every identifier in `incoming` to ids free in `existing`'s
/// namespace and append the remapped definitions (spec.md §4.6
/// `mergeInto`). Returns the merged document and the id remap table so
/// callers can rewrite paragraph `numId` references with [`remap_payload`].
pub fn merge_into(existing: &XmlElement, incoming: &XmlElement) -> Result<(XmlElement, HashMap<u32, u32>)> {
    let existing_abstract_ids = collect_ids(existing, "abstractNum", "abstractNumId")?;
    let existing_num_ids = collect_ids(existing, "num", "numId")?;

    let mut next_abstract_id = existing_abstract_ids.iter().max().copied().unwrap_or(0) + 1;
    let mut next_num_id = existing_num_ids.iter().max().copied().unwrap_or(0) + 1;

    let mut abstract_remap = HashMap::new();
    let mut num_remap = HashMap::new();
    let mut merged_children = existing.children.clone();

    for abstract_num in incoming.children_named("abstractNum") {
        let old_id = parse_attr(abstract_num, "abstractNumId").ok_or(Error::MissingAbstractNumId)?;
        let new_id = next_abstract_id;
        next_abstract_id += 1;
        abstract_remap.insert(old_id, new_id);

        let mut cloned = abstract_num.clone();
        cloned.set_attribute(QName::prefixed("w", "abstractNumId"), new_id.to_string());
        merged_children.push(XmlNode::Element(cloned));
    }

    for num in incoming.children_named("num") {
        let old_id = parse_attr(num, "numId").ok_or(Error::MissingNumId)?;
        let new_id = next_num_id;
        next_num_id += 1;
        num_remap.insert(old_id, new_id);

        let mut cloned = num.clone();
        cloned.set_attribute(QName::prefixed("w", "numId"), new_id.to_string());
        if let Some(old_abstract_id) = cloned
            .first_child_named("abstractNumId")
            .and_then(|e| parse_attr_from(e, "val"))
        {
            let remapped = *abstract_remap
                .get(&old_abstract_id)
                .ok_or_else(|| Error::InconsistentMerge(format!("num {old_id} references unmapped abstractNumId {old_abstract_id}")))?;
            if let Some(XmlNode::Element(abstract_ref)) = cloned
                .children
                .iter_mut()
                .find(|c| matches!(c, XmlNode::Element(e) if e.name.local == "abstractNumId"))
            {
                abstract_ref.set_attribute(QName::prefixed("w", "val"), remapped.to_string());
            }
        }
        merged_children.push(XmlNode::Element(cloned));
    }

    let mut merged = existing.clone();
    merged.children = merged_children;
    Ok((merged, num_remap))
}

/// Rewrite `w:numId` references on cloned paragraph nodes according to the
/// remap table produced by [`merge_into`] (spec.md §4.6 `remapPayload`).
pub fn remap_payload(paragraph_nodes: &mut [XmlElement], num_remap: &HashMap<u32, u32>) {
    for node in paragraph_nodes.iter_mut() {
        remap_num_id_recursive(node, num_remap);
    }
}

fn remap_num_id_recursive(element: &mut XmlElement, num_remap: &HashMap<u32, u32>) {
    if element.name.local == "numId" {
        if let Some(old_id) = parse_attr_from(element, "val") {
            if let Some(new_id) = num_remap.get(&old_id) {
                element.set_attribute(QName::prefixed("w", "val"), new_id.to_string());
            }
        }
    }
    for child in element.children.iter_mut() {
        if let XmlNode::Element(child_element) = child {
            remap_num_id_recursive(child_element, num_remap);
        }
    }
}

/// Inject a level-0 `startOverride` on the `<w:num>` identified by
/// `target_num_id` (spec.md §4.6 `applyStartOverride`).
pub fn apply_start_override(numbering_xml: &mut XmlElement, target_num_id: u32, start_at: u32) -> Result<()> {
    let num = numbering_xml
        .children
        .iter_mut()
        .find_map(|c| match c {
            XmlNode::Element(e) if e.name.local == "num" && parse_attr_from(e, "numId") == Some(target_num_id) => {
                Some(e)
            }
            _ => None,
        })
        .ok_or(Error::UnknownNumId(target_num_id))?;

    num.children.retain(|c| !matches!(c, XmlNode::Element(e) if e.name.local == "lvlOverride"));

    let start_override = XmlElement::new(QName::prefixed("w", "startOverride"))
        .with_attr(QName::prefixed("w", "val"), start_at.to_string());
    let mut lvl_override = XmlElement::new(QName::prefixed("w", "lvlOverride"))
        .with_attr(QName::prefixed("w", "ilvl"), "0");
    lvl_override.children = vec![XmlNode::Element(start_override)];
    num.children.push(XmlNode::Element(lvl_override));
    Ok(())
}

fn collect_ids(root: &XmlElement, tag: &str, attr: &str) -> Result<Vec<u32>> {
    root.children_named(tag)
        .map(|e| parse_attr(e, attr).ok_or_else(|| Error::Malformed(format!("{tag} missing {attr}"))))
        .collect()
}

fn parse_attr(element: &XmlElement, local_attr_name: &str) -> Option<u32> {
    parse_attr_from(element, local_attr_name)
}

fn parse_attr_from(element: &XmlElement, local_attr_name: &str) -> Option<u32> {
    element.get_attribute(local_attr_name)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wml_model::MarkerFormat;

    #[test]
    fn obtain_for_style_is_idempotent() {
        let mut service = NumberingService::new(0, 0);
        let style = StyleSignature::single_level(MarkerFormat::Decimal);
        let first = service.obtain_for_style(&style);
        let second = service.obtain_for_style(&style);
        assert_eq!(first, second);
    }

    #[test]
    fn distinct_styles_get_distinct_ids() {
        let mut service = NumberingService::new(0, 0);
        let decimal = service.obtain_for_style(&StyleSignature::single_level(MarkerFormat::Decimal));
        let bullet = service.obtain_for_style(&StyleSignature::single_level(MarkerFormat::Bullet));
        assert_ne!(decimal.num_id, bullet.num_id);
        assert_ne!(decimal.abstract_num_id, bullet.abstract_num_id);
    }

    #[test]
    fn allocation_starts_above_existing_max() {
        let mut service = NumberingService::new(5, 10);
        let def = service.obtain_for_style(&StyleSignature::single_level(MarkerFormat::Bullet));
        assert_eq!(def.abstract_num_id, 6);
        assert_eq!(def.num_id, 11);
    }

    #[test]
    fn build_numbering_part_orders_abstract_before_concrete() {
        let mut service = NumberingService::new(0, 0);
        service.obtain_for_style(&StyleSignature::single_level(MarkerFormat::Decimal));
        let part = service.build_numbering_part();
        let names: Vec<&str> = part
            .children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Element(e) => Some(e.name.local.as_str()),
                _ => None,
            })
            .collect();
        let first_num = names.iter().position(|n| *n == "num");
        let first_abstract = names.iter().position(|n| *n == "abstractNum");
        assert!(first_abstract < first_num);
    }

    #[test]
    fn merge_into_remaps_incoming_ids_above_existing_max() {
        let existing = XmlElement::new(QName::prefixed("w", "numbering")).with_children(vec![
            XmlNode::Element(
                XmlElement::new(QName::prefixed("w", "abstractNum"))
                    .with_attr(QName::prefixed("w", "abstractNumId"), "0"),
            ),
            XmlNode::Element({
                let mut num = XmlElement::new(QName::prefixed("w", "num"))
                    .with_attr(QName::prefixed("w", "numId"), "1");
                num.children = vec![XmlNode::Element(
                    XmlElement::new(QName::prefixed("w", "abstractNumId"))
                        .with_attr(QName::prefixed("w", "val"), "0"),
                )];
                num
            }),
        ]);

        let incoming = XmlElement::new(QName::prefixed("w", "numbering")).with_children(vec![
            XmlNode::Element(
                XmlElement::new(QName::prefixed("w", "abstractNum"))
                    .with_attr(QName::prefixed("w", "abstractNumId"), "0"),
            ),
            XmlNode::Element({
                let mut num = XmlElement::new(QName::prefixed("w", "num"))
                    .with_attr(QName::prefixed("w", "numId"), "1");
                num.children = vec![XmlNode::Element(
                    XmlElement::new(QName::prefixed("w", "abstractNumId"))
                        .with_attr(QName::prefixed("w", "val"), "0"),
                )];
                num
            }),
        ]);

        let (merged, num_remap) = merge_into(&existing, &incoming).unwrap();
        assert_eq!(num_remap.get(&1), Some(&2));
        let num_ids: Vec<u32> = merged
            .children_named("num")
            .filter_map(|n| parse_attr_from(n, "numId"))
            .collect();
        assert_eq!(num_ids, vec![1, 2]);
    }

    #[test]
    fn apply_start_override_injects_level_override() {
        let mut numbering = XmlElement::new(QName::prefixed("w", "numbering")).with_children(vec![XmlNode::Element(
            XmlElement::new(QName::prefixed("w", "num")).with_attr(QName::prefixed("w", "numId"), "3"),
        )]);
        apply_start_override(&mut numbering, 3, 5).unwrap();
        let num = numbering.first_child_named("num").unwrap();
        let lvl_override = num.first_child_named("lvlOverride").unwrap();
        let start_override = lvl_override.first_child_named("startOverride").unwrap();
        assert_eq!(start_override.get_attribute("val"), Some("5"));
    }

    #[test]
    fn apply_start_override_rejects_unknown_num_id() {
        let mut numbering = XmlElement::new(QName::prefixed("w", "numbering"));
        assert!(apply_start_override(&mut numbering, 99, 1).is_err());
    }
}
