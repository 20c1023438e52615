//! Translates between opaque `<w:rPr>` XML and [`FormatFlags`], so the
//! patcher can detect format-only edits and surgical format removal
//! (spec.md §4.4) without treating run properties as fully structured.

use wml_model::{FormatFlags, FormatHint};
use wml_xml::{QName, XmlElement, XmlNode};

/// Read the subset of toggle properties this engine understands out of a
/// `<w:rPr>...</w:rPr>` fragment. Anything else in the fragment (fonts,
/// sizes, colors, language tags) is irrelevant to Markdown-driven formatting
/// and is left alone by [`rpr_xml_with_flags`].
pub fn flags_from_rpr(rpr_xml: Option<&str>) -> FormatFlags {
    let mut flags = FormatFlags::default();
    let Some(xml) = rpr_xml else { return flags };
    let Ok(rpr) = wml_xml::parse(xml) else { return flags };

    flags.bold = rpr.first_child_named("b").is_some();
    flags.italic = rpr.first_child_named("i").is_some();
    flags.underline = rpr.first_child_named("u").is_some();
    flags.strikethrough = rpr.first_child_named("strike").is_some();
    flags.code = rpr
        .first_child_named("rFonts")
        .and_then(|e| e.get_attribute("ascii"))
        .map(|ascii| ascii == "Consolas")
        .unwrap_or(false);
    if let Some(vert_align) = rpr.first_child_named("vertAlign").and_then(|e| e.get_attribute("val")) {
        flags.superscript = vert_align == "superscript";
        flags.subscript = vert_align == "subscript";
    }
    flags
}

/// Produce a `<w:rPr>` fragment reflecting `flags`, preserving every child
/// of `base_rpr_xml` this module doesn't interpret as a toggle.
pub fn rpr_xml_with_flags(base_rpr_xml: Option<&str>, flags: FormatFlags) -> String {
    let mut rpr = match base_rpr_xml.and_then(|xml| wml_xml::parse(xml).ok()) {
        Some(existing) => existing,
        None => XmlElement::new(QName::prefixed("w", "rPr")),
    };

    rpr.children.retain(|child| {
        !matches!(
            child,
            XmlNode::Element(e) if matches!(e.name.local.as_str(), "b" | "i" | "u" | "strike" | "vertAlign")
                || (e.name.local == "rFonts" && e.get_attribute("ascii") == Some("Consolas"))
        )
    });

    if flags.bold {
        rpr.children.push(XmlNode::Element(XmlElement::new(QName::prefixed("w", "b"))));
    }
    if flags.italic {
        rpr.children.push(XmlNode::Element(XmlElement::new(QName::prefixed("w", "i"))));
    }
    if flags.underline {
        let underline =
            XmlElement::new(QName::prefixed("w", "u")).with_attr(QName::prefixed("w", "val"), "single");
        rpr.children.push(XmlNode::Element(underline));
    }
    if flags.strikethrough {
        rpr.children.push(XmlNode::Element(XmlElement::new(QName::prefixed("w", "strike"))));
    }
    if flags.code {
        let fonts = XmlElement::new(QName::prefixed("w", "rFonts"))
            .with_attr(QName::prefixed("w", "ascii"), "Consolas")
            .with_attr(QName::prefixed("w", "hAnsi"), "Consolas");
        rpr.children.push(XmlNode::Element(fonts));
    }
    if flags.superscript {
        rpr.children.push(XmlNode::Element(
            XmlElement::new(QName::prefixed("w", "vertAlign")).with_attr(QName::prefixed("w", "val"), "superscript"),
        ));
    } else if flags.subscript {
        rpr.children.push(XmlNode::Element(
            XmlElement::new(QName::prefixed("w", "vertAlign")).with_attr(QName::prefixed("w", "val"), "subscript"),
        ));
    }

    wml_xml::serialize(&rpr).unwrap_or_default()
}

/// Build a sequence of `<w:r>` run elements from clean text plus non-
/// overlapping format hints, used by List/Table Generation to render
/// Markdown-formatted content without going through the diff/patch path
/// (spec.md §4.7, §4.8: "Cells carry their runs from a Markdown preprocess
/// pass").
pub fn build_runs_from_preprocessed(text: &str, hints: &[FormatHint]) -> Vec<XmlElement> {
    let mut runs = Vec::new();
    let mut cursor = 0usize;

    for hint in hints {
        if hint.start > cursor {
            runs.push(build_run(&text[cursor..hint.start], None));
        }
        let rpr = rpr_xml_with_flags(None, hint.flags);
        runs.push(build_run(&text[hint.start..hint.end], Some(rpr)));
        cursor = hint.end;
    }
    if cursor < text.len() {
        runs.push(build_run(&text[cursor..], None));
    }
    if runs.is_empty() {
        runs.push(build_run(text, None));
    }
    runs
}

fn build_run(text: &str, rpr_xml: Option<String>) -> XmlElement {
    let mut t = XmlElement::new(QName::prefixed("w", "t"));
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        t = t.with_attr(QName::prefixed("xml", "space"), "preserve");
    }
    t.children = vec![XmlNode::Text(text.to_string())];

    let mut run = XmlElement::new(QName::prefixed("w", "r"));
    if let Some(rpr_xml) = rpr_xml {
        if let Ok(rpr) = wml_xml::parse(&rpr_xml) {
            run.children.push(XmlNode::Element(rpr));
        }
    }
    run.children.push(XmlNode::Element(t));
    run
}
