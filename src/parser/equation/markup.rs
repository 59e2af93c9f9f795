//! Structural conversion of OMML and MathML fragments to LaTeX notation.
//!
//! Elements are matched by local name, so fragments work with or without
//! namespace declarations.

use regex::Regex;
use roxmltree::{Document, Node};

use crate::error::{Error, Result};

use super::canonical::{canonicalize, symbol_macro};

const FUNCTION_NAMES: [&str; 14] = [
    "sin", "cos", "tan", "cot", "sec", "csc", "log", "ln", "exp", "lim", "max", "min", "sup",
    "inf",
];

/// Converts math markup fragments into LaTeX notation.
pub struct MarkupConverter {
    element_prefix: Regex,
    attribute_prefix: Regex,
    namespace_decl: Regex,
    tag: Regex,
}

impl MarkupConverter {
    /// Create a new converter.
    pub fn new() -> Self {
        Self {
            element_prefix: Regex::new(r"<(/?)[A-Za-z][\w.\-]*:").unwrap(),
            attribute_prefix: Regex::new(r"(\s)[A-Za-z][\w.\-]*:([A-Za-z][\w.\-]*\s*=)").unwrap(),
            namespace_decl: Regex::new(r#"\s+xmlns(?::[\w.\-]+)?\s*=\s*("[^"]*"|'[^']*')"#)
                .unwrap(),
            tag: Regex::new(r"<[^>]*>").unwrap(),
        }
    }

    /// Convert a fragment to LaTeX notation.
    ///
    /// Fails with [`Error::MathMarkup`] when the fragment is not well-formed
    /// or holds no `oMath` / `math` element.
    pub fn convert(&self, xml: &str) -> Result<String> {
        match Document::parse(xml) {
            Ok(doc) => convert_document(&doc),
            Err(first) => {
                // Undeclared prefixes ("m:oMath" cut out of a larger part) are common.
                let stripped = self.strip_namespaces(xml);
                let doc = Document::parse(&stripped)
                    .map_err(|_| Error::MathMarkup(format!("XML parse error: {first}")))?;
                convert_document(&doc)
            }
        }
    }

    /// Flatten a fragment to its text content.
    pub fn flatten(&self, xml: &str) -> String {
        let text = self.tag.replace_all(xml, " ");
        let decoded = text
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&");
        canonicalize(&decoded)
    }

    fn strip_namespaces(&self, xml: &str) -> String {
        let without_decls = self.namespace_decl.replace_all(xml, "");
        let without_elements = self.element_prefix.replace_all(&without_decls, "<$1");
        self.attribute_prefix
            .replace_all(&without_elements, "$1$2")
            .into_owned()
    }
}

impl Default for MarkupConverter {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_document(doc: &Document) -> Result<String> {
    let root = doc
        .descendants()
        .find(|n| n.is_element() && matches!(n.tag_name().name(), "oMathPara" | "oMath" | "math"))
        .ok_or_else(|| Error::MathMarkup("no oMath or math element".to_string()))?;

    let latex = if root.tag_name().name() == "math" {
        mathml(root)
    } else {
        omml(root)
    };
    let latex = canonicalize(&latex);
    if latex.is_empty() {
        return Err(Error::MathMarkup("empty math element".to_string()));
    }
    Ok(latex)
}

fn local<'a>(node: &Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.is_element() && local(n) == name)
}

fn element_children<'a, 'input>(node: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    node.children().filter(|n| n.is_element()).collect()
}

/// Value of a `val` attribute on the named property child.
fn property(node: Node, props: &str, name: &str) -> Option<String> {
    let props = child(node, props)?;
    let prop = child(props, name)?;
    prop.attributes()
        .find(|a| a.name() == "val")
        .map(|a| a.value().to_string())
}

/// Wrap multi-character operands in braces.
fn group(content: &str) -> String {
    let content = content.trim();
    if content.chars().count() == 1 {
        content.to_string()
    } else {
        format!("{{{}}}", content)
    }
}

fn fence(delimiter: &str) -> String {
    match delimiter {
        "{" => "\\{".to_string(),
        "}" => "\\}".to_string(),
        "⟨" => "\\langle ".to_string(),
        "⟩" => "\\rangle ".to_string(),
        "‖" => "\\|".to_string(),
        other => other.to_string(),
    }
}

fn function_name(name: &str) -> String {
    let trimmed = name.trim();
    if FUNCTION_NAMES.contains(&trimmed) {
        format!("\\{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

fn symbol_text(text: &str) -> String {
    let mut out = String::new();
    for c in text.chars() {
        match symbol_macro(c) {
            Some(mac) => {
                out.push_str(mac);
                out.push(' ');
            }
            None => out.push(c),
        }
    }
    out
}

fn omml_children(node: Node) -> String {
    element_children(node).into_iter().map(omml).collect()
}

fn omml_part(node: Node, name: &str) -> String {
    child(node, name).map(omml_children).unwrap_or_default()
}

/// Office Math Markup node to LaTeX.
fn omml(node: Node) -> String {
    let name = local(&node);
    if name.ends_with("Pr") {
        return String::new();
    }

    match name {
        "t" => symbol_text(node.text().unwrap_or_default()),
        "oMathPara" => element_children(node)
            .into_iter()
            .filter(|n| local(n) == "oMath")
            .map(omml)
            .collect::<Vec<_>>()
            .join(" \\\\ "),
        "f" => format!(
            "\\frac{{{}}}{{{}}}",
            omml_part(node, "num"),
            omml_part(node, "den")
        ),
        "sSup" => format!(
            "{}^{}",
            group(&omml_part(node, "e")),
            group(&omml_part(node, "sup"))
        ),
        "sSub" => format!(
            "{}_{}",
            group(&omml_part(node, "e")),
            group(&omml_part(node, "sub"))
        ),
        "sSubSup" => format!(
            "{}_{}^{}",
            group(&omml_part(node, "e")),
            group(&omml_part(node, "sub")),
            group(&omml_part(node, "sup"))
        ),
        "sPre" => format!(
            "{{}}_{}^{}{}",
            group(&omml_part(node, "sub")),
            group(&omml_part(node, "sup")),
            omml_part(node, "e")
        ),
        "rad" => {
            let degree = omml_part(node, "deg");
            let body = omml_part(node, "e");
            if degree.trim().is_empty() {
                format!("\\sqrt{{{}}}", body)
            } else {
                format!("\\sqrt[{}]{{{}}}", degree.trim(), body)
            }
        }
        "d" => {
            let open = property(node, "dPr", "begChr").unwrap_or_else(|| "(".to_string());
            let close = property(node, "dPr", "endChr").unwrap_or_else(|| ")".to_string());
            let sep = property(node, "dPr", "sepChr").unwrap_or_else(|| "|".to_string());
            let items: Vec<String> = element_children(node)
                .into_iter()
                .filter(|n| local(n) == "e")
                .map(omml_children)
                .collect();
            format!("{}{}{}", fence(&open), items.join(fence(&sep).as_str()), fence(&close))
        }
        "nary" => {
            let chr = property(node, "naryPr", "chr").unwrap_or_else(|| "∫".to_string());
            let mut out = match chr.chars().next().and_then(symbol_macro) {
                Some(mac) => mac.to_string(),
                None => chr.clone(),
            };
            let sub = omml_part(node, "sub");
            let sup = omml_part(node, "sup");
            if !sub.trim().is_empty() {
                out.push_str(&format!("_{}", group(&sub)));
            }
            if !sup.trim().is_empty() {
                out.push_str(&format!("^{}", group(&sup)));
            }
            format!("{} {}", out, omml_part(node, "e"))
        }
        "func" => format!(
            "{} {}",
            function_name(&omml_part(node, "fName")),
            omml_part(node, "e")
        ),
        "limLow" => format!(
            "{}_{}",
            function_name(&omml_part(node, "e")),
            group(&omml_part(node, "lim"))
        ),
        "limUpp" => format!(
            "{}^{}",
            group(&omml_part(node, "e")),
            group(&omml_part(node, "lim"))
        ),
        "acc" => {
            let accent = match property(node, "accPr", "chr").as_deref() {
                Some("\u{0303}") | Some("~") => "\\tilde",
                Some("\u{0307}") => "\\dot",
                Some("\u{0304}") | Some("\u{0305}") | Some("¯") => "\\bar",
                Some("\u{20D7}") | Some("→") => "\\vec",
                _ => "\\hat",
            };
            format!("{}{{{}}}", accent, omml_part(node, "e"))
        }
        "bar" => {
            let top = property(node, "barPr", "pos").as_deref() == Some("top");
            let command = if top { "\\overline" } else { "\\underline" };
            format!("{}{{{}}}", command, omml_part(node, "e"))
        }
        "groupChr" => format!("\\underbrace{{{}}}", omml_part(node, "e")),
        "eqArr" => {
            let rows: Vec<String> = element_children(node)
                .into_iter()
                .filter(|n| local(n) == "e")
                .map(omml_children)
                .collect();
            format!("\\begin{{aligned}} {} \\end{{aligned}}", rows.join(" \\\\ "))
        }
        "m" => {
            let rows: Vec<String> = element_children(node)
                .into_iter()
                .filter(|n| local(n) == "mr")
                .map(|row| {
                    element_children(row)
                        .into_iter()
                        .filter(|n| local(n) == "e")
                        .map(omml_children)
                        .collect::<Vec<_>>()
                        .join(" & ")
                })
                .collect();
            format!("\\begin{{matrix}} {} \\end{{matrix}}", rows.join(" \\\\ "))
        }
        _ => omml_children(node),
    }
}

fn mathml_children(node: Node) -> Vec<String> {
    element_children(node).into_iter().map(mathml).collect()
}

fn mathml_nth(parts: &[String], index: usize) -> String {
    parts.get(index).cloned().unwrap_or_default()
}

/// MathML node to LaTeX.
fn mathml(node: Node) -> String {
    let text = || node.text().unwrap_or_default().trim().to_string();

    match local(&node) {
        "annotation" | "annotation-xml" => String::new(),
        "semantics" => element_children(node)
            .into_iter()
            .next()
            .map(mathml)
            .unwrap_or_default(),
        "mi" => {
            let name = text();
            if name.chars().count() > 1 {
                format!("{} ", function_name(&name))
            } else {
                symbol_text(&name)
            }
        }
        "mn" => text(),
        "mo" => symbol_text(&text()),
        "mtext" => format!("\\text{{{}}}", text()),
        "mspace" => " ".to_string(),
        "mfrac" => {
            let parts = mathml_children(node);
            format!(
                "\\frac{{{}}}{{{}}}",
                mathml_nth(&parts, 0),
                mathml_nth(&parts, 1)
            )
        }
        "msup" | "mover" => {
            let parts = mathml_children(node);
            format!(
                "{}^{}",
                group(&mathml_nth(&parts, 0)),
                group(&mathml_nth(&parts, 1))
            )
        }
        "msub" | "munder" => {
            let parts = mathml_children(node);
            format!(
                "{}_{}",
                group(&mathml_nth(&parts, 0)),
                group(&mathml_nth(&parts, 1))
            )
        }
        "msubsup" | "munderover" => {
            let parts = mathml_children(node);
            format!(
                "{}_{}^{}",
                group(&mathml_nth(&parts, 0)),
                group(&mathml_nth(&parts, 1)),
                group(&mathml_nth(&parts, 2))
            )
        }
        "msqrt" => format!("\\sqrt{{{}}}", mathml_children(node).concat()),
        "mroot" => {
            let parts = mathml_children(node);
            format!(
                "\\sqrt[{}]{{{}}}",
                mathml_nth(&parts, 1),
                mathml_nth(&parts, 0)
            )
        }
        "mfenced" => {
            let open = node.attribute("open").unwrap_or("(");
            let close = node.attribute("close").unwrap_or(")");
            let sep = node
                .attribute("separators")
                .and_then(|s| s.trim().chars().next())
                .unwrap_or(',');
            format!(
                "{}{}{}",
                fence(open),
                mathml_children(node).join(sep.to_string().as_str()),
                fence(close)
            )
        }
        "mtable" => {
            let rows: Vec<String> = element_children(node)
                .into_iter()
                .map(|row| mathml_children(row).join(" & "))
                .collect();
            format!("\\begin{{matrix}} {} \\end{{matrix}}", rows.join(" \\\\ "))
        }
        _ => mathml_children(node).concat(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OMML_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";

    #[test]
    fn test_omml_fraction_and_superscript() {
        let xml = format!(
            r#"<m:oMath xmlns:m="{OMML_NS}">
                 <m:f><m:num><m:r><m:t>a</m:t></m:r></m:num><m:den><m:r><m:t>b</m:t></m:r></m:den></m:f>
                 <m:r><m:t>+</m:t></m:r>
                 <m:sSup><m:e><m:r><m:t>x</m:t></m:r></m:e><m:sup><m:r><m:t>2</m:t></m:r></m:sup></m:sSup>
               </m:oMath>"#
        );
        let latex = MarkupConverter::new().convert(&xml).unwrap();
        assert_eq!(latex, "\\frac{a}{b}+x^2");
    }

    #[test]
    fn test_omml_without_namespace_declaration() {
        let xml = "<m:oMath><m:rad><m:radPr><m:degHide m:val=\"1\"/></m:radPr><m:deg/>\
                   <m:e><m:r><m:t>y</m:t></m:r></m:e></m:rad></m:oMath>";
        let latex = MarkupConverter::new().convert(xml).unwrap();
        assert_eq!(latex, "\\sqrt{y}");
    }

    #[test]
    fn test_omml_nary_and_delimiters() {
        let xml = "<m:oMath><m:nary><m:naryPr><m:chr m:val=\"∑\"/></m:naryPr>\
                   <m:sub><m:r><m:t>i=1</m:t></m:r></m:sub><m:sup><m:r><m:t>n</m:t></m:r></m:sup>\
                   <m:e><m:d><m:e><m:r><m:t>i</m:t></m:r></m:e></m:d></m:e></m:nary></m:oMath>";
        let latex = MarkupConverter::new().convert(xml).unwrap();
        assert_eq!(latex, "\\sum_{i=1}^n (i)");
    }

    #[test]
    fn test_mathml() {
        let xml = r#"<math xmlns="http://www.w3.org/1998/Math/MathML">
            <mrow><msup><mi>e</mi><mrow><mi>i</mi><mi>π</mi></mrow></msup><mo>=</mo><mn>-1</mn></mrow>
        </math>"#;
        let latex = MarkupConverter::new().convert(xml).unwrap();
        assert_eq!(latex, "e^{i\\pi}=-1");
    }

    #[test]
    fn test_malformed_and_rootless() {
        let converter = MarkupConverter::new();
        assert!(matches!(
            converter.convert("<m:oMath><m:r>"),
            Err(Error::MathMarkup(_))
        ));
        assert!(matches!(
            converter.convert("<p>not math</p>"),
            Err(Error::MathMarkup(_))
        ));
    }

    #[test]
    fn test_flatten() {
        let converter = MarkupConverter::new();
        assert_eq!(converter.flatten("<m:r><m:t>a &lt; b</m:t></m:r>"), "a < b");
    }
}
