//! Canonical LaTeX notation for detected expressions.

/// LaTeX macro for a Unicode math character.
pub fn symbol_macro(c: char) -> Option<&'static str> {
    let mapped = match c {
        'α' => "\\alpha",
        'β' => "\\beta",
        'γ' => "\\gamma",
        'δ' => "\\delta",
        'ε' | 'ϵ' => "\\epsilon",
        'ζ' => "\\zeta",
        'η' => "\\eta",
        'θ' => "\\theta",
        'ι' => "\\iota",
        'κ' => "\\kappa",
        'λ' => "\\lambda",
        'μ' => "\\mu",
        'ν' => "\\nu",
        'ξ' => "\\xi",
        'π' => "\\pi",
        'ρ' => "\\rho",
        'σ' => "\\sigma",
        'τ' => "\\tau",
        'υ' => "\\upsilon",
        'φ' | 'ϕ' => "\\phi",
        'χ' => "\\chi",
        'ψ' => "\\psi",
        'ω' => "\\omega",
        'Γ' => "\\Gamma",
        'Δ' => "\\Delta",
        'Θ' => "\\Theta",
        'Λ' => "\\Lambda",
        'Ξ' => "\\Xi",
        'Π' => "\\Pi",
        'Σ' => "\\Sigma",
        'Φ' => "\\Phi",
        'Ψ' => "\\Psi",
        'Ω' => "\\Omega",
        '∑' => "\\sum",
        '∏' => "\\prod",
        '∫' => "\\int",
        '∬' => "\\iint",
        '∮' => "\\oint",
        '∂' => "\\partial",
        '∇' => "\\nabla",
        '∞' => "\\infty",
        '√' => "\\sqrt",
        '±' => "\\pm",
        '∓' => "\\mp",
        '×' => "\\times",
        '÷' => "\\div",
        '·' | '⋅' => "\\cdot",
        '∘' => "\\circ",
        '≤' => "\\leq",
        '≥' => "\\geq",
        '≠' => "\\neq",
        '≈' => "\\approx",
        '≡' => "\\equiv",
        '∝' => "\\propto",
        '∼' => "\\sim",
        '≪' => "\\ll",
        '≫' => "\\gg",
        '∈' => "\\in",
        '∉' => "\\notin",
        '⊂' => "\\subset",
        '⊆' => "\\subseteq",
        '⊃' => "\\supset",
        '⊇' => "\\supseteq",
        '∪' => "\\cup",
        '∩' => "\\cap",
        '∅' => "\\emptyset",
        '∀' => "\\forall",
        '∃' => "\\exists",
        '¬' => "\\neg",
        '∧' => "\\wedge",
        '∨' => "\\vee",
        '→' => "\\rightarrow",
        '←' => "\\leftarrow",
        '↔' => "\\leftrightarrow",
        '⇒' => "\\Rightarrow",
        '⇐' => "\\Leftarrow",
        '⇔' => "\\Leftrightarrow",
        '↦' => "\\mapsto",
        '…' => "\\ldots",
        '⋯' => "\\cdots",
        _ => return None,
    };
    Some(mapped)
}

/// Plain ASCII replacement for Unicode characters that have one.
fn ascii_equivalent(c: char) -> Option<char> {
    match c {
        '−' | '–' => Some('-'),
        '′' => Some('\''),
        '∗' => Some('*'),
        '∕' => Some('/'),
        '∣' => Some('|'),
        _ => None,
    }
}

/// Whether a character is a Greek letter or a Unicode math symbol.
pub fn is_math_symbol(c: char) -> bool {
    matches!(c as u32,
        0x0391..=0x03A9 | 0x03B1..=0x03C9 | 0x03D1 | 0x03D5 | 0x03F5
        | 0x2190..=0x21FF | 0x2200..=0x22FF | 0x2A00..=0x2AFF)
        || matches!(c, '±' | '×' | '÷' | '·' | '√' | '∞')
}

/// Whether a character acts as an operator.
pub fn is_operator(c: char) -> bool {
    matches!(c, '=' | '+' | '-' | '*' | '/' | '<' | '>' | '^' | '±' | '×' | '÷' | '·')
        || matches!(c as u32, 0x2190..=0x21FF | 0x2200..=0x22FF | 0x2A00..=0x2AFF)
}

/// Normalize an expression to canonical LaTeX notation.
///
/// Trims, maps Unicode symbols to macros, and collapses whitespace.
pub fn canonicalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.trim().chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(ascii) = ascii_equivalent(c) {
            out.push(ascii);
        } else if let Some(mac) = symbol_macro(c) {
            out.push_str(mac);
            if chars.peek().is_some_and(|n| n.is_alphanumeric()) {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Key used to compare expressions for duplication.
pub fn dedup_key(canonical: &str) -> String {
    canonical.chars().filter(|c| !c.is_whitespace()).collect()
}
