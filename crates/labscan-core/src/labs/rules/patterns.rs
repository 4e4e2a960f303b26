//! Regex patterns for lab report field extraction.
//!
//! Strict patterns require a unit token right after the captured number.
//! Loose patterns take the first number after the label and are only used
//! when the strict pattern fails. All patterns are case-insensitive and
//! bounded, and the regex engine runs in linear time on untrusted input.

use lazy_static::lazy_static;
use regex::Regex;

/// Well-formed decimal capture used by strict patterns.
pub const NUMBER: &str = r"(\d{1,6}(?:[.,]\d{1,4})?)";

/// Permissive numeric capture; may yield strings that do not parse.
pub const LOOSE_NUMBER: &str = r"(\d[\d.,]{0,9})";

/// Label-to-number distance for strict patterns: optional parenthetical, optional separator.
const STRICT_GAP: &str = r"\s{0,3}(?:\([^)\n]{1,20}\)\s{0,3})?[:=\-]?\s{0,3}";

/// Number-to-unit window.
const UNIT_WINDOW: &str = r"[^\S\n]{0,3}";

/// Label-to-number distance for loose patterns; stays on the label's line.
const LOOSE_GAP: &str = r"[^\d\n]{0,30}?";

// Labels and synonyms
pub const AST_LABEL: &str = r"\b(?:AST|SGOT|aspartate\s+(?:aminotransferase|transaminase))\b";
pub const ALT_LABEL: &str = r"\b(?:ALT|SGPT|alanine\s+(?:aminotransferase|transaminase))\b";
pub const GGT_LABEL: &str =
    r"\b(?:GGTP?|gamma[\-\s]*GT|gamma[\-\s]*glutamyl[\-\s]*trans(?:ferase|peptidase))\b";
pub const TG_LABEL: &str = r"\b(?:triglycerides?|TG|TRIG)\b";
pub const PLATELET_LABEL: &str = r"\b(?:platelets?(?:\s+count)?|PLT)\b";
pub const ALBUMIN_LABEL: &str = r"\b(?:albumin|ALB)\b";
pub const AGE_LABEL: &str = r"\bage\b";
pub const SEX_LABEL: &str = r"\b(?:sex|gender)\b";
pub const REFERENCE_WORDS: &str =
    r"\b(?:reference|ref\.?\s*range|ref\.?|range|ULN|upper\s+limit(?:\s+of\s+normal)?)\b";

// Unit tokens
pub const ENZYME_UNIT: &str = r"(?:I?U\s?/?\s?L|units?\s?/\s?L)\b";
pub const MASS_PER_DL_UNIT: &str = r"(?:mg\s?/\s?dL)\b";
pub const ALBUMIN_UNIT: &str = r"(?:g\s?/\s?d?L)\b";
pub const PLATELET_UNIT: &str = r"(?:(?:[x×*]\s?)?10\s?(?:\^|\*\*|e)?\s?(?:3|9|³|⁹)\s?/\s?(?:[µu]?L|mm3|mm³)|K\s?/\s?[µu]L|thou(?:sand)?\s?/\s?[µu]?L|G\s?/\s?L\b)";
pub const AGE_UNIT: &str = r"(?:years?|yrs?|y/o|y)\b";

/// Build a strict, unit-anchored pattern for a numeric field.
pub fn strict_numeric(label: &str, unit: &str) -> Regex {
    compile(&format!("(?i){label}{STRICT_GAP}{NUMBER}{UNIT_WINDOW}{unit}"))
}

/// Build a loose pattern: label followed by the first number on the line.
pub fn loose_numeric(label: &str) -> Regex {
    compile(&format!("(?i){label}{LOOSE_GAP}{LOOSE_NUMBER}"))
}

/// Build a pattern matching a unit token at the very start of the text
/// following a captured value. Group 1 holds the token.
pub fn unit_after(units: &str) -> Regex {
    compile(&format!(r"(?i)^{UNIT_WINDOW}({units})"))
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

lazy_static! {
    // Liver enzymes
    pub static ref AST_STRICT: Regex = strict_numeric(AST_LABEL, ENZYME_UNIT);
    pub static ref AST_LOOSE: Regex = loose_numeric(AST_LABEL);
    pub static ref ALT_STRICT: Regex = strict_numeric(ALT_LABEL, ENZYME_UNIT);
    pub static ref ALT_LOOSE: Regex = loose_numeric(ALT_LABEL);
    pub static ref GGT_STRICT: Regex = strict_numeric(GGT_LABEL, ENZYME_UNIT);
    pub static ref GGT_LOOSE: Regex = loose_numeric(GGT_LABEL);

    // Lipids, haematology, proteins
    pub static ref TG_STRICT: Regex = strict_numeric(TG_LABEL, MASS_PER_DL_UNIT);
    pub static ref TG_LOOSE: Regex = loose_numeric(TG_LABEL);
    pub static ref PLATELETS_STRICT: Regex = strict_numeric(PLATELET_LABEL, PLATELET_UNIT);
    pub static ref PLATELETS_LOOSE: Regex = loose_numeric(PLATELET_LABEL);
    pub static ref ALBUMIN_STRICT: Regex = strict_numeric(ALBUMIN_LABEL, ALBUMIN_UNIT);
    pub static ref ALBUMIN_LOOSE: Regex = loose_numeric(ALBUMIN_LABEL);

    // ULN for AST as a single number ("AST reference range ... 40 U/L")
    pub static ref ULN_AST_STRICT: Regex = compile(&format!(
        r"(?i)\b(?:AST|SGOT)\b[^\n]{{0,30}}?{REFERENCE_WORDS}[^\n]{{0,20}}?(\d{{2,3}}){UNIT_WINDOW}{ENZYME_UNIT}"
    ));
    pub static ref ULN_AST_LOOSE: Regex = compile(&format!(
        r"(?i)\b(?:AST|SGOT)\b[^\n]{{0,30}}?{REFERENCE_WORDS}[^\n]{{0,25}}?(\d{{2,3}})\b"
    ));

    // ULN for AST from a "low-high" interval, in priority order
    pub static ref AST_RANGE_AFTER_UNIT: Regex = Regex::new(
        r"(?i)\b(?:AST|SGOT)\b[^\n]{0,40}?(?:\d|\b)(?:I?U\s?/?\s?L|units?\s?/\s?L)\b[^\n\d]{0,40}?(\d{1,3})[^\S\n]{0,2}[\-–][^\S\n]{0,2}(\d{1,3})\b"
    ).unwrap();
    pub static ref AST_RANGE_AFTER_REFERENCE: Regex = Regex::new(
        r"(?i)\b(?:AST|SGOT)\b[^\n]{0,60}?\b(?:reference|ref\.?|range)\b[^\n\d]{0,20}?(\d{1,3})[^\S\n]{0,2}[\-–][^\S\n]{0,2}(\d{1,3})\b"
    ).unwrap();
    pub static ref AST_RANGE_PARENTHESIZED: Regex = Regex::new(
        r"(?i)\b(?:AST|SGOT)\b[^\n]{0,40}?\((\d{1,3})[^\S\n]{0,2}[\-–][^\S\n]{0,2}(\d{1,3})\)"
    ).unwrap();

    // Demographics
    pub static ref AGE_STRICT: Regex = compile(&format!(
        r"(?i){AGE_LABEL}{STRICT_GAP}(\d{{1,3}}){UNIT_WINDOW}{AGE_UNIT}"
    ));
    pub static ref AGE_LOOSE: Regex = compile(&format!(
        r"(?i){AGE_LABEL}[^\d\n]{{0,20}}?(\d{{1,3}})\b"
    ));
    pub static ref SEX_STRICT: Regex = compile(&format!(
        r"(?i){SEX_LABEL}{STRICT_GAP}(male|female|m|f)\b"
    ));
    pub static ref SEX_LOOSE: Regex = compile(&format!(
        r"(?i){SEX_LABEL}[^\n]{{0,15}}?\b([a-z]+)\b"
    ));
    pub static ref NAME_STRICT: Regex = Regex::new(
        r"(?im)\bpatient(?:'s)?\s+name\s{0,3}[:=\-]\s{0,3}(\p{L}[\p{L} .,'\-]{1,60}?)[^\S\n]*(?:$|\b(?:age|sex|gender|dob|date|id|mrn)\b)"
    ).unwrap();
    pub static ref NAME_LOOSE: Regex = Regex::new(
        r"(?i)\b(?:patient|name)\b\s{0,3}[:=\-]\s{0,3}(\p{L}[\p{L} .,'\-]{1,60})"
    ).unwrap();

    /// Labels that end a loosely captured name.
    pub static ref NAME_STOP: Regex = Regex::new(
        r"(?i)\b(?:age|sex|gender|dob|date|id|mrn)\b"
    ).unwrap();

    // Unit written right after a captured value
    pub static ref ALBUMIN_UNIT_AFTER: Regex = unit_after(r"g\s?/\s?d?L\b");
    pub static ref TG_UNIT_AFTER: Regex = unit_after(r"mg\s?/\s?dL\b|mmol\s?/\s?L\b");

    // Text normalization
    pub static ref HORIZONTAL_WHITESPACE: Regex = Regex::new(r"[^\S\r\n]+").unwrap();
}
