//! Grade label normalisation and ranking

use regex::Regex;
use std::sync::LazyLock;

/// Rank given to labels that are not G1/G2/G3
pub const UNRANKED_GRADE: u8 = 99;

/// Jump races: "J·G2", "JG2", "J.G2", "j-g2"
static JUMP_GRADE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^J\s*[·・.\-]?\s*G").expect("jump grade pattern"));

/// Fold full-width letters/digits and roman numerals to ASCII, drop spaces
pub fn normalize_grade(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            'Ａ'..='Ｚ' | 'ａ'..='ｚ' | '０'..='９' => {
                let folded = char::from_u32(c as u32 - 0xFEE0).unwrap_or(c);
                out.push(folded.to_ascii_uppercase());
            }
            'Ⅰ' => out.push('I'),
            'Ⅱ' => out.push_str("II"),
            'Ⅲ' => out.push_str("III"),
            c if c.is_whitespace() => {}
            c => out.push(c.to_ascii_uppercase()),
        }
    }
    out
}

pub fn is_jump_grade(label: &str) -> bool {
    JUMP_GRADE.is_match(&normalize_grade(label))
}

/// G1 → 1, G2 → 2, G3 → 3, anything else → [`UNRANKED_GRADE`].
///
/// Jump grades rank like their flat counterpart.
pub fn grade_rank(label: &str) -> u8 {
    let normalized = normalize_grade(label);
    let core = match JUMP_GRADE.find(&normalized) {
        // keep the "G" the pattern ends on
        Some(m) => &normalized[m.end() - 1..],
        None => normalized.as_str(),
    };

    match core {
        "G1" | "GI" => 1,
        "G2" | "GII" => 2,
        "G3" | "GIII" => 3,
        _ => UNRANKED_GRADE,
    }
}
