use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Whisper reports the spoken language as an ISO 639-1 code, LanguageTool
/// expects its own variant codes ("en-US", "pt-PT"). This module validates
/// the former and maps it to the latter.
// @const: ISO 639-2/B codes that differ from their 639-2/T form
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

// @const: Whisper language → LanguageTool language
const LANGUAGETOOL_CODES: &[(&str, &str)] = &[
    ("it", "it"),
    ("en", "en-US"),
    ("es", "es"),
    ("fr", "fr"),
    ("de", "de-DE"),
    ("pt", "pt-PT"),
    ("nl", "nl"),
    ("pl", "pl-PL"),
    ("ru", "ru-RU"),
];

/// LanguageTool code used when the language is unknown or unmapped
pub const DEFAULT_LANGUAGETOOL_CODE: &str = "en-US";

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }

        if let Some((_, part2t)) = PART2B_TO_PART2T.iter().find(|(b, _)| *b == normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(lang.to_639_1().map(str::to_string).unwrap_or(part2t))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Map a transcription language to the LanguageTool language code
///
/// Accepts 2- or 3-letter codes. Unknown or unmapped languages fall back to
/// American English.
pub fn languagetool_code(language: Option<&str>) -> String {
    let Some(code) = language else {
        return DEFAULT_LANGUAGETOOL_CODE.to_string();
    };

    normalize_to_part1_or_part2t(code)
        .ok()
        .and_then(|part1| {
            LANGUAGETOOL_CODES
                .iter()
                .find(|(whisper, _)| *whisper == part1)
                .map(|(_, tool)| tool.to_string())
        })
        .unwrap_or_else(|| DEFAULT_LANGUAGETOOL_CODE.to_string())
}
