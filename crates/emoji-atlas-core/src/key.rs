use crate::error::{AtlasError, Result};
use icu_normalizer::ComposingNormalizerBorrowed;
use serde::{Serialize, Serializer};
use std::fmt;

/// Identity of one visual unit: a single character, a ZWJ sequence or a
/// base + modifier pair. Stored as the raw codepoint sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphKey(Vec<char>);

impl GlyphKey {
    pub fn new(chars: Vec<char>) -> Result<Self> {
        if chars.is_empty() {
            return Err(AtlasError::InvalidKey("empty codepoint sequence".into()));
        }
        Ok(Self(chars))
    }

    pub fn from_char(ch: char) -> Self {
        Self(vec![ch])
    }

    pub fn from_codepoints(codepoints: &[u32]) -> Result<Self> {
        let chars = codepoints
            .iter()
            .map(|&cp| {
                char::from_u32(cp)
                    .ok_or_else(|| AtlasError::InvalidKey(format!("U+{cp:04X} is not a scalar value")))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(chars)
    }

    /// Parses a file stem such as `1f469-200d-1f692` or `1F1F2_1F1EB`.
    pub fn from_file_stem(stem: &str) -> Result<Self> {
        let codepoints = stem
            .split(['-', '_'])
            .map(|part| {
                u32::from_str_radix(part.trim(), 16)
                    .map_err(|_| AtlasError::InvalidKey(format!("'{part}' in '{stem}' is not hexadecimal")))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_codepoints(&codepoints)
    }

    pub fn chars(&self) -> &[char] {
        &self.0
    }

    pub fn codepoints(&self) -> Vec<u32> {
        self.0.iter().map(|&c| c as u32).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical lowercase, hyphen-separated file stem.
    pub fn file_stem(&self) -> String {
        self.0
            .iter()
            .map(|&c| format!("{:x}", c as u32))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Codepoints of the NFC normalization of this key.
    pub fn normalized_codepoints(&self) -> Vec<u32> {
        let text = self.to_string();
        ComposingNormalizerBorrowed::new_nfc()
            .normalize(&text)
            .chars()
            .map(|c| c as u32)
            .collect()
    }

    /// Human readable `U+XXXX` listing, used in log lines.
    pub fn escaped(&self) -> String {
        self.0
            .iter()
            .map(|&c| format!("U+{:04X}", c as u32))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for GlyphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.0 {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl TryFrom<&str> for GlyphKey {
    type Error = AtlasError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value.chars().collect())
    }
}

impl Serialize for GlyphKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Converts a category name to a camelCase slug of ASCII alphanumerics.
/// `"Smileys & Emotion"` becomes `"smileysEmotion"`.
pub fn category_slug(name: &str) -> String {
    let clean: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    let mut parts = clean.split_whitespace();
    let Some(first) = parts.next() else {
        return String::new();
    };
    let mut slug = first.to_ascii_lowercase();
    for part in parts {
        let mut chars = part.chars();
        if let Some(head) = chars.next() {
            slug.push(head.to_ascii_uppercase());
            slug.push_str(&chars.as_str().to_ascii_lowercase());
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hyphen_and_underscore_stems() {
        let a = GlyphKey::from_file_stem("1f469-200d-1f692").unwrap();
        let b = GlyphKey::from_file_stem("1F469_200D_1F692").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.codepoints(), vec![0x1F469, 0x200D, 0x1F692]);
        assert_eq!(a.file_stem(), "1f469-200d-1f692");
        assert_eq!(a.to_string(), "👩‍🚒");
    }

    #[test]
    fn rejects_bad_stems() {
        assert!(GlyphKey::from_file_stem("smile").is_err());
        assert!(GlyphKey::from_file_stem("").is_err());
        assert!(GlyphKey::from_file_stem("d800").is_err());
    }

    #[test]
    fn slug_is_camel_case() {
        assert_eq!(category_slug("Smileys & Emotion"), "smileysEmotion");
        assert_eq!(category_slug("Apple"), "apple");
        assert_eq!(category_slug("noto COLOR emoji"), "notoColorEmoji");
        assert_eq!(category_slug("!!"), "");
    }
}
