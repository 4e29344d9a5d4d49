use crate::key::GlyphKey;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Zero-width joiner.
pub const ZWJ: u32 = 0x200D;
/// Skin-tone modifiers U+1F3FB..=U+1F3FF.
pub const SKIN_TONES: std::ops::RangeInclusive<u32> = 0x1F3FB..=0x1F3FF;

/// Quality bucket controlling which variants a sheet includes.
/// Ordered by permissiveness: `Lite < Full < Deluxe`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Lite,
    Full,
    Deluxe,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Lite, Tier::Full, Tier::Deluxe];

    pub fn weight(self) -> u8 {
        match self {
            Tier::Lite => 0,
            Tier::Full => 1,
            Tier::Deluxe => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Lite => "lite",
            Tier::Full => "full",
            Tier::Deluxe => "deluxe",
        }
    }

    /// Folder name used under the output roots (`Lite`, `Full`, `Deluxe`).
    pub fn dir_name(self) -> &'static str {
        match self {
            Tier::Lite => "Lite",
            Tier::Full => "Full",
            Tier::Deluxe => "Deluxe",
        }
    }

    /// Lowest tier whose output contains `key`.
    pub fn classify(key: &GlyphKey) -> Tier {
        let c = Composition::of(key);
        if c.has_zwj {
            Tier::Deluxe
        } else if c.is_toned_sequence() {
            Tier::Full
        } else {
            Tier::Lite
        }
    }

    /// Whether a sheet built for this tier includes `key`.
    pub fn admits(self, key: &GlyphKey) -> bool {
        let c = Composition::of(key);
        match self {
            Tier::Lite => !c.has_zwj && !c.is_toned_sequence(),
            Tier::Full => !c.is_toned_sequence(),
            Tier::Deluxe => true,
        }
    }

    /// Keeps the items whose key this tier admits, preserving order.
    pub fn filter<'a, T>(self, items: &'a [T], key: impl Fn(&T) -> &GlyphKey) -> Vec<&'a T> {
        items.iter().filter(|it| self.admits(key(it))).collect()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lite" => Ok(Self::Lite),
            "full" => Ok(Self::Full),
            "deluxe" | "delux" => Ok(Self::Deluxe),
            _ => Err(()),
        }
    }
}

/// Codepoint facts that drive classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Composition {
    pub has_zwj: bool,
    pub has_skin_tone: bool,
    pub len: usize,
}

impl Composition {
    pub fn of(key: &GlyphKey) -> Self {
        let cps = key.normalized_codepoints();
        Self {
            has_zwj: cps.contains(&ZWJ),
            has_skin_tone: cps.iter().any(|cp| SKIN_TONES.contains(cp)),
            len: cps.len(),
        }
    }

    /// A skin tone applied to something; a lone swatch does not count.
    pub fn is_toned_sequence(&self) -> bool {
        self.has_skin_tone && self.len > 1
    }
}

/// Layout order: tier weight, then raw codepoints compared as integers.
pub fn compare_keys(a: &GlyphKey, b: &GlyphKey) -> Ordering {
    Tier::classify(a)
        .cmp(&Tier::classify(b))
        .then_with(|| a.codepoints().cmp(&b.codepoints()))
}

/// Stable sort of `items` by [`compare_keys`].
pub fn sort_by_tier<T>(items: &mut [T], key: impl Fn(&T) -> &GlyphKey) {
    items.sort_by(|a, b| compare_keys(key(a), key(b)));
}
