// Round-trip metadata for converted spans.
//
// When a conversion is ambiguous, the converted text is wrapped in an
// element carrying enough information to reconstruct the original: the
// original text tagged with its (possibly guessed) language code and the
// converted text tagged with the destination code.

use serde::{Deserialize, Serialize};

/// Value of the `typeof` attribute on wrapper elements.
pub const VARIANT_TYPEOF: &str = "mw:LanguageVariant";

/// Attribute holding the JSON-encoded [`VariantInfo`].
pub const VARIANT_ATTR: &str = "data-mw-variant";

/// Attribute recording the guessed original language code, present only
/// when the caller supplied no real inverse code and one was inferred.
pub const VARIANT_LANG_ATTR: &str = "data-mw-variant-lang";

/// One direction of a two-way conversion record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoWay {
    /// Variant code this text is written in.
    #[serde(rename = "l")]
    pub lang: String,
    /// The text itself.
    #[serde(rename = "t")]
    pub text: String,
}

/// The machine-readable round-trip record attached to an unsafe span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantInfo {
    /// Original first, converted second.
    pub twoway: Vec<TwoWay>,
    /// Marks the record as round-trippable.
    pub rt: bool,
}

impl VariantInfo {
    /// Builds the standard two-entry record: the original text in the
    /// inverse language, then the converted text in the destination
    /// language.
    pub fn two_way(
        invert_lang: &str,
        original: &str,
        dest_lang: &str,
        converted: &str,
    ) -> Self {
        Self {
            twoway: vec![
                TwoWay {
                    lang: invert_lang.to_owned(),
                    text: original.to_owned(),
                },
                TwoWay {
                    lang: dest_lang.to_owned(),
                    text: converted.to_owned(),
                },
            ],
            rt: true,
        }
    }

    /// JSON attribute encoding. `serde_json` leaves `/` and non-ASCII
    /// characters unescaped, which is the required wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// The recorded text for `lang`, if any.
    pub fn text_for(&self, lang: &str) -> Option<&str> {
        self.twoway
            .iter()
            .find(|e| e.lang == lang)
            .map(|e| e.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape_is_exact() {
        let info = VariantInfo::two_way("zh-hans", "干", "zh-tw", "乾");
        assert_eq!(
            info.to_json().unwrap(),
            "{\"twoway\":[{\"l\":\"zh-hans\",\"t\":\"干\"},{\"l\":\"zh-tw\",\"t\":\"乾\"}],\"rt\":true}"
        );
    }

    #[test]
    fn json_roundtrip() {
        let info = VariantInfo::two_way("a", "x/y", "b", "z");
        let json = info.to_json().unwrap();
        // Slashes stay unescaped.
        assert!(json.contains("x/y"));
        assert_eq!(VariantInfo::from_json(&json).unwrap(), info);
    }

    #[test]
    fn text_for_finds_entries() {
        let info = VariantInfo::two_way("a", "orig", "b", "conv");
        assert_eq!(info.text_for("a"), Some("orig"));
        assert_eq!(info.text_for("b"), Some("conv"));
        assert_eq!(info.text_for("c"), None);
    }
}
