use serde::{Deserialize, Serialize};
use unicode_script::Script;

use super::properties::is_weak_script;

/// A BCP 47 style language tag, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    pub fn new(tag: &str) -> Self {
        Self(tag.trim().replace('_', "-").to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primary subtag, e.g. `zh` for `zh-hant`.
    pub fn primary(&self) -> &str {
        self.0.split('-').next().unwrap_or_default()
    }

    /// Whether text in `script` is expected when writing this language.
    ///
    /// Common, inherited and unknown characters are part of every
    /// language; languages without script data accept any script.
    pub fn includes_script(&self, script: Script) -> bool {
        if is_weak_script(script) {
            return true;
        }
        match scripts_for(self.primary()) {
            Some(scripts) => scripts.contains(&script),
            None => true,
        }
    }

    /// A representative language for text written in `script`.
    pub fn sample_for(script: Script) -> Option<Language> {
        let tag = match script {
            Script::Latin => "en",
            Script::Arabic => "ar",
            Script::Armenian => "hy",
            Script::Bengali => "bn",
            Script::Cyrillic => "ru",
            Script::Devanagari => "hi",
            Script::Ethiopic => "am",
            Script::Georgian => "ka",
            Script::Greek => "el",
            Script::Gujarati => "gu",
            Script::Gurmukhi => "pa",
            Script::Han => "zh",
            Script::Hangul => "ko",
            Script::Hebrew => "he",
            Script::Hiragana | Script::Katakana => "ja",
            Script::Kannada => "kn",
            Script::Khmer => "km",
            Script::Lao => "lo",
            Script::Malayalam => "ml",
            Script::Mongolian => "mn",
            Script::Myanmar => "my",
            Script::Oriya => "or",
            Script::Sinhala => "si",
            Script::Syriac => "syr",
            Script::Tamil => "ta",
            Script::Telugu => "te",
            Script::Thaana => "dv",
            Script::Thai => "th",
            Script::Tibetan => "bo",
            Script::Yi => "ii",
            _ => return None,
        };
        Some(Language::new(tag))
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::new("en")
    }
}

impl From<&str> for Language {
    fn from(tag: &str) -> Self {
        Language::new(tag)
    }
}

fn scripts_for(primary: &str) -> Option<&'static [Script]> {
    use Script::*;
    let scripts: &'static [Script] = match primary {
        "en" | "fr" | "de" | "es" | "it" | "pt" | "nl" | "sv" | "da" | "no" | "nb" | "nn"
        | "fi" | "is" | "pl" | "cs" | "sk" | "sl" | "hr" | "hu" | "ro" | "tr" | "vi" | "id"
        | "ms" | "ca" | "et" | "lv" | "lt" | "ga" | "cy" | "eu" | "af" | "sq" | "sw" => &[Latin],
        "ru" | "uk" | "be" | "bg" | "mk" | "kk" | "ky" => &[Cyrillic],
        "sr" => &[Cyrillic, Latin],
        "mn" => &[Cyrillic, Mongolian],
        "el" => &[Greek],
        "he" | "yi" => &[Hebrew],
        "ar" | "fa" | "ur" | "ps" => &[Arabic],
        "hi" | "mr" | "ne" | "sa" => &[Devanagari],
        "bn" | "as" => &[Bengali],
        "gu" => &[Gujarati],
        "pa" => &[Gurmukhi],
        "ta" => &[Tamil],
        "te" => &[Telugu],
        "kn" => &[Kannada],
        "ml" => &[Malayalam],
        "si" => &[Sinhala],
        "th" => &[Thai],
        "lo" => &[Lao],
        "km" => &[Khmer],
        "my" => &[Myanmar],
        "bo" => &[Tibetan],
        "ka" => &[Georgian],
        "hy" => &[Armenian],
        "am" | "ti" => &[Ethiopic],
        "zh" => &[Han, Bopomofo],
        "ja" => &[Han, Hiragana, Katakana],
        "ko" => &[Hangul, Han],
        "dv" => &[Thaana],
        "syr" => &[Syriac],
        "ii" => &[Yi],
        _ => return None,
    };
    Some(scripts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_normalized() {
        let lang = Language::new("zh_Hant");
        assert_eq!(lang.as_str(), "zh-hant");
        assert_eq!(lang.primary(), "zh");
    }

    #[test]
    fn english_includes_latin_and_common() {
        let en = Language::new("en");
        assert!(en.includes_script(Script::Latin));
        assert!(en.includes_script(Script::Common));
        assert!(!en.includes_script(Script::Hebrew));
    }

    #[test]
    fn unknown_languages_accept_every_script() {
        let lang = Language::new("x-private");
        assert!(lang.includes_script(Script::Hebrew));
    }

    #[test]
    fn sample_languages() {
        assert_eq!(Language::sample_for(Script::Hebrew), Some(Language::new("he")));
        assert_eq!(Language::sample_for(Script::Katakana), Some(Language::new("ja")));
        assert_eq!(Language::sample_for(Script::Common), None);
    }
}
