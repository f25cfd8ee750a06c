//! ISO 639-1 language code detection.
//!
//! The first URL segment under `/docs/` may be a language code or something
//! else entirely (a version, a content path). Only the two-letter codes
//! listed here count as languages; matching is case-sensitive, so `EN` is
//! not a language.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Returns `true` if `code` is a recognized ISO 639-1 two-letter code.
///
/// # Examples
///
/// ```
/// use refdocs_refs::is_language_code;
///
/// assert!(is_language_code("en"));
/// assert!(is_language_code("fr"));
/// assert!(!is_language_code("guide"));
/// assert!(!is_language_code("EN"));
/// ```
pub fn is_language_code(code: &str) -> bool {
    LANGUAGES.contains_key(code)
}

/// Returns the English name of an ISO 639-1 language code.
///
/// # Examples
///
/// ```
/// use refdocs_refs::language_name;
///
/// assert_eq!(language_name("ja"), Some("Japanese"));
/// assert_eq!(language_name("zz"), None);
/// ```
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES.get(code).copied()
}

static LANGUAGES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("aa", "Afar"),
        ("ab", "Abkhaz"),
        ("ae", "Avestan"),
        ("af", "Afrikaans"),
        ("ak", "Akan"),
        ("am", "Amharic"),
        ("an", "Aragonese"),
        ("ar", "Arabic"),
        ("as", "Assamese"),
        ("av", "Avaric"),
        ("ay", "Aymara"),
        ("az", "Azerbaijani"),
        ("ba", "Bashkir"),
        ("be", "Belarusian"),
        ("bg", "Bulgarian"),
        ("bh", "Bihari"),
        ("bi", "Bislama"),
        ("bm", "Bambara"),
        ("bn", "Bengali"),
        ("bo", "Tibetan"),
        ("br", "Breton"),
        ("bs", "Bosnian"),
        ("ca", "Catalan"),
        ("ce", "Chechen"),
        ("ch", "Chamorro"),
        ("co", "Corsican"),
        ("cr", "Cree"),
        ("cs", "Czech"),
        ("cu", "Old Church Slavonic"),
        ("cv", "Chuvash"),
        ("cy", "Welsh"),
        ("da", "Danish"),
        ("de", "German"),
        ("dv", "Divehi"),
        ("dz", "Dzongkha"),
        ("ee", "Ewe"),
        ("el", "Greek"),
        ("en", "English"),
        ("eo", "Esperanto"),
        ("es", "Spanish"),
        ("et", "Estonian"),
        ("eu", "Basque"),
        ("fa", "Persian"),
        ("ff", "Fula"),
        ("fi", "Finnish"),
        ("fj", "Fijian"),
        ("fo", "Faroese"),
        ("fr", "French"),
        ("fy", "Western Frisian"),
        ("ga", "Irish"),
        ("gd", "Scottish Gaelic"),
        ("gl", "Galician"),
        ("gn", "Guarani"),
        ("gu", "Gujarati"),
        ("gv", "Manx"),
        ("ha", "Hausa"),
        ("he", "Hebrew"),
        ("hi", "Hindi"),
        ("ho", "Hiri Motu"),
        ("hr", "Croatian"),
        ("ht", "Haitian"),
        ("hu", "Hungarian"),
        ("hy", "Armenian"),
        ("hz", "Herero"),
        ("ia", "Interlingua"),
        ("id", "Indonesian"),
        ("ie", "Interlingue"),
        ("ig", "Igbo"),
        ("ii", "Nuosu"),
        ("ik", "Inupiaq"),
        ("io", "Ido"),
        ("is", "Icelandic"),
        ("it", "Italian"),
        ("iu", "Inuktitut"),
        ("ja", "Japanese"),
        ("jv", "Javanese"),
        ("ka", "Georgian"),
        ("kg", "Kongo"),
        ("ki", "Kikuyu"),
        ("kj", "Kwanyama"),
        ("kk", "Kazakh"),
        ("kl", "Kalaallisut"),
        ("km", "Khmer"),
        ("kn", "Kannada"),
        ("ko", "Korean"),
        ("kr", "Kanuri"),
        ("ks", "Kashmiri"),
        ("ku", "Kurdish"),
        ("kv", "Komi"),
        ("kw", "Cornish"),
        ("ky", "Kyrgyz"),
        ("la", "Latin"),
        ("lb", "Luxembourgish"),
        ("lg", "Ganda"),
        ("li", "Limburgish"),
        ("ln", "Lingala"),
        ("lo", "Lao"),
        ("lt", "Lithuanian"),
        ("lu", "Luba-Katanga"),
        ("lv", "Latvian"),
        ("mg", "Malagasy"),
        ("mh", "Marshallese"),
        ("mi", "Maori"),
        ("mk", "Macedonian"),
        ("ml", "Malayalam"),
        ("mn", "Mongolian"),
        ("mr", "Marathi"),
        ("ms", "Malay"),
        ("mt", "Maltese"),
        ("my", "Burmese"),
        ("na", "Nauru"),
        ("nb", "Norwegian Bokmal"),
        ("nd", "Northern Ndebele"),
        ("ne", "Nepali"),
        ("ng", "Ndonga"),
        ("nl", "Dutch"),
        ("nn", "Norwegian Nynorsk"),
        ("no", "Norwegian"),
        ("nr", "Southern Ndebele"),
        ("nv", "Navajo"),
        ("ny", "Chichewa"),
        ("oc", "Occitan"),
        ("oj", "Ojibwe"),
        ("om", "Oromo"),
        ("or", "Oriya"),
        ("os", "Ossetian"),
        ("pa", "Panjabi"),
        ("pi", "Pali"),
        ("pl", "Polish"),
        ("ps", "Pashto"),
        ("pt", "Portuguese"),
        ("qu", "Quechua"),
        ("rm", "Romansh"),
        ("rn", "Kirundi"),
        ("ro", "Romanian"),
        ("ru", "Russian"),
        ("rw", "Kinyarwanda"),
        ("sa", "Sanskrit"),
        ("sc", "Sardinian"),
        ("sd", "Sindhi"),
        ("se", "Northern Sami"),
        ("sg", "Sango"),
        ("si", "Sinhala"),
        ("sk", "Slovak"),
        ("sl", "Slovenian"),
        ("sm", "Samoan"),
        ("sn", "Shona"),
        ("so", "Somali"),
        ("sq", "Albanian"),
        ("sr", "Serbian"),
        ("ss", "Swati"),
        ("st", "Southern Sotho"),
        ("su", "Sundanese"),
        ("sv", "Swedish"),
        ("sw", "Swahili"),
        ("ta", "Tamil"),
        ("te", "Telugu"),
        ("tg", "Tajik"),
        ("th", "Thai"),
        ("ti", "Tigrinya"),
        ("tk", "Turkmen"),
        ("tl", "Tagalog"),
        ("tn", "Tswana"),
        ("to", "Tonga"),
        ("tr", "Turkish"),
        ("ts", "Tsonga"),
        ("tt", "Tatar"),
        ("tw", "Twi"),
        ("ty", "Tahitian"),
        ("ug", "Uyghur"),
        ("uk", "Ukrainian"),
        ("ur", "Urdu"),
        ("uz", "Uzbek"),
        ("ve", "Venda"),
        ("vi", "Vietnamese"),
        ("vo", "Volapuk"),
        ("wa", "Walloon"),
        ("wo", "Wolof"),
        ("xh", "Xhosa"),
        ("yi", "Yiddish"),
        ("yo", "Yoruba"),
        ("za", "Zhuang"),
        ("zh", "Chinese"),
        ("zu", "Zulu"),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_codes_are_languages() {
        for code in ["en", "fr", "de", "es", "ja", "zh", "pt", "ru"] {
            assert!(is_language_code(code), "{code} should be a language");
        }
    }

    #[test]
    fn test_non_codes_are_not_languages() {
        for value in ["", "e", "eng", "guide", "main", "1.0.0", "EN", "Fr"] {
            assert!(!is_language_code(value), "{value} should not be a language");
        }
    }

    #[test]
    fn test_table_contains_only_two_letter_lowercase_codes() {
        assert_eq!(LANGUAGES.len(), 184);
        for code in LANGUAGES.keys() {
            assert_eq!(code.len(), 2);
            assert!(code.chars().all(|c| c.is_ascii_lowercase()));
        }
    }
}
