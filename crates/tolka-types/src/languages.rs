/// Translation target offered in the settings UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub value: &'static str,
    pub label: &'static str,
}

/// Supported translation targets. The set is limited to scripts the OCR
/// models handle well; Russian is kept for existing users despite the
/// Cyrillic limitation.
pub const LANGUAGES: &[Language] = &[
    Language { value: "en", label: "English" },
    Language { value: "es", label: "Spanish" },
    Language { value: "fr", label: "French" },
    Language { value: "de", label: "German" },
    Language { value: "it", label: "Italian" },
    Language { value: "pt", label: "Portuguese (Portugal)" },
    Language { value: "pt-br", label: "Portuguese (Brazil)" },
    Language { value: "nl", label: "Dutch" },
    Language { value: "sv", label: "Swedish" },
    Language { value: "no", label: "Norwegian" },
    Language { value: "da", label: "Danish" },
    Language { value: "fi", label: "Finnish" },
    Language { value: "pl", label: "Polish" },
    Language { value: "cs", label: "Czech" },
    Language { value: "hu", label: "Hungarian" },
    Language { value: "ro", label: "Romanian" },
    Language { value: "ru", label: "Russian (Limited OCR support)" },
];

/// Look up a language by its code.
pub fn find(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.value == code)
}

/// Whether `code` is a supported translation target.
pub fn is_supported(code: &str) -> bool {
    find(code).is_some()
}
