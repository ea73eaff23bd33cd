//! Language selection table.
//!
//! Conversations identify languages by short ISO-639-1-like codes
//! (`"es"`, `"en"`, ...). Capture and synthesis backends want a full
//! locale string, so each entry carries the locale handed to them.

/// A language selectable for a conversation side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Short code used throughout the conversation state ("es", "en", ...)
    pub code: &'static str,

    /// Native display name
    pub name: &'static str,

    /// Full locale handed to capture and synthesis backends
    pub locale: &'static str,
}

/// Locale used when a code has no table entry.
pub const DEFAULT_LOCALE: &str = "en-US";

pub const LANGUAGES: &[Language] = &[
    Language { code: "es", name: "Español", locale: "es-ES" },
    Language { code: "en", name: "English", locale: "en-US" },
    Language { code: "fr", name: "Français", locale: "fr-FR" },
    Language { code: "de", name: "Deutsch", locale: "de-DE" },
    Language { code: "it", name: "Italiano", locale: "it-IT" },
    Language { code: "pt", name: "Português", locale: "pt-BR" },
    Language { code: "ja", name: "日本語", locale: "ja-JP" },
    Language { code: "zh", name: "中文", locale: "zh-CN" },
];

/// Look up a language by its short code.
pub fn find(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// Locale for capture/synthesis. Unknown codes fall back to
/// [`DEFAULT_LOCALE`] rather than erroring.
pub fn locale_for(code: &str) -> &'static str {
    find(code).map(|l| l.locale).unwrap_or(DEFAULT_LOCALE)
}
