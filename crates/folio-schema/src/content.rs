//! Shape checks for the content files an extension archive carries.
//!
//! Each check returns the first problem found. The archive auditor is
//! responsible for running them per file and aggregating the results.

use serde_json::Value;
use thiserror::Error;

pub const REQUIRED_THEME_KEYS: [&str; 4] = [
    "lookAndFeelClassName",
    "formatString",
    "styles",
    "textAreaBackground",
];
pub const REQUIRED_STYLE_KEYS: [&str; 4] = ["fontName", "fontStyle", "fontSize", "color"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("{0} must be a JSON object")]
    NotAnObject(&'static str),
    #[error("{}: {reason}", mapping_location(.book, .lang))]
    InvalidMappingStructure {
        book: String,
        lang: Option<String>,
        reason: &'static str,
    },
    #[error("missing required key: {0}")]
    MissingThemeKey(&'static str),
    #[error("'styles' must be an object")]
    StylesNotObject,
    #[error("style '{0}' must be an object")]
    StyleNotObject(String),
    #[error("style '{style}' missing required key: {key}")]
    MissingStyleKey { style: String, key: &'static str },
    #[error("line {line}: invalid properties format (missing = or :)")]
    InvalidPropertiesLine { line: usize },
}

fn mapping_location(book: &str, lang: &Option<String>) -> String {
    match lang {
        Some(lang) => format!("book {book}, language {lang}"),
        None => format!("book {book}"),
    }
}

fn mapping_error(book: &str, lang: Option<&str>, reason: &'static str) -> ContentError {
    ContentError::InvalidMappingStructure {
        book: book.to_owned(),
        lang: lang.map(str::to_owned),
        reason,
    }
}

/// Validate a book-name mapping document.
///
/// Keys must be book numbers. Each value is a list of names, where any
/// non-string item must be a single-key `{lang_code: [names...]}` object.
pub fn validate_mapping(data: &Value) -> Result<(), ContentError> {
    let books = data.as_object().ok_or(ContentError::NotAnObject("mapping"))?;

    if let Some(bad) = books
        .keys()
        .find(|k| k.is_empty() || !k.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(mapping_error(bad, None, "book number key must be numeric"));
    }

    for (book, names) in books {
        let items = names
            .as_array()
            .ok_or_else(|| mapping_error(book, None, "expected a list of names"))?;
        for item in items {
            match item {
                Value::String(_) => {}
                Value::Object(localized) => {
                    let mut entries = localized.iter();
                    let (Some((lang, names)), None) = (entries.next(), entries.next()) else {
                        return Err(mapping_error(
                            book,
                            None,
                            "language objects must have exactly one language code",
                        ));
                    };
                    let all_strings = names
                        .as_array()
                        .is_some_and(|list| list.iter().all(Value::is_string));
                    if !all_strings {
                        return Err(mapping_error(
                            book,
                            Some(lang),
                            "must be a list of strings",
                        ));
                    }
                }
                _ => {
                    return Err(mapping_error(
                        book,
                        None,
                        "all items must be strings or language objects",
                    ))
                }
            }
        }
    }
    Ok(())
}

/// Validate a theme document: required top-level keys, then every style.
pub fn validate_theme(data: &Value) -> Result<(), ContentError> {
    let theme = data.as_object().ok_or(ContentError::NotAnObject("theme"))?;

    if let Some(missing) = REQUIRED_THEME_KEYS.iter().find(|k| !theme.contains_key(**k)) {
        return Err(ContentError::MissingThemeKey(*missing));
    }

    let styles = theme["styles"]
        .as_object()
        .ok_or(ContentError::StylesNotObject)?;

    for (style, body) in styles {
        let body = body
            .as_object()
            .ok_or_else(|| ContentError::StyleNotObject(style.clone()))?;
        if let Some(missing) = REQUIRED_STYLE_KEYS.iter().find(|k| !body.contains_key(**k)) {
            return Err(ContentError::MissingStyleKey {
                style: style.clone(),
                key: *missing,
            });
        }
    }
    Ok(())
}

/// Validate a `.properties` resource bundle.
///
/// Invalid UTF-8 is tolerated. Lines end at `\n`, `\r\n` or a lone `\r`.
/// Blank lines and `#`/`!` comments are skipped;
/// every other line needs a `=` or `:` separator.
pub fn validate_properties(content: &[u8]) -> Result<(), ContentError> {
    let text = String::from_utf8_lossy(content).replace("\r\n", "\n");
    for (idx, raw) in text.split(['\n', '\r']).enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        if !line.contains('=') && !line.contains(':') {
            return Err(ContentError::InvalidPropertiesLine { line: idx + 1 });
        }
    }
    Ok(())
}
