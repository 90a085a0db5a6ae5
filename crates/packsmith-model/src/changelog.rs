use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocaleError {
    #[error("Locale must not be empty")]
    Empty,
    #[error("Invalid language subtag in locale \"{input}\"")]
    InvalidLanguage { input: String },
    #[error("Invalid subtag \"{subtag}\" in locale \"{input}\"")]
    InvalidSubtag { input: String, subtag: String },
}

/// Culture tag such as `en`, `de-AT` or `zh-Hans-CN`, stored normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    #[must_use]
    pub fn english() -> Self {
        Self("en".to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_english(&self) -> bool {
        self.0 == "en"
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(LocaleError::Empty);
        }

        let mut parts = input.split(['-', '_']);
        let language = parts.next().unwrap_or_default();
        if !(2..=3).contains(&language.len()) || !language.bytes().all(|b| b.is_ascii_alphabetic())
        {
            return Err(LocaleError::InvalidLanguage {
                input: input.to_string(),
            });
        }

        let mut normalized = language.to_ascii_lowercase();
        for (position, subtag) in parts.enumerate() {
            let valid = position < 2
                && (2..=4).contains(&subtag.len())
                && subtag.bytes().all(|b| b.is_ascii_alphanumeric());
            if !valid {
                return Err(LocaleError::InvalidSubtag {
                    input: input.to_string(),
                    subtag: subtag.to_string(),
                });
            }

            normalized.push('-');
            if subtag.len() == 4 && subtag.bytes().all(|b| b.is_ascii_alphabetic()) {
                // Script subtags are title case: Hans, Latn.
                let lower = subtag.to_ascii_lowercase();
                normalized.push_str(&lower[..1].to_ascii_uppercase());
                normalized.push_str(&lower[1..]);
            } else {
                normalized.push_str(&subtag.to_ascii_uppercase());
            }
        }

        Ok(Self(normalized))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.0
    }
}

/// Release notes per culture. The English entry is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Changelog(BTreeMap<Locale, String>);

impl Changelog {
    #[must_use]
    pub fn new(english: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(Locale::english(), english.into());
        Self(map)
    }

    /// Stores `text` for `locale`. Empty translations are not kept; the
    /// English entry is always stored so validation can report it.
    pub fn set(&mut self, locale: Locale, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.trim().is_empty() && !locale.is_english() {
            self.0.remove(&locale);
            return false;
        }
        self.0.insert(locale, text);
        true
    }

    #[must_use]
    pub fn get(&self, locale: &Locale) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    #[must_use]
    pub fn english(&self) -> &str {
        self.get(&Locale::english()).unwrap_or_default()
    }

    /// Removes a translation. The English entry cannot be removed.
    pub fn remove(&mut self, locale: &Locale) -> bool {
        if locale.is_english() {
            return false;
        }
        self.0.remove(locale).is_some()
    }

    /// Drops translations whose text is blank.
    pub fn prune_empty(&mut self) {
        self.0
            .retain(|locale, text| locale.is_english() || !text.trim().is_empty());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Locale, &str)> {
        self.0.iter().map(|(locale, text)| (locale, text.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// # Errors
    /// Returns [`ValidationError::MissingEnglishChangelog`] when the English
    /// text is missing or blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.english().trim().is_empty() {
            Err(ValidationError::MissingEnglishChangelog)
        } else {
            Ok(())
        }
    }
}
