//! Plural categories, per-entry plural forms and count classification.
//!
//! A catalog declares which [`PluralRule`] its plural entries follow; the
//! rule maps a count to a [`PluralCategory`], and [`PluralForms::select`]
//! picks the matching template. Optional forms fall back to `other`.

use serde::Deserialize;

/// CLDR plural category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

/// Templates for each plural category of one message.
///
/// `one` and `other` are required; the rest are only present for
/// languages that distinguish them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PluralForms {
    pub zero: Option<String>,
    pub one: String,
    pub two: Option<String>,
    pub few: Option<String>,
    pub many: Option<String>,
    pub other: String,
}

impl PluralForms {
    /// Template for `category`, falling back to `other` when the form is
    /// absent or empty.
    ///
    /// May still return `""` when `other` itself is empty.
    #[must_use]
    pub fn select(&self, category: PluralCategory) -> &str {
        let form = match category {
            PluralCategory::Zero => self.zero.as_deref(),
            PluralCategory::One => Some(self.one.as_str()),
            PluralCategory::Two => self.two.as_deref(),
            PluralCategory::Few => self.few.as_deref(),
            PluralCategory::Many => self.many.as_deref(),
            PluralCategory::Other => None,
        };
        form.filter(|s| !s.is_empty()).unwrap_or(&self.other)
    }

    /// Whether no form carries a translation.
    #[must_use]
    pub fn is_untranslated(&self) -> bool {
        self.one.is_empty()
            && self.other.is_empty()
            && [&self.zero, &self.two, &self.few, &self.many]
                .into_iter()
                .all(|form| form.as_deref().is_none_or(str::is_empty))
    }

    /// Drop optional forms that are present but empty.
    #[must_use]
    pub fn without_empty_forms(mut self) -> Self {
        for form in [&mut self.zero, &mut self.two, &mut self.few, &mut self.many] {
            if form.as_deref() == Some("") {
                *form = None;
            }
        }
        self
    }
}

/// Count classification rule declared by a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluralRule {
    /// `one` for 1, `other` otherwise (also German, Spanish, Italian, ...).
    #[default]
    English,
    /// `one` for 0 and 1.
    French,
    /// Russian/Ukrainian/Belarusian: `one`, `few`, `many`.
    EastSlavic,
    /// All six categories.
    Arabic,
    /// No plural distinction (Japanese, Chinese, Korean, ...).
    Invariant,
}

impl PluralRule {
    /// Classify `count`. Negative counts classify by magnitude.
    #[must_use]
    pub fn categorize(self, count: i64) -> PluralCategory {
        let n = count.unsigned_abs();
        match self {
            Self::English => {
                if n == 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            Self::French => {
                if n <= 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            Self::EastSlavic => {
                let (n10, n100) = (n % 10, n % 100);
                if n10 == 1 && n100 != 11 {
                    PluralCategory::One
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Many
                }
            }
            Self::Arabic => match (n, n % 100) {
                (0, _) => PluralCategory::Zero,
                (1, _) => PluralCategory::One,
                (2, _) => PluralCategory::Two,
                (_, 3..=10) => PluralCategory::Few,
                (_, 11..=99) => PluralCategory::Many,
                _ => PluralCategory::Other,
            },
            Self::Invariant => PluralCategory::Other,
        }
    }
}
