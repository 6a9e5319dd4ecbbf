//! Read-side predicate engine over a published snapshot.
//!
//! A request carries at most one argument per predicate. Query strings can
//! repeat a key, so both constructors keep the FIRST value seen for each
//! predicate and ignore later ones. [`Filters::from_pairs`] takes the
//! predicate names (`language`, `license`, `minStars`);
//! [`Filters::from_query_pairs`] takes the HTTP parameter names (`lang`,
//! `license`, `stars`). Any other name is ignored.

use crate::models::Repository;

/// Parsed `minStars` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarThreshold {
    /// Empty argument: no constraint
    Any,
    AtLeast(i64),
    /// Argument did not parse as an integer; matches nothing
    Invalid,
}

impl StarThreshold {
    pub fn parse(arg: &str) -> Self {
        if arg.is_empty() {
            return Self::Any;
        }
        match arg.parse::<i64>() {
            Ok(n) => Self::AtLeast(n),
            Err(_) => {
                tracing::debug!("Invalid star threshold {arg:?}, treating as non-match");
                Self::Invalid
            }
        }
    }

    fn matches(self, stars: u64) -> bool {
        match self {
            Self::Any => true,
            Self::AtLeast(n) => n <= 0 || stars >= n as u64,
            Self::Invalid => false,
        }
    }
}

/// The predicate set of one request. `None` means the predicate was not
/// supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub language: Option<String>,
    pub license: Option<String>,
    pub min_stars: Option<String>,
}

impl Filters {
    /// Build from predicate-name/argument pairs; first value wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::collect(pairs, ["language", "license", "minStars"])
    }

    /// Build from `/api/search` query parameters in request order; first
    /// value wins.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::collect(pairs, ["lang", "license", "stars"])
    }

    /// `names` are the keys for language, license and star threshold.
    fn collect<I, K, V>(pairs: I, names: [&str; 3]) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let [language, license, min_stars] = names;
        let mut filters = Self::default();
        for (key, value) in pairs {
            let key = key.as_ref();
            let slot = if key == language {
                &mut filters.language
            } else if key == license {
                &mut filters.license
            } else if key == min_stars {
                &mut filters.min_stars
            } else {
                continue;
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        filters
    }

    /// True if the record satisfies every supplied predicate.
    pub fn matches(&self, repo: &Repository) -> bool {
        if let Some(lang) = &self.language {
            if !matches_language(repo, lang) {
                return false;
            }
        }
        if let Some(license) = &self.license {
            if !matches_license(repo, license) {
                return false;
            }
        }
        if let Some(stars) = &self.min_stars {
            if !StarThreshold::parse(stars).matches(repo.stars) {
                return false;
            }
        }
        true
    }
}

/// Order-preserving subset of `repos` matching `filters`.
pub fn filter_repositories(repos: &[Repository], filters: &Filters) -> Vec<Repository> {
    repos
        .iter()
        .filter(|r| filters.matches(r))
        .cloned()
        .collect()
}

/// Exact, case-sensitive key lookup; the language must have a non-zero byte count.
fn matches_language(repo: &Repository, lang: &str) -> bool {
    if lang.is_empty() {
        return true;
    }
    repo.languages.get(lang).is_some_and(|l| l.bytes > 0)
}

/// Case-insensitive substring match on the license name (e.g. `mit`, `GPL`).
fn matches_license(repo: &Repository, license: &str) -> bool {
    if license.is_empty() {
        return true;
    }
    repo.license
        .to_lowercase()
        .contains(&license.to_lowercase())
}
