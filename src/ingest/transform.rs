use crate::error::IngestError;
use crate::models::{LanguageBreakdown, LanguageStats, RawRepository, Repository};

/// Build the cached record for one repository. Byte counts are copied as-is and
/// language names are not normalized.
pub fn transform(
    raw: RawRepository,
    languages: LanguageBreakdown,
) -> Result<Repository, IngestError> {
    let label = if raw.full_name.is_empty() {
        format!("{}/{}", raw.owner.login, raw.name)
    } else {
        raw.full_name.clone()
    };

    if raw.full_name.is_empty() {
        return Err(IngestError::transform(&label, "missing full_name"));
    }
    if raw.owner.login.is_empty() {
        return Err(IngestError::transform(&label, "missing owner login"));
    }
    if raw.name.is_empty() {
        return Err(IngestError::transform(&label, "missing name"));
    }
    let created_at = raw
        .created_at
        .ok_or_else(|| IngestError::transform(&label, "missing created_at"))?;
    let updated_at = raw
        .updated_at
        .ok_or_else(|| IngestError::transform(&label, "missing updated_at"))?;

    let languages = languages
        .into_iter()
        .map(|(lang, bytes)| (lang, LanguageStats { bytes }))
        .collect();

    Ok(Repository {
        full_name: raw.full_name,
        owner: raw.owner.login,
        repository: raw.name,
        languages,
        license: raw.license.and_then(|l| l.name).unwrap_or_default(),
        created_at,
        updated_at,
        pushed_at: raw.pushed_at,
        stars: raw.stargazers_count,
        forks: raw.forks_count,
        issues: raw.open_issues_count,
    })
}
