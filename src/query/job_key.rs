use crate::storage::validate_key;
use url::Url;

/// Identifies one candidate's harvest
///
/// `stem` names the checkpoint (`Abraham_Lincoln_1860-07-01_1860-11-15`);
/// `name` is the searched name with underscores and is stamped onto every
/// record of the job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub stem: String,
    pub name: String,
}

impl std::fmt::Display for JobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.stem)
    }
}

/// Derives the job key from a search URL
///
/// Reads `start_date`, `end_date`, and the first quoted name of `qs`.
/// Returns `None` if any of the three is missing or the resulting stem is not
/// a usable checkpoint key.
pub fn derive_job_key(query_url: &Url) -> Option<JobKey> {
    let mut start = None;
    let mut end = None;
    let mut name = None;

    for (key, value) in query_url.query_pairs() {
        match key.as_ref() {
            "start_date" => start = Some(value.into_owned()),
            "end_date" => end = Some(value.into_owned()),
            "qs" => name = first_quoted(&value),
            _ => {}
        }
    }

    let name = name?.replace(' ', "_");
    let stem = format!("{}_{}_{}", name, start?, end?);
    validate_key(&stem).ok()?;

    Some(JobKey { stem, name })
}

fn first_quoted(terms: &str) -> Option<String> {
    let rest = terms.split_once('"')?.1;
    let (quoted, _) = rest.split_once('"')?;
    if quoted.is_empty() {
        None
    } else {
        Some(quoted.to_string())
    }
}
