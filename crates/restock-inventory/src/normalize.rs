//! Canonical product codes.
//!
//! Equivalent SKUs such as `X-REC` and `X-1` collapse onto `X`. At most one
//! suffix is removed: `ABC-R-R` becomes `ABC-R`, not `ABC`.

use restock_core::ForecastPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeNormalizer {
    suffixes: Vec<String>,
}

impl CodeNormalizer {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let suffixes = suffixes
            .into_iter()
            .map(Into::into)
            .filter(|suffix: &String| !suffix.is_empty())
            .collect();
        Self { suffixes }
    }

    pub fn from_policy(policy: &ForecastPolicy) -> Self {
        Self::new(policy.suffix_set.iter().cloned())
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn normalize(&self, raw: &str) -> String {
        normalize_code(raw, &self.suffixes)
    }

    /// Missing codes stay missing.
    pub fn normalize_optional(&self, raw: Option<&str>) -> Option<String> {
        raw.map(|code| self.normalize(code))
    }
}

impl Default for CodeNormalizer {
    fn default() -> Self {
        Self::from_policy(&ForecastPolicy::default())
    }
}

/// Strips one trailing suffix and surrounding whitespace.
///
/// When several suffixes end the code, the longest one is removed, which is
/// the same choice an end-anchored alternation makes (`X-REC` loses `-REC`,
/// not `REC`).
pub fn normalize_code<S: AsRef<str>>(raw: &str, suffixes: &[S]) -> String {
    let trimmed = raw.trim();
    let stripped = suffixes
        .iter()
        .map(AsRef::as_ref)
        .filter(|suffix| !suffix.is_empty() && trimmed.ends_with(suffix))
        .max_by_key(|suffix| suffix.len())
        .map_or(trimmed, |suffix| &trimmed[..trimmed.len() - suffix.len()]);
    stripped.trim().to_string()
}
