use crate::core::Issue;

/// Pure projection, no model call. Keeps the original order and never
/// invents or duplicates issues; a missing decision counts as included.
pub fn select(issues: &[Issue], included: &[bool]) -> Vec<Issue> {
    issues
        .iter()
        .enumerate()
        .filter(|(i, _)| included.get(*i).copied().unwrap_or(true))
        .map(|(_, issue)| issue.clone())
        .collect()
}
