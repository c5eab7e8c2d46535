// src/core/selector.rs
//! Item selection by identifier or tag

use crate::types::Resume;
use std::collections::HashSet;

/// Which bullets and leadership entries to include in a render.
///
/// `Unfiltered` includes everything. `Subset` includes exactly the listed ids,
/// so an empty subset selects nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unfiltered,
    Subset(HashSet<String>),
}

impl Selection {
    /// Select the given ids verbatim. Ids are not checked against the resume.
    pub fn by_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: HashSet<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            Selection::Unfiltered
        } else {
            Selection::Subset(ids)
        }
    }

    /// Select every bullet and leadership entry carrying at least one of the tags
    pub fn by_tags<S: AsRef<str>>(resume: &Resume, tags: &[S]) -> Self {
        if tags.is_empty() {
            return Selection::Unfiltered;
        }

        let wanted: HashSet<&str> = tags.iter().map(AsRef::as_ref).collect();
        let selected = resume
            .all_items()
            .into_iter()
            .filter(|item| item.tags.iter().any(|tag| wanted.contains(tag.as_str())))
            .map(|item| item.id.to_string())
            .collect();

        Selection::Subset(selected)
    }

    pub fn is_unfiltered(&self) -> bool {
        matches!(self, Selection::Unfiltered)
    }

    pub fn includes(&self, id: &str) -> bool {
        match self {
            Selection::Unfiltered => true,
            Selection::Subset(ids) => ids.contains(id),
        }
    }

    /// Number of bullets and leadership entries in the resume this selection keeps
    pub fn matched_count(&self, resume: &Resume) -> usize {
        resume
            .all_items()
            .iter()
            .filter(|item| self.includes(item.id))
            .count()
    }
}
