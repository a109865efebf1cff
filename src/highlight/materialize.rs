//! Turn committed search results into highlight annotation requests.

use super::Definitions;
use crate::annotations::HighlightAnnotation;
use crate::search::{ResultStore, TermId};
use indexmap::IndexMap;

/// Settings applied to every materialized highlight.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializeOptions {
    /// Author stamped on each annotation
    pub author: Option<String>,
    /// Highlight opacity (0.0 = transparent, 1.0 = opaque)
    pub opacity: f32,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            author: None,
            opacity: 1.0,
        }
    }
}

impl MaterializeOptions {
    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

/// Build highlights grouped by term.
///
/// Only terms present in both `store` and `definitions` appear. Terms with
/// no matches are left out entirely, and matches with no quads are skipped
/// one by one.
pub fn materialize_by_term(
    store: &ResultStore,
    definitions: &Definitions,
    options: &MaterializeOptions,
) -> IndexMap<TermId, Vec<HighlightAnnotation>> {
    let mut by_term = IndexMap::new();

    for (term_id, group) in store.iter() {
        let Some(definition) = definitions.get(term_id) else {
            log::debug!("term '{}' has results but no definition, skipping", term_id);
            continue;
        };
        if group.is_empty() {
            log::debug!("term '{}' has no matches", term_id);
            continue;
        }

        let color = definition.color.to_annotation_color();
        let highlights: Vec<HighlightAnnotation> = group
            .entries()
            .iter()
            .filter(|entry| !entry.quads.is_empty())
            .map(|entry| {
                let mut highlight =
                    HighlightAnnotation::new(entry.page_number, entry.quads.clone(), color)
                        .with_opacity(options.opacity)
                        .with_term_id(term_id.clone());
                if let Some(author) = &options.author {
                    highlight = highlight.with_author(author.clone());
                }
                highlight
            })
            .collect();

        if highlights.is_empty() {
            continue;
        }
        by_term.insert(term_id.clone(), highlights);
    }

    for term_id in definitions.keys() {
        if !store.contains(term_id.as_str()) {
            log::debug!("term '{}' has a definition but no results", term_id);
        }
    }

    by_term
}

/// Build the flat list of highlights for every term, in store order.
pub fn materialize(
    store: &ResultStore,
    definitions: &Definitions,
    options: &MaterializeOptions,
) -> Vec<HighlightAnnotation> {
    materialize_by_term(store, definitions, options)
        .into_values()
        .flatten()
        .collect()
}
