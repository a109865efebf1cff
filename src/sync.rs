//! Replace the engine's annotation layer contents with a new highlight set.
//!
//! The layer does not render newly added annotations on its own, so every
//! sync ends with an explicit redraw of exactly the annotations it added.

use crate::annotations::{Annotation, AnnotationId, HighlightAnnotation};
use crate::engine::AnnotationLayer;
use crate::error::Result;

/// What a sync changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Annotations removed (everything the layer held)
    pub removed: usize,
    /// Ids of the annotations added and redrawn
    pub added: Vec<AnnotationId>,
}

/// Two-phase annotation sync: clear everything, then add and redraw.
pub struct AnnotationSync;

impl AnnotationSync {
    /// Remove every annotation in the layer, then add and redraw `annotations`.
    ///
    /// There is no rollback: if a layer call fails part-way the layer may be
    /// left empty, and the caller re-runs materialize + sync.
    pub fn sync(
        layer: &mut dyn AnnotationLayer,
        annotations: Vec<HighlightAnnotation>,
    ) -> Result<SyncReport> {
        let existing = layer.list_annotations();
        layer.delete_annotations(&existing)?;

        let added = layer.add_annotations(annotations.into_iter().map(Annotation::from).collect())?;
        layer.redraw(&added)?;

        log::debug!("annotation sync: removed {}, added {}", existing.len(), added.len());
        Ok(SyncReport {
            removed: existing.len(),
            added,
        })
    }

    /// Remove every annotation in the layer.
    pub fn clear(layer: &mut dyn AnnotationLayer) -> Result<SyncReport> {
        Self::sync(layer, Vec::new())
    }
}
