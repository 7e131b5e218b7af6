//! Output registry: stage forest, content set and stream bookkeeping.
//!
//! The server uses a registry to validate what it is about to send; the
//! client keeps a mirror of the same registry to validate what it receives.
//!
//! # Invariants
//!
//! - Stage ids are unique and the parent links form a forest
//! - Every content belongs to a registered stage
//! - Content is associated with data at most once
//! - Every open stream belongs to associated content

use std::collections::{HashMap, HashSet};

use stagewire_proto::{Content, Id};

use crate::{StateError, detect_cycle};

/// Stages, content and stream state of one request.
#[derive(Debug, Clone, Default)]
pub struct OutputRegistry {
    /// Stage id to parent id
    stages: HashMap<Id, Option<Id>>,
    /// Content by id
    contents: HashMap<Id, Content>,
    /// Content with a stream currently open
    open: HashSet<Id>,
    /// Content that has (or is receiving) its data
    associated: HashSet<Id>,
}

impl OutputRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage under an optional parent.
    ///
    /// # Errors
    ///
    /// `DuplicateId`, then `CircularHierarchy` (only possible when a stage
    /// names itself), then `UnknownReference` for a missing parent.
    pub fn add_stage(&mut self, id: Id, parent: Option<Id>) -> Result<(), StateError> {
        if self.stages.contains_key(&id) {
            return Err(StateError::DuplicateId(id));
        }
        self.check_parent(id, parent)?;

        self.stages.insert(id, parent);
        Ok(())
    }

    /// Move a registered stage under a new parent (or to the root).
    pub fn reparent(&mut self, id: Id, parent: Option<Id>) -> Result<(), StateError> {
        if !self.stages.contains_key(&id) {
            return Err(StateError::UnknownReference(id));
        }
        self.check_parent(id, parent)?;

        self.stages.insert(id, parent);
        Ok(())
    }

    fn check_parent(&self, id: Id, parent: Option<Id>) -> Result<(), StateError> {
        let Some(parent) = parent else {
            return Ok(());
        };

        if detect_cycle(|node| self.parent_of(node), id, Some(parent)) {
            return Err(StateError::CircularHierarchy { stage: id, parent });
        }
        if !self.stages.contains_key(&parent) {
            return Err(StateError::UnknownReference(parent));
        }
        Ok(())
    }

    /// Register content under its stage.
    pub fn add_content(&mut self, content: Content) -> Result<(), StateError> {
        if self.contents.contains_key(&content.id) {
            return Err(StateError::DuplicateId(content.id));
        }
        if !self.stages.contains_key(&content.stage_id) {
            return Err(StateError::UnknownReference(content.stage_id));
        }

        self.contents.insert(content.id, content);
        Ok(())
    }

    /// Open a stream for content; the content is associated from now on.
    ///
    /// # Errors
    ///
    /// `UnknownReference`, `UnsupportedStreamingType`, `StreamAlreadyOpen`,
    /// `AlreadyAssociated`, checked in that order.
    pub fn open_stream(&mut self, id: Id) -> Result<(), StateError> {
        let content = self.contents.get(&id).ok_or(StateError::UnknownReference(id))?;
        if !content.kind.content_type().is_streamable() {
            return Err(StateError::UnsupportedStreamingType(id));
        }
        if self.open.contains(&id) {
            return Err(StateError::StreamAlreadyOpen(id));
        }
        if self.associated.contains(&id) {
            return Err(StateError::AlreadyAssociated(id));
        }

        self.open.insert(id);
        self.associated.insert(id);
        Ok(())
    }

    /// Close an open stream.
    pub fn close_stream(&mut self, id: Id) -> Result<(), StateError> {
        if !self.open.remove(&id) {
            return Err(StateError::StreamNotOpen(id));
        }
        Ok(())
    }

    /// Record single-shot data for content.
    pub fn mark_has_data(&mut self, id: Id) -> Result<(), StateError> {
        if !self.contents.contains_key(&id) {
            return Err(StateError::UnknownReference(id));
        }
        if !self.associated.insert(id) {
            return Err(StateError::AlreadyAssociated(id));
        }
        Ok(())
    }

    /// Record that data arrived for content, tolerating repeats.
    ///
    /// A receiver cannot tell a streamed chunk from a single-shot payload, so
    /// the mirror only requires that the content exists.
    pub fn observe_data(&mut self, id: Id) -> Result<(), StateError> {
        if !self.contents.contains_key(&id) {
            return Err(StateError::UnknownReference(id));
        }
        self.associated.insert(id);
        Ok(())
    }

    /// Check that output may end.
    ///
    /// # Errors
    ///
    /// `StreamStillOpen` naming every open stream, otherwise
    /// `IncompleteContent` naming every content without data. Ids are sorted.
    pub fn check_complete(&self) -> Result<(), StateError> {
        if !self.open.is_empty() {
            let mut open: Vec<Id> = self.open.iter().copied().collect();
            open.sort_unstable();
            return Err(StateError::StreamStillOpen(open));
        }

        let mut missing: Vec<Id> =
            self.contents.keys().filter(|id| !self.associated.contains(id)).copied().collect();
        if !missing.is_empty() {
            missing.sort_unstable();
            return Err(StateError::IncompleteContent(missing));
        }

        Ok(())
    }

    /// Drop every stage, content and stream.
    pub fn clear(&mut self) {
        self.stages.clear();
        self.contents.clear();
        self.open.clear();
        self.associated.clear();
    }

    /// Parent of a registered stage; `None` for roots and unknown stages.
    pub fn parent_of(&self, id: Id) -> Option<Id> {
        self.stages.get(&id).copied().flatten()
    }

    /// Whether a stage is registered.
    pub fn has_stage(&self, id: Id) -> bool {
        self.stages.contains_key(&id)
    }

    /// Registered content by id.
    pub fn content(&self, id: Id) -> Option<&Content> {
        self.contents.get(&id)
    }

    /// Whether a stream is open for the content.
    pub fn is_open(&self, id: Id) -> bool {
        self.open.contains(&id)
    }

    /// Whether the content has its data.
    pub fn has_data(&self, id: Id) -> bool {
        self.associated.contains(&id)
    }

    /// Number of registered stages.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Number of registered content items.
    pub fn content_count(&self) -> usize {
        self.contents.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty() && self.contents.is_empty()
    }
}
