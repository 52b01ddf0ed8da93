//! Target lookup by label

use crate::label::Label;
use crate::target::Target;
use std::collections::HashMap;
use std::sync::Arc;

/// A label has no corresponding target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "no such target '{label}': target '{}' not declared in package '{}'",
    .label.name(),
    .label.package()
)]
pub struct TargetNotFound {
    /// Label that failed to resolve
    pub label: Label,
}

/// Read-only access to loaded targets.
///
/// Implementations are shared between query workers, so lookups must not
/// require exclusive access.
pub trait TargetStore: Send + Sync {
    /// Resolve a label to its target.
    ///
    /// # Errors
    ///
    /// Returns [`TargetNotFound`] when no target has this label.
    fn target(&self, label: &Label) -> Result<Arc<Target>, TargetNotFound>;

    /// Whether a target with this label exists.
    fn contains(&self, label: &Label) -> bool {
        self.target(label).is_ok()
    }
}

/// Targets held in memory, keyed by label.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTargetStore {
    targets: HashMap<Label, Arc<Target>>,
}

impl InMemoryTargetStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target, returning the one it replaced.
    pub fn insert(&mut self, target: impl Into<Target>) -> Option<Arc<Target>> {
        let target = target.into();
        let label = target.label().clone();
        tracing::trace!(%label, kind = target.kind(), "Adding target to store");
        self.targets.insert(label, Arc::new(target))
    }

    /// Number of targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the store has no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// All labels, sorted.
    #[must_use]
    pub fn labels(&self) -> Vec<&Label> {
        let mut labels: Vec<&Label> = self.targets.keys().collect();
        labels.sort();
        labels
    }
}

impl<T: Into<Target>> FromIterator<T> for InMemoryTargetStore {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut store = Self::new();
        for target in iter {
            let _ = store.insert(target);
        }
        store
    }
}

impl TargetStore for InMemoryTargetStore {
    fn target(&self, label: &Label) -> Result<Arc<Target>, TargetNotFound> {
        self.targets
            .get(label)
            .cloned()
            .ok_or_else(|| TargetNotFound {
                label: label.clone(),
            })
    }

    fn contains(&self, label: &Label) -> bool {
        self.targets.contains_key(label)
    }
}
