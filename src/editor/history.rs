use crate::element::PageTree;

/// Bounded, snapshot-based undo/redo stack.
///
/// Every structural mutation and property merge pushes one snapshot of the
/// pre-mutation tree. A drag gesture resolves into a single mutation and is
/// therefore a single undo step; there is no per-operation inverse chain.
#[derive(Clone, Debug)]
pub struct History {
    undo: Vec<PageTree>,
    redo: Vec<PageTree>,
    max_depth: usize,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the state the next mutation is about to replace. Clears the
    /// redo stack; oldest snapshots fall off past `max_depth`.
    pub fn push(&mut self, snapshot: PageTree) {
        self.undo.push(snapshot);
        if self.undo.len() > self.max_depth {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    /// Swap `current` for the most recent snapshot. `false` if there is
    /// nothing to undo.
    pub fn undo(&mut self, current: &mut PageTree) -> bool {
        let Some(snapshot) = self.undo.pop() else {
            return false;
        };
        self.redo.push(std::mem::replace(current, snapshot));
        true
    }

    /// Inverse of [`Self::undo`].
    pub fn redo(&mut self, current: &mut PageTree) -> bool {
        let Some(snapshot) = self.redo.pop() else {
            return false;
        };
        self.undo.push(std::mem::replace(current, snapshot));
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
