/// Options for [`super::PageEditor`].
#[derive(Clone, Debug)]
pub struct PageEditorOptions {
    /// Fraction of a hovered element's height forming the `before` band.
    ///
    /// Pointer positions above this band resolve to "insert as previous
    /// sibling". This is a UX tunable, not a semantic requirement.
    pub drop_before_fraction: f32,

    /// Fraction of a hovered element's height where the `after` band starts.
    ///
    /// Pointer positions below it resolve to "insert as next sibling". The
    /// middle band between the two fractions resolves to `inside` for
    /// container-capable elements and falls back to `after` otherwise.
    pub drop_after_fraction: f32,

    /// Thickness (in points) of the `before`/`after` edge strips a visible
    /// element publishes as drop zones: just enough to disambiguate the
    /// two siblings without requiring pixel-perfect aim. Clamped so the two
    /// strips never cover more than the element's box.
    pub edge_strip_thickness: f32,

    /// Maximum number of undo snapshots to keep.
    pub max_undo_depth: usize,

    /// If true, run tree integrity checks after every mutation (debug-only).
    pub debug_integrity: bool,

    /// If true, panic on integrity issues (debug-only).
    pub debug_integrity_panic: bool,

    /// If true, record drag/drop/mutation events in a small ring buffer.
    pub debug_event_log: bool,

    /// Maximum number of debug log lines to keep (ring buffer).
    pub debug_event_log_capacity: usize,
}

impl Default for PageEditorOptions {
    fn default() -> Self {
        Self {
            drop_before_fraction: 0.25,
            drop_after_fraction: 0.75,
            edge_strip_thickness: 6.0,
            max_undo_depth: 100,
            debug_integrity: false,
            debug_integrity_panic: false,
            debug_event_log: false,
            debug_event_log_capacity: 200,
        }
    }
}

impl PageEditorOptions {
    /// The two band fractions, clamped into `0.0..=1.0` and kept ordered
    /// even with hostile values.
    pub(crate) fn drop_bands(&self) -> (f32, f32) {
        let before = self.drop_before_fraction.clamp(0.0, 1.0);
        let after = self.drop_after_fraction.clamp(before, 1.0);
        (before, after)
    }
}
