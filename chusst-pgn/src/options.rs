/// Deepest variation nesting accepted by default.
///
/// Parsing itself doesn't recurse, but dropping, comparing and printing the
/// resulting tree does, one stack frame group per level.
pub const DEFAULT_MAX_VARIATION_DEPTH: usize = 512;

/// Highest variation depth limit that is honored.
///
/// Larger limits are capped to this value: past it, printing, comparing or
/// serializing a tree could overflow the stack of the main thread.
pub const VARIATION_DEPTH_CEILING: usize = 2048;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// A variation opened deeper than this is a resource error. Capped to
    /// [`VARIATION_DEPTH_CEILING`].
    pub max_variation_depth: usize,
    /// Report `!`, `?`, `!?`... as syntax errors instead of dropping them.
    pub reject_suffix_annotations: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_variation_depth: DEFAULT_MAX_VARIATION_DEPTH,
            reject_suffix_annotations: false,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_variation_depth(mut self, depth: usize) -> Self {
        self.max_variation_depth = depth.min(VARIATION_DEPTH_CEILING);
        self
    }

    pub fn reject_suffix_annotations(mut self, reject: bool) -> Self {
        self.reject_suffix_annotations = reject;
        self
    }

    /// Nesting limit the parser enforces, even when the field was set past
    /// the ceiling directly.
    pub fn variation_depth_limit(&self) -> usize {
        self.max_variation_depth.min(VARIATION_DEPTH_CEILING)
    }
}
