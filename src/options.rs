use crate::enums::SortBy;

/// Knobs for one load of a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub sort_by: SortBy,
    /// Decode the slices of a series on the rayon thread pool.
    pub parallel_decode: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sort_by: SortBy::None,
            parallel_decode: true,
        }
    }
}

impl LoadOptions {
    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_parallel_decode(mut self, parallel_decode: bool) -> Self {
        self.parallel_decode = parallel_decode;
        self
    }
}
