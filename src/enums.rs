/// Order in which the slices of a series are stacked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Keep the order the files were found in.
    #[default]
    None,
    InstanceNumber,
    SliceLocation,
    /// Descending z component of Image Position (Patient).
    ImagePositionPatient,
}
