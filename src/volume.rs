use ndarray::{Array2, Array3, ArrayView2, s};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum VolumeError {
    #[error("No slices to stack")]
    Empty,

    #[error("Inconsistent image dimensions: slice {index} is {found:?}, expected {expected:?}")]
    InconsistentDimensions {
        index: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },
}

/// Pixel samples of one series, laid out as (slices, rows, columns).
#[derive(Debug, Clone, Default)]
pub struct Volume {
    data: Array3<f32>,
}

impl Volume {
    pub fn new(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// Stack equally sized slices in the order given.
    pub fn stack(images: &[Array2<f32>]) -> Result<Self, VolumeError> {
        let first = images.first().ok_or(VolumeError::Empty)?;
        Self::validate_dimensions(images)?;

        let (height, width) = first.dim();
        let mut data = Array3::<f32>::zeros((images.len(), height, width));
        for (i, image) in images.iter().enumerate() {
            data.slice_mut(s![i, .., ..]).assign(image);
        }

        Ok(Self::new(data))
    }

    /// Get the dimensions of the volume (slices, rows, columns)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn slice_count(&self) -> usize {
        self.data.dim().0
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// The slice at `index`, or `None` when out of range.
    pub fn slice(&self, index: usize) -> Option<ArrayView2<'_, f32>> {
        self.is_valid_index(index)
            .then(|| self.data.slice(s![index, .., ..]))
    }

    pub fn slices(&self) -> impl Iterator<Item = ArrayView2<'_, f32>> {
        self.data.outer_iter()
    }

    fn is_valid_index(&self, index: usize) -> bool {
        index < self.slice_count()
    }

    fn validate_dimensions(images: &[Array2<f32>]) -> Result<(), VolumeError> {
        let expected = images[0].dim();
        match images.iter().position(|img| img.dim() != expected) {
            Some(index) => Err(VolumeError::InconsistentDimensions {
                index,
                expected,
                found: images[index].dim(),
            }),
            None => Ok(()),
        }
    }
}
