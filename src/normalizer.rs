use image::{ImageBuffer, Luma};
use ndarray::{Array, ArrayBase, ArrayView2, Data, Dimension};
use rayon::prelude::*;

/// Map samples onto `[0, 1]` with `(x - min) / (max - min)`.
///
/// A flat image (`max == min`) is returned unchanged.
pub fn normalize<S, D>(image: &ArrayBase<S, D>) -> Array<f32, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let (min, max) = image
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        });

    let mut normalized = image.to_owned();
    if max > min {
        let range = max - min;
        normalized.par_mapv_inplace(|v| (v - min) / range);
    }
    normalized
}

/// Render a slice as 8-bit grayscale after normalizing it.
pub fn to_luma8(slice: &ArrayView2<'_, f32>) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
    let (height, width) = slice.dim();
    let normalized = normalize(slice);
    let pixel_data: Vec<u8> = normalized
        .iter()
        .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
        .collect();
    ImageBuffer::from_raw(width as u32, height as u32, pixel_data)
}
