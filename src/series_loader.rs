use crate::{
    catalog::Series,
    enums::SortBy,
    metadata::{extract_image_metadata, extract_series_metadata},
    options::LoadOptions,
    tag_reader::{TagTable, UnreadableFileError},
    volume::{Volume, VolumeError},
};

use dicom::{
    object::open_file,
    pixeldata::{ConvertOptions, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use log::{debug, warn};
use ndarray::{Array2, s};
use rayon::prelude::*;
use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeriesLoaderError {
    #[error("No files in series")]
    Empty,

    #[error(transparent)]
    Unreadable(#[from] UnreadableFileError),

    #[error("Could not decode pixel data of {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error(transparent)]
    Volume(#[from] VolumeError),
}

impl SeriesLoaderError {
    fn decode(path: &Path, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

struct Slice {
    path: PathBuf,
    header: TagTable,
}

pub struct SeriesLoader;

impl SeriesLoader {
    /// Load one series, or `None` if it cannot be turned into a volume.
    ///
    /// The failure is logged; the caller drops the series.
    pub fn load(paths: &[impl AsRef<Path>], options: &LoadOptions) -> Option<Series> {
        match Self::try_load(paths, options) {
            Ok(series) => Some(series),
            Err(err) => {
                warn!("Error loading series: {err}");
                None
            }
        }
    }

    /// Load one series from the files in `paths`.
    ///
    /// Slice `i` of the volume and entry `i` of the image metadata come from
    /// the same file. With [`SortBy::None`] that is `paths[i]`.
    ///
    /// # Errors
    ///
    /// Returns error if a header cannot be read, a pixel payload cannot be
    /// decoded, or the slices differ in size
    pub fn try_load(
        paths: &[impl AsRef<Path>],
        options: &LoadOptions,
    ) -> Result<Series, SeriesLoaderError> {
        if paths.is_empty() {
            return Err(SeriesLoaderError::Empty);
        }

        let mut slices = paths
            .iter()
            .map(|path| -> Result<Slice, SeriesLoaderError> {
                let path = path.as_ref();
                Ok(Slice {
                    path: path.to_path_buf(),
                    header: TagTable::read_header(path)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::sort_slices(&mut slices, options.sort_by);

        let images = Self::decode_images(&slices, options.parallel_decode)?;
        let volume = Volume::stack(&images)?;

        let metadata = extract_series_metadata(&slices[0].header);
        let image_metadata = slices
            .iter()
            .enumerate()
            .map(|(index, slice)| extract_image_metadata(&slice.header, index))
            .collect();

        debug!(
            "Loaded series {} with volume {:?}",
            metadata.series_instance_uid,
            volume.dim()
        );
        Ok(Series::new(metadata, image_metadata, volume))
    }

    fn decode_images(
        slices: &[Slice],
        parallel: bool,
    ) -> Result<Vec<Array2<f32>>, SeriesLoaderError> {
        let paths: Vec<&Path> = slices.iter().map(|slice| slice.path.as_path()).collect();
        if parallel {
            paths.par_iter().map(|path| Self::decode_image(path)).collect()
        } else {
            paths.iter().map(|path| Self::decode_image(path)).collect()
        }
    }

    /// Decode the first frame of a record into modality units.
    fn decode_image(path: &Path) -> Result<Array2<f32>, SeriesLoaderError> {
        let dicom_object = open_file(path).map_err(|e| SeriesLoaderError::decode(path, e))?;
        let pixel_data = dicom_object
            .decode_pixel_data()
            .map_err(|e| SeriesLoaderError::decode(path, e))?;
        let options = ConvertOptions::new().with_voi_lut(VoiLutOption::Identity);
        pixel_data
            .to_ndarray_with_options::<f32>(&options)
            .map(|arr| arr.slice_move(s![0, .., .., 0]))
            .map_err(|e| SeriesLoaderError::decode(path, e))
    }

    fn get_sort_order(header: &TagTable, sort_by: SortBy) -> Option<f64> {
        match sort_by {
            SortBy::None => None,
            SortBy::InstanceNumber => header
                .lookup::<i32>(tags::INSTANCE_NUMBER)
                .ok()
                .flatten()
                .map(f64::from),
            SortBy::SliceLocation => header.lookup::<f64>(tags::SLICE_LOCATION).ok().flatten(),
            SortBy::ImagePositionPatient => header
                .get(tags::IMAGE_POSITION_PATIENT, Vec::<f64>::new())
                .get(2)
                .map(|z| -z),
        }
    }

    /// Stable sort; slices without a key go last.
    fn sort_slices(slices: &mut Vec<Slice>, sort_by: SortBy) {
        if matches!(sort_by, SortBy::None) {
            return;
        }

        let mut keyed: Vec<_> = slices
            .drain(..)
            .map(|slice| (Self::get_sort_order(&slice.header, sort_by), slice))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        slices.extend(keyed.into_iter().map(|(_, slice)| slice));
    }
}
