//! # DICOM-catalog library
//!
//! This crate turns a directory tree of DICOM files into an in-memory catalog
//! of studies, series and pixel volumes.
//!
//! Built on the dicom-rs ecosystem. Loading runs in a single batch:
//!  - every file under the root is opened header-only and grouped by
//!    Study Instance UID and Series Instance UID; files that are not DICOM
//!    or lack those UIDs are skipped
//!  - each series is decoded into an `ndarray::Array3<f32>` of shape
//!    (slices, rows, columns), with the modality LUT (rescale) applied. If
//!    the environment supports it the slices are decoded in parallel
//!    using rayon
//!  - patient, study, series and per-slice image metadata are extracted with
//!    documented defaults for absent tags
//!
//! A series whose slices differ in size is dropped from its study. Slices
//! keep the order the files were found in unless a [`SortBy`] is requested.
//!
//! # Examples
//!
//! ## Loading a directory and rendering a slice
//!
//! ```no_run
//! # use dicom_catalog::{load_catalog, normalizer};
//! let catalog = load_catalog("dicom");
//! for (study_uid, study) in catalog.studies() {
//!     for (series_uid, series) in study.series() {
//!         let middle = series.slice_count() / 2;
//!         let slice = series.volume().slice(middle).expect("slice should be in range");
//!         let normalized = normalizer::normalize(&slice);
//!         println!("{study_uid}/{series_uid}: {:?}", normalized.dim());
//!     }
//! }
//! ```

pub mod catalog;
pub mod enums;
pub mod file_organizer;
pub mod metadata;
pub mod normalizer;
pub mod options;
pub mod report;
pub mod series_loader;
pub mod study_assembler;
pub mod tag_reader;
pub mod volume;

#[cfg(test)]
mod testing;

pub use catalog::{Catalog, Series, Study};
pub use enums::SortBy;
pub use file_organizer::{FileGrouping, OrganizeError, organize};
pub use metadata::{ImageMetadata, PatientMetadata, SeriesMetadata, StudyMetadata};
pub use options::LoadOptions;
pub use series_loader::{SeriesLoader, SeriesLoaderError};
pub use study_assembler::{StudyAssembler, load_catalog, try_load_catalog};
pub use tag_reader::{MalformedValueError, TagTable, UnreadableFileError};
pub use volume::{Volume, VolumeError};
