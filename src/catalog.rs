use crate::{
    metadata::{ImageMetadata, SeriesMetadata, StudyMetadata},
    volume::Volume,
};
use std::collections::BTreeMap;

/// One acquisition run: its metadata, per-slice metadata and pixel volume.
///
/// `image_metadata()[i]` and `volume().slice(i)` describe the same slice.
#[derive(Debug, Clone)]
pub struct Series {
    metadata: SeriesMetadata,
    image_metadata: Vec<ImageMetadata>,
    volume: Volume,
}

impl Series {
    pub(crate) fn new(
        metadata: SeriesMetadata,
        image_metadata: Vec<ImageMetadata>,
        volume: Volume,
    ) -> Self {
        debug_assert_eq!(image_metadata.len(), volume.slice_count());
        Self {
            metadata,
            image_metadata,
            volume,
        }
    }

    pub fn metadata(&self) -> &SeriesMetadata {
        &self.metadata
    }

    pub fn image_metadata(&self) -> &[ImageMetadata] {
        &self.image_metadata
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn slice_count(&self) -> usize {
        self.image_metadata.len()
    }
}

#[derive(Debug, Clone)]
pub struct Study {
    metadata: StudyMetadata,
    series: BTreeMap<String, Series>,
}

impl Study {
    pub fn new(metadata: StudyMetadata) -> Self {
        Self {
            metadata,
            series: BTreeMap::new(),
        }
    }

    pub fn metadata(&self) -> &StudyMetadata {
        &self.metadata
    }

    /// Series keyed by Series Instance UID.
    pub fn series(&self) -> &BTreeMap<String, Series> {
        &self.series
    }

    pub fn series_by_uid(&self, series_uid: &str) -> Option<&Series> {
        self.series.get(series_uid)
    }

    pub(crate) fn insert_series(&mut self, series_uid: String, series: Series) {
        self.series.insert(series_uid, series);
    }
}

/// Every study found under one root directory, keyed by Study Instance UID.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    studies: BTreeMap<String, Study>,
}

impl Catalog {
    pub fn studies(&self) -> &BTreeMap<String, Study> {
        &self.studies
    }

    pub fn study(&self, study_uid: &str) -> Option<&Study> {
        self.studies.get(study_uid)
    }

    pub fn len(&self) -> usize {
        self.studies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.studies.is_empty()
    }

    pub fn series_count(&self) -> usize {
        self.studies.values().map(|study| study.series.len()).sum()
    }

    pub fn slice_count(&self) -> usize {
        self.studies
            .values()
            .flat_map(|study| study.series.values())
            .map(Series::slice_count)
            .sum()
    }

    pub(crate) fn insert_study(&mut self, study_uid: String, study: Study) {
        self.studies.insert(study_uid, study);
    }
}
