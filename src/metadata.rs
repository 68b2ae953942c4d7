//! Patient, study, series and image metadata records.
//!
//! Every extractor is guarded on its own: if any field of a record holds a
//! value that cannot be converted, the failure is logged and the whole record
//! falls back to its default. Absent tags are never an error.

use crate::tag_reader::{MalformedValueError, TagTable};
use dicom_dictionary_std::tags;
use log::error;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientMetadata {
    pub patient_id: String,
    pub patient_name: String,
    pub patient_birth_date: String,
    pub patient_sex: String,
    /// Kept as written, e.g. `"045Y"`.
    pub patient_age: String,
    pub patient_weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudyMetadata {
    pub study_instance_uid: String,
    pub study_date: String,
    pub study_time: String,
    pub accession_number: String,
    pub study_id: String,
    pub study_description: String,
    pub referring_physician_name: String,
    pub patient: PatientMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesMetadata {
    pub series_instance_uid: String,
    pub series_number: i32,
    pub series_date: String,
    pub series_time: String,
    pub series_description: String,
    pub modality: String,
    pub body_part_examined: String,
    pub patient_position: String,
    pub protocol_name: String,
    pub manufacturers_model_name: String,
    pub device_serial_number: String,
}

/// Per-slice metadata.
///
/// The geometry vectors stay empty when their tag is absent, so an absent
/// position can be told apart from one at the origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageMetadata {
    pub sop_instance_uid: String,
    pub instance_number: i32,
    pub acquisition_number: i32,
    pub content_date: String,
    pub content_time: String,
    pub image_position: Vec<f64>,
    pub image_orientation: Vec<f64>,
    pub slice_location: f64,
    pub slice_thickness: f64,
    pub pixel_spacing: Vec<f64>,
    pub rows: u32,
    pub columns: u32,
    pub window_center: f64,
    pub window_width: f64,
    pub rescale_intercept: f64,
    pub rescale_slope: f64,
}

impl Default for ImageMetadata {
    fn default() -> Self {
        Self {
            sop_instance_uid: String::new(),
            instance_number: 0,
            acquisition_number: 0,
            content_date: String::new(),
            content_time: String::new(),
            image_position: Vec::new(),
            image_orientation: Vec::new(),
            slice_location: 0.0,
            slice_thickness: 0.0,
            pixel_spacing: Vec::new(),
            rows: 0,
            columns: 0,
            window_center: 0.0,
            window_width: 0.0,
            rescale_intercept: 0.0,
            rescale_slope: 1.0,
        }
    }
}

fn or_default<T: Default>(kind: &str, extracted: Result<T, MalformedValueError>) -> T {
    extracted.unwrap_or_else(|err| {
        error!("Error extracting {kind} metadata: {err}");
        T::default()
    })
}

pub fn extract_patient_metadata(table: &TagTable) -> PatientMetadata {
    or_default("patient", try_extract_patient(table))
}

pub fn extract_study_metadata(table: &TagTable) -> StudyMetadata {
    or_default("study", try_extract_study(table))
}

pub fn extract_series_metadata(table: &TagTable) -> SeriesMetadata {
    or_default("series", try_extract_series(table))
}

/// Extract the metadata of one slice. `index` is its position in the series
/// and stands in for a missing Instance Number.
pub fn extract_image_metadata(table: &TagTable, index: usize) -> ImageMetadata {
    or_default("image", try_extract_image(table, index))
}

fn try_extract_patient(table: &TagTable) -> Result<PatientMetadata, MalformedValueError> {
    Ok(PatientMetadata {
        patient_id: table.string(tags::PATIENT_ID),
        patient_name: table.string(tags::PATIENT_NAME),
        patient_birth_date: table.string(tags::PATIENT_BIRTH_DATE),
        patient_sex: table.string(tags::PATIENT_SEX),
        patient_age: table.string(tags::PATIENT_AGE),
        patient_weight: table.lookup(tags::PATIENT_WEIGHT)?.unwrap_or(0.0),
    })
}

fn try_extract_study(table: &TagTable) -> Result<StudyMetadata, MalformedValueError> {
    Ok(StudyMetadata {
        study_instance_uid: table.string(tags::STUDY_INSTANCE_UID),
        study_date: table.string(tags::STUDY_DATE),
        study_time: table.string(tags::STUDY_TIME),
        accession_number: table.string(tags::ACCESSION_NUMBER),
        study_id: table.string(tags::STUDY_ID),
        study_description: table.string(tags::STUDY_DESCRIPTION),
        referring_physician_name: table.string(tags::REFERRING_PHYSICIAN_NAME),
        patient: extract_patient_metadata(table),
    })
}

fn try_extract_series(table: &TagTable) -> Result<SeriesMetadata, MalformedValueError> {
    Ok(SeriesMetadata {
        series_instance_uid: table.string(tags::SERIES_INSTANCE_UID),
        series_number: table.lookup(tags::SERIES_NUMBER)?.unwrap_or(0),
        series_date: table.string(tags::SERIES_DATE),
        series_time: table.string(tags::SERIES_TIME),
        series_description: table.string(tags::SERIES_DESCRIPTION),
        modality: table.string(tags::MODALITY),
        body_part_examined: table.string(tags::BODY_PART_EXAMINED),
        patient_position: table.string(tags::PATIENT_POSITION),
        protocol_name: table.string(tags::PROTOCOL_NAME),
        manufacturers_model_name: table.string(tags::MANUFACTURER_MODEL_NAME),
        device_serial_number: table.string(tags::DEVICE_SERIAL_NUMBER),
    })
}

fn try_extract_image(table: &TagTable, index: usize) -> Result<ImageMetadata, MalformedValueError> {
    let fallback_number = i32::try_from(index).unwrap_or(i32::MAX);
    let mut metadata = ImageMetadata {
        sop_instance_uid: table.string(tags::SOP_INSTANCE_UID),
        instance_number: table
            .lookup(tags::INSTANCE_NUMBER)?
            .unwrap_or(fallback_number),
        acquisition_number: table.lookup(tags::ACQUISITION_NUMBER)?.unwrap_or(0),
        content_date: table.string(tags::CONTENT_DATE),
        content_time: table.string(tags::CONTENT_TIME),
        slice_location: table.lookup(tags::SLICE_LOCATION)?.unwrap_or(0.0),
        slice_thickness: table.lookup(tags::SLICE_THICKNESS)?.unwrap_or(0.0),
        rows: table.lookup(tags::ROWS)?.unwrap_or(0),
        columns: table.lookup(tags::COLUMNS)?.unwrap_or(0),
        rescale_intercept: table.lookup(tags::RESCALE_INTERCEPT)?.unwrap_or(0.0),
        rescale_slope: table.lookup(tags::RESCALE_SLOPE)?.unwrap_or(1.0),
        ..ImageMetadata::default()
    };

    if let Some(center) = table.window_value(tags::WINDOW_CENTER)? {
        metadata.window_center = center;
    }
    if let Some(width) = table.window_value(tags::WINDOW_WIDTH)? {
        metadata.window_width = width;
    }

    if let Some(position) = table.lookup(tags::IMAGE_POSITION_PATIENT)? {
        metadata.image_position = position;
    }
    if let Some(orientation) = table.lookup(tags::IMAGE_ORIENTATION_PATIENT)? {
        metadata.image_orientation = orientation;
    }
    if let Some(spacing) = table.lookup(tags::PIXEL_SPACING)? {
        metadata.pixel_spacing = spacing;
    }

    Ok(metadata)
}
