use crate::{
    catalog::{Catalog, Series},
    metadata::{SeriesMetadata, StudyMetadata},
};
use serde::Serialize;
use std::fmt;

/// Text report of every study and series in a catalog
pub struct TextReport<'a> {
    catalog: &'a Catalog,
}

impl<'a> TextReport<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} studies, {} series, {} slices",
            self.catalog.len(),
            self.catalog.series_count(),
            self.catalog.slice_count()
        )?;

        for (study_uid, study) in self.catalog.studies() {
            let metadata = study.metadata();
            let patient = &metadata.patient;
            writeln!(f)?;
            writeln!(f, "Study {study_uid}")?;
            writeln!(f, "==================")?;
            writeln!(f, "Patient Name:        {}", patient.patient_name)?;
            writeln!(f, "Patient ID:          {}", patient.patient_id)?;
            writeln!(f, "Birth Date:          {}", patient.patient_birth_date)?;
            writeln!(f, "Sex:                 {}", patient.patient_sex)?;
            writeln!(f, "Age:                 {}", patient.patient_age)?;
            writeln!(f, "Weight:              {:.1}", patient.patient_weight)?;
            writeln!(f, "Study Date:          {}", metadata.study_date)?;
            writeln!(f, "Study Time:          {}", metadata.study_time)?;
            writeln!(f, "Study Description:   {}", metadata.study_description)?;
            writeln!(f, "Study ID:            {}", metadata.study_id)?;
            writeln!(f, "Accession Number:    {}", metadata.accession_number)?;
            writeln!(f, "Referring Physician: {}", metadata.referring_physician_name)?;

            for (series_uid, series) in study.series() {
                write_series(f, series_uid, series)?;
            }
        }

        Ok(())
    }
}

fn write_series(f: &mut fmt::Formatter<'_>, series_uid: &str, series: &Series) -> fmt::Result {
    let metadata = series.metadata();
    let (slices, rows, columns) = series.volume().dim();
    writeln!(f)?;
    writeln!(f, "  Series {series_uid}")?;
    writeln!(f, "  ------------------")?;
    writeln!(f, "  Series Number:      {}", metadata.series_number)?;
    writeln!(f, "  Series Description: {}", metadata.series_description)?;
    writeln!(f, "  Modality:           {}", metadata.modality)?;
    writeln!(f, "  Body Part:          {}", metadata.body_part_examined)?;
    writeln!(f, "  Protocol:           {}", metadata.protocol_name)?;
    writeln!(f, "  Patient Position:   {}", metadata.patient_position)?;
    writeln!(f, "  Device:             {}", metadata.manufacturers_model_name)?;
    writeln!(f, "  Device S/N:         {}", metadata.device_serial_number)?;
    writeln!(f, "  Volume:             {slices} x {rows} x {columns}")?;

    if let Some(first) = series.image_metadata().first() {
        let spacing = if first.pixel_spacing.is_empty() {
            "N/A".to_string()
        } else {
            first
                .pixel_spacing
                .iter()
                .map(|x| format!("{x:.2}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(f, "  Pixel Spacing:      {spacing}")?;
        writeln!(f, "  Slice Thickness:    {:.2}", first.slice_thickness)?;
        writeln!(
            f,
            "  Window:             {:.1} / {:.1}",
            first.window_center, first.window_width
        )?;
    }

    Ok(())
}

/// Serializable view of a catalog without pixel data.
#[derive(Debug, Serialize)]
pub struct CatalogSummary<'a> {
    pub studies: Vec<StudySummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct StudySummary<'a> {
    pub study_uid: &'a str,
    pub metadata: &'a StudyMetadata,
    pub series: Vec<SeriesSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct SeriesSummary<'a> {
    pub series_uid: &'a str,
    pub metadata: &'a SeriesMetadata,
    /// (slices, rows, columns)
    pub dimensions: (usize, usize, usize),
    pub instance_numbers: Vec<i32>,
}

impl<'a> CatalogSummary<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        let studies = catalog
            .studies()
            .iter()
            .map(|(study_uid, study)| StudySummary {
                study_uid,
                metadata: study.metadata(),
                series: study
                    .series()
                    .iter()
                    .map(|(series_uid, series)| SeriesSummary {
                        series_uid,
                        metadata: series.metadata(),
                        dimensions: series.volume().dim(),
                        instance_numbers: series
                            .image_metadata()
                            .iter()
                            .map(|image| image.instance_number)
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self { studies }
    }
}
