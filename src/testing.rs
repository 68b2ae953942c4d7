//! Builders for records used across the unit tests.

use crate::tag_reader::TagTable;
use dicom::{
    core::{DataElement, PrimitiveValue, Tag, VR},
    object::{FileMetaTableBuilder, InMemDicomObject},
};
use dicom_dictionary_std::{tags, uids};
use std::path::Path;

pub(crate) struct RecordBuilder {
    object: InMemDicomObject,
    sop_instance_uid: String,
}

impl RecordBuilder {
    pub(crate) fn new(study_uid: &str, series_uid: &str, sop_instance_uid: &str) -> Self {
        let builder = Self {
            object: InMemDicomObject::new_empty(),
            sop_instance_uid: sop_instance_uid.to_string(),
        };
        builder
            .with_str(tags::SOP_CLASS_UID, VR::UI, uids::CT_IMAGE_STORAGE)
            .with_str(tags::SOP_INSTANCE_UID, VR::UI, sop_instance_uid)
            .with_str(tags::STUDY_INSTANCE_UID, VR::UI, study_uid)
            .with_str(tags::SERIES_INSTANCE_UID, VR::UI, series_uid)
            .with_str(tags::MODALITY, VR::CS, "CT")
    }

    pub(crate) fn with_str(mut self, tag: Tag, vr: VR, value: &str) -> Self {
        self.object
            .put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
        self
    }

    pub(crate) fn with_multi_str(mut self, tag: Tag, vr: VR, values: &[&str]) -> Self {
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.object
            .put(DataElement::new(tag, vr, PrimitiveValue::Strs(values.into())));
        self
    }

    /// Attach a monochrome 16-bit pixel payload where every sample is `fill`.
    pub(crate) fn with_pixels(self, rows: u16, columns: u16, fill: u16) -> Self {
        let samples = vec![fill; rows as usize * columns as usize];
        self.with_pixel_samples(rows, columns, samples)
    }

    pub(crate) fn with_pixel_samples(mut self, rows: u16, columns: u16, samples: Vec<u16>) -> Self {
        let us = |tag: Tag, value: u16| DataElement::new(tag, VR::US, PrimitiveValue::from(value));
        self.object.put(us(tags::ROWS, rows));
        self.object.put(us(tags::COLUMNS, columns));
        self.object.put(us(tags::SAMPLES_PER_PIXEL, 1));
        self.object.put(us(tags::BITS_ALLOCATED, 16));
        self.object.put(us(tags::BITS_STORED, 16));
        self.object.put(us(tags::HIGH_BIT, 15));
        self.object.put(us(tags::PIXEL_REPRESENTATION, 0));
        self.object.put(DataElement::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from("MONOCHROME2"),
        ));
        self.object.put(DataElement::new(
            tags::PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U16(samples.into()),
        ));
        self
    }

    pub(crate) fn into_table(self) -> TagTable {
        TagTable::from(self.object)
    }

    pub(crate) fn write(self, path: &Path) {
        let meta = FileMetaTableBuilder::new()
            .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
            .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
            .media_storage_sop_instance_uid(self.sop_instance_uid.as_str());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("should have created fixture directory");
        }
        self.object
            .with_meta(meta)
            .expect("should have built file meta group")
            .write_to_file(path)
            .expect("should have written fixture file");
    }
}

/// Write a single-slice record with a `rows` x `columns` payload.
pub(crate) fn write_slice(
    path: &Path,
    study_uid: &str,
    series_uid: &str,
    sop_instance_uid: &str,
    (rows, columns): (u16, u16),
) {
    RecordBuilder::new(study_uid, series_uid, sop_instance_uid)
        .with_pixels(rows, columns, 100)
        .write(path);
}
