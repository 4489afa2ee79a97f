//! Program model and its request payloads.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::patch::Patch;
use crate::errors::AppError;

/// Entity name reported in alerts and headers.
pub const ENTITY_NAME: &str = "program";

/// A persisted program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: i64,
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub cover: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_content_type: Option<String>,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Login of the user who created the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// The writable fields of a program, validated and ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramFields {
    pub cover: Option<Vec<u8>>,
    pub cover_content_type: Option<String>,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub tags: Option<String>,
}

impl Program {
    /// Build a program from stored fields and an assigned id.
    pub fn from_fields(id: i64, fields: ProgramFields, owner: Option<String>) -> Self {
        Self {
            id,
            cover: fields.cover,
            cover_content_type: fields.cover_content_type,
            title: fields.title,
            description: fields.description,
            start_date: fields.start_date,
            end_date: fields.end_date,
            tags: fields.tags,
            owner,
        }
    }

    /// Copy of the writable fields.
    pub fn fields(&self) -> ProgramFields {
        ProgramFields {
            cover: self.cover.clone(),
            cover_content_type: self.cover_content_type.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            tags: self.tags.clone(),
        }
    }
}

/// Request body for creating or fully replacing a program.
///
/// Every field is optional at the wire level so that a missing required
/// field is reported as a 400 rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramPayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, with = "base64_bytes")]
    pub cover: Option<Vec<u8>>,
    #[serde(default)]
    pub cover_content_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Option<String>,
}

impl ProgramPayload {
    /// Check the required fields and split off the writable part.
    pub fn validate(&self) -> Result<ProgramFields, AppError> {
        Ok(ProgramFields {
            cover: self.cover.clone(),
            cover_content_type: self.cover_content_type.clone(),
            title: required(&self.title, "title")?.clone(),
            description: required(&self.description, "description")?.clone(),
            start_date: *required(&self.start_date, "startDate")?,
            end_date: *required(&self.end_date, "endDate")?,
            tags: self.tags.clone(),
        })
    }
}

fn required<'a, T>(value: &'a Option<T>, field: &str) -> Result<&'a T, AppError> {
    value
        .as_ref()
        .ok_or_else(|| AppError::Validation(format!("{} must not be null", field)))
}

/// Request body for a merge-patch of a program.
///
/// Fields left out of the document stay `Patch::Absent`; explicit nulls
/// become `Patch::Null`. Only `Patch::Value` overwrites stored data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramPatch {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub cover: Patch<Base64Bytes>,
    #[serde(default)]
    pub cover_content_type: Patch<String>,
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub start_date: Patch<NaiveDate>,
    #[serde(default)]
    pub end_date: Patch<NaiveDate>,
    #[serde(default)]
    pub tags: Patch<String>,
}

impl ProgramPatch {
    /// Overwrite the fields of `existing` that carry a value in this patch.
    ///
    /// Returns the number of fields that were overwritten.
    pub fn apply(self, existing: &mut Program) -> usize {
        [
            self.cover.map(|b| b.0).merge_into_optional(&mut existing.cover),
            self.cover_content_type
                .merge_into_optional(&mut existing.cover_content_type),
            self.title.merge_into(&mut existing.title),
            self.description.merge_into(&mut existing.description),
            self.start_date.merge_into(&mut existing.start_date),
            self.end_date.merge_into(&mut existing.end_date),
            self.tags.merge_into_optional(&mut existing.tags),
        ]
        .into_iter()
        .filter(|applied| *applied)
        .count()
    }
}

/// Binary content carried as a standard base64 string in JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Base64Bytes(pub Vec<u8>);

impl Serialize for Base64Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Base64Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Base64Bytes)
            .map_err(serde::de::Error::custom)
    }
}

/// `serde(with)` adapter for optional base64 byte fields.
mod base64_bytes {
    use super::Base64Bytes;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        Ok(Option::<Base64Bytes>::deserialize(deserializer)?.map(|b| b.0))
    }
}
