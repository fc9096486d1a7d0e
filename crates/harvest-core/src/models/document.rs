//! Business documents: contracts, reports and templates kept on file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HarvestResult;
use crate::repository::{FieldValue, FieldWrite, Predicate, ScopedEntity};
use crate::validation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    /// Storage path, unique within the business.
    pub file_path: String,
    /// Free-form category such as `Contract` or `Report`.
    pub kind: Option<String>,
    pub version: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    pub name: String,
    pub file_path: String,
    pub kind: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateDocument {
    pub name: Option<String>,
    pub file_path: Option<String>,
    pub kind: Option<Option<String>>,
    pub version: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub kind: Option<String>,
}

impl ScopedEntity for Document {
    const KIND: &'static str = "document";
    const UNIQUE_FIELD: Option<&'static str> = Some("file_path");

    type Create = CreateDocument;
    type Update = UpdateDocument;
    type Filter = DocumentFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreateDocument) -> HarvestResult<()> {
        validation::require_non_empty("name", &input.name)?;
        validation::require_non_empty("file_path", &input.file_path)
    }

    fn validate_update(input: &UpdateDocument) -> HarvestResult<()> {
        if let Some(name) = &input.name {
            validation::require_non_empty("name", name)?;
        }
        if let Some(path) = &input.file_path {
            validation::require_non_empty("file_path", path)?;
        }
        Ok(())
    }

    fn create_fields(input: CreateDocument) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("name", FieldValue::Text(input.name.trim().to_string())),
            FieldWrite::new(
                "file_path",
                FieldValue::Text(input.file_path.trim().to_string()),
            ),
            FieldWrite::new("kind", FieldValue::OptText(input.kind)),
            FieldWrite::new("version", FieldValue::OptText(input.version)),
        ]
    }

    fn update_fields(input: UpdateDocument) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(name) = input.name {
            fields.push(FieldWrite::new("name", FieldValue::Text(name.trim().to_string())));
        }
        if let Some(path) = input.file_path {
            fields.push(FieldWrite::new(
                "file_path",
                FieldValue::Text(path.trim().to_string()),
            ));
        }
        if let Some(v) = input.kind {
            fields.push(FieldWrite::new("kind", FieldValue::OptText(v)));
        }
        if let Some(v) = input.version {
            fields.push(FieldWrite::new("version", FieldValue::OptText(v)));
        }
        fields
    }

    fn filter_predicates(filter: DocumentFilter) -> Vec<Predicate> {
        filter
            .kind
            .map(|k| Predicate::eq("kind", FieldValue::Text(k)))
            .into_iter()
            .collect()
    }
}
