//! Column selection for document reads
//!
//! Every optional document column is listed once in [`FIELDS`] together with
//! its wire name, its table column and the function that copies it out of a
//! row. Reads build both the `SELECT` list and the scan from the same
//! filtered table, so the two can never drift apart.

use crate::db::models::{DocumentColumn, DocumentEntity};
use crate::domain::Document;
use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use sea_orm::{DbErr, EntityTrait, IdenStatic, QueryResult, QuerySelect, Select};
use uuid::Uuid;

/// A document column that callers may leave out of a read.
/// The document id is always selected and is not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentField {
    Title,
    TimeCreated,
    OwnerUuid,
    OwnerType,
    Content,
}

type ScanFn = fn(&QueryResult, &str, &mut Document) -> std::result::Result<(), DbErr>;

struct FieldDef {
    field: DocumentField,
    /// JSON key in responses and the primary name accepted in `exclude`
    wire_name: &'static str,
    /// Extra name accepted in `exclude`
    alias: &'static str,
    column: DocumentColumn,
    scan: ScanFn,
}

static FIELDS: [FieldDef; 5] = [
    FieldDef {
        field: DocumentField::Title,
        wire_name: "documentTitle",
        alias: "title",
        column: DocumentColumn::DocumentTitle,
        scan: scan_title,
    },
    FieldDef {
        field: DocumentField::TimeCreated,
        wire_name: "timeCreated",
        alias: "timeCreated",
        column: DocumentColumn::TimeCreated,
        scan: scan_time_created,
    },
    FieldDef {
        field: DocumentField::OwnerUuid,
        wire_name: "ownerUUID",
        alias: "ownerUuid",
        column: DocumentColumn::OwnerUuid,
        scan: scan_owner_uuid,
    },
    FieldDef {
        field: DocumentField::OwnerType,
        wire_name: "ownerType",
        alias: "ownerType",
        column: DocumentColumn::OwnerType,
        scan: scan_owner_type,
    },
    FieldDef {
        field: DocumentField::Content,
        wire_name: "base64",
        alias: "content",
        column: DocumentColumn::DocumentBase64,
        scan: scan_content,
    },
];

fn scan_title(
    row: &QueryResult,
    col: &str,
    doc: &mut Document,
) -> std::result::Result<(), DbErr> {
    doc.title = Some(row.try_get::<Option<String>>("", col)?);
    Ok(())
}

fn scan_time_created(
    row: &QueryResult,
    col: &str,
    doc: &mut Document,
) -> std::result::Result<(), DbErr> {
    doc.time_created = Some(row.try_get::<Option<DateTime<Utc>>>("", col)?);
    Ok(())
}

fn scan_owner_uuid(
    row: &QueryResult,
    col: &str,
    doc: &mut Document,
) -> std::result::Result<(), DbErr> {
    doc.owner_uuid = Some(row.try_get::<Option<Uuid>>("", col)?);
    Ok(())
}

fn scan_owner_type(
    row: &QueryResult,
    col: &str,
    doc: &mut Document,
) -> std::result::Result<(), DbErr> {
    doc.owner_type = Some(row.try_get::<Option<i32>>("", col)?);
    Ok(())
}

fn scan_content(
    row: &QueryResult,
    col: &str,
    doc: &mut Document,
) -> std::result::Result<(), DbErr> {
    doc.content = Some(row.try_get::<Option<String>>("", col)?);
    Ok(())
}

impl DocumentField {
    pub const ALL: [DocumentField; 5] = [
        DocumentField::Title,
        DocumentField::TimeCreated,
        DocumentField::OwnerUuid,
        DocumentField::OwnerType,
        DocumentField::Content,
    ];

    fn def(self) -> &'static FieldDef {
        &FIELDS[self as usize]
    }

    /// Parse an exclusion name; both the JSON key and the short name work
    pub fn parse(name: &str) -> Option<Self> {
        FIELDS
            .iter()
            .find(|def| def.wire_name == name || def.alias == name)
            .map(|def| def.field)
    }

    /// JSON key of this field
    pub fn wire_name(self) -> &'static str {
        self.def().wire_name
    }

    /// Table column backing this field
    pub fn column(self) -> DocumentColumn {
        self.def().column
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// The set of optional columns a document read returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    excluded: u8,
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FieldSelection {
    /// Every column
    pub fn all() -> Self {
        Self { excluded: 0 }
    }

    /// Every column except the given ones
    pub fn excluding(fields: impl IntoIterator<Item = DocumentField>) -> Self {
        let excluded = fields.into_iter().fold(0, |acc, f| acc | f.bit());
        Self { excluded }
    }

    /// Only the given columns (plus the id)
    pub fn only(fields: impl IntoIterator<Item = DocumentField>) -> Self {
        let kept = fields.into_iter().fold(0, |acc, f: DocumentField| acc | f.bit());
        let all = DocumentField::ALL.iter().fold(0, |acc, f| acc | f.bit());
        Self { excluded: all & !kept }
    }

    /// Build from caller supplied exclusion names. Unknown names are rejected
    /// rather than ignored.
    pub fn from_exclude_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut fields = Vec::new();
        for name in names {
            let field = DocumentField::parse(name).ok_or_else(|| {
                AppError::invalid("exclude", format!("unknown field '{}'", name))
            })?;
            fields.push(field);
        }
        Ok(Self::excluding(fields))
    }

    pub fn includes(&self, field: DocumentField) -> bool {
        self.excluded & field.bit() == 0
    }

    /// Selected fields in table order
    pub fn fields(&self) -> impl Iterator<Item = DocumentField> + '_ {
        DocumentField::ALL.into_iter().filter(|f| self.includes(*f))
    }

    /// Names of the selected columns, id first
    pub fn column_names(&self) -> Vec<String> {
        std::iter::once(DocumentColumn::DocumentUuid)
            .chain(self.fields().map(DocumentField::column))
            .map(|column| column.as_str().to_owned())
            .collect()
    }

    /// `SELECT` over the documents table restricted to this selection
    pub fn select(&self) -> Select<DocumentEntity> {
        self.fields().fold(
            DocumentEntity::find()
                .select_only()
                .column(DocumentColumn::DocumentUuid),
            |query, field| query.column(field.column()),
        )
    }

    /// Read one row produced by [`FieldSelection::select`]
    pub fn scan(&self, row: &QueryResult) -> Result<Document> {
        let mut doc = Document {
            uuid: row.try_get("", DocumentColumn::DocumentUuid.as_str())?,
            ..Default::default()
        };

        for field in self.fields() {
            let def = field.def();
            (def.scan)(row, def.column.as_str(), &mut doc)?;
        }

        Ok(doc)
    }
}
