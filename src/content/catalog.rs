use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use markdown::Options;
use regex::Regex;
use serde::Deserialize;

use crate::content::ContentRecord;

lazy_static! {
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Error reading catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error parsing catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Duplicate record id '{0}'")]
    DuplicateId(String),
    #[error("Duplicate slug '{0}'")]
    DuplicateSlug(String),
    #[error("Slug '{0}' is not URL-safe")]
    InvalidSlug(String),
    #[error("Record '{id}' has an empty {field}")]
    EmptyField { id: String, field: &'static str },
    #[error("Record '{id}' has an invalid markdown body: {reason}")]
    Markdown { id: String, reason: String },
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    records: Vec<ContentRecord>,
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

/// Reads and validates a catalog file. Records keep their file order.
pub fn load_catalog(path: &Path) -> Result<Vec<ContentRecord>, CatalogError> {
    let src = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&src)
}

pub fn parse_catalog(src: &str) -> Result<Vec<ContentRecord>, CatalogError> {
    let CatalogFile { mut records } = toml::from_str(src)?;
    validate(&records)?;
    for record in records.iter_mut() {
        render_body(record)?;
    }
    Ok(records)
}

/// Checks the invariants every catalog must hold: unique ids, unique
/// URL-safe slugs and non-empty display fields.
pub fn validate(records: &[ContentRecord]) -> Result<(), CatalogError> {
    let mut ids = HashSet::new();
    let mut slugs = HashSet::new();

    for record in records {
        check_not_empty(record)?;

        if !ids.insert(record.id.as_str()) {
            return Err(CatalogError::DuplicateId(record.id.clone()));
        }
        if !is_valid_slug(&record.slug) {
            return Err(CatalogError::InvalidSlug(record.slug.clone()));
        }
        if !slugs.insert(record.slug.as_str()) {
            return Err(CatalogError::DuplicateSlug(record.slug.clone()));
        }
    }

    Ok(())
}

fn check_not_empty(record: &ContentRecord) -> Result<(), CatalogError> {
    let fields = [
        ("id", &record.id),
        ("title", &record.title),
        ("excerpt", &record.excerpt),
        ("category", &record.category),
        ("author", &record.author),
        ("image", &record.image),
        ("read_time", &record.read_time),
    ];

    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(CatalogError::EmptyField {
                id: record.id.clone(),
                field,
            });
        }
    }
    Ok(())
}

fn render_body(record: &mut ContentRecord) -> Result<(), CatalogError> {
    let Some(ref body) = record.body else {
        return Ok(());
    };

    match markdown::to_html_with_options(body, &Options::gfm()) {
        Ok(html) => {
            record.body_html = Some(html);
            Ok(())
        }
        Err(e) => Err(CatalogError::Markdown {
            id: record.id.clone(),
            reason: e.reason.to_string(),
        }),
    }
}
