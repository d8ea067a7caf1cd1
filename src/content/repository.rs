use std::collections::HashMap;
use std::path::Path;

use crate::content::catalog::{load_catalog, validate, CatalogError};
use crate::content::ContentRecord;

/// Read-only view over one catalog (blog posts or work entries).
///
/// Built once at startup and never mutated, so it can be shared between
/// workers without locking.
pub struct ContentRepository {
    // File order
    records: Vec<ContentRecord>,
    slug_to_index: HashMap<String, usize>,
    // Indices into `records`, newest first
    by_date: Vec<usize>,
}

impl ContentRepository {
    pub fn new(records: Vec<ContentRecord>) -> Result<Self, CatalogError> {
        validate(&records)?;

        let slug_to_index = records.iter()
            .enumerate()
            .map(|(i, r)| (r.slug.clone(), i))
            .collect();

        // sort_by is stable, so equal dates keep the file order
        let mut by_date: Vec<usize> = (0..records.len()).collect();
        by_date.sort_by(|&a, &b| records[b].date.cmp(&records[a].date));

        Ok(ContentRepository {
            records,
            slug_to_index,
            by_date,
        })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        Self::new(load_catalog(path)?)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, newest first.
    pub fn get_all(&self) -> Vec<&ContentRecord> {
        self.by_date.iter().map(|&i| &self.records[i]).collect()
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<&ContentRecord> {
        self.slug_to_index.get(slug).map(|&i| &self.records[i])
    }

    /// Records of one category, in [`get_all`](Self::get_all) order.
    pub fn get_by_category(&self, category: &str) -> Vec<&ContentRecord> {
        self.by_date.iter()
            .map(|&i| &self.records[i])
            .filter(|r| r.category == category)
            .collect()
    }

    /// Distinct categories in order of first appearance in the catalog file.
    pub fn get_all_categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = vec![];
        for record in self.records.iter() {
            if !categories.contains(&record.category.as_str()) {
                categories.push(record.category.as_str());
            }
        }
        categories
    }

    /// The newest `limit` records other than `current_slug`.
    pub fn get_related(&self, current_slug: &str, limit: usize) -> Vec<&ContentRecord> {
        self.by_date.iter()
            .map(|&i| &self.records[i])
            .filter(|r| r.slug != current_slug)
            .take(limit)
            .collect()
    }

    /// The first `limit` records in file order.
    pub fn get_featured(&self, limit: usize) -> Vec<&ContentRecord> {
        self.records.iter().take(limit).collect()
    }
}
