use chrono::NaiveDate;
use serde::Deserialize;

use crate::util::toml_date::TomlDate;

pub mod catalog;
pub mod repository;

/// One blog post or portfolio entry of the static catalog.
///
/// Example, as written in a catalog file:
/// ```toml
/// [[records]]
/// id = "devops-best-practices"
/// slug = "devops-best-practices"
/// title = "The $50K DevOps Mistake That Taught Us Everything About CI/CD"
/// excerpt = "A single deployment mistake cost our client $50,000 in downtime."
/// date = 2024-01-22
/// category = "DevOps"
/// tags = ["DevOps", "CI/CD", "Docker"]
/// author = "Michael Torres"
/// image = "/public/blog/devops.png"
/// read_time = "11 min read"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentRecord {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub date: TomlDate,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: String,
    pub image: String,
    pub read_time: String,
    /// Markdown source of the full article
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub project: Option<ProjectDetails>,
    /// HTML rendered from `body` when the catalog is loaded
    #[serde(skip)]
    pub body_html: Option<String>,
}

impl ContentRecord {
    pub fn date(&self) -> NaiveDate {
        self.date.0
    }

    /// Tags for display, truncated to the first `limit`.
    pub fn display_tags(&self, limit: usize) -> &[String] {
        &self.tags[..self.tags.len().min(limit)]
    }
}

/// Portfolio-only details of a work entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectDetails {
    pub url: String,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    pub quote: Option<Quote>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
    pub title: String,
}
