//! Generic mapping of `<rowset><row/></rowset>` structures into typed records.

use crate::error::{EveApiError, Result};
use crate::response::parse_time;
use crate::xml::{Document, Element};
use chrono::{DateTime, Utc};
use std::str::FromStr;

/// Types that can be built from a single `<row>` element
pub trait FromRow: Sized {
    /// Build a record from one row's attributes (and nested rowsets)
    fn from_row(row: &Row<'_>) -> Result<Self>;
}

/// Which rows of a document to map
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowSelector {
    /// Every `<row>` directly under any `<rowset>`, at any depth
    #[default]
    Everywhere,
    /// Rows of the rowset named `name` found at `path` below the root
    Named { path: Vec<String>, name: String },
}

impl RowSelector {
    /// The rowset named `name` directly under `<result>`
    pub fn named(name: impl Into<String>) -> Self {
        Self::at(&["result"], name)
    }

    /// The rowset named `name` under an explicit path below the root
    pub fn at(path: &[&str], name: impl Into<String>) -> Self {
        Self::Named {
            path: path.iter().map(|s| s.to_string()).collect(),
            name: name.into(),
        }
    }

    /// Select the matching row elements, in document order
    pub fn select<'a>(&self, document: &'a Document) -> Vec<&'a Element> {
        let Some(root) = document.root() else {
            return Vec::new();
        };
        match self {
            RowSelector::Everywhere => root
                .descendants()
                .filter(|(parent, el)| parent.name() == "rowset" && el.name() == "row")
                .map(|(_, el)| el)
                .collect(),
            RowSelector::Named { path, name } => {
                let path: Vec<&str> = path.iter().map(String::as_str).collect();
                root.at_path(&path)
                    .map(|parent| rowset_rows(parent, name))
                    .unwrap_or_default()
            }
        }
    }
}

/// Rows of the child rowset named `name`
fn rowset_rows<'a>(parent: &'a Element, name: &str) -> Vec<&'a Element> {
    parent
        .children_named("rowset")
        .filter(|rs| rs.attr("name") == Some(name))
        .flat_map(|rs| rs.children_named("row"))
        .collect()
}

/// Map the selected rows of a document into records
pub fn map_rows<T: FromRow>(document: &Document, selector: &RowSelector) -> Result<Vec<T>> {
    selector
        .select(document)
        .into_iter()
        .map(|el| T::from_row(&Row::new(el)))
        .collect()
}

/// Read-only view of one `<row>` element
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    element: &'a Element,
}

impl<'a> Row<'a> {
    /// Wrap an element
    pub fn new(element: &'a Element) -> Self {
        Self { element }
    }

    /// The underlying element
    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Raw attribute value
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.attr(name)
    }

    /// Attribute value, or an empty string when absent
    pub fn text(&self, name: &str) -> String {
        self.attr(name).unwrap_or_default().to_string()
    }

    /// Attribute value when present and non-empty
    pub fn text_opt(&self, name: &str) -> Option<String> {
        self.attr(name)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Parse a required attribute
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T> {
        let value = self
            .attr(name)
            .ok_or_else(|| EveApiError::invalid_row(name, "<missing>"))?;
        value
            .trim()
            .parse()
            .map_err(|_| EveApiError::invalid_row(name, value))
    }

    /// Parse an attribute, using the type's default when absent or empty
    pub fn parse_or_default<T: FromStr + Default>(&self, name: &str) -> Result<T> {
        match self.attr(name).map(str::trim) {
            None | Some("") => Ok(T::default()),
            Some(value) => value
                .parse()
                .map_err(|_| EveApiError::invalid_row(name, value)),
        }
    }

    /// Parse a timestamp attribute; absent or unparseable values give `None`
    pub fn time(&self, name: &str) -> Option<DateTime<Utc>> {
        self.attr(name).and_then(parse_time)
    }

    /// `"1"`/`"true"` style flag attribute
    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.attr(name).map(str::trim),
            Some("1") | Some("true") | Some("True")
        )
    }

    /// Nested rowsets of this row
    pub fn rowsets(&self) -> impl Iterator<Item = &'a Element> {
        self.element.children_named("rowset")
    }

    /// Nested rowset by name
    pub fn rowset(&self, name: &str) -> Option<&'a Element> {
        self.rowsets().find(|rs| rs.attr("name") == Some(name))
    }

    /// A row is a container when it has any nested content at all
    pub fn is_container(&self) -> bool {
        self.element.has_children()
    }

    /// Map every row of every nested rowset. `T::from_row` may recurse.
    pub fn children<T: FromRow>(&self) -> Result<Vec<T>> {
        self.rowsets()
            .flat_map(|rs| rs.children_named("row"))
            .map(|el| T::from_row(&Row::new(el)))
            .collect()
    }

    /// Map the rows of the nested rowset named `name`
    pub fn children_in<T: FromRow>(&self, name: &str) -> Result<Vec<T>> {
        rowset_rows(self.element, name)
            .into_iter()
            .map(|el| T::from_row(&Row::new(el)))
            .collect()
    }
}
