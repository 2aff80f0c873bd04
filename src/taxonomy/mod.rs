//! Class-name resolution against the OpenImages taxonomy.
//!
//! Resolution happens in two phases:
//!
//! 1. [`resolve_class_names`] maps each requested display name (matched
//!    case-insensitively) to its ontology ID using the class-description
//!    table, a header-less CSV of `label_id,display_name` rows.
//! 2. [`build_class_id_sets`] expands each resolved ID to the set of IDs in
//!    its subtree of the label hierarchy, so that asking for "Cat" also
//!    picks up boxes labelled with any narrower cat label.
//!
//! # Example
//!
//! ```
//! use oisample::taxonomy::{
//!     build_class_id_sets, class_descriptions_from_str, hierarchy_from_str,
//!     resolve_class_names,
//! };
//!
//! let table = "/m/01x3z,Boot\n/m/0jbk,Cat\n";
//! let tree = hierarchy_from_str(
//!     r#"{"LabelName":"/m/0","Subcategory":[{"LabelName":"/m/01x3z"},{"LabelName":"/m/0jbk"}]}"#,
//! )?;
//!
//! let names = vec!["boot".to_string(), "CAT".to_string()];
//! let resolved = resolve_class_names(&names, class_descriptions_from_str(table))?;
//! let id_sets = build_class_id_sets(&resolved, &tree)?;
//! assert!(id_sets.get("CAT").unwrap().contains("/m/0jbk"));
//! # Ok::<(), oisample::OisampleError>(())
//! ```

mod hierarchy;

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::OisampleError;
use crate::ir::LabelId;

pub use hierarchy::{expand_subclasses, hierarchy_from_str, read_hierarchy, LabelNode};

/// One row of the class-description table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDescription {
    pub label_id: LabelId,
    pub display_name: String,
}

/// A requested class name and the ontology ID it resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassQuery {
    /// The name exactly as the caller spelled it.
    pub name: String,

    /// `None` until resolution finds a matching description row.
    pub root_id: Option<LabelId>,
}

impl ClassQuery {
    /// Creates an unresolved query.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_id: None,
        }
    }
}

/// The expanded label IDs for a single requested class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassIds {
    pub class_name: String,
    pub root_id: LabelId,
    pub ids: HashSet<LabelId>,
}

/// Expanded label IDs for every requested class, in request order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassIdSets {
    classes: Vec<ClassIds>,
}

impl ClassIdSets {
    /// Builds a set directly from already-expanded classes.
    pub fn from_classes(classes: Vec<ClassIds>) -> Self {
        Self { classes }
    }

    /// Returns the number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if no classes were requested.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterates over the classes in request order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassIds> {
        self.classes.iter()
    }

    /// Returns the class names in request order.
    pub fn class_names(&self) -> Vec<String> {
        self.classes.iter().map(|c| c.class_name.clone()).collect()
    }

    /// Looks up the ID set for a class by its requested name.
    pub fn get(&self, class_name: &str) -> Option<&HashSet<LabelId>> {
        self.classes
            .iter()
            .find(|c| c.class_name == class_name)
            .map(|c| &c.ids)
    }
}

/// Resolves class names to ontology IDs using a stream of description rows.
///
/// Matching is case-insensitive and the first matching row wins. Rows are
/// consumed in order, and consumption stops as soon as every name has been
/// resolved, so the rest of a large table is never read.
///
/// # Errors
/// Returns [`OisampleError::NameNotFound`] listing every name that had no
/// match once the rows ran out, and propagates any row read error.
pub fn resolve_class_names<I>(names: &[String], rows: I) -> Result<Vec<ClassQuery>, OisampleError>
where
    I: IntoIterator<Item = Result<ClassDescription, OisampleError>>,
{
    // Repeated names (in any casing) collapse onto their first occurrence.
    let mut queries: Vec<ClassQuery> = Vec::with_capacity(names.len());
    let mut keys: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let key = name.trim().to_lowercase();
        if keys.contains(&key) {
            debug!(class = %name, "ignoring repeated class name");
            continue;
        }
        keys.push(key);
        queries.push(ClassQuery::new(name));
    }
    let mut unresolved = queries.len();

    let mut rows = rows.into_iter();
    while unresolved > 0 {
        let Some(row) = rows.next() else {
            break;
        };
        let row = row?;
        let display = row.display_name.trim().to_lowercase();

        for (query, key) in queries.iter_mut().zip(&keys) {
            if query.root_id.is_none() && *key == display {
                debug!(class = %query.name, label_id = %row.label_id, "resolved class name");
                query.root_id = Some(row.label_id.clone());
                unresolved -= 1;
            }
        }
    }

    if unresolved > 0 {
        let names = queries
            .iter()
            .filter(|q| q.root_id.is_none())
            .map(|q| q.name.clone())
            .collect();
        return Err(OisampleError::NameNotFound { names });
    }

    Ok(queries)
}

/// Expands every resolved query through the label hierarchy.
///
/// # Errors
/// Returns [`OisampleError::NameNotFound`] for a query that was never
/// resolved, and [`OisampleError::LabelNotFound`] when a resolved ID does not
/// occur anywhere in `tree`.
pub fn build_class_id_sets(
    queries: &[ClassQuery],
    tree: &LabelNode,
) -> Result<ClassIdSets, OisampleError> {
    let mut classes = Vec::with_capacity(queries.len());

    for query in queries {
        let root_id = query
            .root_id
            .clone()
            .ok_or_else(|| OisampleError::NameNotFound {
                names: vec![query.name.clone()],
            })?;

        let ids = expand_subclasses(tree, &root_id);
        if ids.is_empty() {
            return Err(OisampleError::LabelNotFound {
                class_name: query.name.clone(),
                label_id: root_id.to_string(),
            });
        }

        info!(class = %query.name, %root_id, ids = ids.len(), "expanded class");
        classes.push(ClassIds {
            class_name: query.name.clone(),
            root_id,
            ids,
        });
    }

    Ok(ClassIdSets { classes })
}

/// Streams the class-description table from a header-less CSV file.
///
/// Each row is `label_id,display_name`; extra columns are ignored.
pub fn read_class_descriptions(
    path: &Path,
) -> Result<impl Iterator<Item = Result<ClassDescription, OisampleError>>, OisampleError> {
    let file = File::open(path).map_err(OisampleError::Io)?;
    Ok(description_rows(BufReader::new(file), path.to_path_buf()))
}

/// Streams the class-description table from a CSV string.
///
/// Useful for testing without file I/O.
pub fn class_descriptions_from_str(
    csv_str: &str,
) -> impl Iterator<Item = Result<ClassDescription, OisampleError>> + '_ {
    description_rows(csv_str.as_bytes(), PathBuf::from("<string>"))
}

/// Resolves class names straight from a description file, stopping early.
pub fn resolve_class_descriptions_file(
    path: &Path,
    names: &[String],
) -> Result<Vec<ClassQuery>, OisampleError> {
    resolve_class_names(names, read_class_descriptions(path)?)
}

fn description_rows<R: std::io::Read>(
    reader: R,
    path: PathBuf,
) -> impl Iterator<Item = Result<ClassDescription, OisampleError>> {
    let csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    csv_reader.into_records().map(move |result| {
        let record = result.map_err(|source| OisampleError::CsvParse {
            path: path.clone(),
            source,
        })?;
        Ok(ClassDescription {
            label_id: LabelId::from(record.get(0).unwrap_or_default()),
            display_name: record.get(1).unwrap_or_default().to_string(),
        })
    })
}
