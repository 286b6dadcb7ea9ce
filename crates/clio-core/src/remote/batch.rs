//! Atomic write batches and query filters

use std::collections::BTreeMap;

use serde_json::Value;

use super::path::DocPath;
use crate::error::{ClioError, ClioResult};

/// A single document mutation
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or overwrite the whole document
    Set { path: DocPath, doc: Value },
    /// Remove the document. Missing documents are fine.
    Delete { path: DocPath },
    /// Add each value to the array `field` unless already present
    ArrayUnion {
        path: DocPath,
        field: String,
        values: Vec<Value>,
    },
    /// Remove every occurrence of each value from the array `field`
    ArrayRemove {
        path: DocPath,
        field: String,
        values: Vec<Value>,
    },
}

impl WriteOp {
    pub fn path(&self) -> &DocPath {
        match self {
            WriteOp::Set { path, .. }
            | WriteOp::Delete { path }
            | WriteOp::ArrayUnion { path, .. }
            | WriteOp::ArrayRemove { path, .. } => path,
        }
    }
}

/// Ordered set of writes applied all-or-nothing by [`super::RemoteStore::commit`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: DocPath, doc: Value) -> Self {
        self.ops.push(WriteOp::Set { path, doc });
        self
    }

    pub fn delete(mut self, path: DocPath) -> Self {
        self.ops.push(WriteOp::Delete { path });
        self
    }

    pub fn array_union(mut self, path: DocPath, field: &str, values: Vec<Value>) -> Self {
        self.ops.push(WriteOp::ArrayUnion {
            path,
            field: field.to_string(),
            values,
        });
        self
    }

    pub fn array_remove(mut self, path: DocPath, field: &str, values: Vec<Value>) -> Self {
        self.ops.push(WriteOp::ArrayRemove {
            path,
            field: field.to_string(),
            values,
        });
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Field-equality predicate for collection-group queries
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn matches(&self, doc: &Value) -> bool {
        doc.get(&self.field) == Some(&self.value)
    }
}

/// Whether `doc` satisfies every filter
pub fn matches_all(filters: &[FieldFilter], doc: &Value) -> bool {
    filters.iter().all(|f| f.matches(doc))
}

/// Resolve a batch into the final state of every document it touches.
///
/// `read` supplies the committed value of a document; later ops in the batch
/// see the results of earlier ones. Nothing is written here, so a failing op
/// leaves the store untouched. `None` in the result means "delete".
pub(crate) fn stage<F>(ops: &[WriteOp], mut read: F) -> ClioResult<Vec<(DocPath, Option<Value>)>>
where
    F: FnMut(&DocPath) -> ClioResult<Option<Value>>,
{
    let mut staged: BTreeMap<DocPath, Option<Value>> = BTreeMap::new();

    for op in ops {
        let path = op.path().clone();
        let current = match staged.get(&path) {
            Some(value) => value.clone(),
            None => read(&path)?,
        };

        let next = match op {
            WriteOp::Set { doc, .. } => Some(doc.clone()),
            WriteOp::Delete { .. } => None,
            WriteOp::ArrayUnion { field, values, .. } => {
                let mut doc = require_doc(&path, current)?;
                let array = array_field(&path, &mut doc, field)?;
                for value in values {
                    if !array.contains(value) {
                        array.push(value.clone());
                    }
                }
                Some(doc)
            }
            WriteOp::ArrayRemove { field, values, .. } => {
                let mut doc = require_doc(&path, current)?;
                let array = array_field(&path, &mut doc, field)?;
                array.retain(|v| !values.contains(v));
                Some(doc)
            }
        };

        staged.insert(path, next);
    }

    Ok(staged.into_iter().collect())
}

fn require_doc(path: &DocPath, current: Option<Value>) -> ClioResult<Value> {
    current.ok_or_else(|| ClioError::RemoteIo(format!("no document to update at {}", path)))
}

fn array_field<'a>(path: &DocPath, doc: &'a mut Value, field: &str) -> ClioResult<&'a mut Vec<Value>> {
    let object = doc
        .as_object_mut()
        .ok_or_else(|| ClioError::RemoteIo(format!("document at {} is not an object", path)))?;
    let entry = object
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    entry
        .as_array_mut()
        .ok_or_else(|| ClioError::RemoteIo(format!("field {} at {} is not an array", field, path)))
}
