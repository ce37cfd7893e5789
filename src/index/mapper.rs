//! Generic row mapping.
//!
//! A record shape describes itself once with a binding table: an ordered list
//! of `(FieldName, setter)` pairs. [`query_as`] runs any query and fills one
//! default-constructed record per result row through that table, so no query
//! needs its own scanning code.
//!
//! Column names are `lower_snake_case` in SQL and are converted to the
//! `UpperCamelCase` field names used in binding tables (`create_time` becomes
//! `CreateTime`). Columns without a binding are skipped. Every cell is read as
//! raw text and coerced by the binding's kind; an integer that fails to parse
//! leaves the field at its zero value.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Params};

use crate::index::error::QueryResult;

/// How a single field receives a cell value.
pub enum Setter<T> {
    /// the raw text is copied verbatim
    Text(fn(&mut T, String)),
    /// the raw text is parsed as a base-10 `i64`
    Integer(fn(&mut T, i64)),
}

/// One entry of a record shape's binding table.
pub struct FieldBinding<T: 'static> {
    /// field name in `UpperCamelCase`
    pub field: &'static str,
    pub setter: Setter<T>,
}

impl<T> FieldBinding<T> {
    /// Bind a text field.
    pub const fn text(field: &'static str, set: fn(&mut T, String)) -> Self {
        Self {
            field,
            setter: Setter::Text(set),
        }
    }

    /// Bind an integer field.
    pub const fn integer(field: &'static str, set: fn(&mut T, i64)) -> Self {
        Self {
            field,
            setter: Setter::Integer(set),
        }
    }

    /// Coerce `raw` according to the field kind and store it in `record`.
    fn apply(&self, record: &mut T, raw: String) {
        match self.setter {
            Setter::Text(set) => set(record, raw),
            Setter::Integer(set) => {
                // unparsable numbers keep the zero value
                if let Ok(value) = raw.parse::<i64>() {
                    set(record, value);
                }
            }
        }
    }
}

/// A record shape that can be produced by [`query_as`].
///
/// `Default` supplies the zero-valued instance every row starts from.
pub trait FromRow: Default + Sized + 'static {
    /// The binding table for this shape.
    fn bindings() -> &'static [FieldBinding<Self>];

    /// Find the binding for an `UpperCamelCase` field name.
    fn binding(field: &str) -> Option<&'static FieldBinding<Self>> {
        Self::bindings().iter().find(|b| b.field == field)
    }
}

/// Execute `sql` with positional `params` and map every row into `T`.
///
/// Rows come back in the result set's native order. A query matching nothing
/// yields an empty vector. Prepare and execution failures are returned as
/// [`QueryError`](crate::index::QueryError).
pub fn query_as<T, P>(conn: &Connection, sql: &str, params: P) -> QueryResult<Vec<T>>
where
    T: FromRow,
    P: Params,
{
    let mut stmt = conn.prepare(sql)?;

    // resolve each column to its binding once, before touching any row
    let plan: Vec<Option<&'static FieldBinding<T>>> = stmt
        .column_names()
        .into_iter()
        .map(|column| T::binding(&snake_to_upper_camel(column)))
        .collect();

    let mut rows = stmt.query(params)?;
    let mut records = Vec::new();

    while let Some(row) = rows.next()? {
        let mut record = T::default();
        for (index, binding) in plan.iter().enumerate() {
            let Some(binding) = binding else {
                continue;
            };
            let raw = raw_text(row.get_ref(index)?);
            binding.apply(&mut record, raw);
        }
        records.push(record);
    }

    Ok(records)
}

/// Render a cell as the text a column would print.
fn raw_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// `create_time` -> `CreateTime`.
pub fn snake_to_upper_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for word in name.split('_').filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}
