// src/table.rs

use anyhow::{bail, ensure, Result};

/// One scraped transaction: a field per column, in column order.
pub type Row = Vec<String>;

/// Every transaction scraped so far in this run.
///
/// Columns are fixed once initialised; rows only ever grow.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TransactionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the column names. May only be called once, with at least one name.
    pub fn initialize_columns<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.columns.is_empty() {
            bail!("columns already initialised ({} columns)", self.columns.len());
        }
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        ensure!(!names.is_empty(), "header row has no columns");
        self.columns = names;
        Ok(())
    }

    /// Append `rows` in order.
    ///
    /// All rows are checked first; a row with the wrong field count rejects the
    /// whole batch and leaves the table untouched.
    pub fn append_rows(&mut self, rows: Vec<Row>) -> Result<()> {
        ensure!(
            !self.columns.is_empty(),
            "cannot append rows before columns are initialised"
        );
        if let Some((i, bad)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != self.columns.len())
        {
            bail!(
                "row {} has {} fields, table has {} columns",
                i,
                bad.len(),
                self.columns.len()
            );
        }
        self.rows.extend(rows);
        Ok(())
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn all_rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
