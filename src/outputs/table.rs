//! Tabular view of a retrieval.
//!
//! One header row followed by one row per record, columns in the order of
//! [`HEADER`].

use crate::models::ArticleRecord;
use serde::Serialize;
use serde_json::{Value, json};

/// Column titles of the results sheet.
pub const HEADER: [&str; 6] = [
    "Title",
    "Description",
    "Date",
    "Picture Filename",
    "# of query in title/desc",
    "Has Money",
];

/// Header plus data rows, ready to be written out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<Vec<Value>>,
}

impl ResultTable {
    /// A table holding only the header row.
    pub fn new() -> Self {
        Self {
            rows: vec![HEADER.iter().map(|h| json!(h)).collect()],
        }
    }

    /// Append one record as a data row.
    pub fn push(&mut self, record: &ArticleRecord) {
        self.rows.push(vec![
            json!(record.title),
            json!(record.description),
            json!(record.published_date),
            json!(record.image_path),
            json!(record.query_match_count),
            json!(record.mentions_money),
        ]);
    }

    /// All rows, header first.
    #[cfg(test)]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of data rows (header excluded).
    pub fn data_len(&self) -> usize {
        self.rows.len() - 1
    }
}

impl Default for ResultTable {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FromIterator<&'a ArticleRecord> for ResultTable {
    fn from_iter<I: IntoIterator<Item = &'a ArticleRecord>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.push(record);
        }
        table
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(title: &str, count: i64, money: bool) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            description: format!("{title} desc"),
            published_date: "24-06-10".to_string(),
            image_path: "image not found".to_string(),
            query_match_count: count,
            mentions_money: money,
        }
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let table = ResultTable::new();
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.data_len(), 0);
        assert_eq!(table.rows()[0][4], json!("# of query in title/desc"));
    }

    #[test]
    fn test_rows_follow_header_order() {
        let records = vec![record("a", 2, true), record("b", -1, false)];
        let table: ResultTable = records.iter().collect();

        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.data_len(), 2);
        assert_eq!(
            table.rows()[1],
            vec![
                json!("a"),
                json!("a desc"),
                json!("24-06-10"),
                json!("image not found"),
                json!(2),
                json!(true),
            ]
        );
        assert_eq!(table.rows()[2][4], json!(-1));
    }
}
