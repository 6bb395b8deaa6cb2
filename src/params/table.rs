use crate::error::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// Parsed test-case table of one component and strategy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CaseTable {
    /// Read a table, skipping the `header_records` records that precede
    /// the column header row
    pub fn load<P: AsRef<Path>>(path: P, header_records: usize) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path.as_ref())?;
        Self::from_reader(reader, header_records)
    }

    pub fn from_csv_str(content: &str, header_records: usize) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());
        Self::from_reader(reader, header_records)
    }

    fn from_reader<R: std::io::Read>(
        mut reader: csv::Reader<R>,
        header_records: usize,
    ) -> Result<Self> {
        let mut records = reader.records().skip(header_records);

        let headers = match records.next() {
            Some(record) => record?.iter().map(|s| s.to_string()).collect(),
            None => Vec::new(),
        };
        let rows = records
            .map(|record| record.map(|r| r.iter().map(|s| s.to_string()).collect()))
            .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of test cases
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column name → cell of one case; empty or missing cells are `None`
    pub fn row(&self, index: usize) -> Option<BTreeMap<String, Option<String>>> {
        let cells = self.rows.get(index)?;
        Some(
            self.headers
                .iter()
                .enumerate()
                .map(|(col, name)| {
                    let cell = cells.get(col).filter(|c| !c.is_empty()).cloned();
                    (name.clone(), cell)
                })
                .collect(),
        )
    }
}
