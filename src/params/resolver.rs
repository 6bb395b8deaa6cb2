use super::base32::base32_decode;
use super::table::CaseTable;
use crate::cache::BoundedCache;
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::json_output::to_inline_string;
use crate::model::{display_opt, CaseResult};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix of the text embedded in reports when a case cannot be resolved
pub const FALLBACK_MARKER: &str = "**FAILED_TO_PARSE**";

type Row = BTreeMap<String, Option<String>>;

/// One decoded `extra_<parentId>_<id>_<name>_<type>` column
#[derive(Debug)]
struct ExtraColumn {
    key: String,
    parent_id: u64,
    id: u64,
    name: String,
    is_bundle: bool,
    raw: Option<String>,
}

/// Recovers the literal input parameters of a case from its test-case table
///
/// Shared by reference between report workers; parsed tables are kept in a
/// [`BoundedCache`].
#[derive(Debug)]
pub struct ParamResolver {
    testcase_dir: PathBuf,
    header_records: usize,
    null_placeholder: String,
    cache: BoundedCache<String, Arc<CaseTable>>,
    extra_key: Regex,
}

impl ParamResolver {
    pub fn new<P: AsRef<Path>>(testcase_dir: P, config: &AnalyzerConfig) -> Result<Self> {
        Ok(Self {
            testcase_dir: testcase_dir.as_ref().to_path_buf(),
            header_records: config.header_records,
            null_placeholder: config.null_placeholder.clone(),
            cache: BoundedCache::new(config.cache_capacity),
            extra_key: Regex::new(
                r"^extra_(?P<parentId>[0-9]+)_(?P<id>[0-9]+)_(?P<name>[^_]+)_(?P<type>[^_]+)$",
            )?,
        })
    }

    /// `<pkg>/<comp>_<strategy>.csv`, relative to the test-case directory
    pub fn table_rel_path(case: &CaseResult) -> String {
        format!(
            "{}/{}_{}.csv",
            case.pkg_name,
            case.comp_name,
            display_opt(&case.strategy)
        )
    }

    pub fn cache(&self) -> &BoundedCache<String, Arc<CaseTable>> {
        &self.cache
    }

    /// Load a table through the cache; `None` when missing or unreadable
    pub fn load_table(&self, rel_path: &str) -> Option<Arc<CaseTable>> {
        if let Some(table) = self.cache.get(rel_path) {
            return Some(table);
        }

        let path = self.testcase_dir.join(rel_path);
        if !path.exists() {
            tracing::error!("Testcase csv file not found: {}", rel_path);
            return None;
        }

        match CaseTable::load(&path, self.header_records) {
            Ok(table) => {
                tracing::debug!(rows = table.len(), "Loaded testcase table {}", rel_path);
                let table = Arc::new(table);
                self.cache.put(rel_path.to_string(), Arc::clone(&table));
                Some(table)
            }
            Err(e) => {
                tracing::error!("Failed to read testcase csv file {}: {}", rel_path, e);
                None
            }
        }
    }

    /// Render the parameters of a case as single-line, key-sorted JSON
    ///
    /// Returns `**FAILED_TO_PARSE** in <table>` when the table is missing or
    /// the case index is out of range.
    pub fn format_case(&self, case: &CaseResult) -> String {
        let rel_path = Self::table_rel_path(case);
        let fallback = format!("{} in {}", FALLBACK_MARKER, rel_path);

        let Some(table) = self.load_table(&rel_path) else {
            return fallback;
        };
        let row = case
            .case_index
            .and_then(|idx| table.row(idx as usize));
        let Some(row) = row else {
            tracing::error!(
                "caseIndex {} of {} exceeded!",
                display_opt(&case.case_index),
                case.comp_qualified_name
            );
            return fallback;
        };

        let decoded = self.decode_row(row, &case.comp_qualified_name);
        match to_inline_string(&decoded) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize testcase of {}: {}", rel_path, e);
                fallback
            }
        }
    }

    /// Rebuild the `category` list and `extra` tree of a raw row
    pub fn decode_row(&self, mut row: Row, component: &str) -> Map<String, Value> {
        let category = row
            .contains_key("category")
            .then(|| self.take_categories(&mut row));
        let extra = row
            .contains_key("extra")
            .then(|| self.take_extras(&mut row, component));

        let mut out: Map<String, Value> = row
            .into_iter()
            .map(|(k, v)| (k, v.map_or(Value::Null, Value::String)))
            .collect();

        if let Some(names) = category {
            if !self.is_null(out.get("category")) {
                out.insert(
                    "category".to_string(),
                    Value::Array(names.into_iter().map(Value::String).collect()),
                );
            }
        }
        if let Some(tree) = extra {
            if !self.is_null(out.get("extra")) {
                out.insert("extra".to_string(), Value::Object(tree));
            }
        }
        out
    }

    fn is_null(&self, value: Option<&Value>) -> bool {
        matches!(value, Some(Value::String(s)) if *s == self.null_placeholder)
    }

    fn is_truthy(&self, cell: &Option<String>) -> bool {
        match cell.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(v) => {
                !(v.eq_ignore_ascii_case("false") || v == "0" || v == self.null_placeholder)
            }
        }
    }

    /// Remove every `category_<token>` column, returning the sorted names of
    /// the set flags
    fn take_categories(&self, row: &mut Row) -> Vec<String> {
        let keys: Vec<String> = row
            .keys()
            .filter(|k| k.starts_with("category_"))
            .cloned()
            .collect();

        let mut names = Vec::new();
        for key in keys {
            let cell = row.remove(&key).flatten();
            if !self.is_truthy(&cell) {
                continue;
            }
            if let Some(name) = base32_decode(&key["category_".len()..]) {
                names.push(name);
            }
        }
        names.sort();
        names
    }

    /// Remove the `extra_*` columns that attach to the tree and build it
    fn take_extras(&self, row: &mut Row, component: &str) -> Map<String, Value> {
        let mut columns = Vec::new();
        for (key, raw) in row.iter() {
            if !key.starts_with("extra_") {
                continue;
            }
            let Some(caps) = self.extra_key.captures(key) else {
                tracing::error!(
                    "Unrecognized extra parameter [{}] of component [{}]",
                    key,
                    component
                );
                continue;
            };
            let (Ok(parent_id), Ok(id)) = (caps["parentId"].parse::<u64>(), caps["id"].parse::<u64>()) else {
                tracing::error!("Extra parameter ids out of range: [{}]", key);
                continue;
            };
            let (Some(name), Some(ty)) = (base32_decode(&caps["name"]), base32_decode(&caps["type"]))
            else {
                continue;
            };

            let is_bundle = ty.eq_ignore_ascii_case("bundle")
                && raw.as_deref() != Some(self.null_placeholder.as_str());
            columns.push(ExtraColumn {
                key: key.clone(),
                parent_id,
                id,
                name,
                is_bundle,
                raw: raw.clone(),
            });
        }
        columns.sort_by_key(|c| (c.parent_id, c.id));

        // Attach columns whose parent is the root or an already-opened bundle
        let mut opened: HashSet<u64> = HashSet::from([0]);
        let mut children: HashMap<u64, Vec<usize>> = HashMap::new();
        for (idx, column) in columns.iter().enumerate() {
            if !opened.contains(&column.parent_id) {
                tracing::debug!("Extra parameter [{}] has no parent node", column.key);
                continue;
            }
            if column.is_bundle {
                opened.insert(column.id);
            }
            children.entry(column.parent_id).or_default().push(idx);
            tracing::debug!("Processed extra parameter [{}] -> [{}]", column.key, column.name);
        }

        let mut path = Vec::new();
        let tree = build_extra_node(0, &columns, &children, &mut path);
        for idx in children.values().flatten() {
            row.remove(&columns[*idx].key);
        }
        tree
    }
}

fn build_extra_node(
    node_id: u64,
    columns: &[ExtraColumn],
    children: &HashMap<u64, Vec<usize>>,
    path: &mut Vec<u64>,
) -> Map<String, Value> {
    let mut node = Map::new();
    let Some(members) = children.get(&node_id) else {
        return node;
    };

    path.push(node_id);
    for &idx in members {
        let column = &columns[idx];
        let value = if column.is_bundle && !path.contains(&column.id) {
            Value::Object(build_extra_node(column.id, columns, children, path))
        } else if column.is_bundle {
            Value::Object(Map::new())
        } else {
            column.raw.clone().map_or(Value::Null, Value::String)
        };
        node.insert(column.name.clone(), value);
    }
    path.pop();
    node
}
