//src/tree_json.rs

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::types::HierarchyNode;

/// Pretty-printed JSON (two-space indent). `value` and `percentage` are left out
/// when absent, `children` when empty.
pub fn to_json_string(tree: &HierarchyNode) -> Result<String> {
    Ok(serde_json::to_string_pretty(tree)?)
}

pub fn write_tree<P: AsRef<Path>>(path: P, tree: &HierarchyNode) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, tree)?;
    writer.flush()?;
    log::info!("Wrote hierarchy with {} leaves to {}", tree.leaf_count(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn sample() -> HierarchyNode {
        let mut root = HierarchyNode::root();
        let mut phylum = HierarchyNode::branch("Firmicutes");
        phylum.percentage = Some(1.0);
        phylum.children.push(HierarchyNode {
            name: "Bacillus".to_string(),
            value: Some(3),
            percentage: Some(1.0),
            children: Vec::new(),
        });
        root.children.push(phylum);
        root
    }

    #[test]
    fn test_optional_fields_omitted() {
        let text = to_json_string(&sample()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "root",
                "children": [{
                    "name": "Firmicutes",
                    "percentage": 1.0,
                    "children": [{ "name": "Bacillus", "value": 3, "percentage": 1.0 }]
                }]
            })
        );
        assert!(text.starts_with("{\n  \"name\": \"root\""));
    }

    #[test]
    fn test_write_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxa.json");
        write_tree(&path, &sample()).unwrap();
        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["children"][0]["children"][0]["value"], json!(3));
    }
}
