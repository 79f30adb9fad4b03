//! Board column mapping between the two repositories

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::zenhub::Board;

/// Source pipeline name to target pipeline id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineMap {
    ids: BTreeMap<String, String>,
    unmatched: Vec<String>,
}

impl PipelineMap {
    /// Match source columns to target columns by name
    ///
    /// A name found exactly once on the target board wins. Otherwise
    /// `overrides` may name the target column to use instead. Columns that
    /// still have no match are logged and listed in [`unmatched`]; their
    /// issues stay in the target's default column.
    ///
    /// [`unmatched`]: PipelineMap::unmatched
    pub fn build(source: &Board, target: &Board, overrides: &BTreeMap<String, String>) -> Self {
        let mut map = Self::default();

        for pipeline in &source.pipelines {
            if let [found] = target.pipeline_named(&pipeline.name).as_slice() {
                map.ids.insert(pipeline.name.clone(), found.id.clone());
                continue;
            }

            match overrides.get(&pipeline.name) {
                Some(override_name) => match target.pipeline_named(override_name).as_slice() {
                    [found] => {
                        debug!(source = %pipeline.name, target = %override_name, "Pipeline mapped by override");
                        map.ids.insert(pipeline.name.clone(), found.id.clone());
                    }
                    _ => {
                        warn!(
                            source = %pipeline.name,
                            target = %override_name,
                            "Pipeline override names no single target pipeline; issues stay in the default pipeline"
                        );
                        map.unmatched.push(pipeline.name.clone());
                    }
                },
                None => {
                    warn!(
                        source = %pipeline.name,
                        "No matching target pipeline; issues stay in the default pipeline"
                    );
                    map.unmatched.push(pipeline.name.clone());
                }
            }
        }

        map
    }

    /// Target pipeline id for a source pipeline name
    pub fn get(&self, source_name: &str) -> Option<&str> {
        self.ids.get(source_name).map(String::as_str)
    }

    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zenhub::Pipeline;

    fn board(columns: &[(&str, &str)]) -> Board {
        Board {
            pipelines: columns
                .iter()
                .map(|(id, name)| Pipeline {
                    id: id.to_string(),
                    name: name.to_string(),
                    issues: vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn test_match_by_name_and_override() {
        let source = board(&[("s1", "New Issues"), ("s2", "In Review"), ("s3", "Icebox")]);
        let target = board(&[("t1", "New Issues"), ("t2", "Code Review")]);
        let overrides = BTreeMap::from([("In Review".to_string(), "Code Review".to_string())]);

        let map = PipelineMap::build(&source, &target, &overrides);

        assert_eq!(map.get("New Issues"), Some("t1"));
        assert_eq!(map.get("In Review"), Some("t2"));
        assert_eq!(map.get("Icebox"), None);
        assert_eq!(map.unmatched(), ["Icebox".to_string()]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_broken_override_is_unmatched() {
        let source = board(&[("s1", "Dev")]);
        let target = board(&[("t1", "Development")]);
        let overrides = BTreeMap::from([("Dev".to_string(), "Develop".to_string())]);

        let map = PipelineMap::build(&source, &target, &overrides);
        assert!(map.is_empty());
        assert_eq!(map.unmatched(), ["Dev".to_string()]);
    }

    #[test]
    fn test_duplicate_target_names_do_not_match() {
        let source = board(&[("s1", "Done")]);
        let target = board(&[("t1", "Done"), ("t2", "Done")]);

        let map = PipelineMap::build(&source, &target, &BTreeMap::new());
        assert_eq!(map.get("Done"), None);
    }
}
