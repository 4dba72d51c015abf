//! Configuration file parsing
//!
//! run.yml is a stream of up to two YAML documents. The first maps raw task
//! names to shell code, nested entries, or `{code, desc}` mappings; comment
//! lines directly above a top-level key become that task's description. The
//! second, optional document is a free-form options mapping.

use crate::config::types::{Options, RunConfig, TaskDescriptor, TaskValue};
use crate::error::{ConfigError, Result};
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "run.yml";

/// Name of the synthetic root task
pub const ROOT_TASK_NAME: &str = "run";

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> Result<RunConfig> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.display().to_string()).into());
    }

    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse configuration from a string
pub fn parse_config(contents: &str) -> Result<RunConfig> {
    // Read the document stream
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(contents) {
        documents.push(Value::deserialize(document)?);
    }

    let first = documents
        .first()
        .ok_or_else(|| ConfigError::Invalid("configuration is empty".to_string()))?;
    let mapping = first.as_mapping().ok_or_else(|| {
        ConfigError::Invalid("first document must be a mapping of tasks".to_string())
    })?;

    // Keys in file order, for comment attachment below
    let mut keyed: Vec<(String, &Value)> = Vec::new();
    for (key, value) in mapping {
        if let Some(name) = key.as_str() {
            keyed.push((name.to_string(), value));
        }
    }

    // Attach preceding comment lines to the task they describe. Entries are
    // collected in file order: a top-level key line flushes the accumulated
    // comment buffer into that task's description, and any other non-comment
    // line clears the buffer.
    let mut comments: Vec<String> = Vec::new();
    let mut entries: Vec<TaskDescriptor> = Vec::new();
    for line in contents.lines() {
        if let Some(text) = line.strip_prefix("# ") {
            comments.push(text.to_string());
            continue;
        }

        let key = line.split(':').next().unwrap_or("");
        for (name, value) in &keyed {
            if key == name {
                entries.push(descriptor_from_value(name, value, comments.join("\n"))?);
            }
        }

        comments.clear();
    }

    let options = match documents.get(1) {
        Some(Value::Null) | None => Options::default(),
        Some(value) => serde_yaml::from_value(value.clone())?,
    };

    Ok(RunConfig {
        root: TaskDescriptor::group(ROOT_TASK_NAME, entries),
        options,
    })
}

/// Build a descriptor from one raw configuration value
fn descriptor_from_value(name: &str, value: &Value, desc: String) -> Result<TaskDescriptor> {
    match value {
        Value::String(code) => Ok(TaskDescriptor {
            name: name.to_string(),
            desc,
            value: TaskValue::Code(code.clone()),
        }),
        Value::Sequence(items) => {
            if items.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "task '{}' has an empty list of subtasks",
                    name
                ))
                .into());
            }
            let mut children = Vec::with_capacity(items.len());
            for item in items {
                children.push(child_descriptor(item)?);
            }
            Ok(TaskDescriptor {
                name: name.to_string(),
                desc,
                value: TaskValue::Children(children),
            })
        }
        Value::Mapping(_) => {
            // Detailed form: {code: ..., desc: ...}
            let code = value.get("code").ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "task '{}' must map to a string, a list, or a code/desc mapping",
                    name
                ))
            })?;
            let desc = value
                .get("desc")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(desc);
            descriptor_from_value(name, code, desc)
        }
        _ => Err(ConfigError::Invalid(format!(
            "task '{}' must map to a string, a list, or a code/desc mapping",
            name
        ))
        .into()),
    }
}

/// Build a descriptor from one list entry; bare strings become unnamed leaves
fn child_descriptor(item: &Value) -> Result<TaskDescriptor> {
    match item {
        Value::String(code) => Ok(TaskDescriptor::leaf("", code.clone())),
        Value::Mapping(mapping) => {
            let (key, value) = mapping.iter().next().ok_or_else(|| {
                ConfigError::Invalid("task entry must not be an empty mapping".to_string())
            })?;
            let name = key.as_str().ok_or_else(|| {
                ConfigError::Invalid("task names must be strings".to_string())
            })?;
            descriptor_from_value(name, value, String::new())
        }
        _ => Err(ConfigError::Invalid(
            "task entries must be strings or single-key mappings".to_string(),
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_config() {
        let yaml = "build: cargo build\ntest: cargo test\n";
        let config = parse_config(yaml).unwrap();

        let TaskValue::Children(entries) = &config.root.value else {
            panic!("root must be composite");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "build");
        assert!(matches!(&entries[0].value, TaskValue::Code(c) if c == "cargo build"));
    }

    #[test]
    fn test_comments_become_descriptions() {
        let yaml = "\
# Build the project
# in release mode
build: cargo build

test: cargo test
";
        let config = parse_config(yaml).unwrap();
        let TaskValue::Children(entries) = &config.root.value else {
            panic!("root must be composite");
        };
        assert_eq!(entries[0].desc, "Build the project\nin release mode");
        assert_eq!(entries[1].desc, "");
    }

    #[test]
    fn test_comment_buffer_clears_after_gap() {
        let yaml = "\
# Stale comment
build: cargo build
test: cargo test
";
        let config = parse_config(yaml).unwrap();
        let TaskValue::Children(entries) = &config.root.value else {
            panic!("root must be composite");
        };
        // The buffer is consumed by the first key line and cleared after it
        assert_eq!(entries[1].desc, "");
    }

    #[test]
    fn test_nested_entries_and_bare_strings() {
        let yaml = "\
release:
  - echo preparing
  - publish: cargo publish
";
        let config = parse_config(yaml).unwrap();
        let TaskValue::Children(entries) = &config.root.value else {
            panic!("root must be composite");
        };
        let TaskValue::Children(children) = &entries[0].value else {
            panic!("release must be composite");
        };
        assert_eq!(children[0].name, "");
        assert_eq!(children[1].name, "publish");
    }

    #[test]
    fn test_detailed_code_desc_mapping() {
        let yaml = "\
deploy:
  - push:
      code: git push
      desc: Push to the remote
";
        let config = parse_config(yaml).unwrap();
        let TaskValue::Children(entries) = &config.root.value else {
            panic!("root must be composite");
        };
        let TaskValue::Children(children) = &entries[0].value else {
            panic!("deploy must be composite");
        };
        assert_eq!(children[0].desc, "Push to the remote");
        assert!(matches!(&children[0].value, TaskValue::Code(c) if c == "git push"));
    }

    #[test]
    fn test_options_document() {
        let yaml = "build: cargo build\n---\nfaketty: true\n";
        let config = parse_config(yaml).unwrap();
        assert!(config.options.faketty);
    }

    #[test]
    fn test_missing_options_document_defaults() {
        let config = parse_config("build: cargo build\n").unwrap();
        assert!(!config.options.faketty);
    }

    #[test]
    fn test_invalid_task_value() {
        let result = parse_config("build: 42\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_subtask_list_is_rejected() {
        let result = parse_config("build: []\n");
        assert!(matches!(
            result,
            Err(crate::error::RunError::Config(ConfigError::Invalid(message)))
                if message.contains("empty list")
        ));
    }
}
