//! Task-section splitting for PoE logs.
//!
//! A log is cut at every `Task Name : <name>` line. The marker line opens
//! the new section; lines before the first marker form a section with an
//! empty name. A marker with a blank name continues the current section.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use report_extract_core::DuplicateSectionPolicy;

use crate::error::{ExtractError, Result};

static TASK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Task Name\s*:\s*(.*)").expect("valid task name regex"));

/// A named, ordered line range of one log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub lines: Vec<String>,
}

/// Ordered mapping of task name to its section.
#[derive(Debug, Clone, Default)]
pub struct SectionMap {
    sections: IndexMap<String, Section>,
}

impl SectionMap {
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// Named task sections; the unnamed preamble is only returned when the
    /// log has no task markers at all.
    pub fn tasks(&self) -> impl Iterator<Item = &Section> {
        let has_named = self.sections.keys().any(|name| !name.is_empty());
        self.sections
            .values()
            .filter(move |section| !has_named || !section.name.is_empty())
    }

    fn seal(&mut self, name: String, lines: Vec<String>, policy: DuplicateSectionPolicy) -> Result<()> {
        match self.sections.get_mut(&name) {
            Some(existing) => match policy {
                DuplicateSectionPolicy::Merge => {
                    debug!(section = %name, lines = lines.len(), "Merging repeated task section");
                    existing.lines.extend(lines);
                }
                DuplicateSectionPolicy::Reject => {
                    return Err(ExtractError::DuplicateSection(name));
                }
            },
            None => {
                self.sections.insert(name.clone(), Section { name, lines });
            }
        }
        Ok(())
    }
}

/// Returns the task name when `line` is a `Task Name : <name>` marker.
pub fn task_name(line: &str) -> Option<String> {
    TASK_NAME
        .captures(line)
        .map(|caps| caps[1].trim().to_string())
}

/// Splits one log into task sections, preserving line order.
pub fn split_sections(lines: &[String], policy: DuplicateSectionPolicy) -> Result<SectionMap> {
    let mut map = SectionMap::default();
    let mut current_name = String::new();
    let mut current_lines: Vec<String> = Vec::new();

    for line in lines {
        if let Some(name) = task_name(line).filter(|name| !name.is_empty()) {
            if !current_lines.is_empty() || !current_name.is_empty() {
                let sealed = std::mem::take(&mut current_lines);
                map.seal(std::mem::replace(&mut current_name, name), sealed, policy)?;
            } else {
                current_name = name;
            }
        }
        current_lines.push(line.clone());
    }

    if !current_lines.is_empty() {
        map.seal(current_name, current_lines, policy)?;
    }

    Ok(map)
}
