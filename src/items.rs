use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use crate::model::Item;
use crate::util::slug;

const GROUPS: [&str; 3] = ["emotions", "parts", "needs"];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Label(String),
    Item(RawItem),
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    id: Option<String>,
    label: String,
    #[serde(default)]
    weight: Option<f32>,
    #[serde(default, rename = "colorToken", alias = "color")]
    color_token: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

/// Reads items from a JSON file: either a plain array or an object of category groups.
pub fn load_items(path: &Path) -> Result<Vec<Item>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read items from {}", path.display()))?;
    parse_items(&raw).with_context(|| format!("invalid items file {}", path.display()))
}

pub fn parse_items(raw: &str) -> Result<Vec<Item>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON")?;
    let mut ids = HashSet::new();

    match parsed {
        Value::Array(entries) => collect_entries(entries, None, &mut ids),
        Value::Object(mut object) => {
            let mut items = Vec::new();
            let mut found = false;
            for group in GROUPS {
                let Some(value) = object.remove(group) else {
                    continue;
                };
                found = true;
                let entries = match value {
                    Value::Array(entries) => entries,
                    Value::Null => continue,
                    _ => return Err(anyhow!("\"{group}\" must be an array")),
                };
                items.extend(collect_entries(entries, Some(group), &mut ids)?);
            }

            if !found {
                return Err(anyhow!(
                    "expected an array of items or an object with emotions, parts or needs"
                ));
            }
            Ok(items)
        }
        _ => Err(anyhow!("unexpected JSON type for items")),
    }
}

fn collect_entries(
    entries: Vec<Value>,
    group: Option<&str>,
    ids: &mut HashSet<String>,
) -> Result<Vec<Item>> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let entry = RawEntry::deserialize(value)
                .with_context(|| format!("invalid item at index {index}"))?;
            Ok(into_item(entry, group, ids))
        })
        .collect()
}

fn into_item(entry: RawEntry, group: Option<&str>, ids: &mut HashSet<String>) -> Item {
    let raw = match entry {
        RawEntry::Label(label) => RawItem {
            id: None,
            label,
            weight: None,
            color_token: None,
            category: None,
        },
        RawEntry::Item(raw) => raw,
    };

    let base = raw
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| slug(&raw.label));
    let id = unique_id(base, ids);
    let category = raw
        .category
        .or_else(|| group.map(str::to_owned))
        .unwrap_or_default();

    let mut item = Item::new(id, raw.label, raw.weight.unwrap_or(1.0)).with_category(category);
    if let Some(color_token) = raw.color_token {
        item = item.with_color(color_token);
    }
    item
}

fn unique_id(base: String, ids: &mut HashSet<String>) -> String {
    if ids.insert(base.clone()) {
        return base;
    }

    let mut suffix = 2;
    loop {
        let candidate = format!("{base}-{suffix}");
        if ids.insert(candidate.clone()) {
            tracing::debug!(id = %candidate, "duplicate item id renamed");
            return candidate;
        }
        suffix += 1;
    }
}

/// Built-in set shown when the viewer starts without an items file.
pub fn demo_items() -> Vec<Item> {
    let entries: [(&str, f32, &str, &str); 10] = [
        ("Anxious", 9.0, "emotion", "#e07a5f"),
        ("Hopeful", 4.0, "emotion", "#81b29a"),
        ("Tired", 2.0, "emotion", "#9a8c98"),
        ("Frustrated", 3.0, "emotion", "#d62828"),
        ("Inner Critic", 6.0, "part", "#3d405b"),
        ("Protector", 3.0, "part", "#5f0f40"),
        ("Exile", 1.0, "part", "#6d597a"),
        ("Rest", 5.0, "need", "#f2cc8f"),
        ("Connection", 4.0, "need", "#118ab2"),
        ("Safety", 2.0, "need", "#06d6a0"),
    ];

    entries
        .into_iter()
        .map(|(label, weight, category, color)| {
            Item::new(slug(label), label, weight)
                .with_category(category)
                .with_color(color)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    #[test]
    fn parses_plain_array() {
        let items = parse_items(
            r##"[
                {"id": "a", "label": "Anxious", "weight": 9, "colorToken": "#ff0000", "category": "emotion"},
                {"label": "Inner Critic", "category": "part"}
            ]"##,
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[0].color_token, "#ff0000");
        assert_eq!(items[1].id, "inner-critic");
        assert_eq!(items[1].weight, 1.0);
        assert_eq!(items[1].category(), Category::Part);
    }

    #[test]
    fn parses_grouped_object() {
        let items = parse_items(
            r#"{
                "emotions": ["Sad", {"label": "Calm", "weight": 2}],
                "needs": [{"label": "Rest", "weight": 4, "color": "sand"}]
            }"#,
        )
        .unwrap();

        let ids = items.iter().map(|item| item.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["sad", "calm", "rest"]);
        assert_eq!(items[0].category(), Category::Emotion);
        assert_eq!(items[2].category(), Category::Need);
        assert_eq!(items[2].color_token, "sand");
    }

    #[test]
    fn duplicate_ids_are_suffixed() {
        let items = parse_items(r#"["Sad", "sad", "SAD"]"#).unwrap();
        let ids = items.iter().map(|item| item.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["sad", "sad-2", "sad-3"]);
    }

    #[test]
    fn rejects_unexpected_shapes() {
        assert!(parse_items("42").is_err());
        assert!(parse_items(r#"{"moods": []}"#).is_err());
        assert!(parse_items(r#"{"emotions": "sad"}"#).is_err());
        assert!(parse_items(r#"[{"weight": 3}]"#).is_err());
        assert!(parse_items("not json").is_err());
    }

    #[test]
    fn demo_items_have_unique_ids() {
        let items = demo_items();
        let ids = items.iter().map(|item| item.id.as_str()).collect::<HashSet<_>>();
        assert_eq!(ids.len(), items.len());
    }

    #[test]
    fn missing_file_reports_path() {
        let error = load_items(Path::new("/nonexistent/items.json")).unwrap_err();
        assert!(format!("{error:#}").contains("/nonexistent/items.json"));
    }
}
