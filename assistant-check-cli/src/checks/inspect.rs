use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{truncate, Finding};

/// Entries of a list shown in diagnostics
const SAMPLE_SIZE: usize = 5;

/// Macro keys reported with a generated diet plan
const MACRO_KEYS: [&str; 4] = ["calories", "protein_g", "carbs_g", "fat_g"];

/// Tool-specific diagnostics for a tool result
///
/// Inspectors only add findings; whether a check passes is decided by the
/// expectation's keys and keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inspector {
    /// A member search expected to return one specific member
    MemberLookup { name: String, email: String },

    MemberList {
        #[serde(default)]
        expected_names: Vec<String>,
    },

    DietPlan {
        required_sections: Vec<String>,
        min_sections: usize,
    },

    Dashboard {
        fields: Vec<String>,
        min_fields: usize,
    },

    Workouts,

    Activity,
}

impl Inspector {
    pub fn inspect(&self, result: &Value, findings: &mut Vec<Finding>) {
        let Some(result) = result.as_object() else {
            findings.push(Finding::warning(format!("Tool result is not an object: {}", result)));
            return;
        };

        match self {
            Inspector::MemberLookup { name, email } => member_lookup(result, name, email, findings),
            Inspector::MemberList { expected_names } => {
                member_list(result, expected_names, findings)
            }
            Inspector::DietPlan {
                required_sections,
                min_sections,
            } => diet_plan(result, required_sections, *min_sections, findings),
            Inspector::Dashboard { fields, min_fields } => {
                dashboard(result, fields, *min_fields, findings)
            }
            Inspector::Workouts => workouts(result, findings),
            Inspector::Activity => activity(result, findings),
        }
    }
}

/// Shape report for each expected key of a tool result
pub(super) fn describe_keys(result: &Value, keys: &[String], findings: &mut Vec<Finding>) {
    for key in keys {
        let Some(data) = result.get(key.as_str()) else {
            continue;
        };

        findings.push(Finding::success(format!("Found key: {}", key)));
        match data {
            Value::Array(items) => {
                findings.push(Finding::info(format!("  Count: {}", items.len())));
                if let Some(first) = items.first() {
                    findings.push(Finding::info(format!(
                        "  Sample: {}",
                        truncate(&first.to_string(), 100)
                    )));
                }
            }
            Value::Object(map) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                findings.push(Finding::info(format!("  Keys: {}", keys.join(", "))));
            }
            other => findings.push(Finding::info(format!("  Value: {}", other))),
        }
    }
}

fn text<'a>(object: &'a Map<String, Value>, key: &str) -> &'a str {
    object.get(key).and_then(Value::as_str).unwrap_or("Unknown")
}

fn display(object: &Map<String, Value>, key: &str, fallback: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => fallback.to_string(),
        Some(other) => other.to_string(),
    }
}

fn flag(object: &Map<String, Value>, key: &str) -> bool {
    object.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn objects(value: Option<&Value>) -> Vec<&Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default()
}

fn member_lookup(
    result: &Map<String, Value>,
    name: &str,
    email: &str,
    findings: &mut Vec<Finding>,
) {
    let members = objects(result.get("members"));
    let Some(member) = members.first() else {
        if result.contains_key("members") {
            findings.push(Finding::warning("No members found in tool results"));
        }
        return;
    };

    findings.push(Finding::info(format!("Found member: {}", text(member, "name"))));
    findings.push(Finding::info(format!("Email: {}", text(member, "email"))));
    findings.push(Finding::info(format!("Trainer: {}", text(member, "trainer_name"))));
    findings.push(Finding::info(format!("Has diet: {}", flag(member, "has_diet"))));
    findings.push(Finding::info(format!("Has workout: {}", flag(member, "has_workout"))));

    if text(member, "name") == name && text(member, "email") == email {
        findings.push(Finding::success(format!(
            "Found expected member {} with correct data",
            name
        )));
    } else {
        findings.push(Finding::warning("Found member but not the expected one"));
    }
}

fn member_list(result: &Map<String, Value>, expected: &[String], findings: &mut Vec<Finding>) {
    if !result.contains_key("members") {
        return;
    }

    let members = objects(result.get("members"));
    let count = result
        .get("count")
        .and_then(Value::as_u64)
        .unwrap_or(members.len() as u64);
    findings.push(Finding::info(format!("Found {} members:", count)));

    let mut found = Vec::new();
    for member in members.iter().take(SAMPLE_SIZE) {
        let name = text(member, "name");
        findings.push(Finding::info(format!("  {} ({})", name, text(member, "email"))));
        if expected.iter().any(|e| e == name) {
            found.push(name);
        }
    }

    if !found.is_empty() {
        findings.push(Finding::success(format!("Found expected members: {}", found.join(", "))));
    } else if count == 0 {
        findings.push(Finding::warning("No members found but tool is working"));
    }
}

fn diet_plan(
    result: &Map<String, Value>,
    sections: &[String],
    min_sections: usize,
    findings: &mut Vec<Finding>,
) {
    if let Some(plan) = result.get("diet_plan").and_then(Value::as_str) {
        findings.push(Finding::info(format!(
            "Diet plan generated ({} characters)",
            plan.chars().count()
        )));

        let mut present = 0;
        for section in sections {
            if plan.contains(section.as_str()) {
                present += 1;
                findings.push(Finding::success(format!("Found: {}", section)));
            } else {
                findings.push(Finding::missing(format!("Missing: {}", section)));
            }
        }

        if present >= min_sections {
            findings.push(Finding::success("Diet plan contains most required components"));
        } else {
            findings.push(Finding::warning(format!(
                "Diet plan missing some components ({}/{})",
                present,
                sections.len()
            )));
        }
    }

    if let Some(macros) = result.get("macros").and_then(Value::as_object) {
        findings.push(Finding::info("Calculated macros:"));
        findings.push(Finding::info(format!("  Calories: {}", display(macros, "calories", "N/A"))));
        findings.push(Finding::info(format!("  Protein: {}g", display(macros, "protein_g", "N/A"))));
        findings.push(Finding::info(format!("  Carbs: {}g", display(macros, "carbs_g", "N/A"))));
        findings.push(Finding::info(format!("  Fat: {}g", display(macros, "fat_g", "N/A"))));

        if MACRO_KEYS.iter().all(|key| macros.contains_key(*key)) {
            findings.push(Finding::success("All macros calculated"));
        } else {
            findings.push(Finding::warning("Some macros are missing"));
        }
    }
}

fn dashboard(
    result: &Map<String, Value>,
    fields: &[String],
    min_fields: usize,
    findings: &mut Vec<Finding>,
) {
    let Some(stats) = result.get("dashboard").and_then(Value::as_object) else {
        return;
    };
    findings.push(Finding::info("Dashboard data found:"));

    let mut present = 0;
    for field in fields {
        match stats.get(field.as_str()) {
            Some(value) => {
                present += 1;
                findings.push(Finding::success(format!("{}: {}", field, value)));
            }
            None => findings.push(Finding::missing(format!("Missing: {}", field))),
        }
    }

    if present >= min_fields {
        findings.push(Finding::success("Dashboard contains expected stats"));
    } else {
        findings.push(Finding::warning(format!(
            "Dashboard missing some fields ({}/{})",
            present,
            fields.len()
        )));
    }
}

fn workouts(result: &Map<String, Value>, findings: &mut Vec<Finding>) {
    if !result.contains_key("workouts") {
        return;
    }

    let workouts = objects(result.get("workouts"));
    findings.push(Finding::info(format!("Found {} workouts:", workouts.len())));

    for workout in workouts.iter().take(SAMPLE_SIZE) {
        let description = workout
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("No description");
        findings.push(Finding::info(format!(
            "  {} - {} - {}",
            text(workout, "name"),
            text(workout, "difficulty"),
            truncate(description, 50)
        )));
    }

    if workouts.is_empty() {
        findings.push(Finding::warning("Workout list is empty"));
    }
}

fn activity(result: &Map<String, Value>, findings: &mut Vec<Finding>) {
    if !result.contains_key("activity") && !result.contains_key("summary") {
        return;
    }

    let days = objects(result.get("activity"));
    findings.push(Finding::info(format!("Days tracked: {}", days.len())));

    if let Some(summary) = result.get("summary").and_then(Value::as_object) {
        findings.push(Finding::info(format!("  Total steps: {}", display(summary, "total_steps", "0"))));
        findings.push(Finding::info(format!(
            "  Total distance: {} km",
            display(summary, "total_distance_km", "0")
        )));
        findings.push(Finding::info(format!(
            "  Total calories: {}",
            display(summary, "total_calories", "0")
        )));
        findings.push(Finding::info(format!(
            "  Avg steps/day: {}",
            display(summary, "avg_steps_per_day", "0")
        )));
    }

    for day in days.iter().take(3) {
        findings.push(Finding::info(format!(
            "  {}: {} steps, {}km, {}kcal",
            text(day, "activity_date"),
            display(day, "steps", "0"),
            display(day, "distance_km", "0"),
            display(day, "calories_kcal", "0")
        )));
    }
}
