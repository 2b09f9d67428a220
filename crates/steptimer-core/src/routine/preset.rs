use serde::{Deserialize, Serialize};

use super::step::{total_seconds, Step};

/// A named, reusable step list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub steps: Vec<Step>,
}

impl Preset {
    pub fn total_seconds(&self) -> u64 {
        total_seconds(&self.steps)
    }

    /// Lenient decode of a stored preset. The preset is dropped when `id`,
    /// `name` or `steps` have the wrong shape; malformed steps inside an
    /// otherwise valid preset are filtered out individually.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let id = value.get("id")?.as_str()?;
        let name = value.get("name")?.as_str()?;
        let steps = value.get("steps")?.as_array()?;
        Some(Self {
            id: id.to_string(),
            name: name.to_string(),
            steps: steps.iter().filter_map(Step::from_value).collect(),
        })
    }
}

fn step(name: &str, seconds: u64) -> Step {
    Step {
        name: name.into(),
        seconds,
    }
}

/// Presets installed on first run.
pub fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset {
            id: "default-housework".into(),
            name: "家事ルーティン".into(),
            steps: vec![
                step("洗い物をする", 300),
                step("机を片付ける", 180),
                step("床を掃除する", 300),
                step("ゴミをまとめる", 180),
            ],
        },
        Preset {
            id: "default-workout".into(),
            name: "筋トレルーティン".into(),
            steps: vec![
                step("スクワット", 60),
                step("腕立て伏せ", 45),
                step("プランク", 45),
                step("ストレッチ", 120),
            ],
        },
        Preset {
            id: "default-study".into(),
            name: "勉強ルーティン".into(),
            steps: vec![
                step("集中勉強タイム", 1500),
                step("休憩", 300),
                step("復習タイム", 900),
            ],
        },
    ]
}

/// Result of [`PresetBook::upsert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Inserted { id: String },
    Overwritten { id: String },
}

/// Ordered preset collection.
///
/// Names are not unique at the data level; lookups by name return the first
/// match, which is what overwrite detection uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetBook {
    presets: Vec<Preset>,
}

impl PresetBook {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_presets())
    }

    pub fn as_slice(&self) -> &[Preset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Look up by id first, then by exact name.
    pub fn resolve(&self, key: &str) -> Option<&Preset> {
        self.find_by_id(key).or_else(|| self.find_by_name(key))
    }

    /// Overwrite the steps of the first preset called `name`, or append a new
    /// preset with a generated id. An overwrite keeps id and position.
    pub fn upsert(&mut self, name: &str, steps: &[Step]) -> Upsert {
        if let Some(existing) = self.presets.iter_mut().find(|p| p.name == name) {
            existing.steps = steps.to_vec();
            return Upsert::Overwritten {
                id: existing.id.clone(),
            };
        }
        let id = new_preset_id();
        self.presets.push(Preset {
            id: id.clone(),
            name: name.to_string(),
            steps: steps.to_vec(),
        });
        Upsert::Inserted { id }
    }

    pub fn remove(&mut self, id: &str) -> Option<Preset> {
        let pos = self.presets.iter().position(|p| p.id == id)?;
        Some(self.presets.remove(pos))
    }
}

fn new_preset_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("user-{}", &uuid[..12])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtins_are_three_named_routines() {
        let book = PresetBook::builtin();
        assert_eq!(book.len(), 3);
        let workout = book.find_by_id("default-workout").unwrap();
        assert_eq!(workout.steps.len(), 4);
        assert_eq!(workout.total_seconds(), 60 + 45 + 45 + 120);
        assert_eq!(book.find_by_id("default-study").unwrap().steps[0].seconds, 1500);
    }

    #[test]
    fn upsert_inserts_then_overwrites_in_place() {
        let mut book = PresetBook::builtin();
        let steps = vec![step("a", 10)];

        let id = match book.upsert("mine", &steps) {
            Upsert::Inserted { id } => id,
            other => panic!("expected insert, got {other:?}"),
        };
        assert!(id.starts_with("user-"));
        assert_eq!(book.len(), 4);

        let more = vec![step("b", 20), step("c", 30)];
        assert_eq!(
            book.upsert("mine", &more),
            Upsert::Overwritten { id: id.clone() }
        );
        assert_eq!(book.len(), 4);
        assert_eq!(book.as_slice()[3].steps, more);
    }

    #[test]
    fn resolve_prefers_id() {
        let book = PresetBook::builtin();
        assert_eq!(book.resolve("default-study").unwrap().name, "勉強ルーティン");
        assert_eq!(book.resolve("筋トレルーティン").unwrap().id, "default-workout");
        assert!(book.resolve("nope").is_none());
    }

    #[test]
    fn remove_by_id() {
        let mut book = PresetBook::builtin();
        assert!(book.remove("default-housework").is_some());
        assert!(book.remove("default-housework").is_none());
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn from_value_filters_bad_steps_but_keeps_preset() {
        let preset = Preset::from_value(&json!({
            "id": "p1",
            "name": "mixed",
            "steps": [
                {"name": "ok", "seconds": 5},
                {"name": "bad", "seconds": "x"},
                {"seconds": 3},
                {"name": "tiny", "seconds": -2}
            ]
        }))
        .unwrap();
        assert_eq!(preset.steps, vec![step("ok", 5), step("tiny", 1)]);

        assert!(Preset::from_value(&json!({"id": 1, "name": "x", "steps": []})).is_none());
        assert!(Preset::from_value(&json!({"id": "a", "name": "x"})).is_none());
    }
}
