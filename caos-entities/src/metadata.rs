use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured metadata document of an entity (a JSON object column in the
/// store). Well-known keys get typed accessors; everything else stays an
/// open map to keep author-defined fields round-trippable.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

/// One entry of the per-world upload journal (`gallery_log`).
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub uploader: String,
    #[serde(default)]
    pub date: String,
}

/// Historical state of a world, keyed to a year under `metadata.timeline`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub description: String,
    pub metadata: Metadata,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    // --- Well-known fields -------------------------------------------------

    pub fn cover_image(&self) -> Option<&str> {
        self.get_str("cover_image")
    }

    pub fn set_cover_image(&mut self, filename: impl Into<String>) {
        self.insert("cover_image", Value::String(filename.into()));
    }

    pub fn tipo_entidad(&self) -> Option<&str> {
        self.get_str("tipo_entidad")
    }

    pub fn set_tipo_entidad(&mut self, tipo: impl Into<String>) {
        self.insert("tipo_entidad", Value::String(tipo.into()));
    }

    /// Raw `chronology.start_year` / `chronology.end_year` values; coercion
    /// is left to the temporal validator, which treats unparseable years as
    /// under-specification.
    pub fn chronology_year(&self, which: &str) -> Option<&Value> {
        self.get("chronology")
            .and_then(Value::as_object)
            .and_then(|chrono| chrono.get(which))
    }

    pub fn set_chronology(&mut self, start_year: Option<i64>, end_year: Option<i64>) {
        let mut chrono = Map::new();
        if let Some(y) = start_year {
            chrono.insert("start_year".into(), Value::from(y));
        }
        if let Some(y) = end_year {
            chrono.insert("end_year".into(), Value::from(y));
        }
        self.insert("chronology", Value::Object(chrono));
    }

    // --- Timeline ----------------------------------------------------------

    pub fn timeline_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .get("timeline")
            .and_then(Value::as_object)
            .map(|t| t.keys().filter_map(|y| y.parse().ok()).collect())
            .unwrap_or_default();
        years.sort_unstable();
        years
    }

    pub fn timeline_snapshot(&self, year: i32) -> Option<TimelineSnapshot> {
        self.get("timeline")
            .and_then(Value::as_object)
            .and_then(|t| t.get(&year.to_string()))
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }

    /// Writes a snapshot under `timeline[year]` and maintains the derived
    /// `year_range` and `current_year` fields.
    pub fn put_timeline_snapshot(&mut self, year: i32, snapshot: &TimelineSnapshot) {
        let value = serde_json::to_value(snapshot).unwrap_or(Value::Null);
        match self.0.get_mut("timeline").and_then(Value::as_object_mut) {
            Some(timeline) => {
                timeline.insert(year.to_string(), value);
            }
            None => {
                let mut timeline = Map::new();
                timeline.insert(year.to_string(), value);
                self.insert("timeline", Value::Object(timeline));
            }
        }
        let years = self.timeline_years();
        if let (Some(&min), Some(&max)) = (years.first(), years.last()) {
            self.insert("year_range", Value::from(vec![min, max]));
            if self.get("current_year").is_none() {
                self.insert("current_year", Value::from(min));
            }
        }
    }

    pub fn current_year(&self) -> Option<i64> {
        match self.get("current_year") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    // --- Gallery -----------------------------------------------------------

    pub fn gallery_log(&self) -> Vec<(String, GalleryEntry)> {
        self.get("gallery_log")
            .and_then(Value::as_object)
            .map(|log| {
                log.iter()
                    .filter_map(|(filename, meta)| {
                        serde_json::from_value(meta.clone())
                            .ok()
                            .map(|entry| (filename.clone(), entry))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn log_gallery_upload(&mut self, filename: impl Into<String>, entry: &GalleryEntry) {
        let value = serde_json::to_value(entry).unwrap_or(Value::Null);
        match self.0.get_mut("gallery_log").and_then(Value::as_object_mut) {
            Some(log) => {
                log.insert(filename.into(), value);
            }
            None => {
                let mut log = Map::new();
                log.insert(filename.into(), value);
                self.insert("gallery_log", Value::Object(log));
            }
        }
    }

    pub fn remove_gallery_entry(&mut self, filename: &str) -> bool {
        self.0
            .get_mut("gallery_log")
            .and_then(Value::as_object_mut)
            .map(|log| log.remove(filename).is_some())
            .unwrap_or(false)
    }

    // --- Merging -----------------------------------------------------------

    /// Applies a proposed metadata update onto the live document. The editor
    /// always sends the full `properties` list, so that key is replaced
    /// wholesale; every other key merges on top while untouched fields
    /// (cover image, timeline, gallery) survive.
    pub fn apply_update(&mut self, update: &Metadata) {
        for (key, value) in update.as_map() {
            self.0.insert(key.clone(), value.clone());
        }
    }
}

impl From<Map<String, Value>> for Metadata {
    fn from(from: Map<String, Value>) -> Self {
        Self(from)
    }
}

impl From<Metadata> for Map<String, Value> {
    fn from(from: Metadata) -> Self {
        from.0
    }
}

impl From<Metadata> for Value {
    fn from(from: Metadata) -> Self {
        Value::Object(from.0)
    }
}
