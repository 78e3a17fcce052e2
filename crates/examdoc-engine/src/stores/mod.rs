use serde::{Deserialize, Serialize};

/// Embed ids are floating point: generated as `timestamp + random fraction`
/// so two inserts in the same session never collide without a central
/// counter. Serialization round-trips can perturb the low bits, so lookups
/// always use [`ID_TOLERANCE`], never exact equality.
pub type EmbedId = f64;

/// Tolerance for id comparison (absorbs float serialization noise).
pub const ID_TOLERANCE: f64 = 1e-3;

/// Tolerant id equality used by every store lookup.
pub fn id_matches(stored: EmbedId, query: EmbedId) -> bool {
    (stored - query).abs() < ID_TOLERANCE
}

/// An image referenced by an `[IMAGE:...]` token in the buffer.
///
/// `width`/`height` here are the record of truth for the image's own size;
/// the dimensions embedded in the token are a cache of these, kept in
/// lockstep by the mutation API on every resize. A raw text edit can
/// desynchronize them; `reconcile` reports that drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: EmbedId,
    /// Data payload or resource locator.
    pub url: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// Free-floating position override for an image dragged out of text flow.
/// Absence means "render inline in flow order".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Ruled-line style for answer-line blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Dotted,
    Solid,
}

/// Configuration for one `[LINES:...]` block: a group of ruled lines for
/// students to write answers in. `number_of_lines` may be fractional (x.5)
/// to request a final half-height line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinesConfig {
    pub id: EmbedId,
    pub number_of_lines: f64,
    pub line_height: u32,
    pub line_style: LineStyle,
    pub opacity: f64,
}

/// Keyed registry of image records.
///
/// Backed by a `Vec` rather than a map: float keys with tolerant equality
/// can't hash, and documents hold at most a handful of embeds. Records are
/// never garbage-collected when their token disappears from the buffer:
/// re-insertion must stay possible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageStore {
    records: Vec<ImageRecord>,
}

impl ImageStore {
    pub fn get(&self, id: EmbedId) -> Option<&ImageRecord> {
        self.records.iter().find(|r| id_matches(r.id, id))
    }

    /// Insert or replace the record with a matching id.
    pub fn put(&mut self, record: ImageRecord) {
        match self.records.iter_mut().find(|r| id_matches(r.id, record.id)) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    pub fn remove(&mut self, id: EmbedId) -> Option<ImageRecord> {
        let idx = self.records.iter().position(|r| id_matches(r.id, id))?;
        Some(self.records.remove(idx))
    }

    /// Update width/height in place, keeping any dimension not supplied.
    pub fn update_dimensions(
        &mut self,
        id: EmbedId,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Option<&ImageRecord> {
        let record = self.records.iter_mut().find(|r| id_matches(r.id, id))?;
        if let Some(w) = width {
            record.width = w;
        }
        if let Some(h) = height {
            record.height = h;
        }
        Some(record)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Registry of position overrides, keyed by image id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionStore {
    entries: Vec<(EmbedId, Position)>,
}

impl PositionStore {
    pub fn get(&self, id: EmbedId) -> Option<Position> {
        self.entries
            .iter()
            .find(|(stored, _)| id_matches(*stored, id))
            .map(|(_, pos)| *pos)
    }

    pub fn put(&mut self, id: EmbedId, position: Position) {
        match self.entries.iter_mut().find(|(stored, _)| id_matches(*stored, id)) {
            Some((_, existing)) => *existing = position,
            None => self.entries.push((id, position)),
        }
    }

    pub fn remove(&mut self, id: EmbedId) -> Option<Position> {
        let idx = self
            .entries
            .iter()
            .position(|(stored, _)| id_matches(*stored, id))?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmbedId, Position)> + '_ {
        self.entries.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry of answer-line configurations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinesStore {
    records: Vec<LinesConfig>,
}

impl LinesStore {
    pub fn get(&self, id: EmbedId) -> Option<&LinesConfig> {
        self.records.iter().find(|r| id_matches(r.id, id))
    }

    pub fn put(&mut self, config: LinesConfig) {
        match self.records.iter_mut().find(|r| id_matches(r.id, config.id)) {
            Some(existing) => *existing = config,
            None => self.records.push(config),
        }
    }

    pub fn remove(&mut self, id: EmbedId) -> Option<LinesConfig> {
        let idx = self.records.iter().position(|r| id_matches(r.id, id))?;
        Some(self.records.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinesConfig> {
        self.records.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: EmbedId) -> ImageRecord {
        ImageRecord {
            id,
            url: "data:image/png;base64,AAAA".to_string(),
            name: "fig.png".to_string(),
            width: 300,
            height: 200,
        }
    }

    #[test]
    fn lookup_matches_within_tolerance() {
        let mut store = ImageStore::default();
        store.put(image(12345.0));

        // Serialization round-trip noise must not break the lookup
        assert!(store.get(12345.000000001).is_some());
        assert!(store.get(12345.0009).is_some());
        assert!(store.get(12345.1).is_none());
    }

    #[test]
    fn put_replaces_matching_record() {
        let mut store = ImageStore::default();
        store.put(image(7.0));
        let mut updated = image(7.0000001);
        updated.width = 500;
        store.put(updated);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(7.0).unwrap().width, 500);
    }

    #[test]
    fn update_dimensions_keeps_unsupplied_axis() {
        let mut store = ImageStore::default();
        store.put(image(1.0));

        store.update_dimensions(1.0, Some(640), None);
        let record = store.get(1.0).unwrap();
        assert_eq!((record.width, record.height), (640, 200));

        store.update_dimensions(1.0, None, Some(480));
        let record = store.get(1.0).unwrap();
        assert_eq!((record.width, record.height), (640, 480));
    }

    #[test]
    fn remove_returns_record_once() {
        let mut store = LinesStore::default();
        store.put(LinesConfig {
            id: 2.0,
            number_of_lines: 3.0,
            line_height: 30,
            line_style: LineStyle::Solid,
            opacity: 0.5,
        });

        assert!(store.remove(2.0).is_some());
        assert!(store.remove(2.0).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn position_store_overwrites_existing_entry() {
        let mut store = PositionStore::default();
        store.put(9.0, Position { x: 10.0, y: 20.0 });
        store.put(9.0000005, Position { x: 15.0, y: 25.0 });

        assert_eq!(store.iter().count(), 1);
        assert_eq!(store.get(9.0), Some(Position { x: 15.0, y: 25.0 }));
    }
}
