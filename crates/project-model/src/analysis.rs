//! Analysis-engine output consumed by the editor.
//!
//! The analysis engine produces three immutable, timestamp-keyed tracks:
//! cursor samples, auto keyframes, and effects. They are stored either as a
//! single JSON document or as an append-only JSONL stream where every line
//! is one tagged record and `#` lines carry headers or comments.

use serde::{Deserialize, Serialize};

use crate::track::{CursorTrackPoint, Effect, Keyframe};

/// Schema version written into stream headers.
pub const ANALYSIS_SCHEMA_VERSION: &str = "1.0";

/// All tracks produced by analysis for one recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisTracks {
    pub cursor: Vec<CursorTrackPoint>,
    pub auto_keyframes: Vec<Keyframe>,
    pub effects: Vec<Effect>,
}

/// One line of an analysis JSONL stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisRecord {
    Cursor(CursorTrackPoint),
    Keyframe(Keyframe),
    Effect(Effect),
}

impl AnalysisTracks {
    /// Sort every track by timestamp.
    ///
    /// The sort is stable so records sharing a timestamp keep stream order.
    pub fn normalize(&mut self) {
        self.cursor.sort_by_key(|p| p.timestamp_us);
        self.auto_keyframes.sort_by_key(|k| k.timestamp_us);
        self.effects.sort_by_key(|e| e.timestamp_us);
    }

    /// Build tracks from parsed records, normalizing order.
    pub fn from_records(records: impl IntoIterator<Item = AnalysisRecord>) -> Self {
        let mut tracks = Self::default();
        for record in records {
            match record {
                AnalysisRecord::Cursor(point) => tracks.cursor.push(point),
                AnalysisRecord::Keyframe(keyframe) => tracks.auto_keyframes.push(keyframe),
                AnalysisRecord::Effect(effect) => tracks.effects.push(effect),
            }
        }
        tracks.normalize();
        tracks
    }

    /// Parse a JSONL stream.
    pub fn from_jsonl(jsonl: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_records(parse_records(jsonl)?))
    }

    /// Serialize to a JSONL stream with a schema header line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        let mut records = Vec::with_capacity(
            self.cursor.len() + self.auto_keyframes.len() + self.effects.len(),
        );
        records.extend(self.cursor.iter().copied().map(AnalysisRecord::Cursor));
        records.extend(self.auto_keyframes.iter().cloned().map(AnalysisRecord::Keyframe));
        records.extend(self.effects.iter().cloned().map(AnalysisRecord::Effect));

        let mut output = format!("# {{\"schema_version\":\"{ANALYSIS_SCHEMA_VERSION}\"}}\n");
        output.push_str(&serialize_records(&records)?);
        Ok(output)
    }

    /// Whether all three tracks are empty.
    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty() && self.auto_keyframes.is_empty() && self.effects.is_empty()
    }
}

/// Parse records from JSONL content (one JSON object per line).
pub fn parse_records(jsonl: &str) -> Result<Vec<AnalysisRecord>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize records to JSONL format.
pub fn serialize_records(records: &[AnalysisRecord]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{CursorState, EffectType};
    use crate::viewport::NormalizedCoord;

    #[test]
    fn test_parse_skips_header_and_blank_lines() {
        let jsonl = "# {\"schema_version\":\"1.0\"}\n\n\
            {\"type\":\"cursor\",\"t\":0,\"position\":{\"x\":0.5,\"y\":0.3},\"state\":\"visible\",\"confidence\":100}\n";
        let records = parse_records(jsonl).unwrap();
        assert_eq!(records.len(), 1);
        assert!(matches!(records[0], AnalysisRecord::Cursor(_)));
    }

    #[test]
    fn test_from_records_sorts_each_track() {
        let tracks = AnalysisTracks::from_records(vec![
            AnalysisRecord::Cursor(CursorTrackPoint::visible(2_000, 0.2, 0.2)),
            AnalysisRecord::Cursor(CursorTrackPoint::visible(1_000, 0.1, 0.1)),
            AnalysisRecord::Effect(Effect::new(
                900,
                100,
                EffectType::Click,
                NormalizedCoord::CENTER,
            )),
            AnalysisRecord::Keyframe(Keyframe::auto("b", 5_000, NormalizedCoord::CENTER, 2.0)),
            AnalysisRecord::Keyframe(Keyframe::auto("a", 1_000, NormalizedCoord::CENTER, 1.0)),
        ]);

        assert_eq!(tracks.cursor[0].timestamp_us, 1_000);
        assert_eq!(tracks.auto_keyframes[0].id, "a");
        assert_eq!(tracks.effects.len(), 1);
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let tracks = AnalysisTracks {
            cursor: vec![CursorTrackPoint::new(
                0,
                NormalizedCoord::new(0.4, 0.6),
                CursorState::Inferred,
                55,
            )],
            auto_keyframes: vec![Keyframe::auto("k", 0, NormalizedCoord::CENTER, 1.0)],
            effects: vec![Effect::new(
                10,
                300_000,
                EffectType::DoubleClick,
                NormalizedCoord::new(0.1, 0.9),
            )],
        };

        let jsonl = tracks.to_jsonl().unwrap();
        assert!(jsonl.starts_with("# "));
        let parsed = AnalysisTracks::from_jsonl(&jsonl).unwrap();
        assert_eq!(parsed, tracks);
    }

    #[test]
    fn test_record_format() {
        let record = AnalysisRecord::Effect(Effect::new(
            1_234,
            400_000,
            EffectType::RightClick,
            NormalizedCoord::new(0.5, 0.5),
        ));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"type\":\"effect\""));
        assert!(json.contains("\"t\":1234"));
        assert!(json.contains("\"effect_type\":\"right_click\""));
    }
}
