//! Represents a committed photo as it lives in the persisted slot.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Attribution used when a guest leaves the name field blank.
pub const GUEST_NAME: &str = "Guest";

/// Static image shown for the demo photos.
pub const PLACEHOLDER_PATH: &str = "/placeholder.svg?height=400&width=400";

/// A single photo shared by a guest (or one of the built-in demo photos).
///
/// Records are immutable once created. The serialized form uses camelCase keys
/// and millisecond ISO-8601 timestamps, so the slot content stays readable by
/// any client that already knows the `wedding-photos` format.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    /// Unique identifier across seed and persisted photos.
    pub id: String,

    /// Original file name, used for display and as the download name.
    pub file_name: String,

    /// Guest-supplied attribution.
    pub uploader_name: String,

    /// Moment the record was committed to storage.
    #[serde(with = "iso_millis")]
    pub uploaded_at: DateTime<Utc>,

    /// Locator for the image bytes: a static path for demo photos, a transient
    /// resource locator for uploads.
    pub path: String,
}

impl PhotoRecord {
    /// Build a record for a freshly uploaded file.
    ///
    /// A blank `uploader_name` falls back to [`GUEST_NAME`].
    pub fn committed(
        id: String,
        file_name: impl Into<String>,
        uploader_name: &str,
        uploaded_at: DateTime<Utc>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            uploader_name: display_name(uploader_name),
            uploaded_at,
            path: path.into(),
        }
    }
}

/// Normalize a guest name, substituting [`GUEST_NAME`] for blank input.
pub fn display_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        GUEST_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Photo id: commit timestamp in milliseconds followed by the file's index in its batch.
pub fn generate_id(now: DateTime<Utc>, index: usize) -> String {
    format!("{}{}", now.timestamp_millis(), index)
}

/// The fixed demo photos that are always part of the working set.
pub fn seed_photos() -> Vec<PhotoRecord> {
    vec![
        seed("demo1", "düğün-çekimi-1.jpg", "Ahmet Yılmaz", 14, 30),
        seed("demo2", "gelin-damat.jpg", "Fatma Demir", 15, 45),
        seed("demo3", "düğün-salonu.jpg", "Mehmet Kaya", 16, 20),
        seed("demo4", "pasta-kesimi.jpg", "Ayşe Özkan", 17, 10),
    ]
}

fn seed(id: &str, file_name: &str, uploader_name: &str, hour: u32, minute: u32) -> PhotoRecord {
    PhotoRecord {
        id: id.to_string(),
        file_name: file_name.to_string(),
        uploader_name: uploader_name.to_string(),
        uploaded_at: Utc
            .with_ymd_and_hms(2024, 1, 15, hour, minute, 0)
            .single()
            .unwrap_or_default(),
        path: PLACEHOLDER_PATH.to_string(),
    }
}

/// `2024-01-15T14:30:00.000Z` style timestamps.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_become_guest() {
        assert_eq!(display_name(""), GUEST_NAME);
        assert_eq!(display_name("   "), GUEST_NAME);
        assert_eq!(display_name("  Ada "), "Ada");
    }

    #[test]
    fn id_is_millis_then_index() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(generate_id(now, 3), format!("{}3", now.timestamp_millis()));
    }

    #[test]
    fn slot_format_uses_camel_case_and_millis() {
        let record = seed_photos().remove(0);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fileName"], "düğün-çekimi-1.jpg");
        assert_eq!(json["uploaderName"], "Ahmet Yılmaz");
        assert_eq!(json["uploadedAt"], "2024-01-15T14:30:00.000Z");
        assert_eq!(json["path"], PLACEHOLDER_PATH);
    }

    #[test]
    fn parses_records_written_by_browser_clients() {
        let raw = r#"[{"id":"17000000000000","fileName":"a.jpg","uploaderName":"Ada",
            "uploadedAt":"2025-06-01T10:00:00.123Z","path":"blob:x"}]"#;
        let records: Vec<PhotoRecord> = serde_json::from_str(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].uploaded_at.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn seed_set_is_four_photos_from_the_wedding_day() {
        let seed = seed_photos();
        assert_eq!(seed.len(), 4);
        assert!(seed.iter().all(|p| p.uploaded_at.date_naive().to_string() == "2024-01-15"));
    }
}
