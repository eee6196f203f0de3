//! Record and envelope shapes shared by every flow.
//!
//! Field names on the wire follow the service's published JSON contract:
//! records carry `geocodingId`, batches wrap their records in `list`, and
//! operation results echo the request under `request` with a `msg` and a
//! `status`.

use crate::RecordId;
use core::fmt;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Visitor},
};

/// A latitude/longitude pair in its wire form.
///
/// Both components stay decimal strings; they are only converted to `f64`
/// when the external provider is called.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: String,
    pub longitude: String,
}

impl Coordinate {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }
}

/// The canonical unit of stored and returned geocoding data.
///
/// `id` stays `None` until the record is first persisted to the document
/// store or the cache. A record is *resolved* once `address` is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodingRecord {
    #[serde(rename = "geocodingId", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(deserialize_with = "string_or_number")]
    pub latitude: String,
    #[serde(deserialize_with = "string_or_number")]
    pub longitude: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl GeocodingRecord {
    /// A record with only its coordinate set.
    pub fn at(coordinate: Coordinate) -> Self {
        Self {
            id: None,
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            address: None,
        }
    }

    /// Attaches a resolved address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude.clone(), self.longitude.clone())
    }

    pub fn is_resolved(&self) -> bool {
        self.address.is_some()
    }

    /// Returns `true` if this record sits at exactly `coordinate`.
    ///
    /// Components are compared as strings, the same way they were submitted.
    pub fn matches(&self, coordinate: &Coordinate) -> bool {
        self.latitude == coordinate.latitude && self.longitude == coordinate.longitude
    }
}

/// Reads a coordinate component written either as a JSON string or as a bare
/// number. Numbers keep the textual form serde hands back for them.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct Component;

    impl Visitor<'_> for Component {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a coordinate component as a string or a number")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_owned())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(Component)
}

/// An ordered collection of records submitted or returned together.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodingBatch {
    #[serde(default)]
    pub list: Vec<GeocodingRecord>,
}

impl GeocodingBatch {
    pub fn new(list: Vec<GeocodingRecord>) -> Self {
        Self { list }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, GeocodingRecord> {
        self.list.iter()
    }

    pub fn as_slice(&self) -> &[GeocodingRecord] {
        &self.list
    }
}

impl From<Vec<GeocodingRecord>> for GeocodingBatch {
    fn from(list: Vec<GeocodingRecord>) -> Self {
        Self { list }
    }
}

impl FromIterator<GeocodingRecord> for GeocodingBatch {
    fn from_iter<I: IntoIterator<Item = GeocodingRecord>>(iter: I) -> Self {
        Self {
            list: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for GeocodingBatch {
    type Item = GeocodingRecord;
    type IntoIter = std::vec::IntoIter<GeocodingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter()
    }
}

impl<'a> IntoIterator for &'a GeocodingBatch {
    type Item = &'a GeocodingRecord;
    type IntoIter = core::slice::Iter<'a, GeocodingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

/// Application-level status carried by result and error payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Error,
}

/// Confirmation returned by every mutating flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// The submitted batch, as stored (ids included).
    #[serde(rename = "request")]
    pub echoed_request: GeocodingBatch,
    #[serde(rename = "msg")]
    pub message: String,
    pub status: Status,
}

impl OperationResult {
    pub fn ok(echoed_request: GeocodingBatch, message: impl Into<String>) -> Self {
        Self {
            echoed_request,
            message: message.into(),
            status: Status::Ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unpersisted_record_omits_id_and_address() {
        let record = GeocodingRecord::at(Coordinate::new("33.969601", "-84.100033"));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"latitude": "33.969601", "longitude": "-84.100033"})
        );
        assert!(!record.is_resolved());
    }

    #[test]
    fn record_reads_wire_field_names() {
        let record: GeocodingRecord = serde_json::from_value(json!({
            "geocodingId": "01890a5d-ac96-774b-bcce-b302099a8057",
            "latitude": "1.5",
            "longitude": "2.5",
            "address": "Somewhere"
        }))
        .unwrap();
        assert_eq!(
            record.id.unwrap().to_string(),
            "01890a5d-ac96-774b-bcce-b302099a8057"
        );
        assert_eq!(record.address.as_deref(), Some("Somewhere"));
        assert!(record.is_resolved());
    }

    #[test]
    fn record_accepts_numeric_components() {
        let batch: GeocodingBatch = serde_json::from_value(json!({
            "list": [
                {"latitude": 33.9, "longitude": -84.1},
                {"latitude": 10, "longitude": "20.5"}
            ]
        }))
        .unwrap();
        let records = batch.as_slice();
        assert_eq!(records[0].coordinate(), Coordinate::new("33.9", "-84.1"));
        assert_eq!(records[1].coordinate(), Coordinate::new("10", "20.5"));

        let err = serde_json::from_value::<GeocodingRecord>(json!({
            "latitude": true,
            "longitude": "1"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("string or a number"), "{err}");
    }

    #[test]
    fn batch_wraps_records_in_list() {
        let batch: GeocodingBatch = serde_json::from_value(json!({
            "list": [
                {"latitude": "1", "longitude": "2"},
                {"latitude": "3", "longitude": "4"}
            ]
        }))
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.as_slice()[1].latitude, "3");

        let empty: GeocodingBatch = serde_json::from_value(json!({})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn operation_result_uses_short_field_names() {
        let result = OperationResult::ok(GeocodingBatch::default(), "done");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"request": {"list": []}, "msg": "done", "status": "OK"})
        );
    }

    #[test]
    fn matches_compares_components_as_submitted() {
        let record = GeocodingRecord::at(Coordinate::new("10.0", "20"));
        assert!(record.matches(&Coordinate::new("10.0", "20")));
        assert!(!record.matches(&Coordinate::new("10", "20")));
    }
}
