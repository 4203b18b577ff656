//! Wire types for the open-data specialist feed.
//!
//! Field names follow the feed's Slovak keys exactly; they are a third-party contract.

use serde::{Deserialize, Deserializer};

/// Feature collection envelope returned by the source endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SourceDocument {
    /// One feature per specialist.
    #[serde(default, deserialize_with = "nullable")]
    pub features: Vec<SourceFeature>,
}

/// A single GeoJSON-style feature.
#[derive(Debug, Default, Deserialize)]
pub struct SourceFeature {
    /// Attribute bag describing the specialist.
    #[serde(default, deserialize_with = "nullable")]
    pub properties: RawSourceRecord,
}

impl SourceDocument {
    /// Consume the envelope, yielding the raw records in feed order.
    pub fn into_records(self) -> Vec<RawSourceRecord> {
        self.features
            .into_iter()
            .map(|feature| feature.properties)
            .collect()
    }
}

/// One specialist as published by the source, before normalization.
///
/// Every field is optional on the wire; absent keys and `null` both decode to the zero value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawSourceRecord {
    /// Source-assigned numeric identifier.
    #[serde(deserialize_with = "nullable")]
    pub id: i64,
    /// Source-assigned textual identifier.
    #[serde(rename = "identifikator", deserialize_with = "nullable")]
    pub identifier: String,
    /// Provider registration code.
    #[serde(deserialize_with = "nullable")]
    pub kpzs: String,
    /// Specialization label; the specialty natural key.
    #[serde(rename = "druh_zariadenia", deserialize_with = "nullable")]
    pub specialization: String,
    /// Practice name; the specialist natural key.
    #[serde(rename = "nazov_zariadenia", deserialize_with = "nullable")]
    pub name: String,
    /// Latitude in decimal degrees.
    #[serde(rename = "poloha_lat", deserialize_with = "nullable")]
    pub latitude: f64,
    /// Longitude in decimal degrees.
    #[serde(rename = "poloha_lon", deserialize_with = "nullable")]
    pub longitude: f64,
    /// Pre-formatted address line, frequently empty.
    #[serde(rename = "addressline", deserialize_with = "nullable")]
    pub address_line: String,
    /// Municipality used when synthesizing an address.
    #[serde(deserialize_with = "nullable")]
    pub municipality: String,
    /// Building number used when synthesizing an address.
    #[serde(rename = "buildingnumber", deserialize_with = "nullable")]
    pub building_number: String,
    /// County name.
    #[serde(deserialize_with = "nullable")]
    pub county: String,
    /// Street name used when synthesizing an address.
    #[serde(rename = "streetname", deserialize_with = "nullable")]
    pub street_name: String,
    /// Postal code used when synthesizing an address.
    #[serde(rename = "postalcode", deserialize_with = "nullable")]
    pub postal_code: String,
    /// Contact email.
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    /// Mobile phone number.
    #[serde(rename = "mobil", deserialize_with = "nullable")]
    pub cellphone: String,
    /// Landline phone number.
    #[serde(rename = "telefon", deserialize_with = "nullable")]
    pub phone: String,
    /// Comma-joined staff roster with role annotations (`"<name> ako <role>"`).
    #[serde(rename = "odborni_zastupcovia", deserialize_with = "nullable")]
    pub staff: String,
    /// Monday opening hours; empty means closed.
    #[serde(rename = "pondelok", deserialize_with = "nullable")]
    pub monday_hours: String,
    /// Tuesday opening hours.
    #[serde(rename = "utorok", deserialize_with = "nullable")]
    pub tuesday_hours: String,
    /// Wednesday opening hours.
    #[serde(rename = "streda", deserialize_with = "nullable")]
    pub wednesday_hours: String,
    /// Thursday opening hours.
    #[serde(rename = "stvrtok", deserialize_with = "nullable")]
    pub thursday_hours: String,
    /// Friday opening hours.
    #[serde(rename = "piatok", deserialize_with = "nullable")]
    pub friday_hours: String,
    /// Saturday opening hours.
    #[serde(rename = "sobota", deserialize_with = "nullable")]
    pub saturday_hours: String,
    /// Sunday opening hours.
    #[serde(rename = "nedela", deserialize_with = "nullable")]
    pub sunday_hours: String,
    /// Start of an announced absence.
    #[serde(rename = "nepritomnost_od", deserialize_with = "nullable")]
    pub absence_from: String,
    /// End of an announced absence.
    #[serde(rename = "nepritomnost_do", deserialize_with = "nullable")]
    pub absence_to: String,
    /// Free-text notice from the provider.
    #[serde(deserialize_with = "nullable")]
    pub info: String,
    /// Union insurer affiliation flag (`"áno"` means yes).
    #[serde(deserialize_with = "nullable")]
    pub union: String,
    /// VšZP insurer affiliation flag.
    #[serde(deserialize_with = "nullable")]
    pub vszp: String,
    /// Dôvera insurer affiliation flag.
    #[serde(deserialize_with = "nullable")]
    pub dovera: String,
    /// Bounding box supplied by the feed, unused by the catalog.
    #[serde(deserialize_with = "nullable")]
    pub bbox: Vec<f64>,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_native_field_names() {
        let body = r#"{
            "features": [{
                "properties": {
                    "id": 7,
                    "nazov_zariadenia": "MUDr. Jana Nováková",
                    "druh_zariadenia": "ortoped",
                    "poloha_lat": 48.43,
                    "poloha_lon": -71.06,
                    "telefon": "02/123",
                    "mobil": "0900 111 222",
                    "odborni_zastupcovia": "Jana Nováková ako lekár",
                    "pondelok": "7:00 - 12:00",
                    "vszp": "áno",
                    "bbox": [17.1, 48.1, 17.1, 48.1]
                }
            }]
        }"#;

        let records = serde_json::from_str::<SourceDocument>(body)
            .expect("document")
            .into_records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, 7);
        assert_eq!(record.name, "MUDr. Jana Nováková");
        assert_eq!(record.specialization, "ortoped");
        assert_eq!(record.latitude, 48.43);
        assert_eq!(record.longitude, -71.06);
        assert_eq!(record.phone, "02/123");
        assert_eq!(record.cellphone, "0900 111 222");
        assert_eq!(record.monday_hours, "7:00 - 12:00");
        assert_eq!(record.vszp, "áno");
        assert_eq!(record.bbox.len(), 4);
        assert!(record.address_line.is_empty());
    }

    #[test]
    fn nulls_and_missing_keys_decode_to_defaults() {
        let body = r#"{"features":[{"properties":{"id":1,"email":null,"poloha_lat":null}},{}]}"#;
        let records = serde_json::from_str::<SourceDocument>(body)
            .expect("document")
            .into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].email, "");
        assert_eq!(records[0].latitude, 0.0);
        assert_eq!(records[1], RawSourceRecord::default());
    }

    #[test]
    fn missing_features_is_an_empty_batch() {
        let document: SourceDocument = serde_json::from_str("{}").expect("document");
        assert!(document.into_records().is_empty());
    }
}
