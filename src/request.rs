//! Request builder
//!
//! Pure translation of domain inputs into the engine's wire payloads. Nothing
//! here touches the network.

use serde::Serialize;

use crate::model::{BoundingBoxQuery, IndexableLocation};

/// Field names in the indexed document
pub const LATITUDE_FIELD: &str = "latitude";
pub const LONGITUDE_FIELD: &str = "longitude";

/// Body of an index request
///
/// Coordinates travel as two-decimal strings, e.g. `{"latitude":"35.10"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDocument {
    pub latitude: String,
    pub longitude: String,
}

impl IndexDocument {
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Body of a bounding-box search request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDocument {
    pub query: Query,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    #[serde(rename = "bool")]
    pub bool_query: BoolQuery,
}

/// Conjunction: every clause in `must` has to hold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolQuery {
    pub must: Vec<RangeClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeClause {
    pub range: RangeField,
}

/// Single-field range, serialized as `{"<field>": {"gte": .., "lt": ..}}`
#[derive(Debug, Clone, PartialEq)]
pub struct RangeField {
    pub field: &'static str,
    pub bounds: RangeBounds,
}

impl Serialize for RangeField {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.field, &self.bounds)?;
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeBounds {
    pub gte: f64,
    pub lt: f64,
}

impl QueryDocument {
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Format a coordinate with exactly two decimal places
pub fn format_coordinate(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn build_index_body(loc: &IndexableLocation) -> IndexDocument {
    IndexDocument {
        latitude: format_coordinate(loc.latitude),
        longitude: format_coordinate(loc.longitude),
    }
}

/// Engine document id for a location: its id in decimal
pub fn document_id(loc: &IndexableLocation) -> String {
    loc.id.to_string()
}

pub fn build_bounding_box_query(q: &BoundingBoxQuery) -> QueryDocument {
    QueryDocument {
        query: Query {
            bool_query: BoolQuery {
                must: vec![
                    range_clause(LATITUDE_FIELD, q.min_latitude, q.max_latitude),
                    range_clause(LONGITUDE_FIELD, q.min_longitude, q.max_longitude),
                ],
            },
        },
    }
}

fn range_clause(field: &'static str, gte: f64, lt: f64) -> RangeClause {
    RangeClause {
        range: RangeField {
            field,
            bounds: RangeBounds { gte, lt },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coordinates_use_two_decimals() {
        assert_eq!(format_coordinate(35.1), "35.10");
        assert_eq!(format_coordinate(139.6917), "139.69");
        assert_eq!(format_coordinate(-0.5), "-0.50");
        assert_eq!(format_coordinate(12.0), "12.00");
    }

    #[test]
    fn index_body_wire_format() {
        let loc = IndexableLocation::new(7, 35.1, 139.7);
        let body = build_index_body(&loc);
        assert_eq!(
            String::from_utf8(body.to_json().unwrap()).unwrap(),
            r#"{"latitude":"35.10","longitude":"139.70"}"#
        );
        assert_eq!(document_id(&loc), "7");
    }

    #[test]
    fn identical_locations_give_identical_bodies() {
        let a = build_index_body(&IndexableLocation::new(1, 35.6812, 139.7671));
        let b = build_index_body(&IndexableLocation::new(1, 35.6812, 139.7671));
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    #[test]
    fn non_finite_coordinates_pass_through() {
        let body = build_index_body(&IndexableLocation::new(1, f64::NAN, f64::INFINITY));
        assert_eq!(body.latitude, "NaN");
        assert_eq!(body.longitude, "inf");
    }

    #[test]
    fn bounding_box_query_shape() {
        let q = BoundingBoxQuery::new(35.0, 36.0, 139.0, 140.5);
        let doc = build_bounding_box_query(&q);
        let value: serde_json::Value = serde_json::from_slice(&doc.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "query": {
                    "bool": {
                        "must": [
                            {"range": {"latitude": {"gte": 35.0, "lt": 36.0}}},
                            {"range": {"longitude": {"gte": 139.0, "lt": 140.5}}}
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn bounding_box_query_always_two_must_clauses() {
        for q in [
            BoundingBoxQuery::new(0.0, 0.0, 0.0, 0.0),
            BoundingBoxQuery::new(-90.0, 90.0, -180.0, 180.0),
            BoundingBoxQuery::new(36.0, 35.0, 140.0, 139.0),
        ] {
            let doc = build_bounding_box_query(&q);
            let must = &doc.query.bool_query.must;
            assert_eq!(must.len(), 2);
            assert_eq!(must[0].range.field, LATITUDE_FIELD);
            assert_eq!(must[0].range.bounds.gte, q.min_latitude);
            assert_eq!(must[0].range.bounds.lt, q.max_latitude);
            assert_eq!(must[1].range.field, LONGITUDE_FIELD);
            assert_eq!(must[1].range.bounds.gte, q.min_longitude);
            assert_eq!(must[1].range.bounds.lt, q.max_longitude);
        }
    }
}
