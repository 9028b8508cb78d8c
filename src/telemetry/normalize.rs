use super::fetch::RawTuple;
use super::{PingRecord, RecordId, SpeedTestRecord, Timestamp};
use serde_json::Value;
use thiserror::Error;

// Wire schemas. Positions are a fixed backend contract:
//   pings:      [id, timestamp, target, success]
//   speedtests: [id, timestamp, download, upload, ping?]
// The trailing latency slot is missing on older backends, so a speed-test
// tuple is 4 or 5 fields long.
const PING_ARITY: usize = 4;
const SPEED_TEST_ARITY: usize = 5;
const SPEED_TEST_ARITY_NO_LATENCY: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("record {index}: expected {expected} fields, got {got}")]
    Shape {
        index: usize,
        expected: usize,
        got: usize,
    },
    #[error("record {index}: field `{field}` has the wrong type")]
    Type { index: usize, field: &'static str },
}

/// Reshapes ping tuples into named records. Strict: the first malformed
/// tuple fails the whole batch, so a chart never renders partial data.
pub fn normalize_pings(tuples: &[RawTuple]) -> Result<Vec<PingRecord>, NormalizeError> {
    tuples
        .iter()
        .enumerate()
        .map(|(index, tuple)| {
            if tuple.len() != PING_ARITY {
                return Err(NormalizeError::Shape {
                    index,
                    expected: PING_ARITY,
                    got: tuple.len(),
                });
            }
            Ok(PingRecord {
                id: field_id(tuple, 0, index)?,
                timestamp: field_timestamp(tuple, 1, index)?,
                target: field_string(tuple, 2, index, "target")?,
                success: field_flag(tuple, 3, index, "success")?,
            })
        })
        .collect()
}

/// Reshapes speed-test tuples into named records, same strict policy.
pub fn normalize_speed_tests(
    tuples: &[RawTuple],
) -> Result<Vec<SpeedTestRecord>, NormalizeError> {
    tuples
        .iter()
        .enumerate()
        .map(|(index, tuple)| {
            if tuple.len() != SPEED_TEST_ARITY && tuple.len() != SPEED_TEST_ARITY_NO_LATENCY {
                return Err(NormalizeError::Shape {
                    index,
                    expected: SPEED_TEST_ARITY,
                    got: tuple.len(),
                });
            }
            let ping = if tuple.len() == SPEED_TEST_ARITY {
                Some(field_number(tuple, 4, index, "ping")?)
            } else {
                None
            };
            Ok(SpeedTestRecord {
                id: field_id(tuple, 0, index)?,
                timestamp: field_timestamp(tuple, 1, index)?,
                download: field_number(tuple, 2, index, "download")?,
                upload: field_number(tuple, 3, index, "upload")?,
                ping,
            })
        })
        .collect()
}

fn field_id(tuple: &RawTuple, pos: usize, index: usize) -> Result<RecordId, NormalizeError> {
    match tuple.get(pos) {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(RecordId::Int)
            .ok_or(NormalizeError::Type { index, field: "id" }),
        Some(Value::String(s)) => Ok(RecordId::Text(s.clone())),
        _ => Err(NormalizeError::Type { index, field: "id" }),
    }
}

fn field_timestamp(
    tuple: &RawTuple,
    pos: usize,
    index: usize,
) -> Result<Timestamp, NormalizeError> {
    match tuple.get(pos) {
        Some(Value::Number(n)) => n.as_f64().map(Timestamp::Epoch).ok_or(NormalizeError::Type {
            index,
            field: "timestamp",
        }),
        Some(Value::String(s)) => Ok(Timestamp::Text(s.clone())),
        _ => Err(NormalizeError::Type {
            index,
            field: "timestamp",
        }),
    }
}

fn field_string(
    tuple: &RawTuple,
    pos: usize,
    index: usize,
    field: &'static str,
) -> Result<String, NormalizeError> {
    match tuple.get(pos) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(NormalizeError::Type { index, field }),
    }
}

fn field_number(
    tuple: &RawTuple,
    pos: usize,
    index: usize,
    field: &'static str,
) -> Result<f64, NormalizeError> {
    match tuple.get(pos).and_then(Value::as_f64) {
        Some(n) => Ok(n),
        None => Err(NormalizeError::Type { index, field }),
    }
}

// The backend stores probe success as an sqlite integer, so the wire value
// is a bool or 0/1 depending on backend version.
fn field_flag(
    tuple: &RawTuple,
    pos: usize,
    index: usize,
    field: &'static str,
) -> Result<bool, NormalizeError> {
    match tuple.get(pos) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) if n.as_i64() == Some(0) => Ok(false),
        Some(Value::Number(n)) if n.as_i64() == Some(1) => Ok(true),
        _ => Err(NormalizeError::Type { index, field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuples(json: &str) -> Vec<RawTuple> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn normalizes_well_formed_pings() {
        let raw = tuples(r#"[[1, 1000, "8.8.8.8", true], [2, 1001, "8.8.8.8", false]]"#);
        let records = normalize_pings(&raw).unwrap();
        assert_eq!(
            records,
            vec![
                PingRecord {
                    id: RecordId::Int(1),
                    timestamp: Timestamp::Epoch(1000.0),
                    target: "8.8.8.8".to_string(),
                    success: true,
                },
                PingRecord {
                    id: RecordId::Int(2),
                    timestamp: Timestamp::Epoch(1001.0),
                    target: "8.8.8.8".to_string(),
                    success: false,
                },
            ]
        );
    }

    #[test]
    fn preserves_backend_order() {
        let raw = tuples(
            r#"[[3, 1002, "1.1.1.1", true],
                [1, 1000, "8.8.8.8", true],
                [2, 1001, "8.8.8.8", false]]"#,
        );
        let records = normalize_pings(&raw).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
        assert_eq!(
            ids,
            vec![RecordId::Int(3), RecordId::Int(1), RecordId::Int(2)]
        );
    }

    #[test]
    fn record_count_matches_input_length() {
        let raw = tuples(
            r#"[[1, 1000, "8.8.8.8", true],
                [2, 1001, "1.1.1.1", false],
                [3, 1002, "www.google.com", true]]"#,
        );
        assert_eq!(normalize_pings(&raw).unwrap().len(), raw.len());
    }

    #[test]
    fn normalizing_twice_yields_equal_records() {
        let raw = tuples(r#"[[1, 1000, "8.8.8.8", true], [2, 1001, "8.8.8.8", false]]"#);
        assert_eq!(normalize_pings(&raw).unwrap(), normalize_pings(&raw).unwrap());
    }

    #[test]
    fn accepts_integer_success_flags() {
        let raw = tuples(r#"[[1, 1000, "8.8.8.8", 1], [2, 1001, "8.8.8.8", 0]]"#);
        let records = normalize_pings(&raw).unwrap();
        assert!(records[0].success);
        assert!(!records[1].success);
    }

    #[test]
    fn accepts_text_timestamps_and_ids() {
        let raw = tuples(r#"[["a1", "2026-08-28T10:00:00", "8.8.8.8", true]]"#);
        let records = normalize_pings(&raw).unwrap();
        assert_eq!(records[0].id, RecordId::Text("a1".to_string()));
        assert_eq!(
            records[0].timestamp,
            Timestamp::Text("2026-08-28T10:00:00".to_string())
        );
    }

    #[test]
    fn one_short_tuple_fails_the_whole_batch() {
        let raw = tuples(
            r#"[[1, 1000, "8.8.8.8", true],
                [2, 1001, "8.8.8.8"],
                [3, 1002, "8.8.8.8", false]]"#,
        );
        assert_eq!(
            normalize_pings(&raw),
            Err(NormalizeError::Shape {
                index: 1,
                expected: 4,
                got: 3,
            })
        );
    }

    #[test]
    fn wrong_field_type_fails_the_batch() {
        let raw = tuples(r#"[[1, 1000, 42, true]]"#);
        assert_eq!(
            normalize_pings(&raw),
            Err(NormalizeError::Type {
                index: 0,
                field: "target",
            })
        );
    }

    #[test]
    fn non_binary_success_number_is_rejected() {
        let raw = tuples(r#"[[1, 1000, "8.8.8.8", 2]]"#);
        assert_eq!(
            normalize_pings(&raw),
            Err(NormalizeError::Type {
                index: 0,
                field: "success",
            })
        );
    }

    #[test]
    fn normalizes_speed_tests_with_latency() {
        let raw = tuples(r#"[[1, 1000, 120.5, 18.2, 45.0]]"#);
        let records = normalize_speed_tests(&raw).unwrap();
        assert_eq!(
            records[0],
            SpeedTestRecord {
                id: RecordId::Int(1),
                timestamp: Timestamp::Epoch(1000.0),
                download: 120.5,
                upload: 18.2,
                ping: Some(45.0),
            }
        );
    }

    #[test]
    fn speed_test_latency_slot_is_optional() {
        let raw = tuples(r#"[[1, 1000, 120.5, 18.2]]"#);
        let records = normalize_speed_tests(&raw).unwrap();
        assert_eq!(records[0].ping, None);
    }

    #[test]
    fn speed_test_arity_outside_contract_is_rejected() {
        let raw = tuples(r#"[[1, 1000, 120.5]]"#);
        assert_eq!(
            normalize_speed_tests(&raw),
            Err(NormalizeError::Shape {
                index: 0,
                expected: 5,
                got: 3,
            })
        );

        let raw = tuples(r#"[[1, 1000, 120.5, 18.2, 45.0, "extra"]]"#);
        assert_eq!(
            normalize_speed_tests(&raw),
            Err(NormalizeError::Shape {
                index: 0,
                expected: 5,
                got: 6,
            })
        );
    }

    #[test]
    fn integer_throughput_values_are_accepted() {
        let raw = tuples(r#"[[1, 1000, 120, 18, 45]]"#);
        let records = normalize_speed_tests(&raw).unwrap();
        assert_eq!(records[0].download, 120.0);
        assert_eq!(records[0].upload, 18.0);
    }
}
