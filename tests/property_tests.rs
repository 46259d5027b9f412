//! Property-based tests for result decoding.
//!
//! These tests verify the robustness of the decoder through property-based
//! testing, ensuring that:
//! - Classification and decoding never panic, whatever the backend declares
//! - Recognized kinds decode deterministically
//! - Row decoding preserves shape and column order

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use proptest::prelude::*;

    use requery::core::db::decode::{column_kind, decode_row, decode_value, ColumnKind};
    use requery::core::db::{Column, RawValue};

    fn arb_type_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("INT".to_string()),
            Just("int4".to_string()),
            Just("int8".to_string()),
            Just("DATETIME".to_string()),
            Just("timestamp".to_string()),
            Just("VARCHAR".to_string()),
            Just("text".to_string()),
            Just("bytea".to_string()),
            Just("uuid".to_string()),
            "[a-zA-Z_]{0,16}".prop_map(|s: String| s),
        ]
    }

    fn arb_raw_value() -> impl Strategy<Value = RawValue> {
        prop_oneof![
            Just(RawValue::Null),
            any::<i64>().prop_map(RawValue::Int),
            any::<f64>().prop_map(RawValue::Float),
            ".*".prop_map(RawValue::Text),
            // Seconds in 1970..=2100, always a valid timestamp
            (0i64..=4_102_444_800i64).prop_map(|secs| {
                RawValue::Timestamp(DateTime::from_timestamp(secs, 0).unwrap().naive_utc())
            }),
            Just(RawValue::Unsupported),
        ]
    }

    proptest! {
        /// Classification accepts any declared type name without panicking.
        #[test]
        fn prop_column_kind_never_panics(name in ".*") {
            let _ = column_kind(&name);
        }

        /// The full decode path never panics for any (type name, value) pair.
        #[test]
        fn prop_decode_never_panics(name in arb_type_name(), value in arb_raw_value()) {
            let cell = column_kind(&name).and_then(|kind| decode_value(kind, &value));
            // A cell is either decoded text or absent; both are fine.
            let _ = cell;
        }

        /// Integer columns decode every i64 to its decimal text.
        #[test]
        fn prop_integer_round_trip(i in any::<i64>()) {
            prop_assert_eq!(
                decode_value(ColumnKind::Integer, &RawValue::Int(i)),
                Some(i.to_string())
            );
        }

        /// Text columns return the value verbatim.
        #[test]
        fn prop_text_is_verbatim(s in ".*") {
            prop_assert_eq!(
                decode_value(ColumnKind::Text, &RawValue::Text(s.clone())),
                Some(s)
            );
        }

        /// An unrecognized type name always yields an absent cell, whatever
        /// the underlying value.
        #[test]
        fn prop_unknown_kind_is_always_absent(name in arb_type_name(), value in arb_raw_value()) {
            if column_kind(&name).is_none() {
                let columns = vec![Column::new("c", name)];
                let cells = decode_row(&columns, &[value]);
                prop_assert_eq!(cells, vec![None]);
            }
        }

        /// Decoding a row yields exactly one cell per column, in order.
        #[test]
        fn prop_row_shape_is_preserved(
            pairs in prop::collection::vec((arb_type_name(), arb_raw_value()), 0..8)
        ) {
            let columns: Vec<Column> = pairs
                .iter()
                .enumerate()
                .map(|(i, (name, _))| Column::new(format!("c{}", i), name.clone()))
                .collect();
            let raw: Vec<RawValue> = pairs.into_iter().map(|(_, value)| value).collect();

            let cells = decode_row(&columns, &raw);
            prop_assert_eq!(cells.len(), columns.len());
        }
    }
}
