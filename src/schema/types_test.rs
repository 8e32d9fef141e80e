// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tests for physical type descriptors.

#[cfg(test)]
mod tests {
    use crate::schema::types::DataType;

    #[test]
    fn test_integer_sizes() {
        assert_eq!(DataType::integer(1).size_in_bits(), 8);
        assert_eq!(DataType::integer(2).size_in_bits(), 16);
        assert_eq!(DataType::integer(4).size_in_bits(), 32);
        assert_eq!(DataType::integer(8).size_in_bits(), 64);
    }

    #[test]
    fn test_integer_alignment_equals_size() {
        for bytes in [1, 2, 4, 8] {
            let ty = DataType::integer(bytes);
            assert_eq!(ty.alignment_in_bits(), ty.size_in_bits());
        }
    }

    #[test]
    #[should_panic]
    fn test_integer_unsupported_width() {
        let _ = DataType::integer(3);
    }

    #[test]
    fn test_float_and_double() {
        assert_eq!(DataType::Float.size_in_bits(), 32);
        assert_eq!(DataType::Float.alignment_in_bits(), 32);
        assert_eq!(DataType::Double.size_in_bits(), 64);
        assert_eq!(DataType::Double.alignment_in_bits(), 64);
    }

    #[test]
    fn test_boolean_is_single_bit() {
        assert_eq!(DataType::Boolean.size_in_bits(), 1);
        assert_eq!(DataType::Boolean.alignment_in_bits(), 1);
    }

    #[test]
    fn test_char_aligns_per_character() {
        let ty = DataType::char(20);
        assert_eq!(ty.size_in_bits(), 160);
        assert_eq!(ty.alignment_in_bits(), 8);
    }

    #[test]
    fn test_date() {
        assert_eq!(DataType::Date.size_in_bits(), 32);
        assert_eq!(DataType::Date.alignment_in_bits(), 32);
    }

    #[test]
    fn test_bitmap_is_bit_addressable() {
        let ty = DataType::bitmap(5);
        assert_eq!(ty.size_in_bits(), 5);
        assert_eq!(ty.alignment_in_bits(), 1);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(DataType::integer(4).is_integer());
        assert!(DataType::Float.is_float());
        assert!(DataType::Double.is_double());
        assert!(DataType::Boolean.is_boolean());
        assert!(DataType::char(3).is_character_sequence());
        assert!(DataType::Date.is_date());
        assert!(DataType::bitmap(1).is_bitmap());

        assert!(!DataType::Double.is_float());
        assert!(!DataType::integer(4).is_bitmap());
    }

    #[test]
    fn test_parse_known_forms() {
        assert_eq!("int(4)".parse::<DataType>().unwrap(), DataType::integer(4));
        assert_eq!("float".parse::<DataType>().unwrap(), DataType::Float);
        assert_eq!("double".parse::<DataType>().unwrap(), DataType::Double);
        assert_eq!("bool".parse::<DataType>().unwrap(), DataType::Boolean);
        assert_eq!("char(20)".parse::<DataType>().unwrap(), DataType::char(20));
        assert_eq!("date".parse::<DataType>().unwrap(), DataType::Date);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("varchar(9)".parse::<DataType>().is_err());
        assert!("int(3)".parse::<DataType>().is_err());
        assert!("char(0)".parse::<DataType>().is_err());
        assert!("".parse::<DataType>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for ty in [
            DataType::integer(8),
            DataType::Float,
            DataType::Double,
            DataType::Boolean,
            DataType::char(3),
            DataType::Date,
        ] {
            let parsed: DataType = ty.to_string().parse().unwrap();
            assert_eq!(parsed, ty);
        }
    }
}
