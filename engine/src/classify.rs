//! Chart-category classification for PoE fields.
//!
//! Pure and deterministic: the category depends only on the field name and
//! whether its value is numeric. Groups are tested in order with a
//! case-insensitive prefix match; the first hit wins.

use report_extract_core::ChartCategory;

const CATEGORY_PREFIXES: &[(ChartCategory, &[&str])] = &[
    (ChartCategory::TxPacketsVsRxPackets, &["TxPacket", "RxPacket"]),
    (
        ChartCategory::FrameSizeDistribution,
        &[
            "64Byte_",
            "65-127Byte_",
            "128-255Byte_",
            "256-511Byte_",
            "512-1023Byte_",
        ],
    ),
    (ChartCategory::LatencyPerTest, &["Latency CT(us)"]),
    (
        ChartCategory::ErrorCounts,
        &["IP Checksum Error", "RxSNError", "RxIPCsError"],
    ),
    (ChartCategory::TxLineRateVsTestName, &["Tx Line Rate"]),
];

/// Returns the chart category for a field; [`ChartCategory::None`] for
/// non-numeric fields and unmatched names.
pub fn classify_field(name: &str, is_numeric: bool) -> ChartCategory {
    if !is_numeric {
        return ChartCategory::None;
    }
    CATEGORY_PREFIXES
        .iter()
        .find(|(_, prefixes)| prefixes.iter().any(|prefix| has_prefix_ignore_case(name, prefix)))
        .map_or(ChartCategory::None, |(category, _)| *category)
}

fn has_prefix_ignore_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.is_char_boundary(prefix.len())
        && name[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_counters() {
        assert_eq!(
            classify_field("TxPacket_1(0,4,1)", true),
            ChartCategory::TxPacketsVsRxPackets
        );
        assert_eq!(
            classify_field("rxpackets((0, 4, 1))((0, 4, 2))", true),
            ChartCategory::TxPacketsVsRxPackets
        );
    }

    #[test]
    fn test_frame_size_buckets() {
        assert_eq!(
            classify_field("64Byte_1_1(0,4,1)", true),
            ChartCategory::FrameSizeDistribution
        );
        assert_eq!(
            classify_field("512-1023Byte_2(0,4,2)", true),
            ChartCategory::FrameSizeDistribution
        );
    }

    #[test]
    fn test_latency_errors_and_line_rate() {
        assert_eq!(
            classify_field("Latency CT(us)_1(0,4,1)", true),
            ChartCategory::LatencyPerTest
        );
        assert_eq!(
            classify_field("Latency SF(us)_1(0,4,1)", true),
            ChartCategory::None
        );
        assert_eq!(
            classify_field("IP Checksum Error_1(0,4,1)", true),
            ChartCategory::ErrorCounts
        );
        assert_eq!(
            classify_field("RxSNError((0, 4, 1))((0, 4, 2))", true),
            ChartCategory::ErrorCounts
        );
        assert_eq!(
            classify_field("Tx Line Rate (Mbps)_1(0,4,1)", true),
            ChartCategory::TxLineRateVsTestName
        );
    }

    #[test]
    fn test_non_numeric_is_always_none() {
        assert_eq!(classify_field("TxPacket_1(0,4,1)", false), ChartCategory::None);
        assert_eq!(classify_field("Frame Count", true), ChartCategory::None);
    }

    #[test]
    fn test_classification_is_pure() {
        let first = classify_field("TxByte_1(0,4,1)", true);
        let second = classify_field("TxByte_1(0,4,1)", true);
        assert_eq!(first, second);
        assert_eq!(first, ChartCategory::None);
    }
}
