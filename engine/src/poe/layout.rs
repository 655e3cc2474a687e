//! Literal markers and column tables of the PoE log layout.

/// Every label, marker and fixed column list the PoE scanners match on.
#[derive(Debug)]
pub struct PoeLayout {
    pub packet_params: &'static [&'static str],
    pub learning_params: &'static [&'static str],
    pub process_detail_marker: &'static str,
    pub process_time_marker: &'static str,
    pub test_time_label: &'static str,
    pub port_header: &'static str,
    pub port_columns: &'static [&'static str],
    pub byte_header: &'static str,
    pub byte_columns: &'static [&'static str],
    pub vlan_header: &'static str,
    pub vlan_columns: &'static [&'static str],
    pub stream_header: &'static str,
    pub stream_columns: &'static [&'static str],
    pub serial_marker: &'static str,
    pub summary_marker: &'static str,
    /// Dash run that ends the summary block.
    pub summary_rule_width: usize,
    pub task_table_header: &'static str,
    /// `(start, end)` character columns of the task-status table; `None`
    /// runs to the end of the line.
    pub task_columns: [(usize, Option<usize>); 6],
}

impl PoeLayout {
    pub fn standard() -> &'static Self {
        &STANDARD
    }
}

static STANDARD: PoeLayout = PoeLayout {
    packet_params: &[
        "Frame Count",
        "Frame Gap",
        "Burst Count",
        "Collision Release Gap",
        "Tx Timeout",
        "Wait for Read Counter",
    ],
    learning_params: &[
        "Learning Count",
        "Learning Delay",
        "Learning Gap",
        "Learning Timeout",
        "Allowable Tolerance Loss(Per Port)",
        "Allowable Tolerance Excess(Per Port)",
        "Minimum Collision",
    ],
    process_detail_marker: "Process Detail:",
    process_time_marker: "Process Time Summary:",
    test_time_label: "Test Time",
    port_header: "Port",
    port_columns: &[
        "TxPacket",
        "RxPacket",
        "TxByte",
        "RxByte",
        "X-TAG",
        "Unicast",
        "Multicast",
        "Broadcast",
        "UnderSize",
        "OverSize",
        "Pause",
        "Fragment Err",
    ],
    byte_header: "64byte",
    byte_columns: &["64Byte", "65-127Byte", "128-255Byte", "256-511Byte", "512-1023Byte"],
    vlan_header: "VLAN IP Checksum Error",
    vlan_columns: &[
        "VLAN",
        "IP Checksum Error",
        "Latency CT(us)",
        "Latency SF(us)",
        "Tx Line Rate (Mbps)",
        "IPv4",
        "Packet Loss Rate",
    ],
    stream_header: "SPort",
    stream_columns: &[
        "TxPackets",
        "RxPackets",
        "TxBytes",
        "RxBytes",
        "RxLostPacket",
        "RxSNError",
        "RxIPCsError",
    ],
    serial_marker: "SN1#:",
    summary_marker: "===<< SUMMARY >>",
    summary_rule_width: 64,
    task_table_header: "Index Task Name",
    task_columns: [
        (0, Some(8)),
        (8, Some(44)),
        (44, Some(60)),
        (61, Some(77)),
        (78, Some(94)),
        (95, None),
    ],
};
