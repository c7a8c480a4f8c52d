//! Message-type identifiers (port numbers) for application payloads.

proto_enum! {
    /// Application message type carried in [`crate::Data::portnum`]
    #[allow(missing_docs)]
    pub enum PortNum {
        UnknownApp = 0 => "UNKNOWN_APP",
        TextMessageApp = 1 => "TEXT_MESSAGE_APP",
        RemoteHardwareApp = 2 => "REMOTE_HARDWARE_APP",
        PositionApp = 3 => "POSITION_APP",
        NodeinfoApp = 4 => "NODEINFO_APP",
        RoutingApp = 5 => "ROUTING_APP",
        AdminApp = 6 => "ADMIN_APP",
        TextMessageCompressedApp = 7 => "TEXT_MESSAGE_COMPRESSED_APP",
        WaypointApp = 8 => "WAYPOINT_APP",
        AudioApp = 9 => "AUDIO_APP",
        DetectionSensorApp = 10 => "DETECTION_SENSOR_APP",
        AlertApp = 11 => "ALERT_APP",
        ReplyApp = 32 => "REPLY_APP",
        IpTunnelApp = 33 => "IP_TUNNEL_APP",
        PaxcounterApp = 34 => "PAXCOUNTER_APP",
        SerialApp = 64 => "SERIAL_APP",
        StoreForwardApp = 65 => "STORE_FORWARD_APP",
        RangeTestApp = 66 => "RANGE_TEST_APP",
        TelemetryApp = 67 => "TELEMETRY_APP",
        ZpsApp = 68 => "ZPS_APP",
        SimulatorApp = 69 => "SIMULATOR_APP",
        TracerouteApp = 70 => "TRACEROUTE_APP",
        NeighborinfoApp = 71 => "NEIGHBORINFO_APP",
        AtakPlugin = 72 => "ATAK_PLUGIN",
        MapReportApp = 73 => "MAP_REPORT_APP",
        PowerstressApp = 74 => "POWERSTRESS_APP",
        ReticulumTunnelApp = 76 => "RETICULUM_TUNNEL_APP",
        CayenneApp = 77 => "CAYENNE_APP",
        PrivateApp = 256 => "PRIVATE_APP",
        AtakForwarder = 257 => "ATAK_FORWARDER",
        Max = 511 => "MAX",
    }
}
