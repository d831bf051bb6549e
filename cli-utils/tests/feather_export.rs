use std::fs;

use chrono::{TimeZone, Utc};
use loralab_cli_utils::{
    export::export,
    uplink::{JsonDumpSource, UplinkFilter},
};
use tempfile::TempDir;

const DUMP: &str = r#"[
    {
        "id": 1,
        "device_name": "feather01",
        "device_otaa_dev_eui": "1234592444670202",
        "device_otaa_app_eui": "0000000200000001",
        "device_f_cnt_up": 3,
        "frequency": 868100000,
        "data_rate": "SF7BW125",
        "payload_raw": "9b40",
        "reception_time": "2018-03-01T10:00:00Z",
        "receptions": [
            {"time": "2018-03-01T10:00:00.250Z", "rssi": -97, "snr": 7.5, "gateway_eui": "B827EBFFFE123456"}
        ]
    },
    {
        "id": 2,
        "device_name": "feather02",
        "device_otaa_dev_eui": "1234592444670203",
        "device_otaa_app_eui": "0000000200000002",
        "payload_raw": "8000ff",
        "reception_time": "2018-03-01T11:00:00Z",
        "receptions": [
            {"time": "2018-03-01T11:00:00Z", "rssi": -120, "snr": -12.25, "gateway_eui": "B827EBFFFE123456"},
            {"time": "2018-03-01T11:00:00Z", "rssi": -101, "gateway_eui": "B827EBFFFE654321"}
        ]
    },
    {
        "id": 3,
        "device_name": "feather01",
        "device_otaa_app_eui": "0000000200000001",
        "payload_raw": "00",
        "reception_time": "2018-03-02T10:00:00Z",
        "receptions": []
    }
]"#;

fn filter(app_euis: &[&str]) -> UplinkFilter {
    UplinkFilter {
        since: Utc.with_ymd_and_hms(2018, 3, 1, 0, 1, 0).unwrap(),
        until: Utc.with_ymd_and_hms(2018, 3, 1, 23, 59, 0).unwrap(),
        app_euis: app_euis.iter().map(|s| s.to_string()).collect(),
    }
}

fn run(app_euis: &[&str], with_header: bool) -> (usize, String) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("uplinks.json");
    fs::write(&path, DUMP).unwrap();

    let mut out = Vec::new();
    let rows = export(
        &JsonDumpSource::new(&path),
        &filter(app_euis),
        &Utc,
        &mut out,
        with_header,
    )
    .unwrap();
    (rows, String::from_utf8(out).unwrap())
}

#[test]
fn test_export_window() {
    // Uplink 3 is outside the window, its short payload is never decoded
    let (rows, csv) = run(&[], true);
    assert_eq!(rows, 3);

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("uplink_id,"));
    assert_eq!(
        lines[1],
        "1,868100000,SF7BW125,1519898400250000000,2018/03/01,10:00:00.250,-97,7.50,\
         B827EBFFFE123456,feather01,0000000200000001,1234592444670202,3,4.00,0"
    );
    assert!(lines[2].ends_with(",-12.25,B827EBFFFE123456,feather02,0000000200000002,1234592444670203,0,3.30,-64"));
    assert!(lines[3].contains(",-101,,B827EBFFFE654321,"));
}

#[test]
fn test_export_app_eui_filter() {
    let (rows, csv) = run(&["0000000200000002"], false);
    assert_eq!(rows, 2);
    assert!(csv.lines().all(|line| line.starts_with("2,")));
}

#[test]
fn test_export_nothing_matches_still_writes_header() {
    let (rows, csv) = run(&["FFFFFFFFFFFFFFFF"], true);
    assert_eq!(rows, 0);
    assert_eq!(csv.lines().count(), 1);
    assert!(csv.starts_with("uplink_id,uplink_frequency,"));
    assert!(csv.trim_end().ends_with(",payload_voltage,payload_rssi"));
}

#[test]
fn test_missing_dump_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut out = Vec::new();
    let err = export(
        &JsonDumpSource::new(dir.path().join("missing.json")),
        &filter(&[]),
        &Utc,
        &mut out,
        true,
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("Could not open uplink dump"));
    assert!(out.is_empty());
}
