//! Export decoded feather uplinks as CSV, one row per gateway reception.

use std::{fmt::Display, io};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use loralab_common::{
    hex_bytes::{to_bytes, ByteOrder},
    payload::TelemetryPayload,
};
use serde::Serialize;

use crate::uplink::{UplinkEntry, UplinkFilter, UplinkSource};

/// Format of the `--since` and `--until` arguments (local time).
pub const INPUT_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Parse a local time given as `YYYY/MM/DD HH:MM:SS`.
pub fn parse_local_time(input: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(input, INPUT_TIME_FORMAT)
        .with_context(|| format!("Invalid time {:?}, expected YYYY/MM/DD HH:MM:SS", input))?;
    Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| anyhow!("Ambiguous or non-existent local time {:?}", input))
}

/// Default export window: from 00:01 of the day of `now` until 23:59.
pub fn default_window<Tz: TimeZone>(now: &DateTime<Tz>) -> Result<(DateTime<Tz>, DateTime<Tz>)> {
    let start = now
        .date_naive()
        .and_hms_opt(0, 1, 0)
        .ok_or_else(|| anyhow!("Invalid start of day"))?;
    let since = now
        .timezone()
        .from_local_datetime(&start)
        .earliest()
        .ok_or_else(|| anyhow!("Start of day does not exist in local time"))?;
    let until = window_end(&since);
    Ok((since, until))
}

/// End of an export window starting at `since`.
pub fn window_end<Tz: TimeZone>(since: &DateTime<Tz>) -> DateTime<Tz> {
    since.clone() + Duration::hours(23) + Duration::minutes(58)
}

/// CSV header, in the field order of [`ExportRow`].
pub const COLUMNS: [&str; 15] = [
    "uplink_id",
    "uplink_frequency",
    "uplink_data_rate",
    "reception_unix",
    "reception_date",
    "reception_time",
    "reception_rssi",
    "reception_snr",
    "reception_gateway_eui",
    "device_name",
    "device_otaa_app_eui",
    "device_otaa_dev_eui",
    "device_f_cnt_up",
    "payload_voltage",
    "payload_rssi",
];

/// One CSV row. Field order is the column order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportRow {
    pub uplink_id: i64,
    pub uplink_frequency: u64,
    pub uplink_data_rate: String,
    pub reception_unix: i64,
    pub reception_date: String,
    pub reception_time: String,
    pub reception_rssi: i32,
    pub reception_snr: String,
    pub reception_gateway_eui: String,
    pub device_name: String,
    pub device_otaa_app_eui: String,
    pub device_otaa_dev_eui: String,
    pub device_f_cnt_up: u32,
    pub payload_voltage: String,
    pub payload_rssi: i16,
}

/// Decode the payload of an uplink.
pub fn decode_payload(entry: &UplinkEntry) -> Result<TelemetryPayload> {
    let data = to_bytes(&entry.payload_raw, ByteOrder::Forward)
        .with_context(|| format!("Uplink {}: invalid payload {:?}", entry.id, entry.payload_raw))?;
    TelemetryPayload::decode(&data).with_context(|| format!("Uplink {}", entry.id))
}

/// Build the CSV rows of `entries`, rendering dates and times in `tz`.
pub fn export_rows<Tz>(entries: &[UplinkEntry], tz: &Tz) -> Result<Vec<ExportRow>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut rows = Vec::new();
    for entry in entries {
        let payload = decode_payload(entry)?;
        for rx in &entry.receptions {
            let local_time = rx.time.with_timezone(tz);
            rows.push(ExportRow {
                uplink_id: entry.id,
                uplink_frequency: entry.frequency,
                uplink_data_rate: entry.data_rate.clone(),
                reception_unix: unix_nanos(&rx.time)?,
                reception_date: local_time.format("%Y/%m/%d").to_string(),
                reception_time: local_time.format("%H:%M:%S%.3f").to_string(),
                reception_rssi: rx.rssi,
                reception_snr: rx.snr.map(|snr| format!("{:.2}", snr)).unwrap_or_default(),
                reception_gateway_eui: rx.gateway_eui.clone(),
                device_name: entry.device_name.clone(),
                device_otaa_app_eui: entry.device_otaa_app_eui.clone(),
                device_otaa_dev_eui: entry.device_otaa_dev_eui.clone(),
                device_f_cnt_up: entry.device_f_cnt_up,
                payload_voltage: format!("{:.2}", payload.voltage),
                payload_rssi: payload.rssi,
            });
        }
    }
    Ok(rows)
}

fn unix_nanos(time: &DateTime<Utc>) -> Result<i64> {
    time.timestamp_nanos_opt()
        .ok_or_else(|| anyhow!("Reception time {} out of range", time))
}

/// Write `rows` as CSV.
///
/// The header row is written even if there are no rows.
pub fn write_csv<W: io::Write>(writer: W, rows: &[ExportRow], with_header: bool) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    if with_header {
        writer
            .write_record(COLUMNS)
            .context("Could not write CSV header")?;
    }
    for row in rows {
        writer.serialize(row).context("Could not write CSV row")?;
    }
    writer.flush().context("Could not flush CSV output")?;
    Ok(())
}

/// Fetch, decode and write all uplinks matching `filter`.
///
/// Returns the number of rows written.
pub fn export<S, W, Tz>(
    source: &S,
    filter: &UplinkFilter,
    tz: &Tz,
    writer: W,
    with_header: bool,
) -> Result<usize>
where
    S: UplinkSource + ?Sized,
    W: io::Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let entries = source.fetch(filter).context("Failed to fetch uplinks")?;
    log::info!("fetched {} uplinks", entries.len());
    let rows = export_rows(&entries, tz)?;
    write_csv(writer, &rows, with_header)?;
    Ok(rows.len())
}
