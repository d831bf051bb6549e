//! Device tables.
//!
//! One device per line, fields separated by `;`, lines starting with `#` are
//! comments. There is no header row.
//!
//! ```text
//! # name;deveui;appeui;appkey
//! dev02;1234592444670202;0000000200000001;194B89CE084006914BDA510D18DC3281
//! ```

use std::{fs::File, io, path::Path};

use anyhow::{Context, Result};
use loralab_common::credentials::DeviceRecord;

fn csv_reader<R: io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .comment(Some(b'#'))
        .has_headers(false)
        .from_reader(reader)
}

/// Read all device records, in file order.
pub fn read_device_records<R: io::Read>(reader: R) -> Result<Vec<DeviceRecord>> {
    let mut records = Vec::new();
    for row in csv_reader(reader).records() {
        let row = row.context("Could not read device table")?;
        let line = row.position().map_or(0, |p| p.line());
        let record = DeviceRecord::from_fields(row.iter())
            .with_context(|| format!("Invalid device record on line {}", line))?;
        records.push(record);
    }
    Ok(records)
}

pub fn read_device_file(path: &Path) -> Result<Vec<DeviceRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Could not open device file {}", path.display()))?;
    read_device_records(file).with_context(|| format!("Could not read {}", path.display()))
}
