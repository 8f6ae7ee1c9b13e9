use crate::device::probe::ProbeOutcome;
use crate::inventory::DeviceRecord;

const HEADERS: [&str; 5] = ["#", "Name", "Host", "Device Name", "Version"];
const PLACEHOLDER: &str = "-";

/// Renders the status table: ordinal, configured name, host, and the live
/// name and firmware version a device reported. Unreachable devices show
/// placeholders.
pub fn render(devices: &[DeviceRecord], outcomes: &[ProbeOutcome]) -> String {
    let rows = devices
        .iter()
        .zip(outcomes)
        .enumerate()
        .map(|(index, (device, outcome))| {
            let (live_name, live_version) = match outcome {
                ProbeOutcome::Status(status) => (status.friendly_name.clone(), status.version.clone()),
                ProbeOutcome::Unreachable => (PLACEHOLDER.to_string(), PLACEHOLDER.to_string()),
            };
            [
                (index + 1).to_string(),
                device.name.clone(),
                device.host.clone(),
                live_name,
                live_version,
            ]
        })
        .collect::<Vec<_>>();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut table = String::new();
    table.push_str(&format_row(&HEADERS.map(String::from), &widths));
    table.push_str(&format_row(&widths.map(|width| "-".repeat(width)), &widths));
    for row in &rows {
        table.push_str(&format_row(row, &widths));
    }
    table
}

fn format_row(cells: &[String; 5], widths: &[usize; 5]) -> String {
    let columns = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>();

    format!("{}\n", columns.join("  ").trim_end())
}
