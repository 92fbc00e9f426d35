//! Device resolution over historical rows
//!
//! The loaded dataset may carry several service records per physical
//! device. Current device state for a room keeps, per appliance type,
//! the row with the most recent successfully parsed maintenance date;
//! rows with unparseable dates are considered oldest.

use crate::dates::parse_maintenance_date;
use crate::models::DeviceRecord;
use chrono::NaiveDate;
use std::collections::HashSet;

/// A dataset row selected for a room, with its original row index (the
/// basis of device ids) and pre-parsed maintenance date
#[derive(Debug, Clone, Copy)]
pub struct ResolvedDevice<'a> {
    pub row_index: usize,
    pub record: &'a DeviceRecord,
    pub last_maintenance: Option<NaiveDate>,
}

/// All rows matching a room, in dataset order
pub fn devices_in_room(records: &[DeviceRecord], room_number: i64) -> Vec<ResolvedDevice<'_>> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.room_number == room_number)
        .map(|(row_index, record)| ResolvedDevice {
            row_index,
            record,
            last_maintenance: parse_maintenance_date(&record.last_maintenance_date),
        })
        .collect()
}

/// Current devices for a room: most recently serviced row per appliance
/// type. `None` dates sort last, so an unparseable row never shadows a
/// parseable one.
pub fn current_devices(records: &[DeviceRecord], room_number: i64) -> Vec<ResolvedDevice<'_>> {
    let mut rows = devices_in_room(records, room_number);
    rows.sort_by(|a, b| b.last_maintenance.cmp(&a.last_maintenance));

    let mut seen: HashSet<&str> = HashSet::new();
    rows.retain(|device| seen.insert(device.record.appliance_type.as_str()));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(room: i64, appliance: &str, date: &str) -> DeviceRecord {
        DeviceRecord {
            room_number: room,
            appliance_type: appliance.to_string(),
            last_maintenance_date: date.to_string(),
            usage_hours: Some(100.0),
            average_daily_usage: Some(2.0),
            device_year: Some(2020.0),
            days_since_maintenance: Some(200.0),
            status: Some("Working".to_string()),
            warranty_year: Some(2030),
        }
    }

    #[test]
    fn test_latest_row_wins_per_type() {
        let records = vec![
            record(2000, "TV", "01/01/2022"),
            record(2000, "TV", "03/15/2023"),
            record(2000, "AC", "06/01/2023"),
            record(2001, "TV", "12/01/2023"),
        ];

        let devices = current_devices(&records, 2000);
        assert_eq!(devices.len(), 2);

        let tv = devices.iter().find(|d| d.record.appliance_type == "TV").unwrap();
        assert_eq!(tv.record.last_maintenance_date, "03/15/2023");
        assert_eq!(tv.row_index, 1);
    }

    #[test]
    fn test_unparseable_date_never_beats_parseable() {
        let records = vec![
            record(2000, "TV", "not a date"),
            record(2000, "TV", "01/01/2020"),
        ];

        let devices = current_devices(&records, 2000);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].record.last_maintenance_date, "01/01/2020");
    }

    #[test]
    fn test_all_unparseable_keeps_one() {
        let records = vec![
            record(2000, "TV", "junk"),
            record(2000, "TV", "also junk"),
        ];

        let devices = current_devices(&records, 2000);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].last_maintenance, None);
    }

    #[test]
    fn test_empty_room_is_empty() {
        let records = vec![record(2000, "TV", "01/01/2023")];
        assert!(current_devices(&records, 9999).is_empty());
    }

    #[test]
    fn test_row_indices_preserved() {
        let records = vec![
            record(2000, "AC", "01/01/2023"),
            record(2000, "TV", "02/01/2023"),
        ];
        let mut devices = current_devices(&records, 2000);
        devices.sort_by_key(|d| d.row_index);
        assert_eq!(devices[0].row_index, 0);
        assert_eq!(devices[1].row_index, 1);
    }
}
