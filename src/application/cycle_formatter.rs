// Cycle formatter - Presentation fields for consolidated cycles
use crate::domain::charge::{ChargeCycle, FormattedCycle};
use chrono::{NaiveDateTime, TimeDelta};

const DATE_LABEL: &str = "%d-%m-%Y";
const CLOCK_LABEL: &str = "%I:%M:%S %p";

/// Renders a span as "{days} days {hours} hrs {minutes} mins", truncating
/// leftover seconds.
pub fn format_duration(duration: TimeDelta) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    format!("{} days {} hrs {} mins", days, hours, minutes)
}

pub fn clock_label(time: NaiveDateTime) -> String {
    time.format(CLOCK_LABEL).to_string()
}

pub fn format_cycle(charge_number: usize, cycle: &ChargeCycle) -> FormattedCycle {
    let duration_label = format_duration(cycle.duration);
    let offline_duration_display = cycle.is_long_offline.then(|| duration_label.clone());

    FormattedCycle {
        charge_number,
        date: cycle.date,
        date_label: cycle.start_time.format(DATE_LABEL).to_string(),
        start_time: cycle.start_time,
        end_time: cycle.end_time,
        start_time_label: clock_label(cycle.start_time),
        end_time_label: clock_label(cycle.end_time),
        start_voltage: cycle.start_voltage,
        max_voltage: cycle.max_voltage,
        duration_label,
        is_long_offline: cycle.is_long_offline,
        offline_days: cycle.offline_days,
        offline_duration_display,
    }
}

/// Formats cycles in merge order, numbering them from 1.
pub fn format_cycles(cycles: &[ChargeCycle]) -> Vec<FormattedCycle> {
    cycles
        .iter()
        .enumerate()
        .map(|(i, cycle)| format_cycle(i + 1, cycle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::charge::RawChargeCandidate;
    use chrono::NaiveDate;

    fn cycle(start: NaiveDateTime, end: NaiveDateTime) -> ChargeCycle {
        ChargeCycle::from_candidate(&RawChargeCandidate {
            start_time: start,
            end_time: end,
            start_voltage: 3.25,
            max_voltage: 4.0,
        })
    }

    fn at(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::zero()), "0 days 0 hrs 0 mins");
        assert_eq!(format_duration(TimeDelta::hours(72)), "3 days 0 hrs 0 mins");
        assert_eq!(
            format_duration(TimeDelta::seconds(90_061 + 59)),
            "1 days 1 hrs 2 mins"
        );
    }

    #[test]
    fn test_clock_labels_are_twelve_hour() {
        let formatted = format_cycle(1, &cycle(at(5, 0, 5, 9), at(5, 13, 45, 0)));

        assert_eq!(formatted.date_label, "05-02-2024");
        assert_eq!(formatted.start_time_label, "12:05:09 AM");
        assert_eq!(formatted.end_time_label, "01:45:00 PM");
        assert_eq!(formatted.duration_label, "0 days 13 hrs 39 mins");
        assert!(!formatted.is_long_offline);
        assert_eq!(formatted.offline_duration_display, None);
    }

    #[test]
    fn test_long_offline_gets_display() {
        let formatted = format_cycle(1, &cycle(at(1, 6, 0, 0), at(4, 6, 0, 0)));

        assert!(formatted.is_long_offline);
        assert_eq!(formatted.offline_days, 3.0);
        assert_eq!(
            formatted.offline_duration_display.as_deref(),
            Some("3 days 0 hrs 0 mins")
        );
    }

    #[test]
    fn test_charge_numbers_follow_order() {
        let cycles = vec![
            cycle(at(1, 6, 0, 0), at(1, 7, 0, 0)),
            cycle(at(2, 6, 0, 0), at(2, 7, 0, 0)),
        ];
        let formatted = format_cycles(&cycles);

        assert_eq!(formatted[0].charge_number, 1);
        assert_eq!(formatted[1].charge_number, 2);
        assert_eq!(formatted[1].date, NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
    }
}
