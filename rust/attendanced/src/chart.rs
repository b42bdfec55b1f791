use crate::session::AttendanceSession;
use serde::Serialize;

pub const Y_AXIS_MAX: f64 = 1.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBar {
    pub roll_no: String,
    pub name: String,
    pub value: u8,
    pub label: &'static str,
}

/// Bar chart model for the current session; rendering is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartModel {
    pub title: String,
    pub y_label: &'static str,
    pub y_max: f64,
    pub bars: Vec<ChartBar>,
    pub present_count: usize,
    pub absent_count: usize,
}

pub fn attendance_chart(session: &AttendanceSession) -> ChartModel {
    let bars: Vec<ChartBar> = session
        .snapshot()
        .into_iter()
        .map(|row| ChartBar {
            value: u8::from(row.is_present),
            label: if row.is_present { "P" } else { "A" },
            roll_no: row.roll_no,
            name: row.name,
        })
        .collect();
    let present_count = bars.iter().filter(|b| b.value == 1).count();
    ChartModel {
        title: format!("Attendance Record - {}", session.class_name()),
        y_label: "Attendance",
        y_max: Y_AXIS_MAX,
        absent_count: bars.len() - present_count,
        present_count,
        bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Roster, StudentRecord};

    #[test]
    fn bars_follow_roster_order_and_collapse_unset() {
        let roster = Roster::new(vec![
            StudentRecord { roll_no: "1".into(), name: "Ann".into() },
            StudentRecord { roll_no: "2".into(), name: "Bo".into() },
            StudentRecord { roll_no: "3".into(), name: "Cy".into() },
        ]);
        let mut session = AttendanceSession::new("classA", roster);
        session.mark_present("2").expect("present");
        session.mark_absent("3").expect("absent");

        let chart = attendance_chart(&session);
        assert_eq!(chart.title, "Attendance Record - classA");
        let labels: Vec<(&str, u8, &str)> = chart
            .bars
            .iter()
            .map(|b| (b.name.as_str(), b.value, b.label))
            .collect();
        assert_eq!(labels, vec![("Ann", 0, "A"), ("Bo", 1, "P"), ("Cy", 0, "A")]);
        assert_eq!(chart.present_count, 1);
        assert_eq!(chart.absent_count, 2);
    }
}
