//! Stop-name search over the schedule sheet.
//!
//! The table is small (a few hundred rows for a county network), so search
//! is a linear scan with no secondary index.

use crate::domain::{Direction, ScheduleRow};

/// The loaded schedule, searchable by stop name.
#[derive(Debug, Clone, Default)]
pub struct TimetableIndex {
    rows: Vec<ScheduleRow>,
}

impl TimetableIndex {
    /// Create an index over rows in sheet order.
    pub fn new(rows: Vec<ScheduleRow>) -> Self {
        Self { rows }
    }

    /// Find rows whose `direction` leg is complete and whose stop name
    /// contains `query`.
    ///
    /// Matching is a case-sensitive substring test. Results are ordered by
    /// departure minute; rows with unreadable departure times come last, and
    /// equal keys keep sheet order. An empty query matches nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_server::domain::{Direction, ScheduleRow};
    /// use timetable_server::timetable::TimetableIndex;
    ///
    /// let index = TimetableIndex::new(vec![
    ///     ScheduleRow::from_cells(["강진터미널", "09:00", "09:10", "101", "A"]),
    /// ]);
    ///
    /// assert_eq!(index.search(Direction::Up, "강진").len(), 1);
    /// assert!(index.search(Direction::Down, "강진").is_empty());
    /// ```
    pub fn search(&self, direction: Direction, query: &str) -> Vec<&ScheduleRow> {
        if query.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<&ScheduleRow> = self
            .rows
            .iter()
            .filter(|row| {
                row.leg(direction)
                    .is_some_and(|leg| leg.stop_name.contains(query))
            })
            .collect();

        // Stable sort: ties keep sheet order.
        matches.sort_by_key(|row| {
            row.leg(direction)
                .map(|leg| leg.departure_minutes())
                .unwrap_or(u32::MAX)
        });

        matches
    }

    /// All rows in sheet order.
    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    /// Number of complete legs for `direction`.
    pub fn leg_count(&self, direction: Direction) -> usize {
        self.rows
            .iter()
            .filter(|row| row.leg(direction).is_some())
            .count()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::Leg;
    use proptest::prelude::*;

    const STOPS: [&str; 4] = ["강진터미널", "신강진", "마량", "성전"];

    fn time_cell() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u32..24, 0u32..60).prop_map(|(h, m)| format!("{h:02}:{m:02}")),
            (0u32..24, 0u32..60).prop_map(|(h, m)| format!("{h}:{m:02}:00")),
            Just("--:--".to_string()),
            Just("".to_string()),
        ]
    }

    /// (stop, departure, route); a blank route leaves the leg incomplete.
    fn half() -> impl Strategy<Value = (&'static str, String, String)> {
        (
            prop::sample::select(STOPS.to_vec()),
            time_cell(),
            prop_oneof![Just("".to_string()), Just("101".to_string())],
        )
    }

    fn row() -> impl Strategy<Value = Vec<String>> {
        (half(), half()).prop_map(|((s1, t1, r1), (s2, t2, r2))| {
            vec![
                s1.to_string(),
                t1,
                "12:00".to_string(),
                r1,
                "A".to_string(),
                s2.to_string(),
                t2,
                "12:00".to_string(),
                r2,
                "B".to_string(),
            ]
        })
    }

    fn build(rows: &[Vec<String>]) -> TimetableIndex {
        TimetableIndex::new(
            rows.iter()
                .map(|cells| ScheduleRow::from_cells(cells.iter().map(String::as_str)))
                .collect(),
        )
    }

    proptest! {
        /// Every complete leg whose stop name contains the query is returned,
        /// and nothing else is
        #[test]
        fn search_is_exact_filter(
            rows in prop::collection::vec(row(), 0..30),
            query in prop::sample::select(vec!["강진", "마량", "터미널", "전"]),
            up in any::<bool>(),
        ) {
            let direction = if up { Direction::Up } else { Direction::Down };
            let index = build(&rows);
            let found = index.search(direction, query);

            let expected = index
                .rows()
                .iter()
                .filter_map(|r| r.leg(direction))
                .filter(|leg| leg.stop_name.contains(query))
                .count();
            prop_assert_eq!(found.len(), expected);

            for row in &found {
                let leg: &Leg = row.leg(direction).unwrap();
                prop_assert!(leg.stop_name.contains(query));
            }
        }

        /// Output is non-decreasing in departure minutes
        #[test]
        fn search_is_sorted(rows in prop::collection::vec(row(), 0..30)) {
            let index = build(&rows);
            for direction in Direction::ALL {
                let found = index.search(direction, "강진");
                let keys: Vec<u32> = found
                    .iter()
                    .map(|r| r.leg(direction).unwrap().departure_minutes())
                    .collect();
                prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
            }
        }
    }
}
