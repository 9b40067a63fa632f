use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeMap;

/// Month labels closer to a grid edge than this collide and are dropped.
const LABEL_EDGE_MARGIN: usize = 3;

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One calendar day of activity. `level` is always derived from `count`,
/// never taken from upstream data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u32,
    pub level: u8,
}

impl ContributionDay {
    pub fn new(date: NaiveDate, count: u32) -> Self {
        Self {
            date,
            count,
            level: level_for(count),
        }
    }
}

/// Quantize an activity count to an intensity level, inclusive lower bounds.
pub fn level_for(count: u32) -> u8 {
    match count {
        0 => 0,
        1..=2 => 1,
        3..=5 => 2,
        6..=9 => 3,
        _ => 4,
    }
}

/// Seven weekday slots, top-to-bottom from the configured week start.
/// `None` slots are alignment padding at the grid edges.
#[derive(Clone, Copy, Debug)]
pub struct WeekColumn {
    pub days: [Option<ContributionDay>; 7],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthLabel {
    pub week: usize,
    pub text: &'static str,
}

pub struct ContributionGrid {
    pub weeks: Vec<WeekColumn>,
    pub labels: Vec<MonthLabel>,
}

/// Expand a sparse (date, count) list into a dense day range. Days missing
/// between the first and last record are synthesized at zero activity.
/// Duplicate dates resolve last-write-wins.
pub fn fill_gaps(records: &[(NaiveDate, u32)]) -> Vec<ContributionDay> {
    let mut by_date = BTreeMap::new();
    for &(date, count) in records {
        by_date.insert(date, count);
    }

    let (first, last) = match (by_date.keys().next(), by_date.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Vec::new(),
    };

    let mut days = Vec::new();
    let mut current = first;
    loop {
        let count = by_date.get(&current).copied().unwrap_or(0);
        days.push(ContributionDay::new(current, count));
        if current == last {
            break;
        }
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    days
}

fn weekday_offset(date: NaiveDate, week_start: Weekday) -> usize {
    let day = date.weekday().num_days_from_sunday();
    let start = week_start.num_days_from_sunday();
    ((7 + day - start) % 7) as usize
}

/// Group a dense day sequence into week columns aligned to `week_start`,
/// then place month labels. Empty input yields no grid at all.
pub fn build_grid(days: &[ContributionDay], week_start: Weekday) -> Option<ContributionGrid> {
    if days.is_empty() {
        return None;
    }

    let offset = weekday_offset(days[0].date, week_start);
    let mut slots: Vec<Option<ContributionDay>> = vec![None; offset];
    slots.extend(days.iter().copied().map(Some));
    while slots.len() % 7 != 0 {
        slots.push(None);
    }

    let weeks: Vec<WeekColumn> = slots
        .chunks(7)
        .map(|chunk| {
            let mut column = [None; 7];
            column.copy_from_slice(chunk);
            WeekColumn { days: column }
        })
        .collect();

    let labels = month_labels(&weeks);
    Some(ContributionGrid { weeks, labels })
}

/// A label marks the first week whose first populated day enters a new
/// month. Labels too close to either grid edge are dropped so they cannot
/// collide with a neighbor or overrun the grid.
pub fn month_labels(weeks: &[WeekColumn]) -> Vec<MonthLabel> {
    let mut labels = Vec::new();
    let mut last_seen: Option<(i32, u32)> = None;

    for (week, column) in weeks.iter().enumerate() {
        let first_day = match column.days.iter().flatten().next() {
            Some(day) => day,
            None => continue,
        };
        let key = (first_day.date.year(), first_day.date.month());
        if last_seen != Some(key) {
            last_seen = Some(key);
            labels.push(MonthLabel {
                week,
                text: MONTH_ABBR[(key.1 - 1) as usize],
            });
        }
    }

    if labels.len() >= 2 && labels[1].week - labels[0].week < LABEL_EDGE_MARGIN {
        labels.remove(0);
    }
    if let Some(last) = labels.last() {
        if weeks.len() - last.week < LABEL_EDGE_MARGIN {
            labels.pop();
        }
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn quantization_boundaries_are_exact() {
        assert_eq!(level_for(0), 0);
        assert_eq!(level_for(1), 1);
        assert_eq!(level_for(2), 1);
        assert_eq!(level_for(3), 2);
        assert_eq!(level_for(5), 2);
        assert_eq!(level_for(6), 3);
        assert_eq!(level_for(9), 3);
        assert_eq!(level_for(10), 4);
        assert_eq!(level_for(250), 4);
    }

    #[test]
    fn quantization_is_monotonic() {
        for c in 0..100 {
            assert!(level_for(c) <= level_for(c + 1));
        }
    }

    #[test]
    fn gaps_are_filled_with_zero_days() {
        let days = fill_gaps(&[(date(2024, 1, 1), 5), (date(2024, 1, 4), 2)]);
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], ContributionDay::new(date(2024, 1, 1), 5));
        assert_eq!(days[1], ContributionDay::new(date(2024, 1, 2), 0));
        assert_eq!(days[2], ContributionDay::new(date(2024, 1, 3), 0));
        assert_eq!(days[3], ContributionDay::new(date(2024, 1, 4), 2));
        assert_eq!(days[1].level, 0);
    }

    #[test]
    fn gap_filling_sorts_and_dedups_last_write_wins() {
        let days = fill_gaps(&[
            (date(2024, 1, 3), 1),
            (date(2024, 1, 1), 2),
            (date(2024, 1, 1), 7),
        ]);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].count, 7);
        assert_eq!(days[0].level, 3);
    }

    #[test]
    fn empty_input_builds_nothing() {
        assert!(fill_gaps(&[]).is_empty());
        assert!(build_grid(&[], Weekday::Sun).is_none());
    }

    #[test]
    fn grid_slots_are_a_multiple_of_seven() {
        let days = fill_gaps(&[(date(2024, 1, 1), 1), (date(2024, 3, 10), 4)]);
        let day_count = days.len();
        let grid = build_grid(&days, Weekday::Sun).unwrap();

        let populated: usize = grid
            .weeks
            .iter()
            .map(|w| w.days.iter().filter(|d| d.is_some()).count())
            .sum();
        let padding: usize = grid
            .weeks
            .iter()
            .map(|w| w.days.iter().filter(|d| d.is_none()).count())
            .sum();
        assert_eq!(populated, day_count);
        assert_eq!(populated + padding, grid.weeks.len() * 7);
    }

    #[test]
    fn first_day_lands_in_its_weekday_row() {
        // 2024-01-01 was a Monday.
        let days = fill_gaps(&[(date(2024, 1, 1), 1), (date(2024, 1, 14), 1)]);

        let sunday_grid = build_grid(&days, Weekday::Sun).unwrap();
        assert!(sunday_grid.weeks[0].days[0].is_none());
        assert_eq!(
            sunday_grid.weeks[0].days[1].unwrap().date,
            date(2024, 1, 1)
        );

        let monday_grid = build_grid(&days, Weekday::Mon).unwrap();
        assert_eq!(
            monday_grid.weeks[0].days[0].unwrap().date,
            date(2024, 1, 1)
        );
    }

    #[test]
    fn middle_weeks_are_fully_populated() {
        let days = fill_gaps(&[(date(2024, 1, 3), 1), (date(2024, 2, 20), 1)]);
        let grid = build_grid(&days, Weekday::Sun).unwrap();
        for week in &grid.weeks[1..grid.weeks.len() - 1] {
            assert!(week.days.iter().all(|d| d.is_some()));
        }
    }

    #[test]
    fn two_week_grid_yields_no_labels() {
        // 2024-01-07 was a Sunday; fourteen aligned days, exactly two weeks.
        let days = fill_gaps(&[(date(2024, 1, 7), 1), (date(2024, 1, 20), 1)]);
        let grid = build_grid(&days, Weekday::Sun).unwrap();
        assert_eq!(grid.weeks.len(), 2);
        assert!(grid.labels.is_empty());
    }

    #[test]
    fn year_of_data_labels_each_month_once() {
        let days = fill_gaps(&[(date(2023, 6, 4), 1), (date(2024, 6, 1), 1)]);
        let grid = build_grid(&days, Weekday::Sun).unwrap();
        // Every label is a distinct week, in order, inside the grid.
        let mut prev = None;
        for label in &grid.labels {
            assert!(label.week < grid.weeks.len());
            if let Some(p) = prev {
                assert!(label.week > p);
            }
            prev = Some(label.week);
        }
        // A year span re-enters June; both sides may label it.
        assert!(grid.labels.len() >= 11);
        assert!(grid
            .labels
            .iter()
            .any(|l| l.text == "Jan"));
    }

    #[test]
    fn leading_label_too_close_to_next_is_dropped() {
        // Late-December start: "Dec" labels week 0, "Jan" lands 2 weeks later.
        let days = fill_gaps(&[(date(2023, 12, 27), 1), (date(2024, 3, 30), 1)]);
        let grid = build_grid(&days, Weekday::Sun).unwrap();
        assert!(grid.labels.iter().all(|l| l.text != "Dec"));
        assert!(grid.labels.iter().any(|l| l.text == "Jan"));
    }
}
