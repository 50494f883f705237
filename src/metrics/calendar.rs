use chrono::{Datelike, NaiveDate};

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weekday index with Sunday = 0.
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

/// Month index with January = 0.
pub fn month_index(date: NaiveDate) -> usize {
    date.month0() as usize
}

/// Busiest weekday name for the given dates; ties go to the lowest index.
pub fn busiest_weekday<I>(dates: I) -> Option<&'static str>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut counts = [0usize; 7];
    for date in dates {
        counts[weekday_index(date)] += 1;
    }

    let mut best: Option<usize> = None;
    for (index, count) in counts.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        match best {
            Some(current) if counts[current] >= *count => {}
            _ => best = Some(index),
        }
    }

    best.map(|index| DAY_NAMES[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_weekday_index_sunday_first() {
        // 2022-01-02 was a Sunday.
        assert_eq!(weekday_index(date("2022-01-02")), 0);
        assert_eq!(weekday_index(date("2022-01-08")), 6);
    }

    #[test]
    fn test_busiest_weekday() {
        let dates = [
            date("2022-01-03"), // Monday
            date("2022-01-10"), // Monday
            date("2022-01-05"), // Wednesday
        ];
        assert_eq!(busiest_weekday(dates), Some("Monday"));
    }

    #[test]
    fn test_busiest_weekday_tie_prefers_lower_index() {
        let dates = [
            date("2022-01-07"), // Friday
            date("2022-01-04"), // Tuesday
        ];
        assert_eq!(busiest_weekday(dates), Some("Tuesday"));
    }

    #[test]
    fn test_busiest_weekday_empty() {
        assert_eq!(busiest_weekday(Vec::new()), None);
    }
}
