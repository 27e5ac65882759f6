//! Date and file-name formatting for the visible parts of an invoice.

use chrono::{Datelike, Local, Months, NaiveDate};

/// First and last calendar day of one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// `"1 December, 2025"`: bare day number, full English month name,
/// four-digit year.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%-d %B, %Y").to_string()
}

/// `"01/12/25 - 31/12/25"`: zero-padded day and month, two-digit year.
pub fn format_date_range_slash(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", start.format("%d/%m/%y"), end.format("%d/%m/%y"))
}

/// Bounds of the month `offset` months away from the current local month
/// (0 = this month, -1 = last month).
pub fn month_bounds(offset: i32) -> Option<MonthBounds> {
    month_bounds_from(Local::now().date_naive(), offset)
}

/// Bounds of the month `offset` months away from the month containing
/// `today`. `None` only outside chrono's representable date range.
pub fn month_bounds_from(today: NaiveDate, offset: i32) -> Option<MonthBounds> {
    let first = today.with_day(1)?;
    let months = Months::new(offset.unsigned_abs());
    let start = if offset >= 0 {
        first.checked_add_months(months)?
    } else {
        first.checked_sub_months(months)?
    };
    let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
    Some(MonthBounds { start, end })
}

/// The current month and the `count - 1` months before it, newest first,
/// labelled `"<Month> <year>"`.
pub fn recent_months(today: NaiveDate, count: u32) -> Vec<(String, MonthBounds)> {
    (0..count)
        .map_while(|back| i32::try_from(back).ok())
        .map_while(|back| month_bounds_from(today, -back))
        .map(|bounds| (bounds.start.format("%B %Y").to_string(), bounds))
        .collect()
}

/// `Invoice-<number>-<client>.pdf`, with every whitespace run in the
/// client name collapsed to one hyphen. Path separators also become
/// hyphens so the name stays a single path component.
pub fn invoice_file_name(invoice_number: &str, client_name: &str) -> String {
    let mut client = String::with_capacity(client_name.len());
    let mut in_whitespace = false;
    for ch in client_name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                client.push('-');
            }
            in_whitespace = true;
        } else {
            client.push(if ch == '/' || ch == '\\' { '-' } else { ch });
            in_whitespace = false;
        }
    }
    format!("Invoice-{}-{}.pdf", invoice_number, client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn long_date_has_no_padding_or_ordinal() {
        assert_eq!(format_long_date(date(2025, 12, 1)), "1 December, 2025");
        assert_eq!(format_long_date(date(2025, 1, 9)), "9 January, 2025");
        assert_eq!(format_long_date(date(2024, 2, 29)), "29 February, 2024");
    }

    #[test]
    fn slash_range_is_zero_padded() {
        assert_eq!(
            format_date_range_slash(date(2025, 12, 1), date(2025, 12, 31)),
            "01/12/25 - 31/12/25"
        );
        assert_eq!(
            format_date_range_slash(date(2009, 3, 1), date(2009, 3, 31)),
            "01/03/09 - 31/03/09"
        );
    }

    #[test]
    fn current_month_bounds() {
        for day in [1, 15, 31] {
            let bounds = month_bounds_from(date(2025, 3, day), 0).unwrap();
            assert_eq!(bounds.start, date(2025, 3, 1));
            assert_eq!(bounds.end, date(2025, 3, 31));
        }
    }

    #[test]
    fn previous_month_respects_leap_years() {
        let non_leap = month_bounds_from(date(2025, 3, 20), -1).unwrap();
        assert_eq!(non_leap, MonthBounds { start: date(2025, 2, 1), end: date(2025, 2, 28) });

        let leap = month_bounds_from(date(2024, 3, 31), -1).unwrap();
        assert_eq!(leap, MonthBounds { start: date(2024, 2, 1), end: date(2024, 2, 29) });
    }

    #[test]
    fn offsets_cross_year_boundaries() {
        let back = month_bounds_from(date(2025, 1, 10), -1).unwrap();
        assert_eq!(back, MonthBounds { start: date(2024, 12, 1), end: date(2024, 12, 31) });

        let ahead = month_bounds_from(date(2025, 11, 30), 2).unwrap();
        assert_eq!(ahead, MonthBounds { start: date(2026, 1, 1), end: date(2026, 1, 31) });

        let year_back = month_bounds_from(date(2025, 4, 30), -12).unwrap();
        assert_eq!(year_back.start, date(2024, 4, 1));
        assert_eq!(year_back.end, date(2024, 4, 30));
    }

    #[test]
    fn recent_months_newest_first() {
        let months = recent_months(date(2025, 3, 5), 12);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].0, "March 2025");
        assert_eq!(months[1].0, "February 2025");
        assert_eq!(months[11].0, "April 2024");
        assert_eq!(months[1].1.end, date(2025, 2, 28));
    }

    #[test]
    fn recent_months_stops_at_the_calendar_edge() {
        assert!(recent_months(date(2025, 3, 5), 0).is_empty());
        let months = recent_months(NaiveDate::MIN, u32::MAX);
        assert_eq!(months.len(), 1);
    }

    #[test]
    fn local_month_bounds_cover_whole_month() {
        let bounds = month_bounds(0).unwrap();
        let today = Local::now().date_naive();
        assert_eq!(bounds.start.day(), 1);
        assert!(bounds.start <= today && today <= bounds.end);
        assert_eq!(bounds.end.month(), bounds.start.month());
        assert_ne!(bounds.end.succ_opt().map(|d| d.month()), Some(bounds.start.month()));

        let previous = month_bounds(-1).unwrap();
        assert_eq!(previous.end.succ_opt(), Some(bounds.start));
    }

    #[test]
    fn file_name_collapses_whitespace() {
        assert_eq!(invoice_file_name("42", "Acme   Corp Ltd"), "Invoice-42-Acme-Corp-Ltd.pdf");
        assert_eq!(invoice_file_name("7", "Acme\tCorp\n"), "Invoice-7-Acme-Corp-.pdf");
        assert_eq!(invoice_file_name("", "A/B"), "Invoice--A-B.pdf");
    }
}
