//! Day-of-week values used by the discount listing.
//!
//! Day fields are free strings on the backend (a record's day may be a
//! single day, a composite like `"Lunes y Jueves"`, or the every-day
//! sentinel), so days are modeled as canonical string constants rather
//! than an enum.

/// Sentinel day value meaning the discount applies every day.
///
/// In a day selection this value is mutually exclusive with concrete
/// days; see [`crate::query::SelectionSet::toggle_exclusive`].
pub const EVERY_DAY: &str = "Todos los d\u{ed}as";

/// The seven concrete day names, Monday first.
pub const WEEKDAYS: [&str; 7] = [
    "Lunes",
    "Martes",
    "Mi\u{e9}rcoles",
    "Jueves",
    "Viernes",
    "S\u{e1}bado",
    "Domingo",
];

/// Returns `true` if `value` is a concrete day name or the every-day
/// sentinel (case-sensitive, canonical spelling).
#[inline]
#[must_use]
pub fn is_known_day(value: &str) -> bool {
    value == EVERY_DAY || WEEKDAYS.contains(&value)
}

/// Returns the short display form of a day name (e.g. `"Lun"`), or the
/// input unchanged when it has no abbreviation.
#[inline]
#[must_use]
pub fn abbreviated(day: &str) -> &str {
    match day {
        "Lunes" => "Lun",
        "Martes" => "Mar",
        "Mi\u{e9}rcoles" => "Mi\u{e9}",
        "Jueves" => "Jue",
        "Viernes" => "Vie",
        "S\u{e1}bado" => "S\u{e1}b",
        "Domingo" => "Dom",
        other if other == EVERY_DAY => "Todos",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_days() {
        assert!(is_known_day("Lunes"));
        assert!(is_known_day("Domingo"));
        assert!(is_known_day(EVERY_DAY));
        assert!(!is_known_day("lunes"));
        assert!(!is_known_day("Monday"));
    }

    #[test]
    fn abbreviations() {
        assert_eq!(abbreviated("Lunes"), "Lun");
        assert_eq!(abbreviated(EVERY_DAY), "Todos");
        assert_eq!(abbreviated("Lunes y Jueves"), "Lunes y Jueves");
    }

    #[test]
    fn weekdays_are_seven_and_distinct() {
        assert_eq!(WEEKDAYS.len(), 7);
        for (i, day) in WEEKDAYS.iter().enumerate() {
            assert!(!WEEKDAYS.iter().skip(i + 1).any(|other| other == day));
        }
    }
}
