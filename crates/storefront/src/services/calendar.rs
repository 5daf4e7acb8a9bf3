//! iCalendar (RFC 5545) export for the launch event.

use chrono::{DateTime, Utc};

/// Event title shown in calendar apps.
pub const EVENT_SUMMARY: &str =
    "FREE DRINK! Independence Day - BIEN MICHES @ Get Faded Barbershop";

/// Event location.
pub const EVENT_LOCATION: &str = "Get Faded Barbershop, 1007 Cedar St, Santa Cruz, CA 95060";

/// A single calendar event.
#[derive(Debug, Clone)]
pub struct CalendarEvent<'a> {
    pub summary: &'a str,
    pub location: &'a str,
    pub url: Option<&'a str>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl<'a> CalendarEvent<'a> {
    /// The launch party.
    #[must_use]
    pub const fn launch(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>, url: Option<&'a str>) -> Self {
        Self {
            summary: EVENT_SUMMARY,
            location: EVENT_LOCATION,
            url,
            starts_at,
            ends_at,
        }
    }

    /// Render a `VCALENDAR` containing this event.
    ///
    /// `now` becomes the `DTSTAMP`. Lines end with CRLF.
    #[must_use]
    pub fn to_ics(&self, now: DateTime<Utc>) -> String {
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "PRODID:-//Bien Miches//Launch//EN".to_string(),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:launch-{}@bienmiches.com", self.starts_at.timestamp()),
            format!("DTSTAMP:{}", format_utc(now)),
            format!("DTSTART:{}", format_utc(self.starts_at)),
            format!("DTEND:{}", format_utc(self.ends_at)),
            format!("SUMMARY:{}", escape_text(self.summary)),
            format!("LOCATION:{}", escape_text(self.location)),
        ];
        if let Some(url) = self.url {
            lines.push(format!("URL:{url}"));
        }
        lines.push("END:VEVENT".to_string());
        lines.push("END:VCALENDAR".to_string());

        let mut ics = lines.join("\r\n");
        ics.push_str("\r\n");
        ics
    }
}

/// UTC date-time in basic format (`20230917T000000Z`).
fn format_utc(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape a TEXT value.
fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_launch_event_ics() {
        let event = CalendarEvent::launch(
            at("2023-09-16T17:00:00-07:00"),
            at("2023-09-16T20:00:00-07:00"),
            Some("https://bienmiches.com/"),
        );
        let ics = event.to_ics(at("2023-09-01T12:00:00Z"));

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(ics.contains("\r\nDTSTART:20230917T000000Z\r\n"));
        assert!(ics.contains("\r\nDTEND:20230917T030000Z\r\n"));
        assert!(ics.contains("\r\nDTSTAMP:20230901T120000Z\r\n"));
        assert!(ics.contains(
            "\r\nSUMMARY:FREE DRINK! Independence Day - BIEN MICHES @ Get Faded Barbershop\r\n"
        ));
        assert!(ics.contains(
            "\r\nLOCATION:Get Faded Barbershop\\, 1007 Cedar St\\, Santa Cruz\\, CA 95060\r\n"
        ));
        assert!(ics.contains("\r\nURL:https://bienmiches.com/\r\n"));
        assert!(ics.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"));
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a;b,c\\d\ne"), "a\\;b\\,c\\\\d\\ne");
    }
}
