use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime, UtcOffset,
};

pub(crate) fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub(crate) fn format_offset(value: OffsetDateTime) -> String {
    value.format(&Rfc3339).unwrap_or_else(|_| value.to_string())
}

/// Human-readable rendering in the configured display offset. Instants are
/// compared in UTC everywhere; this is presentation only.
pub(crate) fn format_display(value: OffsetDateTime, offset: UtcOffset) -> String {
    let local = value.to_offset(offset);
    local
        .format(&format_description!(
            "[day] [month repr:short] [year], [hour repr:12 padding:none]:[minute] [period]"
        ))
        .unwrap_or_else(|_| local.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Time};

    fn instant() -> OffsetDateTime {
        let date = Date::from_calendar_date(2026, time::Month::March, 1).unwrap();
        OffsetDateTime::new_utc(date, Time::from_hms(10, 20, 30).unwrap())
    }

    #[test]
    fn format_offset_outputs_rfc3339() {
        assert_eq!(format_offset(instant()), "2026-03-01T10:20:30Z");
    }

    #[test]
    fn format_display_applies_offset() {
        let ist = UtcOffset::from_hms(5, 30, 0).unwrap();
        assert_eq!(format_display(instant(), ist), "01 Mar 2026, 3:50 PM");
    }

    #[test]
    fn format_display_handles_negative_offset() {
        let pst = UtcOffset::from_hms(-8, 0, 0).unwrap();
        assert_eq!(format_display(instant(), pst), "01 Mar 2026, 2:20 AM");
    }
}
