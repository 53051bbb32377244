use core::fmt;
use std::time::Instant;

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, TimeZone,
    Utc,
};

/// The fixed instant every encoded timestamp is measured from.
///
/// A base is a plain value: it is chosen once, handed to a generator (or a
/// decoder) and never changes. IDs generated against one base decode to the
/// wrong creation time under another, so a fleet sharing IDs must agree on it.
///
/// The default is 2015-06-06 00:00:00 in the process's local time zone.
///
/// # Example
///
/// ```
/// use bigid::ClockBase;
///
/// // 2015-06-06T00:00:00Z
/// let base = ClockBase::from_utc_millis(1_433_548_800_000).unwrap();
/// let created = base.at(1_500).unwrap();
/// assert_eq!(ClockBase::format(&created), "2015-06-06T00:00:01.5Z");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockBase {
    instant: DateTime<FixedOffset>,
}

impl ClockBase {
    /// Uses `instant` as the base, keeping its UTC offset for formatting.
    pub fn new<Tz: TimeZone>(instant: DateTime<Tz>) -> Self {
        Self {
            instant: instant.fixed_offset(),
        }
    }

    /// A base given as milliseconds since the Unix epoch, formatted in UTC.
    ///
    /// Returns `None` if the value is outside chrono's representable range.
    pub fn from_utc_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self::new)
    }

    /// Interprets a wall-clock date and time in the local time zone.
    ///
    /// See [`ClockBase::in_zone`] for how folds and gaps resolve.
    pub fn local(naive: NaiveDateTime) -> Self {
        Self::in_zone(&Local, naive)
    }

    /// Interprets a wall-clock date and time in `tz`.
    ///
    /// Ambiguous times (a DST fold) resolve to the earlier instant. A time
    /// that does not exist (a DST gap) is read with the offset in effect just
    /// before the gap, so 02:30 on a spring-forward night lands on 03:30.
    /// Only if no offset within a day before the gap can be found is the
    /// value read as UTC.
    pub fn in_zone<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Self {
        if let Some(instant) = tz.from_local_datetime(&naive).earliest() {
            return Self::new(instant);
        }
        (1..=24)
            .find_map(|hours| {
                let shift = TimeDelta::hours(hours);
                let before = tz.from_local_datetime(&(naive - shift)).earliest()?;
                before.checked_add_signed(shift)
            })
            .map_or_else(|| Self::new(naive.and_utc()), Self::new)
    }

    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    /// Milliseconds elapsed from the base to `now`, or 0 if `now` is earlier.
    pub fn elapsed_millis(&self, now: DateTime<Utc>) -> u64 {
        whole_millis(self.elapsed(now))
    }

    /// Full-precision time from the base to `now`, negative if `now` is
    /// earlier.
    pub fn elapsed(&self, now: DateTime<Utc>) -> TimeDelta {
        now.signed_duration_since(self.instant)
    }

    /// The instant `millis` milliseconds after the base.
    ///
    /// Returns `None` only when the result leaves chrono's date range, which
    /// cannot happen for a 40-bit timestamp and a base in the common era.
    pub fn at(&self, millis: u64) -> Option<DateTime<FixedOffset>> {
        let delta = TimeDelta::try_milliseconds(i64::try_from(millis).ok()?)?;
        self.instant.checked_add_signed(delta)
    }

    /// RFC 3339 with trailing zero fraction digits trimmed (`.5`, `.001`,
    /// or none on a whole second) and `Z` for a zero offset.
    pub fn format(instant: &DateTime<FixedOffset>) -> String {
        let text = instant.to_rfc3339_opts(SecondsFormat::Nanos, true);
        let Some((whole, rest)) = text.split_once('.') else {
            return text;
        };
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (fraction, zone) = rest.split_at(digits);
        match fraction.trim_end_matches('0') {
            "" => format!("{whole}{zone}"),
            fraction => format!("{whole}.{fraction}{zone}"),
        }
    }
}

/// Whole milliseconds in `delta`, rounded down, or 0 if it is negative.
fn whole_millis(delta: TimeDelta) -> u64 {
    u64::try_from(delta.num_milliseconds()).unwrap_or(0)
}

impl Default for ClockBase {
    fn default() -> Self {
        let naive = NaiveDate::from_ymd_opt(2015, 6, 6)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self::local(naive)
    }
}

impl fmt::Debug for ClockBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClockBase")
            .field(&Self::format(&self.instant))
            .finish()
    }
}

impl fmt::Display for ClockBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Self::format(&self.instant))
    }
}

/// A source of "now", expressed as milliseconds since a [`ClockBase`].
///
/// This lets a generator run against the real clock in production and a
/// fixed or stepped clock in tests.
///
/// # Example
///
/// ```
/// use bigid::{ClockBase, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
///
///     fn base(&self) -> ClockBase {
///         ClockBase::default()
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Milliseconds elapsed since [`TimeSource::base`].
    fn current_millis(&self) -> u64;

    /// The base this source measures from.
    fn base(&self) -> ClockBase;
}

/// A time source that never runs backwards.
///
/// At construction it reads the wall clock once to find the offset from the
/// base, and from then on adds the elapsed time of a monotonic [`Instant`].
/// Later wall-clock adjustments (NTP steps, manual changes) therefore do not
/// affect generated timestamps.
///
/// Both parts are kept at full precision and only the sum is truncated to
/// milliseconds, so a reading never lags the true time by a whole
/// millisecond.
///
/// If the wall clock is earlier than the base at construction, the offset
/// saturates at zero.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    base: ClockBase,
    start: Instant,
    offset: TimeDelta,
}

impl MonotonicClock {
    pub fn with_base(base: ClockBase) -> Self {
        let start = Instant::now();
        let offset = base.elapsed(Utc::now()).max(TimeDelta::zero());
        Self {
            base,
            start,
            offset,
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::with_base(ClockBase::default())
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        let elapsed = TimeDelta::from_std(self.start.elapsed()).unwrap_or(TimeDelta::MAX);
        whole_millis(self.offset.checked_add(&elapsed).unwrap_or(TimeDelta::MAX))
    }

    fn base(&self) -> ClockBase {
        self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const BASE_2015_06_06_UTC: i64 = 1_433_548_800_000;

    #[test]
    fn default_base_is_local_midnight_2015_06_06() {
        let base = ClockBase::default().instant().with_timezone(&Local);
        assert_eq!((base.year(), base.month(), base.day()), (2015, 6, 6));
        assert_eq!((base.hour(), base.minute(), base.second()), (0, 0, 0));
    }

    #[test]
    fn from_utc_millis_formats_with_z() {
        let base = ClockBase::from_utc_millis(BASE_2015_06_06_UTC).unwrap();
        assert_eq!(base.to_string(), "2015-06-06T00:00:00Z");
    }

    #[test]
    fn at_adds_milliseconds() {
        let base = ClockBase::from_utc_millis(BASE_2015_06_06_UTC).unwrap();
        assert_eq!(ClockBase::format(&base.at(0).unwrap()), "2015-06-06T00:00:00Z");
        assert_eq!(ClockBase::format(&base.at(1000).unwrap()), "2015-06-06T00:00:01Z");
        assert_eq!(
            ClockBase::format(&base.at(86_400_001).unwrap()),
            "2015-06-07T00:00:00.001Z"
        );
    }

    #[test]
    fn format_trims_trailing_zero_digits() {
        let base = ClockBase::from_utc_millis(BASE_2015_06_06_UTC).unwrap();
        assert_eq!(ClockBase::format(&base.at(1500).unwrap()), "2015-06-06T00:00:01.5Z");
        assert_eq!(ClockBase::format(&base.at(1230).unwrap()), "2015-06-06T00:00:01.23Z");
        assert_eq!(ClockBase::format(&base.at(1234).unwrap()), "2015-06-06T00:00:01.234Z");
        assert_eq!(ClockBase::format(&base.at(60_000).unwrap()), "2015-06-06T00:01:00Z");

        let nanos = base.instant() + TimeDelta::nanoseconds(1_000_100);
        assert_eq!(ClockBase::format(&nanos), "2015-06-06T00:00:00.0010001Z");
    }

    #[test]
    fn at_handles_full_timestamp_width() {
        let base = ClockBase::from_utc_millis(BASE_2015_06_06_UTC).unwrap();
        let last = base.at((1 << 40) - 1).unwrap();
        assert_eq!(last.year(), 2050);
    }

    #[test]
    fn fixed_offset_base_keeps_offset() {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let base = ClockBase::new(offset.with_ymd_and_hms(2015, 6, 6, 0, 0, 0).unwrap());
        assert_eq!(base.to_string(), "2015-06-06T00:00:00+08:00");
        assert_eq!(
            ClockBase::format(&base.at(250).unwrap()),
            "2015-06-06T00:00:00.25+08:00"
        );
    }

    #[test]
    fn elapsed_millis_saturates_before_base() {
        let base = ClockBase::from_utc_millis(BASE_2015_06_06_UTC).unwrap();
        let before = DateTime::from_timestamp_millis(BASE_2015_06_06_UTC - 5).unwrap();
        let after = DateTime::from_timestamp_millis(BASE_2015_06_06_UTC + 1234).unwrap();
        assert_eq!(base.elapsed_millis(before), 0);
        assert_eq!(base.elapsed_millis(after), 1234);
    }

    #[test]
    fn monotonic_clock_tracks_wall_clock() {
        let base = ClockBase::default();
        let clock = MonotonicClock::with_base(base);
        let wall = base.elapsed_millis(Utc::now());
        let mono = clock.current_millis();
        assert!(mono.abs_diff(wall) <= 1, "mono {mono} wall {wall}");
        assert_eq!(clock.base(), base);
    }

    #[test]
    fn monotonic_clock_lags_real_time_by_under_a_millisecond() {
        let base = ClockBase::from_utc_millis(BASE_2015_06_06_UTC).unwrap();
        for round in 0..2_000u32 {
            let clock = MonotonicClock::with_base(base);
            let spin = std::time::Duration::from_micros(u64::from(round % 10) * 90);
            let started = Instant::now();
            while started.elapsed() < spin {}

            let before = Utc::now();
            let decoded = base.at(clock.current_millis()).unwrap();
            let after = Utc::now();
            let lag = before.signed_duration_since(decoded);
            assert!(lag < TimeDelta::milliseconds(1), "round {round}: lag {lag}");
            assert!(decoded <= after, "round {round}: {decoded} after {after}");
        }
    }

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::default();
        let mut last = clock.current_millis();
        for _ in 0..10_000 {
            let now = clock.current_millis();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn monotonic_clock_before_base_starts_at_zero() {
        let future = ClockBase::new(Utc::now() + TimeDelta::days(1));
        let clock = MonotonicClock::with_base(future);
        assert!(clock.current_millis() < 1_000);
    }

    /// Eastern time with a spring-forward gap from 02:00 to 03:00 local on
    /// 2015-03-08 (07:00 UTC).
    #[derive(Clone, Copy, Debug)]
    struct SpringForward;

    impl SpringForward {
        fn transition() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2015, 3, 8)
                .unwrap()
                .and_hms_opt(7, 0, 0)
                .unwrap()
        }

        fn standard() -> FixedOffset {
            FixedOffset::west_opt(5 * 3600).unwrap()
        }

        fn daylight() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }
    }

    impl TimeZone for SpringForward {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            SpringForward
        }

        fn offset_from_local_date(&self, _: &NaiveDate) -> chrono::LocalResult<FixedOffset> {
            chrono::LocalResult::None
        }

        fn offset_from_local_datetime(
            &self,
            local: &NaiveDateTime,
        ) -> chrono::LocalResult<FixedOffset> {
            let gap_start = Self::transition() - TimeDelta::hours(5);
            if *local < gap_start {
                chrono::LocalResult::Single(Self::standard())
            } else if *local < gap_start + TimeDelta::hours(1) {
                chrono::LocalResult::None
            } else {
                chrono::LocalResult::Single(Self::daylight())
            }
        }

        fn offset_from_utc_date(&self, _: &NaiveDate) -> FixedOffset {
            Self::standard()
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::transition() {
                Self::standard()
            } else {
                Self::daylight()
            }
        }
    }

    fn naive(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2015, 3, 8)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn in_zone_reads_gap_times_with_offset_before_gap() {
        let base = ClockBase::in_zone(&SpringForward, naive(2, 30));
        // 02:30 at -05:00 is 07:30 UTC, shown as 03:30 daylight time.
        assert_eq!(base.instant().naive_utc(), naive(7, 30));
        assert_eq!(base.to_string(), "2015-03-08T03:30:00-04:00");
    }

    #[test]
    fn in_zone_keeps_valid_times_unchanged() {
        let before = ClockBase::in_zone(&SpringForward, naive(1, 30));
        assert_eq!(before.instant().naive_utc(), naive(6, 30));
        let after = ClockBase::in_zone(&SpringForward, naive(3, 30));
        assert_eq!(after.instant().naive_utc(), naive(7, 30));
    }
}
