//! Alarm register codec for the DS3231.
//!
//! Alarm 1 occupies four registers (seconds, minutes, hours, day/date) and
//! Alarm 2 three (no seconds; it fires at second 00). Each register reserves
//! bit 7 as a "don't care" mask for the hardware comparison. The payload is
//! described by [`AlarmSpec`] and the four mask bits by [`AlarmMask`]; the
//! two can be rewritten independently of each other.
//!
//! The day/date register is polymorphic: the DY/DT bit decides whether the
//! low bits hold a weekday (1-7) or a BCD date (1-31). [`AlarmDay`] carries
//! that choice.
//!
//! # Rates
//!
//! The datasheet defines these mask combinations:
//!
//! | Alarm 1                         | mask                                   |
//! |---------------------------------|----------------------------------------|
//! | once per second                 | [`AlarmMask::EVERY_SECOND`]            |
//! | seconds match                   | [`AlarmMask::MATCH_SECONDS`]           |
//! | minutes and seconds match       | [`AlarmMask::MATCH_MINUTES_SECONDS`]   |
//! | hours, minutes, seconds match   | [`AlarmMask::MATCH_TIME`]              |
//! | day/date and time match         | [`AlarmMask::MATCH_DAY_TIME`]          |
//!
//! Alarm 2 uses [`AlarmMask::EVERY_MINUTE`], [`AlarmMask::MATCH_MINUTES`],
//! [`AlarmMask::MATCH_TIME`] and [`AlarmMask::MATCH_DAY_TIME`]; its second
//! mask bit does not exist and always reads back clear.

use bitfield::bitfield;
use chrono::DateTime;

use crate::datetime::{decode_hour, encode_hour_24, make_bcd, read_bcd, Field};
use crate::{
    AlarmDayDate, AlarmHours, AlarmMinutes, AlarmSeconds, CalendarTime, DS3231DateTimeError,
    DayDateSelect, RegAddr, TimeRepresentation,
};

/// Error type for alarm encoding and decoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmError {
    /// Weekday outside 1-7
    InvalidDayOfWeek(u8),
    /// Date outside 1-31
    InvalidDateOfMonth(u8),
    /// Alarm 2 has no seconds register, the second must be 0
    SecondsOnAlarm2(u8),
    /// Time field out of range or register content not decodable
    DateTime(DS3231DateTimeError),
}

impl From<DS3231DateTimeError> for AlarmError {
    fn from(e: DS3231DateTimeError) -> Self {
        AlarmError::DateTime(e)
    }
}

/// What the day/date register matches against.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmDay {
    /// Day of week, 1-7 (same numbering as the day register)
    Weekday(u8),
    /// Day of month, 1-31
    Date(u8),
}

bitfield! {
    /// The four alarm mask bits. A set bit removes the field from the match.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmMask(u8);
    impl Debug;
    /// A?M4
    pub day, set_day: 3;
    /// A?M3
    pub hour, set_hour: 2;
    /// A?M2
    pub minute, set_minute: 1;
    /// A1M1
    pub second, set_second: 0;
}

impl AlarmMask {
    /// Alarm 1: once per second
    pub const EVERY_SECOND: AlarmMask = AlarmMask(0b1111);
    /// Alarm 1: when seconds match
    pub const MATCH_SECONDS: AlarmMask = AlarmMask(0b1110);
    /// Alarm 1: when minutes and seconds match
    pub const MATCH_MINUTES_SECONDS: AlarmMask = AlarmMask(0b1100);
    /// Alarm 2: once per minute, at second 00
    pub const EVERY_MINUTE: AlarmMask = AlarmMask(0b1110);
    /// Alarm 2: when minutes match
    pub const MATCH_MINUTES: AlarmMask = AlarmMask(0b1100);
    /// Both alarms: when the time of day matches
    pub const MATCH_TIME: AlarmMask = AlarmMask(0b1000);
    /// Both alarms: when day/date and time match
    pub const MATCH_DAY_TIME: AlarmMask = AlarmMask(0b0000);
}

/// Decoded alarm payload plus its mask bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmSpec {
    /// Day of the week or of the month to match
    pub day: AlarmDay,
    /// 0-23
    pub hour: u8,
    /// 0-59
    pub minute: u8,
    /// 0-59 for Alarm 1, always 0 for Alarm 2
    pub second: u8,
    /// Which fields are ignored when matching
    pub mask: AlarmMask,
}

/// Applies the relative-or-absolute rule to an alarm target.
///
/// A target at or after `now` is returned unchanged. A target before `now`
/// is read as an offset: both are taken as seconds since 1970-01-01 and
/// added, so a target of `1970-01-01 00:00:30` means "30 seconds from now".
/// Callers that need a strictly absolute alarm must pass `target >= now`.
///
/// # Errors
///
/// Returns [`DS3231DateTimeError::InvalidDate`] if either value is not a real
/// date and time or the sum is not representable, and
/// [`DS3231DateTimeError::OutOfRange`] for a target year before 1970, which
/// would be a negative offset.
pub fn resolve_alarm_target(
    now: &CalendarTime,
    target: &CalendarTime,
) -> Result<CalendarTime, DS3231DateTimeError> {
    let now_ts = now.timestamp()?;
    let target_ts = target.timestamp()?;
    if target_ts >= now_ts {
        return Ok(*target);
    }
    if target_ts < 0 {
        return Err(DS3231DateTimeError::OutOfRange {
            field: Field::Year,
            value: u32::from(target.year),
        });
    }
    let resolved = now_ts
        .checked_add(target_ts)
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .ok_or(DS3231DateTimeError::InvalidDate)?;
    debug!("alarm target before now, treated as +{}s", target_ts);
    CalendarTime::from_naive(&resolved.naive_utc())
}

fn encode_seconds(second: u8) -> Result<AlarmSeconds, AlarmError> {
    let (tens, ones) = make_bcd(Field::Second, second, 59)?;
    let mut value = AlarmSeconds::default();
    value.set_ten_seconds(tens);
    value.set_seconds(ones);
    Ok(value)
}

fn encode_minutes(minute: u8) -> Result<AlarmMinutes, AlarmError> {
    let (tens, ones) = make_bcd(Field::Minute, minute, 59)?;
    let mut value = AlarmMinutes::default();
    value.set_ten_minutes(tens);
    value.set_minutes(ones);
    Ok(value)
}

fn encode_hours(hour: u8) -> Result<AlarmHours, AlarmError> {
    let (twenty, ten, ones) = encode_hour_24(hour)?;
    let mut value = AlarmHours::default();
    value.set_time_representation(TimeRepresentation::TwentyFourHour);
    value.set_pm_or_twenty_hours(twenty);
    value.set_ten_hours(ten);
    value.set_hours(ones);
    Ok(value)
}

fn encode_day_date(day: AlarmDay) -> Result<AlarmDayDate, AlarmError> {
    let mut value = AlarmDayDate::default();
    match day {
        AlarmDay::Weekday(weekday) => {
            if !(1..=7).contains(&weekday) {
                return Err(AlarmError::InvalidDayOfWeek(weekday));
            }
            value.set_day_date_select(DayDateSelect::Day);
            value.set_day_or_date(weekday);
        }
        AlarmDay::Date(date) => {
            if !(1..=31).contains(&date) {
                return Err(AlarmError::InvalidDateOfMonth(date));
            }
            let (tens, ones) = make_bcd(Field::Day, date, 31)?;
            value.set_day_date_select(DayDateSelect::Date);
            value.set_ten_date(tens);
            value.set_day_or_date(ones);
        }
    }
    Ok(value)
}

// A masked field does not take part in the comparison, so the chip may hold
// anything there (all zeros after power-up). Such a field reads as its
// minimum instead of failing the whole alarm.
fn lenient<T>(masked: bool, decoded: Result<T, AlarmError>, fallback: T) -> Result<T, AlarmError> {
    match decoded {
        Err(_) if masked => Ok(fallback),
        other => other,
    }
}

fn decode_seconds(reg: AlarmSeconds) -> Result<u8, AlarmError> {
    let second = read_bcd(
        RegAddr::Alarm1Seconds,
        reg.0,
        reg.ten_seconds(),
        reg.seconds(),
        0,
        59,
    );
    lenient(reg.alarm_mask1(), second.map_err(AlarmError::from), 0)
}

fn decode_minutes(register: RegAddr, reg: AlarmMinutes) -> Result<u8, AlarmError> {
    let minute = read_bcd(register, reg.0, reg.ten_minutes(), reg.minutes(), 0, 59);
    lenient(reg.alarm_mask2(), minute.map_err(AlarmError::from), 0)
}

fn decode_hours(register: RegAddr, reg: AlarmHours) -> Result<u8, AlarmError> {
    let hour = decode_hour(
        register,
        reg.0,
        reg.time_representation(),
        reg.pm_or_twenty_hours(),
        reg.ten_hours(),
        reg.hours(),
    );
    lenient(reg.alarm_mask3(), hour.map_err(AlarmError::from), 0)
}

fn decode_day_date(register: RegAddr, reg: AlarmDayDate) -> Result<AlarmDay, AlarmError> {
    let day = match reg.day_date_select() {
        DayDateSelect::Day => {
            let weekday = reg.day_or_date();
            if (1..=7).contains(&weekday) && reg.ten_date() == 0 {
                Ok(AlarmDay::Weekday(weekday))
            } else {
                Err(DS3231DateTimeError::InvalidRegister { register, raw: reg.0 })
            }
        }
        DayDateSelect::Date => {
            read_bcd(register, reg.0, reg.ten_date(), reg.day_or_date(), 1, 31).map(AlarmDay::Date)
        }
    };
    let fallback = match reg.day_date_select() {
        DayDateSelect::Day => AlarmDay::Weekday(1),
        DayDateSelect::Date => AlarmDay::Date(1),
    };
    lenient(reg.alarm_mask4(), day.map_err(AlarmError::from), fallback)
}

/// Register image of the 4 Alarm 1 registers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DS3231Alarm1 {
    seconds: AlarmSeconds,
    minutes: AlarmMinutes,
    hours: AlarmHours,
    day_date: AlarmDayDate,
}

impl DS3231Alarm1 {
    /// Encodes an alarm payload and its mask bits, hours in 24-hour mode.
    ///
    /// # Errors
    ///
    /// Returns an error if any field is out of range.
    pub fn from_spec(spec: &AlarmSpec) -> Result<Self, AlarmError> {
        let alarm = Self {
            seconds: encode_seconds(spec.second)?,
            minutes: encode_minutes(spec.minute)?,
            hours: encode_hours(spec.hour)?,
            day_date: encode_day_date(spec.day)?,
        };
        Ok(alarm.with_mask(spec.mask))
    }

    /// Decodes the payload and mask bits.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::DateTime`] if an unmasked register holds an
    /// invalid value.
    pub fn to_spec(&self) -> Result<AlarmSpec, AlarmError> {
        Ok(AlarmSpec {
            day: decode_day_date(RegAddr::Alarm1DayDate, self.day_date)?,
            hour: decode_hours(RegAddr::Alarm1Hours, self.hours)?,
            minute: decode_minutes(RegAddr::Alarm1Minutes, self.minutes)?,
            second: decode_seconds(self.seconds)?,
            mask: self.mask(),
        })
    }

    /// The mask bits currently in the registers.
    #[must_use]
    pub fn mask(&self) -> AlarmMask {
        let mut mask = AlarmMask::default();
        mask.set_day(self.day_date.alarm_mask4());
        mask.set_hour(self.hours.alarm_mask3());
        mask.set_minute(self.minutes.alarm_mask2());
        mask.set_second(self.seconds.alarm_mask1());
        mask
    }

    /// Builds the day-of-month alarm for `target` (see
    /// [`resolve_alarm_target`]) keeping this alarm's mask bits. Returns the
    /// new registers and the resolved time.
    pub(crate) fn retarget(
        &self,
        now: &CalendarTime,
        target: &CalendarTime,
    ) -> Result<(Self, CalendarTime), AlarmError> {
        let resolved = resolve_alarm_target(now, target)?;
        let alarm = Self::from_spec(&AlarmSpec {
            day: AlarmDay::Date(resolved.day),
            hour: resolved.hour,
            minute: resolved.minute,
            second: resolved.second,
            mask: self.mask(),
        })?;
        Ok((alarm, resolved))
    }

    /// Replaces the mask bits, leaving every payload bit untouched.
    #[must_use]
    pub fn with_mask(mut self, mask: AlarmMask) -> Self {
        self.day_date.set_alarm_mask4(mask.day());
        self.hours.set_alarm_mask3(mask.hour());
        self.minutes.set_alarm_mask2(mask.minute());
        self.seconds.set_alarm_mask1(mask.second());
        self
    }

    /// Gets the alarm seconds register
    #[must_use]
    pub fn seconds(&self) -> AlarmSeconds {
        self.seconds
    }

    /// Gets the alarm minutes register
    #[must_use]
    pub fn minutes(&self) -> AlarmMinutes {
        self.minutes
    }

    /// Gets the alarm hours register
    #[must_use]
    pub fn hours(&self) -> AlarmHours {
        self.hours
    }

    /// Gets the alarm day/date register
    #[must_use]
    pub fn day_date(&self) -> AlarmDayDate {
        self.day_date
    }
}

impl From<[u8; 4]> for DS3231Alarm1 {
    fn from(data: [u8; 4]) -> Self {
        DS3231Alarm1 {
            seconds: AlarmSeconds(data[0]),
            minutes: AlarmMinutes(data[1]),
            hours: AlarmHours(data[2]),
            day_date: AlarmDayDate(data[3]),
        }
    }
}

impl From<&DS3231Alarm1> for [u8; 4] {
    fn from(alarm: &DS3231Alarm1) -> [u8; 4] {
        [
            alarm.seconds.0,
            alarm.minutes.0,
            alarm.hours.0,
            alarm.day_date.0,
        ]
    }
}

/// Register image of the 3 Alarm 2 registers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DS3231Alarm2 {
    minutes: AlarmMinutes,
    hours: AlarmHours,
    day_date: AlarmDayDate,
}

impl DS3231Alarm2 {
    /// Encodes an alarm payload and its mask bits. The second mask bit has no
    /// register on Alarm 2 and is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::SecondsOnAlarm2`] for a non-zero second, or an
    /// error for any field out of range.
    pub fn from_spec(spec: &AlarmSpec) -> Result<Self, AlarmError> {
        if spec.second != 0 {
            return Err(AlarmError::SecondsOnAlarm2(spec.second));
        }
        let alarm = Self {
            minutes: encode_minutes(spec.minute)?,
            hours: encode_hours(spec.hour)?,
            day_date: encode_day_date(spec.day)?,
        };
        Ok(alarm.with_mask(spec.mask))
    }

    /// Decodes the payload and mask bits; `second` is always 0.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::DateTime`] if an unmasked register holds an
    /// invalid value.
    pub fn to_spec(&self) -> Result<AlarmSpec, AlarmError> {
        Ok(AlarmSpec {
            day: decode_day_date(RegAddr::Alarm2DayDate, self.day_date)?,
            hour: decode_hours(RegAddr::Alarm2Hours, self.hours)?,
            minute: decode_minutes(RegAddr::Alarm2Minutes, self.minutes)?,
            second: 0,
            mask: self.mask(),
        })
    }

    /// The mask bits currently in the registers.
    #[must_use]
    pub fn mask(&self) -> AlarmMask {
        let mut mask = AlarmMask::default();
        mask.set_day(self.day_date.alarm_mask4());
        mask.set_hour(self.hours.alarm_mask3());
        mask.set_minute(self.minutes.alarm_mask2());
        mask
    }

    /// Replaces the mask bits, leaving every payload bit untouched.
    #[must_use]
    pub fn with_mask(mut self, mask: AlarmMask) -> Self {
        self.day_date.set_alarm_mask4(mask.day());
        self.hours.set_alarm_mask3(mask.hour());
        self.minutes.set_alarm_mask2(mask.minute());
        self
    }

    /// Gets the alarm minutes register
    #[must_use]
    pub fn minutes(&self) -> AlarmMinutes {
        self.minutes
    }

    /// Gets the alarm hours register
    #[must_use]
    pub fn hours(&self) -> AlarmHours {
        self.hours
    }

    /// Gets the alarm day/date register
    #[must_use]
    pub fn day_date(&self) -> AlarmDayDate {
        self.day_date
    }
}

impl From<[u8; 3]> for DS3231Alarm2 {
    fn from(data: [u8; 3]) -> Self {
        DS3231Alarm2 {
            minutes: AlarmMinutes(data[0]),
            hours: AlarmHours(data[1]),
            day_date: AlarmDayDate(data[2]),
        }
    }
}

impl From<&DS3231Alarm2> for [u8; 3] {
    fn from(alarm: &DS3231Alarm2) -> [u8; 3] {
        [alarm.minutes.0, alarm.hours.0, alarm.day_date.0]
    }
}
