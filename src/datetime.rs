//! Calendar time and the date/time register codec.
//!
//! The DS3231 keeps the current time in 7 consecutive registers:
//! seconds, minutes, hours, day of week, date, month/century and year, all
//! BCD except the day of week. [`DS3231DateTime`] models that block with one
//! typed register per field and converts it to and from [`CalendarTime`],
//! the canonical 24-hour value handed to callers.
//!
//! # Hours
//!
//! The hours register is read according to its own 12/24-hour mode bit. Bit 5
//! is the 20-hours digit in 24-hour mode and the PM flag in 12-hour mode;
//! 12-hour values are folded into 0-23. The encoder always writes 24-hour
//! mode.
//!
//! # Years
//!
//! The chip only stores 0-99. The codec maps that onto
//! `epoch_base..=epoch_base + 99`; the century flag in the month register is
//! not used to extend the range.

use core::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::bcd;
use crate::{Date, Day, Hours, Minutes, Month, RegAddr, Seconds, TimeRepresentation, Year};

/// Calendar year of hardware year `00` unless configured otherwise.
pub const DEFAULT_EPOCH_BASE: u16 = 2000;

/// A calendar field, used to report range errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Full calendar year
    Year,
    /// Month, 1-12
    Month,
    /// Day of the month, 1-31
    Day,
    /// Day of the week, 1-7
    Weekday,
    /// Hour, 0-23
    Hour,
    /// Minute, 0-59
    Minute,
    /// Second, 0-59
    Second,
}

/// Errors that can occur during date/time conversion or validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DS3231DateTimeError {
    /// A calendar field is outside the range the encoder accepts
    OutOfRange {
        /// The offending field
        field: Field,
        /// The value that was supplied
        value: u32,
    },
    /// A register read back holds an invalid BCD digit or an impossible value
    InvalidRegister {
        /// Register that failed to decode
        register: RegAddr,
        /// Its raw content
        raw: u8,
    },
    /// The fields are individually in range but do not name a real day
    InvalidDate,
}

/// Broken-down calendar time, always in 24-hour form.
///
/// `weekday` runs 1-7 with 1 = Sunday. It is carried as stored on the chip
/// and never recomputed by the codec; mapping to another numbering is up to
/// the caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    /// Full year, e.g. 2025
    pub year: u16,
    /// 1-12
    pub month: u8,
    /// Day of the month, 1-31
    pub day: u8,
    /// 1-7, 1 = Sunday
    pub weekday: u8,
    /// 0-23
    pub hour: u8,
    /// 0-59
    pub minute: u8,
    /// 0-59
    pub second: u8,
}

impl CalendarTime {
    /// Builds a calendar time, deriving the weekday from the date.
    ///
    /// # Errors
    ///
    /// Returns an error if any field is out of range or the date does not exist.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, DS3231DateTimeError> {
        let date = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
            .ok_or(DS3231DateTimeError::InvalidDate)?;
        let time = Self {
            year,
            month,
            day,
            weekday: weekday_of(&date),
            hour,
            minute,
            second,
        };
        time.validate()?;
        Ok(time)
    }

    /// Checks every field's range and that the date exists.
    ///
    /// # Errors
    ///
    /// [`DS3231DateTimeError::OutOfRange`] for the first out-of-range field,
    /// [`DS3231DateTimeError::InvalidDate`] for dates like February 30th.
    pub fn validate(&self) -> Result<(), DS3231DateTimeError> {
        check_range(Field::Month, self.month, 1, 12)?;
        check_range(Field::Day, self.day, 1, 31)?;
        check_range(Field::Weekday, self.weekday, 1, 7)?;
        check_range(Field::Hour, self.hour, 0, 23)?;
        check_range(Field::Minute, self.minute, 0, 59)?;
        check_range(Field::Second, self.second, 0, 59)?;
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .map(|_| ())
        .ok_or(DS3231DateTimeError::InvalidDate)
    }

    /// Converts to a chrono date and time. The weekday is not consulted.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231DateTimeError::InvalidDate`] if the fields do not form
    /// a valid date and time.
    pub fn to_naive(&self) -> Result<NaiveDateTime, DS3231DateTimeError> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
        })
        .ok_or(DS3231DateTimeError::InvalidDate)
    }

    /// Converts from a chrono date and time, deriving the weekday (1 = Sunday).
    ///
    /// # Errors
    ///
    /// Returns [`DS3231DateTimeError::OutOfRange`] for years outside `0..=65535`.
    pub fn from_naive(datetime: &NaiveDateTime) -> Result<Self, DS3231DateTimeError> {
        let year = u16::try_from(datetime.year()).map_err(|_| DS3231DateTimeError::OutOfRange {
            field: Field::Year,
            value: datetime.year().unsigned_abs(),
        })?;
        // chrono guarantees the remaining fields fit in a u8
        Ok(Self {
            year,
            month: datetime.month() as u8,
            day: datetime.day() as u8,
            weekday: weekday_of(&datetime.date()),
            hour: datetime.hour() as u8,
            minute: datetime.minute() as u8,
            second: datetime.second() as u8,
        })
    }

    /// Seconds since 1970-01-01T00:00:00, treating the time as UTC.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231DateTimeError::InvalidDate`] for invalid fields.
    pub fn timestamp(&self) -> Result<i64, DS3231DateTimeError> {
        Ok(self.to_naive()?.and_utc().timestamp())
    }

    /// Formats with a two-digit, epoch-relative year: `HH:MM:SS DD/MM/YY W`.
    #[must_use]
    pub fn compact(&self, epoch_base: u16) -> Compact<'_> {
        Compact {
            time: self,
            epoch_base,
        }
    }
}

impl fmt::Display for CalendarTime {
    /// `HH:MM:SS DD/MM/YYYY W`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02} {:02}/{:02}/{:04} {}",
            self.hour, self.minute, self.second, self.day, self.month, self.year, self.weekday
        )
    }
}

/// [`CalendarTime`] display adapter with an epoch-relative two-digit year.
pub struct Compact<'a> {
    time: &'a CalendarTime,
    epoch_base: u16,
}

impl fmt::Display for Compact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.time;
        write!(
            f,
            "{:02}:{:02}:{:02} {:02}/{:02}/{:02} {}",
            t.hour,
            t.minute,
            t.second,
            t.day,
            t.month,
            t.year.wrapping_sub(self.epoch_base) % 100,
            t.weekday
        )
    }
}

/// Weekday number used by the chip, 1 = Sunday.
pub(crate) fn weekday_of(date: &NaiveDate) -> u8 {
    // num_days_from_sunday is 0..=6
    date.weekday().num_days_from_sunday() as u8 + 1
}

fn check_range(field: Field, value: u8, min: u8, max: u8) -> Result<(), DS3231DateTimeError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(DS3231DateTimeError::OutOfRange {
            field,
            value: u32::from(value),
        })
    }
}

/// Splits a field into BCD digits, turning overflow into a range error.
pub(crate) fn make_bcd(field: Field, value: u8, max: u8) -> Result<(u8, u8), DS3231DateTimeError> {
    bcd::split(u32::from(value), u32::from(max)).map_err(|_| DS3231DateTimeError::OutOfRange {
        field,
        value: u32::from(value),
    })
}

/// Fails with `InvalidRegister` if any bit in `reserved` is set. Those bits
/// always read 0 on a healthy chip.
pub(crate) fn check_reserved(
    register: RegAddr,
    raw: u8,
    reserved: u8,
) -> Result<(), DS3231DateTimeError> {
    if raw & reserved == 0 {
        Ok(())
    } else {
        Err(DS3231DateTimeError::InvalidRegister { register, raw })
    }
}

/// Combines BCD digits read from `register`, reporting corrupt reads.
pub(crate) fn read_bcd(
    register: RegAddr,
    raw: u8,
    tens: u8,
    ones: u8,
    min: u8,
    max: u8,
) -> Result<u8, DS3231DateTimeError> {
    match bcd::checked_from_nibbles(tens, ones, max) {
        Ok(value) if value >= min => Ok(value),
        _ => Err(DS3231DateTimeError::InvalidRegister { register, raw }),
    }
}

/// Digits of a 24-hour value: `(twenty_hours, ten_hours, ones)`.
pub(crate) fn encode_hour_24(hour: u8) -> Result<(u8, u8, u8), DS3231DateTimeError> {
    check_range(Field::Hour, hour, 0, 23)?;
    let twenty = u8::from(hour >= 20);
    let ten = u8::from((10..20).contains(&hour));
    Ok((twenty, ten, hour % 10))
}

/// Decodes the hour bits of an hours register into 0-23.
///
/// The meaning of `pm_or_twenty` depends on `mode`, so the mode bit must be
/// read from the same register before calling this.
pub(crate) fn decode_hour(
    register: RegAddr,
    raw: u8,
    mode: TimeRepresentation,
    pm_or_twenty: u8,
    tens: u8,
    ones: u8,
) -> Result<u8, DS3231DateTimeError> {
    let invalid = DS3231DateTimeError::InvalidRegister { register, raw };
    if ones > 9 {
        return Err(invalid);
    }
    match mode {
        TimeRepresentation::TwentyFourHour => {
            let hour = 20 * pm_or_twenty + 10 * tens + ones;
            if hour > 23 || (pm_or_twenty != 0 && tens != 0) {
                return Err(invalid);
            }
            Ok(hour)
        }
        TimeRepresentation::TwelveHour => {
            let hour12 = 10 * tens + ones;
            if hour12 == 0 || hour12 > 12 {
                return Err(invalid);
            }
            let is_pm = pm_or_twenty != 0;
            Ok(match (hour12, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, false) => h,
                (h, true) => h + 12,
            })
        }
    }
}

/// Register-level image of the 7 date/time registers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DS3231DateTime {
    seconds: Seconds,
    minutes: Minutes,
    hours: Hours,
    day: Day,
    date: Date,
    month: Month,
    year: Year,
}

impl DS3231DateTime {
    fn convert_seconds(second: u8) -> Result<Seconds, DS3231DateTimeError> {
        let (tens, ones) = make_bcd(Field::Second, second, 59)?;
        let mut value = Seconds::default();
        value.set_seconds(ones);
        value.set_ten_seconds(tens);
        Ok(value)
    }

    fn convert_minutes(minute: u8) -> Result<Minutes, DS3231DateTimeError> {
        let (tens, ones) = make_bcd(Field::Minute, minute, 59)?;
        let mut value = Minutes::default();
        value.set_minutes(ones);
        value.set_ten_minutes(tens);
        Ok(value)
    }

    fn convert_hours(hour: u8) -> Result<Hours, DS3231DateTimeError> {
        let (twenty, ten, ones) = encode_hour_24(hour)?;
        let mut value = Hours::default();
        value.set_time_representation(TimeRepresentation::TwentyFourHour);
        value.set_pm_or_twenty_hours(twenty);
        value.set_ten_hours(ten);
        value.set_hours(ones);
        Ok(value)
    }

    fn convert_day(weekday: u8) -> Result<Day, DS3231DateTimeError> {
        check_range(Field::Weekday, weekday, 1, 7)?;
        let mut value = Day::default();
        value.set_day(weekday);
        Ok(value)
    }

    fn convert_date(day: u8) -> Result<Date, DS3231DateTimeError> {
        check_range(Field::Day, day, 1, 31)?;
        let (tens, ones) = make_bcd(Field::Day, day, 31)?;
        let mut value = Date::default();
        value.set_date(ones);
        value.set_ten_date(tens);
        Ok(value)
    }

    fn convert_month(month: u8) -> Result<Month, DS3231DateTimeError> {
        check_range(Field::Month, month, 1, 12)?;
        let (tens, ones) = make_bcd(Field::Month, month, 12)?;
        let mut value = Month::default();
        value.set_month(ones);
        value.set_ten_month(tens);
        Ok(value)
    }

    fn convert_year(year: u16, epoch_base: u16) -> Result<Year, DS3231DateTimeError> {
        let offset = year
            .checked_sub(epoch_base)
            .filter(|offset| *offset <= 99)
            .ok_or_else(|| {
                error!("year {} outside {}..={}", year, epoch_base, epoch_base.saturating_add(99));
                DS3231DateTimeError::OutOfRange {
                    field: Field::Year,
                    value: u32::from(year),
                }
            })?;
        // offset <= 99 so the cast cannot truncate
        let (tens, ones) = make_bcd(Field::Year, offset as u8, 99)?;
        let mut value = Year::default();
        value.set_year(ones);
        value.set_ten_year(tens);
        Ok(value)
    }

    /// Encodes `time` in 24-hour mode with the century flag clear.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231DateTimeError::OutOfRange`] for any field outside its
    /// range (including a year outside the epoch window) and
    /// [`DS3231DateTimeError::InvalidDate`] for non-existent dates.
    pub fn from_calendar(time: &CalendarTime, epoch_base: u16) -> Result<Self, DS3231DateTimeError> {
        let raw = DS3231DateTime {
            seconds: Self::convert_seconds(time.second)?,
            minutes: Self::convert_minutes(time.minute)?,
            hours: Self::convert_hours(time.hour)?,
            day: Self::convert_day(time.weekday)?,
            date: Self::convert_date(time.day)?,
            month: Self::convert_month(time.month)?,
            year: Self::convert_year(time.year, epoch_base)?,
        };
        time.validate()?;
        debug!("encoded {:?}", raw);
        Ok(raw)
    }

    /// Decodes the registers into a [`CalendarTime`].
    ///
    /// # Errors
    ///
    /// [`DS3231DateTimeError::InvalidRegister`] for the first register holding
    /// a corrupt value, [`DS3231DateTimeError::InvalidDate`] if the result is
    /// not a real date.
    pub fn into_calendar(self, epoch_base: u16) -> Result<CalendarTime, DS3231DateTimeError> {
        check_reserved(RegAddr::Seconds, self.seconds.0, 0x80)?;
        let second = read_bcd(
            RegAddr::Seconds,
            self.seconds.0,
            self.seconds.ten_seconds(),
            self.seconds.seconds(),
            0,
            59,
        )?;
        check_reserved(RegAddr::Minutes, self.minutes.0, 0x80)?;
        let minute = read_bcd(
            RegAddr::Minutes,
            self.minutes.0,
            self.minutes.ten_minutes(),
            self.minutes.minutes(),
            0,
            59,
        )?;
        check_reserved(RegAddr::Hours, self.hours.0, 0x80)?;
        let hour = decode_hour(
            RegAddr::Hours,
            self.hours.0,
            self.hours.time_representation(),
            self.hours.pm_or_twenty_hours(),
            self.hours.ten_hours(),
            self.hours.hours(),
        )?;
        check_reserved(RegAddr::Day, self.day.0, 0xF8)?;
        let weekday = self.day.day();
        if weekday == 0 {
            return Err(DS3231DateTimeError::InvalidRegister {
                register: RegAddr::Day,
                raw: self.day.0,
            });
        }
        check_reserved(RegAddr::Date, self.date.0, 0xC0)?;
        let day = read_bcd(
            RegAddr::Date,
            self.date.0,
            self.date.ten_date(),
            self.date.date(),
            1,
            31,
        )?;
        // bit 7 is the century flag
        check_reserved(RegAddr::Month, self.month.0, 0x60)?;
        let month = read_bcd(
            RegAddr::Month,
            self.month.0,
            self.month.ten_month(),
            self.month.month(),
            1,
            12,
        )?;
        let year = read_bcd(
            RegAddr::Year,
            self.year.0,
            self.year.ten_year(),
            self.year.year(),
            0,
            99,
        )?;
        let time = CalendarTime {
            year: epoch_base
                .checked_add(u16::from(year))
                .ok_or(DS3231DateTimeError::InvalidDate)?,
            month,
            day,
            weekday,
            hour,
            minute,
            second,
        };
        debug!("decoded {:?} from hours {:?}", time, self.hours);
        time.validate()?;
        Ok(time)
    }

    /// Century flag of the month register.
    #[must_use]
    pub fn century(&self) -> bool {
        self.month.century()
    }

    /// Copies the century flag, used to preserve it across a rewrite.
    pub fn set_century(&mut self, century: bool) {
        self.month.set_century(century);
    }

    /// The hours register.
    #[must_use]
    pub fn hours(&self) -> Hours {
        self.hours
    }
}

impl From<[u8; 7]> for DS3231DateTime {
    fn from(data: [u8; 7]) -> Self {
        DS3231DateTime {
            seconds: Seconds(data[0]),
            minutes: Minutes(data[1]),
            hours: Hours(data[2]),
            day: Day(data[3]),
            date: Date(data[4]),
            month: Month(data[5]),
            year: Year(data[6]),
        }
    }
}

impl From<&DS3231DateTime> for [u8; 7] {
    fn from(dt: &DS3231DateTime) -> [u8; 7] {
        [
            dt.seconds.0,
            dt.minutes.0,
            dt.hours.0,
            dt.day.0,
            dt.date.0,
            dt.month.0,
            dt.year.0,
        ]
    }
}

/// Rewrites an hours register in 24-hour mode, keeping the hour it shows.
///
/// # Errors
///
/// Returns [`DS3231DateTimeError::InvalidRegister`] if the register cannot be
/// decoded.
pub(crate) fn hours_to_24(hours: Hours) -> Result<Hours, DS3231DateTimeError> {
    check_reserved(RegAddr::Hours, hours.0, 0x80)?;
    let hour = decode_hour(
        RegAddr::Hours,
        hours.0,
        hours.time_representation(),
        hours.pm_or_twenty_hours(),
        hours.ten_hours(),
        hours.hours(),
    )?;
    DS3231DateTime::convert_hours(hour)
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::string::ToString;

    fn sample() -> CalendarTime {
        CalendarTime {
            year: 2025,
            month: 9,
            day: 25,
            weekday: 3,
            hour: 14,
            minute: 15,
            second: 30,
        }
    }

    #[test]
    fn test_decode_register_scenario() {
        let raw = DS3231DateTime::from([0x30, 0x15, 0x14, 0x03, 0x25, 0x09, 0x25]);
        let time = raw.into_calendar(DEFAULT_EPOCH_BASE).unwrap();
        assert_eq!(time, sample());
    }

    #[test]
    fn test_decode_uses_configured_epoch() {
        let raw = DS3231DateTime::from([0x30, 0x15, 0x14, 0x03, 0x25, 0x09, 0x25]);
        let time = raw.into_calendar(2100).unwrap();
        assert_eq!(time.year, 2125);
    }

    #[test]
    fn test_encode_known_bytes() {
        let raw = DS3231DateTime::from_calendar(&sample(), DEFAULT_EPOCH_BASE).unwrap();
        let bytes: [u8; 7] = (&raw).into();
        assert_eq!(bytes, [0x30, 0x15, 0x14, 0x03, 0x25, 0x09, 0x25]);
    }

    #[test]
    fn test_round_trip_across_the_epoch_window() {
        let cases = [
            (2000, 1, 1, 0, 0, 0),
            (2024, 2, 29, 12, 0, 0),
            (2023, 2, 28, 23, 59, 59),
            (2050, 7, 4, 9, 5, 7),
            (2099, 12, 31, 23, 59, 59),
        ];
        for (y, mo, d, h, mi, s) in cases {
            let time = CalendarTime::new(y, mo, d, h, mi, s).unwrap();
            let raw = DS3231DateTime::from_calendar(&time, DEFAULT_EPOCH_BASE).unwrap();
            assert_eq!(raw.into_calendar(DEFAULT_EPOCH_BASE).unwrap(), time);
        }
    }

    #[test]
    fn test_every_hour_round_trips() {
        for hour in 0..=23 {
            let mut time = sample();
            time.hour = hour;
            let raw = DS3231DateTime::from_calendar(&time, DEFAULT_EPOCH_BASE).unwrap();
            assert_eq!(raw.hours().time_representation(), TimeRepresentation::TwentyFourHour);
            assert_eq!(raw.into_calendar(DEFAULT_EPOCH_BASE).unwrap().hour, hour);
        }
    }

    #[test]
    fn test_hour_twenty_uses_twenty_hours_bit() {
        let mut time = sample();
        time.hour = 20;
        let raw = DS3231DateTime::from_calendar(&time, DEFAULT_EPOCH_BASE).unwrap();
        assert_eq!(raw.hours().pm_or_twenty_hours(), 1);
        assert_eq!(raw.hours().ten_hours(), 0);
        assert_eq!(raw.hours().hours(), 0);
        let decoded = raw.into_calendar(DEFAULT_EPOCH_BASE).unwrap();
        assert_eq!(decoded.hour, 20);
    }

    #[test]
    fn test_twelve_hour_registers_are_normalized() {
        // 2 PM
        let raw = DS3231DateTime::from([0x00, 0x45, 0x62, 0x05, 0x14, 0x03, 0x24]);
        assert_eq!(raw.into_calendar(DEFAULT_EPOCH_BASE).unwrap().hour, 14);
        // 12 AM
        let raw = DS3231DateTime::from([0x00, 0x00, 0x52, 0x05, 0x14, 0x03, 0x24]);
        assert_eq!(raw.into_calendar(DEFAULT_EPOCH_BASE).unwrap().hour, 0);
        // 12 PM
        let raw = DS3231DateTime::from([0x00, 0x00, 0x72, 0x05, 0x14, 0x03, 0x24]);
        assert_eq!(raw.into_calendar(DEFAULT_EPOCH_BASE).unwrap().hour, 12);
        // 11 AM
        let raw = DS3231DateTime::from([0x00, 0x00, 0x51, 0x05, 0x14, 0x03, 0x24]);
        assert_eq!(raw.into_calendar(DEFAULT_EPOCH_BASE).unwrap().hour, 11);
    }

    #[test]
    fn test_hours_to_24_keeps_the_hour() {
        let converted = hours_to_24(Hours(0x69)).unwrap(); // 9 PM
        assert_eq!(u8::from(converted), 0x21);
        let converted = hours_to_24(Hours(0x08)).unwrap();
        assert_eq!(u8::from(converted), 0x08);
    }

    #[test]
    fn test_corrupt_reads_are_rejected() {
        let cases = [
            ([0x6A, 0x00, 0x00, 0x01, 0x01, 0x01, 0x00], RegAddr::Seconds),
            ([0x00, 0x7F, 0x00, 0x01, 0x01, 0x01, 0x00], RegAddr::Minutes),
            ([0x00, 0x00, 0x24, 0x01, 0x01, 0x01, 0x00], RegAddr::Hours),
            ([0x00, 0x00, 0x0A, 0x01, 0x01, 0x01, 0x00], RegAddr::Hours),
            ([0x00, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00], RegAddr::Day),
            ([0x00, 0x00, 0x00, 0x01, 0x32, 0x01, 0x00], RegAddr::Date),
            ([0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00], RegAddr::Date),
            ([0x00, 0x00, 0x00, 0x01, 0x01, 0x13, 0x00], RegAddr::Month),
            ([0x00, 0x00, 0x00, 0x01, 0x01, 0x01, 0xA0], RegAddr::Year),
            ([0x80, 0x00, 0x00, 0x01, 0x01, 0x01, 0x00], RegAddr::Seconds),
            ([0x00, 0x80, 0x00, 0x01, 0x01, 0x01, 0x00], RegAddr::Minutes),
            ([0x00, 0x00, 0x94, 0x01, 0x01, 0x01, 0x00], RegAddr::Hours),
            ([0x30, 0x15, 0x14, 0xFB, 0x25, 0x09, 0x25], RegAddr::Day),
            ([0x00, 0x00, 0x00, 0x01, 0x41, 0x01, 0x00], RegAddr::Date),
            ([0x00, 0x00, 0x00, 0x01, 0x01, 0x21, 0x00], RegAddr::Month),
            ([0xB0, 0x95, 0x94, 0x03, 0xE5, 0x69, 0x25], RegAddr::Seconds),
        ];
        for (bytes, register) in cases {
            let err = DS3231DateTime::from(bytes)
                .into_calendar(DEFAULT_EPOCH_BASE)
                .unwrap_err();
            assert!(
                matches!(err, DS3231DateTimeError::InvalidRegister { register: r, .. } if r == register),
                "{:?} gave {:?}",
                bytes,
                err
            );
        }
    }

    #[test]
    fn test_impossible_date_is_rejected() {
        // 30 February
        let raw = DS3231DateTime::from([0x00, 0x00, 0x00, 0x01, 0x30, 0x02, 0x25]);
        assert_eq!(
            raw.into_calendar(DEFAULT_EPOCH_BASE),
            Err(DS3231DateTimeError::InvalidDate)
        );
    }

    #[test]
    fn test_century_flag_is_ignored_on_decode() {
        let raw = DS3231DateTime::from([0x00, 0x00, 0x00, 0x01, 0x01, 0x81, 0x25]);
        assert!(raw.century());
        assert_eq!(raw.into_calendar(DEFAULT_EPOCH_BASE).unwrap().year, 2025);
    }

    #[test]
    fn test_encode_rejects_out_of_range_fields() {
        let mut time = sample();
        time.hour = 24;
        assert_eq!(
            DS3231DateTime::from_calendar(&time, DEFAULT_EPOCH_BASE),
            Err(DS3231DateTimeError::OutOfRange {
                field: Field::Hour,
                value: 24
            })
        );

        let mut time = sample();
        time.second = 60;
        assert!(matches!(
            DS3231DateTime::from_calendar(&time, DEFAULT_EPOCH_BASE),
            Err(DS3231DateTimeError::OutOfRange {
                field: Field::Second,
                ..
            })
        ));

        let mut time = sample();
        time.weekday = 0;
        assert!(matches!(
            DS3231DateTime::from_calendar(&time, DEFAULT_EPOCH_BASE),
            Err(DS3231DateTimeError::OutOfRange {
                field: Field::Weekday,
                ..
            })
        ));

        let mut time = sample();
        time.month = 13;
        assert!(matches!(
            DS3231DateTime::from_calendar(&time, DEFAULT_EPOCH_BASE),
            Err(DS3231DateTimeError::OutOfRange {
                field: Field::Month,
                ..
            })
        ));
    }

    #[test]
    fn test_encode_rejects_years_outside_epoch() {
        let mut time = sample();
        time.year = 1999;
        assert_eq!(
            DS3231DateTime::from_calendar(&time, DEFAULT_EPOCH_BASE),
            Err(DS3231DateTimeError::OutOfRange {
                field: Field::Year,
                value: 1999
            })
        );
        time.year = 2100;
        assert!(DS3231DateTime::from_calendar(&time, DEFAULT_EPOCH_BASE).is_err());
        assert!(DS3231DateTime::from_calendar(&time, 2030).is_ok());
    }

    #[test]
    fn test_encode_rejects_impossible_date() {
        let mut time = sample();
        time.month = 4;
        time.day = 31;
        assert_eq!(
            DS3231DateTime::from_calendar(&time, DEFAULT_EPOCH_BASE),
            Err(DS3231DateTimeError::InvalidDate)
        );
    }

    #[test]
    fn test_weekday_is_carried_not_recomputed() {
        // 2025-09-25 is a Thursday (5 with Sunday = 1), the chip says 3
        let raw = DS3231DateTime::from_calendar(&sample(), DEFAULT_EPOCH_BASE).unwrap();
        assert_eq!(raw.into_calendar(DEFAULT_EPOCH_BASE).unwrap().weekday, 3);
    }

    #[test]
    fn test_new_derives_weekday() {
        // Sunday
        assert_eq!(CalendarTime::new(2024, 3, 10, 0, 0, 0).unwrap().weekday, 1);
        // Saturday
        assert_eq!(CalendarTime::new(2024, 3, 16, 0, 0, 0).unwrap().weekday, 7);
        assert_eq!(
            CalendarTime::new(2023, 2, 29, 0, 0, 0),
            Err(DS3231DateTimeError::InvalidDate)
        );
    }

    #[test]
    fn test_chrono_conversions() {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        let time = CalendarTime::from_naive(&naive).unwrap();
        assert_eq!(time.weekday, 5); // Thursday
        assert_eq!(time.to_naive().unwrap(), naive);
        assert_eq!(time.timestamp().unwrap(), naive.and_utc().timestamp());
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(sample().to_string(), "14:15:30 25/09/2025 3");
        assert_eq!(sample().compact(2000).to_string(), "14:15:30 25/09/25 3");
    }
}
