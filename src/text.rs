//! Text forms of calendar times and alarm masks.
//!
//! Calendar times are written `HH:MM:SS DD/MM/YYYY W` (see the `Display`
//! impl on [`CalendarTime`]) and read back by [`parse_calendar_time`], which
//! also accepts the two-digit year form produced by
//! [`CalendarTime::compact`]. Alarm masks are four `0`/`1` flags in the
//! order day, hour, minute, second: `"1 1 0 0"`.
//!
//! The control register is written as its seven fields in datasheet order,
//! `EOSC BBSQW CONV RS INTCN A2IE A1IE` (`"0 0 0 3 1 0 0"` at power-up), and
//! the status register as `A1F A2F BSY EN32kHz OSF`.

use core::fmt;
use core::str::FromStr;

use crate::datetime::Field;
use crate::{AlarmMask, CalendarTime, Control, DS3231DateTimeError, Status};

/// Error type for text parsing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Calendar time text must have 6 or 7 fields
    FieldCount {
        /// Number of fields found
        found: usize,
    },
    /// Field `index` (0-based) is not a decimal number
    InvalidNumber {
        /// Position of the field
        index: usize,
    },
    /// Mask text is not four `0`/`1` flags
    InvalidMask,
    /// Control text is not seven fields with RS in 0-3 and flags in 0-1
    InvalidControl,
    /// The numbers parsed but do not form a valid calendar time
    DateTime(DS3231DateTimeError),
}

impl From<DS3231DateTimeError> for ParseError {
    fn from(e: DS3231DateTimeError) -> Self {
        ParseError::DateTime(e)
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ':' | '/') || c.is_ascii_whitespace()
}

fn control_separator(c: char) -> bool {
    c == ',' || is_separator(c)
}

fn narrow(field: Field, value: u32) -> Result<u8, ParseError> {
    u8::try_from(value).map_err(|_| DS3231DateTimeError::OutOfRange { field, value }.into())
}

/// Parses `HH:MM:SS DD/MM/YY[YY] [W]`.
///
/// Fields may be separated by any mix of `:`, `/` and whitespace. A year
/// below 100 counts from `epoch_base`; larger values are taken as the full
/// year. The weekday (1-7, 1 = Sunday) is kept as given, or derived from the
/// date when absent.
///
/// # Errors
///
/// [`ParseError::FieldCount`] or [`ParseError::InvalidNumber`] for malformed
/// text, [`ParseError::DateTime`] when a field is out of range or the date
/// does not exist.
pub fn parse_calendar_time(input: &str, epoch_base: u16) -> Result<CalendarTime, ParseError> {
    let tokens = || input.split(is_separator).filter(|t| !t.is_empty());
    let found = tokens().count();
    if !(6..=7).contains(&found) {
        return Err(ParseError::FieldCount { found });
    }

    let mut fields = [0u32; 7];
    for (index, token) in tokens().enumerate() {
        fields[index] = token
            .parse()
            .map_err(|_| ParseError::InvalidNumber { index })?;
    }
    let [hour, minute, second, day, month, year, weekday] = fields;

    let year = if year < 100 {
        u32::from(epoch_base) + year
    } else {
        year
    };
    let year = u16::try_from(year).map_err(|_| DS3231DateTimeError::OutOfRange {
        field: Field::Year,
        value: year,
    })?;
    let hour = narrow(Field::Hour, hour)?;
    let minute = narrow(Field::Minute, minute)?;
    let second = narrow(Field::Second, second)?;
    let day = narrow(Field::Day, day)?;
    let month = narrow(Field::Month, month)?;

    if found == 6 {
        return Ok(CalendarTime::new(year, month, day, hour, minute, second)?);
    }
    let time = CalendarTime {
        year,
        month,
        day,
        weekday: narrow(Field::Weekday, weekday)?,
        hour,
        minute,
        second,
    };
    time.validate()?;
    trace!("parsed {:?}", time);
    Ok(time)
}

impl fmt::Display for AlarmMask {
    /// `d h m s`, each `0` or `1`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            u8::from(self.day()),
            u8::from(self.hour()),
            u8::from(self.minute()),
            u8::from(self.second())
        )
    }
}

impl FromStr for AlarmMask {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = [false; 4];
        let mut count = 0;
        for token in s.split(is_separator).filter(|t| !t.is_empty()) {
            let flag = flags.get_mut(count).ok_or(ParseError::InvalidMask)?;
            *flag = match token {
                "0" => false,
                "1" => true,
                _ => return Err(ParseError::InvalidMask),
            };
            count += 1;
        }
        if count != flags.len() {
            return Err(ParseError::InvalidMask);
        }
        let mut mask = AlarmMask::default();
        mask.set_day(flags[0]);
        mask.set_hour(flags[1]);
        mask.set_minute(flags[2]);
        mask.set_second(flags[3]);
        Ok(mask)
    }
}

impl fmt::Display for Control {
    /// `EOSC BBSQW CONV RS INTCN A2IE A1IE`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            u8::from(self.oscillator_enable()),
            u8::from(self.battery_backed_square_wave()),
            u8::from(self.convert_temperature()),
            u8::from(self.square_wave_frequency()),
            u8::from(self.interrupt_control()),
            u8::from(self.alarm2_interrupt_enable()),
            u8::from(self.alarm1_interrupt_enable())
        )
    }
}

impl fmt::Display for Status {
    /// `A1F A2F BSY EN32kHz OSF`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            u8::from(self.alarm1_flag()),
            u8::from(self.alarm2_flag()),
            u8::from(self.busy()),
            u8::from(self.enable_32khz_output()),
            u8::from(self.oscillator_stop_flag())
        )
    }
}

/// Parses the seven control fields `EOSC BBSQW CONV RS INTCN A2IE A1IE`.
///
/// Fields may be separated by `:`, `/`, `,` or whitespace. Every bit of the
/// register is covered, so the result can be written as is.
///
/// # Errors
///
/// [`ParseError::InvalidControl`] for a wrong field count or a value out of
/// range, [`ParseError::InvalidNumber`] for a field that is not a number.
pub fn parse_control(input: &str) -> Result<Control, ParseError> {
    let mut fields = [0u8; 7];
    let mut count = 0;
    for (index, token) in input
        .split(control_separator)
        .filter(|t| !t.is_empty())
        .enumerate()
    {
        let field = fields.get_mut(index).ok_or(ParseError::InvalidControl)?;
        *field = token
            .parse()
            .map_err(|_| ParseError::InvalidNumber { index })?;
        count += 1;
    }
    if count != fields.len() {
        return Err(ParseError::InvalidControl);
    }
    let [eosc, bbsqw, conv, rs, intcn, a2ie, a1ie] = fields;
    let flag = |v: u8| match v {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ParseError::InvalidControl),
    };
    if rs > 3 || eosc > 1 || intcn > 1 {
        return Err(ParseError::InvalidControl);
    }
    let mut control = Control::default();
    control.set_oscillator_enable(eosc.into());
    control.set_battery_backed_square_wave(flag(bbsqw)?);
    control.set_convert_temperature(flag(conv)?);
    control.set_square_wave_frequency(rs.into());
    control.set_interrupt_control(intcn.into());
    control.set_alarm2_interrupt_enable(flag(a2ie)?);
    control.set_alarm1_interrupt_enable(flag(a1ie)?);
    Ok(control)
}
