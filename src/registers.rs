//! Register map and bit-field layouts of the DS3231.
//!
//! Addresses are fixed by the datasheet. Each register is modelled as a
//! `bitfield!` newtype over `u8` with explicit bit ranges, so the layout does
//! not depend on how a compiler would lay out native bit fields.

use bitfield::bitfield;

/// Bus address of the DS3231 on the ZS-042 board.
pub const DS3231_ADDRESS: u8 = 0x68;

/// Bus address of the AT24C32 EEPROM fitted on the ZS-042 board
/// (128 pages of 32 bytes). The driver does not access it.
pub const AT24C32_ADDRESS: u8 = 0x57;

/// Register addresses for the DS3231 RTC.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (0-59)
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (1-12 + AM/PM or 0-23)
    Hours = 0x02,
    /// Day of week register (1-7)
    Day = 0x03,
    /// Date register (1-31)
    Date = 0x04,
    /// Month register (1-12) and century flag
    Month = 0x05,
    /// Year register (0-99)
    Year = 0x06,
    /// Alarm 1 seconds register
    Alarm1Seconds = 0x07,
    /// Alarm 1 minutes register
    Alarm1Minutes = 0x08,
    /// Alarm 1 hours register
    Alarm1Hours = 0x09,
    /// Alarm 1 day/date register
    Alarm1DayDate = 0x0A,
    /// Alarm 2 minutes register
    Alarm2Minutes = 0x0B,
    /// Alarm 2 hours register
    Alarm2Hours = 0x0C,
    /// Alarm 2 day/date register
    Alarm2DayDate = 0x0D,
    /// Control register
    Control = 0x0E,
    /// Control/Status register
    ControlStatus = 0x0F,
    /// Aging offset register
    AgingOffset = 0x10,
    /// Temperature MSB register
    MSBTemp = 0x11,
    /// Temperature LSB register
    LSBTemp = 0x12,
}

/// Hour encoding selected by bit 6 of the hours registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// 24-hour format (0-23)
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl From<u8> for TimeRepresentation {
    fn from(v: u8) -> Self {
        if v & 0x01 == 0 {
            TimeRepresentation::TwentyFourHour
        } else {
            TimeRepresentation::TwelveHour
        }
    }
}
impl From<TimeRepresentation> for u8 {
    fn from(v: TimeRepresentation) -> Self {
        v as u8
    }
}

/// Oscillator control (EOSC). The bit is active low.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oscillator {
    /// Oscillator runs on battery power too
    Enabled = 0,
    /// Oscillator stops when the chip switches to battery power
    Disabled = 1,
}
impl From<u8> for Oscillator {
    fn from(v: u8) -> Self {
        if v & 0x01 == 0 {
            Oscillator::Enabled
        } else {
            Oscillator::Disabled
        }
    }
}
impl From<Oscillator> for u8 {
    fn from(v: Oscillator) -> Self {
        v as u8
    }
}

/// Function of the INT/SQW pin (INTCN).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptControl {
    /// Output square wave on INT/SQW pin
    SquareWave = 0,
    /// Output alarm interrupt signal on INT/SQW pin
    Interrupt = 1,
}
impl From<u8> for InterruptControl {
    fn from(v: u8) -> Self {
        if v & 0x01 == 0 {
            InterruptControl::SquareWave
        } else {
            InterruptControl::Interrupt
        }
    }
}
impl From<InterruptControl> for u8 {
    fn from(v: InterruptControl) -> Self {
        v as u8
    }
}

/// Square wave output rate (RS2/RS1).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareWaveFrequency {
    /// 1 Hz square wave output
    Hz1 = 0b00,
    /// 1.024 kHz square wave output
    Hz1024 = 0b01,
    /// 4.096 kHz square wave output
    Hz4096 = 0b10,
    /// 8.192 kHz square wave output
    Hz8192 = 0b11,
}
impl From<u8> for SquareWaveFrequency {
    fn from(v: u8) -> Self {
        match v & 0b11 {
            0b00 => SquareWaveFrequency::Hz1,
            0b01 => SquareWaveFrequency::Hz1024,
            0b10 => SquareWaveFrequency::Hz4096,
            _ => SquareWaveFrequency::Hz8192,
        }
    }
}
impl From<SquareWaveFrequency> for u8 {
    fn from(v: SquareWaveFrequency) -> Self {
        v as u8
    }
}

/// Day/Date select for alarm registers (DY/DT bit).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DayDateSelect {
    /// Match against date of the month (1-31)
    Date = 0,
    /// Match against day of the week (1-7)
    Day = 1,
}
impl From<u8> for DayDateSelect {
    fn from(v: u8) -> Self {
        if v & 0x01 == 0 {
            DayDateSelect::Date
        } else {
            DayDateSelect::Day
        }
    }
}
impl From<DayDateSelect> for u8 {
    fn from(v: DayDateSelect) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Seconds register (0-59).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Seconds(u8);
    impl Debug;
    pub ten_seconds, set_ten_seconds: 6, 4;
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(Seconds);

bitfield! {
    /// Minutes register (0-59).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Minutes(u8);
    impl Debug;
    pub ten_minutes, set_ten_minutes: 6, 4;
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(Minutes);

bitfield! {
    /// Hours register.
    ///
    /// Bit 5 is the PM flag in 12-hour mode and the 20-hours digit in
    /// 24-hour mode, so it can only be interpreted after reading bit 6.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Hours(u8);
    impl Debug;
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5, 5;
    pub ten_hours, set_ten_hours: 4, 4;
    pub hours, set_hours: 3, 0;
}
from_register_u8!(Hours);

bitfield! {
    /// Day of week register (1-7). Plain binary, not BCD.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Day(u8);
    impl Debug;
    pub day, set_day: 2, 0;
}
from_register_u8!(Day);

bitfield! {
    /// Date of month register (1-31).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Date(u8);
    impl Debug;
    pub ten_date, set_ten_date: 5, 4;
    pub date, set_date: 3, 0;
}
from_register_u8!(Date);

bitfield! {
    /// Month register (1-12) with the century flag.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Month(u8);
    impl Debug;
    /// Toggled by the chip when the year register wraps from 99 to 00
    pub century, set_century: 7;
    pub ten_month, set_ten_month: 4, 4;
    pub month, set_month: 3, 0;
}
from_register_u8!(Month);

bitfield! {
    /// Year register (0-99).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Year(u8);
    impl Debug;
    pub ten_year, set_ten_year: 7, 4;
    pub year, set_year: 3, 0;
}
from_register_u8!(Year);

bitfield! {
    /// Control register.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Control(u8);
    impl Debug;
    /// EOSC, active low
    pub from into Oscillator, oscillator_enable, set_oscillator_enable: 7, 7;
    /// BBSQW: keep the square wave running on battery power
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    /// CONV: force a temperature conversion
    pub convert_temperature, set_convert_temperature: 5;
    pub from into SquareWaveFrequency, square_wave_frequency, set_square_wave_frequency: 4, 3;
    pub from into InterruptControl, interrupt_control, set_interrupt_control: 2, 2;
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}
from_register_u8!(Control);

bitfield! {
    /// Control/Status register.
    ///
    /// Only the two alarm flags are ever cleared by software; the
    /// oscillator-stop and busy flags are observations of chip state.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Status(u8);
    impl Debug;
    /// OSF
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    /// EN32kHz
    pub enable_32khz_output, set_enable_32khz_output: 3;
    /// BSY: a TCXO / temperature conversion cycle is running
    pub busy, set_busy: 2;
    /// A2F
    pub alarm2_flag, set_alarm2_flag: 1;
    /// A1F
    pub alarm1_flag, set_alarm1_flag: 0;
}
from_register_u8!(Status);

bitfield! {
    /// Aging offset register, two's complement.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AgingOffset(u8);
    impl Debug;
    pub i8, aging_offset, set_aging_offset: 7, 0;
}
from_register_u8!(AgingOffset);

bitfield! {
    /// Temperature MSB register: signed integer degrees.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Temperature(u8);
    impl Debug;
    pub i8, temperature, set_temperature: 7, 0;
}
from_register_u8!(Temperature);

bitfield! {
    /// Temperature LSB register: quarter degrees in the top two bits.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct TemperatureFraction(u8);
    impl Debug;
    pub temperature_fraction, set_temperature_fraction: 7, 6;
}
from_register_u8!(TemperatureFraction);

// Alarm registers carry a mask bit in bit 7 on top of the time layout.

bitfield! {
    /// Alarm 1 seconds register.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmSeconds(u8);
    impl Debug;
    /// A1M1
    pub alarm_mask1, set_alarm_mask1: 7;
    pub ten_seconds, set_ten_seconds: 6, 4;
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(AlarmSeconds);

bitfield! {
    /// Alarm minutes register (Alarm 1 and Alarm 2).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmMinutes(u8);
    impl Debug;
    /// A1M2 / A2M2
    pub alarm_mask2, set_alarm_mask2: 7;
    pub ten_minutes, set_ten_minutes: 6, 4;
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(AlarmMinutes);

bitfield! {
    /// Alarm hours register (Alarm 1 and Alarm 2).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmHours(u8);
    impl Debug;
    /// A1M3 / A2M3
    pub alarm_mask3, set_alarm_mask3: 7;
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5, 5;
    pub ten_hours, set_ten_hours: 4, 4;
    pub hours, set_hours: 3, 0;
}
from_register_u8!(AlarmHours);

bitfield! {
    /// Alarm day/date register (Alarm 1 and Alarm 2).
    ///
    /// With DY/DT set the low nibble is a weekday and `ten_date` is unused;
    /// with DY/DT clear the register holds a BCD date.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmDayDate(u8);
    impl Debug;
    /// A1M4 / A2M4
    pub alarm_mask4, set_alarm_mask4: 7;
    pub from into DayDateSelect, day_date_select, set_day_date_select: 6, 6;
    pub ten_date, set_ten_date: 5, 4;
    pub day_or_date, set_day_or_date: 3, 0;
}
from_register_u8!(AlarmDayDate);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_addresses_match_datasheet() {
        assert_eq!(RegAddr::Seconds as u8, 0x00);
        assert_eq!(RegAddr::Year as u8, 0x06);
        assert_eq!(RegAddr::Alarm1Seconds as u8, 0x07);
        assert_eq!(RegAddr::Alarm1DayDate as u8, 0x0A);
        assert_eq!(RegAddr::Alarm2Minutes as u8, 0x0B);
        assert_eq!(RegAddr::Alarm2DayDate as u8, 0x0D);
        assert_eq!(RegAddr::Control as u8, 0x0E);
        assert_eq!(RegAddr::ControlStatus as u8, 0x0F);
        assert_eq!(RegAddr::AgingOffset as u8, 0x10);
        assert_eq!(RegAddr::MSBTemp as u8, 0x11);
        assert_eq!(RegAddr::LSBTemp as u8, 0x12);
        assert_eq!(DS3231_ADDRESS, 0x68);
        assert_eq!(AT24C32_ADDRESS, 0x57);
    }

    #[test]
    fn test_enum_conversions_only_look_at_field_bits() {
        assert_eq!(TimeRepresentation::from(0), TimeRepresentation::TwentyFourHour);
        assert_eq!(TimeRepresentation::from(1), TimeRepresentation::TwelveHour);
        assert_eq!(Oscillator::from(0), Oscillator::Enabled);
        assert_eq!(Oscillator::from(1), Oscillator::Disabled);
        assert_eq!(InterruptControl::from(1), InterruptControl::Interrupt);
        assert_eq!(DayDateSelect::from(1), DayDateSelect::Day);
        assert_eq!(DayDateSelect::from(0), DayDateSelect::Date);
        assert_eq!(SquareWaveFrequency::from(0b10), SquareWaveFrequency::Hz4096);
        assert_eq!(SquareWaveFrequency::from(0b111), SquareWaveFrequency::Hz8192);
        assert_eq!(u8::from(SquareWaveFrequency::Hz1024), 0b01);
    }

    #[test]
    fn test_seconds_register_fields() {
        let seconds = Seconds::from(0x59);
        assert_eq!(seconds.ten_seconds(), 5);
        assert_eq!(seconds.seconds(), 9);
        assert_eq!(u8::from(seconds), 0x59);
    }

    #[test]
    fn test_hours_register_fields() {
        // 23 in 24-hour mode: the 20-hours bit plus ones digit 3
        let hours = Hours::from(0x23);
        assert_eq!(hours.time_representation(), TimeRepresentation::TwentyFourHour);
        assert_eq!(hours.pm_or_twenty_hours(), 1);
        assert_eq!(hours.ten_hours(), 0);
        assert_eq!(hours.hours(), 3);

        // 12 PM in 12-hour mode
        let hours = Hours::from(0x72);
        assert_eq!(hours.time_representation(), TimeRepresentation::TwelveHour);
        assert_eq!(hours.pm_or_twenty_hours(), 1);
        assert_eq!(hours.ten_hours(), 1);
        assert_eq!(hours.hours(), 2);
    }

    #[test]
    fn test_month_century_bit() {
        let month = Month::from(0x92);
        assert!(month.century());
        assert_eq!(month.ten_month(), 1);
        assert_eq!(month.month(), 2);
    }

    #[test]
    fn test_control_register_fields() {
        let mut control = Control::default();
        control.set_oscillator_enable(Oscillator::Disabled);
        control.set_square_wave_frequency(SquareWaveFrequency::Hz8192);
        control.set_interrupt_control(InterruptControl::Interrupt);
        control.set_alarm1_interrupt_enable(true);
        assert_eq!(u8::from(control), 0b1001_1101);
        assert_eq!(control.square_wave_frequency(), SquareWaveFrequency::Hz8192);
        assert!(!control.alarm2_interrupt_enable());
    }

    #[test]
    fn test_status_register_fields() {
        let status = Status::from(0b1000_1111);
        assert!(status.oscillator_stop_flag());
        assert!(status.enable_32khz_output());
        assert!(status.busy());
        assert!(status.alarm2_flag());
        assert!(status.alarm1_flag());
    }

    #[test]
    fn test_temperature_registers() {
        assert_eq!(Temperature::from(0x19).temperature(), 25);
        assert_eq!(Temperature::from(0xE7).temperature(), -25);
        assert_eq!(TemperatureFraction::from(0xC0).temperature_fraction(), 3);
        assert_eq!(TemperatureFraction::from(0x40).temperature_fraction(), 1);
        assert_eq!(AgingOffset::from(0xFF).aging_offset(), -1);
    }

    #[test]
    fn test_alarm_day_date_fields() {
        let day_date = AlarmDayDate::from(0b1100_0011);
        assert!(day_date.alarm_mask4());
        assert_eq!(day_date.day_date_select(), DayDateSelect::Day);
        assert_eq!(day_date.day_or_date(), 3);

        let day_date = AlarmDayDate::from(0x17);
        assert!(!day_date.alarm_mask4());
        assert_eq!(day_date.day_date_select(), DayDateSelect::Date);
        assert_eq!(day_date.ten_date(), 1);
        assert_eq!(day_date.day_or_date(), 7);
    }
}
