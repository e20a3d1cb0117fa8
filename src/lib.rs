//! Driver for the DS3231 real-time clock on ZS-042 boards.
//!
//! The crate is built around a bit-exact codec between [`CalendarTime`] and
//! the chip's BCD registers (see [`datetime`] and [`alarm`]). On top of it sit
//! a blocking driver over `embedded_hal::i2c::I2c` ([`DS3231`]), an async
//! driver behind the `async` feature ([`asynch::DS3231`]), text glue
//! ([`text`]) and a deep-sleep helper for the host MCU ([`sleep`]).
//!
//! # Features
//!
//! - `async`: async driver over `embedded-hal-async`
//! - `log` / `defmt`: debug output through either logging framework
//! - `temperature_f32`: [`TemperatureReading::celsius`]
//!
//! # Example
//!
//! ```rust,ignore
//! use zs042_rtc::{Config, DS3231, DS3231_ADDRESS};
//!
//! let mut rtc = DS3231::new(i2c, DS3231_ADDRESS);
//! rtc.configure(&Config::default())?;
//! rtc.set_datetime_str("14:15:30 25/09/25 5")?;
//! let now = rtc.datetime()?;
//! rtc.set_alarm1_mask_str("1 1 1 0")?;
//! ```
#![no_std]

#[macro_use]
mod fmt;

pub mod alarm;
#[cfg(feature = "async")]
pub mod asynch;
pub mod bcd;
pub mod datetime;
pub mod registers;
pub mod sleep;
pub mod text;

use embedded_hal::i2c::I2c;

pub use alarm::{
    resolve_alarm_target, AlarmDay, AlarmError, AlarmMask, AlarmSpec, DS3231Alarm1, DS3231Alarm2,
};
pub use bcd::BcdError;
pub use datetime::{CalendarTime, DS3231DateTime, DS3231DateTimeError, Field, DEFAULT_EPOCH_BASE};
pub use registers::*;
pub use text::{parse_calendar_time, parse_control, ParseError};

use datetime::hours_to_24;

/// Configuration applied by `configure`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Rate on INT/SQW when it is in square wave mode
    pub square_wave_frequency: SquareWaveFrequency,
    /// INT/SQW pin function
    pub interrupt_control: InterruptControl,
    /// Keep the square wave running on battery power
    pub battery_backed_square_wave: bool,
    /// Oscillator behaviour on battery power
    pub oscillator: Oscillator,
    /// Calendar year stored as hardware year 00
    pub epoch_base: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            square_wave_frequency: SquareWaveFrequency::Hz1,
            interrupt_control: InterruptControl::Interrupt,
            battery_backed_square_wave: false,
            oscillator: Oscillator::Enabled,
            epoch_base: DEFAULT_EPOCH_BASE,
        }
    }
}

impl Config {
    /// Applies the control register part, leaving the alarm interrupt enables
    /// and CONV alone.
    pub(crate) fn apply(&self, control: &mut Control) {
        control.set_oscillator_enable(self.oscillator);
        control.set_battery_backed_square_wave(self.battery_backed_square_wave);
        control.set_square_wave_frequency(self.square_wave_frequency);
        control.set_interrupt_control(self.interrupt_control);
    }
}

/// Errors returned by the drivers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DS3231Error<I2CE> {
    /// Bus transfer failed
    I2c(I2CE),
    /// Date/time could not be encoded, or the registers did not decode
    DateTime(DS3231DateTimeError),
    /// Alarm could not be encoded or decoded
    Alarm(AlarmError),
    /// Text input was malformed
    Parse(ParseError),
}

impl<I2CE> From<DS3231DateTimeError> for DS3231Error<I2CE> {
    fn from(e: DS3231DateTimeError) -> Self {
        DS3231Error::DateTime(e)
    }
}

impl<I2CE> From<AlarmError> for DS3231Error<I2CE> {
    fn from(e: AlarmError) -> Self {
        DS3231Error::Alarm(e)
    }
}

impl<I2CE> From<ParseError> for DS3231Error<I2CE> {
    fn from(e: ParseError) -> Self {
        DS3231Error::Parse(e)
    }
}

/// Die temperature from registers 0x11-0x12, 0.25 °C resolution.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureReading {
    /// Whole degrees, two's complement (MSB register)
    pub integer: i8,
    /// Quarter degrees added to `integer`, 0-3 (LSB register bits 7:6)
    pub quarters: u8,
}

impl TemperatureReading {
    pub(crate) fn from_registers(data: [u8; 2]) -> Self {
        Self {
            integer: Temperature(data[0]).temperature(),
            quarters: TemperatureFraction(data[1]).temperature_fraction(),
        }
    }

    /// Temperature in units of 0.25 °C.
    #[must_use]
    pub fn quarter_degrees(&self) -> i16 {
        i16::from(self.integer) * 4 + i16::from(self.quarters)
    }

    /// Temperature in °C.
    #[cfg(feature = "temperature_f32")]
    #[must_use]
    pub fn celsius(&self) -> f32 {
        f32::from(self.integer) + f32::from(self.quarters) * 0.25
    }
}

// Generates the raw register getter and setter pair
/// Longest register block written in one transfer (the date/time registers).
pub(crate) const MAX_BLOCK: usize = 7;

/// Register address followed by `data`, and the payload length.
pub(crate) fn write_frame(start: RegAddr, data: &[u8]) -> ([u8; MAX_BLOCK + 1], usize) {
    debug_assert!(data.len() <= MAX_BLOCK, "{} bytes for {:?}", data.len(), start);
    let len = data.len().min(MAX_BLOCK);
    let mut frame = [0u8; MAX_BLOCK + 1];
    frame[0] = start as u8;
    frame[1..=len].copy_from_slice(&data[..len]);
    (frame, len)
}

macro_rules! set_and_get_register {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        $(
            #[doc = concat!("Reads the raw `", stringify!($typ), "` register.")]
            pub fn $name(&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                let mut data = [0];
                self.read_registers($regaddr, &mut data)?;
                Ok(<$typ>::from(data[0]))
            }

            paste::paste! {
                #[doc = concat!("Writes the raw `", stringify!($typ), "` register.")]
                pub fn [< set_ $name >](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                    self.write_registers($regaddr, &[u8::from(value)])
                }
            }
        )+
    };
}

/// Blocking DS3231 driver.
///
/// Every multi-field update is a read-modify-write of whole registers, so
/// bits the caller did not ask to change keep their value. The driver takes
/// `&mut self` throughout; sharing it between contexts needs an outer lock.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
    epoch_base: u16,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Creates a driver with the default epoch base (2000).
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus implementation
    /// * `address` - The I2C address of the device, usually [`DS3231_ADDRESS`]
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            epoch_base: DEFAULT_EPOCH_BASE,
        }
    }

    /// Calendar year of hardware year 00.
    pub fn epoch_base(&self) -> u16 {
        self.epoch_base
    }

    fn read_registers(
        &mut self,
        start: RegAddr,
        buf: &mut [u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.i2c
            .write_read(self.address, &[start as u8], buf)
            .map_err(DS3231Error::I2c)?;
        trace!("read {:?}: {:?}", start, buf);
        Ok(())
    }

    fn write_registers(&mut self, start: RegAddr, data: &[u8]) -> Result<(), DS3231Error<I2C::Error>> {
        let (frame, len) = write_frame(start, data);
        debug!("write {:?}: {:?}", start, &frame[1..=len]);
        self.i2c
            .write(self.address, &frame[..=len])
            .map_err(DS3231Error::I2c)
    }

    fn update_register<R>(
        &mut self,
        register: RegAddr,
        f: impl FnOnce(&mut R),
    ) -> Result<(), DS3231Error<I2C::Error>>
    where
        R: From<u8>,
        u8: From<R>,
    {
        let mut data = [0];
        self.read_registers(register, &mut data)?;
        let mut value = R::from(data[0]);
        f(&mut value);
        self.write_registers(register, &[u8::from(value)])
    }

    /// Configures the device.
    ///
    /// Applies the control register settings in one read-modify-write, puts
    /// the hours register in 24-hour mode if the chip was left in 12-hour mode
    /// (keeping the current hour), and records the epoch base used for all
    /// later date conversions.
    ///
    /// # Errors
    ///
    /// Bus errors, or [`DS3231Error::DateTime`] if the hours register holds
    /// garbage.
    pub fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |control: &mut Control| config.apply(control))?;

        let hours = self.hour()?;
        if hours.time_representation() == TimeRepresentation::TwelveHour {
            debug!("switching hours register to 24-hour mode");
            self.set_hour(hours_to_24(hours)?)?;
        }
        self.epoch_base = config.epoch_base;
        Ok(())
    }

    /// Reads the current date and time in one 7-byte transfer.
    ///
    /// # Errors
    ///
    /// Bus errors, or [`DS3231Error::DateTime`] if the registers do not hold a
    /// valid date and time.
    pub fn datetime(&mut self) -> Result<CalendarTime, DS3231Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_registers(RegAddr::Seconds, &mut data)?;
        Ok(DS3231DateTime::from(data).into_calendar(self.epoch_base)?)
    }

    /// Sets the date and time.
    ///
    /// The value is validated before any bus traffic. The current block is
    /// read first so the century flag survives, then all 7 registers are
    /// written in one transfer in 24-hour mode.
    ///
    /// # Errors
    ///
    /// [`DS3231Error::DateTime`] for fields out of range or a year outside
    /// `epoch_base..=epoch_base + 99`; bus errors.
    pub fn set_datetime(&mut self, time: &CalendarTime) -> Result<(), DS3231Error<I2C::Error>> {
        let mut raw = DS3231DateTime::from_calendar(time, self.epoch_base).map_err(|e| {
            error!("cannot encode {:?}: {:?}", time, e);
            e
        })?;
        let mut current = [0; 7];
        self.read_registers(RegAddr::Seconds, &mut current)?;
        raw.set_century(DS3231DateTime::from(current).century());
        let data: [u8; 7] = (&raw).into();
        self.write_registers(RegAddr::Seconds, &data)
    }

    /// Parses `HH:MM:SS DD/MM/YY[YY] [W]` and sets the clock.
    ///
    /// # Errors
    ///
    /// [`DS3231Error::Parse`] for malformed text, otherwise as
    /// [`set_datetime`](Self::set_datetime).
    pub fn set_datetime_str(&mut self, text: &str) -> Result<(), DS3231Error<I2C::Error>> {
        let time = parse_calendar_time(text, self.epoch_base)?;
        self.set_datetime(&time)
    }

    fn read_alarm1(&mut self) -> Result<DS3231Alarm1, DS3231Error<I2C::Error>> {
        let mut data = [0; 4];
        self.read_registers(RegAddr::Alarm1Seconds, &mut data)?;
        Ok(DS3231Alarm1::from(data))
    }

    fn write_alarm1(&mut self, alarm: &DS3231Alarm1) -> Result<(), DS3231Error<I2C::Error>> {
        let data: [u8; 4] = alarm.into();
        self.write_registers(RegAddr::Alarm1Seconds, &data)
    }

    fn read_alarm2(&mut self) -> Result<DS3231Alarm2, DS3231Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_registers(RegAddr::Alarm2Minutes, &mut data)?;
        Ok(DS3231Alarm2::from(data))
    }

    fn write_alarm2(&mut self, alarm: &DS3231Alarm2) -> Result<(), DS3231Error<I2C::Error>> {
        let data: [u8; 3] = alarm.into();
        self.write_registers(RegAddr::Alarm2Minutes, &data)
    }

    /// Reads Alarm 1.
    ///
    /// # Errors
    ///
    /// Bus errors, or [`DS3231Error::Alarm`] if an unmasked register holds
    /// an invalid value.
    pub fn alarm1(&mut self) -> Result<AlarmSpec, DS3231Error<I2C::Error>> {
        Ok(self.read_alarm1()?.to_spec()?)
    }

    /// Writes Alarm 1, payload and mask bits.
    ///
    /// # Errors
    ///
    /// [`DS3231Error::Alarm`] for fields out of range; bus errors.
    pub fn set_alarm1(&mut self, spec: &AlarmSpec) -> Result<(), DS3231Error<I2C::Error>> {
        let alarm = DS3231Alarm1::from_spec(spec)?;
        self.write_alarm1(&alarm)
    }

    /// Reads the Alarm 1 mask bits.
    pub fn alarm1_mask(&mut self) -> Result<AlarmMask, DS3231Error<I2C::Error>> {
        Ok(self.read_alarm1()?.mask())
    }

    /// Rewrites the Alarm 1 mask bits, keeping the payload bits as they are.
    pub fn set_alarm1_mask(&mut self, mask: AlarmMask) -> Result<(), DS3231Error<I2C::Error>> {
        let alarm = self.read_alarm1()?.with_mask(mask);
        self.write_alarm1(&alarm)
    }

    /// Parses a `d h m s` mask and applies it to Alarm 1.
    pub fn set_alarm1_mask_str(&mut self, text: &str) -> Result<(), DS3231Error<I2C::Error>> {
        let mask: AlarmMask = text.parse()?;
        self.set_alarm1_mask(mask)
    }

    /// Points Alarm 1 at `target`, keeping its mask bits.
    ///
    /// A target earlier than the chip's current time is taken as an offset
    /// from now (see [`resolve_alarm_target`]). The alarm is written as a
    /// day-of-month alarm and the resolved time is returned.
    ///
    /// # Errors
    ///
    /// Bus errors, [`DS3231Error::DateTime`] if the clock cannot be read, or
    /// [`DS3231Error::Alarm`] if the target cannot be resolved.
    pub fn set_alarm1_at(
        &mut self,
        target: &CalendarTime,
    ) -> Result<CalendarTime, DS3231Error<I2C::Error>> {
        let now = self.datetime()?;
        let (alarm, resolved) = self.read_alarm1()?.retarget(&now, target)?;
        self.write_alarm1(&alarm)?;
        Ok(resolved)
    }

    /// Reads Alarm 2.
    ///
    /// # Errors
    ///
    /// Bus errors, or [`DS3231Error::Alarm`] if an unmasked register holds
    /// an invalid value.
    pub fn alarm2(&mut self) -> Result<AlarmSpec, DS3231Error<I2C::Error>> {
        Ok(self.read_alarm2()?.to_spec()?)
    }

    /// Writes Alarm 2. `spec.second` must be 0.
    ///
    /// # Errors
    ///
    /// [`DS3231Error::Alarm`] for a non-zero second or fields out of range;
    /// bus errors.
    pub fn set_alarm2(&mut self, spec: &AlarmSpec) -> Result<(), DS3231Error<I2C::Error>> {
        let alarm = DS3231Alarm2::from_spec(spec)?;
        self.write_alarm2(&alarm)
    }

    /// Reads the Alarm 2 mask bits.
    pub fn alarm2_mask(&mut self) -> Result<AlarmMask, DS3231Error<I2C::Error>> {
        Ok(self.read_alarm2()?.mask())
    }

    /// Rewrites the Alarm 2 mask bits, keeping the payload bits as they are.
    pub fn set_alarm2_mask(&mut self, mask: AlarmMask) -> Result<(), DS3231Error<I2C::Error>> {
        let alarm = self.read_alarm2()?.with_mask(mask);
        self.write_alarm2(&alarm)
    }

    /// Enables or stops the oscillator on battery power (EOSC).
    pub fn set_oscillator(&mut self, oscillator: Oscillator) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_oscillator_enable(oscillator);
        })
    }

    /// Keeps the square wave running on battery power (BBSQW).
    pub fn set_battery_backed_square_wave(
        &mut self,
        enable: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_battery_backed_square_wave(enable);
        })
    }

    /// Requests a temperature conversion (CONV). Poll [`is_busy`](Self::is_busy)
    /// for completion.
    pub fn start_temperature_conversion(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_convert_temperature(true);
        })
    }

    /// Sets the INT/SQW square wave rate (RS2/RS1).
    pub fn set_square_wave_frequency(
        &mut self,
        frequency: SquareWaveFrequency,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_square_wave_frequency(frequency);
        })
    }

    /// Selects square wave or alarm interrupt output on INT/SQW (INTCN).
    pub fn set_interrupt_control(
        &mut self,
        mode: InterruptControl,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_interrupt_control(mode);
        })
    }

    /// Lets Alarm 1 drive INT/SQW low when it fires (A1IE). Only takes effect
    /// with [`InterruptControl::Interrupt`].
    pub fn set_alarm1_interrupt(&mut self, enable: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_alarm1_interrupt_enable(enable);
        })
    }

    /// Lets Alarm 2 drive INT/SQW low when it fires (A2IE). Only takes effect
    /// with [`InterruptControl::Interrupt`].
    pub fn set_alarm2_interrupt(&mut self, enable: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_alarm2_interrupt_enable(enable);
        })
    }

    /// Writes the whole control register from `EOSC BBSQW CONV RS INTCN A2IE A1IE`
    /// text. Nothing is sent if the text does not parse.
    pub fn set_control_str(&mut self, text: &str) -> Result<(), DS3231Error<I2C::Error>> {
        let control = parse_control(text)?;
        self.set_control(control)
    }

    /// Enables the 32 kHz output pin (EN32kHz).
    pub fn set_output_32khz(&mut self, enable: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::ControlStatus, |s: &mut Status| {
            s.set_enable_32khz_output(enable);
        })
    }

    /// Acknowledges Alarm 1 (clears A1F). Other status bits are written back
    /// as read.
    pub fn clear_alarm1_flag(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::ControlStatus, |s: &mut Status| {
            s.set_alarm1_flag(false);
        })
    }

    /// Acknowledges Alarm 2 (clears A2F). Other status bits are written back
    /// as read.
    pub fn clear_alarm2_flag(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::ControlStatus, |s: &mut Status| {
            s.set_alarm2_flag(false);
        })
    }

    /// BSY: a temperature conversion is running.
    pub fn is_busy(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self.status()?.busy())
    }

    /// OSF: the oscillator stopped at some point, the time may be invalid.
    pub fn oscillator_stopped(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self.status()?.oscillator_stop_flag())
    }

    /// A1F: Alarm 1 matched since its flag was last cleared.
    pub fn alarm1_triggered(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self.status()?.alarm1_flag())
    }

    /// A2F: Alarm 2 matched since its flag was last cleared.
    pub fn alarm2_triggered(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self.status()?.alarm2_flag())
    }

    /// Reads both temperature registers in one transfer.
    pub fn temperature(&mut self) -> Result<TemperatureReading, DS3231Error<I2C::Error>> {
        let mut data = [0; 2];
        self.read_registers(RegAddr::MSBTemp, &mut data)?;
        Ok(TemperatureReading::from_registers(data))
    }

    set_and_get_register!(
        (hour, RegAddr::Hours, Hours),
        (control, RegAddr::Control, Control),
        (status, RegAddr::ControlStatus, Status),
        (aging_offset, RegAddr::AgingOffset, AgingOffset)
    );
}
