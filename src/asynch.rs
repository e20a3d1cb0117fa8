//! Async implementation of the DS3231 driver.
//!
//! The same operations as the blocking [`crate::DS3231`], over
//! `embedded-hal-async` I2C. Only available with the `async` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use zs042_rtc::asynch::DS3231;
//!
//! let mut rtc = DS3231::new(i2c, zs042_rtc::DS3231_ADDRESS);
//! rtc.configure(&config).await?;
//! let now = rtc.datetime().await?;
//! rtc.set_alarm1_at(&target).await?;
//! ```

use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::datetime::hours_to_24;
use crate::write_frame;
use crate::{
    parse_calendar_time, parse_control, AgingOffset, AlarmMask, AlarmSpec, CalendarTime, Config, Control,
    DS3231Alarm1, DS3231Alarm2, DS3231DateTime, DS3231Error, Hours, InterruptControl, Oscillator,
    RegAddr, SquareWaveFrequency, Status, TemperatureReading, TimeRepresentation,
    DEFAULT_EPOCH_BASE,
};

/// DS3231 Real-Time Clock async driver.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
    epoch_base: u16,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Creates a new DS3231 async driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The async I2C bus implementation
    /// * `address` - The I2C address of the device (typically 0x68)
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

    async fn read_registers(
        &mut self,
        start: RegAddr,
        buf: &mut [u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.i2c
            .write_read(self.address, &[start as u8], buf)
            .await
            .map_err(DS3231Error::I2c)?;
        trace!("read {:?}: {:?}", start, buf);
        Ok(())
    }

    async fn write_registers(
        &mut self,
        start: RegAddr,
        data: &[u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let (frame, len) = write_frame(start, data);
        debug!("write {:?}: {:?}", start, &frame[1..=len]);
        self.i2c
            .write(self.address, &frame[..=len])
            .await
            .map_err(DS3231Error::I2c)
    }

    async fn update_register<R>(
        &mut self,
        register: RegAddr,
        f: impl FnOnce(&mut R),
    ) -> Result<(), DS3231Error<I2C::Error>>
    where
        R: From<u8>,
        u8: From<R>,
    {
        let mut data = [0];
        self.read_registers(register, &mut data).await?;
        let mut value = R::from(data[0]);
        f(&mut value);
        self.write_registers(register, &[u8::from(value)]).await
    }

    /// Configures the device according to the provided configuration.
    ///
    /// # Arguments
    /// * `config` - The configuration to apply
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error)` on error
    pub async fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |control: &mut Control| config.apply(control))
            .await?;

        let hours = self.hour().await?;
        if hours.time_representation() == TimeRepresentation::TwelveHour {
            debug!("switching hours register to 24-hour mode");
            self.set_hour(hours_to_24(hours)?).await?;
        }
        self.epoch_base = config.epoch_base;
        Ok(())
    }

    /// Gets the current date and time from the device.
    ///
    /// # Returns
    /// * `Ok(CalendarTime)` - The current date and time
    /// * `Err(DS3231Error)` on bus error or corrupt registers
    pub async fn datetime(&mut self) -> Result<CalendarTime, DS3231Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_registers(RegAddr::Seconds, &mut data).await?;
        Ok(DS3231DateTime::from(data).into_calendar(self.epoch_base)?)
    }

    /// Sets the current date and time on the device, keeping the century flag.
    ///
    /// # Arguments
    /// * `time` - The date and time to set
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error)` on error; nothing is written if `time` is invalid
    pub async fn set_datetime(
        &mut self,
        time: &CalendarTime,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let mut raw = DS3231DateTime::from_calendar(time, self.epoch_base).map_err(|e| {
            error!("cannot encode {:?}: {:?}", time, e);
            e
        })?;
        let mut current = [0; 7];
        self.read_registers(RegAddr::Seconds, &mut current).await?;
        raw.set_century(DS3231DateTime::from(current).century());
        let data: [u8; 7] = (&raw).into();
        self.write_registers(RegAddr::Seconds, &data).await
    }

    /// Parses `HH:MM:SS DD/MM/YY[YY] [W]` and sets the clock.
    pub async fn set_datetime_str(&mut self, text: &str) -> Result<(), DS3231Error<I2C::Error>> {
        let time = parse_calendar_time(text, self.epoch_base)?;
        self.set_datetime(&time).await
    }

    async fn read_alarm1(&mut self) -> Result<DS3231Alarm1, DS3231Error<I2C::Error>> {
        let mut data = [0; 4];
        self.read_registers(RegAddr::Alarm1Seconds, &mut data).await?;
        Ok(DS3231Alarm1::from(data))
    }

    async fn write_alarm1(&mut self, alarm: &DS3231Alarm1) -> Result<(), DS3231Error<I2C::Error>> {
        let data: [u8; 4] = alarm.into();
        self.write_registers(RegAddr::Alarm1Seconds, &data).await
    }

    async fn read_alarm2(&mut self) -> Result<DS3231Alarm2, DS3231Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_registers(RegAddr::Alarm2Minutes, &mut data).await?;
        Ok(DS3231Alarm2::from(data))
    }

    async fn write_alarm2(&mut self, alarm: &DS3231Alarm2) -> Result<(), DS3231Error<I2C::Error>> {
        let data: [u8; 3] = alarm.into();
        self.write_registers(RegAddr::Alarm2Minutes, &data).await
    }

    /// Reads Alarm 1.
    pub async fn alarm1(&mut self) -> Result<AlarmSpec, DS3231Error<I2C::Error>> {
        Ok(self.read_alarm1().await?.to_spec()?)
    }

    /// Writes Alarm 1, payload and mask bits.
    pub async fn set_alarm1(&mut self, spec: &AlarmSpec) -> Result<(), DS3231Error<I2C::Error>> {
        let alarm = DS3231Alarm1::from_spec(spec)?;
        self.write_alarm1(&alarm).await
    }

    /// Reads the Alarm 1 mask bits.
    ///
    /// # Returns
    /// * `Ok(AlarmMask)` - Day, hour, minute and second mask bits
    /// * `Err(DS3231Error)` on error
    pub async fn alarm1_mask(&mut self) -> Result<AlarmMask, DS3231Error<I2C::Error>> {
        Ok(self.read_alarm1().await?.mask())
    }

    /// Rewrites the Alarm 1 mask bits, keeping the payload bits as they are.
    pub async fn set_alarm1_mask(
        &mut self,
        mask: AlarmMask,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let alarm = self.read_alarm1().await?.with_mask(mask);
        self.write_alarm1(&alarm).await
    }

    /// Parses a `d h m s` mask and applies it to Alarm 1.
    pub async fn set_alarm1_mask_str(&mut self, text: &str) -> Result<(), DS3231Error<I2C::Error>> {
        let mask: AlarmMask = text.parse()?;
        self.set_alarm1_mask(mask).await
    }

    /// Points Alarm 1 at `target`, keeping its mask bits. A target before the
    /// chip's current time is taken as an offset from now; see
    /// [`crate::resolve_alarm_target`].
    ///
    /// # Returns
    /// * `Ok(CalendarTime)` - The resolved alarm time
    /// * `Err(DS3231Error)` on error
    pub async fn set_alarm1_at(
        &mut self,
        target: &CalendarTime,
    ) -> Result<CalendarTime, DS3231Error<I2C::Error>> {
        let now = self.datetime().await?;
        let (alarm, resolved) = self.read_alarm1().await?.retarget(&now, target)?;
        self.write_alarm1(&alarm).await?;
        Ok(resolved)
    }

    /// Reads Alarm 2.
    pub async fn alarm2(&mut self) -> Result<AlarmSpec, DS3231Error<I2C::Error>> {
        Ok(self.read_alarm2().await?.to_spec()?)
    }

    /// Writes Alarm 2. `spec.second` must be 0.
    pub async fn set_alarm2(&mut self, spec: &AlarmSpec) -> Result<(), DS3231Error<I2C::Error>> {
        let alarm = DS3231Alarm2::from_spec(spec)?;
        self.write_alarm2(&alarm).await
    }

    /// Reads the Alarm 2 mask bits. The second bit is always clear.
    ///
    /// # Returns
    /// * `Ok(AlarmMask)` - Day, hour and minute mask bits
    /// * `Err(DS3231Error)` on error
    pub async fn alarm2_mask(&mut self) -> Result<AlarmMask, DS3231Error<I2C::Error>> {
        Ok(self.read_alarm2().await?.mask())
    }

    /// Rewrites the Alarm 2 mask bits, keeping the payload bits as they are.
    pub async fn set_alarm2_mask(
        &mut self,
        mask: AlarmMask,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let alarm = self.read_alarm2().await?.with_mask(mask);
        self.write_alarm2(&alarm).await
    }

    /// Enables or stops the oscillator on battery power (EOSC).
    ///
    /// # Arguments
    /// * `oscillator` - [`Oscillator::Disabled`] stops the clock on battery
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error)` on error
    pub async fn set_oscillator(
        &mut self,
        oscillator: Oscillator,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_oscillator_enable(oscillator);
        })
        .await
    }

    /// Keeps the square wave running on battery power (BBSQW).
    ///
    /// # Arguments
    /// * `enable` - `true` to run the square wave on battery
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error)` on error
    pub async fn set_battery_backed_square_wave(
        &mut self,
        enable: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_battery_backed_square_wave(enable);
        })
        .await
    }

    /// Requests a temperature conversion; poll [`is_busy`](Self::is_busy).
    pub async fn start_temperature_conversion(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_convert_temperature(true);
        })
        .await
    }

    /// Sets the INT/SQW square wave rate (RS2/RS1).
    ///
    /// # Arguments
    /// * `frequency` - Output rate, used when INTCN selects the square wave
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error)` on error
    pub async fn set_square_wave_frequency(
        &mut self,
        frequency: SquareWaveFrequency,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_square_wave_frequency(frequency);
        })
        .await
    }

    /// Selects square wave or alarm interrupt output on INT/SQW (INTCN).
    ///
    /// # Arguments
    /// * `mode` - Pin function
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error)` on error
    pub async fn set_interrupt_control(
        &mut self,
        mode: InterruptControl,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_interrupt_control(mode);
        })
        .await
    }

    /// Lets Alarm 1 drive INT/SQW low when it fires (A1IE).
    ///
    /// # Arguments
    /// * `enable` - `true` to enable the interrupt
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error)` on error
    pub async fn set_alarm1_interrupt(
        &mut self,
        enable: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_alarm1_interrupt_enable(enable);
        })
        .await
    }

    /// Lets Alarm 2 drive INT/SQW low when it fires (A2IE).
    ///
    /// # Arguments
    /// * `enable` - `true` to enable the interrupt
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error)` on error
    pub async fn set_alarm2_interrupt(
        &mut self,
        enable: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::Control, |c: &mut Control| {
            c.set_alarm2_interrupt_enable(enable);
        })
        .await
    }

    /// Writes the whole control register from `EOSC BBSQW CONV RS INTCN A2IE A1IE`
    /// text.
    pub async fn set_control_str(&mut self, text: &str) -> Result<(), DS3231Error<I2C::Error>> {
        let control = parse_control(text)?;
        self.set_control(control).await
    }

    /// Enables the 32 kHz output pin (EN32kHz), writing the other status bits
    /// back as read.
    ///
    /// # Arguments
    /// * `enable` - `true` to drive the 32K pin
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error)` on error
    pub async fn set_output_32khz(&mut self, enable: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::ControlStatus, |s: &mut Status| {
            s.set_enable_32khz_output(enable);
        })
        .await
    }

    /// Acknowledges Alarm 1, writing the other status bits back as read.
    pub async fn clear_alarm1_flag(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::ControlStatus, |s: &mut Status| {
            s.set_alarm1_flag(false);
        })
        .await
    }

    /// Acknowledges Alarm 2, writing the other status bits back as read.
    pub async fn clear_alarm2_flag(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.update_register(RegAddr::ControlStatus, |s: &mut Status| {
            s.set_alarm2_flag(false);
        })
        .await
    }

    /// Checks whether a temperature conversion is running (BSY).
    ///
    /// # Returns
    /// * `Ok(bool)` - `true` while busy
    /// * `Err(DS3231Error)` on error
    pub async fn is_busy(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self.status().await?.busy())
    }

    /// Checks the oscillator stop flag (OSF). When set, the time may be
    /// invalid.
    ///
    /// # Returns
    /// * `Ok(bool)` - `true` if the oscillator stopped at some point
    /// * `Err(DS3231Error)` on error
    pub async fn oscillator_stopped(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self.status().await?.oscillator_stop_flag())
    }

    /// Checks whether Alarm 1 has matched (A1F).
    ///
    /// # Returns
    /// * `Ok(bool)` - `true` until the flag is cleared
    /// * `Err(DS3231Error)` on error
    pub async fn alarm1_triggered(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self.status().await?.alarm1_flag())
    }

    /// Checks whether Alarm 2 has matched (A2F).
    ///
    /// # Returns
    /// * `Ok(bool)` - `true` until the flag is cleared
    /// * `Err(DS3231Error)` on error
    pub async fn alarm2_triggered(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self.status().await?.alarm2_flag())
    }

    /// Reads both temperature registers in one transfer.
    pub async fn temperature(&mut self) -> Result<TemperatureReading, DS3231Error<I2C::Error>> {
        let mut data = [0; 2];
        self.read_registers(RegAddr::MSBTemp, &mut data).await?;
        Ok(TemperatureReading::from_registers(data))
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> DS3231<I2C> {
            $(
                paste! {
                    #[doc = concat!("Gets the value of the ", stringify!($name), " register.")]
                    pub async fn $name(&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                        let mut data = [0];
                        self.read_registers($regaddr, &mut data).await?;
                        Ok(<$typ>::from(data[0]))
                    }

                    #[doc = concat!("Sets the value of the ", stringify!($name), " register.")]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                        self.write_registers($regaddr, &[u8::from(value)]).await
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (hour, RegAddr::Hours, Hours),
    (control, RegAddr::Control, Control),
    (status, RegAddr::ControlStatus, Status),
    (aging_offset, RegAddr::AgingOffset, AgingOffset)
);

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use crate::{AlarmDay, DS3231DateTimeError};
    use alloc::vec;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = 0x68;

    async fn setup_mock(expectations: &[I2cTrans]) -> I2cMock {
        I2cMock::new(expectations)
    }

    #[tokio::test]
    async fn test_async_configure() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x1C]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x04]),
            // 12 AM in 12-hour mode
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Hours as u8], vec![0x52]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Hours as u8, 0x00]),
        ])
        .await;

        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);
        dev.configure(&Config::default()).await.unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_read_datetime() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0x30, 0x15, 0x14, 0x03, 0x25, 0x09, 0x25],
        )])
        .await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let dt = dev.datetime().await.unwrap();
        assert_eq!(dt.hour, 14);
        assert_eq!(dt.minute, 15);
        assert_eq!(dt.second, 30);
        assert_eq!(dt.day, 25);
        assert_eq!(dt.month, 9);
        assert_eq!(dt.year, 2025);
        assert_eq!(dt.weekday, 3);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_set_datetime() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Seconds as u8], vec![0x80; 7]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![
                    RegAddr::Seconds as u8,
                    0x00, // seconds
                    0x30, // minutes
                    0x15, // hours, 24-hour mode
                    0x05, // day (Thursday)
                    0x14, // date
                    0x83, // month, century flag kept
                    0x24, // year
                ],
            ),
        ])
        .await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        dev.set_datetime_str("15:30:00 14/03/24").await.unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_set_datetime_rejects_invalid() {
        let mock = setup_mock(&[]).await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);
        let time = CalendarTime {
            year: 2024,
            month: 2,
            day: 30,
            weekday: 1,
            hour: 0,
            minute: 0,
            second: 0,
        };
        assert_eq!(
            dev.set_datetime(&time).await,
            Err(DS3231Error::DateTime(DS3231DateTimeError::InvalidDate))
        );
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_status_flags() {
        let mock = setup_mock(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0b1000_1111],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ControlStatus as u8, 0b1000_1101]),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0b1000_1101],
            ),
        ])
        .await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        dev.clear_alarm2_flag().await.unwrap();
        assert!(dev.alarm1_triggered().await.unwrap());
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_alarms() {
        let mock = setup_mock(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Seconds as u8],
                vec![0x30, 0x15, 0x14, 0x03, 0x25, 0x09, 0x25],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Alarm1Seconds as u8],
                vec![0x00, 0x00, 0x00, 0x80],
            ),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::Alarm1Seconds as u8, 0x00, 0x30, 0x14, 0xA5],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Alarm2Minutes as u8],
                vec![0x30, 0x07, 0xC2],
            ),
        ])
        .await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let target = CalendarTime::new(2025, 9, 25, 14, 30, 0).unwrap();
        assert_eq!(dev.set_alarm1_at(&target).await.unwrap(), target);
        let alarm2 = dev.alarm2().await.unwrap();
        assert_eq!(alarm2.day, AlarmDay::Weekday(2));
        assert_eq!(alarm2.mask, AlarmMask::MATCH_TIME);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_read_temperature() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::MSBTemp as u8],
            vec![0x19, 0x60],
        )])
        .await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let temp = dev.temperature().await.unwrap();
        assert_eq!(temp.integer, 25);
        assert_eq!(temp.quarters, 1);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_register_operations() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x1C]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x3C]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x86]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::AgingOffset as u8], vec![0x7F]),
        ])
        .await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let control = dev.control().await.unwrap();
        assert_eq!(control.oscillator_enable(), Oscillator::Enabled);
        assert_eq!(control.square_wave_frequency(), SquareWaveFrequency::Hz8192);
        let mut control = control;
        control.set_convert_temperature(true);
        dev.set_control(control).await.unwrap();
        dev.set_control_str("1/0/0/0/1/1/0").await.unwrap();
        assert_eq!(dev.aging_offset().await.unwrap().aging_offset(), 127);
        dev.i2c.done();
    }
}
