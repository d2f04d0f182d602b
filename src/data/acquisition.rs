use std::time::{Duration, Instant};

use crate::data::model::{Background, Spectrum};
use crate::device::{DeviceError, Spectrometer};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// User controls that feed each acquisition tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionSettings {
    /// Exposure per read in milliseconds.
    pub integration_time_ms: f64,
    /// Number of reads averaged per tick (values below 1 count as 1).
    pub averaging: u32,
}

impl AcquisitionSettings {
    /// Integration time as the device wants it.
    pub fn integration_time_micros(&self) -> u64 {
        (self.integration_time_ms.max(0.0) * 1000.0).round() as u64
    }

    pub fn averaging_count(&self) -> usize {
        self.averaging.max(1) as usize
    }
}

// ---------------------------------------------------------------------------
// Numeric core
// ---------------------------------------------------------------------------

/// Element-wise arithmetic mean of `count` independent reads.
pub fn average_reads(
    device: &mut dyn Spectrometer,
    count: usize,
) -> Result<Vec<f64>, DeviceError> {
    let count = count.max(1);
    let mut sum = device.intensities()?;
    if sum.is_empty() {
        return Err(DeviceError::EmptyRead);
    }
    for _ in 1..count {
        let read = device.intensities()?;
        if read.len() != sum.len() {
            return Err(DeviceError::LengthMismatch {
                expected: sum.len(),
                actual: read.len(),
            });
        }
        for (s, v) in sum.iter_mut().zip(read) {
            *s += v;
        }
    }
    let n = count as f64;
    sum.iter_mut().for_each(|s| *s /= n);
    Ok(sum)
}

/// `intensities - background`, element-wise.
pub fn subtract_background(
    mut intensities: Vec<f64>,
    background: &Background,
) -> Result<Vec<f64>, DeviceError> {
    if background.len() != intensities.len() {
        return Err(DeviceError::LengthMismatch {
            expected: background.len(),
            actual: intensities.len(),
        });
    }
    for (v, b) in intensities.iter_mut().zip(background.intensities()) {
        *v -= b;
    }
    Ok(intensities)
}

/// Average, then subtract the background. No state besides the inputs.
pub fn acquire(
    device: &mut dyn Spectrometer,
    settings: &AcquisitionSettings,
    background: &Background,
) -> Result<Vec<f64>, DeviceError> {
    let averaged = average_reads(device, settings.averaging_count())?;
    subtract_background(averaged, background)
}

// ---------------------------------------------------------------------------
// Per-tick cycle
// ---------------------------------------------------------------------------

/// Runs one acquisition per tick. Only remembers which integration time was
/// last pushed to the device.
#[derive(Debug, Default)]
pub struct AcquisitionCycle {
    applied_integration_us: Option<u64>,
}

impl AcquisitionCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied_integration_us(&self) -> Option<u64> {
        self.applied_integration_us
    }

    /// Push the integration time if it differs from what the device has.
    pub fn sync_integration_time(
        &mut self,
        device: &mut dyn Spectrometer,
        settings: &AcquisitionSettings,
    ) -> Result<(), DeviceError> {
        let micros = settings.integration_time_micros();
        if self.applied_integration_us != Some(micros) {
            log::debug!("Setting integration time to {micros} µs");
            device.set_integration_time_micros(micros)?;
            self.applied_integration_us = Some(micros);
        }
        Ok(())
    }

    /// One tick: sync integration time, acquire, write into `live`.
    ///
    /// On error `live` is left untouched.
    pub fn tick(
        &mut self,
        device: &mut dyn Spectrometer,
        settings: &AcquisitionSettings,
        background: &Background,
        live: &mut Spectrum,
    ) -> Result<(), DeviceError> {
        self.sync_integration_time(device, settings)?;
        let corrected = acquire(device, settings, background)?;
        let actual = corrected.len();
        live.set_intensities(corrected)
            .map_err(|_| DeviceError::LengthMismatch {
                expected: live.len(),
                actual,
            })
    }
}

// ---------------------------------------------------------------------------
// Tick scheduling
// ---------------------------------------------------------------------------

/// Fixed-period timer polled from the UI loop.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    last: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// True (and re-arms) when a full interval has passed since the last
    /// firing. The first poll always fires.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Time left until the next firing.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::testing::ScriptedSpectrometer;

    fn settings(averaging: u32) -> AcquisitionSettings {
        AcquisitionSettings {
            integration_time_ms: 10.0,
            averaging,
        }
    }

    #[test]
    fn average_is_elementwise_mean() {
        let mut dev = ScriptedSpectrometer::constant(3, 0.0);
        dev.push_read(vec![1.0, 2.0, 3.0]);
        dev.push_read(vec![3.0, 4.0, 5.0]);
        dev.push_read(vec![5.0, 9.0, 1.0]);
        let avg = average_reads(&mut dev, 3).unwrap();
        assert_eq!(avg, vec![3.0, 5.0, 3.0]);
        assert_eq!(dev.read_count, 3);
    }

    #[test]
    fn averaging_zero_means_single_read() {
        let mut dev = ScriptedSpectrometer::constant(2, 7.0);
        let avg = average_reads(&mut dev, 0).unwrap();
        assert_eq!(avg, vec![7.0, 7.0]);
        assert_eq!(dev.read_count, 1);
    }

    #[test]
    fn mismatched_read_is_an_error() {
        let mut dev = ScriptedSpectrometer::constant(2, 1.0);
        dev.push_read(vec![1.0, 1.0]);
        dev.push_read(vec![1.0]);
        assert!(matches!(
            average_reads(&mut dev, 2),
            Err(DeviceError::LengthMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn constant_device_zero_background_is_constant() {
        let mut dev = ScriptedSpectrometer::constant(5, 100.0);
        let out = acquire(&mut dev, &settings(1), &Background::zeros(5)).unwrap();
        assert_eq!(out, vec![100.0; 5]);
    }

    #[test]
    fn background_captured_at_100_then_150_gives_50() {
        let mut dev = ScriptedSpectrometer::constant(4, 100.0);
        let mut bg = Background::zeros(4);
        bg.capture(dev.intensities().unwrap());
        dev.set_constant(150.0);
        let out = acquire(&mut dev, &settings(3), &bg).unwrap();
        assert_eq!(out, vec![50.0; 4]);

        // Re-capture replaces rather than accumulates.
        bg.capture(dev.intensities().unwrap());
        let out = acquire(&mut dev, &settings(1), &bg).unwrap();
        assert_eq!(out, vec![0.0; 4]);
    }

    #[test]
    fn integration_time_pushed_only_on_change() {
        let mut dev = ScriptedSpectrometer::constant(2, 1.0);
        let mut cycle = AcquisitionCycle::new();
        let mut live = Spectrum::zeros(dev.wavelengths.clone());
        let bg = Background::zeros(2);
        let mut s = settings(1);
        cycle.tick(&mut dev, &s, &bg, &mut live).unwrap();
        cycle.tick(&mut dev, &s, &bg, &mut live).unwrap();
        s.integration_time_ms = 2.5;
        cycle.tick(&mut dev, &s, &bg, &mut live).unwrap();
        assert_eq!(dev.integration_pushes, vec![10_000, 2_500]);
        assert_eq!(cycle.applied_integration_us(), Some(2_500));
    }

    #[test]
    fn failed_tick_keeps_previous_live_spectrum() {
        let mut dev = ScriptedSpectrometer::constant(2, 10.0);
        let mut cycle = AcquisitionCycle::new();
        let mut live = Spectrum::zeros(dev.wavelengths.clone());
        let bg = Background::zeros(2);
        cycle.tick(&mut dev, &settings(1), &bg, &mut live).unwrap();
        dev.push_failure();
        assert!(cycle.tick(&mut dev, &settings(1), &bg, &mut live).is_err());
        assert_eq!(live.intensities(), &[10.0, 10.0]);
    }

    #[test]
    fn ticker_fires_once_per_interval() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_millis(50));
        assert!(ticker.due(start));
        assert!(!ticker.due(start + Duration::from_millis(20)));
        assert_eq!(
            ticker.remaining(start + Duration::from_millis(20)),
            Duration::from_millis(30)
        );
        assert!(ticker.due(start + Duration::from_millis(50)));
        assert!(!ticker.due(start + Duration::from_millis(99)));
        assert!(ticker.due(start + Duration::from_millis(100)));
    }
}
