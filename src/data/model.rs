use anyhow::{bail, Result};

// ---------------------------------------------------------------------------
// Spectrum – wavelength axis plus one intensity trace
// ---------------------------------------------------------------------------

/// A single spectrum: wavelength axis and matching intensity values.
///
/// Both vectors always have the same length; construct through
/// [`Spectrum::new`] to keep it that way.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    wavelengths: Vec<f64>,
    intensities: Vec<f64>,
}

impl Spectrum {
    /// Pair a wavelength axis with an intensity trace of the same length.
    pub fn new(wavelengths: Vec<f64>, intensities: Vec<f64>) -> Result<Self> {
        if wavelengths.len() != intensities.len() {
            bail!(
                "wavelength axis has {} values but intensity trace has {}",
                wavelengths.len(),
                intensities.len()
            );
        }
        Ok(Self {
            wavelengths,
            intensities,
        })
    }

    /// All-zero intensities over the given axis.
    pub fn zeros(wavelengths: Vec<f64>) -> Self {
        let intensities = vec![0.0; wavelengths.len()];
        Self {
            wavelengths,
            intensities,
        }
    }

    /// Wavelength axis in nm.
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Intensity values in counts.
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// Swap in a new intensity trace, keeping the wavelength axis.
    pub fn set_intensities(&mut self, intensities: Vec<f64>) -> Result<()> {
        if intensities.len() != self.wavelengths.len() {
            bail!(
                "expected {} intensity values, got {}",
                self.wavelengths.len(),
                intensities.len()
            );
        }
        self.intensities = intensities;
        Ok(())
    }

    /// Number of spectral samples.
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    /// Whether the spectrum has no samples.
    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// Iterate `[wavelength, intensity]` pairs, the shape egui_plot expects.
    pub fn points(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.wavelengths
            .iter()
            .zip(self.intensities.iter())
            .map(|(&x, &y)| [x, y])
    }
}

// ---------------------------------------------------------------------------
// Background – intensity baseline subtracted from every live read
// ---------------------------------------------------------------------------

/// Stored intensity baseline. Starts at zero and is replaced wholesale on
/// every capture.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    intensities: Vec<f64>,
}

impl Background {
    pub fn zeros(len: usize) -> Self {
        Self {
            intensities: vec![0.0; len],
        }
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    pub fn len(&self) -> usize {
        self.intensities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensities.is_empty()
    }

    /// Whether the baseline is still all zero.
    pub fn is_zero(&self) -> bool {
        self.intensities.iter().all(|&v| v == 0.0)
    }

    /// Replace the stored baseline with a new one.
    pub fn capture(&mut self, intensities: Vec<f64>) {
        self.intensities = intensities;
    }

    /// Reset to zero, keeping the length.
    pub fn clear(&mut self) {
        self.intensities.iter_mut().for_each(|v| *v = 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectrum_rejects_mismatched_lengths() {
        assert!(Spectrum::new(vec![1.0, 2.0], vec![1.0]).is_err());
        let sp = Spectrum::new(vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();
        assert_eq!(sp.len(), 2);
        assert_eq!(sp.points().collect::<Vec<_>>(), vec![[1.0, 3.0], [2.0, 4.0]]);
    }

    #[test]
    fn set_intensities_keeps_axis() {
        let mut sp = Spectrum::zeros(vec![500.0, 501.0, 502.0]);
        sp.set_intensities(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(sp.wavelengths(), &[500.0, 501.0, 502.0]);
        assert_eq!(sp.intensities(), &[1.0, 2.0, 3.0]);
        assert!(sp.set_intensities(vec![1.0]).is_err());
        assert_eq!(sp.intensities(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn background_capture_replaces_and_clear_zeroes() {
        let mut bg = Background::zeros(3);
        assert!(bg.is_zero());
        bg.capture(vec![1.0, 2.0, 3.0]);
        bg.capture(vec![5.0, 5.0, 5.0]);
        assert_eq!(bg.intensities(), &[5.0, 5.0, 5.0]);
        bg.clear();
        assert!(bg.is_zero());
        assert_eq!(bg.len(), 3);
    }
}
