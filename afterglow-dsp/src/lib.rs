#![no_std]
extern crate alloc;

use alloc::vec::Vec;

#[allow(unused_imports)]
use micromath::F32Ext;

/// Substituted for the dB value of a zero-energy band, where `10 * log10` is
/// undefined. Keeps NaN and -infinity out of everything downstream.
pub const DB_FLOOR: f32 = -999.0;

/// Default stride between consecutive real/imaginary byte pairs in a spectral
/// capture buffer.
pub const DEFAULT_DIVISIONS: usize = 16;

/// Converts raw spectral capture bytes into per-band energy and dB values.
///
/// Scratch arrays form a grow-only arena: a larger capture grows them, a
/// smaller one only narrows the exposed slices. Capacity is monotonically
/// non-decreasing, so a mid-session capture-size change never reallocates
/// frame after frame.
pub struct SpectralProcessor {
    divisions: usize,
    band_count: usize,
    magnitudes: Vec<f32>,
    previous: Vec<f32>,
    db: Vec<f32>,
}

impl SpectralProcessor {
    /// `divisions` is the stride between band pairs and must cover at least
    /// the two bytes of one real/imaginary pair.
    pub fn new(divisions: usize) -> Self {
        assert!(divisions >= 2, "divisions must be at least 2, got {divisions}");
        Self {
            divisions,
            band_count: 0,
            magnitudes: Vec::new(),
            previous: Vec::new(),
            db: Vec::new(),
        }
    }

    /// Processes one spectral capture buffer and returns the band count.
    ///
    /// Even bytes are the real component, odd bytes the imaginary component,
    /// both signed. Band energy is `re*re + im*im` (energy, not amplitude).
    /// The prior frame's energies are copied aside before being overwritten
    /// so rise detection can compare against them.
    pub fn process(&mut self, spectral: &[u8]) -> usize {
        let bands = spectral.len() / self.divisions;
        if bands > self.magnitudes.len() {
            self.magnitudes.resize(bands, 0.0);
            self.previous.resize(bands, 0.0);
            self.db.resize(bands, DB_FLOOR);
        }
        self.band_count = bands;

        for i in 0..bands {
            let re = spectral[self.divisions * i] as i8 as f32;
            let im = spectral[self.divisions * i + 1] as i8 as f32;
            let energy = re * re + im * im;
            self.previous[i] = self.magnitudes[i];
            self.magnitudes[i] = energy;
            self.db[i] = db_from_energy(energy);
        }
        bands
    }

    pub fn divisions(&self) -> usize {
        self.divisions
    }

    pub fn band_count(&self) -> usize {
        self.band_count
    }

    /// Per-band energy for the newest processed frame.
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes[..self.band_count]
    }

    /// Per-band energy from the frame before the newest one. Same length as
    /// [`magnitudes`](Self::magnitudes).
    pub fn previous(&self) -> &[f32] {
        &self.previous[..self.band_count]
    }

    /// Per-band dB for the newest processed frame, floored at [`DB_FLOOR`].
    pub fn db(&self) -> &[f32] {
        &self.db[..self.band_count]
    }
}

/// `10 * log10(energy)`, floored at [`DB_FLOOR`] for zero energy.
pub fn db_from_energy(energy: f32) -> f32 {
    if energy > 0.0 {
        10.0 * energy.log10()
    } else {
        DB_FLOOR
    }
}
