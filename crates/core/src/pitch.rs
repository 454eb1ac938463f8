use serde::Serialize;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const A4_HZ: f64 = 440.0;
const A4_MIDI: f64 = 69.0;

/// Nearest equal-tempered note for a detected frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PitchReading {
    pub frequency_hz: f64,
    pub note: &'static str,
    pub octave: i32,
    /// Signed distance from the named note, in cents (-50..=50).
    pub cents: f64,
}

impl PitchReading {
    /// Returns `None` for non-finite or non-positive frequencies.
    #[must_use]
    pub fn from_frequency(frequency_hz: f64) -> Option<Self> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return None;
        }
        let midi = A4_MIDI + 12.0 * (frequency_hz / A4_HZ).log2();
        let nearest = midi.round();
        #[allow(clippy::cast_possible_truncation)]
        let nearest_int = nearest as i64;
        let index = usize::try_from(nearest_int.rem_euclid(12)).ok()?;
        let octave = i32::try_from(nearest_int.div_euclid(12) - 1).ok()?;
        Some(Self {
            frequency_hz,
            note: NOTE_NAMES[index],
            octave,
            cents: (midi - nearest) * 100.0,
        })
    }

    /// e.g. `A4`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{}", self.note, self.octave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concert_a() {
        let reading = PitchReading::from_frequency(440.0).unwrap();
        assert_eq!(reading.label(), "A4");
        assert!(reading.cents.abs() < 1e-9);
    }

    #[test]
    fn guitar_low_e_and_middle_c() {
        assert_eq!(PitchReading::from_frequency(82.41).unwrap().label(), "E2");
        assert_eq!(PitchReading::from_frequency(261.63).unwrap().label(), "C4");
    }

    #[test]
    fn reports_cents_offset() {
        let sharp = PitchReading::from_frequency(446.0).unwrap();
        assert_eq!(sharp.note, "A");
        assert!(sharp.cents > 20.0 && sharp.cents < 25.0);
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(PitchReading::from_frequency(0.0).is_none());
        assert!(PitchReading::from_frequency(-3.0).is_none());
        assert!(PitchReading::from_frequency(f64::NAN).is_none());
    }
}
