//! Signed register codec for the Watlow F4.
//!
//! Temperature registers carry tenths of a degree in an unsigned 16-bit
//! transport field. Negative values go over the wire as the two's complement
//! of the scaled magnitude, which in Rust is just the `i16` bit pattern
//! reinterpreted as `u16` - no string tricks required.

/// Encodes a temperature in degrees into a scaled signed register word.
///
/// The value is scaled by ten and rounded to the nearest tenth; `-10.0`
/// becomes `0xFF9C` (the two's complement of 100).
pub fn encode_signed_tenths(value: f64) -> u16 {
    let scaled = (value * 10.0).round() as i16;
    scaled as u16
}

/// Decodes a scaled signed register word into degrees.
pub fn decode_signed_tenths(word: u16) -> f64 {
    f64::from(word as i16) / 10.0
}

/// Reinterprets a raw register word as a two's-complement 16-bit integer.
pub fn decode_signed(word: u16) -> i16 {
    word as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_values_pass_through_scaled() {
        assert_eq!(encode_signed_tenths(25.0), 250);
        assert_eq!(encode_signed_tenths(0.0), 0);
        assert_eq!(decode_signed_tenths(250), 25.0);
    }

    #[test]
    fn negative_values_are_twos_complement() {
        // NOT(100) + 1 over 16 bits
        assert_eq!(encode_signed_tenths(-10.0), 0xFF9C);
        assert_eq!(decode_signed_tenths(0xFF9C), -10.0);
        assert_eq!(encode_signed_tenths(-0.1), 0xFFFF);
    }

    #[test]
    fn round_trip_over_full_setpoint_range() {
        // Every representable tenth in [-99.9, 99.9] survives the trip.
        for tenths in -999i32..=999 {
            let value = f64::from(tenths) / 10.0;
            let word = encode_signed_tenths(value);
            assert_eq!(
                decode_signed_tenths(word),
                value,
                "round trip failed for {value}"
            );
        }
    }

    #[test]
    fn decode_signed_matches_twos_complement_interpretation() {
        assert_eq!(decode_signed(0), 0);
        assert_eq!(decode_signed(0x7FFF), 32767);
        assert_eq!(decode_signed(0x8000), -32768);
        assert_eq!(decode_signed(0xFFFF), -1);
    }
}
