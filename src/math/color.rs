/// sRGB channel (0..1) to linear
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// 0xRRGGBB color to linear RGB
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_white() {
        let rgb = hex_to_linear(0xffffff);
        for c in rgb {
            assert!((c - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_hex_black() {
        assert_eq!(hex_to_linear(0x000000), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_hex_channel_order() {
        let rgb = hex_to_linear(0xff0000);
        assert!((rgb[0] - 1.0).abs() < 1e-6);
        assert_eq!(rgb[1], 0.0);
        assert_eq!(rgb[2], 0.0);
    }

    #[test]
    fn test_srgb_midpoint_is_darker_in_linear() {
        let linear = srgb_to_linear(0.5);
        assert!((linear - 0.214).abs() < 0.001);
    }
}
