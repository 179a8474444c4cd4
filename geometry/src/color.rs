use bytemuck::{Pod, Zeroable};

/// A linear RGBA color with f32 components in the range 0 to 1.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(red, green, blue, 1.0)
    }

    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            alpha,
            red,
            green,
            blue,
        }
    }

    /// Quantize to 8 bits per channel. Out of range components are clamped.
    pub fn to_rgba8(self) -> Rgba8 {
        fn quantize(v: f32) -> u8 {
            (v * 255.0).round().clamp(0.0, 255.0) as u8
        }

        Rgba8([
            quantize(self.red),
            quantize(self.green),
            quantize(self.blue),
            quantize(self.alpha),
        ])
    }
}

/// A color packed into 4 bytes, in RGBA order.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Pod, Zeroable)]
pub struct Rgba8(pub [u8; 4]);

impl Rgba8 {
    pub const WHITE: Self = Self([0xff, 0xff, 0xff, 0xff]);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }
}
