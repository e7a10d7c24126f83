//! Conversion between layer IDs and the flat colors
//! used to paint them on the hit surface.
//!
//! The default scheme doubles the ID and spreads the resulting
//! 24-bit value over the red, green, and blue channels. Only even
//! values are ever produced, so any odd color (an anti-aliased edge,
//! a stray pixel drawn by other means) decodes to the sentinel `0`.

use std::fmt;

/// The largest layer ID that survives a round trip through the default codec.
pub const MAX_LAYER_ID: u32 = (1 << 23) - 1;

const CHANNEL_MASK: u32 = 0xff_ffff;

/// Encodes a layer ID as an RGB triplet.
///
/// IDs above [`MAX_LAYER_ID`] wrap around.
pub fn id_to_color(id: u32) -> [u8; 3] {
    let value = id.wrapping_mul(2) & CHANNEL_MASK;
    [(value >> 16) as u8, (value >> 8) as u8, value as u8]
}

/// Decodes an RGB triplet into a layer ID.
///
/// Returns `0` for colors that [`id_to_color`] never produces.
pub fn color_to_id(rgb: [u8; 3]) -> u32 {
    let [r, g, b] = rgb;
    let value = (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
    if value % 2 == 0 {
        value / 2
    } else {
        0
    }
}

/// A scheme for allocating hit colors to layer IDs.
pub trait Codec {
    fn id_to_color(&self, id: u32) -> [u8; 3];

    fn color_to_id(&self, rgb: [u8; 3]) -> u32;
}

/// The default codec. See the [module docs](self).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultCodec;

impl Codec for DefaultCodec {
    fn id_to_color(&self, id: u32) -> [u8; 3] {
        id_to_color(id)
    }

    fn color_to_id(&self, rgb: [u8; 3]) -> u32 {
        color_to_id(rgb)
    }
}

type EncodeFn = Box<dyn Fn(u32) -> [u8; 3]>;
type DecodeFn = Box<dyn Fn([u8; 3]) -> u32>;

/// Replaces one or both directions of the default codec.
///
/// Useful to keep hit colors clear of a reserved palette.
/// A direction left unset falls back to [`DefaultCodec`].
#[derive(Default)]
pub struct CodecOverrides {
    id_to_color: Option<EncodeFn>,
    color_to_id: Option<DecodeFn>,
}

impl CodecOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the encoding direction.
    pub fn encode_with(mut self, encode: impl Fn(u32) -> [u8; 3] + 'static) -> Self {
        self.id_to_color = Some(Box::new(encode));
        self
    }

    /// Overrides the decoding direction.
    pub fn decode_with(mut self, decode: impl Fn([u8; 3]) -> u32 + 'static) -> Self {
        self.color_to_id = Some(Box::new(decode));
        self
    }
}

impl Codec for CodecOverrides {
    fn id_to_color(&self, id: u32) -> [u8; 3] {
        match &self.id_to_color {
            Some(encode) => encode(id),
            None => id_to_color(id),
        }
    }

    fn color_to_id(&self, rgb: [u8; 3]) -> u32 {
        match &self.color_to_id {
            Some(decode) => decode(rgb),
            None => color_to_id(rgb),
        }
    }
}

impl fmt::Debug for CodecOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecOverrides")
            .field("id_to_color", &self.id_to_color.is_some())
            .field("color_to_id", &self.color_to_id.is_some())
            .finish()
    }
}

/// A codec built from a pair of functions.
#[derive(Copy, Clone, Debug)]
pub struct FnCodec<E, D> {
    encode: E,
    decode: D,
}

/// Creates a codec from an encoding and a decoding function.
pub fn from_fns<E, D>(encode: E, decode: D) -> FnCodec<E, D>
where
    E: Fn(u32) -> [u8; 3],
    D: Fn([u8; 3]) -> u32,
{
    FnCodec { encode, decode }
}

impl<E, D> Codec for FnCodec<E, D>
where
    E: Fn(u32) -> [u8; 3],
    D: Fn([u8; 3]) -> u32,
{
    fn id_to_color(&self, id: u32) -> [u8; 3] {
        (self.encode)(id)
    }

    fn color_to_id(&self, rgb: [u8; 3]) -> u32 {
        (self.decode)(rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_all_ids() {
        for id in 0..=MAX_LAYER_ID {
            assert_eq!(color_to_id(id_to_color(id)), id);
        }
    }

    #[test]
    fn distinct_ids_have_distinct_colors() {
        // Round-tripping implies injectivity, but check neighbors explicitly.
        for _ in 0..10_000 {
            let id = fastrand::u32(0..MAX_LAYER_ID);
            assert_ne!(id_to_color(id), id_to_color(id + 1));
        }
        assert_ne!(id_to_color(0), id_to_color(MAX_LAYER_ID));
    }

    #[test]
    fn channel_layout() {
        assert_eq!(id_to_color(0), [0, 0, 0]);
        assert_eq!(id_to_color(1), [0, 0, 2]);
        assert_eq!(id_to_color(128), [0, 1, 0]);
        assert_eq!(id_to_color(42), [0, 0, 84]);
        assert_eq!(id_to_color(MAX_LAYER_ID), [255, 255, 254]);
    }

    #[test]
    fn odd_colors_decode_to_sentinel() {
        assert_eq!(color_to_id([0, 0, 1]), 0);
        assert_eq!(color_to_id([255, 255, 255]), 0);
        assert_eq!(color_to_id([1, 0, 0]), 32768);
    }

    #[test]
    fn arbitrary_colors_stay_in_range() {
        for _ in 0..10_000 {
            let rgb = [fastrand::u8(..), fastrand::u8(..), fastrand::u8(..)];
            assert!(color_to_id(rgb) <= MAX_LAYER_ID);
        }
    }

    #[test]
    fn oversized_ids_wrap() {
        assert_eq!(id_to_color(MAX_LAYER_ID + 1), [0, 0, 0]);
        assert_eq!(id_to_color(u32::MAX), id_to_color(MAX_LAYER_ID));
    }

    #[test]
    fn overrides_fall_back_to_default() {
        let codec = CodecOverrides::new().encode_with(|id| [id as u8, 0, 1]);
        assert_eq!(codec.id_to_color(7), [7, 0, 1]);
        assert_eq!(codec.color_to_id([0, 0, 84]), 42);

        let codec = CodecOverrides::new().decode_with(|rgb| u32::from(rgb[0]));
        assert_eq!(codec.id_to_color(42), [0, 0, 84]);
        assert_eq!(codec.color_to_id([9, 0, 0]), 9);
    }

    #[test]
    fn function_pair_codec() {
        let codec = from_fns(|id| [0, id as u8, 0], |rgb: [u8; 3]| u32::from(rgb[1]));
        assert_eq!(codec.color_to_id(codec.id_to_color(200)), 200);
    }
}
