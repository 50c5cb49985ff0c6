// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Relation colours: a fixed palette first, seeded random colours after.

/// Contrasting colours handed out in this order before any random colour.
pub const PALETTE: [&str; 12] = [
    "#47c0ee", "#8dd593", "#f6c4e1", "#8595e1", "#f0b98d", "#f79cd4", "#bec1d4", "#11c638",
    "#b5bbe3", "#7d87b9", "#e07b91", "#4a6fe3",
];

/// Stateful `xoroshiro128+` pseudo-random number generator.
///
/// * Not cryptographically secure; only picks display colours.
/// * Matching seeds yield identical sequences across platforms, so two runs
///   over the same input export identical colours.
#[derive(Debug, Clone, Copy)]
pub struct Prng {
    state: [u64; 2],
}

impl Prng {
    /// Constructs a PRNG from a single 64-bit seed via SplitMix64 expansion.
    pub fn from_seed_u64(seed: u64) -> Self {
        fn splitmix64(state: &mut u64) -> u64 {
            *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
            let mut z = *state;
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
            z ^ (z >> 31)
        }

        let mut sm_state = seed;
        let mut state = [splitmix64(&mut sm_state), splitmix64(&mut sm_state)];
        if state[0] == 0 && state[1] == 0 {
            state[0] = 0x9e37_79b9_7f4a_7c15;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(55) ^ s1 ^ (s1 << 14);
        self.state[1] = s1.rotate_left(36);

        result
    }

    /// Returns the next float in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        let raw = self.next_u64();
        let bits = ((raw >> 41) as u32) | 0x3f80_0000;
        f32::from_bits(bits) - 1.0
    }
}

/// Per-run colour source. Never shared between runs.
#[derive(Debug, Clone)]
pub struct ColorGenerator {
    next_palette: usize,
    prng: Prng,
}

impl ColorGenerator {
    /// Fresh generator starting at the first palette entry.
    pub fn new(seed: u64) -> Self {
        Self {
            next_palette: 0,
            prng: Prng::from_seed_u64(seed),
        }
    }

    /// Next colour as `#rrggbb`.
    pub fn next_color(&mut self) -> String {
        if let Some(color) = PALETTE.get(self.next_palette) {
            self.next_palette += 1;
            return (*color).to_owned();
        }
        self.random_color()
    }

    // Bright, readable colours: any hue, mid-high saturation and value.
    fn random_color(&mut self) -> String {
        let hue = self.prng.next_f32() * 360.0;
        let saturation = 0.45 + self.prng.next_f32() * 0.45;
        let value = 0.75 + self.prng.next_f32() * 0.2;
        let [r, g, b] = hsv_to_rgb(hue, saturation, value);
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> [u8; 3] {
    let c = value * saturation;
    let h = (hue / 60.0) % 6.0;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = value - c;
    let (r, g, b) = match h as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [channel(r), channel(g), channel(b)]
}
