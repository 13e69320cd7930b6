use rand::Rng;

/// Substitute symbols shown while a character is in flight.
///
/// The repeated underscores weight the draw toward a quieter glyph so the
/// scramble reads as a settling line rather than pure noise.
pub const GLYPHS: &[char] = &[
    '!', '<', '>', '-', '_', '\\', '/', '[', ']', '{', '}', '\u{2014}', '=', '+', '*', '^', '?',
    '#', '_', '_', '_', '_', '_', '_', '_', '_',
];

/// Draw one glyph uniformly from [`GLYPHS`].
pub fn random_glyph<R: Rng + ?Sized>(rng: &mut R) -> char {
    GLYPHS[rng.gen_range(0..GLYPHS.len())]
}
