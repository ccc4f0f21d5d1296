//! Sequence engine: pure functions for sequence sizing, generation and input checking.
//!
//! Nothing here holds state or touches timers. Randomness is injected as any
//! `FnMut() -> f64` yielding values in `[0, 1)`, so callers that need
//! reproducible sequences pass their own source.

use rand::Rng;

use crate::error::SequenceError;
use crate::types::{Color, InputResult, DEFAULT_PALETTE};

/// Sequences start at four colors and grow by one per level.
pub const BASE_SEQUENCE_LEN: usize = 4;

/// Number of colors a round at `level` plays. Levels below 1 clamp to the base length.
pub fn sequence_length_for_level(level: i64) -> usize {
    BASE_SEQUENCE_LEN + level.saturating_sub(1).max(0) as usize
}

/// Uniform `[0, 1)` draw from the thread-local generator.
pub fn random_unit() -> f64 {
    rand::thread_rng().gen::<f64>()
}

/// `colors[floor(r * len)]`, with out-of-range draws pinned to the palette bounds.
fn draw<T: Clone>(colors: &[T], rng: &mut impl FnMut() -> f64) -> T {
    let r = rng();
    let idx = if r.is_nan() || r <= 0.0 {
        0
    } else {
        (r * colors.len() as f64).floor() as usize
    };
    colors[idx.min(colors.len() - 1)].clone()
}

/// Draw a fresh sequence of `sequence_length_for_level(level)` colors.
pub fn generate_sequence<T: Clone>(
    level: i64,
    colors: &[T],
    mut rng: impl FnMut() -> f64,
) -> Result<Vec<T>, SequenceError> {
    if colors.is_empty() {
        return Err(SequenceError::EmptyPalette);
    }
    let length = sequence_length_for_level(level);
    Ok((0..length).map(|_| draw(colors, &mut rng)).collect())
}

/// Extend `existing` up to the length for `level`, keeping every earlier color.
///
/// An empty `existing` behaves exactly like [`generate_sequence`]. A sequence
/// that is already long enough comes back unchanged (never truncated), and in
/// that case the palette isn't consulted at all.
pub fn advance_sequence<T: Clone>(
    existing: &[T],
    level: i64,
    colors: &[T],
    mut rng: impl FnMut() -> f64,
) -> Result<Vec<T>, SequenceError> {
    if existing.is_empty() {
        return generate_sequence(level, colors, rng);
    }

    let target = sequence_length_for_level(level);
    let mut next = existing.to_vec();
    if next.len() < target && colors.is_empty() {
        return Err(SequenceError::EmptyPalette);
    }
    while next.len() < target {
        next.push(draw(colors, &mut rng));
    }
    Ok(next)
}

/// Match one press against `sequence[index]`.
///
/// An empty sequence is a no-op signal and leaves the cursor where it was.
/// Any mismatch, including an index past the end, sends the cursor back to 0.
pub fn check_user_input<T: PartialEq>(sequence: &[T], index: usize, color: &T) -> InputResult {
    if sequence.is_empty() {
        return InputResult {
            correct: false,
            next_index: index,
            is_complete: false,
        };
    }

    match sequence.get(index) {
        Some(expected) if expected == color => {
            let next_index = index + 1;
            InputResult {
                correct: true,
                next_index,
                is_complete: next_index == sequence.len(),
            }
        }
        _ => InputResult {
            correct: false,
            next_index: 0,
            is_complete: false,
        },
    }
}

/// [`generate_sequence`] over the default palette and thread RNG.
pub fn generate_default(level: i64) -> Vec<Color> {
    // DEFAULT_PALETTE is non-empty, so this can't fail.
    generate_sequence(level, &DEFAULT_PALETTE, random_unit).unwrap_or_default()
}

/// [`advance_sequence`] over the default palette and thread RNG.
pub fn advance_default(existing: &[Color], level: i64) -> Vec<Color> {
    advance_sequence(existing, level, &DEFAULT_PALETTE, random_unit)
        .unwrap_or_else(|_| existing.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays `values` in a loop, like a scripted RNG.
    fn scripted(values: &[f64]) -> impl FnMut() -> f64 + '_ {
        let mut i = 0;
        move || {
            let v = values[i % values.len()];
            i += 1;
            v
        }
    }

    const COLORS: [&str; 4] = ["green", "red", "blue", "yellow"];

    #[test]
    fn test_sequence_length_scales_with_level() {
        assert_eq!(sequence_length_for_level(1), 4);
        assert_eq!(sequence_length_for_level(2), 5);
        assert_eq!(sequence_length_for_level(3), 6);
        for level in 1..50 {
            assert_eq!(sequence_length_for_level(level), 4 + (level as usize - 1));
        }
    }

    #[test]
    fn test_sequence_length_clamps_low_levels() {
        assert_eq!(sequence_length_for_level(0), 4);
        assert_eq!(sequence_length_for_level(-7), 4);
        assert_eq!(sequence_length_for_level(i64::MIN), 4);
    }

    #[test]
    fn test_sequence_length_is_pure() {
        assert_eq!(sequence_length_for_level(9), sequence_length_for_level(9));
    }

    #[test]
    fn test_generate_sequence_deterministic() {
        let seq = generate_sequence(1, &COLORS, scripted(&[0.1, 0.4, 0.7, 0.9])).unwrap();
        assert_eq!(seq, vec!["green", "red", "blue", "yellow"]);
    }

    #[test]
    fn test_generate_sequence_length_matches_level() {
        let seq = generate_sequence(5, &DEFAULT_PALETTE, scripted(&[0.3])).unwrap();
        assert_eq!(seq.len(), 8);
        assert!(seq.iter().all(|c| *c == Color::Red));
    }

    #[test]
    fn test_generate_sequence_empty_palette() {
        let empty: [Color; 0] = [];
        assert_eq!(
            generate_sequence(1, &empty, scripted(&[0.5])),
            Err(SequenceError::EmptyPalette)
        );
    }

    #[test]
    fn test_out_of_range_draws_stay_in_palette() {
        let seq = generate_sequence(1, &COLORS, scripted(&[1.0, -0.2, f64::NAN, 7.5])).unwrap();
        assert_eq!(seq, vec!["yellow", "green", "green", "yellow"]);
    }

    #[test]
    fn test_advance_preserves_prefix() {
        let existing = ["a", "b", "c", "d"];
        let colors = ["a", "b", "c", "d", "e"];
        let next = advance_sequence(&existing, 2, &colors, scripted(&[0.99])).unwrap();
        assert_eq!(next.len(), 5);
        assert_eq!(&next[..4], &existing);
        assert_eq!(next[4], "e");
    }

    #[test]
    fn test_advance_from_empty_matches_generate() {
        let draws = [0.1, 0.4, 0.7, 0.9, 0.2];
        let a = advance_sequence(&[], 2, &COLORS, scripted(&draws)).unwrap();
        let b = generate_sequence(2, &COLORS, scripted(&draws)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_advance_never_truncates() {
        let existing = ["red"; 7];
        let next = advance_sequence(&existing, 1, &COLORS, scripted(&[0.0])).unwrap();
        assert_eq!(next, existing.to_vec());

        let empty: [&str; 0] = [];
        let next = advance_sequence(&existing, 2, &empty, scripted(&[0.0])).unwrap();
        assert_eq!(next.len(), 7);
    }

    #[test]
    fn test_advance_needs_palette_to_grow() {
        let empty: [&str; 0] = [];
        let result = advance_sequence(&["red"], 1, &empty, scripted(&[0.0]));
        assert_eq!(result, Err(SequenceError::EmptyPalette));
    }

    #[test]
    fn test_check_input_progress() {
        let seq = ["red", "blue"];
        let r = check_user_input(&seq, 0, &"red");
        assert_eq!(
            r,
            InputResult {
                correct: true,
                next_index: 1,
                is_complete: false
            }
        );

        let r = check_user_input(&seq, r.next_index, &"blue");
        assert_eq!(
            r,
            InputResult {
                correct: true,
                next_index: 2,
                is_complete: true
            }
        );
    }

    #[test]
    fn test_check_input_mismatch_resets() {
        let r = check_user_input(&["red", "blue"], 0, &"green");
        assert_eq!(
            r,
            InputResult {
                correct: false,
                next_index: 0,
                is_complete: false
            }
        );

        let r = check_user_input(&["red", "blue"], 1, &"red");
        assert!(!r.correct);
        assert_eq!(r.next_index, 0);
    }

    #[test]
    fn test_check_input_empty_sequence_is_noop() {
        let empty: [&str; 0] = [];
        let r = check_user_input(&empty, 0, &"red");
        assert_eq!(
            r,
            InputResult {
                correct: false,
                next_index: 0,
                is_complete: false
            }
        );
        assert_eq!(check_user_input(&empty, 3, &"red").next_index, 3);
    }

    #[test]
    fn test_check_input_index_past_end() {
        let r = check_user_input(&["red"], 5, &"red");
        assert!(!r.correct);
        assert_eq!(r.next_index, 0);
    }

    #[test]
    fn test_default_helpers_use_default_palette() {
        let seq = generate_default(2);
        assert_eq!(seq.len(), 5);
        let next = advance_default(&seq, 4);
        assert_eq!(next.len(), 7);
        assert_eq!(&next[..5], &seq[..]);
    }

    #[test]
    fn test_random_unit_in_range() {
        for _ in 0..1000 {
            let v = random_unit();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
