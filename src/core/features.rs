use crate::models::{AvailabilityWindow, ConversationStyle, CopingStyle, HelperProfile, ThemeIntensity};
use std::collections::BTreeMap;

/// Weighted share of the seeker's themes the helper has lived through
///
/// `Σ(intensity × expertise) / Σ intensity`. A theme the helper never listed
/// counts as zero expertise. No themes (or all-zero intensities) scores 0.
#[inline]
pub fn experience_overlap(
    seeker_themes: &[ThemeIntensity],
    helper_themes_experience: &BTreeMap<String, f64>,
) -> f64 {
    let total_intensity: f64 = seeker_themes.iter().map(|t| t.intensity).sum();
    if total_intensity <= 0.0 {
        return 0.0;
    }

    let weighted: f64 = seeker_themes
        .iter()
        .map(|theme| {
            let expertise = helper_themes_experience
                .get(&theme.name)
                .copied()
                .unwrap_or(0.0);
            theme.intensity * expertise
        })
        .sum();

    (weighted / total_intensity).clamp(0.0, 1.0)
}

/// Similarity of coping styles, 1 for identical vectors
#[inline]
pub fn coping_style_match(preference: &CopingStyle, expertise: &CopingStyle) -> f64 {
    distance_match(&preference.as_array(), &expertise.as_array())
}

/// Similarity of conversation styles, 1 for identical vectors
#[inline]
pub fn conversation_style_match(preference: &ConversationStyle, style: &ConversationStyle) -> f64 {
    distance_match(&preference.as_array(), &style.as_array())
}

/// `1 - ‖a - b‖ / √n` over unit-interval coordinates
///
/// √n is the largest possible distance, reached when every dimension sits at
/// opposite extremes.
fn distance_match<const N: usize>(a: &[f64; N], b: &[f64; N]) -> f64 {
    if N == 0 {
        return 1.0;
    }
    let distance = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt();
    let max_distance = (N as f64).sqrt();

    (1.0 - distance / max_distance).clamp(0.0, 1.0)
}

/// Share of the seeker's weekly availability that the helper also covers
///
/// Both sides are merged into disjoint minute-of-week intervals first, so
/// overlapping windows on one side are never double counted.
pub fn availability_overlap(
    seeker_windows: &[AvailabilityWindow],
    helper_windows: &[AvailabilityWindow],
) -> f64 {
    if seeker_windows.is_empty() || helper_windows.is_empty() {
        return 0.0;
    }

    let seeker = merge_windows(seeker_windows);
    let helper = merge_windows(helper_windows);

    let seeker_total: u32 = seeker.iter().map(|(start, end)| end - start).sum();
    if seeker_total == 0 {
        return 0.0;
    }

    // Two-pointer sweep over sorted disjoint intervals
    let mut shared = 0u32;
    let (mut i, mut j) = (0, 0);
    while i < seeker.len() && j < helper.len() {
        let (s_start, s_end) = seeker[i];
        let (h_start, h_end) = helper[j];

        let start = s_start.max(h_start);
        let end = s_end.min(h_end);
        if end > start {
            shared += end - start;
        }

        if s_end < h_end {
            i += 1;
        } else {
            j += 1;
        }
    }

    (shared as f64 / seeker_total as f64).clamp(0.0, 1.0)
}

/// Sort and merge windows into disjoint half-open minute-of-week ranges
fn merge_windows(windows: &[AvailabilityWindow]) -> Vec<(u32, u32)> {
    let mut ranges: Vec<(u32, u32)> = windows
        .iter()
        .map(AvailabilityWindow::week_range)
        .filter(|(start, end)| end > start)
        .collect();
    ranges.sort_unstable();

    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Trust term: mean of the helper's track-record rates
#[inline]
pub fn reliability_trust(helper: &HelperProfile) -> f64 {
    ((helper.reliability_score + helper.response_rate + helper.completion_rate) / 3.0)
        .clamp(0.0, 1.0)
}
