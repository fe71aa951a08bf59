//! Track sizing.
//!
//! [§ 11 Grid Sizing](https://www.w3.org/TR/css-grid-1/#layout-algorithm)

use std::ops::Range;

use quire_style::grid::{TrackBreadth, TrackSize};

use super::placement::is_intrinsic;
use crate::context::LayoutContext;
use crate::options::{EPSILON, MAX_GRID_TRACK_PASSES};

/// Outer size contributions of one item to the tracks it spans.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    /// Tracks spanned.
    pub span: Range<usize>,
    /// Min-content contribution.
    pub min: f32,
    /// Max-content contribution.
    pub max: f32,
}

/// The space tracks are sized in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Space {
    /// A definite inner size of the grid container.
    Definite(f32),
    /// Sizing under a min-content constraint.
    MinContent,
    /// Sizing under a max-content constraint, or an indefinite size.
    MaxContent,
}

impl Space {
    const fn definite(self) -> Option<f32> {
        match self {
            Self::Definite(size) => Some(size),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Track {
    min: TrackBreadth,
    max: TrackBreadth,
    fit: Option<f32>,
    base: f32,
    limit: f32,
}

impl Track {
    /// [§ 11.4 Initialize Track Sizes](https://www.w3.org/TR/css-grid-1/#algo-init)
    fn new(size: TrackSize, basis: Option<f32>) -> Self {
        // "If the track's min or max sizing function is a percentage and the
        // grid container's size is indefinite, treat it as auto."
        let indefinite = |b: TrackBreadth| match b {
            TrackBreadth::Percent(_) if basis.is_none() => TrackBreadth::Auto,
            other => other,
        };
        let min = indefinite(size.min_function());
        let max = indefinite(size.max_function());
        // "A fixed sizing function: Resolve to an absolute length and use
        // that size as the track's initial base size. An intrinsic sizing
        // function: Use an initial base size of zero."
        let base = min.resolve(basis).unwrap_or(0.0);
        // "A flexible sizing function: Use an initial growth limit of
        // infinity" for intrinsic functions; flexible ones keep the base.
        let limit = match max {
            TrackBreadth::Flex(_) => base,
            other => other.resolve(basis).unwrap_or(f32::INFINITY).max(base),
        };
        let fit = match size {
            TrackSize::FitContent(limit) => Some(limit.resolve_definite(basis).unwrap_or(f32::INFINITY)),
            _ => None,
        };
        Self {
            min,
            max,
            fit,
            base,
            limit,
        }
    }

    const fn flex(&self) -> Option<f32> {
        match self.max {
            TrackBreadth::Flex(factor) => Some(factor),
            _ => None,
        }
    }

    fn finite_limit(&self) -> f32 {
        if self.limit.is_finite() { self.limit } else { self.base }
    }
}

/// Spread `extra` equally over the tracks `eligible` accepts.
fn grow(tracks: &mut [Track], extra: f32, eligible: impl Fn(&Track) -> bool, base: bool) {
    let count = tracks.iter().filter(|t| eligible(t)).count();
    if count == 0 || extra <= 0.0 {
        return;
    }
    let share = extra / count as f32;
    for track in tracks.iter_mut().filter(|t| eligible(t)) {
        if base {
            track.base += share;
            track.limit = track.limit.max(track.base);
        } else {
            track.limit = track.finite_limit() + share;
        }
    }
}

/// [§ 11.7.1 Find the Size of an fr](https://www.w3.org/TR/css-grid-1/#algo-find-fr-size)
fn find_fr_size(ctx: &mut LayoutContext<'_>, tracks: &[Track], space: f32) -> f32 {
    let mut inflexible = vec![false; tracks.len()];
    let mut hypothetical = 0.0;
    for _ in 0..MAX_GRID_TRACK_PASSES {
        // "Let leftover space be the space to fill minus the base sizes of
        // the non-flexible grid tracks."
        let leftover: f32 = space
            - tracks
                .iter()
                .zip(&inflexible)
                .filter(|(t, inflexible)| t.flex().is_none() || **inflexible)
                .map(|(t, _)| t.base)
                .sum::<f32>();
        // "Let flex factor sum be the sum of the flex factors of the flexible
        // tracks. If this value is less than 1, set it to 1 instead."
        let factor_sum: f32 = tracks
            .iter()
            .zip(&inflexible)
            .filter(|(_, inflexible)| !**inflexible)
            .filter_map(|(t, _)| t.flex())
            .sum::<f32>()
            .max(1.0);
        hypothetical = (leftover / factor_sum).max(0.0);

        // "If the product of the hypothetical fr size and a flexible track's
        // flex factor is less than the track's base size, restart this
        // algorithm treating all such tracks as inflexible."
        let mut restart = false;
        for (track, inflexible) in tracks.iter().zip(inflexible.iter_mut()) {
            if let Some(factor) = track.flex()
                && !*inflexible
                && hypothetical * factor < track.base - EPSILON
            {
                *inflexible = true;
                restart = true;
            }
        }
        if !restart {
            return hypothetical;
        }
    }
    ctx.warn("grid flexible track sizing did not settle; keeping the last fr size");
    hypothetical
}

/// Size the tracks of one axis and return their sizes.
///
/// `stretch` is set when the content distribution of the axis is `normal`
/// or `stretch`.
pub fn size_tracks(
    ctx: &mut LayoutContext<'_>,
    sizes: &[TrackSize],
    items: &[Contribution],
    space: Space,
    gap: f32,
    stretch: bool,
) -> Vec<f32> {
    let basis = space.definite();
    let mut tracks: Vec<Track> = sizes.iter().map(|&size| Track::new(size, basis)).collect();
    if tracks.is_empty() {
        return Vec::new();
    }
    let total_gaps = gap * (tracks.len() - 1) as f32;
    let spans_flex = |tracks: &[Track], item: &Contribution| tracks[item.span.clone()].iter().any(|t| t.flex().is_some());

    // STEP 1: Size tracks to fit items spanning one non-flexible track.
    //
    // [§ 11.5 Resolve Intrinsic Track Sizes](https://www.w3.org/TR/css-grid-1/#algo-content)
    for item in items.iter().filter(|c| c.span.len() == 1) {
        let track = &mut tracks[item.span.start];
        if track.flex().is_some() {
            continue;
        }
        match track.min {
            TrackBreadth::MinContent | TrackBreadth::Auto => track.base = track.base.max(item.min),
            TrackBreadth::MaxContent => track.base = track.base.max(item.max),
            _ => {}
        }
        let limit = match track.max {
            TrackBreadth::MinContent => Some(item.min),
            TrackBreadth::MaxContent | TrackBreadth::Auto => Some(item.max),
            _ => None,
        };
        if let Some(limit) = limit {
            track.limit = if track.limit.is_finite() {
                track.limit.max(limit)
            } else {
                limit
            };
        }
    }

    // STEP 2: "Increase sizes to accommodate spanning items crossing content-
    // sized tracks", by increasing span.
    let mut spanning: Vec<&Contribution> = items
        .iter()
        .filter(|c| c.span.len() > 1 && !spans_flex(&tracks, *c))
        .collect();
    spanning.sort_by_key(|c| c.span.len());
    for item in spanning {
        let gaps = gap * (item.span.len() - 1) as f32;
        let span = &mut tracks[item.span.clone()];
        let bases: f32 = span.iter().map(|t| t.base).sum();
        grow(span, item.min - bases - gaps, |t| is_intrinsic(t.min), true);
        let limits: f32 = span.iter().map(Track::finite_limit).sum();
        grow(span, item.max - limits - gaps, |t| is_intrinsic(t.max), false);
    }

    // STEP 3: "If any track still has an infinite growth limit ... set its
    // growth limit to its base size." fit-content() caps the limit.
    for track in &mut tracks {
        track.limit = track.finite_limit();
        if let Some(fit) = track.fit {
            track.limit = track.limit.min(fit.max(track.base));
        }
        track.limit = track.limit.max(track.base);
    }

    // STEP 4: "Increase sizes to accommodate spanning items crossing flexible
    // tracks."
    let crossing: Vec<&Contribution> = items.iter().filter(|c| spans_flex(&tracks, *c)).collect();
    for item in &crossing {
        let gaps = gap * (item.span.len() - 1) as f32;
        let span = &mut tracks[item.span.clone()];
        let bases: f32 = span.iter().map(|t| t.base).sum();
        grow(span, item.min - bases - gaps, |t| t.flex().is_some(), true);
    }

    // STEP 5: Maximize tracks.
    //
    // [§ 11.6](https://www.w3.org/TR/css-grid-1/#algo-grow-tracks)
    // "If the free space is positive, distribute it equally to the base
    // sizes of all tracks, freezing tracks as they reach their growth limits
    // (and continuing to grow the unfrozen tracks as needed)."
    match space {
        Space::Definite(size) => {
            let mut free = size - total_gaps - tracks.iter().map(|t| t.base).sum::<f32>();
            for _ in 0..tracks.len() {
                let growable = tracks.iter().filter(|t| t.limit - t.base > EPSILON).count();
                if free <= EPSILON || growable == 0 {
                    break;
                }
                let share = free / growable as f32;
                for track in tracks.iter_mut().filter(|t| t.limit - t.base > EPSILON) {
                    let added = share.min(track.limit - track.base);
                    track.base += added;
                    free -= added;
                }
            }
        }
        // "For the purpose of this step: if sizing the grid container under
        // a max-content constraint, the free space is infinite".
        Space::MaxContent => {
            for track in &mut tracks {
                track.base = track.limit;
            }
        }
        Space::MinContent => {}
    }

    // STEP 6: Expand flexible tracks.
    //
    // [§ 11.7](https://www.w3.org/TR/css-grid-1/#algo-flex-tracks)
    if tracks.iter().any(|t| t.flex().is_some()) {
        let fr = match space {
            Space::Definite(size) => find_fr_size(ctx, &tracks, size - total_gaps),
            Space::MinContent | Space::MaxContent => {
                // "The used flex fraction is the maximum of: For each
                // flexible track, if the flexible track's flex factor is
                // greater than one, the result of dividing the track's base
                // size by its flex factor; otherwise, the track's base size.
                // For each grid item that crosses a flexible track, the
                // result of finding the size of an fr using all the grid
                // tracks that the item crosses and a space to fill of the
                // item's max-content contribution."
                let mut fr = tracks
                    .iter()
                    .filter_map(|t| t.flex().map(|f| if f > 1.0 { t.base / f } else { t.base }))
                    .fold(0.0, f32::max);
                for item in &crossing {
                    let gaps = gap * (item.span.len() - 1) as f32;
                    let contribution = if space == Space::MinContent { item.min } else { item.max };
                    fr = fr.max(find_fr_size(ctx, &tracks[item.span.clone()], contribution - gaps));
                }
                fr
            }
        };
        for track in &mut tracks {
            if let Some(factor) = track.flex() {
                track.base = track.base.max(fr * factor);
            }
        }
    }

    // STEP 7: Stretch auto tracks.
    //
    // [§ 11.8](https://www.w3.org/TR/css-grid-1/#algo-stretch)
    if stretch && let Space::Definite(size) = space {
        let free = size - total_gaps - tracks.iter().map(|t| t.base).sum::<f32>();
        grow(&mut tracks, free, |t| t.max == TrackBreadth::Auto, true);
    }

    #[cfg(feature = "layout-trace")]
    log::trace!("[GRID] tracks {:?}", tracks.iter().map(|t| t.base).collect::<Vec<_>>());

    tracks.into_iter().map(|t| t.base).collect()
}
