//! Dense cell builders for indexed stations.

use nf_core::StationResult;

use super::ScoredBand;

/// True iff `a` ranks above `b` (points first, then grade).
#[inline]
pub(crate) fn outranks(a: StationResult, b: StationResult) -> bool {
    (a.points, a.grade) > (b.points, b.grade)
}

fn keep_best(cell: &mut Option<StationResult>, cand: StationResult) {
    if cell.map_or(true, |cur| outranks(cand, cur)) {
        *cell = Some(cand);
    }
}

/// Count/centimetre stations: cell `i` holds the best band whose `min` ≤ `i`.
/// Length runs to the highest threshold, capped at `cap`. Thresholds beyond
/// the cap are unreachable and left out.
pub(super) fn count_cells(bands: &[ScoredBand], cap: u32) -> Vec<Option<StationResult>> {
    let threshold = |b: &ScoredBand| b.band.min.unwrap_or(0.0);
    let top = bands.iter().map(|b| threshold(b).ceil()).fold(0.0_f64, f64::max);
    let last = top.min(f64::from(cap)) as usize;

    let mut cells = vec![None; last + 1];
    for b in bands {
        let start = threshold(b).ceil() as usize;
        if start > last {
            continue;
        }
        for cell in &mut cells[start..] {
            keep_best(cell, b.score());
        }
    }
    cells
}

/// Run: cell `s` holds the best band whose `[min_s, max_s]` contains second `s`.
/// Missing `min_s` is 0; missing `max_s` is the discovered maximum second.
///
/// Fast-finisher rule: seconds below the fastest band's `min_s` take that
/// band's score, so a time quicker than anything tabulated still scores.
pub(super) fn second_cells(bands: &[ScoredBand], cap: u32) -> Vec<Option<StationResult>> {
    let horizon = bands
        .iter()
        .flat_map(|b| [b.band.min, b.band.max])
        .flatten()
        .fold(0.0_f64, f64::max)
        .ceil()
        .min(f64::from(cap)) as usize;

    let mut cells = vec![None; horizon + 1];
    for b in bands {
        let lo = b.band.min.map_or(0, |m| m.ceil() as usize);
        let hi = b.band.max.map_or(horizon, |m| m.floor() as usize).min(horizon);
        if lo > hi {
            continue;
        }
        for cell in &mut cells[lo..=hi] {
            keep_best(cell, b.score());
        }
    }

    let start = |b: &ScoredBand| b.band.min.unwrap_or(0.0);
    let fastest = bands.iter().map(start).min_by(f64::total_cmp);
    if let Some(fastest) = fastest {
        let best = bands
            .iter()
            .filter(|b| start(*b) == fastest)
            .map(ScoredBand::score)
            .reduce(|a, b| if outranks(b, a) { b } else { a });
        if let Some(best) = best {
            let stop = (fastest.ceil() as usize).min(cells.len());
            for cell in &mut cells[..stop] {
                keep_best(cell, best);
            }
        }
    }
    cells
}
