use crate::analyzers::sentiment::Factor;
use crate::analyzers::utility::clamp_finite;

/// Ordered label bands over a mean sentiment value.
///
/// Bands are checked top-down; the first whose threshold the mean strictly
/// exceeds wins, otherwise `fallback` applies.
#[derive(Debug)]
pub struct LabelBands {
    pub bands: &'static [(f64, &'static str)],
    pub fallback: &'static str,
}

impl LabelBands {
    pub fn classify(&self, mean: f64) -> &'static str {
        self.bands
            .iter()
            .find(|(threshold, _)| mean > *threshold)
            .map_or(self.fallback, |&(_, label)| label)
    }
}

/// | mean   | label     |
/// |--------|-----------|
/// | > 0.35 | excellent |
/// | > 0.05 | good      |
/// | > -0.25| spotty    |
/// | else   | poor      |
pub static WIFI: LabelBands = LabelBands {
    bands: &[(0.35, "excellent"), (0.05, "good"), (-0.25, "spotty")],
    fallback: "poor",
};

pub static SEATING: LabelBands = LabelBands {
    bands: &[(0.35, "comfortable"), (0.05, "adequate")],
    fallback: "limited",
};

pub static NOISE: LabelBands = LabelBands {
    bands: &[(0.35, "quiet"), (-0.25, "moderate")],
    fallback: "loud",
};

pub static CAPACITY: LabelBands = LabelBands {
    bands: &[(0.35, "ample"), (0.1, "roomy"), (-0.25, "cozy")],
    fallback: "tight",
};

pub static DRINKS: LabelBands = LabelBands {
    bands: &[(0.4, "excellent"), (0.1, "good"), (-0.25, "average")],
    fallback: "poor",
};

pub static LIGHTING: LabelBands = LabelBands {
    bands: &[(0.35, "bright"), (-0.2, "balanced")],
    fallback: "dim",
};

/// Label table for a factor. Outlets use an evidence count instead.
pub fn bands_for(factor: Factor) -> Option<&'static LabelBands> {
    match factor {
        Factor::Wifi => Some(&WIFI),
        Factor::Seating => Some(&SEATING),
        Factor::Noise => Some(&NOISE),
        Factor::Capacity => Some(&CAPACITY),
        Factor::Drinks => Some(&DRINKS),
        Factor::Lighting => Some(&LIGHTING),
        Factor::Outlets => None,
    }
}

/// Maps a mean sentiment in `[-1, 1]` to a 0–10 display score.
pub fn to_score(mean: f64) -> f64 {
    let mean = clamp_finite(mean, -1.0, 1.0);
    clamp_finite((mean + 1.0) * 5.0, 0.0, 10.0)
}
