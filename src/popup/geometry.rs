//! Bounds decoding and the area heuristic used to classify popup candidates.

use thiserror::Error;

/// Why a candidate could not be measured. Never leaves the popup module:
/// the analyzer treats any of these as "this candidate does not qualify".
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum GeometryError {
    #[error("malformed bounds {0:?}")]
    MalformedBounds(String),

    #[error("screen area is zero")]
    ZeroScreenArea,

    #[error("coordinates overflow")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rect {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

/// Decode `[x1,y1][x2,y2]`. Whitespace around a coordinate is tolerated and
/// any pairs after the second are ignored; x2 >= x1 is not checked.
pub(crate) fn parse_bounds(raw: &str) -> Result<Rect, GeometryError> {
    let malformed = || GeometryError::MalformedBounds(raw.to_string());

    let inner = raw.trim_matches(|c| c == '[' || c == ']');
    let mut pairs = inner.split("][");
    let (x1, y1) = parse_pair(pairs.next()).ok_or_else(malformed)?;
    let (x2, y2) = parse_pair(pairs.next()).ok_or_else(malformed)?;
    Ok(Rect { x1, y1, x2, y2 })
}

fn parse_pair(part: Option<&str>) -> Option<(i64, i64)> {
    let mut coords = part?.split(',');
    match (coords.next(), coords.next(), coords.next()) {
        (Some(x), Some(y), None) => Some((x.trim().parse().ok()?, y.trim().parse().ok()?)),
        _ => None,
    }
}

/// Geometry of one candidate relative to the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Measurement {
    pub width: i64,
    pub height: i64,
    pub center_x: f64,
    pub center_y: f64,
    pub area_ratio: f64,
    pub is_centered_x: bool,
    pub is_centered_y: bool,
}

impl Measurement {
    /// Strictly smaller than the screen. Centeredness does not take part.
    pub fn is_popup(&self) -> bool {
        self.area_ratio < 1.0
    }
}

pub(crate) fn measure(
    rect: Rect,
    screen_width: i64,
    screen_height: i64,
) -> Result<Measurement, GeometryError> {
    let screen_area = i128::from(screen_width) * i128::from(screen_height);
    if screen_area == 0 {
        return Err(GeometryError::ZeroScreenArea);
    }

    let width = rect.x2.checked_sub(rect.x1).ok_or(GeometryError::Overflow)?;
    let height = rect.y2.checked_sub(rect.y1).ok_or(GeometryError::Overflow)?;
    let component_area = i128::from(width) * i128::from(height);

    let center_x = (rect.x1 as f64 + rect.x2 as f64) / 2.0;
    let center_y = (rect.y1 as f64 + rect.y2 as f64) / 2.0;
    let sw = screen_width as f64;
    let sh = screen_height as f64;

    Ok(Measurement {
        width,
        height,
        center_x,
        center_y,
        area_ratio: component_area as f64 / screen_area as f64,
        is_centered_x: (center_x - sw / 2.0).abs() < sw * 0.2,
        is_centered_y: (center_y - sh / 2.0).abs() < sh * 0.2,
    })
}
