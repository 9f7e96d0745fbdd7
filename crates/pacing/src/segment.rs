//! Route description: segments, the course they form, and fine course points.

use serde::{Deserialize, Serialize};

use crate::InvalidInput;

/// Largest supported gradient magnitude (50%).
pub const MAX_GRADIENT: f64 = 0.5;

/// A contiguous stretch of route with constant gradient, altitude, and wind.
///
/// Distances are along the road. Wind is signed along the direction of
/// travel: positive is a tailwind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SegmentRecord", into = "SegmentRecord")]
pub struct Segment {
    distance: f64,
    gradient: f64,
    altitude: f64,
    wind: f64,
}

impl Segment {
    /// Creates a segment at sea level in still air.
    ///
    /// # Errors
    ///
    /// Returns an error if `distance` is not positive and finite, or if
    /// `gradient` is non-finite or steeper than [`MAX_GRADIENT`].
    pub fn new(distance: f64, gradient: f64) -> Result<Self, InvalidInput> {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(InvalidInput::Distance(distance));
        }
        check_gradient(gradient)?;

        Ok(Self {
            distance,
            gradient,
            altitude: 0.0,
            wind: 0.0,
        })
    }

    /// Sets the altitude in metres.
    ///
    /// # Errors
    ///
    /// Returns an error if `altitude` is non-finite.
    pub fn with_altitude(self, altitude: f64) -> Result<Self, InvalidInput> {
        let altitude = finite("altitude", altitude)?;
        Ok(Self { altitude, ..self })
    }

    /// Sets the wind speed in m/s, positive for a tailwind.
    ///
    /// # Errors
    ///
    /// Returns an error if `wind` is non-finite.
    pub fn with_wind(self, wind: f64) -> Result<Self, InvalidInput> {
        let wind = finite("wind", wind)?;
        Ok(Self { wind, ..self })
    }

    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[must_use]
    pub fn gradient(&self) -> f64 {
        self.gradient
    }

    #[must_use]
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    #[must_use]
    pub fn wind(&self) -> f64 {
        self.wind
    }

    /// Height gained over the segment, negative on descents.
    #[must_use]
    pub fn rise(&self) -> f64 {
        self.distance * self.gradient.atan().sin()
    }
}

/// One row of a segment table; altitude and wind are optional.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SegmentRecord {
    distance: f64,
    gradient: f64,
    #[serde(default)]
    altitude: f64,
    #[serde(default)]
    wind: f64,
}

impl TryFrom<SegmentRecord> for Segment {
    type Error = InvalidInput;

    fn try_from(record: SegmentRecord) -> Result<Self, Self::Error> {
        Segment::new(record.distance, record.gradient)?
            .with_altitude(record.altitude)?
            .with_wind(record.wind)
    }
}

impl From<Segment> for SegmentRecord {
    fn from(segment: Segment) -> Self {
        Self {
            distance: segment.distance,
            gradient: segment.gradient,
            altitude: segment.altitude,
            wind: segment.wind,
        }
    }
}

/// An ordered, non-empty sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct Course {
    segments: Vec<Segment>,
    starts: Vec<f64>,
    total_distance: f64,
}

impl Course {
    /// Creates a course from segments in route order.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput::EmptyCourse`] if `segments` is empty.
    pub fn new(segments: Vec<Segment>) -> Result<Self, InvalidInput> {
        if segments.is_empty() {
            return Err(InvalidInput::EmptyCourse);
        }

        let mut starts = Vec::with_capacity(segments.len());
        let mut total_distance = 0.0;
        for segment in &segments {
            starts.push(total_distance);
            total_distance += segment.distance;
        }

        Ok(Self {
            segments,
            starts,
            total_distance,
        })
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; a course has at least one segment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Distance from the route start to the start of segment `index`.
    #[must_use]
    pub fn start_of(&self, index: usize) -> Option<f64> {
        self.starts.get(index).copied()
    }

    #[must_use]
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Index of the segment containing `position`.
    ///
    /// Each segment covers `[start, start + distance)`. Positions before the
    /// start map to the first segment and positions at or past the end map
    /// to the last.
    #[must_use]
    pub fn segment_at(&self, position: f64) -> usize {
        self.starts
            .partition_point(|&start| start <= position)
            .saturating_sub(1)
    }

    /// Total height gained over the route, ignoring descents.
    #[must_use]
    pub fn elevation_gain(&self) -> f64 {
        self.segments.iter().map(|s| s.rise().max(0.0)).sum()
    }
}

impl TryFrom<Vec<Segment>> for Course {
    type Error = InvalidInput;

    fn try_from(segments: Vec<Segment>) -> Result<Self, Self::Error> {
        Self::new(segments)
    }
}

impl From<Course> for Vec<Segment> {
    fn from(course: Course) -> Self {
        course.segments
    }
}

/// A dense route sample for the fine-grained solver.
///
/// The point's conditions hold from `position` until the next point, or the
/// end of the route for the last point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoursePoint {
    pub position: f64,
    pub gradient: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub wind: f64,
}

impl CoursePoint {
    /// Creates a point at sea level in still air.
    #[must_use]
    pub fn new(position: f64, gradient: f64) -> Self {
        Self {
            position,
            gradient,
            altitude: 0.0,
            wind: 0.0,
        }
    }

    #[must_use]
    pub fn with_altitude(self, altitude: f64) -> Self {
        Self { altitude, ..self }
    }

    #[must_use]
    pub fn with_wind(self, wind: f64) -> Self {
        Self { wind, ..self }
    }

    /// Checks that every field is finite and the gradient is supported.
    pub(crate) fn validate(&self) -> Result<(), InvalidInput> {
        finite("position", self.position)?;
        check_gradient(self.gradient)?;
        finite("altitude", self.altitude)?;
        finite("wind", self.wind)?;
        Ok(())
    }
}

fn check_gradient(gradient: f64) -> Result<(), InvalidInput> {
    if gradient.is_finite() && gradient.abs() <= MAX_GRADIENT {
        Ok(())
    } else {
        Err(InvalidInput::Gradient {
            gradient,
            max: MAX_GRADIENT,
        })
    }
}

pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64, InvalidInput> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidInput::NonFinite { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn course() -> Course {
        Course::new(vec![
            Segment::new(1000.0, 0.02).unwrap(),
            Segment::new(500.0, -0.04).unwrap(),
            Segment::new(250.0, 0.0).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_invalid_segments() {
        assert_eq!(Segment::new(0.0, 0.0), Err(InvalidInput::Distance(0.0)));
        assert_eq!(Segment::new(-5.0, 0.0), Err(InvalidInput::Distance(-5.0)));
        assert!(matches!(
            Segment::new(100.0, 0.6),
            Err(InvalidInput::Gradient { .. })
        ));
        assert!(matches!(
            Segment::new(100.0, f64::NAN),
            Err(InvalidInput::Gradient { .. })
        ));
        assert!(matches!(
            Segment::new(100.0, 0.0).unwrap().with_wind(f64::INFINITY),
            Err(InvalidInput::NonFinite { name: "wind", .. })
        ));
    }

    #[test]
    fn optional_fields_default_to_zero() {
        let segment = Segment::new(800.0, -0.03).unwrap();

        assert_relative_eq!(segment.altitude(), 0.0);
        assert_relative_eq!(segment.wind(), 0.0);
    }

    #[test]
    fn course_tracks_offsets() {
        let course = course();

        assert_eq!(course.len(), 3);
        assert_relative_eq!(course.total_distance(), 1750.0);
        assert_eq!(course.start_of(2), Some(1500.0));
        assert_eq!(course.start_of(3), None);
    }

    #[test]
    fn locates_segment_for_position() {
        let course = course();

        assert_eq!(course.segment_at(-1.0), 0);
        assert_eq!(course.segment_at(0.0), 0);
        assert_eq!(course.segment_at(999.9), 0);
        assert_eq!(course.segment_at(1000.0), 1);
        assert_eq!(course.segment_at(1600.0), 2);
        assert_eq!(course.segment_at(5000.0), 2);
    }

    #[test]
    fn elevation_gain_ignores_descents() {
        let course = course();

        let expected = 1000.0 * 0.02_f64.atan().sin();
        assert_relative_eq!(course.elevation_gain(), expected);
    }

    #[test]
    fn empty_course_is_rejected() {
        assert_eq!(Course::new(Vec::new()), Err(InvalidInput::EmptyCourse));
    }

    #[test]
    fn point_validation_checks_gradient() {
        assert!(CoursePoint::new(10.0, 0.1).validate().is_ok());
        assert!(CoursePoint::new(10.0, -0.9).validate().is_err());
        assert!(CoursePoint::new(f64::NAN, 0.0).validate().is_err());
    }
}
