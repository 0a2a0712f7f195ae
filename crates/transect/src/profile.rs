//! Sampled values along a transect and their JSON forms.

use serde::Serialize;

use crate::plan::TransectPlan;

/// One sample along the line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Distance from the line's start, in CRS units
    pub distance: f64,
    /// World X
    pub x: f64,
    /// World Y
    pub y: f64,
    /// Sampled value, `None` where the raster holds no data
    pub value: Option<f64>,
}

/// Ordered samples from the line's start to its end.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Profile {
    pub samples: Vec<Sample>,
}

impl Profile {
    /// Attach distances and world positions to `values`, which must be in
    /// plan order.
    pub fn from_plan(plan: &TransectPlan, values: Vec<Option<f64>>) -> Self {
        let n = values.len();
        let length = plan.start.distance_to(&plan.end);
        let dx = plan.end.x - plan.start.x;
        let dy = plan.end.y - plan.start.y;

        let samples = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
                Sample {
                    distance: t * length,
                    x: plan.start.x + t * dx,
                    y: plan.start.y + t * dy,
                    value,
                }
            })
            .collect();

        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.samples.iter().map(|s| s.value)
    }

    /// `[[distance, value], ...]` with `null` for missing values.
    pub fn distance_json(&self) -> serde_json::Result<String> {
        let pairs: Vec<(f64, Option<f64>)> =
            self.samples.iter().map(|s| (s.distance, s.value)).collect();
        serde_json::to_string(&pairs)
    }

    /// `[[x, y, value], ...]` with `null` for missing values.
    pub fn world_json(&self) -> serde_json::Result<String> {
        let triples: Vec<(f64, f64, Option<f64>)> =
            self.samples.iter().map(|s| (s.x, s.y, s.value)).collect();
        serde_json::to_string(&triples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::TransectRequest;
    use ows_common::{BoundingBox, GridReference};
    use test_utils::assert_approx_eq;

    fn plan(wkt: &str) -> TransectPlan {
        let grid =
            GridReference::new(100, 100, "EPSG:28992", BoundingBox::new(0.0, 0.0, 100.0, 100.0))
                .unwrap();
        TransectPlan::new(&grid, &TransectRequest::from_wkt(wkt, 1).unwrap()).unwrap()
    }

    #[test]
    fn test_distances_span_segment_length() {
        let plan = plan("LINESTRING (0 0, 30 40)");
        let profile = Profile::from_plan(&plan, vec![Some(1.0), None, Some(3.0)]);
        let distances: Vec<f64> = profile.samples.iter().map(|s| s.distance).collect();
        assert_eq!(distances, vec![0.0, 25.0, 50.0]);
        assert_eq!(profile.samples[1].x, 15.0);
        assert_eq!(profile.samples[1].y, 20.0);
    }

    #[test]
    fn test_diagonal_distances_are_euclidean() {
        let plan = plan("LINESTRING (2 3, 12 13)");
        let profile = Profile::from_plan(&plan, vec![Some(0.0); 11]);
        let step = 2.0_f64.sqrt();
        for (i, sample) in profile.samples.iter().enumerate() {
            assert_approx_eq!(sample.distance, i as f64 * step, 1e-9);
            assert_approx_eq!(sample.x, 2.0 + i as f64, 1e-9);
        }
        assert_approx_eq!(profile.samples[10].distance, 200.0_f64.sqrt(), 1e-12);
    }

    #[test]
    fn test_distance_json_uses_null_for_nodata() {
        let plan = plan("LINESTRING (0 0, 30 40)");
        let profile = Profile::from_plan(&plan, vec![Some(1.5), None]);
        assert_eq!(profile.distance_json().unwrap(), "[[0.0,1.5],[50.0,null]]");
    }

    #[test]
    fn test_world_json() {
        let plan = plan("LINESTRING (10 20, 30 20)");
        let profile = Profile::from_plan(&plan, vec![Some(0.0), Some(2.0)]);
        assert_eq!(
            profile.world_json().unwrap(),
            "[[10.0,20.0,0.0],[30.0,20.0,2.0]]"
        );
    }
}
