//! Footprint geometry: winding normalization, degenerate-point repair,
//! and footprint union.
//!
//! The signed-area test applies the shoelace formula with x/y swapped
//! relative to the textbook form. This is intentional and load-bearing:
//! downstream consumers expect the sign convention that swap produces,
//! where `area > 0` means the ring is already in the required winding
//! order. Do not "fix" it back.

use geo::{BooleanOps, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// One 2-D coordinate pair, `[lon, lat]` as GeoJSON orders them.
pub type Position = [f64; 2];

/// An ordered, closed coordinate ring.
pub type Ring = Vec<Position>;

/// GeoJSON-shaped footprint geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Footprint {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

/// Swapped-axis shoelace signed area of a ring.
pub fn signed_area(ring: &[Position]) -> f64 {
    let n = ring.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += ring[i][1] * ring[j][0];
        area -= ring[j][1] * ring[i][0];
    }
    area / 2.0
}

/// Put a ring into the required winding order, with one bounded retry.
///
/// A ring with `area > 0` is returned unchanged. Otherwise the ring is
/// reversed and re-tested; if the reversed ring still fails the test it
/// is accepted as-is and flagged (`false`), never looped on.
pub fn normalize_ring(ring: &[Position]) -> (Ring, bool) {
    if signed_area(ring) > 0.0 {
        return (ring.to_vec(), true);
    }
    let reversed: Ring = ring.iter().rev().copied().collect();
    let conforming = signed_area(&reversed) > 0.0;
    (reversed, conforming)
}

/// Normalize every ring of a footprint, preserving ring order.
///
/// Returns the normalized footprint and the number of rings that still
/// failed the winding test after their one reversal attempt.
pub fn normalize_footprint(footprint: &Footprint) -> (Footprint, usize) {
    let mut nonconforming = 0;
    let mut normalize = |ring: &Ring| {
        let (normalized, ok) = normalize_ring(ring);
        if !ok {
            nonconforming += 1;
        }
        normalized
    };
    let normalized = match footprint {
        Footprint::Polygon(rings) => Footprint::Polygon(rings.iter().map(&mut normalize).collect()),
        Footprint::MultiPolygon(polygons) => Footprint::MultiPolygon(
            polygons
                .iter()
                .map(|rings| rings.iter().map(&mut normalize).collect())
                .collect(),
        ),
    };
    (normalized, nonconforming)
}

/// Remove the first immediately-repeated point from a ring.
///
/// Single forward scan: only the first adjacent duplicate found is
/// removed, then the scan stops. Three-in-a-row identical points lose
/// only one element. Prevents zero-length edges from reaching the union
/// step.
pub fn fix_ring(ring: &[Position]) -> Ring {
    for i in 1..ring.len() {
        if ring[i] == ring[i - 1] {
            let mut fixed = ring.to_vec();
            fixed.remove(i);
            return fixed;
        }
    }
    ring.to_vec()
}

/// Apply [`fix_ring`] to every ring of a footprint.
pub fn fix_footprint(footprint: &Footprint) -> Footprint {
    match footprint {
        Footprint::Polygon(rings) => {
            Footprint::Polygon(rings.iter().map(|r| fix_ring(r)).collect())
        }
        Footprint::MultiPolygon(polygons) => Footprint::MultiPolygon(
            polygons
                .iter()
                .map(|rings| rings.iter().map(|r| fix_ring(r)).collect())
                .collect(),
        ),
    }
}

/// Union a set of footprints into one polygon or multipolygon.
///
/// Rings are repaired before the union; the result is not winding
/// normalized here (the artifact builder does that as its final step).
pub fn union_footprints(footprints: &[Footprint]) -> Result<Footprint, GeometryError> {
    let mut parts = footprints
        .iter()
        .map(|fp| to_multipolygon(&fix_footprint(fp)));
    let first = parts.next().ok_or(GeometryError::EmptyUnion)?;
    let union = parts.fold(first, |acc, next| acc.union(&next));
    Ok(from_multipolygon(&union))
}

/// Axis-aligned bounding box `[min_x, min_y, max_x, max_y]`.
pub fn bounding_box(footprint: &Footprint) -> Option<[f64; 4]> {
    let mut bbox: Option<[f64; 4]> = None;
    let mut extend = |ring: &Ring| {
        for p in ring {
            bbox = Some(match bbox {
                None => [p[0], p[1], p[0], p[1]],
                Some(b) => [
                    b[0].min(p[0]),
                    b[1].min(p[1]),
                    b[2].max(p[0]),
                    b[3].max(p[1]),
                ],
            });
        }
    };
    match footprint {
        Footprint::Polygon(rings) => rings.iter().for_each(&mut extend),
        Footprint::MultiPolygon(polygons) => polygons
            .iter()
            .flat_map(|rings| rings.iter())
            .for_each(&mut extend),
    }
    bbox
}

/// Whether two bounding boxes overlap.
pub fn bboxes_overlap(a: &[f64; 4], b: &[f64; 4]) -> bool {
    a[0] <= b[2] && b[0] <= a[2] && a[1] <= b[3] && b[1] <= a[3]
}

fn ring_to_linestring(ring: &Ring) -> LineString<f64> {
    LineString::from(
        ring.iter()
            .map(|p| (p[0], p[1]))
            .collect::<Vec<(f64, f64)>>(),
    )
}

fn polygon_from_rings(rings: &[Ring]) -> Polygon<f64> {
    let exterior = rings
        .first()
        .map(|r| ring_to_linestring(r))
        .unwrap_or_else(|| LineString::new(Vec::new()));
    let interiors = rings.iter().skip(1).map(|r| ring_to_linestring(r)).collect();
    Polygon::new(exterior, interiors)
}

fn to_multipolygon(footprint: &Footprint) -> MultiPolygon<f64> {
    match footprint {
        Footprint::Polygon(rings) => MultiPolygon::new(vec![polygon_from_rings(rings)]),
        Footprint::MultiPolygon(polygons) => MultiPolygon::new(
            polygons
                .iter()
                .map(|rings| polygon_from_rings(rings))
                .collect(),
        ),
    }
}

fn linestring_to_ring(line: &LineString<f64>) -> Ring {
    line.coords().map(|c| [c.x, c.y]).collect()
}

fn polygon_to_rings(polygon: &Polygon<f64>) -> Vec<Ring> {
    let mut rings = vec![linestring_to_ring(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(linestring_to_ring));
    rings
}

fn from_multipolygon(multi: &MultiPolygon<f64>) -> Footprint {
    if multi.0.len() == 1 {
        Footprint::Polygon(polygon_to_rings(&multi.0[0]))
    } else {
        Footprint::MultiPolygon(multi.0.iter().map(polygon_to_rings).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Ring {
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]
    }

    #[test]
    fn square_ring_sign_matches_the_swapped_axis_convention() {
        // Counter-clockwise in lon/lat terms: negative under the swapped
        // shoelace, so it must be reversed.
        assert!(signed_area(&square()) < 0.0);
        let reversed: Ring = square().iter().rev().copied().collect();
        assert!(signed_area(&reversed) > 0.0);
    }

    #[test]
    fn conforming_ring_is_returned_unchanged() {
        let ring: Ring = square().iter().rev().copied().collect();
        let (normalized, ok) = normalize_ring(&ring);
        assert!(ok);
        assert_eq!(normalized, ring);
    }

    #[test]
    fn nonconforming_ring_is_exactly_reversed() {
        let ring = square();
        let (normalized, ok) = normalize_ring(&ring);
        assert!(ok);
        let expected: Ring = ring.iter().rev().copied().collect();
        assert_eq!(normalized, expected);
    }

    #[test]
    fn degenerate_ring_is_flagged_after_one_reversal() {
        // Zero area either way round: accepted as-is after one attempt.
        let ring: Ring = vec![[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]];
        let (_, ok) = normalize_ring(&ring);
        assert!(!ok);
    }

    #[test]
    fn fix_ring_removes_exactly_one_adjacent_duplicate() {
        let ring: Ring = vec![[0.0, 0.0], [0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
        let fixed = fix_ring(&ring);
        assert_eq!(fixed, vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
    }

    #[test]
    fn fix_ring_single_pass_stops_at_first_duplicate() {
        let ring: Ring = vec![[0.0, 0.0], [0.0, 0.0], [0.0, 0.0], [1.0, 1.0]];
        let fixed = fix_ring(&ring);
        // Only the first adjacent pair collapses.
        assert_eq!(fixed.len(), ring.len() - 1);
    }

    #[test]
    fn fix_ring_leaves_clean_rings_alone() {
        let ring = square();
        assert_eq!(fix_ring(&ring), ring);
    }

    #[test]
    fn union_of_disjoint_squares_is_a_multipolygon() {
        let a = Footprint::Polygon(vec![square()]);
        let b = Footprint::Polygon(vec![vec![
            [10.0, 10.0],
            [11.0, 10.0],
            [11.0, 11.0],
            [10.0, 11.0],
            [10.0, 10.0],
        ]]);
        let union = union_footprints(&[a, b]).expect("union must succeed");
        assert!(matches!(union, Footprint::MultiPolygon(ref polys) if polys.len() == 2));
    }

    #[test]
    fn union_of_overlapping_squares_is_one_polygon() {
        let a = Footprint::Polygon(vec![square()]);
        let b = Footprint::Polygon(vec![vec![
            [0.5, 0.5],
            [1.5, 0.5],
            [1.5, 1.5],
            [0.5, 1.5],
            [0.5, 0.5],
        ]]);
        let union = union_footprints(&[a, b]).expect("union must succeed");
        assert!(matches!(union, Footprint::Polygon(_)));
    }

    #[test]
    fn union_of_nothing_is_an_error() {
        assert!(matches!(
            union_footprints(&[]),
            Err(GeometryError::EmptyUnion)
        ));
    }

    #[test]
    fn footprint_serde_matches_geojson_shape() {
        let fp = Footprint::Polygon(vec![square()]);
        let value = serde_json::to_value(&fp).expect("footprint must serialize");
        assert_eq!(value["type"], "Polygon");
        assert!(value["coordinates"].is_array());
        let back: Footprint = serde_json::from_value(value).expect("footprint must deserialize");
        assert_eq!(back, fp);
    }

    #[test]
    fn bounding_boxes_overlap_test() {
        let a = Footprint::Polygon(vec![square()]);
        let b = Footprint::Polygon(vec![vec![
            [0.5, 0.5],
            [2.0, 0.5],
            [2.0, 2.0],
            [0.5, 2.0],
            [0.5, 0.5],
        ]]);
        let ba = bounding_box(&a).expect("bbox");
        let bb = bounding_box(&b).expect("bbox");
        assert!(bboxes_overlap(&ba, &bb));

        let far = bounding_box(&Footprint::Polygon(vec![vec![
            [10.0, 10.0],
            [11.0, 10.0],
            [11.0, 11.0],
            [10.0, 10.0],
        ]]))
        .expect("bbox");
        assert!(!bboxes_overlap(&ba, &far));
    }
}
