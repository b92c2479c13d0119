//! Outer/hole hierarchy resolution.
//!
//! Boolean and offset results arrive as flat loop lists; the region driver
//! needs them grouped into machinable regions: an outer contour, its direct
//! holes, and how deeply the region is nested inside other regions (islands
//! inside holes form regions of their own).

use kerf_geom::{point_in_polygon, Path, Paths, Point, PointInPolygon};

use crate::{offset_paths, signed_area, EndKind, JoinKind};

/// One machinable region: an outer contour with its direct holes.
#[derive(Debug, Clone)]
pub struct PolyNode {
    /// Counterclockwise outer contour.
    pub contour: Path,
    /// Clockwise hole contours directly inside the outer.
    pub holes: Paths,
    /// Number of enclosing contours, counting outer and hole levels alike
    /// (0 for top level, 2 for an island inside a hole).
    pub nesting: usize,
}

/// The set of machinable regions resolved from a loop list.
#[derive(Debug, Clone, Default)]
pub struct PolyTree {
    /// Regions in input order, shallowest first among equals.
    pub nodes: Vec<PolyNode>,
}

impl PolyTree {
    /// Group a flat loop list (counterclockwise outers, clockwise holes)
    /// into regions and compute their nesting depth. Depth counts every
    /// enclosing loop, outer or hole, matching a polytree walk where the
    /// levels alternate.
    pub fn build(paths: &Paths) -> Self {
        let all_loops: Vec<&Path> = paths.iter().filter(|p| p.len() >= 3).collect();
        let outers: Vec<&Path> = all_loops
            .iter()
            .copied()
            .filter(|p| signed_area(p) > 0.0)
            .collect();
        let holes: Vec<&Path> = all_loops
            .iter()
            .copied()
            .filter(|p| signed_area(p) <= 0.0)
            .collect();

        let mut nodes: Vec<PolyNode> = outers
            .iter()
            .map(|&contour| {
                let nesting = all_loops
                    .iter()
                    .filter(|&&other| !std::ptr::eq(other, contour) && contains(other, contour))
                    .count();
                PolyNode {
                    contour: contour.clone(),
                    holes: Paths::new(),
                    nesting,
                }
            })
            .collect();

        // attach each hole to the innermost outer containing it
        for hole in &holes {
            let owner = nodes
                .iter_mut()
                .filter(|n| contains(&n.contour, hole))
                .max_by_key(|n| n.nesting);
            if let Some(node) = owner {
                node.holes.push((*hole).clone());
            }
        }

        Self { nodes }
    }

    /// True when no region was found.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Offset a path set and resolve the result into regions.
pub fn offset_poly_tree(paths: &Paths, join: JoinKind, delta: f64) -> PolyTree {
    PolyTree::build(&offset_paths(paths, join, EndKind::ClosedPolygon, delta))
}

/// True when `inner` lies inside `outer`, judged by the first vertex that is
/// not on the boundary.
fn contains(outer: &[Point], inner: &[Point]) -> bool {
    for &pt in inner {
        match point_in_polygon(pt, outer) {
            PointInPolygon::Inside => return true,
            PointInPolygon::Outside => return false,
            PointInPolygon::OnEdge => continue,
        }
    }
    false
}
