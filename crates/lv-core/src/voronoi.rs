//! Voronoi hit regions for the scatter layer
//!
//! Cells are built by clipping the plot extent with the bisector half-plane
//! of each neighbouring site, visiting neighbours in order of distance until
//! no further site can cut the cell. A pointer belongs to the cell that
//! contains it, which is the same as its nearest site, so lookups go through
//! an R-tree instead of polygon tests.

use ahash::AHashMap;
use rstar::primitives::GeomWithData;
use rstar::RTree;

pub type Site = [f64; 2];

type IndexedSite = GeomWithData<Site, usize>;

/// Axis-aligned clip rectangle, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: Site,
    pub max: Site,
}

impl Extent {
    pub fn new(min: Site, max: Site) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: Site) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }

    pub fn area(&self) -> f64 {
        (self.max[0] - self.min[0]).max(0.0) * (self.max[1] - self.min[1]).max(0.0)
    }

    fn corners(&self) -> Vec<Site> {
        vec![
            [self.min[0], self.min[1]],
            [self.max[0], self.min[1]],
            [self.max[0], self.max[1]],
            [self.min[0], self.max[1]],
        ]
    }
}

/// Partition of an extent into one cell per distinct site
#[derive(Clone)]
pub struct VoronoiDiagram {
    extent: Extent,
    cells: Vec<Option<Vec<Site>>>,
    tree: RTree<IndexedSite>,
}

impl VoronoiDiagram {
    /// Build the cells for `sites` clipped to `extent`.
    ///
    /// Cell `i` belongs to site `i`. Coincident sites share one cell, owned
    /// by the first of them; the others get none, as do non-finite sites.
    pub fn build(sites: &[Site], extent: Extent) -> Self {
        let mut seen: AHashMap<(u64, u64), usize> = AHashMap::with_capacity(sites.len());
        let mut owners = Vec::with_capacity(sites.len());

        for (i, site) in sites.iter().enumerate() {
            if !site[0].is_finite() || !site[1].is_finite() {
                continue;
            }
            // normalise -0.0 so it collides with 0.0
            let bits = ((site[0] + 0.0).to_bits(), (site[1] + 0.0).to_bits());
            if seen.contains_key(&bits) {
                continue;
            }
            seen.insert(bits, i);
            owners.push(GeomWithData::new(*site, i));
        }

        let tree = RTree::bulk_load(owners);
        let mut cells = vec![None; sites.len()];
        for owner in tree.iter() {
            cells[owner.data] = Self::clip_cell(&tree, owner, &extent);
        }

        tracing::debug!(
            "Built Voronoi diagram: {} sites, {} cells",
            sites.len(),
            tree.size()
        );

        Self {
            extent,
            cells,
            tree,
        }
    }

    fn clip_cell(tree: &RTree<IndexedSite>, owner: &IndexedSite, extent: &Extent) -> Option<Vec<Site>> {
        let site = *owner.geom();
        let mut polygon = extent.corners();

        for (neighbour, dist_2) in tree.nearest_neighbor_iter_with_distance_2(&site) {
            if neighbour.data == owner.data {
                continue;
            }
            // a neighbour further than twice the cell radius cannot reach it
            let radius_2 = polygon
                .iter()
                .map(|v| distance_2(*v, site))
                .fold(0.0_f64, f64::max);
            if dist_2 > 4.0 * radius_2 {
                break;
            }
            polygon = clip_half_plane(&polygon, site, *neighbour.geom());
            if polygon.is_empty() {
                return None;
            }
        }

        (polygon.len() >= 3).then_some(polygon)
    }

    /// Index of the site whose cell contains `p`, if `p` lies in the extent
    pub fn find(&self, p: Site) -> Option<usize> {
        if !self.extent.contains(p) {
            return None;
        }
        self.tree.nearest_neighbor(&p).map(|owner| owner.data)
    }

    /// Polygon of the cell owned by site `i`
    pub fn cell(&self, i: usize) -> Option<&[Site]> {
        self.cells.get(i).and_then(|c| c.as_deref())
    }

    /// All cells, indexed like the input sites
    pub fn cells(&self) -> impl Iterator<Item = (usize, &[Site])> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_deref().map(|c| (i, c)))
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl std::fmt::Debug for VoronoiDiagram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoronoiDiagram")
            .field("extent", &self.extent)
            .field("sites", &self.cells.len())
            .field("owners", &self.tree.size())
            .finish()
    }
}

fn distance_2(a: Site, b: Site) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Keep the part of `polygon` closer to `site` than to `other`
fn clip_half_plane(polygon: &[Site], site: Site, other: Site) -> Vec<Site> {
    let normal = [other[0] - site[0], other[1] - site[1]];
    let mid = [(site[0] + other[0]) * 0.5, (site[1] + other[1]) * 0.5];
    let side = |p: Site| (p[0] - mid[0]) * normal[0] + (p[1] - mid[1]) * normal[1];

    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (i, &current) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        let (sc, sn) = (side(current), side(next));
        if sc <= 0.0 {
            out.push(current);
        }
        if (sc < 0.0 && sn > 0.0) || (sc > 0.0 && sn < 0.0) {
            let t = sc / (sc - sn);
            out.push([
                current[0] + (next[0] - current[0]) * t,
                current[1] + (next[1] - current[1]) * t,
            ]);
        }
    }
    out
}

/// Even-odd point-in-polygon test
pub fn polygon_contains(polygon: &[Site], p: Site) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a[1] > p[1]) != (b[1] > p[1])
            && p[0] < (b[0] - a[0]) * (p[1] - a[1]) / (b[1] - a[1]) + a[0]
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Shoelace area of a simple polygon
pub fn polygon_area(polygon: &[Site]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let (a, b) = (polygon[i], polygon[(i + 1) % n]);
            a[0] * b[1] - b[0] * a[1]
        })
        .sum();
    twice.abs() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent() -> Extent {
        Extent::new([-20.0, -20.0], [420.0, 420.0])
    }

    #[test]
    fn test_two_sites_split_on_bisector() {
        let diagram = VoronoiDiagram::build(&[[0.0, 0.0], [400.0, 0.0]], extent());

        let left = diagram.cell(0).unwrap();
        let right = diagram.cell(1).unwrap();
        assert!(left.iter().all(|v| v[0] <= 200.0 + 1e-9));
        assert!(right.iter().all(|v| v[0] >= 200.0 - 1e-9));

        // a pointer far from both markers still resolves by cell
        assert_eq!(diagram.find([150.0, 410.0]), Some(0));
        assert_eq!(diagram.find([250.0, 410.0]), Some(1));
    }

    #[test]
    fn test_cells_tile_the_extent() {
        let sites: Vec<Site> = (0..25)
            .map(|i| {
                let i = i as f64;
                [(i * 73.0) % 400.0, (i * 151.0) % 400.0]
            })
            .collect();
        let diagram = VoronoiDiagram::build(&sites, extent());

        let total: f64 = diagram.cells().map(|(_, c)| polygon_area(c)).sum();
        assert!((total - extent().area()).abs() < 1e-6 * extent().area());
    }

    #[test]
    fn test_find_agrees_with_cell_membership() {
        let sites: Vec<Site> = vec![
            [10.0, 10.0],
            [200.0, 50.0],
            [390.0, 390.0],
            [120.0, 300.0],
            [300.0, 180.0],
        ];
        let diagram = VoronoiDiagram::build(&sites, extent());

        for gx in 0..20 {
            for gy in 0..20 {
                let p = [-15.0 + gx as f64 * 22.3, -15.0 + gy as f64 * 22.1];
                let owner = diagram.find(p).unwrap();
                assert!(
                    polygon_contains(diagram.cell(owner).unwrap(), p),
                    "{p:?} not inside cell of site {owner}"
                );
            }
        }
    }

    #[test]
    fn test_coincident_sites_have_one_owner() {
        let diagram = VoronoiDiagram::build(&[[5.0, 5.0], [100.0, 100.0], [5.0, 5.0]], extent());
        assert!(diagram.cell(0).is_some());
        assert!(diagram.cell(2).is_none());
        assert_eq!(diagram.find([6.0, 6.0]), Some(0));
        assert_eq!(diagram.len(), 3);
    }

    #[test]
    fn test_outside_extent_hits_nothing() {
        let diagram = VoronoiDiagram::build(&[[0.0, 0.0]], extent());
        assert_eq!(diagram.find([-25.0, 0.0]), None);
        assert_eq!(diagram.find([0.0, 0.0]), Some(0));
        // a lone site owns the whole extent
        assert_eq!(polygon_area(diagram.cell(0).unwrap()), extent().area());
    }

    #[test]
    fn test_empty_input() {
        let diagram = VoronoiDiagram::build(&[], extent());
        assert!(diagram.is_empty());
        assert_eq!(diagram.find([0.0, 0.0]), None);
    }
}
