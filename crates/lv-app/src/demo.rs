//! Demo mode
//! Creates a synthetic embedding with per-point coordinate histograms

use async_trait::async_trait;
use lv_core::{HistogramEntry, LinkedData, Point};
use lv_data::sources::LinkedDataSource;
use lv_data::{DataError, LoadedData};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Demo data source that generates clustered points
pub struct DemoDataSource {
    clusters: usize,
    points_per_cluster: usize,
    coordinates: usize,
    seed: u64,
}

impl DemoDataSource {
    pub fn new() -> Self {
        Self {
            clusters: 5,
            points_per_cluster: 60,
            coordinates: 8,
            seed: 42,
        }
    }

    pub fn with_size(clusters: usize, points_per_cluster: usize, coordinates: usize) -> Self {
        Self {
            clusters,
            points_per_cluster,
            coordinates,
            ..Self::new()
        }
    }

    /// Generate the tables. Points of one cluster share a coordinate profile.
    pub fn generate(&self) -> LinkedData {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let centers: Vec<(f64, f64)> = (0..self.clusters)
            .map(|_| (rng.gen_range(-30.0..30.0), rng.gen_range(-30.0..30.0)))
            .collect();
        let profiles: Vec<Vec<f64>> = (0..self.clusters)
            .map(|_| (0..self.coordinates).map(|_| rng.gen_range(-4.0..6.0)).collect())
            .collect();

        let mut points = Vec::with_capacity(self.clusters * self.points_per_cluster);
        let mut histogram = Vec::with_capacity(points.capacity() * self.coordinates);

        for (cluster, (&(cx, cy), profile)) in centers.iter().zip(&profiles).enumerate() {
            for _ in 0..self.points_per_cluster {
                let id = (points.len() + 1).to_string();
                let x = cx + noise(&mut rng) * 4.0;
                let y = cy + noise(&mut rng) * 4.0;
                points.push(Point::new(id.as_str(), x, y, (cluster + 1) as f64));

                for (j, base) in profile.iter().enumerate() {
                    let value = base + noise(&mut rng);
                    histogram.push(HistogramEntry::new(id.as_str(), format!("c{}", j + 1), value));
                }
            }
        }

        LinkedData::new(points, histogram)
    }
}

impl Default for DemoDataSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Roughly normal noise with unit spread
fn noise(rng: &mut StdRng) -> f64 {
    (0..4).map(|_| rng.gen_range(-1.0..1.0)).sum::<f64>() * 0.866
}

#[async_trait]
impl LinkedDataSource for DemoDataSource {
    async fn load(&self) -> Result<LoadedData, DataError> {
        let data = self.generate();
        tracing::info!(
            "Generated demo data: {} points, {} histogram rows",
            data.points.len(),
            data.histogram.len()
        );
        Ok(LoadedData { data, options: None })
    }

    fn source_name(&self) -> &str {
        "Demo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lv_core::GroupIndex;

    #[test]
    fn test_every_point_has_a_histogram() {
        let data = DemoDataSource::with_size(3, 10, 4).generate();
        assert_eq!(data.points.len(), 30);

        let index = GroupIndex::build(data.histogram.clone());
        assert_eq!(index.len(), 30);
        assert_eq!(index.coord_names(), ["c1", "c2", "c3", "c4"]);
        assert!(data.points.iter().all(|p| index.contains(&p.key)));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = DemoDataSource::new().generate();
        let b = DemoDataSource::new().generate();
        assert_eq!(a.points, b.points);
        assert_eq!(a.histogram, b.histogram);
    }

    #[tokio::test]
    async fn test_demo_source_loads() {
        let loaded = DemoDataSource::with_size(2, 5, 3).load().await.unwrap();
        assert_eq!(loaded.data.points.len(), 10);
        assert!(loaded.options.is_none());
    }
}
