use pcl_radar::cluster::dbscan;
use pcl_radar::config::ClusterConfig;
use pcl_radar::model::Detection;

fn det(d: usize, r: usize) -> Detection {
    Detection { doppler_idx: d, range_idx: r, power: 1.0 }
}

#[test]
fn min_samples_one_eps_infinite_yields_single_cluster() {
    let detections = vec![det(0, 0), det(500, 500), det(10, 900), det(999, 1)];
    let config = ClusterConfig { eps: f64::INFINITY, min_samples: 1 };
    let clusters = dbscan(&detections, &config);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].detections.len(), detections.len());
    assert!(clusters[0].label >= 0);
}

#[test]
fn default_parameters_separate_well_spaced_groups() {
    let mut detections = Vec::new();
    for i in 0..5 {
        detections.push(det(10 + i, 10));
    }
    for i in 0..5 {
        detections.push(det(80 + i, 80));
    }
    let config = ClusterConfig::default();
    let clusters = dbscan(&detections, &config);
    let real: Vec<_> = clusters.iter().filter(|c| c.label >= 0).collect();
    assert_eq!(real.len(), 2);
}

#[test]
fn empty_input_yields_no_clusters() {
    let config = ClusterConfig::default();
    let clusters = dbscan(&[], &config);
    assert!(clusters.is_empty());
}
