mod dbscan;

pub use dbscan::dbscan;
