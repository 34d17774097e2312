use ndarray::Array2;
use pcl_radar::config::MorphConfig;
use pcl_radar::detect::clean_mask;

#[test]
fn cleanup_is_idempotent_on_arbitrary_mask() {
    let mut mask = Array2::<u8>::zeros((30, 30));
    for ((i, j), v) in mask.indexed_iter_mut() {
        *v = (((i * 3 + j * 5) % 7) == 0) as u8;
    }
    let config = MorphConfig { min_size: 4, struct_size: 3 };
    let once = clean_mask(&mask, &config);
    let twice = clean_mask(&once, &config);
    assert_eq!(once, twice, "clean(clean(m)) must equal clean(m)");
}

#[test]
fn small_object_removal_drops_components_under_min_size() {
    let mut mask = Array2::<u8>::zeros((20, 20));
    mask[[10, 10]] = 1;
    mask[[10, 11]] = 1; // 2-pixel blob, under min_size
    let config = MorphConfig { min_size: 5, struct_size: 1 };
    let cleaned = clean_mask(&mask, &config);
    assert_eq!(cleaned.iter().filter(|&&v| v == 1).count(), 0);
}

#[test]
fn opening_removes_isolated_single_pixel_noise() {
    let mut mask = Array2::<u8>::zeros((20, 20));
    mask[[5, 5]] = 1;
    let config = MorphConfig { min_size: 1, struct_size: 3 };
    let cleaned = clean_mask(&mask, &config);
    assert_eq!(cleaned[[5, 5]], 0, "opening should erase a lone pixel before closing can restore it");
}
