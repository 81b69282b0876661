use cloth_core::grid::ClothGrid;
use cloth_core::ClothConfig;
use glam::{Vec3, Vec4};

#[test]
fn test_index_and_coords_roundtrip() {
    let grid = ClothGrid::new(5, 3, 1.0);
    for i in 0..grid.len() {
        let (u, v) = grid.coords(i);
        assert_eq!(grid.index(u, v), i);
    }
    assert_eq!(grid.index(4, 0), 4);
    assert_eq!(grid.index(0, 1), 5);
}

#[test]
fn test_neighbor_counts() {
    let grid = ClothGrid::new(4, 4, 1.0);
    assert_eq!(grid.neighbors(0, 0).count(), 2, "corner");
    assert_eq!(grid.neighbors(1, 0).count(), 3, "edge");
    assert_eq!(grid.neighbors(2, 2).count(), 4, "interior");
    assert_eq!(grid.neighbors(3, 3).count(), 2, "far corner");
}

#[test]
fn test_single_row_has_no_vertical_links() {
    let grid = ClothGrid::new(2, 1, 1.0);
    let n: Vec<_> = grid.neighbors(0, 0).collect();
    assert_eq!(n, vec![(1, 0)]);
    assert_eq!(grid.link_count(), 1);
}

#[test]
fn test_link_count() {
    // 5 rows of 4 horizontal links, 5 columns of 4 vertical links
    let grid = ClothGrid::new(5, 5, 0.1);
    assert_eq!(grid.link_count(), 40);
}

#[test]
fn test_flat_sheet_layout_matches_config() {
    let mut config = ClothConfig::small_sphere();
    config.resolution = 4;
    config.scale = 4.0;
    config.start = Vec3::new(0.5, -1.0, 10.0);
    let grid = ClothGrid::from_config(&config);
    assert_eq!(grid.spacing(), 1.0);

    let mut sheet = vec![Vec4::ZERO; grid.len()];
    grid.write_flat_sheet(config.sheet_origin(), &mut sheet);

    // origin = start - scale / 2 in x and y
    assert_eq!(sheet[0], Vec4::new(-1.5, -3.0, 10.0, 1.0));
    assert_eq!(sheet[grid.index(3, 0)], Vec4::new(1.5, -3.0, 10.0, 1.0));
    assert_eq!(sheet[grid.index(0, 2)], Vec4::new(-1.5, -1.0, 10.0, 1.0));
    for p in &sheet {
        assert_eq!(p.z, 10.0);
        assert_eq!(p.w, 1.0);
    }
}

#[test]
fn test_tiles_cover_grid_once() {
    let grid = ClothGrid::new(10, 7, 1.0);
    let mut hits = vec![0u32; grid.len()];
    for tile in grid.tiles(4) {
        assert!(tile.width() <= 4 && tile.height() <= 4);
        for v in tile.v0..tile.v1 {
            for u in tile.u0..tile.u1 {
                hits[grid.index(u, v)] += 1;
            }
        }
    }
    assert!(hits.iter().all(|&h| h == 1), "every cell covered exactly once");
    assert_eq!(grid.tiles(4).count(), 3 * 2);
}

#[test]
fn test_quad_indices() {
    let grid = ClothGrid::new(3, 3, 1.0);
    let quads = grid.quad_indices();
    assert_eq!(quads.len(), 4 * 4);
    assert_eq!(&quads[..4], &[0, 1, 4, 3]);
    assert!(quads.iter().all(|&i| (i as usize) < grid.len()));
}
