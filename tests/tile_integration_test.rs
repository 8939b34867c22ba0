use gallery_tools::{run_tile_job, GalleryError, TileConfig};
use image::{Rgb, RgbImage};
use std::path::Path;
use tempfile::TempDir;

fn write_pyramid(root: &Path, factor: u32, size: u32) {
    for row in 0..factor {
        let dir = root.join(factor.to_string()).join(row.to_string());
        std::fs::create_dir_all(&dir).unwrap();
        for col in 0..factor {
            let color = Rgb([(row * 200) as u8, (col * 200) as u8, 40]);
            RgbImage::from_pixel(size, size, color)
                .save(dir.join(format!("{}.jpg", col)))
                .unwrap();
        }
    }
}

fn tile_config(base_dir: &Path, output_dir: &Path, dim: u32, factor: u32, repeat: u32) -> TileConfig {
    TileConfig {
        base_dir: base_dir.to_string_lossy().into_owned(),
        dim,
        factor,
        repeat,
        fname: "preview".to_string(),
        output_dir: output_dir.to_string_lossy().into_owned(),
        concurrent_loads: 3,
        verbose: false,
        monitor: false,
    }
}

#[tokio::test]
async fn test_stitches_pyramid_into_requested_size() {
    let pyramid = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pyramid(pyramid.path(), 2, 64);

    let outputs = run_tile_job(tile_config(pyramid.path(), output.path(), 100, 2, 1), false)
        .await
        .unwrap();

    assert_eq!(outputs.len(), 1);
    let written = output.path().join("preview.jpg");
    assert!(written.exists());

    let image = image::open(&written).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (100, 100));

    // 每個象限的中心顏色應對應其 tile
    let top_right = image.get_pixel(75, 25);
    assert!(top_right[1] > 150 && top_right[0] < 60);
    let bottom_left = image.get_pixel(25, 75);
    assert!(bottom_left[0] > 150 && bottom_left[1] < 60);
}

#[tokio::test]
async fn test_repeat_keeps_requested_size() {
    let pyramid = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pyramid(pyramid.path(), 2, 16);

    run_tile_job(tile_config(pyramid.path(), output.path(), 90, 2, 3), false)
        .await
        .unwrap();

    let image = image::open(output.path().join("preview.jpg")).unwrap();
    assert_eq!((image.width(), image.height()), (90, 90));
}

#[tokio::test]
async fn test_missing_level_fails_with_tile_path() {
    let pyramid = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pyramid(pyramid.path(), 2, 16);

    let result = run_tile_job(tile_config(pyramid.path(), output.path(), 90, 4, 1), false).await;

    match result {
        Err(GalleryError::MissingTileError { path }) => assert!(path.starts_with("4/")),
        other => panic!("expected MissingTileError, got {:?}", other),
    }
    assert!(!output.path().join("preview.jpg").exists());
}

#[tokio::test]
async fn test_fname_with_subdirectory_writes_nested_file() {
    let pyramid = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pyramid(pyramid.path(), 2, 16);

    let mut config = tile_config(pyramid.path(), output.path(), 40, 2, 1);
    config.fname = "sub/x".to_string();
    assert!(gallery_tools::utils::validation::Validate::validate(&config).is_ok());

    let outputs = run_tile_job(config, false).await.unwrap();

    let written = output.path().join("sub").join("x.jpg");
    assert!(written.exists());
    assert!(outputs[0].ends_with("sub/x.jpg"));
    let image = image::open(&written).unwrap();
    assert_eq!((image.width(), image.height()), (40, 40));
}
