#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use yolo_annotator::ir::{Annotation, BBoxXYWH, Category, Image, ImageId, Project};

/// A minimal 24-bit BMP; only the header matters to the importer.
pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

pub fn write_text(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write text file");
}

/// Three images (the last one unlabeled) and two categories.
pub fn sample_project() -> Project {
    let images = vec![
        Image::new(1u64, "train/img_a.bmp", 20, 10),
        Image::new(2u64, "train/img_b.bmp", 12, 8),
        Image::new(3u64, "train/img_c.bmp", 6, 6),
    ];

    let mut annotations: BTreeMap<ImageId, Vec<Annotation>> = BTreeMap::new();
    annotations.insert(
        ImageId(1),
        vec![
            Annotation::new(1u64, 0u64, BBoxXYWH::from_xywh(0.3, 0.3, 0.4, 0.4)),
            Annotation::new(2u64, 1u64, BBoxXYWH::from_xywh(0.15, 0.2, 0.1, 0.2)),
        ],
    );
    annotations.insert(
        ImageId(2),
        vec![Annotation::new(
            1u64,
            1u64,
            BBoxXYWH::from_xywh(0.25, 0.25, 0.5, 0.5),
        )],
    );

    Project {
        images,
        annotations,
        categories: vec![Category::new(0u64, "person"), Category::new(1u64, "bicycle")],
    }
}
