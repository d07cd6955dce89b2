use std::sync::atomic::Ordering;

use thumbservice::{
    constants::COLOR_REDUCTION_LEVEL, frame::Frame, settings::Settings, ThumbnailPipeline,
    ThumbnailResponse,
};

mod common;
use common::*;

fn color_pipeline(
    settings: Settings,
    archive: FakeArchive,
    align: bool,
) -> TestPipeline {
    ThumbnailPipeline::new(
        settings,
        archive,
        CountingStore::default(),
        FakeConverter::default(),
        FakeSolver {
            succeed: align,
            ..FakeSolver::default()
        },
    )
}

fn archive_for_request(request_frames: Vec<Frame>) -> FakeArchive {
    FakeArchive {
        request_frames,
        ..FakeArchive::with_frames([frame(11, Some(7), "rp")])
    }
}

#[test]
fn test_color_thumbnail_with_alignment() {
    let (dir, settings) = tmp_settings();
    let pipeline = color_pipeline(settings, archive_for_request(rvb_request(7)), true);

    let response = pipeline
        .handle_frame_id(11, &request(&[("color", "true")]))
        .unwrap();
    assert!(matches!(response, ThumbnailResponse::Json { .. }));

    let archive = pipeline.frames();
    assert_eq!(archive.listings.load(Ordering::SeqCst), 1);
    assert_eq!(
        *archive.reduction_levels.lock().unwrap(),
        vec![COLOR_REDUCTION_LEVEL]
    );
    assert_eq!(archive.downloads.load(Ordering::SeqCst), 3);

    let (inputs, all_present) = pipeline.converter().inputs.lock().unwrap()[0].clone();
    assert!(all_present);
    assert_eq!(inputs.len(), 3);
    assert!(inputs[0].as_str().contains("-0011-"));
    assert!(!inputs[0].as_str().ends_with("_affineremap.fits"));
    assert!(inputs[1].as_str().contains("-0012-"));
    assert!(inputs[1].as_str().ends_with("_affineremap.fits"));
    assert!(inputs[2].as_str().contains("-0013-"));
    assert!(inputs[2].as_str().ends_with("_affineremap.fits"));

    assert_eq!(pipeline.store().uploads.load(Ordering::SeqCst), 1);
    assert!(leftover_files(&dir).is_empty());
}

#[test]
fn test_color_thumbnail_falls_back_to_unaligned_frames() {
    let (dir, settings) = tmp_settings();
    let pipeline = color_pipeline(settings, archive_for_request(rvb_request(7)), false);

    pipeline
        .handle_frame_id(11, &request(&[("color", "true")]))
        .unwrap();

    let (inputs, all_present) = pipeline.converter().inputs.lock().unwrap()[0].clone();
    assert!(all_present);
    assert_eq!(inputs.len(), 3);
    assert!(inputs
        .iter()
        .all(|path| !path.as_str().ends_with("_affineremap.fits")));
    assert_eq!(pipeline.store().uploads.load(Ordering::SeqCst), 1);
    assert!(leftover_files(&dir).is_empty());
}

#[test]
fn test_missing_band_is_not_found() {
    let (dir, settings) = tmp_settings();
    let mut siblings = rvb_request(7);
    siblings.retain(|f| f.primary_optical_element.as_deref() != Some("B"));
    let pipeline = color_pipeline(settings, archive_for_request(siblings), true);

    let err = pipeline
        .handle_frame_id(11, &request(&[("color", "true")]))
        .unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert_eq!(err.message(), "RVB frames not found");
    assert_eq!(pipeline.frames().downloads.load(Ordering::SeqCst), 0);
    assert_eq!(pipeline.converter().calls.load(Ordering::SeqCst), 0);
    assert!(leftover_files(&dir).is_empty());
}

#[test]
fn test_failed_band_download_removes_earlier_bands() {
    let (dir, settings) = tmp_settings();
    let archive = FakeArchive {
        fail_download_of: Some(13),
        ..archive_for_request(rvb_request(7))
    };
    let pipeline = color_pipeline(settings, archive, true);

    let err = pipeline
        .handle_frame_id(11, &request(&[("color", "true")]))
        .unwrap_err();

    assert_eq!(err.status_code(), 502);
    assert_eq!(pipeline.frames().downloads.load(Ordering::SeqCst), 3);
    assert_eq!(pipeline.converter().calls.load(Ordering::SeqCst), 0);
    assert!(leftover_files(&dir).is_empty());
}

#[test]
fn test_color_requires_a_request() {
    let (_dir, settings) = tmp_settings();
    let archive = FakeArchive::with_frames([frame(11, None, "rp")]);
    let pipeline = color_pipeline(settings, archive, true);

    let err = pipeline
        .handle_frame_id(11, &request(&[("color", "true")]))
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(pipeline.frames().network_calls(), 0);
}

#[test]
fn test_color_and_greyscale_are_cached_separately() {
    let (_dir, settings) = tmp_settings();
    let pipeline = color_pipeline(settings, archive_for_request(rvb_request(7)), false);

    let grey = pipeline.handle_frame_id(11, &request(&[])).unwrap();
    let color = pipeline
        .handle_frame_id(11, &request(&[("color", "true")]))
        .unwrap();

    assert_ne!(grey.url(), color.url());
    assert_eq!(pipeline.store().inner.len(), 2);
    assert_eq!(pipeline.frames().downloads.load(Ordering::SeqCst), 4);
}
