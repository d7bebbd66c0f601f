/// End-to-end compositing: detections in, composited frames out.
use tagwarp::composite::homography::{rect_corners, Homography};
use tagwarp::composite::{
    composite_frame, resolve, AnchorIds, Compositor, CornerSelection, ReferenceCache,
    ReferencePoints,
};
use tagwarp::config::CompositorConfig;
use tagwarp::detection::{Corners, DetectionResult, MarkerDetection};
use tagwarp::error::Skip;
use tagwarp::image::ImageRgb8;
use tagwarp::playback::SourceQueue;

const SOURCE_COLOR: [u8; 3] = [10, 200, 30];

fn marker(x: f64, y: f64) -> Corners {
    [[x, y], [x + 20.0, y], [x + 20.0, y + 20.0], [x, y + 20.0]]
}

/// Four upright markers whose outer corners span (100,100)-(300,300).
fn board() -> DetectionResult {
    DetectionResult::new(vec![
        MarkerDetection::new(1, marker(100.0, 100.0)),
        MarkerDetection::new(2, marker(280.0, 100.0)),
        MarkerDetection::new(3, marker(280.0, 280.0)),
        MarkerDetection::new(4, marker(100.0, 280.0)),
    ])
}

fn board_refs() -> ReferencePoints {
    ReferencePoints::new([
        marker(100.0, 100.0),
        marker(280.0, 100.0),
        marker(280.0, 280.0),
        marker(100.0, 280.0),
    ])
}

fn anchors() -> AnchorIds {
    AnchorIds::new(&[1, 2, 3, 4]).unwrap()
}

fn config(use_cache: bool) -> CompositorConfig {
    CompositorConfig {
        use_cache,
        ..CompositorConfig::with_anchors(anchors())
    }
}

fn gradient_frame(seed: u32) -> ImageRgb8 {
    let mut img = ImageRgb8::new(640, 480);
    for y in 0..480 {
        for x in 0..640 {
            img.set(x, y, [((x + seed) % 256) as u8, ((y * 3 + seed) % 256) as u8, 128]);
        }
    }
    img
}

fn source() -> ImageRgb8 {
    ImageRgb8::filled(100, 50, SOURCE_COLOR)
}

#[test]
fn overlay_fills_square_and_leaves_rest() {
    let frame = gradient_frame(0);
    let mut comp = Compositor::new(config(false)).unwrap();
    let out = comp
        .find_and_warp(&frame, &source(), &board())
        .expect("all four anchors visible");

    assert_eq!((out.width, out.height), (640, 480));
    for y in 0..480u32 {
        for x in 0..640u32 {
            let outside = !(95..=305).contains(&x) || !(95..=305).contains(&y);
            if outside {
                assert_eq!(out.get(x, y), frame.get(x, y), "changed outside at ({x}, {y})");
            }
        }
    }
    for y in (104..=295u32).step_by(7) {
        for x in (104..=295u32).step_by(7) {
            assert_eq!(out.get(x, y), SOURCE_COLOR, "not replaced at ({x}, {y})");
        }
    }
}

#[test]
fn compositing_leaves_input_frame_untouched() {
    let frame = gradient_frame(3);
    let before = frame.clone();
    let mut comp = Compositor::new(config(true)).unwrap();
    comp.find_and_warp(&frame, &source(), &board()).unwrap();
    assert_eq!(frame, before);
}

#[test]
fn exact_count_gate_rejects_extra_markers() {
    let mut det = board();
    det.markers.push(MarkerDetection::new(5, marker(500.0, 400.0)));
    assert!(resolve(&det, &anchors()).is_empty());

    let mut det = board();
    det.markers.pop();
    det.rejected.push(marker(100.0, 280.0));
    assert!(resolve(&det, &anchors()).is_empty());
}

#[test]
fn cache_holds_last_complete_set() {
    let frame = gradient_frame(0);
    let mut comp = Compositor::new(config(true)).unwrap();
    assert!(!comp.cache().is_warm());

    comp.find_and_warp(&frame, &source(), &board()).unwrap();
    assert_eq!(comp.cache().get(), Some(&board_refs()));

    // Fallback re-persists the same set
    comp.find_and_warp(&frame, &source(), &DetectionResult::default())
        .unwrap();
    assert_eq!(comp.cache().get(), Some(&board_refs()));

    // A fresh, moved board replaces it
    let moved = DetectionResult::new(
        board()
            .markers
            .into_iter()
            .map(|m| {
                let shifted = m.corners.map(|p| [p[0] + 10.0, p[1] + 5.0]);
                MarkerDetection::new(m.id, shifted)
            })
            .collect(),
    );
    comp.find_and_warp(&frame, &source(), &moved).unwrap();
    let cached = comp.cache().get().unwrap();
    assert_eq!(cached.quad(tagwarp::composite::Role::TopLeft)[0], [110.0, 105.0]);
}

#[test]
fn cache_fallback_matches_direct_composite() {
    let mut comp = Compositor::new(config(true)).unwrap();
    comp.find_and_warp(&gradient_frame(0), &source(), &board())
        .unwrap();

    // Next frame: different content, one anchor lost
    let frame = gradient_frame(77);
    let mut partial = board();
    partial.markers.remove(2);
    let fallback = comp
        .find_and_warp(&frame, &source(), &partial)
        .expect("cached reference points");

    let mut fresh = Compositor::new(config(false)).unwrap();
    let direct = fresh.find_and_warp(&frame, &source(), &board()).unwrap();
    assert_eq!(fallback, direct);
}

#[test]
fn without_cache_incomplete_frames_skip() {
    let frame = gradient_frame(0);
    let mut comp = Compositor::new(config(false)).unwrap();
    assert!(comp.find_and_warp(&frame, &source(), &board()).is_some());
    assert!(!comp.cache().is_warm());

    let mut partial = board();
    partial.markers.truncate(2);
    assert!(comp.find_and_warp(&frame, &source(), &partial).is_none());
    assert!(comp
        .find_and_warp(&frame, &source(), &DetectionResult::default())
        .is_none());
}

#[test]
fn disabling_cache_mid_session_ignores_warm_slot() {
    let frame = gradient_frame(0);
    let mut comp = Compositor::new(config(true)).unwrap();
    comp.find_and_warp(&frame, &source(), &board()).unwrap();
    comp.set_use_cache(false);
    assert!(comp
        .find_and_warp(&frame, &source(), &DetectionResult::default())
        .is_none());
    assert!(comp.cache().is_warm());
}

#[test]
fn destination_and_homography_are_repeatable() {
    let refs = board_refs();
    let a = refs.destination(CornerSelection::Diagonal);
    let b = refs.destination(CornerSelection::Diagonal);
    assert_eq!(a, b);
    assert_eq!(
        a,
        [[100.0, 100.0], [300.0, 100.0], [300.0, 300.0], [100.0, 300.0]]
    );

    let src = rect_corners(100, 50);
    let h1 = Homography::from_point_pairs(&src, &a).unwrap();
    let h2 = Homography::from_point_pairs(&src, &b).unwrap();
    assert_eq!(h1, h2);
}

#[test]
fn three_matching_anchors() {
    let mut det = board();
    det.markers[1].id = 99;
    let found = resolve(&det, &anchors());
    assert_eq!(found.len(), 3);

    let frame = gradient_frame(0);
    let mut cold = ReferenceCache::new();
    assert_eq!(
        composite_frame(&frame, &source(), &det, &mut cold, &config(true)),
        Err(Skip::InsufficientDetections { found: 3 })
    );
    assert!(!cold.is_warm());

    let mut warm = ReferenceCache::new();
    warm.store(board_refs());
    let from_cache =
        composite_frame(&frame, &source(), &det, &mut warm, &config(true)).unwrap();
    let mut scratch = ReferenceCache::new();
    let direct =
        composite_frame(&frame, &source(), &board(), &mut scratch, &config(false)).unwrap();
    assert_eq!(from_cache, direct);
}

#[test]
fn sessions_do_not_share_cache() {
    let frame = gradient_frame(0);
    let mut a = Compositor::new(config(true)).unwrap();
    let mut b = Compositor::new(config(true)).unwrap();
    a.find_and_warp(&frame, &source(), &board()).unwrap();
    assert!(a.cache().is_warm());
    assert!(b
        .find_and_warp(&frame, &source(), &DetectionResult::default())
        .is_none());
}

#[test]
fn video_loop_pauses_source_while_anchors_missing() {
    // Source frames are solid colours 1, 2, 3, ... in the red channel
    let sources = (1..=5u8).map(|i| ImageRgb8::filled(100, 50, [i * 40, 0, 0]));
    let mut queue = SourceQueue::new(sources, 128);
    let mut comp = Compositor::new(config(false)).unwrap();

    // Anchors visible, hidden, hidden, visible, visible
    let visible = [true, false, false, true, true];
    let mut shown = Vec::new();
    for &vis in &visible {
        let frame = gradient_frame(0);
        let det = if vis { board() } else { DetectionResult::default() };
        let src = queue.current().unwrap().clone();
        let out = comp.find_and_warp(&frame, &src, &det);
        if let Some(out) = &out {
            shown.push(out.get(200, 200)[0]);
        }
        queue.step(out.is_some());
    }
    assert_eq!(shown, vec![40, 40, 80]);
}
