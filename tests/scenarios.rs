use roinms::{
    run_float_nms, run_quantized_nms, BoxTable, NmsConfig, RoiNms, ScoreTable, SoftNmsMethod,
};

const SCALE: f32 = 0.01;

/// Builds a `(rois x classes x 4)` box buffer where every class of a RoI
/// shares the same fixed-point box.
fn shared_boxes(per_roi: &[[u16; 4]], num_classes: usize) -> Vec<u16> {
    let mut data = Vec::with_capacity(per_roi.len() * num_classes * 4);
    for bbox in per_roi {
        for _ in 0..num_classes {
            data.extend_from_slice(bbox);
        }
    }
    data
}

fn run(
    batch_splits: &[i32],
    scores: &[u8],
    boxes: &[u16],
    num_classes: usize,
    cfg: &NmsConfig,
) -> roinms::NmsOutput<u16> {
    let num_rois = scores.len() / num_classes;
    let scores = ScoreTable::quantized(scores, num_rois, num_classes, SCALE, 0).unwrap();
    let boxes = BoxTable::new(boxes, num_rois, num_classes).unwrap();
    run_quantized_nms(batch_splits, scores, boxes, cfg).unwrap()
}

#[test]
fn single_roi_yields_one_detection() {
    let scores = [0u8, 90];
    let boxes = [0u16, 0, 0, 0, 8, 16, 80, 96];
    let out = run(&[1], &scores, &boxes, 2, &NmsConfig::default());

    assert_eq!(out.batch_splits, vec![1]);
    assert_eq!(out.classes, vec![1]);
    assert_eq!(out.boxes, vec![8, 16, 80, 96]);
    assert!((out.scores[0] - 0.9).abs() < 1e-6);
}

#[test]
fn identical_boxes_keep_only_the_best_in_hard_mode() {
    let scores = [0u8, 60, 0, 90];
    let boxes = shared_boxes(&[[0, 0, 80, 80], [0, 0, 80, 80]], 2);
    let out = run(&[2], &scores, &boxes, 2, &NmsConfig::default());

    assert_eq!(out.batch_splits, vec![1]);
    assert_eq!(out.len(), 1);
    assert!((out.scores[0] - 0.9).abs() < 1e-6);
}

#[test]
fn linear_soft_nms_rescores_identical_box_to_zero() {
    let scores = [0u8, 90, 0, 60];
    let boxes = shared_boxes(&[[0, 0, 80, 80], [0, 0, 80, 80]], 2);

    let cfg = NmsConfig {
        soft_nms_method: SoftNmsMethod::Linear,
        soft_nms_min_score: 0.01,
        ..NmsConfig::default()
    };
    let out = run(&[2], &scores, &boxes, 2, &cfg);
    assert_eq!(out.batch_splits, vec![1]);
    assert!((out.scores[0] - 0.9).abs() < 1e-6);

    // A re-scored value exactly at the floor stays in the pool.
    let at_floor = NmsConfig {
        soft_nms_min_score: 0.0,
        ..cfg
    };
    let out = run(&[2], &scores, &boxes, 2, &at_floor);
    assert_eq!(out.batch_splits, vec![2]);
    assert_eq!(out.scores[1], 0.0);
    assert_eq!(out.classes, vec![1, 1]);
}

#[test]
fn soft_floor_uses_the_rescored_value_before_quantization() {
    // IoU ~0.4953 takes 0.6 to ~0.3028, which stores as 0.30.
    let scores = [0u8, 90, 0, 60];
    let boxes = shared_boxes(&[[0, 0, 80, 80], [27, 0, 107, 80]], 2);
    let cfg = NmsConfig {
        soft_nms_method: SoftNmsMethod::Linear,
        soft_nms_min_score: 0.301,
        ..NmsConfig::default()
    };
    let out = run(&[2], &scores, &boxes, 2, &cfg);

    assert_eq!(out.batch_splits, vec![2]);
    assert_eq!(&out.boxes[4..], &[27u16, 0, 107, 80]);
    assert!((out.scores[1] - 0.30).abs() < 1e-6);
}

#[test]
fn each_image_keeps_its_own_rois() {
    let scores = [0u8, 70, 0, 80];
    let boxes = shared_boxes(&[[0, 0, 80, 80], [160, 160, 240, 240]], 2);
    let out = run(&[1, 1], &scores, &boxes, 2, &NmsConfig::default());

    assert_eq!(out.batch_splits, vec![1, 1]);
    assert_eq!(out.boxes, vec![0, 0, 80, 80, 160, 160, 240, 240]);
    assert!((out.scores[0] - 0.7).abs() < 1e-6);
    assert!((out.scores[1] - 0.8).abs() < 1e-6);
}

#[test]
fn global_cap_keeps_highest_raw_score_across_classes() {
    let scores = [0u8, 50, 80];
    let boxes = shared_boxes(&[[0, 0, 80, 80]], 3);
    let cfg = NmsConfig {
        max_objects: 1,
        ..NmsConfig::default()
    };
    let out = run(&[1], &scores, &boxes, 3, &cfg);

    assert_eq!(out.batch_splits, vec![1]);
    assert_eq!(out.classes, vec![2]);
    assert!((out.scores[0] - 0.8).abs() < 1e-6);
}

#[test]
fn global_cap_ties_prefer_lower_class() {
    let scores = [0u8, 80, 80];
    let boxes = shared_boxes(&[[0, 0, 80, 80]], 3);
    let cfg = NmsConfig {
        max_objects: 1,
        ..NmsConfig::default()
    };
    let out = run(&[1], &scores, &boxes, 3, &cfg);
    assert_eq!(out.classes, vec![1]);
}

#[test]
fn detections_are_grouped_by_class_in_emission_order() {
    // Three disjoint RoIs, two foreground classes.
    let scores = [
        0u8, 30, 90, //
        0, 70, 4, //
        0, 50, 60,
    ];
    let boxes = shared_boxes(
        &[[0, 0, 80, 80], [400, 400, 480, 480], [800, 0, 880, 80]],
        3,
    );
    let out = run(&[3], &scores, &boxes, 3, &NmsConfig::default());

    assert_eq!(out.classes, vec![1, 1, 1, 2, 2]);
    let expected = [0.7f32, 0.5, 0.3, 0.9, 0.6];
    for (got, want) in out.scores.iter().zip(expected) {
        assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
    }
    assert_eq!(&out.boxes[..4], &[400, 400, 480, 480]);
}

#[test]
fn scores_below_min_score_are_never_candidates() {
    let scores = [0u8, 4, 0, 6];
    let boxes = shared_boxes(&[[0, 0, 80, 80], [400, 400, 480, 480]], 2);
    let out = run(&[2], &scores, &boxes, 2, &NmsConfig::default());
    assert_eq!(out.batch_splits, vec![1]);
    assert_eq!(out.boxes, vec![400, 400, 480, 480]);
}

#[test]
fn empty_images_and_background_only_tables() {
    let scores = [0u8, 70];
    let boxes = shared_boxes(&[[0, 0, 80, 80]], 2);
    let out = run(&[0, 1, 0], &scores, &boxes, 2, &NmsConfig::default());
    assert_eq!(out.batch_splits, vec![0, 1, 0]);

    let scores = [200u8, 200];
    let boxes = shared_boxes(&[[0, 0, 80, 80], [400, 400, 480, 480]], 1);
    let out = run(&[2], &scores, &boxes, 1, &NmsConfig::default());
    assert_eq!(out.batch_splits, vec![0]);
    assert!(out.is_empty());

    let out = run(&[], &[], &[], 2, &NmsConfig::default());
    assert!(out.batch_splits.is_empty());
    assert!(out.is_empty());
}

#[test]
fn zero_max_objects_is_unbounded() {
    let num_rois = 150;
    let mut scores = Vec::new();
    let mut per_roi = Vec::new();
    for i in 0..num_rois {
        scores.extend_from_slice(&[0u8, 50 + (i % 50) as u8]);
        let x = (i as u16) * 100;
        per_roi.push([x, 0, x + 80, 80]);
    }
    let boxes = shared_boxes(&per_roi, 2);

    let capped = run(&[num_rois as i32], &scores, &boxes, 2, &NmsConfig::default());
    assert_eq!(capped.batch_splits, vec![100]);

    let cfg = NmsConfig {
        max_objects: 0,
        ..NmsConfig::default()
    };
    let unbounded = run(&[num_rois as i32], &scores, &boxes, 2, &cfg);
    assert_eq!(unbounded.batch_splits, vec![num_rois as i32]);
}

#[test]
fn per_class_cap_limits_each_class() {
    let scores = [
        0u8, 90, 90, //
        0, 80, 80, //
        0, 70, 70,
    ];
    let boxes = shared_boxes(
        &[[0, 0, 80, 80], [400, 400, 480, 480], [800, 0, 880, 80]],
        3,
    );
    let cfg = NmsConfig {
        max_objects_per_class: 2,
        ..NmsConfig::default()
    };
    let out = run(&[3], &scores, &boxes, 3, &cfg);
    assert_eq!(out.classes, vec![1, 1, 2, 2]);
}

#[test]
fn gaussian_soft_nms_decays_without_dropping() {
    // RoI 1 overlaps RoI 0 with IoU 1/3: above 0.3 but Gaussian decays
    // regardless of the threshold and keeps it in the pool.
    let scores = [0u8, 90, 0, 80];
    let boxes = shared_boxes(&[[0, 0, 80, 80], [40, 0, 120, 80]], 2);
    let cfg = NmsConfig {
        soft_nms_method: SoftNmsMethod::Gaussian,
        ..NmsConfig::default()
    };
    let out = run(&[2], &scores, &boxes, 2, &cfg);

    assert_eq!(out.batch_splits, vec![2]);
    let expected = 0.8 * (-(1.0f32 / 9.0) / 0.5).exp();
    assert!((out.scores[1] - expected).abs() <= SCALE);
    assert!(out.scores[1] < 0.8);
}

#[test]
fn float_tables_use_the_same_pipeline() {
    let scores = [0.0f32, 0.9, 0.0, 0.6, 0.0, 0.7];
    let mut boxes = Vec::new();
    for bbox in [[0.0f32, 0.0, 10.0, 10.0], [1.0, 1.0, 11.0, 11.0], [50.0, 50.0, 60.0, 60.0]] {
        boxes.extend_from_slice(&[0.0; 4]);
        boxes.extend_from_slice(&bbox);
    }
    let scores = ScoreTable::float(&scores, 3, 2).unwrap();
    let boxes = BoxTable::new(&boxes, 3, 2).unwrap();
    let out = run_float_nms(&[3], scores, boxes, &NmsConfig::default()).unwrap();

    assert_eq!(out.scores, vec![0.9, 0.7]);
    assert_eq!(&out.boxes[4..], &[50.0f32, 50.0, 60.0, 60.0]);
}

#[test]
fn engine_is_reusable_and_deterministic() {
    let scores = [0u8, 90, 0, 60, 0, 75];
    let boxes = shared_boxes(&[[0, 0, 80, 80], [8, 8, 88, 88], [400, 0, 480, 80]], 2);
    let nms = RoiNms::new(NmsConfig {
        soft_nms_method: SoftNmsMethod::Linear,
        ..NmsConfig::default()
    })
    .unwrap();
    let scores = ScoreTable::quantized(&scores, 3, 2, SCALE, 0).unwrap();
    let boxes = BoxTable::new(&boxes, 3, 2).unwrap();

    let first = nms.run(&[3], scores, boxes).unwrap();
    let second = nms.run(&[3], scores, boxes).unwrap();
    assert_eq!(first, second);
    let bits = |out: &roinms::NmsOutput<u16>| -> Vec<u32> {
        out.scores.iter().map(|s| s.to_bits()).collect()
    };
    assert_eq!(bits(&first), bits(&second));
}
