use std::cell::Cell;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::minimize::Minimizer;

const TOL: f64 = 0.05;

fn assert_placed(bbox: &Rect, boxes: &[LabelBox], curves: &[Curve], cfg: &PlacementCfg, out: &[Point]) {
    assert_eq!(out.len(), boxes.len());
    for (p, b) in out.iter().zip(boxes) {
        let rect = Rect::at(*p, *b);
        assert!(bbox.contains_rect(&rect, TOL), "{rect:?} leaves {bbox:?}");
        for c in curves {
            let d = c.distance_to_rect(&rect);
            assert!(d >= cfg.line_buffer - TOL, "{rect:?} is {d} from a curve");
        }
    }
}

#[test]
fn loss_terms_by_hand() {
    let bbox = Rect::new(0.0, 0.0, 10.0, 10.0).unwrap();
    let boxes = [LabelBox::new(2.0, 2.0), LabelBox::new(2.0, 2.0)];
    let curves = [
        Curve::from_xy(&[(0.0, 0.0), (10.0, 0.0)]).unwrap(),
        Curve::from_xy(&[(0.0, 10.0), (10.0, 10.0)]).unwrap(),
    ];
    let loss = LabelLoss::new(&bbox, &boxes, &curves, &PlacementCfg::default());
    let x = [0.0, 3.0, 6.0, 3.0];
    let t = loss.terms(&x);
    assert!((t.own - 4.0).abs() < 1e-12);
    assert!((t.spread - 6.0).abs() < 1e-12);
    assert!((t.other - 4.0).abs() < 1e-12);
    assert_eq!(t.violation, 0.0);
    assert!((loss.eval(&x) - 2.6).abs() < 1e-12);
}

#[test]
fn loss_penalizes_overflow_and_clearance() {
    let bbox = Rect::new(0.0, 0.0, 10.0, 10.0).unwrap();
    let boxes = [LabelBox::new(2.0, 2.0)];
    let curves = [Curve::from_xy(&[(0.0, 0.0), (10.0, 0.0)]).unwrap()];
    let loss = LabelLoss::new(&bbox, &boxes, &curves, &PlacementCfg::default());
    // Single curve: no "other" term, no spread.
    assert!((loss.eval(&[4.0, 4.0]) - 4.0).abs() < 1e-12);
    // One unit past the right edge.
    assert!((loss.with_penalty(3.0).eval(&[9.0, 4.0]) - 7.0).abs() < 1e-12);
    // Half a unit inside the buffer.
    assert!((loss.eval(&[4.0, 0.5]) - 0.75).abs() < 1e-12);
}

#[test]
fn single_straight_line() {
    let bbox = Rect::new(0.0, 0.0, 100.0, 60.0).unwrap();
    let boxes = [LabelBox::new(20.0, 8.0)];
    let curves = [Curve::from_xy(&[(0.0, 30.0), (100.0, 30.0)]).unwrap()];
    let cfg = PlacementCfg::default().with_restarts(3);
    let mut rng = StdRng::seed_from_u64(1);
    let out = place_labels(&bbox, &boxes, &curves, &cfg, &mut rng).unwrap();
    assert_placed(&bbox, &boxes, &curves, &cfg, &out);
    // The own-curve term pulls the label up to the buffer.
    let d = curves[0].distance_to_rect(&Rect::at(out[0], boxes[0]));
    assert!(d < cfg.line_buffer + 0.5, "label drifted {d} away");
}

#[test]
fn two_curves_with_a_polyline() {
    let bbox = Rect::new(0.0, 0.0, 100.0, 100.0).unwrap();
    let boxes = [LabelBox::new(16.0, 6.0), LabelBox::new(16.0, 6.0)];
    let curves = [
        Curve::from_xy(&[(0.0, 20.0), (100.0, 20.0)]).unwrap(),
        Curve::from_xy(&[(0.0, 60.0), (50.0, 80.0), (100.0, 60.0)]).unwrap(),
    ];
    let cfg = PlacementCfg::default().with_restarts(4);
    let mut rng = StdRng::seed_from_u64(9);
    let placed = place_labels_detailed(&bbox, &boxes, &curves, &cfg, &mut rng).unwrap();
    assert!(placed.loss.is_finite());
    assert_placed(&bbox, &boxes, &curves, &cfg, &placed.positions);
}

#[test]
fn refining_a_finished_placement_keeps_it() {
    // A short curve leaves a flat ring of equal-loss positions around it.
    let bbox = Rect::new(0.0, 0.0, 100.0, 100.0).unwrap();
    let boxes = [LabelBox::new(10.0, 4.0)];
    let curves = [Curve::from_xy(&[(50.0, 50.0), (51.0, 50.0)]).unwrap()];
    let cfg = PlacementCfg::default().with_restarts(1);
    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let first = place_labels_detailed(&bbox, &boxes, &curves, &cfg, &mut rng).unwrap();
        let second = refine_labels_detailed(&bbox, &boxes, &curves, &cfg, &first.positions).unwrap();
        let (p, q) = (first.positions[0], second.positions[0]);
        assert!((p.x - q.x).abs() < 1e-6 && (p.y - q.y).abs() < 1e-6, "seed {seed}: {p:?} -> {q:?}");
        assert!(second.loss <= first.loss + 1e-9, "seed {seed}: {} -> {}", first.loss, second.loss);
    }
}

#[test]
fn refining_a_start_inside_the_buffer_clears_it() {
    let bbox = Rect::new(0.0, 0.0, 20.0, 20.0).unwrap();
    let boxes = [LabelBox::new(18.0, 8.0)];
    let curves = [Curve::from_xy(&[(0.0, 10.0), (20.0, 10.0)]).unwrap()];
    let cfg = PlacementCfg::default();
    // Half a unit above the line, inside the unit buffer.
    let start = Point::new(1.0, 10.5);
    let out = refine_labels(&bbox, &boxes, &curves, &cfg, &[start]).unwrap();
    assert_placed(&bbox, &boxes, &curves, &cfg, &out);
    assert!((out[0].y - 11.0).abs() < 0.05, "{out:?}");
}

#[test]
fn same_seed_same_answer() {
    let bbox = Rect::new(0.0, 0.0, 50.0, 50.0).unwrap();
    let boxes = [LabelBox::new(10.0, 4.0)];
    let curves = [Curve::from_xy(&[(0.0, 0.0), (50.0, 50.0)]).unwrap()];
    let cfg = PlacementCfg::default().with_restarts(2).with_penalty_incs(4);
    let a = place_labels(&bbox, &boxes, &curves, &cfg, &mut StdRng::seed_from_u64(77)).unwrap();
    let b = place_labels(&bbox, &boxes, &curves, &cfg, &mut StdRng::seed_from_u64(77)).unwrap();
    assert_eq!(a, b);
}

struct CountingIdentity {
    calls: Cell<usize>,
}

impl Minimizer for CountingIdentity {
    fn minimize(&self, _f: &dyn Fn(&[f64]) -> f64, x0: &[f64]) -> Vec<f64> {
        self.calls.set(self.calls.get() + 1);
        x0.to_vec()
    }
}

#[test]
fn injected_minimizer_runs_once_per_round_and_restart() {
    let bbox = Rect::new(0.0, 0.0, 40.0, 40.0).unwrap();
    let boxes = [LabelBox::new(4.0, 4.0)];
    let curves = [Curve::from_xy(&[(0.0, 20.0), (40.0, 20.0)]).unwrap()];
    let cfg = PlacementCfg::default().with_restarts(3).with_penalty_incs(5);
    let identity = CountingIdentity { calls: Cell::new(0) };
    let mut rng = StdRng::seed_from_u64(2);
    let out = place_labels_with(&bbox, &boxes, &curves, &cfg, &mut rng, &identity).unwrap();
    assert_eq!(identity.calls.get(), 15);
    // Identity leaves the sampled start, which is already feasible.
    assert_placed(&bbox, &boxes, &curves, &cfg, &out);
}

#[test]
fn empty_input_places_nothing() {
    let bbox = Rect::new(0.0, 0.0, 10.0, 10.0).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let out = place_labels(&bbox, &[], &[], &PlacementCfg::default(), &mut rng).unwrap();
    assert!(out.is_empty());
}

#[test]
fn invalid_inputs_are_rejected() {
    let bbox = Rect::new(0.0, 0.0, 10.0, 10.0).unwrap();
    let boxes = [LabelBox::new(1.0, 1.0)];
    let curve = Curve::from_xy(&[(0.0, 0.0), (1.0, 1.0)]).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let cfg = PlacementCfg::default();

    let mismatch = place_labels(&bbox, &boxes, &[curve.clone(), curve.clone()], &cfg, &mut rng);
    assert!(matches!(mismatch, Err(LayoutError::InvalidInput { .. })));

    let no_restarts = place_labels(&bbox, &boxes, &[curve.clone()], &cfg.with_restarts(0), &mut rng);
    assert!(matches!(no_restarts, Err(LayoutError::InvalidInput { .. })));

    let wrong_start = refine_labels(&bbox, &boxes, &[curve.clone()], &cfg, &[]);
    assert!(matches!(wrong_start, Err(LayoutError::InvalidInput { .. })));

    let negative_box = place_labels(&bbox, &[LabelBox::new(-1.0, 1.0)], &[curve], &cfg, &mut rng);
    assert!(matches!(negative_box, Err(LayoutError::InvalidInput { .. })));
}
