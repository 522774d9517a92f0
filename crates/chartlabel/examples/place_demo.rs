//! Place two labels next to a line and a polyline, then tidy crowded ticks.
//!
//! Run: `cargo run -p chartlabel --example place_demo`

use rand::{rngs::StdRng, SeedableRng};
use chartlabel::prelude::*;

fn main() -> Result<(), LayoutError> {
    let bbox = Rect::new(0.0, 0.0, 200.0, 120.0)?;
    let curves = vec![
        Curve::from_xy(&[(0.0, 30.0), (200.0, 50.0)])?,
        Curve::from_xy(&[(0.0, 90.0), (60.0, 70.0), (120.0, 100.0), (200.0, 80.0)])?,
    ];
    let boxes = vec![LabelBox::new(36.0, 10.0), LabelBox::new(44.0, 10.0)];

    let cfg = PlacementCfg::default().with_restarts(4);
    let mut rng = StdRng::seed_from_u64(2024);
    let positions = place_labels(&bbox, &boxes, &curves, &cfg, &mut rng)?;
    for (i, (p, b)) in positions.iter().zip(&boxes).enumerate() {
        let rect = Rect::at(*p, *b);
        println!(
            "label {i}: corner=({:.2}, {:.2}) own_curve_distance={:.3}",
            p.x,
            p.y,
            curves[i].distance_to_rect(&rect)
        );
    }

    let ticks = [
        IntervalSpec::new(0.0, 18.0),
        IntervalSpec::new(10.0, 18.0),
        IntervalSpec::new(20.0, 18.0),
        IntervalSpec::new(60.0, 18.0),
    ];
    let spaced = space_apart(&ticks, 4.0, SpacingBounds::between(0.0, 200.0))?;
    println!("ticks: {spaced:?}");
    Ok(())
}
