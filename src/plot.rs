//! Charts of model results.
use crate::rating::SlopeTable;
use plotters::prelude::*;
use std::path::Path;

/// Draw velocity against flow depth, one line per bed slope, to a png at `title`.
pub fn rating_curves<P: AsRef<Path>>(
    tables: &[SlopeTable],
    title: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let points: Vec<Vec<(f64, f64)>> = tables
        .iter()
        .map(|t| t.records.iter().map(|r| (r.flow_depth, r.velocity)).collect())
        .collect();
    let xmax = points
        .iter()
        .flatten()
        .map(|p| p.0)
        .fold(0.0, f64::max);
    let ymax = points
        .iter()
        .flatten()
        .map(|p| p.1)
        .fold(0.0, f64::max);

    let root = BitMapBackend::new(title.as_ref(), (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.margin(10, 10, 10, 10);
    let mut chart = ChartBuilder::on(&root)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..xmax * 1.05, 0.0..ymax * 1.05)?;

    chart
        .configure_mesh()
        .x_labels(5)
        .y_labels(5)
        .y_label_formatter(&|x| format!("{:.2}", x))
        .x_label_formatter(&|x| format!("{:.2}", x))
        .x_desc("Flow depth (m)")
        .y_desc("Velocity (m/s)")
        .draw()?;

    for (i, (table, line)) in tables.iter().zip(points).enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(line.clone(), &color))?
            .label(format!("1 in {:.0}", table.slope.run_km * 1000.0))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        chart.draw_series(PointSeries::of_element(line, 2, &color, &|c, s, st| {
            EmptyElement::at(c) + Circle::new((0, 0), s, st.filled())
        }))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.filled())
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}
