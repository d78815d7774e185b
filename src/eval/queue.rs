use hybrid_lib::accel::AccelOpcode;
use hybrid_lib::accel::Accelerator;
use hybrid_lib::accel::AcceleratorConfig;
use hybrid_lib::run_wrapper::run_trace_requests;
use hybrid_lib::run_wrapper::synthetic_workload;

use plotters::prelude::*;

const REQUEST_COUNT: usize = 64;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();

    // Plot line series for each queue capacity
    // For a fixed capacity, vary the host issue interval
    // Performance metric: dropped requests
    let capacities = vec![1, 2, 4, 8, 16];
    let intervals: Vec<usize> = (1..=12).collect();
    let mix = [AccelOpcode::Add, AccelOpcode::Mul, AccelOpcode::Div, AccelOpcode::Sub];

    let mut data: Vec<Vec<(usize, u64)>> = vec![vec![]; capacities.len()];
    let mut y_max: u64 = 1;
    for (i, capacity) in capacities.iter().enumerate() {
        for interval in intervals.iter() {
            let mut accel = Accelerator::new(AcceleratorConfig {
                queue_capacity: *capacity,
                ..Default::default()
            })?;
            let requests = synthetic_workload(&mix, REQUEST_COUNT, *interval);
            run_trace_requests(&mut accel, &requests)?;
            let dropped = accel.controller.history.dropped;
            data[i].push((*interval, dropped));
            y_max = y_max.max(dropped);
        }
    }

    std::fs::create_dir_all("eval")?;
    let output_path = "eval/queue_eval.svg";
    let plot_title = format!("Dropped requests ({} issued)", REQUEST_COUNT);

    let root = SVGBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = *intervals.last().unwrap_or(&1) as i32;
    let mut ctx = ChartBuilder::on(&root)
        .caption(plot_title.as_str(), ("sans-serif", 40).into_font())
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(1..x_max, 0..(y_max + y_max / 10 + 1) as i32)?;
    ctx.configure_mesh().x_desc("Issue interval (cycles)").y_desc("Dropped").draw()?;

    for (i, capacity) in capacities.iter().enumerate() {
        let series = data[i].iter().map(|(x, y)| (*x as i32, *y as i32));
        let label = format!("Queue capacity = {}", capacity);
        let color = Palette99::pick(i).to_rgba();
        ctx.draw_series(LineSeries::new(series, color))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    ctx.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;

    eprintln!("Wrote {}", output_path);
    Ok(())
}
