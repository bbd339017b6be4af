use std::{
    io::{stdout, Write},
    thread,
    time::Instant,
};

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use common::misc::human_duration;
use thickness::interior::InteriorDistances;

mod args;
use args::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN
    };
    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("thickness", level);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = args.trace_config()?;
    let mesh = args.mesh()?;
    println!(
        "Generated {:?}. {{ vert: {}, face: {} }}",
        args.shape,
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    let now = Instant::now();
    let batch = InteriorDistances::new(config.clone(), mesh);
    let progress = batch.progress();

    // Rays are cast on another thread (which fans out over the rayon pool),
    // leaving this one free to report progress.
    let worker = thread::spawn(move || batch.compute());

    let mut completed = 0;
    while completed < progress.total() {
        completed = progress.wait();
        print!(
            "\rVertex: {}/{}, {:.1}%",
            completed,
            progress.total(),
            progress.progress() * 100.0
        );
        stdout().flush()?;
    }

    let mesh = worker
        .join()
        .map_err(|_| anyhow!("Interior distance worker panicked"))?;
    println!();

    match mesh.distance_range() {
        Some((min, max)) => println!("Interior distance: {min:.4} to {max:.4}"),
        None => println!("No interior ray hit the mesh."),
    }

    let escaped = (mesh.vertices().iter())
        .filter(|x| x.distance_inner == f32::MAX)
        .count();
    if escaped > 0 {
        println!(" \\ {escaped} rays escaped the mesh.");
    }

    println!(
        "Done ({}). Elapsed: {}",
        config.traversal.name(),
        human_duration(now.elapsed())
    );

    Ok(())
}
