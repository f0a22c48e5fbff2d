//! Renders a single frame with a Whitted-style ray tracer and shows it in a window.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

use whitted::{box_blur, render, Picture, Scene, RGBA8};

use crate::cli::Args;
use crate::gpu::{Gpu, Presenter};

mod cli;
mod gpu;
mod output;

fn init_logger(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stdout)
        .filter_level(level)
        .init();
}

async fn create_presenter(window: &Window, picture: &Picture<RGBA8>) -> Result<Presenter> {
    let gpu = Gpu::new().await?;
    let surface = gpu.surface(window)?;
    let size = window.inner_size();
    Presenter::new(gpu, surface, (size.width, size.height), picture)
}

fn show(picture: Picture<RGBA8>) -> Result<()> {
    let event_loop = EventLoop::new();

    let window = WindowBuilder::new()
        .with_title("whitted")
        .with_inner_size(LogicalSize::new(picture.width(), picture.height()))
        .build(&event_loop)
        .context("creating window")?;

    let mut presenter = smol::block_on(create_presenter(&window, &picture))?;

    event_loop.run(move |event, _, control_flow| {
        control_flow.set_wait();

        match event {
            Event::RedrawRequested(window_id) if window.id() == window_id => {
                presenter.render();
            }
            Event::WindowEvent { event, window_id } if window.id() == window_id => match event {
                WindowEvent::Resized(size) => {
                    presenter.resize((size.width, size.height));
                    window.request_redraw();
                }
                WindowEvent::CloseRequested => control_flow.set_exit(),
                _ => {}
            }
            _ => {}
        }
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.clone().into());

    let config = args.render_config();
    config.validate()?;

    let scene = match &args.scene {
        Some(path) => Scene::load(path)
            .with_context(|| format!("loading scene {}", path.display()))?,
        None => Scene::reference(),
    };

    let picture = render(&scene, &config);
    let picture = if args.no_blur { picture } else { box_blur(&picture) };

    if let Some(path) = &args.output {
        output::save_png(&picture, path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(target: "app", "Image saved as {}", path.display());
    }

    if args.headless {
        return Ok(());
    }
    show(picture.to_rgba8())
}
