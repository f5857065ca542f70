// src/main.rs

mod app;
mod demo_scene;
mod settings;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    window::WindowBuilder,
};

use app::DemoApp;
use portal_fx::MainLoop;
use settings::DemoConfig;

async fn run() -> anyhow::Result<()> {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            console_log::init_with_level(log::Level::Warn).context("couldn't initialize logger")?;
        } else {
            env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or("info,wgpu_core=warn,wgpu_hal=warn"),
            )
            .init();
        }
    }

    let config = DemoConfig::default();
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.logical_size.0,
                config.logical_size.1,
            ))
            .build(&event_loop)
            .context("failed to create window")?,
    );

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::WindowExtWebSys;
        web_sys::window()
            .and_then(|win| win.document())
            .and_then(|doc| {
                let dst = doc.get_element_by_id("wasm-viewport")?;
                let canvas = web_sys::Element::from(window.canvas()?);
                dst.append_child(&canvas).ok()?;
                Some(())
            })
            .context("couldn't append canvas to document body")?;
    }

    let mut app = DemoApp::new(window.clone(), &config).await?;
    let mut main_loop = MainLoop::new();
    main_loop.start();
    #[cfg(not(target_arch = "wasm32"))]
    let mut last_time = std::time::Instant::now();

    event_loop
        .run(move |event, target: &EventLoopWindowTarget<()>| {
            target.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent {
                    ref event,
                    window_id,
                } if window_id == window.id() => {
                    if !app.handle_window_event(event) {
                        match event {
                            WindowEvent::CloseRequested => {
                                main_loop.stop();
                                target.exit();
                            }
                            WindowEvent::Resized(physical_size) => {
                                app.resize(*physical_size);
                            }
                            WindowEvent::ScaleFactorChanged { .. } => {
                                app.resize(window.inner_size());
                            }
                            _ => {}
                        }
                    }
                }
                Event::AboutToWait => {
                    #[cfg(not(target_arch = "wasm32"))]
                    let dt = {
                        let now = std::time::Instant::now();
                        let dt = (now - last_time).as_secs_f32();
                        last_time = now;
                        dt
                    };
                    #[cfg(target_arch = "wasm32")]
                    let dt = 1.0 / 60.0;

                    match main_loop.tick(dt, &mut app) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            log::warn!("surface lost, reconfiguring");
                            app.resize(app.size());
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("GPU out of memory, exiting");
                            main_loop.stop();
                            target.exit();
                        }
                        Err(e) => log::warn!("surface error: {e:?}"),
                    }

                    if !target.exiting() {
                        window.request_redraw();
                    }
                }
                _ => {}
            }
        })
        .context("event loop failed")?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {
    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = run().await {
            log::error!("{e:?}");
        }
    });
}
