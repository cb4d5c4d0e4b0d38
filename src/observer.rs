use std::{fs, path::PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::canvas::Canvas;

/// Called by the engine after every generation with the freshly rendered test canvas.
/// Observers can't change the search; an error is logged and the run goes on.
pub trait Observer {
    fn observe(&mut self, canvas: &Canvas, generation: u64) -> anyhow::Result<()>;
}

impl<F> Observer for F
where
    F: FnMut(&Canvas, u64) -> anyhow::Result<()>,
{
    fn observe(&mut self, canvas: &Canvas, generation: u64) -> anyhow::Result<()> {
        self(canvas, generation)
    }
}

/// Writes `<dir>/<generation:08>.png` every `interval` generations.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>, interval: u64) -> anyhow::Result<SnapshotWriter> {
        let dir = dir.into();
        anyhow::ensure!(interval > 0, "snapshot interval must be at least 1");
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating snapshot directory {}", dir.display()))?;
        Ok(SnapshotWriter { dir, interval })
    }

    pub fn path_for(&self, generation: u64) -> PathBuf {
        self.dir.join(format!("{generation:08}.png"))
    }
}

impl Observer for SnapshotWriter {
    fn observe(&mut self, canvas: &Canvas, generation: u64) -> anyhow::Result<()> {
        if generation % self.interval != 0 {
            return Ok(());
        }
        let path = self.path_for(generation);
        canvas
            .save(&path)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        debug!("wrote snapshot {}", path.display());
        Ok(())
    }
}

#[cfg(feature = "preview")]
pub use preview::Preview;

#[cfg(feature = "preview")]
mod preview {
    use anyhow::anyhow;
    use sdl2::{
        event::Event,
        pixels::PixelFormatEnum,
        render::{Texture, WindowCanvas},
        EventPump,
    };
    use tracing::info;

    use super::Observer;
    use crate::canvas::Canvas;

    /// Mirrors the test canvas to a window every `interval` generations.
    /// Closing the window stops the mirroring, not the search.
    pub struct Preview {
        texture: Option<Texture>,
        window: Option<WindowCanvas>,
        events: EventPump,
        interval: u64,
        _sdl: sdl2::Sdl,
    }

    impl Preview {
        /// The streaming texture is sized once, canvas dimensions are fixed for a run.
        pub fn new(width: u32, height: u32, interval: u64) -> anyhow::Result<Preview> {
            anyhow::ensure!(interval > 0, "preview interval must be at least 1");
            let sdl = sdl2::init().map_err(|e| anyhow!(e))?;
            let video = sdl.video().map_err(|e| anyhow!(e))?;
            let window = video
                .window("polyclimb", width, height)
                .position_centered()
                .build()?
                .into_canvas()
                .build()?;
            let texture = window.texture_creator().create_texture_streaming(
                PixelFormatEnum::ABGR8888,
                width,
                height,
            )?;
            let events = sdl.event_pump().map_err(|e| anyhow!(e))?;
            Ok(Preview {
                texture: Some(texture),
                window: Some(window),
                events,
                interval,
                _sdl: sdl,
            })
        }

        fn close(&mut self) {
            if let Some(texture) = self.texture.take() {
                // SAFETY: the renderer that created it is still alive in `self.window`
                unsafe { texture.destroy() };
            }
            self.window = None;
        }
    }

    impl Observer for Preview {
        fn observe(&mut self, canvas: &Canvas, generation: u64) -> anyhow::Result<()> {
            if generation % self.interval != 0 {
                return Ok(());
            }
            if self
                .events
                .poll_iter()
                .any(|event| matches!(event, Event::Quit { .. }))
            {
                info!("preview window closed");
                self.close();
            }
            let (Some(window), Some(texture)) = (self.window.as_mut(), self.texture.as_mut())
            else {
                return Ok(());
            };

            texture.update(None, canvas.data(), canvas.width() * 4)?;
            window.copy(texture, None, None).map_err(|e| anyhow!(e))?;
            window.present();
            Ok(())
        }
    }

    impl Drop for Preview {
        fn drop(&mut self) {
            self.close();
        }
    }
}
