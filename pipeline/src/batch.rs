use std::sync::Arc;

use anyhow::Result;

use poster::{RenderedImage, Theme};
use posterutil::{Cancellation, Parallelism, Timer};

use crate::{render_poster, PosterOptions, Snapshot};

/// One theme's poster from a batch.
#[derive(Debug)]
pub struct ThemeOutput {
    pub theme: Arc<Theme>,
    /// None if the batch was cancelled before this theme started
    pub image: Option<Result<RenderedImage>>,
}

/// Renders the same snapshot with every theme, on a bounded pool of workers. The snapshot is only
/// read; each worker produces its own image. Results come back in the order of `themes`. A failure
/// in one theme doesn't stop the others.
pub fn render_all_themes(
    snapshot: &Snapshot,
    themes: Vec<Arc<Theme>>,
    opts: &PosterOptions,
    parallelism: Parallelism,
    cancel: &Cancellation,
    timer: &mut Timer,
) -> Vec<ThemeOutput> {
    let images = timer.parallelize_until(
        &format!("render {} themes", themes.len()),
        parallelism,
        cancel,
        themes.clone(),
        |theme| render_poster(snapshot, &theme, opts),
    );

    let mut outputs = Vec::new();
    for (theme, image) in themes.into_iter().zip(images) {
        match image {
            Some(Ok(_)) => {}
            Some(Err(ref err)) => timer.warn(format!("{} failed: {:#}", theme.key, err)),
            None => debug!("Skipped {}; the batch was cancelled", theme.key),
        }
        outputs.push(ThemeOutput { theme, image });
    }
    outputs
}
