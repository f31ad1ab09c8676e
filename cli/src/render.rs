use std::collections::BTreeSet;

use anyhow::{bail, Result};
use chrono::Local;
use structopt::StructOpt;

use geom::LonLat;
use pipeline::{render_all_themes, render_poster, PosterOptions};
use poster::{CanvasSpec, OutputFormat, PosterText, MAX_INCHES};
use posterutil::{plain_list_names, Cancellation, Parallelism, Timer};

use crate::{output, registry, MapArgs};

/// How the poster looks, apart from the theme.
#[derive(StructOpt)]
pub struct PosterArgs {
    /// Width in inches, at most 20
    #[structopt(long, short = "W", default_value = "12")]
    width: f64,
    /// Height in inches, at most 20
    #[structopt(long, short = "H", default_value = "16")]
    height: f64,
    #[structopt(long, default_value = "300")]
    dpi: u32,
    /// png, svg or pdf
    #[structopt(long, short = "f", default_value = "png")]
    format: OutputFormat,
    /// Write this as the title instead of the city, like a translated name
    #[structopt(long)]
    display_city: Option<String>,
    #[structopt(long)]
    display_country: Option<String>,
    /// Base font size of the title in points, before scaling to the poster
    #[structopt(long)]
    city_font_size: Option<f64>,
    #[structopt(long)]
    country_font_size: Option<f64>,
    #[structopt(long)]
    coords_font_size: Option<f64>,
    /// Write the text in this font family instead of the theme's, like "Noto Sans JP"
    #[structopt(long)]
    font_family: Option<String>,
    /// Just the map, without any text
    #[structopt(long)]
    no_text: bool,
}

impl PosterArgs {
    fn canvas(&self) -> CanvasSpec {
        let clamp = |name: &str, inches: f64| {
            if inches > MAX_INCHES {
                warn!(
                    "{} {} inches is too big; using {} instead",
                    name, inches, MAX_INCHES
                );
                MAX_INCHES
            } else {
                inches
            }
        };
        CanvasSpec::from_inches(
            clamp("width", self.width),
            clamp("height", self.height),
            f64::from(self.dpi),
        )
    }

    fn options(&self, map: &MapArgs, center: LonLat) -> PosterOptions {
        let text = if self.no_text {
            None
        } else {
            let mut text = PosterText::new(
                self.display_city.as_ref().unwrap_or(&map.city),
                self.display_country.as_ref().unwrap_or(&map.country),
                center,
            );
            text.title_pt = self.city_font_size;
            text.subtitle_pt = self.country_font_size;
            text.coords_pt = self.coords_font_size;
            text.font_family = self.font_family.clone();
            Some(text)
        };
        PosterOptions {
            canvas: self.canvas(),
            format: self.format,
            text,
        }
    }
}

pub fn run(map: MapArgs, args: PosterArgs, theme: String) -> Result<()> {
    let theme = registry(&map.theme_dir)?.get(&theme)?;
    let mut timer = Timer::new(format!("draw {} poster of {}", theme.key, map.city));
    let (snapshot, center) = map.load(&mut timer)?;
    let opts = args.options(&map, center);

    timer.start("render");
    let image = render_poster(&snapshot, &theme, &opts);
    timer.stop("render");
    let image = image?;

    let name = output::filename(
        &map.city,
        &theme.key,
        opts.format.extension(),
        &Local::now().naive_local(),
    );
    output::write(&map.out_dir, &name, &image.bytes)?;
    Ok(())
}

pub fn run_all(map: MapArgs, args: PosterArgs, threads: Option<usize>) -> Result<()> {
    let registry = registry(&map.theme_dir)?;
    let mut timer = Timer::new(format!("draw every poster of {}", map.city));
    let (snapshot, center) = map.load(&mut timer)?;
    let opts = args.options(&map, center);
    let parallelism = threads.map(Parallelism::Bounded).unwrap_or_default();

    let outputs = render_all_themes(
        &snapshot,
        registry.all().cloned().collect(),
        &opts,
        parallelism,
        &Cancellation::new(),
        &mut timer,
    );

    // Every poster in one batch shares a timestamp
    let now = Local::now().naive_local();
    let mut failed = BTreeSet::new();
    for result in outputs {
        match result.image {
            Some(Ok(image)) => {
                let name = output::filename(
                    &map.city,
                    &result.theme.key,
                    opts.format.extension(),
                    &now,
                );
                output::write(&map.out_dir, &name, &image.bytes)?;
            }
            Some(Err(_)) => {
                failed.insert(result.theme.key.clone());
            }
            None => {}
        }
    }
    if !failed.is_empty() {
        bail!("{} themes failed: {}", failed.len(), plain_list_names(failed));
    }
    Ok(())
}
