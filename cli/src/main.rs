//! Turns the roads of a city, exported as GeoJSON, into map posters and 3D-printable reliefs.

#[macro_use]
extern crate log;

mod input;
mod make_relief;
mod output;
mod render;

use anyhow::{bail, Context, Result};
use structopt::StructOpt;

use geom::{LonLat, Pt2D};
use pipeline::Snapshot;
use poster::ThemeRegistry;
use posterutil::Timer;
use road_network::{Area, AreaKind, Region, RoadSegment};

#[derive(StructOpt)]
#[structopt(name = "maptoposter", about = "Map posters and 3D-printable reliefs from road data")]
enum Command {
    /// Draws one poster
    Render {
        #[structopt(flatten)]
        map: MapArgs,
        #[structopt(flatten)]
        poster: render::PosterArgs,
        /// The theme to use; see list-themes
        #[structopt(long, short = "t", default_value = "terracotta")]
        theme: String,
    },
    /// Draws the same poster once with every theme
    AllThemes {
        #[structopt(flatten)]
        map: MapArgs,
        #[structopt(flatten)]
        poster: render::PosterArgs,
        /// How many posters to draw at once. Defaults to the number of CPUs.
        #[structopt(long)]
        threads: Option<usize>,
    },
    /// Builds a 3D-printable relief of the roads, as binary STL or OBJ
    Relief {
        #[structopt(flatten)]
        map: MapArgs,
        #[structopt(flatten)]
        relief: make_relief::ReliefArgs,
    },
    /// Prints every available theme with its description
    ListThemes {
        /// Also load every theme JSON file in this directory
        #[structopt(long)]
        theme_dir: Option<String>,
    },
}

/// Where the roads come from and which part of them to show.
#[derive(StructOpt)]
struct MapArgs {
    /// A GeoJSON file with roads as LineStrings, plus optional water and parks as Polygons.
    /// Feature properties are treated as OSM tags.
    #[structopt(long)]
    input: String,
    /// The city name, used for the title and output filenames
    #[structopt(long, short = "c")]
    city: String,
    #[structopt(long, short = "C", default_value = "")]
    country: String,
    /// Override the latitude of the center, like `40.7128` or `33.8688S`. Defaults to the middle
    /// of the input.
    #[structopt(long, allow_hyphen_values = true)]
    latitude: Option<String>,
    /// Override the longitude of the center, like `-74.0060` or `74.0060W`
    #[structopt(long, allow_hyphen_values = true)]
    longitude: Option<String>,
    /// Map radius in meters
    #[structopt(long, short = "d", default_value = "18000")]
    distance: f64,
    /// Also load every theme JSON file in this directory
    #[structopt(long)]
    theme_dir: Option<String>,
    /// Output files go here
    #[structopt(long, default_value = "posters")]
    out_dir: String,
    /// Leave out every road
    #[structopt(long)]
    no_roads: bool,
    /// Leave out water bodies
    #[structopt(long)]
    no_water: bool,
    /// Leave out parks and green spaces
    #[structopt(long)]
    no_parks: bool,
}

impl MapArgs {
    /// Reads, projects and classifies the input. Also returns the center everything was
    /// projected around.
    fn load(&self, timer: &mut Timer) -> Result<(Snapshot, LonLat)> {
        if self.distance.is_nan() || self.distance <= 0.0 {
            bail!("--distance must be positive, not {}", self.distance);
        }
        timer.start(format!("read {}", self.input));
        let raw = input::read_geojson(&self.input);
        timer.stop(format!("read {}", self.input));
        let raw = raw?;

        let center = match (&self.latitude, &self.longitude) {
            (Some(lat), Some(lon)) => {
                LonLat::new(input::parse_coordinate(lon)?, input::parse_coordinate(lat)?)
            }
            (None, None) => raw
                .center()
                .with_context(|| format!("{} has no roads or areas", self.input))?,
            _ => bail!("--latitude and --longitude have to be given together"),
        };
        info!("Centering on {}", poster::format_coordinates(center));

        let (mut roads, mut areas) = raw.project(center);
        self.drop_hidden(&mut roads, &mut areas);
        let region = Region {
            center: Pt2D::new(0.0, 0.0),
            radius: self.distance,
        };
        Ok((Snapshot::new(roads, areas, region, timer), center))
    }
}

impl MapArgs {
    /// Removes whatever the flags leave out.
    fn drop_hidden(&self, roads: &mut Vec<RoadSegment>, areas: &mut Vec<Area>) {
        if self.no_roads {
            info!("Leaving out {} roads", roads.len());
            roads.clear();
        }
        areas.retain(|a| match a.kind {
            AreaKind::Water => !self.no_water,
            AreaKind::Park => !self.no_parks,
        });
    }
}

fn registry(theme_dir: &Option<String>) -> Result<ThemeRegistry> {
    let mut registry = ThemeRegistry::with_builtins()?;
    if let Some(dir) = theme_dir {
        registry.load_dir(dir)?;
    }
    Ok(registry)
}

fn list_themes(theme_dir: Option<String>) -> Result<()> {
    let registry = registry(&theme_dir)?;
    println!("Available themes:");
    for theme in registry.all() {
        println!("  {}", theme.key);
        println!("    {}", theme.display_name);
        if !theme.description.is_empty() {
            println!("    {}", theme.description);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    posterutil::logger::setup();

    match Command::from_args() {
        Command::Render { map, poster, theme } => render::run(map, poster, theme),
        Command::AllThemes {
            map,
            poster,
            threads,
        } => render::run_all(map, poster, threads),
        Command::Relief { map, relief } => make_relief::run(map, relief),
        Command::ListThemes { theme_dir } => list_themes(theme_dir),
    }
}
