use anyhow::{Context, Result};
use chrono::Local;
use structopt::StructOpt;

use pipeline::build_relief;
use posterutil::{prettyprint_usize, Timer};
use relief::{ReliefSettings, RidgeMode};

use crate::{output, MapArgs};

/// Plate size and ridge heights. Flags override the settings file, which overrides the defaults.
#[derive(StructOpt)]
pub struct ReliefArgs {
    /// A JSON file with relief settings. Missing fields take the defaults.
    #[structopt(long)]
    settings: Option<String>,
    /// Plate width in mm
    #[structopt(long)]
    stl_width: Option<f64>,
    /// Plate depth in mm
    #[structopt(long)]
    stl_height: Option<f64>,
    #[structopt(long)]
    stl_base_thickness: Option<f64>,
    /// Height of the tallest ridges above the plate, in mm
    #[structopt(long)]
    stl_max_height: Option<f64>,
    /// Road widths are defined against a grid this many cells across the longer side
    #[structopt(long)]
    stl_resolution: Option<u32>,
    /// Ridges become separate pieces standing on the plate, instead of one fused solid
    #[structopt(long)]
    separate: bool,
    /// Leave out the raised frame around the plate
    #[structopt(long)]
    no_border: bool,
    /// Engrave the roads into the plate instead of raising them
    #[structopt(long)]
    stl_invert: bool,
    /// Write Wavefront OBJ instead of binary STL
    #[structopt(long)]
    obj: bool,
}

impl ReliefArgs {
    fn settings(&self) -> Result<ReliefSettings> {
        let mut settings = match self.settings {
            Some(ref path) => {
                let raw = fs_err::read_to_string(path)?;
                ReliefSettings::from_json(&raw)
                    .with_context(|| format!("parsing relief settings from {}", path))?
            }
            None => ReliefSettings::default(),
        };
        if let Some(x) = self.stl_width {
            settings.width_mm = x;
        }
        if let Some(x) = self.stl_height {
            settings.height_mm = x;
        }
        if let Some(x) = self.stl_base_thickness {
            settings.base_thickness = x;
        }
        if let Some(x) = self.stl_max_height {
            settings.max_relief_height = x;
        }
        if let Some(x) = self.stl_resolution {
            settings.resolution = x;
        }
        if self.separate {
            settings.ridge_mode = RidgeMode::Separate;
        }
        if self.no_border {
            settings.add_border = false;
        }
        if self.stl_invert {
            settings.invert = true;
        }
        Ok(settings)
    }
}

pub fn run(map: MapArgs, args: ReliefArgs) -> Result<()> {
    let settings = args.settings()?;
    let mut timer = Timer::new(format!("build relief of {}", map.city));
    let (snapshot, _) = map.load(&mut timer)?;
    let model = build_relief(&snapshot, &settings, &mut timer)?;
    info!(
        "{}x{}mm plate with {} triangles",
        settings.width_mm,
        settings.height_mm,
        prettyprint_usize(model.mesh.num_faces())
    );

    let (bytes, extension) = if args.obj {
        (model.mesh.to_obj().into_bytes(), "obj")
    } else {
        (model.mesh.to_stl(), "stl")
    };
    let name = output::filename(&map.city, "relief", extension, &Local::now().naive_local());
    output::write(&map.out_dir, &name, &bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() {
        let args = ReliefArgs::from_iter(vec![
            "relief",
            "--stl-width",
            "100",
            "--stl-max-height",
            "4",
            "--separate",
            "--no-border",
        ]);
        let settings = args.settings().unwrap();
        assert_eq!(settings.width_mm, 100.0);
        assert_eq!(settings.height_mm, 200.0);
        assert_eq!(settings.max_relief_height, 4.0);
        assert_eq!(settings.ridge_mode, RidgeMode::Separate);
        assert!(!settings.add_border);
        assert!(!settings.invert);
        assert!(!args.obj);

        let engraved = ReliefArgs::from_iter(vec!["relief", "--stl-invert"]);
        assert!(engraved.settings().unwrap().invert);
    }
}
