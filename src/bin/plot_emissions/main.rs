use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use error_stack::ResultExt;
use nafa_rs::{
    boundaries::{self, BoundaryPolygon},
    config::PathConfig,
    dataset::read_variable_f64,
    discovery,
    logging::init_logging,
    quicklook,
};
use ndarray::{Array2, ArrayView2, Axis};
use plotly::{
    common::{ColorBar, Line, Mode, Title},
    layout::Axis as PlotAxis,
    HeatMap, ImageFormat, Layout, Plot, Scatter,
};

/// Boundaries with this many vertices or fewer are not drawn
const MIN_OUTLINE_VERTICES: usize = 3;

fn main() -> ExitCode {
    let clargs = Cli::parse();
    init_logging(clargs.verbosity.log_level_filter());
    if let Err(e) = main_inner(clargs) {
        eprintln!("ERROR: {e:?}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main_inner(clargs: Cli) -> error_stack::Result<(), CliError> {
    let paths = PathConfig::load(&clargs.root).change_context(CliError::Config)?;

    let wrf_file = discovery::find_wrf_file(&paths.wrf_dir, paths.wrf_sample.as_deref())
        .change_context(CliError::Wrf)?;
    let emis_file =
        discovery::find_emissions_file(&paths.emissions_dir, paths.emissions_sample.as_deref())
            .change_context(CliError::Emissions)?;
    log::info!("Plotting {} on the grid of {}", emis_file.display(), wrf_file.display());

    let (xlat, dims) = read_variable_f64(&wrf_file, "XLAT").change_context(CliError::Wrf)?;
    let xlat = quicklook::wrf_coordinate(xlat.view(), &dims).change_context(CliError::Wrf)?;
    let (xlong, dims) = read_variable_f64(&wrf_file, "XLONG").change_context(CliError::Wrf)?;
    let xlong = quicklook::wrf_coordinate(xlong.view(), &dims).change_context(CliError::Wrf)?;

    let (emiss, dims) =
        read_variable_f64(&emis_file, &clargs.variable).change_context(CliError::Emissions)?;
    let mut data = quicklook::emissions_at_hour(emiss.view(), &dims, clargs.hour)
        .change_context(CliError::Emissions)?;

    // WRF is usually a couple of cells larger than the emissions grid
    if xlat.dim() != data.dim() {
        log::info!(
            "Cropping WRF grid {:?} to the emissions grid {:?}",
            xlat.dim(),
            data.dim()
        );
    }
    let lat = quicklook::center_crop(xlat.view(), data.dim()).change_context(CliError::Grid)?;
    let lon = quicklook::center_crop(xlong.view(), data.dim()).change_context(CliError::Grid)?;

    let polys = boundaries::read_boundaries(&paths.boundaries_dir)
        .change_context(CliError::Boundaries)?;
    let outline = polys.get(&clargs.boundary);
    if outline.is_none() {
        log::warn!("No boundary named {} found, plotting without an outline", clargs.boundary);
    }

    if clargs.mask {
        let poly = outline.ok_or_else(|| {
            error_stack::Report::new(CliError::Boundaries)
                .attach_printable(format!("--mask requires the {} boundary", clargs.boundary))
        })?;
        let mask = boundaries::mask_with_polygon(lon, lat, poly);
        data = quicklook::apply_mask(data.view(), mask.view());
    }

    let output = clargs
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("outputs/co_emiss_h{:02}.png", clargs.hour)));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .change_context_lazy(|| CliError::Output(output.clone()))?;
    }

    let plot = make_plot(lon, lat, &data, outline, &clargs);
    plot.write_image(&output, ImageFormat::PNG, 1200, 1050, 1.0);
    println!("Saved: {}", output.display());
    Ok(())
}

/// Plot one hour of gridded emissions with a boundary outline on top.
///
/// The WRF and emissions files are found the same way as for `check_data`.
/// The emissions variable is summed over layers, and the WRF latitude and
/// longitude are cropped to the emissions grid if the two differ in size.
/// The plot is in plain longitude/latitude: each column is placed at the
/// longitude of the middle grid row and each row at the latitude of the middle
/// grid column, which is only suitable for a quick look.
#[derive(Debug, Parser)]
struct Cli {
    /// Directory containing the path configuration file
    #[clap(short, long, default_value = ".")]
    root: PathBuf,

    /// Emissions variable to plot
    #[clap(long, default_value = "emiss")]
    variable: String,

    /// Zero-based hour of the emissions file to plot
    #[clap(long, default_value_t = 0)]
    hour: usize,

    /// Boundary to overlay, named by its file stem
    #[clap(short, long, default_value = "Fairbanks")]
    boundary: String,

    /// Blank out grid cells outside the boundary
    #[clap(long)]
    mask: bool,

    /// Where to save the PNG; defaults to outputs/co_emiss_hHH.png
    #[clap(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Could not load the path configuration")]
    Config,
    #[error("Could not read latitude/longitude from the WRF sample file")]
    Wrf,
    #[error("Could not read emissions from the emissions sample file")]
    Emissions,
    #[error("The WRF and emissions grids cannot be aligned")]
    Grid,
    #[error("Could not read the boundary polygons")]
    Boundaries,
    #[error("Could not create the output directory for {}", .0.display())]
    Output(PathBuf),
}

fn make_plot(
    lon: ArrayView2<f64>,
    lat: ArrayView2<f64>,
    data: &Array2<f64>,
    outline: Option<&BoundaryPolygon>,
    clargs: &Cli,
) -> Plot {
    let (ny, nx) = data.dim();
    let x = lon.index_axis(Axis(0), ny / 2).to_vec();
    let y = lat.index_axis(Axis(1), nx / 2).to_vec();
    let z: Vec<Vec<f64>> = data.outer_iter().map(|row| row.to_vec()).collect();

    let mut plot = Plot::new();
    let heatmap = HeatMap::new(x, y, z).color_bar(ColorBar::new().title(Title::new(&format!(
        "{} (moles/s), hour {}",
        clargs.variable, clargs.hour
    ))));
    plot.add_trace(heatmap);

    if let Some(poly) = outline.filter(|p| p.len() > MIN_OUTLINE_VERTICES) {
        let trace = Scatter::new(poly.lon().to_vec(), poly.lat().to_vec())
            .name(&clargs.boundary)
            .mode(Mode::Lines)
            .line(Line::new().color("black").width(1.0));
        plot.add_trace(trace);
    }

    let mut x_axis = PlotAxis::new().title(Title::new("Longitude (deg E)"));
    let mut y_axis = PlotAxis::new().title(Title::new("Latitude (deg N)"));
    if let Some(((x0, x1), (y0, y1))) = quicklook::finite_extent(lon, lat, data.view()) {
        x_axis = x_axis.range(vec![x0, x1]);
        y_axis = y_axis.range(vec![y0, y1]);
    }

    let layout = Layout::new()
        .title(Title::new(&format!("{} emissions, hour {}", clargs.boundary, clargs.hour)))
        .x_axis(x_axis)
        .y_axis(y_axis);
    plot.set_layout(layout);
    plot
}
