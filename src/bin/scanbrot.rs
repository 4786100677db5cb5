// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;
use std::time::Duration;

use clap::{App, Arg, ArgMatches};
use failure::{bail, format_err};
use log::info;

use scanbrot::config::{parse_complex, parse_pair};
use scanbrot::{
    Algorithm, Canvas, ColorScheme, ProgressiveRenderer, RenderConfig, RenderState,
    SessionController, Step, Viewport,
};

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_size(s: &str) -> Result<(), String> {
    match parse_pair::<u16>(s, 'x') {
        Some((w, h)) if w > 0 && h > 0 => Ok(()),
        Some(_) => Err("Image dimensions must be positive".to_string()),
        None => Err("Could not parse output image size".to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LOOKAT: &str = "lookat";
const ZOOM: &str = "zoom";
const ITERATIONS: &str = "iterations";
const AUTO_ITERATIONS: &str = "auto-iterations";
const ALGORITHM: &str = "algorithm";
const ESCAPE_RADIUS: &str = "escape-radius";
const NEWTON_RADIUS: &str = "newton-radius";
const SCHEME: &str = "scheme";
const SUPERSAMPLES: &str = "supersamples";
const UPDATE_MS: &str = "update-ms";
const STATE: &str = "state";
const SEED: &str = "seed";
const PRINT_STATE: &str = "print-state";

fn args<'a>() -> ArgMatches<'a> {
    let schemes: Vec<&'static str> = ColorScheme::ALL.iter().map(|s| s.name()).collect();

    App::new("scanbrot")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Progressive Mandelbrot and Newton fractal renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the extension picks the format"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("640x480")
                .validator(|s| validate_size(&s))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(LOOKAT)
                .long(LOOKAT)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.6,0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse look-at point"))
                .help("Centre of the view on the complex plane"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("3.4,3.4")
                .validator(|s| match parse_pair::<f64>(&s, ',') {
                    Some((w, h)) if w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0 => {
                        Ok(())
                    }
                    Some(_) => Err("Zoom spans must be finite and positive".to_string()),
                    None => Err("Could not parse zoom".to_string()),
                })
                .help("Width and height of the view on the complex plane"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("50")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Maximum number of iterations per sample"),
        )
        .arg(
            Arg::with_name(AUTO_ITERATIONS)
                .long(AUTO_ITERATIONS)
                .help("Pick the iteration count from the zoom level"),
        )
        .arg(
            Arg::with_name(ALGORITHM)
                .long(ALGORITHM)
                .short("a")
                .takes_value(true)
                .possible_values(&["mandelbrot", "newton"])
                .default_value("mandelbrot")
                .help("Which iteration to run"),
        )
        .arg(
            Arg::with_name(ESCAPE_RADIUS)
                .long(ESCAPE_RADIUS)
                .short("r")
                .takes_value(true)
                .default_value("10")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse escape radius",
                        "Escape radius must be positive",
                    )
                })
                .help("Mandelbrot escape threshold on |z|²"),
        )
        .arg(
            Arg::with_name(NEWTON_RADIUS)
                .long(NEWTON_RADIUS)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("6")
                .validator(|s| {
                    validate_range(
                        &s,
                        -300.0,
                        300.0,
                        "Could not parse Newton radius",
                        "Newton radius must be between -300 and 300",
                    )
                })
                .help("Newton convergence tolerance is 10^-radius"),
        )
        .arg(
            Arg::with_name(SCHEME)
                .long(SCHEME)
                .short("c")
                .takes_value(true)
                .possible_values(&schemes)
                .help("Colour scheme [default: hsv1, or newton-colorful for newton]"),
        )
        .arg(
            Arg::with_name(SUPERSAMPLES)
                .long(SUPERSAMPLES)
                .short("S")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        256,
                        "Could not parse sample count",
                        "Sample count must be between 1 and 256",
                    )
                })
                .help("Samples per pixel"),
        )
        .arg(
            Arg::with_name(UPDATE_MS)
                .long(UPDATE_MS)
                .takes_value(true)
                .default_value("200")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        u64::max_value(),
                        "Could not parse update interval",
                        "Update interval out of range",
                    )
                })
                .help("Milliseconds between progress reports"),
        )
        .arg(
            Arg::with_name(STATE)
                .long(STATE)
                .takes_value(true)
                .help("Shared state string; overrides the view options"),
        )
        .arg(
            Arg::with_name(SEED)
                .long(SEED)
                .takes_value(true)
                .validator(|s| {
                    validate_range(&s, 0, u64::max_value(), "Could not parse seed", "Seed out of range")
                })
                .help("Seed for the supersampling jitter"),
        )
        .arg(
            Arg::with_name(PRINT_STATE)
                .long(PRINT_STATE)
                .help("Print the shared state string of the rendered view"),
        )
        .get_matches()
}

fn value<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, failure::Error> {
    matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing --{}", name))
}

fn parsed<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, failure::Error> {
    let raw = value(matches, name)?;
    raw.parse()
        .map_err(|_| format_err!("could not parse --{} {:?}", name, raw))
}

fn config_from(matches: &ArgMatches) -> Result<RenderConfig, failure::Error> {
    let algorithm = match value(matches, ALGORITHM)? {
        "newton" => Algorithm::newton_from_radius(parsed(matches, NEWTON_RADIUS)?),
        _ => Algorithm::Mandelbrot {
            escape_radius: parsed(matches, ESCAPE_RADIUS)?,
        },
    };
    let scheme = match matches.value_of(SCHEME) {
        Some(name) => name.parse()?,
        None => match algorithm {
            Algorithm::Newton { .. } => ColorScheme::NewtonColorful,
            Algorithm::Mandelbrot { .. } => ColorScheme::Hsv1,
        },
    };
    Ok(RenderConfig {
        max_steps: parsed(matches, ITERATIONS)?,
        algorithm,
        scheme,
        super_samples: parsed(matches, SUPERSAMPLES)?,
        update_interval: Duration::from_millis(parsed(matches, UPDATE_MS)?),
        auto_steps: matches.is_present(AUTO_ITERATIONS),
    })
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let (width, height) = parse_pair::<usize>(value(matches, SIZE)?, 'x')
        .ok_or_else(|| format_err!("Error parsing image dimensions"))?;
    let look_at = parse_complex(value(matches, LOOKAT)?)
        .ok_or_else(|| format_err!("Error parsing look-at point"))?;
    let zoom = parse_pair::<f64>(value(matches, ZOOM)?, ',')
        .ok_or_else(|| format_err!("Error parsing zoom"))?;

    let mut controller =
        SessionController::new(Viewport::new(look_at, zoom), config_from(matches)?);
    if let Some(state) = matches.value_of(STATE) {
        controller.restore(&state.parse::<RenderState>()?);
    }
    controller.config().validate()?;
    controller.viewport().validate()?;

    let mut canvas = Canvas::new(width, height);
    let session = controller.begin(width, height);
    let mut renderer = match matches.value_of(SEED) {
        Some(_) => ProgressiveRenderer::seeded(session, parsed(matches, SEED)?),
        None => session.renderer(),
    };

    loop {
        match renderer.resume(&mut canvas) {
            Step::Yielded(progress) => info!("{}", progress),
            Step::Completed(_) => break,
            Step::Superseded => bail!("render was superseded"),
        }
    }

    canvas.save(value(matches, OUTPUT)?)?;
    if matches.is_present(PRINT_STATE) {
        println!("{}", controller.state());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
