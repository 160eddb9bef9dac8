// std
use std::path::PathBuf;
// others
use clap::Parser;
use smallvec::smallvec;
// rs_scene
use rs_scene::core::api;
use rs_scene::core::autodiff::{DiffParameter, FiniteDifferences};
use rs_scene::core::base::Float;
use rs_scene::core::error::SceneError;
use rs_scene::core::geometry::{Point3f, Vector3f};
use rs_scene::core::parameters::traverse;
use rs_scene::core::properties::{Properties, PropertyValue};
use rs_scene::core::render::{render_with_gradient, GradientOptions};
use rs_scene::core::transform::Transform;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render a small scene and its derivative with respect to the
/// horizontal position of the area light.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// variant to render with
    #[arg(long, default_value = "gpu_autodiff_rgb")]
    variant: String,
    #[arg(long, default_value_t = 64)]
    width: i64,
    #[arg(long, default_value_t = 64)]
    height: i64,
    /// number of averaged passes
    #[arg(short = 'p', long, default_value_t = 4)]
    passes: usize,
    /// seed of the first pass
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// samples per pixel and pass
    #[arg(long, default_value_t = 4)]
    spp: i64,
    /// finite difference step
    #[arg(long, default_value_t = 0.01)]
    epsilon: Float,
    /// use specified number of threads for rendering
    #[arg(short = 't', long = "nthreads", default_value_t = 0)]
    nthreads: usize,
    /// image of the averaged passes
    #[arg(short = 'o', long, default_value = "scene.png")]
    output: PathBuf,
    /// image of the averaged gradient
    #[arg(short = 'g', long, default_value = "scene_gradient.png")]
    gradient: PathBuf,
    #[arg(long)]
    progress: bool,
}

fn look_at(origin: Point3f, target: Point3f) -> Transform {
    Transform::look_at(&origin, &target, &Vector3f::new(0.0, 1.0, 0.0))
}

fn scene_description(args: &Cli) -> Result<Properties, SceneError> {
    let mut emitter = Properties::new("area");
    emitter.set("radiance", 10.0 as Float)?;
    // rectangle facing down, above the sphere
    let mut light = Properties::new("rectangle");
    light.set_id("light_shape");
    light.set(
        "to_world",
        Transform::translate(&Vector3f::new(0.0, 0.0, 3.0))
            * Transform::rotate(180.0, &Vector3f::new(1.0, 0.0, 0.0))
            * Transform::scale(0.5, 0.5, 0.5),
    )?;
    light.set("emitter", emitter)?;
    let mut sphere = Properties::new("sphere");
    sphere.set("radius", 1.0 as Float)?;
    let mut floor = Properties::new("rectangle");
    floor.set(
        "to_world",
        Transform::translate(&Vector3f::new(0.0, 0.0, -1.0)) * Transform::scale(4.0, 4.0, 1.0),
    )?;
    let mut film = Properties::new("hdrfilm");
    film.set("width", args.width)?;
    film.set("height", args.height)?;
    let mut sampler = Properties::new("independent");
    sampler.set("sample_count", args.spp)?;
    let mut sensor = Properties::new("perspective");
    sensor.set("fov", 45.0 as Float)?;
    sensor.set(
        "to_world",
        look_at(Point3f::new(0.0, -6.0, 3.0), Point3f::new(0.0, 0.0, 0.0)),
    )?;
    sensor.set("film", film)?;
    sensor.set("sampler", sampler)?;
    let mut scene = Properties::new("scene");
    scene.set("shape_1", light)?;
    scene.set("shape_2", sphere)?;
    scene.set("shape_3", floor)?;
    scene.set("sensor", sensor)?;
    scene.set("integrator", Properties::new("direct"))?;
    Ok(scene)
}

fn run(args: &Cli) -> Result<(), SceneError> {
    api::set_variant(&args.variant)?;
    let mut scene = api::load(scene_description(args)?)?.into_scene()?;
    let mut params = traverse(&mut scene);
    let key = "light_shape.vertex_positions";
    let positions: Vec<Float> = match params.get(key)? {
        PropertyValue::Floats(positions) => positions.clone(),
        other => {
            return Err(SceneError::InvalidArgument(format!(
                "\"{}\" is not a float array: {:?}",
                key, other
            )))
        }
    };
    params.keep(&[key]);
    let mut param = DiffParameter::translation(
        "light_x",
        key,
        positions,
        Vector3f::new(1.0, 0.0, 0.0),
    );
    param.set_requires_gradient(&mut params, scene.variant().is_differentiable())?;
    let mut differentiator = FiniteDifferences::new(args.epsilon, true);
    let options = GradientOptions {
        passes: args.passes,
        seed: args.seed,
        channels: smallvec![0],
        sensor: 0,
        progress: args.progress,
    };
    let result = render_with_gradient(
        &mut scene,
        &mut params,
        &param,
        &mut differentiator,
        &options,
    )?;
    let film = scene.sensor_mut(0)?.film_mut();
    film.put(result.image)?;
    film.set_destination_file(&args.output);
    film.write()?;
    result.gradient.write_gradient(&args.gradient)?;
    println!(
        "{} pass(es), {} NaN sample(s) replaced",
        result.passes, result.nan_count
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Cli::parse();
    let num_cores = num_cpus::get();
    println!(
        "rs_scene version {} [Detected {} cores]",
        VERSION, num_cores
    );
    if args.nthreads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(args.nthreads)
            .build_global()
        {
            log::warn!("could not configure {} threads: {}", args.nthreads, e);
        }
    }
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}
